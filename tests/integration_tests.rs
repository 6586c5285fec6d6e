use timegraph::{AbsTime, Effort, Stem, TimeGraph};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn abs(s: &str) -> AbsTime {
    s.parse().unwrap()
}

#[test]
fn test_linear_chain() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.register_event("e2");
    tg.register_event("e3");
    tg.enter("e1", "before", "e2").unwrap();
    tg.enter("e2", "before", "e3").unwrap();

    let r = tg.relation("e1", "e3", Effort::Search);
    assert_eq!(r.stem, Stem::Before);
    assert_eq!(tg.elapsed("e1", "e3", Effort::Search), (0.0, f64::INFINITY));
}

#[test]
fn test_between_events() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.register_event("e2");
    tg.register_event("e3");
    tg.enter3("e2", "between", "e1", "e3").unwrap();

    assert_eq!(tg.relation("e1", "e2", Effort::Search).stem, Stem::Before);
    assert_eq!(tg.relation("e2", "e3", Effort::Search).stem, Stem::Before);
    assert_eq!(tg.relation("e3", "e1", Effort::Search).stem, Stem::After);
}

#[test]
fn test_absolute_clamping() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.register_event("e2");
    tg.enter("e1", "before", "e2").unwrap();
    tg.enter("e1start", "same-time", abs("1997-07-02T01:01:01"))
        .unwrap();
    tg.enter("e1end", "same-time", abs("1998-07-02T01:01:01"))
        .unwrap();
    tg.enter("e2start", "same-time", abs("1999-07-02T01:01:01"))
        .unwrap();
    tg.enter("e2end", "same-time", abs("2000-07-02T01:01:01"))
        .unwrap();

    let (min, max) = tg.elapsed("e1", "e2", Effort::Direct);
    assert!(min >= 31_536_000.0, "one year minimum, got {}", min);
    assert!(min <= max);

    let r = tg.relation("e1", "e2", Effort::Direct);
    assert_eq!(r.to_string(), "before-1");
}

#[test]
fn test_cross_chain_path_search() {
    init();
    let mut tg = TimeGraph::new();
    // First chain: a1 < a2 < a3.
    tg.enter("a1", "before", "a2").unwrap();
    tg.enter("a2", "before", "a3").unwrap();
    // Second chain: b1 < b2 < b3.
    tg.enter("b1", "before", "b2").unwrap();
    tg.enter("b2", "before", "b3").unwrap();
    // One cross-chain edge from the middle of the first to the head of the
    // second.
    tg.enter("a2", "before", "b1").unwrap();

    let a1 = tg.time_point("a1").unwrap();
    let b1 = tg.time_point("b1").unwrap();
    assert_ne!(
        tg.point(a1).unwrap().chain,
        tg.point(b1).unwrap().chain,
        "the two runs must live on separate chains"
    );

    assert_eq!(tg.relation("a1", "b3", Effort::Search).stem, Stem::Before);
    assert!(tg.relation("a1", "b3", Effort::Direct).is_unknown());
}

#[test]
fn test_collapse_equal_across_chains() {
    init();
    let mut tg = TimeGraph::new();
    tg.add_single("p");
    tg.enter("q", "before", "q2").unwrap();

    let p = tg.time_point("p").unwrap();
    let q = tg.time_point("q").unwrap();
    let q2 = tg.time_point("q2").unwrap();
    let q_chain = tg.point(q).unwrap().chain;
    assert_ne!(tg.point(p).unwrap().chain, q_chain);

    tg.enter("p", "equal", "q").unwrap();

    // The name q now resolves to the point formerly named p.
    assert_eq!(tg.time_point("q"), Some(p));
    // q2 gained a cross-chain ancestor link from p.
    let q2_point = tg.point(q2).unwrap();
    let has_link_from_p = q2_point
        .xancestors
        .iter()
        .any(|l| tg.link(l).unwrap().from == p);
    assert!(has_link_from_p);
    // The abandoned chain's first pointer advanced to q2.
    assert_eq!(tg.meta(q_chain).unwrap().first, Some(q2));
}

#[test]
fn test_inconsistency_softening() {
    init();
    let mut tg = TimeGraph::new();
    tg.enter("a", "before-1", "b").unwrap();
    let accepted = tg.enter("a", "after-1", "b").unwrap();
    assert!(accepted);
    assert_eq!(
        tg.relation("a", "b", Effort::Direct).to_string(),
        "same-time"
    );
    assert_eq!(tg.time_point("a"), tg.time_point("b"));
}

#[test]
fn test_strict_before_roundtrip() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("a");
    tg.register_event("b");
    tg.enter("a", "before-1", "b").unwrap();

    assert_eq!(tg.relation("a", "b", Effort::Search).to_string(), "before-1");
    assert_eq!(tg.relation("b", "a", Effort::Search).to_string(), "after-1");
}

#[test]
fn test_equal_roundtrip() {
    init();
    let mut tg = TimeGraph::new();
    tg.enter("a", "equal", "b").unwrap();
    assert_eq!(
        tg.relation("a", "b", Effort::Direct).to_string(),
        "same-time"
    );
    assert_eq!(tg.time_point("a"), tg.time_point("b"));
}

#[test]
fn test_at_least_before_elapsed() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("a");
    tg.register_event("b");
    tg.enter3("a", "at-least-before", "b", 5.0).unwrap();

    let (min, _) = tg.elapsed("a", "b", Effort::Search);
    assert!(min >= 5.0, "expected at least 5 seconds, got {}", min);
}

#[test]
fn test_exactly_before_duration_range() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("a");
    tg.register_event("b");
    tg.enter3("a", "exactly-before", "b", 60.0).unwrap();

    let (min, max) = tg.elapsed("a", "b", Effort::Search);
    assert_eq!(min, 60.0);
    assert_eq!(max, 60.0);
}

#[test]
fn test_during_relation() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("inner");
    tg.register_event("outer");
    tg.enter("inner", "during", "outer").unwrap();

    assert_eq!(
        tg.relation("inner", "outer", Effort::Search).stem,
        Stem::During
    );
    assert_eq!(
        tg.relation("outer", "inner", Effort::Search).stem,
        Stem::Contains
    );
}

#[test]
fn test_contains_and_overlaps() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("x");
    tg.register_event("y");
    tg.enter("x", "contains", "y").unwrap();
    assert_eq!(tg.relation("x", "y", Effort::Search).stem, Stem::Contains);

    let mut tg = TimeGraph::new();
    tg.register_event("x");
    tg.register_event("y");
    tg.enter("x", "overlaps", "y").unwrap();
    assert_eq!(tg.relation("x", "y", Effort::Search).stem, Stem::Overlaps);
    assert_eq!(
        tg.relation("y", "x", Effort::Search).stem,
        Stem::OverlappedBy
    );
}

#[test]
fn test_relation_with_absolute_argument() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.enter("e1", "before", abs("2023-01-01T00:00:00")).unwrap();
    tg.enter("e1", "after", abs("1997-07-02T01:01:01")).unwrap();

    let r = tg.relation("e1", abs("2024-01-01T00:00:00"), Effort::Direct);
    assert_eq!(r.stem, Stem::Before);
    let r = tg.relation("e1", abs("1990-01-01T00:00:00"), Effort::Direct);
    assert_eq!(r.stem, Stem::After);

    // Two absolute arguments compare directly.
    let r = tg.relation(
        abs("1997-07-02T01:01:01"),
        abs("1998-07-02T01:01:01"),
        Effort::Direct,
    );
    assert_eq!(r.to_string(), "before-1");
}

#[test]
fn test_point_id_arguments() {
    init();
    let mut tg = TimeGraph::new();
    tg.enter("a", "before-1", "b").unwrap();
    let a = tg.time_point("a").unwrap();
    let b = tg.time_point("b").unwrap();
    assert_eq!(tg.relation(a, b, Effort::Direct).to_string(), "before-1");
    tg.enter(b, "before", "c").unwrap();
    assert_eq!(tg.relation("b", "c", Effort::Direct).stem, Stem::Before);
}

#[test]
fn test_queries_never_fail_on_missing_names() {
    init();
    let tg = TimeGraph::new();
    assert!(tg.relation("nope", "nothing", Effort::Search).is_unknown());
    assert_eq!(
        tg.elapsed("nope", "nothing", Effort::Search),
        (0.0, f64::INFINITY)
    );
}

#[test]
fn test_enter_errors() {
    init();
    let mut tg = TimeGraph::new();
    assert!(tg.enter("a", "sometime-near", "b").is_err());
    assert!(tg.enter("a", "unknown", "b").is_err());
    // Duration predicates need a seconds argument.
    assert!(tg.enter("a", "at-least-before", "b").is_err());
    // Durations between unseen points are errors.
    assert!(tg.add_duration_min("ghost1", "ghost2", 5.0).is_err());
}

#[test]
fn test_format_dump() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.register_event("e2");
    tg.enter("e1", "before", "e2").unwrap();

    let dump = tg.format(true);
    assert!(dump.contains("Node e1start"));
    assert!(dump.contains("Node e2end"));
    assert!(dump.contains("Chain "));
    // Stable name order: e1end block precedes e2start block.
    let i1 = dump.find("Node e1end").unwrap();
    let i2 = dump.find("Node e2start").unwrap();
    assert!(i1 < i2);
    // Formatting twice yields the same text.
    assert_eq!(dump, tg.format(true));
}

#[test]
fn test_stats() {
    init();
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.register_event("e2");
    tg.enter("e1", "before-1", "e2").unwrap();

    let stats = tg.stats();
    assert_eq!(stats.points, 4);
    assert_eq!(stats.events, 2);
    assert_eq!(stats.entries, 1);
    assert!(stats.chains >= 2);
}
