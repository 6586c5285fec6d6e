use timegraph::{Effort, Stem, TimeGraph};

/// Structural invariants that must hold after every accepted entry.
fn assert_invariants(tg: &TimeGraph) {
    for p in tg.point_ids() {
        let pt = tg.point(p).unwrap();
        assert!(
            pt.min_pseudo <= pt.pseudo && pt.pseudo <= pt.max_pseudo,
            "pseudo bounds out of order on {}",
            pt.name
        );
        for l in pt.descendants.iter() {
            let link = tg.link(l).unwrap();
            assert_eq!(link.from, p);
            let to = tg.point(link.to).unwrap();
            assert_eq!(to.chain, pt.chain, "in-chain link crossing chains");
            assert!(to.pseudo > pt.pseudo, "descendant not later than {}", pt.name);
            assert!(to.ancestors.contains(l), "missing ancestor back-link");
            assert!(link.duration_min <= link.duration_max);
        }
        for l in pt.ancestors.iter() {
            let link = tg.link(l).unwrap();
            assert!(tg.point(link.from).unwrap().descendants.contains(l));
        }
        for l in pt.xdescendants.iter() {
            let link = tg.link(l).unwrap();
            let to = tg.point(link.to).unwrap();
            assert_ne!(to.chain, pt.chain, "cross link within one chain");
            assert!(to.xancestors.contains(l), "missing xancestor back-link");
            assert!(
                tg.meta(pt.chain).unwrap().connections.contains(l),
                "cross link absent from its chain's connections"
            );
        }
        for l in pt.xancestors.iter() {
            let link = tg.link(l).unwrap();
            assert!(tg.point(link.from).unwrap().xdescendants.contains(l));
        }
    }
    for c in tg.chain_ids() {
        let meta = tg.meta(c).unwrap();
        for l in meta.connections.iter() {
            let link = tg.link(l).unwrap();
            let from = tg.point(link.from).unwrap();
            assert_eq!(from.chain, c);
            assert!(from.xdescendants.contains(l));
        }
        if let Some(first) = meta.first {
            let first_pseudo = tg.point(first).unwrap().pseudo;
            for p in tg.point_ids() {
                let pt = tg.point(p).unwrap();
                if pt.chain == c {
                    assert!(first_pseudo <= pt.pseudo, "first is not earliest");
                }
            }
        }
    }
}

#[test]
fn test_invariants_through_construction() {
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    assert_invariants(&tg);
    tg.register_event("e2");
    tg.register_event("e3");
    tg.enter("e1", "before-1", "e2").unwrap();
    assert_invariants(&tg);
    tg.enter3("e2", "between", "e1", "e3").unwrap();
    assert_invariants(&tg);
    tg.enter3("e1", "at-least-before", "e2", 30.0).unwrap();
    assert_invariants(&tg);
    tg.enter("e1start", "same-time", "1997-07-02T01:01:01".parse::<timegraph::AbsTime>().unwrap())
        .unwrap();
    assert_invariants(&tg);
}

#[test]
fn test_entry_idempotence() {
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.register_event("e2");
    tg.enter("e1", "before-1", "e2").unwrap();

    let before = tg.format(true);
    let chains = tg.stats().chains;
    let points = tg.stats().points;

    tg.enter("e1", "before-1", "e2").unwrap();
    assert_eq!(tg.format(true), before, "repeated entry changed the graph");
    assert_eq!(tg.stats().chains, chains);
    assert_eq!(tg.stats().points, points);
    assert_invariants(&tg);
}

#[test]
fn test_inverse_consistency() {
    let mut tg = TimeGraph::new();
    tg.register_event("e1");
    tg.register_event("e2");
    tg.register_event("e3");
    tg.enter("e1", "before-1", "e2").unwrap();
    tg.enter("e2", "before", "e3").unwrap();

    for (a, b) in [("e1", "e2"), ("e2", "e3"), ("e1", "e3")] {
        let fwd = tg.relation(a, b, Effort::Search);
        let bwd = tg.relation(b, a, Effort::Search);
        if !fwd.is_unknown() || !bwd.is_unknown() {
            assert_eq!(fwd, bwd.inverse(), "{} vs {} disagree", a, b);
        }
    }
}

#[test]
fn test_chain_minimised_between_placement() {
    let mut tg = TimeGraph::new();
    tg.enter("a", "before", "c").unwrap();
    tg.enter3("m", "between", "a", "c").unwrap();

    let a = tg.point(tg.time_point("a").unwrap()).unwrap();
    let m = tg.point(tg.time_point("m").unwrap()).unwrap();
    let c = tg.point(tg.time_point("c").unwrap()).unwrap();
    assert_eq!(a.chain, m.chain, "middle point should join the chain");
    assert_eq!(m.chain, c.chain);
    assert!(a.pseudo < m.pseudo && m.pseudo < c.pseudo);
    assert_eq!(tg.stats().chains, 1);
    assert_invariants(&tg);
}

#[test]
fn test_repeated_between_forces_renumbering() {
    let mut tg = TimeGraph::new();
    tg.enter("a", "before", "c").unwrap();
    let mut prev = "c".to_string();
    for i in 0..60 {
        let name = format!("m{}", i);
        tg.enter3(name.as_str(), "between", "a", prev.as_str())
            .unwrap();
        prev = name;
    }
    assert_invariants(&tg);

    // Everything stayed on one chain, in the asserted order.
    assert_eq!(tg.stats().chains, 1);
    assert_eq!(tg.relation("a", "m59", Effort::Direct).stem, Stem::Before);
    assert_eq!(tg.relation("m59", "m0", Effort::Direct).stem, Stem::Before);
    assert_eq!(tg.relation("m0", "c", Effort::Direct).stem, Stem::Before);
}

#[test]
fn test_collapse_on_one_chain() {
    let mut tg = TimeGraph::new();
    tg.enter("a", "before", "b").unwrap();
    tg.enter("b", "before", "c").unwrap();
    tg.enter("a", "equal", "c").unwrap();

    let a = tg.time_point("a").unwrap();
    assert_eq!(tg.time_point("b"), Some(a));
    assert_eq!(tg.time_point("c"), Some(a));
    assert_eq!(
        tg.relation("a", "b", Effort::Direct).to_string(),
        "same-time"
    );
    assert_invariants(&tg);
}

#[test]
fn test_alias_for_new_name() {
    let mut tg = TimeGraph::new();
    tg.add_single("p");
    tg.enter("p", "equal", "fresh-name").unwrap();
    assert_eq!(tg.time_point("fresh-name"), tg.time_point("p"));
    let p = tg.point(tg.time_point("p").unwrap()).unwrap();
    assert!(p.alternate_names.iter().any(|n| n == "fresh-name"));
}

#[test]
fn test_register_event_orders_endpoints() {
    let mut tg = TimeGraph::new();
    tg.register_event("e");
    assert_eq!(tg.start_of("e"), Some("estart"));
    assert_eq!(tg.end_of("e"), Some("eend"));
    let r = tg.relation("estart", "eend", Effort::Direct);
    assert_eq!(r.stem, Stem::Before);
    assert_invariants(&tg);
}

#[test]
fn test_chain_extension_keeps_single_chain() {
    let mut tg = TimeGraph::new();
    tg.enter("p0", "before-1", "p1").unwrap();
    for i in 1..50 {
        let prev = format!("p{}", i);
        let next = format!("p{}", i + 1);
        tg.enter(prev.as_str(), "before-1", next.as_str()).unwrap();
    }
    assert_eq!(tg.stats().chains, 1);
    assert_eq!(
        tg.relation("p0", "p50", Effort::Direct).to_string(),
        "before-1"
    );
    assert_invariants(&tg);
}

#[test]
fn test_duration_bounds_stay_ordered() {
    let mut tg = TimeGraph::new();
    tg.register_event("a");
    tg.register_event("b");
    tg.enter3("a", "exactly-before", "b", 120.0).unwrap();
    tg.enter3("a", "at-least-before", "b", 60.0).unwrap();
    let (min, max) = tg.elapsed("a", "b", Effort::Search);
    assert!(min <= max);
    assert!(min >= 60.0);
    assert!(max <= 120.0);
    assert_invariants(&tg);
}
