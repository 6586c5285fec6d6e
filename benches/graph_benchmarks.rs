use criterion::{black_box, criterion_group, criterion_main, Criterion};
use timegraph::{Effort, TimeGraph};

fn build_chain(len: usize) -> TimeGraph {
    let mut tg = TimeGraph::new();
    for i in 1..len {
        let prev = format!("p{}", i - 1);
        let cur = format!("p{}", i);
        tg.enter(prev.as_str(), "before-1", cur.as_str()).unwrap();
    }
    tg
}

fn build_event_chain(len: usize) -> TimeGraph {
    let mut tg = TimeGraph::new();
    tg.register_event("e0");
    for i in 1..len {
        let prev = format!("e{}", i - 1);
        let cur = format!("e{}", i);
        tg.register_event(&cur);
        tg.enter(prev.as_str(), "before-1", cur.as_str()).unwrap();
    }
    tg
}

fn benchmark_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry");

    group.bench_function("chain_append_100", |b| {
        b.iter(|| build_chain(black_box(100)))
    });

    group.bench_function("register_and_order_events_50", |b| {
        b.iter(|| build_event_chain(black_box(50)))
    });

    group.bench_function("between_insertions_50", |b| {
        b.iter(|| {
            let mut tg = TimeGraph::new();
            tg.enter("a", "before", "c").unwrap();
            let mut prev = "c".to_string();
            for i in 0..50 {
                let name = format!("m{}", i);
                tg.enter3(name.as_str(), "between", "a", prev.as_str())
                    .unwrap();
                prev = name;
            }
            tg
        })
    });

    group.finish();
}

fn benchmark_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let chain = build_chain(1000);
    group.bench_function("same_chain_relation", |b| {
        b.iter(|| chain.relation(black_box("p10"), black_box("p990"), Effort::Direct))
    });

    let events = build_event_chain(50);
    group.bench_function("cross_chain_relation_search", |b| {
        b.iter(|| events.relation(black_box("e0"), black_box("e49"), Effort::Search))
    });

    group.bench_function("elapsed_search", |b| {
        b.iter(|| events.elapsed(black_box("e0"), black_box("e10"), Effort::Search))
    });

    group.finish();
}

criterion_group!(benches, benchmark_entry, benchmark_query);
criterion_main!(benches);
