//! Criterion benchmarks for the analyzer pipeline on small train tracks.

use criterion::{criterion_group, criterion_main, Criterion};
use traintrack::prelude::*;

fn bench_analyzer(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzer");

    group.bench_function("tribonacci_pnps", |b| {
        let f = TrainTrackMap::from_edge_map("a->ab,b->ac,c->a").unwrap();
        b.iter(|| {
            let pnps = f.periodic_nielsen_paths().unwrap();
            pnps.len()
        })
    });

    group.bench_function("tribonacci_is_iwip", |b| {
        b.iter(|| {
            let mut f = TrainTrackMap::from_edge_map("a->ab,b->ac,c->a").unwrap();
            assert!(f.is_iwip().unwrap());
        })
    });

    group.bench_function("perron_oracle", |b| {
        let f = TrainTrackMap::from_edge_map("a->ab,b->ac,c->a").unwrap();
        let m = f.transition_matrix();
        b.iter(|| {
            let p = Perron::compute(&m).unwrap();
            p.eigenvalue_approx()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_analyzer);
criterion_main!(benches);
