//! Criterion benchmarks for the word algebra.
//! Focus sizes: word length n in {10, 100, 1000, 10000}.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use traintrack::prelude::*;
use traintrack::word::rand::random_reduced;

fn raw_letters(n: usize, rank: usize, seed: u64) -> Vec<Letter> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Letter(rng.gen_range(0..2 * rank as u32)))
        .collect()
}

fn bench_words(c: &mut Criterion) {
    let alphabet = Alphabet::from_chars("abc").unwrap();
    let mut group = c.benchmark_group("word");
    for &n in &[10usize, 100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::new("reduce", n), &n, |b, &n| {
            b.iter_batched(
                || raw_letters(n, 3, 43),
                |data| {
                    let _w = Word::from_letters(&alphabet, data).unwrap();
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("product_inverse", n), &n, |b, &n| {
            let mut rng = StdRng::seed_from_u64(44);
            let u = random_reduced(&alphabet, n, &mut rng);
            b.iter(|| {
                let v = u.product(&u.inverse());
                assert!(v.is_empty());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_words);
criterion_main!(benches);
