//! Benchmarks for the similarity scan
//!
//! Run with: cargo bench --package similarity
//!
//! Scans a synthetic 10k × 64 index, the size of a merged movie corpus.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use similarity::{EmbeddingIndex, EmbeddingMatrix};

fn build_index(rows: usize, dim: usize) -> EmbeddingIndex {
    let mut rng = StdRng::seed_from_u64(42);
    let data = (0..rows)
        .map(|_| (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect())
        .collect();
    EmbeddingIndex::new(EmbeddingMatrix::from_rows(data, dim).expect("well-formed matrix"))
}

fn bench_top_k_for_row(c: &mut Criterion) {
    let index = build_index(10_000, 64);

    c.bench_function("top_k_for_row_10k_x_64", |b| {
        b.iter(|| {
            let hits = index.top_k_for_row(black_box(1234), black_box(10)).unwrap();
            black_box(hits)
        })
    });
}

fn bench_top_k_vector(c: &mut Criterion) {
    let index = build_index(10_000, 64);
    let query = vec![0.25f32; 64];

    c.bench_function("top_k_vector_10k_x_64", |b| {
        b.iter(|| {
            let hits = index.top_k(black_box(&query), black_box(5), None).unwrap();
            black_box(hits)
        })
    });
}

criterion_group!(benches, bench_top_k_for_row, bench_top_k_vector);
criterion_main!(benches);
