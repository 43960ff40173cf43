//! Benchmarks for the local numerical kernels.
//!
//! Measures the single-worker costs that dominate a distributed solve:
//! - column-block matrix-vector kernel
//! - local partial dot product

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spire_collective::Rank;
use spire_eigen::{hilbert_entry, local_dot, BlockLayout, ColumnBlock};

/// Benchmark the column-block product kernel at different problem sizes.
fn bench_block_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_apply");

    for &n in &[64usize, 256, 1024] {
        let layout = BlockLayout::new(n, 1).expect("layout");
        let block = ColumnBlock::from_entries(&layout, Rank(0), hilbert_entry);
        let shard = vec![1.0 / (n as f64).sqrt(); n];
        let mut out = vec![0.0; n];

        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| block.apply_into(black_box(&shard), &mut out))
        });
    }
    group.finish();
}

/// Benchmark the left-to-right partial dot product.
fn bench_local_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_dot");

    for &len in &[1_024usize, 65_536, 1_048_576] {
        let a: Vec<f64> = (0..len).map(|i| 1.0 + (i % 7) as f64).collect();
        let b: Vec<f64> = (0..len).map(|i| 0.5 - (i % 5) as f64).collect();

        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |bench, _| {
            bench.iter(|| local_dot(black_box(&a), black_box(&b)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_block_apply, bench_local_dot);
criterion_main!(benches);
