//! Criterion benchmarks for whole solver runs.

use std::hint::black_box;

use calor_bench::{profile, reference_profile};
use calor_engine::{run_distributed, run_sequential, SimulationParams};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Benchmark: sequential reference run of the 256x256 profile.
fn bench_sequential_256(c: &mut Criterion) {
    let (material, params) = reference_profile();

    c.bench_function("sequential_256", |b| {
        b.iter(|| {
            let out = run_sequential(&material, &params).unwrap();
            black_box(out.middle_column_avg);
        });
    });
}

/// Benchmark: distributed runs of the 256x256 profile at several rank counts.
fn bench_distributed_256(c: &mut Criterion) {
    let mut group = c.benchmark_group("distributed_256");
    group.sample_size(20);
    for ranks in [1usize, 2, 4, 8, 16] {
        let (material, base) = profile(256, ranks, 20);
        group.bench_with_input(BenchmarkId::from_parameter(ranks), &base, |b, params| {
            b.iter(|| {
                let out = run_distributed(&material, params).unwrap();
                black_box(out.middle_column_avg);
            });
        });
    }
    group.finish();
}

/// Benchmark: four ranks with two interior threads each.
fn bench_distributed_hybrid(c: &mut Criterion) {
    let (material, base) = reference_profile();
    let params = SimulationParams {
        threads_per_rank: 2,
        ..base
    };

    c.bench_function("distributed_256_4x2", |b| {
        b.iter(|| {
            let out = run_distributed(&material, &params).unwrap();
            black_box(out.middle_column_avg);
        });
    });
}

criterion_group!(
    benches,
    bench_sequential_256,
    bench_distributed_256,
    bench_distributed_hybrid
);
criterion_main!(benches);
