//! Criterion micro-benchmarks for the stencil kernel and strip packing.

use std::hint::black_box;

use calor_bench::reference_profile;
use calor_engine::kernel::worker_pool;
use calor_engine::sequential::computed_region;
use calor_engine::{Cooling, Stencil};
use calor_grid::{Partition, Region};
use criterion::{criterion_group, criterion_main, Criterion};

/// Benchmark: one full sweep of a 256x256 grid on the calling thread.
fn bench_sweep_256(c: &mut Criterion) {
    let (material, params) = reference_profile();
    let edge = material.edge_size();
    let region = computed_region(edge);
    let stencil = Stencil {
        temp: material.init_temp(),
        params: material.domain_params(),
        map: material.domain_map(),
        stride: edge,
        cooling: Cooling {
            air_flow_rate: params.air_flow_rate,
            cooler_temp: material.cooler_temp(),
        },
    };
    let mut out = material.init_temp().to_vec();

    c.bench_function("sweep_256", |b| {
        b.iter(|| {
            stencil.sweep(region, &mut out);
            black_box(&out);
        });
    });
}

/// Benchmark: the same sweep split across a 4-thread pool.
fn bench_sweep_256_pool4(c: &mut Criterion) {
    let (material, params) = reference_profile();
    let edge = material.edge_size();
    let region = computed_region(edge);
    let pool = worker_pool(4, "bench").unwrap();
    let stencil = Stencil {
        temp: material.init_temp(),
        params: material.domain_params(),
        map: material.domain_map(),
        stride: edge,
        cooling: Cooling {
            air_flow_rate: params.air_flow_rate,
            cooler_temp: material.cooler_temp(),
        },
    };
    let mut out = material.init_temp().to_vec();

    c.bench_function("sweep_256_pool4", |b| {
        b.iter(|| {
            stencil.sweep_parallel(region, &mut out, pool.as_ref());
            black_box(&out);
        });
    });
}

/// Benchmark: pack then unpack every halo strip of a 128x128 tile.
fn bench_strip_pack_unpack(c: &mut Criterion) {
    let partition = Partition::new(512, 16).unwrap();
    let tile = partition.tile(calor_core::Rank(5)).unwrap();
    let layout = tile.layout();
    let mut data: Vec<f32> = (0..layout.padded_len()).map(|k| k as f32).collect();
    let strips: Vec<(Region, Region)> = tile.neighbours().iter().map(|n| (n.send, n.recv)).collect();

    c.bench_function("strip_pack_unpack_128", |b| {
        b.iter(|| {
            for (send, recv) in &strips {
                let packed = send.pack(&data, layout.stride());
                recv.unpack(&packed, &mut data, layout.stride());
            }
            black_box(&data);
        });
    });
}

criterion_group!(
    benches,
    bench_sweep_256,
    bench_sweep_256_pool4,
    bench_strip_pack_unpack
);
criterion_main!(benches);
