//! Kernel Microbenchmarks
//!
//! Measures the two data-parallel primitives (C1 reduce, C2 scan) every
//! pipeline stage is built from. A single row is capped at `MAX_COLS` (the
//! two-level tree's max fan-in, §4.1); to see how each primitive scales past
//! one row's worth of work, row count is swept instead of row width.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use icp_core::kernels::{reduce, scan, MAX_COLS};
use rand::Rng;

// =============================================================================
// REDUCE
// =============================================================================

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("C1-Reduce");
    let mut rng = rand::thread_rng();
    let cols = MAX_COLS;

    for rows in [1usize, 8, 64, 512] {
        let data: Vec<f32> = (0..rows * cols).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
        group.throughput(Throughput::Elements((rows * cols) as u64));

        group.bench_with_input(BenchmarkId::new("sum_f32", rows), &data, |b, data| {
            b.iter(|| reduce::reduce_sum_f32(data, rows, cols).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("sum_f32_widening", rows), &data, |b, data| {
            b.iter(|| reduce::reduce_sum_f32_widening(data, rows, cols).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("min_f32", rows), &data, |b, data| {
            b.iter(|| reduce::reduce_min_f32(data, rows, cols).unwrap());
        });
    }
    group.finish();
}

// =============================================================================
// SCAN
// =============================================================================

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("C2-Scan");
    let mut rng = rand::thread_rng();
    let cols = MAX_COLS;

    for rows in [1usize, 8, 64, 512] {
        let data: Vec<i32> = (0..rows * cols).map(|_| rng.gen_range(-1000..1000)).collect();
        group.throughput(Throughput::Elements((rows * cols) as u64));

        group.bench_with_input(BenchmarkId::new("inclusive_scan_i32", rows), &data, |b, data| {
            b.iter(|| scan::inclusive_scan_i32(data, rows, cols).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("exclusive_scan_i32", rows), &data, |b, data| {
            b.iter(|| scan::exclusive_scan_i32(data, rows, cols).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce, bench_scan);
criterion_main!(benches);
