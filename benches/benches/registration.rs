//! Full-Pipeline Registration Benchmark
//!
//! Measures the cost of a single `IcpStep` iteration and of a full
//! `Session::register` convergence run, across both rotation-solver
//! variants and both weighting schemes (§2, C11/C12).

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use icp_core::{
    PointCloud, RotationSolver, Session, SessionOptionsBuilder, Weighting, CLOUD_HEIGHT,
    CLOUD_WIDTH,
};
use rand::{Rng, SeedableRng};

fn synthetic_cloud(seed: u64) -> PointCloud {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(CLOUD_WIDTH * CLOUD_HEIGHT * 8);
    for row in 0..CLOUD_HEIGHT {
        for col in 0..CLOUD_WIDTH {
            let x = col as f32;
            let y = row as f32;
            let z = 500.0 + rng.gen_range(-5.0f32..5.0);
            data.extend_from_slice(&[x, y, z, 1.0, (row % 255) as f32, (col % 255) as f32, 128.0, 1.0]);
        }
    }
    PointCloud::from_row_major_f32(&data)
}

fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("C11-IcpStep");
    let fixed = synthetic_cloud(1);
    let moving = synthetic_cloud(2);

    for (solver, weighting, label) in [
        (RotationSolver::Svd, Weighting::Regular, "svd_regular"),
        (RotationSolver::Svd, Weighting::Weighted, "svd_weighted"),
        (RotationSolver::PowerMethod, Weighting::Regular, "power_regular"),
        (RotationSolver::PowerMethod, Weighting::Weighted, "power_weighted"),
    ] {
        let options = SessionOptionsBuilder::new()
            .rotation_solver(solver)
            .weighting(weighting)
            .max_iterations(1)
            .build()
            .unwrap();

        group.bench_function(BenchmarkId::new("step", label), |b| {
            b.iter_batched(
                || {
                    let mut session = Session::new(&fixed, options).unwrap();
                    session.set_moving(&moving);
                    session
                },
                |mut session| session.register().unwrap(),
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_full_convergence(c: &mut Criterion) {
    let mut group = c.benchmark_group("C12-Convergence");
    group.sample_size(10);
    let fixed = synthetic_cloud(3);

    let options = SessionOptionsBuilder::new().build().unwrap();
    group.bench_function("register_to_convergence", |b| {
        b.iter_batched(
            || {
                let mut session = Session::new(&fixed, options).unwrap();
                session.set_moving(&fixed);
                session
            },
            |mut session| session.register().unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_single_step, bench_full_convergence);
criterion_main!(benches);
