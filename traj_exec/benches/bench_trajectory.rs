//! # Trajectory Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use traj_lib::{
    metrics,
    model::{RobotModel, RobotModelParams},
    state::RobotState,
    trajectory::RobotTrajectory,
};

fn trajectory_benchmark(c: &mut Criterion) {
    // ---- Build a long trajectory of the bench arm ----

    let params: RobotModelParams =
        util::params::from_str(include_str!("../../params/model.toml")).unwrap();
    let model = Arc::new(RobotModel::from_params(params).unwrap());

    let mut traj = RobotTrajectory::new(model.clone());
    for i in 0..2000 {
        let t = i as f64 * 0.01;
        let mut s = RobotState::new(model.clone());
        s.set_variable_positions(&[
            t,
            0.5 * t.sin(),
            -0.8 * t.cos(),
            0.2 * (2.0 * t).sin(),
            3.0 * t,
            0.02,
        ])
        .unwrap();
        traj.add_suffix_waypoint(s, 0.01);
    }

    let duration = traj.duration();

    c.bench_function("RobotTrajectory::find_waypoint_indices_for_duration_after_start", |b| {
        b.iter(|| traj.find_waypoint_indices_for_duration_after_start(black_box(0.73 * duration)))
    });

    c.bench_function("RobotTrajectory::state_at_duration_from_start", |b| {
        b.iter(|| traj.state_at_duration_from_start(black_box(0.73 * duration)))
    });

    c.bench_function("metrics::smoothness", |b| {
        b.iter(|| metrics::smoothness(black_box(&traj)))
    });

    c.bench_function("RobotTrajectory::unwind", |b| {
        b.iter(|| traj.deep_copy().unwind().len())
    });
}

criterion_group!(benches, trajectory_benchmark);
criterion_main!(benches);
