//! # Arm Model Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ctrl_lib::arm_ctrl::{graph::WeightedGraph, ArmCtrlParams, ArmModel, ArmNode, JointAngles};

fn arm_model_benchmark(c: &mut Criterion) {
    // ---- Build the model ----

    let params: ArmCtrlParams =
        util::params::parse(include_str!("../../params/arm_ctrl.toml")).unwrap();
    let model = ArmModel::new(params).unwrap();

    // A larger grid graph to give Dijkstra some work
    let mut grid = WeightedGraph::new();
    const SIDE: u32 = 30;
    for x in 0..SIDE {
        for y in 0..SIDE {
            let node = x * SIDE + y;
            if x + 1 < SIDE {
                grid.connect_bidirectional(node, node + SIDE, 1.0 + (y % 3) as f64, None);
            }
            if y + 1 < SIDE {
                grid.connect_bidirectional(node, node + 1, 1.0 + (x % 5) as f64, None);
            }
        }
    }

    // ---- Benchmarks ----

    c.bench_function("WeightedGraph::shortest_path_tree", |b| {
        b.iter(|| grid.shortest_path_tree(black_box(0)).unwrap())
    });

    // First call fills the cache, the rest are lookups
    grid.optimal_path(0, SIDE * SIDE - 1).unwrap();
    c.bench_function("WeightedGraph::optimal_path::cached", |b| {
        b.iter(|| grid.optimal_path(black_box(0), black_box(SIDE * SIDE - 1)).unwrap())
    });

    c.bench_function("ArmConfigSpace::optimal_path", |b| {
        b.iter(|| {
            model
                .space()
                .optimal_path(black_box(ArmNode::GroundPickup), black_box(ArmNode::AmpOuttake))
                .unwrap()
        })
    });

    c.bench_function("ArmConfigSpace::nearest_node", |b| {
        b.iter(|| {
            model
                .space()
                .nearest_node(black_box(&JointAngles::new(62.0, -71.0)))
                .unwrap()
        })
    });

    c.bench_function("ArmKinematics::classify", |b| {
        b.iter(|| {
            model
                .kinematics()
                .classify(black_box(JointAngles::new(64.0, 0.0)))
        })
    });
}

criterion_group!(benches, arm_model_benchmark);
criterion_main!(benches);
