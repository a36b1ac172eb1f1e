use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use connect_edges::{ConnectState, EH, EvenMode, Mesh, Params, Preferences, Session};
use glam::dvec2;

/// Square grid of quads with every edge along the x axis selected.
fn selected_grid(n: u32) -> Mesh {
    let mut mesh = Mesh::quad_grid(n, n, dvec2(n as f64, n as f64)).unwrap();
    let vi = |i: u32, j: u32| j * (n + 1) + i;
    for j in 0..=n {
        for i in 0..n {
            let e = mesh.find_edge(vi(i, j).into(), vi(i + 1, j).into()).unwrap();
            mesh.select_edge(e, true).unwrap();
        }
    }
    mesh
}

// Topology Benchmarks
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for n in [8u32, 32] {
        let base = selected_grid(n);
        let selected: std::collections::BTreeSet<EH> = base.selected_edges().collect();
        for segments in [1u32, 4] {
            group.bench_with_input(
                BenchmarkId::new(format!("grid_{n}"), segments),
                &segments,
                |b, &segments| {
                    b.iter(|| {
                        let mut mesh = base.clone();
                        let state =
                            ConnectState::build(&mut mesh, black_box(&selected), segments).unwrap();
                        black_box((mesh, state));
                    });
                },
            );
        }
    }

    group.finish();
}

// Session Benchmarks
fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let params = Params {
        segments: 4,
        pinch: 0,
        even: EvenMode::In,
    };
    let mut session = Session::new(selected_grid(32), params, &Preferences::default());
    session.rebuild_topology().unwrap();

    // Dragging the pinch only moves vertices.
    group.bench_function("reposition_grid_32", |b| {
        let mut pinch = 0;
        b.iter(|| {
            pinch = (pinch + 100 + 7) % 200 - 100;
            session.set_pinch(black_box(pinch)).unwrap();
        });
    });

    // Changing the segments restores the snapshot and rebuilds.
    group.bench_function("rebuild_grid_32", |b| {
        b.iter(|| {
            session.rebuild_topology().unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_session);
criterion_main!(benches);
