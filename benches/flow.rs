//! Solver benchmarks over layered random networks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use flowgrid_optimization::prelude::*;

/// A layered network: `layers` ranks of `width` nodes, dense edges between
/// adjacent ranks with random capacities and costs
fn layered_network(layers: usize, width: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let node_id = |layer: usize, slot: usize| (1 + layer * width + slot) as i64;

    let source = 0i64;
    let sink = node_id(layers, 0);
    let mut graph = Graph::new(source, sink);
    graph.add_node(Node::new(source));
    for layer in 0..layers {
        for slot in 0..width {
            graph.add_node(Node::new(node_id(layer, slot)));
        }
    }
    graph.add_node(Node::new(sink));

    for slot in 0..width {
        graph.add_edge(Edge::new(
            source,
            node_id(0, slot),
            rng.gen_range(1..100) as f64,
            rng.gen_range(1..10) as f64,
        ));
    }
    for layer in 0..layers.saturating_sub(1) {
        for a in 0..width {
            for b in 0..width {
                graph.add_edge(Edge::new(
                    node_id(layer, a),
                    node_id(layer + 1, b),
                    rng.gen_range(1..100) as f64,
                    rng.gen_range(1..10) as f64,
                ));
            }
        }
    }
    for slot in 0..width {
        graph.add_edge(Edge::new(
            node_id(layers - 1, slot),
            sink,
            rng.gen_range(1..100) as f64,
            rng.gen_range(1..10) as f64,
        ));
    }
    graph
}

fn bench_max_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("max_flow");
    for &(layers, width) in &[(4usize, 8usize), (8, 16)] {
        let graph = layered_network(layers, width, 42);
        for algorithm in [
            Algorithm::EdmondsKarp,
            Algorithm::Dinic,
            Algorithm::PushRelabel,
        ] {
            group.bench_with_input(
                BenchmarkId::new(algorithm.as_str(), format!("{layers}x{width}")),
                &graph,
                |b, graph| {
                    b.iter(|| {
                        solve(
                            black_box(graph),
                            algorithm,
                            &SolveOptions::default(),
                            &SolveContext::new(),
                        )
                        .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_min_cost(c: &mut Criterion) {
    let graph = layered_network(4, 8, 7);
    c.bench_function("min_cost_flow/4x8", |b| {
        b.iter(|| {
            solve(
                black_box(&graph),
                Algorithm::SuccessiveShortestPaths,
                &SolveOptions::default(),
                &SolveContext::new(),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_max_flow, bench_min_cost);
criterion_main!(benches);
