//! End-to-end scenarios with literal inputs and expected outputs

use flowgrid_optimization::analytics::EfficiencyGrade;
use flowgrid_optimization::prelude::*;
use flowgrid_optimization::solver::StreamStatus;
use flowgrid_optimization::Error;

fn diamond() -> Graph {
    let mut graph = Graph::new(1, 4);
    for id in 1..=4 {
        graph.add_node(Node::new(id));
    }
    graph
        .add_edge(Edge::new(1, 2, 10.0, 1.0))
        .add_edge(Edge::new(1, 3, 10.0, 1.0))
        .add_edge(Edge::new(2, 4, 10.0, 1.0))
        .add_edge(Edge::new(3, 4, 10.0, 1.0));
    graph
}

#[test]
fn scenario_diamond_max_flow() {
    let result = solve(
        &diamond(),
        Algorithm::EdmondsKarp,
        &SolveOptions::default(),
        &SolveContext::new(),
    )
    .unwrap();
    assert_eq!(result.max_flow, 20.0);
    assert_eq!(result.total_cost, 40.0);
    assert_eq!(result.status, SolverStatus::Optimal);
}

#[test]
fn scenario_chain_dinic_single_phase() {
    let mut graph = Graph::new(1, 5);
    for id in 1..=5 {
        graph.add_node(Node::new(id));
    }
    for (from, to) in [(1, 2), (2, 3), (3, 4), (4, 5)] {
        graph.add_edge(Edge::with_capacity(from, to, 100.0));
    }

    let result = solve(
        &graph,
        Algorithm::Dinic,
        &SolveOptions::default(),
        &SolveContext::new(),
    )
    .unwrap();
    assert_eq!(result.max_flow, 100.0);
    assert_eq!(result.iterations, 1);
}

#[test]
fn scenario_negative_cost_rejected_by_ssp() {
    let mut graph = diamond();
    graph.edges[3].cost = -2.0;

    let err = solve(
        &graph,
        Algorithm::SuccessiveShortestPaths,
        &SolveOptions::default(),
        &SolveContext::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::AlgorithmMismatch(_)));
}

#[test]
fn scenario_single_bottleneck_high_severity() {
    let mut graph = Graph::new(1, 2);
    graph.add_node(Node::new(1)).add_node(Node::new(2));
    graph.add_edge(Edge::with_capacity(1, 2, 100.0).with_flow(95.0));

    let report = find_bottlenecks(&graph, &BottleneckOptions::default());
    assert_eq!(report.bottlenecks.len(), 1);
    assert_eq!(
        report.bottlenecks[0].severity,
        flowgrid_optimization::analytics::BottleneckSeverity::High
    );
}

#[test]
fn scenario_efficiency_grade_boundaries() {
    for (flow, expected) in [
        (90.0, EfficiencyGrade::A),
        (70.0, EfficiencyGrade::B),
        (50.0, EfficiencyGrade::C),
        (30.0, EfficiencyGrade::D),
        (10.0, EfficiencyGrade::F),
    ] {
        let mut graph = Graph::new(1, 2);
        graph.add_node(Node::new(1)).add_node(Node::new(2));
        graph.add_edge(Edge::with_capacity(1, 2, 100.0).with_flow(flow));

        let report = grade_efficiency(&graph);
        assert_eq!(report.grade, expected, "flow {flow}");
    }
}

#[test]
fn scenario_streaming_frames_arrive_in_order() {
    let mut frames: Vec<ProgressFrame> = Vec::new();
    let result = solve_with_progress(
        &diamond(),
        Algorithm::EdmondsKarp,
        &SolveOptions::default(),
        &SolveContext::new(),
        &mut |frame: ProgressFrame| {
            frames.push(frame);
            true
        },
    )
    .unwrap();

    assert_eq!(result.max_flow, 20.0);
    for window in frames.windows(2) {
        assert!(window[0].iteration <= window[1].iteration);
        assert!(window[0].partial_max_flow <= window[1].partial_max_flow);
    }
    for frame in &frames {
        assert_eq!(frame.status, StreamStatus::InProgress);
    }
}

#[test]
fn scenario_consumer_abandonment_cancels() {
    let mut emitted = 0u32;
    let err = solve_with_progress(
        &diamond(),
        Algorithm::EdmondsKarp,
        &SolveOptions::default(),
        &SolveContext::new(),
        &mut |_frame: ProgressFrame| {
            emitted += 1;
            false
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Cancelled { .. }));
    assert_eq!(emitted, 1);
}
