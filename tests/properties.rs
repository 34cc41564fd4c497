//! Property-based invariants for the solver engine and validators

use proptest::prelude::*;

use flowgrid_optimization::prelude::*;
use flowgrid_optimization::validation::Severity;

const TOLERANCE: f64 = 1e-6;

/// Random graphs with a guaranteed source-to-sink chain, integral
/// capacities, and non-negative integral costs. Extra edges may be parallel
/// edges or self-loops.
fn arb_graph() -> impl Strategy<Value = Graph> {
    (2usize..8)
        .prop_flat_map(|n| {
            (
                Just(n),
                proptest::collection::vec(0u32..20, n - 1),
                proptest::collection::vec((0..n, 0..n, 0u32..20, 0u32..5), 0..12),
            )
        })
        .prop_map(|(n, chain, extras)| {
            let mut graph = Graph::new(0, (n - 1) as i64);
            for id in 0..n {
                graph.add_node(Node::new(id as i64));
            }
            for (i, cap) in chain.iter().enumerate() {
                graph.add_edge(Edge::new(i as i64, (i + 1) as i64, f64::from(*cap), 1.0));
            }
            for (from, to, cap, cost) in extras {
                graph.add_edge(Edge::new(
                    from as i64,
                    to as i64,
                    f64::from(cap),
                    f64::from(cost),
                ));
            }
            graph
        })
}

fn graph_with_flows(graph: &Graph, result: &FlowResult) -> Graph {
    let mut assigned = graph.clone();
    for (edge, flow) in assigned.edges.iter_mut().zip(&result.edge_flows) {
        edge.current_flow = flow.flow;
    }
    assigned
}

proptest! {
    /// `0 <= flow <= capacity` on every edge, for every variant
    #[test]
    fn prop_capacity_invariant(graph in arb_graph()) {
        for algorithm in Algorithm::ALL {
            let result = solve(
                &graph,
                algorithm,
                &SolveOptions::default(),
                &SolveContext::new(),
            )
            .unwrap();
            for (edge, flow) in graph.edges.iter().zip(&result.edge_flows) {
                prop_assert!(flow.flow >= -TOLERANCE, "{algorithm}: negative flow");
                prop_assert!(
                    flow.flow <= edge.capacity + TOLERANCE,
                    "{algorithm}: flow {} over capacity {}",
                    flow.flow,
                    edge.capacity
                );
            }
        }
    }

    /// Interior nodes conserve flow, and the flow validator agrees
    #[test]
    fn prop_conservation_invariant(graph in arb_graph()) {
        for algorithm in Algorithm::ALL {
            let result = solve(
                &graph,
                algorithm,
                &SolveOptions::default(),
                &SolveContext::new(),
            )
            .unwrap();
            let assigned = graph_with_flows(&graph, &result);
            let check = validate_flow(
                &assigned,
                &FlowCheckOptions {
                    epsilon: TOLERANCE,
                    expected_max_flow: Some(result.max_flow),
                },
            );
            prop_assert!(
                check.is_valid,
                "{algorithm}: {:?}",
                check.violations
            );
        }
    }

    /// Every max-flow variant agrees on the flow value, and the min-cost
    /// variant never pays more than any of them
    #[test]
    fn prop_algorithm_agreement(graph in arb_graph()) {
        let reference = solve(
            &graph,
            Algorithm::EdmondsKarp,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();

        let mut cheapest_max_flow_cost = f64::INFINITY;
        for algorithm in [
            Algorithm::FordFulkerson,
            Algorithm::Dinic,
            Algorithm::PushRelabel,
        ] {
            let result = solve(
                &graph,
                algorithm,
                &SolveOptions::default(),
                &SolveContext::new(),
            )
            .unwrap();
            prop_assert!(
                (result.max_flow - reference.max_flow).abs() <= TOLERANCE,
                "{algorithm}: {} vs {}",
                result.max_flow,
                reference.max_flow
            );
            cheapest_max_flow_cost = cheapest_max_flow_cost.min(result.total_cost);
        }
        cheapest_max_flow_cost = cheapest_max_flow_cost.min(reference.total_cost);

        let min_cost = solve(
            &graph,
            Algorithm::SuccessiveShortestPaths,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        prop_assert!((min_cost.max_flow - reference.max_flow).abs() <= TOLERANCE);
        prop_assert!(
            min_cost.total_cost <= cheapest_max_flow_cost + TOLERANCE,
            "min-cost paid {} vs {}",
            min_cost.total_cost,
            cheapest_max_flow_cost
        );
    }

    /// Re-solving with the same options is bit-identical
    #[test]
    fn prop_idempotent_resolve(graph in arb_graph()) {
        for algorithm in Algorithm::ALL {
            let options = SolveOptions::default();
            let first = solve(&graph, algorithm, &options, &SolveContext::new()).unwrap();
            let second = solve(&graph, algorithm, &options, &SolveContext::new()).unwrap();
            prop_assert_eq!(first.max_flow, second.max_flow);
            prop_assert_eq!(first.total_cost, second.total_cost);
            prop_assert_eq!(&first.edge_flows, &second.edge_flows);
        }
    }

    /// Errors found at a lower level survive at every higher level
    #[test]
    fn prop_validation_monotonic(graph in arb_graph(), corrupt in any::<bool>()) {
        let mut graph = graph;
        if corrupt && !graph.edges.is_empty() {
            graph.edges[0].capacity = -1.0;
        }

        let levels = [
            ValidationLevel::Basic,
            ValidationLevel::Standard,
            ValidationLevel::Strict,
            ValidationLevel::Full,
        ];
        let reports: Vec<_> = levels
            .iter()
            .map(|&level| GraphValidator::new(level).validate(&graph))
            .collect();

        for window in reports.windows(2) {
            for issue in &window[0].errors {
                prop_assert!(
                    window[1].errors.contains(issue),
                    "issue {:?} lost at deeper level",
                    issue.code
                );
            }
        }
        for report in &reports {
            for issue in &report.errors {
                prop_assert_eq!(issue.severity, Severity::Error);
            }
        }
    }
}
