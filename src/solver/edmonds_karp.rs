//! Edmonds-Karp: breadth-first shortest augmenting paths
//!
//! Same augmentation loop as Ford-Fulkerson, but each path is shortest by
//! edge count, bounding the iteration count at `O(V*E)` with `O(E)` work
//! per iteration.

use std::collections::VecDeque;

use super::{augment, backtrack_path, SolveRun};
use crate::residual::ResidualGraph;
use crate::Result;

pub(crate) fn run(residual: &mut ResidualGraph, run: &mut SolveRun<'_>) -> Result<()> {
    loop {
        let Some(path) = find_path(residual, run) else {
            break;
        };
        if !run.begin_iteration()? {
            break;
        }
        augment(residual, run, &path);
    }
    Ok(())
}

/// Breadth-first search for the shortest augmenting path
fn find_path(residual: &ResidualGraph, run: &mut SolveRun<'_>) -> Option<Vec<u32>> {
    let n = residual.node_count();
    let source = residual.source();
    let sink = residual.sink();
    let epsilon = run.epsilon();

    let mut visited = vec![false; n];
    let mut parent = vec![u32::MAX; n];
    let mut queue = VecDeque::new();
    visited[source as usize] = true;
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        if let Some(status) = run.trip() {
            run.stop(status);
            return None;
        }
        for &arc in residual.out_arcs(u) {
            let head = residual.arc(arc).head;
            if residual.residual(arc) > epsilon && !visited[head as usize] {
                visited[head as usize] = true;
                parent[head as usize] = arc;
                if head == sink {
                    return Some(backtrack_path(residual, &parent, source, sink));
                }
                queue.push_back(head);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::solver::{solve, tests::diamond};
    use crate::types::{Algorithm, Edge, Graph, Node, SolveContext, SolveOptions, SolverStatus};

    #[test]
    fn test_diamond_flow_and_cost() {
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
        assert_eq!(result.iterations, 2);
    }

    #[test]
    fn test_reroute_through_reverse_arc() {
        // The classic network where a greedy first path must be partially
        // undone through a reverse arc to reach the optimum.
        let mut graph = Graph::new(0, 3);
        for id in 0..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(0, 1, 10.0))
            .add_edge(Edge::with_capacity(0, 2, 10.0))
            .add_edge(Edge::with_capacity(1, 2, 1.0))
            .add_edge(Edge::with_capacity(1, 3, 10.0))
            .add_edge(Edge::with_capacity(2, 3, 10.0));

        let result = solve(
            &graph,
            Algorithm::EdmondsKarp,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 20.0);
    }

    #[test]
    fn test_idempotent_across_resolves() {
        let graph = diamond();
        let options = SolveOptions::default();
        let first = solve(
            &graph,
            Algorithm::EdmondsKarp,
            &options,
            &SolveContext::new(),
        )
        .unwrap();
        let second = solve(
            &graph,
            Algorithm::EdmondsKarp,
            &options,
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(first.max_flow, second.max_flow);
        assert_eq!(first.total_cost, second.total_cost);
        assert_eq!(first.edge_flows, second.edge_flows);
    }
}
