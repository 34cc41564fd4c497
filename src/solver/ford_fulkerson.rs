//! Ford-Fulkerson: depth-first augmenting paths
//!
//! Repeatedly finds an augmenting path by DFS and pushes the path minimum.
//! Arc exploration is in arc-index order, so tie-breaks are deterministic.
//! Termination relies on no residual-epsilon path remaining, which is exact
//! for integral capacities; the compatibility validator advises against
//! fractional capacities for this variant.

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

/// Depth-first search for an augmenting path; returns the arcs from source
/// to sink, or `None` when no path exists or the run tripped
fn find_path(residual: &ResidualGraph, run: &mut SolveRun<'_>) -> Option<Vec<u32>> {
    let n = residual.node_count();
    let source = residual.source();
    let sink = residual.sink();
    let epsilon = run.epsilon();

    let mut visited = vec![false; n];
    let mut parent = vec![u32::MAX; n];
    let mut cursor = vec![0usize; n];
    let mut stack = vec![source];
    visited[source as usize] = true;

    'outer: while let Some(&u) = stack.last() {
        if let Some(status) = run.trip() {
            run.stop(status);
            return None;
        }
        let arcs = residual.out_arcs(u);
        while cursor[u as usize] < arcs.len() {
            let arc = arcs[cursor[u as usize]];
            cursor[u as usize] += 1;
            let head = residual.arc(arc).head;
            if residual.residual(arc) > epsilon && !visited[head as usize] {
                visited[head as usize] = true;
                parent[head as usize] = arc;
                if head == sink {
                    return Some(backtrack_path(residual, &parent, source, sink));
                }
                stack.push(head);
                continue 'outer;
            }
        }
        stack.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::solver::{solve, tests::diamond};
    use crate::types::{Algorithm, Edge, Graph, Node, SolveContext, SolveOptions};

    #[test]
    fn test_bottleneck_chain() {
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(1, 2, 5.0))
            .add_edge(Edge::with_capacity(2, 3, 3.0));

        let result = solve(
            &graph,
            Algorithm::FordFulkerson,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 3.0);
        assert_eq!(result.edge_flows[0].flow, 3.0);
        assert_eq!(result.edge_flows[1].utilization, 1.0);
    }

    #[test]
    fn test_paths_recorded_when_requested() {
        let options = SolveOptions {
            return_paths: true,
            ..Default::default()
        };
        let result = solve(
            &diamond(),
            Algorithm::FordFulkerson,
            &options,
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.paths.len(), 2);
        for path in &result.paths {
            assert_eq!(path.nodes.first(), Some(&1));
            assert_eq!(path.nodes.last(), Some(&4));
            assert_eq!(path.amount, 10.0);
        }
    }

    #[test]
    fn test_self_loop_carries_no_flow() {
        let mut graph = Graph::new(1, 2);
        graph.add_node(Node::new(1)).add_node(Node::new(2));
        graph
            .add_edge(Edge::with_capacity(1, 1, 7.0))
            .add_edge(Edge::with_capacity(1, 2, 4.0));

        let result = solve(
            &graph,
            Algorithm::FordFulkerson,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 4.0);
        assert_eq!(result.edge_flows[0].flow, 0.0);
    }
}
