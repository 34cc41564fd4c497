//! Dinic: level graphs and blocking flow
//!
//! Each phase layers the residual graph by BFS from the source, then pushes
//! a blocking flow with an advance/retreat DFS driven by a per-node pointer
//! to the next unexplored out-arc (the current-arc optimization). Phases
//! repeat until the sink drops out of the layering.

use std::collections::VecDeque;

use super::SolveRun;
use crate::residual::ResidualGraph;
use crate::Result;

pub(crate) fn run(residual: &mut ResidualGraph, run: &mut SolveRun<'_>) -> Result<()> {
    let n = residual.node_count();
    let mut level = vec![u32::MAX; n];
    let mut next_arc = vec![0usize; n];

    loop {
        if !layer(residual, run, &mut level) || run.is_stopped() {
            break;
        }
        if !run.begin_iteration()? {
            break;
        }
        next_arc.fill(0);
        blocking_flow(residual, run, &mut level, &mut next_arc);
        if run.is_stopped() {
            break;
        }
    }
    Ok(())
}

/// BFS layering; returns whether the sink is reachable
fn layer(residual: &ResidualGraph, run: &mut SolveRun<'_>, level: &mut [u32]) -> bool {
    let source = residual.source();
    let sink = residual.sink();
    let epsilon = run.epsilon();

    level.fill(u32::MAX);
    level[source as usize] = 0;
    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        if let Some(status) = run.trip() {
            run.stop(status);
            return false;
        }
        for &arc in residual.out_arcs(u) {
            let head = residual.arc(arc).head;
            if residual.residual(arc) > epsilon && level[head as usize] == u32::MAX {
                level[head as usize] = level[u as usize] + 1;
                queue.push_back(head);
            }
        }
    }
    level[sink as usize] != u32::MAX
}

/// Saturate the current level graph
fn blocking_flow(
    residual: &mut ResidualGraph,
    run: &mut SolveRun<'_>,
    level: &mut [u32],
    next_arc: &mut [usize],
) {
    let source = residual.source();
    let sink = residual.sink();
    let epsilon = run.epsilon();

    'paths: loop {
        if let Some(status) = run.trip() {
            run.stop(status);
            return;
        }

        let mut path: Vec<u32> = Vec::new();
        let mut u = source;
        loop {
            if u == sink {
                let mut bottleneck = f64::INFINITY;
                for &arc in &path {
                    bottleneck = bottleneck.min(residual.residual(arc));
                }
                for &arc in &path {
                    residual.push(arc, bottleneck);
                }
                run.flow_value += bottleneck;
                run.record_path(residual, &path, bottleneck);
                continue 'paths;
            }

            let arcs = residual.out_arcs(u);
            let mut advanced = false;
            while next_arc[u as usize] < arcs.len() {
                let arc = arcs[next_arc[u as usize]];
                let head = residual.arc(arc).head;
                if residual.residual(arc) > epsilon
                    && level[head as usize] == level[u as usize].wrapping_add(1)
                {
                    path.push(arc);
                    u = head;
                    advanced = true;
                    break;
                }
                next_arc[u as usize] += 1;
            }

            if !advanced {
                if u == source {
                    // Every source-to-sink path in the level graph is blocked.
                    return;
                }
                // Dead end: prune the node and step back over the last arc.
                level[u as usize] = u32::MAX;
                let dead = path.pop().unwrap_or_default();
                u = residual.arc(ResidualGraph::paired(dead)).head;
                next_arc[u as usize] += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::{solve, tests::diamond};
    use crate::types::{Algorithm, Edge, Graph, Node, SolveContext, SolveOptions, SolverStatus};

    #[test]
    fn test_chain_saturates_in_one_phase() {
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
        assert_eq!(result.status, SolverStatus::Optimal);
        // A single chain is layered and saturated in one phase.
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_diamond() {
        let result = solve(
            &diamond(),
            Algorithm::Dinic,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 20.0);
        assert_eq!(result.total_cost, 40.0);
    }

    #[test]
    fn test_wide_grid() {
        // Two disjoint parallel chains plus a cross edge.
        let mut graph = Graph::new(0, 5);
        for id in 0..=5 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(0, 1, 4.0))
            .add_edge(Edge::with_capacity(0, 2, 3.0))
            .add_edge(Edge::with_capacity(1, 3, 4.0))
            .add_edge(Edge::with_capacity(2, 4, 5.0))
            .add_edge(Edge::with_capacity(1, 4, 2.0))
            .add_edge(Edge::with_capacity(3, 5, 3.0))
            .add_edge(Edge::with_capacity(4, 5, 6.0));

        let result = solve(
            &graph,
            Algorithm::Dinic,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 7.0);
    }
}
