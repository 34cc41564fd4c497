//! Push-relabel with a FIFO active queue and gap relabeling
//!
//! Initialization saturates every source-incident arc and lifts the source
//! to height `|V|`. Active nodes are discharged in FIFO order; a discharge
//! pushes on admissible arcs (`height[u] == height[v] + 1`, positive
//! residual) and relabels when the current-arc pointer runs out. When some
//! height below `|V|` loses its last holder, every node above the gap is
//! lifted to `|V| + 1`, which bans it from further pushes toward the sink.
//!
//! Intermediate states are preflows, not flows, so a run that trips on its
//! deadline or token resets to the zero flow: that is the latest state that
//! satisfies conservation.

use std::collections::VecDeque;

use super::SolveRun;
use crate::residual::ResidualGraph;
use crate::types::Flow;
use crate::Result;

pub(crate) fn run(residual: &mut ResidualGraph, run: &mut SolveRun<'_>) -> Result<()> {
    let n = residual.node_count();
    let source = residual.source();
    let sink = residual.sink();
    let epsilon = run.epsilon();

    let mut labels = Labels::new(n, source);
    let mut excess: Vec<Flow> = vec![0.0; n];
    let mut current = vec![0usize; n];
    let mut queue: VecDeque<u32> = VecDeque::new();
    let mut in_queue = vec![false; n];

    // Saturate every source-incident arc.
    let source_arcs: Vec<u32> = residual.out_arcs(source).to_vec();
    for arc in source_arcs {
        let cap = residual.residual(arc);
        if cap > epsilon {
            let head = residual.arc(arc).head;
            residual.push(arc, cap);
            excess[head as usize] += cap;
            excess[source as usize] -= cap;
            if head != source && head != sink && !in_queue[head as usize] {
                queue.push_back(head);
                in_queue[head as usize] = true;
            }
        }
    }

    while let Some(u) = queue.pop_front() {
        in_queue[u as usize] = false;
        if !run.begin_iteration()? {
            // A preflow is not a flow; fall back to the zero flow.
            residual.reset();
            run.flow_value = 0.0;
            return Ok(());
        }

        let (activated, stuck) = discharge(
            residual,
            &mut labels,
            &mut excess,
            &mut current,
            u,
            epsilon,
        );
        for v in activated {
            if v != source && v != sink && !in_queue[v as usize] {
                queue.push_back(v);
                in_queue[v as usize] = true;
            }
        }
        if !stuck && excess[u as usize] > epsilon && !in_queue[u as usize] {
            queue.push_back(u);
            in_queue[u as usize] = true;
        }

        run.flow_value = excess[sink as usize];
    }
    Ok(())
}

/// Push excess out of `u` until it is drained or `u` cannot be relabeled
/// any further; returns the nodes that received flow and whether `u` got
/// stuck with residual dust it cannot move
fn discharge(
    residual: &mut ResidualGraph,
    labels: &mut Labels,
    excess: &mut [Flow],
    current: &mut [usize],
    u: u32,
    epsilon: f64,
) -> (Vec<u32>, bool) {
    let mut activated = Vec::new();
    let mut stuck = false;

    while excess[u as usize] > epsilon {
        if current[u as usize] >= residual.out_arcs(u).len() {
            if !labels.relabel(residual, u, epsilon) {
                stuck = true;
                break;
            }
            current[u as usize] = 0;
        } else {
            let arc = residual.out_arcs(u)[current[u as usize]];
            let head = residual.arc(arc).head;
            let room = residual.residual(arc);
            if room > epsilon && labels.height(u) == labels.height(head) + 1 {
                let amount = excess[u as usize].min(room);
                residual.push(arc, amount);
                excess[u as usize] -= amount;
                let was_inactive = excess[head as usize] <= epsilon;
                excess[head as usize] += amount;
                if was_inactive {
                    activated.push(head);
                }
            } else {
                current[u as usize] += 1;
            }
        }
    }
    (activated, stuck)
}

/// Height labels with occupancy counts for the gap heuristic
struct Labels {
    height: Vec<u32>,
    count: Vec<u32>,
    n: usize,
    source: u32,
}

impl Labels {
    fn new(n: usize, source: u32) -> Self {
        let mut height = vec![0u32; n];
        let mut count = vec![0u32; 2 * n + 2];
        height[source as usize] = n as u32;
        count[0] = (n as u32) - 1;
        count[n] += 1;
        Self {
            height,
            count,
            n,
            source,
        }
    }

    fn height(&self, node: u32) -> u32 {
        self.height[node as usize]
    }

    /// Lift `u` just above its lowest residual neighbor; applies the gap
    /// heuristic when `u` left a height level empty. Returns false when `u`
    /// has no residual neighbor at all.
    fn relabel(&mut self, residual: &ResidualGraph, u: u32, epsilon: f64) -> bool {
        let mut min_height = u32::MAX;
        for &arc in residual.out_arcs(u) {
            if residual.residual(arc) > epsilon {
                min_height = min_height.min(self.height[residual.arc(arc).head as usize]);
            }
        }
        if min_height == u32::MAX {
            return false;
        }

        let old = self.height[u as usize];
        let new = min_height + 1;
        self.count[old as usize] -= 1;
        self.height[u as usize] = new;
        self.count[new as usize] += 1;

        if self.count[old as usize] == 0 && (old as usize) < self.n {
            self.close_gap(old);
        }
        true
    }

    /// Raise every non-source node strictly above `gap` (and at most `n`)
    /// to `n + 1`
    fn close_gap(&mut self, gap: u32) {
        let ceiling = (self.n + 1) as u32;
        for v in 0..self.height.len() {
            let h = self.height[v];
            if v as u32 != self.source && h > gap && h < ceiling {
                self.count[h as usize] -= 1;
                self.height[v] = ceiling;
                self.count[ceiling as usize] += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::{solve, tests::diamond};
    use crate::types::{Algorithm, Edge, Graph, Node, SolveContext, SolveOptions, SolverStatus};

    #[test]
    fn test_diamond() {
        let result = solve(
            &diamond(),
            Algorithm::PushRelabel,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 20.0);
        assert_eq!(result.status, SolverStatus::Optimal);
    }

    #[test]
    fn test_excess_returns_to_source() {
        // The source can push 10 but only 3 fit through; the surplus must
        // drain back without violating conservation.
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(1, 2, 10.0))
            .add_edge(Edge::with_capacity(2, 3, 3.0));

        let result = solve(
            &graph,
            Algorithm::PushRelabel,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 3.0);
        assert_eq!(result.edge_flows[0].flow, 3.0);
        assert_eq!(result.edge_flows[1].flow, 3.0);
    }

    #[test]
    fn test_dense_network() {
        let mut graph = Graph::new(0, 4);
        for id in 0..=4 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(0, 1, 10.0))
            .add_edge(Edge::with_capacity(0, 2, 10.0))
            .add_edge(Edge::with_capacity(1, 2, 2.0))
            .add_edge(Edge::with_capacity(1, 3, 4.0))
            .add_edge(Edge::with_capacity(1, 4, 8.0))
            .add_edge(Edge::with_capacity(2, 4, 9.0))
            .add_edge(Edge::with_capacity(3, 4, 10.0));

        let result = solve(
            &graph,
            Algorithm::PushRelabel,
            &SolveOptions::default(),
            &SolveContext::new(),
        )
        .unwrap();
        assert_eq!(result.max_flow, 19.0);
    }
}
