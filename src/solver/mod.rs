//! Flow solver engine
//!
//! Five solver variants behind one dispatch surface:
//!
//! - [`Algorithm::FordFulkerson`] - DFS augmentation
//! - [`Algorithm::EdmondsKarp`] - BFS shortest augmenting path
//! - [`Algorithm::Dinic`] - level graph + blocking flow
//! - [`Algorithm::PushRelabel`] - FIFO push-relabel with gap relabeling
//! - [`Algorithm::SuccessiveShortestPaths`] - min-cost flow under reduced costs
//!
//! Every variant starts from zero flow, builds a [`ResidualGraph`] it owns
//! exclusively, and recovers per-edge flows from the forward arcs. Tie-breaks
//! on equal-residual arcs are deterministic by arc index, so re-solving a
//! graph with the same options is bit-identical.

mod dinic;
mod edmonds_karp;
mod ford_fulkerson;
pub mod progress;
mod push_relabel;
mod ssp;

pub use progress::{ProgressFrame, ProgressSink, StreamStatus};

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::residual::ResidualGraph;
use crate::types::{
    Algorithm, AugmentingPath, EdgeFlow, Flow, FlowResult, Graph, NodeId, SolveContext,
    SolveOptions, SolverStatus,
};
use crate::{Error, Result};

/// Catalog entry describing one solver variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    /// Stable name accepted by the solve request
    pub name: String,
    /// Human-oriented description
    pub description: String,
    /// Asymptotic complexity
    pub complexity: String,
    /// Whether the variant minimizes cost in addition to flow
    pub minimizes_cost: bool,
}

/// The catalog served by `GetAlgorithms`
pub fn algorithm_catalog() -> Vec<AlgorithmInfo> {
    Algorithm::ALL
        .iter()
        .map(|&a| AlgorithmInfo {
            name: a.as_str().to_string(),
            description: a.description().to_string(),
            complexity: a.complexity().to_string(),
            minimizes_cost: a.minimizes_cost(),
        })
        .collect()
}

/// Solve a flow problem with the chosen algorithm
pub fn solve(
    graph: &Graph,
    algorithm: Algorithm,
    options: &SolveOptions,
    context: &SolveContext,
) -> Result<FlowResult> {
    let mut discard = |_frame: ProgressFrame| true;
    solve_with_progress(graph, algorithm, options, context, &mut discard)
}

/// Solve while reporting progress frames to `sink`
///
/// In-progress frames are throttled to roughly fifty per solve; the
/// completed frame is emitted by the caller of this function (the streaming
/// facade) so that a unary solve never pays for it.
pub fn solve_with_progress(
    graph: &Graph,
    algorithm: Algorithm,
    options: &SolveOptions,
    context: &SolveContext,
    sink: &mut dyn ProgressSink,
) -> Result<FlowResult> {
    let started = Instant::now();

    check_preconditions(graph)?;
    check_cost_signs(graph, algorithm)?;
    check_weak_connectivity(graph)?;

    let mut residual = ResidualGraph::build(graph)?;
    let stride = frame_stride(algorithm, residual.node_count(), residual.edge_count());

    let mut run = SolveRun {
        options,
        context,
        deadline: effective_deadline(options, context, started),
        sink,
        stride,
        iterations: 0,
        flow_value: 0.0,
        paths: Vec::new(),
        status: SolverStatus::Optimal,
    };

    match algorithm {
        Algorithm::FordFulkerson => ford_fulkerson::run(&mut residual, &mut run)?,
        Algorithm::EdmondsKarp => edmonds_karp::run(&mut residual, &mut run)?,
        Algorithm::Dinic => dinic::run(&mut residual, &mut run)?,
        Algorithm::PushRelabel => push_relabel::run(&mut residual, &mut run)?,
        Algorithm::SuccessiveShortestPaths => ssp::run(&mut residual, &mut run)?,
    }

    let result = recover_result(graph, &residual, &run, started);
    debug!(
        algorithm = %algorithm,
        max_flow = result.max_flow,
        iterations = result.iterations,
        status = ?result.status,
        "solve finished"
    );
    Ok(result)
}

/// Structural preconditions shared by every variant
///
/// Cost signs are deliberately not checked here: a negative cost is an
/// algorithm mismatch, not an invalid graph (see [`check_cost_signs`]).
fn check_preconditions(graph: &Graph) -> Result<()> {
    if graph.nodes.is_empty() {
        return Err(Error::invalid_graph("graph has no nodes"));
    }
    if graph.source_id == graph.sink_id {
        return Err(Error::invalid_graph("source and sink must differ"));
    }
    if !graph.has_node(graph.source_id) {
        return Err(Error::invalid_graph(format!(
            "source node {} does not exist",
            graph.source_id
        )));
    }
    if !graph.has_node(graph.sink_id) {
        return Err(Error::invalid_graph(format!(
            "sink node {} does not exist",
            graph.sink_id
        )));
    }

    let mut seen = std::collections::HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if !seen.insert(node.id) {
            return Err(Error::invalid_graph(format!("duplicate node id {}", node.id)));
        }
    }

    for (i, edge) in graph.edges.iter().enumerate() {
        if !seen.contains(&edge.from) || !seen.contains(&edge.to) {
            return Err(Error::invalid_graph(format!(
                "edge {i} references a missing node"
            )));
        }
        if !edge.capacity.is_finite() || edge.capacity < 0.0 {
            return Err(Error::invalid_graph(format!(
                "edge {i} has invalid capacity {}",
                edge.capacity
            )));
        }
        if !edge.cost.is_finite() {
            return Err(Error::invalid_graph(format!(
                "edge {i} has non-finite cost {}",
                edge.cost
            )));
        }
    }
    Ok(())
}

/// Negative costs are rejected for every variant: the max-flow strategies
/// would report a wrong total cost and successive shortest paths requires
/// non-negative reduced costs from the start.
fn check_cost_signs(graph: &Graph, algorithm: Algorithm) -> Result<()> {
    for (i, edge) in graph.edges.iter().enumerate() {
        if edge.cost < 0.0 {
            let msg = if algorithm.minimizes_cost() {
                format!(
                    "successive shortest paths requires non-negative costs, edge {i} has {}",
                    edge.cost
                )
            } else {
                format!("{algorithm} does not accept negative costs, edge {i} has {}", edge.cost)
            };
            return Err(Error::algorithm_mismatch(msg));
        }
    }
    Ok(())
}

/// Source and sink must share a weak component; a weakly connected pair with
/// no directed path still has a well-defined optimum of zero.
fn check_weak_connectivity(graph: &Graph) -> Result<()> {
    let mut neighbors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in &graph.edges {
        neighbors.entry(edge.from).or_default().push(edge.to);
        neighbors.entry(edge.to).or_default().push(edge.from);
    }

    let mut visited = std::collections::HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(graph.source_id);
    queue.push_back(graph.source_id);

    while let Some(u) = queue.pop_front() {
        if u == graph.sink_id {
            return Ok(());
        }
        if let Some(next) = neighbors.get(&u) {
            for &v in next {
                if visited.insert(v) {
                    queue.push_back(v);
                }
            }
        }
    }

    Err(Error::infeasible(
        "source and sink lie in different components",
    ))
}

/// Merge the per-solve timeout with the inherited caller deadline
fn effective_deadline(
    options: &SolveOptions,
    context: &SolveContext,
    started: Instant,
) -> Option<Instant> {
    let own = if options.has_timeout() {
        Some(started + Duration::from_secs_f64(options.timeout_seconds))
    } else {
        None
    };
    match (own, context.deadline) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Frame stride keeping a typical stream at roughly fifty frames
fn frame_stride(algorithm: Algorithm, nodes: usize, edges: usize) -> u64 {
    let estimated: u64 = match algorithm {
        Algorithm::FordFulkerson => edges as u64,
        Algorithm::EdmondsKarp => (nodes as u64).saturating_mul(edges as u64) / 2,
        Algorithm::Dinic => nodes as u64,
        Algorithm::PushRelabel => (nodes as u64).saturating_mul(nodes as u64),
        Algorithm::SuccessiveShortestPaths => edges as u64,
    };
    (estimated / 50).max(1)
}

/// Recover the public result from the residual graph
fn recover_result(
    graph: &Graph,
    residual: &ResidualGraph,
    run: &SolveRun<'_>,
    started: Instant,
) -> FlowResult {
    let epsilon = run.options.epsilon;
    let mut edge_flows = Vec::with_capacity(graph.edges.len());
    let mut total_cost = 0.0;
    let mut max_flow = 0.0;

    for (e, edge) in graph.edges.iter().enumerate() {
        let mut flow = residual.edge_flow(e);
        if flow.abs() < epsilon {
            flow = 0.0;
        }
        let cost = flow * edge.cost;
        total_cost += cost;
        if edge.to == graph.sink_id {
            max_flow += flow;
        }
        if edge.from == graph.sink_id {
            max_flow -= flow;
        }
        edge_flows.push(EdgeFlow {
            from: edge.from,
            to: edge.to,
            flow,
            capacity: edge.capacity,
            utilization: if edge.capacity > 0.0 {
                flow / edge.capacity
            } else {
                0.0
            },
            cost,
        });
    }

    FlowResult {
        max_flow,
        total_cost,
        edge_flows,
        paths: run.paths.clone(),
        iterations: run.iterations,
        solve_time_seconds: started.elapsed().as_secs_f64(),
        status: run.status,
    }
}

/// Walk parent arcs back from the sink, returning the path arcs in order
pub(crate) fn backtrack_path(
    residual: &ResidualGraph,
    parent: &[u32],
    source: u32,
    sink: u32,
) -> Vec<u32> {
    let mut arcs = Vec::new();
    let mut node = sink;
    while node != source {
        let arc = parent[node as usize];
        arcs.push(arc);
        node = residual.arc(ResidualGraph::paired(arc)).head;
    }
    arcs.reverse();
    arcs
}

/// Push the path minimum along `arcs` and account for it
pub(crate) fn augment(
    residual: &mut ResidualGraph,
    run: &mut SolveRun<'_>,
    arcs: &[u32],
) -> Flow {
    let mut bottleneck = f64::INFINITY;
    for &arc in arcs {
        bottleneck = bottleneck.min(residual.residual(arc));
    }
    for &arc in arcs {
        residual.push(arc, bottleneck);
    }
    run.flow_value += bottleneck;
    run.record_path(residual, arcs, bottleneck);
    bottleneck
}

/// Mutable bookkeeping shared by every strategy during one solve
pub(crate) struct SolveRun<'a> {
    pub options: &'a SolveOptions,
    context: &'a SolveContext,
    deadline: Option<Instant>,
    sink: &'a mut dyn ProgressSink,
    stride: u64,
    /// Outer iterations performed (augmentations, phases, or discharges)
    pub iterations: u64,
    /// Flow accumulated so far, for progress frames
    pub flow_value: Flow,
    /// Augmenting paths, recorded only when requested
    pub paths: Vec<AugmentingPath>,
    status: SolverStatus,
}

impl SolveRun<'_> {
    /// Numerical tolerance for this run
    pub fn epsilon(&self) -> f64 {
        self.options.epsilon
    }

    /// Account for one unit of productive work about to happen
    ///
    /// Returns `Ok(false)` when the run tripped on its deadline or token;
    /// the caller must stop and leave the flow as-is. Errors when the
    /// iteration budget is exhausted or the stream consumer is gone.
    pub fn begin_iteration(&mut self) -> Result<bool> {
        if let Some(status) = self.trip() {
            self.status = status;
            return Ok(false);
        }
        if self.options.has_iteration_limit() && self.iterations >= self.options.max_iterations {
            return Err(Error::IterationLimit {
                limit: self.options.max_iterations,
            });
        }
        self.iterations += 1;
        if self.iterations % self.stride == 0 {
            let frame = ProgressFrame::in_progress(self.iterations, self.flow_value);
            if !self.sink.emit(frame) {
                return Err(Error::Cancelled {
                    iterations: self.iterations,
                });
            }
        }
        Ok(true)
    }

    /// Cheap poll for inner loops (BFS/DFS expansion boundaries)
    pub fn trip(&self) -> Option<SolverStatus> {
        if self.context.cancel.is_cancelled() {
            return Some(SolverStatus::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(SolverStatus::Timeout);
            }
        }
        None
    }

    /// Stop with a partial status observed by an inner loop
    pub fn stop(&mut self, status: SolverStatus) {
        self.status = status;
    }

    /// Whether a partial status has been recorded
    pub fn is_stopped(&self) -> bool {
        self.status != SolverStatus::Optimal
    }

    /// Record an augmenting path when the caller asked for them
    pub fn record_path(&mut self, residual: &ResidualGraph, arcs: &[u32], amount: Flow) {
        if !self.options.return_paths {
            return;
        }
        let mut nodes = Vec::with_capacity(arcs.len() + 1);
        nodes.push(residual.node_id(residual.source()));
        for &arc in arcs {
            nodes.push(residual.node_id(residual.arc(arc).head));
        }
        self.paths.push(AugmentingPath { nodes, amount });
    }
}
