//! Common types used across the optimization engine

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::{Error, Result};

/// Flow amount on an edge (real-valued, compared against an epsilon)
pub type Flow = f64;

/// Cost per unit of flow
pub type Cost = f64;

/// Stable external node identifier
pub type NodeId = i64;

/// Default numerical tolerance for residuals and conservation checks
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Role of a node in a logistics network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Flow origin
    Source,
    /// Flow destination
    Sink,
    /// Storage site with outgoing supply routes
    Warehouse,
    /// Final drop-off point
    DeliveryPoint,
    /// Plain transshipment node
    Intermediate,
}

impl NodeKind {
    /// Stable machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Sink => "sink",
            Self::Warehouse => "warehouse",
            Self::DeliveryPoint => "delivery_point",
            Self::Intermediate => "intermediate",
        }
    }
}

/// Planar position of a node, when the network is geo-referenced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (or longitude)
    pub x: f64,
    /// Y coordinate (or latitude)
    pub y: f64,
}

/// A node in the flow network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier, unique within a graph
    pub id: NodeId,
    /// Optional role tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    /// Supply (positive) or demand (negative)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply: Option<f64>,
    /// Optional geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    /// Create a plain node
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            kind: None,
            supply: None,
            position: None,
        }
    }

    /// Set the node kind
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the supply/demand
    pub fn with_supply(mut self, supply: f64) -> Self {
        self.supply = Some(supply);
        self
    }

    /// Set the position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

/// A directed capacitated edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Tail node id
    pub from: NodeId,
    /// Head node id
    pub to: NodeId,
    /// Maximum flow capacity, non-negative
    pub capacity: Flow,
    /// Cost per unit of flow, non-negative
    #[serde(default)]
    pub cost: Cost,
    /// Physical length, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Road classification tag (drives cost multipliers in analytics)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_type: Option<String>,
    /// Flow currently assigned, `0 <= current_flow <= capacity`
    #[serde(default)]
    pub current_flow: Flow,
}

impl Edge {
    /// Create an edge with capacity and cost
    pub fn new(from: NodeId, to: NodeId, capacity: Flow, cost: Cost) -> Self {
        Self {
            from,
            to,
            capacity,
            cost,
            length: None,
            road_type: None,
            current_flow: 0.0,
        }
    }

    /// Create an edge with only capacity (zero cost)
    pub fn with_capacity(from: NodeId, to: NodeId, capacity: Flow) -> Self {
        Self::new(from, to, capacity, 0.0)
    }

    /// Set the length
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the road type tag
    pub fn with_road_type(mut self, road_type: impl Into<String>) -> Self {
        self.road_type = Some(road_type.into());
        self
    }

    /// Set the current flow
    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.current_flow = flow;
        self
    }

    /// Fraction of capacity in use, 0 when the edge has no capacity
    pub fn utilization(&self) -> f64 {
        if self.capacity > 0.0 {
            self.current_flow / self.capacity
        } else {
            0.0
        }
    }

    /// Whether the edge is a self-loop
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// A directed capacitated graph with a designated source and sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Nodes in insertion order
    pub nodes: Vec<Node>,
    /// Edges in insertion order
    pub edges: Vec<Edge>,
    /// Flow origin
    pub source_id: NodeId,
    /// Flow destination
    pub sink_id: NodeId,
}

impl Graph {
    /// Create an empty graph with the given source and sink ids
    pub fn new(source_id: NodeId, sink_id: NodeId) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            source_id,
            sink_id,
        }
    }

    /// Add a node
    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge
    pub fn add_edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node by id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Whether a node with the given id exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Sum of all edge capacities
    pub fn total_capacity(&self) -> Flow {
        self.edges.iter().map(|e| e.capacity).sum()
    }

    /// Parse a graph from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid_argument(format!("failed to parse graph: {e}")))
    }

    /// Serialize the graph to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::internal(e.to_string()))
    }
}

/// The closed set of solver variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// DFS augmentation
    FordFulkerson,
    /// BFS shortest augmenting path
    EdmondsKarp,
    /// Layered blocking flow
    Dinic,
    /// FIFO push-relabel with gap relabeling
    PushRelabel,
    /// Successive shortest paths (min-cost flow)
    SuccessiveShortestPaths,
}

impl Algorithm {
    /// Every known variant, in catalog order
    pub const ALL: [Algorithm; 5] = [
        Algorithm::FordFulkerson,
        Algorithm::EdmondsKarp,
        Algorithm::Dinic,
        Algorithm::PushRelabel,
        Algorithm::SuccessiveShortestPaths,
    ];

    /// Stable machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FordFulkerson => "ford_fulkerson",
            Self::EdmondsKarp => "edmonds_karp",
            Self::Dinic => "dinic",
            Self::PushRelabel => "push_relabel",
            Self::SuccessiveShortestPaths => "successive_shortest_paths",
        }
    }

    /// Human-oriented description for the algorithm catalog
    pub fn description(self) -> &'static str {
        match self {
            Self::FordFulkerson => "Depth-first augmenting paths; best on small integral networks",
            Self::EdmondsKarp => "Breadth-first augmenting paths with a polynomial iteration bound",
            Self::Dinic => "Level graphs with blocking flow; fast on unit-capacity networks",
            Self::PushRelabel => "FIFO push-relabel with gap relabeling; strong on dense networks",
            Self::SuccessiveShortestPaths => {
                "Minimum-cost flow by shortest augmentation under reduced costs"
            }
        }
    }

    /// Asymptotic complexity, as shown in the catalog
    pub fn complexity(self) -> &'static str {
        match self {
            Self::FordFulkerson => "O(E * max_flow)",
            Self::EdmondsKarp => "O(V * E^2)",
            Self::Dinic => "O(V^2 * E)",
            Self::PushRelabel => "O(V^2 * E)",
            Self::SuccessiveShortestPaths => "O(V * E * log V * flow)",
        }
    }

    /// Whether the variant optimizes cost in addition to flow
    pub fn minimizes_cost(self) -> bool {
        matches!(self, Self::SuccessiveShortestPaths)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ford_fulkerson" | "ford-fulkerson" => Ok(Self::FordFulkerson),
            "edmonds_karp" | "edmonds-karp" => Ok(Self::EdmondsKarp),
            "dinic" | "dinics" => Ok(Self::Dinic),
            "push_relabel" | "push-relabel" => Ok(Self::PushRelabel),
            "successive_shortest_paths" | "ssp" | "min_cost" => Ok(Self::SuccessiveShortestPaths),
            other => Err(Error::invalid_argument(format!(
                "unknown algorithm: {other}"
            ))),
        }
    }
}

/// Tunable solve parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Maximum outer iterations (0 = unlimited)
    pub max_iterations: u64,
    /// Numerical tolerance for residuals and termination
    pub epsilon: f64,
    /// Solve timeout in seconds (0 = inherited from the caller deadline)
    pub timeout_seconds: f64,
    /// Record augmenting paths in the result
    pub return_paths: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iterations: 0,
            epsilon: DEFAULT_EPSILON,
            timeout_seconds: 0.0,
            return_paths: false,
        }
    }
}

impl SolveOptions {
    /// Create options with an iteration limit
    pub fn with_max_iterations(mut self, limit: u64) -> Self {
        self.max_iterations = limit;
        self
    }

    /// Create options with a timeout
    pub fn with_timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Check if an iteration limit is set
    pub fn has_iteration_limit(&self) -> bool {
        self.max_iterations > 0
    }

    /// Check if a timeout is set
    pub fn has_timeout(&self) -> bool {
        self.timeout_seconds > 0.0
    }
}

/// Terminal status of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    /// Proven optimal flow found
    Optimal,
    /// No feasible flow exists
    Infeasible,
    /// Deadline tripped; flow is the latest consistent one
    Timeout,
    /// Caller cancelled; flow is the latest consistent one
    Cancelled,
    /// Solver failed
    Error,
}

impl SolverStatus {
    /// Returns true if the reported flow is proven optimal
    pub fn is_optimal(self) -> bool {
        matches!(self, Self::Optimal)
    }

    /// Returns true if the solve stopped early but left a consistent flow
    pub fn is_partial(self) -> bool {
        matches!(self, Self::Timeout | Self::Cancelled)
    }
}

/// Flow assigned to one input edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeFlow {
    /// Tail node id
    pub from: NodeId,
    /// Head node id
    pub to: NodeId,
    /// Assigned flow
    pub flow: Flow,
    /// Edge capacity
    pub capacity: Flow,
    /// `flow / capacity`, 0 for zero-capacity edges
    pub utilization: f64,
    /// `flow * unit cost`
    pub cost: Cost,
}

/// One augmenting path found during the solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentingPath {
    /// Node ids from source to sink
    pub nodes: Vec<NodeId>,
    /// Flow pushed along the path
    pub amount: Flow,
}

/// Outcome of a solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowResult {
    /// Total flow from source to sink
    pub max_flow: Flow,
    /// Total cost `sum(flow_e * cost_e)` over input edges
    pub total_cost: Cost,
    /// Per-edge assignments, in input edge order
    pub edge_flows: Vec<EdgeFlow>,
    /// Augmenting paths, populated when `return_paths` was requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<AugmentingPath>,
    /// Outer iterations performed
    pub iterations: u64,
    /// Wall-clock solve time in seconds
    pub solve_time_seconds: f64,
    /// Terminal status
    pub status: SolverStatus,
}

/// Cheap clonable cancellation flag polled by the solver
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, untripped token
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token; every clone observes the cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether the token has been tripped
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-request execution context carried into the solver
///
/// The deadline and the cancellation token are polled between outer
/// iterations and at BFS/DFS expansion boundaries.
#[derive(Debug, Clone, Default)]
pub struct SolveContext {
    /// Cancellation signal for this request
    pub cancel: CancelToken,
    /// Absolute deadline inherited from the caller
    pub deadline: Option<Instant>,
}

impl SolveContext {
    /// Context with no deadline and a fresh token
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Attach an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The status to stop with, if the context has tripped
    pub fn tripped(&self) -> Option<SolverStatus> {
        if self.cancel.is_cancelled() {
            return Some(SolverStatus::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(SolverStatus::Timeout);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_utilization() {
        let edge = Edge::with_capacity(1, 2, 100.0).with_flow(95.0);
        assert!((edge.utilization() - 0.95).abs() < 1e-12);

        let empty = Edge::with_capacity(1, 2, 0.0);
        assert_eq!(empty.utilization(), 0.0);
    }

    #[test]
    fn test_algorithm_round_trip() {
        for algo in Algorithm::ALL {
            let parsed: Algorithm = algo.as_str().parse().unwrap();
            assert_eq!(parsed, algo);
        }
        assert_eq!(
            "ssp".parse::<Algorithm>().unwrap(),
            Algorithm::SuccessiveShortestPaths
        );
        assert!("simplex".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_graph_json_round_trip() {
        let mut graph = Graph::new(1, 2);
        graph
            .add_node(Node::new(1).with_kind(NodeKind::Source))
            .add_node(Node::new(2).with_kind(NodeKind::Sink));
        graph.add_edge(Edge::new(1, 2, 10.0, 2.5).with_road_type("urban"));

        let json = graph.to_json().unwrap();
        let back = Graph::from_json(&json).unwrap();
        assert_eq!(back, graph);
        assert!(Graph::from_json("{").is_err());
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_context_deadline() {
        let ctx = SolveContext::new();
        assert!(ctx.tripped().is_none());

        let past = Instant::now() - std::time::Duration::from_secs(1);
        let ctx = SolveContext::new().with_deadline(past);
        assert_eq!(ctx.tripped(), Some(SolverStatus::Timeout));
    }
}
