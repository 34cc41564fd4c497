//! Full level: topology analysis
//!
//! Bridges and articulation points are computed on the underlying undirected
//! graph with an iterative low-link DFS; both are reported as warnings, not
//! errors. Unreachable subgraphs are detected from the source along directed
//! edges.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::{CheckSet, ValidationIssue};
use crate::error::ErrorKind;
use crate::types::{Graph, NodeId};

/// Structural weak points of a network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyAnalysis {
    /// Edges whose removal disconnects the underlying undirected graph
    pub bridges: Vec<(NodeId, NodeId)>,
    /// Nodes whose removal disconnects the underlying undirected graph
    pub articulation_points: Vec<NodeId>,
    /// Nodes not reachable from the source along directed edges
    pub unreachable_nodes: Vec<NodeId>,
}

impl TopologyAnalysis {
    /// Whether the given edge is a bridge
    pub fn is_bridge(&self, from: NodeId, to: NodeId) -> bool {
        self.bridges
            .iter()
            .any(|&(a, b)| (a, b) == (from, to) || (a, b) == (to, from))
    }
}

pub(crate) fn check(graph: &Graph, checks: &mut CheckSet) {
    let analysis = analyze_topology(graph);

    checks.record(
        analysis
            .bridges
            .iter()
            .map(|&(from, to)| {
                ValidationIssue::warning(
                    ErrorKind::InvalidGraph,
                    "bridge_edge",
                    format!("edge {from} -> {to} is a single point of failure"),
                    format!("edges[{from}->{to}]"),
                )
            })
            .collect(),
    );

    checks.record(
        analysis
            .articulation_points
            .iter()
            .map(|&id| {
                ValidationIssue::warning(
                    ErrorKind::InvalidGraph,
                    "articulation_point",
                    format!("removing node {id} disconnects the network"),
                    format!("nodes[{id}]"),
                )
            })
            .collect(),
    );

    checks.record(
        analysis
            .unreachable_nodes
            .iter()
            .map(|&id| {
                ValidationIssue::warning(
                    ErrorKind::InvalidGraph,
                    "unreachable_node",
                    format!("node {id} is not reachable from the source"),
                    format!("nodes[{id}]"),
                )
            })
            .collect(),
    );
}

/// Analyze bridges, articulation points, and reachability
pub fn analyze_topology(graph: &Graph) -> TopologyAnalysis {
    let n = graph.nodes.len();
    let mut index_of = HashMap::with_capacity(n);
    for (i, node) in graph.nodes.iter().enumerate() {
        index_of.entry(node.id).or_insert(i);
    }

    // Undirected view: (neighbor index, edge id) both ways.
    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    for (eid, edge) in graph.edges.iter().enumerate() {
        let (Some(&u), Some(&v)) = (index_of.get(&edge.from), index_of.get(&edge.to)) else {
            continue;
        };
        if u == v {
            continue;
        }
        adjacency[u].push((v, eid));
        adjacency[v].push((u, eid));
    }

    let (bridges, articulation_points) = low_link(graph, &adjacency);
    let unreachable_nodes = unreachable_from_source(graph);

    TopologyAnalysis {
        bridges,
        articulation_points,
        unreachable_nodes,
    }
}

/// Iterative Tarjan low-link pass over every component
fn low_link(
    graph: &Graph,
    adjacency: &[Vec<(usize, usize)>],
) -> (Vec<(NodeId, NodeId)>, Vec<NodeId>) {
    let n = adjacency.len();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut is_articulation = vec![false; n];
    let mut bridges = Vec::new();
    let mut timer = 0usize;

    struct Frame {
        node: usize,
        parent_edge: usize,
        pos: usize,
    }

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;
        let mut root_children = 0usize;
        let mut frames = vec![Frame {
            node: root,
            parent_edge: usize::MAX,
            pos: 0,
        }];

        while let Some(top) = frames.last_mut() {
            let u = top.node;
            if top.pos < adjacency[u].len() {
                let (v, eid) = adjacency[u][top.pos];
                top.pos += 1;
                if eid == top.parent_edge {
                    continue;
                }
                if disc[v] == usize::MAX {
                    disc[v] = timer;
                    low[v] = timer;
                    timer += 1;
                    if u == root {
                        root_children += 1;
                    }
                    frames.push(Frame {
                        node: v,
                        parent_edge: eid,
                        pos: 0,
                    });
                } else {
                    low[u] = low[u].min(disc[v]);
                }
            } else {
                let finished_edge = top.parent_edge;
                frames.pop();
                if let Some(parent) = frames.last() {
                    let p = parent.node;
                    low[p] = low[p].min(low[u]);
                    if low[u] > disc[p] {
                        let edge = &graph.edges[finished_edge];
                        bridges.push((edge.from, edge.to));
                    }
                    if low[u] >= disc[p] && p != root {
                        is_articulation[p] = true;
                    }
                }
            }
        }
        if root_children > 1 {
            is_articulation[root] = true;
        }
    }

    let articulation_points = graph
        .nodes
        .iter()
        .enumerate()
        .filter(|&(i, _)| is_articulation[i])
        .map(|(_, node)| node.id)
        .collect();
    (bridges, articulation_points)
}

fn unreachable_from_source(graph: &Graph) -> Vec<NodeId> {
    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in &graph.edges {
        adjacency.entry(edge.from).or_default().push(edge.to);
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(graph.source_id);
    queue.push_back(graph.source_id);
    while let Some(u) = queue.pop_front() {
        if let Some(next) = adjacency.get(&u) {
            for &v in next {
                if visited.insert(v) {
                    queue.push_back(v);
                }
            }
        }
    }

    graph
        .nodes
        .iter()
        .filter(|n| !visited.contains(&n.id))
        .map(|n| n.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, Node};
    use crate::validation::tests::valid_graph;
    use crate::validation::{GraphValidator, ValidationLevel};

    fn chain(ids: &[NodeId]) -> Graph {
        let mut graph = Graph::new(ids[0], ids[ids.len() - 1]);
        for &id in ids {
            graph.add_node(Node::new(id));
        }
        for pair in ids.windows(2) {
            graph.add_edge(Edge::with_capacity(pair[0], pair[1], 10.0));
        }
        graph
    }

    #[test]
    fn test_chain_is_all_bridges() {
        let analysis = analyze_topology(&chain(&[1, 2, 3, 4]));
        assert_eq!(analysis.bridges.len(), 3);
        assert!(analysis.is_bridge(2, 3));
        // Every interior node cuts the chain.
        assert_eq!(analysis.articulation_points, vec![2, 3]);
    }

    #[test]
    fn test_diamond_has_no_bridges() {
        let analysis = analyze_topology(&valid_graph());
        assert!(analysis.bridges.is_empty());
        assert!(analysis.articulation_points.is_empty());
    }

    #[test]
    fn test_parallel_edges_are_not_bridges() {
        let mut graph = chain(&[1, 2]);
        graph.add_edge(Edge::with_capacity(1, 2, 5.0));
        let analysis = analyze_topology(&graph);
        assert!(analysis.bridges.is_empty());
    }

    #[test]
    fn test_unreachable_nodes_reported() {
        let mut graph = valid_graph();
        graph.add_node(Node::new(7));
        graph.add_node(Node::new(8));
        graph.add_edge(Edge::with_capacity(7, 8, 1.0));

        let analysis = analyze_topology(&graph);
        assert_eq!(analysis.unreachable_nodes, vec![7, 8]);
    }

    #[test]
    fn test_full_level_reports_warnings() {
        let report = GraphValidator::new(ValidationLevel::Full).validate(&chain(&[1, 2, 3]));
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|i| i.code == "bridge_edge"));
        assert!(report
            .warnings
            .iter()
            .any(|i| i.code == "articulation_point"));
    }
}
