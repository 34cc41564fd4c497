//! Standard level: connectivity

use std::collections::{HashMap, HashSet, VecDeque};

use super::{CheckSet, ValidationIssue};
use crate::error::ErrorKind;
use crate::types::{Graph, NodeId};

pub(crate) fn check(graph: &Graph, checks: &mut CheckSet) {
    checks.record(check_sink_reachable(graph));
    checks.record(check_isolated_nodes(graph));
}

/// Whether the sink is reachable from the source along directed edges
pub(crate) fn sink_reachable(graph: &Graph) -> bool {
    let adjacency = forward_adjacency(graph);
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(graph.source_id);
    queue.push_back(graph.source_id);

    while let Some(u) = queue.pop_front() {
        if u == graph.sink_id {
            return true;
        }
        if let Some(next) = adjacency.get(&u) {
            for &v in next {
                if visited.insert(v) {
                    queue.push_back(v);
                }
            }
        }
    }
    false
}

fn check_sink_reachable(graph: &Graph) -> Vec<ValidationIssue> {
    if sink_reachable(graph) {
        Vec::new()
    } else {
        vec![ValidationIssue::error(
            ErrorKind::InvalidGraph,
            "sink_unreachable",
            format!(
                "sink {} is not reachable from source {}",
                graph.sink_id, graph.source_id
            ),
            "sink_id",
        )]
    }
}

/// A node with no incident edges cannot participate in any flow
fn check_isolated_nodes(graph: &Graph) -> Vec<ValidationIssue> {
    let mut incident: HashSet<NodeId> = HashSet::new();
    for edge in &graph.edges {
        incident.insert(edge.from);
        incident.insert(edge.to);
    }

    graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| !incident.contains(&node.id))
        .map(|(i, node)| {
            ValidationIssue::warning(
                ErrorKind::InvalidGraph,
                "isolated_node",
                format!("node {} has no incident edges", node.id),
                format!("nodes[{i}]"),
            )
        })
        .collect()
}

fn forward_adjacency(graph: &Graph) -> HashMap<NodeId, Vec<NodeId>> {
    let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in &graph.edges {
        adjacency.entry(edge.from).or_default().push(edge.to);
    }
    adjacency
}

#[cfg(test)]
mod tests {
    use crate::types::{Edge, Node};
    use crate::validation::tests::valid_graph;
    use crate::validation::{GraphValidator, ValidationLevel};

    #[test]
    fn test_unreachable_sink_is_standard_error() {
        let mut graph = valid_graph();
        // Cut both edges into the sink.
        graph.edges.retain(|e| e.to != graph.sink_id);

        let basic = GraphValidator::new(ValidationLevel::Basic).validate(&graph);
        assert!(basic.is_valid);

        let standard = GraphValidator::new(ValidationLevel::Standard).validate(&graph);
        assert!(!standard.is_valid);
        assert!(standard
            .errors
            .iter()
            .any(|i| i.code == "sink_unreachable"));
    }

    #[test]
    fn test_isolated_node_is_warning() {
        let mut graph = valid_graph();
        graph.add_node(Node::new(42));

        let report = GraphValidator::new(ValidationLevel::Standard).validate(&graph);
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|i| i.code == "isolated_node"));
    }

    #[test]
    fn test_reachability_follows_direction() {
        let mut graph = valid_graph();
        // Reverse the final hops; the sink is now only weakly connected.
        for edge in graph.edges.iter_mut().filter(|e| e.to == 4) {
            std::mem::swap(&mut edge.from, &mut edge.to);
        }
        graph.edges.push(Edge::with_capacity(4, 1, 1.0));

        let report = GraphValidator::new(ValidationLevel::Standard).validate(&graph);
        assert!(report.errors.iter().any(|i| i.code == "sink_unreachable"));
    }
}
