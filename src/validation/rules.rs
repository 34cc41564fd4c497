//! Strict level: business rules for logistics networks

use std::collections::HashMap;

use super::{CheckSet, ValidationIssue};
use crate::error::ErrorKind;
use crate::types::{Graph, NodeId, NodeKind};

pub(crate) fn check(graph: &Graph, capacity_ceiling: Option<f64>, checks: &mut CheckSet) {
    checks.record(check_delivery_points(graph));
    checks.record(check_warehouses(graph));
    checks.record(check_self_loops(graph));
    checks.record(check_capacity_ceiling(graph, capacity_ceiling));
}

/// Delivery points are endpoints of the distribution chain: any outgoing
/// capacity may only lead to the sink
fn check_delivery_points(graph: &Graph) -> Vec<ValidationIssue> {
    let kinds: HashMap<NodeId, NodeKind> = graph
        .nodes
        .iter()
        .filter_map(|n| n.kind.map(|k| (n.id, k)))
        .collect();

    let mut issues = Vec::new();
    for (i, edge) in graph.edges.iter().enumerate() {
        let from_delivery = kinds.get(&edge.from) == Some(&NodeKind::DeliveryPoint);
        if from_delivery && edge.to != graph.sink_id && edge.capacity > 0.0 {
            issues.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "delivery_point_outflow",
                format!(
                    "delivery point {} has outgoing capacity to non-sink node {}",
                    edge.from, edge.to
                ),
                format!("edges[{i}]"),
            ));
        }
    }
    issues
}

/// A warehouse that cannot ship anything is a modeling mistake
fn check_warehouses(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, node) in graph.nodes.iter().enumerate() {
        if node.kind != Some(NodeKind::Warehouse) {
            continue;
        }
        let has_outgoing = graph.edges.iter().any(|e| e.from == node.id);
        if !has_outgoing {
            issues.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "warehouse_without_outflow",
                format!("warehouse {} has no outgoing edge", node.id),
                format!("nodes[{i}]"),
            ));
        }
    }
    issues
}

fn check_self_loops(graph: &Graph) -> Vec<ValidationIssue> {
    graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_self_loop())
        .map(|(i, e)| {
            ValidationIssue::warning(
                ErrorKind::InvalidGraph,
                "self_loop",
                format!("edge {} -> {} is a self-loop and can carry no flow", e.from, e.to),
                format!("edges[{i}]"),
            )
        })
        .collect()
}

fn check_capacity_ceiling(graph: &Graph, ceiling: Option<f64>) -> Vec<ValidationIssue> {
    let Some(ceiling) = ceiling else {
        return Vec::new();
    };
    graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.capacity > ceiling)
        .map(|(i, e)| {
            ValidationIssue::warning(
                ErrorKind::InvalidGraph,
                "capacity_above_ceiling",
                format!(
                    "capacity {} exceeds the sanity ceiling {}",
                    e.capacity, ceiling
                ),
                format!("edges[{i}].capacity"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::types::{Edge, Node, NodeKind};
    use crate::validation::tests::valid_graph;
    use crate::validation::{GraphValidator, ValidationLevel};

    #[test]
    fn test_delivery_point_outflow_rejected() {
        let mut graph = valid_graph();
        graph.nodes[1].kind = Some(NodeKind::DeliveryPoint);
        // nodes[1] is node 2, which ships to node 4 (the sink): allowed.
        let report = GraphValidator::new(ValidationLevel::Strict).validate(&graph);
        assert!(report.is_valid);

        // An extra edge to a non-sink node violates the rule.
        graph.add_edge(Edge::with_capacity(2, 3, 5.0));
        let report = GraphValidator::new(ValidationLevel::Strict).validate(&graph);
        assert!(report
            .errors
            .iter()
            .any(|i| i.code == "delivery_point_outflow"));
    }

    #[test]
    fn test_warehouse_needs_outgoing_edge() {
        let mut graph = valid_graph();
        graph.add_node(Node::new(5).with_kind(NodeKind::Warehouse));
        graph.add_edge(Edge::with_capacity(1, 5, 3.0));

        let report = GraphValidator::new(ValidationLevel::Strict).validate(&graph);
        assert!(report
            .errors
            .iter()
            .any(|i| i.code == "warehouse_without_outflow"));
    }

    #[test]
    fn test_self_loop_warns_at_strict() {
        let mut graph = valid_graph();
        graph.add_edge(Edge::with_capacity(2, 2, 1.0));

        let standard = GraphValidator::new(ValidationLevel::Standard).validate(&graph);
        assert!(standard.warnings.iter().all(|i| i.code != "self_loop"));

        let strict = GraphValidator::new(ValidationLevel::Strict).validate(&graph);
        assert!(strict.is_valid);
        assert!(strict.warnings.iter().any(|i| i.code == "self_loop"));
    }

    #[test]
    fn test_capacity_ceiling() {
        let graph = valid_graph();
        let report = GraphValidator::new(ValidationLevel::Strict)
            .with_capacity_ceiling(5.0)
            .validate(&graph);
        assert!(report.is_valid);
        assert_eq!(
            report
                .warnings
                .iter()
                .filter(|i| i.code == "capacity_above_ceiling")
                .count(),
            4
        );
    }
}
