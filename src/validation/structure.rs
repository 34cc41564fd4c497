//! Basic level: structural invariants

use std::collections::HashSet;

use super::{CheckSet, ValidationIssue};
use crate::error::ErrorKind;
use crate::types::Graph;

pub(crate) fn check(graph: &Graph, checks: &mut CheckSet) {
    checks.record(check_not_empty(graph));
    checks.record(check_unique_node_ids(graph));
    checks.record(check_endpoints_exist(graph));
    checks.record(check_capacity_signs(graph));
    checks.record(check_cost_signs(graph));
    checks.record(check_source_sink(graph));
}

fn check_not_empty(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if graph.nodes.is_empty() {
        issues.push(ValidationIssue::error(
            ErrorKind::InvalidGraph,
            "empty_graph",
            "graph has no nodes",
            "nodes",
        ));
    }
    if graph.edges.is_empty() && !graph.nodes.is_empty() {
        issues.push(ValidationIssue::warning(
            ErrorKind::InvalidGraph,
            "no_edges",
            "graph has no edges; the only feasible flow is zero",
            "edges",
        ));
    }
    issues
}

fn check_unique_node_ids(graph: &Graph) -> Vec<ValidationIssue> {
    let mut seen = HashSet::with_capacity(graph.nodes.len());
    let mut issues = Vec::new();
    for (i, node) in graph.nodes.iter().enumerate() {
        if !seen.insert(node.id) {
            issues.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "duplicate_node_id",
                format!("node id {} appears more than once", node.id),
                format!("nodes[{i}].id"),
            ));
        }
    }
    issues
}

fn check_endpoints_exist(graph: &Graph) -> Vec<ValidationIssue> {
    let ids: HashSet<_> = graph.nodes.iter().map(|n| n.id).collect();
    let mut issues = Vec::new();
    for (i, edge) in graph.edges.iter().enumerate() {
        if !ids.contains(&edge.from) {
            issues.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "unknown_edge_endpoint",
                format!("edge references missing node {}", edge.from),
                format!("edges[{i}].from"),
            ));
        }
        if !ids.contains(&edge.to) {
            issues.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "unknown_edge_endpoint",
                format!("edge references missing node {}", edge.to),
                format!("edges[{i}].to"),
            ));
        }
    }
    issues
}

fn check_capacity_signs(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, edge) in graph.edges.iter().enumerate() {
        if !edge.capacity.is_finite() || edge.capacity < 0.0 {
            issues.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "negative_capacity",
                format!("capacity {} is not a non-negative number", edge.capacity),
                format!("edges[{i}].capacity"),
            ));
        }
    }
    issues
}

fn check_cost_signs(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (i, edge) in graph.edges.iter().enumerate() {
        if !edge.cost.is_finite() || edge.cost < 0.0 {
            issues.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "negative_cost",
                format!("cost {} is not a non-negative number", edge.cost),
                format!("edges[{i}].cost"),
            ));
        }
    }
    issues
}

fn check_source_sink(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if graph.source_id == graph.sink_id {
        issues.push(ValidationIssue::error(
            ErrorKind::InvalidGraph,
            "source_equals_sink",
            "source and sink must be different nodes",
            "source_id",
        ));
    }
    if !graph.has_node(graph.source_id) {
        issues.push(ValidationIssue::error(
            ErrorKind::InvalidGraph,
            "missing_source",
            format!("source node {} does not exist", graph.source_id),
            "source_id",
        ));
    }
    if !graph.has_node(graph.sink_id) {
        issues.push(ValidationIssue::error(
            ErrorKind::InvalidGraph,
            "missing_sink",
            format!("sink node {} does not exist", graph.sink_id),
            "sink_id",
        ));
    }
    issues
}
