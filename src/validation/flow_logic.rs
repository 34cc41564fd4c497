//! Flow-logic validation
//!
//! Checks an already-assigned flow (`current_flow` on each edge) against
//! capacity bounds and conservation, independently of any solver run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ValidationIssue;
use crate::error::ErrorKind;
use crate::types::{Flow, Graph, NodeId, DEFAULT_EPSILON};

/// Options for the flow-logic validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowCheckOptions {
    /// Conservation tolerance
    pub epsilon: f64,
    /// When set, the observed total flow must match this value
    pub expected_max_flow: Option<Flow>,
}

impl Default for FlowCheckOptions {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            expected_max_flow: None,
        }
    }
}

/// Outcome of a flow-logic validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowCheck {
    /// True when no violation was found
    pub is_valid: bool,
    /// Violations, in edge/node order
    pub violations: Vec<ValidationIssue>,
    /// Net flow into the sink
    pub total_flow: Flow,
}

/// Validate the flow assignment carried by the graph's edges
pub fn validate_flow(graph: &Graph, options: &FlowCheckOptions) -> FlowCheck {
    let epsilon = options.epsilon;
    let mut violations = Vec::new();

    for (i, edge) in graph.edges.iter().enumerate() {
        if edge.current_flow < -epsilon {
            violations.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "negative_flow",
                format!("flow {} is negative", edge.current_flow),
                format!("edges[{i}].current_flow"),
            ));
        }
        if edge.current_flow > edge.capacity + epsilon {
            violations.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "flow_exceeds_capacity",
                format!(
                    "flow {} exceeds capacity {}",
                    edge.current_flow, edge.capacity
                ),
                format!("edges[{i}].current_flow"),
            ));
        }
    }

    // Net flow per node: inflow - outflow.
    let mut net: HashMap<NodeId, Flow> = HashMap::new();
    for edge in &graph.edges {
        *net.entry(edge.to).or_insert(0.0) += edge.current_flow;
        *net.entry(edge.from).or_insert(0.0) -= edge.current_flow;
    }

    for node in &graph.nodes {
        if node.id == graph.source_id || node.id == graph.sink_id {
            continue;
        }
        let imbalance = net.get(&node.id).copied().unwrap_or(0.0);
        if imbalance.abs() > epsilon {
            violations.push(ValidationIssue::error(
                ErrorKind::InvalidGraph,
                "conservation_violated",
                format!(
                    "node {} receives {} more than it sends",
                    node.id, imbalance
                ),
                format!("nodes[{}]", node.id),
            ));
        }
    }

    let total_flow = net.get(&graph.sink_id).copied().unwrap_or(0.0);
    let source_net = net.get(&graph.source_id).copied().unwrap_or(0.0);
    if (source_net + total_flow).abs() > epsilon {
        violations.push(ValidationIssue::error(
            ErrorKind::InvalidGraph,
            "source_sink_mismatch",
            format!(
                "source sends {} but sink receives {}",
                -source_net, total_flow
            ),
            "source_id",
        ));
    }

    if let Some(expected) = options.expected_max_flow {
        if (total_flow - expected).abs() > epsilon {
            violations.push(ValidationIssue::error(
                ErrorKind::Infeasible,
                "unexpected_max_flow",
                format!("total flow {total_flow} does not match expected {expected}"),
                "expected_max_flow",
            ));
        }
    }

    FlowCheck {
        is_valid: violations.is_empty(),
        violations,
        total_flow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, Node};

    fn flowing_chain() -> Graph {
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(1, 2, 10.0).with_flow(7.0))
            .add_edge(Edge::with_capacity(2, 3, 10.0).with_flow(7.0));
        graph
    }

    #[test]
    fn test_consistent_flow_passes() {
        let check = validate_flow(&flowing_chain(), &FlowCheckOptions::default());
        assert!(check.is_valid);
        assert_eq!(check.total_flow, 7.0);
    }

    #[test]
    fn test_overflow_flagged() {
        let mut graph = flowing_chain();
        graph.edges[0].current_flow = 12.0;

        let check = validate_flow(&graph, &FlowCheckOptions::default());
        assert!(!check.is_valid);
        assert!(check
            .violations
            .iter()
            .any(|v| v.code == "flow_exceeds_capacity"));
        assert!(check
            .violations
            .iter()
            .any(|v| v.code == "conservation_violated"));
    }

    #[test]
    fn test_conservation_within_epsilon() {
        let mut graph = flowing_chain();
        graph.edges[1].current_flow = 7.0 + 1e-12;
        let check = validate_flow(&graph, &FlowCheckOptions::default());
        assert!(check.is_valid);
    }

    #[test]
    fn test_expected_max_flow_mismatch() {
        let options = FlowCheckOptions {
            expected_max_flow: Some(9.0),
            ..Default::default()
        };
        let check = validate_flow(&flowing_chain(), &options);
        assert!(!check.is_valid);
        let issue = check
            .violations
            .iter()
            .find(|v| v.code == "unexpected_max_flow")
            .unwrap();
        assert_eq!(issue.kind, ErrorKind::Infeasible);
    }
}
