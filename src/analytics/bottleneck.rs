//! Bottleneck detection
//!
//! An edge is a bottleneck when its utilization reaches the configured
//! threshold (0.9 by default). Bottlenecks are ranked by utilization, carry
//! a severity bucket and an impact score, and feed the recommendation list.

use serde::{Deserialize, Serialize};

use crate::types::{Flow, Graph, NodeId};
use crate::validation::analyze_topology;

/// Severity bucket for a bottleneck
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckSeverity {
    /// Utilization at or above 0.99
    Critical,
    /// Utilization at or above 0.95
    High,
    /// Utilization at or above 0.90
    Medium,
    /// Everything else above the threshold
    Low,
}

impl BottleneckSeverity {
    /// Bucket for a utilization value
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization >= 0.99 {
            Self::Critical
        } else if utilization >= 0.95 {
            Self::High
        } else if utilization >= 0.90 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One saturated edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// Tail node id
    pub from: NodeId,
    /// Head node id
    pub to: NodeId,
    /// Index of the edge in the input graph
    pub edge_index: usize,
    /// Assigned flow
    pub flow: Flow,
    /// Edge capacity
    pub capacity: Flow,
    /// `flow / capacity`
    pub utilization: f64,
    /// Severity bucket
    pub severity: BottleneckSeverity,
    /// `utilization * (flow / total flow)`
    pub impact_score: f64,
}

/// Detection options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckOptions {
    /// Minimum utilization to count as a bottleneck
    pub threshold: f64,
    /// Keep only the N highest-utilization bottlenecks (0 = all)
    pub top_n: usize,
}

impl Default for BottleneckOptions {
    fn default() -> Self {
        Self {
            threshold: 0.9,
            top_n: 0,
        }
    }
}

/// Detection outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckReport {
    /// Bottlenecks, highest utilization first
    pub bottlenecks: Vec<Bottleneck>,
    /// Remediation suggestions derived from the bottlenecks
    pub recommendations: Vec<String>,
    /// The threshold the detection ran with
    pub threshold: f64,
}

/// Detect bottlenecks in the flow assignment carried by `graph`
pub fn find_bottlenecks(graph: &Graph, options: &BottleneckOptions) -> BottleneckReport {
    let total_flow: Flow = graph.edges.iter().map(|e| e.current_flow.max(0.0)).sum();

    let mut bottlenecks: Vec<Bottleneck> = graph
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| e.capacity > 0.0)
        .map(|(i, e)| {
            let utilization = e.utilization();
            Bottleneck {
                from: e.from,
                to: e.to,
                edge_index: i,
                flow: e.current_flow,
                capacity: e.capacity,
                utilization,
                severity: BottleneckSeverity::from_utilization(utilization),
                impact_score: if total_flow > 0.0 {
                    utilization * (e.current_flow / total_flow)
                } else {
                    0.0
                },
            }
        })
        .filter(|b| b.utilization >= options.threshold)
        .collect();

    bottlenecks.sort_by(|a, b| {
        b.utilization
            .total_cmp(&a.utilization)
            .then(a.edge_index.cmp(&b.edge_index))
    });
    if options.top_n > 0 {
        bottlenecks.truncate(options.top_n);
    }

    let recommendations = recommend(graph, &bottlenecks);

    BottleneckReport {
        bottlenecks,
        recommendations,
        threshold: options.threshold,
    }
}

fn recommend(graph: &Graph, bottlenecks: &[Bottleneck]) -> Vec<String> {
    if bottlenecks.is_empty() {
        return Vec::new();
    }
    let topology = analyze_topology(graph);
    let mut recommendations = Vec::new();

    for bottleneck in bottlenecks {
        if bottleneck.severity == BottleneckSeverity::Critical {
            recommendations.push(format!(
                "increase capacity of {} -> {}",
                bottleneck.from, bottleneck.to
            ));
        }
        if topology.is_bridge(bottleneck.from, bottleneck.to) {
            recommendations.push(format!(
                "add parallel route to {} -> {}: the saturated edge is a single point of failure",
                bottleneck.from, bottleneck.to
            ));
        }
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, Node};

    #[test]
    fn test_single_edge_high_severity() {
        let mut graph = Graph::new(1, 2);
        graph.add_node(Node::new(1)).add_node(Node::new(2));
        graph.add_edge(Edge::with_capacity(1, 2, 100.0).with_flow(95.0));

        let report = find_bottlenecks(&graph, &BottleneckOptions::default());
        assert_eq!(report.bottlenecks.len(), 1);
        let b = &report.bottlenecks[0];
        assert_eq!(b.severity, BottleneckSeverity::High);
        assert!((b.utilization - 0.95).abs() < 1e-12);
        assert!((b.impact_score - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_filters() {
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(1, 2, 10.0).with_flow(8.0))
            .add_edge(Edge::with_capacity(2, 3, 10.0).with_flow(9.5));

        let report = find_bottlenecks(&graph, &BottleneckOptions::default());
        assert_eq!(report.bottlenecks.len(), 1);
        assert_eq!(report.bottlenecks[0].edge_index, 1);
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(
            BottleneckSeverity::from_utilization(1.0),
            BottleneckSeverity::Critical
        );
        assert_eq!(
            BottleneckSeverity::from_utilization(0.97),
            BottleneckSeverity::High
        );
        assert_eq!(
            BottleneckSeverity::from_utilization(0.92),
            BottleneckSeverity::Medium
        );
        assert_eq!(
            BottleneckSeverity::from_utilization(0.5),
            BottleneckSeverity::Low
        );
    }

    #[test]
    fn test_top_n_and_ordering() {
        let mut graph = Graph::new(1, 4);
        for id in 1..=4 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(1, 2, 10.0).with_flow(9.2))
            .add_edge(Edge::with_capacity(2, 3, 10.0).with_flow(10.0))
            .add_edge(Edge::with_capacity(3, 4, 10.0).with_flow(9.6));

        let options = BottleneckOptions {
            top_n: 2,
            ..Default::default()
        };
        let report = find_bottlenecks(&graph, &options);
        assert_eq!(report.bottlenecks.len(), 2);
        assert_eq!(report.bottlenecks[0].edge_index, 1);
        assert_eq!(report.bottlenecks[1].edge_index, 2);
    }

    #[test]
    fn test_bridge_recommendation() {
        // A chain is all bridges; the saturated middle edge should draw both
        // suggestions.
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(1, 2, 10.0).with_flow(10.0))
            .add_edge(Edge::with_capacity(2, 3, 10.0).with_flow(10.0));

        let report = find_bottlenecks(&graph, &BottleneckOptions::default());
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("increase capacity of 1 -> 2")));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("add parallel route to 1 -> 2")));
    }
}
