//! Efficiency grading

use serde::{Deserialize, Serialize};

use crate::types::{Flow, Graph};

/// Letter grade from A (best) to F (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EfficiencyGrade {
    /// Overall efficiency at or above 0.85
    A,
    /// At or above 0.70
    B,
    /// At or above 0.50
    C,
    /// At or above 0.30
    D,
    /// Everything below
    F,
}

impl EfficiencyGrade {
    /// Grade for an overall efficiency score
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            Self::A
        } else if score >= 0.70 {
            Self::B
        } else if score >= 0.50 {
            Self::C
        } else if score >= 0.30 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl std::fmt::Display for EfficiencyGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// Efficiency scores and the resulting grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    /// `sum(flow) / sum(capacity)` over edges with positive capacity
    pub capacity_utilization: f64,
    /// Normalized flow per unit of cost; 0 when the network is free
    pub cost_efficiency: f64,
    /// The blended score the grade is taken from
    pub overall_efficiency: f64,
    /// Letter grade
    pub grade: EfficiencyGrade,
    /// Total flow observed on the edges
    pub total_flow: Flow,
    /// Total cost of the assignment
    pub total_cost: f64,
}

/// Weight of capacity utilization in the overall score when cost data exists
const CAPACITY_WEIGHT: f64 = 0.7;

/// Grade the flow assignment carried by `graph`
///
/// With a free network (zero total cost) the cost term is undefined and the
/// overall score is the capacity utilization alone.
pub fn grade_efficiency(graph: &Graph) -> EfficiencyReport {
    let mut total_flow = 0.0;
    let mut total_capacity = 0.0;
    let mut total_cost = 0.0;

    for edge in &graph.edges {
        if edge.capacity > 0.0 {
            total_flow += edge.current_flow;
            total_capacity += edge.capacity;
        }
        total_cost += edge.current_flow * edge.cost;
    }

    let capacity_utilization = if total_capacity > 0.0 {
        total_flow / total_capacity
    } else {
        0.0
    };

    let (cost_efficiency, overall_efficiency) = if total_cost > 0.0 {
        let ratio = total_flow / total_cost;
        let cost_efficiency = ratio / (1.0 + ratio);
        (
            cost_efficiency,
            CAPACITY_WEIGHT * capacity_utilization + (1.0 - CAPACITY_WEIGHT) * cost_efficiency,
        )
    } else {
        (0.0, capacity_utilization)
    };

    EfficiencyReport {
        capacity_utilization,
        cost_efficiency,
        overall_efficiency,
        grade: EfficiencyGrade::from_score(overall_efficiency),
        total_flow,
        total_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, Node};

    fn single_edge(flow: f64) -> Graph {
        let mut graph = Graph::new(1, 2);
        graph.add_node(Node::new(1)).add_node(Node::new(2));
        graph.add_edge(Edge::with_capacity(1, 2, 100.0).with_flow(flow));
        graph
    }

    #[test]
    fn test_grade_boundaries() {
        let cases = [
            (90.0, EfficiencyGrade::A),
            (70.0, EfficiencyGrade::B),
            (50.0, EfficiencyGrade::C),
            (30.0, EfficiencyGrade::D),
            (10.0, EfficiencyGrade::F),
        ];
        for (flow, expected) in cases {
            let report = grade_efficiency(&single_edge(flow));
            assert_eq!(report.grade, expected, "flow {flow}");
        }
    }

    #[test]
    fn test_cost_efficiency_blends_in() {
        let mut graph = single_edge(90.0);
        graph.edges[0].cost = 1.0;

        let report = grade_efficiency(&graph);
        assert!(report.total_cost > 0.0);
        assert!(report.cost_efficiency > 0.0);
        let expected =
            0.7 * report.capacity_utilization + 0.3 * report.cost_efficiency;
        assert!((report.overall_efficiency - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_graph_is_f() {
        let graph = Graph::new(1, 2);
        let report = grade_efficiency(&graph);
        assert_eq!(report.capacity_utilization, 0.0);
        assert_eq!(report.grade, EfficiencyGrade::F);
    }
}
