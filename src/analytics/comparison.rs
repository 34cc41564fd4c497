//! Scenario comparison

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::efficiency::grade_efficiency;
use crate::types::{Flow, Graph};

/// A named what-if graph with its own flow assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario label, unique within a comparison
    pub name: String,
    /// The scenario graph, flows assigned
    pub graph: Graph,
    /// Caller-supplied metrics echoed into the result
    #[serde(default)]
    pub custom_metrics: HashMap<String, f64>,
}

impl Scenario {
    /// Create a scenario
    pub fn new(name: impl Into<String>, graph: Graph) -> Self {
        Self {
            name: name.into(),
            graph,
            custom_metrics: HashMap::new(),
        }
    }

    /// Attach a custom metric
    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.custom_metrics.insert(key.into(), value);
        self
    }
}

/// Derived metrics for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetrics {
    /// Scenario label
    pub name: String,
    /// Net flow delivered to the sink
    pub max_flow: Flow,
    /// Total cost of the assignment
    pub total_cost: f64,
    /// Overall efficiency score
    pub efficiency: f64,
    /// Caller-supplied metrics
    pub custom_metrics: HashMap<String, f64>,
    /// `(scenario - baseline) / baseline` on max flow; 0 for the baseline
    /// itself and when the baseline carries no flow
    pub improvement_vs_baseline: f64,
}

/// Comparison outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Metrics of the baseline graph
    pub baseline: ScenarioMetrics,
    /// Metrics per scenario, in input order
    pub scenarios: Vec<ScenarioMetrics>,
    /// Name of the scenario with the largest positive improvement; empty
    /// when none improves on the baseline
    pub best_scenario: String,
}

/// Compare scenarios against a baseline
pub fn compare_scenarios(baseline: &Graph, scenarios: &[Scenario]) -> ComparisonReport {
    let baseline_metrics = measure("baseline", baseline, &HashMap::new(), None);
    let baseline_flow = baseline_metrics.max_flow;

    let scenario_metrics: Vec<ScenarioMetrics> = scenarios
        .iter()
        .map(|s| measure(&s.name, &s.graph, &s.custom_metrics, Some(baseline_flow)))
        .collect();

    let best_scenario = scenario_metrics
        .iter()
        .filter(|m| m.improvement_vs_baseline > 0.0)
        .max_by(|a, b| {
            a.improvement_vs_baseline
                .total_cmp(&b.improvement_vs_baseline)
        })
        .map(|m| m.name.clone())
        .unwrap_or_default();

    ComparisonReport {
        baseline: baseline_metrics,
        scenarios: scenario_metrics,
        best_scenario,
    }
}

fn measure(
    name: &str,
    graph: &Graph,
    custom_metrics: &HashMap<String, f64>,
    baseline_flow: Option<Flow>,
) -> ScenarioMetrics {
    let mut max_flow = 0.0;
    let mut total_cost = 0.0;
    for edge in &graph.edges {
        total_cost += edge.current_flow * edge.cost;
        if edge.to == graph.sink_id {
            max_flow += edge.current_flow;
        }
        if edge.from == graph.sink_id {
            max_flow -= edge.current_flow;
        }
    }

    let improvement_vs_baseline = match baseline_flow {
        Some(base) if base > 0.0 => (max_flow - base) / base,
        _ => 0.0,
    };

    ScenarioMetrics {
        name: name.to_string(),
        max_flow,
        total_cost,
        efficiency: grade_efficiency(graph).overall_efficiency,
        custom_metrics: custom_metrics.clone(),
        improvement_vs_baseline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, Node};

    fn network(capacity: f64, flow: f64) -> Graph {
        let mut graph = Graph::new(1, 2);
        graph.add_node(Node::new(1)).add_node(Node::new(2));
        graph.add_edge(Edge::with_capacity(1, 2, capacity).with_flow(flow));
        graph
    }

    #[test]
    fn test_best_scenario_picked() {
        let baseline = network(100.0, 50.0);
        let scenarios = vec![
            Scenario::new("wider", network(200.0, 75.0)),
            Scenario::new("narrower", network(100.0, 40.0)),
        ];

        let report = compare_scenarios(&baseline, &scenarios);
        assert_eq!(report.best_scenario, "wider");
        assert!((report.scenarios[0].improvement_vs_baseline - 0.5).abs() < 1e-12);
        assert!(report.scenarios[1].improvement_vs_baseline < 0.0);
        assert_eq!(report.baseline.improvement_vs_baseline, 0.0);
    }

    #[test]
    fn test_no_improvement_leaves_best_empty() {
        let baseline = network(100.0, 50.0);
        let scenarios = vec![Scenario::new("worse", network(100.0, 30.0))];
        let report = compare_scenarios(&baseline, &scenarios);
        assert_eq!(report.best_scenario, "");
    }

    #[test]
    fn test_zero_baseline_has_no_ratio() {
        let baseline = network(100.0, 0.0);
        let scenarios = vec![Scenario::new("any", network(100.0, 10.0))];
        let report = compare_scenarios(&baseline, &scenarios);
        assert_eq!(report.scenarios[0].improvement_vs_baseline, 0.0);
        assert_eq!(report.best_scenario, "");
    }

    #[test]
    fn test_custom_metrics_pass_through() {
        let baseline = network(10.0, 5.0);
        let scenarios = vec![Scenario::new("tagged", network(10.0, 6.0)).with_metric("co2", 1.5)];
        let report = compare_scenarios(&baseline, &scenarios);
        assert_eq!(report.scenarios[0].custom_metrics["co2"], 1.5);
    }
}
