//! Analytics service facade

use flowgrid_optimization::analytics::{
    calculate_cost, compare_scenarios, find_bottlenecks, grade_efficiency, BottleneckOptions,
    BottleneckReport, ComparisonReport, CostOptions, CostReport, EfficiencyReport, Scenario,
};
use flowgrid_optimization::validation::{validate_flow, FlowCheck, FlowCheckOptions};
use flowgrid_optimization::Graph;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::basic_defects;

/// Facade for the analytics RPCs.
///
/// Every call validates the graph at the basic level first and reports
/// structural defects in the envelope.
#[derive(Debug, Default)]
pub struct AnalyticsService;

/// Cost calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateCostRequest {
    /// The graph, flows assigned on its edges
    pub graph: Graph,
    /// Cost model; `None` uses the defaults
    pub options: Option<CostOptions>,
}

/// Cost calculation response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateCostResponse {
    /// Whether the calculation ran
    pub success: bool,
    /// Structural defects when it did not
    pub error_message: Option<String>,
    /// The cost report
    pub report: Option<CostReport>,
}

/// Bottleneck detection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindBottlenecksRequest {
    /// The graph, flows assigned on its edges
    pub graph: Graph,
    /// Detection options; `None` uses the defaults
    pub options: Option<BottleneckOptions>,
}

/// Bottleneck detection response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindBottlenecksResponse {
    /// Whether the detection ran
    pub success: bool,
    /// Structural defects when it did not
    pub error_message: Option<String>,
    /// The bottleneck report
    pub report: Option<BottleneckReport>,
}

/// Combined flow analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeFlowRequest {
    /// The graph, flows assigned on its edges
    pub graph: Graph,
    /// Cost model; `None` uses the defaults
    pub cost_options: Option<CostOptions>,
    /// Detection options; `None` uses the defaults
    pub bottleneck_options: Option<BottleneckOptions>,
}

/// Combined flow analysis response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeFlowResponse {
    /// Whether the analysis ran
    pub success: bool,
    /// Structural or flow-logic defects when it did not
    pub error_message: Option<String>,
    /// Flow-logic check of the assignment
    pub flow_check: Option<FlowCheck>,
    /// Efficiency grading
    pub efficiency: Option<EfficiencyReport>,
    /// Bottleneck analysis
    pub bottlenecks: Option<BottleneckReport>,
    /// Cost decomposition
    pub cost: Option<CostReport>,
}

/// Scenario comparison request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareScenariosRequest {
    /// The baseline graph, flows assigned
    pub baseline: Graph,
    /// The scenarios to compare against it
    pub scenarios: Vec<Scenario>,
}

/// Scenario comparison response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareScenariosResponse {
    /// Whether the comparison ran
    pub success: bool,
    /// Structural defects when it did not
    pub error_message: Option<String>,
    /// The comparison report
    pub report: Option<ComparisonReport>,
}

impl AnalyticsService {
    /// Create the facade.
    pub fn new() -> Self {
        Self
    }

    /// Decompose the cost of a flow assignment.
    #[instrument(skip_all, fields(edges = request.graph.edge_count()))]
    pub async fn calculate_cost(&self, request: CalculateCostRequest) -> CalculateCostResponse {
        if let Some(defects) = basic_defects(&request.graph) {
            return CalculateCostResponse {
                success: false,
                error_message: Some(defects),
                report: None,
            };
        }
        let report = calculate_cost(&request.graph, &request.options.unwrap_or_default());
        CalculateCostResponse {
            success: true,
            error_message: None,
            report: Some(report),
        }
    }

    /// Detect utilization hot-spots.
    #[instrument(skip_all, fields(edges = request.graph.edge_count()))]
    pub async fn find_bottlenecks(&self, request: FindBottlenecksRequest) -> FindBottlenecksResponse {
        if let Some(defects) = basic_defects(&request.graph) {
            return FindBottlenecksResponse {
                success: false,
                error_message: Some(defects),
                report: None,
            };
        }
        let report = find_bottlenecks(&request.graph, &request.options.unwrap_or_default());
        FindBottlenecksResponse {
            success: true,
            error_message: None,
            report: Some(report),
        }
    }

    /// Run the full analysis battery over one assignment.
    #[instrument(skip_all, fields(edges = request.graph.edge_count()))]
    pub async fn analyze_flow(&self, request: AnalyzeFlowRequest) -> AnalyzeFlowResponse {
        if let Some(defects) = basic_defects(&request.graph) {
            return AnalyzeFlowResponse {
                success: false,
                error_message: Some(defects),
                flow_check: None,
                efficiency: None,
                bottlenecks: None,
                cost: None,
            };
        }

        let flow_check = validate_flow(&request.graph, &FlowCheckOptions::default());
        let success = flow_check.is_valid;
        let error_message = (!success).then(|| {
            flow_check
                .violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        });

        AnalyzeFlowResponse {
            success,
            error_message,
            efficiency: Some(grade_efficiency(&request.graph)),
            bottlenecks: Some(find_bottlenecks(
                &request.graph,
                &request.bottleneck_options.unwrap_or_default(),
            )),
            cost: Some(calculate_cost(
                &request.graph,
                &request.cost_options.unwrap_or_default(),
            )),
            flow_check: Some(flow_check),
        }
    }

    /// Compare scenarios against a baseline.
    #[instrument(skip_all, fields(scenarios = request.scenarios.len()))]
    pub async fn compare_scenarios(
        &self,
        request: CompareScenariosRequest,
    ) -> CompareScenariosResponse {
        if let Some(defects) = basic_defects(&request.baseline) {
            return CompareScenariosResponse {
                success: false,
                error_message: Some(format!("baseline: {defects}")),
                report: None,
            };
        }
        for scenario in &request.scenarios {
            if let Some(defects) = basic_defects(&scenario.graph) {
                return CompareScenariosResponse {
                    success: false,
                    error_message: Some(format!("scenario {}: {defects}", scenario.name)),
                    report: None,
                };
            }
        }
        let report = compare_scenarios(&request.baseline, &request.scenarios);
        CompareScenariosResponse {
            success: true,
            error_message: None,
            report: Some(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_optimization::{Edge, Node};

    fn flowing_chain() -> Graph {
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::new(1, 2, 10.0, 2.0).with_flow(9.5))
            .add_edge(Edge::new(2, 3, 10.0, 1.0).with_flow(9.5));
        graph
    }

    #[tokio::test]
    async fn test_calculate_cost() {
        let response = AnalyticsService::new()
            .calculate_cost(CalculateCostRequest {
                graph: flowing_chain(),
                options: None,
            })
            .await;
        assert!(response.success);
        assert_eq!(response.report.unwrap().total_cost, 9.5 * 2.0 + 9.5);
    }

    #[tokio::test]
    async fn test_invalid_graph_in_envelope() {
        let mut graph = flowing_chain();
        graph.sink_id = 1;
        let response = AnalyticsService::new()
            .calculate_cost(CalculateCostRequest {
                graph,
                options: None,
            })
            .await;
        assert!(!response.success);
        assert!(response.error_message.is_some());
    }

    #[tokio::test]
    async fn test_analyze_flow_bundles_everything() {
        let response = AnalyticsService::new()
            .analyze_flow(AnalyzeFlowRequest {
                graph: flowing_chain(),
                cost_options: None,
                bottleneck_options: None,
            })
            .await;
        assert!(response.success);
        assert_eq!(response.bottlenecks.unwrap().bottlenecks.len(), 2);
        assert!(response.efficiency.unwrap().capacity_utilization > 0.9);
        assert!(response.flow_check.unwrap().is_valid);
    }

    #[tokio::test]
    async fn test_compare_scenarios() {
        let mut wider = flowing_chain();
        wider.edges[0].current_flow = 10.0;
        wider.edges[1].current_flow = 10.0;

        let response = AnalyticsService::new()
            .compare_scenarios(CompareScenariosRequest {
                baseline: flowing_chain(),
                scenarios: vec![Scenario::new("wider", wider)],
            })
            .await;
        assert!(response.success);
        assert_eq!(response.report.unwrap().best_scenario, "wider");
    }
}
