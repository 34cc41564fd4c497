//! Validation service facade

use std::time::Instant;

use flowgrid_optimization::validation::{
    check_compatibility, validate_flow, CompatibilityReport, FlowCheck, FlowCheckOptions,
    GraphValidator, ValidationLevel, ValidationReport,
};
use flowgrid_optimization::{Algorithm, Graph, DEFAULT_EPSILON};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ValidationConfig;

/// Facade for the validation RPCs.
pub struct ValidationService {
    config: ValidationConfig,
    started: Instant,
}

/// Graph validation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateGraphRequest {
    /// The graph to validate
    pub graph: Graph,
    /// Validation level; `None` takes the configured default
    pub level: Option<ValidationLevel>,
    /// Sanity ceiling for capacities at the strict level
    pub capacity_ceiling: Option<f64>,
}

/// Graph validation response envelope; `success` mirrors `is_valid` since
/// validation diagnostics always travel in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateGraphResponse {
    /// Whether the graph passed
    pub success: bool,
    /// Summary of the errors when it did not
    pub error_message: Option<String>,
    /// The full report
    pub report: ValidationReport,
}

/// Flow validation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateFlowRequest {
    /// The graph, flows assigned on its edges
    pub graph: Graph,
    /// Conservation tolerance; `None` uses the engine default
    pub epsilon: Option<f64>,
    /// When set, the observed total flow must match
    pub expected_max_flow: Option<f64>,
}

/// Flow validation response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateFlowResponse {
    /// Whether the assignment is consistent
    pub success: bool,
    /// Summary of the violations when it is not
    pub error_message: Option<String>,
    /// The full check outcome
    pub check: FlowCheck,
}

/// Algorithm compatibility request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateForAlgorithmRequest {
    /// The graph to check
    pub graph: Graph,
    /// The algorithm it would be solved with
    pub algorithm: Algorithm,
}

/// Algorithm compatibility response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateForAlgorithmResponse {
    /// Whether the pairing is runnable
    pub success: bool,
    /// Summary of the blockers when it is not
    pub error_message: Option<String>,
    /// The full report
    pub report: CompatibilityReport,
}

/// Combined validation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateAllRequest {
    /// The graph to validate
    pub graph: Graph,
    /// Validation level; `None` takes the configured default
    pub level: Option<ValidationLevel>,
    /// Also check compatibility with this algorithm
    pub algorithm: Option<Algorithm>,
    /// Conservation tolerance for the flow check
    pub epsilon: Option<f64>,
    /// When set, the observed total flow must match
    pub expected_max_flow: Option<f64>,
}

/// Combined validation response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateAllResponse {
    /// Whether every requested check passed
    pub success: bool,
    /// Summary of the failures when one did not
    pub error_message: Option<String>,
    /// Level-driven graph report
    pub graph_report: ValidationReport,
    /// Flow-logic check
    pub flow_check: FlowCheck,
    /// Compatibility report, when an algorithm was named
    pub compatibility: Option<CompatibilityReport>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationHealthResponse {
    /// Liveness flag
    pub healthy: bool,
    /// Crate version
    pub version: String,
    /// Seconds since the facade was created
    pub uptime_seconds: u64,
}

impl ValidationService {
    /// Create the facade with the given defaults.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
        }
    }

    /// Level-driven graph validation.
    #[instrument(skip_all, fields(level = ?request.level, nodes = request.graph.node_count()))]
    pub async fn validate_graph(&self, request: ValidateGraphRequest) -> ValidateGraphResponse {
        let level = request.level.unwrap_or(self.config.default_level);
        let mut validator = GraphValidator::new(level);
        if let Some(ceiling) = request.capacity_ceiling {
            validator = validator.with_capacity_ceiling(ceiling);
        }
        let report = validator.validate(&request.graph);
        ValidateGraphResponse {
            success: report.is_valid,
            error_message: summarize(report.errors.iter().map(|e| e.message.as_str())),
            report,
        }
    }

    /// Flow-logic validation.
    #[instrument(skip_all, fields(edges = request.graph.edge_count()))]
    pub async fn validate_flow(&self, request: ValidateFlowRequest) -> ValidateFlowResponse {
        let check = validate_flow(
            &request.graph,
            &FlowCheckOptions {
                epsilon: request.epsilon.unwrap_or(DEFAULT_EPSILON),
                expected_max_flow: request.expected_max_flow,
            },
        );
        ValidateFlowResponse {
            success: check.is_valid,
            error_message: summarize(check.violations.iter().map(|v| v.message.as_str())),
            check,
        }
    }

    /// Per-algorithm compatibility validation.
    #[instrument(skip_all, fields(algorithm = %request.algorithm))]
    pub async fn validate_for_algorithm(
        &self,
        request: ValidateForAlgorithmRequest,
    ) -> ValidateForAlgorithmResponse {
        let report = check_compatibility(&request.graph, request.algorithm);
        ValidateForAlgorithmResponse {
            success: report.is_compatible,
            error_message: summarize(report.issues.iter().map(|i| i.message.as_str())),
            report,
        }
    }

    /// Every validator in one call.
    #[instrument(skip_all)]
    pub async fn validate_all(&self, request: ValidateAllRequest) -> ValidateAllResponse {
        let graph_response = self
            .validate_graph(ValidateGraphRequest {
                graph: request.graph.clone(),
                level: request.level,
                capacity_ceiling: None,
            })
            .await;
        let flow_response = self
            .validate_flow(ValidateFlowRequest {
                graph: request.graph.clone(),
                epsilon: request.epsilon,
                expected_max_flow: request.expected_max_flow,
            })
            .await;
        let compatibility = match request.algorithm {
            Some(algorithm) => Some(
                self.validate_for_algorithm(ValidateForAlgorithmRequest {
                    graph: request.graph,
                    algorithm,
                })
                .await
                .report,
            ),
            None => None,
        };

        let success = graph_response.success
            && flow_response.success
            && compatibility.as_ref().map_or(true, |c| c.is_compatible);
        let mut failures = Vec::new();
        if let Some(message) = &graph_response.error_message {
            failures.push(message.as_str());
        }
        if let Some(message) = &flow_response.error_message {
            failures.push(message.as_str());
        }

        ValidateAllResponse {
            success,
            error_message: summarize(failures.into_iter()),
            graph_report: graph_response.report,
            flow_check: flow_response.check,
            compatibility,
        }
    }

    /// Liveness probe.
    pub async fn health(&self) -> ValidationHealthResponse {
        ValidationHealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
        }
    }
}

fn summarize<'a>(messages: impl Iterator<Item = &'a str>) -> Option<String> {
    let collected: Vec<&str> = messages.collect();
    if collected.is_empty() {
        None
    } else {
        Some(collected.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_optimization::{Edge, Node};

    fn service() -> ValidationService {
        ValidationService::new(ValidationConfig::default())
    }

    fn chain() -> Graph {
        let mut graph = Graph::new(1, 3);
        for id in 1..=3 {
            graph.add_node(Node::new(id));
        }
        graph
            .add_edge(Edge::with_capacity(1, 2, 10.0).with_flow(5.0))
            .add_edge(Edge::with_capacity(2, 3, 10.0).with_flow(5.0));
        graph
    }

    #[tokio::test]
    async fn test_validate_graph_envelope() {
        let ok = service()
            .validate_graph(ValidateGraphRequest {
                graph: chain(),
                level: None,
                capacity_ceiling: None,
            })
            .await;
        assert!(ok.success);
        assert!(ok.error_message.is_none());

        let mut broken = chain();
        broken.edges[0].capacity = -1.0;
        let bad = service()
            .validate_graph(ValidateGraphRequest {
                graph: broken,
                level: None,
                capacity_ceiling: None,
            })
            .await;
        assert!(!bad.success);
        assert!(bad.error_message.is_some());
        assert!(!bad.report.is_valid);
    }

    #[tokio::test]
    async fn test_validate_flow_envelope() {
        let mut graph = chain();
        graph.edges[1].current_flow = 3.0;
        let response = service()
            .validate_flow(ValidateFlowRequest {
                graph,
                epsilon: None,
                expected_max_flow: None,
            })
            .await;
        assert!(!response.success);
        assert!(response
            .check
            .violations
            .iter()
            .any(|v| v.code == "conservation_violated"));
    }

    #[tokio::test]
    async fn test_validate_all_combines() {
        let response = service()
            .validate_all(ValidateAllRequest {
                graph: chain(),
                level: Some(ValidationLevel::Full),
                algorithm: Some(Algorithm::SuccessiveShortestPaths),
                epsilon: None,
                expected_max_flow: Some(5.0),
            })
            .await;
        assert!(response.success);
        assert!(response.compatibility.unwrap().is_compatible);
        assert_eq!(response.flow_check.total_flow, 5.0);
    }

    #[tokio::test]
    async fn test_health() {
        let response = service().health().await;
        assert!(response.healthy);
        assert!(!response.version.is_empty());
    }
}
