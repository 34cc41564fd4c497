//! Per-algorithm compatibility validation

use serde::{Deserialize, Serialize};

use super::{Severity, ValidationIssue};
use crate::error::ErrorKind;
use crate::types::{Algorithm, Graph};

/// Outcome of an algorithm-compatibility check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// The algorithm that was checked
    pub algorithm: Algorithm,
    /// True when no blocking issue was found
    pub is_compatible: bool,
    /// Blockers and advisories
    pub issues: Vec<ValidationIssue>,
}

/// Enumerate blockers and advisories for running `algorithm` on `graph`
pub fn check_compatibility(graph: &Graph, algorithm: Algorithm) -> CompatibilityReport {
    let mut issues = Vec::new();

    // No variant accepts negative costs: the cost-minimizing search needs
    // non-negative reduced costs and the max-flow variants would report a
    // meaningless total cost.
    for (i, edge) in graph.edges.iter().enumerate() {
        if edge.cost < 0.0 {
            issues.push(ValidationIssue::error(
                ErrorKind::AlgorithmMismatch,
                "negative_cost",
                format!("{algorithm} requires non-negative costs, found {}", edge.cost),
                format!("edges[{i}].cost"),
            ));
        }
    }

    match algorithm {
        Algorithm::FordFulkerson => {
            advise_on_fractional_capacities(
                graph,
                &mut issues,
                "depth-first augmentation may creep toward the epsilon with fractional capacities",
            );
        }
        Algorithm::PushRelabel => {
            advise_on_fractional_capacities(
                graph,
                &mut issues,
                "push-relabel behaves best with integral or well-scaled capacities",
            );
        }
        Algorithm::EdmondsKarp | Algorithm::Dinic | Algorithm::SuccessiveShortestPaths => {}
    }

    CompatibilityReport {
        algorithm,
        is_compatible: issues.iter().all(|i| i.severity != Severity::Error),
        issues,
    }
}

fn advise_on_fractional_capacities(graph: &Graph, issues: &mut Vec<ValidationIssue>, note: &str) {
    let fractional = graph
        .edges
        .iter()
        .filter(|e| e.capacity.fract() != 0.0)
        .count();
    if fractional > 0 {
        issues.push(ValidationIssue::warning(
            ErrorKind::AlgorithmMismatch,
            "fractional_capacities",
            format!("{fractional} edges have fractional capacities; {note}"),
            "edges",
        ));
    }
}
