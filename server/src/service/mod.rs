//! Service facades
//!
//! One facade per logical service, each mirroring the RPC surface: request
//! structs in, envelope-shaped response structs out
//! (`success`/`error_message` plus the payload). The wire transport binds to
//! these; the facades own request shaping, telemetry spans, and persistence
//! coordination.
//!
//! Error propagation rules:
//! - validation diagnostics always travel in the envelope, never as
//!   call-level errors;
//! - solver runtime failures (timeouts that error, iteration limits,
//!   internal faults) are call-level;
//! - repository failures are call-level only for `list_reports` and
//!   `get_repository_stats`;
//! - persistence failures during report generation are logged and do not
//!   fail the call.

pub mod analytics;
pub mod report;
pub mod solver;
pub mod validation;

pub use analytics::AnalyticsService;
pub use report::ReportService;
pub use solver::SolverService;
pub use validation::ValidationService;

use flowgrid_optimization::validation::{GraphValidator, ValidationLevel};
use flowgrid_optimization::Graph;

/// Basic-level validation gate shared by the facades; returns the combined
/// error message when the graph is structurally unsound.
pub(crate) fn basic_defects(graph: &Graph) -> Option<String> {
    let report = GraphValidator::new(ValidationLevel::Basic).validate(graph);
    if report.is_valid {
        None
    } else {
        let messages: Vec<&str> = report.errors.iter().map(|e| e.message.as_str()).collect();
        Some(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_optimization::{Edge, Node};

    #[test]
    fn test_basic_defects_gate() {
        let mut graph = Graph::new(1, 2);
        graph.add_node(Node::new(1)).add_node(Node::new(2));
        graph.add_edge(Edge::with_capacity(1, 2, 5.0));
        assert!(basic_defects(&graph).is_none());

        graph.edges[0].capacity = -1.0;
        let message = basic_defects(&graph).unwrap();
        assert!(message.contains("-1"));
    }
}
