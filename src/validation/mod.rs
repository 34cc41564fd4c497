//! Layered graph validation
//!
//! Validation runs at one of four monotonic levels, each including every
//! check of the previous one:
//!
//! 1. [`ValidationLevel::Basic`] - structure (ids, references, signs)
//! 2. [`ValidationLevel::Standard`] - connectivity
//! 3. [`ValidationLevel::Strict`] - business rules for logistics networks
//! 4. [`ValidationLevel::Full`] - topology (bridges, articulation points)
//!
//! Alongside the level-driven validator there are two standalone checks:
//! the flow-logic validator ([`validate_flow`]) and the per-algorithm
//! compatibility validator ([`check_compatibility`]).

mod compatibility;
mod connectivity;
mod flow_logic;
mod rules;
mod structure;
pub mod topology;

pub use compatibility::{check_compatibility, CompatibilityReport};
pub use flow_logic::{validate_flow, FlowCheck, FlowCheckOptions};
pub use topology::{analyze_topology, TopologyAnalysis};

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ErrorKind;
use crate::types::Graph;
use crate::{Error, Result};

/// How deep validation digs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    /// Structural invariants only
    Basic,
    /// Structure plus connectivity
    #[default]
    Standard,
    /// Standard plus business rules
    Strict,
    /// Strict plus topology analysis
    Full,
}

impl ValidationLevel {
    /// Stable machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Strict => "strict",
            Self::Full => "full",
        }
    }
}

impl std::str::FromStr for ValidationLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "strict" => Ok(Self::Strict),
            "full" => Ok(Self::Full),
            other => Err(Error::invalid_argument(format!(
                "unknown validation level: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an issue blocks the graph or merely flags it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The graph cannot be solved as-is
    Error,
    /// Worth surfacing, does not block
    Warning,
}

/// One diagnostic produced by a validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Taxonomy kind
    pub kind: ErrorKind,
    /// Stable machine code, e.g. `duplicate_node_id`
    pub code: String,
    /// Human message
    pub message: String,
    /// Offending field path, e.g. `edges[3].capacity`
    pub field: String,
    /// Issue severity
    pub severity: Severity,
}

impl ValidationIssue {
    /// Create an error-severity issue
    pub fn error(
        kind: ErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            field: field.into(),
            severity: Severity::Error,
        }
    }

    /// Create a warning-severity issue
    pub fn warning(
        kind: ErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            field: field.into(),
            severity: Severity::Warning,
        }
    }
}

/// Bookkeeping about the checks that ran
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Rules evaluated
    pub total_checks: u32,
    /// Rules that passed cleanly
    pub passed_checks: u32,
    /// Rules that produced at least one error
    pub failed_checks: u32,
    /// Rules that produced only warnings
    pub warning_checks: u32,
    /// Wall-clock duration in seconds
    pub duration_seconds: f64,
}

/// Shape summary of the validated graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    /// Number of nodes
    pub node_count: usize,
    /// Number of edges
    pub edge_count: usize,
    /// Sum of all capacities
    pub total_capacity: f64,
    /// Mean edge length over edges that carry one
    pub average_edge_length: Option<f64>,
    /// `m / (n * (n - 1))` for directed graphs
    pub density: f64,
    /// Whether the sink is reachable from the source
    pub is_connected: bool,
    /// Node counts partitioned by kind tag
    pub nodes_by_kind: HashMap<String, usize>,
}

impl GraphStatistics {
    /// Compute statistics for a graph
    pub fn collect(graph: &Graph) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let lengths: Vec<f64> = graph.edges.iter().filter_map(|e| e.length).collect();
        let average_edge_length = if lengths.is_empty() {
            None
        } else {
            Some(lengths.iter().sum::<f64>() / lengths.len() as f64)
        };

        let density = if node_count > 1 {
            edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
        } else {
            0.0
        };

        let mut nodes_by_kind = HashMap::new();
        for node in &graph.nodes {
            let key = node
                .kind
                .map(|k| k.as_str().to_string())
                .unwrap_or_else(|| "untyped".to_string());
            *nodes_by_kind.entry(key).or_insert(0) += 1;
        }

        Self {
            node_count,
            edge_count,
            total_capacity: graph.total_capacity(),
            average_edge_length,
            density,
            is_connected: connectivity::sink_reachable(graph),
            nodes_by_kind,
        }
    }
}

/// Outcome of a level-driven validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no error-severity issue was found
    pub is_valid: bool,
    /// The level the run was performed at
    pub level: ValidationLevel,
    /// Error-severity issues
    pub errors: Vec<ValidationIssue>,
    /// Warning-severity issues
    pub warnings: Vec<ValidationIssue>,
    /// Check bookkeeping
    pub metrics: ValidationMetrics,
    /// Graph shape summary
    pub statistics: GraphStatistics,
}

/// Level-driven graph validator
#[derive(Debug, Clone)]
pub struct GraphValidator {
    level: ValidationLevel,
    /// Capacities above this value draw a strict-level warning
    capacity_ceiling: Option<f64>,
}

impl GraphValidator {
    /// Validator at the given level with default settings
    pub fn new(level: ValidationLevel) -> Self {
        Self {
            level,
            capacity_ceiling: None,
        }
    }

    /// Set the sanity ceiling for capacities (strict level)
    pub fn with_capacity_ceiling(mut self, ceiling: f64) -> Self {
        self.capacity_ceiling = Some(ceiling);
        self
    }

    /// Run every check up to and including the configured level
    pub fn validate(&self, graph: &Graph) -> ValidationReport {
        let started = Instant::now();
        let mut checks = CheckSet::default();

        structure::check(graph, &mut checks);
        // Deeper levels assume a structurally sound graph.
        if self.level >= ValidationLevel::Standard && !checks.has_errors() {
            connectivity::check(graph, &mut checks);
        }
        if self.level >= ValidationLevel::Strict && !checks.has_errors() {
            rules::check(graph, self.capacity_ceiling, &mut checks);
        }
        if self.level >= ValidationLevel::Full && !checks.has_errors() {
            topology::check(graph, &mut checks);
        }

        let report = checks.into_report(self.level, graph, started);
        debug!(
            level = %self.level,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "graph validated"
        );
        report
    }
}

/// Accumulator shared by the per-level check modules
#[derive(Debug, Default)]
pub(crate) struct CheckSet {
    issues: Vec<ValidationIssue>,
    total: u32,
    failed: u32,
    warned: u32,
}

impl CheckSet {
    /// Record one rule's outcome; `issues` is empty when the rule passed
    pub fn record(&mut self, issues: Vec<ValidationIssue>) {
        self.total += 1;
        if issues.iter().any(|i| i.severity == Severity::Error) {
            self.failed += 1;
        } else if !issues.is_empty() {
            self.warned += 1;
        }
        self.issues.extend(issues);
    }

    /// Whether any error-severity issue has been recorded so far
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    fn into_report(
        self,
        level: ValidationLevel,
        graph: &Graph,
        started: Instant,
    ) -> ValidationReport {
        let (errors, warnings): (Vec<_>, Vec<_>) = self
            .issues
            .into_iter()
            .partition(|i| i.severity == Severity::Error);

        ValidationReport {
            is_valid: errors.is_empty(),
            level,
            errors,
            warnings,
            metrics: ValidationMetrics {
                total_checks: self.total,
                passed_checks: self.total - self.failed - self.warned,
                failed_checks: self.failed,
                warning_checks: self.warned,
                duration_seconds: started.elapsed().as_secs_f64(),
            },
            statistics: GraphStatistics::collect(graph),
        }
    }
}
