//! Error types for flowgrid-optimization

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while solving or validating a flow problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Graph violates basic structural invariants
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Requested algorithm is incompatible with the graph
    #[error("algorithm mismatch: {0}")]
    AlgorithmMismatch(String),

    /// Solver deadline exceeded
    #[error("timeout after {seconds} seconds")]
    Timeout {
        /// Seconds elapsed before timeout
        seconds: f64,
    },

    /// Caller cancelled the solve
    #[error("cancelled after {iterations} iterations")]
    Cancelled {
        /// Iterations completed before the cancellation tripped
        iterations: u64,
    },

    /// Iteration budget exhausted without convergence
    #[error("iteration limit of {limit} reached")]
    IterationLimit {
        /// The configured limit
        limit: u64,
    },

    /// Problem has no feasible flow
    #[error("infeasible: {0}")]
    Infeasible(String),

    /// Missing or malformed input outside the graph itself
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid graph error
    pub fn invalid_graph(msg: impl Into<String>) -> Self {
        Self::InvalidGraph(msg.into())
    }

    /// Create an algorithm mismatch error
    pub fn algorithm_mismatch(msg: impl Into<String>) -> Self {
        Self::AlgorithmMismatch(msg.into())
    }

    /// Create an infeasible error
    pub fn infeasible(msg: impl Into<String>) -> Self {
        Self::Infeasible(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The taxonomy kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGraph(_) => ErrorKind::InvalidGraph,
            Self::AlgorithmMismatch(_) => ErrorKind::AlgorithmMismatch,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::IterationLimit { .. } => ErrorKind::IterationLimit,
            Self::Infeasible(_) => ErrorKind::Infeasible,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Error kinds shared by the whole platform
///
/// Diagnostics carry a kind rather than a concrete error type so that the
/// services can report them uniformly in response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed request field
    InvalidArgument,
    /// Graph violates basic-level invariants
    InvalidGraph,
    /// Requested algorithm is incompatible with the graph
    AlgorithmMismatch,
    /// Deadline exceeded
    Timeout,
    /// Caller cancelled
    Cancelled,
    /// Iteration budget exhausted
    IterationLimit,
    /// No feasible flow
    Infeasible,
    /// Lookup missed or record soft-deleted
    NotFound,
    /// Operation requires a collaborator that is not configured
    Unimplemented,
    /// Unanticipated failure
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidGraph => "invalid_graph",
            Self::AlgorithmMismatch => "algorithm_mismatch",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::IterationLimit => "iteration_limit",
            Self::Infeasible => "infeasible",
            Self::NotFound => "not_found",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::invalid_graph("dup id").kind(),
            ErrorKind::InvalidGraph
        );
        assert_eq!(
            Error::algorithm_mismatch("negative cost").kind(),
            ErrorKind::AlgorithmMismatch
        );
        assert_eq!(Error::Timeout { seconds: 1.0 }.kind(), ErrorKind::Timeout);
        assert_eq!(
            Error::IterationLimit { limit: 10 }.kind(),
            ErrorKind::IterationLimit
        );
    }

    #[test]
    fn test_kind_names_round_trip() {
        let kind = ErrorKind::AlgorithmMismatch;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"algorithm_mismatch\"");
        let back: ErrorKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
