//! Error types for the FlowGrid services

use flowgrid_optimization::ErrorKind;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the service layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Report lookup missed or the record is soft-deleted.
    #[error("report not found: {0}")]
    NotFound(String),

    /// Missing or malformed request field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A storage operation was requested but no repository is configured.
    #[error("no report repository is configured")]
    Unimplemented,

    /// Repository backend error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Report rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Error bubbled up from the optimization engine.
    #[error(transparent)]
    Solver(#[from] flowgrid_optimization::Error),

    /// Snapshot serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Unanticipated failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The taxonomy kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Unimplemented => ErrorKind::Unimplemented,
            Self::Solver(e) => e.kind(),
            Self::Storage(_) | Self::Serialization(_) | Self::Json(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
            Self::Render(_) | Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(Error::Unimplemented.kind(), ErrorKind::Unimplemented);
        let solver = Error::from(flowgrid_optimization::Error::algorithm_mismatch("neg"));
        assert_eq!(solver.kind(), ErrorKind::AlgorithmMismatch);
    }
}
