//! Service configuration
//!
//! Loaded from a YAML file; every field has a sensible default so a missing
//! or partial file still yields a working configuration.

use std::path::Path;
use std::time::Duration;

use flowgrid_optimization::validation::ValidationLevel;
use flowgrid_optimization::DEFAULT_EPSILON;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Report pipeline settings.
    pub report: ReportConfig,
    /// Solver defaults.
    pub solver: SolverConfig,
    /// Validation defaults.
    pub validation: ValidationConfig,
}

/// Report pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Default TTL for persisted reports, in seconds (0 = never expire).
    pub default_ttl_seconds: u64,
    /// Expiration sweep period, in seconds.
    pub cleanup_interval_seconds: u64,
    /// Default for the per-request `save_to_storage` option.
    pub save_to_storage: bool,
    /// Snapshot file for the file-backed repository; `None` keeps reports
    /// in memory only.
    pub storage_path: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 0,
            cleanup_interval_seconds: 3600,
            save_to_storage: true,
            storage_path: None,
        }
    }
}

impl ReportConfig {
    /// The default TTL as a duration, `None` when reports never expire.
    pub fn default_ttl(&self) -> Option<Duration> {
        (self.default_ttl_seconds > 0).then(|| Duration::from_secs(self.default_ttl_seconds))
    }

    /// The sweep period as a duration.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds.max(1))
    }
}

/// Solver defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Numerical tolerance used when a request does not override it.
    pub default_epsilon: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            default_epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Validation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Level used when a request does not name one.
    pub default_level: ValidationLevel,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            default_level: ValidationLevel::Standard,
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.report.cleanup_interval_seconds, 3600);
        assert_eq!(config.report.default_ttl(), None);
        assert_eq!(config.solver.default_epsilon, DEFAULT_EPSILON);
        assert_eq!(config.validation.default_level, ValidationLevel::Standard);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ServerConfig::from_yaml(
            "report:\n  default_ttl_seconds: 86400\nvalidation:\n  default_level: strict\n",
        )
        .unwrap();
        assert_eq!(
            config.report.default_ttl(),
            Some(Duration::from_secs(86400))
        );
        assert_eq!(config.report.cleanup_interval_seconds, 3600);
        assert_eq!(config.validation.default_level, ValidationLevel::Strict);
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        assert!(matches!(
            ServerConfig::from_yaml("report: ["),
            Err(Error::Config(_))
        ));
    }
}
