//! # flowgrid-server
//!
//! The FlowGrid service layer: solver, validation, analytics, and report
//! services over the [`flowgrid_optimization`] engine, plus the report
//! rendering pipeline and the report repository.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       FlowGrid Server                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────┐ ┌────────────┐ ┌───────────┐ ┌────────────────┐  │
//! │  │ Solver │ │ Validation │ │ Analytics │ │     Report     │  │
//! │  │ Service│ │  Service   │ │  Service  │ │    Service     │  │
//! │  └───┬────┘ └─────┬──────┘ └─────┬─────┘ └───────┬────────┘  │
//! │      │            │              │               │           │
//! │      └────────────┴──────┬───────┘      ┌────────┴────────┐  │
//! │                          │              │    Renderers    │  │
//! │  ┌───────────────────────┴───────────┐  │ md/csv/json/    │  │
//! │  │      flowgrid-optimization        │  │ html/xlsx/pdf   │  │
//! │  │  solvers - validation - analytics │  └────────┬────────┘  │
//! │  └───────────────────────────────────┘  ┌────────┴────────┐  │
//! │                                         │   Repository    │  │
//! │                                         │ (memory / file) │  │
//! │                                         └─────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The RPC wire transport is an external collaborator: it binds to the
//! facades in [`service`] and carries their envelope-shaped responses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod report;
pub mod repository;
pub mod service;

// Re-exports
pub use crate::config::ServerConfig;
pub use crate::error::{Error, Result};
pub use crate::report::{ReportData, ReportFormat, ReportType};
pub use crate::repository::{
    FileReportRepository, MemoryReportRepository, ReportRepository, spawn_sweeper,
};
pub use crate::service::{AnalyticsService, ReportService, SolverService, ValidationService};
