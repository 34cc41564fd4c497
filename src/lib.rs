//! # flowgrid-optimization
//!
//! The FlowGrid optimization engine: maximum-flow and minimum-cost-flow
//! solvers over directed capacitated graphs, plus the layered validation and
//! analytics machinery the FlowGrid services are built on.
//!
//! ## Modules
//!
//! - [`solver`] - five solver variants behind one dispatch surface, with a
//!   streaming progress driver
//! - [`residual`] - the paired-arc residual graph the solvers run on
//! - [`validation`] - layered graph validation, flow-logic checks, and
//!   per-algorithm compatibility checks
//! - [`analytics`] - cost decomposition, bottleneck detection, efficiency
//!   grading, scenario comparison, and simulation summaries
//!
//! ## Quick Start
//!
//! ```rust
//! use flowgrid_optimization::prelude::*;
//!
//! let mut graph = Graph::new(1, 4);
//! for id in 1..=4 {
//!     graph.add_node(Node::new(id));
//! }
//! graph
//!     .add_edge(Edge::new(1, 2, 10.0, 1.0))
//!     .add_edge(Edge::new(1, 3, 10.0, 1.0))
//!     .add_edge(Edge::new(2, 4, 10.0, 1.0))
//!     .add_edge(Edge::new(3, 4, 10.0, 1.0));
//!
//! let result = solve(
//!     &graph,
//!     Algorithm::EdmondsKarp,
//!     &SolveOptions::default(),
//!     &SolveContext::new(),
//! )
//! .unwrap();
//! assert_eq!(result.max_flow, 20.0);
//! ```
//!
//! Solves are CPU-bound and single-threaded per invocation; run separate
//! solves on separate tasks when you need parallelism.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod residual;
pub mod solver;
pub mod validation;

mod error;
mod types;

pub use error::{Error, ErrorKind, Result};
pub use types::*;

/// Prelude for common imports
pub mod prelude {
    pub use crate::analytics::{
        calculate_cost, compare_scenarios, find_bottlenecks, grade_efficiency, summarize_samples,
        BottleneckOptions, CostOptions, Scenario,
    };
    pub use crate::residual::ResidualGraph;
    pub use crate::solver::{algorithm_catalog, solve, solve_with_progress, ProgressFrame};
    pub use crate::types::{
        Algorithm, CancelToken, Edge, FlowResult, Graph, Node, NodeKind, SolveContext,
        SolveOptions, SolverStatus,
    };
    pub use crate::validation::{
        check_compatibility, validate_flow, FlowCheckOptions, GraphValidator, ValidationLevel,
    };
    pub use crate::Error;
    pub use crate::Result;
}
