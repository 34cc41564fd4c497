//! Flow analytics
//!
//! Everything here consumes a graph whose edges already carry a flow
//! assignment (`current_flow`), typically the output of a solve:
//!
//! - [`cost`] - cost decomposition with multipliers, fixed and handling costs
//! - [`bottleneck`] - utilization hot-spots and recommendations
//! - [`efficiency`] - capacity/cost efficiency and letter grades
//! - [`comparison`] - scenario comparison against a baseline
//! - [`statistics`] - summary statistics over Monte-Carlo samples

pub mod bottleneck;
pub mod comparison;
pub mod cost;
pub mod efficiency;
pub mod statistics;

pub use bottleneck::{find_bottlenecks, Bottleneck, BottleneckOptions, BottleneckReport, BottleneckSeverity};
pub use comparison::{compare_scenarios, ComparisonReport, Scenario, ScenarioMetrics};
pub use cost::{calculate_cost, CostBreakdown, CostOptions, CostReport};
pub use efficiency::{grade_efficiency, EfficiencyGrade, EfficiencyReport};
pub use statistics::{summarize_samples, SimulationSummary};
