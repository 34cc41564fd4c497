//! Summary statistics over Monte-Carlo samples
//!
//! Consumes pre-computed samples (e.g. max-flow values from perturbed
//! solves); producing the samples is the caller's business.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Summary of a sample set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Number of samples
    pub sample_count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// 5th percentile
    pub p5: f64,
    /// Median
    pub p50: f64,
    /// 95th percentile
    pub p95: f64,
    /// Confidence level the interval was computed at
    pub confidence_level: f64,
    /// Lower bound of the confidence interval on the mean
    pub ci_lower: f64,
    /// Upper bound of the confidence interval on the mean
    pub ci_upper: f64,
}

/// Normal quantiles for the supported confidence levels; the nearest level
/// wins for anything in between
const Z_TABLE: [(f64, f64); 5] = [
    (0.80, 1.282),
    (0.90, 1.645),
    (0.95, 1.960),
    (0.98, 2.326),
    (0.99, 2.576),
];

/// Summarize pre-computed simulation samples
pub fn summarize_samples(samples: &[f64], confidence_level: f64) -> Result<SimulationSummary> {
    if samples.is_empty() {
        return Err(Error::invalid_argument("no samples to summarize"));
    }
    if !(0.0..1.0).contains(&confidence_level) {
        return Err(Error::invalid_argument(format!(
            "confidence level {confidence_level} is not in (0, 1)"
        )));
    }

    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };
    let std_dev = variance.sqrt();

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let z = z_for(confidence_level);
    let half_width = z * std_dev / (n as f64).sqrt();

    Ok(SimulationSummary {
        sample_count: n,
        mean,
        std_dev,
        min: sorted[0],
        max: sorted[n - 1],
        p5: percentile(&sorted, 0.05),
        p50: percentile(&sorted, 0.50),
        p95: percentile(&sorted, 0.95),
        confidence_level,
        ci_lower: mean - half_width,
        ci_upper: mean + half_width,
    })
}

/// Linear-interpolation percentile over a sorted slice
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

fn z_for(confidence_level: f64) -> f64 {
    let mut best = Z_TABLE[0];
    for candidate in Z_TABLE {
        if (candidate.0 - confidence_level).abs() < (best.0 - confidence_level).abs() {
            best = candidate;
        }
    }
    best.1
}
