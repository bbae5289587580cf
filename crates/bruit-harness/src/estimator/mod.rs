//! Central-tendency estimators compared by the harness
//!
//! Two families are provided:
//!
//! - [`fixed_estimate`]: median of the first K samples, the "collect K and
//!   stop" strategy.
//! - [`ProgressiveEstimator`]: reads samples one at a time, rejecting z-score
//!   outliers, and stops once the working window is self-consistent.

pub mod fixed_window;
pub mod progressive;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use fixed_window::fixed_estimate;
pub use progressive::{
    Outcome, ProgressiveEstimate, ProgressiveEstimator, DEFAULT_INITIAL_WINDOW, DEFAULT_THRESHOLD,
};

/// Identifies which estimator produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// Median of the first `k` samples
    Window { k: usize },
    /// The progressive outlier-rejecting estimator
    Progressive,
}

impl EstimatorKind {
    /// Short column label used by the CSV and console reporters.
    pub fn label(&self) -> String {
        match self {
            EstimatorKind::Window { k } => format!("with_{}", k),
            EstimatorKind::Progressive => "progressive".to_string(),
        }
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorKind::Window { k } => write!(f, "{} samples", k),
            EstimatorKind::Progressive => write!(f, "progressive"),
        }
    }
}

/// Signed percentage difference of `estimate` from `baseline`.
///
/// # Examples
///
/// ```
/// use bruit_harness::estimator::deviation_pct;
///
/// assert_eq!(deviation_pct(200.0, 210.0), 5.0);
/// assert_eq!(deviation_pct(200.0, 190.0), -5.0);
/// assert_eq!(deviation_pct(200.0, 200.0), 0.0);
/// assert_eq!(deviation_pct(0.0, 0.0), 0.0);
/// assert!(deviation_pct(0.0, 5.0).is_infinite());
/// ```
pub fn deviation_pct(baseline: f64, estimate: f64) -> f64 {
    if estimate == baseline {
        return 0.0;
    }
    (estimate - baseline) / baseline * 100.0
}
