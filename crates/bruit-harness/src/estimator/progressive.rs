//! Progressive outlier-rejecting estimator
//!
//! The estimator treats its input as a stream that is expensive to extend.
//! It starts with a small working window and only pulls more samples when
//! the window contains z-score outliers:
//!
//! ```text
//!            ┌──────────────────────────────┐
//!            │           Scanning           │
//!            │ window, cursor, permutations │
//!            └──────────────────────────────┘
//!              │ no outliers       │ outliers removed,
//!              │                   │ replacements drawn
//!              ▼                   ▼
//!        ┌───────────┐      ┌────────────┐
//!        │ Converged │      │ Scanning   │ ── input exhausted ──▶ Exhausted
//!        └───────────┘      └────────────┘
//! ```
//!
//! A converged run reports the median of its final window. An exhausted run
//! falls back to the median of the whole input.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::stats::{median, ZScoreOutliers};

/// Default z-score above which a window element is rejected.
pub const DEFAULT_THRESHOLD: f64 = 2.8;

/// Default number of samples in the initial working window.
pub const DEFAULT_INITIAL_WINDOW: usize = 9;

/// How an estimation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The working window had no outliers
    Converged,
    /// The input ran out before the window settled
    Exhausted,
}

/// Result of one progressive estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveEstimate {
    /// Estimated central value
    pub value: f64,
    /// Index of the last sample read when estimation stopped
    pub consumed: usize,
    /// Number of replacement samples appended to the window
    pub permutations: usize,
    /// Whether the window converged or the input was exhausted
    pub outcome: Outcome,
}

impl ProgressiveEstimate {
    pub fn converged(&self) -> bool {
        self.outcome == Outcome::Converged
    }
}

enum ScanState {
    Scanning {
        window: Vec<f64>,
        cursor: usize,
        permutations: usize,
    },
    Converged {
        value: f64,
        cursor: usize,
        permutations: usize,
    },
    Exhausted {
        cursor: usize,
        permutations: usize,
    },
}

/// Sequential robust estimator.
///
/// # Examples
///
/// ```
/// use bruit_harness::estimator::ProgressiveEstimator;
///
/// let mut samples = vec![100.0; 9];
/// samples.push(500.0);
///
/// let estimate = ProgressiveEstimator::default().estimate(&samples);
/// assert_eq!(estimate.value, 100.0);
/// assert_eq!(estimate.consumed, 8);
/// assert_eq!(estimate.permutations, 0);
/// assert!(estimate.converged());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressiveEstimator {
    threshold: f64,
    initial_window: usize,
}

impl Default for ProgressiveEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_INITIAL_WINDOW)
    }
}

impl ProgressiveEstimator {
    /// Create an estimator. An `initial_window` of zero is treated as one.
    pub fn new(threshold: f64, initial_window: usize) -> Self {
        Self {
            threshold,
            initial_window: initial_window.max(1),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn initial_window(&self) -> usize {
        self.initial_window
    }

    /// Estimate the central value of `samples`.
    ///
    /// Inputs shorter than the initial window cannot be scanned and go
    /// straight to the whole-input fallback. An empty input yields `NaN`.
    pub fn estimate(&self, samples: &[f64]) -> ProgressiveEstimate {
        let mut state = self.start(samples);

        loop {
            state = match state {
                ScanState::Scanning {
                    window,
                    cursor,
                    permutations,
                } => self.step(samples, window, cursor, permutations),
                ScanState::Converged {
                    value,
                    cursor,
                    permutations,
                } => {
                    return ProgressiveEstimate {
                        value,
                        consumed: cursor,
                        permutations,
                        outcome: Outcome::Converged,
                    }
                }
                ScanState::Exhausted {
                    cursor,
                    permutations,
                } => {
                    return ProgressiveEstimate {
                        value: median(samples).unwrap_or(f64::NAN),
                        consumed: cursor,
                        permutations,
                        outcome: Outcome::Exhausted,
                    }
                }
            };
        }
    }

    fn start(&self, samples: &[f64]) -> ScanState {
        let take = self.initial_window.min(samples.len());
        ScanState::Scanning {
            window: samples[..take].to_vec(),
            cursor: self.initial_window - 1,
            permutations: 0,
        }
    }

    fn step(
        &self,
        samples: &[f64],
        window: Vec<f64>,
        mut cursor: usize,
        mut permutations: usize,
    ) -> ScanState {
        if cursor >= samples.len() {
            return ScanState::Exhausted {
                cursor,
                permutations,
            };
        }

        let outliers = match ZScoreOutliers::detect(&window, self.threshold) {
            Some(outliers) => outliers,
            None => {
                return ScanState::Exhausted {
                    cursor,
                    permutations,
                }
            }
        };

        if !outliers.has_outliers() {
            return ScanState::Converged {
                value: outliers.median,
                cursor,
                permutations,
            };
        }

        let removed = outliers.outlier_indices.len();
        let mut window = outliers.clean_samples(&window);
        trace!(
            removed,
            cursor,
            window = window.len(),
            "Rejected outliers from working window"
        );

        for _ in 0..removed {
            if cursor + 1 >= samples.len() {
                return ScanState::Exhausted {
                    cursor,
                    permutations,
                };
            }
            cursor += 1;
            window.push(samples[cursor]);
            permutations += 1;
        }

        ScanState::Scanning {
            window,
            cursor,
            permutations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tail(len: usize) -> Vec<f64> {
        [100.0, 101.0, 99.0]
            .iter()
            .copied()
            .cycle()
            .take(len)
            .collect()
    }

    #[test]
    fn test_constant_window_converges_immediately() {
        let mut samples = vec![100.0; 9];
        samples.push(500.0);

        let estimate = ProgressiveEstimator::default().estimate(&samples);

        assert_eq!(estimate.value, 100.0);
        assert_eq!(estimate.consumed, 8);
        assert_eq!(estimate.permutations, 0);
        assert_eq!(estimate.outcome, Outcome::Converged);
    }

    #[test]
    fn test_clean_window_converges_without_replacement() {
        let mut samples = vec![100.0, 102.0, 98.0, 101.0, 99.0, 103.0, 97.0, 100.0, 101.0];
        samples.extend(tail(16));

        let estimate = ProgressiveEstimator::default().estimate(&samples);

        assert!(estimate.converged());
        assert_eq!(estimate.consumed, 8);
        assert_eq!(estimate.permutations, 0);
        assert_eq!(estimate.value, 100.0);
    }

    #[test]
    fn test_single_outlier_is_replaced_once() {
        let mut samples = vec![100.0, 102.0, 98.0, 101.0, 1000.0, 99.0, 103.0, 97.0, 100.0];
        samples.extend(tail(16));

        let estimate = ProgressiveEstimator::default().estimate(&samples);

        assert!(estimate.converged());
        assert_eq!(estimate.permutations, 1);
        assert_eq!(estimate.consumed, 9);
        // Window is the eight in-range values plus samples[9] = 100.0
        assert_eq!(estimate.value, 100.0);
    }

    #[test]
    fn test_exhaustion_falls_back_to_full_median() {
        // Exactly nine samples with an outlier: no replacement is available
        let samples = vec![100.0, 102.0, 98.0, 101.0, 1000.0, 99.0, 103.0, 97.0, 100.0];

        let estimate = ProgressiveEstimator::default().estimate(&samples);

        assert_eq!(estimate.outcome, Outcome::Exhausted);
        assert_eq!(estimate.value, median(&samples).unwrap());
        assert_eq!(estimate.consumed, 8);
        assert_eq!(estimate.permutations, 0);
    }

    #[test]
    fn test_exhaustion_mid_replacement_counts_drawn_samples() {
        // Nine in-window values plus one spare; the window flags the outlier,
        // draws the spare (another outlier), then runs dry.
        let samples = vec![
            100.0, 102.0, 98.0, 101.0, 1000.0, 99.0, 103.0, 97.0, 100.0, 1000.0,
        ];

        let estimate = ProgressiveEstimator::default().estimate(&samples);

        assert_eq!(estimate.outcome, Outcome::Exhausted);
        assert_eq!(estimate.permutations, 1);
        assert_eq!(estimate.consumed, 9);
        assert_eq!(estimate.value, median(&samples).unwrap());
    }

    #[test]
    fn test_short_input_is_exhausted() {
        let samples = vec![1.0, 2.0, 3.0];
        let estimate = ProgressiveEstimator::default().estimate(&samples);

        assert_eq!(estimate.outcome, Outcome::Exhausted);
        assert_eq!(estimate.value, 2.0);
        assert_eq!(estimate.permutations, 0);
    }

    #[test]
    fn test_empty_input_is_nan() {
        let estimate = ProgressiveEstimator::default().estimate(&[]);
        assert!(estimate.value.is_nan());
        assert!(!estimate.converged());
    }

    #[test]
    fn test_custom_initial_window() {
        let samples = vec![7.0; 12];
        let estimate = ProgressiveEstimator::new(2.8, 5).estimate(&samples);

        assert_eq!(estimate.consumed, 4);
        assert_eq!(estimate.value, 7.0);
    }

    #[test]
    fn test_zero_initial_window_is_clamped() {
        let estimator = ProgressiveEstimator::new(2.8, 0);
        assert_eq!(estimator.initial_window(), 1);

        let estimate = estimator.estimate(&[3.0, 4.0]);
        assert!(estimate.converged());
        assert_eq!(estimate.value, 3.0);
        assert_eq!(estimate.consumed, 0);
    }
}
