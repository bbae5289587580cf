//! Fixed-size subset estimators.

use crate::error::EstimatorError;
use crate::stats::median;

/// Median of the first `k` samples.
///
/// # Errors
///
/// Returns [`EstimatorError::InsufficientSamples`] when fewer than `k`
/// samples are available, or when `k` is zero.
///
/// # Examples
///
/// ```
/// use bruit_harness::estimator::fixed_estimate;
///
/// let samples = vec![5.0, 1.0, 3.0, 900.0];
/// assert_eq!(fixed_estimate(&samples, 3), Ok(3.0));
/// assert!(fixed_estimate(&samples, 5).is_err());
/// ```
pub fn fixed_estimate(samples: &[f64], k: usize) -> Result<f64, EstimatorError> {
    if k == 0 || samples.len() < k {
        return Err(EstimatorError::InsufficientSamples {
            needed: k,
            available: samples.len(),
        });
    }

    median(&samples[..k]).ok_or(EstimatorError::InsufficientSamples {
        needed: k,
        available: samples.len(),
    })
}
