//! Outlier detection for timing samples.
//!
//! This module flags samples whose distance from the median, measured in
//! population standard deviations, exceeds a threshold.

use super::percentiles::{median, population_std_dev};

/// Outlier detection using median-centred z-scores.
///
/// A sample `x` is an outlier when `|x - median| / std_dev > threshold`.
/// A window with zero (or non-finite) spread has no outliers.
#[derive(Debug, Clone)]
pub struct ZScoreOutliers {
    /// Indices of detected outliers in the analysed slice
    pub outlier_indices: Vec<usize>,
    /// Median of the analysed slice
    pub median: f64,
    /// Population standard deviation of the analysed slice
    pub std_dev: f64,
    /// Threshold the z-scores were compared against
    pub threshold: f64,
}

impl ZScoreOutliers {
    /// Detect outliers in samples.
    ///
    /// # Arguments
    ///
    /// * `samples` - Slice of samples to analyze
    /// * `threshold` - Z-score above which a sample is an outlier
    ///
    /// # Returns
    ///
    /// * `Some(result)` - Outlier detection results
    /// * `None` - If samples is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use bruit_harness::stats::outliers::ZScoreOutliers;
    ///
    /// let data = vec![100.0, 102.0, 98.0, 101.0, 1000.0, 99.0, 103.0, 97.0, 100.0];
    /// let result = ZScoreOutliers::detect(&data, 2.8).unwrap();
    /// assert!(result.has_outliers());
    /// assert_eq!(result.outlier_indices, vec![4]);
    /// ```
    pub fn detect(samples: &[f64], threshold: f64) -> Option<Self> {
        let median = median(samples)?;
        let std_dev = population_std_dev(samples)?;

        let mut result = ZScoreOutliers {
            outlier_indices: Vec::new(),
            median,
            std_dev,
            threshold,
        };

        // Zero or non-finite spread scores every value as 0
        let outlier_indices: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|&(_, &value)| result.z_score(value) > threshold)
            .map(|(i, _)| i)
            .collect();
        result.outlier_indices = outlier_indices;

        Some(result)
    }

    /// Z-score of a single value against this window.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev == 0.0 || !self.std_dev.is_finite() {
            0.0
        } else {
            (value - self.median).abs() / self.std_dev
        }
    }

    /// Get the clean samples (outliers removed), preserving order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bruit_harness::stats::outliers::ZScoreOutliers;
    ///
    /// let data = vec![100.0, 102.0, 98.0, 101.0, 1000.0, 99.0, 103.0, 97.0, 100.0];
    /// let result = ZScoreOutliers::detect(&data, 2.8).unwrap();
    /// let clean = result.clean_samples(&data);
    /// assert_eq!(clean.len(), 8);
    /// ```
    pub fn clean_samples(&self, samples: &[f64]) -> Vec<f64> {
        samples
            .iter()
            .enumerate()
            .filter_map(|(i, &value)| {
                if self.outlier_indices.contains(&i) {
                    None
                } else {
                    Some(value)
                }
            })
            .collect()
    }

    /// Check if any outliers were detected.
    pub fn has_outliers(&self) -> bool {
        !self.outlier_indices.is_empty()
    }
}

/// Drop leading samples recorded before the system warmed up.
///
/// # Examples
///
/// ```
/// use bruit_harness::stats::outliers::trim_leading;
///
/// let data = vec![100.0, 95.0, 10.0, 11.0, 10.5, 11.5]; // First 2 are warmup
/// assert_eq!(trim_leading(&data, 2), &[10.0, 11.0, 10.5, 11.5]);
/// ```
pub fn trim_leading(samples: &[f64], count: usize) -> &[f64] {
    if count >= samples.len() {
        &[]
    } else {
        &samples[count..]
    }
}
