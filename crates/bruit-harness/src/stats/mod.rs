//! Statistical primitives shared by the estimators
//!
//! This module provides the median, moments and percentile helpers used by
//! the estimators, plus z-score outlier detection and leading-sample trimming.
//!
//! # Examples
//!
//! ```
//! use bruit_harness::stats::{median, trim_leading, ZScoreOutliers};
//!
//! // First two samples are cold-start noise
//! let samples = vec![400.0, 380.0, 100.0, 101.0, 99.0, 100.0, 102.0, 98.0, 100.0, 101.0, 900.0];
//!
//! let warm = trim_leading(&samples, 2);
//! let outliers = ZScoreOutliers::detect(warm, 2.8).unwrap();
//! let clean = outliers.clean_samples(warm);
//!
//! assert_eq!(median(&clean), Some(100.0));
//! ```

pub mod outliers;
pub mod percentiles;

// Re-export main types and functions
pub use outliers::{trim_leading, ZScoreOutliers};
pub use percentiles::{mean, median, percentile, population_std_dev};
