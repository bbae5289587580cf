//! Sample-budget harness for noisy performance measurements
//!
//! This crate answers a practical question about page-load and benchmark
//! timings: how many repetitions are needed before the median stops moving?
//! It compares a cheap robust estimator against fixed-size subsets of each
//! run and measures how far each lands from the full-sample median.
//!
//! # Features
//!
//! - **Progressive estimator**: reads samples incrementally, rejecting z-score
//!   outliers, and stops as soon as the working window is self-consistent
//! - **Fixed-window estimators**: median of the first K samples
//! - **Evaluation harness**: per-run deviations and cross-run aggregates
//! - **Sample source**: ActiveData query client with an on-disk response cache
//! - **Multiple Output Formats**: Console, CSV and JSON reports
//!
//! # Example
//!
//! ```
//! use bruit_harness::{Config, Harness, RunRecord};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = Config::default();
//! let harness = Harness::from_config(&config);
//!
//! let samples: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
//! let records = vec![RunRecord::new("raptor-tp6-amazon-firefox", 1_600_000_000.0, samples)];
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let evaluation = harness.evaluate(&records, &mut rng).unwrap();
//! assert_eq!(evaluation.summary.processed, 1);
//! ```
//!
//! # Configuration
//!
//! Runs are configured using TOML files:
//!
//! ```toml
//! [query]
//! frameworks = ["raptor", "browsertime"]
//! suites = ["tp6-", "tp6m-"]
//! since = "today-20day"
//! limit = 10000
//!
//! [source]
//! cache_dir = ".bruit-cache"
//!
//! [estimator]
//! threshold = 2.8
//!
//! [harness]
//! warmup_trim = 2
//! min_samples = 25
//! windows = [8, 13, 20]
//! alert_window = 13
//! alert_threshold_pct = 10.0
//!
//! [report]
//! format = "csv"
//! output = "bruit.csv"
//! ```

pub mod config;
pub mod error;
pub mod estimator;
pub mod harness;
pub mod reporter;
pub mod source;
pub mod stats;

// Re-export main types for convenience
pub use config::Config;
pub use error::{EstimatorError, SourceError};
pub use estimator::{EstimatorKind, ProgressiveEstimate, ProgressiveEstimator};
pub use harness::{AggregateState, AggregateSummary, Evaluation, Harness, RunRow};
pub use reporter::{OutputFormat, Reporter};
pub use source::RunRecord;
