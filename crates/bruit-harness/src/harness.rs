//! Evaluation of estimators across run records
//!
//! For every run record the harness trims warmup samples, shuffles what is
//! left, and compares each estimator against the median of the full trimmed
//! set (the baseline).
//!
//! ```text
//! RunRecord ──▶ trim ──▶ shuffle ──┬──▶ baseline = median(all)
//!                                  ├──▶ with_K   = median(first K)  (per K)
//!                                  └──▶ progressive
//!                                              │
//!                       deviation = (estimate − baseline) / baseline × 100
//!                                              │
//!                                  RunRow + AggregateState
//! ```
//!
//! # Example
//!
//! ```
//! use bruit_harness::{Config, Harness, RunRecord};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let harness = Harness::from_config(&Config::default());
//! let records = vec![
//!     RunRecord::new("raptor-tp6-amazon-firefox", 0.0, vec![250.0; 30]),
//!     RunRecord::new("raptor-tp6-amazon-firefox", 60.0, vec![250.0; 10]),
//! ];
//!
//! let evaluation = harness.evaluate(&records, &mut StdRng::seed_from_u64(1)).unwrap();
//! assert_eq!(evaluation.summary.processed, 1);
//! assert_eq!(evaluation.summary.skipped, 1);
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, EstimatorConfig, HarnessConfig};
use crate::error::EstimatorError;
use crate::estimator::{deviation_pct, fixed_estimate, EstimatorKind, ProgressiveEstimator};
use crate::source::RunRecord;
use crate::stats::{mean, median, percentile, trim_leading};

/// One estimator's value for one run, and its deviation from the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRow {
    /// Which estimator produced the value
    pub kind: EstimatorKind,
    /// Estimated value
    pub value: f64,
    /// Signed percentage deviation from the baseline
    pub deviation_pct: f64,
}

/// Everything computed for one processed run record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRow {
    /// Run name
    pub run_name: String,
    /// Test name, if the store reported one
    pub test: Option<String>,
    /// Capture time in seconds since the Unix epoch
    pub timestamp: f64,
    /// Median of the full trimmed, shuffled sample set
    pub baseline: f64,
    /// Fixed-window estimates in configured order, then the progressive one
    pub estimates: Vec<EstimateRow>,
    /// Index of the last sample the progressive estimator read
    pub consumed: usize,
    /// Replacement samples the progressive estimator drew
    pub permutations: usize,
    /// Whether the progressive estimator converged
    pub converged: bool,
    /// Trimmed, shuffled samples the estimators saw
    pub samples: Vec<f64>,
}

impl RunRow {
    /// Look up the estimate of a given kind.
    pub fn estimate(&self, kind: EstimatorKind) -> Option<&EstimateRow> {
        self.estimates.iter().find(|e| e.kind == kind)
    }

    /// Deviation of the K-sample estimator, if it was computed.
    pub fn window_deviation(&self, k: usize) -> Option<f64> {
        self.estimate(EstimatorKind::Window { k })
            .map(|e| e.deviation_pct)
    }
}

/// Cross-run statistics for a single estimator kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindSummary {
    pub kind: EstimatorKind,
    /// Number of deviations accumulated
    pub count: usize,
    /// Arithmetic mean of signed deviations
    pub mean_deviation: Option<f64>,
    /// Arithmetic mean of absolute deviations
    pub mean_abs_deviation: Option<f64>,
    /// 95th percentile of absolute deviations
    pub p95_abs_deviation: Option<f64>,
}

/// Aggregate summary handed to the reporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Per-estimator statistics, fixed windows first
    pub kinds: Vec<KindSummary>,
    /// Run records that produced a row
    pub processed: usize,
    /// Run records excluded for missing, malformed or short samples
    pub skipped: usize,
    /// Rows where the progressive estimator fell back to the full median
    pub non_converged: usize,
    /// Rows whose alert-window deviation exceeded the alert threshold
    pub alerts: usize,
    /// Window checked for alerts
    pub alert_window: usize,
    /// Alert threshold in percent
    pub alert_threshold_pct: f64,
    /// Mean `consumed` of the progressive estimator
    pub mean_consumed: Option<f64>,
    /// Total replacement samples drawn by the progressive estimator
    pub total_permutations: usize,
}

impl AggregateSummary {
    /// Statistics for one estimator kind.
    pub fn kind(&self, kind: EstimatorKind) -> Option<&KindSummary> {
        self.kinds.iter().find(|k| k.kind == kind)
    }
}

/// Mutable accumulation state owned by one evaluation.
///
/// Counters are plain fields so independent evaluations never share state.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    deviations: Vec<(EstimatorKind, Vec<f64>)>,
    consumed: Vec<usize>,
    pub processed: usize,
    pub skipped: usize,
    pub non_converged: usize,
    pub alerts: usize,
    pub total_permutations: usize,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deviations accumulated so far for `kind`.
    pub fn deviations(&self, kind: EstimatorKind) -> &[f64] {
        self.deviations
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    fn record_skip(&mut self) {
        self.skipped += 1;
    }

    fn record_row(&mut self, row: &RunRow, alert_window: usize, alert_threshold_pct: f64) {
        self.processed += 1;

        for estimate in &row.estimates {
            match self.deviations.iter_mut().find(|(k, _)| *k == estimate.kind) {
                Some((_, values)) => values.push(estimate.deviation_pct),
                None => self
                    .deviations
                    .push((estimate.kind, vec![estimate.deviation_pct])),
            }
        }

        if !row.converged {
            self.non_converged += 1;
        }
        if let Some(deviation) = row.window_deviation(alert_window) {
            if deviation.abs() > alert_threshold_pct {
                self.alerts += 1;
            }
        }

        self.consumed.push(row.consumed);
        self.total_permutations += row.permutations;
    }

    /// Freeze the accumulated state into a summary.
    pub fn summary(&self, alert_window: usize, alert_threshold_pct: f64) -> AggregateSummary {
        let kinds = self
            .deviations
            .iter()
            .map(|(kind, values)| {
                let absolute: Vec<f64> = values.iter().map(|d| d.abs()).collect();
                KindSummary {
                    kind: *kind,
                    count: values.len(),
                    mean_deviation: mean(values),
                    mean_abs_deviation: mean(&absolute),
                    p95_abs_deviation: percentile(&absolute, 95.0),
                }
            })
            .collect();

        let consumed: Vec<f64> = self.consumed.iter().map(|&c| c as f64).collect();

        AggregateSummary {
            kinds,
            processed: self.processed,
            skipped: self.skipped,
            non_converged: self.non_converged,
            alerts: self.alerts,
            alert_window,
            alert_threshold_pct,
            mean_consumed: mean(&consumed),
            total_permutations: self.total_permutations,
        }
    }
}

/// Rows and summary from one evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// When the evaluation started (RFC 3339)
    pub started_at: String,
    /// Estimator kinds in column order
    pub kinds: Vec<EstimatorKind>,
    /// One row per processed run record, in input order
    pub rows: Vec<RunRow>,
    /// Cross-run aggregates
    pub summary: AggregateSummary,
}

impl Evaluation {
    /// Rows grouped by run name, groups in first-seen order.
    pub fn groups(&self) -> Vec<(&str, Vec<&RunRow>)> {
        let mut groups: Vec<(&str, Vec<&RunRow>)> = Vec::new();
        for row in &self.rows {
            match groups.iter_mut().find(|(name, _)| *name == row.run_name) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((row.run_name.as_str(), vec![row])),
            }
        }
        groups
    }
}

/// Evaluates estimators over run records
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    progressive: ProgressiveEstimator,
}

impl Harness {
    pub fn new(config: HarnessConfig, estimator: &EstimatorConfig) -> Self {
        Self {
            config,
            progressive: ProgressiveEstimator::new(estimator.threshold, estimator.initial_window),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.harness.clone(), &config.estimator)
    }

    /// Estimator kinds in column order: fixed windows, then progressive.
    pub fn kinds(&self) -> Vec<EstimatorKind> {
        self.config
            .windows
            .iter()
            .map(|&k| EstimatorKind::Window { k })
            .chain(std::iter::once(EstimatorKind::Progressive))
            .collect()
    }

    /// Evaluate every record, returning rows and the aggregate summary.
    ///
    /// # Errors
    ///
    /// Only a configuration whose windows exceed `min_samples` can fail,
    /// with [`EstimatorError::InsufficientSamples`].
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        records: &[RunRecord],
        rng: &mut R,
    ) -> Result<Evaluation, EstimatorError> {
        let started_at = chrono::Utc::now().to_rfc3339();
        debug!(
            windows = ?self.config.windows,
            threshold = self.progressive.threshold(),
            initial_window = self.progressive.initial_window(),
            "Starting evaluation"
        );
        let mut state = AggregateState::new();
        let mut rows = Vec::new();

        for record in records {
            if let Some(row) = self.evaluate_record(record, rng, &mut state)? {
                rows.push(row);
            }
        }

        let summary = state.summary(self.config.alert_window, self.config.alert_threshold_pct);

        info!(
            "Evaluated {} records: {} processed, {} skipped, {} did not converge",
            records.len(),
            summary.processed,
            summary.skipped,
            summary.non_converged
        );
        if summary.alerts > 0 {
            warn!(
                "{} runs deviated more than {}% with {} samples",
                summary.alerts, self.config.alert_threshold_pct, self.config.alert_window
            );
        }

        Ok(Evaluation {
            started_at,
            kinds: self.kinds(),
            rows,
            summary,
        })
    }

    /// Evaluate one record, updating `state`.
    ///
    /// Returns `Ok(None)` when the record was skipped.
    pub fn evaluate_record<R: Rng + ?Sized>(
        &self,
        record: &RunRecord,
        rng: &mut R,
        state: &mut AggregateState,
    ) -> Result<Option<RunRow>, EstimatorError> {
        let samples = match self.prepare(record, rng) {
            Some(samples) => samples,
            None => {
                state.record_skip();
                return Ok(None);
            }
        };

        // Non-empty after the length check
        let baseline = median(&samples).unwrap_or(f64::NAN);

        let mut estimates = Vec::with_capacity(self.config.windows.len() + 1);
        for &k in &self.config.windows {
            let value = fixed_estimate(&samples, k)?;
            estimates.push(EstimateRow {
                kind: EstimatorKind::Window { k },
                value,
                deviation_pct: deviation_pct(baseline, value),
            });
        }

        let progressive = self.progressive.estimate(&samples);
        if !progressive.converged() {
            debug!(
                run = %record.run_name,
                consumed = progressive.consumed,
                "Progressive estimator did not converge"
            );
        }
        estimates.push(EstimateRow {
            kind: EstimatorKind::Progressive,
            value: progressive.value,
            deviation_pct: deviation_pct(baseline, progressive.value),
        });

        // A zero baseline leaves any differing estimate without a relative deviation
        if estimates.iter().any(|e| !e.deviation_pct.is_finite()) {
            debug!(
                run = %record.run_name,
                baseline,
                "Skipping record whose deviations are undefined"
            );
            state.record_skip();
            return Ok(None);
        }

        let row = RunRow {
            run_name: record.run_name.clone(),
            test: record.test.clone(),
            timestamp: record.timestamp,
            baseline,
            estimates,
            consumed: progressive.consumed,
            permutations: progressive.permutations,
            converged: progressive.converged(),
            samples,
        };

        state.record_row(&row, self.config.alert_window, self.config.alert_threshold_pct);
        Ok(Some(row))
    }

    /// Decode, trim and shuffle a record's samples.
    ///
    /// Returns `None` when the record must be skipped: missing or malformed
    /// payload, or fewer than `min_samples` left after trimming.
    pub fn prepare<R: Rng + ?Sized>(&self, record: &RunRecord, rng: &mut R) -> Option<Vec<f64>> {
        let raw = match record.sample_values() {
            Some(raw) => raw,
            None => {
                debug!(run = %record.run_name, "Skipping record without a numeric sample list");
                return None;
            }
        };

        let trimmed = trim_leading(&raw, self.config.warmup_trim);
        if trimmed.len() < self.config.min_samples {
            debug!(
                run = %record.run_name,
                samples = trimmed.len(),
                required = self.config.min_samples,
                "Skipping record with too few samples"
            );
            return None;
        }

        let mut samples = trimmed.to_vec();
        samples.shuffle(rng);
        Some(samples)
    }
}
