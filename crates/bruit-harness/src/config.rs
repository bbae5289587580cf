//! Configuration parsing for sample-budget evaluations
//!
//! This module provides TOML-based configuration describing which runs to
//! query, where to cache responses, and the constants used by the estimators
//! and the evaluation harness.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::estimator::{DEFAULT_INITIAL_WINDOW, DEFAULT_THRESHOLD};
use crate::reporter::OutputFormat;
use crate::source::DEFAULT_ENDPOINT;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which runs to select from the measurement store
    #[serde(default)]
    pub query: QueryConfig,
    /// Where and how to fetch run records
    #[serde(default)]
    pub source: SourceConfig,
    /// Progressive estimator constants
    #[serde(default)]
    pub estimator: EstimatorConfig,
    /// Evaluation harness constants
    #[serde(default)]
    pub harness: HarnessConfig,
    /// Report format and destination
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - The constants fail [`Config::validate`]
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bruit_harness::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("tp6.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// Every section is optional; missing values fall back to the reference
    /// constants.
    ///
    /// # Example
    ///
    /// ```
    /// use bruit_harness::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [harness]
    ///     windows = [8, 13, 20]
    ///     seed = 42
    /// "#;
    /// let config = Config::from_str(toml)?;
    /// assert_eq!(config.harness.seed, Some(42));
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the constants are mutually consistent.
    ///
    /// Every window must fit inside the minimum usable sample count, so a
    /// sample set that passed the length check can always feed every
    /// estimator.
    pub fn validate(&self) -> anyhow::Result<()> {
        let harness = &self.harness;
        let estimator = &self.estimator;

        if harness.min_samples == 0 {
            bail!("harness.min_samples must be at least 1");
        }

        for &k in &harness.windows {
            if k == 0 || k > harness.min_samples {
                bail!(
                    "window {} must be between 1 and min_samples ({})",
                    k,
                    harness.min_samples
                );
            }
        }

        if !harness.windows.contains(&harness.alert_window) {
            bail!(
                "alert_window {} is not one of the configured windows {:?}",
                harness.alert_window,
                harness.windows
            );
        }

        if !harness.alert_threshold_pct.is_finite() || harness.alert_threshold_pct < 0.0 {
            bail!("harness.alert_threshold_pct must be a non-negative number");
        }

        if estimator.initial_window == 0 || estimator.initial_window > harness.min_samples {
            bail!(
                "estimator.initial_window {} must be between 1 and min_samples ({})",
                estimator.initial_window,
                harness.min_samples
            );
        }

        if !estimator.threshold.is_finite() || estimator.threshold <= 0.0 {
            bail!("estimator.threshold must be a positive number");
        }

        Ok(())
    }
}

/// Filter describing which runs to pull from the measurement store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Run-name substrings naming the harness (any may match)
    #[serde(default = "default_frameworks")]
    pub frameworks: Vec<String>,
    /// Run-name substrings naming the suite (any may match)
    #[serde(default = "default_suites")]
    pub suites: Vec<String>,
    /// Required task state, `None` to accept every state
    #[serde(default = "default_task_state")]
    pub task_state: Option<String>,
    /// Inclusive lower bound, as a store date expression (e.g. `today-20day`)
    #[serde(default)]
    pub since: Option<String>,
    /// Exclusive upper bound, as a store date expression (e.g. `today`)
    #[serde(default)]
    pub until: Option<String>,
    /// Maximum number of rows to return (default: 10000)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            frameworks: default_frameworks(),
            suites: default_suites(),
            task_state: default_task_state(),
            since: None,
            until: None,
            limit: default_limit(),
        }
    }
}

fn default_frameworks() -> Vec<String> {
    vec!["raptor".to_string(), "browsertime".to_string()]
}

fn default_suites() -> Vec<String> {
    vec!["tp6-".to_string(), "tp6m-".to_string()]
}

fn default_task_state() -> Option<String> {
    Some("completed".to_string())
}

fn default_limit() -> u32 {
    10_000
}

/// Measurement store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Query endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Directory holding cached responses, `None` disables caching
    #[serde(default = "default_cache_dir")]
    pub cache_dir: Option<PathBuf>,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            cache_dir: default_cache_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_cache_dir() -> Option<PathBuf> {
    Some(PathBuf::from(".bruit-cache"))
}

fn default_timeout_secs() -> u64 {
    120
}

/// Progressive estimator constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Z-score above which a window element is rejected (default: 2.8)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Size of the initial working window (default: 9)
    #[serde(default = "default_initial_window")]
    pub initial_window: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            initial_window: default_initial_window(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_initial_window() -> usize {
    DEFAULT_INITIAL_WINDOW
}

/// Evaluation harness constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Leading samples dropped from every run (default: 2)
    #[serde(default = "default_warmup_trim")]
    pub warmup_trim: usize,
    /// Minimum samples left after trimming for a run to count (default: 25)
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Fixed-window sizes to compare (default: 8, 13, 20)
    #[serde(default = "default_windows")]
    pub windows: Vec<usize>,
    /// Window whose deviation is checked against the alert threshold (default: 13)
    #[serde(default = "default_alert_window")]
    pub alert_window: usize,
    /// Deviation magnitude, in percent, that raises an alert (default: 10.0)
    #[serde(default = "default_alert_threshold_pct")]
    pub alert_threshold_pct: f64,
    /// Seed for sample shuffling, `None` to seed from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            warmup_trim: default_warmup_trim(),
            min_samples: default_min_samples(),
            windows: default_windows(),
            alert_window: default_alert_window(),
            alert_threshold_pct: default_alert_threshold_pct(),
            seed: None,
        }
    }
}

fn default_warmup_trim() -> usize {
    2
}

fn default_min_samples() -> usize {
    25
}

fn default_windows() -> Vec<usize> {
    vec![8, 13, 20]
}

fn default_alert_window() -> usize {
    13
}

fn default_alert_threshold_pct() -> f64 {
    10.0
}

/// Report settings, overridable from the command line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format (default: console)
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout
    #[serde(default)]
    pub output: Option<PathBuf>,
}
