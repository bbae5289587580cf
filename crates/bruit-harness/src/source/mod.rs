//! Run records and the measurement store they come from
//!
//! The harness itself only needs a list of [`RunRecord`]s. This module also
//! provides the plumbing that produces them:
//!
//! - [`build_query`]: turns a [`QueryConfig`](crate::config::QueryConfig)
//!   into an ActiveData JSON query
//! - [`ResponseCache`]: on-disk cache of raw responses keyed by query hash
//! - [`ActiveDataClient`]: posts queries, consulting the cache first
//! - [`parse_response`] / [`load_records`]: decode columnar responses or
//!   row-oriented fixture files

pub mod cache;
pub mod client;
pub mod query;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::SourceError;

pub use cache::ResponseCache;
pub use client::{ActiveDataClient, DEFAULT_ENDPOINT};
pub use query::{build_query, columns};

/// One execution of a named run as returned by the measurement store.
///
/// `samples` is kept as raw JSON: the store may omit it, return something
/// other than a list, or return too few values. The harness decides what to
/// skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run name, e.g. `raptor-tp6-amazon-firefox`
    pub run_name: String,
    /// Test name within the suite, if reported
    #[serde(default)]
    pub test: Option<String>,
    /// Capture time in seconds since the Unix epoch, 0 when unknown
    #[serde(default, deserialize_with = "null_as_zero")]
    pub timestamp: f64,
    /// Raw sample payload
    #[serde(default)]
    pub samples: Option<Value>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl RunRecord {
    /// Build a record from an already-decoded sample list.
    pub fn new(run_name: impl Into<String>, timestamp: f64, samples: Vec<f64>) -> Self {
        Self {
            run_name: run_name.into(),
            test: None,
            timestamp,
            samples: Some(Value::from(samples)),
        }
    }

    /// Build a record with no sample payload.
    pub fn without_samples(run_name: impl Into<String>, timestamp: f64) -> Self {
        Self {
            run_name: run_name.into(),
            test: None,
            timestamp,
            samples: None,
        }
    }

    /// Decode the sample payload.
    ///
    /// Returns `None` when the payload is absent, not a list, or contains a
    /// non-numeric entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use bruit_harness::RunRecord;
    ///
    /// let record = RunRecord::new("raptor-tp6-bing-firefox", 0.0, vec![1.0, 2.0]);
    /// assert_eq!(record.sample_values(), Some(vec![1.0, 2.0]));
    ///
    /// let missing = RunRecord::without_samples("raptor-tp6-bing-firefox", 0.0);
    /// assert_eq!(missing.sample_values(), None);
    /// ```
    pub fn sample_values(&self) -> Option<Vec<f64>> {
        self.samples
            .as_ref()?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }
}

/// Decode a measurement store response into run records.
///
/// Two shapes are accepted, optionally wrapped in a top-level `data` key:
///
/// - columnar: an object mapping column names (see [`columns`]) to arrays of
///   equal length, as ActiveData returns for `select` queries
/// - row-oriented: an array of serialized [`RunRecord`]s
///
/// Rows without a usable run name are dropped with a warning so one bad row
/// does not cost the whole response.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] when the run-name column is missing or
/// the payload is neither shape.
pub fn parse_response(body: &Value) -> Result<Vec<RunRecord>, SourceError> {
    let data = body.get("data").unwrap_or(body);

    match data {
        Value::Object(table) => {
            let names = table
                .get(columns::RUN_NAME)
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    SourceError::Malformed(format!("missing `{}` column", columns::RUN_NAME))
                })?;

            let records = names
                .iter()
                .enumerate()
                .filter_map(|(row, name)| {
                    let Some(run_name) = name.as_str() else {
                        warn!("Dropping row {}: run name is {}", row, kind_of(name));
                        return None;
                    };
                    Some(RunRecord {
                        run_name: run_name.to_string(),
                        test: cell(table, columns::TEST, row)
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        timestamp: cell(table, columns::TIMESTAMP, row)
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0),
                        samples: cell(table, columns::SAMPLES, row).cloned(),
                    })
                })
                .collect();
            Ok(records)
        }
        Value::Array(rows) => Ok(rows
            .iter()
            .enumerate()
            .filter_map(|(row, value)| match RunRecord::deserialize(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Dropping row {}: {}", row, e);
                    None
                }
            })
            .collect()),
        other => Err(SourceError::Malformed(format!(
            "expected an object or array, found {}",
            kind_of(other)
        ))),
    }
}

fn cell<'a>(table: &'a Map<String, Value>, column: &str, row: usize) -> Option<&'a Value> {
    table
        .get(column)
        .and_then(Value::as_array)
        .and_then(|values| values.get(row))
        .filter(|value| !value.is_null())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read run records from a local JSON file in either accepted shape.
pub fn load_records<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<RunRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;
    let body: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
    parse_response(&body).with_context(|| format!("Failed to decode records in {}", path.display()))
}
