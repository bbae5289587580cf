//! JSON reporter for evaluations

use crate::harness::Evaluation;
use anyhow::Result;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format an evaluation as JSON, optionally pretty-printed.
    pub fn format(evaluation: &Evaluation, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(evaluation)?
        } else {
            serde_json::to_string(evaluation)?
        };
        Ok(output)
    }
}
