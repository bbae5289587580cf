//! Evaluation result reporting
//!
//! This module handles formatting and outputting evaluations in various
//! formats.
//!
//! # Output Formats
//!
//! - **Console**: Human-readable per-run breakdown grouped by run name
//! - **CSV**: One line per run, the input for time-series plotting
//! - **JSON**: Machine-readable format for further analysis
//!
//! # Example
//!
//! ```no_run
//! use bruit_harness::reporter::{Reporter, OutputFormat};
//! use bruit_harness::harness::Evaluation;
//!
//! # fn example(evaluation: Evaluation) -> anyhow::Result<()> {
//! let reporter = Reporter::new(OutputFormat::Console);
//! reporter.report(&evaluation)?;
//!
//! // Or write to a file
//! Reporter::new(OutputFormat::Csv)
//!     .write_to_file(&evaluation, "bruit.csv")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod csv;
mod json;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::harness::Evaluation;

pub use self::csv::CsvReporter;
pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for evaluations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Console output grouped by run name
    #[default]
    Console,
    /// Comma-separated rows
    Csv,
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// Reporter for evaluations
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report results to stdout
    pub fn report(&self, evaluation: &Evaluation) -> Result<()> {
        let output = self.format_results(evaluation)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    /// Write results to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, evaluation: &Evaluation, path: P) -> Result<()> {
        let output = self.format_results(evaluation)?;
        fs::write(path, output)?;
        Ok(())
    }

    /// Format results as a string
    pub fn format_results(&self, evaluation: &Evaluation) -> Result<String> {
        match self.format {
            OutputFormat::Console => ConsoleReporter::format(evaluation),
            OutputFormat::Csv => CsvReporter::format(evaluation),
            OutputFormat::Json => JsonReporter::format(evaluation, false),
            OutputFormat::JsonPretty => JsonReporter::format(evaluation, true),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}
