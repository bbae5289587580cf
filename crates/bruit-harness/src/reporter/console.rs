//! Console reporter for evaluations
//!
//! Prints every run grouped under its run name, then the cross-run averages.

use anyhow::Result;
use chrono::DateTime;
use std::fmt::Write;

use crate::estimator::EstimatorKind;
use crate::harness::{AggregateSummary, Evaluation, RunRow};

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format an evaluation for console output
    pub fn format(evaluation: &Evaluation) -> Result<String> {
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                  SAMPLE BUDGET EVALUATION                    ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;
        writeln!(output, "Started:   {}", evaluation.started_at)?;
        writeln!(output)?;

        for (run_name, rows) in evaluation.groups() {
            writeln!(output, "{}", run_name)?;
            for row in rows {
                Self::format_row(&mut output, row)?;
            }
        }

        Self::format_summary(&mut output, &evaluation.summary)?;
        Ok(output)
    }

    fn format_row(output: &mut String, row: &RunRow) -> Result<()> {
        let when = format_timestamp(row.timestamp);
        match &row.test {
            Some(test) => writeln!(output, "\t{} ({})", when, test)?,
            None => writeln!(output, "\t{}", when)?,
        }

        writeln!(
            output,
            "\t{} samples: {:.2}",
            row.samples.len(),
            row.baseline
        )?;

        for estimate in &row.estimates {
            match estimate.kind {
                EstimatorKind::Window { k } => writeln!(
                    output,
                    "\t{} samples: {:.2} ({:.2}%)",
                    k, estimate.value, estimate.deviation_pct
                )?,
                EstimatorKind::Progressive => writeln!(
                    output,
                    "\tprogressive {:.2} ({:.2}%) ({} samples, {} perms){}",
                    estimate.value,
                    estimate.deviation_pct,
                    row.consumed,
                    row.permutations,
                    if row.converged { "" } else { " [no convergence]" }
                )?,
            }
        }

        writeln!(output)?;
        Ok(())
    }

    fn format_summary(output: &mut String, summary: &AggregateSummary) -> Result<()> {
        writeln!(output, "────────────────────────────────────────────────────────────────")?;

        for kind in &summary.kinds {
            let label = match kind.kind {
                EstimatorKind::Window { k } => format!("{} samples average diff", k),
                EstimatorKind::Progressive => "progressive samples diff".to_string(),
            };
            writeln!(
                output,
                "{} {} (mean |diff| {}, p95 |diff| {})",
                label,
                format_pct(kind.mean_deviation),
                format_pct(kind.mean_abs_deviation),
                format_pct(kind.p95_abs_deviation)
            )?;
        }

        writeln!(output)?;
        writeln!(output, "Processed:       {}", summary.processed)?;
        writeln!(output, "Skipped:         {}", summary.skipped)?;
        writeln!(output, "No convergence:  {}", summary.non_converged)?;
        writeln!(
            output,
            "Alerts:          {} (|{}-sample diff| > {}%)",
            summary.alerts, summary.alert_window, summary.alert_threshold_pct
        )?;
        if let Some(consumed) = summary.mean_consumed {
            writeln!(
                output,
                "Progressive:     {:.1} samples on average, {} perms total",
                consumed, summary.total_permutations
            )?;
        }
        writeln!(output)?;
        Ok(())
    }
}

fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}

fn format_timestamp(seconds: f64) -> String {
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| format!("{}", seconds))
}
