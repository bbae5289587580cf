//! CSV reporter for evaluations
//!
//! One line per processed run. Columns:
//!
//! ```text
//! run_name,test,when,baseline,with_8,diff_8,...,progressive,diff_progressive,consumed,permutations,converged,samples
//! ```
//!
//! `when` is the raw capture timestamp in seconds, `samples` is the
//! `;`-separated list of trimmed, shuffled samples.

use anyhow::Result;
use std::fmt::Write;

use crate::estimator::EstimatorKind;
use crate::harness::Evaluation;

/// CSV format reporter
pub struct CsvReporter;

impl CsvReporter {
    pub fn format(evaluation: &Evaluation) -> Result<String> {
        let mut output = String::new();

        let mut header = vec![
            "run_name".to_string(),
            "test".to_string(),
            "when".to_string(),
            "baseline".to_string(),
        ];
        for kind in &evaluation.kinds {
            header.push(kind.label());
            header.push(diff_label(*kind));
        }
        header.extend(
            ["consumed", "permutations", "converged", "samples"]
                .iter()
                .map(|s| s.to_string()),
        );
        writeln!(output, "{}", header.join(","))?;

        for row in &evaluation.rows {
            let mut fields = vec![
                escape(&row.run_name),
                escape(row.test.as_deref().unwrap_or("")),
                row.timestamp.to_string(),
                row.baseline.to_string(),
            ];
            for kind in &evaluation.kinds {
                match row.estimate(*kind) {
                    Some(estimate) => {
                        fields.push(estimate.value.to_string());
                        fields.push(estimate.deviation_pct.to_string());
                    }
                    None => {
                        fields.push(String::new());
                        fields.push(String::new());
                    }
                }
            }
            fields.push(row.consumed.to_string());
            fields.push(row.permutations.to_string());
            fields.push(row.converged.to_string());
            fields.push(
                row.samples
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(";"),
            );
            writeln!(output, "{}", fields.join(","))?;
        }

        Ok(output)
    }
}

fn diff_label(kind: EstimatorKind) -> String {
    match kind {
        EstimatorKind::Window { k } => format!("diff_{}", k),
        EstimatorKind::Progressive => "diff_progressive".to_string(),
    }
}

/// Quote a field if it contains a separator, quote or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
