//! End-to-end scenarios for the estimators and the evaluation harness
//!
//! Run with: cargo test -p bruit-harness --test scenarios

use bruit_harness::config::Config;
use bruit_harness::estimator::{fixed_estimate, EstimatorKind, ProgressiveEstimator};
use bruit_harness::reporter::{OutputFormat, Reporter};
use bruit_harness::source::load_records;
use bruit_harness::stats::median;
use bruit_harness::{EstimatorError, Harness, RunRecord};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed)
}

// ============================================================================
// Harness scenarios
// ============================================================================

#[test]
fn short_sample_set_is_skipped() {
    let harness = Harness::from_config(&Config::default());
    let records = vec![RunRecord::new("raptor-tp6-amazon-firefox", 0.0, vec![250.0; 24])];

    let evaluation = harness.evaluate(&records, &mut rng()).unwrap();

    assert!(evaluation.rows.is_empty());
    assert_eq!(evaluation.summary.processed, 0);
    assert_eq!(evaluation.summary.skipped, 1);
}

#[test]
fn constant_samples_give_zero_deviation_everywhere() {
    let harness = Harness::from_config(&Config::default());
    // Two warmup samples are dropped, leaving 25
    let records = vec![RunRecord::new("raptor-tp6-amazon-firefox", 0.0, vec![250.0; 27])];

    let evaluation = harness.evaluate(&records, &mut rng()).unwrap();
    let row = &evaluation.rows[0];

    assert_eq!(row.samples.len(), 25);
    assert_eq!(row.baseline, 250.0);
    for estimate in &row.estimates {
        assert_eq!(estimate.value, 250.0, "{}", estimate.kind);
        assert_eq!(estimate.deviation_pct, 0.0, "{}", estimate.kind);
    }
    assert_eq!(row.consumed, 8);
    assert_eq!(row.permutations, 0);
    assert!(row.converged);
    assert_eq!(evaluation.summary.alerts, 0);
}

#[test]
fn warmup_samples_never_reach_the_estimators() {
    let harness = Harness::from_config(&Config::default());
    let mut samples = vec![5000.0, 4000.0];
    samples.extend(std::iter::repeat(250.0).take(25));
    let records = vec![RunRecord::new("raptor-tp6-amazon-firefox", 0.0, samples)];

    let evaluation = harness.evaluate(&records, &mut rng()).unwrap();

    assert!(evaluation.rows[0].samples.iter().all(|&s| s == 250.0));
}

#[test]
fn window_order_follows_configuration() {
    let config = Config::from_str(
        r#"
        [harness]
        windows = [20, 8]
        alert_window = 8
        "#,
    )
    .unwrap();
    let harness = Harness::from_config(&config);
    let records = vec![RunRecord::new("raptor-tp6-amazon-firefox", 0.0, vec![250.0; 30])];

    let evaluation = harness.evaluate(&records, &mut rng()).unwrap();

    assert_eq!(
        evaluation.kinds,
        vec![
            EstimatorKind::Window { k: 20 },
            EstimatorKind::Window { k: 8 },
            EstimatorKind::Progressive,
        ]
    );
    let kinds: Vec<_> = evaluation.rows[0].estimates.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, evaluation.kinds);
}

#[test]
fn bundled_config_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join("tp6.toml");
    let config = Config::from_file(path).unwrap();

    assert_eq!(config.harness.windows, vec![8, 13, 20]);
    assert_eq!(config.harness.seed, Some(20191106));
    assert_eq!(config.query.since.as_deref(), Some("today-20day"));
}

#[test]
fn evaluate_recorded_response() {
    let records = load_records(fixture("activedata_response.json")).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[1].timestamp, 1_577_836_860.5);
    assert_eq!(records[2].test, None);
    assert!(records[2].sample_values().is_none());

    let harness = Harness::from_config(&Config::default());
    let evaluation = harness.evaluate(&records, &mut rng()).unwrap();

    assert_eq!(evaluation.summary.processed, 2);
    assert_eq!(evaluation.summary.skipped, 2);

    let names: Vec<_> = evaluation.rows.iter().map(|r| r.run_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "raptor-tp6-amazon-firefox",
            "browsertime-tp6m-google-geckoview"
        ]
    );
    assert_eq!(evaluation.rows[0].samples.len(), 30);
    assert_eq!(evaluation.rows[1].test.as_deref(), Some("fcp"));

    for kind in &evaluation.kinds {
        assert_eq!(evaluation.summary.kind(*kind).unwrap().count, 2);
    }
}

#[test]
fn recorded_response_reports_in_every_format() {
    let records = load_records(fixture("activedata_response.json")).unwrap();
    let evaluation = Harness::from_config(&Config::default())
        .evaluate(&records, &mut rng())
        .unwrap();

    for format in [
        OutputFormat::Console,
        OutputFormat::Csv,
        OutputFormat::Json,
        OutputFormat::JsonPretty,
    ] {
        let output = Reporter::new(format).format_results(&evaluation).unwrap();
        assert!(output.contains("raptor-tp6-amazon-firefox"), "{:?}", format);
        assert!(!output.contains("raptor-tp6-bing-firefox"), "{:?}", format);
    }
}

#[test]
fn same_seed_reproduces_the_evaluation() {
    let records = load_records(fixture("activedata_response.json")).unwrap();
    let harness = Harness::from_config(&Config::default());

    let first = harness.evaluate(&records, &mut rng()).unwrap();
    let second = harness.evaluate(&records, &mut rng()).unwrap();

    for (a, b) in first.rows.iter().zip(&second.rows) {
        assert_eq!(a.samples, b.samples);
        assert_eq!(a.estimates, b.estimates);
    }
}

// ============================================================================
// Estimator scenarios
// ============================================================================

#[test]
fn fixed_window_of_constant_samples() {
    let samples = vec![250.0; 25];
    for k in [8, 13, 20] {
        assert_eq!(fixed_estimate(&samples, k).unwrap(), 250.0);
    }
}

#[test]
fn fixed_window_ignores_samples_past_k() {
    let mut samples: Vec<f64> = (0..30).map(|i| 200.0 + i as f64).collect();
    let before = fixed_estimate(&samples, 13).unwrap();

    samples[13..].reverse();
    samples[20] = 1e9;

    assert_eq!(fixed_estimate(&samples, 13).unwrap(), before);
}

#[test]
fn fixed_window_needs_k_samples() {
    assert_eq!(
        fixed_estimate(&[1.0; 12], 13),
        Err(EstimatorError::InsufficientSamples {
            needed: 13,
            available: 12
        })
    );
}

#[test]
fn progressive_stops_before_a_late_outlier() {
    let mut samples = vec![100.0; 9];
    samples.push(500.0);

    let estimate = ProgressiveEstimator::default().estimate(&samples);

    assert_eq!(estimate.value, 100.0);
    assert_eq!(estimate.consumed, 8);
    assert_eq!(estimate.permutations, 0);
    assert!(estimate.converged());
}

#[test]
fn progressive_replaces_an_outlier_inside_the_window() {
    let samples = vec![
        100.0, 101.0, 99.0, 100.0, 1000.0, 101.0, 99.0, 100.0, 100.0, 100.0, 101.0,
    ];

    let estimate = ProgressiveEstimator::default().estimate(&samples);

    assert_eq!(estimate.permutations, 1);
    assert_eq!(estimate.consumed, 9);
    assert_eq!(estimate.value, 100.0);
    assert!(estimate.converged());
}

#[test]
fn progressive_never_reads_an_outlier_past_a_clean_initial_window() {
    let samples = vec![
        100.0, 102.0, 98.0, 101.0, 99.0, 103.0, 97.0, 100.0, 101.0, 1000.0, 100.0, 101.0, 99.0,
    ];

    let estimate = ProgressiveEstimator::default().estimate(&samples);

    // The first nine samples are self-consistent, so 1000 is never reached
    assert!(estimate.converged());
    assert_eq!(estimate.consumed, 8);
    assert_eq!(estimate.permutations, 0);
    assert_eq!(estimate.value, 100.0);
}

#[test]
fn zero_samples_report_zero_deviation() {
    let harness = Harness::from_config(&Config::default());
    let records = vec![
        RunRecord::new("raptor-tp6-zero-firefox", 0.0, vec![0.0; 27]),
        RunRecord::new("raptor-tp6-amazon-firefox", 60.0, vec![250.0; 27]),
    ];

    let evaluation = harness.evaluate(&records, &mut rng()).unwrap();

    assert_eq!(evaluation.summary.processed, 2);
    for kind in &evaluation.summary.kinds {
        assert_eq!(kind.mean_deviation, Some(0.0), "{}", kind.kind);
        assert_eq!(kind.p95_abs_deviation, Some(0.0), "{}", kind.kind);
    }

    let json = Reporter::new(OutputFormat::Json)
        .format_results(&evaluation)
        .unwrap();
    let parsed: bruit_harness::Evaluation = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.rows[0].baseline, 0.0);
}

#[test]
fn progressive_falls_back_to_full_median_when_exhausted() {
    let samples = vec![1.0, 2.0, 3.0, 4.0, 1000.0, 5.0, 6.0, 7.0, 8.0];

    let estimate = ProgressiveEstimator::default().estimate(&samples);

    assert!(!estimate.converged());
    assert_eq!(estimate.value, median(&samples).unwrap());
    assert_eq!(estimate.consumed, 8);
}
