//! Sample budget evaluation CLI
//!
//! Pulls page-load run records (or reads them from a file), evaluates the
//! fixed-window and progressive estimators against each run's full median,
//! and reports the per-run rows plus the aggregate summary.

use std::path::PathBuf;

use anyhow::Result;
use bruit_harness::source::{load_records, ActiveDataClient};
use bruit_harness::{Config, Harness, OutputFormat, Reporter};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "bruit")]
#[command(
    version,
    about = "Compare fixed sample budgets with a progressive outlier-rejecting estimator"
)]
struct Args {
    /// TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate a local JSON records file instead of querying the store
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format, overrides the configured one
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Write the report to a file instead of stdout, overrides the configured path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Shuffle seed, overrides the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore cached responses and query the store again
    #[arg(long)]
    refresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Console,
    Csv,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Console => OutputFormat::Console,
            Format::Csv => OutputFormat::Csv,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Reports go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting bruit v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    let records = match &args.input {
        Some(path) => {
            tracing::info!("Reading run records from {}", path.display());
            load_records(path)?
        }
        None => {
            let client = ActiveDataClient::new(&config.source)?.with_refresh(args.refresh);
            client.fetch_records(&config.query).await?
        }
    };

    let mut rng = match args.seed.or(config.harness.seed) {
        Some(seed) => {
            tracing::info!("Shuffling with seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let harness = Harness::from_config(&config);
    let evaluation = harness.evaluate(&records, &mut rng)?;

    let format = args.format.map(OutputFormat::from).unwrap_or(config.report.format);
    let reporter = Reporter::new(format);
    match args.output.as_ref().or(config.report.output.as_ref()) {
        Some(path) => {
            reporter.write_to_file(&evaluation, path)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => reporter.report(&evaluation)?,
    }

    Ok(())
}
