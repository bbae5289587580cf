use bruit_harness::config::Config;
use bruit_harness::reporter::{OutputFormat, Reporter};
use bruit_harness::source::load_records;
use bruit_harness::Harness;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let input = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("crates/bruit-harness/tests/fixtures/activedata_response.json")
    };

    let records = load_records(&input)?;
    println!("Loaded {} run records from {}", records.len(), input.display());

    let config = Config::default();
    let seed = config.harness.seed.unwrap_or(42);
    let evaluation =
        Harness::from_config(&config).evaluate(&records, &mut StdRng::seed_from_u64(seed))?;

    Reporter::new(OutputFormat::Console).report(&evaluation)?;

    Ok(())
}
