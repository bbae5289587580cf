use bruit_harness::config::Config;
use bruit_harness::source::build_query;
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("crates/bruit-harness/configs/tp6.toml")
    };

    println!("Validating config file: {}", config_path.display());

    let config = Config::from_file(&config_path)?;

    println!("\n✓ Successfully parsed configuration!");
    println!("\nEndpoint: {}", config.source.endpoint);
    match &config.source.cache_dir {
        Some(dir) => println!("Cache: {}", dir.display()),
        None => println!("Cache: disabled"),
    }

    println!("\nEstimator:");
    println!("  Threshold: {}", config.estimator.threshold);
    println!("  Initial window: {}", config.estimator.initial_window);

    println!("\nHarness:");
    println!("  Warmup trim: {}", config.harness.warmup_trim);
    println!("  Min samples: {}", config.harness.min_samples);
    println!("  Windows: {:?}", config.harness.windows);
    println!(
        "  Alert: |{}-sample diff| > {}%",
        config.harness.alert_window, config.harness.alert_threshold_pct
    );
    println!("  Seed: {:?}", config.harness.seed);

    println!("\nQuery:");
    println!("{}", serde_json::to_string_pretty(&build_query(&config.query))?);

    println!("\n✓ All validations passed!");

    Ok(())
}
