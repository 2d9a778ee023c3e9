//! Compares the Traditional and NDN service regimes on pools of 1, 3,
//! and 6 servers. Each combination runs 100 trials of between 100 and
//! 999 requests arriving at a rate of 1000 per second, and the summary
//! reports the pooled mean, median, and 99th percentile waiting times.
//!
//! Pass a path to a JSON experiment configuration (requires the `serde`
//! feature) to override the defaults.

use queuesim::experiment::{run_experiment, ExperimentConfig};

fn load_config() -> ExperimentConfig {
    match std::env::args().nth(1) {
        #[cfg(feature = "serde")]
        Some(path) => {
            let text = std::fs::read_to_string(&path).expect("config file should be readable");
            serde_json::from_str(&text).expect("config file should hold an experiment configuration")
        },
        #[cfg(not(feature = "serde"))]
        Some(_) => panic!("loading a configuration requires the serde feature"),
        None => ExperimentConfig::default(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config();
    let aggregator = run_experiment(&config).expect("experiment configuration should be valid");

    println!("{:>7}  {:<12} {:>10} {:>10} {:>10}", "servers", "regime", "mean", "median", "p99");
    for (server_count, regime) in aggregator.keys() {
        let series = aggregator
            .series(server_count, regime)
            .expect("listed keys should have results");
        println!(
            "{:>7}  {:<12} {:>10.4} {:>10.4} {:>10.4}",
            server_count,
            regime,
            series.mean().unwrap_or(f64::NAN),
            series.quantile(0.5).unwrap_or(f64::NAN),
            series.quantile(0.99).unwrap_or(f64::NAN),
        );
    }
}
