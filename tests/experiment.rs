use queuesim::experiment::{run_experiment, ExperimentConfig, ServiceRegime};
use queuesim::DispatchStrategy;

fn config() -> ExperimentConfig {
    ExperimentConfig {
        trials: 12,
        min_requests: 100,
        max_requests: 400,
        seed: 20240517,
        ..ExperimentConfig::default()
    }
}

#[test]
fn experiment_is_reproducible() {
    let first = run_experiment(&config()).expect("experiment should complete with no errors");
    let second = run_experiment(&config()).expect("experiment should complete with no errors");
    assert_eq!(first, second, "identical configurations produced different results");

    let reseeded = run_experiment(&ExperimentConfig { seed: 1, ..config() }).unwrap();
    assert_ne!(first, reseeded, "changing the seed did not change the results");
}

#[test]
fn dispatch_strategy_does_not_change_results() {
    let linear = run_experiment(&config()).unwrap();
    let heap = run_experiment(&ExperimentConfig {
        dispatch: DispatchStrategy::Heap,
        ..config()
    })
    .unwrap();
    assert_eq!(linear, heap);
}

#[test]
fn faster_regime_and_more_servers_wait_less() {
    let config = ExperimentConfig {
        common_random_numbers: true,
        ..config()
    };
    let aggregator = run_experiment(&config).unwrap();
    let mean = |server_count, regime| {
        aggregator
            .series(server_count, regime)
            .and_then(|series| series.mean())
            .expect("every cell should have results")
    };

    for &server_count in &config.server_counts {
        assert!(
            mean(server_count, "NDN") < mean(server_count, "Traditional"),
            "NDN was not faster on {} server(s)",
            server_count
        );
    }
    for regime in ["Traditional", "NDN"] {
        assert!(mean(6, regime) < mean(3, regime), "{} did not improve from 3 to 6 servers", regime);
        assert!(mean(3, regime) < mean(1, regime), "{} did not improve from 1 to 3 servers", regime);
    }
}

#[test]
fn cdf_and_scatter_cover_every_trial() {
    let config = ExperimentConfig {
        regimes: vec![ServiceRegime::new("Slow", 5.0), ServiceRegime::new("Fast", 50.0)],
        server_counts: vec![2],
        ..config()
    };
    let aggregator = run_experiment(&config).unwrap();

    for regime in ["Slow", "Fast"] {
        let series = aggregator.series(2, regime).unwrap();
        let scatter = series.scatter();
        assert_eq!(config.trials, scatter.len());
        assert!(scatter.windows(2).all(|pair| pair[0].0 <= pair[1].0), "scatter was not sorted");

        let total_requests: usize = scatter.iter().map(|&(num_requests, _)| num_requests).sum();
        let cdf = series.empirical_cdf();
        assert_eq!(total_requests, cdf.len());
        assert_eq!(Some(&1.0), cdf.last().map(|(_, fraction)| fraction));
        assert!(cdf.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    }
}
