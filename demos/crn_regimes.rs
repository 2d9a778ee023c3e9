//! This example demonstrates the common random numbers variance
//! reduction technique when comparing two service regimes. Each
//! replication draws one set of customers - arrival times plus a
//! uniform draw per customer that later becomes a service time - and
//! feeds the same customers through both regimes. The comparison then
//! looks at pairwise differences in mean waiting time, which vary far
//! less between replications than two independently drawn means would.
//!
//! Replications run on their own threads, each with its own seeded
//! generator, so no replication can influence another.

use queuesim::experiment::ServiceRegime;
use queuesim::workload::CommonDraws;
use queuesim::QueueSimulator;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::thread;

const REPLICATIONS: u64 = 8;
const REQUESTS: usize = 5_000;
const ARRIVAL_RATE: f64 = 40.0;
const SERVERS: usize = 6;

fn mean_waiting_time(draws: &CommonDraws, regime: &ServiceRegime) -> f64 {
    let workload = draws.workload(regime.service_rate).expect("regime rate should be positive");
    QueueSimulator::new(SERVERS)
        .expect("pool should have servers")
        .run(&workload.arrival_times, &workload.service_durations)
        .expect("generated workload should be valid")
        .mean_waiting_time()
        .expect("workload should not be empty")
}

fn run_replication(seed: u64) -> (f64, f64) {
    let mut rng = Pcg64::seed_from_u64(seed);
    let draws = CommonDraws::generate(REQUESTS, ARRIVAL_RATE, &mut rng).expect("arrival rate should be positive");
    (
        mean_waiting_time(&draws, &ServiceRegime::traditional()),
        mean_waiting_time(&draws, &ServiceRegime::ndn()),
    )
}

fn main() {
    let base_seed: u64 = rand::random();
    let handles: Vec<_> = (0..REPLICATIONS)
        .map(|replication| thread::spawn(move || run_replication(base_seed.wrapping_add(replication))))
        .collect();

    println!(
        "Comparing regimes on {} servers with {} paired replications from seed {}:",
        SERVERS, REPLICATIONS, base_seed
    );
    let mut differences = Vec::new();
    for (replication, handle) in handles.into_iter().enumerate() {
        let (traditional, ndn) = handle.join().expect("thread should return normally");
        println!(
            "replication {}: Traditional {:.4}, NDN {:.4}, difference {:.4}",
            replication,
            traditional,
            ndn,
            traditional - ndn
        );
        differences.push(traditional - ndn);
    }

    let count = differences.len() as f64;
    let mean = differences.iter().sum::<f64>() / count;
    let variance = differences.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (count - 1.0);
    println!(
        "mean difference {:.4} with standard error {:.4}",
        mean,
        (variance / count).sqrt()
    );
}
