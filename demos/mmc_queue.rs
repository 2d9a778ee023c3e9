//! A single M/M/c run printed request by request. Requests arrive at a
//! mean rate of 4 per minute and three servers each complete 2 per
//! minute on average, so the pool runs at two-thirds utilization.
//!
//! Run with `RUST_LOG=queuesim=trace` to also see every dispatch
//! decision the simulator makes.

use queuesim::workload::WorkloadGenerator;
use queuesim::QueueSimulator;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let seed: u64 = rand::random();
    let mut rng = Pcg64::seed_from_u64(seed);
    let workload = WorkloadGenerator::new(4.0, 2.0)
        .expect("rates should be positive")
        .generate(20, &mut rng);

    let trace = QueueSimulator::new(3)
        .expect("pool should have servers")
        .run(&workload.arrival_times, &workload.service_durations)
        .expect("generated workload should be valid");

    println!("Simulating 20 customers on 3 servers using the seed {}:", seed);
    for i in 0..trace.len() {
        println!(
            "customer {:>2} arrived at {:>7.3}, waited {:>6.3} in line at server {}, left at {:>7.3}",
            i,
            workload.arrival_times[i],
            trace.queue_delays()[i],
            trace.servers()[i],
            trace.departure_times()[i],
        );
    }
    println!(
        "mean time in system: {:.3}",
        trace.mean_waiting_time().expect("trace should not be empty")
    );
}
