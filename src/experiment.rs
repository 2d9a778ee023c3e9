//! Configuration and a parallel runner for repeated-trial comparisons of service regimes.
//!
//! An experiment crosses every configured server count with every [`ServiceRegime`] and runs a fixed number of
//! independent trials in each resulting cell. Each trial draws a request count, generates a workload, simulates it,
//! and records the waiting times in an [`Aggregator`]. Cells share no mutable state, so each one runs on its own
//! scoped thread; results are merged in configuration order afterwards, which keeps the outcome independent of thread
//! scheduling.

use crate::aggregate::{Aggregator, Series};
use crate::error::ConfigViolation;
use crate::pool::DispatchStrategy;
use crate::workload::{check_rate, CommonDraws, WorkloadGenerator};
use crate::{QueueSimulator, Result};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::collections::HashSet;
use std::thread;

/// A named service configuration, defined by the rate at which one server completes requests.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceRegime {
    /// Label results are recorded under.
    pub name: String,
    /// Mean number of requests one server completes per unit time.
    pub service_rate: f64,
}

impl ServiceRegime {
    /// Create a regime recorded under `name` whose servers each complete `service_rate` requests per unit time.
    pub fn new(name: impl Into<String>, service_rate: f64) -> Self {
        Self {
            name: name.into(),
            service_rate,
        }
    }

    /// The baseline regime, completing 10 requests per unit time.
    pub fn traditional() -> Self {
        Self::new("Traditional", 10.0)
    }

    /// The faster alternative, completing 15 requests per unit time.
    pub fn ndn() -> Self {
        Self::new("NDN", 15.0)
    }
}

/// Parameters of a repeated-trial experiment.
///
/// The [`Default`] compares [`ServiceRegime::traditional()`] with [`ServiceRegime::ndn()`] on 1, 3, and 6 servers,
/// with requests arriving at a rate of 1000 and 100 trials per cell of between 100 and 999 requests each.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExperimentConfig {
    /// Mean number of request arrivals per unit time.
    pub arrival_rate: f64,
    /// Regimes to compare.
    pub regimes: Vec<ServiceRegime>,
    /// Pool sizes to simulate each regime with.
    pub server_counts: Vec<usize>,
    /// Independent trials per server count and regime.
    pub trials: usize,
    /// Smallest request count a trial may draw.
    pub min_requests: usize,
    /// Exclusive upper bound on the request count a trial may draw.
    pub max_requests: usize,
    /// Base seed from which every trial's random source is derived.
    pub seed: u64,
    /// Feed every regime the same arrivals and uniform service draws within a trial.
    pub common_random_numbers: bool,
    /// How the simulator picks the earliest free server.
    pub dispatch: DispatchStrategy,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            arrival_rate: 1000.0,
            regimes: vec![ServiceRegime::traditional(), ServiceRegime::ndn()],
            server_counts: vec![1, 3, 6],
            trials: 100,
            min_requests: 100,
            max_requests: 1000,
            seed: 0,
            common_random_numbers: false,
            dispatch: DispatchStrategy::default(),
        }
    }
}

impl ExperimentConfig {
    /// Check every parameter without running anything.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::InvalidConfig`] describing the first problem found: a non-positive or non-finite rate, an
    /// empty request range, no server counts or a zero server count, no regimes or two regimes sharing a name, or
    /// zero trials.
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn validate(&self) -> Result<()> {
        check_rate("arrival rate", self.arrival_rate)?;
        if self.server_counts.is_empty() {
            return Err(ConfigViolation::NoServerCounts.into());
        }
        if self.server_counts.contains(&0) {
            return Err(ConfigViolation::NoServers.into());
        }
        if self.regimes.is_empty() {
            return Err(ConfigViolation::NoRegimes.into());
        }
        let mut names = HashSet::new();
        for regime in &self.regimes {
            if !names.insert(regime.name.as_str()) {
                return Err(ConfigViolation::DuplicateRegime(regime.name.clone()).into());
            }
            check_rate(&format!("service rate of {}", regime.name), regime.service_rate)?;
        }
        if self.trials == 0 {
            return Err(ConfigViolation::NoTrials.into());
        }
        if self.min_requests >= self.max_requests {
            return Err(ConfigViolation::EmptyRequestRange {
                min: self.min_requests,
                max: self.max_requests,
            }
            .into());
        }
        Ok(())
    }
}

/// Run every trial of `config` and collect the waiting times.
///
/// The result depends only on `config`: the same configuration, seed included, always yields the same aggregator.
///
/// # Errors
///
/// Returns an [`Error::InvalidConfig`] if [`ExperimentConfig::validate()`] rejects the configuration.
///
/// # Panics
///
/// A panic on any worker thread is resumed on the calling thread.
///
/// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
pub fn run_experiment(config: &ExperimentConfig) -> Result<Aggregator> {
    config.validate()?;
    tracing::info!(
        cells = config.server_counts.len() * config.regimes.len(),
        trials = config.trials,
        seed = config.seed,
        "starting experiment"
    );

    let mut cells = Vec::with_capacity(config.server_counts.len() * config.regimes.len());
    for (server_slot, &server_count) in config.server_counts.iter().enumerate() {
        for (regime_slot, regime) in config.regimes.iter().enumerate() {
            cells.push(Cell {
                server_slot,
                server_count,
                regime_slot,
                regime,
            });
        }
    }

    let results = thread::scope(|scope| {
        let handles: Vec<_> = cells
            .into_iter()
            .map(|cell| scope.spawn(move || cell.run(config)))
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Result<Vec<Aggregator>>>()
    })?;

    let mut aggregator = Aggregator::new();
    for result in results {
        aggregator.merge(result);
    }
    Ok(aggregator)
}

/// One server count paired with one regime.
#[derive(Copy, Clone, Debug)]
struct Cell<'a> {
    server_slot: usize,
    server_count: usize,
    regime_slot: usize,
    regime: &'a ServiceRegime,
}

impl Cell<'_> {
    fn run(self, config: &ExperimentConfig) -> Result<Aggregator> {
        let simulator = QueueSimulator::new(self.server_count)?.with_strategy(config.dispatch);
        let generator = WorkloadGenerator::new(config.arrival_rate, self.regime.service_rate)?;
        let mut aggregator = Aggregator::new();

        for trial in 0..config.trials {
            // the request count is shared by every regime on this server count
            let mut sizing = Pcg64::seed_from_u64(trial_seed(config.seed, self.server_slot, 0, trial));
            let num_requests = sizing.random_range(config.min_requests..config.max_requests);

            let workload = if config.common_random_numbers {
                let mut rng = Pcg64::seed_from_u64(trial_seed(config.seed, self.server_slot, 1, trial));
                CommonDraws::generate(num_requests, config.arrival_rate, &mut rng)?
                    .workload(self.regime.service_rate)?
            } else {
                let mut rng = Pcg64::seed_from_u64(trial_seed(
                    config.seed,
                    self.server_slot,
                    self.regime_slot + 2,
                    trial,
                ));
                generator.generate(num_requests, &mut rng)
            };

            let waiting_times = simulator.waiting_times(&workload.arrival_times, &workload.service_durations)?;
            aggregator.record(self.server_count, &self.regime.name, &waiting_times);
        }

        let mean_waiting_time = aggregator
            .series(self.server_count, &self.regime.name)
            .and_then(Series::mean);
        tracing::info!(
            server_count = self.server_count,
            regime = %self.regime.name,
            mean_waiting_time = ?mean_waiting_time,
            "finished cell"
        );
        Ok(aggregator)
    }
}

/// Derive a well-spread seed for one random stream of one trial.
fn trial_seed(base: u64, server_slot: usize, stream: usize, trial: usize) -> u64 {
    let mut state = base;
    for part in [server_slot, stream, trial] {
        state = splitmix64(state ^ part as u64);
    }
    state
}

fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
