//! Synthetic arrival and service processes to feed a [`QueueSimulator`].
//!
//! Arrivals form a Poisson process: interarrival gaps are exponential with the configured arrival rate and arrival
//! times are their running sum. Service durations are independent exponential draws with the configured service
//! rate. The random source is always supplied by the caller, so seeding it (for example with
//! [`rand_pcg::Pcg64::seed_from_u64`]) makes every workload reproducible.
//!
//! [`CommonDraws`] supports the common random numbers technique: one set of arrivals and one uniform draw per request
//! are generated once and then turned into service durations for any number of service rates, so competing service
//! regimes are compared on exactly the same customers.
//!
//! [`QueueSimulator`]: crate::QueueSimulator
//! [`rand_pcg::Pcg64::seed_from_u64`]: rand::SeedableRng::seed_from_u64

use crate::error::ConfigViolation;
use crate::Result;

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg64;

/// Arrival times and service durations for a batch of requests, indexed by arrival order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workload {
    /// Non-decreasing arrival times.
    pub arrival_times: Vec<f64>,
    /// Service duration of each request.
    pub service_durations: Vec<f64>,
}

impl Workload {
    /// Generate `num_requests` requests from a [`Pcg64`] seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`WorkloadGenerator::new()`].
    pub fn seeded(arrival_rate: f64, service_rate: f64, num_requests: usize, seed: u64) -> Result<Self> {
        let generator = WorkloadGenerator::new(arrival_rate, service_rate)?;
        let mut rng = Pcg64::seed_from_u64(seed);
        Ok(generator.generate(num_requests, &mut rng))
    }

    /// Number of requests.
    pub fn len(&self) -> usize {
        self.arrival_times.len()
    }

    /// Whether the workload has no requests.
    pub fn is_empty(&self) -> bool {
        self.arrival_times.is_empty()
    }
}

/// Draws Poisson arrivals and exponential service durations.
#[derive(Clone, Debug)]
pub struct WorkloadGenerator {
    interarrival: Exp<f64>,
    service: Exp<f64>,
}

impl WorkloadGenerator {
    /// Create a generator for requests arriving at `arrival_rate` per unit time on average, each needing on average
    /// `1 / service_rate` time units of service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigViolation::InvalidRate`] if either rate is not a finite, strictly positive number.
    pub fn new(arrival_rate: f64, service_rate: f64) -> Result<Self> {
        Ok(Self {
            interarrival: exponential("arrival rate", arrival_rate)?,
            service: exponential("service rate", service_rate)?,
        })
    }

    /// Draw `num_requests` requests from `rng`.
    ///
    /// All interarrival gaps are drawn before any service durations, so two generators with the same arrival rate
    /// fed identically seeded sources produce identical arrival times whatever their service rates.
    pub fn generate<R>(&self, num_requests: usize, rng: &mut R) -> Workload
    where
        R: Rng + ?Sized,
    {
        let arrival_times = poisson_arrivals(&self.interarrival, num_requests, rng);
        let service_durations = (0..num_requests).map(|_| self.service.sample(&mut *rng)).collect();
        Workload {
            arrival_times,
            service_durations,
        }
    }
}

/// Arrival times plus one uniform draw per request, reusable across service rates.
#[derive(Clone, Debug, PartialEq)]
pub struct CommonDraws {
    arrival_times: Vec<f64>,
    service_draws: Vec<f64>,
}

impl CommonDraws {
    /// Draw arrivals at `arrival_rate` and a uniform number in `[0, 1)` for each of `num_requests` requests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigViolation::InvalidRate`] if `arrival_rate` is not a finite, strictly positive number.
    pub fn generate<R>(num_requests: usize, arrival_rate: f64, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let interarrival = exponential("arrival rate", arrival_rate)?;
        let arrival_times = poisson_arrivals(&interarrival, num_requests, rng);
        let service_draws = (0..num_requests).map(|_| rng.random::<f64>()).collect();
        Ok(Self {
            arrival_times,
            service_draws,
        })
    }

    /// Arrival times shared by every regime.
    pub fn arrival_times(&self) -> &[f64] {
        &self.arrival_times
    }

    /// Exponential service durations with the given rate, obtained by inverting the stored uniform draws.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigViolation::InvalidRate`] if `service_rate` is not a finite, strictly positive number.
    pub fn service_durations(&self, service_rate: f64) -> Result<Vec<f64>> {
        check_rate("service rate", service_rate)?;
        Ok(self
            .service_draws
            .iter()
            .map(|draw| -(1.0 - draw).ln() / service_rate)
            .collect())
    }

    /// Pair the shared arrivals with service durations at the given rate.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`service_durations()`].
    ///
    /// [`service_durations()`]: CommonDraws::service_durations
    pub fn workload(&self, service_rate: f64) -> Result<Workload> {
        Ok(Workload {
            arrival_times: self.arrival_times.clone(),
            service_durations: self.service_durations(service_rate)?,
        })
    }
}

fn poisson_arrivals<R>(interarrival: &Exp<f64>, num_requests: usize, rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    let mut now = 0.0;
    (0..num_requests)
        .map(|_| {
            now += interarrival.sample(&mut *rng);
            now
        })
        .collect()
}

pub(crate) fn check_rate(name: &str, rate: f64) -> std::result::Result<(), ConfigViolation> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(ConfigViolation::InvalidRate {
            name: name.to_owned(),
            rate,
        })
    }
}

fn exponential(name: &str, rate: f64) -> Result<Exp<f64>> {
    check_rate(name, rate)?;
    let distribution = Exp::new(rate).map_err(|_| ConfigViolation::InvalidRate {
        name: name.to_owned(),
        rate,
    })?;
    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn arrivals_are_non_decreasing_and_positive() {
        let workload = Workload::seeded(1000.0, 10.0, 500, 42).unwrap();
        assert_eq!(500, workload.len());
        assert_eq!(500, workload.service_durations.len());
        assert!(workload.arrival_times[0] > 0.0);
        assert!(workload.arrival_times.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(workload.service_durations.iter().all(|&duration| duration >= 0.0));
    }

    #[test]
    fn same_seed_same_workload() {
        let first = Workload::seeded(4.0, 6.0, 100, 7).unwrap();
        let second = Workload::seeded(4.0, 6.0, 100, 7).unwrap();
        let third = Workload::seeded(4.0, 6.0, 100, 8).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, third);
    }

    #[test]
    fn arrivals_do_not_depend_on_service_rate() {
        let slow = Workload::seeded(4.0, 2.0, 50, 99).unwrap();
        let fast = Workload::seeded(4.0, 20.0, 50, 99).unwrap();
        assert_eq!(slow.arrival_times, fast.arrival_times);
    }

    #[test]
    fn sample_means_approach_rates() {
        let workload = Workload::seeded(5.0, 2.0, 200_000, 2024).unwrap();
        let mean_gap = workload.arrival_times[workload.len() - 1] / workload.len() as f64;
        let mean_service = workload.service_durations.iter().sum::<f64>() / workload.len() as f64;
        assert!((mean_gap - 0.2).abs() < 0.01, "mean interarrival gap was {}", mean_gap);
        assert!((mean_service - 0.5).abs() < 0.02, "mean service duration was {}", mean_service);
    }

    #[test]
    fn common_draws_scale_with_service_rate() {
        let mut rng = Pcg64::seed_from_u64(3);
        let draws = CommonDraws::generate(20, 100.0, &mut rng).unwrap();
        let slow = draws.service_durations(10.0).unwrap();
        let fast = draws.service_durations(15.0).unwrap();
        for (slow, fast) in slow.iter().zip(fast.iter()) {
            assert!((slow * 10.0 - fast * 15.0).abs() < 1e-9, "draws were not shared between rates");
        }
        assert_eq!(draws.arrival_times(), draws.workload(10.0).unwrap().arrival_times.as_slice());
    }

    #[test]
    fn invalid_rates_rejected() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                WorkloadGenerator::new(rate, 1.0),
                Err(Error::InvalidConfig(ConfigViolation::InvalidRate { .. }))
            ));
            assert!(matches!(
                WorkloadGenerator::new(1.0, rate),
                Err(Error::InvalidConfig(ConfigViolation::InvalidRate { .. }))
            ));
        }
        let mut rng = Pcg64::seed_from_u64(0);
        let draws = CommonDraws::generate(5, 1.0, &mut rng).unwrap();
        assert_eq!(
            Err(Error::InvalidConfig(ConfigViolation::InvalidRate {
                name: "service rate".to_owned(),
                rate: 0.0
            })),
            draws.service_durations(0.0)
        );
    }
}
