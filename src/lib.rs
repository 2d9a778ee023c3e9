//! # Overview
//!
//! queuesim estimates waiting times in multi-server queues. Requests arrive over time, join a single
//! first-come-first-served line, and are each handed to whichever of `C` identical servers becomes free soonest. Given
//! every request's arrival time and service duration, the [`QueueSimulator`] computes when each one starts service,
//! when it departs, and how long it spent in the system:
//!
//! ```
//! use queuesim::simulate_queue;
//!
//! let waiting_times = simulate_queue(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0], 1).unwrap();
//! assert_eq!(vec![1.0, 2.0, 3.0], waiting_times);
//! ```
//!
//! Waiting time here means sojourn time, from arrival to departure, so it always includes the request's own service.
//! The time spent in line alone is available from [`Trace::queue_delays()`].
//!
//! The simulator is a pure function of its inputs. Everything random lives upstream of it:
//!
//! * The [`workload`] module draws Poisson arrivals and exponential service durations from a random source that the
//!   caller injects, so seeded runs are reproducible. It also supports common random numbers for comparing service
//!   regimes on identical customers.
//! * The [`aggregate`] module pools waiting times across repeated runs, keyed by server count and service regime, and
//!   derives means, quantiles, empirical CDFs, density histograms, and per-run scatter points.
//! * The [`experiment`] module ties the two together, running independent trials for each server count and regime on
//!   separate threads.
//!
//! The simulator holds no state between runs and shares nothing with other runs, so any number of simulations can
//! execute in parallel without coordination.
//!
//! # Features
//!
//! queuesim offers one feature, `serde`, which derives [`serde::Serialize`] and [`serde::Deserialize`] for
//! [`ExperimentConfig`], [`ServiceRegime`], and [`DispatchStrategy`] so experiment configurations can be read from
//! files. By default, this feature is disabled to avoid a potentially unnecessary dependency.
//!
//! # Logging
//!
//! queuesim emits [`tracing`] events: a debug span around every simulation run, a trace event per dispatched
//! request, and info events as experiment cells finish. Install a subscriber in your application to see them.
//!
//! [`serde::Serialize`]: https://docs.rs/serde/1/serde/trait.Serialize.html
//! [`serde::Deserialize`]: https://docs.rs/serde/1/serde/trait.Deserialize.html
//! [`ExperimentConfig`]: experiment::ExperimentConfig
//! [`ServiceRegime`]: experiment::ServiceRegime

#![warn(missing_docs)]

pub mod aggregate;
mod error;
pub mod experiment;
pub mod pool;
mod simulator;
pub mod workload;

pub use error::{ConfigViolation, Error, InputViolation, Result};
pub use pool::DispatchStrategy;
pub use simulator::{simulate_queue, QueueSimulator, Trace};
