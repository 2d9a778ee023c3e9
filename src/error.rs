use thiserror::Error;

/// Errors that may be encountered while preparing or
/// running a queue simulation.
///
/// The [`InvalidInput`] variant originates from the
/// [`QueueSimulator`] when the arrival and service
/// sequences it was handed break one of its
/// preconditions. The simulator never tries to repair
/// its input, so this error corresponds to a bug in
/// whatever produced the sequences, e.g. a workload
/// generator that forgot to accumulate interarrival
/// gaps into arrival times.
///
/// The [`InvalidConfig`] variant originates from the
/// [`WorkloadGenerator`] and the experiment runner when
/// a rate, request range, or other parameter cannot
/// describe a meaningful workload.
///
/// Neither variant is retriable: the caller must supply
/// corrected values.
///
/// [`QueueSimulator`]: crate::QueueSimulator
/// [`WorkloadGenerator`]: crate::workload::WorkloadGenerator
/// [`InvalidInput`]: Error::InvalidInput
/// [`InvalidConfig`]: Error::InvalidConfig
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The simulator rejected its arrival times, service
    /// durations, or server count.
    #[error("invalid simulation input: {0}")]
    InvalidInput(#[from] InputViolation),
    /// A generator or experiment parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigViolation),
}

/// The precondition a simulator input failed to uphold.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum InputViolation {
    /// At least one server is required.
    #[error("server pool must contain at least one server")]
    NoServers,
    /// Every request needs exactly one arrival time and one service duration.
    #[error("{arrivals} arrival times were supplied with {services} service durations")]
    LengthMismatch {
        /// Number of arrival times supplied.
        arrivals: usize,
        /// Number of service durations supplied.
        services: usize,
    },
    /// Arrival times must be finite and non-negative.
    #[error("arrival time {value} of request {index} is not a finite, non-negative number")]
    InvalidArrival {
        /// Position of the offending request.
        index: usize,
        /// The rejected arrival time.
        value: f64,
    },
    /// Arrival times must be non-decreasing.
    #[error("request {index} arrives at {value}, before its predecessor at {previous}")]
    ArrivalsOutOfOrder {
        /// Position of the request that arrives too early.
        index: usize,
        /// Arrival time of the request before it.
        previous: f64,
        /// Its own arrival time.
        value: f64,
    },
    /// Service durations must be finite and non-negative.
    #[error("service duration {value} of request {index} is not a finite, non-negative number")]
    InvalidService {
        /// Position of the offending request.
        index: usize,
        /// The rejected service duration.
        value: f64,
    },
}

/// The parameter a workload or experiment configuration got wrong.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigViolation {
    /// Exponential rates must be finite and strictly positive.
    #[error("{name} must be a finite, positive rate, got {rate}")]
    InvalidRate {
        /// Which rate was rejected.
        name: String,
        /// The rejected value.
        rate: f64,
    },
    /// Request counts are drawn from `min..max`, which must not be empty.
    #[error("request range {min}..{max} is empty")]
    EmptyRequestRange {
        /// Smallest request count a trial may draw.
        min: usize,
        /// Exclusive upper bound on the request count.
        max: usize,
    },
    /// Each server count in an experiment must be at least one.
    #[error("server counts must be at least one")]
    NoServers,
    /// An experiment needs at least one server count to sweep.
    #[error("no server counts were configured")]
    NoServerCounts,
    /// An experiment needs at least one service regime to compare.
    #[error("no service regimes were configured")]
    NoRegimes,
    /// Two regimes may not share a name, as results are keyed by it.
    #[error("service regime {0:?} is configured more than once")]
    DuplicateRegime(String),
    /// An experiment must run at least one trial per cell.
    #[error("at least one trial per configuration is required")]
    NoTrials,
}

/// [`std::result::Result`]`<T, `[`queuesim::Error`]`>`
///
/// A type alias that simplifies the signatures of
/// the fallible functions in queuesim.
///
/// [`queuesim::Error`]: Error
pub type Result<T> = std::result::Result<T, Error>;
