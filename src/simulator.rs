use crate::error::InputViolation;
use crate::pool::{DispatchStrategy, HeapPool, LinearScanPool, ServerPool};
use crate::Result;

use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

/// Computes departure and waiting times for requests sharing one first-come-first-served line in front of a fixed
/// pool of identical servers.
///
/// The expected workflow for a QueueSimulator is:
///
/// 1. Pick a server count and pass it to [`new()`].
/// 2. Optionally choose a [`DispatchStrategy`] with [`with_strategy()`].
/// 3. Call [`run()`] with arrival times and service durations, one of each per request. Handle any error it might
///    return.
/// 4. Read departure times, waiting times, and server assignments from the returned [`Trace`].
///
/// Requests are processed strictly in arrival order. Each is handed to the server that becomes free soonest (lowest
/// index on ties) and starts service at the later of its arrival and that server's free time. A simulator holds no
/// state between runs: every call to [`run()`] starts with all servers free at time zero, and identical inputs always
/// produce identical traces. Randomness, if any, belongs to whoever produced the inputs.
///
/// [`new()`]: QueueSimulator::new
/// [`with_strategy()`]: QueueSimulator::with_strategy
/// [`run()`]: QueueSimulator::run
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueSimulator {
    num_servers: NonZeroUsize,
    strategy: DispatchStrategy,
}

impl QueueSimulator {
    /// Initialize a simulator for a pool of `num_servers` servers, dispatching with the default
    /// [`DispatchStrategy::LinearScan`].
    ///
    /// # Errors
    ///
    /// Returns [`InputViolation::NoServers`] if `num_servers` is zero.
    pub fn new(num_servers: usize) -> Result<Self> {
        let num_servers = NonZeroUsize::new(num_servers).ok_or(InputViolation::NoServers)?;
        Ok(Self {
            num_servers,
            strategy: DispatchStrategy::default(),
        })
    }

    /// Use the given dispatch strategy for subsequent runs.
    pub fn with_strategy(mut self, strategy: DispatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Number of servers in the simulated pool.
    pub fn num_servers(&self) -> usize {
        self.num_servers.get()
    }

    /// The dispatch strategy used by [`run()`].
    ///
    /// [`run()`]: QueueSimulator::run
    pub fn strategy(&self) -> DispatchStrategy {
        self.strategy
    }

    /// Simulate the queue for one request per pair of `arrival_times[i]` and `service_durations[i]`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::InvalidInput`] without simulating anything if:
    ///
    /// 1. the two slices differ in length,
    /// 2. an arrival time is negative, NaN, or infinite,
    /// 3. an arrival time is smaller than the one before it, or
    /// 4. a service duration is negative, NaN, or infinite.
    ///
    /// Zero-length service is allowed, as is an empty set of requests.
    ///
    /// [`Error::InvalidInput`]: crate::Error::InvalidInput
    pub fn run(&self, arrival_times: &[f64], service_durations: &[f64]) -> Result<Trace> {
        let span = tracing::debug_span!(
            "simulate_queue",
            num_servers = self.num_servers.get(),
            requests = arrival_times.len(),
            strategy = %self.strategy
        );
        let _entered = span.enter();

        if let Err(violation) = validate(arrival_times, service_durations) {
            tracing::debug!(%violation, "rejected simulation input");
            return Err(violation.into());
        }

        let trace = match self.strategy {
            DispatchStrategy::LinearScan => {
                drive(LinearScanPool::with_servers(self.num_servers), arrival_times, service_durations)
            },
            DispatchStrategy::Heap => {
                drive(HeapPool::with_servers(self.num_servers), arrival_times, service_durations)
            },
        };

        tracing::debug!(makespan = trace.makespan(), "simulation finished");
        Ok(trace)
    }

    /// Simulate the queue and keep only each request's waiting time.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`run()`].
    ///
    /// [`run()`]: QueueSimulator::run
    pub fn waiting_times(&self, arrival_times: &[f64], service_durations: &[f64]) -> Result<Vec<f64>> {
        self.run(arrival_times, service_durations)
            .map(Trace::into_waiting_times)
    }
}

impl Display for QueueSimulator {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "QueueSimulator with {} server(s), {} dispatch",
            self.num_servers, self.strategy
        )
    }
}

/// Compute each request's waiting time for a queue of `num_servers` servers, where waiting time is measured from
/// arrival to departure and so includes the request's own service.
///
/// Shorthand for [`QueueSimulator::new()`] followed by [`QueueSimulator::waiting_times()`].
///
/// # Errors
///
/// Returns an [`Error::InvalidInput`] if `num_servers` is zero or if the inputs fail any check described on
/// [`QueueSimulator::run()`].
///
/// [`Error::InvalidInput`]: crate::Error::InvalidInput
pub fn simulate_queue(arrival_times: &[f64], service_durations: &[f64], num_servers: usize) -> Result<Vec<f64>> {
    QueueSimulator::new(num_servers)?.waiting_times(arrival_times, service_durations)
}

/// Per-request results of one simulation run, all indexed by arrival order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    start_times: Vec<f64>,
    departure_times: Vec<f64>,
    waiting_times: Vec<f64>,
    queue_delays: Vec<f64>,
    servers: Vec<usize>,
}

impl Trace {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            start_times: Vec::with_capacity(capacity),
            departure_times: Vec::with_capacity(capacity),
            waiting_times: Vec::with_capacity(capacity),
            queue_delays: Vec::with_capacity(capacity),
            servers: Vec::with_capacity(capacity),
        }
    }

    /// Number of simulated requests.
    pub fn len(&self) -> usize {
        self.departure_times.len()
    }

    /// Whether the run had no requests at all.
    pub fn is_empty(&self) -> bool {
        self.departure_times.is_empty()
    }

    /// When each request began service.
    pub fn start_times(&self) -> &[f64] {
        &self.start_times
    }

    /// When each request finished service and left the system.
    pub fn departure_times(&self) -> &[f64] {
        &self.departure_times
    }

    /// Time from arrival to departure for each request. This is the sojourn time: it includes the request's own
    /// service, so it is never less than the service duration.
    pub fn waiting_times(&self) -> &[f64] {
        &self.waiting_times
    }

    /// Time from arrival to start of service for each request, i.e. time spent in line only.
    pub fn queue_delays(&self) -> &[f64] {
        &self.queue_delays
    }

    /// Index of the server that handled each request.
    pub fn servers(&self) -> &[usize] {
        &self.servers
    }

    /// Consume the trace, keeping only the waiting times.
    pub fn into_waiting_times(self) -> Vec<f64> {
        self.waiting_times
    }

    /// Mean waiting time over all requests, or `None` if there were none.
    pub fn mean_waiting_time(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.waiting_times.iter().sum::<f64>() / self.len() as f64)
    }

    /// Latest departure time, i.e. when the last server went idle. Zero for an empty run.
    pub fn makespan(&self) -> f64 {
        self.departure_times.iter().copied().fold(0.0, f64::max)
    }
}

/// Dispatch every request, in order, against a fresh pool.
fn drive<Pool>(mut pool: Pool, arrival_times: &[f64], service_durations: &[f64]) -> Trace
where
    Pool: ServerPool,
{
    let mut trace = Trace::with_capacity(arrival_times.len());
    for (index, (&arrival, &service)) in arrival_times.iter().zip(service_durations).enumerate() {
        let assignment = pool.dispatch(arrival, service);
        tracing::trace!(
            request = index,
            server = assignment.server,
            arrival,
            start = assignment.start,
            departure = assignment.departure,
            "dispatched request"
        );

        // summing delay and service keeps an idle server's sojourn exactly equal to the service duration, where
        // departure minus arrival can round below it
        let queue_delay = assignment.start - arrival;
        trace.start_times.push(assignment.start);
        trace.departure_times.push(assignment.departure);
        trace.waiting_times.push(queue_delay + service);
        trace.queue_delays.push(queue_delay);
        trace.servers.push(assignment.server);
    }
    trace
}

fn validate(arrival_times: &[f64], service_durations: &[f64]) -> std::result::Result<(), InputViolation> {
    if arrival_times.len() != service_durations.len() {
        return Err(InputViolation::LengthMismatch {
            arrivals: arrival_times.len(),
            services: service_durations.len(),
        });
    }

    let mut previous = 0.0;
    for (index, (&arrival, &service)) in arrival_times.iter().zip(service_durations).enumerate() {
        if !is_finite_non_negative(arrival) {
            return Err(InputViolation::InvalidArrival { index, value: arrival });
        }
        if arrival < previous {
            return Err(InputViolation::ArrivalsOutOfOrder {
                index,
                previous,
                value: arrival,
            });
        }
        if !is_finite_non_negative(service) {
            return Err(InputViolation::InvalidService { index, value: service });
        }
        previous = arrival;
    }
    Ok(())
}

fn is_finite_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn single_server_serves_simultaneous_arrivals_back_to_back() {
        let trace = QueueSimulator::new(1)
            .unwrap()
            .run(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(&[1.0, 2.0, 3.0], trace.departure_times());
        assert_eq!(&[1.0, 2.0, 3.0], trace.waiting_times());
        assert_eq!(&[0.0, 1.0, 2.0], trace.queue_delays());
        assert_eq!(&[0usize, 0, 0], trace.servers());
    }

    #[test]
    fn three_servers_serve_simultaneous_arrivals_in_parallel() {
        let trace = QueueSimulator::new(3)
            .unwrap()
            .run(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(&[1.0, 1.0, 1.0], trace.departure_times());
        assert_eq!(&[1.0, 1.0, 1.0], trace.waiting_times());
        assert_eq!(&[0usize, 1, 2], trace.servers());
    }

    #[test]
    fn request_takes_whichever_server_frees_first() {
        let trace = QueueSimulator::new(2)
            .unwrap()
            .run(&[0.0, 0.0, 1.0, 1.5], &[5.0, 2.0, 1.0, 1.0])
            .unwrap();
        // request 2 waits for server 1 (free at 2.0), request 3 for server 1 again (free at 3.0)
        assert_eq!(&[0.0, 0.0, 2.0, 3.0], trace.start_times());
        assert_eq!(&[5.0, 2.0, 3.0, 4.0], trace.departure_times());
        assert_eq!(&[0usize, 1, 1, 1], trace.servers());
        assert_eq!(5.0, trace.makespan());
    }

    #[test]
    fn strategies_agree() {
        let arrivals = [0.0, 0.2, 0.2, 0.3, 1.1, 1.1, 1.4, 2.0, 2.0, 2.0];
        let services = [1.3, 0.4, 2.2, 0.0, 0.7, 0.9, 1.5, 0.2, 0.2, 3.1];
        let linear = QueueSimulator::new(3).unwrap().run(&arrivals, &services).unwrap();
        let heap = QueueSimulator::new(3)
            .unwrap()
            .with_strategy(DispatchStrategy::Heap)
            .run(&arrivals, &services)
            .unwrap();
        assert_eq!(linear, heap);
    }

    #[test]
    fn idle_server_sojourn_equals_service_exactly() {
        assert_eq!(Ok(vec![0.065]), simulate_queue(&[1.48], &[0.065], 1));
        assert_eq!(Ok(vec![0.1, 0.2]), simulate_queue(&[0.7, 10.3], &[0.1, 0.2], 2));

        for step in 1..2000 {
            let arrival = f64::from(step) * 0.37;
            let service = f64::from(step % 97 + 1) * 0.013;
            let trace = QueueSimulator::new(1).unwrap().run(&[arrival], &[service]).unwrap();
            assert_eq!(&[service], trace.waiting_times(), "arrival {} service {}", arrival, service);
            assert_eq!(&[0.0], trace.queue_delays());
        }
    }

    #[test]
    fn queued_sojourn_is_delay_plus_service() {
        let trace = QueueSimulator::new(1)
            .unwrap()
            .run(&[0.1, 0.2, 0.3], &[0.7, 0.065, 1.48])
            .unwrap();
        for (i, (&waiting, &service)) in trace.waiting_times().iter().zip([0.7, 0.065, 1.48].iter()).enumerate() {
            assert_eq!(trace.queue_delays()[i] + service, waiting);
            assert!(waiting >= service, "request {} waited {} for {} of service", i, waiting, service);
        }
    }

    #[test]
    fn empty_input_produces_empty_trace() {
        let trace = QueueSimulator::new(2).unwrap().run(&[], &[]).unwrap();
        assert!(trace.is_empty());
        assert_eq!(None, trace.mean_waiting_time());
        assert_eq!(0.0, trace.makespan());
    }

    #[test]
    fn mean_waiting_time_averages_sojourns() {
        let trace = QueueSimulator::new(1)
            .unwrap()
            .run(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(Some(2.0), trace.mean_waiting_time());
    }

    #[test]
    fn zero_servers_rejected() {
        assert_eq!(
            Err(Error::InvalidInput(InputViolation::NoServers)),
            simulate_queue(&[0.0], &[1.0], 0)
        );
    }

    #[test]
    fn mismatched_lengths_rejected() {
        assert_eq!(
            Err(Error::InvalidInput(InputViolation::LengthMismatch {
                arrivals: 2,
                services: 1
            })),
            simulate_queue(&[0.0, 1.0], &[1.0], 1)
        );
    }

    #[test]
    fn decreasing_arrivals_rejected() {
        assert_eq!(
            Err(Error::InvalidInput(InputViolation::ArrivalsOutOfOrder {
                index: 2,
                previous: 3.0,
                value: 2.0
            })),
            simulate_queue(&[1.0, 3.0, 2.0], &[1.0, 1.0, 1.0], 2)
        );
    }

    #[test]
    fn negative_service_rejected() {
        assert_eq!(
            Err(Error::InvalidInput(InputViolation::InvalidService {
                index: 1,
                value: -0.5
            })),
            simulate_queue(&[0.0, 1.0], &[1.0, -0.5], 1)
        );
    }

    #[test]
    fn non_finite_values_rejected() {
        assert!(matches!(
            simulate_queue(&[0.0, f64::NAN], &[1.0, 1.0], 1),
            Err(Error::InvalidInput(InputViolation::InvalidArrival { index: 1, .. }))
        ));
        assert!(matches!(
            simulate_queue(&[-1.0], &[1.0], 1),
            Err(Error::InvalidInput(InputViolation::InvalidArrival { index: 0, .. }))
        ));
        assert!(matches!(
            simulate_queue(&[0.0], &[f64::INFINITY], 1),
            Err(Error::InvalidInput(InputViolation::InvalidService { index: 0, .. }))
        ));
    }

    #[test]
    fn display_describes_pool() {
        let simulator = QueueSimulator::new(4).unwrap().with_strategy(DispatchStrategy::Heap);
        assert_eq!("QueueSimulator with 4 server(s), heap dispatch", simulator.to_string());
    }
}
