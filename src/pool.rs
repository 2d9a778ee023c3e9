//! Server pools that track when each server becomes free and pick the earliest one for the next request.

mod heap;
mod linear;

pub use heap::HeapPool;
pub use linear::LinearScanPool;

use std::fmt::{Debug, Display, Formatter};
use std::num::NonZeroUsize;

/// The outcome of handing one request to a [`ServerPool`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Index of the server that took the request.
    pub server: usize,
    /// When service began: the later of the arrival and the server becoming free.
    pub start: f64,
    /// When service ended and the server became free again.
    pub departure: f64,
}

impl Assignment {
    /// Compute the assignment of a request arriving at `arrival_time` with the given `service_duration` to `server`,
    /// which becomes free at `free_at`.
    pub fn new(server: usize, free_at: f64, arrival_time: f64, service_duration: f64) -> Self {
        let start = arrival_time.max(free_at);
        Self {
            server,
            start,
            departure: start + service_duration,
        }
    }
}

/// A fixed set of interchangeable servers, each tracked only by the time at which it next becomes free.
///
/// Every server starts free at time zero. Implementations must dispatch each request to the server with the smallest
/// free time, breaking ties in favor of the lowest server index, and then move that server's free time forward to the
/// request's departure. Because the earliest free time is the only one ever replaced, and it is replaced by a value
/// no smaller than itself, the minimum over the pool never decreases.
///
/// Requests must be dispatched in arrival order. Under that discipline a pool behaves like a single shared waiting
/// line feeding all of its servers.
pub trait ServerPool: Debug {
    /// Build a pool of `num_servers` servers, all free at time zero.
    fn with_servers(num_servers: NonZeroUsize) -> Self
    where
        Self: Sized;

    /// Number of servers in the pool.
    fn num_servers(&self) -> usize;

    /// Index and free time of the server the next request would be dispatched to.
    fn earliest_free(&self) -> (usize, f64);

    /// Dispatch a request to the earliest free server and mark that server busy until the request departs.
    fn dispatch(&mut self, arrival_time: f64, service_duration: f64) -> Assignment;

    /// Free time of every server, indexed by server.
    fn free_times(&self) -> Vec<f64>;
}

/// Selects the [`ServerPool`] implementation a [`QueueSimulator`] dispatches with.
///
/// Both strategies choose the same server for every request and so produce identical traces; they differ only in
/// cost per request. [`LinearScan`] is O(C) and fastest for the small pools typical of these experiments, while
/// [`Heap`] is O(log C) and pays off once pools reach the hundreds of servers.
///
/// [`QueueSimulator`]: crate::QueueSimulator
/// [`LinearScan`]: DispatchStrategy::LinearScan
/// [`Heap`]: DispatchStrategy::Heap
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DispatchStrategy {
    /// Scan every server's free time per request. Backed by [`LinearScanPool`].
    #[default]
    LinearScan,
    /// Keep servers in a min-heap keyed by free time. Backed by [`HeapPool`].
    Heap,
}

impl Display for DispatchStrategy {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(match self {
            Self::LinearScan => "linear scan",
            Self::Heap => "heap",
        })
    }
}
