use super::{Assignment, ServerPool};
use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::num::NonZeroUsize;

/// Helper struct for the heap pool. Holds a server's index alongside the time at which it becomes free.
///
/// The implementation of [`Ord`] compares free times first and server indices only to break ties, so the heap yields
/// the same server a left-to-right scan would.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct ServerSlot {
    free_at: OrderedFloat<f64>,
    index: usize,
}

impl PartialOrd for ServerSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        let comparison = self.free_at.cmp(&other.free_at);
        match comparison {
            Ordering::Equal => self.index.cmp(&other.index),
            _ => comparison,
        }
    }
}

/// Server pool that keeps its servers in a min-heap ordered by free time.
///
/// Costs O(log C) per dispatch. Dispatch decisions are identical to [`LinearScanPool`], including the lowest-index
/// tiebreak, so switching between the two never changes a simulation's results.
///
/// [`LinearScanPool`]: super::LinearScanPool
#[derive(Clone, Debug)]
pub struct HeapPool {
    slots: BinaryHeap<Reverse<ServerSlot>>,
}

impl HeapPool {
    fn peek(&self) -> ServerSlot {
        // a pool is built with at least one server and dispatch always puts the popped slot back
        match self.slots.peek() {
            Some(Reverse(slot)) => *slot,
            None => unreachable!("server pool should never be empty"),
        }
    }
}

impl ServerPool for HeapPool {
    fn with_servers(num_servers: NonZeroUsize) -> Self {
        let slots = (0..num_servers.get())
            .map(|index| {
                Reverse(ServerSlot {
                    free_at: OrderedFloat(0.0),
                    index,
                })
            })
            .collect();
        Self { slots }
    }

    fn num_servers(&self) -> usize {
        self.slots.len()
    }

    fn earliest_free(&self) -> (usize, f64) {
        let slot = self.peek();
        (slot.index, slot.free_at.0)
    }

    fn dispatch(&mut self, arrival_time: f64, service_duration: f64) -> Assignment {
        let slot = self.peek();
        let assignment = Assignment::new(slot.index, slot.free_at.0, arrival_time, service_duration);
        if let Some(mut top) = self.slots.peek_mut() {
            top.0.free_at = OrderedFloat(assignment.departure);
        }
        assignment
    }

    fn free_times(&self) -> Vec<f64> {
        let mut free_times = vec![0.0; self.slots.len()];
        for Reverse(slot) in self.slots.iter() {
            free_times[slot.index] = slot.free_at.0;
        }
        free_times
    }
}
