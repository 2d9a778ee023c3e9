use super::{Assignment, ServerPool};
use std::num::NonZeroUsize;

/// Server pool that finds the earliest free server by scanning every server's free time.
///
/// Costs O(C) per dispatch, which for pools of a few dozen servers beats the bookkeeping of a heap.
#[derive(Clone, Debug)]
pub struct LinearScanPool {
    free_at: Vec<f64>,
}

impl ServerPool for LinearScanPool {
    fn with_servers(num_servers: NonZeroUsize) -> Self {
        Self {
            free_at: vec![0.0; num_servers.get()],
        }
    }

    fn num_servers(&self) -> usize {
        self.free_at.len()
    }

    fn earliest_free(&self) -> (usize, f64) {
        // strict comparison keeps the first of several equal free times
        let mut earliest = (0, self.free_at[0]);
        for (index, &free_at) in self.free_at.iter().enumerate().skip(1) {
            if free_at < earliest.1 {
                earliest = (index, free_at);
            }
        }
        earliest
    }

    fn dispatch(&mut self, arrival_time: f64, service_duration: f64) -> Assignment {
        let (server, free_at) = self.earliest_free();
        let assignment = Assignment::new(server, free_at, arrival_time, service_duration);
        self.free_at[server] = assignment.departure;
        assignment
    }

    fn free_times(&self) -> Vec<f64> {
        self.free_at.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(num_servers: usize) -> LinearScanPool {
        LinearScanPool::with_servers(NonZeroUsize::new(num_servers).unwrap())
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let mut pool = pool(3);
        let servers: Vec<usize> = (0..3).map(|_| pool.dispatch(0.0, 1.0).server).collect();
        assert_eq!(vec![0, 1, 2], servers, "idle servers were not taken in index order");

        // all three now free at 1.0
        assert_eq!((0, 1.0), pool.earliest_free());
    }

    #[test]
    fn busy_pool_hands_request_to_first_server_to_free_up() {
        let mut pool = pool(2);
        pool.dispatch(0.0, 4.0);
        pool.dispatch(0.0, 2.0);

        let assignment = pool.dispatch(1.0, 1.0);
        assert_eq!(
            Assignment {
                server: 1,
                start: 2.0,
                departure: 3.0
            },
            assignment
        );
        assert_eq!(vec![4.0, 3.0], pool.free_times());
    }

    #[test]
    fn earliest_free_time_never_decreases() {
        let mut pool = pool(4);
        let arrivals = [0.0, 0.1, 0.1, 0.5, 0.7, 0.7, 2.0, 2.2, 9.0];
        let services = [3.0, 0.2, 1.0, 0.0, 4.0, 0.3, 0.1, 2.5, 1.0];

        let mut previous = pool.earliest_free().1;
        for (&arrival, &service) in arrivals.iter().zip(services.iter()) {
            pool.dispatch(arrival, service);
            let current = pool.earliest_free().1;
            assert!(current >= previous, "earliest free time fell from {} to {}", previous, current);
            previous = current;
        }
    }
}
