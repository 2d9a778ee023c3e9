//! Accumulation of waiting times across repeated simulation runs.
//!
//! An [`Aggregator`] is keyed by server count and service regime name. Each recorded run contributes all of its
//! waiting times to the key's pooled sample, which feeds distribution statistics such as the empirical CDF, and one
//! `(request count, mean waiting time)` point to the key's scatter series.

use std::collections::BTreeMap;

/// Pooled results for one combination of server count and service regime.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    waiting_times: Vec<f64>,
    scatter: Vec<(usize, f64)>,
}

impl Series {
    fn record(&mut self, waiting_times: &[f64]) {
        let mean = waiting_times.iter().sum::<f64>() / waiting_times.len() as f64;
        self.waiting_times.extend_from_slice(waiting_times);
        self.scatter.push((waiting_times.len(), mean));
    }

    fn merge(&mut self, other: Series) {
        self.waiting_times.extend(other.waiting_times);
        self.scatter.extend(other.scatter);
    }

    /// Every waiting time recorded so far, in recording order.
    pub fn waiting_times(&self) -> &[f64] {
        &self.waiting_times
    }

    /// Number of runs recorded.
    pub fn runs(&self) -> usize {
        self.scatter.len()
    }

    /// One `(request count, mean waiting time)` point per run, sorted by request count. Runs with equal request
    /// counts keep their recording order.
    pub fn scatter(&self) -> Vec<(usize, f64)> {
        let mut points = self.scatter.clone();
        points.sort_by_key(|&(num_requests, _)| num_requests);
        points
    }

    /// Mean over all pooled waiting times, or `None` if nothing has been recorded.
    pub fn mean(&self) -> Option<f64> {
        if self.waiting_times.is_empty() {
            return None;
        }
        Some(self.waiting_times.iter().sum::<f64>() / self.waiting_times.len() as f64)
    }

    /// Nearest-rank quantile of the pooled waiting times: the smallest recorded value with at least a fraction `q`
    /// of the sample at or below it. `None` if nothing has been recorded or `q` is outside `[0, 1]`.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.waiting_times.is_empty() || !(0.0..=1.0).contains(&q) {
            return None;
        }
        let sorted = self.sorted();
        let rank = (q * sorted.len() as f64).ceil() as usize;
        Some(sorted[rank.saturating_sub(1)])
    }

    /// Empirical CDF of the pooled waiting times as `(waiting time, fraction)` steps: the `i`-th smallest value
    /// (counting from one) is paired with `i / n`.
    pub fn empirical_cdf(&self) -> Vec<(f64, f64)> {
        let sorted = self.sorted();
        let total = sorted.len() as f64;
        sorted
            .into_iter()
            .enumerate()
            .map(|(index, time)| (time, (index + 1) as f64 / total))
            .collect()
    }

    /// Density histogram of the pooled waiting times over `bins` equal-width bins spanning `[0, max]`, as
    /// `(left edge, density)` pairs. Densities are normalized so that their sum times the bin width is one. The largest
    /// value falls in the last bin.
    ///
    /// Empty if nothing has been recorded, if `bins` is zero, or if every waiting time is zero.
    pub fn histogram(&self, bins: usize) -> Vec<(f64, f64)> {
        let max = self.waiting_times.iter().copied().fold(0.0, f64::max);
        if bins == 0 || max <= 0.0 {
            return Vec::new();
        }

        let width = max / bins as f64;
        let mut counts = vec![0usize; bins];
        for &time in &self.waiting_times {
            let bin = ((time / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        let scale = 1.0 / (self.waiting_times.len() as f64 * width);
        counts
            .into_iter()
            .enumerate()
            .map(|(bin, count)| (bin as f64 * width, count as f64 * scale))
            .collect()
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.waiting_times.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }
}

/// Waiting-time results keyed by `(server count, regime name)`.
///
/// An Aggregator is an explicit value owned by whoever runs the trials. It holds no reference to any simulator, and
/// two aggregators built independently, e.g. on different threads, can be combined with [`merge()`].
///
/// [`merge()`]: Aggregator::merge
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregator {
    series: BTreeMap<(usize, String), Series>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the waiting times of one run. A run with no requests records nothing.
    pub fn record(&mut self, server_count: usize, regime: &str, waiting_times: &[f64]) {
        if waiting_times.is_empty() {
            return;
        }
        self.series
            .entry((server_count, regime.to_owned()))
            .or_default()
            .record(waiting_times);
    }

    /// Results recorded for `server_count` servers under `regime`, if any.
    pub fn series(&self, server_count: usize, regime: &str) -> Option<&Series> {
        self.series.get(&(server_count, regime.to_owned()))
    }

    /// Every key with recorded results, ordered by server count and then regime name.
    pub fn keys(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.series
            .keys()
            .map(|(server_count, regime)| (*server_count, regime.as_str()))
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Append everything recorded in `other`, after anything already recorded under the same key.
    pub fn merge(&mut self, other: Aggregator) {
        for (key, series) in other.series {
            self.series.entry(key).or_default().merge(series);
        }
    }
}
