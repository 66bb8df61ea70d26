use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::snapshot::HistogramSnapshot;

#[derive(Debug)]
struct HistogramCore {
    bounds: Arc<[f64]>,
    state: Mutex<HistogramState>,
}

#[derive(Debug)]
struct HistogramState {
    /// Cumulative counts, one per bound.
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

/// Bucketed distribution with cumulative bucket counts.
///
/// Buckets, sum and count are updated under one lock, so a snapshot never
/// observes a partially applied `observe`.
#[derive(Debug, Clone)]
pub struct Histogram {
    core: Arc<HistogramCore>,
}

impl Histogram {
    pub(crate) fn new(bounds: &[f64]) -> Self {
        Self {
            core: Arc::new(HistogramCore {
                bounds: bounds.into(),
                state: Mutex::new(HistogramState {
                    buckets: vec![0; bounds.len()],
                    sum: 0.0,
                    count: 0,
                }),
            }),
        }
    }

    /// Record one observation.
    ///
    /// Every bucket whose upper bound is `>= value` is incremented.
    pub fn observe(&self, value: f64) {
        let mut state = self.core.state.lock();
        for (bucket, bound) in state.buckets.iter_mut().zip(self.core.bounds.iter()) {
            if value <= *bound {
                *bucket += 1;
            }
        }
        state.sum += value;
        state.count += 1;
    }

    /// Start a timer that observes elapsed seconds when dropped.
    pub fn start_timer(&self) -> HistogramTimer {
        HistogramTimer {
            histogram: self.clone(),
            start: Instant::now(),
            observed: false,
        }
    }

    #[inline]
    pub fn bounds(&self) -> &[f64] {
        &self.core.bounds
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let state = self.core.state.lock();
        HistogramSnapshot {
            cumulative_counts: state.buckets.clone(),
            sum: state.sum,
            count: state.count,
        }
    }
}

/// Observes the elapsed time in seconds on [`HistogramTimer::observe_duration`] or drop.
#[must_use = "dropping the timer immediately records a near-zero duration"]
#[derive(Debug)]
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
    observed: bool,
}

impl HistogramTimer {
    /// Record the elapsed time now and return it in seconds.
    pub fn observe_duration(mut self) -> f64 {
        self.record()
    }

    fn record(&mut self) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        self.observed = true;
        self.histogram.observe(elapsed);
        elapsed
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        if !self.observed {
            self.record();
        }
    }
}
