//! Instrument handles stored by the registry.
//!
//! Every handle is a cheap `Arc` clone of the series' value state, so callers
//! may keep one around instead of looking the series up on every update.
mod counter;
pub use counter::Counter;

mod gauge;
pub use gauge::Gauge;

mod histogram;
pub use histogram::{Histogram, HistogramTimer};

use std::sync::atomic::{AtomicU64, Ordering};

use crate::descriptor::MetricKind;
use crate::snapshot::SeriesValue;

/// Value state of one series, tagged by kind.
#[derive(Debug, Clone)]
pub enum Instrument {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl Instrument {
    /// Zero-initialised state for a series of the given kind.
    pub(crate) fn zeroed(kind: MetricKind, buckets: &[f64]) -> Self {
        match kind {
            MetricKind::Counter => Instrument::Counter(Counter::new()),
            MetricKind::Gauge => Instrument::Gauge(Gauge::new()),
            MetricKind::Histogram => Instrument::Histogram(Histogram::new(buckets)),
        }
    }

    #[inline]
    pub fn kind(&self) -> MetricKind {
        match self {
            Instrument::Counter(_) => MetricKind::Counter,
            Instrument::Gauge(_) => MetricKind::Gauge,
            Instrument::Histogram(_) => MetricKind::Histogram,
        }
    }

    /// Copy the current value out of the instrument.
    pub fn sample(&self) -> SeriesValue {
        match self {
            Instrument::Counter(c) => SeriesValue::Counter(c.get()),
            Instrument::Gauge(g) => SeriesValue::Gauge(g.get()),
            Instrument::Histogram(h) => SeriesValue::Histogram(h.snapshot()),
        }
    }
}

/// `f64` stored as its bit pattern in an `AtomicU64`.
#[derive(Debug, Default)]
pub(crate) struct AtomicF64(AtomicU64);

impl AtomicF64 {
    #[inline]
    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub(crate) fn set(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }

    /// Add `delta` with a compare-and-swap loop.
    pub(crate) fn add(&self, delta: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn atomic_f64_concurrent_adds_are_not_lost() {
        let cell = Arc::new(AtomicF64::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        cell.add(1.0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cell.get(), 8000.0);
    }

    #[test]
    fn zeroed_instruments_match_kind() {
        for kind in [MetricKind::Counter, MetricKind::Gauge, MetricKind::Histogram] {
            let inst = Instrument::zeroed(kind, &[1.0]);
            assert_eq!(inst.kind(), kind);
        }
    }
}
