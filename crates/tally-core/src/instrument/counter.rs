use std::sync::Arc;

use crate::error::{MetricsError, MetricsResult};
use crate::instrument::AtomicF64;

/// Monotonically non-decreasing counter.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicF64>,
}

impl Counter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Increment by one.
    #[inline]
    pub fn inc(&self) {
        self.value.add(1.0);
    }

    /// Increment by `delta`.
    ///
    /// Negative and NaN deltas are rejected and leave the value untouched.
    pub fn inc_by(&self, delta: f64) -> MetricsResult<()> {
        if delta.is_nan() || delta < 0.0 {
            return Err(MetricsError::InvalidDelta(delta));
        }
        self.value.add(delta);
        Ok(())
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(Counter::new().get(), 0.0);
    }

    #[test]
    fn increments_are_associative() {
        let pairs = [(0.0, 0.0), (1.0, 2.0), (0.5, 0.25), (1e6, 3.0), (7.0, 0.0)];
        for (d1, d2) in pairs {
            let split = Counter::new();
            split.inc_by(d1).unwrap();
            split.inc_by(d2).unwrap();

            let joined = Counter::new();
            joined.inc_by(d1 + d2).unwrap();

            assert_eq!(split.get(), joined.get(), "d1={d1}, d2={d2}");
        }
    }

    #[test]
    fn negative_delta_is_rejected_and_value_unchanged() {
        let c = Counter::new();
        c.inc_by(2.0).unwrap();

        assert_eq!(c.inc_by(-1.0), Err(MetricsError::InvalidDelta(-1.0)));
        assert_eq!(c.get(), 2.0);
    }

    #[test]
    fn nan_delta_is_rejected() {
        let c = Counter::new();
        assert!(c.inc_by(f64::NAN).is_err());
        assert_eq!(c.get(), 0.0);
    }

    #[test]
    fn clones_share_state() {
        let a = Counter::new();
        let b = a.clone();
        a.inc();
        b.inc();
        assert_eq!(a.get(), 2.0);
    }
}
