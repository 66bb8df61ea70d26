use std::sync::Arc;

use crate::instrument::AtomicF64;

/// Value that can be set or moved in either direction.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    value: Arc<AtomicF64>,
}

impl Gauge {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn set(&self, v: f64) {
        self.value.set(v);
    }

    #[inline]
    pub fn add(&self, delta: f64) {
        self.value.add(delta);
    }

    #[inline]
    pub fn sub(&self, delta: f64) {
        self.value.add(-delta);
    }

    #[inline]
    pub fn inc(&self) {
        self.add(1.0);
    }

    #[inline]
    pub fn dec(&self) {
        self.add(-1.0);
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
    fn set_overwrites_and_add_accepts_negative() {
        let g = Gauge::new();
        g.set(10.0);
        g.add(-2.5);
        assert_eq!(g.get(), 7.5);

        g.set(-1.0);
        assert_eq!(g.get(), -1.0);
    }

    #[test]
    fn inc_dec_sub() {
        let g = Gauge::new();
        g.inc();
        g.inc();
        g.dec();
        g.sub(0.5);
        assert_eq!(g.get(), 0.5);
    }
}
