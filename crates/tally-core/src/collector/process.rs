use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::collector::Collector;
use crate::descriptor::MetricDescriptor;
use crate::error::MetricsResult;
use crate::instrument::Gauge;
use crate::registry::Registry;

/// Process start time and uptime gauges.
///
/// ## Metrics
/// - `process_start_time_seconds` - Start time of the process since unix epoch
/// - `process_uptime_seconds` - Seconds since the collector was created
#[derive(Debug, Clone)]
pub struct ProcessCollector {
    started: Instant,
    uptime: Gauge,
}

impl ProcessCollector {
    /// Register the process gauges and return a collector keeping them fresh.
    pub fn register(registry: &Registry) -> MetricsResult<Self> {
        registry.register(MetricDescriptor::gauge(
            "process_start_time_seconds",
            "Start time of the process since unix epoch in seconds",
        ))?;
        registry.register(MetricDescriptor::gauge(
            "process_uptime_seconds",
            "The uptime of the process in seconds",
        ))?;

        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        registry
            .gauge("process_start_time_seconds", &[])?
            .set(start_time);

        Ok(Self {
            started: Instant::now(),
            uptime: registry.gauge("process_uptime_seconds", &[])?,
        })
    }
}

impl Collector for ProcessCollector {
    fn collect(&self) {
        self.uptime.set(self.started.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::snapshot::SeriesValue;

    #[test]
    fn gather_refreshes_uptime() {
        let registry = Registry::new();
        let collector = ProcessCollector::register(&registry).unwrap();
        registry.register_collector(Arc::new(collector));

        let snap = registry.gather();
        match snap.value("process_uptime_seconds", &[]) {
            Some(SeriesValue::Gauge(v)) => assert!(*v >= 0.0),
            other => panic!("unexpected uptime value: {other:?}"),
        }
        match snap.value("process_start_time_seconds", &[]) {
            Some(SeriesValue::Gauge(v)) => assert!(*v > 0.0),
            other => panic!("unexpected start time value: {other:?}"),
        }
    }

    #[test]
    fn registering_twice_reuses_families() {
        let registry = Registry::new();
        ProcessCollector::register(&registry).unwrap();
        ProcessCollector::register(&registry).unwrap();
        assert_eq!(registry.gather().families.len(), 2);
    }
}
