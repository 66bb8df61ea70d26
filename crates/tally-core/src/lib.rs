//! Metric registry and instrument types for tally.
//!
//! ## Model
//! - [`MetricDescriptor`] describes a family: name, help, kind, label names and,
//!   for histograms, bucket bounds.
//! - [`Registry`] owns families and their labeled series, creating series
//!   lazily on first use.
//! - [`Instrument`] is the per-series value state: [`Counter`], [`Gauge`] or
//!   [`Histogram`].
//! - [`RegistrySnapshot`] is a lock-free copy handed to encoders.
//!
//! ## Example
//! ```rust
//! use tally_core::{MetricDescriptor, Registry, SeriesValue};
//!
//! # fn main() -> Result<(), tally_core::MetricsError> {
//! let registry = Registry::new();
//! registry.register(
//!     MetricDescriptor::histogram("latency_seconds", "Request latency", vec![0.1, 0.5, 1.0]),
//! )?;
//!
//! registry.histogram("latency_seconds", &[])?.observe(0.3);
//!
//! let snapshot = registry.snapshot();
//! match snapshot.value("latency_seconds", &[]) {
//!     Some(SeriesValue::Histogram(h)) => assert_eq!(h.cumulative_counts, vec![0, 1, 1]),
//!     other => panic!("unexpected value: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```
mod collector;
pub use collector::{Collector, ProcessCollector};

mod descriptor;
pub use descriptor::{
    BUCKET_LABEL, DEFAULT_BUCKETS, MetricDescriptor, MetricKind, is_valid_label_name,
    is_valid_metric_name,
};

mod error;
pub use error::{MetricsError, MetricsResult};

mod instrument;
pub use instrument::{Counter, Gauge, Histogram, HistogramTimer, Instrument};

mod registry;
pub use registry::Registry;

mod snapshot;
pub use snapshot::{
    FamilySnapshot, HistogramSnapshot, RegistrySnapshot, SeriesSnapshot, SeriesValue,
};
