//! Point-in-time copies of registry contents.
//!
//! Snapshots own their data and hold no locks, so they can be encoded at
//! leisure while writers keep updating the live instruments.
use std::sync::Arc;

use crate::descriptor::{MetricDescriptor, MetricKind};

/// Copied state of a histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// Cumulative counts, one per descriptor bucket bound (no `+Inf` entry).
    pub cumulative_counts: Vec<u64>,
    pub sum: f64,
    pub count: u64,
}

/// Copied value of one series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Counter(f64),
    Gauge(f64),
    Histogram(HistogramSnapshot),
}

impl SeriesValue {
    #[inline]
    pub fn kind(&self) -> MetricKind {
        match self {
            SeriesValue::Counter(_) => MetricKind::Counter,
            SeriesValue::Gauge(_) => MetricKind::Gauge,
            SeriesValue::Histogram(_) => MetricKind::Histogram,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    /// Values in the order of the descriptor's label names.
    pub label_values: Vec<String>,
    pub value: SeriesValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    pub descriptor: Arc<MetricDescriptor>,
    /// Series ordered by label values.
    pub series: Vec<SeriesSnapshot>,
}

/// All families in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub families: Vec<FamilySnapshot>,
}

impl RegistrySnapshot {
    /// Find a family by metric name.
    pub fn family(&self, name: &str) -> Option<&FamilySnapshot> {
        self.families.iter().find(|f| f.descriptor.name() == name)
    }

    /// Value of the series with exactly these label values.
    pub fn value(&self, name: &str, label_values: &[&str]) -> Option<&SeriesValue> {
        self.family(name)?
            .series
            .iter()
            .find(|s| {
                let values = s.label_values.iter().map(String::as_str);
                values.eq(label_values.iter().copied())
            })
            .map(|s| &s.value)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
