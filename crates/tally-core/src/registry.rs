use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::collector::Collector;
use crate::descriptor::{MetricDescriptor, MetricKind};
use crate::error::{MetricsError, MetricsResult};
use crate::instrument::{Counter, Gauge, Histogram, Instrument};
use crate::snapshot::{FamilySnapshot, RegistrySnapshot, SeriesSnapshot};

/// One registered metric family and its series.
struct Family {
    descriptor: Arc<MetricDescriptor>,
    series: RwLock<BTreeMap<Vec<String>, Instrument>>,
}

#[derive(Default)]
struct Families {
    /// Registration order.
    order: Vec<Arc<Family>>,
    by_name: HashMap<String, Arc<Family>>,
    /// Exposed sample name -> owning family name.
    samples: HashMap<String, String>,
}

/// In-memory store of metric families and their labeled series.
///
/// Construct one per process, wrap it in an `Arc` and hand it to whoever
/// records or exposes metrics; there is no global instance.
///
/// ## Locking
/// - the family table is behind one `RwLock`, written only on registration;
/// - each family's series map has its own `RwLock`, written only when a new
///   label combination shows up;
/// - counters and gauges update atomically, histograms under their own mutex.
///
/// # Example
/// ```rust
/// use tally_core::{MetricDescriptor, Registry};
///
/// # fn main() -> Result<(), tally_core::MetricsError> {
/// let registry = Registry::new();
/// registry.register(MetricDescriptor::counter("requests_total", "Total requests"))?;
///
/// registry.counter("requests_total", &[])?.inc();
/// assert_eq!(registry.counter("requests_total", &[])?.get(), 1.0);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Registry {
    families: RwLock<Families>,
    collectors: RwLock<Vec<Arc<dyn Collector>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric family.
    ///
    /// Re-registering a compatible descriptor returns the existing one; the
    /// first help text wins. A descriptor with the same name but a different
    /// kind, label set or bucket layout is rejected with
    /// [`MetricsError::Duplicate`], as is a name that overlaps another
    /// family's exposed samples (histogram `foo` owns `foo_bucket`,
    /// `foo_sum` and `foo_count`).
    pub fn register(&self, descriptor: MetricDescriptor) -> MetricsResult<Arc<MetricDescriptor>> {
        descriptor.validate()?;

        let mut families = self.families.write();
        if let Some(existing) = families.by_name.get(descriptor.name()) {
            if existing.descriptor.is_compatible(&descriptor) {
                if existing.descriptor.help() != descriptor.help() {
                    debug!(
                        metric = descriptor.name(),
                        "re-registered with different help text, keeping the original"
                    );
                }
                return Ok(existing.descriptor.clone());
            }
            warn!(
                metric = descriptor.name(),
                existing_kind = %existing.descriptor.kind(),
                requested_kind = %descriptor.kind(),
                "rejected conflicting metric registration"
            );
            return Err(MetricsError::Duplicate(descriptor.name().to_string()));
        }

        let sample_names = descriptor.sample_names();
        if let Some(owner) = sample_names
            .iter()
            .find_map(|sample| families.samples.get(sample))
        {
            warn!(
                metric = descriptor.name(),
                owner = %owner,
                "rejected metric whose sample names collide with another family"
            );
            return Err(MetricsError::Duplicate(descriptor.name().to_string()));
        }

        let descriptor = Arc::new(descriptor);
        let family = Arc::new(Family {
            descriptor: descriptor.clone(),
            series: RwLock::new(BTreeMap::new()),
        });
        families
            .by_name
            .insert(descriptor.name().to_string(), family.clone());
        families.order.push(family);
        for sample in sample_names {
            families
                .samples
                .insert(sample, descriptor.name().to_string());
        }
        debug!(metric = descriptor.name(), kind = %descriptor.kind(), "registered metric");

        Ok(descriptor)
    }

    /// Descriptor registered under `name`, if any.
    pub fn descriptor(&self, name: &str) -> Option<Arc<MetricDescriptor>> {
        self.families
            .read()
            .by_name
            .get(name)
            .map(|f| f.descriptor.clone())
    }

    /// Return the series for `label_values`, creating it zeroed if absent.
    ///
    /// Concurrent callers asking for the same label combination all receive
    /// handles to a single series.
    pub fn get_or_create(&self, name: &str, label_values: &[&str]) -> MetricsResult<Instrument> {
        let family = self
            .families
            .read()
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| MetricsError::UnknownMetric(name.to_string()))?;

        let expected = family.descriptor.label_names().len();
        if label_values.len() != expected {
            return Err(MetricsError::LabelCardinality {
                metric: name.to_string(),
                expected,
                got: label_values.len(),
            });
        }

        let key: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();
        if let Some(instrument) = family.series.read().get(&key) {
            return Ok(instrument.clone());
        }

        let mut series = family.series.write();
        let instrument = series.entry(key).or_insert_with(|| {
            debug!(metric = name, labels = ?label_values, "created series");
            Instrument::zeroed(family.descriptor.kind(), family.descriptor.buckets())
        });
        Ok(instrument.clone())
    }

    /// Counter series for `label_values`.
    pub fn counter(&self, name: &str, label_values: &[&str]) -> MetricsResult<Counter> {
        match self.get_or_create(name, label_values)? {
            Instrument::Counter(c) => Ok(c),
            other => Err(kind_mismatch(name, other.kind(), MetricKind::Counter)),
        }
    }

    /// Gauge series for `label_values`.
    pub fn gauge(&self, name: &str, label_values: &[&str]) -> MetricsResult<Gauge> {
        match self.get_or_create(name, label_values)? {
            Instrument::Gauge(g) => Ok(g),
            other => Err(kind_mismatch(name, other.kind(), MetricKind::Gauge)),
        }
    }

    /// Histogram series for `label_values`.
    pub fn histogram(&self, name: &str, label_values: &[&str]) -> MetricsResult<Histogram> {
        match self.get_or_create(name, label_values)? {
            Instrument::Histogram(h) => Ok(h),
            other => Err(kind_mismatch(name, other.kind(), MetricKind::Histogram)),
        }
    }

    /// Add a collector run by every [`Registry::gather`].
    pub fn register_collector(&self, collector: Arc<dyn Collector>) {
        self.collectors.write().push(collector);
    }

    /// Copy every family and series.
    ///
    /// Each series value is consistent on its own; values of different
    /// series may come from slightly different instants.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let order: Vec<Arc<Family>> = self.families.read().order.clone();

        let families = order
            .iter()
            .map(|family| {
                let series = family
                    .series
                    .read()
                    .iter()
                    .map(|(labels, instrument)| SeriesSnapshot {
                        label_values: labels.clone(),
                        value: instrument.sample(),
                    })
                    .collect();
                FamilySnapshot {
                    descriptor: family.descriptor.clone(),
                    series,
                }
            })
            .collect();

        RegistrySnapshot { families }
    }

    /// Run collectors, then take a snapshot.
    pub fn gather(&self) -> RegistrySnapshot {
        let collectors: Vec<Arc<dyn Collector>> = self.collectors.read().clone();
        for collector in &collectors {
            collector.collect();
        }
        self.snapshot()
    }
}

fn kind_mismatch(name: &str, actual: MetricKind, requested: MetricKind) -> MetricsError {
    MetricsError::KindMismatch {
        metric: name.to_string(),
        actual,
        requested,
    }
}
