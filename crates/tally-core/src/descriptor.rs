use std::fmt;

use crate::error::{MetricsError, MetricsResult};

/// Label name reserved for histogram bucket bounds.
pub const BUCKET_LABEL: &str = "le";

/// Sample name suffixes a histogram family writes.
const HISTOGRAM_SUFFIXES: [&str; 3] = ["_bucket", "_sum", "_count"];

/// Default histogram buckets, suited to request latencies in seconds.
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Instrument kind of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Monotonically non-decreasing value.
    Counter,
    /// Arbitrary value that can go up and down.
    Gauge,
    /// Bucketed distribution of observations.
    Histogram,
}

impl MetricKind {
    /// Return the name used on `# TYPE` lines.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a metric family.
///
/// Built with [`MetricDescriptor::counter`], [`MetricDescriptor::gauge`] or
/// [`MetricDescriptor::histogram`], optionally extended with
/// [`MetricDescriptor::with_labels`], and handed to
/// [`Registry::register`](crate::Registry::register).
///
/// # Example
/// ```rust
/// use tally_core::MetricDescriptor;
///
/// let desc = MetricDescriptor::counter("requests_total", "Total requests served")
///     .with_labels(["method", "status"]);
/// assert!(desc.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    name: String,
    help: String,
    kind: MetricKind,
    label_names: Vec<String>,
    buckets: Vec<f64>,
}

impl MetricDescriptor {
    fn new(kind: MetricKind, name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            kind,
            label_names: Vec::new(),
            buckets: Vec::new(),
        }
    }

    /// Describe a counter family.
    pub fn counter(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(MetricKind::Counter, name, help)
    }

    /// Describe a gauge family.
    pub fn gauge(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self::new(MetricKind::Gauge, name, help)
    }

    /// Describe a histogram family with the given bucket upper bounds.
    ///
    /// Bounds must be finite and strictly ascending; the implicit `+Inf`
    /// bucket is added by the exposition format and must not be listed.
    pub fn histogram(
        name: impl Into<String>,
        help: impl Into<String>,
        buckets: impl Into<Vec<f64>>,
    ) -> Self {
        let mut desc = Self::new(MetricKind::Histogram, name, help);
        desc.buckets = buckets.into();
        desc
    }

    /// Set the ordered label names of the family.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_names = labels.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn help(&self) -> &str {
        &self.help
    }

    #[inline]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    #[inline]
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Bucket upper bounds (empty for counters and gauges).
    #[inline]
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    /// Whether `other` describes the same family shape.
    ///
    /// Help text is not part of the identity.
    pub fn is_compatible(&self, other: &MetricDescriptor) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.label_names == other.label_names
            && self.buckets == other.buckets
    }

    /// Sample names this family writes into the exposition.
    ///
    /// Histograms expose `_bucket`, `_sum` and `_count` series and also claim
    /// the bare family name, which appears on their HELP/TYPE lines.
    pub fn sample_names(&self) -> Vec<String> {
        match self.kind {
            MetricKind::Histogram => {
                let mut names = vec![self.name.clone()];
                names.extend(
                    HISTOGRAM_SUFFIXES
                        .iter()
                        .map(|suffix| format!("{}{suffix}", self.name)),
                );
                names
            }
            MetricKind::Counter | MetricKind::Gauge => vec![self.name.clone()],
        }
    }

    /// Check naming rules and bucket layout.
    pub fn validate(&self) -> MetricsResult<()> {
        if !is_valid_metric_name(&self.name) {
            return Err(MetricsError::InvalidName(self.name.clone()));
        }

        for (idx, label) in self.label_names.iter().enumerate() {
            let reserved = self.kind == MetricKind::Histogram && label == BUCKET_LABEL;
            let repeated = self.label_names[..idx].contains(label);
            if !is_valid_label_name(label) || reserved || repeated {
                return Err(MetricsError::InvalidLabelName {
                    metric: self.name.clone(),
                    label: label.clone(),
                });
            }
        }

        match self.kind {
            MetricKind::Histogram => {
                let finite = self.buckets.iter().all(|b| b.is_finite());
                let ascending = self.buckets.windows(2).all(|w| w[0] < w[1]);
                if self.buckets.is_empty() || !finite || !ascending {
                    return Err(MetricsError::InvalidBuckets(self.name.clone()));
                }
            }
            MetricKind::Counter | MetricKind::Gauge => {
                if !self.buckets.is_empty() {
                    return Err(MetricsError::InvalidBuckets(self.name.clone()));
                }
            }
        }
        Ok(())
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, excluding the reserved `__` prefix.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_claims_suffixed_sample_names() {
        let h = MetricDescriptor::histogram("rpc_seconds", "", DEFAULT_BUCKETS.to_vec());
        assert_eq!(
            h.sample_names(),
            ["rpc_seconds", "rpc_seconds_bucket", "rpc_seconds_sum", "rpc_seconds_count"]
        );
        assert_eq!(MetricDescriptor::counter("c_total", "").sample_names(), ["c_total"]);
    }

    #[test]
    fn accepts_valid_metric_names() {
        for name in ["requests_total", "http:requests", "_private", "a1"] {
            assert!(is_valid_metric_name(name), "expected {name:?} to be valid");
        }
    }

    #[test]
    fn rejects_invalid_metric_names() {
        for name in ["", "1abc", "with space", "dash-name", "dot.name"] {
            assert!(!is_valid_metric_name(name), "expected {name:?} to be invalid");
        }
    }

    #[test]
    fn rejects_reserved_and_malformed_label_names() {
        for label in ["", "__name__", "9lives", "a:b", "a-b"] {
            assert!(!is_valid_label_name(label), "expected {label:?} to be invalid");
        }
        assert!(is_valid_label_name("method"));
        assert!(is_valid_label_name("_x"));
    }

    #[test]
    fn histogram_rejects_le_label() {
        let desc = MetricDescriptor::histogram("latency_seconds", "", vec![0.1])
            .with_labels(["le"]);
        assert!(matches!(
            desc.validate(),
            Err(MetricsError::InvalidLabelName { .. })
        ));

        let counter = MetricDescriptor::counter("le_total", "").with_labels(["le"]);
        assert!(counter.validate().is_ok());
    }

    #[test]
    fn rejects_repeated_label_names() {
        let desc = MetricDescriptor::gauge("temp", "").with_labels(["room", "room"]);
        assert!(matches!(
            desc.validate(),
            Err(MetricsError::InvalidLabelName { .. })
        ));
    }

    #[test]
    fn histogram_buckets_must_be_ascending_and_finite() {
        let bad: [&[f64]; 4] = [&[], &[0.5, 0.1], &[0.1, 0.1], &[0.1, f64::INFINITY]];
        for buckets in bad {
            let desc = MetricDescriptor::histogram("h", "", buckets.to_vec());
            assert_eq!(
                desc.validate(),
                Err(MetricsError::InvalidBuckets("h".into())),
                "buckets {buckets:?} should be rejected"
            );
        }

        let ok = MetricDescriptor::histogram("h", "", DEFAULT_BUCKETS.to_vec());
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn help_is_not_part_of_identity() {
        let a = MetricDescriptor::counter("jobs_total", "first");
        let b = MetricDescriptor::counter("jobs_total", "second");
        assert!(a.is_compatible(&b));

        let c = MetricDescriptor::gauge("jobs_total", "first");
        assert!(!a.is_compatible(&c));
    }

    #[test]
    fn kind_names_match_type_lines() {
        assert_eq!(MetricKind::Counter.to_string(), "counter");
        assert_eq!(MetricKind::Gauge.to_string(), "gauge");
        assert_eq!(MetricKind::Histogram.to_string(), "histogram");
    }
}
