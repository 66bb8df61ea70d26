use std::fmt::Write;

use tally_core::{FamilySnapshot, HistogramSnapshot, RegistrySnapshot, SeriesValue};

use crate::error::EncodeError;
use crate::escape::{escape_help, escape_label_value};

/// Content type of the text exposition format.
pub const FORMAT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders registry snapshots in the Prometheus text exposition format.
///
/// ## Layout
/// For each family, in registration order:
/// - `# HELP <name> <help>`
/// - `# TYPE <name> <counter|gauge|histogram>`
/// - one `<name>{labels} <value>` line per series; histograms expand to
///   `<name>_bucket{...,le="<bound>"}` lines (ending with `le="+Inf"`),
///   then `<name>_sum` and `<name>_count`.
///
/// # Example
/// ```rust
/// use tally_core::{MetricDescriptor, Registry};
/// use tally_prometheus::TextEncoder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = Registry::new();
/// registry.register(MetricDescriptor::counter("requests_total", "Total requests"))?;
/// registry.counter("requests_total", &[])?.inc();
///
/// let text = TextEncoder::new().encode_to_string(&registry.snapshot())?;
/// assert!(text.contains("requests_total 1.0\n"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEncoder;

impl TextEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Content type to send alongside the encoded text.
    #[inline]
    pub fn format_type(&self) -> &'static str {
        FORMAT_TYPE
    }

    /// Append the encoded snapshot to `out`.
    ///
    /// On error `out` is left untouched.
    pub fn encode(&self, snapshot: &RegistrySnapshot, out: &mut String) -> Result<(), EncodeError> {
        let text = self.encode_to_string(snapshot)?;
        out.push_str(&text);
        Ok(())
    }

    /// Encode the snapshot into a fresh buffer.
    pub fn encode_to_string(&self, snapshot: &RegistrySnapshot) -> Result<String, EncodeError> {
        let mut buf = String::with_capacity(256 * snapshot.families.len());
        for family in &snapshot.families {
            encode_family(&mut buf, family)?;
        }
        Ok(buf)
    }
}

fn encode_family(buf: &mut String, family: &FamilySnapshot) -> Result<(), EncodeError> {
    let desc = &family.descriptor;
    let name = desc.name();

    writeln!(buf, "# HELP {} {}", name, escape_help(desc.help()))?;
    writeln!(buf, "# TYPE {} {}", name, desc.kind())?;

    for series in &family.series {
        let expected = desc.label_names().len();
        if series.label_values.len() != expected {
            return Err(EncodeError::LabelMismatch {
                metric: name.to_string(),
                expected,
                got: series.label_values.len(),
            });
        }
        if series.value.kind() != desc.kind() {
            return Err(EncodeError::KindMismatch {
                metric: name.to_string(),
                expected: desc.kind(),
                got: series.value.kind(),
            });
        }

        let labels: Vec<(&str, &str)> = desc
            .label_names()
            .iter()
            .map(String::as_str)
            .zip(series.label_values.iter().map(String::as_str))
            .collect();

        match &series.value {
            SeriesValue::Counter(v) | SeriesValue::Gauge(v) => {
                write_sample(buf, name, "", &labels, None, &format_value(*v))?;
            }
            SeriesValue::Histogram(h) => {
                encode_histogram(buf, name, desc.buckets(), &labels, h)?;
            }
        }
    }
    Ok(())
}

fn encode_histogram(
    buf: &mut String,
    name: &str,
    bounds: &[f64],
    labels: &[(&str, &str)],
    h: &HistogramSnapshot,
) -> Result<(), EncodeError> {
    if h.cumulative_counts.len() != bounds.len() {
        return Err(EncodeError::BucketMismatch {
            metric: name.to_string(),
            expected: bounds.len(),
            got: h.cumulative_counts.len(),
        });
    }

    for (bound, count) in bounds.iter().zip(&h.cumulative_counts) {
        let le = format_value(*bound);
        write_sample(buf, name, "_bucket", labels, Some(&le), &count.to_string())?;
    }
    write_sample(buf, name, "_bucket", labels, Some("+Inf"), &h.count.to_string())?;
    write_sample(buf, name, "_sum", labels, None, &format_value(h.sum))?;
    write_sample(buf, name, "_count", labels, None, &h.count.to_string())?;
    Ok(())
}

fn write_sample(
    buf: &mut String,
    name: &str,
    suffix: &str,
    labels: &[(&str, &str)],
    le: Option<&str>,
    value: &str,
) -> Result<(), EncodeError> {
    buf.push_str(name);
    buf.push_str(suffix);

    if !labels.is_empty() || le.is_some() {
        buf.push('{');
        let bucket = le.map(|v| (tally_core::BUCKET_LABEL, v));
        for (idx, (label, val)) in labels.iter().copied().chain(bucket).enumerate() {
            if idx > 0 {
                buf.push(',');
            }
            write!(buf, "{}=\"{}\"", label, escape_label_value(val))?;
        }
        buf.push('}');
    }

    writeln!(buf, " {}", value)?;
    Ok(())
}

/// Shortest round-trip representation, integral values keep a `.0`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{:?}", v)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tally_core::{MetricDescriptor, MetricKind, Registry, SeriesSnapshot};

    use super::*;

    #[test]
    fn formats_values() {
        assert_eq!(format_value(3.0), "3.0");
        assert_eq!(format_value(0.3), "0.3");
        assert_eq!(format_value(-2.5), "-2.5");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[test]
    fn formatted_values_round_trip() {
        for v in [0.1, 1.0 / 3.0, 123456.789, 1e-9, 1e21, f64::MAX] {
            let parsed: f64 = format_value(v).parse().unwrap();
            assert_eq!(parsed, v);
        }
    }

    #[test]
    fn empty_snapshot_encodes_to_empty_text() {
        let text = TextEncoder::new()
            .encode_to_string(&RegistrySnapshot::default())
            .unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn counter_with_labels() {
        let registry = Registry::new();
        registry
            .register(
                MetricDescriptor::counter("http_requests_total", "Requests by method")
                    .with_labels(["method", "code"]),
            )
            .unwrap();
        registry
            .counter("http_requests_total", &["GET", "200"])
            .unwrap()
            .inc_by(2.0)
            .unwrap();

        let text = TextEncoder::new().encode_to_string(&registry.snapshot()).unwrap();
        assert_eq!(
            text,
            "# HELP http_requests_total Requests by method\n\
             # TYPE http_requests_total counter\n\
             http_requests_total{method=\"GET\",code=\"200\"} 2.0\n"
        );
    }

    #[test]
    fn gauge_line_and_family_without_series() {
        let registry = Registry::new();
        registry
            .register(MetricDescriptor::gauge("temperature", "Room temperature"))
            .unwrap();
        registry
            .register(MetricDescriptor::gauge("idle", "Never touched").with_labels(["k"]))
            .unwrap();
        registry.gauge("temperature", &[]).unwrap().set(-4.5);

        let text = TextEncoder::new().encode_to_string(&registry.snapshot()).unwrap();
        assert_eq!(
            text,
            "# HELP temperature Room temperature\n\
             # TYPE temperature gauge\n\
             temperature -4.5\n\
             # HELP idle Never touched\n\
             # TYPE idle gauge\n"
        );
    }

    #[test]
    fn histogram_expands_into_buckets_sum_count() {
        let registry = Registry::new();
        registry
            .register(
                MetricDescriptor::histogram("latency_seconds", "Latency", vec![0.1, 0.5, 1.0])
                    .with_labels(["route"]),
            )
            .unwrap();
        registry
            .histogram("latency_seconds", &["/a"])
            .unwrap()
            .observe(0.3);

        let text = TextEncoder::new().encode_to_string(&registry.snapshot()).unwrap();
        assert_eq!(
            text,
            "# HELP latency_seconds Latency\n\
             # TYPE latency_seconds histogram\n\
             latency_seconds_bucket{route=\"/a\",le=\"0.1\"} 0\n\
             latency_seconds_bucket{route=\"/a\",le=\"0.5\"} 1\n\
             latency_seconds_bucket{route=\"/a\",le=\"1.0\"} 1\n\
             latency_seconds_bucket{route=\"/a\",le=\"+Inf\"} 1\n\
             latency_seconds_sum{route=\"/a\"} 0.3\n\
             latency_seconds_count{route=\"/a\"} 1\n"
        );
    }

    #[test]
    fn escapes_label_values_and_help() {
        let registry = Registry::new();
        registry
            .register(MetricDescriptor::counter("odd_total", "back\\slash\nnewline").with_labels(["v"]))
            .unwrap();
        registry
            .counter("odd_total", &["say \"hi\"\n\\"])
            .unwrap()
            .inc();

        let text = TextEncoder::new().encode_to_string(&registry.snapshot()).unwrap();
        assert!(text.contains("# HELP odd_total back\\\\slash\\nnewline\n"));
        assert!(text.contains("odd_total{v=\"say \\\"hi\\\"\\n\\\\\"} 1.0\n"));
    }

    #[test]
    fn encoding_is_deterministic() {
        let registry = Registry::new();
        registry
            .register(MetricDescriptor::gauge("g", "").with_labels(["k"]))
            .unwrap();
        for key in ["c", "a", "b"] {
            registry.gauge("g", &[key]).unwrap().set(1.5);
        }

        let snapshot = registry.snapshot();
        let encoder = TextEncoder::new();
        let first = encoder.encode_to_string(&snapshot).unwrap();
        let second = encoder.encode_to_string(&snapshot).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with('\n'));
    }

    fn corrupt(descriptor: MetricDescriptor, series: SeriesSnapshot) -> RegistrySnapshot {
        RegistrySnapshot {
            families: vec![FamilySnapshot {
                descriptor: Arc::new(descriptor),
                series: vec![series],
            }],
        }
    }

    #[test]
    fn label_mismatch_is_an_error_and_output_untouched() {
        let snapshot = corrupt(
            MetricDescriptor::counter("c_total", "").with_labels(["a", "b"]),
            SeriesSnapshot {
                label_values: vec!["x".into()],
                value: SeriesValue::Counter(1.0),
            },
        );

        let mut out = String::from("existing");
        let err = TextEncoder::new().encode(&snapshot, &mut out).unwrap_err();
        assert!(matches!(err, EncodeError::LabelMismatch { expected: 2, got: 1, .. }));
        assert_eq!(out, "existing");
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        let snapshot = corrupt(
            MetricDescriptor::counter("c_total", ""),
            SeriesSnapshot {
                label_values: vec![],
                value: SeriesValue::Gauge(1.0),
            },
        );

        let err = TextEncoder::new().encode_to_string(&snapshot).unwrap_err();
        assert_eq!(
            err,
            EncodeError::KindMismatch {
                metric: "c_total".into(),
                expected: MetricKind::Counter,
                got: MetricKind::Gauge,
            }
        );
    }

    #[test]
    fn bucket_mismatch_is_an_error() {
        let snapshot = corrupt(
            MetricDescriptor::histogram("h", "", vec![1.0, 2.0]),
            SeriesSnapshot {
                label_values: vec![],
                value: SeriesValue::Histogram(HistogramSnapshot {
                    cumulative_counts: vec![1],
                    sum: 1.0,
                    count: 1,
                }),
            },
        );

        assert!(matches!(
            TextEncoder::new().encode_to_string(&snapshot),
            Err(EncodeError::BucketMismatch { expected: 2, got: 1, .. })
        ));
    }
}
