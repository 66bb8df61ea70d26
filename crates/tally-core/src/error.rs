use thiserror::Error;

use crate::descriptor::MetricKind;

#[derive(Debug, Error, PartialEq)]
pub enum MetricsError {
    #[error("metric '{0}' already registered with a different descriptor")]
    Duplicate(String),

    #[error("counter delta must be non-negative, got {0}")]
    InvalidDelta(f64),

    #[error("invalid metric name: '{0}'")]
    InvalidName(String),

    #[error("invalid label name '{label}' for metric '{metric}'")]
    InvalidLabelName { metric: String, label: String },

    #[error("invalid buckets for histogram '{0}': bounds must be non-empty, finite and strictly ascending")]
    InvalidBuckets(String),

    #[error("metric '{0}' is not registered")]
    UnknownMetric(String),

    #[error("metric '{metric}' expects {expected} label values, got {got}")]
    LabelCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("metric '{metric}' is a {actual}, not a {requested}")]
    KindMismatch {
        metric: String,
        actual: MetricKind,
        requested: MetricKind,
    },
}

pub type MetricsResult<T> = Result<T, MetricsError>;
