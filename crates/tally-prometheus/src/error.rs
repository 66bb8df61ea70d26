use std::fmt;

use tally_core::MetricKind;
use thiserror::Error;

/// Snapshot violates an invariant the text format relies on.
///
/// Encoding is all-or-nothing: when this is returned no text was produced.
#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("series of '{metric}' has {got} label values, descriptor declares {expected}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("series of '{metric}' holds a {got} value, descriptor declares {expected}")]
    KindMismatch {
        metric: String,
        expected: MetricKind,
        got: MetricKind,
    },

    #[error("histogram '{metric}' has {got} bucket counts, descriptor declares {expected} bounds")]
    BucketMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("failed to write exposition text")]
    Write(#[from] fmt::Error),
}
