//! Prometheus text exposition for tally registries.
//!
//! This crate turns a [`tally_core::RegistrySnapshot`] into the plain-text
//! wire format (version 0.0.4) scraped by Prometheus.
//!
//! ## Example
//! ```rust
//! use tally_core::{MetricDescriptor, Registry};
//! use tally_prometheus::{FORMAT_TYPE, TextEncoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new();
//! registry.register(MetricDescriptor::gauge("queue_depth", "Jobs waiting"))?;
//! registry.gauge("queue_depth", &[])?.set(7.0);
//!
//! let encoder = TextEncoder::new();
//! let body = encoder.encode_to_string(&registry.snapshot())?;
//! assert_eq!(encoder.format_type(), FORMAT_TYPE);
//! assert!(body.ends_with("queue_depth 7.0\n"));
//! # Ok(())
//! # }
//! ```
//!
//! ## HTTP Server
//! This crate does NOT serve anything. `tally-api` mounts a `/metrics` route
//! that snapshots a registry and encodes it with [`TextEncoder`].

mod encoder;
pub use encoder::{FORMAT_TYPE, TextEncoder, format_value};

mod error;
pub use error::EncodeError;

mod escape;
pub use escape::{escape_help, escape_label_value};
