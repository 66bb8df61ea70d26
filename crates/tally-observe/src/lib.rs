//! Logging setup shared by tally binaries.
//!
//! Installs a global `tracing` subscriber in one of three shapes (text, JSON,
//! journald) driven by a serde-friendly [`LoggerConfig`].
mod logger;
pub use logger::*;
