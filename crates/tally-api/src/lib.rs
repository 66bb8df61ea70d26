//! HTTP surface for tally: the Prometheus scrape endpoint and a health check.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tally_api::{ApiConfig, HttpApi};
//! use tally_core::Registry;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(Registry::new());
//! let app = HttpApi::new(registry.clone(), ApiConfig::default())?
//!     .with_request_metrics(registry)?
//!     .router();
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:9464").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
mod config;
pub use config::{ApiConfig, ConfigError};

mod error;
pub use error::ApiError;

mod handler;
pub use handler::SnapshotSource;

mod http;
pub use http::{HttpApi, ScrapeState};

mod middleware;
pub use middleware::{HTTP_REQUESTS_METRIC, RequestMetrics};
