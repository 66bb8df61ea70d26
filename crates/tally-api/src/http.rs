use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tally_core::{MetricsResult, Registry};
use tally_prometheus::TextEncoder;
use tracing::debug;

use crate::{
    config::{ApiConfig, ConfigError},
    error::ApiError,
    handler::SnapshotSource,
    middleware::{RequestMetrics, track_requests},
};

/// HTTP API service builder.
pub struct HttpApi<S> {
    source: Arc<S>,
    config: ApiConfig,
    request_metrics: Option<RequestMetrics>,
}

impl<S> HttpApi<S>
where
    S: SnapshotSource,
{
    /// Create a new HTTP API serving snapshots from `source`.
    pub fn new(source: Arc<S>, config: ApiConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            request_metrics: None,
        })
    }

    /// Record `http_server_requests_seconds` for every request into `registry`.
    pub fn with_request_metrics(mut self, registry: Arc<Registry>) -> MetricsResult<Self> {
        self.request_metrics = Some(RequestMetrics::register(registry)?);
        Ok(self)
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET {metrics_path} - Prometheus text exposition
    /// - GET {health_path} - Liveness document
    pub fn router(self) -> Router {
        let scrape = Arc::new(ScrapeState {
            source: self.source,
            encoder: TextEncoder::new(),
            timeout: self.config.scrape_timeout(),
            in_flight: Arc::new(AtomicBool::new(false)),
        });

        let router = Router::new()
            .route(&self.config.metrics_path, get(scrape_metrics::<S>))
            .with_state(scrape)
            .route(&self.config.health_path, get(health));

        match self.request_metrics {
            Some(metrics) => {
                router.layer(middleware::from_fn_with_state(metrics, track_requests))
            }
            None => router,
        }
    }
}

/// Everything a scrape needs, shared across requests.
pub struct ScrapeState<S> {
    source: Arc<S>,
    encoder: TextEncoder,
    timeout: Duration,
    /// Set while a gather worker runs, including one whose scrape timed out.
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the blocking worker is done with it.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S> ScrapeState<S>
where
    S: SnapshotSource,
{
    /// Snapshot and encode on a blocking worker, bounded by the scrape timeout.
    ///
    /// The returned buffer is complete; nothing is streamed while encoding.
    /// At most one gather runs at a time: while a previous worker is still
    /// busy (for example one left behind by a timed-out scrape) the call
    /// fails with [`ApiError::Busy`] instead of starting another.
    pub async fn render(&self) -> Result<String, ApiError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ApiError::Busy);
        }
        let guard = InFlight(self.in_flight.clone());

        let source = self.source.clone();
        let encoder = self.encoder;
        let worker = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let snapshot = source.gather();
            encoder.encode_to_string(&snapshot)
        });

        match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(encoded)) => Ok(encoded?),
            Ok(Err(join)) => Err(ApiError::Worker(join.to_string())),
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET {metrics_path}
async fn scrape_metrics<S>(
    State(state): State<Arc<ScrapeState<S>>>,
) -> Result<impl IntoResponse, ApiError>
where
    S: SnapshotSource,
{
    let body = state.render().await?;
    debug!(bytes = body.len(), "served scrape");

    Ok(([(header::CONTENT_TYPE, state.encoder.format_type())], body))
}

/// GET {health_path}
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "UP".to_string(),
    })
}
