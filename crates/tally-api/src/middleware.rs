use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tally_core::{DEFAULT_BUCKETS, MetricDescriptor, MetricsResult, Registry};
use tracing::debug;

/// Histogram of handled requests.
pub const HTTP_REQUESTS_METRIC: &str = "http_server_requests_seconds";

/// `uri` label for requests that matched no route.
const URI_NOT_FOUND: &str = "NOT_FOUND";
/// `uri` label for other unmatched requests.
const URI_UNKNOWN: &str = "UNKNOWN";

/// Records request durations.
///
/// ## Label cardinality
/// - `method`: HTTP method
/// - `uri`: matched route template, never the raw path
/// - `status`: numeric status code
#[derive(Clone)]
pub struct RequestMetrics {
    registry: Arc<Registry>,
}

impl RequestMetrics {
    pub fn register(registry: Arc<Registry>) -> MetricsResult<Self> {
        registry.register(
            MetricDescriptor::histogram(
                HTTP_REQUESTS_METRIC,
                "Duration of HTTP server request handling in seconds",
                DEFAULT_BUCKETS.to_vec(),
            )
            .with_labels(["method", "uri", "status"]),
        )?;
        Ok(Self { registry })
    }

    fn record(&self, method: &str, uri: &str, status: StatusCode, seconds: f64) {
        let status = status.as_u16().to_string();
        match self
            .registry
            .histogram(HTTP_REQUESTS_METRIC, &[method, uri, &status])
        {
            Ok(histogram) => histogram.observe(seconds),
            Err(e) => debug!(error = %e, "failed to record request duration"),
        }
    }
}

pub(crate) async fn track_requests(
    State(metrics): State<RequestMetrics>,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned());

    let response = next.run(req).await;

    let status = response.status();
    let uri = route.as_deref().unwrap_or(match status {
        StatusCode::NOT_FOUND => URI_NOT_FOUND,
        _ => URI_UNKNOWN,
    });
    metrics.record(&method, uri, status, started.elapsed().as_secs_f64());

    response
}
