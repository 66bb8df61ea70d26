use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tally_prometheus::EncodeError;
use thiserror::Error;
use tracing::{error, warn};

/// Scrape failures.
///
/// Every variant answers 500 with an empty body: a scraper must never ingest
/// a truncated exposition.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] EncodeError),

    #[error("scrape exceeded {0:?}")]
    Timeout(Duration),

    #[error("scrape worker failed: {0}")]
    Worker(String),

    #[error("previous scrape is still gathering")]
    Busy,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Timeout(_) | ApiError::Busy => warn!(error = %self, "scrape aborted"),
            ApiError::Encode(_) | ApiError::Worker(_) => error!(error = %self, "scrape failed"),
        }
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
