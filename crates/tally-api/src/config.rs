use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("route path must start with '/': {0:?}")]
    InvalidPath(String),

    #[error("metrics and health endpoints share the path {0:?}")]
    PathConflict(String),

    #[error("scrape timeout must be greater than zero")]
    ZeroTimeout,
}

/// HTTP surface configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Route serving the text exposition.
    pub metrics_path: String,
    /// Route serving the liveness document.
    pub health_path: String,
    /// Upper bound on snapshot + encode time per scrape.
    pub scrape_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            metrics_path: "/metrics".to_string(),
            health_path: "/health".to_string(),
            scrape_timeout_ms: 5_000,
        }
    }
}

impl ApiConfig {
    #[inline]
    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_millis(self.scrape_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.metrics_path, &self.health_path] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
        }
        if self.metrics_path == self.health_path {
            return Err(ConfigError::PathConflict(self.metrics_path.clone()));
        }
        if self.scrape_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
