use std::{fs, net::SocketAddr, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tally_api::ApiConfig;
use tally_observe::LoggerConfig;

/// Environment variable naming the config file when no argument is given.
pub const ENV_CONFIG_PATH: &str = "TALLY_CONFIG";

/// Daemon configuration, loaded from an optional JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub listen_addr: SocketAddr,
    /// Export `process_start_time_seconds` and `process_uptime_seconds`.
    pub process_metrics: bool,
    /// Export `http_server_requests_seconds` for the daemon's own routes.
    pub request_metrics: bool,
    pub api: ApiConfig,
    pub logger: LoggerConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9464)),
            process_metrics: true,
            request_metrics: true,
            api: ApiConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Read the file at `path`, or return defaults when there is none.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: AgentConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        cfg.api.validate()?;
        Ok(cfg)
    }
}
