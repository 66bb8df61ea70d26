use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{LoggerFormat, LoggerLevel, LoggerResult, LoggerTimeZone};

/// Environment variable overriding [`LoggerConfig::level`].
pub const ENV_LOG_LEVEL: &str = "TALLY_LOG";
/// Environment variable overriding [`LoggerConfig::format`].
pub const ENV_LOG_FORMAT: &str = "TALLY_LOG_FORMAT";

/// Logger configuration.
///
/// Every field is optional when deserializing; missing fields take their
/// defaults (`text`, `info`, `utc`, targets on, color on).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` expression, e.g. `"info"` or `"tally_api=debug,info"`.
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include the event target (module path) in each line.
    pub with_targets: bool,
    /// Allow ANSI colors; still disabled when stdout is not a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Apply `TALLY_LOG` / `TALLY_LOG_FORMAT` from the process environment.
    pub fn with_env_overrides(self) -> LoggerResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.level = level.parse()?;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.format = format.parse()?;
        }
        Ok(self)
    }

    pub(crate) fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LoggerConfig::default();

        assert_eq!(config.format, LoggerFormat::Text);
        assert_eq!(config.tz, LoggerTimeZone::Utc);
        assert_eq!(config.level.as_str(), "info");
        assert!(config.with_targets);
        assert!(config.use_color);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: LoggerConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();

        assert_eq!(config.format, LoggerFormat::Json);
        assert_eq!(config.level.as_str(), "info");
        assert!(config.with_targets);
    }

    #[test]
    fn rejects_bad_level_in_json() {
        let parsed = serde_json::from_str::<LoggerConfig>(r#"{"level": "tally=loud"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn overrides_replace_level_and_format() {
        let config = LoggerConfig::default()
            .with_overrides(|key| match key {
                ENV_LOG_LEVEL => Some("tally_api=debug,warn".into()),
                ENV_LOG_FORMAT => Some("JSON".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.level.as_str(), "tally_api=debug,warn");
        assert_eq!(config.format, LoggerFormat::Json);
    }

    #[test]
    fn invalid_override_is_an_error() {
        let result = LoggerConfig::default().with_overrides(|key| {
            (key == ENV_LOG_FORMAT).then(|| "xml".to_string())
        });
        assert!(result.is_err());
    }
}
