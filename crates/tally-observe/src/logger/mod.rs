mod config;
mod error;
mod format;
mod install;
mod level;
mod timer;

pub use config::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use timer::{LoggerTimeZone, LoggerTimer, init_local_offset};

/// Install the global tracing subscriber described by `cfg`.
///
/// Call once, early in `main`. A second call fails with
/// [`LoggerError::AlreadyInitialized`].
///
/// When `cfg.tz` is [`LoggerTimeZone::Local`], call [`init_local_offset`]
/// before the async runtime starts any worker threads.
///
/// # Examples
/// ```rust
/// use tally_observe::{LoggerConfig, init_logger};
///
/// init_logger(&LoggerConfig::default()).expect("logger");
/// tracing::info!("ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => install::text(cfg),
        LoggerFormat::Json => install::json(cfg),
        LoggerFormat::Journald => install::journald(cfg),
    }
}
