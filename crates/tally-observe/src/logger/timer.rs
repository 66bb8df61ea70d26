use std::{fmt, str::FromStr, sync::OnceLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::logger::LoggerError;

/// Local offset captured by [`init_local_offset`].
static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Timezone used for log timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerTimeZone {
    #[default]
    Utc,
    /// System offset, as captured by [`init_local_offset`].
    Local,
}

impl LoggerTimeZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        }
    }

    fn offset(&self) -> UtcOffset {
        match self {
            LoggerTimeZone::Utc => UtcOffset::UTC,
            LoggerTimeZone::Local => LOCAL_OFFSET.get().copied().unwrap_or(UtcOffset::UTC),
        }
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LoggerTimeZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoggerTimeZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Capture the system UTC offset for [`LoggerTimeZone::Local`].
///
/// Must run before any other thread exists: on most Unix platforms the
/// offset cannot be read safely from a multi-threaded process, in which case
/// timestamps stay in UTC.
///
/// # Example
/// ```no_run
/// fn main() {
///     tally_observe::init_local_offset();
///     tokio::runtime::Runtime::new().unwrap().block_on(async {});
/// }
/// ```
pub fn init_local_offset() {
    if let Ok(offset) = UtcOffset::current_local_offset() {
        let _ = LOCAL_OFFSET.set(offset);
    }
}

/// RFC3339 timestamps in the configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct LoggerTimer {
    tz: LoggerTimeZone,
}

impl LoggerTimer {
    pub fn new(tz: LoggerTimeZone) -> Self {
        Self { tz }
    }
}

impl FormatTime for LoggerTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = OffsetDateTime::now_utc().to_offset(self.tz.offset());
        match now.format(&Rfc3339) {
            Ok(ts) => write!(w, "{ts}"),
            Err(_) => write!(w, "<invalid-time>"),
        }
    }
}
