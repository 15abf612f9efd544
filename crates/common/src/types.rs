use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A point in time as milliseconds since the Unix epoch.
///
/// Zero doubles as "never set", which is how an unactivated license is
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    /// The epoch itself; also the "unset" marker.
    pub const ZERO: EpochMillis = EpochMillis(0);

    /// Wraps a raw millisecond count.
    pub const fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the raw millisecond count.
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Returns true for the zero value.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns this instant shifted by whole days (saturating).
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0.saturating_add(days.saturating_mul(MILLIS_PER_DAY)))
    }

    /// Returns this instant shifted by `millis` (saturating).
    pub fn plus_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Converts to a UTC date-time, if representable.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// Formats this instant in the given offset with a `chrono` format string.
    ///
    /// Returns an empty string for instants chrono cannot represent.
    pub fn format_in(&self, offset: FixedOffset, fmt: &str) -> String {
        self.to_utc()
            .map(|dt| dt.with_timezone(&offset).format(fmt).to_string())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EpochMillis {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

impl From<EpochMillis> for i64 {
    fn from(value: EpochMillis) -> Self {
        value.0
    }
}

impl From<DateTime<Utc>> for EpochMillis {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}
