use chrono::{DateTime, Duration, Local, SecondsFormat, TimeZone, Utc};
use std::fmt;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Nanoseconds since the Unix epoch, the resolution the Fitness API speaks.
pub fn to_nanos(time: DateTime<Utc>) -> i64 {
    time.timestamp() * NANOS_PER_SECOND + i64::from(time.timestamp_subsec_nanos())
}

pub fn nanos_to_millis(nanos: i64) -> i64 {
    nanos / NANOS_PER_MILLI
}

/// Renders an epoch-millisecond timestamp as RFC 3339 with millisecond precision in the
/// machine's local offset. A zero offset prints as `Z`.
pub fn format_millis(millis: i64) -> String {
    format_millis_in(millis, &Local)
}

/// Like [`format_millis`] but in an explicit zone. Values chrono cannot represent fall back
/// to the raw number.
pub fn format_millis_in<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match tz.timestamp_millis_opt(millis).single() {
        Some(time) => time.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => millis.to_string(),
    }
}

/// A closed query range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The window of length `lookback` that ends at `end`.
    pub fn ending_at(end: DateTime<Utc>, lookback: Duration) -> TimeWindow {
        TimeWindow {
            start: end - lookback,
            end,
        }
    }

    pub fn dataset_id(&self) -> DatasetId {
        DatasetId::from_nanos(to_nanos(self.start), to_nanos(self.end))
    }
}

/// The `"<start nanos>-<end nanos>"` key that selects a range of points from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn from_nanos(start: i64, end: i64) -> DatasetId {
        DatasetId(format!("{}-{}", start, end))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
