//! # Temporal Types: UTC Timestamps and Countdown Formatting
//!
//! Defines `Timestamp`, a UTC timestamp with seconds precision, plus the
//! small formatting helpers the status layer needs: elapsed durations
//! (`HH:MM:SS`) and the "minutes until scheduled cutover" countdown.
//!
//! Cluster resources carry RFC 3339 strings with arbitrary offsets, so
//! parsing here is lenient: any offset is accepted and normalized to UTC.
//! Nothing in this module reads the wall clock except [`Timestamp::now`];
//! the formatting helpers take `now` as an argument so callers stay pure.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MtvError;

/// A UTC timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string, accepting any offset and converting to UTC.
    pub fn parse(s: &str) -> Result<Self, MtvError> {
        let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| MtvError::Timestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse an optional stamp, treating absent, empty, and malformed
    /// values alike as `None`.
    ///
    /// This is the read-path entry point: a resource observed mid-write may
    /// carry garbage, and the classifier must degrade rather than fail.
    pub fn parse_opt(s: Option<&str>) -> Option<Self> {
        s.filter(|v| !v.trim().is_empty())
            .and_then(|v| Self::parse(v).ok())
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Whole seconds from `self` until `later` (negative if `later` is earlier).
    pub fn seconds_until(&self, later: &Timestamp) -> i64 {
        later.0.signed_duration_since(self.0).num_seconds()
    }

    /// Render as RFC 3339 with a `Z` suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_rfc3339(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Render for humans: `15 Jan 2026, 12:00:00 UTC`, or without seconds.
    pub fn to_display(&self, show_seconds: bool) -> String {
        let template = if show_seconds {
            "%d %b %Y, %H:%M:%S UTC"
        } else {
            "%d %b %Y, %H:%M UTC"
        };
        self.0.format(template).to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

/// Format the elapsed time between `start` and `end` (or `now` when the
/// interval is still open) as zero-padded `HH:MM:SS`.
///
/// A missing start yields `00:00:00`. Negative intervals clamp to zero.
pub fn format_duration(start: Option<Timestamp>, end: Option<Timestamp>, now: Timestamp) -> String {
    let Some(start) = start else {
        return "00:00:00".to_string();
    };
    let end = end.unwrap_or(now);
    let mut seconds = start.seconds_until(&end).max(0);
    let hours = seconds / 3600;
    seconds %= 3600;
    let minutes = seconds / 60;
    seconds %= 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Human countdown to `target`, used for scheduled cutovers.
pub fn minutes_until(target: Timestamp, now: Timestamp) -> String {
    let minutes = now.seconds_until(&target) / 60;
    match minutes {
        m if m <= 0 => "less than 1 minute".to_string(),
        1 => "1 minute".to_string(),
        m => format!("{m} minutes"),
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
