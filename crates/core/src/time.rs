//! Lenient timestamp parsing for client-supplied dates.
//!
//! Browsers send `datetime-local` values without an offset
//! (`2026-10-16T14:30`), API clients send RFC 3339. Values without an
//! offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone as _, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::CrmError;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp in any of the accepted shapes.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CrmError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(start_of_day(date));
    }
    Err(CrmError::invalid_value("timestamp", raw))
}

/// Parse a calendar date (`YYYY-MM-DD`); a full timestamp is truncated to its date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, CrmError> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| parse_timestamp(s).map(|dt| dt.date_naive()))
        .map_err(|_| CrmError::invalid_value("date", raw))
}

/// Normalize a wall-clock time to `HH:MM`. Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_clock(raw: &str) -> Result<String, CrmError> {
    let s = raw.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| CrmError::invalid_value("time", raw))
}

#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Last representable microsecond of `date`.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let next = date.succ_opt().map_or_else(|| start_of_day(date), start_of_day);
    next - chrono::Duration::microseconds(1)
}

/// Serde adapter for timestamp fields in request bodies.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Serde adapter for optional timestamp fields; blank strings count as absent.
pub fn deserialize_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_timestamp(s).map(Some).map_err(serde::de::Error::custom),
    }
}
