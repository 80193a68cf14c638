//! Timestamp helpers shared by the slot search and the record filter.
//!
//! Instants are always carried as `DateTime<Utc>`; a display zone only comes
//! into play when rounding to civil-time boundaries and when rendering.

use std::num::NonZeroU32;

use chrono::{
    DateTime, DurationRound, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use serde_json::Value;

use crate::errors::{TimeError, TimeResult};

/// Date-time layouts accepted in addition to RFC 3339. Inputs without an
/// offset are read as UTC.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses an ISO-8601 timestamp into a UTC instant.
///
/// # Errors
///
/// * `TimeError::InvalidTimestamp` - when no supported layout matches
pub fn parse_instant(input: &str) -> TimeResult<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(TimeError::InvalidTimestamp(input.to_string()))
}

/// Reads a loosely typed JSON timestamp: strings are parsed as ISO-8601 and
/// numbers are epoch milliseconds. Anything else yields `None`.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_instant(text).ok(),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis.trunc() as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Rounds `instant` down to the nearest `minutes` boundary of civil time in
/// `zone`, clearing seconds and sub-seconds.
pub fn round_down(instant: DateTime<Utc>, minutes: NonZeroU32, zone: Tz) -> DateTime<Utc> {
    let step = TimeDelta::minutes(i64::from(minutes.get()));
    instant
        .with_timezone(&zone)
        .duration_trunc(step)
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or(instant)
}

/// Midnight UTC of the day containing `instant`.
pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Last millisecond of the UTC day containing `instant`.
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(instant) + TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

/// The instant at which `date` begins in `zone`.
pub fn local_midnight(date: NaiveDate, zone: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Renders an instant as ISO-8601 with millisecond precision. UTC renders
/// with a `Z` suffix, every other zone with its numeric offset.
pub fn render(instant: &DateTime<Tz>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, instant.timezone() == Tz::UTC)
}
