//! # Recent Record Filter
//!
//! Keeps the records whose scheduled time falls within a short window after a
//! reference instant. Records are opaque JSON values; only the configured
//! time field is inspected.

use std::num::NonZeroU32;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::time;

/// Field holding the scheduled time when no other key is configured.
pub const DEFAULT_TIME_FIELD: &str = "4";

/// Window length used when no other length is configured.
pub const DEFAULT_WINDOW_MINUTES: NonZeroU32 = NonZeroU32::new(30).unwrap();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub time_field: String,
    pub window: TimeDelta,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            time_field: DEFAULT_TIME_FIELD.to_string(),
            window: TimeDelta::minutes(i64::from(DEFAULT_WINDOW_MINUTES.get())),
        }
    }
}

impl RecordFilter {
    /// Scheduled time of `record`, if it carries a truthy, parseable one.
    ///
    /// Object records are looked up by key. Array records are indexed when
    /// the time field is a position, so row-shaped records work as well.
    pub fn scheduled_time(&self, record: &Value) -> Option<DateTime<Utc>> {
        let value = match record {
            Value::Array(row) => row.get(self.time_field.parse::<usize>().ok()?),
            _ => record.get(&self.time_field),
        };
        value
            .filter(|value| time::is_truthy(value))
            .and_then(time::parse_timestamp_value)
    }

    /// Whether `record` is scheduled within `[now, now + window]`.
    pub fn matches(&self, record: &Value, now: DateTime<Utc>) -> bool {
        let until = now
            .checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.scheduled_time(record)
            .is_some_and(|scheduled| scheduled >= now && scheduled <= until)
    }

    /// Returns the matching records in their original order.
    pub fn filter_recent_records(&self, records: Vec<Value>, now: DateTime<Utc>) -> Vec<Value> {
        records
            .into_iter()
            .filter(|record| self.matches(record, now))
            .collect()
    }
}

/// Serialized size of `records`, counted in UTF-16 code units.
pub fn payload_size(records: &[Value]) -> usize {
    serde_json::to_string(records)
        .map(|json| json.encode_utf16().count())
        .unwrap_or_default()
}
