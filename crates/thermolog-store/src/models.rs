//! Data models for query results.

use serde::{Deserialize, Serialize};

/// Per-date averages over all readings stored for that date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    /// The calendar date, formatted under the configured dateformat.
    pub date: String,
    /// Mean temperature across the date's readings.
    pub temperature: f64,
    /// Mean humidity across the date's readings.
    pub humidity: f64,
}

/// A single reading at full time-of-day resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedReading {
    /// Clock time, formatted under the configured timeformat.
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
}

/// One ISO week of daily averages, gap-filled to exactly 7 buckets.
///
/// The three vectors are index-aligned: `labels[i]` is the weekday name
/// (Monday first), and `temperatures[i]`/`humidities[i]` are `None`
/// when no readings exist for that day. Chart rendering downstream
/// relies on the fixed length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSeries {
    pub labels: Vec<String>,
    pub temperatures: Vec<Option<f64>>,
    pub humidities: Vec<Option<f64>>,
}

/// First and last bucket present in the store, or "now" twice when the
/// store is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub first: String,
    pub last: String,
}

/// An extreme value together with the date it was first recorded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDatePair {
    pub value: f64,
    pub date: String,
}

/// Whole-table aggregate statistics.
///
/// When several rows share an extreme value, the reported date is the
/// earliest one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_entries: u64,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub min_temperature: ValueDatePair,
    pub max_temperature: ValueDatePair,
    pub min_humidity: ValueDatePair,
    pub max_humidity: ValueDatePair,
}

/// One row of the error log.
///
/// Timestamps are plain text and carry no uniqueness constraint;
/// several entries may share one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub timestamp: String,
}
