//! Core types shared across the thermolog crates.

use serde::{Deserialize, Serialize};

/// Default polling interval in seconds (10 minutes).
pub const DEFAULT_SENSOR_INTERVAL: u64 = 600;

/// A single temperature/humidity measurement from the sensor.
///
/// Both values are always present; a failed or partial read is
/// represented as the *absence* of a `Reading`, never as a half-filled
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
}

impl Reading {
    /// Create a new reading.
    #[must_use]
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// The mutable runtime configuration.
///
/// Exactly one logical instance exists system-wide: it is persisted as
/// a singleton row in the store and mirrored in an in-memory cache read
/// by the poller and the API. The format strings are `time` crate
/// format descriptions and are never hard-coded at the query sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between successful sensor polls.
    pub sensor_interval: u64,
    /// Format for calendar dates (`timestamp_date` column).
    pub dateformat: String,
    /// Format for clock times (`timestamp_time` column).
    pub timeformat: String,
    /// Format for ISO week labels (year + week number).
    pub weekformat: String,
    /// Format for month labels (year + month).
    pub monthformat: String,
    /// Format for a full ISO week date (year + week + weekday),
    /// used to parse week labels back into calendar dates.
    pub iso_week_format: String,
    /// Whether the background poller should run.
    pub use_sensor: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sensor_interval: DEFAULT_SENSOR_INTERVAL,
            dateformat: "[year]-[month]-[day]".to_string(),
            timeformat: "[hour]:[minute]:[second]".to_string(),
            weekformat: "[year base:iso_week]-W[week_number repr:iso]".to_string(),
            monthformat: "[year]-[month]".to_string(),
            iso_week_format: "[year base:iso_week]-W[week_number repr:iso]-[weekday repr:monday]"
                .to_string(),
            use_sensor: true,
        }
    }
}
