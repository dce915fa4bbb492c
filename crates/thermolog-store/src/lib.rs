//! SQLite persistence and time-bucketed aggregation for thermolog.
//!
//! This crate owns the append-only `sensor_data` table, the `logs`
//! table, and the singleton `config` row. It exposes the calendar-aware
//! read queries (daily averages, ISO weeks with gap backfill, months,
//! arbitrary ranges) and a single-pass statistics aggregate.
//!
//! Date and time values are stored as text under the *configured*
//! format strings, so every query that touches the calendar takes the
//! current [`thermolog_types::AppConfig`] as a parameter; the parsing
//! and reformatting rules live in [`timefmt`].
//!
//! # Example
//!
//! ```no_run
//! use thermolog_store::Store;
//! use thermolog_types::AppConfig;
//!
//! let store = Store::open_default()?;
//! let cfg = AppConfig::default();
//!
//! store.insert_reading(21.5, 48.0, "2024-03-04", "08:00:00")?;
//! let week = store.readings_for_week("2024-W10", &cfg)?;
//! assert_eq!(week.labels.len(), 7);
//! # Ok::<(), thermolog_store::Error>(())
//! ```

mod error;
mod models;
mod schema;
mod store;
pub mod timefmt;

pub use error::{Error, Result};
pub use models::{
    DailyReading, DateRange, LogEntry, Statistics, TimedReading, ValueDatePair, WeekSeries,
};
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/thermolog/data.db`
/// - macOS: `~/Library/Application Support/thermolog/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\thermolog\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("thermolog")
        .join("data.db")
}
