//! Error types for thermolog-store.

use std::path::PathBuf;

/// Result type for thermolog-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in thermolog-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Caller-supplied date string does not match the configured
    /// dateformat.
    #[error("Invalid date '{0}' for the configured date format")]
    InvalidDateFormat(String),

    /// Caller-supplied week label does not parse as an ISO week.
    #[error("Invalid week label '{0}' for the configured week format")]
    InvalidWeekLabel(String),

    /// A configured format string is not a valid format description.
    #[error("Invalid format description: {0}")]
    FormatDescription(#[from] time::error::InvalidFormatDescription),

    /// Formatting a date under a configured format failed.
    #[error("Date formatting failed: {0}")]
    Format(#[from] time::error::Format),

    /// The singleton configuration row could not be read back after
    /// seeding. Boot-time invariant violation; the process cannot
    /// continue serving.
    #[error("Configuration row unavailable after seeding")]
    ConfigurationUnavailable,

    /// The queried table holds no rows. Not a failure: min/max callers
    /// resolve this through the "now" fallback, aggregate callers
    /// surface it as an empty-data status.
    #[error("No data available")]
    NoData,
}
