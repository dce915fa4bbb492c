//! Error types for thermolog-sensor.

/// Result type for sensor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading a sensor.
///
/// Transient misreads are *not* errors; they surface as `Ok(None)` from
/// [`crate::Sensor::read`]. An `Error` always means a hard fault worth
/// recording in the log table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device reported a hardware-level fault.
    #[error("Sensor hardware fault: {0}")]
    Hardware(String),

    /// The device files could not be accessed (missing driver,
    /// insufficient permissions).
    #[error("Sensor not accessible at {path}: {source}")]
    NotAccessible {
        path: String,
        source: std::io::Error,
    },
}
