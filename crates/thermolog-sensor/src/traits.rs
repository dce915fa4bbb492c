//! The sensor capability trait.

use async_trait::async_trait;

use thermolog_types::Reading;

use crate::error::Result;

/// Trait abstracting the single sensor operation the service needs.
///
/// Implementations must be cheap to share (`Arc<dyn Sensor>`): the
/// poll loop and the on-demand live-reading endpoint use the same
/// instance concurrently, and `read` must not keep state that would
/// make those calls interfere with each other.
#[async_trait]
pub trait Sensor: Send + Sync {
    /// A short name for log messages ("dht", "dummy", ...).
    fn name(&self) -> &str;

    /// Take one measurement.
    ///
    /// Returns `Ok(None)` when the device produced no values this time
    /// (a transient condition the caller should retry shortly), and an
    /// error only for hard faults.
    async fn read(&self) -> Result<Option<Reading>>;
}
