//! Sensor capability abstraction for thermolog.
//!
//! The poller and the live-reading endpoint are written against the
//! [`Sensor`] trait rather than a concrete device, so the service runs
//! identically against real hardware, a no-op dummy, and a scripted
//! mock in tests.
//!
//! A read has three outcomes:
//!
//! - `Ok(Some(reading))` — a complete temperature/humidity pair
//! - `Ok(None)` — the device produced no values this time (transient;
//!   callers retry after a short backoff without logging)
//! - `Err(_)` — a hard fault (permission, missing device) that callers
//!   record in the log table
//!
//! # Example
//!
//! ```
//! use thermolog_sensor::{DummySensor, Sensor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sensor = DummySensor;
//!     assert!(sensor.read().await.unwrap().is_none());
//! }
//! ```

mod dht;
mod dummy;
mod error;
mod mock;
mod traits;

pub use dht::DhtSensor;
pub use dummy::DummySensor;
pub use error::{Error, Result};
pub use mock::MockSensor;
pub use traits::Sensor;

use std::sync::Arc;

/// Create the sensor implementation for the current platform.
///
/// Linux hosts get a [`DhtSensor`] bound to the default IIO device
/// directory; everything else gets a [`DummySensor`] so the rest of the
/// service behaves the same during development.
#[must_use]
pub fn create_sensor() -> Arc<dyn Sensor> {
    #[cfg(target_os = "linux")]
    {
        tracing::info!("create_sensor: using DHT sensor at {}", dht::DEFAULT_DEVICE_DIR);
        Arc::new(DhtSensor::new(dht::DEFAULT_DEVICE_DIR))
    }

    #[cfg(not(target_os = "linux"))]
    {
        tracing::info!("create_sensor: no hardware support on this platform, using dummy");
        Arc::new(DummySensor)
    }
}
