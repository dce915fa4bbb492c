//! No-op sensor for platforms without hardware support.

use async_trait::async_trait;

use thermolog_types::Reading;

use crate::error::Result;
use crate::traits::Sensor;

/// A sensor that never produces a reading.
///
/// Used on platforms without the IIO driver so the poller and the API
/// keep their shape during development; every read is the transient
/// absent case.
pub struct DummySensor;

#[async_trait]
impl Sensor for DummySensor {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn read(&self) -> Result<Option<Reading>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_is_always_absent() {
        let sensor = DummySensor;
        assert_eq!(sensor.name(), "dummy");
        assert!(sensor.read().await.unwrap().is_none());
        assert!(sensor.read().await.unwrap().is_none());
    }
}
