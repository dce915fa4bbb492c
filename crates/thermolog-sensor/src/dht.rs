//! Hardware-backed sensor reading a DHT-class device through the Linux
//! IIO sysfs interface.
//!
//! The kernel `dht11` driver (which also covers DHT22/AM2302 parts)
//! exposes two files under `/sys/bus/iio/devices/iio:deviceN/`:
//! `in_temp_input` in millidegrees Celsius and
//! `in_humidityrelative_input` in milli-percent. Reads occasionally
//! fail with EIO when the one-wire timing is missed; that is the
//! transient absent-reading case, not a fault.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use thermolog_types::Reading;

use crate::error::{Error, Result};
use crate::traits::Sensor;

/// Default IIO device directory for the first registered DHT sensor.
pub const DEFAULT_DEVICE_DIR: &str = "/sys/bus/iio/devices/iio:device0";

/// A DHT-class temperature/humidity sensor behind the Linux IIO layer.
pub struct DhtSensor {
    temp_path: PathBuf,
    humidity_path: PathBuf,
    device_dir: String,
}

impl DhtSensor {
    /// Create a sensor bound to an IIO device directory.
    pub fn new<P: AsRef<Path>>(device_dir: P) -> Self {
        let dir = device_dir.as_ref();
        Self {
            temp_path: dir.join("in_temp_input"),
            humidity_path: dir.join("in_humidityrelative_input"),
            device_dir: dir.display().to_string(),
        }
    }

    /// Read one milli-unit value file.
    ///
    /// `Ok(None)` means the driver momentarily had no sample (EIO or
    /// garbage content); `Err` means the file itself is unusable.
    async fn read_milli(&self, path: &Path) -> Result<Option<f64>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => match content.trim().parse::<i64>() {
                Ok(milli) => Ok(Some(milli as f64 / 1000.0)),
                Err(_) => {
                    debug!("unparsable sensor value in {}: {:?}", path.display(), content.trim());
                    Ok(None)
                }
            },
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                Err(Error::NotAccessible {
                    path: path.display().to_string(),
                    source: e,
                })
            }
            // EIO / EAGAIN: the bit-banged protocol missed its timing
            // window, the next attempt usually succeeds.
            Err(e) => {
                debug!("transient read failure on {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl Sensor for DhtSensor {
    fn name(&self) -> &str {
        "dht"
    }

    async fn read(&self) -> Result<Option<Reading>> {
        let temperature = self.read_milli(&self.temp_path).await?;
        let humidity = self.read_milli(&self.humidity_path).await?;

        // Both values or nothing: a half-read is treated as absent.
        match (temperature, humidity) {
            (Some(t), Some(h)) => {
                debug!("read {}: {:.1} C, {:.1} %", self.device_dir, t, h);
                Ok(Some(Reading::new(t, h)))
            }
            _ => Ok(None),
        }
    }
}
