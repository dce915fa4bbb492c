//! Background sensor poller.
//!
//! One task polls the sensor on the configured interval and appends
//! readings to the store. The loop re-reads the cached runtime
//! configuration every iteration, so interval and format changes take
//! effect without a restart; the configuration change signal cuts any
//! in-progress wait short. Stopping is cooperative: the stop signal is
//! honored at iteration boundaries and during every wait.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use thermolog_sensor::Sensor;
use thermolog_store::timefmt;
use thermolog_types::Reading;

use crate::state::AppState;

/// Backoff after an absent reading or a hard fault before retrying.
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Handle for starting and stopping the background poll task.
pub struct Poller {
    state: Arc<AppState>,
}

impl Poller {
    /// Create a new poller.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start the poll task.
    ///
    /// Returns `false` without side effects when the poller is already
    /// running, no sensor capability exists on this platform, or the
    /// configuration has the sensor disabled.
    pub async fn start(&self) -> bool {
        let Some(sensor) = self.state.sensor.clone() else {
            info!("No sensor capability on this platform; poller not started");
            return false;
        };

        if self.state.poller.is_running() {
            info!("Poller already running");
            return false;
        }

        if !self.state.config.current().await.use_sensor {
            info!("Sensor disabled in configuration; poller not started");
            return false;
        }

        self.state.poller.reset_stop();
        self.state.poller.set_running(true);

        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            poll_loop(state, sensor).await;
        });
        *self.state.poller.task.lock().await = Some(handle);

        true
    }

    /// Stop the poll task and wait for it to finish.
    ///
    /// Returns `false` without side effects when the poller is not
    /// running.
    pub async fn stop(&self) -> bool {
        if !self.state.poller.is_running() {
            info!("Poller not running");
            return false;
        }

        self.state.poller.signal_stop();
        if let Some(handle) = self.state.poller.task.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Poll task panicked: {}", e);
            }
        }

        true
    }

    /// Check if the poll task is running.
    pub fn is_running(&self) -> bool {
        self.state.poller.is_running()
    }
}

/// The poll loop body, one task per service process.
async fn poll_loop(state: Arc<AppState>, sensor: Arc<dyn Sensor>) {
    info!("Poller started using sensor '{}'", sensor.name());

    let mut stop_rx = state.poller.subscribe_stop();
    let mut changes = state.config.subscribe_changes();

    loop {
        if *stop_rx.borrow() {
            break;
        }

        // Fresh configuration every iteration; any signal fired before
        // this read is reflected in it, so consume the pending flag.
        let cfg = state.config.current().await;
        changes.borrow_and_update();

        if !cfg.use_sensor {
            // The flag flipped while we were running. Parked until the
            // configuration changes again or we are stopped.
            tokio::select! {
                _ = stop_rx.changed() => break,
                res = changes.changed() => {
                    if res.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        // Stamp under the current formats before touching the sensor;
        // the stored time is when the measurement was initiated, not
        // when a slow read finished.
        let stamped = timefmt::now_strings(&cfg.dateformat, &cfg.timeformat);

        match sensor.read().await {
            Ok(Some(reading)) => {
                match &stamped {
                    Ok((date, time)) => store_reading(&state, reading, date, time).await,
                    Err(e) => {
                        error!("Cannot format timestamp under configured formats: {}", e);
                    }
                }

                let interval = Duration::from_secs(cfg.sensor_interval.max(1));
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = changes.changed() => {}
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            Ok(None) => {
                // Transient: the sensor had no value ready. Retry soon,
                // nothing worth logging to the persistent error log.
                debug!("Sensor returned no reading, retrying shortly");
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = tokio::time::sleep(RETRY_BACKOFF) => {}
                }
            }
            Err(e) => {
                warn!("Sensor read failed: {}", e);
                match &stamped {
                    Ok((date, time)) => log_fault(&state, &e.to_string(), date, time).await,
                    Err(fmt_err) => {
                        error!("Cannot format fault timestamp: {}", fmt_err);
                    }
                }
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = tokio::time::sleep(RETRY_BACKOFF) => {}
                }
            }
        }
    }

    state.poller.set_running(false);
    info!("Poller stopped");
}

/// Persist one successful reading under its pre-captured timestamp.
async fn store_reading(state: &AppState, reading: Reading, date: &str, time: &str) {
    let store = state.store.lock().await;
    match store.insert_reading(reading.temperature, reading.humidity, date, time) {
        Ok(()) => debug!(
            "Stored reading {:.1}°C / {:.1}% at {} {}",
            reading.temperature, reading.humidity, date, time
        ),
        Err(e) => error!("Failed to store reading: {}", e),
    }
}

/// Record a hard sensor fault in the persistent error log.
async fn log_fault(state: &AppState, message: &str, date: &str, time: &str) {
    let store = state.store.lock().await;
    if let Err(e) = store.append_log(message, &format!("{date} {time}")) {
        error!("Failed to record sensor fault: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use thermolog_sensor::MockSensor;
    use thermolog_store::Store;

    use crate::config::Config;

    async fn create_test_state(sensor: Option<Arc<dyn Sensor>>) -> Arc<AppState> {
        let store = Store::open_in_memory().unwrap();
        let state = AppState::new(store, PathBuf::from(":memory:"), Config::default(), sensor);
        {
            let store = state.store.lock().await;
            state.config.initialize(&store).await.unwrap();
        }
        state
    }

    #[tokio::test]
    async fn test_start_without_sensor_is_noop() {
        let state = create_test_state(None).await;
        let poller = Poller::new(state);

        assert!(!poller.start().await);
        assert!(!poller.is_running());
    }

    #[tokio::test]
    async fn test_stop_when_not_running_is_noop() {
        let state = create_test_state(None).await;
        let poller = Poller::new(state);

        assert!(!poller.stop().await);
    }

    #[tokio::test]
    async fn test_double_start_is_noop() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::steady(21.0, 50.0));
        let state = create_test_state(Some(sensor)).await;
        let poller = Poller::new(Arc::clone(&state));

        assert!(poller.start().await);
        assert!(!poller.start().await);

        assert!(poller.stop().await);
    }

    #[tokio::test]
    async fn test_successful_reading_is_stored() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::steady(21.5, 48.0));
        let state = create_test_state(Some(sensor)).await;
        let poller = Poller::new(Arc::clone(&state));

        assert!(poller.start().await);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(poller.stop().await);

        let store = state.store.lock().await;
        let readings = store.all_readings().unwrap();
        assert_eq!(readings.len(), 1);
        assert!((readings[0].temperature - 21.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_hard_fault_appends_log() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::new().then_fault("device not ready"));
        let state = create_test_state(Some(sensor)).await;
        let poller = Poller::new(Arc::clone(&state));

        assert!(poller.start().await);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(poller.stop().await);

        let store = state.store.lock().await;
        let logs = store.all_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].message.contains("device not ready"));
        // Log timestamps carry both date and time.
        assert!(logs[0].timestamp.contains(' '));
    }

    #[tokio::test]
    async fn test_absent_reading_is_not_logged() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::new().then_absent());
        let state = create_test_state(Some(sensor)).await;
        let poller = Poller::new(Arc::clone(&state));

        assert!(poller.start().await);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(poller.stop().await);

        let store = state.store.lock().await;
        assert!(store.all_readings().unwrap().is_empty());
        assert!(store.all_logs().unwrap().is_empty());
    }

    async fn set_use_sensor(state: &AppState, enabled: bool) {
        let mut store = state.store.lock().await;
        let mut cfg = state.config.current().await;
        cfg.use_sensor = enabled;
        state.config.update(&mut store, &cfg).await.unwrap();
    }

    #[tokio::test]
    async fn test_start_with_sensor_disabled_is_noop() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::steady(21.0, 50.0));
        let state = create_test_state(Some(sensor)).await;
        set_use_sensor(&state, false).await;

        let poller = Poller::new(Arc::clone(&state));
        assert!(!poller.start().await);
        assert!(!poller.is_running());

        let store = state.store.lock().await;
        assert!(store.all_readings().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loop_parks_when_sensor_disabled_mid_run() {
        let mock = Arc::new(MockSensor::steady(19.0, 55.0));
        let sensor: Arc<dyn Sensor> = mock.clone();
        let state = create_test_state(Some(sensor)).await;

        let poller = Poller::new(Arc::clone(&state));
        assert!(poller.start().await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mock.read_count(), 1);

        // Disable mid-run without stopping: the loop must park.
        set_use_sensor(&state, false).await;
        state.config.signal_changed();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(mock.read_count(), 1);
        assert!(poller.is_running());

        // Re-enable: the parked loop resumes and reads again.
        set_use_sensor(&state, true).await;
        state.config.signal_changed();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(mock.read_count(), 2);

        assert!(poller.stop().await);
    }

    #[tokio::test]
    async fn test_timestamps_use_configured_formats() {
        let sensor: Arc<dyn Sensor> = Arc::new(MockSensor::steady(22.0, 47.0));
        let state = create_test_state(Some(sensor)).await;

        // Shrink the formats before starting; the stored strings must
        // follow them.
        {
            let mut store = state.store.lock().await;
            let mut cfg = state.config.current().await;
            cfg.dateformat = "[year]".to_string();
            cfg.timeformat = "[hour]".to_string();
            state.config.update(&mut store, &cfg).await.unwrap();
        }

        let poller = Poller::new(Arc::clone(&state));
        assert!(poller.start().await);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(poller.stop().await);

        let store = state.store.lock().await;
        let readings = store.all_readings().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].date.len(), 4);
    }
}
