//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use thermolog_sensor::Sensor;
use thermolog_store::Store;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::config_cache::ConfigCache;

/// Shared application state.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Path of the open database file, for the dump endpoint.
    pub db_path: PathBuf,
    /// Process-level server settings.
    pub settings: Config,
    /// Cached runtime configuration plus its change signal.
    pub config: ConfigCache,
    /// Poller control state.
    pub poller: PollerState,
    /// The sensor capability, if one exists on this platform.
    pub sensor: Option<Arc<dyn Sensor>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        store: Store,
        db_path: PathBuf,
        settings: Config,
        sensor: Option<Arc<dyn Sensor>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            db_path,
            settings,
            config: ConfigCache::new(),
            poller: PollerState::new(),
            sensor,
        })
    }
}

/// State for tracking and controlling the poller task.
pub struct PollerState {
    /// Whether the poller is currently running.
    running: AtomicBool,
    /// When the poller was started (Unix timestamp).
    started_at: AtomicU64,
    /// Channel to signal the poll loop to stop.
    stop_tx: watch::Sender<bool>,
    /// Receiver for the stop signal (cloned by the poll loop).
    stop_rx: watch::Receiver<bool>,
    /// Handle of the running poll task, held so stop can await it.
    pub(crate) task: Mutex<Option<JoinHandle<()>>>,
}

impl PollerState {
    /// Create a new poller state.
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            running: AtomicBool::new(false),
            started_at: AtomicU64::new(0),
            stop_tx,
            stop_rx,
            task: Mutex::new(None),
        }
    }

    /// Check if the poller is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the poller as started or stopped.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if running {
            let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
            self.started_at.store(now, Ordering::SeqCst);
        }
    }

    /// Get the poller start time.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        let ts = self.started_at.load(Ordering::SeqCst);
        if ts == 0 {
            None
        } else {
            OffsetDateTime::from_unix_timestamp(ts as i64).ok()
        }
    }

    /// Get a receiver for the stop signal.
    pub fn subscribe_stop(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal the poll loop to stop.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
        self.running.store(false, Ordering::SeqCst);
    }

    /// Reset the stop signal (for restarting).
    pub fn reset_stop(&self) {
        let _ = self.stop_tx.send(false);
    }
}

impl Default for PollerState {
    fn default() -> Self {
        Self::new()
    }
}
