//! In-memory cache of the runtime configuration row.
//!
//! The database holds the authoritative configuration (poll interval,
//! display formats, whether the sensor is used); handlers read it on
//! every request through this cache instead of hitting storage. Writes
//! go through [`ConfigCache::update`], which persists the full row and
//! then reloads it from storage, so the cache always reflects what a
//! restart would load.
//!
//! Change notification is separate from the write: the PUT handler
//! persists, restarts or stops the poller, and only then calls
//! [`ConfigCache::signal_changed`]. Subscribers see "changed since I
//! last looked" semantics; a subscriber created after a signal was
//! consumed does not observe it.

use thermolog_store::Store;
use thermolog_types::AppConfig;
use tokio::sync::{RwLock, watch};

/// Shared cache of the runtime configuration plus its change signal.
pub struct ConfigCache {
    current: RwLock<AppConfig>,
    changed_tx: watch::Sender<u64>,
    changed_rx: watch::Receiver<u64>,
}

impl ConfigCache {
    /// Create an empty cache holding defaults. Call
    /// [`ConfigCache::initialize`] before serving.
    pub fn new() -> Self {
        let (changed_tx, changed_rx) = watch::channel(0);
        Self {
            current: RwLock::new(AppConfig::default()),
            changed_tx,
            changed_rx,
        }
    }

    /// Seed the configuration row if absent, then load it into memory.
    ///
    /// The load happens unconditionally so the cache reflects whatever
    /// is actually persisted, not the in-process defaults. Failure here
    /// is fatal at boot.
    pub async fn initialize(&self, store: &Store) -> thermolog_store::Result<()> {
        store.seed_config()?;
        let cfg = store.load_config()?;
        *self.current.write().await = cfg;
        Ok(())
    }

    /// The current configuration, cloned out of the cache. No storage
    /// access.
    pub async fn current(&self) -> AppConfig {
        self.current.read().await.clone()
    }

    /// Persist a full new configuration and reload the cache from
    /// storage.
    ///
    /// Does not fire the change signal; the caller sequences that after
    /// any poller restart (see [`ConfigCache::signal_changed`]).
    pub async fn update(&self, store: &mut Store, cfg: &AppConfig) -> thermolog_store::Result<()> {
        store.save_config(cfg)?;
        let reloaded = store.load_config()?;
        *self.current.write().await = reloaded;
        Ok(())
    }

    /// Fire the change signal. Every live subscriber that has not yet
    /// acknowledged the previous value observes a change.
    pub fn signal_changed(&self) {
        self.changed_tx.send_modify(|epoch| *epoch += 1);
    }

    /// Subscribe to the change signal.
    ///
    /// The receiver starts out acknowledged at the current value, so
    /// only signals fired after subscription are observed.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        let mut rx = self.changed_rx.clone();
        rx.borrow_and_update();
        rx
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new()
    }
}
