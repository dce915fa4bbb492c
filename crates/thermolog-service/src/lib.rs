//! Sensor poller and HTTP REST API for temperature/humidity logging.
//!
//! This crate provides a service that:
//! - Polls the local temperature/humidity sensor on a configurable interval
//! - Stores readings in the local database
//! - Exposes a REST API for calendar-aware aggregate queries
//! - Keeps a mutable runtime configuration with a change signal the
//!   poller reacts to without restarting the process
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/sensor/all` - Daily averages over the full history
//! - `GET /api/sensor/monthly/{year}/{month}` - One month of daily averages
//! - `GET /api/sensor/weekly/{week}` - One ISO week, gap-filled to 7 days
//! - `GET /api/sensor/daily/{day}/{month}/{year}` - Full-resolution day
//! - `GET /api/sensor/range/{start}/{end}` - Daily averages over a range
//! - `GET /api/sensor/current` - Live out-of-band sensor read
//! - `GET /api/daterange` (+ `/weeks`, `/months`) - Stored data extent
//! - `GET /api/statistics` - Whole-history aggregate statistics
//! - `GET /api/logs`, `DELETE /api/logs`, `DELETE /api/logs/{timestamp}`
//! - `GET /api/config`, `PUT /api/config` - Runtime configuration
//! - `GET /api/dump` - Download the raw database file
//! - `POST /api/poller/start`, `POST /api/poller/stop` - Poller control
//!
//! # Configuration
//!
//! The service reads its server configuration from
//! `~/.config/thermolog/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [storage]
//! path = "~/.local/share/thermolog/data.db"
//! ```
//!
//! The runtime configuration (poll interval, display formats, whether
//! the sensor is used) lives in the database and is mutated over the
//! API; see [`config_cache::ConfigCache`].

pub mod api;
pub mod config;
pub mod config_cache;
pub mod poller;
pub mod state;

pub use config::{Config, ConfigError, ServerConfig, StorageConfig};
pub use config_cache::ConfigCache;
pub use poller::Poller;
pub use state::{AppState, PollerState};
