//! Shared types for the thermolog temperature/humidity monitor.
//!
//! This crate holds the plain data types passed between the sensor
//! capability, the store, and the HTTP service: the runtime
//! [`AppConfig`] and a single sensor [`Reading`].

pub mod types;

pub use types::{AppConfig, Reading};
