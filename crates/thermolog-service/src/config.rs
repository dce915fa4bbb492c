//! Server configuration.
//!
//! This is the process-level configuration (bind address, database
//! path) loaded from a TOML file before the database is opened. The
//! runtime configuration that the API mutates lives in the database and
//! is handled by [`crate::config_cache`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to
    /// defaults when no file exists there.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration: the bind address must be host:port
    /// with a nonzero port, and the database path must not be empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bind = &self.server.bind;
        if bind.is_empty() {
            return Err(ConfigError::invalid("server.bind cannot be empty"));
        }
        let Some((_, port)) = bind.rsplit_once(':') else {
            return Err(ConfigError::invalid(format!(
                "invalid bind address '{bind}': expected format 'host:port'"
            )));
        };
        match port.parse::<u16>() {
            Ok(0) => return Err(ConfigError::invalid("server.bind port cannot be 0")),
            Err(_) => {
                return Err(ConfigError::invalid(format!(
                    "invalid port '{port}': must be a number 1-65535"
                )));
            }
            Ok(_) => {}
        }

        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("storage.path cannot be empty"));
        }

        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: thermolog_store::default_db_path(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid(message.into())
    }
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("thermolog")
        .join("server.toml")
}
