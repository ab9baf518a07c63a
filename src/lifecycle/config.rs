//! Service configuration.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`ORDER_CACHE_*`, `__` between section and key, e.g.
//!    `ORDER_CACHE_CACHE__TTL_SECS=60`)
//! 2. Configuration file (`order-cache.toml`, optional)
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "order-cache.toml";
pub const ENV_PREFIX: &str = "ORDER_CACHE_";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds. Default: 1800 (30 minutes).
    pub ttl_secs: u64,
    /// Load every stored order into the cache at startup. Default: true.
    pub warm_on_start: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 1800,
            warm_on_start: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Bound on a single store call in milliseconds. Default: 5000.
    pub timeout_ms: u64,
    /// Store actor channel capacity. Default: 32.
    pub buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            buffer_size: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Event channel capacity. Default: 64.
    pub buffer_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { buffer_size: 64 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub store: StoreConfig,
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Loads configuration from `order-cache.toml` in the working directory and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Loads configuration from a specific file and the environment. A missing file is not an
    /// error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string layered over the defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str))
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("cache.ttl_secs", self.cache.ttl_secs),
            ("store.timeout_ms", self.store.timeout_ms),
            ("store.buffer_size", self.store.buffer_size as u64),
            ("ingest.buffer_size", self.ingest.buffer_size as u64),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store.timeout_ms)
    }
}
