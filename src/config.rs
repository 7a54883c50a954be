//! Configuration management for the jackpot service
//!
//! Defaults, an optional TOML file, and `JACKPOT_*` environment overrides,
//! validated once at startup.

use crate::errors::{ConfigurationError, JackpotResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Complete service configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JackpotConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ledger: LedgerConfig,
}

/// HTTP listener settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// RocksDB store settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_directory: String,
    /// Wipe the data directory before opening. Tests only.
    pub clear_on_start: bool,
    /// How long settlement waits for a jackpot row lock
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_directory: "./DB/jackpot_data".to_string(),
            clear_on_start: false,
            lock_timeout_ms: 1_000,
        }
    }
}

/// Win ledger query settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub default_page_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { default_page_size: 10 }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> JackpotResult<JackpotConfig> {
        let mut config = match self.config_path {
            Some(ref path) => Self::load_from_file(path)?,
            None => JackpotConfig::default(),
        };

        apply_env_overrides(&mut config, |key| env::var(key).ok())?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(path: &str) -> JackpotResult<JackpotConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        parse_toml(&content)
    }
}

/// Parse a TOML document; missing sections and keys take their defaults
pub fn parse_toml(content: &str) -> JackpotResult<JackpotConfig> {
    toml::from_str(content)
        .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
}

/// Apply `JACKPOT_*` overrides read through `lookup`
pub fn apply_env_overrides<F>(config: &mut JackpotConfig, lookup: F) -> JackpotResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("JACKPOT_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("JACKPOT_PORT") {
        config.server.port = parse_var("JACKPOT_PORT", port, "Invalid port number")?;
    }
    if let Some(dir) = lookup("JACKPOT_DATA_DIR") {
        config.storage.data_directory = dir;
    }
    if let Some(timeout) = lookup("JACKPOT_LOCK_TIMEOUT_MS") {
        config.storage.lock_timeout_ms = parse_var("JACKPOT_LOCK_TIMEOUT_MS", timeout, "Invalid timeout value")?;
    }
    if let Some(size) = lookup("JACKPOT_DEFAULT_PAGE_SIZE") {
        config.ledger.default_page_size = parse_var("JACKPOT_DEFAULT_PAGE_SIZE", size, "Invalid page size")?;
    }

    Ok(())
}

fn parse_var<T: std::str::FromStr>(field: &str, value: String, reason: &str) -> JackpotResult<T> {
    value.parse().map_err(|_| {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: reason.to_string(),
        }
        .into()
    })
}

/// Validate configuration values
pub fn validate(config: &JackpotConfig) -> JackpotResult<()> {
    let invalid = |field: &str, value: String, reason: &str| -> JackpotResult<()> {
        Err(ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: reason.to_string(),
        }
        .into())
    };

    if config.server.port == 0 {
        return invalid("server.port", "0".to_string(), "Port cannot be zero");
    }
    if config.server.request_timeout_secs == 0 {
        return invalid("server.request_timeout_secs", "0".to_string(), "Timeout cannot be zero");
    }
    if config.storage.data_directory.trim().is_empty() {
        return invalid("storage.data_directory", config.storage.data_directory.clone(), "Data directory cannot be empty");
    }
    if config.storage.lock_timeout_ms == 0 {
        return invalid("storage.lock_timeout_ms", "0".to_string(), "Lock timeout cannot be zero");
    }
    if config.ledger.default_page_size == 0 {
        return invalid("ledger.default_page_size", "0".to_string(), "Page size cannot be zero");
    }

    Ok(())
}
