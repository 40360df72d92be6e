//! Server configuration
//!
//! Loads settings from built-in defaults, an optional `config.toml`, and
//! `DISKLET_*` environment variables, in that order of precedence.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "config";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the listener to
    pub bind_address: String,

    /// Listener port; 0 picks an ephemeral port
    pub port: u16,

    /// Root directory of the store
    pub root_dir: String,

    /// Optional read-only seed directory consulted when the root lacks a file
    #[serde(default)]
    pub fallback_root: Option<String>,

    /// Maximum concurrent client connections
    pub max_clients: usize,

    /// Maximum request line length in bytes
    pub max_request_length: usize,

    /// Requests one connection may have executing at once
    pub max_in_flight: usize,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Log reads as well as mutations
    pub verbose: bool,
}

impl ServerConfig {
    /// Load configuration from `config.toml` with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from a specific file (missing files are fine)
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DISKLET"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 4242_i64)?
            .set_default("root_dir", "./disklet_root")?
            .set_default("max_clients", 16_i64)?
            .set_default("max_request_length", 16_i64 * 1024 * 1024)?
            .set_default("max_in_flight", 32_i64)?
            .set_default("log_level", "info")?
            .set_default("verbose", false)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.root_dir.trim().is_empty() {
            return Err(ConfigError::Message("root_dir cannot be empty".into()));
        }

        if let Some(fallback) = &self.fallback_root {
            if fallback.trim().is_empty() {
                return Err(ConfigError::Message(
                    "fallback_root cannot be empty when set".into(),
                ));
            }
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_request_length == 0 {
            return Err(ConfigError::Message(
                "max_request_length must be greater than 0".into(),
            ));
        }

        if self.max_in_flight == 0 {
            return Err(ConfigError::Message(
                "max_in_flight must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get store root as PathBuf
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root_dir)
    }

    pub fn fallback_path(&self) -> Option<PathBuf> {
        self.fallback_root.as_ref().map(PathBuf::from)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 4242,
            root_dir: "./disklet_root".to_string(),
            fallback_root: None,
            max_clients: 16,
            max_request_length: 16 * 1024 * 1024,
            max_in_flight: 32,
            log_level: "info".to_string(),
            verbose: false,
        }
    }
}
