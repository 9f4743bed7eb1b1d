//! Application configuration loading from config.toml
//!
//! This module loads the marketplace settings from a TOML configuration
//! file and applies environment-variable overrides. All settings have
//! defaults, so a missing config.toml is not an error when loading through
//! [`AppConfig::load`].

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/och_marketplace.sqlite";
const DEFAULT_SLIP_DIR: &str = "data/payment_slips";

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string
    pub database_url: String,
    /// Root directory for stored payment slips
    pub slip_dir: String,
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    storage: StorageSection,
}

/// `[database]` section of config.toml
#[derive(Debug, Deserialize, Default)]
struct DatabaseSection {
    url: Option<String>,
}

/// `[storage]` section of config.toml
#[derive(Debug, Deserialize, Default)]
struct StorageSection {
    slip_dir: Option<String>,
}

impl AppConfig {
    /// Loads configuration from the default location (./config.toml).
    ///
    /// A missing file falls back to defaults; `DATABASE_URL` and
    /// `SLIP_STORAGE_DIR` environment variables override both the file
    /// and the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
                message: format!("Failed to read config file: {e}"),
            })?;
            toml::from_str(&contents).map_err(|e| Error::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            })?
        } else {
            ConfigFile::default()
        };

        Ok(Self::resolve(file))
    }

    fn resolve(file: ConfigFile) -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .or(file.database.url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let slip_dir = std::env::var("SLIP_STORAGE_DIR")
            .ok()
            .or(file.storage.slip_dir)
            .unwrap_or_else(|| DEFAULT_SLIP_DIR.to_string());

        Self {
            database_url,
            slip_dir,
        }
    }
}
