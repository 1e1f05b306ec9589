//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the last used e-mail and the simulated
//! delay of the mock backend.
//!
//! Configuration is stored at `~/.config/conectado/config.json`. The
//! `CONECTADO_API_URL` and `CONECTADO_EMAIL` environment variables override
//! the stored values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/data/cache directory paths
pub const APP_NAME: &str = "conectado";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "CONECTADO_API_URL";
pub const ENV_EMAIL: &str = "CONECTADO_EMAIL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Backend base URL; without one the app runs on the mock backend
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
    /// Mock login delay override in milliseconds
    pub mock_delay_ms: Option<u64>,
}

impl Config {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the config, falling back to defaults (with a warning) on any error
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session (`storage.json`)
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory holding the dashboard cache and log files
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Effective backend URL: environment first, then the config file.
    /// Blank values count as unset.
    pub fn api_base_url(&self) -> Option<String> {
        resolve(std::env::var(ENV_API_URL).ok(), self.api_base_url.clone())
    }

    /// E-mail to prefill the login form with
    pub fn default_email(&self) -> Option<String> {
        resolve(std::env::var(ENV_EMAIL).ok(), self.last_email.clone())
    }

    /// Mock login delay, or `None` for the backend default
    pub fn mock_delay(&self) -> Option<Duration> {
        self.mock_delay_ms.map(Duration::from_millis)
    }
}

fn resolve(env: Option<String>, stored: Option<String>) -> Option<String> {
    env.into_iter()
        .chain(stored)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}
