//! Application configuration management.
//!
//! This module handles loading and saving the user configuration: which
//! catalog endpoint to sync from, where the local store lives, and how
//! photo caching behaves.
//!
//! Configuration is stored at `~/.config/recipecache/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_ENDPOINT;
use crate::sync::DEFAULT_MAX_CONCURRENT_DOWNLOADS;

/// Application name used for config/data directory paths
const APP_NAME: &str = "recipecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Database file name inside the data directory
const DATABASE_FILE: &str = "recipes.db";

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "RECIPECACHE_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub data_dir: Option<PathBuf>,
    pub cache_assets: bool,
    pub max_concurrent_downloads: usize,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            data_dir: None,
            cache_assets: true,
            max_concurrent_downloads: DEFAULT_MAX_CONCURRENT_DOWNLOADS,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load the config file, writing the defaults out first if it is missing
    /// so users have a file to edit.
    pub fn load_or_create() -> Result<Self> {
        Self::load_or_create_at(&Self::config_path()?)
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(DATABASE_FILE))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Replace the endpoint with a non-empty override, e.g. from the environment.
    pub fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        self
    }
}
