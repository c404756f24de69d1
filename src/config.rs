//! Application configuration management.
//!
//! The API base URL comes from the `BOOKSHELF_API_BASE` environment
//! variable (a `.env` file is honored), with the config file as fallback.
//! The config file also remembers the last email used to sign in.
//!
//! Configuration is stored at `~/.config/bookshelf-cli/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/storage directory paths
const APP_NAME: &str = "bookshelf-cli";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// File backing the key-value storage adapter
const STORAGE_FILE: &str = "storage.json";

/// Environment variable overriding the API base URL
const API_BASE_ENV: &str = "BOOKSHELF_API_BASE";

/// Where the backend listens by default in development
const DEFAULT_API_BASE: &str = "http://localhost:8080";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Path for the persistent key-value storage (token, user, theme).
    pub fn storage_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(STORAGE_FILE))
    }

    /// Resolve the API base URL: environment first, then config file,
    /// then the development default.
    pub fn api_base(&self) -> String {
        std::env::var(API_BASE_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }
}
