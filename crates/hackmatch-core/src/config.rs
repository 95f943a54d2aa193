//! Application configuration management.
//!
//! Configuration is stored at `~/.config/hackmatch/config.json`. Missing
//! fields take their defaults, and a few can be overridden from the
//! environment (after `.env` has been loaded by the binary).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::guard::DEFAULT_REVALIDATION_DELAY_MS;
use crate::auth::{FileTokenStore, GuardConfig, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "hackmatch";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_URL: &str = "http://localhost:8000";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "HACKMATCH_API_URL";
pub const ENV_TOKEN_STORAGE: &str = "HACKMATCH_TOKEN_STORAGE";
pub const ENV_USERNAME: &str = "HACKMATCH_USERNAME";

/// Where the access/refresh tokens live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    File,
    Keyring,
    /// Forgotten on exit
    Memory,
}

impl TokenStorage {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Some(TokenStorage::File),
            "keyring" | "keychain" => Some(TokenStorage::Keyring),
            "memory" => Some(TokenStorage::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub token_storage: TokenStorage,
    pub request_timeout_secs: u64,
    pub revalidation_delay_ms: u64,
    pub revalidation_demotes: bool,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_storage: TokenStorage::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            revalidation_delay_ms: DEFAULT_REVALIDATION_DELAY_MS,
            revalidation_demotes: true,
            last_username: None,
        }
    }
}

impl Config {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Persist `username` as the last one used. Re-reads the file so that
    /// environment overrides are never written back.
    pub fn remember_username(&mut self, username: &str) -> Result<()> {
        let path = Self::config_path()?;
        let mut stored = Self::load_from(&path)?;
        stored.last_username = Some(username.to_string());
        stored.save_to(&path)?;
        self.last_username = Some(username.to_string());
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Apply environment overrides. `lookup` returns the value of a variable.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TOKEN_STORAGE) {
            match TokenStorage::parse(&raw) {
                Some(storage) => self.token_storage = storage,
                None => warn!(value = %raw, "Ignoring unknown {}", ENV_TOKEN_STORAGE),
            }
        }
        if let Some(username) = lookup(ENV_USERNAME).filter(|v| !v.trim().is_empty()) {
            self.last_username = Some(username);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the token file
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory for log files
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            revalidation_delay: Duration::from_millis(self.revalidation_delay_ms),
            revalidation_demotes: self.revalidation_demotes,
        }
    }

    /// Build the configured token store.
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_storage {
            TokenStorage::File => Arc::new(FileTokenStore::new(&self.data_dir()?)),
            TokenStorage::Keyring => Arc::new(KeyringTokenStore),
            TokenStorage::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }
}
