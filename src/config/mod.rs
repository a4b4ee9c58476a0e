//! Configuration management for formsmith
//!
//! Handles the ~/.formsmith/ directory structure and config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::DEFAULT_RECENT_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// How many submissions the recent view shows
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// How long a notification stays visible
    #[serde(default = "default_message_ttl_ms")]
    pub message_ttl_ms: u64,
    /// Where exported files are written; defaults to ~/.formsmith/exports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports_dir: Option<PathBuf>,
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_message_ttl_ms() -> u64 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            message_ttl_ms: default_message_ttl_ms(),
            exports_dir: None,
        }
    }
}

impl Config {
    pub fn message_ttl(&self) -> Duration {
        Duration::from_millis(self.message_ttl_ms)
    }
}

/// Returns the path to the formsmith home directory (~/.formsmith)
pub fn formsmith_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".formsmith"))
}

/// Returns paths to all formsmith directories
#[derive(Debug, Clone)]
pub struct FormsmithPaths {
    pub root: PathBuf,
    pub config: PathBuf,
    pub db: PathBuf,
    pub db_file: PathBuf,
    pub exports: PathBuf,
}

impl FormsmithPaths {
    pub fn new() -> Result<Self> {
        Ok(Self::at(formsmith_home()?))
    }

    /// Layout rooted at an explicit directory
    pub fn at(root: PathBuf) -> Self {
        Self {
            config: root.join("config.toml"),
            db: root.join("db"),
            db_file: root.join("db/formsmith.db"),
            exports: root.join("exports"),
            root,
        }
    }

    /// Create all directories if they don't exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root).context("Failed to create formsmith root")?;
        fs::create_dir_all(&self.db).context("Failed to create db directory")?;
        fs::create_dir_all(&self.exports).context("Failed to create exports directory")?;
        Ok(())
    }

    /// Check if formsmith has been initialized
    pub fn is_initialized(&self) -> bool {
        self.config.exists() && self.db_file.exists()
    }

    /// Exports directory, honoring the config override
    pub fn exports_dir(&self, config: &Config) -> PathBuf {
        config
            .exports_dir
            .clone()
            .unwrap_or_else(|| self.exports.clone())
    }

    /// Load configuration from disk, defaults when absent
    pub fn load_config(&self) -> Result<Config> {
        if !self.config.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&self.config).context("Failed to read config.toml")?;
        toml::from_str(&content).context("Failed to parse config.toml")
    }

    /// Save configuration to disk
    pub fn save_config(&self, config: &Config) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config, content).context("Failed to write config.toml")?;
        Ok(())
    }
}
