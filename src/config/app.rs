//! Application settings file (`config.json` in the platform config dir)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use crate::constants::paths;
use crate::persistence::FileStorage;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Where slice files live; platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Default destination of the `css` command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_output: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
            css_output: None,
        }
    }
}

impl AppConfig {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path.push(paths::CONFIG_FILENAME);
        path
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?;
        config.validate_and_clamp();

        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Replace an unknown log level with the default
    pub fn validate_and_clamp(&mut self) {
        let normalized = self.log_level.trim().to_lowercase();
        if LOG_LEVELS.contains(&normalized.as_str()) {
            self.log_level = normalized;
        } else {
            warn!(log_level = %self.log_level, "unknown log level in config, using info");
            self.log_level = default_log_level();
        }
    }

    /// Storage directory to open
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(FileStorage::default_dir)
    }

    pub fn tracing_level(&self) -> Level {
        parse_level(&self.log_level)
    }
}

/// Map a level name to a tracing level; anything unrecognised is INFO
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
