//! Shell settings persisted at `~/.forgemind/config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::output::Theme;
use forgemind_core::ReplyMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Milliseconds a scheduled reply waits before delivery.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    /// Reply mode selected when the shell starts.
    #[serde(default)]
    pub default_mode: ReplyMode,
    /// Color palette selected when the shell starts.
    #[serde(default = "default_theme")]
    pub theme: Theme,
}

fn default_reply_delay_ms() -> u64 {
    800
}

fn default_theme() -> Theme {
    Theme::Dark
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            default_mode: ReplyMode::default(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".forgemind")
            .join("config.yaml")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Reads the config from the default location. A missing or unreadable
    /// file falls back to defaults so the shell always starts.
    pub fn load_or_default() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Ignoring unreadable config at {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }
}
