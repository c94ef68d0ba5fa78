use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";

/// Settings loaded from `config.toml`; every key is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: BackendSettings,
    pub sync: SyncSettings,
    pub alerts: AlertSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackendSettings {
    /// Root URL of the task backend.
    pub url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Push the full list after every change instead of only to reconcile.
    pub mirror_snapshots: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AlertSettings {
    /// Show reminder toasts.
    pub notifications: bool,
    /// Ring the terminal bell with each reminder.
    pub sound: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        AlertSettings {
            notifications: true,
            sound: true,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// The path is determined in the following order:
    /// 1. `REMINDUST_CONFIG` environment variable.
    /// 2. `~/.config/remindust/config.toml` (on Linux).
    /// 3. `./config.toml` (fallback).
    pub fn default_path() -> PathBuf {
        std::env::var("REMINDUST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
                p.push("remindust");
                p.push("config.toml");
                p
            })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads `explicit` if given (must exist), else the default path if it
    /// exists, else built-in defaults. `REMINDUST_BACKEND` overrides the URL.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Config::default()
                }
            }
        };
        if let Ok(url) = std::env::var("REMINDUST_BACKEND") {
            if !url.trim().is_empty() {
                config.backend.url = url;
            }
        }
        Ok(config)
    }
}
