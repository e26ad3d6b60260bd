//! Application settings management

use crate::PathManager;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_HISTORY: usize = 10;
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Application settings stored in settings.toml
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider id used when the caller does not pick one (e.g. "deepseek")
    pub default_provider: Option<String>,
    /// Whether web search starts enabled in interactive hosts
    pub web_search: bool,
    /// Number of exchanges remembered per session
    pub max_history: usize,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_provider: None,
            web_search: false,
            max_history: DEFAULT_MAX_HISTORY,
            server: ServerSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

impl Settings {
    /// Load settings from the settings file, or return defaults if not found
    pub fn load() -> Self {
        match PathManager::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from an explicit path. Missing or unparsable files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };

        let mut settings: Settings = toml::from_str(&content).unwrap_or_default();
        if settings.max_history == 0 {
            settings.max_history = DEFAULT_MAX_HISTORY;
        }
        settings
    }
}
