//! Platform directories for logs and settings.

use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "research-assistant";
const LOG_FILE: &str = "research.log";
const SETTINGS_FILE: &str = "settings.toml";

pub struct PathManager;

impl PathManager {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// e.g. `~/.local/share/research-assistant` on Linux.
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// e.g. `~/.config/research-assistant` on Linux.
    pub fn config_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn log_file_path() -> Option<PathBuf> {
        Self::data_dir().map(|dir| dir.join("logs").join(LOG_FILE))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(SETTINGS_FILE))
    }
}
