// User settings
// Loaded from ~/.config/trainrecon/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "trainrecon";

/// Log output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, colored (default)
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// Newline-delimited JSON
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Matching
    #[serde(rename = "recon.fuzzyThreshold")]
    pub fuzzy_threshold: Option<u8>, // None = engine default

    #[serde(rename = "recon.domesticNationality")]
    pub domestic_nationality: Option<String>,

    // Output
    #[serde(rename = "output.directory")]
    pub output_dir: Option<PathBuf>, // None = current directory

    #[serde(rename = "output.format")]
    pub output_format: String,

    // History / tracker
    #[serde(rename = "history.database")]
    pub history_db: Option<PathBuf>,

    #[serde(rename = "tracker.path")]
    pub tracker_path: Option<PathBuf>,

    #[serde(rename = "report.user")]
    pub user: Option<String>,

    // Logging
    #[serde(rename = "log.format")]
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: None,
            domestic_nationality: None,
            output_dir: None,
            output_format: "xlsx".to_string(),
            history_db: None,
            tracker_path: None,
            user: None,
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.json")
    }

    fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read settings file, using defaults");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// History database, defaulting to the platform data directory
    pub fn history_db_path(&self) -> PathBuf {
        self.history_db
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("history.db"))
    }

    /// Tracker file, defaulting to the platform data directory
    pub fn tracker_file_path(&self) -> PathBuf {
        self.tracker_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("tracker.csv"))
    }

    /// Report user, falling back to the login name from the environment
    pub fn effective_user(&self) -> Option<String> {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|u| !u.trim().is_empty())
    }
}
