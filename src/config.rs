//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// External player command; empty means ffplay
    #[serde(default)]
    pub external_player: String,
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_true")]
    pub single_window_mode: bool,
    #[serde(default)]
    pub use_internal_player: bool,
}

fn default_volume() -> u8 { 50 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            external_player: String::new(),
            volume: 50,
            dark_mode: true,
            single_window_mode: true,
            use_internal_player: false,
        }
    }
}

fn app_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("canales");
    fs::create_dir_all(&path).ok();
    path
}

/// Where the channel catalog lives, next to the config file.
pub fn channels_path() -> PathBuf {
    let mut path = app_dir();
    path.push("channels.json");
    path
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = app_dir();
        path.push("config.json");
        path
    }

    pub fn load() -> Self {
        let path = Self::config_path();

        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                if let Ok(config) = serde_json::from_str(&content) {
                    return config;
                }
            }
        }

        Self::default()
    }

    pub fn save(&self) {
        let path = Self::config_path();
        if let Ok(content) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, content);
        }
    }
}
