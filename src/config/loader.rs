//! Configuration file loading and parsing.

use crate::errors::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration loaded from TOML file.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub backend_url: String,

    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub storage_dir: PathBuf,

    #[serde(default = "default_attract_timeout")]
    pub attract_timeout_secs: u64,

    #[serde(default = "default_reset_timeout")]
    pub reset_timeout_secs: u64,

    #[serde(default = "default_qr_countdown")]
    pub qr_countdown_secs: u64,

    #[serde(default = "default_slide_interval")]
    pub slide_interval_secs: u64,

    #[serde(default = "default_qr_width")]
    pub qr_width_px: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_attract_timeout() -> u64 {
    30
}

fn default_reset_timeout() -> u64 {
    90
}

fn default_qr_countdown() -> u64 {
    30
}

fn default_slide_interval() -> u64 {
    5
}

fn default_qr_width() -> u32 {
    240
}

fn default_request_timeout() -> u64 {
    20
}

/// Location of the user config file.
pub fn default_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_dir = dirs::config_dir().unwrap_or_else(|| home.join(".config"));

    config_dir.join("evol-kiosk/config.toml")
}

/// Load configuration from the user TOML file, if present.
pub fn load_from_file() -> Result<Option<ConfigFile>, Error> {
    load_from_path(&default_config_path())
}

/// Load configuration from `config_path`, if present.
pub fn load_from_path(config_path: &Path) -> Result<Option<ConfigFile>, Error> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(config_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {e}",
            config_path.display()
        ))
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {e}",
            config_path.display()
        ))
    })?;

    Ok(Some(config))
}
