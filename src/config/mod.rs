//! Configuration system for evol-kiosk.

mod env_parser;
mod loader;
mod overrides;
mod paths;
mod validation;

#[cfg(test)]
mod tests_utils;
#[cfg(test)]
use tests_utils::ENV_MUTEX;

use crate::errors::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use loader::ConfigFile;

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the recommendation backend (without the `/api` suffix).
    #[serde(default)]
    pub backend_url: String,

    /// Public origin used to build shareable passport links.
    #[serde(default)]
    pub origin: String,

    /// Directory backing the kiosk's durable local storage.
    #[serde(default)]
    pub storage_dir: PathBuf,

    /// Inactivity on the welcome screen before attract mode starts.
    #[serde(default)]
    pub attract_timeout_secs: u64,

    /// Inactivity on any other screen before the flow is reset.
    #[serde(default)]
    pub reset_timeout_secs: u64,

    /// Countdown on the QR screen before restarting.
    #[serde(default)]
    pub qr_countdown_secs: u64,

    /// Time each attract-mode slide stays up.
    #[serde(default)]
    pub slide_interval_secs: u64,

    /// Target QR bitmap width in pixels.
    #[serde(default)]
    pub qr_width_px: u32,

    /// Per-request backend timeout.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        // Use home directory with sensible fallback for systems without HOME
        let home = dirs::home_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        });

        Self {
            backend_url: "http://localhost:8001".to_string(),
            origin: "http://localhost:3000".to_string(),
            storage_dir: home.join(".evol-kiosk").join("storage"),
            attract_timeout_secs: 30,
            reset_timeout_secs: 90,
            qr_countdown_secs: 30,
            slide_interval_secs: 5,
            qr_width_px: 240,
            request_timeout_secs: 20,
        }
    }
}

impl Config {
    /// Load configuration with defaults, the user config file, and environment overrides.
    pub fn load() -> Result<Self, Error> {
        Self::from_file(loader::load_from_file()?)
    }

    /// Load configuration from an explicit TOML file instead of the user config file.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        Self::from_file(loader::load_from_path(path)?)
    }

    fn from_file(file_config: Option<ConfigFile>) -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(mut file) = file_config {
            paths::expand_tilde(&mut file.storage_dir);
            config.merge_from_file(file);
        }

        overrides::apply_env_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) {
        if !file.backend_url.trim().is_empty() {
            self.backend_url = file.backend_url;
        }
        if !file.origin.trim().is_empty() {
            self.origin = file.origin;
        }
        if !file.storage_dir.as_os_str().is_empty() {
            self.storage_dir = file.storage_dir;
        }
        self.attract_timeout_secs = file.attract_timeout_secs;
        self.reset_timeout_secs = file.reset_timeout_secs;
        self.qr_countdown_secs = file.qr_countdown_secs;
        self.slide_interval_secs = file.slide_interval_secs;
        self.qr_width_px = file.qr_width_px;
        self.request_timeout_secs = file.request_timeout_secs;
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), Error> {
        let validator = validation::ConfigValidator {
            backend_url: self.backend_url.clone(),
            origin: self.origin.clone(),
            storage_dir: self.storage_dir.clone(),
            timeouts: [
                ("attract_timeout_secs", self.attract_timeout_secs),
                ("reset_timeout_secs", self.reset_timeout_secs),
                ("qr_countdown_secs", self.qr_countdown_secs),
                ("slide_interval_secs", self.slide_interval_secs),
                ("request_timeout_secs", self.request_timeout_secs),
            ],
            qr_width_px: self.qr_width_px,
        };

        validator.validate()
    }

    /// Ensure the storage directory exists.
    pub fn ensure_directories(&self) -> Result<(), Error> {
        std::fs::create_dir_all(&self.storage_dir).map_err(|e| {
            Error::Config(format!(
                "Failed to create storage directory {}: {e}",
                self.storage_dir.display()
            ))
        })
    }

    pub fn attract_timeout(&self) -> Duration {
        Duration::from_secs(self.attract_timeout_secs)
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }

    pub fn slide_interval(&self) -> Duration {
        Duration::from_secs(self.slide_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cleanup_env_vars() {
        tests_utils::cleanup_env_vars(&overrides::ENV_VARS);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage_dir.ends_with(".evol-kiosk/storage"));
        assert_eq!(config.backend_url, "http://localhost:8001");
        assert_eq!(config.attract_timeout_secs, 30);
        assert_eq!(config.reset_timeout_secs, 90);
        assert_eq!(config.qr_countdown_secs, 30);
        assert_eq!(config.slide_interval_secs, 5);
        assert_eq!(config.qr_width_px, 240);
    }

    #[test]
    fn test_config_load_from_partial_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "origin = \"https://kiosk.evoljewels.com\"").unwrap();
        writeln!(file, "reset_timeout_secs = 60").unwrap();

        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.origin, "https://kiosk.evoljewels.com");
        assert_eq!(config.reset_timeout_secs, 60);
        assert_eq!(config.backend_url, "http://localhost:8001");
        assert_eq!(config.attract_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "qr_width_px = 200").unwrap();
        tests_utils::set_env_var("EVOL_QR_WIDTH_PX", "160");

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.qr_width_px, 160);

        cleanup_env_vars();
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "attract_timeout_secs = 0").unwrap();

        let result = Config::load_from(file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars();

        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.origin, "http://localhost:3000");
    }

    #[test]
    fn test_ensure_directories_creates_storage_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            storage_dir: dir.path().join("nested/storage"),
            ..Config::default()
        };
        config.ensure_directories().unwrap();
        assert!(config.storage_dir.is_dir());
    }
}
