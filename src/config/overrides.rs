//! Environment variable overrides for configuration.

use crate::errors::Error;

use super::Config;
use super::env_parser;

#[cfg(test)]
use super::tests_utils::ENV_MUTEX;

pub const ENV_BACKEND_URL: &str = "EVOL_BACKEND_URL";
pub const ENV_ORIGIN: &str = "EVOL_ORIGIN";
pub const ENV_STORAGE_DIR: &str = "EVOL_STORAGE_DIR";
pub const ENV_ATTRACT_TIMEOUT: &str = "EVOL_ATTRACT_TIMEOUT_SECS";
pub const ENV_RESET_TIMEOUT: &str = "EVOL_RESET_TIMEOUT_SECS";
pub const ENV_QR_COUNTDOWN: &str = "EVOL_QR_COUNTDOWN_SECS";
pub const ENV_SLIDE_INTERVAL: &str = "EVOL_SLIDE_INTERVAL_SECS";
pub const ENV_QR_WIDTH: &str = "EVOL_QR_WIDTH_PX";
pub const ENV_REQUEST_TIMEOUT: &str = "EVOL_REQUEST_TIMEOUT_SECS";

/// Every variable read by [`apply_env_overrides`].
#[cfg_attr(not(test), allow(dead_code))]
pub const ENV_VARS: [&str; 9] = [
    ENV_BACKEND_URL,
    ENV_ORIGIN,
    ENV_STORAGE_DIR,
    ENV_ATTRACT_TIMEOUT,
    ENV_RESET_TIMEOUT,
    ENV_QR_COUNTDOWN,
    ENV_SLIDE_INTERVAL,
    ENV_QR_WIDTH,
    ENV_REQUEST_TIMEOUT,
];

/// Apply environment variable overrides to configuration.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), Error> {
    env_parser::apply_string_override(ENV_BACKEND_URL, &mut config.backend_url)?;
    env_parser::apply_string_override(ENV_ORIGIN, &mut config.origin)?;
    env_parser::apply_path_override(ENV_STORAGE_DIR, &mut config.storage_dir)?;
    env_parser::apply_number_override(ENV_ATTRACT_TIMEOUT, &mut config.attract_timeout_secs)?;
    env_parser::apply_number_override(ENV_RESET_TIMEOUT, &mut config.reset_timeout_secs)?;
    env_parser::apply_number_override(ENV_QR_COUNTDOWN, &mut config.qr_countdown_secs)?;
    env_parser::apply_number_override(ENV_SLIDE_INTERVAL, &mut config.slide_interval_secs)?;
    env_parser::apply_number_override(ENV_QR_WIDTH, &mut config.qr_width_px)?;
    env_parser::apply_number_override(ENV_REQUEST_TIMEOUT, &mut config.request_timeout_secs)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests_utils::{cleanup_env_vars, set_env_var};
    use std::path::PathBuf;

    #[test]
    fn test_env_var_overrides_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars(&ENV_VARS);

        set_env_var(ENV_BACKEND_URL, "http://10.1.1.1:8001");
        set_env_var(ENV_ORIGIN, "https://evol.example");
        set_env_var(ENV_STORAGE_DIR, "/var/lib/kiosk");
        set_env_var(ENV_RESET_TIMEOUT, "60");

        let mut config = Config::default();
        apply_env_overrides(&mut config).unwrap();

        assert_eq!(config.backend_url, "http://10.1.1.1:8001");
        assert_eq!(config.origin, "https://evol.example");
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/kiosk"));
        assert_eq!(config.reset_timeout_secs, 60);
        assert_eq!(config.attract_timeout_secs, 30);

        cleanup_env_vars(&ENV_VARS);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars(&ENV_VARS);

        set_env_var(ENV_QR_COUNTDOWN, "thirty");

        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);
        assert!(matches!(result, Err(Error::Config(_))));

        cleanup_env_vars(&ENV_VARS);
    }

    #[test]
    fn test_empty_env_var_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars(&ENV_VARS);

        set_env_var(ENV_STORAGE_DIR, "");

        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);
        assert!(matches!(result, Err(Error::Config(_))));

        cleanup_env_vars(&ENV_VARS);
    }

    #[test]
    fn test_whitespace_env_var_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        cleanup_env_vars(&ENV_VARS);

        set_env_var(ENV_ORIGIN, "   ");

        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);
        assert!(matches!(result, Err(Error::Config(_))));

        cleanup_env_vars(&ENV_VARS);
    }
}
