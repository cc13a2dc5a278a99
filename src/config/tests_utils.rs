//! Shared test utilities for config module tests.

use std::sync::Mutex;

/// Mutex to serialize environment variable tests and prevent race conditions.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Set an environment variable for a config test.
pub fn set_env_var(name: &str, value: &str) {
    // SAFETY: config tests hold ENV_MUTEX while touching the environment.
    unsafe { std::env::set_var(name, value) };
}

/// Clean up environment variables used by evol-kiosk config.
pub fn cleanup_env_vars(vars: &[&str]) {
    for var in vars {
        // SAFETY: config tests hold ENV_MUTEX while touching the environment.
        unsafe { std::env::remove_var(var) };
    }
}
