//! Environment variable parsing utilities for configuration.

use crate::errors::Error;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;

/// Parse environment variable value or return error if empty/whitespace.
fn parse_env_string(name: &str, value: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(value.trim().to_string())
}

/// Parse environment variable as a path, expanding tilde.
fn parse_env_path(name: &str, value: &str) -> Result<PathBuf, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(paths::expand_tilde_path(&PathBuf::from(value)))
}

/// Parse environment variable as a number; range checks happen in validation.
fn parse_env_number<T>(name: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid {name} value: {e}")))
}

/// Apply a string override from `name`, if set.
pub fn apply_string_override(name: &str, target: &mut String) -> Result<(), Error> {
    if let Ok(val) = std::env::var(name) {
        *target = parse_env_string(name, &val)?;
    }
    Ok(())
}

/// Apply a path override from `name`, if set.
pub fn apply_path_override(name: &str, target: &mut PathBuf) -> Result<(), Error> {
    if let Ok(val) = std::env::var(name) {
        *target = parse_env_path(name, &val)?;
    }
    Ok(())
}

/// Apply a numeric override from `name`, if set.
pub fn apply_number_override<T>(name: &str, target: &mut T) -> Result<(), Error>
where
    T: FromStr,
    T::Err: Display,
{
    if let Ok(val) = std::env::var(name) {
        *target = parse_env_number(name, &val)?;
    }
    Ok(())
}
