//! Configuration validation logic.

use crate::errors::Error;
use std::path::PathBuf;
use url::Url;

/// Longest timer or timeout accepted, in seconds.
const MAX_TIMEOUT_SECS: u64 = 3600;
/// Accepted QR bitmap widths in pixels.
const QR_WIDTH_RANGE: std::ops::RangeInclusive<u32> = 64..=1024;

/// Validates configuration values.
pub struct ConfigValidator {
    /// Backend base URL.
    pub backend_url: String,
    /// Public origin for passport links.
    pub origin: String,
    /// Local storage directory.
    pub storage_dir: PathBuf,
    /// Named timer durations in seconds.
    pub timeouts: [(&'static str, u64); 5],
    /// QR bitmap width.
    pub qr_width_px: u32,
}

impl ConfigValidator {
    /// Validate all configuration values for correctness and constraints.
    ///
    /// Checks that:
    /// - Backend URL and origin are absolute http(s) URLs
    /// - Every timer is between 1 and 3600 seconds
    /// - QR width is between 64 and 1024 pixels
    /// - Storage directory is not empty
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        validate_http_url("backend_url", &self.backend_url)?;
        validate_http_url("origin", &self.origin)?;
        self.validate_timeouts()?;
        self.validate_qr_width()?;
        self.validate_storage_dir()?;

        Ok(())
    }

    fn validate_timeouts(&self) -> Result<(), Error> {
        for (name, secs) in self.timeouts {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(Error::Config(format!(
                    "Invalid {name}: {secs} (must be between 1 and {MAX_TIMEOUT_SECS})"
                )));
            }
        }
        Ok(())
    }

    fn validate_qr_width(&self) -> Result<(), Error> {
        if !QR_WIDTH_RANGE.contains(&self.qr_width_px) {
            return Err(Error::Config(format!(
                "Invalid qr_width_px: {} (must be between {} and {})",
                self.qr_width_px,
                QR_WIDTH_RANGE.start(),
                QR_WIDTH_RANGE.end()
            )));
        }
        Ok(())
    }

    fn validate_storage_dir(&self) -> Result<(), Error> {
        if self.storage_dir.as_os_str().is_empty() {
            return Err(Error::Config("Storage directory cannot be empty".to_string()));
        }
        Ok(())
    }
}

fn validate_http_url(name: &str, value: &str) -> Result<(), Error> {
    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("Invalid {name} {value:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "Invalid {name} {value:?}: unsupported scheme {other}"
        ))),
    }
}
