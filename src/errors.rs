//! Error types for evol-kiosk.

use thiserror::Error;

/// Main error type for evol-kiosk operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend error {status}: {message}")]
    Backend { status: u16, message: String },

    /// Requested session or resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local storage read/write failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// QR encoding failure.
    #[error("QR encoding error: {0}")]
    Qr(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Path does not name a known route.
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    /// Continue was attempted on a survey step with no selection.
    #[error("A {0} must be selected before continuing")]
    SelectionRequired(&'static str),

    /// Action is not available in the current flow state.
    #[error("Cannot {action} from the {state} screen")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    /// A survey submission is already outstanding.
    #[error("A recommendation request is already in flight")]
    SubmissionInFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = Error::Backend {
            status: 404,
            message: "Session not found".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("404"));
        assert!(msg.contains("Session not found"));
    }

    #[test]
    fn test_transition_error_display() {
        let err = Error::InvalidTransition {
            state: "welcome",
            action: "go back",
        };
        assert_eq!(err.to_string(), "Cannot go back from the welcome screen");
    }

    #[test]
    fn test_selection_required_display() {
        let err = Error::SelectionRequired("metal");
        assert!(err.to_string().contains("metal"));
    }
}
