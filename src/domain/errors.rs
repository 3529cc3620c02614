//! Domain error types
//!
//! This module defines the error hierarchy for covharvest. All errors are
//! domain-specific and don't expose third-party types.
//!
//! Recoverable per-shape conditions (a rejected parameter shape, an endpoint
//! that does not serve a document family) are not errors; they are reported as
//! [`crate::core::resolve::ShapeOutcome`] values by the resolver.

use thiserror::Error;

/// Maximum number of characters of a server message carried inside an error
pub const MAX_SERVER_MESSAGE_CHARS: usize = 120;

/// Main covharvest error type
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Configuration-related errors; fatal before any fetching begins
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Coverage API errors surfaced by the transport
    #[error("Coverage API error: {0}")]
    CoverageApi(#[from] CoverageApiError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Output table errors
    #[error("Output error: {0}")]
    Output(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl HarvestError {
    /// True when the error is a configuration problem that must abort a run
    pub fn is_configuration(&self) -> bool {
        matches!(self, HarvestError::Configuration(_))
    }
}

/// Coverage API errors
///
/// Errors that survive the transport's own recovery (token refresh, bounded
/// retries). These don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum CoverageApiError {
    /// Failed to connect to the API
    #[error("Failed to connect to coverage API: {0}")]
    ConnectionFailed(String),

    /// Request timed out on the final attempt
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 429/5xx/timeout that exhausted the retry budget
    #[error("Transient failure after retries (status {}): {message}", status_label(.status))]
    TransientFailure {
        status: Option<u16>,
        message: String,
    },

    /// 401/403 that persisted after one token refresh and one retry
    #[error("Authentication failed (status {status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    /// Non-success status with no recovery for the caller
    #[error("Request to {path} rejected (status {status}): {message}")]
    Rejected {
        path: String,
        status: u16,
        message: String,
    },

    /// Response body could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// License agreement endpoint did not respond usefully
    #[error("License agreement unavailable: {0}")]
    LicenseUnavailable(String),
}

impl CoverageApiError {
    /// Build a transient failure, truncating the server message
    pub fn transient(status: Option<u16>, message: impl AsRef<str>) -> Self {
        CoverageApiError::TransientFailure {
            status,
            message: truncate_message(message.as_ref()),
        }
    }

    /// Build an authentication failure, truncating the server message
    pub fn authentication(status: u16, message: impl AsRef<str>) -> Self {
        CoverageApiError::AuthenticationFailed {
            status,
            message: truncate_message(message.as_ref()),
        }
    }

    /// Build a rejection for `path`, truncating the server message
    pub fn rejected(path: &str, status: u16, message: impl AsRef<str>) -> Self {
        CoverageApiError::Rejected {
            path: path.to_string(),
            status,
            message: truncate_message(message.as_ref()),
        }
    }

    /// Last HTTP status observed, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            CoverageApiError::TransientFailure { status, .. } => *status,
            CoverageApiError::AuthenticationFailed { status, .. }
            | CoverageApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

/// Truncate a server message to [`MAX_SERVER_MESSAGE_CHARS`] characters
pub fn truncate_message(message: &str) -> String {
    message.chars().take(MAX_SERVER_MESSAGE_CHARS).collect()
}

// Conversion from std::io::Error
impl From<std::io::Error> for HarvestError {
    fn from(err: std::io::Error) -> Self {
        HarvestError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HarvestError {
    fn from(err: serde_json::Error) -> Self {
        HarvestError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HarvestError {
    fn from(err: toml::de::Error) -> Self {
        HarvestError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for HarvestError {
    fn from(err: csv::Error) -> Self {
        HarvestError::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_error_display() {
        let err = HarvestError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_coverage_api_error_conversion() {
        let api_err = CoverageApiError::ConnectionFailed("Network error".to_string());
        let err: HarvestError = api_err.into();
        assert!(matches!(err, HarvestError::CoverageApi(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_transient_failure_truncates_message() {
        let long = "x".repeat(500);
        let err = CoverageApiError::transient(Some(503), &long);
        match &err {
            CoverageApiError::TransientFailure { status, message } => {
                assert_eq!(*status, Some(503));
                assert_eq!(message.chars().count(), MAX_SERVER_MESSAGE_CHARS);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_transient_failure_without_status_display() {
        let err = CoverageApiError::transient(None, "timed out");
        assert_eq!(
            err.to_string(),
            "Transient failure after retries (status none): timed out"
        );
    }

    #[test]
    fn test_authentication_failure_display() {
        let err = CoverageApiError::authentication(403, "forbidden");
        assert_eq!(err.to_string(), "Authentication failed (status 403): forbidden");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_truncate_message_respects_char_boundaries() {
        let msg = "é".repeat(200);
        let truncated = truncate_message(&msg);
        assert_eq!(truncated.chars().count(), MAX_SERVER_MESSAGE_CHARS);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: HarvestError = io_err.into();
        assert!(matches!(err, HarvestError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: HarvestError = json_err.into();
        assert!(matches!(err, HarvestError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: HarvestError = toml_err.into();
        assert!(matches!(err, HarvestError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
