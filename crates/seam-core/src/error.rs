//! Error types for Seam operations.
//!
//! Transport failures (non-2xx responses, malformed bodies, connection
//! problems) and the synthetic polling failures share one enum so callers can
//! match on the exact kind without downcasting.

use crate::types::{ActionAttemptStatus, ResourceError};
use std::time::Duration;
use thiserror::Error;

/// Main error type for Seam operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The API answered with a non-success status and a structured error body.
    #[error("Seam API error {status} ({error_type}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Value of the `seam-request-id` response header
        request_id: Option<String>,
        /// Backend error code (`error.type`)
        error_type: String,
        /// Backend error message (`error.message`)
        message: String,
    },

    /// Authentication or authorization was rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Seam is unavailable or rate limiting
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The HTTP request itself timed out
    #[error("Request timed out: {0}")]
    RequestTimeout(String),

    /// Failed to parse an API response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Request parameters were rejected before anything was sent
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A polled resource did not reach a terminal state in time.
    #[error(
        "Timed out after {elapsed:?} (limit {timeout:?}) waiting for {resource_id}; last status: {last_status}"
    )]
    Timeout {
        /// Id of the polled resource
        resource_id: String,
        /// Status observed on the final poll
        last_status: ActionAttemptStatus,
        /// Time spent polling
        elapsed: Duration,
        /// Configured upper bound
        timeout: Duration,
    },

    /// The action attempt finished with an error reported by the backend.
    #[error(
        "Action attempt {action_attempt_id} ({action_type}) failed: {}: {}",
        .error_type.as_deref().unwrap_or("unknown_error"),
        .message.as_deref().unwrap_or("no message")
    )]
    ActionAttemptFailed {
        /// Id of the failed action attempt
        action_attempt_id: String,
        /// Kind of action, e.g. `LOCK_DOOR`
        action_type: String,
        /// Backend error code
        error_type: Option<String>,
        /// Backend error message
        message: Option<String>,
    },

    /// Waiting for a field on a resource was aborted.
    #[error("Gave up waiting on {resource_id}: {reason}")]
    ConditionalWaitFailed {
        /// Id of the watched resource
        resource_id: String,
        /// Human-readable reason
        reason: String,
        /// Error records reported on the resource
        errors: Vec<ResourceError>,
    },

    /// Polling was cancelled by the caller.
    #[error("Polling cancelled for {resource_id}")]
    Cancelled {
        /// Id of the polled resource
        resource_id: String,
    },
}

/// Specialized result type for Seam operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api { .. } => "API_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::RequestTimeout(_) => "REQUEST_TIMEOUT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::ActionAttemptFailed { .. } => "ACTION_ATTEMPT_FAILED",
            Self::ConditionalWaitFailed { .. } => "CONDITIONAL_WAIT_FAILED",
            Self::Cancelled { .. } => "CANCELLED",
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_) | Self::ParseError(_) | Self::Unauthorized(_)
        )
    }

    /// Returns true for transient transport failures worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::RequestTimeout(_) | Self::HttpError(_)
        )
    }

    /// Returns true for errors produced by the polling helpers rather than the transport.
    #[must_use]
    pub const fn is_poll_failure(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::ActionAttemptFailed { .. }
                | Self::ConditionalWaitFailed { .. }
                | Self::Cancelled { .. }
        )
    }

    /// Request id attached by the API, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::Api {
                status: 400,
                request_id: None,
                error_type: "invalid_input".to_string(),
                message: "bad".to_string(),
            }
            .error_code(),
            "API_ERROR"
        );
        assert_eq!(
            Error::Unauthorized("test".to_string()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            Error::ServiceUnavailable("test".to_string()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(
            Error::RequestTimeout("test".to_string()).error_code(),
            "REQUEST_TIMEOUT"
        );
        assert_eq!(
            Error::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::Timeout {
                resource_id: "aa_1".to_string(),
                last_status: ActionAttemptStatus::Pending,
                elapsed: Duration::from_secs(2),
                timeout: Duration::from_secs(1),
            }
            .error_code(),
            "TIMEOUT"
        );
        assert_eq!(
            Error::ActionAttemptFailed {
                action_attempt_id: "aa_1".to_string(),
                action_type: "LOCK_DOOR".to_string(),
                error_type: None,
                message: None,
            }
            .error_code(),
            "ACTION_ATTEMPT_FAILED"
        );
        assert_eq!(
            Error::ConditionalWaitFailed {
                resource_id: "ac_1".to_string(),
                reason: "status unknown".to_string(),
                errors: Vec::new(),
            }
            .error_code(),
            "CONDITIONAL_WAIT_FAILED"
        );
        assert_eq!(
            Error::Cancelled {
                resource_id: "aa_1".to_string()
            }
            .error_code(),
            "CANCELLED"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 404,
            request_id: Some("req-1".to_string()),
            error_type: "device_not_found".to_string(),
            message: "Device not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Seam API error 404 (device_not_found): Device not found"
        );
        assert_eq!(err.request_id(), Some("req-1"));
    }

    #[test]
    fn test_action_attempt_failed_display() {
        let err = Error::ActionAttemptFailed {
            action_attempt_id: "aa_1".to_string(),
            action_type: "UNLOCK_DOOR".to_string(),
            error_type: Some("device_offline".to_string()),
            message: Some("Device is offline".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Action attempt aa_1 (UNLOCK_DOOR) failed: device_offline: Device is offline"
        );

        let bare = Error::ActionAttemptFailed {
            action_attempt_id: "aa_2".to_string(),
            action_type: "LOCK_DOOR".to_string(),
            error_type: None,
            message: None,
        };
        assert_eq!(
            bare.to_string(),
            "Action attempt aa_2 (LOCK_DOOR) failed: unknown_error: no message"
        );
    }

    #[test]
    fn test_should_log() {
        assert!(Error::ConfigError("test".to_string()).should_log());
        assert!(Error::ParseError("test".to_string()).should_log());
        assert!(!Error::ValidationError("test".to_string()).should_log());
        assert!(!Error::HttpError("test".to_string()).should_log());
    }

    #[test]
    fn test_retryable_and_poll_classification() {
        assert!(Error::ServiceUnavailable("x".to_string()).is_retryable());
        assert!(Error::RequestTimeout("x".to_string()).is_retryable());
        assert!(!Error::Unauthorized("x".to_string()).is_retryable());

        let timeout = Error::Timeout {
            resource_id: "aa_1".to_string(),
            last_status: ActionAttemptStatus::Pending,
            elapsed: Duration::from_secs(5),
            timeout: Duration::from_secs(4),
        };
        assert!(timeout.is_poll_failure());
        assert!(!timeout.is_retryable());
        assert!(!Error::HttpError("x".to_string()).is_poll_failure());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let seam_err: Error = err.into();
        assert!(matches!(seam_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let seam_err: Error = err.into();
        assert!(matches!(seam_err, Error::ParseError(_)));
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::HttpError("test".to_string());
        let err2 = Error::HttpError("test".to_string());
        let err3 = Error::HttpError("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
