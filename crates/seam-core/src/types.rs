//! Action attempt records and per-resource error records.
//!
//! An action attempt is the backend's handle for an asynchronous mutating
//! operation (locking a door, programming an access code, ...). Each poll
//! deserializes a fresh [`ActionAttempt`]; nothing here is cached.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::ids::ActionAttemptId;

/// Status literal reported by the API while an attempt is still running.
pub const STATUS_PENDING: &str = "pending";
/// Status literal for a successful attempt.
pub const STATUS_SUCCESS: &str = "success";
/// Status literal for a failed attempt.
pub const STATUS_ERROR: &str = "error";
/// Alternate failure literal emitted by some backend versions.
pub const STATUS_FAILED: &str = "failed";

/// Lifecycle status of an action attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionAttemptStatus {
    /// Still running on the backend
    Pending,
    /// Finished successfully
    Success,
    /// Finished with an error
    Error,
    /// Finished with the `failed` literal
    Failed,
    /// Any literal this client does not know about
    Other(String),
}

impl ActionAttemptStatus {
    /// Returns the wire literal for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Success => STATUS_SUCCESS,
            Self::Error => STATUS_ERROR,
            Self::Failed => STATUS_FAILED,
            Self::Other(raw) => raw,
        }
    }

    /// Returns true while the attempt has not resolved.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl From<String> for ActionAttemptStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            STATUS_PENDING => Self::Pending,
            STATUS_SUCCESS => Self::Success,
            STATUS_ERROR => Self::Error,
            STATUS_FAILED => Self::Failed,
            _ => Self::Other(raw),
        }
    }
}

impl From<ActionAttemptStatus> for String {
    fn from(status: ActionAttemptStatus) -> Self {
        match status {
            ActionAttemptStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ActionAttemptStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for ActionAttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error details attached to a failed action attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionAttemptError {
    /// Short machine-readable code, e.g. `device_offline`. Empty when the
    /// backend omitted it.
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
}

/// Snapshot of an asynchronous backend operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionAttempt {
    /// Backend-assigned identifier.
    pub action_attempt_id: ActionAttemptId,
    /// Current status.
    pub status: ActionAttemptStatus,
    /// Operation tag such as `LOCK_DOOR`.
    #[serde(default)]
    pub action_type: String,
    /// Opaque payload, present once the attempt succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    /// Error details, present once the attempt failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionAttemptError>,
}

impl ActionAttempt {
    /// Build a pending attempt, mostly useful for tests and fixtures.
    #[must_use]
    pub fn pending(id: impl Into<ActionAttemptId>, action_type: impl Into<String>) -> Self {
        Self {
            action_attempt_id: id.into(),
            status: ActionAttemptStatus::Pending,
            action_type: action_type.into(),
            result: None,
            error: None,
        }
    }

    /// Build a successful attempt carrying `result`.
    #[must_use]
    pub fn succeeded(
        id: impl Into<ActionAttemptId>,
        action_type: impl Into<String>,
        result: Map<String, Value>,
    ) -> Self {
        Self {
            status: ActionAttemptStatus::Success,
            result: Some(result),
            ..Self::pending(id, action_type)
        }
    }

    /// Build a failed attempt carrying the backend error.
    #[must_use]
    pub fn failed(
        id: impl Into<ActionAttemptId>,
        action_type: impl Into<String>,
        error_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status: ActionAttemptStatus::Error,
            error: Some(ActionAttemptError {
                error_type: error_type.into(),
                message: message.into(),
            }),
            ..Self::pending(id, action_type)
        }
    }

    /// Returns true while the attempt has not resolved.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Converts a failed attempt into [`Error::ActionAttemptFailed`].
    #[must_use]
    pub fn to_failure(&self) -> Error {
        Error::ActionAttemptFailed {
            action_attempt_id: self.action_attempt_id.to_string(),
            action_type: self.action_type.clone(),
            error_type: self
                .error
                .as_ref()
                .map(|e| e.error_type.clone())
                .filter(|t| !t.is_empty()),
            message: self.error.as_ref().map(|e| e.message.clone()),
        }
    }
}

/// Error record attached to a resource such as an access code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceError {
    /// Machine-readable error code.
    #[serde(alias = "type")]
    pub error_code: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code, self.message)
    }
}
