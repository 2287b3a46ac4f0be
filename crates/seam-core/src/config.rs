//! Configuration structures for Seam clients.
//!
//! [`SeamClientConfig`] carries everything needed to talk to the API: the
//! API key (kept in a [`SecretString`]), the base URL, HTTP timeouts and the
//! default cadence for action-attempt and wait-for-code polling.

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use validator::Validate;

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://connect.getseam.com";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SEAM_API_KEY";

/// Environment variable overriding the API URL.
pub const API_URL_ENV: &str = "SEAM_API_URL";

/// Configuration for a Seam client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SeamClientConfig {
    /// API key sent as a bearer token
    #[serde(skip_serializing, deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,

    /// API base URL
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of retry attempts for idempotent requests
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Polling defaults
    #[validate(nested)]
    #[serde(default)]
    pub poll: PollConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl SeamClientConfig {
    /// Create a new client configuration for the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::ConfigError("API key must not be empty".to_string()));
        }

        let config = Self {
            api_key: SecretString::from(api_key),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            poll: PollConfig::default(),
        };
        config.validated()
    }

    /// Build a configuration from `SEAM_API_KEY` and `SEAM_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if `SEAM_API_KEY` is unset or the URL is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the URL is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV).ok_or_else(|| {
            Error::ConfigError(format!(
                "{API_KEY_ENV} not found in environment, and api_key not provided"
            ))
        })?;

        let mut config = Self::new(api_key)?;
        if let Some(url) = lookup(API_URL_ENV) {
            config = config.with_api_url(url).validated()?;
        }
        Ok(config)
    }

    fn validated(self) -> Result<Self, Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        Ok(self)
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set maximum retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set polling defaults.
    #[must_use]
    pub const fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Expose the API key for the transport layer.
    #[must_use]
    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Default cadence and bounds for polling helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PollConfig {
    /// Delay between polls in milliseconds
    #[validate(range(min = 10, max = 10_000))]
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Upper bound for action attempt polling in seconds
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_poll_timeout_secs")]
    pub action_attempt_timeout_secs: u64,

    /// Upper bound for wait-for-code polling in seconds
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_poll_timeout_secs")]
    pub wait_for_code_timeout_secs: u64,
}

const fn default_interval_ms() -> u64 {
    250
}

const fn default_poll_timeout_secs() -> u64 {
    300
}

impl PollConfig {
    /// Create a poll configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            action_attempt_timeout_secs: default_poll_timeout_secs(),
            wait_for_code_timeout_secs: default_poll_timeout_secs(),
        }
    }

    /// Set the interval between polls.
    #[must_use]
    pub const fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the action attempt timeout in seconds.
    #[must_use]
    pub const fn with_action_attempt_timeout(mut self, seconds: u64) -> Self {
        self.action_attempt_timeout_secs = seconds;
        self
    }

    /// Set the wait-for-code timeout in seconds.
    #[must_use]
    pub const fn with_wait_for_code_timeout(mut self, seconds: u64) -> Self {
        self.wait_for_code_timeout_secs = seconds;
        self
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Get the action attempt timeout as a Duration.
    #[must_use]
    pub const fn action_attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.action_attempt_timeout_secs)
    }

    /// Get the wait-for-code timeout as a Duration.
    #[must_use]
    pub const fn wait_for_code_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_for_code_timeout_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}
