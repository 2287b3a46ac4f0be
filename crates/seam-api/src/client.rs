//! Asynchronous Seam client implementation.

use crate::access_codes::AccessCodes;
use crate::action_attempts::ActionAttempts;
use crate::connected_accounts::ConnectedAccounts;
use crate::devices::Devices;
use crate::locks::Locks;
use crate::models::WaitForActionAttempt;
use crate::noise_thresholds::NoiseThresholds;
use crate::thermostats::Thermostats;
use crate::webhooks::Webhooks;
use crate::workspaces::Workspaces;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use seam_core::client::{ClientConfig, RetryPolicy, ServiceClient, ServiceClientBuilder};
use seam_core::config::{PollConfig, SeamClientConfig};
use seam_core::ids::ActionAttemptId;
use seam_core::poll::{ActionAttemptFetcher, ActionAttemptPoller, PollOptions};
use seam_core::query::QueryParams;
use seam_core::types::ActionAttempt;
use seam_core::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("seam-api/", env!("CARGO_PKG_VERSION"));

/// Builder for [`SeamClient`].
#[derive(Debug, Clone)]
pub struct SeamClientBuilder {
    inner: ServiceClientBuilder,
    poll: PollConfig,
}

impl SeamClientBuilder {
    /// Create a builder for the production API with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&SeamClientConfig::new(api_key)?)
    }

    /// Create a builder from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a timeout, retry or polling setting is
    /// out of range, or an error if the configured API URL is invalid.
    pub fn from_config(config: &SeamClientConfig) -> Result<Self> {
        config.validate()?;
        let builder = ServiceClientBuilder::new(&config.api_url, config.timeout())?
            .with_user_agent(USER_AGENT)
            .with_bearer_token(config.api_key().clone())
            .with_retry_policy(RetryPolicy::new().with_max_retries(config.max_retries));

        Ok(Self {
            inner: builder,
            poll: config.poll,
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Override the polling defaults.
    #[must_use]
    pub const fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> Result<SeamClient> {
        let inner = self.inner.build()?;
        Ok(SeamClient {
            inner,
            poll: self.poll,
        })
    }
}

/// Asynchronous Seam client.
///
/// Cheap to clone. Resource handles such as [`SeamClient::locks`] borrow it.
#[derive(Debug, Clone)]
pub struct SeamClient {
    inner: ServiceClient,
    poll: PollConfig,
}

impl SeamClient {
    /// Construct a client for the production API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        SeamClientBuilder::new(api_key)?.build()
    }

    /// Construct a client from `SEAM_API_KEY` and `SEAM_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if `SEAM_API_KEY` is unset or the URL is invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&SeamClientConfig::from_env()?)
    }

    /// Construct a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &SeamClientConfig) -> Result<Self> {
        SeamClientBuilder::from_config(config)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Return the polling defaults.
    #[must_use]
    pub const fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Action attempt options derived from the polling defaults.
    #[must_use]
    pub fn poll_options(&self) -> PollOptions {
        PollOptions::from(&self.poll)
    }

    /// Action attempts.
    #[must_use]
    pub const fn action_attempts(&self) -> ActionAttempts<'_> {
        ActionAttempts::new(self)
    }

    /// Access codes.
    #[must_use]
    pub const fn access_codes(&self) -> AccessCodes<'_> {
        AccessCodes::new(self)
    }

    /// Locks.
    #[must_use]
    pub const fn locks(&self) -> Locks<'_> {
        Locks::new(self)
    }

    /// Devices.
    #[must_use]
    pub const fn devices(&self) -> Devices<'_> {
        Devices::new(self)
    }

    /// Connected accounts.
    #[must_use]
    pub const fn connected_accounts(&self) -> ConnectedAccounts<'_> {
        ConnectedAccounts::new(self)
    }

    /// Workspaces.
    #[must_use]
    pub const fn workspaces(&self) -> Workspaces<'_> {
        Workspaces::new(self)
    }

    /// Noise thresholds on noise sensors.
    #[must_use]
    pub const fn noise_thresholds(&self) -> NoiseThresholds<'_> {
        NoiseThresholds::new(self)
    }

    /// Thermostats.
    #[must_use]
    pub const fn thermostats(&self) -> Thermostats<'_> {
        Thermostats::new(self)
    }

    /// Webhooks.
    #[must_use]
    pub const fn webhooks(&self) -> Webhooks<'_> {
        Webhooks::new(self)
    }

    /// Poll `attempt` according to `wait`, or hand it back unpolled.
    pub(crate) async fn settle_action_attempt(
        &self,
        attempt: ActionAttempt,
        wait: WaitForActionAttempt,
    ) -> Result<ActionAttempt> {
        let options = match wait {
            WaitForActionAttempt::No => return Ok(attempt),
            WaitForActionAttempt::Defaults => self.poll_options(),
            WaitForActionAttempt::With(options) => options,
        };

        debug!(
            action_attempt_id = %attempt.action_attempt_id,
            action_type = %attempt.action_type,
            "Waiting for action attempt"
        );
        let settled = ActionAttemptPoller::new(self, options)
            .poll_until_ready(&attempt.action_attempt_id)
            .await;
        if let Err(err) = &settled {
            if err.is_poll_failure() {
                warn!(
                    action_attempt_id = %attempt.action_attempt_id,
                    error_code = err.error_code(),
                    "Action attempt did not succeed"
                );
            }
        }
        settled
    }

    /// `GET` with query parameters, retried on transient failures.
    pub(crate) async fn get_field<T>(
        &self,
        path: &str,
        params: &QueryParams,
        field: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body: Value = self
            .request_json::<()>(Method::GET, path, None, params, true)
            .await?;
        take_field(body, field, path)
    }

    /// Read-only `POST`, retried on transient failures.
    pub(crate) async fn read_field<B, T>(&self, path: &str, body: &B, field: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response: Value = self
            .request_json(Method::POST, path, Some(body), &QueryParams::new(), true)
            .await?;
        take_field(response, field, path)
    }

    /// Mutating `POST`, sent exactly once.
    pub(crate) async fn send_json<B>(&self, path: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.request_json(Method::POST, path, Some(body), &QueryParams::new(), false)
            .await
    }

    /// Mutating `POST` whose response wraps `field`.
    pub(crate) async fn send_field<B, T>(&self, path: &str, body: &B, field: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_json(path, body).await?;
        take_field(response, field, path)
    }

    async fn request_json<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        params: &QueryParams,
        idempotent: bool,
    ) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let customize = |mut request: reqwest::RequestBuilder| {
            request = request.header("Accept", "application/json");
            if let Some(payload) = body {
                request = request.json(payload);
            }
            request
        };

        let response = if idempotent {
            self.inner
                .execute_with_retry(method, path, params.as_pairs(), customize, map_status_to_error)
                .await?
        } else {
            self.inner
                .execute(method, path, params.as_pairs(), customize, map_status_to_error)
                .await?
        };

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| {
            Error::ParseError(format!("Failed to parse Seam response for `{path}`: {err}"))
        })
    }
}

#[async_trait]
impl ActionAttemptFetcher for SeamClient {
    async fn fetch_action_attempt(&self, id: &ActionAttemptId) -> Result<ActionAttempt> {
        let params = QueryParams::new().with("action_attempt_id", id);
        self.get_field("action_attempts/get", &params, "action_attempt")
            .await
    }
}

fn take_field<T>(mut body: Value, field: &str, path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = body
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| Error::ParseError(format!("Missing `{field}` in response for `{path}`")))?;

    serde_json::from_value(value).map_err(|err| {
        Error::ParseError(format!(
            "Failed to parse `{field}` in response for `{path}`: {err}"
        ))
    })
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    message: String,
}

fn map_status_to_error(status: StatusCode, request_id: Option<String>, text: String) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Unauthorized(format!("Seam authentication failed: {text}"))
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => {
            Error::ServiceUnavailable(format!("Seam temporarily unavailable: {text}"))
        }
        status if status.is_server_error() => {
            Error::ServiceUnavailable(format!("Seam server error {status}: {text}"))
        }
        _ => match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => Error::Api {
                status: status.as_u16(),
                request_id,
                error_type: envelope.error.error_type,
                message: envelope.error.message,
            },
            Err(_) => Error::Api {
                status: status.as_u16(),
                request_id,
                error_type: "unknown_error".to_string(),
                message: text,
            },
        },
    }
}
