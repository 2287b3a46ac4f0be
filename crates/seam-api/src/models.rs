//! Data models for Seam resources and request payloads.

use chrono::{DateTime, Utc};
use seam_core::ids::{
    AccessCodeId, ConnectedAccountId, DeviceId, NoiseThresholdId, WebhookId, WorkspaceId,
};
use seam_core::poll::{PollOptions, Watchable};
use seam_core::query::QueryParams;
use seam_core::types::ResourceError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Access code status while the code is being programmed onto the lock.
pub const ACCESS_CODE_STATUS_SETTING: &str = "setting";
/// Access code status once the code is live on the lock.
pub const ACCESS_CODE_STATUS_SET: &str = "set";
/// Access code status when the backend cannot tell what the lock holds.
pub const ACCESS_CODE_STATUS_UNKNOWN: &str = "unknown";

/// Device record, including locks and noise sensors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    /// Device identifier
    pub device_id: DeviceId,
    /// Device type such as `august_lock` or `minut_sensor`
    #[serde(default)]
    pub device_type: Option<String>,
    /// Owning connected account
    #[serde(default)]
    pub connected_account_id: Option<ConnectedAccountId>,
    /// Owning workspace
    #[serde(default)]
    pub workspace_id: Option<WorkspaceId>,
    /// Vendor-reported properties (`name`, `online`, `locked`, ...)
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Free-form location
    #[serde(default)]
    pub location: Option<Value>,
    /// Capabilities such as `lock` or `access_code`
    #[serde(default)]
    pub capabilities_supported: Vec<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Active error records
    #[serde(default)]
    pub errors: Vec<ResourceError>,
    /// Active warning records
    #[serde(default)]
    pub warnings: Vec<ResourceError>,
}

impl Device {
    /// Display name reported by the vendor.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }

    /// Whether the device is reachable.
    #[must_use]
    pub fn is_online(&self) -> Option<bool> {
        self.properties.get("online").and_then(Value::as_bool)
    }

    /// Lock state, for devices that are locks.
    #[must_use]
    pub fn is_locked(&self) -> Option<bool> {
        self.properties.get("locked").and_then(Value::as_bool)
    }
}

/// Access code programmed (or being programmed) onto a lock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessCode {
    /// Access code identifier
    pub access_code_id: AccessCodeId,
    /// Device the code belongs to
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    /// Human-readable name
    #[serde(default)]
    pub name: Option<String>,
    /// The PIN itself; may be empty until the lock reports it
    #[serde(default)]
    pub code: Option<String>,
    /// `ongoing` or `time_bound`
    #[serde(rename = "type", default)]
    pub code_type: Option<String>,
    /// Programming status, e.g. `setting`, `set`, `unknown`
    #[serde(default)]
    pub status: Option<String>,
    /// Start of the validity window
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the validity window
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Key shared by codes created together across devices
    #[serde(default)]
    pub common_code_key: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Active error records
    #[serde(default)]
    pub errors: Vec<ResourceError>,
    /// Active warning records
    #[serde(default)]
    pub warnings: Vec<ResourceError>,
}

impl Watchable for AccessCode {
    fn watch_id(&self) -> &str {
        self.access_code_id.as_str()
    }

    fn has_watched_value(&self) -> bool {
        self.code.as_deref().is_some_and(|code| !code.is_empty())
    }

    fn is_status_unknown(&self) -> bool {
        self.status.as_deref() == Some(ACCESS_CODE_STATUS_UNKNOWN)
    }

    fn watch_errors(&self) -> &[ResourceError] {
        &self.errors
    }
}

/// Third-party account linked to the workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectedAccount {
    /// Connected account identifier
    pub connected_account_id: ConnectedAccountId,
    /// Provider, e.g. `august`
    #[serde(default)]
    pub account_type: Option<String>,
    /// Provider-side identity (email, phone, username)
    #[serde(default)]
    pub user_identifier: Option<Value>,
    /// Caller-supplied metadata
    #[serde(default)]
    pub custom_metadata: Map<String, Value>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Active error records
    #[serde(default)]
    pub errors: Vec<ResourceError>,
    /// Active warning records
    #[serde(default)]
    pub warnings: Vec<ResourceError>,
}

/// Workspace owning the API key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    /// Workspace identifier
    pub workspace_id: WorkspaceId,
    /// Workspace name
    #[serde(default)]
    pub name: Option<String>,
    /// Sandbox workspaces hold fake devices
    #[serde(default)]
    pub is_sandbox: bool,
    /// Partner name shown in Connect Webviews
    #[serde(default)]
    pub connect_partner_name: Option<String>,
}

/// Noise level threshold configured on a noise sensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoiseThreshold {
    /// Noise threshold identifier
    pub noise_threshold_id: NoiseThresholdId,
    /// Sensor the threshold belongs to
    pub device_id: DeviceId,
    /// Human-readable name
    #[serde(default)]
    pub name: Option<String>,
    /// Daily start time, `HH:MM:SS[+TZ]`
    #[serde(default)]
    pub starts_daily_at: Option<String>,
    /// Daily end time, `HH:MM:SS[+TZ]`
    #[serde(default)]
    pub ends_daily_at: Option<String>,
    /// Threshold in decibels
    #[serde(default)]
    pub noise_threshold_decibels: Option<f64>,
    /// Threshold as a Noise Risk Score (Minut sensors)
    #[serde(default)]
    pub noise_threshold_nrs: Option<f64>,
}

/// Webhook endpoint receiving workspace events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Webhook {
    /// Webhook identifier
    pub webhook_id: WebhookId,
    /// Destination URL
    pub url: String,
    /// Subscribed event types; `*` means all
    #[serde(default)]
    pub event_types: Vec<String>,
    /// Signing secret, returned on creation
    #[serde(default)]
    pub secret: Option<String>,
}

/// Thermostat set point in either temperature unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetPoint {
    /// Degrees Celsius
    Celsius(f64),
    /// Degrees Fahrenheit
    Fahrenheit(f64),
}

impl SetPoint {
    /// Payload key and value for a `cooling` or `heating` set point.
    pub(crate) fn field(self, kind: &str) -> (String, f64) {
        match self {
            Self::Celsius(value) => (format!("{kind}_set_point_celsius"), value),
            Self::Fahrenheit(value) => (format!("{kind}_set_point_fahrenheit"), value),
        }
    }
}

/// Thermostat fan mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    /// Run the fan only while heating or cooling
    Auto,
    /// Run the fan continuously
    On,
}

/// How a mutating call treats the action attempt it starts.
#[derive(Debug, Clone, Default)]
pub enum WaitForActionAttempt {
    /// Poll with the client's default options
    #[default]
    Defaults,
    /// Poll with explicit options
    With(PollOptions),
    /// Return the pending attempt without polling
    No,
}

impl From<bool> for WaitForActionAttempt {
    fn from(wait: bool) -> Self {
        if wait {
            Self::Defaults
        } else {
            Self::No
        }
    }
}

impl From<PollOptions> for WaitForActionAttempt {
    fn from(options: PollOptions) -> Self {
        Self::With(options)
    }
}

/// Filters for device and lock listings.
#[derive(Debug, Default, Clone, Serialize, Validate)]
pub struct DeviceListParams {
    /// Only devices of this connected account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_account_id: Option<ConnectedAccountId>,
    /// Only devices of any of these connected accounts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub connected_account_ids: Vec<ConnectedAccountId>,
    /// Only devices of this type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Only devices of any of these types
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_types: Vec<String>,
    /// Only these devices
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub device_ids: Vec<DeviceId>,
    /// Only devices of this manufacturer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Maximum number of devices returned
    #[validate(range(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Only devices created before this timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
}

impl DeviceListParams {
    /// Encode the filters for endpoints read over `GET`.
    pub(crate) fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with_opt("connected_account_id", self.connected_account_id.as_ref())
            .with_list("connected_account_ids", &self.connected_account_ids)
            .with_opt("device_type", self.device_type.as_deref())
            .with_list("device_types", &self.device_types)
            .with_list("device_ids", &self.device_ids)
            .with_opt("manufacturer", self.manufacturer.as_deref())
            .with_opt("limit", self.limit)
            .with_opt("created_before", self.created_before.map(|t| t.to_rfc3339()))
    }
}

/// Payload for `/access_codes/create`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateAccessCodeRequest {
    /// Target lock
    pub device_id: DeviceId,
    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Requested PIN; the backend generates one when absent
    #[validate(length(min = 4, max = 9))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Start of the validity window, RFC 3339 or `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    /// End of the validity window, RFC 3339 or `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
    /// Share a code with other devices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_code_key: Option<String>,
    /// Block until the lock reports the PIN
    #[serde(skip)]
    pub wait_for_code: bool,
}

impl CreateAccessCodeRequest {
    /// Start a request for `device_id`.
    #[must_use]
    pub fn new(device_id: impl Into<DeviceId>) -> Self {
        Self {
            device_id: device_id.into(),
            name: None,
            code: None,
            starts_at: None,
            ends_at: None,
            common_code_key: None,
            wait_for_code: false,
        }
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the PIN.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Make the code time bound.
    #[must_use]
    pub fn with_window(mut self, starts_at: impl Into<String>, ends_at: impl Into<String>) -> Self {
        self.starts_at = Some(starts_at.into());
        self.ends_at = Some(ends_at.into());
        self
    }

    /// Share the code across devices.
    #[must_use]
    pub fn with_common_code_key(mut self, key: impl Into<String>) -> Self {
        self.common_code_key = Some(key.into());
        self
    }

    /// Wait for the lock to report the PIN before returning.
    #[must_use]
    pub const fn wait_for_code(mut self, wait: bool) -> Self {
        self.wait_for_code = wait;
        self
    }
}

/// Payload for `/access_codes/update`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateAccessCodeRequest {
    /// Code to update
    pub access_code_id: AccessCodeId,
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New PIN
    #[validate(length(min = 4, max = 9))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// New start of the validity window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    /// New end of the validity window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
    /// Switch between `ongoing` and `time_bound`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub code_type: Option<String>,
}

impl UpdateAccessCodeRequest {
    /// Start an update for `access_code_id`.
    #[must_use]
    pub fn new(access_code_id: impl Into<AccessCodeId>) -> Self {
        Self {
            access_code_id: access_code_id.into(),
            name: None,
            code: None,
            starts_at: None,
            ends_at: None,
            code_type: None,
        }
    }

    /// Rename the code.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the PIN.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Payload for `/noise_sensors/noise_thresholds/create`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateNoiseThresholdRequest {
    /// Target noise sensor
    pub device_id: DeviceId,
    /// Daily start time
    pub starts_daily_at: String,
    /// Daily end time
    pub ends_daily_at: String,
    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Threshold in decibels
    #[validate(range(min = 0.0, max = 194.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_threshold_decibels: Option<f64>,
    /// Threshold as a Noise Risk Score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_threshold_nrs: Option<f64>,
}

/// Payload for `/webhooks/create`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateWebhookRequest {
    /// Destination URL
    #[validate(url)]
    pub url: String,
    /// Event types to deliver; the backend defaults to all
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub event_types: Vec<String>,
}

impl CreateWebhookRequest {
    /// Subscribe `url` to every event type.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            event_types: Vec::new(),
        }
    }

    /// Restrict delivery to `event_types`.
    #[must_use]
    pub fn with_event_types<I, S>(mut self, event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types = event_types.into_iter().map(Into::into).collect();
        self
    }
}
