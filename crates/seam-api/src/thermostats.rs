//! Thermostat lookup and climate actions.

use seam_core::query::QueryParams;
use seam_core::types::ActionAttempt;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::client::SeamClient;
use crate::models::{Device, DeviceListParams, FanMode, SetPoint, WaitForActionAttempt};
use crate::resource::ResourceRef;
use crate::Result;

/// Handle for `/thermostats/*`.
#[derive(Clone, Copy)]
pub struct Thermostats<'a> {
    client: &'a SeamClient,
}

impl<'a> Thermostats<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List thermostats matching `params`.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport or API error.
    pub async fn list(&self, params: &DeviceListParams) -> Result<Vec<Device>> {
        params.validate()?;
        self.client
            .get_field("thermostats/list", &params.to_query(), "thermostats")
            .await
    }

    /// Fetch a thermostat by id or record.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(&self, device: impl Into<ResourceRef<'r, Device>>) -> Result<Device> {
        let params = QueryParams::new().with("device_id", device.into().to_id());
        self.client
            .get_field("thermostats/get", &params, "thermostat")
            .await
    }

    /// Fetch a thermostat by its display name.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get_by_name(&self, name: &str) -> Result<Device> {
        let params = QueryParams::new().with("name", name);
        self.client
            .get_field("thermostats/get", &params, "thermostat")
            .await
    }

    /// Switch to cooling, optionally with a new cooling set point.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn cool<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        cooling: Option<SetPoint>,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        let body = climate_body(device.into(), None, cooling);
        self.climate_action("thermostats/cool", body, wait.into())
            .await
    }

    /// Switch to heating, optionally with a new heating set point.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn heat<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        heating: Option<SetPoint>,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        let body = climate_body(device.into(), heating, None);
        self.climate_action("thermostats/heat", body, wait.into())
            .await
    }

    /// Switch to automatic heating and cooling between two set points.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn heat_cool<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        heating: Option<SetPoint>,
        cooling: Option<SetPoint>,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        let body = climate_body(device.into(), heating, cooling);
        self.climate_action("thermostats/heat_cool", body, wait.into())
            .await
    }

    /// Turn heating and cooling off.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn off<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        let body = climate_body(device.into(), None, None);
        self.climate_action("thermostats/off", body, wait.into())
            .await
    }

    /// Set the fan mode.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn set_fan_mode<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        fan_mode: FanMode,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        let mut body = climate_body(device.into(), None, None);
        body["fan_mode"] = json!(fan_mode);
        self.climate_action("thermostats/set_fan_mode", body, wait.into())
            .await
    }

    async fn climate_action(
        &self,
        path: &str,
        body: Value,
        wait: WaitForActionAttempt,
    ) -> Result<ActionAttempt> {
        let attempt: ActionAttempt = self
            .client
            .send_field(path, &body, "action_attempt")
            .await?;
        info!(
            device_id = body["device_id"].as_str().unwrap_or_default(),
            action_attempt_id = %attempt.action_attempt_id,
            action_type = %attempt.action_type,
            "Started thermostat action"
        );
        self.client.settle_action_attempt(attempt, wait).await
    }
}

fn climate_body(
    device: ResourceRef<'_, Device>,
    heating: Option<SetPoint>,
    cooling: Option<SetPoint>,
) -> Value {
    let mut body = json!({ "device_id": device.to_id() });
    let set_points = heating
        .map(|p| p.field("heating"))
        .into_iter()
        .chain(cooling.map(|p| p.field("cooling")));
    for (key, value) in set_points {
        body[key] = json!(value);
    }
    body
}
