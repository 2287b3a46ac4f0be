//! Noise thresholds on noise sensors.

use seam_core::ids::NoiseThresholdId;
use seam_core::types::ActionAttempt;
use serde_json::json;
use validator::Validate;

use crate::client::SeamClient;
use crate::models::{CreateNoiseThresholdRequest, Device, NoiseThreshold, WaitForActionAttempt};
use crate::resource::ResourceRef;
use crate::Result;

/// Handle for `/noise_sensors/noise_thresholds/*`.
#[derive(Clone, Copy)]
pub struct NoiseThresholds<'a> {
    client: &'a SeamClient,
}

impl<'a> NoiseThresholds<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List thresholds configured on a sensor.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn list<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
    ) -> Result<Vec<NoiseThreshold>> {
        let device_id = device.into().to_id();
        self.client
            .read_field(
                "noise_sensors/noise_thresholds/list",
                &json!({ "device_id": device_id }),
                "noise_thresholds",
            )
            .await
    }

    /// Fetch a single threshold.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(
        &self,
        threshold: impl Into<ResourceRef<'r, NoiseThreshold>>,
    ) -> Result<NoiseThreshold> {
        let noise_threshold_id = threshold.into().to_id();
        self.client
            .read_field(
                "noise_sensors/noise_thresholds/get",
                &json!({ "noise_threshold_id": noise_threshold_id }),
                "noise_threshold",
            )
            .await
    }

    /// Create a threshold.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport or API error, or a polling error.
    pub async fn create(
        &self,
        request: &CreateNoiseThresholdRequest,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        request.validate()?;
        let attempt = self
            .client
            .send_field(
                "noise_sensors/noise_thresholds/create",
                request,
                "action_attempt",
            )
            .await?;
        self.client.settle_action_attempt(attempt, wait.into()).await
    }

    /// Delete a threshold from a sensor.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn delete<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        noise_threshold_id: &NoiseThresholdId,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        let device_id = device.into().to_id();
        let attempt = self
            .client
            .send_field(
                "noise_sensors/noise_thresholds/delete",
                &json!({
                    "device_id": device_id,
                    "noise_threshold_id": noise_threshold_id,
                }),
                "action_attempt",
            )
            .await?;
        self.client.settle_action_attempt(attempt, wait.into()).await
    }
}
