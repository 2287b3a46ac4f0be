//! Device listing, lookup and removal.

use seam_core::query::QueryParams;
use serde_json::json;
use validator::Validate;

use crate::client::SeamClient;
use crate::models::{Device, DeviceListParams};
use crate::resource::ResourceRef;
use crate::Result;

/// Handle for `/devices/*`.
#[derive(Clone, Copy)]
pub struct Devices<'a> {
    client: &'a SeamClient,
}

impl<'a> Devices<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List devices matching `params`.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport or API error.
    pub async fn list(&self, params: &DeviceListParams) -> Result<Vec<Device>> {
        params.validate()?;
        self.client.read_field("devices/list", params, "devices").await
    }

    /// Fetch a device by id or record.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(&self, device: impl Into<ResourceRef<'r, Device>>) -> Result<Device> {
        let params = QueryParams::new().with("device_id", device.into().to_id());
        self.client.get_field("devices/get", &params, "device").await
    }

    /// Fetch a device by its display name.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get_by_name(&self, name: &str) -> Result<Device> {
        let params = QueryParams::new().with("name", name);
        self.client.get_field("devices/get", &params, "device").await
    }

    /// Remove a device from the workspace.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn delete<'r>(&self, device: impl Into<ResourceRef<'r, Device>>) -> Result<()> {
        let device_id = device.into().to_id();
        self.client
            .send_json("devices/delete", &json!({ "device_id": device_id }))
            .await?;
        Ok(())
    }
}
