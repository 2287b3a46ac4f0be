//! Webhook endpoints for workspace events.

use seam_core::query::QueryParams;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::client::SeamClient;
use crate::models::{CreateWebhookRequest, Webhook};
use crate::resource::ResourceRef;
use crate::Result;

/// Handle for `/webhooks/*`.
#[derive(Clone, Copy)]
pub struct Webhooks<'a> {
    client: &'a SeamClient,
}

impl<'a> Webhooks<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List webhooks in the workspace.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn list(&self) -> Result<Vec<Webhook>> {
        self.client
            .get_field("webhooks/list", &QueryParams::new(), "webhooks")
            .await
    }

    /// Fetch a webhook.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(&self, webhook: impl Into<ResourceRef<'r, Webhook>>) -> Result<Webhook> {
        let params = QueryParams::new().with("webhook_id", webhook.into().to_id());
        self.client.get_field("webhooks/get", &params, "webhook").await
    }

    /// Register a webhook. The returned record carries the signing secret.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed URL, or the transport or API error.
    pub async fn create(&self, request: &CreateWebhookRequest) -> Result<Webhook> {
        request.validate()?;
        let webhook: Webhook = self
            .client
            .send_field("webhooks/create", request, "webhook")
            .await?;
        info!(webhook_id = %webhook.webhook_id, url = %webhook.url, "Created webhook");
        Ok(webhook)
    }

    /// Remove a webhook.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn delete<'r>(&self, webhook: impl Into<ResourceRef<'r, Webhook>>) -> Result<()> {
        let webhook_id = webhook.into().to_id();
        self.client
            .send_json("webhooks/delete", &json!({ "webhook_id": webhook_id }))
            .await?;
        Ok(())
    }
}
