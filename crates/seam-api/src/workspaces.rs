//! Workspace lookup and sandbox reset.

use seam_core::query::QueryParams;
use seam_core::types::ActionAttempt;
use serde_json::{json, Value};
use tracing::info;

use crate::client::SeamClient;
use crate::models::{WaitForActionAttempt, Workspace};
use crate::Result;

/// Handle for `/workspaces/*`.
#[derive(Clone, Copy)]
pub struct Workspaces<'a> {
    client: &'a SeamClient,
}

impl<'a> Workspaces<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List workspaces visible to the API key.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn list(&self) -> Result<Vec<Workspace>> {
        self.client
            .get_field("workspaces/list", &QueryParams::new(), "workspaces")
            .await
    }

    /// Fetch the workspace owning the API key.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get(&self) -> Result<Workspace> {
        self.client
            .get_field("workspaces/get", &QueryParams::new(), "workspace")
            .await
    }

    /// Reset a sandbox workspace to its seeded devices.
    ///
    /// Newer backends run the reset as an action attempt, which is settled
    /// according to `wait`. Older backends reply without one, and `None` is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn reset_sandbox(
        &self,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<Option<ActionAttempt>> {
        let mut response = self
            .client
            .send_json("workspaces/reset_sandbox", &json!({}))
            .await?;
        info!("Reset sandbox workspace");

        let attempt = match response.get_mut("action_attempt").map(Value::take) {
            None | Some(Value::Null) => return Ok(None),
            Some(raw) => serde_json::from_value::<ActionAttempt>(raw)?,
        };
        self.client
            .settle_action_attempt(attempt, wait.into())
            .await
            .map(Some)
    }
}
