//! Lock listing and lock/unlock actions.

use seam_core::types::ActionAttempt;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::client::SeamClient;
use crate::models::{Device, DeviceListParams, WaitForActionAttempt};
use crate::resource::ResourceRef;
use crate::Result;

/// Handle for `/locks/*`.
#[derive(Clone, Copy)]
pub struct Locks<'a> {
    client: &'a SeamClient,
}

impl<'a> Locks<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List lock devices.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport or API error.
    pub async fn list(&self, params: &DeviceListParams) -> Result<Vec<Device>> {
        params.validate()?;
        self.client.read_field("locks/list", params, "devices").await
    }

    /// Fetch a single lock.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(&self, device: impl Into<ResourceRef<'r, Device>>) -> Result<Device> {
        let device_id = device.into().to_id();
        self.client
            .read_field("locks/get", &json!({ "device_id": device_id }), "device")
            .await
    }

    /// Lock a door.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn lock_door<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        self.door_action("locks/lock_door", device.into(), wait.into())
            .await
    }

    /// Unlock a door.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn unlock_door<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        self.door_action("locks/unlock_door", device.into(), wait.into())
            .await
    }

    async fn door_action(
        &self,
        path: &str,
        device: ResourceRef<'_, Device>,
        wait: WaitForActionAttempt,
    ) -> Result<ActionAttempt> {
        let device_id = device.to_id();
        let attempt: ActionAttempt = self
            .client
            .send_field(path, &json!({ "device_id": device_id }), "action_attempt")
            .await?;
        info!(
            %device_id,
            action_attempt_id = %attempt.action_attempt_id,
            action_type = %attempt.action_type,
            "Started lock action"
        );
        self.client.settle_action_attempt(attempt, wait).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seam_core::config::{PollConfig, SeamClientConfig};
    use seam_core::types::ActionAttemptStatus;
    use seam_core::Error;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> SeamClient {
        let config = SeamClientConfig::new("seam_test_key")
            .unwrap()
            .with_api_url(server.uri())
            .with_max_retries(0)
            .with_poll(PollConfig::new().with_interval_ms(10));
        SeamClient::from_config(&config).unwrap()
    }

    fn pending_unlock() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "action_attempt": {
                "action_attempt_id": "aa_2",
                "status": "pending",
                "action_type": "UNLOCK_DOOR"
            }
        }))
    }

    #[tokio::test]
    async fn list_posts_filters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/locks/list"))
            .and(body_json(json!({"manufacturer": "august"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "devices": [{"device_id": "dev_1", "device_type": "august_lock"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let params = DeviceListParams {
            manufacturer: Some("august".to_string()),
            ..DeviceListParams::default()
        };
        let locks = client.locks().list(&params).await.unwrap();
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0].device_type.as_deref(), Some("august_lock"));
    }

    #[tokio::test]
    async fn get_unwraps_device() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/locks/get"))
            .and(body_json(json!({"device_id": "dev_1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "device": {"device_id": "dev_1", "properties": {"locked": true}}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let lock = client.locks().get("dev_1").await.unwrap();
        assert_eq!(lock.is_locked(), Some(true));
    }

    #[tokio::test]
    async fn unlock_without_waiting_returns_pending_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/locks/unlock_door"))
            .respond_with(pending_unlock())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/action_attempts/get"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let attempt = client.locks().unlock_door("dev_1", false).await.unwrap();
        assert_eq!(attempt.status, ActionAttemptStatus::Pending);
    }

    #[tokio::test]
    async fn unlock_surfaces_failed_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/locks/unlock_door"))
            .respond_with(pending_unlock())
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/action_attempts/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "action_attempt": {
                    "action_attempt_id": "aa_2",
                    "status": "error",
                    "action_type": "UNLOCK_DOOR",
                    "error": {"type": "device_offline", "message": "Device is offline"}
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.locks().unlock_door("dev_1", true).await.unwrap_err();
        assert_eq!(err.error_code(), "ACTION_ATTEMPT_FAILED");
        assert!(err.to_string().contains("device_offline"));
    }

    #[tokio::test]
    async fn lock_rejects_unknown_device() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/locks/lock_door"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("seam-request-id", "req-7")
                    .set_body_json(json!({
                        "error": {"type": "device_not_found", "message": "Device not found"}
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.locks().lock_door("dev_missing", true).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, .. }));
        assert_eq!(err.request_id(), Some("req-7"));
    }
}
