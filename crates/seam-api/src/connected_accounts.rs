//! Connected (third-party) accounts.

use serde_json::json;

use crate::client::SeamClient;
use crate::models::ConnectedAccount;
use crate::resource::ResourceRef;
use crate::Result;

/// Handle for `/connected_accounts/*`.
#[derive(Clone, Copy)]
pub struct ConnectedAccounts<'a> {
    client: &'a SeamClient,
}

impl<'a> ConnectedAccounts<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List connected accounts in the workspace.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn list(&self) -> Result<Vec<ConnectedAccount>> {
        self.client
            .read_field("connected_accounts/list", &json!({}), "connected_accounts")
            .await
    }

    /// Fetch a connected account.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(
        &self,
        account: impl Into<ResourceRef<'r, ConnectedAccount>>,
    ) -> Result<ConnectedAccount> {
        let connected_account_id = account.into().to_id();
        self.client
            .read_field(
                "connected_accounts/get",
                &json!({ "connected_account_id": connected_account_id }),
                "connected_account",
            )
            .await
    }

    /// Disconnect an account and remove its devices.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn delete<'r>(
        &self,
        account: impl Into<ResourceRef<'r, ConnectedAccount>>,
    ) -> Result<()> {
        let connected_account_id = account.into().to_id();
        self.client
            .send_json(
                "connected_accounts/delete",
                &json!({ "connected_account_id": connected_account_id }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seam_core::config::SeamClientConfig;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> SeamClient {
        let config = SeamClientConfig::new("seam_test_key")
            .unwrap()
            .with_api_url(server.uri())
            .with_max_retries(0);
        SeamClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn list_and_delete_by_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connected_accounts/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "connected_accounts": [{
                    "connected_account_id": "ca_1",
                    "account_type": "august",
                    "user_identifier": {"email": "jane@example.com"},
                    "custom_metadata": {"unit": "4B"}
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/connected_accounts/delete"))
            .and(body_json(json!({"connected_account_id": "ca_1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let accounts = client.connected_accounts().list().await.unwrap();
        assert_eq!(accounts[0].account_type.as_deref(), Some("august"));
        assert_eq!(accounts[0].custom_metadata["unit"], "4B");

        client.connected_accounts().delete(&accounts[0]).await.unwrap();
    }

    #[tokio::test]
    async fn get_unwraps_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connected_accounts/get"))
            .and(body_json(json!({"connected_account_id": "ca_2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "connected_account": {"connected_account_id": "ca_2"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let account = client.connected_accounts().get("ca_2").await.unwrap();
        assert!(account.errors.is_empty());
    }
}
