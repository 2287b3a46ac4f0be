//! Action attempt lookups and polling.

use seam_core::poll::{ActionAttemptFetcher, ActionAttemptPoller, PollOptions};
use seam_core::types::ActionAttempt;

use crate::client::SeamClient;
use crate::resource::ResourceRef;
use crate::Result;

/// Handle for `/action_attempts/*`.
#[derive(Clone, Copy)]
pub struct ActionAttempts<'a> {
    client: &'a SeamClient,
}

impl<'a> ActionAttempts<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// Fetch the current state of an action attempt.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(
        &self,
        attempt: impl Into<ResourceRef<'r, ActionAttempt>>,
    ) -> Result<ActionAttempt> {
        let id = attempt.into().to_id();
        self.client.fetch_action_attempt(&id).await
    }

    /// Poll an action attempt until it resolves.
    ///
    /// # Errors
    ///
    /// See [`ActionAttemptPoller::poll_until_ready`].
    pub async fn poll_until_ready<'r>(
        &self,
        attempt: impl Into<ResourceRef<'r, ActionAttempt>>,
        options: PollOptions,
    ) -> Result<ActionAttempt> {
        let id = attempt.into().to_id();
        ActionAttemptPoller::new(self.client, options)
            .poll_until_ready(&id)
            .await
    }
}
