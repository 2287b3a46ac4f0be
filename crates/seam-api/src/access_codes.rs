//! Access code management.
//!
//! Creating a code returns before the lock has been programmed. Set
//! [`CreateAccessCodeRequest::wait_for_code`] to block until the backend
//! reports the PIN; that wait is only allowed for codes that start now or
//! within a short grace window, since a future code is not programmed until
//! its window opens.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use seam_core::ids::DeviceId;
use seam_core::poll::ConditionalValuePoller;
use seam_core::types::ActionAttempt;
use seam_core::Error;
use serde_json::json;
use tracing::{debug, info};
use validator::Validate;

use crate::client::SeamClient;
use crate::models::{
    AccessCode, CreateAccessCodeRequest, Device, UpdateAccessCodeRequest, WaitForActionAttempt,
};
use crate::resource::ResourceRef;
use crate::Result;

/// How far in the future `starts_at` may be while still waiting for the code.
pub const WAIT_FOR_CODE_GRACE_SECS: i64 = 5;

/// Handle for `/access_codes/*`.
#[derive(Clone, Copy)]
pub struct AccessCodes<'a> {
    client: &'a SeamClient,
}

impl<'a> AccessCodes<'a> {
    pub(crate) const fn new(client: &'a SeamClient) -> Self {
        Self { client }
    }

    /// List the access codes on a device.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn list<'r>(
        &self,
        device: impl Into<ResourceRef<'r, Device>>,
    ) -> Result<Vec<AccessCode>> {
        let device_id = device.into().to_id();
        self.client
            .read_field(
                "access_codes/list",
                &json!({ "device_id": device_id }),
                "access_codes",
            )
            .await
    }

    /// Fetch a single access code.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn get<'r>(
        &self,
        access_code: impl Into<ResourceRef<'r, AccessCode>>,
    ) -> Result<AccessCode> {
        let access_code_id = access_code.into().to_id();
        self.client
            .read_field(
                "access_codes/get",
                &json!({ "access_code_id": access_code_id }),
                "access_code",
            )
            .await
    }

    /// Create an access code, optionally waiting for the lock to report it.
    ///
    /// # Errors
    ///
    /// - [`Error::ValidationError`] for an invalid request, or when waiting
    ///   for a code whose `starts_at` lies beyond the grace window; no
    ///   request is sent in either case
    /// - [`Error::ConditionalWaitFailed`] if the wait fails
    /// - the transport or API error
    pub async fn create(&self, request: &CreateAccessCodeRequest) -> Result<AccessCode> {
        request.validate()?;
        if request.wait_for_code {
            ensure_code_can_be_awaited(request.starts_at.as_deref(), Utc::now())?;
        }

        let created: AccessCode = self
            .client
            .send_field("access_codes/create", request, "access_code")
            .await?;
        info!(
            access_code_id = %created.access_code_id,
            device_id = %request.device_id,
            status = ?created.status,
            "Created access code"
        );

        if !request.wait_for_code {
            return Ok(created);
        }

        let handle = *self;
        ConditionalValuePoller::from(self.client.poll_config())
            .wait_for(created, move |current: &AccessCode| {
                let access_code_id = current.access_code_id.clone();
                async move {
                    debug!(%access_code_id, "Waiting for access code to be set");
                    handle.get(access_code_id).await
                }
            })
            .await
    }

    /// Update an access code.
    ///
    /// # Errors
    ///
    /// Returns a validation, transport or API error.
    pub async fn update(&self, request: &UpdateAccessCodeRequest) -> Result<AccessCode> {
        request.validate()?;
        self.client.send_json("access_codes/update", request).await?;
        self.get(&request.access_code_id).await
    }

    /// Delete an access code.
    ///
    /// The deletion runs as an action attempt, polled according to `wait`.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error, or a polling error.
    pub async fn delete<'r>(
        &self,
        access_code: impl Into<ResourceRef<'r, AccessCode>>,
        wait: impl Into<WaitForActionAttempt>,
    ) -> Result<ActionAttempt> {
        let access_code_id = access_code.into().to_id();
        let attempt: ActionAttempt = self
            .client
            .send_field(
                "access_codes/delete",
                &json!({ "access_code_id": access_code_id }),
                "action_attempt",
            )
            .await?;
        self.client.settle_action_attempt(attempt, wait.into()).await
    }

    /// Create the same code on several devices, linked by a common code key.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error.
    pub async fn create_multiple(
        &self,
        device_ids: &[DeviceId],
        name: Option<&str>,
        code: Option<&str>,
    ) -> Result<Vec<AccessCode>> {
        let mut body = json!({ "device_ids": device_ids });
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        if let Some(code) = code {
            body["code"] = json!(code);
        }
        self.client
            .send_field("access_codes/create_multiple", &body, "access_codes")
            .await
    }
}

fn ensure_code_can_be_awaited(starts_at: Option<&str>, now: DateTime<Utc>) -> Result<()> {
    let Some(raw) = starts_at else {
        return Ok(());
    };

    let starts_at = parse_timestamp(raw)?;
    if starts_at > now + Duration::seconds(WAIT_FOR_CODE_GRACE_SECS) {
        return Err(Error::ValidationError(format!(
            "Cannot wait for a future time bound code: starts_at {raw} is more than \
             {WAIT_FOR_CODE_GRACE_SECS} seconds from now"
        )));
    }
    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or_else(|| {
            Error::ValidationError(format!(
                "Invalid timestamp `{raw}`: expected RFC 3339 or YYYY-MM-DD"
            ))
        })
}
