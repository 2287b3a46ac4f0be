//! Id-or-entity parameters.
//!
//! Most Seam endpoints accept a resource either by id or as a previously
//! fetched record. [`ResourceRef`] normalizes both shapes so handles can take
//! `impl Into<ResourceRef<'_, T>>` and resolve the id once.

use seam_core::ids::{
    AccessCodeId, ActionAttemptId, ConnectedAccountId, DeviceId, NoiseThresholdId, WebhookId,
};
use seam_core::types::ActionAttempt;

use crate::models::{AccessCode, ConnectedAccount, Device, NoiseThreshold, Webhook};

/// A record that carries its own backend identifier.
pub trait Identified {
    /// Identifier type.
    type Id: Clone;

    /// Borrow the identifier.
    fn id(&self) -> &Self::Id;
}

/// Either a bare id or a borrowed record.
#[derive(Debug)]
pub enum ResourceRef<'a, T: Identified> {
    /// Bare identifier
    Id(T::Id),
    /// Previously fetched record
    Entity(&'a T),
}

impl<T: Identified> ResourceRef<'_, T> {
    /// Resolve to the identifier.
    #[must_use]
    pub fn to_id(&self) -> T::Id {
        match self {
            Self::Id(id) => id.clone(),
            Self::Entity(entity) => entity.id().clone(),
        }
    }
}

impl<'a, T: Identified> From<&'a T> for ResourceRef<'a, T> {
    fn from(entity: &'a T) -> Self {
        Self::Entity(entity)
    }
}

macro_rules! identified {
    ($($entity:ty => $id:ident . $field:ident),+ $(,)?) => {
        $(
            impl Identified for $entity {
                type Id = $id;

                fn id(&self) -> &$id {
                    &self.$field
                }
            }

            impl From<$id> for ResourceRef<'_, $entity> {
                fn from(id: $id) -> Self {
                    Self::Id(id)
                }
            }

            impl From<&$id> for ResourceRef<'_, $entity> {
                fn from(id: &$id) -> Self {
                    Self::Id(id.clone())
                }
            }

            impl From<&str> for ResourceRef<'_, $entity> {
                fn from(id: &str) -> Self {
                    Self::Id($id::new(id))
                }
            }

            impl From<String> for ResourceRef<'_, $entity> {
                fn from(id: String) -> Self {
                    Self::Id($id::new(id))
                }
            }
        )+
    };
}

identified! {
    ActionAttempt => ActionAttemptId.action_attempt_id,
    AccessCode => AccessCodeId.access_code_id,
    Device => DeviceId.device_id,
    ConnectedAccount => ConnectedAccountId.connected_account_id,
    NoiseThreshold => NoiseThresholdId.noise_threshold_id,
    Webhook => WebhookId.webhook_id,
}
