//! Asynchronous client for the Seam access-control API.
//!
//! [`SeamClient`] owns the transport and hands out borrowed resource handles.
//! Mutating calls that start an action attempt (locking a door, deleting an
//! access code, ...) poll it to completion by default; pass `false` as the
//! wait argument to get the pending attempt back instead.
//!
//! ```no_run
//! # async fn run() -> seam_api::Result<()> {
//! let seam = seam_api::SeamClient::from_env()?;
//! let devices = seam.devices().list(&Default::default()).await?;
//! if let Some(lock) = devices.first() {
//!     seam.locks().unlock_door(lock, true).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod access_codes;
pub mod action_attempts;
pub mod client;
pub mod connected_accounts;
pub mod devices;
pub mod locks;
pub mod models;
pub mod noise_thresholds;
pub mod resource;
pub mod thermostats;
pub mod webhooks;
pub mod workspaces;

pub use client::{SeamClient, SeamClientBuilder};
pub use models::*;
pub use resource::{Identified, ResourceRef};

/// Convenience result type used by this crate.
pub type Result<T> = seam_core::Result<T>;
