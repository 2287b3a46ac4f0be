//! # seam-core
//!
//! Core types and utilities for working with the Seam API.
//!
//! This crate provides the error model, typed identifiers, the shared HTTP
//! transport and the polling helpers that the `seam-api` resource clients are
//! built on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`ids`] - Strongly-typed identifiers for Seam resources
//! - [`types`] - Action attempts and resource error records
//! - [`config`] - Configuration structures for Seam clients
//! - [`client`] - HTTP transport with bearer auth and retry logic
//! - [`query`] - Query-string builder
//! - [`poll`] - Action-attempt and conditional-value pollers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod poll;
pub mod query;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use poll::{
    ActionAttemptFetcher, ActionAttemptPoller, ConditionalValuePoller, PollOptions, Watchable,
};
