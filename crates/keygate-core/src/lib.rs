//! # keygate-core
//!
//! Shared types and configuration for the Keygate token broker.
//!
//! Keygate hands client applications short-lived, partition-scoped access
//! tokens for a multi-tenant NoSQL store, so the store's master key never
//! leaves the broker. This crate holds what every other crate needs:
//!
//! - [`KeygateConfig`]: the immutable process-wide configuration
//! - the response types returned to callers ([`Token`], [`TokenResponse`],
//!   [`ErrorResponse`])
//! - the deterministic permission-id scheme ([`permission_id`])

pub mod config;
pub mod types;

pub use config::{ConfigError, ContainerConfig, KeygateConfig};
pub use types::{ErrorResponse, PermissionMode, Token, TokenResponse, permission_id};
