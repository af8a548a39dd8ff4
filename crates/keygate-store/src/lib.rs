//! # keygate-store
//!
//! Control-plane client for the remote data store.
//!
//! The store itself is an external service with a known JSON/REST contract;
//! this crate wraps it behind the small [`StoreClient`] interface the issuer
//! depends on, so tests can substitute a fake. All remote failures are
//! classified into the closed [`StoreError`] set at this boundary, never by
//! inspecting ad hoc error shapes further up.
//!
//! Two implementations ship here:
//! - [`RestStore`]: the real client, speaking the store's control-plane REST
//!   surface with the master key
//! - [`MemoryStore`]: an in-process fake with the same observable semantics

pub mod client;
pub mod error;
pub mod memory;
pub mod rest;

pub use client::{PermissionGrant, PermissionSpec, StoreClient};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;
