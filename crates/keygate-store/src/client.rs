//! The control-plane client interface.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keygate_core::PermissionMode;

/// What the issuer needs from the store's control plane.
///
/// All five operations have ensure-exists or tolerant-delete semantics baked
/// in, so callers never have to guess why a create failed:
///
/// - `ensure_database` / `ensure_container`: create-if-absent; an
///   already-exists conflict is success.
/// - `ensure_user`: attempt create, fall back to a read on any create
///   failure; the read's outcome decides.
/// - `delete_permission`: a permission that was already absent is success;
///   every other failure propagates.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn ensure_database(&self, database: &str) -> Result<(), StoreError>;

    async fn ensure_user(&self, database: &str, user_id: &str) -> Result<(), StoreError>;

    async fn ensure_container(
        &self,
        database: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<(), StoreError>;

    async fn delete_permission(
        &self,
        database: &str,
        user_id: &str,
        permission_id: &str,
    ) -> Result<(), StoreError>;

    async fn create_permission(
        &self,
        database: &str,
        user_id: &str,
        spec: PermissionSpec,
    ) -> Result<PermissionGrant, StoreError>;
}

/// What a new permission should look like.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionSpec {
    /// Permission id, deterministic per (user, container).
    pub id: String,

    /// Container the permission is scoped to.
    pub container_id: String,

    /// Partition-key value the token is limited to.
    pub partition_key_value: String,

    pub mode: PermissionMode,

    /// Requested token lifetime in seconds.
    pub ttl_secs: u32,
}

/// A permission as created by the store, token included.
#[derive(Debug, Clone)]
pub struct PermissionGrant {
    pub id: String,

    /// Resource URL of the container the grant covers.
    pub resource: String,

    pub partition_key_value: String,

    pub mode: PermissionMode,

    /// Server-minted opaque token string.
    pub token: String,

    /// Server-assigned expiry.
    pub expires_at: DateTime<Utc>,
}
