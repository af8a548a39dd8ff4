//! In-memory control-plane fake.
//!
//! Behaves like the remote store as far as the issuer can observe: lazily
//! created databases/users/containers, opaque random token strings, and a
//! conflict when a permission id is created twice without an intervening
//! delete. Used by tests across the workspace.

use crate::client::{PermissionGrant, PermissionSpec, StoreClient};
use crate::error::StoreError;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use rand::RngCore;
use std::collections::BTreeMap;
use std::sync::RwLock;

const ENDPOINT: &str = "memory://store";

/// In-process store with the same observable semantics as [`crate::RestStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    databases: BTreeMap<String, Database>,
}

#[derive(Default)]
struct Database {
    users: BTreeMap<String, User>,
    /// Container id -> partition-key path.
    containers: BTreeMap<String, String>,
}

#[derive(Default)]
struct User {
    permissions: BTreeMap<String, PermissionGrant>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resource URL of a container, matching the REST client's shape.
    pub fn container_url(database: &str, container_id: &str) -> String {
        format!("{ENDPOINT}/dbs/{database}/colls/{container_id}")
    }

    /// Whether a user principal exists. Test helper.
    pub fn has_user(&self, database: &str, user_id: &str) -> bool {
        self.read(|inner| {
            inner
                .databases
                .get(database)
                .is_some_and(|db| db.users.contains_key(user_id))
        })
    }

    /// Partition-key path a container was created with. Test helper.
    pub fn partition_key_path(&self, database: &str, container_id: &str) -> Option<String> {
        self.read(|inner| {
            inner
                .databases
                .get(database)
                .and_then(|db| db.containers.get(container_id).cloned())
        })
    }

    /// Ids of the permissions currently live for a user. Test helper.
    pub fn live_permissions(&self, database: &str, user_id: &str) -> Vec<String> {
        self.read(|inner| {
            inner
                .databases
                .get(database)
                .and_then(|db| db.users.get(user_id))
                .map(|user| user.permissions.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Inner) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| StoreError::Unexpected(format!("failed to acquire write lock: {e}")))?;
        f(&mut guard)
    }
}

fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn missing(kind: &str, id: &str) -> StoreError {
    StoreError::from_status(404, format!("{kind} '{id}' does not exist"))
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn ensure_database(&self, database: &str) -> Result<(), StoreError> {
        self.write(|inner| {
            inner.databases.entry(database.to_string()).or_default();
            Ok(())
        })
    }

    async fn ensure_user(&self, database: &str, user_id: &str) -> Result<(), StoreError> {
        self.write(|inner| {
            let db = inner
                .databases
                .get_mut(database)
                .ok_or_else(|| missing("database", database))?;
            db.users.entry(user_id.to_string()).or_default();
            Ok(())
        })
    }

    async fn ensure_container(
        &self,
        database: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<(), StoreError> {
        self.write(|inner| {
            let db = inner
                .databases
                .get_mut(database)
                .ok_or_else(|| missing("database", database))?;
            match db.containers.get(container_id) {
                None => {
                    db.containers
                        .insert(container_id.to_string(), partition_key_path.to_string());
                    Ok(())
                }
                Some(existing) if existing == partition_key_path => Ok(()),
                Some(existing) => Err(StoreError::from_status(
                    409,
                    format!(
                        "container '{container_id}' already exists with partition key '{existing}'"
                    ),
                )),
            }
        })
    }

    async fn delete_permission(
        &self,
        database: &str,
        user_id: &str,
        permission_id: &str,
    ) -> Result<(), StoreError> {
        // Absence at any level means the permission is already gone.
        self.write(|inner| {
            if let Some(user) = inner
                .databases
                .get_mut(database)
                .and_then(|db| db.users.get_mut(user_id))
            {
                user.permissions.remove(permission_id);
            }
            Ok(())
        })
    }

    async fn create_permission(
        &self,
        database: &str,
        user_id: &str,
        spec: PermissionSpec,
    ) -> Result<PermissionGrant, StoreError> {
        self.write(|inner| {
            let db = inner
                .databases
                .get_mut(database)
                .ok_or_else(|| missing("database", database))?;
            if !db.containers.contains_key(&spec.container_id) {
                return Err(missing("container", &spec.container_id));
            }
            let user = db
                .users
                .get_mut(user_id)
                .ok_or_else(|| missing("user", user_id))?;
            if user.permissions.contains_key(&spec.id) {
                return Err(StoreError::from_status(
                    409,
                    format!("permission '{}' already exists", spec.id),
                ));
            }

            let grant = PermissionGrant {
                id: spec.id.clone(),
                resource: Self::container_url(database, &spec.container_id),
                partition_key_value: spec.partition_key_value,
                mode: spec.mode,
                token: mint_token(),
                expires_at: Utc::now() + Duration::seconds(i64::from(spec.ttl_secs)),
            };
            user.permissions.insert(spec.id, grant.clone());
            Ok(grant)
        })
    }
}
