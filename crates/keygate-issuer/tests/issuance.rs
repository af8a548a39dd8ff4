//! End-to-end issuance behavior against the in-memory store.

use async_trait::async_trait;
use keygate_core::{ContainerConfig, KeygateConfig, PermissionMode, permission_id};
use keygate_issuer::TokenIssuer;
use keygate_store::{MemoryStore, PermissionGrant, PermissionSpec, StoreClient, StoreError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn config(containers: &[(&str, &str)]) -> Arc<KeygateConfig> {
    Arc::new(KeygateConfig {
        endpoint: "memory://store".into(),
        master_key: "master".into(),
        secondary_key: None,
        database: "appdata".into(),
        containers: containers
            .iter()
            .map(|(id, path)| ContainerConfig {
                id: (*id).into(),
                partition_key_path: (*path).into(),
            })
            .collect(),
        token_ttl_secs: 600,
        bind: "127.0.0.1:0".into(),
    })
}

fn issuer_with(store: Arc<dyn StoreClient>, containers: &[(&str, &str)]) -> TokenIssuer {
    TokenIssuer::new(config(containers), store)
}

#[tokio::test]
async fn partition_value_defaults_to_user_id() {
    let store = Arc::new(MemoryStore::new());
    let issuer = issuer_with(store, &[("msgs", "/uid")]);

    let response = issuer.issue("sam", None).await.unwrap();

    assert_eq!(response.user_id, "sam");
    let token = &response.tokens["msgs"];
    assert_eq!(token.partition_key_value, "sam");
    assert_eq!(token.permission_id, "permission-sam-msgs");
    assert_eq!(token.url, "memory://store/dbs/appdata/colls/msgs");
    assert_eq!(token.mode, PermissionMode::All);
    assert!(!token.token.is_empty());
}

#[tokio::test]
async fn explicit_partition_value_scopes_every_token() {
    let store = Arc::new(MemoryStore::new());
    let issuer = issuer_with(store, &[("msgs", "/uid"), ("notes", "/uid")]);

    let response = issuer.issue("sam", Some("team-7")).await.unwrap();

    for token in response.tokens.values() {
        assert_eq!(token.partition_key_value, "team-7");
    }
}

#[tokio::test]
async fn blank_partition_value_falls_back_to_user_id() {
    let store = Arc::new(MemoryStore::new());
    let issuer = issuer_with(store, &[("msgs", "/uid")]);

    let response = issuer.issue("sam", Some("   ")).await.unwrap();

    assert_eq!(response.tokens["msgs"].partition_key_value, "sam");
}

#[tokio::test]
async fn one_token_per_configured_container() {
    let store = Arc::new(MemoryStore::new());
    let issuer = issuer_with(
        store.clone(),
        &[("msgs", "/uid"), ("notes", "/uid"), ("files", "/owner")],
    );

    let response = issuer.issue("sam", None).await.unwrap();

    assert_eq!(response.tokens.len(), 3);
    for id in ["msgs", "notes", "files"] {
        assert_eq!(response.tokens[id].permission_id, permission_id("sam", id));
    }
    assert!(store.has_user("appdata", "sam"));
    assert_eq!(store.partition_key_path("appdata", "files").as_deref(), Some("/owner"));
}

#[tokio::test]
async fn reissue_rotates_the_token_without_stacking_permissions() {
    let store = Arc::new(MemoryStore::new());
    let issuer = issuer_with(store.clone(), &[("msgs", "/uid")]);

    let first = issuer.issue("sam", None).await.unwrap();
    let second = issuer.issue("sam", None).await.unwrap();

    assert_ne!(first.tokens["msgs"].token, second.tokens["msgs"].token);
    assert_eq!(
        first.tokens["msgs"].permission_id,
        second.tokens["msgs"].permission_id
    );
    assert_eq!(store.live_permissions("appdata", "sam"), vec!["permission-sam-msgs"]);
}

#[tokio::test]
async fn concurrent_users_do_not_interfere() {
    let store = Arc::new(MemoryStore::new());
    let issuer = Arc::new(issuer_with(store.clone(), &[("msgs", "/uid")]));

    let a = {
        let issuer = issuer.clone();
        tokio::spawn(async move { issuer.issue("sam", None).await })
    };
    let b = {
        let issuer = issuer.clone();
        tokio::spawn(async move { issuer.issue("ana", None).await })
    };

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();
    assert_eq!(a.tokens["msgs"].partition_key_value, "sam");
    assert_eq!(b.tokens["msgs"].partition_key_value, "ana");
    assert_eq!(store.live_permissions("appdata", "sam").len(), 1);
    assert_eq!(store.live_permissions("appdata", "ana").len(), 1);
}

// A store whose very first call fails the given way.
struct BrokenStore(fn() -> StoreError);

#[async_trait]
impl StoreClient for BrokenStore {
    async fn ensure_database(&self, _database: &str) -> Result<(), StoreError> {
        Err((self.0)())
    }

    async fn ensure_user(&self, _database: &str, _user_id: &str) -> Result<(), StoreError> {
        Err((self.0)())
    }

    async fn ensure_container(
        &self,
        _database: &str,
        _container_id: &str,
        _partition_key_path: &str,
    ) -> Result<(), StoreError> {
        Err((self.0)())
    }

    async fn delete_permission(
        &self,
        _database: &str,
        _user_id: &str,
        _permission_id: &str,
    ) -> Result<(), StoreError> {
        Err((self.0)())
    }

    async fn create_permission(
        &self,
        _database: &str,
        _user_id: &str,
        _spec: PermissionSpec,
    ) -> Result<PermissionGrant, StoreError> {
        Err((self.0)())
    }
}

#[tokio::test]
async fn rejected_credential_classifies_as_401() {
    let store = Arc::new(BrokenStore(|| StoreError::Unauthorized {
        detail: "401 from store".into(),
    }));
    let issuer = issuer_with(store, &[("msgs", "/uid")]);

    let err = issuer.issue("sam", None).await.unwrap_err();
    assert_eq!(err.code(), 401);
    assert!(err.to_string().contains("master key"));
}

#[tokio::test]
async fn unreachable_endpoint_classifies_as_404() {
    let store = Arc::new(BrokenStore(|| StoreError::Unreachable {
        detail: "connection refused".into(),
    }));
    let issuer = issuer_with(store, &[("msgs", "/uid")]);

    let err = issuer.issue("sam", None).await.unwrap_err();
    assert_eq!(err.code(), 404);
    assert!(err.to_string().contains("endpoint"));
}

#[tokio::test]
async fn remote_error_code_passes_through() {
    let store = Arc::new(BrokenStore(|| StoreError::Remote {
        status: 429,
        message: "request rate too large".into(),
    }));
    let issuer = issuer_with(store, &[("msgs", "/uid")]);

    let err = issuer.issue("sam", None).await.unwrap_err();
    assert_eq!(err.code(), 429);
    assert_eq!(err.to_string(), "request rate too large");
}

// Delegates to a MemoryStore but fails container creation for one id,
// counting permission creates so tests can observe where the walk stopped.
struct FlakyContainerStore {
    inner: MemoryStore,
    fail_container: &'static str,
    creates: AtomicUsize,
}

#[async_trait]
impl StoreClient for FlakyContainerStore {
    async fn ensure_database(&self, database: &str) -> Result<(), StoreError> {
        self.inner.ensure_database(database).await
    }

    async fn ensure_user(&self, database: &str, user_id: &str) -> Result<(), StoreError> {
        self.inner.ensure_user(database, user_id).await
    }

    async fn ensure_container(
        &self,
        database: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<(), StoreError> {
        if container_id == self.fail_container {
            return Err(StoreError::Remote {
                status: 503,
                message: "container provisioning unavailable".into(),
            });
        }
        self.inner
            .ensure_container(database, container_id, partition_key_path)
            .await
    }

    async fn delete_permission(
        &self,
        database: &str,
        user_id: &str,
        permission_id: &str,
    ) -> Result<(), StoreError> {
        self.inner
            .delete_permission(database, user_id, permission_id)
            .await
    }

    async fn create_permission(
        &self,
        database: &str,
        user_id: &str,
        spec: PermissionSpec,
    ) -> Result<PermissionGrant, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_permission(database, user_id, spec).await
    }
}

#[tokio::test]
async fn issuance_stops_at_the_first_failing_container() {
    let store = Arc::new(FlakyContainerStore {
        inner: MemoryStore::new(),
        fail_container: "notes",
        creates: AtomicUsize::new(0),
    });
    let issuer = issuer_with(
        store.clone(),
        &[("msgs", "/uid"), ("notes", "/uid"), ("files", "/uid")],
    );

    let err = issuer.issue("sam", None).await.unwrap_err();

    assert_eq!(err.code(), 503);
    // Only the container before the failure got a permission.
    assert_eq!(store.creates.load(Ordering::SeqCst), 1);
    assert_eq!(
        store.inner.live_permissions("appdata", "sam"),
        vec!["permission-sam-msgs"]
    );
}
