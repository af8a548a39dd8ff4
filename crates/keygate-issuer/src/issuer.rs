//! The issuance workflow.

use crate::error::IssueError;
use keygate_core::{KeygateConfig, PermissionMode, Token, TokenResponse, permission_id};
use keygate_store::{PermissionSpec, StoreClient};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Issues scoped tokens against an injected store client.
///
/// Holds only immutable state, so one issuer is shared across concurrent
/// requests. Permission ids are namespaced by (user, container) and a single
/// issuance touches each pair once, which is why no local locking is needed.
pub struct TokenIssuer {
    config: Arc<KeygateConfig>,
    store: Arc<dyn StoreClient>,
}

impl TokenIssuer {
    pub fn new(config: Arc<KeygateConfig>, store: Arc<dyn StoreClient>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &KeygateConfig {
        &self.config
    }

    /// Issue one token per configured container for `user_id`.
    ///
    /// Tokens are scoped to `partition_key` when supplied and non-empty,
    /// otherwise to the user id itself. The container walk is strictly
    /// sequential so the delete-then-create lifecycle of a permission id
    /// never interleaves; the first failing step aborts the sequence.
    #[tracing::instrument(skip(self, partition_key), fields(containers = self.config.containers.len()))]
    pub async fn issue(
        &self,
        user_id: &str,
        partition_key: Option<&str>,
    ) -> Result<TokenResponse, IssueError> {
        let database = &self.config.database;
        self.store.ensure_database(database).await?;

        let partition_value = match partition_key {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => user_id.to_string(),
        };

        self.store.ensure_user(database, user_id).await?;

        let mut tokens = BTreeMap::new();
        for container in &self.config.containers {
            self.store
                .ensure_container(database, &container.id, &container.partition_key_path)
                .await?;

            let permission = permission_id(user_id, &container.id);
            // Rotate: drop whatever grant is live under this id, then mint a
            // fresh one. Absence of an old grant is handled by the client.
            self.store
                .delete_permission(database, user_id, &permission)
                .await?;

            let grant = self
                .store
                .create_permission(
                    database,
                    user_id,
                    PermissionSpec {
                        id: permission,
                        container_id: container.id.clone(),
                        partition_key_value: partition_value.clone(),
                        mode: PermissionMode::All,
                        ttl_secs: self.config.token_ttl_secs,
                    },
                )
                .await?;

            tracing::debug!(container = %container.id, permission = %grant.id, "issued token");
            tokens.insert(
                container.id.clone(),
                Token {
                    permission_id: grant.id,
                    partition_key_value: grant.partition_key_value,
                    url: grant.resource,
                    mode: grant.mode,
                    token: grant.token,
                },
            );
        }

        tracing::info!(user = user_id, tokens = tokens.len(), "issuance complete");
        Ok(TokenResponse {
            user_id: user_id.to_string(),
            tokens,
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("database", &self.config.database)
            .field("containers", &self.config.containers.len())
            .finish()
    }
}
