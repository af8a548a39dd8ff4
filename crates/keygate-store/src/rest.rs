//! REST implementation of the control-plane client.
//!
//! The store exposes a plain JSON surface:
//!
//! - `POST /dbs` creates a database
//! - `POST /dbs/{db}/users`, `GET /dbs/{db}/users/{user}` manage principals
//! - `POST /dbs/{db}/colls` creates containers
//! - `DELETE`/`POST` under `/dbs/{db}/users/{user}/permissions` manage
//!   permission grants; the create response carries the minted token
//!
//! Every call authenticates with the master key. Transport-level failures
//! (connect, timeout) normalize to [`StoreError::Unreachable`]; everything
//! the remote reports goes through [`StoreError::from_status`].

use crate::client::{PermissionGrant, PermissionSpec, StoreClient};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keygate_core::PermissionMode;
use serde::{Deserialize, Serialize};

/// Control-plane client backed by the store's REST surface.
pub struct RestStore {
    http: reqwest::Client,
    endpoint: String,
    master_key: String,
}

impl RestStore {
    /// Build a client for the given endpoint and master key.
    pub fn new(endpoint: &str, master_key: &str) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            master_key: master_key.to_string(),
        })
    }

    /// Resource URL of a container, as embedded in issued tokens.
    pub fn container_url(&self, database: &str, container_id: &str) -> String {
        format!("{}/dbs/{database}/colls/{container_id}", self.endpoint)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request
            .bearer_auth(&self.master_key)
            .send()
            .await
            .map_err(classify_transport)?;
        expect_success(response).await
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, StoreError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, StoreError> {
        self.send(self.http.get(self.url(path))).await
    }

    async fn delete(&self, path: &str) -> Result<reqwest::Response, StoreError> {
        self.send(self.http.delete(self.url(path))).await
    }
}

fn classify_transport(err: reqwest::Error) -> StoreError {
    if err.is_connect() || err.is_timeout() {
        StoreError::Unreachable {
            detail: err.to_string(),
        }
    } else {
        StoreError::Unexpected(err.to_string())
    }
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.text().await {
        Ok(body) => match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.message.unwrap_or(body),
            Err(_) => body,
        },
        Err(e) => format!("unreadable error body: {e}"),
    };
    Err(StoreError::from_status(status.as_u16(), message))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateResource<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateContainer<'a> {
    id: &'a str,
    partition_key_path: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePermission<'a> {
    id: &'a str,
    mode: PermissionMode,
    resource: &'a str,
    partition_key_value: &'a str,
    ttl_secs: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionResource {
    id: String,
    resource: String,
    partition_key_value: String,
    mode: PermissionMode,
    token: String,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl StoreClient for RestStore {
    async fn ensure_database(&self, database: &str) -> Result<(), StoreError> {
        match self.post_json("/dbs", &CreateResource { id: database }).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_conflict() => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn ensure_user(&self, database: &str, user_id: &str) -> Result<(), StoreError> {
        let created = self
            .post_json(
                &format!("/dbs/{database}/users"),
                &CreateResource { id: user_id },
            )
            .await;
        match created {
            Ok(_) => Ok(()),
            Err(create_err) => {
                // The read decides: a principal that exists is all we need,
                // however the create attempt failed.
                tracing::debug!(user = user_id, error = %create_err, "user create failed, reading back");
                self.get(&format!("/dbs/{database}/users/{user_id}"))
                    .await
                    .map(|_| ())
            }
        }
    }

    async fn ensure_container(
        &self,
        database: &str,
        container_id: &str,
        partition_key_path: &str,
    ) -> Result<(), StoreError> {
        let created = self
            .post_json(
                &format!("/dbs/{database}/colls"),
                &CreateContainer {
                    id: container_id,
                    partition_key_path,
                },
            )
            .await;
        match created {
            Ok(_) => Ok(()),
            Err(err) if err.is_conflict() => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn delete_permission(
        &self,
        database: &str,
        user_id: &str,
        permission_id: &str,
    ) -> Result<(), StoreError> {
        let deleted = self
            .delete(&format!(
                "/dbs/{database}/users/{user_id}/permissions/{permission_id}"
            ))
            .await;
        match deleted {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn create_permission(
        &self,
        database: &str,
        user_id: &str,
        spec: PermissionSpec,
    ) -> Result<PermissionGrant, StoreError> {
        let resource = self.container_url(database, &spec.container_id);
        let response = self
            .post_json(
                &format!("/dbs/{database}/users/{user_id}/permissions"),
                &CreatePermission {
                    id: &spec.id,
                    mode: spec.mode,
                    resource: &resource,
                    partition_key_value: &spec.partition_key_value,
                    ttl_secs: spec.ttl_secs,
                },
            )
            .await?;

        let permission: PermissionResource = response
            .json()
            .await
            .map_err(|e| StoreError::Unexpected(format!("malformed permission response: {e}")))?;

        Ok(PermissionGrant {
            id: permission.id,
            resource: permission.resource,
            partition_key_value: permission.partition_key_value,
            mode: permission.mode,
            token: permission.token,
            expires_at: permission.expires_at,
        })
    }
}
