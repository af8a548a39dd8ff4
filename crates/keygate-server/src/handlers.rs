//! Request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

/// Token request fields, readable from query parameters or a JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,

    #[serde(rename = "partitionKeyValue")]
    pub partition_key_value: Option<String>,
}

impl TokenParams {
    /// Fill unset fields from another source (query first, then body).
    fn or(self, other: TokenParams) -> TokenParams {
        TokenParams {
            user_id: self.user_id.or(other.user_id),
            partition_key_value: self.partition_key_value.or(other.partition_key_value),
        }
    }
}

/// `GET /tokens?userId=...&partitionKeyValue=...`
pub async fn issue_get(State(state): State<AppState>, Query(params): Query<TokenParams>) -> Response {
    issue(state, params).await
}

/// `POST /tokens` with fields in the query string and/or a JSON body.
pub async fn issue_post(
    State(state): State<AppState>,
    Query(query): Query<TokenParams>,
    body: Bytes,
) -> Response {
    // An empty or non-JSON body simply contributes no fields; a userId has
    // to come from somewhere, or validation below answers 400.
    let from_body: TokenParams = serde_json::from_slice(&body).unwrap_or_default();
    let params = query.or(from_body);
    issue(state, params).await
}

async fn issue(state: AppState, params: TokenParams) -> Response {
    // Validation is local: an empty userId never reaches the store.
    let user_id = match params.user_id.as_deref().map(str::trim) {
        Some(user) if !user.is_empty() => user.to_string(),
        _ => return ApiError::MissingUserId.into_response(),
    };

    match state
        .issuer()
        .issue(&user_id, params.partition_key_value.as_deref())
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            tracing::warn!(user = %user_id, code = err.code(), error = %err, "issuance failed");
            ApiError::from(err).into_response()
        }
    }
}

/// Liveness probe.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "keygate-server" }))
}
