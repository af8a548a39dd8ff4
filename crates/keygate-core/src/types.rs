//! Response types shared by the issuer, server and CLI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Access mode carried by an issued permission.
///
/// Keygate grants exactly one mode today: full read/write on the scoped
/// partition. The enum keeps the wire shape explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    All,
}

/// Deterministic permission id for a (user, container) pair.
///
/// Reissuing for the same pair always addresses the same permission object,
/// which is what lets issuance delete-then-recreate instead of accumulating
/// stale grants.
pub fn permission_id(user_id: &str, container_id: &str) -> String {
    format!("permission-{user_id}-{container_id}")
}

/// One issued token, scoped to a single container and partition value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "permissionId")]
    pub permission_id: String,

    #[serde(rename = "partitionKeyValue")]
    pub partition_key_value: String,

    /// Resource URL of the container the token is valid for.
    pub url: String,

    pub mode: PermissionMode,

    /// The opaque token string handed to the client.
    pub token: String,
}

/// Successful issuance result: one token per configured container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Keyed by container id.
    pub tokens: BTreeMap<String, Token>,
}

/// Failure result, mirroring HTTP status semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "errorCode")]
    pub error_code: u16,

    pub message: String,

    /// Originating lower-level error text, kept for diagnostics only.
    #[serde(rename = "orgError")]
    pub org_error: Option<String>,

    /// Always empty on failure; present so both outcomes share one shape.
    pub tokens: BTreeMap<String, Token>,
}

impl ErrorResponse {
    pub fn new(error_code: u16, message: impl Into<String>, org_error: Option<String>) -> Self {
        Self {
            error_code,
            message: message.into(),
            org_error,
            tokens: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_id_is_deterministic() {
        assert_eq!(permission_id("sam", "msgs"), "permission-sam-msgs");
        assert_eq!(permission_id("sam", "msgs"), permission_id("sam", "msgs"));
    }

    #[test]
    fn token_serializes_with_wire_names() {
        let token = Token {
            permission_id: "permission-sam-msgs".into(),
            partition_key_value: "sam".into(),
            url: "https://store.example.net/dbs/appdata/colls/msgs".into(),
            mode: PermissionMode::All,
            token: "opaque".into(),
        };
        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(value["permissionId"], "permission-sam-msgs");
        assert_eq!(value["partitionKeyValue"], "sam");
        assert_eq!(value["mode"], "all");
        assert_eq!(value["token"], "opaque");
    }

    #[test]
    fn error_response_serializes_empty_token_map() {
        let resp = ErrorResponse::new(401, "credential rejected", Some("401 from store".into()));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["errorCode"], 401);
        assert_eq!(value["orgError"], "401 from store");
        assert!(value["tokens"].as_object().unwrap().is_empty());
    }
}
