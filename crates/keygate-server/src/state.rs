//! Shared server state.

use keygate_issuer::TokenIssuer;
use std::sync::Arc;

/// State handed to every handler: the issuer, which itself only holds
/// immutable configuration and the store client.
#[derive(Clone)]
pub struct AppState {
    issuer: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }
}
