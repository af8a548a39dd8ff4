//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::get,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/tokens", get(handlers::issue_get).post(handlers::issue_post))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
