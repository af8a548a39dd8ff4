//! HTTP surface for the Keygate token broker.
//!
//! Thin boundary over [`keygate_issuer::TokenIssuer`]: parse the inbound
//! request (query or JSON body), short-circuit requests without a userId
//! before anything touches the store, and shape the issuer's outcome into
//! status + JSON.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
