//! # keygate-issuer
//!
//! The token-issuance workflow.
//!
//! Given a user id and an optional partition-scoping value, [`TokenIssuer`]
//! walks the configured containers and returns one scoped, time-limited
//! token per container, creating whatever the store is missing along the
//! way (database, user principal, containers) and rotating any stale grant.
//!
//! Remote failures surface as [`IssueError`] values carrying the numeric
//! code the HTTP boundary responds with.

pub mod error;
pub mod issuer;

pub use error::IssueError;
pub use issuer::TokenIssuer;
