//! Error types for store control-plane calls.

use thiserror::Error;

/// Failures a control-plane call can produce.
///
/// This is the complete set: every remote outcome is folded into one of
/// these variants at the client boundary, so callers classify by matching
/// variants instead of probing status codes or error strings.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the credential (remote 401).
    #[error("store rejected the credential: {detail}")]
    Unauthorized { detail: String },

    /// No response from the endpoint at all.
    #[error("store endpoint did not respond: {detail}")]
    Unreachable { detail: String },

    /// The store reported a specific error code.
    #[error("store returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Anything that did not fit the shapes above.
    #[error("unexpected store failure: {0}")]
    Unexpected(String),
}

impl StoreError {
    /// Classify a remote-reported status code.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => StoreError::Unauthorized { detail: message },
            _ => StoreError::Remote { status, message },
        }
    }

    /// Whether the remote reported "no such resource".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Remote { status: 404, .. })
    }

    /// Whether the remote reported a create conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Remote { status: 409, .. })
    }
}
