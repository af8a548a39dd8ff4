//! Issuance failures and their classification.

use keygate_core::ErrorResponse;
use keygate_store::StoreError;
use thiserror::Error;

/// A classified issuance failure.
///
/// Each variant maps to a numeric code with HTTP status semantics; the
/// originating store error text rides along in `detail` for diagnostics and
/// never influences control flow.
#[derive(Debug, Error)]
pub enum IssueError {
    /// The store rejected the master key (remote 401).
    #[error("store credential was rejected, check the configured master key")]
    CredentialRejected { detail: String },

    /// No response from the store endpoint. Normalized to 404 so callers see
    /// "nothing answers at the configured address".
    #[error("store endpoint did not respond, check the configured endpoint")]
    EndpointUnreachable { detail: String },

    /// The store reported a specific error; code and message pass through.
    #[error("{message}")]
    Store {
        code: u16,
        message: String,
        detail: String,
    },

    /// Anything unclassifiable.
    #[error("unexpected failure during token issuance")]
    Internal { detail: String },
}

impl IssueError {
    /// Numeric code with HTTP status semantics.
    pub fn code(&self) -> u16 {
        match self {
            IssueError::CredentialRejected { .. } => 401,
            IssueError::EndpointUnreachable { .. } => 404,
            IssueError::Store { code, .. } => *code,
            IssueError::Internal { .. } => 500,
        }
    }

    /// Originating lower-level error text.
    pub fn detail(&self) -> &str {
        match self {
            IssueError::CredentialRejected { detail }
            | IssueError::EndpointUnreachable { detail }
            | IssueError::Store { detail, .. }
            | IssueError::Internal { detail } => detail,
        }
    }

    /// Shape this failure as the uniform error body.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string(), Some(self.detail().to_string()))
    }
}

impl From<StoreError> for IssueError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized { detail } => IssueError::CredentialRejected { detail },
            StoreError::Unreachable { detail } => IssueError::EndpointUnreachable { detail },
            StoreError::Remote { status, message } => IssueError::Store {
                code: status,
                detail: format!("store returned {status}: {message}"),
                message,
            },
            StoreError::Unexpected(detail) => IssueError::Internal { detail },
        }
    }
}
