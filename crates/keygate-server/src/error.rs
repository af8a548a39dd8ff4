//! Error shaping for the HTTP boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keygate_core::ErrorResponse;
use keygate_issuer::IssueError;
use thiserror::Error;

/// Failures the API can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request carried no usable userId. Caught locally, before any
    /// remote call.
    #[error("userId is required")]
    MissingUserId,

    /// The issuance workflow failed.
    #[error(transparent)]
    Issue(#[from] IssueError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUserId => StatusCode::BAD_REQUEST,
            // Codes outside the valid status range shape as 500.
            ApiError::Issue(err) => {
                StatusCode::from_u16(err.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::MissingUserId => {
                ErrorResponse::new(status.as_u16(), self.to_string(), None)
            }
            ApiError::Issue(err) => ErrorResponse::new(
                status.as_u16(),
                err.to_string(),
                Some(err.detail().to_string()),
            ),
        };
        (status, Json(body)).into_response()
    }
}
