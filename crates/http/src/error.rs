//! HTTP error types and implementations

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quorum_core::AccessDenied;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP-specific errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Authorization failed
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            HttpError::AuthenticationFailed(_) => {
                (StatusCode::UNAUTHORIZED, "authentication_failed")
            }
            HttpError::AuthorizationFailed(_) => (StatusCode::FORBIDDEN, "authorization_failed"),
            HttpError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            HttpError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            HttpError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            HttpError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_server_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<quorum_core::Error> for HttpError {
    fn from(err: quorum_core::Error) -> Self {
        match err {
            quorum_core::Error::NotFound(msg) => HttpError::NotFound(msg),
            quorum_core::Error::AlreadyExists(msg) => HttpError::Conflict(msg),
            quorum_core::Error::InvalidInput(msg) => HttpError::BadRequest(msg),
            quorum_core::Error::State(msg) => HttpError::InternalServerError(msg),
        }
    }
}

impl From<AccessDenied> for HttpError {
    fn from(err: AccessDenied) -> Self {
        HttpError::AuthorizationFailed(err.to_string())
    }
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;
