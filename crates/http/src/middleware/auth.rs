//! Bearer-token authentication middleware

use crate::error::HttpError;
use crate::state::AppState;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};

/// Paths served without a session token.
pub fn should_skip_auth(path: &str) -> bool {
    path == "/"
        || path == "/health"
        || path == "/auth/login"
        || path == "/auth/set-password"
        || path == "/api-docs/openapi.json"
}

/// Validates the Authorization header and inserts [`AuthenticatedUser`]
/// into request extensions for the authorization extractors.
///
/// [`AuthenticatedUser`]: crate::services::AuthenticatedUser
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let path = req.uri().path();

    if should_skip_auth(path) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();

    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            HttpError::AuthenticationFailed("Missing authorization header".to_string())
        })?;

    let identity = app_state
        .auth_service
        .authenticate_from_header(auth_header)
        .inspect_err(|e| tracing::debug!(path = %parts.uri.path(), error = %e, "rejected request"))?;
    parts.extensions.insert(identity);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
