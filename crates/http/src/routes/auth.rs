//! Login and password-set handlers

use crate::error::Result;
use crate::routes::SuccessResponse;
use crate::AppState;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub owner: bool,
    pub executive: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    /// Raw token from the password-set link.
    pub token: String,
    pub password: String,
}

/// Verify credentials and issue a session token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials or disabled account")
    ),
    tag = "auth"
)]
#[instrument(name = "login", skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, token) = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        owner: user.owner,
        executive: user.executive,
    }))
}

/// Consume a password-set token and set the account password
#[utoipa::path(
    post,
    path = "/auth/set-password",
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password set", body = SuccessResponse),
        (status = 400, description = "Invalid, used or expired token")
    ),
    tag = "auth"
)]
#[instrument(name = "set_password", skip_all)]
pub async fn set_password(
    State(state): State<AppState>,
    Json(request): Json<SetPasswordRequest>,
) -> Result<Json<SuccessResponse>> {
    state
        .auth_service
        .set_password(&request.token, &request.password)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(set_password))
}
