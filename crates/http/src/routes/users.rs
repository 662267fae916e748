//! User management handlers

use crate::error::{HttpError, Result};
use crate::middleware::{CurrentUser, Privileged};
use crate::AppState;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InviteUserRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvitedUserResponse {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub owner: bool,
    pub executive: bool,
    pub disabled: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub owner: bool,
    pub executive: bool,
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(HttpError::BadRequest(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(())
}

async fn create_account(
    state: &AppState,
    email: &str,
    send_mail: bool,
) -> Result<InvitedUserResponse> {
    validate_email(email)?;
    let email = email.trim();

    if state
        .state_backend
        .get_user_by_email(email)
        .await?
        .is_some()
    {
        return Err(HttpError::Conflict(format!(
            "A user with email {email} already exists"
        )));
    }

    let (invitation, _raw_token) = state.invite_service.build_invitation(email, send_mail);
    let user_id = invitation.user.id.clone();

    // The backend persists the whole bundle in one transaction and catches
    // the race where the same email is invited twice concurrently.
    state.state_backend.create_invitation(&invitation).await?;

    Ok(InvitedUserResponse {
        user_id,
        email: email.to_string(),
    })
}

/// Invite a new user and queue the welcome email
#[utoipa::path(
    post,
    path = "/api/users/invite",
    request_body = InviteUserRequest,
    responses(
        (status = 200, description = "User invited", body = InvitedUserResponse),
        (status = 400, description = "Invalid email address"),
        (status = 403, description = "Caller not privileged"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
#[instrument(
    name = "invite_user",
    skip(caller, state, request),
    fields(caller_id = %caller.id, email = %request.email)
)]
pub async fn invite_user(
    Privileged(caller): Privileged,
    State(state): State<AppState>,
    Json(request): Json<InviteUserRequest>,
) -> Result<Json<InvitedUserResponse>> {
    let response = create_account(&state, &request.email, true).await?;
    Ok(Json(response))
}

/// Create a new user account without sending a welcome email
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = InviteUserRequest,
    responses(
        (status = 200, description = "User created", body = InvitedUserResponse),
        (status = 400, description = "Invalid email address"),
        (status = 403, description = "Caller not privileged"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
#[instrument(
    name = "create_user",
    skip(caller, state, request),
    fields(caller_id = %caller.id, email = %request.email)
)]
pub async fn create_user(
    Privileged(caller): Privileged,
    State(state): State<AppState>,
    Json(request): Json<InviteUserRequest>,
) -> Result<Json<InvitedUserResponse>> {
    let response = create_account(&state, &request.email, false).await?;
    Ok(Json(response))
}

/// List all user accounts with their profiles and claims
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [UserSummary]),
        (status = 403, description = "Caller not privileged")
    ),
    tag = "users"
)]
pub async fn list_users(
    Privileged(_caller): Privileged,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>> {
    let users = state.state_backend.list_users().await?;
    let profiles: HashMap<String, String> = state
        .state_backend
        .list_profiles()
        .await?
        .into_iter()
        .map(|profile| (profile.user_id, profile.display_name))
        .collect();

    let summaries = users
        .into_iter()
        .map(|user| {
            let display_name = profiles.get(&user.id).cloned().unwrap_or_default();
            UserSummary {
                user_id: user.id,
                email: user.email,
                display_name,
                owner: user.owner,
                executive: user.executive,
                disabled: user.disabled,
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// Return the calling user's identity and claims
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "users"
)]
pub async fn me(CurrentUser(caller): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: caller.id,
        email: caller.email,
        owner: caller.claims.owner,
        executive: caller.claims.executive,
    })
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(invite_user))
        .routes(routes!(create_user, list_users))
        .routes(routes!(me))
}
