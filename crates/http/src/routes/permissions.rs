//! Committee permission handlers

use crate::error::{HttpError, Result};
use crate::middleware::Privileged;
use crate::routes::SuccessResponse;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::Json;
use quorum_core::access;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TogglePermissionRequest {
    pub user_id: String,
    pub committee_id: String,
    pub value: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermissionsResponse {
    pub user_id: String,
    pub permissions: BTreeMap<String, bool>,
}

/// Toggle a single committee posting flag for a member
#[utoipa::path(
    post,
    path = "/api/permissions",
    request_body = TogglePermissionRequest,
    responses(
        (status = 200, description = "Permission updated", body = SuccessResponse),
        (status = 403, description = "Caller not privileged, or target holds a claim"),
        (status = 404, description = "Target user does not exist")
    ),
    tag = "permissions"
)]
#[instrument(
    name = "toggle_permission",
    skip(caller, state, request),
    fields(
        caller_id = %caller.id,
        target_id = %request.user_id,
        committee_id = %request.committee_id,
        value = request.value
    )
)]
pub async fn toggle_permission(
    Privileged(caller): Privileged,
    State(state): State<AppState>,
    Json(request): Json<TogglePermissionRequest>,
) -> Result<Json<SuccessResponse>> {
    if request.user_id.trim().is_empty() || request.committee_id.trim().is_empty() {
        return Err(HttpError::BadRequest(
            "user_id and committee_id are required".to_string(),
        ));
    }

    let target = state
        .state_backend
        .get_user(&request.user_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("User not found: {}", request.user_id)))?;

    // Claims trump permission records, so records of privileged users are
    // frozen rather than silently ignored.
    access::check_toggle_target(&target.claims())?;

    state
        .state_backend
        .set_permission(&request.user_id, &request.committee_id, request.value)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Fetch the committee permission record for a user
#[utoipa::path(
    get,
    path = "/api/permissions/{user_id}",
    params(
        ("user_id" = String, Path, description = "User to inspect")
    ),
    responses(
        (status = 200, description = "Permission record", body = PermissionsResponse),
        (status = 403, description = "Caller not privileged"),
        (status = 404, description = "User does not exist")
    ),
    tag = "permissions"
)]
pub async fn get_permissions(
    Privileged(_caller): Privileged,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PermissionsResponse>> {
    state
        .state_backend
        .get_user(&user_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("User not found: {user_id}")))?;

    // Users invited before a committee was added may have no record yet.
    let permissions = state
        .state_backend
        .get_permissions(&user_id)
        .await?
        .map(|record| record.permissions)
        .unwrap_or_default();

    Ok(Json(PermissionsResponse {
        user_id,
        permissions,
    }))
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(toggle_permission))
        .routes(routes!(get_permissions))
}
