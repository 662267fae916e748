//! Role claim handlers
//!
//! Claim mutation is the one owner-only surface of the API; lookups are
//! open to any authenticated caller so dashboards can label users.

use crate::error::{HttpError, Result};
use crate::middleware::{CurrentUser, OwnerOnly};
use crate::routes::SuccessResponse;
use crate::AppState;
use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetExecutiveRequest {
    pub user_id: String,
    pub executive: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimsLookupRequest {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserClaims {
    pub owner: bool,
    pub executive: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimsLookupResponse {
    pub claims: BTreeMap<String, UserClaims>,
}

/// Grant or revoke the executive claim (owner only)
#[utoipa::path(
    post,
    path = "/api/claims/executive",
    request_body = SetExecutiveRequest,
    responses(
        (status = 200, description = "Claim updated", body = SuccessResponse),
        (status = 400, description = "Missing user id"),
        (status = 403, description = "Caller is not an owner"),
        (status = 404, description = "Target user does not exist")
    ),
    tag = "claims"
)]
#[instrument(
    name = "set_executive",
    skip(caller, state, request),
    fields(
        caller_id = %caller.id,
        target_id = %request.user_id,
        executive = request.executive
    )
)]
pub async fn set_executive(
    OwnerOnly(caller): OwnerOnly,
    State(state): State<AppState>,
    Json(request): Json<SetExecutiveRequest>,
) -> Result<Json<SuccessResponse>> {
    if request.user_id.trim().is_empty() {
        return Err(HttpError::BadRequest("user_id is required".to_string()));
    }

    state
        .state_backend
        .set_executive(&request.user_id, request.executive)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Look up role claims for a batch of user ids
#[utoipa::path(
    post,
    path = "/api/claims/lookup",
    request_body = ClaimsLookupRequest,
    responses(
        (status = 200, description = "Claims for every requested user", body = ClaimsLookupResponse),
        (status = 404, description = "A requested user does not exist")
    ),
    tag = "claims"
)]
pub async fn lookup_claims(
    CurrentUser(_caller): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<ClaimsLookupRequest>,
) -> Result<Json<ClaimsLookupResponse>> {
    let mut claims = BTreeMap::new();
    for user_id in &request.user_ids {
        let user = state
            .state_backend
            .get_user(user_id)
            .await?
            .ok_or_else(|| HttpError::NotFound(format!("User not found: {user_id}")))?;

        claims.insert(
            user_id.clone(),
            UserClaims {
                owner: user.owner,
                executive: user.executive,
            },
        );
    }

    Ok(Json(ClaimsLookupResponse { claims }))
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(set_executive))
        .routes(routes!(lookup_claims))
}
