//! API route definitions

use crate::middleware::auth::auth_middleware;
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_axum::router::OpenApiRouter;

pub mod auth;
pub mod claims;
pub mod health;
pub mod permissions;
pub mod posts;
pub mod users;

/// Generic `{success}` body returned by mutation endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(OpenApi)]
#[openapi(tags(
    (name = "health", description = "Service health"),
    (name = "auth", description = "Login and password management"),
    (name = "claims", description = "Role claim management"),
    (name = "permissions", description = "Committee permission management"),
    (name = "users", description = "User management endpoints"),
    (name = "posts", description = "Committee blog posts"),
))]
struct ApiDoc;

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(health::router())
        .merge(auth::router())
        .merge(claims::router())
        .merge(permissions::router())
        .merge(users::router())
        .merge(posts::router())
}

/// Assemble the application router with authentication applied.
pub fn app(state: AppState) -> Router {
    let (router, api) = router().split_for_parts();
    router
        .route("/api-docs/openapi.json", get(|| async move { Json(api) }))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
