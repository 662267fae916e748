//! Committee blog post handlers
//!
//! Listing is offset-paged and newest-first. Hidden posts stay out of
//! every response unless a privileged caller asks for them explicitly.

use crate::error::{HttpError, Result};
use crate::middleware::{CurrentUser, Privileged};
use crate::routes::SuccessResponse;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use chrono::{DateTime, Utc};
use quorum_core::{access, BlogPost, PageRequest, Paginated, PostFilter};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub organization: String,
    /// Rich-text HTML body, stored opaquely.
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetVisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostView {
    pub id: String,
    pub author_id: String,
    pub organization: String,
    pub body: String,
    pub visible: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<BlogPost> for PostView {
    fn from(post: BlogPost) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            organization: post.organization,
            body: post.body,
            visible: post.visible,
            timestamp: post.timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostPage {
    pub items: Vec<PostView>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl From<Paginated<PostView>> for PostPage {
    fn from(page: Paginated<PostView>) -> Self {
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// Restrict to one committee; omit to list across all committees.
    pub organization: Option<String>,
    /// 1-based page number, defaults to 1.
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Include hidden posts. Privileged callers only.
    pub include_hidden: Option<bool>,
}

/// Publish a post to a committee blog
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = PostView),
        (status = 400, description = "Empty organization or body"),
        (status = 403, description = "No posting permission for this committee")
    ),
    tag = "posts"
)]
#[instrument(
    name = "create_post",
    skip(caller, state, request),
    fields(author_id = %caller.id, organization = %request.organization)
)]
pub async fn create_post(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<PostView>> {
    if request.organization.trim().is_empty() || request.body.trim().is_empty() {
        return Err(HttpError::BadRequest(
            "organization and body are required".to_string(),
        ));
    }

    // Privileged callers skip the record lookup entirely.
    if !caller.claims.is_privileged() {
        let record = state.state_backend.get_permissions(&caller.id).await?;
        access::check_posting(&caller.claims, &request.organization, record.as_ref())?;
    }

    let post = BlogPost {
        id: uuid::Uuid::new_v4().to_string(),
        author_id: caller.id,
        organization: request.organization,
        body: request.body,
        visible: true,
        timestamp: Utc::now(),
    };
    state.state_backend.create_post(&post).await?;

    Ok(Json(post.into()))
}

/// List posts, newest first, one page at a time
#[utoipa::path(
    get,
    path = "/api/posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "One page of posts", body = PostPage),
        (status = 403, description = "Hidden posts requested without privilege")
    ),
    tag = "posts"
)]
pub async fn list_posts(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostPage>> {
    let include_hidden = query.include_hidden.unwrap_or(false);
    if include_hidden {
        access::require_privileged(&caller.claims)?;
    }

    let filter = PostFilter {
        organization: query.organization,
        include_hidden,
    };
    let request = PageRequest::new(
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(state.posts_per_page),
    );

    let posts = state
        .state_backend
        .list_posts(&filter, request.limit(), request.offset())
        .await?;
    let total = state.state_backend.count_posts(&filter).await?;

    let items = posts.into_iter().map(PostView::from).collect();
    Ok(Json(Paginated::new(items, total, request).into()))
}

/// Fetch a single post
#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    params(
        ("post_id" = String, Path, description = "Post to fetch")
    ),
    responses(
        (status = 200, description = "The post", body = PostView),
        (status = 404, description = "No such post, or hidden from the caller")
    ),
    tag = "posts"
)]
pub async fn get_post(
    CurrentUser(caller): CurrentUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostView>> {
    let post = state
        .state_backend
        .get_post(&post_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("Post not found: {post_id}")))?;

    // Hidden posts are indistinguishable from absent ones for members.
    if !post.visible && !caller.claims.is_privileged() {
        return Err(HttpError::NotFound(format!("Post not found: {post_id}")));
    }

    Ok(Json(post.into()))
}

/// Replace the body of a post
#[utoipa::path(
    put,
    path = "/api/posts/{post_id}",
    params(
        ("post_id" = String, Path, description = "Post to edit")
    ),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = SuccessResponse),
        (status = 403, description = "Caller not privileged"),
        (status = 404, description = "No such post")
    ),
    tag = "posts"
)]
pub async fn update_post(
    Privileged(_caller): Privileged,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<SuccessResponse>> {
    if request.body.trim().is_empty() {
        return Err(HttpError::BadRequest("body is required".to_string()));
    }

    state
        .state_backend
        .update_post_body(&post_id, &request.body)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Hide or show a post
#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/visibility",
    params(
        ("post_id" = String, Path, description = "Post to toggle")
    ),
    request_body = SetVisibilityRequest,
    responses(
        (status = 200, description = "Visibility set", body = SuccessResponse),
        (status = 403, description = "Caller not privileged"),
        (status = 404, description = "No such post")
    ),
    tag = "posts"
)]
#[instrument(
    name = "set_post_visibility",
    skip(caller, state, request),
    fields(caller_id = %caller.id, post_id = %post_id, visible = request.visible)
)]
pub async fn set_visibility(
    Privileged(caller): Privileged,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<Json<SuccessResponse>> {
    state
        .state_backend
        .set_post_visibility(&post_id, request.visible)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Delete a post permanently
#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    params(
        ("post_id" = String, Path, description = "Post to delete")
    ),
    responses(
        (status = 200, description = "Post deleted", body = SuccessResponse),
        (status = 403, description = "Caller not privileged"),
        (status = 404, description = "No such post")
    ),
    tag = "posts"
)]
#[instrument(
    name = "delete_post",
    skip(caller, state),
    fields(caller_id = %caller.id, post_id = %post_id)
)]
pub async fn delete_post(
    Privileged(caller): Privileged,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    state.state_backend.delete_post(&post_id).await?;

    Ok(Json(SuccessResponse::ok()))
}

pub fn router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_post, list_posts))
        .routes(routes!(get_post, update_post, delete_post))
        .routes(routes!(set_visibility))
}
