//! Public comment endpoints, nested under a blog post.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use quillpost_common::{AppResult, PageResponse};
use quillpost_core::CommentRequest;
use quillpost_db::entities::comment;
use serde::Serialize;

use crate::{
    extractors::{ClientIp, PageParams},
    middleware::AppState,
    response::ApiResponse,
};

/// A comment as readers see it. Email and IP hash stay private.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub name: String,
    pub text: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            name: c.name,
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// List visible comments on a post, newest first.
async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<PageResponse<CommentResponse>>> {
    let page = state
        .comment_service
        .list_visible(&post_id, params.page, params.size())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Add a comment to a post.
async fn add(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ClientIp(ip): ClientIp,
    Json(request): Json<CommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let created = state.comment_service.add(&post_id, request, &ip).await?;
    Ok(ApiResponse::ok(created.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/comments", get(list).post(add))
}
