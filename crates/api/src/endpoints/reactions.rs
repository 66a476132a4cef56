//! Public reaction endpoints, nested under a blog post.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use quillpost_common::{AppError, AppResult};
use quillpost_core::{ReactionStatus, ToggleResponse};
use quillpost_db::entities::reaction::ReactionKind;
use serde::Deserialize;

use crate::{
    extractors::{ClientIp, VisitorKey},
    middleware::AppState,
    response::ApiResponse,
};

/// Toggle request body.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(rename = "type")]
    pub kind: ReactionKind,
}

/// Toggle the caller's reaction on a post.
async fn toggle(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    VisitorKey(visitor_key): VisitorKey,
    ClientIp(ip): ClientIp,
    Json(request): Json<ToggleRequest>,
) -> AppResult<ApiResponse<ToggleResponse>> {
    let visitor_key = visitor_key
        .ok_or_else(|| AppError::BadRequest("Visitor key header is required".to_string()))?;

    let response = state
        .reaction_service
        .toggle(&post_id, &visitor_key, request.kind, Some(&ip))
        .await?;
    Ok(ApiResponse::ok(response))
}

/// Read-only reaction state for a post.
async fn status(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    VisitorKey(visitor_key): VisitorKey,
) -> AppResult<ApiResponse<ReactionStatus>> {
    let response = state
        .reaction_service
        .status(&post_id, visitor_key.as_deref())
        .await?;
    Ok(ApiResponse::ok(response))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/reactions", get(status).post(toggle))
}
