//! Admin moderation endpoints. Every handler requires the shared bearer
//! token via [`AdminAuth`].

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use quillpost_common::{AppResult, PageResponse, page::clamp_page_size};
use quillpost_core::PostEdit;
use quillpost_db::entities::{
    comment::{self, CommentStatus},
    post::{self, PostStatus},
    subscriber,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AdminAuth, PageParams},
    middleware::AppState,
    response::ApiResponse,
};

/// A post with the moderator-only fields included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPostResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content_html: String,
    pub content_json: Option<serde_json::Value>,
    pub featured_image_url: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_mobile: Option<String>,
    pub tags: serde_json::Value,
    pub status: PostStatus,
    pub submitted_at: String,
    pub published_at: Option<String>,
    pub rejection_reason: Option<String>,
    pub approved_by_admin_id: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub views_count: i32,
    pub likes_count: i32,
    pub dislikes_count: i32,
    pub comments_count: i32,
    pub email_sent: bool,
}

impl From<post::Model> for AdminPostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            title: p.title,
            excerpt: p.excerpt,
            content_html: p.content_html,
            content_json: p.content_json,
            featured_image_url: p.featured_image_url,
            author_name: p.author_name,
            author_email: p.author_email,
            author_mobile: p.author_mobile,
            tags: p.tags,
            status: p.status,
            submitted_at: p.submitted_at.to_rfc3339(),
            published_at: p.published_at.map(|t| t.to_rfc3339()),
            rejection_reason: p.rejection_reason,
            approved_by_admin_id: p.approved_by_admin_id,
            year: p.year,
            month: p.month,
            views_count: p.views_count,
            likes_count: p.likes_count,
            dislikes_count: p.dislikes_count,
            comments_count: p.comments_count,
            email_sent: p.email_sent,
        }
    }
}

/// A comment with moderation fields included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCommentResponse {
    pub id: String,
    pub post_id: String,
    pub name: String,
    pub email: Option<String>,
    pub text: String,
    pub status: CommentStatus,
    pub created_at: String,
}

impl From<comment::Model> for AdminCommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            name: c.name,
            email: c.email,
            text: c.text,
            status: c.status,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// A subscriber as the moderator sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSubscriberResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub status: subscriber::SubscriberStatus,
    pub verified: bool,
    pub created_at: String,
    pub unsubscribed_at: Option<String>,
}

impl From<subscriber::Model> for AdminSubscriberResponse {
    fn from(s: subscriber::Model) -> Self {
        Self {
            id: s.id,
            email: s.email,
            name: s.name,
            status: s.status,
            verified: s.verified,
            created_at: s.created_at.to_rfc3339(),
            unsubscribed_at: s.unsubscribed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Post listing query for the moderation queue.
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
    pub status: Option<PostStatus>,
}

/// Comment listing query for the moderation queue.
#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
    #[serde(default = "default_comment_status")]
    pub status: CommentStatus,
}

const fn default_size() -> u64 {
    quillpost_common::page::DEFAULT_PAGE_SIZE
}

const fn default_comment_status() -> CommentStatus {
    CommentStatus::Visible
}

/// List posts for review, optionally filtered by status.
async fn list_posts(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<ApiResponse<PageResponse<AdminPostResponse>>> {
    let page = state
        .blog_service
        .list_admin(query.status, query.page, clamp_page_size(query.size))
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Fetch one post regardless of status.
async fn get_post(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminPostResponse>> {
    let post = state.blog_service.get_by_id(&id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Approve request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub admin_id: String,
}

/// Approve a pending post.
async fn approve_post(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ApproveRequest>,
) -> AppResult<ApiResponse<AdminPostResponse>> {
    let updated = state.blog_service.approve(&id, &request.admin_id).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Reject request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    pub reason: String,
}

/// Reject a pending post with a reason.
async fn reject_post(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> AppResult<ApiResponse<AdminPostResponse>> {
    let updated = state.blog_service.reject(&id, &request.reason).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Edit request body. Absent fields stay unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPostRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content_html: Option<String>,
    pub content_json: Option<serde_json::Value>,
    pub featured_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Overwrite content fields on a post. Status and slug never change here.
async fn edit_post(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<EditPostRequest>,
) -> AppResult<ApiResponse<AdminPostResponse>> {
    let edit = PostEdit {
        title: request.title,
        excerpt: request.excerpt,
        content_html: request.content_html,
        content_json: request.content_json,
        featured_image_url: request.featured_image_url,
        tags: request.tags,
    };
    let updated = state.blog_service.edit(&id, edit).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Delete a post and its comments.
async fn delete_post(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.blog_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List comments in one status for moderation.
async fn list_comments(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
) -> AppResult<ApiResponse<PageResponse<AdminCommentResponse>>> {
    let page = state
        .comment_service
        .list_by_status(query.status, query.page, clamp_page_size(query.size))
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Hide a comment.
async fn hide_comment(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminCommentResponse>> {
    let hidden = state.comment_service.hide(&id).await?;
    Ok(ApiResponse::ok(hidden.into()))
}

/// Hard-delete a comment.
async fn delete_comment(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.comment_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List subscribers.
async fn list_subscribers(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<ApiResponse<PageResponse<AdminSubscriberResponse>>> {
    let page = state
        .subscriber_service
        .list(params.page, params.size())
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route(
            "/posts/{id}",
            get(get_post).put(edit_post).delete(delete_post),
        )
        .route("/posts/{id}/approve", post(approve_post))
        .route("/posts/{id}/reject", post(reject_post))
        .route("/comments", get(list_comments))
        .route("/comments/{id}/hide", post(hide_comment))
        .route("/comments/{id}", delete(delete_comment))
        .route("/subscribers", get(list_subscribers))
}
