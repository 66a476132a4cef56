//! Public blog endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use quillpost_common::{AppResult, PageResponse, page::clamp_page_size};
use quillpost_db::entities::post;
use quillpost_db::repositories::{PostSort, PublishedFilter};
use quillpost_core::ArchiveYear;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Listing query for the public blog index.
#[derive(Debug, Deserialize)]
pub struct ListBlogsQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
    pub search: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub sort: Option<String>,
}

const fn default_size() -> u64 {
    quillpost_common::page::DEFAULT_PAGE_SIZE
}

/// A post as the public reader sees it. Author contact details and
/// moderation fields never appear here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content_html: String,
    pub content_json: Option<serde_json::Value>,
    pub featured_image_url: Option<String>,
    pub author_name: String,
    pub tags: serde_json::Value,
    pub published_at: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub views_count: i32,
    pub likes_count: i32,
    pub dislikes_count: i32,
    pub comments_count: i32,
}

impl From<post::Model> for BlogPostResponse {
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
            tags: p.tags,
            published_at: p.published_at.map(|t| t.to_rfc3339()),
            year: p.year,
            month: p.month,
            views_count: p.views_count,
            likes_count: p.likes_count,
            dislikes_count: p.dislikes_count,
            comments_count: p.comments_count,
        }
    }
}

/// List published posts.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListBlogsQuery>,
) -> AppResult<ApiResponse<PageResponse<BlogPostResponse>>> {
    let filter = PublishedFilter {
        search: query.search,
        year: query.year,
        month: query.month,
        sort: query.sort.as_deref().map(PostSort::from_key).unwrap_or_default(),
    };
    let page = state
        .blog_service
        .list_published(&filter, query.page, clamp_page_size(query.size))
        .await?;
    Ok(ApiResponse::ok(page.map(Into::into)))
}

/// Archive index: published-post counts by year and month.
async fn archive(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ArchiveYear>>> {
    Ok(ApiResponse::ok(state.blog_service.archive_index().await?))
}

/// Fetch one published post by slug and count the view.
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<BlogPostResponse>> {
    let post = state.blog_service.get_published_by_slug(&slug).await?;
    state.blog_service.record_view(&post.id).await;
    Ok(ApiResponse::ok(post.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/archive", get(archive))
        .route("/{id}", get(get_by_slug))
}
