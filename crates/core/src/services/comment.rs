//! Comment creation with spam defenses plus moderation.
//!
//! Comments attach to any existing post regardless of its status. Spam
//! defenses are a honeypot field and a per-IP rate limit; moderation is
//! hide and hard-delete, both keeping the post's comment counter in step.

use chrono::Utc;
use quillpost_common::{AppError, AppResult, IdGenerator, PageResponse, hash_ip};
use quillpost_db::{
    entities::comment::{self, CommentStatus},
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::sanitize::strip_all;
use crate::services::rate_limit::ActionRateLimiter;

/// A reader's comment payload. `website` is the honeypot: the form hides
/// it, so any non-blank value marks an automated submission.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub text: String,

    #[serde(default)]
    pub website: Option<String>,
}

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    comments: CommentRepository,
    posts: PostRepository,
    limiter: ActionRateLimiter,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service. `comments_per_minute` caps comments
    /// per IP hash in a trailing 60-second window.
    #[must_use]
    pub fn new(
        comments: CommentRepository,
        posts: PostRepository,
        comments_per_minute: u64,
    ) -> Self {
        Self {
            comments,
            posts,
            limiter: ActionRateLimiter::new(comments_per_minute, 60),
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a post.
    ///
    /// The post must exist but need not be published. A tripped honeypot
    /// writes nothing and reports a generic rejection.
    pub async fn add(
        &self,
        post_id: &str,
        request: CommentRequest,
        ip: &str,
    ) -> AppResult<comment::Model> {
        // Resolve the post before the spam defenses: a comment on a missing
        // post is NotFound, and a bot hammering a dead URL must not consume
        // the caller's rate-limit slots
        let post = self.posts.get_by_id(post_id).await?;

        if request
            .website
            .as_deref()
            .is_some_and(|w| !w.trim().is_empty())
        {
            tracing::info!(post_id = %post_id, "Honeypot tripped, dropping comment");
            return Err(AppError::BadRequest("Comment rejected".to_string()));
        }

        request.validate()?;

        let ip_hash = hash_ip(ip);
        if let Err(retry_after) = self.limiter.check(&ip_hash).await {
            return Err(AppError::RateLimited(format!(
                "Too many comments. Try again in {retry_after} seconds"
            )));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            name: Set(request.name.trim().to_string()),
            email: Set(request.email.map(|e| e.trim().to_lowercase())),
            text: Set(strip_all(&request.text)),
            status: Set(CommentStatus::Visible),
            ip_hash: Set(Some(ip_hash)),
            created_at: Set(Utc::now().into()),
        };
        let created = self.comments.create(model).await?;
        self.posts.increment_comments_count(&post.id).await?;
        Ok(created)
    }

    /// Hide a comment. The post's counter drops only on the actual
    /// VISIBLE to HIDDEN transition, so hiding twice cannot under-count.
    pub async fn hide(&self, comment_id: &str) -> AppResult<comment::Model> {
        let existing = self.comments.get_by_id(comment_id).await?;
        if existing.status == CommentStatus::Hidden {
            return Ok(existing);
        }
        let was_visible = existing.status == CommentStatus::Visible;

        let model = comment::ActiveModel {
            id: Set(existing.id),
            status: Set(CommentStatus::Hidden),
            ..Default::default()
        };
        let updated = self.comments.update(model).await?;

        if was_visible {
            self.posts
                .decrement_comments_count(&updated.post_id)
                .await?;
        }
        Ok(updated)
    }

    /// Hard-delete a comment, decrementing the post's counter only when the
    /// comment was still visible.
    pub async fn delete(&self, comment_id: &str) -> AppResult<()> {
        let existing = self.comments.get_by_id(comment_id).await?;
        self.comments.delete(&existing.id).await?;

        if existing.status == CommentStatus::Visible {
            self.posts
                .decrement_comments_count(&existing.post_id)
                .await?;
        }
        Ok(())
    }

    /// Visible comments on a post, newest first.
    pub async fn list_visible(
        &self,
        post_id: &str,
        page: u64,
        size: u64,
    ) -> AppResult<PageResponse<comment::Model>> {
        let (items, total) = self.comments.list_visible_by_post(post_id, page, size).await?;
        Ok(PageResponse::new(items, page, size, total, total.div_ceil(size.max(1))))
    }

    /// Comments in one status, for the moderation queue.
    pub async fn list_by_status(
        &self,
        status: CommentStatus,
        page: u64,
        size: u64,
    ) -> AppResult<PageResponse<comment::Model>> {
        let (items, total) = self.comments.list_by_status(status, page, size).await?;
        Ok(PageResponse::new(items, page, size, total, total.div_ceil(size.max(1))))
    }
}
