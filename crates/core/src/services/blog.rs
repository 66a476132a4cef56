//! Post lifecycle: creation, review transitions, listings and the archive.
//!
//! Status transitions are narrow: submissions enter at `Pending`, an admin
//! moves them to `Published` or `Rejected`, and neither of those states is
//! re-enterable. Edits overwrite content without touching status.

use chrono::{Datelike, Utc};
use quillpost_common::{AppError, AppResult, IdGenerator, PageResponse, slugify};
use quillpost_db::{
    entities::post::{self, PostStatus},
    repositories::{ArchiveMonthRow, CommentRepository, PostRepository, PublishedFilter},
};
use sea_orm::Set;
use serde::Serialize;

use crate::sanitize::sanitize_html;
use crate::services::pending::PendingDraft;

/// Content fields an admin may overwrite on an existing post.
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content_html: Option<String>,
    pub content_json: Option<serde_json::Value>,
    pub featured_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// One month's published-post count in the archive index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveMonth {
    pub month: i32,
    pub count: i64,
}

/// One year of the archive index, months descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveYear {
    pub year: i32,
    pub months: Vec<ArchiveMonth>,
}

fn status_name(status: PostStatus) -> &'static str {
    match status {
        PostStatus::Draft => "DRAFT",
        PostStatus::Pending => "PENDING",
        PostStatus::Published => "PUBLISHED",
        PostStatus::Rejected => "REJECTED",
    }
}

/// Guard for review transitions, which are only legal from `Pending`.
fn require_pending(post: &post::Model, action: &str) -> AppResult<()> {
    if post.status == PostStatus::Pending {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Cannot {action} a post in status {}; it must be PENDING",
            status_name(post.status)
        )))
    }
}

/// Nest flat (year, month, count) rows into per-year groups. Input arrives
/// already sorted descending by year then month.
fn group_archive(rows: Vec<ArchiveMonthRow>) -> Vec<ArchiveYear> {
    let mut years: Vec<ArchiveYear> = Vec::new();
    for row in rows {
        match years.last_mut() {
            Some(year) if year.year == row.year => year.months.push(ArchiveMonth {
                month: row.month,
                count: row.count,
            }),
            _ => years.push(ArchiveYear {
                year: row.year,
                months: vec![ArchiveMonth {
                    month: row.month,
                    count: row.count,
                }],
            }),
        }
    }
    years
}

/// Blog post service.
#[derive(Clone)]
pub struct BlogService {
    posts: PostRepository,
    comments: CommentRepository,
    id_gen: IdGenerator,
}

impl BlogService {
    /// Create a new blog service.
    #[must_use]
    pub fn new(posts: PostRepository, comments: CommentRepository) -> Self {
        Self {
            posts,
            comments,
            id_gen: IdGenerator::new(),
        }
    }

    /// Access to the post repository for sibling services.
    #[must_use]
    pub const fn posts(&self) -> &PostRepository {
        &self.posts
    }

    /// Create a `Pending` post from a verified submission draft.
    pub async fn create_from_draft(&self, draft: &PendingDraft) -> AppResult<post::Model> {
        let slug = self.unique_slug(&draft.title).await?;
        let tags = serde_json::to_value(&draft.tags)
            .map_err(|e| AppError::Internal(format!("Failed to encode tags: {e}")))?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            slug: Set(slug),
            title: Set(draft.title.trim().to_string()),
            excerpt: Set(draft.excerpt.clone()),
            content_html: Set(sanitize_html(&draft.content_html)),
            content_json: Set(draft.content_json.clone()),
            featured_image_url: Set(draft.featured_image_url.clone()),
            author_name: Set(draft.author_name.trim().to_string()),
            author_email: Set(draft.author_email.trim().to_lowercase()),
            author_mobile: Set(draft.author_mobile.clone()),
            tags: Set(tags),
            status: Set(PostStatus::Pending),
            submitted_at: Set(Utc::now().into()),
            published_at: Set(None),
            rejection_reason: Set(None),
            approved_by_admin_id: Set(None),
            year: Set(None),
            month: Set(None),
            views_count: Set(0),
            likes_count: Set(0),
            dislikes_count: Set(0),
            comments_count: Set(0),
            email_sent: Set(false),
        };
        self.posts.create(model).await
    }

    /// Derive a free slug from a title, suffixing `-1`, `-2`, ... until one
    /// is unclaimed. Slugs are immutable once assigned.
    async fn unique_slug(&self, title: &str) -> AppResult<String> {
        let base = slugify(title);
        let base = if base.is_empty() {
            "post".to_string()
        } else {
            base
        };

        if !self.posts.slug_exists(&base).await? {
            return Ok(base);
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.posts.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Fetch a post for the public reader surface. Only published posts
    /// exist from the reader's point of view.
    pub async fn get_published_by_slug(&self, slug: &str) -> AppResult<post::Model> {
        self.posts
            .find_by_slug(slug)
            .await?
            .filter(|p| p.status == PostStatus::Published)
            .ok_or_else(|| AppError::NotFound(format!("Post {slug} not found")))
    }

    /// Fetch a post by ID regardless of status (moderator surface).
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.posts.get_by_id(id).await
    }

    /// List published posts for readers.
    pub async fn list_published(
        &self,
        filter: &PublishedFilter,
        page: u64,
        size: u64,
    ) -> AppResult<PageResponse<post::Model>> {
        let (items, total) = self.posts.list_published(filter, page, size).await?;
        Ok(PageResponse::new(items, page, size, total, total.div_ceil(size.max(1))))
    }

    /// List posts for the moderation queue, optionally filtered by status.
    pub async fn list_admin(
        &self,
        status: Option<PostStatus>,
        page: u64,
        size: u64,
    ) -> AppResult<PageResponse<post::Model>> {
        let (items, total) = self.posts.list_by_status(status, page, size).await?;
        Ok(PageResponse::new(items, page, size, total, total.div_ceil(size.max(1))))
    }

    /// Approve a pending post, publishing it into the archive.
    pub async fn approve(&self, id: &str, admin_id: &str) -> AppResult<post::Model> {
        let post = self.posts.get_by_id(id).await?;
        require_pending(&post, "approve")?;

        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(post.id),
            status: Set(PostStatus::Published),
            published_at: Set(Some(now.into())),
            year: Set(Some(now.year())),
            month: Set(Some(now.month() as i32)),
            approved_by_admin_id: Set(Some(admin_id.to_string())),
            rejection_reason: Set(None),
            ..Default::default()
        };
        let updated = self.posts.update(model).await?;
        tracing::info!(post_id = %updated.id, admin_id = %admin_id, "Post approved");
        Ok(updated)
    }

    /// Reject a pending post with a reason. `published_at` stays unset.
    pub async fn reject(&self, id: &str, reason: &str) -> AppResult<post::Model> {
        let post = self.posts.get_by_id(id).await?;
        require_pending(&post, "reject")?;

        let model = post::ActiveModel {
            id: Set(post.id),
            status: Set(PostStatus::Rejected),
            rejection_reason: Set(Some(reason.to_string())),
            ..Default::default()
        };
        let updated = self.posts.update(model).await?;
        tracing::info!(post_id = %updated.id, "Post rejected");
        Ok(updated)
    }

    /// Overwrite content fields. Valid in any status; never changes status
    /// or slug.
    pub async fn edit(&self, id: &str, edit: PostEdit) -> AppResult<post::Model> {
        let post = self.posts.get_by_id(id).await?;

        let mut model = post::ActiveModel {
            id: Set(post.id),
            ..Default::default()
        };
        if let Some(title) = edit.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(excerpt) = edit.excerpt {
            model.excerpt = Set(Some(excerpt));
        }
        if let Some(html) = edit.content_html {
            model.content_html = Set(sanitize_html(&html));
        }
        if let Some(json) = edit.content_json {
            model.content_json = Set(Some(json));
        }
        if let Some(url) = edit.featured_image_url {
            model.featured_image_url = Set(Some(url));
        }
        if let Some(tags) = edit.tags {
            let tags = serde_json::to_value(&tags)
                .map_err(|e| AppError::Internal(format!("Failed to encode tags: {e}")))?;
            model.tags = Set(tags);
        }
        self.posts.update(model).await
    }

    /// Delete a post and every comment attached to it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let post = self.posts.get_by_id(id).await?;
        let removed = self.comments.delete_by_post(&post.id).await?;
        self.posts.delete(&post.id).await?;
        tracing::info!(post_id = %post.id, comments_removed = removed, "Post deleted");
        Ok(())
    }

    /// Published-post counts grouped by year and month, both descending.
    pub async fn archive_index(&self) -> AppResult<Vec<ArchiveYear>> {
        let rows = self.posts.archive_index().await?;
        Ok(group_archive(rows))
    }

    /// Count a view. Must never fail the read path; a missing post or a
    /// storage error is logged and ignored.
    pub async fn record_view(&self, id: &str) {
        if let Err(e) = self.posts.increment_views(id).await {
            tracing::warn!(error = %e, post_id = %id, "Failed to record view");
        }
    }

    /// Published posts the subscriber digest has not covered yet.
    pub async fn list_unnotified_published(&self) -> AppResult<Vec<post::Model>> {
        self.posts.find_unnotified_published().await
    }

    /// Mark posts as covered by a sent digest.
    pub async fn mark_notified(&self, ids: &[String]) -> AppResult<()> {
        for id in ids {
            self.posts.mark_email_sent(id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use quillpost_db::repositories::PostSort;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: sea_orm::DatabaseConnection) -> BlogService {
        let db = Arc::new(db);
        BlogService::new(PostRepository::new(db.clone()), CommentRepository::new(db))
    }

    fn post_with_status(status: PostStatus) -> post::Model {
        let now = Utc::now();
        post::Model {
            id: "post1".to_string(),
            slug: "hello-world".to_string(),
            title: "Hello World".to_string(),
            excerpt: Some("An excerpt".to_string()),
            content_html: "<p>Body</p>".to_string(),
            content_json: None,
            featured_image_url: None,
            author_name: "Alice".to_string(),
            author_email: "alice@example.com".to_string(),
            author_mobile: None,
            tags: serde_json::json!(["physics"]),
            status,
            submitted_at: now.into(),
            published_at: None,
            rejection_reason: None,
            approved_by_admin_id: None,
            year: None,
            month: None,
            views_count: 0,
            likes_count: 0,
            dislikes_count: 0,
            comments_count: 0,
            email_sent: false,
        }
    }

    #[test]
    fn test_transition_guard_names_current_and_required_state() {
        let post = post_with_status(PostStatus::Published);
        let err = require_pending(&post, "approve").unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("PUBLISHED"));
                assert!(msg.contains("PENDING"));
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_transition_guard_allows_pending() {
        let post = post_with_status(PostStatus::Pending);
        assert!(require_pending(&post, "approve").is_ok());
    }

    #[test]
    fn test_archive_rows_nest_by_year_descending() {
        let rows = vec![
            ArchiveMonthRow {
                year: 2026,
                month: 3,
                count: 2,
            },
            ArchiveMonthRow {
                year: 2026,
                month: 1,
                count: 1,
            },
            ArchiveMonthRow {
                year: 2025,
                month: 12,
                count: 4,
            },
        ];

        let nested = group_archive(rows);
        assert_eq!(
            nested,
            vec![
                ArchiveYear {
                    year: 2026,
                    months: vec![
                        ArchiveMonth { month: 3, count: 2 },
                        ArchiveMonth { month: 1, count: 1 },
                    ],
                },
                ArchiveYear {
                    year: 2025,
                    months: vec![ArchiveMonth {
                        month: 12,
                        count: 4
                    }],
                },
            ]
        );
    }

    #[test]
    fn test_archive_empty_is_empty() {
        assert!(group_archive(vec![]).is_empty());
    }

    #[tokio::test]
    async fn test_approve_rejects_non_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post_with_status(PostStatus::Published)]])
            .into_connection();

        let result = service(db).approve("post1", "admin1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_approve_publishes_pending_post() {
        let mut published = post_with_status(PostStatus::Published);
        published.published_at = Some(Utc::now().into());
        published.year = Some(2026);
        published.month = Some(8);
        published.approved_by_admin_id = Some("admin1".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![post_with_status(PostStatus::Pending)],
                vec![published],
            ])
            .into_connection();

        let updated = service(db).approve("post1", "admin1").await.unwrap();
        assert_eq!(updated.status, PostStatus::Published);
        assert!(updated.published_at.is_some());
        assert_eq!(updated.approved_by_admin_id.as_deref(), Some("admin1"));
    }

    #[tokio::test]
    async fn test_reject_requires_pending() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post_with_status(PostStatus::Rejected)]])
            .into_connection();

        let result = service(db).reject("post1", "off topic").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_published_post_hidden_until_published() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post_with_status(PostStatus::Pending)]])
            .into_connection();

        let result = service(db).get_published_by_slug("hello-world").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_published_wraps_page_envelope() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                maplit_num_items(3),
            ]])
            .append_query_results([vec![
                post_with_status(PostStatus::Published),
                post_with_status(PostStatus::Published),
                post_with_status(PostStatus::Published),
            ]])
            .into_connection();

        let filter = PublishedFilter {
            search: None,
            year: None,
            month: None,
            sort: PostSort::Recent,
        };
        let page = service(db).list_published(&filter, 0, 10).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 1);
        assert!(page.first);
        assert!(page.last);
    }

    fn maplit_num_items(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(n)))])
    }
}
