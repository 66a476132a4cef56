//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use quillpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, extension::postgres::PgExpr},
};

/// Sort orders for the public published listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    /// Newest published first.
    #[default]
    Recent,
    /// Oldest published first.
    Oldest,
    /// Most liked first.
    Popular,
    /// Most commented first.
    MostCommented,
}

impl PostSort {
    /// Parse a query-string sort key; unknown keys fall back to `Recent`.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "oldest" => Self::Oldest,
            "popular" => Self::Popular,
            "most_commented" | "mostCommented" => Self::MostCommented,
            _ => Self::Recent,
        }
    }
}

/// Filters applied to the public published listing.
#[derive(Debug, Clone, Default)]
pub struct PublishedFilter {
    /// Case-insensitive substring match on title and excerpt.
    pub search: Option<String>,
    /// Archive year filter.
    pub year: Option<i32>,
    /// Archive month filter (1-12).
    pub month: Option<i32>,
    /// Sort order.
    pub sort: PostSort,
}

/// One row of the archive index: a (year, month) bucket and its post count.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ArchiveMonthRow {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
    }

    /// Find a post by slug (any status).
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<post::Model>> {
        Post::find()
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a slug is already taken.
    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let count = Post::find()
            .filter(post::Column::Slug.eq(slug))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Comments and reactions cascade at the schema level.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List published posts with optional filters (paginated).
    ///
    /// Returns the page of posts and the total matching count.
    pub async fn list_published(
        &self,
        filter: &PublishedFilter,
        page: u64,
        size: u64,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let mut condition =
            Condition::all().add(post::Column::Status.eq(post::PostStatus::Published));

        if let Some(search) = filter.search.as_deref()
            && !search.is_empty()
        {
            let pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(post::Column::Title).ilike(&pattern))
                    .add(Expr::col(post::Column::Excerpt).ilike(&pattern)),
            );
        }

        if let Some(year) = filter.year {
            condition = condition.add(post::Column::Year.eq(year));
        }

        if let Some(month) = filter.month {
            condition = condition.add(post::Column::Month.eq(month));
        }

        let mut query = Post::find().filter(condition);
        query = match filter.sort {
            PostSort::Recent => query
                .order_by_desc(post::Column::PublishedAt)
                .order_by_desc(post::Column::Id),
            PostSort::Oldest => query
                .order_by_asc(post::Column::PublishedAt)
                .order_by_asc(post::Column::Id),
            PostSort::Popular => query
                .order_by_desc(post::Column::LikesCount)
                .order_by_desc(post::Column::Id),
            PostSort::MostCommented => query
                .order_by_desc(post::Column::CommentsCount)
                .order_by_desc(post::Column::Id),
        };

        let paginator = query.paginate(self.db.as_ref(), size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let items = paginator
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((items, total))
    }

    /// List posts by status for moderation (paginated, newest submission first).
    ///
    /// With no status every post is returned.
    pub async fn list_by_status(
        &self,
        status: Option<post::PostStatus>,
        page: u64,
        size: u64,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let mut query = Post::find();
        if let Some(status) = status {
            query = query.filter(post::Column::Status.eq(status));
        }
        let query = query
            .order_by_desc(post::Column::SubmittedAt)
            .order_by_desc(post::Column::Id);

        let paginator = query.paginate(self.db.as_ref(), size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let items = paginator
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((items, total))
    }

    /// Archive index: published post counts per (year, month), newest first.
    pub async fn archive_index(&self) -> AppResult<Vec<ArchiveMonthRow>> {
        Post::find()
            .select_only()
            .column(post::Column::Year)
            .column(post::Column::Month)
            .column_as(post::Column::Id.count(), "count")
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .filter(post::Column::Year.is_not_null())
            .filter(post::Column::Month.is_not_null())
            .group_by(post::Column::Year)
            .group_by(post::Column::Month)
            .order_by_desc(post::Column::Year)
            .order_by_desc(post::Column::Month)
            .into_model::<ArchiveMonthRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published posts whose subscriber notification has not gone out yet.
    pub async fn find_unnotified_published(&self) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .filter(post::Column::EmailSent.eq(false))
            .order_by_asc(post::Column::PublishedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a post's subscriber notification as sent.
    pub async fn mark_email_sent(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::EmailSent, Expr::value(true))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment view count atomically (single UPDATE query, no fetch).
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::ViewsCount, Expr::col(post::Column::ViewsCount).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment like count atomically (single UPDATE query, no fetch).
    pub async fn increment_likes(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::LikesCount, Expr::col(post::Column::LikesCount).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement like count atomically, never below zero.
    pub async fn decrement_likes(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::LikesCount, Expr::cust("GREATEST(likes_count - 1, 0)"))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment dislike count atomically (single UPDATE query, no fetch).
    pub async fn increment_dislikes(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::DislikesCount,
                Expr::col(post::Column::DislikesCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement dislike count atomically, never below zero.
    pub async fn decrement_dislikes(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::DislikesCount,
                Expr::cust("GREATEST(dislikes_count - 1, 0)"),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment comment count atomically (single UPDATE query, no fetch).
    pub async fn increment_comments_count(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::col(post::Column::CommentsCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement comment count atomically, never below zero.
    pub async fn decrement_comments_count(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::cust("GREATEST(comments_count - 1, 0)"),
            )
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_post(id: &str, slug: &str, status: post::PostStatus) -> post::Model {
        post::Model {
            id: id.to_string(),
            slug: slug.to_string(),
            title: "Test Post".to_string(),
            excerpt: Some("An excerpt".to_string()),
            content_html: "<p>Body</p>".to_string(),
            content_json: None,
            featured_image_url: None,
            author_name: "Alice".to_string(),
            author_email: "alice@example.com".to_string(),
            author_mobile: None,
            tags: json!([]),
            status,
            submitted_at: Utc::now().into(),
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

    #[tokio::test]
    async fn test_find_by_slug_found() {
        let post = create_test_post("post1", "hello-world", post::PostStatus::Published);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_slug("hello-world").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().slug, "hello-world");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_unnotified_published() {
        let post1 = create_test_post("post1", "one", post::PostStatus::Published);
        let post2 = create_test_post("post2", "two", post::PostStatus::Published);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post1, post2]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_unnotified_published().await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!(PostSort::from_key("oldest"), PostSort::Oldest);
        assert_eq!(PostSort::from_key("popular"), PostSort::Popular);
        assert_eq!(PostSort::from_key("most_commented"), PostSort::MostCommented);
        assert_eq!(PostSort::from_key("mostCommented"), PostSort::MostCommented);
        assert_eq!(PostSort::from_key("anything-else"), PostSort::Recent);
    }
}
