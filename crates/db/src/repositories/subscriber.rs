//! Subscriber repository.

use std::sync::Arc;

use crate::entities::{Subscriber, subscriber};
use quillpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Subscriber repository for database operations.
#[derive(Clone)]
pub struct SubscriberRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriberRepository {
    /// Create a new subscriber repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a subscriber by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<subscriber::Model>> {
        Subscriber::find()
            .filter(subscriber::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new subscriber.
    pub async fn create(&self, model: subscriber::ActiveModel) -> AppResult<subscriber::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a subscriber.
    pub async fn update(&self, model: subscriber::ActiveModel) -> AppResult<subscriber::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All verified active subscribers (the notification audience).
    pub async fn list_active_verified(&self) -> AppResult<Vec<subscriber::Model>> {
        Subscriber::find()
            .filter(subscriber::Column::Status.eq(subscriber::SubscriberStatus::Active))
            .filter(subscriber::Column::Verified.eq(true))
            .order_by_asc(subscriber::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all subscribers for moderation (paginated, newest first).
    pub async fn list(&self, page: u64, size: u64) -> AppResult<(Vec<subscriber::Model>, u64)> {
        let query = Subscriber::find()
            .order_by_desc(subscriber::Column::CreatedAt)
            .order_by_desc(subscriber::Column::Id);

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
}
