//! OTP verification repository.

use std::sync::Arc;

use crate::entities::{OtpVerification, otp_verification};
use chrono::{DateTime, Utc};
use quillpost_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

/// OTP verification repository for database operations.
#[derive(Clone)]
pub struct OtpRepository {
    db: Arc<DatabaseConnection>,
}

impl OtpRepository {
    /// Create a new OTP repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the most recent OTP record for (email, purpose).
    ///
    /// ID is the tiebreaker for records created in the same instant.
    pub async fn find_latest(
        &self,
        email: &str,
        purpose: otp_verification::OtpPurpose,
    ) -> AppResult<Option<otp_verification::Model>> {
        OtpVerification::find()
            .filter(otp_verification::Column::Email.eq(email))
            .filter(otp_verification::Column::Purpose.eq(purpose))
            .order_by_desc(otp_verification::Column::CreatedAt)
            .order_by_desc(otp_verification::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new OTP record.
    pub async fn create(
        &self,
        model: otp_verification::ActiveModel,
    ) -> AppResult<otp_verification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the attempt counter atomically (single UPDATE query, no fetch).
    pub async fn increment_attempts(&self, id: &str) -> AppResult<()> {
        OtpVerification::update_many()
            .col_expr(
                otp_verification::Column::AttemptsCount,
                Expr::col(otp_verification::Column::AttemptsCount).add(1),
            )
            .filter(otp_verification::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Stamp a record as verified. This is terminal.
    pub async fn mark_verified(&self, id: &str, at: DateTime<Utc>) -> AppResult<()> {
        OtpVerification::update_many()
            .col_expr(otp_verification::Column::VerifiedAt, Expr::value(at))
            .filter(otp_verification::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
