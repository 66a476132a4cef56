//! Subscriber directory: signup with email verification, unsubscribe,
//! and the moderation listing.
//!
//! Only verified, active subscribers receive the new-post digest.

use chrono::Utc;
use quillpost_common::{AppError, AppResult, IdGenerator, PageResponse};
use quillpost_db::{
    entities::{
        otp_verification::OtpPurpose,
        subscriber::{self, SubscriberStatus},
    },
    repositories::SubscriberRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::email::Mailer;
use crate::services::otp::OtpService;

/// Signup payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Subscriber service.
#[derive(Clone)]
pub struct SubscriberService {
    subscribers: SubscriberRepository,
    otp: OtpService,
    mailer: Mailer,
    id_gen: IdGenerator,
}

impl SubscriberService {
    /// Create a new subscriber service.
    #[must_use]
    pub fn new(subscribers: SubscriberRepository, otp: OtpService, mailer: Mailer) -> Self {
        Self {
            subscribers,
            otp,
            mailer,
            id_gen: IdGenerator::new(),
        }
    }

    /// Start a subscription: create or revive the record unverified, then
    /// send a verification code.
    ///
    /// An already-verified active subscriber gets `BadRequest`; an
    /// unsubscribed or never-verified one is revived and re-verified.
    pub async fn subscribe(&self, request: SubscribeRequest) -> AppResult<()> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        match self.subscribers.find_by_email(&email).await? {
            Some(existing)
                if existing.status == SubscriberStatus::Active && existing.verified =>
            {
                return Err(AppError::BadRequest(
                    "This email is already subscribed".to_string(),
                ));
            }
            Some(existing) => {
                let model = subscriber::ActiveModel {
                    id: Set(existing.id),
                    name: Set(request.name.trim().to_string()),
                    status: Set(SubscriberStatus::Active),
                    verified: Set(false),
                    unsubscribed_at: Set(None),
                    ..Default::default()
                };
                self.subscribers.update(model).await?;
            }
            None => {
                let model = subscriber::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    email: Set(email.clone()),
                    name: Set(request.name.trim().to_string()),
                    status: Set(SubscriberStatus::Active),
                    verified: Set(false),
                    created_at: Set(Utc::now().into()),
                    unsubscribed_at: Set(None),
                };
                self.subscribers.create(model).await?;
            }
        }

        self.otp.issue(&email, OtpPurpose::Subscribe).await?;
        tracing::info!(email = %email, "Subscription started, verification code sent");
        Ok(())
    }

    /// Verify the emailed code and activate the subscription.
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<subscriber::Model> {
        let email = email.trim().to_lowercase();
        self.otp.verify(&email, code, OtpPurpose::Subscribe).await?;

        let existing = self
            .subscribers
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subscriber {email} not found")))?;

        let model = subscriber::ActiveModel {
            id: Set(existing.id),
            status: Set(SubscriberStatus::Active),
            verified: Set(true),
            unsubscribed_at: Set(None),
            ..Default::default()
        };
        let updated = self.subscribers.update(model).await?;

        if let Err(e) = self
            .mailer
            .send_subscription_confirmed(&updated.email, &updated.name)
            .await
        {
            tracing::warn!(error = %e, email = %updated.email, "Failed to send subscription confirmation");
        }

        Ok(updated)
    }

    /// Unsubscribe an address. Repeating the call is harmless.
    pub async fn unsubscribe(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        let existing = self
            .subscribers
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subscriber {email} not found")))?;

        if existing.status == SubscriberStatus::Unsubscribed {
            return Ok(());
        }

        let model = subscriber::ActiveModel {
            id: Set(existing.id),
            status: Set(SubscriberStatus::Unsubscribed),
            unsubscribed_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };
        self.subscribers.update(model).await?;
        tracing::info!(email = %email, "Unsubscribed");
        Ok(())
    }

    /// The notification audience: verified, active subscribers.
    pub async fn notification_audience(&self) -> AppResult<Vec<subscriber::Model>> {
        self.subscribers.list_active_verified().await
    }

    /// All subscribers for the moderation surface.
    pub async fn list(&self, page: u64, size: u64) -> AppResult<PageResponse<subscriber::Model>> {
        let (items, total) = self.subscribers.list(page, size).await?;
        Ok(PageResponse::new(items, page, size, total, total.div_ceil(size.max(1))))
    }
}
