//! Reader submission pipeline: start, verify, finish.
//!
//! A linear three-step flow. `start` caches the draft and issues an OTP,
//! `verify` proves control of the author email, and `finish` turns the
//! cached draft into a pending post. Verification state lives entirely in
//! the OTP records; the pipeline stores nothing but the draft.

use std::sync::Arc;

use chrono::Utc;
use quillpost_common::{AppError, AppResult};
use quillpost_db::entities::{otp_verification::OtpPurpose, post};
use serde::Deserialize;
use validator::Validate;

use crate::services::blog::BlogService;
use crate::services::email::Mailer;
use crate::services::otp::OtpService;
use crate::services::pending::{DraftCache, PendingDraft};

/// A reader's submission payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content_html: String,

    pub content_json: Option<serde_json::Value>,

    #[validate(url(message = "Featured image must be a valid URL"))]
    pub featured_image_url: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[validate(length(min = 1, max = 100, message = "Author name must be 1-100 characters"))]
    pub author_name: String,

    #[validate(email(message = "Author email must be a valid email address"))]
    pub author_email: String,

    pub author_mobile: Option<String>,
}

/// Submission pipeline service.
#[derive(Clone)]
pub struct SubmissionService {
    otp: OtpService,
    cache: Arc<dyn DraftCache>,
    blog: BlogService,
    mailer: Mailer,
}

impl SubmissionService {
    /// Create a new submission service.
    #[must_use]
    pub fn new(
        otp: OtpService,
        cache: Arc<dyn DraftCache>,
        blog: BlogService,
        mailer: Mailer,
    ) -> Self {
        Self {
            otp,
            cache,
            blog,
            mailer,
        }
    }

    /// Cache the draft and send a verification code to the author email.
    ///
    /// A repeat call for the same email overwrites the earlier draft.
    /// Propagates `RateLimited` when the OTP resend cooldown is running.
    pub async fn start(&self, request: SubmissionRequest) -> AppResult<()> {
        request.validate()?;

        let email = request.author_email.trim().to_lowercase();
        let draft = PendingDraft {
            title: request.title,
            excerpt: request.excerpt,
            content_html: request.content_html,
            content_json: request.content_json,
            featured_image_url: request.featured_image_url,
            tags: request.tags,
            author_name: request.author_name,
            author_email: email.clone(),
            author_mobile: request.author_mobile,
            created_at: Utc::now(),
        };

        self.cache.put(&email, draft).await;
        self.otp.issue(&email, OtpPurpose::Submission).await?;
        tracing::info!(email = %email, "Submission started, verification code sent");
        Ok(())
    }

    /// Check the emailed code.
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<()> {
        self.otp.verify(email, code, OtpPurpose::Submission).await
    }

    /// Turn the cached draft into a pending post.
    ///
    /// Safe to retry after a delivery hiccup: the draft is only consumed on
    /// success, and verification state persists across calls. A second call
    /// after success fails because the draft is gone.
    pub async fn finish(&self, email: &str) -> AppResult<post::Model> {
        let email = email.trim().to_lowercase();

        if !self.otp.is_verified(&email, OtpPurpose::Submission).await? {
            return Err(AppError::BadRequest(
                "Email is not verified. Verify the code sent to your email first".to_string(),
            ));
        }

        let draft = self.cache.take(&email).await.ok_or_else(|| {
            AppError::BadRequest(
                "No pending submission found for this email. Start a new submission".to_string(),
            )
        })?;

        let post = self.blog.create_from_draft(&draft).await?;

        if let Err(e) = self
            .mailer
            .send_submission_received(&email, &post.title)
            .await
        {
            tracing::warn!(error = %e, email = %email, "Failed to send submission-received email");
        }

        tracing::info!(post_id = %post.id, email = %email, "Submission finished");
        Ok(post)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(email: &str) -> SubmissionRequest {
        SubmissionRequest {
            title: "Hello World".to_string(),
            excerpt: None,
            content_html: "<p>Body</p>".to_string(),
            content_json: None,
            featured_image_url: None,
            tags: vec!["physics".to_string()],
            author_name: "Alice".to_string(),
            author_email: email.to_string(),
            author_mobile: None,
        }
    }

    #[test]
    fn test_request_validation_catches_blank_title() {
        let mut req = request("alice@example.com");
        req.title = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_request_validation_catches_bad_email() {
        let req = request("not-an-email");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_request_validation_accepts_complete_payload() {
        assert!(request("alice@example.com").validate().is_ok());
    }

    mod flows {
        use super::*;
        use crate::services::email::NoopTransport;
        use crate::services::pending::InMemoryDraftCache;
        use quillpost_common::config::OtpConfig;
        use quillpost_db::entities::otp_verification;
        use quillpost_db::repositories::{CommentRepository, OtpRepository, PostRepository};
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::sync::Arc;

        fn pipeline(db: sea_orm::DatabaseConnection) -> (SubmissionService, Arc<InMemoryDraftCache>) {
            let db = Arc::new(db);
            let mailer = Mailer::new(
                Arc::new(NoopTransport),
                "Quillpost".to_string(),
                "http://localhost:5173".to_string(),
            );
            let cache = Arc::new(InMemoryDraftCache::new());
            let otp = OtpService::new(OtpRepository::new(db.clone()), mailer.clone(), OtpConfig::default());
            let blog = BlogService::new(
                PostRepository::new(db.clone()),
                CommentRepository::new(db),
            );
            (
                SubmissionService::new(otp, cache.clone(), blog, mailer),
                cache,
            )
        }

        #[tokio::test]
        async fn test_finish_before_verify_fails() {
            // No OTP record at all means the email is unverified
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<otp_verification::Model>::new()])
                .into_connection();
            let (service, cache) = pipeline(db);
            cache
                .put("alice@example.com", draft_for("alice@example.com"))
                .await;

            let result = service.finish("alice@example.com").await;
            assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("not verified")));
        }

        #[tokio::test]
        async fn test_finish_without_draft_fails() {
            let verified = otp_verification::Model {
                id: "otp1".to_string(),
                email: "alice@example.com".to_string(),
                purpose: OtpPurpose::Submission,
                otp_hash: "hash".to_string(),
                expires_at: Utc::now().into(),
                attempts_count: 1,
                verified_at: Some(Utc::now().into()),
                created_at: Utc::now().into(),
            };
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[verified]])
                .into_connection();
            let (service, _cache) = pipeline(db);

            let result = service.finish("alice@example.com").await;
            assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("No pending submission")));
        }

        fn draft_for(email: &str) -> PendingDraft {
            PendingDraft {
                title: "Hello World".to_string(),
                excerpt: None,
                content_html: "<p>Body</p>".to_string(),
                content_json: None,
                featured_image_url: None,
                tags: vec![],
                author_name: "Alice".to_string(),
                author_email: email.to_string(),
                author_mobile: None,
                created_at: Utc::now(),
            }
        }
    }
}
