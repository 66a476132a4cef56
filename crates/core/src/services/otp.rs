//! OTP issuance and verification.
//!
//! Codes prove control of an email address for a bounded window. Only the
//! hash of a code is stored; each issue creates a fresh record that
//! supersedes earlier ones for the same (email, purpose).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use quillpost_common::{
    AppError, AppResult, IdGenerator, OtpError, config::OtpConfig, generate_numeric_code,
    sha256_base64,
};
use quillpost_db::{
    entities::otp_verification::{self, OtpPurpose},
    repositories::OtpRepository,
};
use sea_orm::Set;
use tokio::sync::Mutex;

use crate::services::email::Mailer;

/// Per-(email, purpose) locks. The check-then-increment sequence in verify
/// must not race for the same key, or two concurrent wrong guesses could
/// both slip past the attempt cap.
#[derive(Clone, Default)]
struct KeyedLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

/// Map size that triggers a sweep of unheld locks in [`KeyedLocks::get`].
const LOCKS_SWEEP_THRESHOLD: usize = 512;

impl KeyedLocks {
    async fn get(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        let lock = locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        if locks.len() > LOCKS_SWEEP_THRESHOLD {
            // A count above 1 means a caller still holds a clone; the one
            // just handed out keeps its own entry alive
            locks.retain(|_, l| Arc::strong_count(l) > 1);
        }
        lock
    }
}

/// What a single verify attempt should do, decided without touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The record is terminal; a prior verify already succeeded.
    AlreadyVerified,
    /// The code's window has passed.
    Expired,
    /// The cap was reached on an earlier call; this one consumes nothing.
    AttemptsExceeded,
    /// Wrong code; the attempt counts against the cap.
    Invalid {
        /// Attempts left after this one.
        remaining: u32,
    },
    /// Correct code; the record becomes terminal.
    Valid,
}

/// Evaluate a verify attempt against the most-recent record.
///
/// Check order matters: a terminal record wins over expiry, expiry wins
/// over the attempt cap, and the cap is checked before this attempt is
/// consumed.
#[must_use]
pub fn evaluate_code(
    record: &otp_verification::Model,
    code: &str,
    max_attempts: u32,
    now: DateTime<Utc>,
) -> VerifyOutcome {
    if record.verified_at.is_some() {
        return VerifyOutcome::AlreadyVerified;
    }
    if now > record.expires_at {
        return VerifyOutcome::Expired;
    }
    let attempts = u32::try_from(record.attempts_count).unwrap_or(0);
    if attempts >= max_attempts {
        return VerifyOutcome::AttemptsExceeded;
    }
    if sha256_base64(code) == record.otp_hash {
        VerifyOutcome::Valid
    } else {
        VerifyOutcome::Invalid {
            remaining: max_attempts - (attempts + 1),
        }
    }
}

/// OTP service for issuing and checking verification codes.
#[derive(Clone)]
pub struct OtpService {
    repo: OtpRepository,
    mailer: Mailer,
    config: OtpConfig,
    id_gen: IdGenerator,
    locks: KeyedLocks,
}

impl OtpService {
    /// Create a new OTP service.
    #[must_use]
    pub fn new(repo: OtpRepository, mailer: Mailer, config: OtpConfig) -> Self {
        Self {
            repo,
            mailer,
            config,
            id_gen: IdGenerator::new(),
            locks: KeyedLocks::default(),
        }
    }

    /// Issue a fresh code for (email, purpose) and email it to the address.
    ///
    /// Fails with `RateLimited` while the resend cooldown from the previous
    /// issue is still running. Email delivery is best-effort; a failed send
    /// is logged and the stored record stays authoritative.
    pub async fn issue(&self, email: &str, purpose: OtpPurpose) -> AppResult<otp_verification::Model> {
        let email = normalize_email(email);
        let lock = self.locks.get(&lock_key(&email, purpose)).await;
        let _guard = lock.lock().await;

        let now = Utc::now();
        if let Some(latest) = self.repo.find_latest(&email, purpose).await? {
            let elapsed = now.signed_duration_since(latest.created_at);
            let cooldown = Duration::seconds(self.config.resend_cooldown_secs);
            if elapsed < cooldown {
                let wait = (cooldown - elapsed).num_seconds().max(1);
                return Err(AppError::RateLimited(format!(
                    "Please wait {wait} seconds before requesting a new code"
                )));
            }
        }

        let code = generate_numeric_code(self.config.length);
        let model = otp_verification::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email.clone()),
            purpose: Set(purpose),
            otp_hash: Set(sha256_base64(&code)),
            expires_at: Set((now + Duration::minutes(self.config.expiry_minutes)).into()),
            attempts_count: Set(0),
            verified_at: Set(None),
            created_at: Set(now.into()),
        };
        let record = self.repo.create(model).await?;

        if let Err(e) = self
            .mailer
            .send_otp(&email, &code, self.config.expiry_minutes)
            .await
        {
            tracing::warn!(error = %e, email = %email, "Failed to send OTP email");
        }

        Ok(record)
    }

    /// Verify a code against the most-recent record for (email, purpose).
    pub async fn verify(&self, email: &str, code: &str, purpose: OtpPurpose) -> AppResult<()> {
        let email = normalize_email(email);
        let lock = self.locks.get(&lock_key(&email, purpose)).await;
        let _guard = lock.lock().await;

        let record = self
            .repo
            .find_latest(&email, purpose)
            .await?
            .ok_or(OtpError::NotFound)?;

        match evaluate_code(&record, code, self.config.max_attempts, Utc::now()) {
            VerifyOutcome::AlreadyVerified => Err(OtpError::AlreadyVerified.into()),
            VerifyOutcome::Expired => Err(OtpError::Expired.into()),
            VerifyOutcome::AttemptsExceeded => Err(OtpError::AttemptsExceeded.into()),
            VerifyOutcome::Invalid { remaining } => {
                self.repo.increment_attempts(&record.id).await?;
                Err(OtpError::InvalidCode { remaining }.into())
            }
            VerifyOutcome::Valid => {
                self.repo.increment_attempts(&record.id).await?;
                self.repo.mark_verified(&record.id, Utc::now()).await?;
                Ok(())
            }
        }
    }

    /// Whether the most-recent record for (email, purpose) has been verified.
    pub async fn is_verified(&self, email: &str, purpose: OtpPurpose) -> AppResult<bool> {
        let email = normalize_email(email);
        Ok(self
            .repo
            .find_latest(&email, purpose)
            .await?
            .is_some_and(|r| r.verified_at.is_some()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn lock_key(email: &str, purpose: OtpPurpose) -> String {
    let tag = match purpose {
        OtpPurpose::Submission => "submission",
        OtpPurpose::Subscribe => "subscribe",
    };
    format!("{email}:{tag}")
}
