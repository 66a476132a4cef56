//! Pending submission draft cache.
//!
//! Holds the full submission payload between "start" and "finish", keyed by
//! the author's email. Drafts are transient; a restart loses them, and OTP
//! expiry bounds how long a stale draft stays useful.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A submission payload waiting for email verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDraft {
    pub title: String,
    pub excerpt: Option<String>,
    pub content_html: String,
    pub content_json: Option<serde_json::Value>,
    pub featured_image_url: Option<String>,
    pub tags: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_mobile: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Draft storage seam. Production uses the in-memory cache; tests can
/// substitute a deterministic fake.
#[async_trait]
pub trait DraftCache: Send + Sync {
    /// Store a draft, overwriting any earlier draft for the same email.
    async fn put(&self, email: &str, draft: PendingDraft);

    /// Remove and return the draft for this email, if present.
    async fn take(&self, email: &str) -> Option<PendingDraft>;

    /// Whether a draft is present without consuming it.
    async fn contains(&self, email: &str) -> bool;
}

/// Process-local draft cache.
#[derive(Clone, Default)]
pub struct InMemoryDraftCache {
    drafts: Arc<RwLock<HashMap<String, PendingDraft>>>,
}

impl InMemoryDraftCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftCache for InMemoryDraftCache {
    async fn put(&self, email: &str, draft: PendingDraft) {
        self.drafts
            .write()
            .await
            .insert(email.to_lowercase(), draft);
    }

    async fn take(&self, email: &str) -> Option<PendingDraft> {
        self.drafts.write().await.remove(&email.to_lowercase())
    }

    async fn contains(&self, email: &str) -> bool {
        self.drafts.read().await.contains_key(&email.to_lowercase())
    }
}
