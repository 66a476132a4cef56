//! Subscriber notification job.
//!
//! On a fixed interval, collects published posts the digest has not
//! covered yet, sends one summary email per verified active subscriber,
//! and marks the posts covered. The job owns no state; every run works
//! from the post and subscriber tables alone.

use std::sync::Arc;
use std::time::Duration;

use quillpost_common::{AppResult, config::NotificationConfig};
use quillpost_core::services::blog::BlogService;
use quillpost_core::services::email::Mailer;
use quillpost_core::services::subscriber::SubscriberService;
use tokio::time::interval;

/// The subscriber notifier.
#[derive(Clone)]
pub struct Notifier {
    blog: BlogService,
    subscribers: SubscriberService,
    mailer: Mailer,
}

impl Notifier {
    /// Create a new notifier.
    #[must_use]
    pub const fn new(blog: BlogService, subscribers: SubscriberService, mailer: Mailer) -> Self {
        Self {
            blog,
            subscribers,
            mailer,
        }
    }

    /// One notification pass. Returns the number of digests delivered.
    ///
    /// Posts are marked covered even when the audience is empty or every
    /// send fails, so a later signup never triggers a backlog dump and a
    /// flaky SMTP hop cannot re-send old posts forever.
    pub async fn notify_once(&self) -> AppResult<u64> {
        let posts = self.blog.list_unnotified_published().await?;
        if posts.is_empty() {
            return Ok(0);
        }

        let audience = self.subscribers.notification_audience().await?;
        let mut delivered = 0u64;
        for subscriber in &audience {
            match self
                .mailer
                .send_new_posts_digest(&subscriber.email, &subscriber.name, &posts)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(error = %e, email = %subscriber.email, "Failed to send digest");
                }
            }
        }

        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        self.blog.mark_notified(&ids).await?;

        tracing::info!(
            posts = posts.len(),
            subscribers = audience.len(),
            delivered,
            "Subscriber notification pass complete"
        );
        Ok(delivered)
    }
}

/// Spawn the notifier loop. Returns immediately; the loop runs until the
/// process exits.
pub fn run_notifier(config: &NotificationConfig, notifier: Arc<Notifier>) {
    let period = Duration::from_secs(config.interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = notifier.notify_once().await {
                tracing::error!(error = %e, "Subscriber notification pass failed");
            }
        }
    });
}
