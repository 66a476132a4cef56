//! Trailing-window rate limiting for anonymous reader actions.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Checks between opportunistic prunes of idle keys.
const PRUNE_EVERY: u64 = 1024;

/// Trailing-window counter keyed by an opaque string (visitor key or IP
/// hash). Each key keeps the timestamps of its recent actions; an action is
/// admitted only while fewer than the cap fall inside the window ending now.
#[derive(Clone)]
pub struct ActionRateLimiter {
    states: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
    checks: Arc<AtomicU64>,
    max_per_window: u64,
    window: Duration,
}

impl ActionRateLimiter {
    /// Create a limiter allowing `max_per_window` actions per `window_secs`.
    #[must_use]
    pub fn new(max_per_window: u64, window_secs: u64) -> Self {
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
            checks: Arc::new(AtomicU64::new(0)),
            max_per_window,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Record one action for `key`. `Err(retry_after_secs)` when over the cap;
    /// a denied call consumes nothing.
    pub async fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut states = self.states.write().await;

        let timestamps = states.entry(key.to_string()).or_default();
        while timestamps
            .front()
            .is_some_and(|&oldest| oldest + self.window <= now)
        {
            timestamps.pop_front();
        }

        if timestamps.len() as u64 >= self.max_per_window {
            // The oldest counted action leaving the window frees a slot
            let retry_after = timestamps.front().map_or_else(
                || self.window.as_secs(),
                |&oldest| (oldest + self.window).saturating_duration_since(now).as_secs(),
            );
            return Err(retry_after.max(1));
        }

        timestamps.push_back(now);

        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            Self::prune_locked(&mut states, now, self.window);
        }
        Ok(())
    }

    /// Drop keys whose actions all expired long ago.
    pub async fn cleanup(&self) {
        let mut states = self.states.write().await;
        Self::prune_locked(&mut states, Instant::now(), self.window);
    }

    fn prune_locked(
        states: &mut HashMap<String, VecDeque<Instant>>,
        now: Instant,
        window: Duration,
    ) {
        let horizon = window * 2;
        states.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|&last| now.saturating_duration_since(last) < horizon)
        });
    }

    /// Number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}
