//! Like/dislike toggling with post counter maintenance.
//!
//! A visitor holds at most one reaction per post. Toggling the same kind
//! removes it; toggling the other kind switches it. Counters on the post
//! are maintained with storage-level atomic increments so concurrent
//! reactions on one post cannot lose updates.

use chrono::Utc;
use quillpost_common::{AppError, AppResult, IdGenerator, hash_ip};
use quillpost_db::{
    entities::reaction::{self, ReactionKind},
    repositories::{PostRepository, ReactionRepository},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::rate_limit::ActionRateLimiter;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToggleAction {
    Added,
    Removed,
    Switched,
}

/// Counter deltas and row change for one toggle, decided before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePlan {
    /// No existing reaction: insert one.
    Add,
    /// Existing reaction of the same kind: delete it.
    Remove,
    /// Existing reaction of the other kind: flip it.
    Switch { from: ReactionKind },
}

/// Decide what a toggle request should do given the visitor's current
/// reaction.
#[must_use]
pub fn plan_toggle(existing: Option<ReactionKind>, requested: ReactionKind) -> TogglePlan {
    match existing {
        None => TogglePlan::Add,
        Some(kind) if kind == requested => TogglePlan::Remove,
        Some(kind) => TogglePlan::Switch { from: kind },
    }
}

/// Reaction state of a post as seen by one visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionStatus {
    pub likes_count: i32,
    pub dislikes_count: i32,
    /// The visitor's current reaction, absent when they hold none.
    pub user_reaction: Option<ReactionKind>,
}

/// Result of a toggle: updated counts plus what happened.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub action: ToggleAction,
    pub likes_count: i32,
    pub dislikes_count: i32,
    pub user_reaction: Option<ReactionKind>,
}

/// Reaction service.
#[derive(Clone)]
pub struct ReactionService {
    reactions: ReactionRepository,
    posts: PostRepository,
    limiter: ActionRateLimiter,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service. `reactions_per_minute` caps toggle
    /// writes per visitor key in a trailing 60-second window.
    #[must_use]
    pub fn new(
        reactions: ReactionRepository,
        posts: PostRepository,
        reactions_per_minute: u64,
    ) -> Self {
        Self {
            reactions,
            posts,
            limiter: ActionRateLimiter::new(reactions_per_minute, 60),
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle a visitor's reaction on a post.
    ///
    /// A rate-limited call changes nothing. The post must exist; its status
    /// is not checked.
    pub async fn toggle(
        &self,
        post_id: &str,
        visitor_key: &str,
        kind: ReactionKind,
        ip: Option<&str>,
    ) -> AppResult<ToggleResponse> {
        // Resolve the post first: a toggle on a missing post is NotFound,
        // never RateLimited, and must not consume a limiter slot
        let post = self.posts.get_by_id(post_id).await?;

        if let Err(retry_after) = self.limiter.check(visitor_key).await {
            return Err(AppError::RateLimited(format!(
                "Too many reactions. Try again in {retry_after} seconds"
            )));
        }

        let existing = self
            .reactions
            .find_by_post_and_visitor(&post.id, visitor_key)
            .await?;

        let plan = plan_toggle(existing.as_ref().map(|r| r.kind), kind);
        let (action, user_reaction) = match plan {
            TogglePlan::Add => {
                let model = reaction::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    post_id: Set(post.id.clone()),
                    visitor_key: Set(visitor_key.to_string()),
                    kind: Set(kind),
                    ip_hash: Set(ip.map(hash_ip)),
                    created_at: Set(Utc::now().into()),
                };
                self.reactions.create(model).await?;
                self.increment(&post.id, kind).await?;
                (ToggleAction::Added, Some(kind))
            }
            TogglePlan::Remove => {
                if let Some(row) = existing {
                    self.reactions.delete(&row.id).await?;
                }
                self.decrement(&post.id, kind).await?;
                (ToggleAction::Removed, None)
            }
            TogglePlan::Switch { from } => {
                if let Some(row) = existing {
                    let model = reaction::ActiveModel {
                        id: Set(row.id),
                        kind: Set(kind),
                        ..Default::default()
                    };
                    self.reactions.update(model).await?;
                }
                self.decrement(&post.id, from).await?;
                self.increment(&post.id, kind).await?;
                (ToggleAction::Switched, Some(kind))
            }
        };

        // Re-read for counts so the response reflects concurrent toggles too
        let post = self.posts.get_by_id(post_id).await?;
        Ok(ToggleResponse {
            action,
            likes_count: post.likes_count,
            dislikes_count: post.dislikes_count,
            user_reaction,
        })
    }

    /// Read-only reaction state. No rate check; an absent visitor key means
    /// no reaction is reported.
    pub async fn status(
        &self,
        post_id: &str,
        visitor_key: Option<&str>,
    ) -> AppResult<ReactionStatus> {
        let post = self.posts.get_by_id(post_id).await?;

        let user_reaction = match visitor_key {
            Some(key) => self
                .reactions
                .find_by_post_and_visitor(&post.id, key)
                .await?
                .map(|r| r.kind),
            None => None,
        };

        Ok(ReactionStatus {
            likes_count: post.likes_count,
            dislikes_count: post.dislikes_count,
            user_reaction,
        })
    }

    async fn increment(&self, post_id: &str, kind: ReactionKind) -> AppResult<()> {
        match kind {
            ReactionKind::Like => self.posts.increment_likes(post_id).await,
            ReactionKind::Dislike => self.posts.increment_dislikes(post_id).await,
        }
    }

    async fn decrement(&self, post_id: &str, kind: ReactionKind) -> AppResult<()> {
        match kind {
            ReactionKind::Like => self.posts.decrement_likes(post_id).await,
            ReactionKind::Dislike => self.posts.decrement_dislikes(post_id).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_existing_reaction_adds() {
        assert_eq!(plan_toggle(None, ReactionKind::Like), TogglePlan::Add);
    }

    #[test]
    fn test_same_kind_removes() {
        assert_eq!(
            plan_toggle(Some(ReactionKind::Like), ReactionKind::Like),
            TogglePlan::Remove
        );
        assert_eq!(
            plan_toggle(Some(ReactionKind::Dislike), ReactionKind::Dislike),
            TogglePlan::Remove
        );
    }

    #[test]
    fn test_opposite_kind_switches() {
        assert_eq!(
            plan_toggle(Some(ReactionKind::Like), ReactionKind::Dislike),
            TogglePlan::Switch {
                from: ReactionKind::Like
            }
        );
    }

    #[test]
    fn test_three_step_cycle_returns_to_start() {
        // ADD(LIKE) -> SWITCH(DISLIKE) -> REMOVE(DISLIKE) nets zero on both
        // counters
        let mut likes = 3i32;
        let mut dislikes = 1i32;
        let mut current: Option<ReactionKind> = None;

        for requested in [
            ReactionKind::Like,
            ReactionKind::Dislike,
            ReactionKind::Dislike,
        ] {
            match plan_toggle(current, requested) {
                TogglePlan::Add => {
                    apply(&mut likes, &mut dislikes, requested, 1);
                    current = Some(requested);
                }
                TogglePlan::Remove => {
                    apply(&mut likes, &mut dislikes, requested, -1);
                    current = None;
                }
                TogglePlan::Switch { from } => {
                    apply(&mut likes, &mut dislikes, from, -1);
                    apply(&mut likes, &mut dislikes, requested, 1);
                    current = Some(requested);
                }
            }
        }

        assert_eq!(likes, 3);
        assert_eq!(dislikes, 1);
        assert_eq!(current, None);
    }

    fn apply(likes: &mut i32, dislikes: &mut i32, kind: ReactionKind, delta: i32) {
        match kind {
            ReactionKind::Like => *likes = (*likes + delta).max(0),
            ReactionKind::Dislike => *dislikes = (*dislikes + delta).max(0),
        }
    }

    mod service {
        use super::*;
        use quillpost_db::entities::post::{self, PostStatus};
        use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
        use std::sync::Arc;

        fn published_post(likes: i32, dislikes: i32) -> post::Model {
            let now = Utc::now();
            post::Model {
                id: "post1".to_string(),
                slug: "hello-world".to_string(),
                title: "Hello World".to_string(),
                excerpt: None,
                content_html: "<p>Body</p>".to_string(),
                content_json: None,
                featured_image_url: None,
                author_name: "Alice".to_string(),
                author_email: "alice@example.com".to_string(),
                author_mobile: None,
                tags: serde_json::json!([]),
                status: PostStatus::Published,
                submitted_at: now.into(),
                published_at: Some(now.into()),
                rejection_reason: None,
                approved_by_admin_id: None,
                year: Some(2026),
                month: Some(8),
                views_count: 0,
                likes_count: likes,
                dislikes_count: dislikes,
                comments_count: 0,
                email_sent: true,
            }
        }

        fn service(db: sea_orm::DatabaseConnection) -> ReactionService {
            let db = Arc::new(db);
            ReactionService::new(ReactionRepository::new(db.clone()), PostRepository::new(db), 10)
        }

        #[tokio::test]
        async fn test_first_toggle_adds_and_counts() {
            let created = reaction::Model {
                id: "r1".to_string(),
                post_id: "post1".to_string(),
                visitor_key: "v1".to_string(),
                kind: ReactionKind::Like,
                ip_hash: None,
                created_at: Utc::now().into(),
            };
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[published_post(3, 1)]])
                .append_query_results([Vec::<reaction::Model>::new()])
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[published_post(4, 1)]])
                .into_connection();

            let response = service(db)
                .toggle("post1", "v1", ReactionKind::Like, Some("203.0.113.9"))
                .await
                .unwrap();

            assert_eq!(response.action, ToggleAction::Added);
            assert_eq!(response.likes_count, 4);
            assert_eq!(response.user_reaction, Some(ReactionKind::Like));
        }

        #[tokio::test]
        async fn test_rate_limited_toggle_changes_nothing() {
            // Only the post lookup is mocked; a limited call must issue no
            // reaction reads or writes
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[published_post(3, 1)]])
                .into_connection();
            let db = Arc::new(db);
            let service = ReactionService::new(
                ReactionRepository::new(db.clone()),
                PostRepository::new(db),
                0,
            );

            let result = service
                .toggle("post1", "v1", ReactionKind::Like, None)
                .await;
            assert!(matches!(result, Err(AppError::RateLimited(_))));
        }

        #[tokio::test]
        async fn test_toggle_on_missing_post_is_not_found_even_when_capped() {
            // The post is resolved before the limiter: a missing post
            // reports NotFound, not RateLimited, even at cap zero
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection();
            let db = Arc::new(db);
            let service = ReactionService::new(
                ReactionRepository::new(db.clone()),
                PostRepository::new(db),
                0,
            );

            let result = service
                .toggle("missing", "v1", ReactionKind::Like, None)
                .await;
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }

        #[tokio::test]
        async fn test_status_without_visitor_key_reports_none() {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[published_post(3, 1)]])
                .into_connection();

            let status = service(db).status("post1", None).await.unwrap();
            assert_eq!(status.likes_count, 3);
            assert_eq!(status.user_reaction, None);
        }
    }
}
