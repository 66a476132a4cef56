//! Application state and the Tower layer stack.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use quillpost_core::{
    BlogService, CommentService, ReactionService, SubmissionService, SubscriberService,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub blog_service: BlogService,
    pub comment_service: CommentService,
    pub reaction_service: ReactionService,
    pub submission_service: SubmissionService,
    pub subscriber_service: SubscriberService,
    /// Shared bearer token for the admin surface.
    pub admin_token: Arc<str>,
}

/// Attach the standard middleware stack to a router.
pub fn with_layers(router: Router) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
