//! API endpoints.

mod admin;
mod blogs;
mod comments;
mod reactions;
mod submissions;
mod subscribers;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest(
            "/blogs",
            blogs::router()
                .merge(comments::router())
                .merge(reactions::router()),
        )
        .nest("/submissions", submissions::router())
        .nest("/subscribers", subscribers::router())
        .nest("/admin", admin::router())
}
