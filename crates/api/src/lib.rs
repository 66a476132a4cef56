//! HTTP API layer for quillpost.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: public reader surface plus the token-guarded admin surface
//! - **Extractors**: admin authentication, client IP, visitor key, pagination
//! - **Middleware**: application state and the Tower layer stack
//!
//! Built on Axum 0.8 with Tower middleware.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
