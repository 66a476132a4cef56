//! API integration tests.
//!
//! Routed end to end over a mock database: real extractors, handlers and
//! error mapping, no network or Postgres.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use quillpost_api::{AppState, router as api_router};
use quillpost_common::config::OtpConfig;
use quillpost_core::{
    BlogService, CommentService, InMemoryDraftCache, Mailer, NoopTransport, OtpService,
    ReactionService, SubmissionService, SubscriberService,
};
use quillpost_db::entities::post::{self, PostStatus};
use quillpost_db::repositories::{
    CommentRepository, OtpRepository, PostRepository, ReactionRepository, SubscriberRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "test-admin-token";

fn test_app(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);
    let mailer = Mailer::new(
        Arc::new(NoopTransport),
        "Quillpost".to_string(),
        "http://localhost:5173".to_string(),
    );

    let posts = PostRepository::new(db.clone());
    let comments = CommentRepository::new(db.clone());
    let blog_service = BlogService::new(posts.clone(), comments.clone());
    let otp = OtpService::new(OtpRepository::new(db.clone()), mailer.clone(), OtpConfig::default());

    let state = AppState {
        blog_service: blog_service.clone(),
        comment_service: CommentService::new(comments, posts.clone(), 5),
        reaction_service: ReactionService::new(ReactionRepository::new(db.clone()), posts, 10),
        submission_service: SubmissionService::new(
            otp.clone(),
            Arc::new(InMemoryDraftCache::new()),
            blog_service,
            mailer.clone(),
        ),
        subscriber_service: SubscriberService::new(
            SubscriberRepository::new(db),
            otp,
            mailer,
        ),
        admin_token: Arc::from(ADMIN_TOKEN),
    };

    api_router().with_state(state)
}

fn published_post() -> post::Model {
    let now = Utc::now();
    post::Model {
        id: "post1".to_string(),
        slug: "hello-world".to_string(),
        title: "Hello World".to_string(),
        excerpt: Some("An excerpt".to_string()),
        content_html: "<p>Body</p>".to_string(),
        content_json: None,
        featured_image_url: None,
        author_name: "Alice".to_string(),
        author_email: "alice@example.com".to_string(),
        author_mobile: None,
        tags: serde_json::json!(["physics"]),
        status: PostStatus::Published,
        submitted_at: now.into(),
        published_at: Some(now.into()),
        rejection_reason: None,
        approved_by_admin_id: Some("admin1".to_string()),
        year: Some(2026),
        month: Some(8),
        views_count: 7,
        likes_count: 3,
        dislikes_count: 1,
        comments_count: 2,
        email_sent: false,
    }
}

fn num_items(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

#[tokio::test]
async fn test_get_published_post_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[published_post()]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/blogs/hello-world")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["slug"], "hello-world");
    assert_eq!(json["data"]["likesCount"], 3);
    // Moderator-only fields never leak to the public surface
    assert!(json["data"].get("authorEmail").is_none());
}

#[tokio::test]
async fn test_pending_post_is_hidden_from_readers() {
    let mut pending = published_post();
    pending.status = PostStatus::Pending;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[pending]])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/blogs/hello-world")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_published_returns_page_envelope() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![num_items(1)]])
        .append_query_results([vec![published_post()]])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/blogs/?page=0&size=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["totalElements"], 1);
    assert_eq!(json["data"]["first"], true);
    assert_eq!(json["data"]["last"], true);
}

#[tokio::test]
async fn test_admin_surface_requires_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/admin/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_surface_rejects_wrong_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/admin/posts")
                .header(header::AUTHORIZATION, "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_posts_with_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![num_items(1)]])
        .append_query_results([vec![published_post()]])
        .into_connection();

    let response = test_app(db)
        .oneshot(
            Request::builder()
                .uri("/admin/posts")
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    // The moderator surface does include author contact details
    assert_eq!(json["data"]["items"][0]["authorEmail"], "alice@example.com");
}

#[tokio::test]
async fn test_comment_honeypot_is_rejected() {
    // The post resolves; the honeypot then stops the flow before any insert
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[published_post()]])
        .into_connection();

    let payload = serde_json::json!({
        "name": "Bob",
        "text": "Nice post",
        "website": "https://spam.example"
    });
    let response = test_app(db)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/blogs/post1/comments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reaction_toggle_requires_visitor_key() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let payload = serde_json::json!({ "type": "LIKE" });
    let response = test_app(db)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/blogs/post1/reactions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submission_start_validates_payload() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let payload = serde_json::json!({
        "title": "",
        "contentHtml": "<p>Body</p>",
        "authorName": "Alice",
        "authorEmail": "alice@example.com"
    });
    let response = test_app(db)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/submissions/start")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
