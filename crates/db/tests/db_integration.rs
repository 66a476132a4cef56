//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `quillpost_test`)
//!   `TEST_DB_PASSWORD` (default: `quillpost_test`)
//!   `TEST_DB_NAME` (default: `quillpost_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use quillpost_common::IdGenerator;
use quillpost_db::entities::post::{self, PostStatus};
use quillpost_db::repositories::PostRepository;
use quillpost_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

fn pending_post(id: &str, slug: &str) -> post::ActiveModel {
    let now = Utc::now();
    post::ActiveModel {
        id: Set(id.to_string()),
        slug: Set(slug.to_string()),
        title: Set("Integration test post".to_string()),
        excerpt: Set(None),
        content_html: Set("<p>Body</p>".to_string()),
        content_json: Set(None),
        featured_image_url: Set(None),
        author_name: Set("Alice".to_string()),
        author_email: Set("alice@example.com".to_string()),
        author_mobile: Set(None),
        tags: Set(serde_json::json!([])),
        status: Set(PostStatus::Pending),
        submitted_at: Set(now.into()),
        published_at: Set(None),
        rejection_reason: Set(None),
        approved_by_admin_id: Set(None),
        year: Set(None),
        month: Set(None),
        views_count: Set(0),
        likes_count: Set(0),
        dislikes_count: Set(0),
        comments_count: Set(0),
        email_sent: Set(false),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_create_and_find_post_by_slug() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    quillpost_db::migrate(db.connection())
        .await
        .expect("Migrations failed");

    let repo = PostRepository::new(Arc::new(db.conn));
    let id = IdGenerator::new().generate();
    let slug = format!("integration-{id}");

    let created = repo.create(pending_post(&id, &slug)).await.unwrap();
    assert_eq!(created.status, PostStatus::Pending);

    let found = repo.find_by_slug(&slug).await.unwrap();
    assert_eq!(found.map(|p| p.id), Some(id.clone()));
    assert!(repo.slug_exists(&slug).await.unwrap());

    repo.delete(&id).await.unwrap();
    assert!(repo.find_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_like_counter_floors_at_zero() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    quillpost_db::migrate(db.connection())
        .await
        .expect("Migrations failed");

    let repo = PostRepository::new(Arc::new(db.conn));
    let id = IdGenerator::new().generate();
    let slug = format!("integration-{id}");
    repo.create(pending_post(&id, &slug)).await.unwrap();

    // Decrement on a zero counter must not go negative
    repo.decrement_likes(&id).await.unwrap();
    let post = repo.get_by_id(&id).await.unwrap();
    assert_eq!(post.likes_count, 0);

    repo.increment_likes(&id).await.unwrap();
    repo.increment_likes(&id).await.unwrap();
    repo.decrement_likes(&id).await.unwrap();
    let post = repo.get_by_id(&id).await.unwrap();
    assert_eq!(post.likes_count, 1);

    repo.delete(&id).await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
