//! Common utilities and shared types for quillpost.
//!
//! This crate provides foundational components used across all quillpost
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Cryptography**: OTP code generation and one-way hashing
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: The [`PageResponse`] envelope returned by every listing
//! - **Slugs**: URL-safe identifiers derived from post titles

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod page;
pub mod slug;

pub use config::Config;
pub use crypto::{generate_numeric_code, hash_ip, sha256_base64};
pub use error::{AppError, AppResult, OtpError};
pub use id::IdGenerator;
pub use page::PageResponse;
pub use slug::slugify;
