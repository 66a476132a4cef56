//! Core business logic for quillpost.

pub mod sanitize;
pub mod services;

pub use services::*;
