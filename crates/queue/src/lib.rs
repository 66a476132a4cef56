//! Background jobs for quillpost.
//!
//! Currently a single job: the subscriber notifier, which periodically
//! emails a digest of newly published posts to verified subscribers.

pub mod notifier;

pub use notifier::{Notifier, run_notifier};
