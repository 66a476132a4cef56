//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod otp_verification;
pub mod post;
pub mod reaction;
pub mod subscriber;

pub use comment::Entity as Comment;
pub use otp_verification::Entity as OtpVerification;
pub use post::Entity as Post;
pub use reaction::Entity as Reaction;
pub use subscriber::Entity as Subscriber;
