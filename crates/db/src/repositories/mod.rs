//! Database repositories.

pub mod comment;
pub mod otp;
pub mod post;
pub mod reaction;
pub mod subscriber;

pub use comment::CommentRepository;
pub use otp::OtpRepository;
pub use post::{ArchiveMonthRow, PostRepository, PostSort, PublishedFilter};
pub use reaction::ReactionRepository;
pub use subscriber::SubscriberRepository;
