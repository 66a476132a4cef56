//! Business logic services.

pub mod blog;
pub mod comment;
pub mod email;
pub mod otp;
pub mod pending;
pub mod rate_limit;
pub mod reaction;
pub mod submission;
pub mod subscriber;

pub use blog::{ArchiveMonth, ArchiveYear, BlogService, PostEdit};
pub use comment::{CommentRequest, CommentService};
pub use email::{MailTransport, Mailer, NoopTransport, SmtpTransport};
pub use otp::{OtpService, VerifyOutcome};
pub use pending::{DraftCache, InMemoryDraftCache, PendingDraft};
pub use rate_limit::ActionRateLimiter;
pub use reaction::{ReactionService, ReactionStatus, ToggleAction, ToggleResponse};
pub use submission::{SubmissionRequest, SubmissionService};
pub use subscriber::{SubscribeRequest, SubscriberService};
