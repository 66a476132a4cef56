//! Outbound email.
//!
//! All sends go through the [`MailTransport`] trait so tests and
//! mail-disabled deployments can substitute [`NoopTransport`].

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use quillpost_common::{AppError, AppResult, config::EmailConfig};
use quillpost_db::entities::post;

/// Transport seam for outbound mail.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send a single message.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<String>,
    ) -> AppResult<()>;
}

/// SMTP transport backed by lettre.
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// Build an SMTP transport from configuration.
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AppError::Config(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid from address: {e}")))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<String>,
    ) -> AppResult<()> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {e}")))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject);

        let message = match html_body {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                text_body.to_string(),
                html,
            )),
            None => builder.body(text_body.to_string()),
        }
        .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::ExternalService(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

/// Transport used when email is disabled. Logs instead of sending.
pub struct NoopTransport;

#[async_trait]
impl MailTransport for NoopTransport {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _text_body: &str,
        _html_body: Option<String>,
    ) -> AppResult<()> {
        tracing::info!(to = %to, subject = %subject, "Email disabled, dropping message");
        Ok(())
    }
}

/// High-level mailer with the application's message templates.
#[derive(Clone)]
pub struct Mailer {
    transport: Arc<dyn MailTransport>,
    site_name: String,
    frontend_url: String,
}

impl Mailer {
    /// Create a mailer over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn MailTransport>, site_name: String, frontend_url: String) -> Self {
        Self {
            transport,
            site_name,
            frontend_url,
        }
    }

    /// Build a mailer from optional SMTP configuration. No config means
    /// all sends become logged no-ops.
    pub fn from_config(
        email: Option<&EmailConfig>,
        site_name: String,
        frontend_url: String,
    ) -> AppResult<Self> {
        let transport: Arc<dyn MailTransport> = match email {
            Some(config) => Arc::new(SmtpTransport::new(config)?),
            None => Arc::new(NoopTransport),
        };
        Ok(Self::new(transport, site_name, frontend_url))
    }

    /// Send a verification code.
    pub async fn send_otp(&self, to: &str, code: &str, expiry_minutes: i64) -> AppResult<()> {
        let subject = format!("{} verification code", self.site_name);
        let text = format!(
            "Your verification code is {code}. It expires in {expiry_minutes} minutes.\n\n\
            If you did not request this code, you can ignore this email."
        );
        let html = self.wrap_html(&format!(
            "<p>Your verification code is:</p>\
            <p style=\"font-size:28px;letter-spacing:6px;font-weight:bold;\">{code}</p>\
            <p>It expires in {expiry_minutes} minutes.</p>\
            <p><small>If you did not request this code, you can ignore this email.</small></p>"
        ));
        self.transport.send(to, &subject, &text, Some(html)).await
    }

    /// Confirm that a submission reached the review queue. Best-effort.
    pub async fn send_submission_received(&self, to: &str, title: &str) -> AppResult<()> {
        let subject = format!("Your submission to {} was received", self.site_name);
        let text = format!(
            "Thanks for your submission \"{title}\".\n\n\
            It is now waiting for review. We'll publish it once an editor approves it."
        );
        let html = self.wrap_html(&format!(
            "<p>Thanks for your submission <strong>{title}</strong>.</p>\
            <p>It is now waiting for review. We'll publish it once an editor approves it.</p>"
        ));
        self.transport.send(to, &subject, &text, Some(html)).await
    }

    /// Welcome a newly verified subscriber. Best-effort.
    pub async fn send_subscription_confirmed(&self, to: &str, name: &str) -> AppResult<()> {
        let subject = format!("You're subscribed to {}", self.site_name);
        let text = format!(
            "Hi {name}!\n\n\
            Your subscription to {} is confirmed. We'll email you when new posts go live.\n\n\
            Read the latest: {}",
            self.site_name, self.frontend_url
        );
        let html = self.wrap_html(&format!(
            "<p>Hi {name}!</p>\
            <p>Your subscription to <strong>{}</strong> is confirmed. \
            We'll email you when new posts go live.</p>\
            <p><a href=\"{}\">Read the latest</a></p>",
            self.site_name, self.frontend_url
        ));
        self.transport.send(to, &subject, &text, Some(html)).await
    }

    /// Digest of newly published posts for one subscriber. Best-effort.
    pub async fn send_new_posts_digest(
        &self,
        to: &str,
        name: &str,
        posts: &[post::Model],
    ) -> AppResult<()> {
        let subject = if posts.len() == 1 {
            format!("New on {}: {}", self.site_name, posts[0].title)
        } else {
            format!("{} new posts on {}", posts.len(), self.site_name)
        };

        let mut text = format!("Hi {name}!\n\nNew on {}:\n\n", self.site_name);
        let mut items = String::new();
        for post in posts {
            let url = format!("{}/blog/{}", self.frontend_url, post.slug);
            text.push_str(&format!("- {} ({url})\n", post.title));
            let excerpt = post.excerpt.as_deref().unwrap_or("");
            items.push_str(&format!(
                "<li><a href=\"{url}\">{}</a><br><small>{excerpt}</small></li>",
                post.title
            ));
        }
        let html = self.wrap_html(&format!(
            "<p>Hi {name}!</p><p>New on <strong>{}</strong>:</p><ul>{items}</ul>",
            self.site_name
        ));

        self.transport.send(to, &subject, &text, Some(html)).await
    }

    fn wrap_html(&self, content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }}
        a {{ color: #007bff; }}
    </style>
</head>
<body>
    {content}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">
        This email was sent from <a href="{}">{}</a>.
    </p>
</body>
</html>"#,
            self.frontend_url, self.site_name
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Transport that records messages for assertions.
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(
            &self,
            to: &str,
            subject: &str,
            text_body: &str,
            _html_body: Option<String>,
        ) -> AppResult<()> {
            self.sent.lock().unwrap().push((
                to.to_string(),
                subject.to_string(),
                text_body.to_string(),
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_otp_email_carries_code() {
        let transport = Arc::new(RecordingTransport::new());
        let mailer = Mailer::new(
            transport.clone(),
            "Quillpost".to_string(),
            "http://localhost:5173".to_string(),
        );

        mailer
            .send_otp("alice@example.com", "482913", 10)
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "alice@example.com");
        assert!(sent[0].2.contains("482913"));
        assert!(sent[0].2.contains("10 minutes"));
    }

    #[tokio::test]
    async fn test_noop_transport_swallows_sends() {
        let mailer = Mailer::new(
            Arc::new(NoopTransport),
            "Quillpost".to_string(),
            "http://localhost:5173".to_string(),
        );
        mailer
            .send_submission_received("bob@example.com", "A Title")
            .await
            .unwrap();
    }
}
