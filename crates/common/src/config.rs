//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// OTP issuance and verification policy.
    #[serde(default)]
    pub otp: OtpConfig,
    /// Reader-action rate limits.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Outbound email configuration (absent means email is disabled).
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Subscriber notification scheduler.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared admin bearer token for moderation endpoints.
    pub admin_token: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// OTP policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code.
    #[serde(default = "default_otp_length")]
    pub length: usize,
    /// Minutes before an issued code expires.
    #[serde(default = "default_otp_expiry_minutes")]
    pub expiry_minutes: i64,
    /// Wrong guesses allowed before lockout.
    #[serde(default = "default_otp_max_attempts")]
    pub max_attempts: u32,
    /// Seconds a caller must wait before requesting another code.
    #[serde(default = "default_otp_resend_cooldown_secs")]
    pub resend_cooldown_secs: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            length: default_otp_length(),
            expiry_minutes: default_otp_expiry_minutes(),
            max_attempts: default_otp_max_attempts(),
            resend_cooldown_secs: default_otp_resend_cooldown_secs(),
        }
    }
}

/// Reader-action rate limits (trailing 60-second windows).
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Reaction writes allowed per visitor key per minute.
    #[serde(default = "default_reactions_per_minute")]
    pub reactions_per_minute: u64,
    /// Comments allowed per IP hash per minute.
    #[serde(default = "default_comments_per_minute")]
    pub comments_per_minute: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            reactions_per_minute: default_reactions_per_minute(),
            comments_per_minute: default_comments_per_minute(),
        }
    }
}

/// SMTP email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// From address for all outbound mail.
    pub from_address: String,
    /// Display name on the From header.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

/// Subscriber notification scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Whether the scheduler runs at all.
    #[serde(default)]
    pub enabled: bool,
    /// Seconds between scheduler runs.
    #[serde(default = "default_notification_interval_secs")]
    pub interval_secs: u64,
    /// Public frontend URL used to build post links in digest emails.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_notification_interval_secs(),
            frontend_url: default_frontend_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_otp_length() -> usize {
    6
}

const fn default_otp_expiry_minutes() -> i64 {
    10
}

const fn default_otp_max_attempts() -> u32 {
    5
}

const fn default_otp_resend_cooldown_secs() -> i64 {
    60
}

const fn default_reactions_per_minute() -> u64 {
    10
}

const fn default_comments_per_minute() -> u64 {
    5
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Quillpost".to_string()
}

const fn default_notification_interval_secs() -> u64 {
    3600
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `QUILLPOST_ENV`)
    /// 3. Environment variables with `QUILLPOST` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("QUILLPOST_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUILLPOST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("QUILLPOST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
