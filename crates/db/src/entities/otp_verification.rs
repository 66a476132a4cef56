//! OTP verification entity.
//!
//! Each issue creates a fresh row; only the most recent row per
//! (email, purpose) is authoritative. Superseded rows are kept, not deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What an OTP proves control of an email address for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    #[sea_orm(string_value = "submission")]
    Submission,
    #[sea_orm(string_value = "subscribe")]
    Subscribe,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "otp_verification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub email: String,

    pub purpose: OtpPurpose,

    /// SHA-256 digest of the code; the plaintext is never stored
    pub otp_hash: String,

    pub expires_at: DateTimeWithTimeZone,

    pub attempts_count: i32,

    /// Terminal marker; once set, no further verify calls succeed
    #[sea_orm(nullable)]
    pub verified_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
