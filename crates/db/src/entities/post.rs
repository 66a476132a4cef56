//! Blog post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Post moderation states.
///
/// `Draft` is an admin-authored entry state; reader submissions enter at
/// `Pending` and move to `Published` or `Rejected` through admin review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// URL-safe unique identifier, immutable once assigned
    #[sea_orm(unique)]
    pub slug: String,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub excerpt: Option<String>,

    /// Sanitized HTML body
    #[sea_orm(column_type = "Text")]
    pub content_html: String,

    /// Optional structured editor payload
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub content_json: Option<Json>,

    #[sea_orm(nullable)]
    pub featured_image_url: Option<String>,

    pub author_name: String,

    /// Exposed only on moderator surfaces
    #[sea_orm(indexed)]
    pub author_email: String,

    /// Exposed only on moderator surfaces
    #[sea_orm(nullable)]
    pub author_mobile: Option<String>,

    /// Tag list
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    pub status: PostStatus,

    pub submitted_at: DateTimeWithTimeZone,

    /// Set only on approval
    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeWithTimeZone>,

    /// Set only on rejection, cleared on approval
    #[sea_orm(nullable)]
    pub rejection_reason: Option<String>,

    #[sea_orm(nullable)]
    pub approved_by_admin_id: Option<String>,

    /// Archive year, present iff status = published
    #[sea_orm(nullable, indexed)]
    pub year: Option<i32>,

    /// Archive month, present iff status = published
    #[sea_orm(nullable, indexed)]
    pub month: Option<i32>,

    #[sea_orm(default_value = 0)]
    pub views_count: i32,

    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    #[sea_orm(default_value = 0)]
    pub dislikes_count: i32,

    #[sea_orm(default_value = 0)]
    pub comments_count: i32,

    /// Whether the subscriber digest already covered this post
    #[sea_orm(default_value = false)]
    pub email_sent: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,

    #[sea_orm(has_many = "super::reaction::Entity")]
    Reaction,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::reaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
