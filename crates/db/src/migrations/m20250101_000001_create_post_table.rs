//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::Slug).string_len(220).not_null())
                    .col(ColumnDef::new(Post::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Post::Excerpt).text())
                    .col(ColumnDef::new(Post::ContentHtml).text().not_null())
                    .col(ColumnDef::new(Post::ContentJson).json_binary())
                    .col(ColumnDef::new(Post::FeaturedImageUrl).string_len(512))
                    .col(ColumnDef::new(Post::AuthorName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Post::AuthorEmail)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Post::AuthorMobile).string_len(32))
                    .col(
                        ColumnDef::new(Post::Tags)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Post::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Post::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Post::PublishedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Post::RejectionReason).text())
                    .col(ColumnDef::new(Post::ApprovedByAdminId).string_len(64))
                    .col(ColumnDef::new(Post::Year).integer())
                    .col(ColumnDef::new(Post::Month).integer())
                    .col(
                        ColumnDef::new(Post::ViewsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Post::LikesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Post::DislikesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Post::CommentsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Post::EmailSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: slug (public URLs)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_slug")
                    .table(Post::Table)
                    .col(Post::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status (moderation queues, published listing)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_status")
                    .table(Post::Table)
                    .col(Post::Status)
                    .to_owned(),
            )
            .await?;

        // Index: (year, month) for the archive
        manager
            .create_index(
                Index::create()
                    .name("idx_post_year_month")
                    .table(Post::Table)
                    .col(Post::Year)
                    .col(Post::Month)
                    .to_owned(),
            )
            .await?;

        // Index: (status, email_sent) for the notifier scan
        manager
            .create_index(
                Index::create()
                    .name("idx_post_status_email_sent")
                    .table(Post::Table)
                    .col(Post::Status)
                    .col(Post::EmailSent)
                    .to_owned(),
            )
            .await?;

        // Index: author_email (moderator lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_author_email")
                    .table(Post::Table)
                    .col(Post::AuthorEmail)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    Slug,
    Title,
    Excerpt,
    ContentHtml,
    ContentJson,
    FeaturedImageUrl,
    AuthorName,
    AuthorEmail,
    AuthorMobile,
    Tags,
    Status,
    SubmittedAt,
    PublishedAt,
    RejectionReason,
    ApprovedByAdminId,
    Year,
    Month,
    ViewsCount,
    LikesCount,
    DislikesCount,
    CommentsCount,
    EmailSent,
}
