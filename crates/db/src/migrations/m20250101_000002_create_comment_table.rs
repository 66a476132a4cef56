//! Create comment table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comment::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Comment::Email).string_len(255))
                    .col(ColumnDef::new(Comment::Text).text().not_null())
                    .col(ColumnDef::new(Comment::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Comment::IpHash).string_len(64))
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_post")
                            .from(Comment::Table, Comment::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (post_id, status) for the public comment listing
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_post_status")
                    .table(Comment::Table)
                    .col(Comment::PostId)
                    .col(Comment::Status)
                    .to_owned(),
            )
            .await?;

        // Index: ip_hash (abuse review)
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_ip_hash")
                    .table(Comment::Table)
                    .col(Comment::IpHash)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    PostId,
    Name,
    Email,
    Text,
    Status,
    IpHash,
    CreatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
