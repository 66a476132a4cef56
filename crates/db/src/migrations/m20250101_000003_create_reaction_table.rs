//! Create reaction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reaction::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Reaction::VisitorKey)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reaction::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Reaction::IpHash).string_len(64))
                    .col(
                        ColumnDef::new(Reaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reaction_post")
                            .from(Reaction::Table, Reaction::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (post_id, visitor_key) - one reaction per visitor per post
        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_post_visitor")
                    .table(Reaction::Table)
                    .col(Reaction::PostId)
                    .col(Reaction::VisitorKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: post_id (cascade scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_reaction_post_id")
                    .table(Reaction::Table)
                    .col(Reaction::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reaction {
    Table,
    Id,
    PostId,
    VisitorKey,
    Kind,
    IpHash,
    CreatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
