//! Create subscriber table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriber::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriber::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Subscriber::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subscriber::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Subscriber::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subscriber::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subscriber::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Subscriber::UnsubscribedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: email - one subscription per address
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriber_email")
                    .table(Subscriber::Table)
                    .col(Subscriber::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (status, verified) for the notification audience scan
        manager
            .create_index(
                Index::create()
                    .name("idx_subscriber_status_verified")
                    .table(Subscriber::Table)
                    .col(Subscriber::Status)
                    .col(Subscriber::Verified)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriber::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Subscriber {
    Table,
    Id,
    Email,
    Name,
    Status,
    Verified,
    CreatedAt,
    UnsubscribedAt,
}
