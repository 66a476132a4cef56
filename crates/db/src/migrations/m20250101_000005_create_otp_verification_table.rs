//! Create OTP verification table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpVerification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpVerification::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OtpVerification::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpVerification::Purpose)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpVerification::OtpHash)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpVerification::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpVerification::AttemptsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(OtpVerification::VerifiedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpVerification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (email, purpose, created_at) for the most-recent lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_otp_email_purpose_created")
                    .table(OtpVerification::Table)
                    .col(OtpVerification::Email)
                    .col(OtpVerification::Purpose)
                    .col(OtpVerification::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpVerification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpVerification {
    Table,
    Id,
    Email,
    Purpose,
    OtpHash,
    ExpiresAt,
    AttemptsCount,
    VerifiedAt,
    CreatedAt,
}
