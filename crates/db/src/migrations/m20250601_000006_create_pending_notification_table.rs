//! Create pending notification table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingNotification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingNotification::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingNotification::Kind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PendingNotification::PollId).string_len(32))
                    .col(ColumnDef::new(PendingNotification::RecipientId).string_len(32))
                    .col(ColumnDef::new(PendingNotification::Email).string_len(256))
                    .col(
                        ColumnDef::new(PendingNotification::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingNotification::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PendingNotification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: scheduled_at (the flush job scans for due entries)
        manager
            .create_index(
                Index::create()
                    .name("idx_pending_notification_scheduled_at")
                    .table(PendingNotification::Table)
                    .col(PendingNotification::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingNotification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingNotification {
    Table,
    Id,
    Kind,
    PollId,
    RecipientId,
    Email,
    ScheduledAt,
    RetryCount,
    CreatedAt,
}
