//! Create popup dismissal table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PopupDismissal::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PopupDismissal::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PopupDismissal::PollId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PopupDismissal::DismissedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PopupDismissal::UserId)
                            .col(PopupDismissal::PollId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_popup_dismissal_user")
                            .from(PopupDismissal::Table, PopupDismissal::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // No foreign key to poll: hard-deleted polls leave
                    // orphaned flags behind for retention cleanup to collect.
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PopupDismissal::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PopupDismissal {
    Table,
    UserId,
    PollId,
    DismissedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
