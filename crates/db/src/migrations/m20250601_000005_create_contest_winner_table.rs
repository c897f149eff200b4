//! Create contest winner table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContestWinner::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContestWinner::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContestWinner::PollId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContestWinner::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContestWinner::Prize)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContestWinner::WinningChoice)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContestWinner::WinningVotes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContestWinner::Status)
                            .string_len(16)
                            .not_null()
                            .default("announced"),
                    )
                    .col(
                        ColumnDef::new(ContestWinner::AnnouncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contest_winner_poll")
                            .from(ContestWinner::Table, ContestWinner::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contest_winner_user")
                            .from(ContestWinner::Table, ContestWinner::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: poll_id - at most one winner per contest. A racing
        // second announcement fails this constraint.
        manager
            .create_index(
                Index::create()
                    .name("idx_contest_winner_poll_id")
                    .table(ContestWinner::Table)
                    .col(ContestWinner::PollId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContestWinner::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContestWinner {
    Table,
    Id,
    PollId,
    UserId,
    Prize,
    WinningChoice,
    WinningVotes,
    Status,
    AnnouncedAt,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
