//! Create poll table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Poll::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Poll::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Poll::Question).string_len(255).not_null())
                    .col(ColumnDef::new(Poll::Options).json().not_null())
                    .col(ColumnDef::new(Poll::ImageUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Poll::IsWeekly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Poll::IsContest)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Poll::ContestPrize).string_len(255))
                    .col(ColumnDef::new(Poll::ContestEndsAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Poll::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Poll::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Poll::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_user")
                            .from(Poll::Table, Poll::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for owner listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_user_id")
                    .table(Poll::Table)
                    .col(Poll::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: status (public reads filter on it)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_status")
                    .table(Poll::Table)
                    .col(Poll::Status)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (latest-poll lookups and retention scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_created_at")
                    .table(Poll::Table)
                    .col(Poll::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: is_weekly (weekly rotation scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_is_weekly")
                    .table(Poll::Table)
                    .col(Poll::IsWeekly)
                    .to_owned(),
            )
            .await?;

        // Index: (is_contest, contest_ends_at) for contest-closure scans
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_contest_ends_at")
                    .table(Poll::Table)
                    .col(Poll::IsContest)
                    .col(Poll::ContestEndsAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
    UserId,
    Question,
    Options,
    ImageUrl,
    IsWeekly,
    IsContest,
    ContestPrize,
    ContestEndsAt,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
