//! Create share table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Share::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Share::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Share::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Share::UserId).string_len(32))
                    .col(ColumnDef::new(Share::Platform).string_len(16).not_null())
                    .col(ColumnDef::new(Share::VoterIp).string_len(45).not_null())
                    .col(
                        ColumnDef::new(Share::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_share_poll")
                            .from(Share::Table, Share::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (poll_id, platform) for per-platform counts
        manager
            .create_index(
                Index::create()
                    .name("idx_share_poll_platform")
                    .table(Share::Table)
                    .col(Share::PollId)
                    .col(Share::Platform)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Share::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Share {
    Table,
    Id,
    PollId,
    UserId,
    Platform,
    VoterIp,
    CreatedAt,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}
