//! Create vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::UserId).string_len(32))
                    .col(ColumnDef::new(Vote::VoterKey).string_len(80).not_null())
                    .col(ColumnDef::new(Vote::Choice).integer().not_null())
                    .col(ColumnDef::new(Vote::VoterIp).string_len(45).not_null())
                    .col(ColumnDef::new(Vote::UserAgent).string_len(512))
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_poll")
                            .from(Vote::Table, Vote::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_user")
                            .from(Vote::Table, Vote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (poll_id, voter_key) - the one-vote-per-voter
        // invariant. The second of two concurrent casts fails here.
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_poll_voter")
                    .table(Vote::Table)
                    .col(Vote::PollId)
                    .col(Vote::VoterKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (poll_id, choice) for tallying
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_poll_choice")
                    .table(Vote::Table)
                    .col(Vote::PollId)
                    .col(Vote::Choice)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for voter history)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_user_id")
                    .table(Vote::Table)
                    .col(Vote::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    PollId,
    UserId,
    VoterKey,
    Choice,
    VoterIp,
    UserAgent,
    CreatedAt,
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
