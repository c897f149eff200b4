//! Create manager invitation table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ManagerInvitation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ManagerInvitation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ManagerInvitation::Email)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManagerInvitation::Token)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManagerInvitation::InvitedBy)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ManagerInvitation::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ManagerInvitation::AcceptedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ManagerInvitation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_manager_invitation_inviter")
                            .from(ManagerInvitation::Table, ManagerInvitation::InvitedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: token
        manager
            .create_index(
                Index::create()
                    .name("idx_manager_invitation_token")
                    .table(ManagerInvitation::Table)
                    .col(ManagerInvitation::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ManagerInvitation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ManagerInvitation {
    Table,
    Id,
    Email,
    Token,
    InvitedBy,
    ExpiresAt,
    AcceptedAt,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
