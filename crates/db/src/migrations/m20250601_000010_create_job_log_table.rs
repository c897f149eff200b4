//! Create job log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobLog::Job).string_len(64).not_null())
                    .col(ColumnDef::new(JobLog::Outcome).string_len(8).not_null())
                    .col(ColumnDef::new(JobLog::Detail).string_len(1024))
                    .col(
                        ColumnDef::new(JobLog::Items)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(JobLog::RanAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: ran_at (pruning keeps the newest entries)
        manager
            .create_index(
                Index::create()
                    .name("idx_job_log_ran_at")
                    .table(JobLog::Table)
                    .col(JobLog::RanAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum JobLog {
    Table,
    Id,
    Job,
    Outcome,
    Detail,
    Items,
    RanAt,
}
