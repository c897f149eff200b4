//! Create app settings table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppSettings::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::PopupAutoShow)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AppSettings::PopupDelaySecs)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(ColumnDef::new(AppSettings::BrandColor).string_len(16))
                    .col(ColumnDef::new(AppSettings::EnabledPlatforms).json().not_null())
                    .col(
                        ColumnDef::new(AppSettings::WeeklyAutoCreate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AppSettings::WeeklyDay)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AppSettings::WeeklyHour)
                            .small_integer()
                            .not_null()
                            .default(9),
                    )
                    .col(
                        ColumnDef::new(AppSettings::WeeklyTimezone)
                            .string_len(64)
                            .not_null()
                            .default("UTC"),
                    )
                    .col(
                        ColumnDef::new(AppSettings::WeeklyQuestionPool)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppSettings::ContestDefaultDurationDays)
                            .integer()
                            .not_null()
                            .default(7),
                    )
                    .col(
                        ColumnDef::new(AppSettings::ContestAutoAnnounce)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AppSettings::NotificationsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(AppSettings::NotificationRecipient).string_len(256))
                    .col(
                        ColumnDef::new(AppSettings::RetentionDays)
                            .integer()
                            .not_null()
                            .default(365),
                    )
                    .col(
                        ColumnDef::new(AppSettings::CacheEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AppSettings::CacheDurationSecs)
                            .integer()
                            .not_null()
                            .default(300),
                    )
                    .col(ColumnDef::new(AppSettings::CaptchaSiteKey).string_len(256))
                    .col(ColumnDef::new(AppSettings::CaptchaSecret).string_len(256))
                    .col(ColumnDef::new(AppSettings::ExportFormats).json().not_null())
                    .col(
                        ColumnDef::new(AppSettings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AppSettings::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppSettings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AppSettings {
    Table,
    Id,
    PopupAutoShow,
    PopupDelaySecs,
    BrandColor,
    EnabledPlatforms,
    WeeklyAutoCreate,
    WeeklyDay,
    WeeklyHour,
    WeeklyTimezone,
    WeeklyQuestionPool,
    ContestDefaultDurationDays,
    ContestAutoAnnounce,
    NotificationsEnabled,
    NotificationRecipient,
    RetentionDays,
    CacheEnabled,
    CacheDurationSecs,
    CaptchaSiteKey,
    CaptchaSecret,
    ExportFormats,
    CreatedAt,
    UpdatedAt,
}
