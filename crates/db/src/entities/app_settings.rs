//! Application settings entity (singleton row).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Fixed ID for the singleton settings row.
pub const APP_SETTINGS_ID: &str = "app_settings";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Auto-show the poll popup to visitors.
    pub popup_auto_show: bool,

    /// Popup delay in seconds.
    pub popup_delay_secs: i32,

    /// Brand accent color (hex).
    #[sea_orm(nullable)]
    pub brand_color: Option<String>,

    /// Enabled share platform tags (JSON array of strings).
    #[sea_orm(column_type = "Json")]
    pub enabled_platforms: JsonValue,

    /// Auto-create a weekly poll when none is active.
    pub weekly_auto_create: bool,

    /// Weekday for weekly rotation (0 = Monday .. 6 = Sunday).
    pub weekly_day: i16,

    /// Hour of day for weekly rotation (0-23, in `weekly_timezone`).
    pub weekly_hour: i16,

    /// IANA timezone for weekly rotation.
    pub weekly_timezone: String,

    /// Question pool for auto-created weekly polls
    /// (JSON array of `{question, options}`).
    #[sea_orm(column_type = "Json")]
    pub weekly_question_pool: JsonValue,

    /// Default contest duration in days when no end time is supplied.
    pub contest_default_duration_days: i32,

    /// Announce contest winners automatically at closure.
    pub contest_auto_announce: bool,

    /// Whether email notifications are sent at all.
    pub notifications_enabled: bool,

    /// Admin notification recipient address.
    #[sea_orm(nullable)]
    pub notification_recipient: Option<String>,

    /// Data retention window in days; 0 disables retention cleanup.
    pub retention_days: i32,

    /// Whether rendered poll output may be cached by the presentation layer.
    pub cache_enabled: bool,

    /// Cache lifetime in seconds.
    pub cache_duration_secs: i32,

    /// CAPTCHA site key handed to the presentation layer.
    #[sea_orm(nullable)]
    pub captcha_site_key: Option<String>,

    /// CAPTCHA secret for server-side verification.
    #[sea_orm(nullable)]
    pub captcha_secret: Option<String>,

    /// Allowed export format tags (JSON array of strings).
    #[sea_orm(column_type = "Json")]
    pub export_formats: JsonValue,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
