//! Application settings service (singleton row).

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use versus_common::{AppError, AppResult};
use versus_db::entities::{app_settings, app_settings::APP_SETTINGS_ID};

/// One entry of the weekly-poll question pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolQuestion {
    pub question: String,
    pub options: Vec<String>,
}

/// Input for updating settings.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsInput {
    pub popup_auto_show: Option<bool>,
    pub popup_delay_secs: Option<i32>,
    pub brand_color: Option<Option<String>>,
    pub enabled_platforms: Option<Vec<String>>,
    pub weekly_auto_create: Option<bool>,
    pub weekly_day: Option<i16>,
    pub weekly_hour: Option<i16>,
    pub weekly_timezone: Option<String>,
    pub weekly_question_pool: Option<Vec<PoolQuestion>>,
    pub contest_default_duration_days: Option<i32>,
    pub contest_auto_announce: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub notification_recipient: Option<Option<String>>,
    pub retention_days: Option<i32>,
    pub cache_enabled: Option<bool>,
    pub cache_duration_secs: Option<i32>,
    pub captcha_site_key: Option<Option<String>>,
    pub captcha_secret: Option<Option<String>>,
    pub export_formats: Option<Vec<String>>,
}

/// Settings service for the singleton configuration row.
#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
}

impl SettingsService {
    /// Create a new settings service.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get settings, creating the default row if not present.
    pub async fn get(&self) -> AppResult<app_settings::Model> {
        let settings = app_settings::Entity::find_by_id(APP_SETTINGS_ID)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match settings {
            Some(s) => Ok(s),
            None => {
                let now = chrono::Utc::now();
                let model = app_settings::ActiveModel {
                    id: Set(APP_SETTINGS_ID.to_string()),
                    popup_auto_show: Set(true),
                    popup_delay_secs: Set(5),
                    brand_color: Set(None),
                    enabled_platforms: Set(json!([
                        "facebook", "twitter", "whatsapp", "linkedin", "telegram", "email"
                    ])),
                    weekly_auto_create: Set(false),
                    weekly_day: Set(0),
                    weekly_hour: Set(9),
                    weekly_timezone: Set("UTC".to_string()),
                    weekly_question_pool: Set(json!([])),
                    contest_default_duration_days: Set(7),
                    contest_auto_announce: Set(false),
                    notifications_enabled: Set(true),
                    notification_recipient: Set(None),
                    retention_days: Set(365),
                    cache_enabled: Set(false),
                    cache_duration_secs: Set(300),
                    captcha_site_key: Set(None),
                    captcha_secret: Set(None),
                    export_formats: Set(json!(["json", "csv", "xml"])),
                    created_at: Set(now.into()),
                    updated_at: Set(None),
                };

                model
                    .insert(self.db.as_ref())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
        }
    }

    /// Update settings, applying only the supplied fields.
    pub async fn update(&self, input: UpdateSettingsInput) -> AppResult<app_settings::Model> {
        // Ensure the row exists
        let _ = self.get().await?;

        let now = chrono::Utc::now();
        let mut model = app_settings::ActiveModel {
            id: Set(APP_SETTINGS_ID.to_string()),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };

        if let Some(popup_auto_show) = input.popup_auto_show {
            model.popup_auto_show = Set(popup_auto_show);
        }
        if let Some(popup_delay_secs) = input.popup_delay_secs {
            model.popup_delay_secs = Set(popup_delay_secs);
        }
        if let Some(brand_color) = input.brand_color {
            model.brand_color = Set(brand_color);
        }
        if let Some(platforms) = input.enabled_platforms {
            model.enabled_platforms = Set(json!(platforms));
        }
        if let Some(weekly_auto_create) = input.weekly_auto_create {
            model.weekly_auto_create = Set(weekly_auto_create);
        }
        if let Some(weekly_day) = input.weekly_day {
            if !(0..=6).contains(&weekly_day) {
                return Err(AppError::Validation(
                    "weekly_day must be between 0 and 6".to_string(),
                ));
            }
            model.weekly_day = Set(weekly_day);
        }
        if let Some(weekly_hour) = input.weekly_hour {
            if !(0..=23).contains(&weekly_hour) {
                return Err(AppError::Validation(
                    "weekly_hour must be between 0 and 23".to_string(),
                ));
            }
            model.weekly_hour = Set(weekly_hour);
        }
        if let Some(weekly_timezone) = input.weekly_timezone {
            if weekly_timezone.parse::<chrono_tz::Tz>().is_err() {
                return Err(AppError::Validation(format!(
                    "Unknown timezone: {weekly_timezone}"
                )));
            }
            model.weekly_timezone = Set(weekly_timezone);
        }
        if let Some(pool) = input.weekly_question_pool {
            model.weekly_question_pool = Set(json!(pool));
        }
        if let Some(days) = input.contest_default_duration_days {
            if days < 1 {
                return Err(AppError::Validation(
                    "contest_default_duration_days must be at least 1".to_string(),
                ));
            }
            model.contest_default_duration_days = Set(days);
        }
        if let Some(contest_auto_announce) = input.contest_auto_announce {
            model.contest_auto_announce = Set(contest_auto_announce);
        }
        if let Some(notifications_enabled) = input.notifications_enabled {
            model.notifications_enabled = Set(notifications_enabled);
        }
        if let Some(recipient) = input.notification_recipient {
            model.notification_recipient = Set(recipient);
        }
        if let Some(retention_days) = input.retention_days {
            if retention_days < 0 {
                return Err(AppError::Validation(
                    "retention_days cannot be negative".to_string(),
                ));
            }
            model.retention_days = Set(retention_days);
        }
        if let Some(cache_enabled) = input.cache_enabled {
            model.cache_enabled = Set(cache_enabled);
        }
        if let Some(cache_duration_secs) = input.cache_duration_secs {
            if cache_duration_secs < 0 {
                return Err(AppError::Validation(
                    "cache_duration_secs cannot be negative".to_string(),
                ));
            }
            model.cache_duration_secs = Set(cache_duration_secs);
        }
        if let Some(captcha_site_key) = input.captcha_site_key {
            model.captcha_site_key = Set(captcha_site_key);
        }
        if let Some(captcha_secret) = input.captcha_secret {
            model.captcha_secret = Set(captcha_secret);
        }
        if let Some(formats) = input.export_formats {
            model.export_formats = Set(json!(formats));
        }

        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Enabled share platform tags.
    pub async fn enabled_platforms(&self) -> AppResult<Vec<String>> {
        let settings = self.get().await?;
        serde_json::from_value(settings.enabled_platforms)
            .map_err(|e| AppError::Internal(format!("Invalid platform list: {e}")))
    }

    /// Allowed export format tags.
    pub async fn export_formats(&self) -> AppResult<Vec<String>> {
        let settings = self.get().await?;
        serde_json::from_value(settings.export_formats)
            .map_err(|e| AppError::Internal(format!("Invalid export format list: {e}")))
    }

    /// Question pool for auto-created weekly polls.
    pub async fn weekly_question_pool(&self) -> AppResult<Vec<PoolQuestion>> {
        let settings = self.get().await?;
        serde_json::from_value(settings.weekly_question_pool)
            .map_err(|e| AppError::Internal(format!("Invalid question pool: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn default_settings_model() -> app_settings::Model {
        app_settings::Model {
            id: APP_SETTINGS_ID.to_string(),
            popup_auto_show: true,
            popup_delay_secs: 5,
            brand_color: None,
            enabled_platforms: json!(["facebook", "twitter"]),
            weekly_auto_create: false,
            weekly_day: 0,
            weekly_hour: 9,
            weekly_timezone: "UTC".to_string(),
            weekly_question_pool: json!([]),
            contest_default_duration_days: 7,
            contest_auto_announce: false,
            notifications_enabled: true,
            notification_recipient: None,
            retention_days: 365,
            cache_enabled: false,
            cache_duration_secs: 300,
            captcha_site_key: None,
            captcha_secret: None,
            export_formats: json!(["json", "csv"]),
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_returns_existing_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[default_settings_model()]])
                .into_connection(),
        );

        let service = SettingsService::new(db);
        let settings = service.get().await.unwrap();

        assert_eq!(settings.retention_days, 365);
        assert!(settings.popup_auto_show);
    }

    #[tokio::test]
    async fn test_enabled_platforms_decodes_json() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[default_settings_model()]])
                .into_connection(),
        );

        let service = SettingsService::new(db);
        let platforms = service.enabled_platforms().await.unwrap();

        assert_eq!(platforms, vec!["facebook", "twitter"]);
    }

    #[tokio::test]
    async fn test_update_rejects_bad_weekly_day() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[default_settings_model()]])
                .into_connection(),
        );

        let service = SettingsService::new(db);
        let result = service
            .update(UpdateSettingsInput {
                weekly_day: Some(9),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_timezone() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[default_settings_model()]])
                .into_connection(),
        );

        let service = SettingsService::new(db);
        let result = service
            .update(UpdateSettingsInput {
                weekly_timezone: Some("Mars/Olympus".to_string()),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_negative_retention() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[default_settings_model()]])
                .into_connection(),
        );

        let service = SettingsService::new(db);
        let result = service
            .update(UpdateSettingsInput {
                retention_days: Some(-1),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
