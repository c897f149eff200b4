//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Email (SMTP) configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Email (SMTP) configuration.
///
/// When `host` is empty, delivery is disabled and queued notifications are
/// logged instead of sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    #[serde(default)]
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub password: Option<String>,
    /// From address for outgoing mail.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Whether background jobs run at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds for the weekly-rotation check.
    #[serde(default = "default_hourly")]
    pub weekly_rotation_interval_secs: u64,
    /// Interval in seconds for the contest-closure check.
    #[serde(default = "default_hourly")]
    pub contest_closure_interval_secs: u64,
    /// Interval in seconds for retention cleanup.
    #[serde(default = "default_daily")]
    pub retention_cleanup_interval_secs: u64,
    /// Interval in seconds for the notification flush.
    #[serde(default = "default_flush")]
    pub notification_flush_interval_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            weekly_rotation_interval_secs: default_hourly(),
            contest_closure_interval_secs: default_hourly(),
            retention_cleanup_interval_secs: default_daily(),
            notification_flush_interval_secs: default_flush(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "noreply@localhost".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_hourly() -> u64 {
    3600
}

const fn default_daily() -> u64 {
    86400
}

const fn default_flush() -> u64 {
    300
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `VERSUS_ENV`)
    /// 3. Environment variables with `VERSUS_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("VERSUS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VERSUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("VERSUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_settings_default() {
        let settings = SchedulerSettings::default();
        assert!(settings.enabled);
        assert_eq!(settings.weekly_rotation_interval_secs, 3600);
        assert_eq!(settings.retention_cleanup_interval_secs, 86400);
        assert_eq!(settings.notification_flush_interval_secs, 300);
    }

    #[test]
    fn test_email_config_default_is_disabled() {
        let email = EmailConfig::default();
        assert!(email.host.is_empty());
    }
}
