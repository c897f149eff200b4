//! Scheduled jobs for periodic maintenance tasks.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use versus_common::config::SchedulerSettings;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval for the weekly-rotation check (default: 1 hour).
    pub weekly_rotation_interval: Duration,
    /// Interval for the contest-closure check (default: 1 hour).
    pub contest_closure_interval: Duration,
    /// Interval for retention cleanup (default: daily).
    pub retention_cleanup_interval: Duration,
    /// Interval for the notification flush (default: 5 minutes).
    pub notification_flush_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            weekly_rotation_interval: Duration::from_secs(3600),
            contest_closure_interval: Duration::from_secs(3600),
            retention_cleanup_interval: Duration::from_secs(86400),
            notification_flush_interval: Duration::from_secs(300),
        }
    }
}

impl From<&SchedulerSettings> for SchedulerConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            weekly_rotation_interval: Duration::from_secs(settings.weekly_rotation_interval_secs),
            contest_closure_interval: Duration::from_secs(settings.contest_closure_interval_secs),
            retention_cleanup_interval: Duration::from_secs(
                settings.retention_cleanup_interval_secs,
            ),
            notification_flush_interval: Duration::from_secs(
                settings.notification_flush_interval_secs,
            ),
        }
    }
}

/// Job executor trait for scheduled jobs.
///
/// Every job is idempotent within its period: re-running rotation with a
/// live weekly poll, or closure over contests that already have winners,
/// is a no-op.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Archive stale weekly polls and auto-create the next one when due.
    async fn rotate_weekly_polls(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Close contest polls past their end time and trigger winner selection.
    async fn close_ended_contests(&self)
    -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Remove retired data older than the retention window.
    async fn cleanup_retention(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Deliver due queued notifications.
    async fn flush_notifications(&self)
    -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Run the scheduler with the given configuration and executor.
pub async fn run_scheduler<E: JobExecutor + 'static>(config: SchedulerConfig, executor: Arc<E>) {
    let executor_rotation = executor.clone();
    let executor_contest = executor.clone();
    let executor_retention = executor.clone();
    let executor_flush = executor;

    let rotation_interval = config.weekly_rotation_interval;
    let contest_interval = config.contest_closure_interval;
    let retention_interval = config.retention_cleanup_interval;
    let flush_interval = config.notification_flush_interval;

    // Spawn weekly rotation task
    tokio::spawn(async move {
        let mut interval = interval(rotation_interval);
        loop {
            interval.tick().await;
            match executor_rotation.rotate_weekly_polls().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Rotated weekly polls");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to rotate weekly polls");
                }
            }
        }
    });

    // Spawn contest closure task
    tokio::spawn(async move {
        let mut interval = interval(contest_interval);
        loop {
            interval.tick().await;
            match executor_contest.close_ended_contests().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Closed ended contests");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to close ended contests");
                }
            }
        }
    });

    // Spawn retention cleanup task
    tokio::spawn(async move {
        let mut interval = interval(retention_interval);
        loop {
            interval.tick().await;
            match executor_retention.cleanup_retention().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Removed expired data");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to run retention cleanup");
                }
            }
        }
    });

    // Spawn notification flush task
    tokio::spawn(async move {
        let mut interval = interval(flush_interval);
        loop {
            interval.tick().await;
            match executor_flush.flush_notifications().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Delivered queued notifications");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to flush notifications");
                }
            }
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.weekly_rotation_interval, Duration::from_secs(3600));
        assert_eq!(config.contest_closure_interval, Duration::from_secs(3600));
        assert_eq!(config.retention_cleanup_interval, Duration::from_secs(86400));
        assert_eq!(config.notification_flush_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_scheduler_config_from_settings() {
        let settings = SchedulerSettings {
            enabled: true,
            weekly_rotation_interval_secs: 60,
            contest_closure_interval_secs: 120,
            retention_cleanup_interval_secs: 240,
            notification_flush_interval_secs: 30,
        };
        let config = SchedulerConfig::from(&settings);
        assert_eq!(config.weekly_rotation_interval, Duration::from_secs(60));
        assert_eq!(config.notification_flush_interval, Duration::from_secs(30));
    }
}
