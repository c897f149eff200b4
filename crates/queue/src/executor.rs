//! Job executor backed by the service layer.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use sea_orm::Set;
use versus_common::{AppError, AppResult, IdGenerator};
use versus_core::{
    ContestService, CreatePollInput, NotificationService, PollService, SettingsService,
};
use versus_db::{
    entities::{
        job_log::{self, JobOutcome},
        poll::PollStatus,
        user::SYSTEM_USER_ID,
    },
    repositories::{
        ContestWinnerRepository, InvitationRepository, JobLogRepository, PollKind,
        PollRepository, PopupDismissalRepository,
    },
};

use crate::scheduler::JobExecutor;

/// Weekly polls older than this are archived by rotation.
const WEEKLY_MAX_AGE_DAYS: i64 = 7;

/// Fallback question when the configured pool is empty.
const DEFAULT_WEEKLY_QUESTION: &str = "Coffee or tea?";
const DEFAULT_WEEKLY_OPTIONS: [&str; 2] = ["Coffee", "Tea"];

/// Whether the configured rotation slot (weekday 0 = Monday, hour of day)
/// has arrived in local time.
fn rotation_due<T: TimeZone>(local: &DateTime<T>, day: i16, hour: i16) -> bool {
    i16::try_from(local.weekday().num_days_from_monday()).unwrap_or(0) == day
        && i16::try_from(local.hour()).unwrap_or(0) == hour
}

/// Deterministic pool rotation: the same entry for every run within one
/// ISO week, stepping forward each week.
const fn pool_index(week: u32, len: usize) -> usize {
    (week as usize) % len
}

/// Executor wiring the scheduled jobs to the service layer.
pub struct ServiceExecutor {
    poll_service: PollService,
    contest_service: ContestService,
    notification_service: NotificationService,
    settings: SettingsService,
    poll_repo: PollRepository,
    winner_repo: ContestWinnerRepository,
    invitation_repo: InvitationRepository,
    dismissal_repo: PopupDismissalRepository,
    job_log_repo: JobLogRepository,
    id_gen: IdGenerator,
}

impl ServiceExecutor {
    /// Create a new service executor.
    #[must_use]
    pub const fn new(
        poll_service: PollService,
        contest_service: ContestService,
        notification_service: NotificationService,
        settings: SettingsService,
        poll_repo: PollRepository,
        winner_repo: ContestWinnerRepository,
        invitation_repo: InvitationRepository,
        dismissal_repo: PopupDismissalRepository,
        job_log_repo: JobLogRepository,
    ) -> Self {
        Self {
            poll_service,
            contest_service,
            notification_service,
            settings,
            poll_repo,
            winner_repo,
            invitation_repo,
            dismissal_repo,
            job_log_repo,
            id_gen: IdGenerator::new(),
        }
    }

    async fn record(&self, job: &str, result: &AppResult<u64>) {
        let (outcome, detail, items) = match result {
            Ok(count) => (JobOutcome::Ok, None, *count as i64),
            Err(e) => (JobOutcome::Error, Some(e.to_string()), 0),
        };
        let model = job_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            job: Set(job.to_string()),
            outcome: Set(outcome),
            detail: Set(detail),
            items: Set(items),
            ran_at: Set(Utc::now().into()),
        };
        if let Err(e) = self.job_log_repo.append(model).await {
            tracing::warn!(error = %e, job, "Failed to record job run");
        }
    }

    async fn rotate_inner(&self) -> AppResult<u64> {
        let settings = self.settings.get().await?;
        let now = Utc::now();
        let mut affected = 0;

        // Retire weekly polls past their week.
        let stale = self
            .poll_repo
            .find_weekly_older_than(now - Duration::days(WEEKLY_MAX_AGE_DAYS))
            .await?;
        for poll in &stale {
            self.poll_service
                .set_status(&poll.id, PollStatus::Archived)
                .await?;
            tracing::info!(poll_id = %poll.id, "Archived stale weekly poll");
            affected += 1;
        }

        if !settings.weekly_auto_create {
            return Ok(affected);
        }

        let tz: Tz = settings.weekly_timezone.parse().unwrap_or(chrono_tz::UTC);
        let local = now.with_timezone(&tz);
        if !rotation_due(&local, settings.weekly_day, settings.weekly_hour) {
            return Ok(affected);
        }

        // Re-running within the slot is a no-op once a weekly poll is live.
        if self
            .poll_repo
            .find_latest_of_kind(PollKind::Weekly)
            .await?
            .is_some()
        {
            return Ok(affected);
        }

        let pool = self.settings.weekly_question_pool().await?;
        let (question, options) = if pool.is_empty() {
            (
                DEFAULT_WEEKLY_QUESTION.to_string(),
                DEFAULT_WEEKLY_OPTIONS.map(ToString::to_string).to_vec(),
            )
        } else {
            let entry = &pool[pool_index(local.iso_week().week(), pool.len())];
            (entry.question.clone(), entry.options.clone())
        };

        let poll = self
            .poll_service
            .create(
                SYSTEM_USER_ID,
                CreatePollInput {
                    question,
                    options,
                    image_url: None,
                    is_weekly: false,
                    is_contest: false,
                    contest_prize: None,
                    contest_ends_at: None,
                },
                false,
            )
            .await?;
        let poll = self.poll_service.make_weekly(&poll.id).await?;
        self.notification_service
            .enqueue_weekly_rotated(&poll.id)
            .await?;
        tracing::info!(poll_id = %poll.id, "Auto-created weekly poll");
        affected += 1;

        Ok(affected)
    }

    async fn close_contests_inner(&self) -> AppResult<u64> {
        let settings = self.settings.get().await?;
        let due = self.poll_repo.find_contests_due(Utc::now()).await?;
        let mut closed = 0;

        for poll in due {
            // Skip contests that already resolved to a winner.
            if self.winner_repo.exists_for_poll(&poll.id).await? {
                continue;
            }

            self.poll_service
                .set_status(&poll.id, PollStatus::Ended)
                .await?;

            if settings.contest_auto_announce {
                match self.contest_service.announce(&poll.id, None).await {
                    Ok(winner) => {
                        tracing::info!(poll_id = %poll.id, winner = %winner.user_id, "Auto-announced contest winner");
                    }
                    Err(AppError::NoVotes) => {
                        tracing::info!(poll_id = %poll.id, "Contest closed without eligible votes");
                    }
                    Err(AppError::WinnerAlreadyAnnounced) => {}
                    Err(AppError::BadRequest(reason)) => {
                        tracing::warn!(poll_id = %poll.id, reason, "Could not auto-announce winner");
                    }
                    Err(e) => return Err(e),
                }
            }

            self.notification_service
                .enqueue_contest_closed(&poll.id)
                .await?;
            closed += 1;
        }

        Ok(closed)
    }

    async fn cleanup_inner(&self) -> AppResult<u64> {
        let settings = self.settings.get().await?;
        // A zero-day window disables retention cleanup entirely.
        if settings.retention_days == 0 {
            return Ok(0);
        }

        let now = Utc::now();
        let cutoff = now - Duration::days(i64::from(settings.retention_days));

        let retired = self.poll_repo.find_retired_older_than(cutoff).await?;
        let ids: Vec<String> = retired.into_iter().map(|p| p.id).collect();
        // Votes, shares, and winners cascade with their poll.
        let mut removed = self.poll_repo.delete_by_ids(&ids).await?;

        removed += self.invitation_repo.delete_expired(now).await?;
        removed += self.dismissal_repo.delete_orphaned().await?;

        Ok(removed)
    }

    async fn flush_inner(&self) -> AppResult<u64> {
        let stats = self.notification_service.flush_due(Utc::now()).await?;
        if stats.rescheduled > 0 || stats.dropped > 0 {
            tracing::debug!(
                rescheduled = stats.rescheduled,
                dropped = stats.dropped,
                "Notification flush left work behind"
            );
        }
        Ok(stats.delivered)
    }
}

#[async_trait::async_trait]
impl JobExecutor for ServiceExecutor {
    async fn rotate_weekly_polls(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.rotate_inner().await;
        self.record("weekly_rotation", &result).await;
        result.map_err(Into::into)
    }

    async fn close_ended_contests(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.close_contests_inner().await;
        self.record("contest_closure", &result).await;
        result.map_err(Into::into)
    }

    async fn cleanup_retention(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.cleanup_inner().await;
        self.record("retention_cleanup", &result).await;
        result.map_err(Into::into)
    }

    async fn flush_notifications(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let result = self.flush_inner().await;
        self.record("notification_flush", &result).await;
        result.map_err(Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_due_matches_slot() {
        // 2025-06-02 is a Monday
        let monday_nine = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        assert!(rotation_due(&monday_nine, 0, 9));
        assert!(!rotation_due(&monday_nine, 0, 10));
        assert!(!rotation_due(&monday_nine, 1, 9));
    }

    #[test]
    fn test_rotation_due_respects_timezone() {
        // 23:00 UTC on Monday is already Tuesday 08:00 in Tokyo
        let utc = Utc.with_ymd_and_hms(2025, 6, 2, 23, 0, 0).unwrap();
        let tokyo = utc.with_timezone(&chrono_tz::Asia::Tokyo);
        assert!(rotation_due(&tokyo, 1, 8));
        assert!(!rotation_due(&tokyo, 0, 23));
    }

    #[test]
    fn test_pool_index_wraps() {
        assert_eq!(pool_index(0, 3), 0);
        assert_eq!(pool_index(4, 3), 1);
        assert_eq!(pool_index(23, 4), 3);
    }
}
