//! Notification service: the retryable outbound email queue.

use chrono::{DateTime, Duration, Utc};
use sea_orm::Set;
use versus_common::{AppResult, IdGenerator};
use versus_db::{
    entities::pending_notification::{self, NotificationKind},
    repositories::{
        ContestWinnerRepository, InvitationRepository, NotificationQueueRepository,
        UserRepository,
    },
};

use crate::services::{email::EmailService, settings::SettingsService};

/// Failed delivery attempts before an entry is dropped.
pub const MAX_RETRY_COUNT: i32 = 3;

/// Backoff between delivery attempts.
const RETRY_BACKOFF_HOURS: i64 = 1;

/// Entries processed per flush run.
const FLUSH_BATCH_SIZE: u64 = 100;

/// Outcome counters for one flush run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushStats {
    pub delivered: u64,
    pub rescheduled: u64,
    pub dropped: u64,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    queue_repo: NotificationQueueRepository,
    user_repo: UserRepository,
    winner_repo: ContestWinnerRepository,
    invitation_repo: InvitationRepository,
    email: EmailService,
    settings: SettingsService,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        queue_repo: NotificationQueueRepository,
        user_repo: UserRepository,
        winner_repo: ContestWinnerRepository,
        invitation_repo: InvitationRepository,
        email: EmailService,
        settings: SettingsService,
    ) -> Self {
        Self {
            queue_repo,
            user_repo,
            winner_repo,
            invitation_repo,
            email,
            settings,
            id_gen: IdGenerator::new(),
        }
    }

    async fn enqueue(
        &self,
        kind: NotificationKind,
        poll_id: Option<&str>,
        recipient_id: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<pending_notification::Model> {
        let now = Utc::now();
        let model = pending_notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            kind: Set(kind),
            poll_id: Set(poll_id.map(ToString::to_string)),
            recipient_id: Set(recipient_id.map(ToString::to_string)),
            email: Set(email.map(ToString::to_string)),
            scheduled_at: Set(now.into()),
            retry_count: Set(0),
            created_at: Set(now.into()),
        };
        self.queue_repo.enqueue(model).await
    }

    /// Queue a winner-announced notification for the winning voter.
    pub async fn enqueue_winner_announced(
        &self,
        poll_id: &str,
        winner_user_id: &str,
    ) -> AppResult<()> {
        self.enqueue(
            NotificationKind::WinnerAnnounced,
            Some(poll_id),
            Some(winner_user_id),
            None,
        )
        .await?;
        Ok(())
    }

    /// Queue a contest-closed notification for the admin recipient.
    pub async fn enqueue_contest_closed(&self, poll_id: &str) -> AppResult<()> {
        self.enqueue(NotificationKind::ContestClosed, Some(poll_id), None, None)
            .await?;
        Ok(())
    }

    /// Queue a weekly-rotation notification for the admin recipient.
    pub async fn enqueue_weekly_rotated(&self, poll_id: &str) -> AppResult<()> {
        self.enqueue(NotificationKind::WeeklyRotated, Some(poll_id), None, None)
            .await?;
        Ok(())
    }

    /// Queue a poll-submitted notification for the admin recipient.
    pub async fn enqueue_poll_submitted(&self, poll_id: &str) -> AppResult<()> {
        self.enqueue(NotificationKind::PollSubmitted, Some(poll_id), None, None)
            .await?;
        Ok(())
    }

    /// Queue a manager-invitation email to a direct address.
    ///
    /// The acceptance token is not copied into the queue; delivery reads it
    /// from the invitation row, so a re-issued invitation always mails the
    /// current token.
    pub async fn enqueue_invitation(&self, email: &str) -> AppResult<()> {
        self.enqueue(NotificationKind::ManagerInvitation, None, None, Some(email))
            .await?;
        Ok(())
    }

    /// Deliver all due notifications.
    ///
    /// Delivered entries leave the queue; failures reschedule one hour out
    /// and are dropped after [`MAX_RETRY_COUNT`] attempts.
    pub async fn flush_due(&self, now: DateTime<Utc>) -> AppResult<FlushStats> {
        let settings = self.settings.get().await?;
        let due = self.queue_repo.find_due(now, FLUSH_BATCH_SIZE).await?;
        let mut stats = FlushStats::default();

        for entry in due {
            // A disabled notification toggle drains the queue without
            // sending anything.
            if !settings.notifications_enabled {
                self.queue_repo.delete(&entry.id).await?;
                stats.dropped += 1;
                continue;
            }

            let Some(address) =
                self.recipient_address(&entry, settings.notification_recipient.as_deref())
                    .await?
            else {
                tracing::warn!(id = %entry.id, kind = ?entry.kind, "No recipient address, dropping notification");
                self.queue_repo.delete(&entry.id).await?;
                stats.dropped += 1;
                continue;
            };

            let token = if entry.kind == NotificationKind::ManagerInvitation {
                self.invitation_repo
                    .find_pending_by_email(&address, now)
                    .await?
                    .map(|inv| inv.token)
            } else {
                None
            };

            let (subject, body) = render(&entry, token.as_deref());

            match self.email.send(&address, &subject, &body).await {
                Ok(()) => {
                    if entry.kind == NotificationKind::WinnerAnnounced
                        && let Some(ref poll_id) = entry.poll_id
                        && let Some(winner) = self.winner_repo.find_by_poll(poll_id).await?
                    {
                        self.winner_repo.mark_notified(&winner.id).await?;
                    }
                    self.queue_repo.delete(&entry.id).await?;
                    stats.delivered += 1;
                }
                Err(e) => {
                    if entry.retry_count + 1 >= MAX_RETRY_COUNT {
                        tracing::warn!(id = %entry.id, error = %e, "Notification failed {MAX_RETRY_COUNT} times, dropping");
                        self.queue_repo.delete(&entry.id).await?;
                        stats.dropped += 1;
                    } else {
                        tracing::debug!(id = %entry.id, error = %e, "Notification delivery failed, rescheduling");
                        self.queue_repo
                            .reschedule(entry, now + Duration::hours(RETRY_BACKOFF_HOURS))
                            .await?;
                        stats.rescheduled += 1;
                    }
                }
            }
        }

        Ok(stats)
    }

    async fn recipient_address(
        &self,
        entry: &pending_notification::Model,
        admin_recipient: Option<&str>,
    ) -> AppResult<Option<String>> {
        // Direct address
        if let Some(ref email) = entry.email {
            return Ok(Some(email.clone()));
        }
        // Recipient user's address
        if let Some(ref user_id) = entry.recipient_id {
            if let Some(user) = self.user_repo.find_by_id(user_id).await?
                && let Some(email) = user.email
            {
                return Ok(Some(email));
            }
            return Ok(None);
        }
        // Fall back to the configured admin recipient
        Ok(admin_recipient.map(ToString::to_string))
    }
}

/// Subject and body for a queue entry.
fn render(entry: &pending_notification::Model, token: Option<&str>) -> (String, String) {
    let poll_ref = entry.poll_id.as_deref().unwrap_or("-");
    match entry.kind {
        NotificationKind::WinnerAnnounced => (
            "You won a poll contest!".to_string(),
            format!("Congratulations! You were drawn as the winner of contest poll {poll_ref}."),
        ),
        NotificationKind::ContestClosed => (
            "A contest poll has closed".to_string(),
            format!("Contest poll {poll_ref} has reached its end time and was closed."),
        ),
        NotificationKind::WeeklyRotated => (
            "A new weekly poll is live".to_string(),
            format!("Poll {poll_ref} was promoted to this week's featured poll."),
        ),
        NotificationKind::PollSubmitted => (
            "A submitted poll awaits review".to_string(),
            format!("A visitor submitted poll {poll_ref}; it is parked until you approve it."),
        ),
        NotificationKind::ManagerInvitation => (
            "You have been invited as a poll manager".to_string(),
            format!(
                "You were invited to manage polls. Accept within 7 days using token: {}",
                token.unwrap_or("(invitation withdrawn)")
            ),
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(kind: NotificationKind, email: Option<&str>) -> pending_notification::Model {
        pending_notification::Model {
            id: "n1".to_string(),
            kind,
            poll_id: Some("p1".to_string()),
            recipient_id: None,
            email: email.map(ToString::to_string),
            scheduled_at: Utc::now().into(),
            retry_count: 0,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_render_winner_announced() {
        let (subject, body) = render(&entry(NotificationKind::WinnerAnnounced, None), None);
        assert!(subject.contains("won"));
        assert!(body.contains("p1"));
    }

    #[test]
    fn test_render_invitation_includes_token() {
        let (_, body) = render(
            &entry(NotificationKind::ManagerInvitation, Some("a@example.com")),
            Some("tok123"),
        );
        assert!(body.contains("tok123"));
    }
}
