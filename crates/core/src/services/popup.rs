//! Popup service: per-user "don't show again" flags for poll popups.

use versus_common::{AppError, AppResult};
use versus_db::repositories::{PollRepository, PopupDismissalRepository};

/// Popup service for business logic.
#[derive(Clone)]
pub struct PopupService {
    dismissal_repo: PopupDismissalRepository,
    poll_repo: PollRepository,
}

impl PopupService {
    /// Create a new popup service.
    #[must_use]
    pub const fn new(dismissal_repo: PopupDismissalRepository, poll_repo: PollRepository) -> Self {
        Self {
            dismissal_repo,
            poll_repo,
        }
    }

    /// Record that a user dismissed a poll's popup.
    pub async fn dismiss(&self, user_id: &str, poll_id: &str) -> AppResult<()> {
        self.poll_repo
            .find_by_id(poll_id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(poll_id.to_string()))?;
        self.dismissal_repo.dismiss(user_id, poll_id).await
    }

    /// Whether a user dismissed a poll's popup.
    pub async fn is_dismissed(&self, user_id: &str, poll_id: &str) -> AppResult<bool> {
        self.dismissal_repo.is_dismissed(user_id, poll_id).await
    }
}
