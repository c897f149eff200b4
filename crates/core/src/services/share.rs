//! Share service: the append-only social-share log.

use chrono::Utc;
use sea_orm::Set;
use versus_common::{AppError, AppResult, IdGenerator};
use versus_db::{
    entities::share::{self, SharePlatform},
    repositories::{PollRepository, ShareRepository},
};

use crate::services::settings::SettingsService;

/// Share service for business logic.
#[derive(Clone)]
pub struct ShareService {
    share_repo: ShareRepository,
    poll_repo: PollRepository,
    settings: SettingsService,
    id_gen: IdGenerator,
}

impl ShareService {
    /// Create a new share service.
    #[must_use]
    pub const fn new(
        share_repo: ShareRepository,
        poll_repo: PollRepository,
        settings: SettingsService,
    ) -> Self {
        Self {
            share_repo,
            poll_repo,
            settings,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a share event.
    ///
    /// The platform tag must be known and enabled in settings; the poll
    /// must exist and be active.
    pub async fn record(
        &self,
        poll_id: &str,
        user_id: Option<&str>,
        platform_tag: &str,
        ip: &str,
    ) -> AppResult<share::Model> {
        let platform = SharePlatform::from_tag(platform_tag)
            .ok_or_else(|| AppError::InvalidPlatform(platform_tag.to_string()))?;

        let enabled = self.settings.enabled_platforms().await?;
        if !enabled.iter().any(|tag| tag == platform_tag) {
            return Err(AppError::BadRequest(format!(
                "Sharing via {platform_tag} is disabled"
            )));
        }

        self.poll_repo
            .find_active(poll_id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(poll_id.to_string()))?;

        let model = share::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll_id.to_string()),
            user_id: Set(user_id.map(ToString::to_string)),
            platform: Set(platform),
            voter_ip: Set(ip.to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.share_repo.create(model).await
    }

    /// Per-platform share counts for a poll.
    pub async fn counts(&self, poll_id: &str) -> AppResult<Vec<(String, i64)>> {
        let counts = self.share_repo.counts_by_platform(poll_id).await?;
        Ok(counts
            .into_iter()
            .map(|(platform, count)| (platform.tag().to_string(), count))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_with(db: sea_orm::DatabaseConnection) -> ShareService {
        let db = Arc::new(db);
        ShareService::new(
            ShareRepository::new(Arc::clone(&db)),
            PollRepository::new(Arc::clone(&db)),
            SettingsService::new(db),
        )
    }

    #[tokio::test]
    async fn test_record_rejects_unknown_platform() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.record("p1", None, "myspace", "10.0.0.1").await;
        assert!(matches!(result, Err(AppError::InvalidPlatform(_))));
    }
}
