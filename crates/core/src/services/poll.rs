//! Poll service.

use chrono::{DateTime, Duration, Utc};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use versus_common::{AppError, AppResult, IdGenerator};
use versus_db::{
    entities::poll::{self, PollStatus},
    repositories::{PollKind, PollListFilter, PollRepository},
};

use crate::services::settings::SettingsService;

/// Minimum number of options per poll.
const MIN_OPTIONS: usize = 2;

/// Maximum number of options per poll.
const MAX_OPTIONS: usize = 10;

/// Maximum length of an option label.
const MAX_OPTION_LEN: usize = 50;

/// Maximum length of the question text.
const MAX_QUESTION_LEN: usize = 255;

/// Input for creating a poll.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePollInput {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_weekly: bool,
    #[serde(default)]
    pub is_contest: bool,
    #[serde(default)]
    pub contest_prize: Option<String>,
    #[serde(default)]
    pub contest_ends_at: Option<DateTime<Utc>>,
}

/// Input for updating a poll. Only supplied fields change.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdatePollInput {
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    pub image_url: Option<Option<String>>,
    pub is_contest: Option<bool>,
    pub contest_prize: Option<Option<String>>,
    pub contest_ends_at: Option<Option<DateTime<Utc>>>,
    pub status: Option<PollStatus>,
}

/// Bulk admin operations over poll id lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkPollAction {
    Delete,
    Archive,
    Activate,
    MakeWeekly,
}

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    settings: SettingsService,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(poll_repo: PollRepository, settings: SettingsService) -> Self {
        Self {
            poll_repo,
            settings,
            id_gen: IdGenerator::new(),
        }
    }

    fn validate_question(question: &str) -> AppResult<()> {
        if question.trim().is_empty() {
            return Err(AppError::Validation("Question cannot be empty".to_string()));
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(AppError::Validation(format!(
                "Question is too long (max {MAX_QUESTION_LEN} chars)"
            )));
        }
        Ok(())
    }

    fn validate_options(options: &[String]) -> AppResult<()> {
        if options.len() < MIN_OPTIONS {
            return Err(AppError::Validation(format!(
                "Poll must have at least {MIN_OPTIONS} options"
            )));
        }
        if options.len() > MAX_OPTIONS {
            return Err(AppError::Validation(format!(
                "Poll cannot have more than {MAX_OPTIONS} options"
            )));
        }
        for option in options {
            if option.trim().is_empty() {
                return Err(AppError::Validation(
                    "Poll options cannot be empty".to_string(),
                ));
            }
            if option.len() > MAX_OPTION_LEN {
                return Err(AppError::Validation(format!(
                    "Poll option is too long (max {MAX_OPTION_LEN} chars)"
                )));
            }
        }
        Ok(())
    }

    fn validate_contest_fields(input: &CreatePollInput, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(ref prize) = input.contest_prize
            && prize.len() > MAX_QUESTION_LEN
        {
            return Err(AppError::Validation(format!(
                "Prize description is too long (max {MAX_QUESTION_LEN} chars)"
            )));
        }
        if let Some(ends_at) = input.contest_ends_at
            && ends_at <= now
        {
            return Err(AppError::Validation(
                "Contest end time must be in the future".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a poll.
    ///
    /// A contest poll without an explicit end time gets the configured
    /// default duration. Polls needing approval start out `archived` until
    /// an admin activates them.
    pub async fn create(
        &self,
        owner_id: &str,
        input: CreatePollInput,
        needs_approval: bool,
    ) -> AppResult<poll::Model> {
        let now = Utc::now();

        Self::validate_question(&input.question)?;
        Self::validate_options(&input.options)?;
        Self::validate_contest_fields(&input, now)?;

        let contest_ends_at = if input.is_contest {
            match input.contest_ends_at {
                Some(at) => Some(at),
                None => {
                    let settings = self.settings.get().await?;
                    Some(now + Duration::days(i64::from(settings.contest_default_duration_days)))
                }
            }
        } else {
            None
        };

        let status = if needs_approval {
            PollStatus::Archived
        } else {
            PollStatus::Active
        };

        let model = poll::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(owner_id.to_string()),
            question: Set(input.question),
            options: Set(json!(input.options)),
            image_url: Set(input.image_url),
            is_weekly: Set(input.is_weekly),
            is_contest: Set(input.is_contest),
            contest_prize: Set(input.contest_prize.filter(|_| input.is_contest)),
            contest_ends_at: Set(contest_ends_at.map(Into::into)),
            status: Set(status),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        self.poll_repo.create(model).await
    }

    /// Get an active poll (public view).
    pub async fn get(&self, poll_id: &str) -> AppResult<poll::Model> {
        self.poll_repo.get_active(poll_id).await
    }

    /// Get a poll regardless of status (admin view).
    pub async fn get_any(&self, poll_id: &str) -> AppResult<poll::Model> {
        self.poll_repo.get_by_id(poll_id).await
    }

    /// Get the latest poll.
    ///
    /// The active weekly poll takes priority over plain recency; then the
    /// newest active poll of the requested kind; then the newest active
    /// poll overall.
    pub async fn get_latest(&self, kind: Option<PollKind>) -> AppResult<poll::Model> {
        if let Some(weekly) = self.poll_repo.find_latest_of_kind(PollKind::Weekly).await? {
            return Ok(weekly);
        }
        if let Some(kind) = kind
            && let Some(poll) = self.poll_repo.find_latest_of_kind(kind).await?
        {
            return Ok(poll);
        }
        self.poll_repo
            .find_latest_active()
            .await?
            .ok_or_else(|| AppError::NotFound("No active polls".to_string()))
    }

    /// List polls with a total count.
    pub async fn list(
        &self,
        filter: PollListFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<poll::Model>, u64)> {
        let per_page = per_page.clamp(1, 100);
        let offset = page.saturating_sub(1) * per_page;
        let polls = self.poll_repo.list(&filter, per_page, offset).await?;
        let total = self.poll_repo.count(&filter).await?;
        Ok((polls, total))
    }

    /// Update a poll, touching only the supplied fields.
    pub async fn update(&self, poll_id: &str, input: UpdatePollInput) -> AppResult<poll::Model> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        if let Some(ref question) = input.question {
            Self::validate_question(question)?;
        }
        if let Some(ref options) = input.options {
            Self::validate_options(options)?;
        }

        let mut active: poll::ActiveModel = poll.into();

        if let Some(question) = input.question {
            active.question = Set(question);
        }
        if let Some(options) = input.options {
            active.options = Set(json!(options));
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(is_contest) = input.is_contest {
            active.is_contest = Set(is_contest);
        }
        if let Some(contest_prize) = input.contest_prize {
            active.contest_prize = Set(contest_prize);
        }
        if let Some(contest_ends_at) = input.contest_ends_at {
            active.contest_ends_at = Set(contest_ends_at.map(Into::into));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.poll_repo.update(active).await
    }

    /// Soft-delete a poll.
    pub async fn delete(&self, poll_id: &str) -> AppResult<()> {
        self.set_status(poll_id, PollStatus::Deleted).await
    }

    /// Set a poll's status.
    pub async fn set_status(&self, poll_id: &str, status: PollStatus) -> AppResult<()> {
        if self.poll_repo.set_status(poll_id, status).await? {
            Ok(())
        } else {
            Err(AppError::PollNotFound(poll_id.to_string()))
        }
    }

    /// Clear the weekly flag everywhere.
    pub async fn clear_weekly_flag_on_all(&self) -> AppResult<u64> {
        self.poll_repo.clear_weekly_flag_on_all().await
    }

    /// Promote a poll to be the single weekly poll.
    pub async fn make_weekly(&self, poll_id: &str) -> AppResult<poll::Model> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        self.poll_repo.clear_weekly_flag_on_all().await?;

        let mut active: poll::ActiveModel = poll.into();
        active.is_weekly = Set(true);
        active.status = Set(PollStatus::Active);
        active.updated_at = Set(Some(Utc::now().into()));

        self.poll_repo.update(active).await
    }

    /// Apply a bulk action to a list of poll ids.
    ///
    /// Returns the number of polls affected. `MakeWeekly` accepts exactly
    /// one id since only one weekly poll may exist.
    pub async fn bulk(&self, action: BulkPollAction, poll_ids: &[String]) -> AppResult<u64> {
        if poll_ids.is_empty() {
            return Err(AppError::BadRequest("No poll ids supplied".to_string()));
        }

        match action {
            BulkPollAction::MakeWeekly => {
                if poll_ids.len() != 1 {
                    return Err(AppError::BadRequest(
                        "make_weekly takes exactly one poll id".to_string(),
                    ));
                }
                self.make_weekly(&poll_ids[0]).await?;
                Ok(1)
            }
            BulkPollAction::Delete | BulkPollAction::Archive | BulkPollAction::Activate => {
                let status = match action {
                    BulkPollAction::Delete => PollStatus::Deleted,
                    BulkPollAction::Archive => PollStatus::Archived,
                    _ => PollStatus::Active,
                };
                let mut affected = 0;
                for poll_id in poll_ids {
                    if self.poll_repo.set_status(poll_id, status).await? {
                        affected += 1;
                    }
                }
                Ok(affected)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn mock_poll(id: &str, question: &str, is_weekly: bool) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            question: question.to_string(),
            options: json!(["Coffee", "Tea"]),
            image_url: None,
            is_weekly,
            is_contest: false,
            contest_prize: None,
            contest_ends_at: None,
            status: PollStatus::Active,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> PollService {
        let db = Arc::new(db);
        PollService::new(
            PollRepository::new(Arc::clone(&db)),
            SettingsService::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_single_option() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .create(
                "u1",
                CreatePollInput {
                    question: "Coffee or tea?".to_string(),
                    options: vec!["Coffee".to_string()],
                    image_url: None,
                    is_weekly: false,
                    is_contest: false,
                    contest_prize: None,
                    contest_ends_at: None,
                },
                false,
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_long_option() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .create(
                "u1",
                CreatePollInput {
                    question: "Coffee or tea?".to_string(),
                    options: vec!["Coffee".to_string(), "x".repeat(51)],
                    image_url: None,
                    is_weekly: false,
                    is_contest: false,
                    contest_prize: None,
                    contest_ends_at: None,
                },
                false,
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_past_contest_end() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .create(
                "u1",
                CreatePollInput {
                    question: "Coffee or tea?".to_string(),
                    options: vec!["Coffee".to_string(), "Tea".to_string()],
                    image_url: None,
                    is_weekly: false,
                    is_contest: true,
                    contest_prize: Some("Mug".to_string()),
                    contest_ends_at: Some(Utc::now() - Duration::days(1)),
                },
                false,
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_latest_prefers_weekly() {
        let weekly = mock_poll("p_weekly", "Weekly?", true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[weekly.clone()]])
            .into_connection();
        let service = service_with(db);

        let poll = service.get_latest(None).await.unwrap();
        assert_eq!(poll.id, "p_weekly");
    }

    #[tokio::test]
    async fn test_get_latest_falls_back_to_newest_active() {
        let plain = mock_poll("p_plain", "Plain?", false);

        // First query (weekly lookup) returns nothing, second returns the
        // newest active poll.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new(), vec![plain.clone()]])
            .into_connection();
        let service = service_with(db);

        let poll = service.get_latest(None).await.unwrap();
        assert_eq!(poll.id, "p_plain");
    }

    #[tokio::test]
    async fn test_get_latest_errors_when_no_polls() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new(), Vec::<poll::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.get_latest(None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_public_get_hides_soft_deleted_poll() {
        // The status filter excludes the row, so the public read sees
        // nothing even though the row exists for the admin variant.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.get("p_deleted").await;
        assert!(matches!(result, Err(AppError::PollNotFound(_))));
    }

    #[tokio::test]
    async fn test_admin_get_sees_any_status() {
        let mut poll = mock_poll("p1", "Hidden?", false);
        poll.status = PollStatus::Deleted;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[poll]])
            .into_connection();
        let service = service_with(db);

        let found = service.get_any("p1").await.unwrap();
        assert_eq!(found.status, PollStatus::Deleted);
    }

    #[tokio::test]
    async fn test_bulk_rejects_empty_id_list() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.bulk(BulkPollAction::Archive, &[]).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_bulk_make_weekly_requires_single_id() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service
            .bulk(
                BulkPollAction::MakeWeekly,
                &["p1".to_string(), "p2".to_string()],
            )
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_soft_deletes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = service_with(db);

        assert!(service.delete("p1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_poll_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = service_with(db);

        let result = service.delete("missing").await;
        assert!(matches!(result, Err(AppError::PollNotFound(_))));
    }
}
