//! Vote service: the vote ledger and its aggregations.

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use versus_common::{AppError, AppResult, IdGenerator};
use versus_db::{
    entities::{
        poll::PollStatus,
        vote::{self, voter_key},
    },
    repositories::{PollRepository, VoteRepository},
};

/// The party casting a vote: a signed-in user or an anonymous visitor
/// tracked by IP.
#[derive(Debug, Clone)]
pub struct Voter {
    pub user_id: Option<String>,
    pub ip: String,
    pub user_agent: Option<String>,
}

impl Voter {
    /// The deduplication key for this voter.
    #[must_use]
    pub fn key(&self) -> String {
        voter_key(self.user_id.as_deref(), &self.ip)
    }
}

/// Aggregated results for one poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollResults {
    pub total: i64,
    pub options: Vec<String>,
    pub counts: Vec<i64>,
    pub percentages: Vec<f64>,
}

/// Percentage per option, rounded to one decimal. All zeros when there are
/// no votes.
#[must_use]
pub fn percentages(counts: &[i64], total: i64) -> Vec<f64> {
    if total <= 0 {
        return vec![0.0; counts.len()];
    }
    counts
        .iter()
        .map(|&count| ((count as f64 / total as f64) * 1000.0).round() / 10.0)
        .collect()
}

/// The winning option: strictly greater count wins; an exact tie resolves
/// to the later option. Returns `None` when no votes were cast at all.
#[must_use]
pub fn winning_choice(counts: &[i64]) -> Option<(usize, i64)> {
    let mut winner: Option<(usize, i64)> = None;
    for (index, &count) in counts.iter().enumerate() {
        match winner {
            Some((_, best)) if best > count => {}
            _ => winner = Some((index, count)),
        }
    }
    winner.filter(|&(_, count)| count > 0)
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    poll_repo: PollRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository, poll_repo: PollRepository) -> Self {
        Self {
            vote_repo,
            poll_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast a vote.
    ///
    /// The checks run in order: poll exists and is active, contest polls
    /// require a signed-in voter, the choice is in range. The duplicate-vote
    /// case is left to the unique index, which the repository surfaces as
    /// [`AppError::AlreadyVoted`].
    pub async fn cast(&self, poll_id: &str, voter: &Voter, choice: i32) -> AppResult<vote::Model> {
        let poll = self
            .poll_repo
            .find_active(poll_id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(poll_id.to_string()))?;

        if poll.is_contest && voter.user_id.is_none() {
            return Err(AppError::Forbidden(
                "Contest polls require a signed-in voter".to_string(),
            ));
        }

        let options = poll
            .option_labels()
            .map_err(|e| AppError::Internal(format!("Invalid poll options: {e}")))?;

        if choice < 0 || choice as usize >= options.len() {
            return Err(AppError::InvalidOption(choice));
        }

        let model = vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll_id.to_string()),
            user_id: Set(voter.user_id.clone()),
            voter_key: Set(voter.key()),
            choice: Set(choice),
            voter_ip: Set(voter.ip.clone()),
            user_agent: Set(voter.user_agent.clone()),
            created_at: Set(Utc::now().into()),
        };

        self.vote_repo.create(model).await
    }

    /// Whether this voter has already voted on the poll.
    pub async fn has_voted(&self, poll_id: &str, voter: &Voter) -> AppResult<bool> {
        self.vote_repo.has_voted(poll_id, &voter.key()).await
    }

    /// Aggregated results for a poll.
    ///
    /// Soft-deleted polls report not-found like any other public read.
    pub async fn results(&self, poll_id: &str) -> AppResult<PollResults> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        if poll.status == PollStatus::Deleted {
            return Err(AppError::PollNotFound(poll_id.to_string()));
        }

        let options = poll
            .option_labels()
            .map_err(|e| AppError::Internal(format!("Invalid poll options: {e}")))?;

        let grouped = self.vote_repo.counts_per_choice(poll_id).await?;

        let mut counts = vec![0i64; options.len()];
        for (choice, count) in grouped {
            if let Some(slot) = counts.get_mut(choice as usize) {
                *slot = count;
            }
        }
        let total: i64 = counts.iter().sum();
        let percentages = percentages(&counts, total);

        Ok(PollResults {
            total,
            options,
            counts,
            percentages,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;
    use versus_db::entities::poll;

    fn mock_poll(id: &str, is_contest: bool) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            question: "Coffee or tea?".to_string(),
            options: json!(["Coffee", "Tea"]),
            image_url: None,
            is_weekly: false,
            is_contest,
            contest_prize: None,
            contest_ends_at: None,
            status: poll::PollStatus::Active,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> VoteService {
        let db = Arc::new(db);
        VoteService::new(VoteRepository::new(Arc::clone(&db)), PollRepository::new(db))
    }

    fn anonymous(ip: &str) -> Voter {
        Voter {
            user_id: None,
            ip: ip.to_string(),
            user_agent: None,
        }
    }

    #[test]
    fn test_percentages_coffee_or_tea() {
        // 2 votes Coffee, 1 vote Tea
        let pcts = percentages(&[2, 1], 3);
        assert_eq!(pcts, vec![66.7, 33.3]);
    }

    #[test]
    fn test_percentages_zero_votes() {
        assert_eq!(percentages(&[0, 0], 0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_percentages_sum_close_to_100() {
        let counts = [7, 11, 3];
        let total = 21;
        let sum: f64 = percentages(&counts, total).iter().sum();
        assert!((sum - 100.0).abs() < 0.2);
    }

    #[test]
    fn test_winning_choice_strict_majority() {
        assert_eq!(winning_choice(&[5, 3]), Some((0, 5)));
        assert_eq!(winning_choice(&[3, 5]), Some((1, 5)));
    }

    #[test]
    fn test_winning_choice_tie_resolves_to_later_option() {
        // 5/5 tie resolves to the second option
        assert_eq!(winning_choice(&[5, 5]), Some((1, 5)));
        assert_eq!(winning_choice(&[2, 2, 2]), Some((2, 2)));
    }

    #[test]
    fn test_winning_choice_no_votes() {
        assert_eq!(winning_choice(&[0, 0]), None);
        assert_eq!(winning_choice(&[]), None);
    }

    #[tokio::test]
    async fn test_cast_on_missing_poll() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.cast("missing", &anonymous("10.0.0.1"), 0).await;
        assert!(matches!(result, Err(AppError::PollNotFound(_))));
    }

    #[tokio::test]
    async fn test_cast_rejects_out_of_range_choice() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[mock_poll("p1", false)]])
            .into_connection();
        let service = service_with(db);

        let result = service.cast("p1", &anonymous("10.0.0.1"), 2).await;
        assert!(matches!(result, Err(AppError::InvalidOption(2))));
    }

    #[tokio::test]
    async fn test_cast_rejects_negative_choice() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[mock_poll("p1", false)]])
            .into_connection();
        let service = service_with(db);

        let result = service.cast("p1", &anonymous("10.0.0.1"), -1).await;
        assert!(matches!(result, Err(AppError::InvalidOption(-1))));
    }

    #[tokio::test]
    async fn test_cast_contest_requires_login() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[mock_poll("p1", true)]])
            .into_connection();
        let service = service_with(db);

        let result = service.cast("p1", &anonymous("10.0.0.1"), 0).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_results_on_soft_deleted_poll() {
        let mut poll = mock_poll("p1", false);
        poll.status = poll::PollStatus::Deleted;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[poll]])
            .into_connection();
        let service = service_with(db);

        let result = service.results("p1").await;
        assert!(matches!(result, Err(AppError::PollNotFound(_))));
    }
}
