//! Contest service: winner selection for contest polls.

use chrono::Utc;
use rand::Rng;
use sea_orm::Set;
use versus_common::{AppError, AppResult, IdGenerator};
use versus_db::{
    entities::contest_winner::{self, WinnerStatus},
    repositories::{ContestWinnerRepository, PollRepository, VoteRepository},
};

use crate::services::{notification::NotificationService, vote::winning_choice};

/// Contest service for business logic.
#[derive(Clone)]
pub struct ContestService {
    poll_repo: PollRepository,
    vote_repo: VoteRepository,
    winner_repo: ContestWinnerRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

/// Pick a winner by explicit random index over the eligible voter set.
///
/// Deliberately not an unordered-random query at the storage layer: the
/// draw is seedable, provably uniform, and independent of the store.
fn draw_winner<'a, R: Rng>(rng: &mut R, voters: &'a [String]) -> &'a str {
    &voters[rng.gen_range(0..voters.len())]
}

impl ContestService {
    /// Create a new contest service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        vote_repo: VoteRepository,
        winner_repo: ContestWinnerRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            poll_repo,
            vote_repo,
            winner_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Announce the winner of a contest poll.
    ///
    /// The winning option is the one with the strictly greater count (ties
    /// resolve to the later option); the winner is drawn uniformly at
    /// random from that option's signed-in voters. The unique index on the
    /// winner table decides any announce race.
    pub async fn announce(
        &self,
        poll_id: &str,
        prize: Option<String>,
    ) -> AppResult<contest_winner::Model> {
        // Admin view: a closed contest is no longer `active`.
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        if !poll.is_contest {
            return Err(AppError::NotAContest(poll_id.to_string()));
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

        let (winning_index, winning_votes) = winning_choice(&counts).ok_or(AppError::NoVotes)?;

        let voters = self
            .vote_repo
            .voter_ids_for_choice(poll_id, winning_index as i32)
            .await?;
        if voters.is_empty() {
            // Possible when every vote on the winning option was anonymous.
            return Err(AppError::NoVotes);
        }

        let prize = prize
            .or(poll.contest_prize)
            .ok_or_else(|| AppError::BadRequest("No prize description".to_string()))?;

        let winner_user_id = draw_winner(&mut rand::thread_rng(), &voters).to_string();

        let model = contest_winner::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll_id.to_string()),
            user_id: Set(winner_user_id.clone()),
            prize: Set(prize),
            winning_choice: Set(winning_index as i32),
            winning_votes: Set(winning_votes as i32),
            status: Set(WinnerStatus::Announced),
            announced_at: Set(Utc::now().into()),
        };

        let winner = self.winner_repo.create(model).await?;

        self.notifications
            .enqueue_winner_announced(poll_id, &winner_user_id)
            .await?;

        Ok(winner)
    }

    /// Get the winner of a contest poll.
    pub async fn get(&self, poll_id: &str) -> AppResult<contest_winner::Model> {
        self.winner_repo
            .find_by_poll(poll_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No winner for poll: {poll_id}")))
    }

    /// Whether a contest poll already has a winner.
    pub async fn has_winner(&self, poll_id: &str) -> AppResult<bool> {
        self.winner_repo.exists_for_poll(poll_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::{SeedableRng, rngs::StdRng};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;
    use versus_db::{
        entities::poll,
        repositories::{
            InvitationRepository, NotificationQueueRepository, UserRepository,
        },
    };

    use crate::services::{email::EmailService, settings::SettingsService};

    fn mock_poll(id: &str, is_contest: bool) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            question: "Coffee or tea?".to_string(),
            options: json!(["Coffee", "Tea"]),
            image_url: None,
            is_weekly: false,
            is_contest,
            contest_prize: Some("Mug".to_string()),
            contest_ends_at: None,
            status: poll::PollStatus::Ended,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> ContestService {
        let db = Arc::new(db);
        let notifications = crate::services::notification::NotificationService::new(
            NotificationQueueRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            ContestWinnerRepository::new(Arc::clone(&db)),
            InvitationRepository::new(Arc::clone(&db)),
            EmailService::disabled(),
            SettingsService::new(Arc::clone(&db)),
        );
        ContestService::new(
            PollRepository::new(Arc::clone(&db)),
            VoteRepository::new(Arc::clone(&db)),
            ContestWinnerRepository::new(db),
            notifications,
        )
    }

    #[tokio::test]
    async fn test_announce_on_non_contest_poll() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[mock_poll("p1", false)]])
            .into_connection();
        let service = service_with(db);

        let result = service.announce("p1", None).await;
        assert!(matches!(result, Err(AppError::NotAContest(_))));
    }

    #[tokio::test]
    async fn test_announce_with_zero_votes() {
        // Second query is the empty per-choice tally.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[mock_poll("p1", true)]])
            .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.announce("p1", None).await;
        assert!(matches!(result, Err(AppError::NoVotes)));
    }

    #[tokio::test]
    async fn test_announce_on_missing_poll() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<poll::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.announce("missing", None).await;
        assert!(matches!(result, Err(AppError::PollNotFound(_))));
    }

    #[test]
    fn test_draw_winner_is_deterministic_with_seed() {
        let voters: Vec<String> = (0..5).map(|i| format!("u{i}")).collect();
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);

        assert_eq!(
            draw_winner(&mut rng_a, &voters),
            draw_winner(&mut rng_b, &voters)
        );
    }

    #[test]
    fn test_draw_winner_stays_in_bounds() {
        let voters: Vec<String> = (0..3).map(|i| format!("u{i}")).collect();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let winner = draw_winner(&mut rng, &voters);
            assert!(voters.iter().any(|v| v == winner));
        }
    }

    #[test]
    fn test_draw_winner_single_voter() {
        let voters = vec!["only".to_string()];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(draw_winner(&mut rng, &voters), "only");
    }
}
