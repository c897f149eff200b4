//! Vote repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, SqlErr,
};
use versus_common::{AppError, AppResult};

use crate::entities::{Vote, vote};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a vote.
    ///
    /// The unique index on (poll_id, voter_key) is the authority on the
    /// one-vote-per-voter invariant; a violation surfaces as
    /// [`AppError::AlreadyVoted`] rather than a generic database error, so
    /// two concurrent casts resolve to exactly one row.
    pub async fn create(&self, model: vote::ActiveModel) -> AppResult<vote::Model> {
        match model.insert(self.db.as_ref()).await {
            Ok(vote) => Ok(vote),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::AlreadyVoted),
                _ => Err(AppError::Database(e.to_string())),
            },
        }
    }

    /// Check whether a voter has already voted on a poll.
    pub async fn has_voted(&self, poll_id: &str, voter_key: &str) -> AppResult<bool> {
        let count = Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .filter(vote::Column::VoterKey.eq(voter_key))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Total number of votes on a poll.
    pub async fn count_by_poll(&self, poll_id: &str) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Vote counts grouped by option index.
    ///
    /// Options with no votes are absent from the result; callers fill the
    /// gaps against the poll's option list.
    pub async fn counts_per_choice(&self, poll_id: &str) -> AppResult<Vec<(i32, i64)>> {
        Vote::find()
            .select_only()
            .column(vote::Column::Choice)
            .column_as(vote::Column::Id.count(), "count")
            .filter(vote::Column::PollId.eq(poll_id))
            .group_by(vote::Column::Choice)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of registered voters who picked the given option.
    ///
    /// Anonymous votes carry no user id and are excluded; contest winners
    /// must be drawable from this set.
    pub async fn voter_ids_for_choice(
        &self,
        poll_id: &str,
        choice: i32,
    ) -> AppResult<Vec<String>> {
        let votes = Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .filter(vote::Column::Choice.eq(choice))
            .filter(vote::Column::UserId.is_not_null())
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(votes.into_iter().filter_map(|v| v.user_id).collect())
    }

    /// Find a voter's vote on a poll, if any.
    pub async fn find_by_voter(
        &self,
        poll_id: &str,
        voter_key: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .filter(vote::Column::VoterKey.eq(voter_key))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All votes on a poll (export path).
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
