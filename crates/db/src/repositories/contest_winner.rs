//! Contest winner repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr,
    sea_query::Expr,
};
use versus_common::{AppError, AppResult};

use crate::entities::{ContestWinner, contest_winner};

/// Contest winner repository for database operations.
#[derive(Clone)]
pub struct ContestWinnerRepository {
    db: Arc<DatabaseConnection>,
}

impl ContestWinnerRepository {
    /// Create a new contest winner repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record a winner.
    ///
    /// The unique index on poll_id turns the at-most-one-winner invariant
    /// into a hard constraint; the losing insert of a race maps to
    /// [`AppError::WinnerAlreadyAnnounced`].
    pub async fn create(
        &self,
        model: contest_winner::ActiveModel,
    ) -> AppResult<contest_winner::Model> {
        match model.insert(self.db.as_ref()).await {
            Ok(winner) => Ok(winner),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(AppError::WinnerAlreadyAnnounced)
                }
                _ => Err(AppError::Database(e.to_string())),
            },
        }
    }

    /// Find the winner of a contest poll.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Option<contest_winner::Model>> {
        ContestWinner::find()
            .filter(contest_winner::Column::PollId.eq(poll_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a contest poll already has a winner.
    pub async fn exists_for_poll(&self, poll_id: &str) -> AppResult<bool> {
        Ok(self.find_by_poll(poll_id).await?.is_some())
    }

    /// Mark a winner record as notified.
    pub async fn mark_notified(&self, id: &str) -> AppResult<()> {
        ContestWinner::update_many()
            .col_expr(
                contest_winner::Column::Status,
                Expr::value(contest_winner::WinnerStatus::Notified),
            )
            .filter(contest_winner::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
