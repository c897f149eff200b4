//! Poll repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::Expr,
};
use versus_common::{AppError, AppResult};

use crate::entities::{Poll, poll};

/// Poll type selector used by latest-poll lookups and list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollKind {
    /// The featured weekly poll.
    Weekly,
    /// A contest poll with a prize.
    Contest,
    /// Neither weekly nor contest.
    Regular,
}

impl PollKind {
    fn condition(self) -> Condition {
        match self {
            Self::Weekly => Condition::all().add(poll::Column::IsWeekly.eq(true)),
            Self::Contest => Condition::all().add(poll::Column::IsContest.eq(true)),
            Self::Regular => Condition::all()
                .add(poll::Column::IsWeekly.eq(false))
                .add(poll::Column::IsContest.eq(false)),
        }
    }
}

/// Filters for poll listing.
#[derive(Debug, Clone, Default)]
pub struct PollListFilter {
    /// Restrict to one status.
    pub status: Option<poll::PollStatus>,
    /// Restrict to one owner.
    pub user_id: Option<String>,
    /// Restrict to one poll kind.
    pub kind: Option<PollKind>,
    /// Created-at lower bound.
    pub created_after: Option<DateTime<Utc>>,
    /// Created-at upper bound.
    pub created_before: Option<DateTime<Utc>>,
    /// Free-text search over the question.
    pub search: Option<String>,
}

impl PollListFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(status) = self.status {
            cond = cond.add(poll::Column::Status.eq(status));
        }
        if let Some(ref user_id) = self.user_id {
            cond = cond.add(poll::Column::UserId.eq(user_id));
        }
        if let Some(kind) = self.kind {
            cond = cond.add(kind.condition());
        }
        if let Some(after) = self.created_after {
            cond = cond.add(poll::Column::CreatedAt.gte(after));
        }
        if let Some(before) = self.created_before {
            cond = cond.add(poll::Column::CreatedAt.lte(before));
        }
        if let Some(ref search) = self.search {
            cond = cond.add(poll::Column::Question.contains(search));
        }
        cond
    }
}

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID regardless of status (admin view).
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active poll by ID (public view).
    pub async fn find_active(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .filter(poll::Column::Status.eq(poll::PollStatus::Active))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID regardless of status, erroring if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(id.to_string()))
    }

    /// Get an active poll by ID, erroring if absent or not active.
    pub async fn get_active(&self, id: &str) -> AppResult<poll::Model> {
        self.find_active(id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(id.to_string()))
    }

    /// Find the newest active poll matching a kind, if any.
    pub async fn find_latest_of_kind(&self, kind: PollKind) -> AppResult<Option<poll::Model>> {
        Poll::find()
            .filter(poll::Column::Status.eq(poll::PollStatus::Active))
            .filter(kind.condition())
            .order_by(poll::Column::CreatedAt, Order::Desc)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the newest active poll of any kind.
    pub async fn find_latest_active(&self) -> AppResult<Option<poll::Model>> {
        Poll::find()
            .filter(poll::Column::Status.eq(poll::PollStatus::Active))
            .order_by(poll::Column::CreatedAt, Order::Desc)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every poll regardless of status (export path).
    pub async fn find_all(&self) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .order_by(poll::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List polls matching a filter, newest first.
    pub async fn list(
        &self,
        filter: &PollListFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(filter.condition())
            .order_by(poll::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count polls matching a filter.
    pub async fn count(&self, filter: &PollListFilter) -> AppResult<u64> {
        Poll::find()
            .filter(filter.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new poll.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the status of a poll. Returns whether a row was affected.
    pub async fn set_status(&self, id: &str, status: poll::PollStatus) -> AppResult<bool> {
        let res = Poll::update_many()
            .col_expr(poll::Column::Status, Expr::value(status))
            .col_expr(poll::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(poll::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected > 0)
    }

    /// Clear the weekly flag on every poll. Returns the number of demoted
    /// polls.
    pub async fn clear_weekly_flag_on_all(&self) -> AppResult<u64> {
        let res = Poll::update_many()
            .col_expr(poll::Column::IsWeekly, Expr::value(false))
            .col_expr(poll::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(poll::Column::IsWeekly.eq(true))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }

    /// Find active weekly polls created before a cutoff.
    pub async fn find_weekly_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::IsWeekly.eq(true))
            .filter(poll::Column::Status.eq(poll::PollStatus::Active))
            .filter(poll::Column::CreatedAt.lt(cutoff))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find active contest polls whose end time has passed.
    pub async fn find_contests_due(&self, now: DateTime<Utc>) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::IsContest.eq(true))
            .filter(poll::Column::Status.eq(poll::PollStatus::Active))
            .filter(poll::Column::ContestEndsAt.lte(now))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find retired (`archived`/`ended`) polls created before a cutoff.
    pub async fn find_retired_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(
                Condition::any()
                    .add(poll::Column::Status.eq(poll::PollStatus::Archived))
                    .add(poll::Column::Status.eq(poll::PollStatus::Ended)),
            )
            .filter(poll::Column::CreatedAt.lt(cutoff))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Hard-delete polls by ID. Votes, shares and winners cascade.
    pub async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let res = Poll::delete_many()
            .filter(poll::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }

    /// Hard-delete every poll (import replace mode).
    pub async fn delete_all(&self) -> AppResult<u64> {
        let res = Poll::delete_many()
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }
}
