//! Share repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};
use versus_common::{AppError, AppResult};

use crate::entities::{Share, share};

/// Share repository for database operations.
#[derive(Clone)]
pub struct ShareRepository {
    db: Arc<DatabaseConnection>,
}

impl ShareRepository {
    /// Create a new share repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a share event.
    pub async fn create(&self, model: share::ActiveModel) -> AppResult<share::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Share counts grouped by platform for a poll.
    pub async fn counts_by_platform(
        &self,
        poll_id: &str,
    ) -> AppResult<Vec<(share::SharePlatform, i64)>> {
        Share::find()
            .select_only()
            .column(share::Column::Platform)
            .column_as(share::Column::Id.count(), "count")
            .filter(share::Column::PollId.eq(poll_id))
            .group_by(share::Column::Platform)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All share events for a poll (export path).
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<share::Model>> {
        Share::find()
            .filter(share::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
