//! Job log repository.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect,
    sea_query::Query,
};
use versus_common::{AppError, AppResult};

use crate::entities::{JobLog, job_log};

/// Number of job-log entries retained.
const JOB_LOG_CAPACITY: u64 = 100;

/// Job log repository for database operations.
#[derive(Clone)]
pub struct JobLogRepository {
    db: Arc<DatabaseConnection>,
}

impl JobLogRepository {
    /// Create a new job log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry and prune the log to its capacity.
    pub async fn append(&self, model: job_log::ActiveModel) -> AppResult<job_log::Model> {
        let entry = model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Keep only the newest entries.
        JobLog::delete_many()
            .filter(
                job_log::Column::Id.not_in_subquery(
                    Query::select()
                        .column(job_log::Column::Id)
                        .from(job_log::Entity)
                        .order_by(job_log::Column::RanAt, Order::Desc)
                        .limit(JOB_LOG_CAPACITY)
                        .to_owned(),
                ),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(entry)
    }

    /// Most recent entries, newest first.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<job_log::Model>> {
        JobLog::find()
            .order_by(job_log::Column::RanAt, Order::Desc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
