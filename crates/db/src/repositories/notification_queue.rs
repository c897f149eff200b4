//! Pending-notification queue repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use versus_common::{AppError, AppResult};

use crate::entities::{PendingNotification, pending_notification};

/// Repository for the pending-notification queue.
#[derive(Clone)]
pub struct NotificationQueueRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationQueueRepository {
    /// Create a new notification queue repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Enqueue a notification.
    pub async fn enqueue(
        &self,
        model: pending_notification::ActiveModel,
    ) -> AppResult<pending_notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries whose scheduled time has arrived, oldest first.
    pub async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<pending_notification::Model>> {
        PendingNotification::find()
            .filter(pending_notification::Column::ScheduledAt.lte(now))
            .order_by(pending_notification::Column::ScheduledAt, Order::Asc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove a delivered (or dropped) entry.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        PendingNotification::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Push an entry back after a failed delivery attempt.
    pub async fn reschedule(
        &self,
        entry: pending_notification::Model,
        next_at: DateTime<Utc>,
    ) -> AppResult<pending_notification::Model> {
        let retry_count = entry.retry_count + 1;
        let mut active: pending_notification::ActiveModel = entry.into();
        active.retry_count = Set(retry_count);
        active.scheduled_at = Set(next_at.into());
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of queued entries.
    pub async fn count(&self) -> AppResult<u64> {
        use sea_orm::PaginatorTrait;
        PendingNotification::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
