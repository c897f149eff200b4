//! Popup dismissal repository.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    sea_query::Query,
};
use versus_common::{AppError, AppResult};

use crate::entities::{PopupDismissal, poll, popup_dismissal};

/// Popup dismissal repository for database operations.
#[derive(Clone)]
pub struct PopupDismissalRepository {
    db: Arc<DatabaseConnection>,
}

impl PopupDismissalRepository {
    /// Create a new popup dismissal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record a dismissal. Re-dismissing is a no-op.
    pub async fn dismiss(&self, user_id: &str, poll_id: &str) -> AppResult<()> {
        let model = popup_dismissal::ActiveModel {
            user_id: Set(user_id.to_string()),
            poll_id: Set(poll_id.to_string()),
            dismissed_at: Set(Utc::now().into()),
        };
        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(()),
            // Composite-key conflict: already dismissed.
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(()),
                _ => Err(AppError::Database(e.to_string())),
            },
        }
    }

    /// Check whether a user dismissed a poll's popup.
    pub async fn is_dismissed(&self, user_id: &str, poll_id: &str) -> AppResult<bool> {
        let found = PopupDismissal::find_by_id((user_id.to_string(), poll_id.to_string()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Garbage-collect dismissals whose poll no longer exists.
    ///
    /// Dismissals carry no foreign key to poll, so hard-deleting polls
    /// strands them until this runs.
    pub async fn delete_orphaned(&self) -> AppResult<u64> {
        let res = PopupDismissal::delete_many()
            .filter(
                popup_dismissal::Column::PollId.not_in_subquery(
                    Query::select()
                        .column(poll::Column::Id)
                        .from(poll::Entity)
                        .to_owned(),
                ),
            )
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }
}
