//! Manager invitation repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use versus_common::{AppError, AppResult};

use crate::entities::{ManagerInvitation, manager_invitation};

/// Manager invitation repository for database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    db: Arc<DatabaseConnection>,
}

impl InvitationRepository {
    /// Create a new invitation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create an invitation.
    pub async fn create(
        &self,
        model: manager_invitation::ActiveModel,
    ) -> AppResult<manager_invitation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an invitation by its token.
    pub async fn find_by_token(
        &self,
        token: &str,
    ) -> AppResult<Option<manager_invitation::Model>> {
        ManagerInvitation::find()
            .filter(manager_invitation::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stamp an invitation as accepted.
    pub async fn mark_accepted(
        &self,
        invitation: manager_invitation::Model,
        at: DateTime<Utc>,
    ) -> AppResult<manager_invitation::Model> {
        let mut active: manager_invitation::ActiveModel = invitation.into();
        active.accepted_at = Set(Some(at.into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the newest live invitation for an address: not yet accepted,
    /// not yet expired.
    pub async fn find_pending_by_email(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<manager_invitation::Model>> {
        use sea_orm::{Order, QueryOrder};
        ManagerInvitation::find()
            .filter(manager_invitation::Column::Email.eq(email))
            .filter(manager_invitation::Column::AcceptedAt.is_null())
            .filter(manager_invitation::Column::ExpiresAt.gt(now))
            .order_by(manager_invitation::Column::CreatedAt, Order::Desc)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Purge expired, never-accepted invitations. Returns rows removed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let res = ManagerInvitation::delete_many()
            .filter(manager_invitation::Column::ExpiresAt.lt(now))
            .filter(manager_invitation::Column::AcceptedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(res.rows_affected)
    }
}
