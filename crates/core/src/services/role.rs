//! Role service: the poll-manager role, capability checks, and the
//! invitation flow.

use chrono::{Duration, Utc};
use sea_orm::Set;
use validator::ValidateEmail;
use versus_common::{AppError, AppResult, IdGenerator};
use versus_db::{
    entities::{
        manager_invitation,
        user::{self, UserRole},
    },
    repositories::{InvitationRepository, UserRepository},
};

use crate::services::notification::NotificationService;

/// How long an invitation stays acceptable.
pub const INVITATION_VALIDITY_DAYS: i64 = 7;

/// Actions gated by role.
///
/// Every admin surface checks one of these; there is no page-name or
/// slug-based gating anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read polls, including non-active ones.
    ReadPolls,
    /// Create polls and run bulk operations.
    ManagePolls,
    /// Edit existing polls.
    EditPolls,
    /// Delete (soft or hard) polls.
    DeletePolls,
    /// View vote tallies and winner records.
    ViewResults,
    /// Change application settings, roles, and run import/export.
    ManageSettings,
}

/// Whether a user holds a capability.
///
/// Admins hold everything; poll managers hold everything except
/// [`Capability::ManageSettings`].
#[must_use]
pub fn user_can(user: &user::Model, capability: Capability) -> bool {
    if user.is_admin {
        return true;
    }
    match user.role {
        Some(UserRole::PollManager) => capability != Capability::ManageSettings,
        None => false,
    }
}

/// Role service for business logic.
#[derive(Clone)]
pub struct RoleService {
    user_repo: UserRepository,
    invitation_repo: InvitationRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl RoleService {
    /// Create a new role service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        invitation_repo: InvitationRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            user_repo,
            invitation_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Error unless the user holds the capability.
    pub fn require(&self, user: &user::Model, capability: Capability) -> AppResult<()> {
        if user_can(user, capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission for this action".to_string(),
            ))
        }
    }

    /// Invite an address to become a poll manager.
    ///
    /// The invitation expires after [`INVITATION_VALIDITY_DAYS`]; the
    /// expiry is enforced at acceptance, not just mentioned in the email.
    pub async fn invite(
        &self,
        email: &str,
        inviter_id: &str,
    ) -> AppResult<manager_invitation::Model> {
        if !email.validate_email() {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        let now = Utc::now();
        let model = manager_invitation::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email.to_string()),
            token: Set(self.id_gen.generate_token()),
            invited_by: Set(inviter_id.to_string()),
            expires_at: Set((now + Duration::days(INVITATION_VALIDITY_DAYS)).into()),
            accepted_at: Set(None),
            created_at: Set(now.into()),
        };

        let invitation = self.invitation_repo.create(model).await?;
        self.notifications.enqueue_invitation(email).await?;

        Ok(invitation)
    }

    /// Accept an invitation, granting the poll-manager role.
    pub async fn accept(
        &self,
        token: &str,
        user_id: &str,
    ) -> AppResult<manager_invitation::Model> {
        let invitation = self
            .invitation_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::InvitationNotFound)?;

        if invitation.accepted_at.is_some() {
            return Err(AppError::Conflict(
                "Invitation already accepted".to_string(),
            ));
        }

        let now = Utc::now();
        if invitation.expires_at < now {
            return Err(AppError::InvitationExpired);
        }

        // The user must exist before any role is written.
        self.user_repo.get_by_id(user_id).await?;
        self.user_repo
            .set_role(user_id, Some(UserRole::PollManager))
            .await?;

        self.invitation_repo.mark_accepted(invitation, now).await
    }

    /// Remove the poll-manager role from a user.
    pub async fn revoke(&self, user_id: &str) -> AppResult<()> {
        if self.user_repo.set_role(user_id, None).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User not found: {user_id}")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use versus_db::repositories::{
        ContestWinnerRepository, NotificationQueueRepository, UserRepository,
    };

    use crate::services::{email::EmailService, settings::SettingsService};

    fn mock_user(id: &str, is_admin: bool, role: Option<UserRole>) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            email: Some(format!("{id}@example.com")),
            token: None,
            is_admin,
            role,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: sea_orm::DatabaseConnection) -> RoleService {
        let db = Arc::new(db);
        let notifications = NotificationService::new(
            NotificationQueueRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            ContestWinnerRepository::new(Arc::clone(&db)),
            InvitationRepository::new(Arc::clone(&db)),
            EmailService::disabled(),
            SettingsService::new(Arc::clone(&db)),
        );
        RoleService::new(
            UserRepository::new(Arc::clone(&db)),
            InvitationRepository::new(db),
            notifications,
        )
    }

    #[test]
    fn test_admin_holds_every_capability() {
        let admin = mock_user("a1", true, None);
        for capability in [
            Capability::ReadPolls,
            Capability::ManagePolls,
            Capability::EditPolls,
            Capability::DeletePolls,
            Capability::ViewResults,
            Capability::ManageSettings,
        ] {
            assert!(user_can(&admin, capability));
        }
    }

    #[test]
    fn test_manager_cannot_manage_settings() {
        let manager = mock_user("m1", false, Some(UserRole::PollManager));
        assert!(user_can(&manager, Capability::ManagePolls));
        assert!(user_can(&manager, Capability::ViewResults));
        assert!(!user_can(&manager, Capability::ManageSettings));
    }

    #[test]
    fn test_plain_user_holds_nothing() {
        let user = mock_user("u1", false, None);
        assert!(!user_can(&user, Capability::ManagePolls));
        assert!(!user_can(&user, Capability::ReadPolls));
    }

    #[tokio::test]
    async fn test_invite_rejects_bad_email() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service.invite("not-an-email", "a1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_accept_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<manager_invitation::Model>::new()])
            .into_connection();
        let service = service_with(db);

        let result = service.accept("nope", "u1").await;
        assert!(matches!(result, Err(AppError::InvitationNotFound)));
    }

    #[tokio::test]
    async fn test_accept_expired_invitation() {
        let invitation = manager_invitation::Model {
            id: "i1".to_string(),
            email: "a@example.com".to_string(),
            token: "tok".to_string(),
            invited_by: "a1".to_string(),
            expires_at: (Utc::now() - Duration::days(1)).into(),
            accepted_at: None,
            created_at: (Utc::now() - Duration::days(8)).into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[invitation]])
            .into_connection();
        let service = service_with(db);

        let result = service.accept("tok", "u1").await;
        assert!(matches!(result, Err(AppError::InvitationExpired)));
    }

    #[tokio::test]
    async fn test_accept_already_accepted_invitation() {
        let invitation = manager_invitation::Model {
            id: "i1".to_string(),
            email: "a@example.com".to_string(),
            token: "tok".to_string(),
            invited_by: "a1".to_string(),
            expires_at: (Utc::now() + Duration::days(5)).into(),
            accepted_at: Some(Utc::now().into()),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[invitation]])
            .into_connection();
        let service = service_with(db);

        let result = service.accept("tok", "u1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
