//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use versus_core::{
    ContestService, NotificationService, PollService, PopupService, RoleService, SettingsService,
    ShareService, TransferService, VoteService,
};
use versus_db::repositories::{JobLogRepository, UserRepository};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub poll_service: PollService,
    pub vote_service: VoteService,
    pub share_service: ShareService,
    pub contest_service: ContestService,
    pub notification_service: NotificationService,
    pub popup_service: PopupService,
    pub role_service: RoleService,
    pub settings_service: SettingsService,
    pub transfer_service: TransferService,
    pub user_repo: UserRepository,
    pub job_log_repo: JobLogRepository,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stores the model in request
/// extensions for the extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToString::to_string);

    if let Some(token) = token
        && let Ok(Some(user)) = state.user_repo.find_by_token(&token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
