//! API integration tests.
//!
//! These tests verify routing, auth gating, and error mapping against a
//! mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;
use versus_api::{AppState, middleware::auth_middleware, router as api_router};
use versus_core::{
    ContestService, EmailService, NotificationService, PollService, PopupService, RoleService,
    SettingsService, ShareService, TransferService, VoteService,
};
use versus_db::repositories::{
    ContestWinnerRepository, InvitationRepository, JobLogRepository,
    NotificationQueueRepository, PollRepository, PopupDismissalRepository, ShareRepository,
    UserRepository, VoteRepository,
};

/// Build an app state over the given mock connection.
fn create_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let poll_repo = PollRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let share_repo = ShareRepository::new(Arc::clone(&db));
    let winner_repo = ContestWinnerRepository::new(Arc::clone(&db));
    let queue_repo = NotificationQueueRepository::new(Arc::clone(&db));
    let invitation_repo = InvitationRepository::new(Arc::clone(&db));
    let dismissal_repo = PopupDismissalRepository::new(Arc::clone(&db));
    let user_repo = UserRepository::new(Arc::clone(&db));
    let job_log_repo = JobLogRepository::new(Arc::clone(&db));

    let settings_service = SettingsService::new(Arc::clone(&db));
    let notification_service = NotificationService::new(
        queue_repo,
        user_repo.clone(),
        winner_repo.clone(),
        invitation_repo.clone(),
        EmailService::disabled(),
        settings_service.clone(),
    );

    AppState {
        poll_service: PollService::new(poll_repo.clone(), settings_service.clone()),
        vote_service: VoteService::new(vote_repo.clone(), poll_repo.clone()),
        share_service: ShareService::new(
            share_repo,
            poll_repo.clone(),
            settings_service.clone(),
        ),
        contest_service: ContestService::new(
            poll_repo.clone(),
            vote_repo.clone(),
            winner_repo,
            notification_service.clone(),
        ),
        notification_service: notification_service.clone(),
        popup_service: PopupService::new(dismissal_repo, poll_repo.clone()),
        role_service: RoleService::new(
            user_repo.clone(),
            invitation_repo,
            notification_service,
        ),
        settings_service: settings_service.clone(),
        transfer_service: TransferService::new(poll_repo, vote_repo, settings_service),
        user_repo,
        job_log_repo,
    }
}

fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_meta_endpoint() {
    let state = create_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/meta")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_settings_requires_auth() {
    let state = create_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/settings/show")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_show_missing_poll_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<versus_db::entities::poll::Model>::new()])
        .into_connection();
    let app = create_app(create_state(db));

    let response = app
        .oneshot(post_json("/api/polls/show", r#"{"poll_id":"missing"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cast_vote_on_missing_poll_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<versus_db::entities::poll::Model>::new()])
        .into_connection();
    let app = create_app(create_state(db));

    let response = app
        .oneshot(post_json(
            "/api/votes/cast",
            r#"{"poll_id":"missing","choice":0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_polls_requires_auth() {
    let state = create_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(state);

    let response = app
        .oneshot(post_json(
            "/api/polls/bulk",
            r#"{"action":"archive","poll_ids":["p1"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let state = create_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
