//! Versus server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use chrono::Utc;
use sea_orm::Set;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use versus_api::{AppState, middleware::auth_middleware, router as api_router};
use versus_common::{Config, IdGenerator};
use versus_core::{
    ContestService, EmailService, NotificationService, PollService, PopupService, RoleService,
    SettingsService, ShareService, TransferService, VoteService,
};
use versus_db::{
    entities::user::{self, SYSTEM_USER_ID},
    repositories::{
        ContestWinnerRepository, InvitationRepository, JobLogRepository,
        NotificationQueueRepository, PollRepository, PopupDismissalRepository, ShareRepository,
        UserRepository, VoteRepository,
    },
};
use versus_queue::{SchedulerConfig, ServiceExecutor, run_scheduler};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Ensure the system user exists; it owns auto-created weekly polls and
/// imported rows.
async fn ensure_system_user(user_repo: &UserRepository) -> Result<(), versus_common::AppError> {
    if user_repo.find_by_id(SYSTEM_USER_ID).await?.is_none() {
        user_repo
            .create(user::ActiveModel {
                id: Set(SYSTEM_USER_ID.to_string()),
                username: Set(SYSTEM_USER_ID.to_string()),
                email: Set(None),
                token: Set(None),
                is_admin: Set(false),
                role: Set(None),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        info!("Created system user");
    }
    Ok(())
}

/// Bootstrap an admin account from `VERSUS_ADMIN_TOKEN` when no user holds
/// that token yet. There is no registration surface; this is how the first
/// admin gets in.
async fn ensure_admin_user(user_repo: &UserRepository) -> Result<(), versus_common::AppError> {
    let Ok(token) = std::env::var("VERSUS_ADMIN_TOKEN") else {
        return Ok(());
    };
    if token.is_empty() || user_repo.find_by_token(&token).await?.is_some() {
        return Ok(());
    }

    let id_gen = IdGenerator::new();
    user_repo
        .create(user::ActiveModel {
            id: Set(id_gen.generate()),
            username: Set("admin".to_string()),
            email: Set(None),
            token: Set(Some(token)),
            is_admin: Set(true),
            role: Set(None),
            created_at: Set(Utc::now().into()),
        })
        .await?;
    info!("Created bootstrap admin user");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "versus=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting versus server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = versus_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    versus_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
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

    ensure_system_user(&user_repo).await?;
    ensure_admin_user(&user_repo).await?;

    // Initialize services
    let settings_service = SettingsService::new(Arc::clone(&db));
    let email_service = EmailService::from_config(&config.email)?;
    let notification_service = NotificationService::new(
        queue_repo,
        user_repo.clone(),
        winner_repo.clone(),
        invitation_repo.clone(),
        email_service,
        settings_service.clone(),
    );
    let poll_service = PollService::new(poll_repo.clone(), settings_service.clone());
    let vote_service = VoteService::new(vote_repo.clone(), poll_repo.clone());
    let share_service = ShareService::new(share_repo, poll_repo.clone(), settings_service.clone());
    let contest_service = ContestService::new(
        poll_repo.clone(),
        vote_repo.clone(),
        winner_repo.clone(),
        notification_service.clone(),
    );
    let popup_service = PopupService::new(dismissal_repo.clone(), poll_repo.clone());
    let role_service = RoleService::new(
        user_repo.clone(),
        invitation_repo.clone(),
        notification_service.clone(),
    );
    let transfer_service = TransferService::new(
        poll_repo.clone(),
        vote_repo,
        settings_service.clone(),
    );

    // Create app state
    let state = AppState {
        poll_service: poll_service.clone(),
        vote_service,
        share_service,
        contest_service: contest_service.clone(),
        notification_service: notification_service.clone(),
        popup_service,
        role_service,
        settings_service: settings_service.clone(),
        transfer_service,
        user_repo,
        job_log_repo: job_log_repo.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the scheduler
    if config.scheduler.enabled {
        info!("Starting background scheduler...");
        let executor = Arc::new(ServiceExecutor::new(
            poll_service,
            contest_service,
            notification_service,
            settings_service,
            poll_repo,
            winner_repo,
            invitation_repo,
            dismissal_repo,
            job_log_repo,
        ));
        run_scheduler(SchedulerConfig::from(&config.scheduler), executor).await;
        info!("Background scheduler started");
    }

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
