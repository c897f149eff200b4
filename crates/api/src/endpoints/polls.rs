//! Poll endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use versus_common::{AppError, AppResult};
use versus_core::{
    BulkPollAction, Capability, CreatePollInput, UpdatePollInput, role::user_can,
};
use versus_db::{
    entities::poll,
    repositories::{PollKind, PollListFilter},
};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Poll response.
#[derive(Serialize)]
pub struct PollResponse {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_weekly: bool,
    pub is_contest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contest_prize: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contest_ends_at: Option<String>,
    pub status: poll::PollStatus,
    pub created_at: String,
}

impl PollResponse {
    pub(crate) fn from_model(poll: poll::Model) -> AppResult<Self> {
        let options = poll
            .option_labels()
            .map_err(|e| AppError::Internal(format!("Invalid poll options: {e}")))?;
        Ok(Self {
            id: poll.id,
            question: poll.question,
            options,
            image_url: poll.image_url,
            is_weekly: poll.is_weekly,
            is_contest: poll.is_contest,
            contest_prize: poll.contest_prize,
            contest_ends_at: poll.contest_ends_at.map(|t| t.to_rfc3339()),
            status: poll.status,
            created_at: poll.created_at.to_rfc3339(),
        })
    }
}

pub(crate) fn parse_kind(tag: &str) -> AppResult<PollKind> {
    match tag {
        "weekly" => Ok(PollKind::Weekly),
        "contest" => Ok(PollKind::Contest),
        "regular" => Ok(PollKind::Regular),
        _ => Err(AppError::BadRequest(format!("Unknown poll kind: {tag}"))),
    }
}

/// Create a poll.
///
/// Users without the manage capability may still submit polls; those start
/// out parked until an admin approves them, and the admin recipient is
/// notified.
async fn create_poll(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePollInput>,
) -> AppResult<ApiResponse<PollResponse>> {
    let needs_approval = !user_can(&user, Capability::ManagePolls);

    let poll = state
        .poll_service
        .create(&user.id, req, needs_approval)
        .await?;

    if needs_approval {
        state
            .notification_service
            .enqueue_poll_submitted(&poll.id)
            .await?;
    }

    Ok(ApiResponse::ok(PollResponse::from_model(poll)?))
}

/// Show poll request.
#[derive(Debug, Deserialize)]
pub struct ShowPollRequest {
    pub poll_id: String,
}

/// Get a poll. Managers see every status; the public only active polls.
async fn show_poll(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPollRequest>,
) -> AppResult<ApiResponse<PollResponse>> {
    let is_manager = maybe_user
        .as_ref()
        .is_some_and(|u| user_can(u, Capability::ReadPolls));

    let poll = if is_manager {
        state.poll_service.get_any(&req.poll_id).await?
    } else {
        state.poll_service.get(&req.poll_id).await?
    };

    Ok(ApiResponse::ok(PollResponse::from_model(poll)?))
}

/// Latest poll request.
#[derive(Debug, Deserialize)]
pub struct LatestPollRequest {
    #[serde(default)]
    pub kind: Option<String>,
}

/// Get the latest poll (the weekly poll takes priority).
async fn latest_poll(
    State(state): State<AppState>,
    Json(req): Json<LatestPollRequest>,
) -> AppResult<ApiResponse<PollResponse>> {
    let kind = req.kind.as_deref().map(parse_kind).transpose()?;
    let poll = state.poll_service.get_latest(kind).await?;
    Ok(ApiResponse::ok(PollResponse::from_model(poll)?))
}

/// List polls request.
#[derive(Debug, Deserialize)]
pub struct ListPollsRequest {
    #[serde(default)]
    pub status: Option<poll::PollStatus>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_per_page() -> u64 {
    20
}

/// Paged poll list response.
#[derive(Serialize)]
pub struct PollListResponse {
    pub polls: Vec<PollResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// List polls (manager view: all statuses).
async fn list_polls(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListPollsRequest>,
) -> AppResult<ApiResponse<PollListResponse>> {
    state.role_service.require(&user, Capability::ReadPolls)?;

    let filter = PollListFilter {
        status: req.status,
        user_id: req.owner_id,
        kind: req.kind.as_deref().map(parse_kind).transpose()?,
        created_after: req.created_after,
        created_before: req.created_before,
        search: req.search,
    };

    let (polls, total) = state
        .poll_service
        .list(filter, req.page, req.per_page)
        .await?;

    let polls = polls
        .into_iter()
        .map(PollResponse::from_model)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::ok(PollListResponse {
        polls,
        total,
        page: req.page,
        per_page: req.per_page,
    }))
}

/// Update poll request.
#[derive(Debug, Deserialize)]
pub struct UpdatePollRequest {
    pub poll_id: String,
    #[serde(flatten)]
    pub fields: UpdatePollInput,
}

/// Update a poll (owner or edit capability).
async fn update_poll(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePollRequest>,
) -> AppResult<ApiResponse<PollResponse>> {
    let poll = state.poll_service.get_any(&req.poll_id).await?;
    if poll.user_id != user.id {
        state.role_service.require(&user, Capability::EditPolls)?;
    }

    let poll = state.poll_service.update(&req.poll_id, req.fields).await?;
    Ok(ApiResponse::ok(PollResponse::from_model(poll)?))
}

/// Delete poll request.
#[derive(Debug, Deserialize)]
pub struct DeletePollRequest {
    pub poll_id: String,
}

/// Soft-delete a poll (owner or delete capability).
async fn delete_poll(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeletePollRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let poll = state.poll_service.get_any(&req.poll_id).await?;
    if poll.user_id != user.id {
        state.role_service.require(&user, Capability::DeletePolls)?;
    }

    state.poll_service.delete(&req.poll_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

/// Bulk poll operation request.
#[derive(Debug, Deserialize)]
pub struct BulkPollRequest {
    pub action: BulkPollAction,
    pub poll_ids: Vec<String>,
}

/// Bulk operations: delete / archive / activate / make-weekly.
async fn bulk_polls(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BulkPollRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.role_service.require(&user, Capability::ManagePolls)?;

    let affected = state.poll_service.bulk(req.action, &req.poll_ids).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "affected": affected })))
}

/// Dismiss popup request.
#[derive(Debug, Deserialize)]
pub struct DismissPopupRequest {
    pub poll_id: String,
}

/// Record a popup dismissal for the signed-in user.
async fn dismiss_popup(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DismissPopupRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.popup_service.dismiss(&user.id, &req.poll_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "dismissed": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_poll))
        .route("/show", post(show_poll))
        .route("/latest", post(latest_poll))
        .route("/list", post(list_polls))
        .route("/update", post(update_poll))
        .route("/delete", post(delete_poll))
        .route("/bulk", post(bulk_polls))
        .route("/dismiss-popup", post(dismiss_popup))
}
