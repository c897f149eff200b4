//! Admin endpoints: settings, transfer, roles, job log.

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use versus_common::{AppError, AppResult};
use versus_core::{Capability, ExportFormat, ImportMode, ImportOutcome, UpdateSettingsInput};
use versus_db::entities::{app_settings, job_log};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Show the settings row.
async fn show_settings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<app_settings::Model>> {
    state
        .role_service
        .require(&user, Capability::ManageSettings)?;
    let settings = state.settings_service.get().await?;
    Ok(ApiResponse::ok(settings))
}

/// Update settings.
async fn update_settings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsInput>,
) -> AppResult<ApiResponse<app_settings::Model>> {
    state
        .role_service
        .require(&user, Capability::ManageSettings)?;
    let settings = state.settings_service.update(req).await?;
    Ok(ApiResponse::ok(settings))
}

/// Export request.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub format: String,
}

/// Export polls, votes, and settings as a raw payload.
async fn export(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> AppResult<Response> {
    state
        .role_service
        .require(&user, Capability::ManageSettings)?;

    let format = ExportFormat::from_tag(&req.format)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown export format: {}", req.format)))?;

    let (payload, content_type) = state.transfer_service.export(format).await?;

    Ok(([(header::CONTENT_TYPE, content_type)], payload).into_response())
}

/// Import request.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub format: String,
    pub mode: ImportMode,
    #[serde(default)]
    pub backup: bool,
    pub payload: String,
}

/// Import a previously exported payload.
async fn import(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> AppResult<ApiResponse<ImportOutcome>> {
    state
        .role_service
        .require(&user, Capability::ManageSettings)?;

    let format = ExportFormat::from_tag(&req.format)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown import format: {}", req.format)))?;

    let outcome = state
        .transfer_service
        .import(&req.payload, format, req.mode, req.backup)
        .await?;

    Ok(ApiResponse::ok(outcome))
}

/// Invitation request.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

/// Invitation response.
#[derive(Serialize)]
pub struct InviteResponse {
    pub invitation_id: String,
    pub expires_at: String,
}

/// Invite an address to become a poll manager.
async fn invite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<InviteRequest>,
) -> AppResult<ApiResponse<InviteResponse>> {
    state
        .role_service
        .require(&user, Capability::ManageSettings)?;

    let invitation = state.role_service.invite(&req.email, &user.id).await?;

    Ok(ApiResponse::ok(InviteResponse {
        invitation_id: invitation.id,
        expires_at: invitation.expires_at.to_rfc3339(),
    }))
}

/// Invitation acceptance request.
#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: String,
}

/// Accept a manager invitation for the signed-in user.
async fn accept_invite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AcceptInviteRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.role_service.accept(&req.token, &user.id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "accepted": true })))
}

/// Role revocation request.
#[derive(Debug, Deserialize)]
pub struct RevokeRoleRequest {
    pub user_id: String,
}

/// Remove the poll-manager role from a user.
async fn revoke_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RevokeRoleRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .role_service
        .require(&user, Capability::ManageSettings)?;

    state.role_service.revoke(&req.user_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "revoked": true })))
}

/// Job log request.
#[derive(Debug, Deserialize)]
pub struct JobLogRequest {
    #[serde(default = "default_log_limit")]
    pub limit: u64,
}

const fn default_log_limit() -> u64 {
    50
}

/// Recent scheduled-job runs.
async fn job_log(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<JobLogRequest>,
) -> AppResult<ApiResponse<Vec<job_log::Model>>> {
    state
        .role_service
        .require(&user, Capability::ManageSettings)?;

    let entries = state.job_log_repo.recent(req.limit.min(100)).await?;
    Ok(ApiResponse::ok(entries))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings/show", post(show_settings))
        .route("/settings/update", post(update_settings))
        .route("/export", post(export))
        .route("/import", post(import))
        .route("/invitations/create", post(invite))
        .route("/invitations/accept", post(accept_invite))
        .route("/roles/revoke", post(revoke_role))
        .route("/job-log", post(job_log))
}
