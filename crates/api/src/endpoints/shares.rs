//! Share endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use versus_common::AppResult;

use crate::{
    extractors::{ClientInfo, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Record share request.
#[derive(Debug, Deserialize)]
pub struct RecordShareRequest {
    pub poll_id: String,
    pub platform: String,
}

/// Share receipt.
#[derive(Serialize)]
pub struct RecordShareResponse {
    pub share_id: String,
}

/// Record a social-share event.
async fn record_share(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    client: ClientInfo,
    State(state): State<AppState>,
    Json(req): Json<RecordShareRequest>,
) -> AppResult<ApiResponse<RecordShareResponse>> {
    let share = state
        .share_service
        .record(
            &req.poll_id,
            maybe_user.as_ref().map(|u| u.id.as_str()),
            &req.platform,
            &client.ip,
        )
        .await?;

    Ok(ApiResponse::ok(RecordShareResponse { share_id: share.id }))
}

/// Share counts request.
#[derive(Debug, Deserialize)]
pub struct ShareCountsRequest {
    pub poll_id: String,
}

/// Per-platform share counts.
#[derive(Serialize)]
pub struct ShareCountsResponse {
    pub counts: Vec<(String, i64)>,
}

/// Per-platform share counts for a poll.
async fn share_counts(
    State(state): State<AppState>,
    Json(req): Json<ShareCountsRequest>,
) -> AppResult<ApiResponse<ShareCountsResponse>> {
    let counts = state.share_service.counts(&req.poll_id).await?;
    Ok(ApiResponse::ok(ShareCountsResponse { counts }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/record", post(record_share))
        .route("/counts", post(share_counts))
}
