//! Vote endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use versus_common::AppResult;
use versus_core::{PollResults, Voter};

use crate::{
    extractors::{ClientInfo, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

fn voter_from(maybe_user: Option<&versus_db::entities::user::Model>, client: &ClientInfo) -> Voter {
    Voter {
        user_id: maybe_user.map(|u| u.id.clone()),
        ip: client.ip.clone(),
        user_agent: client.user_agent.clone(),
    }
}

/// Cast vote request.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub poll_id: String,
    pub choice: i32,
}

/// Vote receipt with fresh results.
#[derive(Serialize)]
pub struct CastVoteResponse {
    pub vote_id: String,
    pub results: PollResults,
}

/// Cast a vote.
async fn cast_vote(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    client: ClientInfo,
    State(state): State<AppState>,
    Json(req): Json<CastVoteRequest>,
) -> AppResult<ApiResponse<CastVoteResponse>> {
    let voter = voter_from(maybe_user.as_ref(), &client);

    let vote = state.vote_service.cast(&req.poll_id, &voter, req.choice).await?;
    let results = state.vote_service.results(&req.poll_id).await?;

    Ok(ApiResponse::ok(CastVoteResponse {
        vote_id: vote.id,
        results,
    }))
}

/// Check vote request.
#[derive(Debug, Deserialize)]
pub struct CheckVoteRequest {
    pub poll_id: String,
}

/// Check-vote response.
#[derive(Serialize)]
pub struct CheckVoteResponse {
    pub has_voted: bool,
}

/// Whether the caller has already voted on a poll.
async fn check_vote(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    client: ClientInfo,
    State(state): State<AppState>,
    Json(req): Json<CheckVoteRequest>,
) -> AppResult<ApiResponse<CheckVoteResponse>> {
    let voter = voter_from(maybe_user.as_ref(), &client);
    let has_voted = state.vote_service.has_voted(&req.poll_id, &voter).await?;
    Ok(ApiResponse::ok(CheckVoteResponse { has_voted }))
}

/// Results request.
#[derive(Debug, Deserialize)]
pub struct ResultsRequest {
    pub poll_id: String,
}

/// Aggregated results for a poll.
async fn results(
    State(state): State<AppState>,
    Json(req): Json<ResultsRequest>,
) -> AppResult<ApiResponse<PollResults>> {
    let results = state.vote_service.results(&req.poll_id).await?;
    Ok(ApiResponse::ok(results))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cast", post(cast_vote))
        .route("/check", post(check_vote))
        .route("/results", post(results))
}
