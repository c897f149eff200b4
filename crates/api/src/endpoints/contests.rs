//! Contest endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use versus_common::AppResult;
use versus_core::Capability;
use versus_db::entities::contest_winner;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Winner response.
#[derive(Serialize)]
pub struct WinnerResponse {
    pub poll_id: String,
    pub user_id: String,
    pub prize: String,
    pub winning_choice: i32,
    pub winning_votes: i32,
    pub status: contest_winner::WinnerStatus,
    pub announced_at: String,
}

impl From<contest_winner::Model> for WinnerResponse {
    fn from(winner: contest_winner::Model) -> Self {
        Self {
            poll_id: winner.poll_id,
            user_id: winner.user_id,
            prize: winner.prize,
            winning_choice: winner.winning_choice,
            winning_votes: winner.winning_votes,
            status: winner.status,
            announced_at: winner.announced_at.to_rfc3339(),
        }
    }
}

/// Announce winner request.
#[derive(Debug, Deserialize)]
pub struct AnnounceRequest {
    pub poll_id: String,
    #[serde(default)]
    pub prize: Option<String>,
}

/// Announce the winner of a contest poll (manager action).
async fn announce(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AnnounceRequest>,
) -> AppResult<ApiResponse<WinnerResponse>> {
    state.role_service.require(&user, Capability::ManagePolls)?;

    let winner = state
        .contest_service
        .announce(&req.poll_id, req.prize)
        .await?;

    Ok(ApiResponse::ok(winner.into()))
}

/// Winner lookup request.
#[derive(Debug, Deserialize)]
pub struct WinnerRequest {
    pub poll_id: String,
}

/// Get the announced winner of a contest poll.
async fn winner(
    State(state): State<AppState>,
    Json(req): Json<WinnerRequest>,
) -> AppResult<ApiResponse<WinnerResponse>> {
    let winner = state.contest_service.get(&req.poll_id).await?;
    Ok(ApiResponse::ok(winner.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/announce", post(announce))
        .route("/winner", post(winner))
}
