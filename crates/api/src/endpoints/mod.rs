//! API endpoints.

#![allow(missing_docs)]

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::middleware::AppState;

pub mod admin;
pub mod contests;
pub mod polls;
pub mod shares;
pub mod votes;

/// Health/info endpoint.
async fn meta() -> Json<Value> {
    Json(json!({
        "name": "versus",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the API router.
#[must_use]
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meta", get(meta))
        .nest("/polls", polls::router())
        .nest("/votes", votes::router())
        .nest("/shares", shares::router())
        .nest("/contests", contests::router())
        .nest("/admin", admin::router())
}
