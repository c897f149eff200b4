//! HTTP API layer for versus.
//!
//! This crate provides the JSON API:
//!
//! - **Endpoints**: polls, votes, shares, contests, admin
//! - **Extractors**: authentication, client info
//! - **Middleware**: token auth, application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
