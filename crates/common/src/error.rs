//! Error types for versus.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Poll not found: {0}")]
    PollNotFound(String),

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Invitation expired")]
    InvitationExpired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid option index: {0}")]
    InvalidOption(i32),

    #[error("Unknown share platform: {0}")]
    InvalidPlatform(String),

    #[error("Already voted on this poll")]
    AlreadyVoted,

    #[error("Winner already announced for this contest")]
    WinnerAlreadyAnnounced,

    #[error("Poll is not a contest: {0}")]
    NotAContest(String),

    #[error("Contest has no votes")]
    NoVotes,

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::PollNotFound(_) | Self::InvitationNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::InvitationExpired => StatusCode::GONE,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_)
            | Self::Validation(_)
            | Self::InvalidOption(_)
            | Self::InvalidPlatform(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyVoted | Self::WinnerAlreadyAnnounced | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::NotAContest(_) | Self::NoVotes => StatusCode::UNPROCESSABLE_ENTITY,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Email(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::PollNotFound(_) => "POLL_NOT_FOUND",
            Self::InvitationNotFound => "INVITATION_NOT_FOUND",
            Self::InvitationExpired => "INVITATION_EXPIRED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidOption(_) => "INVALID_OPTION",
            Self::InvalidPlatform(_) => "INVALID_PLATFORM",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::WinnerAlreadyAnnounced => "WINNER_ALREADY_ANNOUNCED",
            Self::NotAContest(_) => "NOT_A_CONTEST",
            Self::NoVotes => "NO_VOTES",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Email(_) => "EMAIL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_errors_map_to_409() {
        assert_eq!(AppError::AlreadyVoted.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::WinnerAlreadyAnnounced.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_contest_outcomes_map_to_422() {
        assert_eq!(
            AppError::NotAContest("p1".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::NoVotes.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(AppError::AlreadyVoted.error_code(), "ALREADY_VOTED");
        assert_eq!(
            AppError::PollNotFound("p1".to_string()).error_code(),
            "POLL_NOT_FOUND"
        );
        assert_eq!(AppError::InvitationExpired.error_code(), "INVITATION_EXPIRED");
    }

    #[test]
    fn test_server_errors_flagged() {
        assert!(AppError::Database("boom".to_string()).is_server_error());
        assert!(!AppError::AlreadyVoted.is_server_error());
    }
}
