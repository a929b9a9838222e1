use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

const NOT_FOUND_MESSAGE: &str = "The requested GitHub resource could not be found";
const INVALID_CREDENTIALS_MESSAGE: &str = "Unauthorized: the supplied credentials are invalid";
const FORBIDDEN_MESSAGE: &str = "Forbidden: insufficient permissions or a temporary restriction";
const REJECTED_DEFAULT_MESSAGE: &str = "Request processing failed";
const INTERNAL_MESSAGE: &str = "An internal server error occurred";

/// Failure of a summary request, classified from whatever went wrong upstream
/// or locally.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GitHub rejected the credentials (401)")]
    InvalidCredentials,

    #[error("GitHub resource not found (404)")]
    NotFound,

    // Covers rate limiting as well; GitHub answers both with 403.
    #[error("GitHub denied access (403)")]
    ForbiddenOrRateLimited,

    #[error("GitHub API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request rejected: {}", .0.as_deref().unwrap_or(REJECTED_DEFAULT_MESSAGE))]
    Rejected(Option<String>),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The uniform body every failure is rendered as.
#[derive(Debug, Serialize)]
pub struct ErrorOutcome {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    /// Classifies a non-success upstream response by its status code.
    pub fn from_upstream(status: u16, body: String) -> Self {
        match status {
            401 => Self::InvalidCredentials,
            404 => Self::NotFound,
            403 => Self::ForbiddenOrRateLimited,
            _ => Self::Upstream { status, body },
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(Some(reason.into()))
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::NotFound => NOT_FOUND_MESSAGE.to_string(),
            Self::ForbiddenOrRateLimited => FORBIDDEN_MESSAGE.to_string(),
            Self::Upstream { body, .. } => format!("GitHub API error: {}", body),
            Self::Rejected(reason) => reason
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| REJECTED_DEFAULT_MESSAGE.to_string()),
            Self::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }

    pub fn outcome(&self) -> ErrorOutcome {
        let status = self.status_code();
        ErrorOutcome {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: self.message(),
            timestamp: Utc::now(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Internal(detail) => log::error!("Internal failure: {}", detail),
            other => log::warn!("Request failed: {}", other),
        }
        HttpResponse::build(self.status_code()).json(self.outcome())
    }
}

// Non-success statuses are classified in `GitHubClient::get_json`, so a
// reqwest error here is always a transport or decoding failure.
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("Failed to parse GitHub response: {}", err))
    }
}
