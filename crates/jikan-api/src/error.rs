use reqwest::StatusCode;
use thiserror::Error;

use crate::types::JikanErrorBody;

/// Errors from the Jikan API client.
///
/// Every variant displays as the plain, human-readable message the
/// catalogue stores in its state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network unreachable, connection reset, TLS failure...
    #[error("{0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    /// The API answered 404 for the requested resource.
    #[error("{message}")]
    NotFound { message: String },

    /// Any other non-2xx answer.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Build the error for a non-2xx response from its status and raw body.
    ///
    /// The body's `message` field wins; otherwise the status line is used,
    /// e.g. `404 Not Found`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<JikanErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status_line(status));

        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound { message }
        } else {
            ApiError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Message suitable for display
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status when the failure came from the API itself
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
