use axum::{http::StatusCode, Json};
use serde_json::json;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Server faults carry the `success` flag the tracking client checks.
        let body = if self.status.is_server_error() {
            json!({ "success": false, "error": self.message })
        } else {
            json!({ "error": self.message })
        };
        (self.status, Json(body)).into_response()
    }
}

/// Failures talking to the Telegram Bot API.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram api error {code}: {description}")]
    Api { code: i64, description: String },
    /// The reply carried no Bot API error code, e.g. a proxy error page.
    #[error("telegram http {status}: {detail}")]
    Unreadable { status: u16, detail: String },
    #[error("telegram request timed out")]
    Timeout,
    #[error("telegram transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("bot token is not configured")]
    Disabled,
}

impl TelegramError {
    /// The Bot API itself reported 403: the chat blocked the bot or otherwise
    /// refuses delivery for good.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Api { code: 403, .. })
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err)
        }
    }
}
