//! Error types for the dashboard API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the dashboard API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The request body or query was invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request conflicts with current state (e.g. a run is in progress).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The dashboard template failed to render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The run history could not be read.
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Template(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("template error: {e}")),
            Self::History(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Errors reading or appending the run history file.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Filesystem failure.
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("history encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
