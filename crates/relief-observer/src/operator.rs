//! Run control REST handler.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/run/start` | Start a run (`{"steps": N}`, body optional) |
//!
//! Starting is idempotent while a run is in progress: the first request
//! claims the run slot and is answered `202 Accepted`; every request that
//! arrives before that run finishes gets `409 Conflict`.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::ObserverError;
use crate::state::{AppState, StartRequest};

/// Largest accepted `steps` value.
pub const MAX_STEPS: u32 = 1_000;

/// Request body for `POST /api/run/start`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct StartRunRequest {
    /// Ticks to run; the configured default when omitted.
    pub steps: Option<u32>,
}

/// Response body for an accepted start.
#[derive(Debug, serde::Serialize)]
struct StartRunResponse {
    ok: bool,
    message: String,
    steps: u32,
}

/// Start a new run unless one is already in progress.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ObserverError> {
    let request: StartRunRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartRunRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ObserverError::InvalidRequest(format!("invalid start request: {e}")))?
    };

    let steps = request.steps.unwrap_or(state.default_steps);
    if steps == 0 || steps > MAX_STEPS {
        return Err(ObserverError::InvalidRequest(format!(
            "steps must be between 1 and {MAX_STEPS}"
        )));
    }

    let launcher = state
        .launcher
        .as_ref()
        .ok_or_else(|| ObserverError::Internal("run launcher not available".to_owned()))?;

    let guard = state
        .run_control
        .try_begin()
        .ok_or_else(|| ObserverError::Conflict("already running".to_owned()))?;

    launcher
        .send(StartRequest { steps, guard })
        .await
        .map_err(|e| ObserverError::Internal(format!("run launcher stopped: {e}")))?;

    tracing::info!(steps, "Run start accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(StartRunResponse {
            ok: true,
            message: "Run started".to_owned(),
            steps,
        }),
    ))
}
