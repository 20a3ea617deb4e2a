//! Axum router construction for the dashboard API.
//!
//! Assembles all routes (HTML + REST + `WebSocket`) into a single
//! [`Router`] with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the dashboard server.
///
/// The router includes:
/// - `GET /` -- HTML dashboard
/// - `GET /ws/events` -- `WebSocket` event stream
/// - `GET /api/status` -- status table and run state
/// - `GET /api/transcript` -- chat entries
/// - `GET /api/flowchart` -- flowchart edges
/// - `GET /api/runs` -- run history
/// - `POST /api/run/start` -- start a run
///
/// CORS allows any origin so a separately served frontend can consume
/// the API during development.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/ws/events", get(ws::ws_events))
        .route("/api/status", get(handlers::get_status))
        .route("/api/transcript", get(handlers::get_transcript))
        .route("/api/flowchart", get(handlers::get_flowchart))
        .route("/api/runs", get(handlers::list_runs))
        .route("/api/run/start", post(operator::start_run))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
