//! REST API endpoint handlers for the dashboard server.
//!
//! All handlers read from the in-memory [`EventLog`] snapshot via the
//! shared [`AppState`]; only `/api/runs` touches the filesystem.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML dashboard |
//! | `GET` | `/api/status` | Status table and run state |
//! | `GET` | `/api/transcript` | Chat entries (`?limit=N` keeps the newest N) |
//! | `GET` | `/api/flowchart` | Flowchart edges |
//! | `GET` | `/api/runs` | Persisted run history |
//!
//! [`EventLog`]: relief_core::EventLog

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use minijinja::{Environment, context};
use relief_core::EventLog;

use crate::error::ObserverError;
use crate::state::AppState;

const DASHBOARD_TEMPLATE: &str = include_str!("../templates/dashboard.html");

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/transcript` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct TranscriptQuery {
    /// Keep only the newest `limit` entries.
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// GET / -- HTML dashboard
// ---------------------------------------------------------------------------

/// Serve the dashboard: agent status table, flowchart, and chat log.
///
/// The page reloads itself every 5 seconds while a run is in progress.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ObserverError> {
    let running = state.run_control.is_running();
    let log = state.snapshot.read().await;
    render_dashboard(&log, running).map(Html)
}

fn render_dashboard(log: &EventLog, running: bool) -> Result<String, ObserverError> {
    let mut env = Environment::new();
    env.add_template("dashboard.html", DASHBOARD_TEMPLATE)?;
    let template = env.get_template("dashboard.html")?;

    let agents: Vec<_> = log.status().values().collect();
    Ok(template.render(context! {
        running,
        disaster => log.disaster_type(),
        tick => log.current_tick(),
        steps => log.steps(),
        summary => log.summary(),
        agents,
        flowchart => log.flowchart(),
        transcript => log.transcript(),
    })?)
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Return the status table keyed by agent name, plus run state.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let log = state.snapshot.read().await;
    Json(serde_json::json!({
        "running": state.run_control.is_running(),
        "runs_started": state.run_control.runs_started(),
        "run_id": log.run_id(),
        "disaster_type": log.disaster_type(),
        "tick": log.current_tick(),
        "steps": log.steps(),
        "agents": log.status(),
        "summary": log.summary(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/transcript
// ---------------------------------------------------------------------------

/// Return chat entries, oldest first.
///
/// # Query Parameters
///
/// - `limit`: keep only the newest `limit` entries (default: all)
pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TranscriptQuery>,
) -> impl IntoResponse {
    let log = state.snapshot.read().await;
    let transcript = log.transcript();
    let skip = params
        .limit
        .map_or(0, |limit| transcript.len().saturating_sub(limit));
    let entries: Vec<_> = transcript.iter().skip(skip).collect();

    Json(serde_json::json!({
        "total": transcript.len(),
        "count": entries.len(),
        "entries": entries,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/flowchart
// ---------------------------------------------------------------------------

/// Return every flowchart edge of the current run.
pub async fn get_flowchart(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let log = state.snapshot.read().await;
    Json(serde_json::json!({
        "count": log.flowchart().len(),
        "edges": log.flowchart(),
    }))
}

// ---------------------------------------------------------------------------
// GET /api/runs
// ---------------------------------------------------------------------------

/// Return the persisted run history, oldest first.
pub async fn list_runs(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let runs = state.history.load().await?;
    Ok(Json(serde_json::json!({
        "count": runs.len(),
        "runs": runs,
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use relief_types::{AgentRole, AgentStatusRow, ChatEntry, Coordinate, DisasterType, RunId, SimEvent};

    use super::*;

    #[test]
    fn dashboard_escapes_agent_text() {
        let mut log = EventLog::default();
        log.apply(&SimEvent::RunStarted {
            run_id: RunId::new(),
            disaster_type: DisasterType::Earthquake,
            affected_areas: 5,
            steps: 3,
        });
        log.apply(&SimEvent::Chat(ChatEntry::new("Controller", "<script>alert(1)</script>")));
        log.apply(&SimEvent::Status(AgentStatusRow {
            name: String::from("Controller"),
            role: AgentRole::Controller,
            active: true,
            message: String::new(),
            battery: 90,
            task: String::from("Coordinate response"),
            completed: true,
            location: Coordinate::ORIGIN,
        }));

        let html = render_dashboard(&log, true).unwrap();
        assert!(html.contains("Disaster: earthquake"));
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(html.contains("Coordinate response"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn idle_dashboard_does_not_refresh() {
        let html = render_dashboard(&EventLog::default(), false).unwrap();
        assert!(html.contains("No run yet"));
        assert!(html.contains("IDLE"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }
}
