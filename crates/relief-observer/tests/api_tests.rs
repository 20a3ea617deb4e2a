//! Integration tests for the dashboard API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use relief_observer::router::build_router;
use relief_observer::state::{AppState, StartRequest};
use relief_observer::RunHistory;
use relief_types::{
    AgentRole, AgentStatusRow, ChatEntry, Coordinate, DisasterType, FlowEdge, RunId, RunRecord,
    SimEvent,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("relief-api-{}.jsonl", uuid::Uuid::new_v4()))
}

fn row(name: &str, role: AgentRole) -> AgentStatusRow {
    AgentStatusRow {
        name: name.to_owned(),
        role,
        active: true,
        message: String::from("On it."),
        battery: 88,
        task: String::from("Coordinate response"),
        completed: true,
        location: Coordinate::ORIGIN,
    }
}

async fn make_test_state() -> AppState {
    let state = AppState::new(RunHistory::new(temp_path()));

    let events = [
        SimEvent::RunStarted {
            run_id: RunId::new(),
            disaster_type: DisasterType::Flood,
            affected_areas: 6,
            steps: 3,
        },
        SimEvent::Chat(ChatEntry::system("Disaster Type: flood | Affected Areas: 6")),
        SimEvent::TickStarted { tick: 1 },
        SimEvent::Chat(ChatEntry::system("Step 1 starting...")),
        SimEvent::Chat(ChatEntry::new("Controller", "All units, converge on the river.")),
        SimEvent::Flow(FlowEdge {
            tick: 1,
            from: String::from("Controller"),
            to: String::from("All"),
            summary: String::from("Coordinate response"),
            completed: true,
        }),
        SimEvent::Status(row("Controller", AgentRole::Controller)),
        SimEvent::Status(row("Routes-1", AgentRole::Routes)),
    ];

    {
        let mut snap = state.snapshot.write().await;
        for event in &events {
            snap.apply(event);
        }
    }

    state
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_start(body: &'static str) -> Request<Body> {
    Request::post("/api/run/start")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

// =========================================================================
// Read endpoints
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let router = build_router(Arc::new(make_test_state().await));

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Relief Mission Control"));
    assert!(html.contains("All units, converge on the river."));
}

#[tokio::test]
async fn test_status_lists_agents_by_name() {
    let router = build_router(Arc::new(make_test_state().await));

    let response = router
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["running"], false);
    assert_eq!(json["disaster_type"], "flood");
    assert_eq!(json["tick"], 1);
    assert_eq!(json["agents"]["Controller"]["battery"], 88);
    assert_eq!(json["agents"]["Routes-1"]["role"], "routes");
}

#[tokio::test]
async fn test_transcript_limit_keeps_newest() {
    let router = build_router(Arc::new(make_test_state().await));

    let response = router
        .clone()
        .oneshot(Request::get("/api/transcript").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 3);
    assert_eq!(json["entries"][0]["sender"], "System");

    let response = router
        .oneshot(
            Request::get("/api/transcript?limit=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["count"], 1);
    assert_eq!(json["entries"][0]["sender"], "Controller");
}

#[tokio::test]
async fn test_transcript_rejects_bad_limit() {
    let router = build_router(Arc::new(make_test_state().await));

    let response = router
        .oneshot(
            Request::get("/api/transcript?limit=lots")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flowchart() {
    let router = build_router(Arc::new(make_test_state().await));

    let response = router
        .oneshot(Request::get("/api/flowchart").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["edges"][0]["from"], "Controller");
    assert_eq!(json["edges"][0]["to"], "All");
    assert_eq!(json["edges"][0]["completed"], true);
}

#[tokio::test]
async fn test_runs_reads_history_file() {
    let state = make_test_state().await;
    state
        .history
        .append(&RunRecord {
            timestamp: Utc::now(),
            run_id: RunId::new(),
            disaster_type: DisasterType::Wildfire,
            affected_areas: 11,
            ticks: 3,
        })
        .await
        .unwrap();
    let path = state.history.path().to_path_buf();
    let router = build_router(Arc::new(state));

    let response = router
        .oneshot(Request::get("/api/runs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["runs"][0]["disaster_type"], "wildfire");
    assert_eq!(json["runs"][0]["ticks"], 3);

    tokio::fs::remove_file(path).await.unwrap();
}

#[tokio::test]
async fn test_runs_empty_without_history() {
    let router = build_router(Arc::new(make_test_state().await));

    let response = router
        .oneshot(Request::get("/api/runs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0);
}

// =========================================================================
// Run control
// =========================================================================

#[tokio::test]
async fn test_start_without_launcher_is_internal_error() {
    let router = build_router(Arc::new(make_test_state().await));

    let response = router.oneshot(post_start("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_start_is_idempotent_while_running() {
    let (tx, mut rx) = mpsc::channel::<StartRequest>(4);
    let state = Arc::new(make_test_state().await.with_launcher(tx, 3));
    let router = build_router(Arc::clone(&state));

    let response = router.clone().oneshot(post_start(r#"{"steps": 2}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["steps"], 2);
    assert!(state.run_control.is_running());

    let response = router.clone().oneshot(post_start("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "already running");

    // Finishing the queued run frees the slot.
    let request = rx.recv().await.unwrap();
    assert_eq!(request.steps, 2);
    drop(request);
    assert!(!state.run_control.is_running());

    let response = router.oneshot(post_start("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(rx.recv().await.unwrap().steps, 3);
}

#[tokio::test]
async fn test_start_rejects_bad_requests() {
    let (tx, _rx) = mpsc::channel::<StartRequest>(4);
    let state = Arc::new(make_test_state().await.with_launcher(tx, 3));
    let router = build_router(Arc::clone(&state));

    let response = router.clone().oneshot(post_start(r#"{"steps": 0}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router.oneshot(post_start("{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(!state.run_control.is_running());
}

// =========================================================================
// Broadcast
// =========================================================================

#[tokio::test]
async fn test_broadcast_reaches_subscribers() {
    let state = make_test_state().await;
    let event = SimEvent::TickStarted { tick: 2 };
    assert_eq!(state.broadcast(&event), 0);

    let mut rx = state.subscribe();
    assert_eq!(state.broadcast(&event), 1);
    assert_eq!(rx.recv().await.unwrap(), event);
}
