//! `WebSocket` stream of simulation events.
//!
//! A client connecting to `GET /ws/events` first receives a `snapshot`
//! frame carrying the current [`EventLog`], then every [`SimEvent`] as its
//! own JSON text frame, in emission order. Both frame kinds share the
//! `{"type": ..., "data": ...}` shape.
//!
//! The subscription is taken before the snapshot is read, so an event may
//! show up both in the snapshot and as the first frames after it; never
//! neither. A client that falls behind the broadcast buffer is sent a
//! fresh snapshot instead of the events it missed.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use relief_core::EventLog;
use relief_types::SimEvent;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Frames sent by the server that are not simulation events.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum SyncFrame<'a> {
    /// The whole folded log.
    Snapshot(&'a EventLog),
}

/// Whether the session should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Open,
    Closed,
}

/// Upgrade to a `WebSocket` and stream events.
///
/// # Route
///
/// `GET /ws/events`
pub async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut rx = state.subscribe();
    debug!("WebSocket client connected");

    let mut session = send_snapshot(&mut socket, &state).await;
    while session == Session::Open {
        session = tokio::select! {
            received = rx.recv() => forward(&mut socket, &state, received).await,
            incoming = socket.recv() => answer(&mut socket, incoming).await,
        };
    }

    debug!("WebSocket session ended");
}

/// Relay one broadcast result to the client.
async fn forward(
    socket: &mut WebSocket,
    state: &AppState,
    received: Result<SimEvent, RecvError>,
) -> Session {
    match received {
        Ok(event) => {
            if let SimEvent::RunCompleted(summary) = &event {
                debug!(run_id = %summary.run_id, "Relaying run completion");
            }
            match serde_json::to_string(&event) {
                Ok(json) => send_text(socket, json).await,
                Err(e) => {
                    warn!(kind = event.kind(), error = %e, "Failed to serialize event");
                    Session::Open
                }
            }
        }
        Err(RecvError::Lagged(skipped)) => {
            debug!(skipped, "WebSocket client lagged, resending snapshot");
            send_snapshot(socket, state).await
        }
        Err(RecvError::Closed) => Session::Closed,
    }
}

/// Handle a frame from the client.
async fn answer(socket: &mut WebSocket, incoming: Option<Result<Message, axum::Error>>) -> Session {
    match incoming {
        Some(Ok(Message::Ping(data))) => {
            if socket.send(Message::Pong(data)).await.is_err() {
                return Session::Closed;
            }
            Session::Open
        }
        Some(Ok(Message::Close(_))) | None => Session::Closed,
        Some(Err(e)) => {
            debug!(error = %e, "WebSocket receive failed");
            Session::Closed
        }
        Some(Ok(_)) => Session::Open,
    }
}

async fn send_snapshot(socket: &mut WebSocket, state: &AppState) -> Session {
    let frame = {
        let log = state.snapshot.read().await;
        snapshot_frame(&log)
    };
    match frame {
        Ok(json) => send_text(socket, json).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize snapshot");
            Session::Open
        }
    }
}

async fn send_text(socket: &mut WebSocket, json: String) -> Session {
    if socket.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket client disconnected (send failed)");
        return Session::Closed;
    }
    Session::Open
}

fn snapshot_frame(log: &EventLog) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SyncFrame::Snapshot(log))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use relief_types::{ChatEntry, DisasterType, RunId};
    use serde_json::Value;

    use super::*;

    #[test]
    fn snapshot_frame_shares_event_shape() {
        let mut log = EventLog::default();
        log.apply(&SimEvent::RunStarted {
            run_id: RunId::new(),
            disaster_type: DisasterType::Wildfire,
            affected_areas: 8,
            steps: 3,
        });
        log.apply(&SimEvent::Chat(ChatEntry::system("Step 1 starting...")));

        let frame: Value = serde_json::from_str(&snapshot_frame(&log).unwrap()).unwrap();
        assert_eq!(frame["type"], "snapshot");
        assert_eq!(frame["data"]["disaster_type"], "wildfire");
        assert_eq!(frame["data"]["transcript"][0]["message"], "Step 1 starting...");

        let event: Value = serde_json::to_value(SimEvent::TickStarted { tick: 1 }).unwrap();
        assert_eq!(event["type"], "tick_started");
    }
}
