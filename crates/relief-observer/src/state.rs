//! Shared application state for the dashboard server.
//!
//! [`AppState`] holds the broadcast channel for simulation events, the
//! in-memory [`EventLog`] snapshot the REST endpoints serve, the run
//! history, and the handle used to ask the engine for a new run.

use std::sync::Arc;

use relief_core::{EventLog, RunControl, RunGuard};
use relief_types::SimEvent;
use tokio::sync::{RwLock, broadcast, mpsc};

use crate::history::RunHistory;

/// Capacity of the broadcast channel for simulation events.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Ticks per run when a start request does not specify any.
pub const DEFAULT_STEPS: u32 = 3;

/// A claimed run waiting for the engine to execute it.
///
/// The guard travels with the request so the run slot is released once
/// the launcher finishes with it, or immediately if the request is dropped.
#[derive(Debug)]
pub struct StartRequest {
    /// Ticks to run.
    pub steps: u32,
    /// The claimed run slot.
    pub guard: RunGuard,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// Broadcast sender for simulation events.
    pub tx: broadcast::Sender<SimEvent>,
    /// The latest folded event log (updated as events arrive).
    pub snapshot: Arc<RwLock<EventLog>>,
    /// One-run-at-a-time control.
    pub run_control: Arc<RunControl>,
    /// Persisted run records.
    pub history: Arc<RunHistory>,
    /// Channel to the engine's run launcher, when one is attached.
    pub launcher: Option<mpsc::Sender<StartRequest>>,
    /// Ticks per run when a start request omits `steps`.
    pub default_steps: u32,
}

impl AppState {
    /// Create a new application state with an empty snapshot and no
    /// launcher.
    pub fn new(history: RunHistory) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(EventLog::default())),
            run_control: Arc::new(RunControl::new()),
            history: Arc::new(history),
            launcher: None,
            default_steps: DEFAULT_STEPS,
        }
    }

    /// Attach the engine's run launcher.
    #[must_use]
    pub fn with_launcher(mut self, launcher: mpsc::Sender<StartRequest>, default_steps: u32) -> Self {
        self.launcher = Some(launcher);
        self.default_steps = default_steps;
        self
    }

    /// Subscribe to the event broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<SimEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, event: &SimEvent) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(event.clone()).unwrap_or(0)
    }
}
