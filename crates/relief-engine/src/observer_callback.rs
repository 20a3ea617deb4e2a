//! Simulation callback that feeds the dashboard.
//!
//! Every event is broadcast to `WebSocket` clients and folded into the
//! dashboard's [`EventLog`] snapshot, so each update costs the same no
//! matter how long the run has been going. The snapshot write uses
//! `try_write` so a slow REST reader never stalls the loop. After a
//! skipped write the snapshot is stale, and the next successful write
//! copies the loop's whole log instead of folding one event.

use std::sync::Arc;

use relief_core::{EventLog, SimulationCallback};
use relief_observer::AppState;
use relief_types::SimEvent;
use tracing::debug;

/// Callback that bridges the simulation loop to the dashboard state.
pub struct ObserverCallback {
    state: Arc<AppState>,
    skipped: u64,
    stale: bool,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            skipped: 0,
            stale: false,
        }
    }

    /// Snapshot writes skipped because a reader held the lock.
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl SimulationCallback for ObserverCallback {
    fn on_event(&mut self, event: &SimEvent, log: &EventLog) {
        let receivers = self.state.broadcast(event);
        debug!(kind = event.kind(), receivers, "Event broadcast sent");

        let Ok(mut snap) = self.state.snapshot.try_write() else {
            self.skipped = self.skipped.saturating_add(1);
            self.stale = true;
            return;
        };
        if self.stale {
            snap.clone_from(log);
            self.stale = false;
        } else {
            snap.apply(event);
        }
    }
}
