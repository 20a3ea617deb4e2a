//! Callback seam between the simulation loop and its observers.
//!
//! The loop in [`Simulation::run`] pushes every [`SimEvent`] through a
//! [`SimulationCallback`] right after folding it into the [`EventLog`].
//! The engine implements the callback to update the dashboard snapshot and
//! broadcast the event; tests use [`NoOpCallback`] or a recording one.
//!
//! [`Simulation::run`]: crate::simulation::Simulation::run

use relief_agents::AgentError;
use relief_types::SimEvent;
use relief_world::WorldError;

use crate::log::EventLog;

/// Errors that end a run early.
///
/// Backend failures are not here: they are isolated to the agent turn that
/// hit them and never abort the run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The environment rejected an operation.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The roster rejected an operation.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Observer of the simulation event stream.
pub trait SimulationCallback: Send {
    /// Called after `event` has been applied to `log`.
    fn on_event(&mut self, event: &SimEvent, log: &EventLog);
}

/// A callback that ignores every event.
pub struct NoOpCallback;

impl SimulationCallback for NoOpCallback {
    fn on_event(&mut self, _event: &SimEvent, _log: &EventLog) {}
}

/// A callback that keeps a copy of every event.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    /// Events received, in order.
    pub events: Vec<SimEvent>,
}

impl SimulationCallback for RecordingCallback {
    fn on_event(&mut self, event: &SimEvent, _log: &EventLog) {
        self.events.push(event.clone());
    }
}
