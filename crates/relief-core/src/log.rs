//! Event-sourced run log.
//!
//! The simulation never mutates presentation state directly. It emits a
//! [`SimEvent`] and folds it into its [`EventLog`]; observers receive the
//! same event and a borrow of the folded log, so a snapshot is always
//! consistent with the event stream that produced it.

use std::collections::BTreeMap;

use relief_types::{AgentStatusRow, ChatEntry, DisasterType, FlowEdge, RunId, RunSummary, SimEvent};
use serde::Serialize;

/// Transcript, flowchart, and status table for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventLog {
    run_id: Option<RunId>,
    disaster_type: Option<DisasterType>,
    steps: u32,
    current_tick: u32,
    transcript: Vec<ChatEntry>,
    flowchart: Vec<FlowEdge>,
    status: BTreeMap<String, AgentStatusRow>,
    summary: Option<RunSummary>,
}

impl EventLog {
    /// Fold one event into the log.
    ///
    /// `RunStarted` resets everything from the previous run.
    pub fn apply(&mut self, event: &SimEvent) {
        match event {
            SimEvent::RunStarted {
                run_id,
                disaster_type,
                steps,
                ..
            } => {
                *self = Self {
                    run_id: Some(*run_id),
                    disaster_type: Some(*disaster_type),
                    steps: *steps,
                    ..Self::default()
                };
            }
            SimEvent::TickStarted { tick } | SimEvent::TickCompleted { tick, .. } => {
                self.current_tick = *tick;
            }
            SimEvent::Chat(entry) => self.transcript.push(entry.clone()),
            SimEvent::Flow(edge) => self.flowchart.push(edge.clone()),
            SimEvent::Status(row) => {
                self.status.insert(row.name.clone(), row.clone());
            }
            SimEvent::Promotion { retired, .. } => {
                // The promoted agent's row follows as its own status event.
                self.status.remove(retired);
            }
            SimEvent::RunCompleted(summary) => self.summary = Some(summary.clone()),
        }
    }

    /// The run being logged.
    pub const fn run_id(&self) -> Option<RunId> {
        self.run_id
    }

    /// The disaster being simulated.
    pub const fn disaster_type(&self) -> Option<DisasterType> {
        self.disaster_type
    }

    /// Ticks requested for the run.
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// The latest tick started or completed.
    pub const fn current_tick(&self) -> u32 {
        self.current_tick
    }

    /// Chat transcript, oldest first.
    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    /// Flowchart edges, oldest first.
    pub fn flowchart(&self) -> &[FlowEdge] {
        &self.flowchart
    }

    /// Status rows keyed by agent name.
    pub const fn status(&self) -> &BTreeMap<String, AgentStatusRow> {
        &self.status
    }

    /// The final outcome, once the run has completed.
    pub const fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Transcript entries sent by `sender`.
    pub fn entries_from<'a>(&'a self, sender: &'a str) -> impl Iterator<Item = &'a ChatEntry> + 'a {
        self.transcript.iter().filter(move |e| e.sender == sender)
    }
}
