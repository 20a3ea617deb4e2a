//! Simulation event stream.
//!
//! The simulation loop records everything observable as a sequence of
//! [`SimEvent`] values. The loop folds them into its own event log and
//! hands each one to the presentation side, which can rebuild the
//! transcript, flowchart, and status table from the stream alone.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentRole, DisasterType};
use crate::ids::RunId;
use crate::structs::{AgentStatusRow, ChatEntry, FlowEdge, RunSummary};

/// A single observable event emitted by the simulation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SimEvent {
    /// A run began.
    RunStarted {
        /// The new run.
        run_id: RunId,
        /// The disaster chosen for the run.
        disaster_type: DisasterType,
        /// Number of seed affected areas.
        affected_areas: u32,
        /// Number of ticks requested.
        steps: u32,
    },
    /// A tick began (1-based).
    TickStarted {
        /// The tick number.
        tick: u32,
    },
    /// A transcript entry was appended.
    Chat(ChatEntry),
    /// A flowchart edge was appended.
    Flow(FlowEdge),
    /// An agent's status row changed.
    Status(AgentStatusRow),
    /// A standby agent replaced an exhausted one.
    Promotion {
        /// The role whose acting agent changed.
        role: AgentRole,
        /// Name of the exhausted agent.
        retired: String,
        /// Name of the promoted standby.
        promoted: String,
    },
    /// A tick finished.
    TickCompleted {
        /// The tick number.
        tick: u32,
        /// Agents still active at the end of the tick.
        active_agents: u32,
    },
    /// The run finished.
    RunCompleted(RunSummary),
}

impl SimEvent {
    /// Short lowercase name of the variant, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::TickStarted { .. } => "tick_started",
            Self::Chat(_) => "chat",
            Self::Flow(_) => "flow",
            Self::Status(_) => "status",
            Self::Promotion { .. } => "promotion",
            Self::TickCompleted { .. } => "tick_completed",
            Self::RunCompleted(_) => "run_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_adjacently_tagged() {
        let event = SimEvent::Chat(ChatEntry::system("Step 1 starting..."));
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "chat");
        assert_eq!(json["data"]["sender"], "System");
        assert_eq!(event.kind(), "chat");
    }

    #[test]
    fn promotion_round_trips_through_json() {
        let event = SimEvent::Promotion {
            role: AgentRole::Drone,
            retired: String::from("Drone-1"),
            promoted: String::from("Drone-2"),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        let back: Result<SimEvent, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(event));
    }
}
