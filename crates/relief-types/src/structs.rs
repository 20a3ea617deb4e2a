//! Core value types shared by the environment, agents, simulation loop,
//! and observer.
//!
//! Everything here is plain data: the environment and agents own the
//! mutation rules, this module only fixes the shapes that cross crate
//! boundaries and the dashboard wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentRole, DisasterType, SupplyKind};
use crate::ids::RunId;

/// Largest valid value on either grid axis (inclusive).
pub const GRID_MAX: u8 = 100;

/// Sender name used for transcript entries produced by the simulation
/// itself rather than an agent.
pub const SYSTEM_SENDER: &str = "System";

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A cell on the `[0, 100] x [0, 100]` disaster grid.
///
/// Coordinates have no identity beyond their value. The only way to build
/// one from arbitrary integers is [`Coordinate::new`], which rejects
/// out-of-grid values, so every `Coordinate` in the system is in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    /// Column, `0..=100`.
    x: u8,
    /// Row, `0..=100`.
    y: u8,
}

impl Coordinate {
    /// The grid origin, where every agent starts.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Build a coordinate, returning `None` if either axis is off-grid.
    pub const fn new(x: u8, y: u8) -> Option<Self> {
        if x > GRID_MAX || y > GRID_MAX {
            return None;
        }
        Some(Self { x, y })
    }

    /// Build a coordinate, clamping each axis to [`GRID_MAX`].
    pub const fn clamped(x: u8, y: u8) -> Self {
        let x = if x > GRID_MAX { GRID_MAX } else { x };
        let y = if y > GRID_MAX { GRID_MAX } else { y };
        Self { x, y }
    }

    /// Column.
    pub const fn x(self) -> u8 {
        self.x
    }

    /// Row.
    pub const fn y(self) -> u8 {
        self.y
    }

    /// The in-bounds 4-directional neighbours, in `+x, -x, +y, -y` order.
    ///
    /// Edge and corner cells yield fewer than four neighbours.
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        let right = self.x.checked_add(1).and_then(|x| Self::new(x, self.y));
        let left = self.x.checked_sub(1).and_then(|x| Self::new(x, self.y));
        let up = self.y.checked_add(1).and_then(|y| Self::new(self.x, y));
        let down = self.y.checked_sub(1).and_then(|y| Self::new(self.x, y));
        [right, left, up, down].into_iter().flatten()
    }

    /// The cell one row lower, or `None` when already on row 0.
    pub fn shifted_down(self) -> Option<Self> {
        self.y.checked_sub(1).map(|y| Self { x: self.x, y })
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An outstanding request for supplies at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SupplyNeed {
    /// Where the supplies are needed.
    pub location: Coordinate,
    /// What is needed.
    pub kind: SupplyKind,
}

impl core::fmt::Display for SupplyNeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.location.x(),
            self.location.y(),
            self.kind
        )
    }
}

/// Read-only view of the environment handed to the simulation loop each
/// tick.
///
/// Victims and supply needs already completed during the run are filtered
/// out; affected areas and blocked routes are reported in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentReport {
    /// The disaster kind for this run.
    pub disaster_type: DisasterType,
    /// Every affected cell, in insertion order (may contain duplicates).
    pub affected_areas: Vec<Coordinate>,
    /// Currently blocked routes.
    pub blocked_routes: Vec<Coordinate>,
    /// Victim locations not yet rescued.
    pub victim_locations: Vec<Coordinate>,
    /// Supply needs not yet delivered.
    pub supply_needs: Vec<SupplyNeed>,
}

// ---------------------------------------------------------------------------
// Presentation contract
// ---------------------------------------------------------------------------

/// One line of the mission chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatEntry {
    /// Agent name, or [`SYSTEM_SENDER`] for simulation announcements.
    pub sender: String,
    /// Message body.
    pub message: String,
    /// When the entry was recorded.
    pub at: DateTime<Utc>,
}

impl ChatEntry {
    /// Create an entry from an agent (or any named sender).
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
            at: Utc::now(),
        }
    }

    /// Create a system announcement.
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(SYSTEM_SENDER, message)
    }

    /// Whether this entry was produced by the simulation itself.
    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }
}

/// A recorded dispatch between two agents, for the mission flowchart.
///
/// Purely observational: the simulation never reads edges back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FlowEdge {
    /// Tick (1-based) in which the dispatch happened.
    pub tick: u32,
    /// Acting agent name.
    pub from: String,
    /// Addressee (`"All"` for the controller, `"Controller"` otherwise).
    pub to: String,
    /// Short action summary, e.g. `Rescue at (12, 40)`.
    pub summary: String,
    /// Whether the agent produced a response for this dispatch.
    pub completed: bool,
}

/// One row of the per-agent status table shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentStatusRow {
    /// Agent name (the table key).
    pub name: String,
    /// Role the agent fills.
    pub role: AgentRole,
    /// Whether the agent is currently active.
    pub active: bool,
    /// Last outcome message produced by the agent.
    pub message: String,
    /// Battery percentage.
    pub battery: u32,
    /// Task most recently assigned.
    pub task: String,
    /// Whether the most recent task completed with a response.
    pub completed: bool,
    /// Current location.
    pub location: Coordinate,
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// Final outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RunSummary {
    /// The run this summary belongs to.
    pub run_id: RunId,
    /// Human-readable completion status.
    pub status: String,
    /// The disaster simulated.
    pub disaster_type: DisasterType,
    /// Number of ticks executed.
    pub ticks: u32,
    /// Number of affected cells at the end of the run.
    pub affected_areas: u32,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// One row of the persisted run history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RunRecord {
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// The run.
    pub run_id: RunId,
    /// The disaster simulated.
    pub disaster_type: DisasterType,
    /// Number of affected cells at the end of the run.
    pub affected_areas: u32,
    /// Number of ticks executed.
    pub ticks: u32,
}

impl From<&RunSummary> for RunRecord {
    fn from(summary: &RunSummary) -> Self {
        Self {
            timestamp: summary.finished_at,
            run_id: summary.run_id,
            disaster_type: summary.disaster_type,
            affected_areas: summary.affected_areas,
            ticks: summary.ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_off_grid() {
        assert!(Coordinate::new(100, 100).is_some());
        assert!(Coordinate::new(101, 0).is_none());
        assert!(Coordinate::new(0, 255).is_none());
        assert_eq!(Coordinate::new(100, 3), Some(Coordinate::clamped(250, 3)));
    }

    #[test]
    fn corner_has_two_neighbors() {
        let corner = Coordinate::ORIGIN;
        let neighbors: Vec<Coordinate> = corner.neighbors().collect();
        assert_eq!(neighbors.len(), 2);

        let far = Coordinate::new(GRID_MAX, GRID_MAX);
        assert_eq!(far.map(|c| c.neighbors().count()), Some(2));
    }

    #[test]
    fn interior_has_four_neighbors() {
        let cell = Coordinate::new(50, 50);
        let neighbors: Vec<Coordinate> = cell.into_iter().flat_map(Coordinate::neighbors).collect();
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.contains(&Coordinate::new(51, 50).unwrap_or(Coordinate::ORIGIN)));
        assert!(neighbors.contains(&Coordinate::new(50, 49).unwrap_or(Coordinate::ORIGIN)));
    }

    #[test]
    fn shifted_down_stops_at_row_zero() {
        assert_eq!(Coordinate::ORIGIN.shifted_down(), None);
        let cell = Coordinate::new(7, 1);
        assert_eq!(cell.and_then(Coordinate::shifted_down), Coordinate::new(7, 0));
    }

    #[test]
    fn display_formats() {
        let cell = Coordinate::new(12, 40).unwrap_or(Coordinate::ORIGIN);
        assert_eq!(cell.to_string(), "(12, 40)");
        let need = SupplyNeed {
            location: cell,
            kind: SupplyKind::Water,
        };
        assert_eq!(need.to_string(), "(12, 40, water)");
    }

    #[test]
    fn system_entry_is_flagged() {
        assert!(ChatEntry::system("Simulation complete").is_system());
        assert!(!ChatEntry::new("Controller", "ok").is_system());
    }
}
