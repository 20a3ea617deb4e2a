//! Enumeration types for the Relief simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Disaster
// ---------------------------------------------------------------------------

/// The kind of disaster driving a simulation run.
///
/// Chosen uniformly at random when the environment is created and fixed
/// for the rest of the run. Each kind has its own evolution rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DisasterType {
    /// Ground shaking; randomly blocks routes and traps victims.
    Earthquake,
    /// Rising water; blocked routes drift and water needs appear.
    Flood,
    /// Spreading fire; affected area grows to neighbouring cells.
    Wildfire,
}

impl DisasterType {
    /// All disaster kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Earthquake, Self::Flood, Self::Wildfire];

    /// Lowercase name used in prompts and transcripts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earthquake => "earthquake",
            Self::Flood => "flood",
            Self::Wildfire => "wildfire",
        }
    }
}

impl core::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Supplies
// ---------------------------------------------------------------------------

/// The kind of supply requested at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SupplyKind {
    /// First-aid kits, medicine.
    Medical,
    /// Rations.
    Food,
    /// Drinking water.
    Water,
}

impl SupplyKind {
    /// All supply kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Medical, Self::Food, Self::Water];

    /// Lowercase name used in prompts and transcripts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Food => "food",
            Self::Water => "water",
        }
    }
}

impl core::fmt::Display for SupplyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// The role an agent fills in the response roster.
///
/// Each role has exactly one acting agent at a time. Roles with standby
/// agents (drone, supplies) can swap in a replacement once the acting
/// agent goes inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AgentRole {
    /// Central coordinator; addresses every other agent.
    Controller,
    /// On-site victim extraction.
    Rescue,
    /// Aerial survey.
    Drone,
    /// Treatment and transport of victims.
    Medical,
    /// Structural damage assessment.
    Assessor,
    /// Supply delivery.
    Supplies,
    /// Road and barricade coordination.
    Routes,
}

impl AgentRole {
    /// All roles, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Controller,
        Self::Rescue,
        Self::Drone,
        Self::Medical,
        Self::Assessor,
        Self::Supplies,
        Self::Routes,
    ];

    /// Lowercase name used for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Rescue => "rescue",
            Self::Drone => "drone",
            Self::Medical => "medical",
            Self::Assessor => "assessor",
            Self::Supplies => "supplies",
            Self::Routes => "routes",
        }
    }
}

impl core::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an agent can currently take on tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AgentStatus {
    /// Accepting tasks.
    #[default]
    Active,
    /// Failed, depleted, or dormant standby. Never executes a task.
    Inactive,
}

impl AgentStatus {
    /// Lowercase name used in prompts and status lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl core::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&DisasterType::Wildfire).unwrap_or_default();
        assert_eq!(json, "\"wildfire\"");
        let json = serde_json::to_string(&AgentRole::Assessor).unwrap_or_default();
        assert_eq!(json, "\"assessor\"");
        let json = serde_json::to_string(&AgentStatus::Inactive).unwrap_or_default();
        assert_eq!(json, "\"inactive\"");
    }

    #[test]
    fn display_matches_as_str() {
        for kind in SupplyKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
        for role in AgentRole::ALL {
            assert_eq!(role.to_string(), role.as_str());
        }
    }
}
