//! The response roster: one acting agent per role.
//!
//! [`Roster::standard`] builds the fixed cast used by every run. All agents
//! (standbys included) share a single backend client, so the client's rate
//! limit spans the whole roster.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use relief_runner::BackendClient;
use relief_types::AgentRole;

use crate::agent::{AgentProfile, ResponseAgent};
use crate::config::AgentConfig;
use crate::error::AgentError;

/// Static description of one roster slot.
struct RosterEntry {
    role: AgentRole,
    name: &'static str,
    kind: &'static str,
    capabilities: &'static [&'static str],
    standby: Option<&'static str>,
}

const STANDARD_ROSTER: [RosterEntry; 7] = [
    RosterEntry {
        role: AgentRole::Controller,
        name: "Controller",
        kind: "central coordinator",
        capabilities: &["task allocation", "communication"],
        standby: None,
    },
    RosterEntry {
        role: AgentRole::Rescue,
        name: "Rescue-1",
        kind: "on-site rescue",
        capabilities: &["victim extraction", "first aid"],
        standby: None,
    },
    RosterEntry {
        role: AgentRole::Drone,
        name: "Drone-1",
        kind: "aerial drone",
        capabilities: &["surveillance", "victim detection"],
        standby: Some("Drone-2"),
    },
    RosterEntry {
        role: AgentRole::Medical,
        name: "Medical-1",
        kind: "medical support",
        capabilities: &["treatment", "transport"],
        standby: None,
    },
    RosterEntry {
        role: AgentRole::Assessor,
        name: "Assess-1",
        kind: "damage assessor",
        capabilities: &["structural analysis", "hazard detection"],
        standby: None,
    },
    RosterEntry {
        role: AgentRole::Supplies,
        name: "Supplies-1",
        kind: "supply delivery",
        capabilities: &["food", "water", "medical supplies"],
        standby: Some("Supplies-2"),
    },
    RosterEntry {
        role: AgentRole::Routes,
        name: "Routes-1",
        kind: "road coordinator",
        capabilities: &["route planning", "barricades"],
        standby: None,
    },
];

impl RosterEntry {
    fn profile(&self, name: &str) -> AgentProfile {
        AgentProfile {
            name: name.to_owned(),
            role: self.role,
            kind: self.kind.to_owned(),
            capabilities: self.capabilities.iter().map(|&c| c.to_owned()).collect(),
        }
    }
}

/// A standby replaced an exhausted primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// The role whose acting agent changed.
    pub role: AgentRole,
    /// Name of the exhausted agent.
    pub retired: String,
    /// Name of the newly acting agent.
    pub promoted: String,
}

/// The acting agent for every role.
#[derive(Debug)]
pub struct Roster {
    agents: BTreeMap<AgentRole, ResponseAgent>,
}

impl Roster {
    /// Build the standard seven-role cast with drone and supplies standbys.
    pub fn standard(client: &Arc<BackendClient>, config: &AgentConfig) -> Self {
        let agents = STANDARD_ROSTER
            .iter()
            .map(|entry| {
                let mut agent =
                    ResponseAgent::new(entry.profile(entry.name), Arc::clone(client), config.clone());
                if let Some(standby) = entry.standby {
                    agent = agent.with_standby(ResponseAgent::new(
                        entry.profile(standby),
                        Arc::clone(client),
                        config.clone(),
                    ));
                }
                (entry.role, agent)
            })
            .collect();
        Self { agents }
    }

    /// Build a roster from explicit agents.
    ///
    /// Each role may appear once, and names must be unique across primaries
    /// and standbys.
    pub fn from_agents(agents: Vec<ResponseAgent>) -> Result<Self, AgentError> {
        let mut names = BTreeSet::new();
        let mut by_role = BTreeMap::new();
        for agent in agents {
            for name in core::iter::once(agent.name()).chain(agent.standby_names()) {
                if !names.insert(name.to_owned()) {
                    return Err(AgentError::DuplicateName(name.to_owned()));
                }
            }
            let role = agent.role();
            if by_role.insert(role, agent).is_some() {
                return Err(AgentError::DuplicateRole(role));
            }
        }
        Ok(Self { agents: by_role })
    }

    /// The acting agent for `role`.
    pub fn get(&self, role: AgentRole) -> Option<&ResponseAgent> {
        self.agents.get(&role)
    }

    /// Mutable access to the acting agent for `role`.
    pub fn get_mut(&mut self, role: AgentRole) -> Option<&mut ResponseAgent> {
        self.agents.get_mut(&role)
    }

    /// Acting agents in role order.
    pub fn iter(&self) -> impl Iterator<Item = &ResponseAgent> {
        self.agents.values()
    }

    /// Mutable acting agents in role order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ResponseAgent> {
        self.agents.values_mut()
    }

    /// Number of currently active agents.
    pub fn active_count(&self) -> usize {
        self.agents.values().filter(|a| a.is_active()).count()
    }

    /// Swap in the next standby for an inactive agent.
    ///
    /// Returns `Ok(None)` when the acting agent is still active or has no
    /// standby left.
    pub fn promote(&mut self, role: AgentRole) -> Result<Option<Promotion>, AgentError> {
        let slot = self
            .agents
            .get_mut(&role)
            .ok_or(AgentError::UnknownRole(role))?;
        let Some(backup) = slot.activate_backup() else {
            return Ok(None);
        };
        let retired = std::mem::replace(slot, backup);
        Ok(Some(Promotion {
            role,
            retired: retired.name().to_owned(),
            promoted: slot.name().to_owned(),
        }))
    }
}
