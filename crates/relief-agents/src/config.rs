//! Tunable parameters for agent turns.
//!
//! The simulation loads these from the `agents` section of
//! `relief-config.yaml`; every field falls back to its default when absent.

use serde::Deserialize;

/// Configuration for agent battery use and history retention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Minimum battery cost of one task (default: 5).
    pub task_cost_min: u32,
    /// Maximum battery cost of one task (default: 20).
    pub task_cost_max: u32,
    /// History entries kept and replayed to the backend (default: 5).
    pub history_limit: usize,
    /// Battery every agent starts with, standbys included (default: 100).
    pub initial_battery: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            task_cost_min: 5,
            task_cost_max: 20,
            history_limit: 5,
            initial_battery: 100,
        }
    }
}

impl AgentConfig {
    /// The task cost range with its bounds put in order.
    pub fn task_cost_range(&self) -> core::ops::RangeInclusive<u32> {
        let low = self.task_cost_min.min(self.task_cost_max);
        let high = self.task_cost_min.max(self.task_cost_max);
        low..=high
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AgentConfig::default();
        assert_eq!(config.task_cost_range(), 5..=20);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.initial_battery, 100);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: AgentConfig = serde_yml::from_str("task_cost_max: 8\n").unwrap();
        assert_eq!(config.task_cost_range(), 5..=8);
        assert_eq!(config.history_limit, 5);
    }

    #[test]
    fn inverted_range_is_reordered() {
        let config = AgentConfig {
            task_cost_min: 12,
            task_cost_max: 3,
            ..AgentConfig::default()
        };
        assert_eq!(config.task_cost_range(), 3..=12);
    }
}
