//! Configuration loading and typed config structures for the Relief
//! simulation.
//!
//! The canonical configuration lives in `relief-config.yaml` at the project
//! root. The file is optional: every section and field falls back to a
//! default, so an absent file and an empty file behave the same.
//!
//! Two environment variables override the YAML:
//! - `RELIEF_STEPS` overrides `simulation.steps`
//! - `RELIEF_OBSERVER_PORT` overrides `observer.port`

use std::path::Path;

use relief_agents::AgentConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid {name}: {value:?}")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `relief-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tick loop parameters.
    #[serde(default)]
    pub simulation: LoopConfig,

    /// Agent task cost and history parameters.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Dashboard server settings.
    #[serde(default)]
    pub observer: ObserverConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load configuration from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply `RELIEF_STEPS` / `RELIEF_OBSERVER_PORT` from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides through an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("RELIEF_STEPS") {
            self.simulation.steps = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    name: "RELIEF_STEPS",
                    value: value.clone(),
                })?;
        }
        if let Some(value) = lookup("RELIEF_OBSERVER_PORT") {
            self.observer.port = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    name: "RELIEF_OBSERVER_PORT",
                    value: value.clone(),
                })?;
        }
        Ok(())
    }
}

/// World-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducible runs. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Tick loop configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoopConfig {
    /// Ticks per run when a start request does not say.
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// Real-time milliseconds to pause after each tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Per-tick chance that an active agent fails outright.
    #[serde(default = "default_fault_probability")]
    pub fault_probability: f64,

    /// Minimum end-of-tick battery drain.
    #[serde(default = "default_drain_min")]
    pub drain_min: u32,

    /// Maximum end-of-tick battery drain.
    #[serde(default = "default_drain_max")]
    pub drain_max: u32,

    /// Start one run as soon as the engine boots.
    #[serde(default)]
    pub auto_start: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            tick_interval_ms: default_tick_interval_ms(),
            fault_probability: default_fault_probability(),
            drain_min: default_drain_min(),
            drain_max: default_drain_max(),
            auto_start: false,
        }
    }
}

impl LoopConfig {
    /// Fault probability clamped into `[0, 1]`.
    pub fn fault_probability(&self) -> f64 {
        if self.fault_probability.is_nan() {
            return 0.0;
        }
        self.fault_probability.clamp(0.0, 1.0)
    }

    /// The drain range with its bounds put in order.
    pub fn drain_range(&self) -> core::ops::RangeInclusive<u32> {
        self.drain_min.min(self.drain_max)..=self.drain_min.max(self.drain_max)
    }
}

/// Dashboard server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON-lines file the run history is appended to.
    #[serde(default = "default_history_path")]
    pub history_path: String,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            history_path: default_history_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (used by serde)
// ---------------------------------------------------------------------------

const fn default_steps() -> u32 {
    3
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

const fn default_fault_probability() -> f64 {
    0.1
}

const fn default_drain_min() -> u32 {
    5
}

const fn default_drain_max() -> u32 {
    15
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_history_path() -> String {
    "relief-runs.jsonl".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, None);
        assert_eq!(config.simulation.steps, 3);
        assert_eq!(config.simulation.tick_interval_ms, 5_000);
        assert_eq!(config.simulation.fault_probability, 0.1);
        assert_eq!(config.simulation.drain_range(), 5..=15);
        assert!(!config.simulation.auto_start);
        assert_eq!(config.agents.task_cost_range(), 5..=20);
        assert_eq!(config.observer.port, 8080);
        assert_eq!(config.observer.history_path, "relief-runs.jsonl");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 123

simulation:
  steps: 5
  tick_interval_ms: 0
  fault_probability: 0.0
  drain_min: 1
  drain_max: 2
  auto_start: true

agents:
  task_cost_min: 2
  task_cost_max: 4
  history_limit: 3

observer:
  host: 127.0.0.1
  port: 9000
  history_path: /tmp/runs.jsonl
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, Some(123));
        assert_eq!(config.simulation.steps, 5);
        assert_eq!(config.simulation.tick_interval_ms, 0);
        assert_eq!(config.simulation.fault_probability(), 0.0);
        assert_eq!(config.simulation.drain_range(), 1..=2);
        assert!(config.simulation.auto_start);
        assert_eq!(config.agents.history_limit, 3);
        assert_eq!(config.observer.host, "127.0.0.1");
        assert_eq!(config.observer.port, 9000);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 7\n").unwrap();
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.simulation.steps, 3);
        assert_eq!(config.observer.port, 8080);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = SimulationConfig::parse("simulation: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SimulationConfig::default();
        config
            .apply_overrides(|name| match name {
                "RELIEF_STEPS" => Some(String::from("7")),
                "RELIEF_OBSERVER_PORT" => Some(String::from("3001")),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.simulation.steps, 7);
        assert_eq!(config.observer.port, 3001);

        let err = config.apply_overrides(|name| (name == "RELIEF_STEPS").then(|| String::from("lots")));
        assert!(matches!(
            err,
            Err(ConfigError::InvalidOverride {
                name: "RELIEF_STEPS",
                ..
            })
        ));
    }

    #[test]
    fn fault_probability_is_clamped() {
        let mut settings = LoopConfig {
            fault_probability: 4.0,
            ..LoopConfig::default()
        };
        assert_eq!(settings.fault_probability(), 1.0);
        settings.fault_probability = f64::NAN;
        assert_eq!(settings.fault_probability(), 0.0);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("relief-config.yaml");
        let config = SimulationConfig::load_or_default(&path);
        assert!(config.is_ok(), "Failed to load project config: {config:?}");
    }
}
