//! The response agent.
//!
//! An agent owns its mutable state (status, location, battery, history,
//! standby queue) and a shared handle to the backend client. It never
//! touches the environment: the simulation loop decides what a response
//! means for the grid.
//!
//! # Task lifecycle
//!
//! 1. An inactive agent aborts without touching the battery or backend.
//! 2. A random task cost is deducted. If the battery hits zero the agent
//!    goes inactive and the turn ends without a backend call.
//! 3. The system preamble, recent history, and task are sent to the
//!    backend. The response is appended to history.
//!
//! A backend failure at step 3 leaves the step-2 deduction in place.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;
use relief_runner::{BackendClient, BackendError, GenerationRequest, SystemContext};
use relief_types::{AgentRole, AgentStatus, Coordinate};

use crate::config::AgentConfig;
use crate::history::BoundedHistory;

/// Immutable identity of an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    /// Unique name within the roster.
    pub name: String,
    /// Role the agent fills.
    pub role: AgentRole,
    /// Human-readable kind, e.g. `aerial drone`.
    pub kind: String,
    /// What the agent can do.
    pub capabilities: Vec<String>,
}

/// How a task dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The agent was inactive; nothing happened.
    Aborted(String),
    /// The task cost drained the battery; the agent is now inactive.
    Depleted(String),
    /// The backend produced a response.
    Responded(String),
}

impl TaskOutcome {
    /// The message to show in the transcript.
    pub fn message(&self) -> &str {
        match self {
            Self::Aborted(m) | Self::Depleted(m) | Self::Responded(m) => m,
        }
    }

    /// Whether the agent actually responded.
    pub const fn responded(&self) -> bool {
        matches!(self, Self::Responded(_))
    }
}

/// A disaster-response agent.
#[derive(Debug)]
pub struct ResponseAgent {
    profile: AgentProfile,
    status: AgentStatus,
    location: Coordinate,
    battery: u32,
    history: BoundedHistory,
    standby: VecDeque<Self>,
    config: AgentConfig,
    client: Arc<BackendClient>,
}

impl ResponseAgent {
    /// Create an active agent at the origin with a full battery.
    pub fn new(profile: AgentProfile, client: Arc<BackendClient>, config: AgentConfig) -> Self {
        Self {
            profile,
            status: AgentStatus::Active,
            location: Coordinate::ORIGIN,
            battery: config.initial_battery,
            history: BoundedHistory::new(config.history_limit),
            standby: VecDeque::new(),
            config,
            client,
        }
    }

    /// Queue a standby agent behind this one.
    ///
    /// The standby is held dormant (inactive) until promoted.
    #[must_use]
    pub fn with_standby(mut self, mut standby: Self) -> Self {
        standby.status = AgentStatus::Inactive;
        self.standby.push_back(standby);
        self
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    /// Run one task.
    ///
    /// Inactivity and depletion are reported as [`TaskOutcome`] variants.
    /// Only backend failures are errors.
    pub async fn perform_task<R>(&mut self, task: &str, rng: &mut R) -> Result<TaskOutcome, BackendError>
    where
        R: Rng + Send + ?Sized,
    {
        if !self.is_active() {
            return Ok(TaskOutcome::Aborted(format!(
                "{} is inactive, task aborted.",
                self.profile.name
            )));
        }

        let cost = rng.random_range(self.config.task_cost_range());
        if self.drain(cost) {
            return Ok(TaskOutcome::Depleted(format!(
                "{} battery depleted, going inactive.",
                self.profile.name
            )));
        }

        let system = self.client.render_system(&SystemContext {
            name: &self.profile.name,
            kind: &self.profile.kind,
            capabilities: &self.profile.capabilities,
            status: self.status.as_str(),
            location: self.location.to_string(),
            battery: self.battery,
        })?;
        let request = GenerationRequest {
            system,
            history: self.history.to_vec(),
            task: task.to_owned(),
        };

        tracing::debug!(agent = %self.profile.name, cost, battery = self.battery, task, "dispatching task");
        let response = self.client.generate(&request).await?;
        self.history.push(response.clone());
        Ok(TaskOutcome::Responded(response))
    }

    // -----------------------------------------------------------------------
    // State transitions
    // -----------------------------------------------------------------------

    /// Move to `location`.
    pub fn update_location(&mut self, location: Coordinate) -> String {
        self.location = location;
        format!("{} moved to {}", self.profile.name, location)
    }

    /// Promote the first standby if this agent is inactive.
    ///
    /// The promoted agent becomes active with its own full battery and
    /// inherits the rest of the standby queue. Returns `None` when this
    /// agent is still active or no standby is left.
    pub fn activate_backup(&mut self) -> Option<Self> {
        if self.is_active() {
            return None;
        }
        let mut backup = self.standby.pop_front()?;
        backup.status = AgentStatus::Active;
        backup.standby = std::mem::take(&mut self.standby);
        tracing::info!(
            retired = %self.profile.name,
            promoted = %backup.profile.name,
            "activating backup"
        );
        Some(backup)
    }

    /// Deliver a message from this agent to `recipient`.
    pub fn send_message(&self, recipient: &mut Self, message: &str) -> String {
        tracing::info!(from = %self.profile.name, to = %recipient.profile.name, message, "direct message");
        recipient.receive_message(&self.profile.name, message)
    }

    /// Record a message from `sender` in history.
    pub fn receive_message(&mut self, sender: &str, message: &str) -> String {
        self.history.push(format!("From {sender}: {message}"));
        format!("{} received message from {sender}", self.profile.name)
    }

    /// Fault injection: the agent fails outright.
    pub const fn force_failure(&mut self) {
        self.status = AgentStatus::Inactive;
        self.battery = 0;
    }

    /// Drain `amount` battery from an active agent.
    ///
    /// Returns `true` exactly when this call depleted the battery and
    /// switched the agent inactive. Inactive agents are left untouched.
    pub fn drain(&mut self, amount: u32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.battery = self.battery.saturating_sub(amount);
        if self.battery == 0 {
            self.status = AgentStatus::Inactive;
            return true;
        }
        false
    }

    /// Lower the battery to at most `max`. Never raises it.
    pub fn cap_battery(&mut self, max: u32) {
        self.battery = self.battery.min(max);
    }

    /// One-line human-readable status.
    pub fn report_status(&self) -> String {
        format!(
            "{} (Type: {}) - Status: {}, Location: {}, Battery: {}%",
            self.profile.name, self.profile.kind, self.status, self.location, self.battery
        )
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Agent name.
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Role filled.
    pub const fn role(&self) -> AgentRole {
        self.profile.role
    }

    /// Full identity.
    pub const fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Current status.
    pub const fn status(&self) -> AgentStatus {
        self.status
    }

    /// Whether the agent accepts tasks.
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Current location.
    pub const fn location(&self) -> Coordinate {
        self.location
    }

    /// Battery percentage.
    pub const fn battery(&self) -> u32 {
        self.battery
    }

    /// Conversation history.
    pub const fn history(&self) -> &BoundedHistory {
        &self.history
    }

    /// Names of queued standbys, in promotion order.
    pub fn standby_names(&self) -> Vec<&str> {
        self.standby.iter().map(Self::name).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use relief_runner::ScriptedMode;

    use super::*;

    fn profile(name: &str, role: AgentRole) -> AgentProfile {
        AgentProfile {
            name: name.to_owned(),
            role,
            kind: String::from("aerial drone"),
            capabilities: vec![String::from("surveillance")],
        }
    }

    fn client(mode: ScriptedMode) -> Arc<BackendClient> {
        Arc::new(BackendClient::scripted(mode).unwrap())
    }

    fn drone(client: &Arc<BackendClient>) -> ResponseAgent {
        ResponseAgent::new(profile("Drone-1", AgentRole::Drone), Arc::clone(client), AgentConfig::default())
    }

    #[tokio::test]
    async fn responded_task_costs_battery_and_records_history() {
        let client = client(ScriptedMode::Echo);
        let mut agent = drone(&client);
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = agent.perform_task("Survey (3, 4)", &mut rng).await.unwrap();
        assert_eq!(outcome, TaskOutcome::Responded(String::from("Survey (3, 4)")));
        assert!((80..=95).contains(&agent.battery()));
        assert_eq!(agent.history().last(), Some("Survey (3, 4)"));
        assert_eq!(client.attempts(), 1);
    }

    #[tokio::test]
    async fn inactive_agent_aborts_without_side_effects() {
        let client = client(ScriptedMode::Echo);
        let mut agent = drone(&client);
        agent.force_failure();
        let mut rng = StdRng::seed_from_u64(2);

        let outcome = agent.perform_task("Survey (3, 4)", &mut rng).await.unwrap();
        assert_eq!(outcome.message(), "Drone-1 is inactive, task aborted.");
        assert!(!outcome.responded());
        assert_eq!(agent.battery(), 0);
        assert_eq!(client.attempts(), 0);
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn low_battery_depletes_without_backend_call() {
        let client = client(ScriptedMode::Echo);
        let mut agent = drone(&client);
        agent.cap_battery(1);
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = agent.perform_task("Survey (3, 4)", &mut rng).await.unwrap();
        assert_eq!(
            outcome,
            TaskOutcome::Depleted(String::from("Drone-1 battery depleted, going inactive."))
        );
        assert_eq!(agent.status(), AgentStatus::Inactive);
        assert_eq!(agent.battery(), 0);
        assert_eq!(client.attempts(), 0);
    }

    #[tokio::test]
    async fn backend_failure_keeps_deduction() {
        let client = client(ScriptedMode::Fail);
        let mut agent = drone(&client);
        let mut rng = StdRng::seed_from_u64(4);

        let result = agent.perform_task("Survey (3, 4)", &mut rng).await;
        assert!(result.is_err());
        assert!(agent.battery() < 100);
        assert!(agent.is_active());
        assert!(agent.history().is_empty());
    }

    #[tokio::test]
    async fn battery_never_increases_across_turns() {
        let client = client(ScriptedMode::Echo);
        let mut agent = drone(&client);
        let mut rng = StdRng::seed_from_u64(5);
        let mut last = agent.battery();
        for _ in 0..25 {
            agent.perform_task("Survey", &mut rng).await.unwrap();
            assert!(agent.battery() <= last);
            last = agent.battery();
        }
        assert!(!agent.is_active());
    }

    #[test]
    fn backup_promotes_only_when_inactive() {
        let client = client(ScriptedMode::Echo);
        let backup = ResponseAgent::new(
            profile("Drone-2", AgentRole::Drone),
            Arc::clone(&client),
            AgentConfig::default(),
        );
        let mut primary = drone(&client).with_standby(backup);
        assert_eq!(primary.standby_names(), vec!["Drone-2"]);

        assert!(primary.activate_backup().is_none());

        primary.force_failure();
        let promoted = primary.activate_backup().unwrap();
        assert_eq!(promoted.name(), "Drone-2");
        assert!(promoted.is_active());
        assert_eq!(promoted.battery(), 100);

        assert!(primary.activate_backup().is_none());
    }

    #[test]
    fn messages_land_in_recipient_history() {
        let client = client(ScriptedMode::Echo);
        let controller = ResponseAgent::new(
            profile("Controller", AgentRole::Controller),
            Arc::clone(&client),
            AgentConfig::default(),
        );
        let mut drone = drone(&client);

        let receipt = controller.send_message(&mut drone, "Survey sector 4");
        assert_eq!(receipt, "Drone-1 received message from Controller");
        assert_eq!(drone.history().last(), Some("From Controller: Survey sector 4"));
    }

    #[test]
    fn drain_reports_depletion_once() {
        let client = client(ScriptedMode::Echo);
        let mut agent = drone(&client);
        assert!(!agent.drain(40));
        assert_eq!(agent.battery(), 60);
        assert!(agent.drain(200));
        assert_eq!(agent.battery(), 0);
        assert!(!agent.drain(5));
    }

    #[test]
    fn status_line_and_relocation() {
        let client = client(ScriptedMode::Echo);
        let mut agent = drone(&client);
        let target = Coordinate::new(12, 40).unwrap();
        assert_eq!(agent.update_location(target), "Drone-1 moved to (12, 40)");
        assert_eq!(
            agent.report_status(),
            "Drone-1 (Type: aerial drone) - Status: active, Location: (12, 40), Battery: 100%"
        );
    }
}
