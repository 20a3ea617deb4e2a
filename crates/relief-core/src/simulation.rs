//! The turn-based disaster-response loop.
//!
//! One [`Simulation`] drives one run. Each tick proceeds in fixed phases:
//!
//! 1. **Evolve** -- the environment steps and a fresh report is taken.
//! 2. **Faults** -- every active agent may fail outright.
//! 3. **Dispatch** -- roles act in [`DISPATCH_ORDER`], promoting a standby
//!    first when the acting agent is inactive.
//! 4. **Drain** -- every still-active agent loses battery.
//! 5. **Pace** -- the loop sleeps for the configured tick interval.
//!
//! Every observable change is emitted as a [`SimEvent`], folded into the
//! run's [`EventLog`], then handed to the [`SimulationCallback`].
//!
//! [`DISPATCH_ORDER`]: crate::dispatch::DISPATCH_ORDER

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relief_agents::{AgentError, ResponseAgent, Roster};
use relief_runner::BackendClient;
use relief_types::{
    AgentRole, AgentStatusRow, ChatEntry, EnvironmentReport, FlowEdge, RunId, RunSummary, SimEvent,
};
use relief_world::DisasterEnvironment;
use tracing::{debug, info, warn};

use crate::config::{LoopConfig, SimulationConfig};
use crate::dispatch::{Completion, DISPATCH_ORDER, RoleDispatch};
use crate::log::EventLog;
use crate::runner::{RunnerError, SimulationCallback};

/// Status string of a run that reached its last tick.
pub const COMPLETION_STATUS: &str = "Simulation completed successfully";

/// Final outcome of [`Simulation::run`].
pub type SimulationOutcome = RunSummary;

/// One simulation run: environment, roster, randomness, and event log.
#[derive(Debug)]
pub struct Simulation {
    settings: LoopConfig,
    env: DisasterEnvironment,
    roster: Roster,
    rng: StdRng,
    log: EventLog,
    run_id: RunId,
}

impl Simulation {
    /// Create a run with a fresh random environment and the standard
    /// roster.
    ///
    /// A configured seed makes the environment and every roll in the run
    /// reproducible.
    pub fn new(config: &SimulationConfig, client: &Arc<BackendClient>) -> Self {
        let mut rng = config
            .world
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let env = DisasterEnvironment::new(&mut rng);
        let roster = Roster::standard(client, &config.agents);
        Self::from_parts(config.simulation.clone(), env, roster, rng)
    }

    /// Assemble a run from explicit parts.
    pub fn from_parts(settings: LoopConfig, env: DisasterEnvironment, roster: Roster, rng: StdRng) -> Self {
        Self {
            settings,
            env,
            roster,
            rng,
            log: EventLog::default(),
            run_id: RunId::new(),
        }
    }

    /// Identifier of this run.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The folded event log.
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    /// The environment.
    pub const fn environment(&self) -> &DisasterEnvironment {
        &self.env
    }

    /// The roster.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Mutable roster access, for staging agent state before a run.
    pub const fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Run `steps` ticks.
    ///
    /// Backend failures are isolated to the turn that hit them; only world
    /// or roster inconsistencies end the run early.
    pub async fn run(
        &mut self,
        steps: u32,
        callback: &mut dyn SimulationCallback,
    ) -> Result<SimulationOutcome, RunnerError> {
        let started_at = Utc::now();
        let disaster_type = self.env.disaster_type();
        let affected = count(self.env.affected_areas().len());

        info!(
            run_id = %self.run_id,
            disaster = %disaster_type,
            affected_areas = affected,
            steps,
            "Simulation starting"
        );

        self.emit(
            SimEvent::RunStarted {
                run_id: self.run_id,
                disaster_type,
                affected_areas: affected,
                steps,
            },
            callback,
        );
        self.system(
            format!("Disaster Type: {disaster_type} | Affected Areas: {affected}"),
            callback,
        );
        let roles: Vec<AgentRole> = self.roster.iter().map(ResponseAgent::role).collect();
        for role in roles {
            self.refresh_status(role, callback);
        }

        let interval = Duration::from_millis(self.settings.tick_interval_ms);
        for tick in 1..=steps {
            self.tick(tick, callback).await?;
            if tick < steps && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }

        self.system("Simulation complete", callback);
        let summary = RunSummary {
            run_id: self.run_id,
            status: COMPLETION_STATUS.to_owned(),
            disaster_type,
            ticks: steps,
            affected_areas: count(self.env.affected_areas().len()),
            started_at,
            finished_at: Utc::now(),
        };
        self.emit(SimEvent::RunCompleted(summary.clone()), callback);

        info!(
            run_id = %self.run_id,
            ticks = steps,
            affected_areas = summary.affected_areas,
            rescued = self.env.rescued_count(),
            supplied = self.env.supplied_count(),
            active_agents = self.roster.active_count(),
            "Simulation complete"
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Tick phases
    // -----------------------------------------------------------------------

    async fn tick(&mut self, tick: u32, callback: &mut dyn SimulationCallback) -> Result<(), RunnerError> {
        self.emit(SimEvent::TickStarted { tick }, callback);
        self.system(format!("Step {tick} starting..."), callback);

        self.env.step(&mut self.rng);
        let report = self.env.report();

        self.inject_faults(callback);

        for dispatch in DISPATCH_ORDER {
            if dispatch.precondition.holds(&report) {
                self.take_turn(tick, dispatch, &report, callback).await?;
            }
        }

        self.drain_batteries(callback);

        let active_agents = count(self.roster.active_count());
        self.emit(SimEvent::TickCompleted { tick, active_agents }, callback);
        debug!(
            tick,
            active_agents,
            victims = report.victim_locations.len(),
            needs = report.supply_needs.len(),
            "Tick complete"
        );
        Ok(())
    }

    fn inject_faults(&mut self, callback: &mut dyn SimulationCallback) {
        let probability = self.settings.fault_probability();
        let mut failed = Vec::new();
        for agent in self.roster.iter_mut() {
            if agent.is_active() && self.rng.random_bool(probability) {
                agent.force_failure();
                failed.push((agent.role(), agent.name().to_owned()));
            }
        }
        for (role, name) in failed {
            warn!(agent = %name, "injected fault");
            self.system(format!("{name} failed unexpectedly!"), callback);
            self.refresh_status(role, callback);
        }
    }

    async fn take_turn(
        &mut self,
        tick: u32,
        dispatch: RoleDispatch,
        report: &EnvironmentReport,
        callback: &mut dyn SimulationCallback,
    ) -> Result<(), RunnerError> {
        let role = dispatch.role;

        if let Some(promotion) = self.roster.promote(role)? {
            let message = format!("{} activating backup: {}", promotion.retired, promotion.promoted);
            self.emit(
                SimEvent::Promotion {
                    role,
                    retired: promotion.retired,
                    promoted: promotion.promoted,
                },
                callback,
            );
            self.system(message, callback);
            self.refresh_status(role, callback);
        }

        let agent = self.roster.get(role).ok_or(AgentError::UnknownRole(role))?;
        if !agent.is_active() {
            debug!(role = %role, agent = %agent.name(), "no active agent, skipping turn");
            return Ok(());
        }
        let name = agent.name().to_owned();

        let assignment = (dispatch.build)(report, &mut self.rng);
        let result = {
            let agent = self.roster.get_mut(role).ok_or(AgentError::UnknownRole(role))?;
            agent.perform_task(&assignment.task, &mut self.rng).await
        };

        let (message, completed) = match result {
            Ok(outcome) => {
                let responded = outcome.responded();
                let message = outcome.message().to_owned();
                self.emit(SimEvent::Chat(ChatEntry::new(name.as_str(), message.as_str())), callback);
                if responded && let Some(completion) = assignment.completion {
                    self.complete(role, completion)?;
                }
                (message, responded)
            }
            Err(err) => {
                warn!(agent = %name, role = %role, error = %err, "agent turn failed");
                let message = format!("{name} turn failed: {err}");
                self.system(message.as_str(), callback);
                (message, false)
            }
        };

        self.emit(
            SimEvent::Flow(FlowEdge {
                tick,
                from: name,
                to: dispatch.target.to_owned(),
                summary: assignment.summary.clone(),
                completed,
            }),
            callback,
        );
        if let Some(mut row) = self.status_row(role) {
            row.message = message;
            row.task = assignment.summary;
            row.completed = completed;
            self.emit(SimEvent::Status(row), callback);
        }
        Ok(())
    }

    /// Relocate the acting agent and record the completion.
    fn complete(&mut self, role: AgentRole, completion: Completion) -> Result<(), RunnerError> {
        if let Some(agent) = self.roster.get_mut(role) {
            let moved = agent.update_location(completion.location());
            debug!(role = %role, "{moved}");
        }
        let result = match completion {
            Completion::Rescue(location) => self.env.mark_rescued(location),
            Completion::Supply(need) => self.env.mark_supplied(need),
        };
        match result {
            // Medical works from the same tick's report as rescue and may
            // reach a victim rescue already cleared.
            Err(err) if role == AgentRole::Medical => {
                debug!(error = %err, "victim already rescued this tick");
                Ok(())
            }
            other => other.map_err(RunnerError::from),
        }
    }

    fn drain_batteries(&mut self, callback: &mut dyn SimulationCallback) {
        let range = self.settings.drain_range();
        let mut drained = Vec::new();
        for agent in self.roster.iter_mut() {
            if !agent.is_active() {
                continue;
            }
            let amount = self.rng.random_range(range.clone());
            let depleted = agent.drain(amount);
            drained.push((agent.role(), agent.name().to_owned(), depleted));
        }
        for (role, name, depleted) in drained {
            if depleted {
                info!(agent = %name, "battery depleted");
                self.system(format!("{name} battery depleted!"), callback);
            }
            self.refresh_status(role, callback);
        }
    }

    // -----------------------------------------------------------------------
    // Event plumbing
    // -----------------------------------------------------------------------

    fn emit(&mut self, event: SimEvent, callback: &mut dyn SimulationCallback) {
        self.log.apply(&event);
        callback.on_event(&event, &self.log);
    }

    fn system(&mut self, message: impl Into<String>, callback: &mut dyn SimulationCallback) {
        self.emit(SimEvent::Chat(ChatEntry::system(message)), callback);
    }

    /// The acting agent's status row, carrying over the last message and
    /// task from the log.
    fn status_row(&self, role: AgentRole) -> Option<AgentStatusRow> {
        let agent = self.roster.get(role)?;
        let mut row = self
            .log
            .status()
            .get(agent.name())
            .cloned()
            .unwrap_or_else(|| AgentStatusRow {
                name: agent.name().to_owned(),
                role,
                active: false,
                message: String::new(),
                battery: 0,
                task: String::new(),
                completed: false,
                location: agent.location(),
            });
        row.active = agent.is_active();
        row.battery = agent.battery();
        row.location = agent.location();
        Some(row)
    }

    fn refresh_status(&mut self, role: AgentRole, callback: &mut dyn SimulationCallback) {
        if let Some(row) = self.status_row(role) {
            self.emit(SimEvent::Status(row), callback);
        }
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
