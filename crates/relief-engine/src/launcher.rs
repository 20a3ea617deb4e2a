//! Run launcher: executes start requests one at a time.
//!
//! The dashboard claims the run slot and sends a [`StartRequest`]; the
//! launcher builds a fresh [`Simulation`], streams its events to the
//! dashboard, records the outcome in the run history, and releases the
//! slot by dropping the request's guard.

use std::sync::Arc;

use relief_core::config::SimulationConfig;
use relief_core::{Simulation, SimulationOutcome};
use relief_observer::{AppState, StartRequest};
use relief_runner::BackendClient;
use relief_types::RunRecord;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Owns everything a run needs besides its step count.
pub struct Launcher {
    config: SimulationConfig,
    client: Arc<BackendClient>,
    state: Arc<AppState>,
}

impl Launcher {
    /// Create a launcher.
    pub const fn new(config: SimulationConfig, client: Arc<BackendClient>, state: Arc<AppState>) -> Self {
        Self {
            config,
            client,
            state,
        }
    }

    /// Serve start requests until every sender is dropped.
    pub async fn run_loop(self, mut rx: mpsc::Receiver<StartRequest>) {
        while let Some(StartRequest { steps, guard }) = rx.recv().await {
            match self.execute(steps).await {
                Ok(outcome) => info!(
                    run_id = %outcome.run_id,
                    ticks = outcome.ticks,
                    affected_areas = outcome.affected_areas,
                    "Run finished"
                ),
                Err(e) => error!(error = %e, "Run aborted"),
            }
            drop(guard);
        }
        info!("Run launcher stopped");
    }

    /// Execute one run of `steps` ticks.
    pub async fn execute(&self, steps: u32) -> Result<SimulationOutcome, EngineError> {
        let mut simulation = Simulation::new(&self.config, &self.client);
        let mut callback = ObserverCallback::new(Arc::clone(&self.state));

        let result = simulation.run(steps, &mut callback).await;

        // Catch up on any snapshot write the callback had to skip.
        self.state.snapshot.write().await.clone_from(simulation.log());
        if callback.skipped() > 0 {
            info!(skipped = callback.skipped(), "Snapshot writes deferred to end of run");
        }

        let outcome = result?;
        if let Err(e) = self.state.history.append(&RunRecord::from(&outcome)).await {
            warn!(error = %e, path = %self.state.history.path().display(), "Failed to record run");
        }
        Ok(outcome)
    }
}
