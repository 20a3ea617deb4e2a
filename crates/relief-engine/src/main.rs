//! Relief engine binary.
//!
//! Wires the backend client, the dashboard server, and the run launcher
//! together, then waits for runs to be requested over HTTP (or starts one
//! immediately when `auto_start` is set).
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `RELIEF_CONFIG` (default `relief-config.yaml`)
//! 3. Build the text-generation backend client from `LLM_*` variables
//! 4. Create dashboard state and the launcher channel
//! 5. Start the launcher task and the dashboard server
//! 6. Optionally queue the first run
//! 7. Run until the server exits or Ctrl-C

mod error;
mod launcher;
mod observer_callback;

use std::path::PathBuf;
use std::sync::Arc;

use relief_core::config::SimulationConfig;
use relief_observer::{AppState, RunHistory, ServerConfig, StartRequest};
use relief_runner::{BackendClient, RunnerConfig};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::launcher::Launcher;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "relief-config.yaml";

/// Pending start requests the launcher will buffer.
const LAUNCH_QUEUE: usize = 4;

/// Application entry point for the Relief engine.
///
/// # Errors
///
/// Returns an error if configuration, backend setup, or the dashboard
/// server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("relief-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        seed = config.world.seed,
        steps = config.simulation.steps,
        tick_interval_ms = config.simulation.tick_interval_ms,
        fault_probability = config.simulation.fault_probability(),
        "Configuration loaded"
    );

    // 3. Backend client.
    let runner_config = RunnerConfig::from_env().map_err(EngineError::from)?;
    let client = Arc::new(BackendClient::from_config(&runner_config).map_err(EngineError::from)?);
    info!(
        backend = ?runner_config.backend.backend_type,
        model = runner_config.backend.model,
        "Backend client ready"
    );

    // 4. Dashboard state.
    let (tx, rx) = mpsc::channel::<StartRequest>(LAUNCH_QUEUE);
    let history = RunHistory::new(&config.observer.history_path);
    let state = Arc::new(AppState::new(history).with_launcher(tx.clone(), config.simulation.steps));

    // 5. Launcher and dashboard server.
    let launcher = Launcher::new(config.clone(), client, Arc::clone(&state));
    let launcher_handle = tokio::spawn(launcher.run_loop(rx));

    let server_config = ServerConfig {
        host: config.observer.host.clone(),
        port: config.observer.port,
    };
    let observer_handle = relief_observer::spawn_observer(server_config, Arc::clone(&state))
        .map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;
    info!(
        host = config.observer.host,
        port = config.observer.port,
        "Dashboard started"
    );

    // 6. Optional first run.
    if config.simulation.auto_start
        && let Some(guard) = state.run_control.try_begin()
    {
        tx.send(StartRequest {
            steps: config.simulation.steps,
            guard,
        })
        .await
        .map_err(|e| EngineError::Launcher {
            message: format!("{e}"),
        })?;
        info!(steps = config.simulation.steps, "Auto-start run queued");
    }
    drop(tx);

    // 7. Serve until shutdown.
    tokio::select! {
        result = observer_handle => {
            if let Err(e) = result {
                warn!(error = %e, "Dashboard task ended abnormally");
            }
            return Err(EngineError::Observer {
                message: "dashboard server stopped".to_owned(),
            }
            .into());
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Shutdown requested");
        }
    }

    launcher_handle.abort();
    info!("relief-engine shutdown complete");

    Ok(())
}

/// Load the simulation configuration and apply `RELIEF_*` overrides.
///
/// A missing file falls back to defaults.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let path = std::env::var("RELIEF_CONFIG").map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let mut config = SimulationConfig::load_or_default(&path)?;
    config.apply_env_overrides()?;
    Ok(config)
}
