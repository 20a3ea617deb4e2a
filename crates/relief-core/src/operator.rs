//! Single-run control shared between the dashboard and the launcher.
//!
//! [`RunControl`] is wrapped in [`Arc`] and handed to both the HTTP handlers
//! and the task that drives runs. A start request claims the run slot with
//! [`RunControl::try_begin`]; the returned [`RunGuard`] releases it when
//! dropped, so a run that errors out or panics never leaves the slot held.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Whether a run is in progress, plus how many runs have been started.
#[derive(Debug, Default)]
pub struct RunControl {
    running: AtomicBool,
    runs_started: AtomicU64,
}

impl RunControl {
    /// Create an idle control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the run slot.
    ///
    /// Returns `None` while another run holds it.
    pub fn try_begin(self: &Arc<Self>) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.runs_started.fetch_add(1, Ordering::AcqRel);
        Some(RunGuard {
            control: Arc::clone(self),
        })
    }

    /// Check whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of runs started since boot.
    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Acquire)
    }

    fn finish(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Holds the run slot until dropped.
#[derive(Debug)]
pub struct RunGuard {
    control: Arc<RunControl>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.control.finish();
    }
}
