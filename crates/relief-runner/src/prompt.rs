//! System prompt rendering via `minijinja`.
//!
//! The default template is compiled into the binary. Operators can point
//! `TEMPLATES_DIR` at a directory containing their own `system.j2` to
//! change agent voice without recompiling.

use minijinja::Environment;
use serde::Serialize;

use crate::error::BackendError;

const DEFAULT_SYSTEM_TEMPLATE: &str = include_str!("../templates/system.j2");

/// Values available to the system template.
#[derive(Debug, Clone, Serialize)]
pub struct SystemContext<'a> {
    /// Agent name.
    pub name: &'a str,
    /// Human-readable agent kind (e.g. `aerial drone`).
    pub kind: &'a str,
    /// Capability list.
    pub capabilities: &'a [String],
    /// Current status (`active` / `inactive`).
    pub status: &'a str,
    /// Current location, already formatted.
    pub location: String,
    /// Battery percentage.
    pub battery: u32,
}

/// Renders agent system prompts.
#[derive(Debug)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Create an engine from the built-in template, or from `system.j2`
    /// in `templates_dir` when one is given.
    pub fn new(templates_dir: Option<&str>) -> Result<Self, BackendError> {
        let source = match templates_dir {
            Some(dir) => load_template(dir, "system.j2")?,
            None => DEFAULT_SYSTEM_TEMPLATE.to_owned(),
        };

        let mut env = Environment::new();
        env.add_template_owned("system", source)
            .map_err(|e| BackendError::Template(format!("failed to add system template: {e}")))?;
        Ok(Self { env })
    }

    /// Render the system preamble for one agent turn.
    pub fn render_system(&self, context: &SystemContext<'_>) -> Result<String, BackendError> {
        self.env
            .get_template("system")
            .map_err(|e| BackendError::Template(format!("missing system template: {e}")))?
            .render(context)
            .map_err(|e| BackendError::Template(format!("system render failed: {e}")))
    }
}

/// Read a template file from disk.
fn load_template(dir: &str, filename: &str) -> Result<String, BackendError> {
    let path = format!("{dir}/{filename}");
    std::fs::read_to_string(&path)
        .map_err(|e| BackendError::Template(format!("failed to read {path}: {e}")))
}
