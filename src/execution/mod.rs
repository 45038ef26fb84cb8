//! Execution engine: modes, sessions, the runner and its result types.

use serde::Serialize;

use crate::graphics::Figure;

mod engine;
mod error;
pub mod mode;
mod runner;
mod script;
mod session;

pub use error::{RunError, ScriptError};
pub use mode::{Banner, ModeProfile, VerbosityMode};
pub use runner::ScriptRunner;
pub use script::{LoadedScript, ScriptRef};
pub use session::{parse_value, Session};

/// Outcome of a script that ran to completion. Output the mode suppressed is
/// still captured here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionResult {
    pub script: String,
    pub mode: VerbosityMode,
    pub output: Vec<String>,
    pub messages: Vec<String>,
    pub plots: Vec<Figure>,
    pub graphics_device: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationPolicy {
    pub on_success: bool,
    pub on_error: bool,
}

impl NotificationPolicy {
    pub fn new(on_success: bool, on_error: bool) -> Self {
        Self { on_success, on_error }
    }

    pub fn any(&self) -> bool {
        self.on_success || self.on_error
    }
}
