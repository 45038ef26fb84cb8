//! Script runner: executes Rhai analysis scripts into a shared session with
//! per-call verbosity modes and optional completion tones.

pub mod config;
pub mod execution;
pub mod graphics;
pub mod notify;
pub mod printer;

pub use execution::{
    ExecutionResult, NotificationPolicy, RunError, ScriptError, ScriptRef, ScriptRunner, Session,
    VerbosityMode,
};
