//! Verbosity modes and the output switches each one implies.

use std::{fmt, str::FromStr};

use serde::Serialize;

use super::RunError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbosityMode {
    Debug,
    Full,
    #[default]
    Minimal,
    Silent,
    CodeOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    /// `Running <name>` before, `Finished <name>` after.
    StartEnd,
    /// `Loading <name>...` before, `Done` after.
    LoadingDone,
    StartOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    pub echo_source: bool,
    pub show_output: bool,
    pub show_messages: bool,
    pub null_graphics: bool,
    pub banner: Banner,
}

impl VerbosityMode {
    pub const ALL: [VerbosityMode; 5] = [
        VerbosityMode::Debug,
        VerbosityMode::Full,
        VerbosityMode::Minimal,
        VerbosityMode::Silent,
        VerbosityMode::CodeOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VerbosityMode::Debug => "debug",
            VerbosityMode::Full => "full",
            VerbosityMode::Minimal => "minimal",
            VerbosityMode::Silent => "silent",
            VerbosityMode::CodeOnly => "code_only",
        }
    }

    pub fn profile(self) -> ModeProfile {
        let (echo_source, show_output, show_messages, null_graphics, banner) = match self {
            VerbosityMode::Debug => (true, true, true, false, Banner::StartEnd),
            VerbosityMode::Full => (false, true, true, false, Banner::LoadingDone),
            VerbosityMode::Minimal => (false, true, false, false, Banner::StartEnd),
            VerbosityMode::Silent => (false, false, false, true, Banner::StartEnd),
            VerbosityMode::CodeOnly => (true, false, false, false, Banner::StartOnly),
        };
        ModeProfile { echo_source, show_output, show_messages, null_graphics, banner }
    }
}

impl fmt::Display for VerbosityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerbosityMode {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(VerbosityMode::Debug),
            "full" => Ok(VerbosityMode::Full),
            "minimal" => Ok(VerbosityMode::Minimal),
            "silent" => Ok(VerbosityMode::Silent),
            "code_only" | "code-only" => Ok(VerbosityMode::CodeOnly),
            _ => Err(RunError::InvalidMode(s.to_string())),
        }
    }
}
