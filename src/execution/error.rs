//! Errors raised by a run and the script failures they wrap.

use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid mode {0:?}: expected one of debug, full, minimal, silent, code_only")]
    InvalidMode(String),

    #[error("cannot read script {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{script} failed: {source}")]
    Execution {
        script: String,
        #[source]
        source: ScriptError,
    },
}

/// A failure raised by the script itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("object '{name}' not found{}", at_line(.line))]
    NameResolution { name: String, line: Option<usize> },

    #[error("syntax error: {message}{}", at_line(.line))]
    Syntax { message: String, line: Option<usize> },

    #[error("{message}{}", at_line(.line))]
    Runtime { message: String, line: Option<usize> },
}

impl ScriptError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ScriptError::NameResolution { line, .. }
            | ScriptError::Syntax { line, .. }
            | ScriptError::Runtime { line, .. } => *line,
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}
