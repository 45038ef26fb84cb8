//! Completion and failure tones.

use std::{
    env,
    io::{self, Write},
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Alarm,
}

pub trait Notifier {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    fn play(&self, tone: Tone) -> Result<()>;
}

/// Terminal bell on stderr: one ring for success, three for an alarm.
pub struct BellNotifier;

impl Notifier for BellNotifier {
    fn name(&self) -> &str {
        "bell"
    }

    fn is_available(&self) -> bool {
        io::stderr().is_terminal()
    }

    fn play(&self, tone: Tone) -> Result<()> {
        let rings = match tone {
            Tone::Success => "\x07",
            Tone::Alarm => "\x07\x07\x07",
        };
        let mut err = io::stderr();
        err.write_all(rings.as_bytes())?;
        err.flush()?;
        Ok(())
    }
}

/// Runs a configured shell command per tone, e.g. `paplay done.oga`.
pub struct CommandNotifier {
    pub success: Option<String>,
    pub alarm: Option<String>,
}

impl CommandNotifier {
    fn command_for(&self, tone: Tone) -> Option<&str> {
        match tone {
            Tone::Success => self.success.as_deref(),
            Tone::Alarm => self.alarm.as_deref(),
        }
    }
}

impl Notifier for CommandNotifier {
    fn name(&self) -> &str {
        "command"
    }

    fn is_available(&self) -> bool {
        let configured: Vec<&str> = [self.success.as_deref(), self.alarm.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        !configured.is_empty() && configured.iter().all(|cmd| program_exists(cmd))
    }

    fn play(&self, tone: Tone) -> Result<()> {
        let Some(cmd) = self.command_for(tone) else {
            bail!("no command configured for {:?} tone", tone);
        };
        let status = shell(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("failed to spawn notification command: {}", cmd))?;
        if !status.success() {
            bail!("notification command exited with {}: {}", status, cmd);
        }
        Ok(())
    }
}

fn shell(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd.exe");
        c.args(["/c", cmd]);
        c
    } else {
        let mut c = Command::new("/bin/sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Whether the first word of `cmd` names an executable, either as a path or
/// somewhere on `PATH`.
fn program_exists(cmd: &str) -> bool {
    let Some(program) = cmd.split_whitespace().next() else {
        return false;
    };
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).is_file();
    }
    env::var_os("PATH")
        .map(|paths| {
            env::split_paths(&paths).any(|dir| {
                dir.join(program).is_file() || dir.join(format!("{}.exe", program)).is_file()
            })
        })
        .unwrap_or(false)
}

/// Pick the backend named by `NOTIFY_BACKEND` (`auto`, `bell`, `command`,
/// `none`). `auto` prefers configured commands and falls back to the bell.
pub fn from_config(cfg: &Config) -> Option<Box<dyn Notifier>> {
    let commands = CommandNotifier {
        success: cfg.get("NOTIFY_SUCCESS_CMD"),
        alarm: cfg.get("NOTIFY_ALARM_CMD"),
    };
    let backend = cfg.get("NOTIFY_BACKEND").unwrap_or_else(|| "auto".into());
    match backend.to_ascii_lowercase().as_str() {
        "none" | "off" => None,
        "bell" => Some(Box::new(BellNotifier)),
        "command" => Some(Box::new(commands)),
        other => {
            if other != "auto" {
                tracing::warn!(backend = other, "unknown NOTIFY_BACKEND, using auto");
            }
            if commands.success.is_some() || commands.alarm.is_some() {
                Some(Box::new(commands))
            } else {
                Some(Box::new(BellNotifier))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_unavailable() {
        let n = CommandNotifier {
            success: Some("definitely-not-a-real-player-8121 done.wav".into()),
            alarm: None,
        };
        assert!(!n.is_available());
    }

    #[test]
    fn unconfigured_command_is_unavailable() {
        let n = CommandNotifier { success: None, alarm: None };
        assert!(!n.is_available());
        assert!(n.play(Tone::Success).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_tones_run_through_the_shell() {
        let n = CommandNotifier { success: Some("/bin/sh -c true".into()), alarm: Some("/bin/sh -c false".into()) };
        assert!(n.is_available());
        assert!(n.play(Tone::Success).is_ok());
        assert!(n.play(Tone::Alarm).is_err());
    }

    #[test]
    fn backend_selection() {
        let none = Config::from_rc_text("NOTIFY_BACKEND=none\n");
        assert!(from_config(&none).is_none());

        let bell = Config::from_rc_text("NOTIFY_BACKEND=bell\n");
        assert_eq!(from_config(&bell).map(|n| n.name().to_string()).as_deref(), Some("bell"));

        let auto = Config::from_rc_text("NOTIFY_SUCCESS_CMD=afplay done.aiff\n");
        assert_eq!(from_config(&auto).map(|n| n.name().to_string()).as_deref(), Some("command"));
    }
}
