use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "script-runner", about = "Run analysis scripts into one shared session", version)]
#[command(group(ArgGroup::new("success_switch").args(["notify_success", "no_notify_success"]).multiple(false)))]
#[command(group(ArgGroup::new("error_switch").args(["notify_error", "no_notify_error"]).multiple(false)))]
pub struct Cli {
    /// Scripts to run, in order. Execution stops at the first failure.
    #[arg(value_name = "SCRIPT", required_unless_present = "list_modes")]
    pub scripts: Vec<String>,

    /// Verbosity mode: debug, full, minimal, silent or code_only.
    ///
    /// Falls back to DEFAULT_MODE from the config, then `minimal`.
    #[arg(short = 'm', long)]
    pub mode: Option<String>,

    /// Play the completion tone after each successful script.
    #[arg(long = "notify-success")]
    pub notify_success: bool,
    /// Never play the completion tone.
    #[arg(long = "no-notify-success")]
    pub no_notify_success: bool,

    /// Play the alarm tone when a script fails.
    #[arg(long = "notify-error")]
    pub notify_error: bool,
    /// Never play the alarm tone.
    #[arg(long = "no-notify-error")]
    pub no_notify_error: bool,

    /// Seed a session variable before the first script (NAME=VALUE).
    /// Can be used multiple times: --set site=A12 --set threshold=0.8
    #[arg(long = "set", value_name = "NAME=VALUE", action = clap::ArgAction::Append)]
    pub set: Vec<String>,

    /// Print session variables after the last script.
    #[arg(long = "show-vars")]
    pub show_vars: bool,

    /// Print a JSON report of every completed script.
    #[arg(long)]
    pub report: bool,

    /// List the verbosity modes and what each one shows.
    #[arg(long = "list-modes")]
    pub list_modes: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
