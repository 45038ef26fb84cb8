mod cli;

use std::{cell::RefCell, process::ExitCode, rc::Rc};

use anyhow::{anyhow, Context, Result};
use script_runner::{
    config::Config,
    notify,
    printer::{SharedConsole, TerminalConsole},
    ExecutionResult, NotificationPolicy, RunError, ScriptRunner, Session, VerbosityMode,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();

    // Load config
    let cfg = Config::load();
    init_tracing(&cfg);

    if args.list_modes {
        for mode in VerbosityMode::ALL {
            let p = mode.profile();
            println!(
                "{:<10} echo={:<5} output={:<5} messages={:<5} null_graphics={:<5} banner={:?}",
                mode.as_str(),
                p.echo_source,
                p.show_output,
                p.show_messages,
                p.null_graphics,
                p.banner
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Mode: CLI overrides config; validated per run
    let mode = args.mode.clone().unwrap_or_else(|| cfg.default_mode());

    // Effective notification switches with config defaults
    let on_success = if args.no_notify_success {
        false
    } else if args.notify_success {
        true
    } else {
        cfg.get_bool("NOTIFY_ON_SUCCESS")
    };
    let on_error = if args.no_notify_error {
        false
    } else if args.notify_error {
        true
    } else {
        cfg.get_bool("NOTIFY_ON_ERROR")
    };
    let policy = NotificationPolicy::new(on_success, on_error);

    let console: SharedConsole = Rc::new(RefCell::new(TerminalConsole::from_config(&cfg)));
    let mut runner = ScriptRunner::new(console).with_base_dir(cfg.script_dir());
    if let Some(notifier) = notify::from_config(&cfg) {
        runner = runner.with_notifier(notifier);
    }

    let mut session = Session::new();
    for assignment in &args.set {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("--set expects NAME=VALUE, got {:?}", assignment))?;
        session.set_parsed(name.trim(), value);
    }

    let mut results: Vec<ExecutionResult> = Vec::with_capacity(args.scripts.len());
    let mut status = ExitCode::SUCCESS;
    for script in &args.scripts {
        match runner.run_named(&mut session, script, &mode, policy) {
            Ok(result) => results.push(result),
            Err(e) if already_reported(&e) => {
                status = ExitCode::FAILURE;
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if args.show_vars {
        for (name, value) in session.variables() {
            println!("{} = {}", name, value);
        }
    }
    if args.report {
        let json = serde_json::to_string_pretty(&results).context("serializing run report")?;
        println!("{}", json);
    }
    Ok(status)
}

/// The runner prints `Failed <script>: <cause>` itself before returning an
/// execution failure.
fn already_reported(err: &RunError) -> bool {
    matches!(err, RunError::Execution { .. })
}

fn init_tracing(cfg: &Config) {
    let fallback = cfg.get("LOG_LEVEL").unwrap_or_else(|| "warn".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
