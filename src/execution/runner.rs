//! Runs one script into a session and reports how it went.

use std::{
    cell::RefCell,
    path::PathBuf,
    rc::Rc,
    time::Instant,
};

use tracing::{debug, info, warn};

use super::{
    engine::{self, SharedTranscript},
    mode::{Banner, ModeProfile},
    ExecutionResult, LoadedScript, NotificationPolicy, RunError, ScriptError, ScriptRef, Session,
    VerbosityMode,
};
use crate::{
    graphics::{GraphicsDevice, NullDevice, RedirectGuard, SharedDevice, TextDevice},
    notify::{Notifier, Tone},
    printer::SharedConsole,
};

/// Runs one script at a time into a caller-owned [`Session`].
pub struct ScriptRunner {
    console: SharedConsole,
    graphics: SharedDevice,
    notifier: Option<Box<dyn Notifier>>,
    base_dir: Option<PathBuf>,
    warned_unavailable: bool,
}

impl ScriptRunner {
    /// Figures go to a text device on the same console; no notifier.
    pub fn new(console: SharedConsole) -> Self {
        let device: Box<dyn GraphicsDevice> = Box::new(TextDevice::new(Rc::clone(&console)));
        Self {
            console,
            graphics: Rc::new(RefCell::new(device)),
            notifier: None,
            base_dir: None,
            warned_unavailable: false,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_graphics(mut self, device: Box<dyn GraphicsDevice>) -> Self {
        self.graphics = Rc::new(RefCell::new(device));
        self
    }

    pub fn with_base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }

    pub fn graphics(&self) -> SharedDevice {
        Rc::clone(&self.graphics)
    }

    /// Parse `mode` then [`run`](Self::run). An unknown mode fails before the
    /// script is even resolved.
    pub fn run_named(
        &mut self,
        session: &mut Session,
        script: impl Into<ScriptRef>,
        mode: &str,
        policy: NotificationPolicy,
    ) -> Result<ExecutionResult, RunError> {
        let mode: VerbosityMode = mode.parse()?;
        self.run(session, script, mode, policy)
    }

    pub fn run(
        &mut self,
        session: &mut Session,
        script: impl Into<ScriptRef>,
        mode: VerbosityMode,
        policy: NotificationPolicy,
    ) -> Result<ExecutionResult, RunError> {
        let script = script.into();
        debug!(script = %script.path().display(), %mode, "validating");
        let loaded = script.load(self.base_dir.as_deref())?;
        let policy = self.effective_policy(policy);
        let profile = mode.profile();

        debug!(script = %loaded.display_name, %mode, "executing");
        let started = Instant::now();
        self.open_banner(profile, &loaded.display_name);
        if profile.echo_source {
            self.echo(&loaded.source);
        }

        let transcript = SharedTranscript::default();
        let outcome = self.execute(session, &loaded, profile, &transcript);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(device) => {
                self.close_banner(profile, &loaded.display_name);
                self.console.borrow_mut().flush();
                info!(script = %loaded.display_name, %mode, elapsed_ms, "script finished");
                if policy.on_success {
                    self.signal(Tone::Success);
                }
                let transcript = std::mem::take(&mut *transcript.borrow_mut());
                Ok(ExecutionResult {
                    script: loaded.display_name,
                    mode,
                    output: transcript.output,
                    messages: transcript.messages,
                    plots: transcript.figures,
                    graphics_device: device,
                    elapsed_ms,
                })
            }
            Err(source) => {
                self.console
                    .borrow_mut()
                    .err(&format!("Failed {}: {}", loaded.display_name, source));
                self.console.borrow_mut().flush();
                warn!(script = %loaded.display_name, %mode, error = %source, "script failed");
                if policy.on_error {
                    self.signal(Tone::Alarm);
                }
                Err(RunError::Execution { script: loaded.display_name, source })
            }
        }
    }

    /// Compile and run against the session. Returns the name of the device
    /// figures went to. Figures go to the null sink whenever script output is
    /// hidden, and the sink is released before this returns, on either path.
    fn execute(
        &self,
        session: &mut Session,
        loaded: &LoadedScript,
        profile: ModeProfile,
        transcript: &SharedTranscript,
    ) -> Result<String, ScriptError> {
        let _redirect = (profile.null_graphics || !profile.show_output)
            .then(|| RedirectGuard::install(&self.graphics, Box::new(NullDevice)));
        let device = self.graphics.borrow().name().to_string();

        let engine = engine::build_engine(profile, transcript, &self.console, &self.graphics);
        let ast = engine
            .compile(&loaded.source)
            .map_err(|e| engine::from_parse_error(&e))?;

        let runnable = session.lib().merge(&ast);
        let result = engine.run_ast_with_scope(session.scope_mut(), &runnable);
        session.absorb_functions(&ast);
        session.collapse_shadowed();

        let is_defined = |name: &str| engine::is_registered(name) || session.has_function(name);
        result.map_err(|e| engine::from_eval_error(&e, &is_defined))?;
        Ok(device)
    }

    fn effective_policy(&mut self, requested: NotificationPolicy) -> NotificationPolicy {
        if !requested.any() {
            return requested;
        }
        if self.notifier.as_ref().is_some_and(|n| n.is_available()) {
            return requested;
        }
        if !self.warned_unavailable {
            self.warned_unavailable = true;
            warn!("notification backend unavailable; success and error tones disabled");
            self.console
                .borrow_mut()
                .err("Warning: notification backend unavailable; tones disabled");
        }
        NotificationPolicy::default()
    }

    /// Best effort: a failing backend is logged, never raised.
    fn signal(&self, tone: Tone) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.play(tone) {
            warn!(backend = notifier.name(), ?tone, error = %e, "notification failed");
        }
    }

    fn open_banner(&self, profile: ModeProfile, name: &str) {
        let line = match profile.banner {
            Banner::StartEnd | Banner::StartOnly => format!("Running {}", name),
            Banner::LoadingDone => format!("Loading {}...", name),
        };
        self.console.borrow_mut().banner(&line);
    }

    fn close_banner(&self, profile: ModeProfile, name: &str) {
        let line = match profile.banner {
            Banner::StartEnd => format!("Finished {}", name),
            Banner::LoadingDone => "Done".to_string(),
            Banner::StartOnly => return,
        };
        self.console.borrow_mut().banner(&line);
    }

    fn echo(&self, source: &str) {
        let mut console = self.console.borrow_mut();
        for line in source.lines() {
            if line.trim().is_empty() {
                console.out(">");
            } else {
                console.out(&format!("> {}", line));
            }
        }
    }
}
