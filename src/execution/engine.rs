//! Rhai engine wiring: output channels, graphics, and error mapping.

use std::{cell::RefCell, rc::Rc};

use rhai::{Array, Dynamic, Engine, EvalAltResult, ParseError};

use super::{mode::ModeProfile, ScriptError};
use crate::{
    graphics::{Figure, SharedDevice},
    printer::SharedConsole,
};

/// Everything the script emitted, whether or not it was shown.
#[derive(Debug, Default)]
pub struct Transcript {
    pub output: Vec<String>,
    pub messages: Vec<String>,
    pub figures: Vec<Figure>,
}

pub type SharedTranscript = Rc<RefCell<Transcript>>;

/// Build an engine whose `print`, `debug`, `message`, `warning` and `plot`
/// record into `transcript` and reach `console` only when the profile shows
/// that channel.
pub fn build_engine(
    profile: ModeProfile,
    transcript: &SharedTranscript,
    console: &SharedConsole,
    graphics: &SharedDevice,
) -> Engine {
    let mut engine = Engine::new();

    let output_console = profile.show_output.then(|| Rc::clone(console));
    let message_console = profile.show_messages.then(|| Rc::clone(console));

    let t = Rc::clone(transcript);
    let c = output_console;
    engine.on_print(move |text| {
        t.borrow_mut().output.push(text.to_string());
        if let Some(c) = &c {
            c.borrow_mut().out(text);
        }
    });

    let messages = MessageSink { transcript: Rc::clone(transcript), console: message_console };

    let sink = messages.clone();
    engine.on_debug(move |text, _source, _pos| sink.emit(text.to_string()));

    let sink = messages.clone();
    engine.register_fn("message", move |value: Dynamic| sink.emit(value.to_string()));

    let sink = messages;
    engine.register_fn("warning", move |value: Dynamic| sink.emit(format!("Warning: {}", value)));

    let t = Rc::clone(transcript);
    let g = Rc::clone(graphics);
    engine.register_fn("plot", move |title: Dynamic| {
        let figure = Figure { title: title.to_string(), values: Vec::new() };
        g.borrow_mut().render(&figure);
        t.borrow_mut().figures.push(figure);
    });

    let t = Rc::clone(transcript);
    let g = Rc::clone(graphics);
    engine.register_fn("plot", move |title: Dynamic, values: Array| {
        let figure = Figure { title: title.to_string(), values: numeric_values(&values) };
        g.borrow_mut().render(&figure);
        t.borrow_mut().figures.push(figure);
    });

    engine
}

/// The message channel shared by `debug`, `message` and `warning`.
#[derive(Clone)]
struct MessageSink {
    transcript: SharedTranscript,
    console: Option<SharedConsole>,
}

impl MessageSink {
    fn emit(&self, line: String) {
        if let Some(c) = &self.console {
            c.borrow_mut().err(&line);
        }
        self.transcript.borrow_mut().messages.push(line);
    }
}

fn numeric_values(values: &Array) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| {
            v.as_float()
                .ok()
                .or_else(|| v.as_int().ok().map(|i| i as f64))
        })
        .collect()
}

pub fn from_parse_error(err: &ParseError) -> ScriptError {
    ScriptError::Syntax { message: err.0.to_string(), line: err.1.line() }
}

/// Map a rhai failure to a [`ScriptError`]. `is_defined` says whether a
/// function name exists in the session or on the engine. A call that names
/// a defined function, or an operator, failed on its argument types and is a
/// runtime error rather than a missing object.
pub fn from_eval_error(err: &EvalAltResult, is_defined: &dyn Fn(&str) -> bool) -> ScriptError {
    match err {
        EvalAltResult::ErrorVariableNotFound(name, pos) => ScriptError::NameResolution {
            name: name.clone(),
            line: pos.line(),
        },
        EvalAltResult::ErrorFunctionNotFound(signature, pos) => {
            let name = function_name(signature);
            if is_identifier(&name) && !is_defined(&name) {
                ScriptError::NameResolution { name, line: pos.line() }
            } else {
                ScriptError::Runtime { message: err.to_string(), line: pos.line() }
            }
        }
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => from_eval_error(inner, is_defined),
        EvalAltResult::ErrorParsing(kind, pos) => ScriptError::Syntax {
            message: kind.to_string(),
            line: pos.line(),
        },
        EvalAltResult::ErrorRuntime(value, pos) => ScriptError::Runtime {
            message: value.to_string(),
            line: pos.line(),
        },
        other => ScriptError::Runtime {
            message: other.to_string(),
            line: other.position().line(),
        },
    }
}

/// Functions [`build_engine`] registers on top of rhai's own.
pub fn is_registered(name: &str) -> bool {
    REGISTERED.contains(&name)
}

const REGISTERED: &[&str] = &["message", "warning", "plot"];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// `mean (i64, i64)` -> `mean`
fn function_name(signature: &str) -> String {
    signature
        .split_once(" (")
        .map(|(name, _)| name)
        .unwrap_or(signature)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        execution::VerbosityMode,
        graphics::{GraphicsDevice, NullDevice},
        printer::{BufferConsole, Stream},
    };

    fn harness(mode: VerbosityMode) -> (Engine, SharedTranscript, Rc<RefCell<BufferConsole>>) {
        let buf = BufferConsole::shared();
        let console: SharedConsole = buf.clone();
        let device: Box<dyn GraphicsDevice> = Box::new(NullDevice);
        let graphics: SharedDevice = Rc::new(RefCell::new(device));
        let transcript = SharedTranscript::default();
        let engine = build_engine(mode.profile(), &transcript, &console, &graphics);
        (engine, transcript, buf)
    }

    #[test]
    fn print_is_shown_and_recorded_in_minimal() {
        let (engine, transcript, buf) = harness(VerbosityMode::Minimal);
        engine.run(r#"print("hello"); message("note"); warning("careful");"#).unwrap();

        let t = transcript.borrow();
        assert_eq!(t.output, vec!["hello"]);
        assert_eq!(t.messages, vec!["note", "Warning: careful"]);
        assert_eq!(buf.borrow().stream(Stream::Out), vec!["hello"]);
        assert!(buf.borrow().stream(Stream::Err).is_empty());
    }

    #[test]
    fn messages_reach_stderr_in_full() {
        let (engine, _transcript, buf) = harness(VerbosityMode::Full);
        engine.run(r#"warning("low battery on tag 7");"#).unwrap();
        assert_eq!(buf.borrow().stream(Stream::Err), vec!["Warning: low battery on tag 7"]);
    }

    #[test]
    fn plot_records_numeric_values() {
        let (engine, transcript, _buf) = harness(VerbosityMode::Debug);
        engine.run(r#"plot("depth", [1, 2.5, "x", 4]); plot("empty");"#).unwrap();
        let t = transcript.borrow();
        assert_eq!(t.figures.len(), 2);
        assert_eq!(t.figures[0].values, vec![1.0, 2.5, 4.0]);
        assert_eq!(t.figures[1].title, "empty");
    }

    #[test]
    fn maps_missing_variable_to_name_resolution() {
        let engine = Engine::new();
        let err = engine.run("let y = undefined_thing + 1;").unwrap_err();
        match from_eval_error(&err, &is_registered) {
            ScriptError::NameResolution { name, line } => {
                assert_eq!(name, "undefined_thing");
                assert_eq!(line, Some(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn maps_missing_function_to_name_resolution() {
        let engine = Engine::new();
        let err = engine.run("let y = smooth_track(3);").unwrap_err();
        assert!(matches!(
            from_eval_error(&err, &is_registered),
            ScriptError::NameResolution { ref name, .. } if name == "smooth_track"
        ));
    }

    #[test]
    fn maps_throw_to_runtime_with_message() {
        let engine = Engine::new();
        let err = engine.run("\nthrow \"receiver offline\";").unwrap_err();
        assert_eq!(
            from_eval_error(&err, &is_registered),
            ScriptError::Runtime { message: "receiver offline".into(), line: Some(2) }
        );
    }

    #[test]
    fn maps_operator_mismatch_to_runtime() {
        let engine = Engine::new();
        let err = engine.run("let a = true - 1;").unwrap_err();
        match from_eval_error(&err, &is_registered) {
            ScriptError::Runtime { message, line } => {
                assert!(message.contains("-"), "{}", message);
                assert_eq!(line, Some(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn maps_wrong_arguments_to_defined_function_to_runtime() {
        let (engine, _transcript, _buf) = harness(VerbosityMode::Minimal);
        let err = engine.run("plot(1, 2, 3);").unwrap_err();
        assert!(matches!(from_eval_error(&err, &is_registered), ScriptError::Runtime { .. }));

        let err = engine.run("fn scale(x) { x * 2 }\nscale(1, 2);").unwrap_err();
        let in_script = |name: &str| name == "scale";
        assert!(matches!(from_eval_error(&err, &in_script), ScriptError::Runtime { line: Some(2), .. }));
    }

    #[test]
    fn maps_parse_errors_to_syntax() {
        let engine = Engine::new();
        let err = engine.compile("let = ;").unwrap_err();
        assert!(matches!(from_parse_error(&err), ScriptError::Syntax { line: Some(1), .. }));
    }

    #[test]
    fn strips_function_signature() {
        assert_eq!(function_name("mean (i64, i64)"), "mean");
        assert_eq!(function_name("mean"), "mean");
    }

    #[test]
    fn identifiers_exclude_operators() {
        assert!(is_identifier("smooth_track"));
        assert!(is_identifier("_tmp2"));
        assert!(!is_identifier("-"));
        assert!(!is_identifier("=="));
        assert!(!is_identifier(""));
    }
}
