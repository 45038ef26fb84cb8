//! Console sinks: colored terminal output and an in-memory buffer.

use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

use owo_colors::OwoColorize;

use crate::config::Config;

/// Destination for everything the runner writes: banners, echoed source,
/// script output and warnings.
pub trait Console {
    fn out(&mut self, line: &str);
    fn err(&mut self, line: &str);

    /// Runner progress lines. Plain `out` unless the console styles them.
    fn banner(&mut self, line: &str) {
        self.out(line);
    }

    fn flush(&mut self) {}
}

pub type SharedConsole = Rc<RefCell<dyn Console>>;

pub struct TerminalConsole {
    pub color: Option<&'static str>,
}

impl TerminalConsole {
    pub fn from_config(cfg: &Config) -> Self {
        let color = match cfg.get("BANNER_COLOR").as_deref() {
            Some("green") => Some("green"),
            Some("cyan") => Some("cyan"),
            Some("magenta") => Some("magenta"),
            Some("yellow") => Some("yellow"),
            _ => None,
        };
        Self { color }
    }
}

impl Console for TerminalConsole {
    fn out(&mut self, line: &str) {
        println!("{}", line);
    }

    fn err(&mut self, line: &str) {
        eprintln!("{}", line);
    }

    fn banner(&mut self, line: &str) {
        match self.color {
            Some("green") => println!("{}", line.green()),
            Some("cyan") => println!("{}", line.cyan()),
            Some("magenta") => println!("{}", line.magenta()),
            Some("yellow") => println!("{}", line.yellow()),
            _ => println!("{}", line),
        }
    }

    fn flush(&mut self) {
        io::stdout().flush().ok();
        io::stderr().flush().ok();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Out,
    Err,
    Banner,
}

/// Records lines in order. Keep an `Rc` clone to inspect what was written.
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Vec<(Stream, String)>,
}

impl BufferConsole {
    pub fn shared() -> Rc<RefCell<BufferConsole>> {
        Rc::new(RefCell::new(BufferConsole::default()))
    }

    pub fn lines(&self) -> &[(Stream, String)] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|(_, l)| l.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn stream(&self, stream: Stream) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, l)| l.as_str())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|(_, l)| l.contains(needle))
    }
}

impl Console for BufferConsole {
    fn out(&mut self, line: &str) {
        self.lines.push((Stream::Out, line.to_string()));
    }

    fn err(&mut self, line: &str) {
        self.lines.push((Stream::Err, line.to_string()));
    }

    fn banner(&mut self, line: &str) {
        self.lines.push((Stream::Banner, line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_order_and_streams() {
        let buf = BufferConsole::shared();
        let console: SharedConsole = buf.clone();
        console.borrow_mut().banner("start");
        console.borrow_mut().out("value");
        console.borrow_mut().err("careful");

        let buf = buf.borrow();
        assert_eq!(buf.text(), "start\nvalue\ncareful");
        assert_eq!(buf.stream(Stream::Err), vec!["careful"]);
        assert!(buf.contains("val"));
    }

    #[test]
    fn unknown_banner_color_is_plain() {
        let cfg = Config::from_rc_text("BANNER_COLOR=plaid\n");
        assert_eq!(TerminalConsole::from_config(&cfg).color, None);
    }
}
