//! Graphics devices that script figures are rendered to.

use std::{cell::RefCell, rc::Rc};

use serde::Serialize;

use crate::printer::SharedConsole;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub values: Vec<f64>,
}

impl Figure {
    pub fn summary(&self) -> String {
        if self.values.is_empty() {
            return format!("[figure] {}", self.title);
        }
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        format!(
            "[figure] {} ({} points, range {}..{})",
            self.title,
            self.values.len(),
            min,
            max
        )
    }
}

pub trait GraphicsDevice {
    fn name(&self) -> &str;
    fn render(&mut self, figure: &Figure);
}

pub type SharedDevice = Rc<RefCell<Box<dyn GraphicsDevice>>>;

/// Writes a one-line summary of each figure to the console.
pub struct TextDevice {
    console: SharedConsole,
}

impl TextDevice {
    pub fn new(console: SharedConsole) -> Self {
        Self { console }
    }
}

impl GraphicsDevice for TextDevice {
    fn name(&self) -> &str {
        "text"
    }

    fn render(&mut self, figure: &Figure) {
        self.console.borrow_mut().out(&figure.summary());
    }
}

/// Discards everything.
pub struct NullDevice;

impl GraphicsDevice for NullDevice {
    fn name(&self) -> &str {
        "null"
    }

    fn render(&mut self, _figure: &Figure) {}
}

/// Swaps a device into the shared slot; the previous device is put back on
/// drop, whichever way the guarded scope exits.
pub struct RedirectGuard {
    slot: SharedDevice,
    previous: Option<Box<dyn GraphicsDevice>>,
}

impl RedirectGuard {
    pub fn install(slot: &SharedDevice, device: Box<dyn GraphicsDevice>) -> Self {
        let previous = std::mem::replace(&mut *slot.borrow_mut(), device);
        tracing::debug!(device = previous.name(), "graphics redirected");
        Self { slot: Rc::clone(slot), previous: Some(previous) }
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.slot.borrow_mut() = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::BufferConsole;

    fn text_slot() -> (Rc<RefCell<BufferConsole>>, SharedDevice) {
        let buf = BufferConsole::shared();
        let device: Box<dyn GraphicsDevice> = Box::new(TextDevice::new(buf.clone()));
        (buf, Rc::new(RefCell::new(device)))
    }

    #[test]
    fn summary_reports_range() {
        let fig = Figure { title: "depth".into(), values: vec![3.0, -1.5, 8.0] };
        assert_eq!(fig.summary(), "[figure] depth (3 points, range -1.5..8)");
        let bare = Figure { title: "map".into(), values: vec![] };
        assert_eq!(bare.summary(), "[figure] map");
    }

    #[test]
    fn guard_restores_previous_device() {
        let (buf, slot) = text_slot();
        {
            let _guard = RedirectGuard::install(&slot, Box::new(NullDevice));
            assert_eq!(slot.borrow().name(), "null");
            slot.borrow_mut().render(&Figure { title: "hidden".into(), values: vec![] });
        }
        assert_eq!(slot.borrow().name(), "text");
        slot.borrow_mut().render(&Figure { title: "shown".into(), values: vec![] });
        assert_eq!(buf.borrow().text(), "[figure] shown");
    }

    #[test]
    fn guard_restores_on_unwind() {
        let (_buf, slot) = text_slot();
        let inner = Rc::clone(&slot);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = RedirectGuard::install(&inner, Box::new(NullDevice));
            panic!("script blew up");
        }));
        assert!(outcome.is_err());
        assert_eq!(slot.borrow().name(), "text");
    }
}
