//! Capabilities the run console depends on but does not implement: a source
//! buffer to read from and a line-oriented terminal to write to.

use std::sync::{Arc, Mutex, MutexGuard};

pub mod editor;
pub mod terminal;

pub use editor::{EditorBuffer, FileEditor};
pub use terminal::TerminalBuffer;

/// Read-only view of the editor, as far as the console is concerned.
pub trait EditorSurface: Send + Sync {
    /// Current buffer contents, or `None` while the editor has not finished
    /// initializing (or cannot provide its contents right now).
    fn value(&self) -> Option<String>;

    /// Recompute geometry after the surrounding layout changed.
    fn layout(&self) {}
}

/// Append-only display that renders one line per `writeln` call.
pub trait OutputSurface: Send {
    fn writeln(&mut self, line: &str);
    fn clear(&mut self);
}

/// The output surface is shared between the console (writes) and the panel
/// controller (clear).
pub type SharedOutput<O> = Arc<Mutex<O>>;

pub fn shared<O: OutputSurface>(output: O) -> SharedOutput<O> {
    Arc::new(Mutex::new(output))
}

/// Lock a shared surface. A panic while writing leaves plain text behind, so a
/// poisoned lock is still usable.
pub fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
