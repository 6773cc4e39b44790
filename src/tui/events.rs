//! Custom event types for the workspace.

use crossterm::event::KeyEvent;

/// Events that can occur in the workspace
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// Terminal was resized
    Resize,
    /// Initial editor contents finished loading; `error` is set when the
    /// file could not be read and the buffer starts empty.
    EditorReady { text: String, error: Option<String> },
    /// A run settled and its outcome has been rendered
    RunFinished,
}
