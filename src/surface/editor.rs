//! Editor surfaces: the workspace's in-memory buffer and the file-backed
//! source used by one-shot runs.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::Result;

use super::{lock, EditorSurface};
use crate::utils::read_source;

/// In-memory source buffer. Starts uninitialized; becomes ready once
/// [`EditorBuffer::load`] has been called with the initial contents.
#[derive(Debug, Default)]
pub struct EditorBuffer {
    text: Mutex<Option<String>>,
    layout_pending: AtomicBool,
}

impl EditorBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, text: String) {
        *lock(&self.text) = Some(text);
    }

    pub fn is_ready(&self) -> bool {
        lock(&self.text).is_some()
    }

    /// Apply `f` to the buffer. Returns `None` (and leaves the buffer alone)
    /// while it is not ready.
    pub fn edit<R>(&self, f: impl FnOnce(&mut String) -> R) -> Option<R> {
        lock(&self.text).as_mut().map(f)
    }

    /// Read the buffer without cloning it.
    pub fn with_text<R>(&self, f: impl FnOnce(&str) -> R) -> Option<R> {
        lock(&self.text).as_deref().map(f)
    }

    /// Consume a pending layout request, if any.
    pub fn take_layout_request(&self) -> bool {
        self.layout_pending.swap(false, Ordering::SeqCst)
    }
}

impl EditorSurface for EditorBuffer {
    fn value(&self) -> Option<String> {
        lock(&self.text).clone()
    }

    fn layout(&self) {
        self.layout_pending.store(true, Ordering::SeqCst);
    }
}

/// Where a one-shot run reads its code from.
#[derive(Debug)]
pub enum FileEditor {
    /// Re-read on every `value()` call.
    File(PathBuf),
    /// Stdin can only be read once; it is captured when the editor is opened.
    Stdin(String),
}

impl FileEditor {
    /// `-` reads standard input.
    pub fn open(source: &str) -> Result<Self> {
        if source == "-" {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(Self::Stdin(buf));
        }
        // Fail early with a readable error instead of a refused run.
        read_source(Path::new(source))?;
        Ok(Self::File(PathBuf::from(source)))
    }
}

impl EditorSurface for FileEditor {
    fn value(&self) -> Option<String> {
        match self {
            Self::File(path) => match fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(err) => {
                    tracing::error!(path = %path.display(), error = %err, "cannot read source file");
                    None
                }
            },
            Self::Stdin(text) => Some(text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn buffer_is_not_ready_until_loaded() {
        let editor = EditorBuffer::new();
        assert!(!editor.is_ready());
        assert_eq!(editor.value(), None);
        assert_eq!(editor.edit(|t| t.push('x')), None);

        editor.load("print(1)".into());
        assert!(editor.is_ready());
        assert_eq!(editor.value().as_deref(), Some("print(1)"));
    }

    #[test]
    fn edits_apply_to_loaded_buffer() {
        let editor = EditorBuffer::new();
        editor.load(String::new());
        editor.edit(|t| t.push_str("x = 1"));
        assert_eq!(editor.with_text(|t| t.len()), Some(5));
    }

    #[test]
    fn layout_requests_are_consumed_once() {
        let editor = EditorBuffer::new();
        assert!(!editor.take_layout_request());
        editor.layout();
        editor.layout();
        assert!(editor.take_layout_request());
        assert!(!editor.take_layout_request());
    }

    #[test]
    fn file_editor_reads_fresh_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a = 1").unwrap();
        let editor = FileEditor::open(file.path().to_str().unwrap()).unwrap();
        assert_eq!(editor.value().as_deref(), Some("a = 1"));

        fs::write(file.path(), "a = 2").unwrap();
        assert_eq!(editor.value().as_deref(), Some("a = 2"));
    }

    #[test]
    fn file_editor_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.py");
        assert!(FileEditor::open(missing.to_str().unwrap()).is_err());
    }
}
