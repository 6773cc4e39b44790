//! Workspace application state: editor cursor and scrolling, output panel
//! scrolling, status line.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use crate::surface::{EditorBuffer, EditorSurface};
use crate::utils::unicode::{char_to_byte_index, display_width, next_boundary, prev_boundary};

const TAB: &str = "    ";

/// Application state for the workspace
#[derive(Debug)]
pub struct App {
    /// File backing the editor, if any
    pub file_path: Option<PathBuf>,
    /// Shared source buffer (also read by the run console)
    pub editor: Arc<EditorBuffer>,
    /// Cursor position in the buffer (byte index)
    pub cursor: usize,
    /// First visible editor line
    pub editor_scroll: usize,
    /// Editor rows available at the last layout
    pub editor_height: usize,
    /// Output lines scrolled up from the bottom (0 = follow new output)
    pub output_scroll: usize,
    /// Unsaved changes
    pub dirty: bool,
    /// Why the file could not be loaded. Saving over it is refused.
    pub load_error: Option<String>,
    /// Status message to display
    pub status_message: String,
    /// Whether to show help
    pub show_help: bool,
    /// Timestamp of last Ctrl+C press for double Ctrl+C detection
    pub last_ctrl_c_time: Option<Instant>,
}

/// Cursor location in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub line: usize,
    /// Column in chars
    pub col: usize,
    /// Column in terminal cells
    pub width: usize,
}

impl App {
    pub fn new(file_path: Option<PathBuf>, editor: Arc<EditorBuffer>) -> Self {
        Self {
            file_path,
            editor,
            cursor: 0,
            editor_scroll: 0,
            editor_height: 1,
            output_scroll: 0,
            dirty: false,
            load_error: None,
            status_message: "Loading editor...".to_string(),
            show_help: false,
            last_ctrl_c_time: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.editor.is_ready()
    }

    pub fn title(&self) -> String {
        let name = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        if self.dirty {
            format!("{name} *")
        } else {
            name
        }
    }

    /// Editor finished its initial load.
    pub fn editor_loaded(&mut self, text: String, error: Option<String>) {
        self.editor.load(text);
        self.cursor = 0;
        self.editor_scroll = 0;
        self.dirty = false;
        self.status_message = match &error {
            Some(err) => format!("Could not open file (saving disabled): {err}"),
            None => "Ready".to_string(),
        };
        self.load_error = error;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ----- Cursor geometry -----

    pub fn cursor_pos(&self) -> CursorPos {
        self.editor
            .with_text(|text| {
                let cursor = self.cursor.min(text.len());
                let start = line_start(text, cursor);
                let before = &text[start..cursor];
                CursorPos {
                    line: text[..cursor].matches('\n').count(),
                    col: before.chars().count(),
                    width: display_width(before),
                }
            })
            .unwrap_or(CursorPos { line: 0, col: 0, width: 0 })
    }

    /// Record the editor's visible height and keep the cursor in view.
    pub fn fit_editor(&mut self, height: usize) {
        self.editor_height = height.max(1);
        self.ensure_cursor_visible();
    }

    pub fn ensure_cursor_visible(&mut self) {
        let line = self.cursor_pos().line;
        if line < self.editor_scroll {
            self.editor_scroll = line;
        } else if line >= self.editor_scroll + self.editor_height {
            self.editor_scroll = line + 1 - self.editor_height;
        }
    }

    // ----- Editing -----

    fn apply(&mut self, f: impl FnOnce(&mut String, usize) -> usize) {
        let cursor = self.cursor;
        let next = self.editor.edit(|text| {
            let at = cursor.min(text.len());
            f(text, at)
        });
        if let Some(next) = next {
            self.cursor = next;
            self.dirty = true;
            self.ensure_cursor_visible();
        }
    }

    fn move_to(&mut self, f: impl FnOnce(&str, usize) -> usize) {
        let cursor = self.cursor;
        if let Some(next) = self.editor.with_text(|text| f(text, cursor.min(text.len()))) {
            self.cursor = next;
            self.ensure_cursor_visible();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.apply(|text, cursor| {
            text.insert(cursor, c);
            cursor + c.len_utf8()
        });
    }

    /// Insert pasted text; `\r\n` and lone `\r` become `\n`.
    pub fn insert_str(&mut self, s: &str) {
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        self.apply(|text, cursor| {
            text.insert_str(cursor, &normalized);
            cursor + normalized.len()
        });
    }

    pub fn insert_tab(&mut self) {
        self.insert_str(TAB);
    }

    /// New line keeping the current line's leading whitespace.
    pub fn newline(&mut self) {
        self.apply(|text, cursor| {
            let start = line_start(text, cursor);
            let indent: String = text[start..cursor]
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            let inserted = format!("\n{indent}");
            text.insert_str(cursor, &inserted);
            cursor + inserted.len()
        });
    }

    pub fn backspace(&mut self) {
        self.apply(|text, cursor| {
            if cursor == 0 {
                return 0;
            }
            let prev = prev_boundary(text, cursor);
            text.replace_range(prev..cursor, "");
            prev
        });
    }

    pub fn delete(&mut self) {
        self.apply(|text, cursor| {
            let next = next_boundary(text, cursor);
            text.replace_range(cursor..next, "");
            cursor
        });
    }

    // ----- Cursor movement -----

    pub fn move_cursor_left(&mut self) {
        self.move_to(prev_boundary);
    }

    pub fn move_cursor_right(&mut self) {
        self.move_to(next_boundary);
    }

    pub fn move_cursor_home(&mut self) {
        self.move_to(line_start);
    }

    pub fn move_cursor_end(&mut self) {
        self.move_to(line_end);
    }

    pub fn move_cursor_up(&mut self) {
        self.move_to(|text, cursor| {
            let start = line_start(text, cursor);
            if start == 0 {
                return 0;
            }
            let col = text[start..cursor].chars().count();
            let prev_end = start - 1;
            let prev_start = line_start(text, prev_end);
            prev_start + char_to_byte_index(&text[prev_start..prev_end], col)
        });
    }

    pub fn move_cursor_down(&mut self) {
        self.move_to(|text, cursor| {
            let end = line_end(text, cursor);
            if end == text.len() {
                return end;
            }
            let col = text[line_start(text, cursor)..cursor].chars().count();
            let next_start = end + 1;
            let next_end = line_end(text, next_start);
            next_start + char_to_byte_index(&text[next_start..next_end], col)
        });
    }

    pub fn page_up(&mut self) {
        for _ in 0..self.editor_height {
            self.move_cursor_up();
        }
    }

    pub fn page_down(&mut self) {
        for _ in 0..self.editor_height {
            self.move_cursor_down();
        }
    }

    // ----- Output panel -----

    pub fn scroll_output_up(&mut self, lines: usize) {
        self.output_scroll = self.output_scroll.saturating_add(lines);
    }

    pub fn scroll_output_down(&mut self, lines: usize) {
        self.output_scroll = self.output_scroll.saturating_sub(lines);
    }

    pub fn scroll_output_to_bottom(&mut self) {
        self.output_scroll = 0;
    }

    // ----- File -----

    pub fn save(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            bail!("no file to save to; start with `coderun edit <FILE>`");
        };
        if let Some(err) = &self.load_error {
            bail!("refusing to overwrite {}: it could not be read ({err})", path.display());
        }
        let Some(text) = self.editor.value() else {
            bail!("editor is still loading");
        };
        std::fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
        self.dirty = false;
        Ok(path)
    }

    /// Handle Ctrl+C press and detect double press for quit.
    /// Returns true if should quit (double Ctrl+C), false otherwise
    pub fn handle_ctrl_c(&mut self) -> bool {
        const DOUBLE_CTRL_C_TIMEOUT: Duration = Duration::from_millis(500);

        let now = Instant::now();

        if let Some(last_time) = self.last_ctrl_c_time {
            if now.duration_since(last_time) <= DOUBLE_CTRL_C_TIMEOUT {
                self.last_ctrl_c_time = None;
                return true;
            }
        }

        self.last_ctrl_c_time = Some(now);
        self.status_message = "Press Ctrl+C again to quit".to_string();
        false
    }
}

fn line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(text: &str, cursor: usize) -> usize {
    text[cursor..].find('\n').map(|i| cursor + i).unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(text: &str) -> App {
        let editor = Arc::new(EditorBuffer::new());
        let mut app = App::new(None, editor);
        app.editor_loaded(text.to_string(), None);
        app
    }

    fn text(app: &App) -> String {
        app.editor.with_text(str::to_string).unwrap()
    }

    #[test]
    fn edits_are_ignored_until_loaded() {
        let mut app = App::new(None, Arc::new(EditorBuffer::new()));
        app.insert_char('x');
        assert!(!app.is_ready());
        assert_eq!(app.cursor, 0);
        assert!(!app.dirty);
    }

    #[test]
    fn typing_and_backspace() {
        let mut app = app_with("");
        for c in "prinx".chars() {
            app.insert_char(c);
        }
        app.backspace();
        app.insert_char('t');
        assert_eq!(text(&app), "print");
        assert!(app.dirty);
        assert_eq!(app.title(), "untitled *");
    }

    #[test]
    fn newline_keeps_indentation() {
        let mut app = app_with("def f():\n    x = 1");
        app.cursor = text(&app).len();
        app.newline();
        app.insert_str("return x");
        assert_eq!(text(&app), "def f():\n    x = 1\n    return x");
        assert_eq!(app.cursor_pos().line, 2);
    }

    #[test]
    fn vertical_movement_keeps_column_and_clamps() {
        let mut app = app_with("abcdef\nxy\nlonger line");
        app.cursor = 4; // after "abcd"
        app.move_cursor_down();
        assert_eq!(app.cursor_pos(), CursorPos { line: 1, col: 2, width: 2 });
        app.move_cursor_down();
        assert_eq!(app.cursor_pos().line, 2);
        assert_eq!(app.cursor_pos().col, 2);
        app.move_cursor_up();
        app.move_cursor_up();
        assert_eq!(app.cursor_pos(), CursorPos { line: 0, col: 2, width: 2 });
        app.move_cursor_up();
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn horizontal_movement_respects_char_boundaries() {
        let mut app = app_with("é✓");
        app.move_cursor_right();
        assert_eq!(app.cursor, 2);
        app.move_cursor_right();
        assert_eq!(app.cursor, 5);
        app.move_cursor_right();
        assert_eq!(app.cursor, 5);
        app.backspace();
        assert_eq!(text(&app), "é");
        app.move_cursor_home();
        app.delete();
        assert_eq!(text(&app), "");
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let mut app = app_with("");
        app.insert_str("a\r\nb\rc");
        assert_eq!(text(&app), "a\nb\nc");
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut app = app_with("1\n2\n3\n4\n5\n6");
        app.fit_editor(3);
        app.cursor = text(&app).len();
        app.ensure_cursor_visible();
        assert_eq!(app.editor_scroll, 3);
        app.fit_editor(6);
        app.move_cursor_up();
        app.page_up();
        assert_eq!(app.cursor_pos().line, 0);
        assert_eq!(app.editor_scroll, 0);
    }

    #[test]
    fn save_writes_file_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        let mut app = App::new(Some(path.clone()), Arc::new(EditorBuffer::new()));
        app.editor_loaded(String::new(), None);
        app.insert_str("print(1)");
        assert_eq!(app.title(), "main.py *");

        app.save().unwrap();
        assert!(!app.dirty);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "print(1)");
    }

    #[test]
    fn unreadable_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.py");
        let original = [0x66, 0x6f, 0xff, 0xfe, 0x00, 0x41];
        std::fs::write(&path, original).unwrap();

        let mut app = App::new(Some(path.clone()), Arc::new(EditorBuffer::new()));
        app.editor_loaded(String::new(), Some("stream did not contain valid UTF-8".into()));
        app.insert_str("x = 1");

        let err = app.save().unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
        assert_eq!(std::fs::read(&path).unwrap(), original);
        assert!(app.dirty);
    }

    #[test]
    fn save_without_path_fails() {
        let mut app = app_with("x");
        assert!(app.save().is_err());
    }

    #[test]
    fn double_ctrl_c_quits() {
        let mut app = app_with("");
        assert!(!app.handle_ctrl_c());
        assert!(app.handle_ctrl_c());
    }

    #[test]
    fn output_scroll_saturates() {
        let mut app = app_with("");
        app.scroll_output_up(3);
        app.scroll_output_down(5);
        assert_eq!(app.output_scroll, 0);
    }
}
