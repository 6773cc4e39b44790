//! Async event handler for the workspace.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use super::{
    app::App,
    events::TuiEvent,
    keys::Controls,
    ui::{editor_rows, render_ui, View},
};
use crate::{
    config::Config,
    console::RunConsole,
    execution::ExecutionClient,
    panel::PanelController,
    surface::{lock, shared, EditorBuffer, SharedOutput, TerminalBuffer},
};

type Console = RunConsole<EditorBuffer, TerminalBuffer>;

/// Everything the key handler drives besides the app state.
struct Workspace {
    console: Arc<Console>,
    output: SharedOutput<TerminalBuffer>,
    panel: PanelController<EditorBuffer, TerminalBuffer>,
    controls: Controls,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
}

/// Run the interactive workspace
pub async fn run_workspace(cfg: Config, file: Option<PathBuf>) -> Result<()> {
    let client = ExecutionClient::from_config(&cfg)?;
    tracing::info!(url = client.url(), file = ?file, "workspace starting");

    let editor = Arc::new(EditorBuffer::new());
    let output = shared(TerminalBuffer::new(cfg.scrollback()));
    let console = Arc::new(
        RunConsole::new(Arc::clone(&editor), Arc::clone(&output), Arc::new(client))
            .with_separator_width(cfg.separator_width()),
    );
    let panel = PanelController::new(Arc::clone(&editor), Arc::clone(&output), cfg.layout_delay());

    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();
    let mut app = App::new(file.clone(), editor);
    let mut ws = Workspace {
        console,
        output,
        panel,
        controls: Controls::from_config(&cfg),
        event_tx: event_tx.clone(),
    };

    // The editor is usable only once its contents are in.
    spawn_editor_load(file, event_tx.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut ws, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("workspace closed");
    result
}

fn spawn_editor_load(file: Option<PathBuf>, tx: mpsc::UnboundedSender<TuiEvent>) {
    tokio::spawn(async move {
        let (text, error) = load_source(file).await;
        let _ = tx.send(TuiEvent::EditorReady { text, error });
    });
}

/// Initial editor contents. An unreadable file yields an empty buffer plus
/// the read error, which also disables saving over it.
async fn load_source(file: Option<PathBuf>) -> (String, Option<String>) {
    let Some(path) = file else {
        return (String::new(), None);
    };
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => (text, None),
        // A missing file is created on first save.
        Err(err) if err.kind() == io::ErrorKind::NotFound => (String::new(), None),
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "cannot read source file");
            (String::new(), Some(err.to_string()))
        }
    }
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    ws: &mut Workspace,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    // Spawn input handler
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        while !input_tx.is_closed() {
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let input = match event::read() {
                Ok(Event::Key(key)) => TuiEvent::Key(key),
                Ok(Event::Paste(text)) => TuiEvent::Paste(text),
                Ok(Event::Resize(_, _)) => TuiEvent::Resize,
                _ => continue,
            };
            if input_tx.send(input).is_err() {
                break; // Channel closed
            }
        }
    });
    drop(event_tx);

    let mut needs_fit = true;

    loop {
        if needs_fit || app.editor.take_layout_request() {
            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            app.fit_editor(editor_rows(area, ws.panel.is_output_visible()));
            needs_fit = false;
        }

        // Render UI
        {
            let output = lock(&ws.output);
            let view = View {
                output: &output,
                panel_visible: ws.panel.is_output_visible(),
                running: ws.console.is_running(),
                controls: &ws.controls,
            };
            terminal.draw(|frame| render_ui(frame, app, &view))?;
        }

        // Handle events
        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, ws, key) {
                        return Ok(()); // Quit requested
                    }
                }
                TuiEvent::Paste(text) => {
                    app.show_help = false;
                    app.insert_str(&text);
                }
                TuiEvent::Resize => needs_fit = true,
                TuiEvent::EditorReady { text, error } => {
                    app.editor_loaded(text, error);
                    needs_fit = true;
                }
                TuiEvent::RunFinished => app.scroll_output_to_bottom(),
            }
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }
}

/// Handle keyboard events. Returns true when the workspace should close.
fn handle_key_event(app: &mut App, ws: &mut Workspace, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return false;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return app.handle_ctrl_c(),
        KeyCode::Char('q') if ctrl => return true,
        KeyCode::F(1) => {
            app.toggle_help();
            return false;
        }
        _ => {}
    }

    if ws.controls.run.matches(&key) {
        trigger_run(ws);
        return false;
    }
    if ws.controls.clear.matches(&key) {
        ws.panel.clear_output();
        app.scroll_output_to_bottom();
        return false;
    }
    if ws.controls.toggle.matches(&key) {
        let visible = ws.panel.toggle_output_panel();
        app.set_status(if visible { "Output panel shown" } else { "Output panel hidden" });
        return false;
    }

    match key.code {
        KeyCode::Char('s') if ctrl => match app.save() {
            Ok(path) => app.set_status(format!("Saved {}", path.display())),
            Err(err) => {
                tracing::warn!(error = %err, "save failed");
                app.set_status(format!("Save failed: {err}"));
            }
        },
        KeyCode::End if ctrl => app.scroll_output_to_bottom(),
        KeyCode::Up if key.modifiers.contains(KeyModifiers::SHIFT) => app.scroll_output_up(1),
        KeyCode::Down if key.modifiers.contains(KeyModifiers::SHIFT) => app.scroll_output_down(1),
        KeyCode::Up => app.move_cursor_up(),
        KeyCode::Down => app.move_cursor_down(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Enter => app.newline(),
        KeyCode::Tab => app.insert_tab(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => app.insert_char(c),
        _ => {}
    }

    false
}

/// Start a run in the background. The console itself refuses a run while the
/// editor is loading or another run is outstanding.
fn trigger_run(ws: &Workspace) {
    let console = Arc::clone(&ws.console);
    let tx = ws.event_tx.clone();
    tokio::spawn(async move {
        console.run().await;
        let _ = tx.send(TuiEvent::RunFinished);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty_and_saveable() {
        let dir = tempfile::tempdir().unwrap();
        let (text, error) = load_source(Some(dir.path().join("new.py"))).await;
        assert_eq!(text, "");
        assert_eq!(error, None);
    }

    #[tokio::test]
    async fn undecodable_file_reports_an_error_and_save_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.py");
        let original = [0x66, 0x6f, 0xff, 0xfe, 0x00, 0x41];
        std::fs::write(&path, original).unwrap();

        let (text, error) = load_source(Some(path.clone())).await;
        assert_eq!(text, "");
        assert!(error.is_some());

        let mut app = App::new(Some(path.clone()), Arc::new(EditorBuffer::new()));
        app.editor_loaded(text, error);
        app.insert_str("x = 1");
        assert!(app.save().is_err());
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn editor_ready_event_carries_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        std::fs::write(&path, "print(1)").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_editor_load(Some(path), tx);
        match rx.recv().await {
            Some(TuiEvent::EditorReady { text, error }) => {
                assert_eq!(text, "print(1)");
                assert_eq!(error, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
