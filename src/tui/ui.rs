//! UI layout and rendering logic for the workspace.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::{App, CursorPos};
use super::keys::Controls;
use crate::console::{classify, LineKind};
use crate::surface::TerminalBuffer;
use crate::utils::unicode::expand_tabs;

/// Width of the line-number gutter, including the trailing space.
const GUTTER: u16 = 5;

/// What the frame needs besides the app state.
pub struct View<'a> {
    pub output: &'a TerminalBuffer,
    pub panel_visible: bool,
    pub running: bool,
    pub controls: &'a Controls,
}

pub struct WorkspaceLayout {
    pub editor: Rect,
    pub output: Option<Rect>,
    pub status: Rect,
}

/// Split the screen. The editor takes whatever the output panel leaves.
pub fn workspace_layout(area: Rect, panel_visible: bool) -> WorkspaceLayout {
    if panel_visible {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),         // Editor
                Constraint::Percentage(40), // Output panel
                Constraint::Length(1),      // Status bar
            ])
            .split(area);
        WorkspaceLayout { editor: chunks[0], output: Some(chunks[1]), status: chunks[2] }
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);
        WorkspaceLayout { editor: chunks[0], output: None, status: chunks[1] }
    }
}

/// Rows of text the editor shows inside its border.
pub fn editor_rows(area: Rect, panel_visible: bool) -> usize {
    workspace_layout(area, panel_visible).editor.height.saturating_sub(2) as usize
}

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App, view: &View<'_>) {
    let layout = workspace_layout(frame.area(), view.panel_visible);

    render_editor(frame, app, layout.editor);

    if let Some(area) = layout.output {
        render_output(frame, app, view, area);
    }

    render_status_bar(frame, app, view, layout.status);

    if app.show_help {
        render_help_overlay(frame, view.controls);
    }
}

fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let height = area.height.saturating_sub(2) as usize;
    let gutter_style = Style::default().fg(Color::DarkGray);

    let lines: Vec<Line> = app
        .editor
        .with_text(|text| {
            text.split('\n')
                .enumerate()
                .skip(app.editor_scroll)
                .take(height)
                .map(|(i, line)| {
                    Line::from(vec![
                        Span::styled(format!("{:>4} ", i + 1), gutter_style),
                        Span::raw(expand_tabs(line).into_owned()),
                    ])
                })
                .collect()
        })
        .unwrap_or_else(|| vec![Line::from(Span::styled("Loading...", gutter_style))]);

    let title = if app.is_ready() {
        format!("Editor - {}", app.title())
    } else {
        "Editor (loading)".to_string()
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);

    if app.is_ready() && !app.show_help {
        if let Some(position) = cursor_cell(area, app.cursor_pos(), app.editor_scroll) {
            frame.set_cursor_position(position);
        }
    }
}

/// Screen cell of the cursor inside the bordered editor `area`, or `None`
/// when it is scrolled out of view or past the right edge.
pub fn cursor_cell(area: Rect, pos: CursorPos, scroll: usize) -> Option<(u16, u16)> {
    let row = u16::try_from(pos.line.checked_sub(scroll)?).ok()?;
    if row >= area.height.saturating_sub(2) {
        return None;
    }
    let col = u16::try_from(pos.width).ok()?;
    let x = area.x.saturating_add(1 + GUTTER).checked_add(col)?;
    if x >= area.right().saturating_sub(1) {
        return None;
    }
    Some((x, area.y + 1 + row))
}

fn line_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Banner => Style::default().fg(Color::Cyan),
        LineKind::Success => Style::default().fg(Color::Green),
        LineKind::Error => Style::default().fg(Color::Red),
        LineKind::Warning => Style::default().fg(Color::Yellow),
        LineKind::Separator => Style::default().fg(Color::DarkGray),
        LineKind::Output => Style::default(),
    }
}

/// Render the output panel
fn render_output(frame: &mut Frame, app: &App, view: &View<'_>, area: Rect) {
    let content_lines: Vec<Line> = view
        .output
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), line_style(classify(line)))))
        .collect();

    let title = if view.running { "Output [running]" } else { "Output" };

    let available_height = area.height.saturating_sub(2) as usize;
    let total_lines = content_lines.len();

    let mut paragraph = Paragraph::new(Text::from(content_lines))
        .block(Block::default().borders(Borders::ALL).title(title));

    if total_lines > available_height {
        // output_scroll == 0 follows the newest line
        let max_scroll = total_lines - available_height;
        let offset = app.output_scroll.min(max_scroll);
        let top = u16::try_from(max_scroll - offset).unwrap_or(u16::MAX);
        paragraph = paragraph.scroll((top, 0));
    }

    frame.render_widget(paragraph, area);
}

/// Key hints for the bound controls only.
pub fn control_hints(controls: &Controls) -> String {
    let mut hints = Vec::new();
    for (control, action) in [
        (&controls.run, "run"),
        (&controls.clear, "clear"),
        (&controls.toggle, "panel"),
    ] {
        if let Some(label) = control.label() {
            hints.push(format!("{label} {action}"));
        }
    }
    hints.push("F1 help".to_string());
    hints.join(" | ")
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, view: &View<'_>, area: Rect) {
    let state = if view.running { "Running" } else { "Idle" };
    let status_text = format!(
        "{} | {} | {}",
        state,
        app.status_message,
        control_hints(view.controls)
    );

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, controls: &Controls) {
    let popup_area = centered_rect(70, 60, frame.area());

    frame.render_widget(Clear, popup_area);

    let binding = |label: Option<String>| label.unwrap_or_else(|| "(unbound)".to_string());
    let help_lines = vec![
        Line::from("Workspace Help"),
        Line::from(""),
        Line::from("Controls:"),
        Line::from(format!("  {:<12} - Run the editor contents", binding(controls.run.label()))),
        Line::from(format!("  {:<12} - Clear the output panel", binding(controls.clear.label()))),
        Line::from(format!("  {:<12} - Show/hide the output panel", binding(controls.toggle.label()))),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  Arrows     - Move cursor"),
        Line::from("  Home/End   - Start/end of line"),
        Line::from("  PgUp/PgDn  - Move a page"),
        Line::from("  Ctrl+S     - Save"),
        Line::from(""),
        Line::from("Output:"),
        Line::from("  Shift+↑/↓  - Scroll output"),
        Line::from("  Ctrl+End   - Follow newest output"),
        Line::from(""),
        Line::from("  Ctrl+C x2  - Quit"),
        Line::from("  F1         - Toggle this help"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
