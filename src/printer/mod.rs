//! Stdout output surface for one-shot runs.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::console::{classify, LineKind};
use crate::surface::OutputSurface;

pub struct TerminalPrinter<W: Write = io::Stdout> {
    out: W,
    color: bool,
}

impl TerminalPrinter {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> TerminalPrinter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&self, line: &str) -> String {
        if !self.color {
            return line.to_string();
        }
        match classify(line) {
            LineKind::Banner => format!("{}", line.cyan()),
            LineKind::Success => format!("{}", line.green()),
            LineKind::Error => format!("{}", line.red()),
            LineKind::Warning => format!("{}", line.yellow()),
            LineKind::Separator => format!("{}", line.dimmed()),
            LineKind::Output => line.to_string(),
        }
    }
}

impl<W: Write + Send> OutputSurface for TerminalPrinter<W> {
    fn writeln(&mut self, line: &str) {
        let text = self.styled(line);
        // Stdout going away (closed pipe) is not something a run can report.
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }

    fn clear(&mut self) {
        if self.color {
            let _ = write!(self.out, "\x1b[2J\x1b[H");
            let _ = self.out.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_printer_writes_one_line_per_call() {
        let mut printer = TerminalPrinter::new(Vec::new(), false);
        printer.writeln("▶ Running code...");
        printer.writeln("");
        printer.writeln("42");
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(text, "▶ Running code...\n\n42\n");
    }

    #[test]
    fn color_printer_styles_banners_only() {
        let mut printer = TerminalPrinter::new(Vec::new(), true);
        printer.writeln("✖ Error: boom");
        printer.writeln("plain");
        let text = String::from_utf8(printer.into_inner()).unwrap();
        let mut lines = text.lines();
        let error = lines.next().unwrap();
        assert!(error.contains("\x1b["));
        assert!(error.contains("✖ Error: boom"));
        assert_eq!(lines.next(), Some("plain"));
    }

    #[test]
    fn clear_without_color_writes_nothing() {
        let mut printer = TerminalPrinter::new(Vec::new(), false);
        printer.clear();
        assert!(printer.into_inner().is_empty());
    }
}
