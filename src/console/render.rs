//! Text the console writes and how settled results turn into lines.

use crate::execution::ExecutionResult;

pub const START_BANNER: &str = "▶ Running code...";
pub const SUCCESS_BANNER: &str = "✓ Execution completed successfully";
pub const FAILURE_BANNER: &str = "✖ Execution failed";
pub const ERROR_PREFIX: &str = "✖ Error: ";
pub const NO_CODE_WARNING: &str = "⚠ No code to execute";
pub const RUN_IN_PROGRESS_WARNING: &str = "⚠ A run is already in progress";

const SEPARATOR_CHAR: char = '─';

pub fn separator(width: usize) -> String {
    std::iter::repeat(SEPARATOR_CHAR).take(width).collect()
}

/// Lines written when a run settles, separator included.
pub fn settled_lines(result: &ExecutionResult, separator: &str) -> Vec<String> {
    let mut lines = match result {
        ExecutionResult::TransportError { message } => vec![format!("{ERROR_PREFIX}{message}")],
        ExecutionResult::Failure { error } => vec![format!("{ERROR_PREFIX}{error}")],
        ExecutionResult::Success { output, soft_failure } => {
            let mut lines = output_lines(output);
            lines.push(if *soft_failure { FAILURE_BANNER } else { SUCCESS_BANNER }.to_string());
            lines
        }
    };
    lines.push(separator.to_string());
    lines
}

/// Split program output into the lines the surface receives. Blank lines are
/// kept; `\r\n` endings lose their `\r`.
pub fn output_lines(output: &str) -> Vec<String> {
    output
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Banner,
    Success,
    Error,
    Warning,
    Separator,
    Output,
}

/// Classify a written line for styling. Program output that happens to start
/// with a banner glyph is styled like a banner.
pub fn classify(line: &str) -> LineKind {
    if line.starts_with('▶') {
        LineKind::Banner
    } else if line.starts_with('✓') {
        LineKind::Success
    } else if line.starts_with('✖') {
        LineKind::Error
    } else if line.starts_with('⚠') {
        LineKind::Warning
    } else if !line.is_empty() && line.chars().all(|c| c == SEPARATOR_CHAR) {
        LineKind::Separator
    } else {
        LineKind::Output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_keeps_blank_lines() {
        assert_eq!(output_lines("a\n\nb"), vec!["a", "", "b"]);
        // A trailing newline produces a trailing empty write.
        assert_eq!(output_lines("a\n"), vec!["a", ""]);
        assert_eq!(output_lines("x\r\ny"), vec!["x", "y"]);
    }

    #[test]
    fn failure_is_not_split() {
        let sep = separator(3);
        let lines = settled_lines(
            &ExecutionResult::Failure { error: "Traceback\nValueError".into() },
            &sep,
        );
        assert_eq!(lines, vec!["✖ Error: Traceback\nValueError".to_string(), "───".to_string()]);
    }

    #[test]
    fn soft_failure_uses_failure_banner() {
        let lines = settled_lines(
            &ExecutionResult::Success { output: "partial".into(), soft_failure: true },
            "-",
        );
        assert_eq!(lines, vec!["partial", FAILURE_BANNER, "-"]);
    }

    #[test]
    fn classify_recognises_console_lines() {
        assert_eq!(classify(START_BANNER), LineKind::Banner);
        assert_eq!(classify(SUCCESS_BANNER), LineKind::Success);
        assert_eq!(classify(FAILURE_BANNER), LineKind::Error);
        assert_eq!(classify(NO_CODE_WARNING), LineKind::Warning);
        assert_eq!(classify(&separator(50)), LineKind::Separator);
        assert_eq!(classify(""), LineKind::Output);
        assert_eq!(classify("hello"), LineKind::Output);
    }
}
