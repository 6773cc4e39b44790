//! Scrollback buffer behind the workspace's output panel.

use std::collections::VecDeque;

use super::OutputSurface;

#[derive(Debug, Clone)]
pub struct TerminalBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl TerminalBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { lines: VecDeque::new(), capacity: capacity.max(1) }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl OutputSurface for TerminalBuffer {
    fn writeln(&mut self, line: &str) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}
