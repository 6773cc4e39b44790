//! Unicode-safe helpers for working with UTF-8 strings.

use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Columns a tab occupies in the editor.
pub const TAB_WIDTH: usize = 4;

/// Convert a character index (0-based) to a byte index in the given string.
/// If `n` exceeds the number of characters, returns `s.len()`.
pub fn char_to_byte_index(s: &str, n: usize) -> usize {
    match s.char_indices().nth(n) {
        Some((i, _)) => i,
        None => s.len(),
    }
}

/// Byte index of the char boundary before `idx` (0 stays 0).
pub fn prev_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().next_back().map(|(i, _)| i).unwrap_or(0)
}

/// Byte index of the char boundary after `idx` (`s.len()` stays put).
pub fn next_boundary(s: &str, idx: usize) -> usize {
    s[idx..].chars().next().map(|c| idx + c.len_utf8()).unwrap_or(s.len())
}

/// Terminal columns taken by `s` once tabs are expanded.
pub fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { c.width().unwrap_or(0) })
        .sum()
}

/// `s` with each tab replaced by `TAB_WIDTH` spaces, matching `display_width`.
pub fn expand_tabs(s: &str) -> Cow<'_, str> {
    if s.contains('\t') {
        Cow::Owned(s.replace('\t', &" ".repeat(TAB_WIDTH)))
    } else {
        Cow::Borrowed(s)
    }
}
