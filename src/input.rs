//! Owner of the current source text.
//!
//! All writers (typing, indentation, file loads, clears) go through the
//! mutation methods here. Counters are recomputed and listeners notified
//! before each mutation returns.

use std::fmt;

/// Indent inserted in place of a Tab key press.
pub const INDENT: &str = "    ";

/// Derived counters for the current text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    /// Number of `\n`-delimited segments (empty text counts as one line).
    pub lines: usize,
    /// Number of characters in the raw text.
    pub chars: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            lines: text.split('\n').count(),
            chars: text.chars().count(),
        }
    }
}

impl fmt::Display for TextStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lines: {}  Characters: {}", self.lines, self.chars)
    }
}

type Listener = Box<dyn FnMut(&TextStats) + Send>;

/// The text buffer shared by both pipelines.
pub struct InputManager {
    text: String,
    stats: TextStats,
    listeners: Vec<Listener>,
}

impl InputManager {
    pub fn new() -> Self {
        Self::with_text(String::new())
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let stats = TextStats::of(&text);
        Self {
            text,
            stats,
            listeners: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stats(&self) -> TextStats {
        self.stats
    }

    /// Register a listener called after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&TextStats) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the whole buffer.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.changed();
    }

    pub fn clear(&mut self) {
        self.set_text(String::new());
    }

    /// Insert text at a character offset, returning the cursor after it.
    pub fn insert(&mut self, cursor: usize, fragment: &str) -> usize {
        self.replace_range(cursor, cursor, fragment)
    }

    /// Delete the character before `cursor`, returning the new cursor.
    pub fn backspace(&mut self, cursor: usize) -> usize {
        if cursor == 0 {
            return 0;
        }
        self.replace_range(cursor - 1, cursor, "")
    }

    /// Replace the selection `[start, end)` with the fixed indent.
    ///
    /// Offsets are in characters and clamped to the buffer. Returns the
    /// collapsed cursor position just after the inserted indent.
    pub fn insert_indent(&mut self, start: usize, end: usize) -> usize {
        self.replace_range(start, end, INDENT)
    }

    fn replace_range(&mut self, start: usize, end: usize, fragment: &str) -> usize {
        let len = self.stats.chars;
        let start = start.min(len);
        let end = end.clamp(start, len);
        let start_byte = byte_offset(&self.text, start);
        let end_byte = byte_offset(&self.text, end);
        self.text.replace_range(start_byte..end_byte, fragment);
        self.changed();
        start + fragment.chars().count()
    }

    fn changed(&mut self) {
        self.stats = TextStats::of(&self.text);
        let stats = self.stats;
        for listener in &mut self.listeners {
            listener(&stats);
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InputManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputManager")
            .field("text", &self.text)
            .field("stats", &self.stats)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// `(line, column)` of a character offset, both 0-based.
pub fn cursor_position(text: &str, cursor: usize) -> (usize, usize) {
    text.chars()
        .take(cursor)
        .fold((0, 0), |(line, col), c| {
            if c == '\n' {
                (line + 1, 0)
            } else {
                (line, col + 1)
            }
        })
}

/// Character offset of `(line, column)`, clamping the column to the line
/// length and the line to the last line.
pub fn offset_at(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    let mut lines = text.split('\n').peekable();
    let mut current = 0;
    while let Some(segment) = lines.next() {
        let len = segment.chars().count();
        if current == line || lines.peek().is_none() {
            return offset + column.min(len);
        }
        offset += len + 1;
        current += 1;
    }
    offset
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn empty_text_counts_one_line() {
        let input = InputManager::new();
        assert_eq!(input.stats(), TextStats { lines: 1, chars: 0 });
    }

    #[test]
    fn counters_follow_set_text() {
        let mut input = InputManager::new();
        input.set_text("program teste;\nbegin\nend");
        assert_eq!(input.stats().lines, 3);
        assert_eq!(input.stats().chars, 24);
    }

    #[test]
    fn trailing_newline_adds_a_segment() {
        assert_eq!(TextStats::of("a\n").lines, 2);
    }

    #[test]
    fn chars_count_unicode_scalars() {
        assert_eq!(TextStats::of("análise").chars, 7);
    }

    #[test]
    fn indent_replaces_selection() {
        let mut input = InputManager::with_text("begin end");
        let cursor = input.insert_indent(5, 6);
        assert_eq!(input.text(), "begin    end");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn indent_is_clamped_to_buffer() {
        let mut input = InputManager::with_text("x");
        let cursor = input.insert_indent(10, 20);
        assert_eq!(input.text(), "x    ");
        assert_eq!(cursor, 5);
    }

    #[test]
    fn insert_and_backspace_handle_multibyte_text() {
        let mut input = InputManager::with_text("ção");
        let cursor = input.insert(1, "x");
        assert_eq!(input.text(), "çxão");
        let cursor = input.backspace(cursor);
        assert_eq!(input.text(), "ção");
        assert_eq!(cursor, 1);
        assert_eq!(input.backspace(0), 0);
    }

    #[test]
    fn cursor_geometry_round_trips() {
        let text = "ab\ncdef\n";
        assert_eq!(cursor_position(text, 0), (0, 0));
        assert_eq!(cursor_position(text, 3), (1, 0));
        assert_eq!(cursor_position(text, 6), (1, 3));
        assert_eq!(cursor_position(text, 8), (2, 0));
        assert_eq!(offset_at(text, 1, 3), 6);
        assert_eq!(offset_at(text, 0, 10), 2);
        assert_eq!(offset_at(text, 9, 0), 8);
    }

    #[test]
    fn listeners_see_recomputed_stats() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut input = InputManager::new();
        input.subscribe(move |stats| sink.lock().unwrap().push(*stats));

        input.set_text("a\nb");
        input.clear();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                TextStats { lines: 2, chars: 3 },
                TextStats { lines: 1, chars: 0 }
            ]
        );
    }
}
