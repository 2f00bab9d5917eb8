//! Rope-backed document using the ropey crate.

use std::ops::ControlFlow;

use ropey::{Rope, RopeSlice};

use crate::text::{Document, Pos};

/// Document stored in a [`ropey::Rope`].
///
/// Lines are split on `\n`; a trailing `\r` is treated as part of the
/// terminator so `\r\n` text reports the same lines as `\n` text.
#[derive(Clone, Debug, Default)]
pub struct RopeDocument {
    rope: Rope,
    first: usize,
}

impl RopeDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            first: 0,
        }
    }

    /// Create a document from a string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            first: 0,
        }
    }

    /// Create a document from lines.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let joined: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        Self::from_str(&joined.join("\n"))
    }

    /// Number of chars in the whole document.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Access the underlying rope.
    #[must_use]
    pub fn inner(&self) -> &Rope {
        &self.rope
    }

    fn slice_line(&self, n: usize) -> Option<RopeSlice<'_>> {
        let idx = n.checked_sub(self.first)?;
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx);
        let mut len = line.len_chars();
        if len > 0 {
            match line.char(len - 1) {
                '\n' => {
                    len -= 1;
                    if len > 0 && line.char(len - 1) == '\r' {
                        len -= 1;
                    }
                }
                '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}' => len -= 1,
                _ => {}
            }
        }
        Some(line.slice(..len))
    }

    /// Char index of `pos`, clamped into the document.
    fn char_index(&self, pos: Pos) -> usize {
        let last = self.last_line();
        if pos.line < self.first {
            return 0;
        }
        if pos.line > last {
            return self.rope.len_chars();
        }
        let start = self.rope.line_to_char(pos.line - self.first);
        start + pos.col.min(self.content_length(pos.line))
    }
}

impl Document for RopeDocument {
    fn first_line(&self) -> usize {
        self.first
    }

    fn set_first_line(&mut self, first: usize) {
        self.first = first;
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, n: usize) -> Option<String> {
        self.slice_line(n).map(|s| s.to_string())
    }

    fn content_length(&self, n: usize) -> usize {
        self.slice_line(n).map_or(0, |s| s.len_chars())
    }

    fn iter_lines(
        &self,
        from: usize,
        to: usize,
        visitor: &mut dyn FnMut(usize, &str) -> ControlFlow<()>,
    ) {
        let to = to.min(self.first + self.rope.len_lines());
        let mut buf = String::new();
        for n in from.max(self.first)..to {
            buf.clear();
            if let Some(slice) = self.slice_line(n) {
                for chunk in slice.chunks() {
                    buf.push_str(chunk);
                }
            }
            if visitor(n, &buf).is_break() {
                break;
            }
        }
    }

    fn replace(&mut self, from: Pos, to: Pos, text: &[String]) -> Vec<String> {
        let removed = self.range_lines(from, to);
        let start = self.char_index(from);
        let end = self.char_index(to).max(start);
        self.rope.remove(start..end);
        let joined = text.join("\n");
        if !joined.is_empty() {
            self.rope.insert(start, &joined);
        }
        removed
    }
}

impl From<&str> for RopeDocument {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for RopeDocument {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_lines() {
        let doc = RopeDocument::from_str("Line 1\nLine 2\r\nLine 3");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(0).as_deref(), Some("Line 1"));
        assert_eq!(doc.line(1).as_deref(), Some("Line 2"));
        assert_eq!(doc.content_length(2), 6);
        assert_eq!(doc.line(3), None);
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let doc = RopeDocument::from_str("a\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line(1).as_deref(), Some(""));
    }

    #[test]
    fn test_replace_multiline_insert() {
        let mut doc = RopeDocument::from_str("xy");
        let removed = doc.replace(Pos::new(0, 0), Pos::new(0, 0), &["ab".into(), "cd".into()]);
        assert_eq!(removed, vec![String::new()]);
        assert_eq!(doc.line(0).as_deref(), Some("ab"));
        assert_eq!(doc.line(1).as_deref(), Some("cdxy"));
    }

    #[test]
    fn test_replace_reports_removed() {
        let mut doc = RopeDocument::from_str("hello\nworld\n!");
        let removed = doc.replace(Pos::new(0, 3), Pos::new(1, 2), &["_".into()]);
        assert_eq!(removed, vec!["lo".to_string(), "wo".to_string()]);
        assert_eq!(doc.text(), "hel_rld\n!");
    }

    #[test]
    fn test_first_line_offset() {
        let mut doc = RopeDocument::from_lines(&["a", "b", "c"]);
        doc.set_first_line(20);
        assert_eq!(doc.last_line(), 22);
        assert_eq!(doc.line(21).as_deref(), Some("b"));
        assert_eq!(doc.line(0), None);
    }

    #[test]
    fn test_iter_lines_stops_on_break() {
        let doc = RopeDocument::from_lines(&["a", "b", "c", "d"]);
        let mut seen = Vec::new();
        doc.iter_lines(1, 4, &mut |n, text| {
            seen.push((n, text.to_string()));
            if n == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, vec![(1, "b".to_string()), (2, "c".to_string())]);
    }

    #[test]
    fn test_unicode_columns_are_chars() {
        let mut doc = RopeDocument::from_str("héllo");
        assert_eq!(doc.content_length(0), 5);
        doc.replace(Pos::new(0, 1), Pos::new(0, 2), &["e".into()]);
        assert_eq!(doc.text(), "hello");
    }
}
