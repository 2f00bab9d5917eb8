//! The buffer interface the display core reads from.

use std::ops::ControlFlow;

use crate::text::Pos;

/// Line-oriented access to a text buffer.
///
/// Line numbers are absolute: a document covers
/// `first_line()..first_line() + line_count()`, and sub-views of a larger
/// document shift `first_line` when text is added above them.
pub trait Document {
    /// Number of the first line.
    fn first_line(&self) -> usize;

    /// Move the document to start at `first`.
    fn set_first_line(&mut self, first: usize);

    /// Number of lines; never zero.
    fn line_count(&self) -> usize;

    /// Text of line `n` without its terminator.
    fn line(&self, n: usize) -> Option<String>;

    /// Length of line `n` in chars.
    fn content_length(&self, n: usize) -> usize;

    /// Visit lines `from..to` in order until the visitor breaks.
    fn iter_lines(
        &self,
        from: usize,
        to: usize,
        visitor: &mut dyn FnMut(usize, &str) -> ControlFlow<()>,
    );

    /// Replace `[from, to)` with `text`, returning the removed lines.
    fn replace(&mut self, from: Pos, to: Pos, text: &[String]) -> Vec<String>;

    /// Number of the last line.
    fn last_line(&self) -> usize {
        self.first_line() + self.line_count() - 1
    }

    /// Text of line `n`, or an empty string when it is out of range.
    fn line_text(&self, n: usize) -> String {
        self.line(n).unwrap_or_default()
    }

    /// Lines between two positions, as `replace` would remove them.
    fn range_lines(&self, from: Pos, to: Pos) -> Vec<String> {
        let mut out = Vec::new();
        self.iter_lines(from.line, to.line + 1, &mut |n, text| {
            let chars: Vec<char> = text.chars().collect();
            let start = if n == from.line {
                from.col.min(chars.len())
            } else {
                0
            };
            let end = if n == to.line {
                to.col.min(chars.len())
            } else {
                chars.len()
            };
            out.push(chars[start..end.max(start)].iter().collect());
            ControlFlow::Continue(())
        });
        out
    }

    /// Whole document joined with `\n`.
    fn text(&self) -> String {
        let mut lines = Vec::with_capacity(self.line_count());
        self.iter_lines(
            self.first_line(),
            self.first_line() + self.line_count(),
            &mut |_, text| {
                lines.push(text.to_string());
                ControlFlow::Continue(())
            },
        );
        lines.join("\n")
    }
}
