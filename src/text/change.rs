//! Buffer change descriptors and position mapping across changes.

use crate::text::pos::Pos;
use crate::text::selection::{Range, Selection};

/// A half-open buffer edit: delete `[from, to)`, insert `text`.
///
/// `text` always holds at least one element; `[""]` inserts nothing.
/// `removed` is filled in once the change has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub from: Pos,
    pub to: Pos,
    pub text: Vec<String>,
    pub origin: Option<String>,
    pub removed: Vec<String>,
}

impl Change {
    /// Create a change with no origin.
    #[must_use]
    pub fn new(from: Pos, to: Pos, text: Vec<String>) -> Self {
        let text = if text.is_empty() {
            vec![String::new()]
        } else {
            text
        };
        Self {
            from,
            to,
            text,
            origin: None,
            removed: Vec::new(),
        }
    }

    /// Create a change from a string, splitting it into lines.
    #[must_use]
    pub fn from_str(from: Pos, to: Pos, text: &str) -> Self {
        Self::new(from, to, split_lines(text))
    }

    /// Tag the change with an origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Position just after the inserted text.
    #[must_use]
    pub fn end(&self) -> Pos {
        change_end(self)
    }

    /// Net number of lines added (negative when lines are removed).
    #[must_use]
    pub fn line_delta(&self) -> isize {
        self.text.len() as isize - 1 - (self.to.line as isize - self.from.line as isize)
    }

    /// Whether applying the change would do nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.text.len() == 1 && self.text[0].is_empty() && self.from == self.to
    }
}

/// Split text on `\n`, `\r\n`, and bare `\r`.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut cur));
            }
            '\n' => lines.push(std::mem::take(&mut cur)),
            _ => cur.push(c),
        }
    }
    lines.push(cur);
    lines
}

/// Position just after the text a change inserts.
#[must_use]
pub fn change_end(change: &Change) -> Pos {
    let last = change.text.last().map_or(0, |l| l.chars().count());
    if change.text.len() <= 1 {
        Pos::new(change.from.line, change.from.col + last)
    } else {
        Pos::new(change.from.line + change.text.len() - 1, last)
    }
}

/// Map `pos` to the same text after `change`, or to the change end when
/// the change covers it.
#[must_use]
pub fn adjust_for_change(pos: Pos, change: &Change) -> Pos {
    if pos < change.from {
        return pos;
    }
    if pos <= change.to {
        return change_end(change);
    }
    let line = (pos.line as isize + change.line_delta()) as usize;
    let mut col = pos.col;
    if pos.line == change.to.line {
        col = col + change_end(change).col - change.to.col;
    }
    Pos::new(line, col)
}

/// Selection after `change`, with every endpoint mapped through it.
#[must_use]
pub fn compute_sel_after_change(sel: &Selection, change: &Change) -> Selection {
    let ranges = sel
        .ranges()
        .iter()
        .map(|r| {
            Range::new(
                adjust_for_change(r.anchor, change),
                adjust_for_change(r.head, change),
            )
        })
        .collect();
    Selection::normalize(ranges, sel.primary_index())
}

/// Translate `pos` from a coordinate frame anchored at `old` to one
/// anchored at `new`.
#[must_use]
pub fn offset_pos(pos: Pos, old: Pos, new: Pos) -> Pos {
    if pos.line == old.line {
        Pos::new(new.line, pos.col + new.col - old.col)
    } else {
        Pos::new(new.line + (pos.line - old.line), pos.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: usize, col: usize) -> Pos {
        Pos::new(line, col)
    }

    #[test]
    fn test_change_end_single_line() {
        let change = Change::from_str(p(3, 2), p(3, 2), "abc");
        assert_eq!(change.end(), p(3, 5));
    }

    #[test]
    fn test_change_end_multi_line() {
        let change = Change::new(p(0, 0), p(0, 0), vec!["ab".into(), "cd".into()]);
        assert_eq!(change.end(), p(1, 2));
        assert_eq!(change.line_delta(), 1);
    }

    #[test]
    fn test_split_lines_handles_crlf() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("x\n"), vec!["x", ""]);
    }

    #[test]
    fn test_adjust_before_inside_after() {
        let change = Change::new(p(1, 2), p(2, 1), vec!["XY".into()]);
        assert_eq!(adjust_for_change(p(0, 9), &change), p(0, 9));
        assert_eq!(adjust_for_change(p(1, 3), &change), p(1, 4));
        assert_eq!(adjust_for_change(p(2, 4), &change), p(1, 7));
        assert_eq!(adjust_for_change(p(5, 4), &change), p(4, 4));
    }

    #[test]
    fn test_sel_after_insert_moves_cursor() {
        let sel = Selection::simple(p(0, 1), p(0, 1));
        let change = Change::from_str(p(0, 0), p(0, 0), "ab\ncd");
        let after = compute_sel_after_change(&sel, &change);
        assert_eq!(after.primary().head, p(1, 3));
    }

    #[test]
    fn test_offset_pos() {
        assert_eq!(offset_pos(p(3, 5), p(3, 2), p(4, 0)), p(4, 3));
        assert_eq!(offset_pos(p(6, 5), p(3, 2), p(4, 0)), p(7, 5));
    }

    #[test]
    fn test_noop() {
        assert!(Change::from_str(p(1, 1), p(1, 1), "").is_noop());
        assert!(!Change::from_str(p(1, 1), p(1, 2), "").is_noop());
    }
}
