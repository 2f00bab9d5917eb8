//! Buffer positions.

use std::cmp::Ordering;
use std::fmt;

use crate::text::Document;

/// A (line, column) coordinate in a document.
///
/// Columns count `char`s, so a position never points inside a UTF-8
/// sequence. Ordering is lexicographic on `(line, col)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl Pos {
    /// Create a new position.
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Compare two positions.
    #[must_use]
    pub fn cmp_pos(a: Self, b: Self) -> Ordering {
        a.cmp(&b)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.col)
    }
}

/// The earlier of two positions.
#[must_use]
pub fn min_pos(a: Pos, b: Pos) -> Pos {
    if b < a { b } else { a }
}

/// The later of two positions.
#[must_use]
pub fn max_pos(a: Pos, b: Pos) -> Pos {
    if a < b { b } else { a }
}

/// Clamp a line number into the document.
#[must_use]
pub fn clip_line(doc: &dyn Document, line: usize) -> usize {
    line.clamp(doc.first_line(), doc.last_line())
}

/// Clamp a position into the document.
///
/// Lines before the document map to its start and lines after it map to
/// its end; columns are clipped to the line length. Clamping is idempotent.
#[must_use]
pub fn clip_pos(doc: &dyn Document, pos: Pos) -> Pos {
    if pos.line < doc.first_line() {
        return Pos::new(doc.first_line(), 0);
    }
    let last = doc.last_line();
    if pos.line > last {
        return Pos::new(last, doc.content_length(last));
    }
    let len = doc.content_length(pos.line);
    if pos.col > len {
        Pos::new(pos.line, len)
    } else {
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::RopeDocument;

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(Pos::new(0, 9) < Pos::new(1, 0));
        assert!(Pos::new(2, 3) < Pos::new(2, 4));
        assert_eq!(Pos::cmp_pos(Pos::new(1, 1), Pos::new(1, 1)), Ordering::Equal);
    }

    #[test]
    fn test_min_max() {
        let a = Pos::new(1, 5);
        let b = Pos::new(1, 2);
        assert_eq!(min_pos(a, b), b);
        assert_eq!(max_pos(a, b), a);
    }

    #[test]
    fn test_clip_pos() {
        let doc = RopeDocument::from_str("abc\nde");
        assert_eq!(clip_pos(&doc, Pos::new(0, 10)), Pos::new(0, 3));
        assert_eq!(clip_pos(&doc, Pos::new(9, 1)), Pos::new(1, 2));
        assert_eq!(clip_pos(&doc, Pos::new(1, 1)), Pos::new(1, 1));
        assert_eq!(clip_line(&doc, 40), 1);
    }

    #[test]
    fn test_clip_pos_respects_first_line() {
        let mut doc = RopeDocument::from_str("x\ny");
        doc.set_first_line(10);
        assert_eq!(clip_pos(&doc, Pos::new(3, 4)), Pos::new(10, 0));
        assert_eq!(clip_pos(&doc, Pos::new(11, 4)), Pos::new(11, 1));
    }
}
