//! Selection ranges and selection sets.

use std::rc::Rc;

use crate::text::pos::{Pos, max_pos, min_pos};

/// A selection range between an anchor and a head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub anchor: Pos,
    pub head: Pos,
}

impl Range {
    /// Create a new range.
    #[must_use]
    pub const fn new(anchor: Pos, head: Pos) -> Self {
        Self { anchor, head }
    }

    /// A collapsed range at `pos`.
    #[must_use]
    pub const fn cursor(pos: Pos) -> Self {
        Self::new(pos, pos)
    }

    /// Start of the range.
    #[must_use]
    pub fn from(&self) -> Pos {
        min_pos(self.anchor, self.head)
    }

    /// End of the range.
    #[must_use]
    pub fn to(&self) -> Pos {
        max_pos(self.anchor, self.head)
    }

    /// Whether anchor and head coincide.
    #[must_use]
    pub fn empty(&self) -> bool {
        self.anchor == self.head
    }
}

/// An immutable set of sorted, non-overlapping ranges with a primary index.
///
/// Every change builds a new `Selection`; the ranges are shared, so a cloned
/// snapshot never observes later edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    ranges: Rc<[Range]>,
    primary: usize,
}

impl Selection {
    /// Build a selection from ranges that are already normalized.
    #[must_use]
    pub fn new(ranges: Vec<Range>, primary: usize) -> Self {
        debug_assert!(!ranges.is_empty(), "selection needs at least one range");
        let primary = primary.min(ranges.len().saturating_sub(1));
        Self {
            ranges: ranges.into(),
            primary,
        }
    }

    /// A single-range selection.
    #[must_use]
    pub fn simple(anchor: Pos, head: Pos) -> Self {
        Self::new(vec![Range::new(anchor, head)], 0)
    }

    /// Sort and merge `ranges`, tracking where the primary range ends up.
    ///
    /// Overlapping or touching ranges merge into one. The merged range keeps
    /// the direction of the range it absorbed first.
    #[must_use]
    pub fn normalize(mut ranges: Vec<Range>, primary: usize) -> Self {
        if ranges.is_empty() {
            return Self::simple(Pos::default(), Pos::default());
        }
        let primary = primary.min(ranges.len() - 1);
        let prim = ranges[primary];
        // Stable sort keeps equal ranges in their original order, so the
        // primary can be found by identity of its slot.
        let mut order: Vec<usize> = (0..ranges.len()).collect();
        order.sort_by(|&a, &b| ranges[a].from().cmp(&ranges[b].from()));
        let mut prim_index = order.iter().position(|&i| i == primary).unwrap_or(0);
        ranges = order.into_iter().map(|i| ranges[i]).collect();
        debug_assert_eq!(ranges[prim_index], prim);

        let mut i = 1;
        while i < ranges.len() {
            let cur = ranges[i];
            let prev = ranges[i - 1];
            if prev.to() >= cur.from() {
                let from = min_pos(prev.from(), cur.from());
                let to = max_pos(prev.to(), cur.to());
                let inv = if prev.empty() {
                    cur.from() == cur.head
                } else {
                    prev.from() == prev.head
                };
                if i <= prim_index {
                    prim_index -= 1;
                }
                let merged = if inv {
                    Range::new(to, from)
                } else {
                    Range::new(from, to)
                };
                ranges[i - 1] = merged;
                ranges.remove(i);
            } else {
                i += 1;
            }
        }
        Self::new(ranges, prim_index)
    }

    /// All ranges, sorted by start.
    #[must_use]
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Index of the primary range.
    #[must_use]
    pub fn primary_index(&self) -> usize {
        self.primary
    }

    /// The primary range.
    #[must_use]
    pub fn primary(&self) -> Range {
        self.ranges[self.primary]
    }

    /// Whether any range is non-empty.
    #[must_use]
    pub fn something_selected(&self) -> bool {
        self.ranges.iter().any(|r| !r.empty())
    }

    /// Index of a range that touches `[from, to]`, if any.
    #[must_use]
    pub fn contains(&self, from: Pos, to: Pos) -> Option<usize> {
        self.ranges
            .iter()
            .position(|r| to >= r.from() && from <= r.to())
    }

    /// Whether two selections hold the same ranges and primary.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }

    /// Map every endpoint through `f`, renormalizing the result.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(Pos) -> Pos) -> Self {
        let ranges = self
            .ranges
            .iter()
            .map(|r| Range::new(f(r.anchor), f(r.head)))
            .collect();
        Self::normalize(ranges, self.primary)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::simple(Pos::default(), Pos::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: usize, col: usize) -> Pos {
        Pos::new(line, col)
    }

    #[test]
    fn test_range_endpoints() {
        let r = Range::new(p(2, 1), p(0, 4));
        assert_eq!(r.from(), p(0, 4));
        assert_eq!(r.to(), p(2, 1));
        assert!(!r.empty());
        assert!(Range::cursor(p(1, 1)).empty());
    }

    #[test]
    fn test_overlapping_ranges_merge() {
        let sel = Selection::normalize(
            vec![Range::new(p(0, 0), p(0, 5)), Range::new(p(0, 3), p(0, 8))],
            1,
        );
        assert_eq!(sel.ranges(), &[Range::new(p(0, 0), p(0, 8))]);
        assert_eq!(sel.primary_index(), 0);
    }

    #[test]
    fn test_touching_ranges_merge() {
        let sel = Selection::normalize(
            vec![Range::new(p(0, 0), p(0, 2)), Range::new(p(0, 2), p(0, 4))],
            0,
        );
        assert_eq!(sel.ranges().len(), 1);
    }

    #[test]
    fn test_sort_tracks_primary() {
        let sel = Selection::normalize(
            vec![
                Range::cursor(p(5, 0)),
                Range::cursor(p(1, 0)),
                Range::cursor(p(3, 0)),
            ],
            0,
        );
        assert_eq!(sel.primary(), Range::cursor(p(5, 0)));
        assert_eq!(sel.primary_index(), 2);
    }

    #[test]
    fn test_merge_keeps_inverted_direction() {
        let sel = Selection::normalize(
            vec![Range::new(p(0, 5), p(0, 0)), Range::new(p(0, 3), p(0, 8))],
            0,
        );
        assert_eq!(sel.primary(), Range::new(p(0, 8), p(0, 0)));
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = Selection::normalize(
            vec![
                Range::new(p(4, 1), p(4, 9)),
                Range::new(p(0, 0), p(1, 0)),
                Range::new(p(0, 5), p(2, 0)),
            ],
            2,
        );
        let twice = Selection::normalize(once.ranges().to_vec(), once.primary_index());
        assert!(once.equals(&twice));
    }

    #[test]
    fn test_contains() {
        let sel = Selection::simple(p(1, 0), p(1, 4));
        assert_eq!(sel.contains(p(1, 2), p(1, 2)), Some(0));
        assert_eq!(sel.contains(p(2, 0), p(2, 1)), None);
    }
}
