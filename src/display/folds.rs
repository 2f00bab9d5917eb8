//! Collapsed and hidden line ranges.
//!
//! A fold merges lines `from..=to` into one visual line that shows the
//! first line followed by a marker widget. A hidden range renders nothing.
//! Both are whole-line and never overlap.

use crate::text::Change;

/// How a range is collapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoldKind {
    Fold,
    Hide,
}

/// An inclusive range of logical lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldRange {
    pub id: u32,
    pub from: usize,
    pub to: usize,
    pub kind: FoldKind,
}

impl FoldRange {
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        line >= self.from && line <= self.to
    }
}

/// Sorted, non-overlapping fold ranges of a document.
#[derive(Clone, Debug, Default)]
pub struct Folds {
    ranges: Vec<FoldRange>,
    next_id: u32,
}

impl Folds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    #[must_use]
    pub fn ranges(&self) -> &[FoldRange] {
        &self.ranges
    }

    /// Add a range. Returns `None` when it overlaps an existing one or is
    /// a one-line fold.
    pub fn add(&mut self, from: usize, to: usize, kind: FoldKind) -> Option<FoldRange> {
        if to < from || (kind == FoldKind::Fold && to == from) {
            return None;
        }
        if self.ranges.iter().any(|r| r.from <= to && from <= r.to) {
            return None;
        }
        self.next_id += 1;
        let range = FoldRange {
            id: self.next_id,
            from,
            to,
            kind,
        };
        let at = self.ranges.partition_point(|r| r.from < from);
        self.ranges.insert(at, range);
        Some(range)
    }

    pub fn remove(&mut self, id: u32) -> Option<FoldRange> {
        let at = self.ranges.iter().position(|r| r.id == id)?;
        Some(self.ranges.remove(at))
    }

    #[must_use]
    pub fn at(&self, line: usize) -> Option<&FoldRange> {
        let at = self.ranges.partition_point(|r| r.to < line);
        self.ranges.get(at).filter(|r| r.contains(line))
    }

    /// The fold whose first line is `line`.
    #[must_use]
    pub fn starting_at(&self, line: usize) -> Option<&FoldRange> {
        self.at(line)
            .filter(|r| r.kind == FoldKind::Fold && r.from == line)
    }

    /// First line of the visual line containing `line`.
    #[must_use]
    pub fn visual_line_no(&self, line: usize) -> usize {
        match self.at(line) {
            Some(r) if r.kind == FoldKind::Fold => r.from,
            _ => line,
        }
    }

    /// `line` when it starts a visual line, else the line after the end of
    /// its visual line.
    #[must_use]
    pub fn visual_line_end_no(&self, line: usize) -> usize {
        match self.at(line) {
            Some(r) if r.kind == FoldKind::Fold && r.from < line => r.to + 1,
            _ => line,
        }
    }

    /// Whether `line` draws nothing of its own.
    #[must_use]
    pub fn is_hidden(&self, line: usize) -> bool {
        match self.at(line) {
            Some(r) => r.kind == FoldKind::Hide || r.from < line,
            None => false,
        }
    }

    /// Visual line starting at `line`: `(size, hidden)`.
    #[must_use]
    pub fn visual_line_at(&self, line: usize) -> (usize, bool) {
        match self.at(line) {
            Some(r) if r.kind == FoldKind::Fold && r.from == line => (r.to - r.from + 1, false),
            Some(_) => (1, true),
            None => (1, false),
        }
    }

    /// Update for an applied change. Ranges touched by the change are
    /// dropped and returned; ranges below it shift.
    pub fn apply_change(&mut self, change: &Change) -> Vec<FoldRange> {
        let delta = change.line_delta();
        let mut dropped = Vec::new();
        self.ranges.retain_mut(|r| {
            if r.to < change.from.line {
                return true;
            }
            if r.from > change.to.line {
                r.from = r.from.saturating_add_signed(delta);
                r.to = r.to.saturating_add_signed(delta);
                return true;
            }
            dropped.push(*r);
            false
        });
        dropped
    }

    /// Shift every range by `delta` lines.
    pub fn shift(&mut self, delta: isize) {
        for r in &mut self.ranges {
            r.from = r.from.saturating_add_signed(delta);
            r.to = r.to.saturating_add_signed(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Pos;

    #[test]
    fn visual_line_numbers_snap_to_fold_edges() {
        let mut folds = Folds::new();
        folds.add(3, 6, FoldKind::Fold);
        assert_eq!(folds.visual_line_no(5), 3);
        assert_eq!(folds.visual_line_no(7), 7);
        assert_eq!(folds.visual_line_end_no(5), 7);
        assert_eq!(folds.visual_line_end_no(3), 3);
        assert_eq!(folds.visual_line_at(3), (4, false));
        assert!(folds.is_hidden(4));
        assert!(!folds.is_hidden(3));
    }

    #[test]
    fn hidden_lines_are_their_own_visual_lines() {
        let mut folds = Folds::new();
        folds.add(2, 3, FoldKind::Hide);
        assert_eq!(folds.visual_line_no(3), 3);
        assert_eq!(folds.visual_line_at(3), (1, true));
        assert!(folds.is_hidden(2));
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let mut folds = Folds::new();
        assert!(folds.add(3, 6, FoldKind::Fold).is_some());
        assert!(folds.add(5, 9, FoldKind::Fold).is_none());
        assert!(folds.add(8, 8, FoldKind::Fold).is_none());
        assert!(folds.add(8, 8, FoldKind::Hide).is_some());
    }

    #[test]
    fn changes_shift_or_drop_ranges() {
        let mut folds = Folds::new();
        folds.add(1, 2, FoldKind::Fold);
        folds.add(10, 12, FoldKind::Fold);
        let change = Change::new(Pos::new(2, 0), Pos::new(2, 0), vec!["a".into(), "b".into()]);
        let dropped = folds.apply_change(&change);
        assert_eq!(dropped.len(), 1);
        assert_eq!(folds.ranges()[0].from, 11);
        assert_eq!(folds.ranges()[0].to, 13);
    }
}
