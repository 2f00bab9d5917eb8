//! The rendered window: which visual lines currently have line views.
//!
//! The window covers `[from, to)` in logical line numbers and holds one
//! [`LineView`] per visual line. Edits are folded into the window by
//! shifting, cutting or splicing it rather than rebuilding it, so nodes of
//! untouched lines survive.

use tracing::trace;

use super::folds::Folds;
use super::line_view::{DirtyAspects, LineView};

/// Lines within this distance of the old window edge are kept rendered
/// rather than dropped.
pub const ABSORB_DISTANCE: usize = 20;

/// Visual line structure of the document the window is built from.
pub trait VisualLines {
    fn first_line(&self) -> usize;
    /// One past the last line.
    fn end_line(&self) -> usize;
    fn visual_line_no(&self, line: usize) -> usize;
    fn visual_line_end_no(&self, line: usize) -> usize;
    /// `(size, hidden)` of the visual line starting at `line`.
    fn visual_line_at(&self, line: usize) -> (usize, bool);
    /// Whether any collapsed ranges exist, which makes cutting slower.
    fn has_collapsed(&self) -> bool;
}

/// [`VisualLines`] over a document range and its folds.
#[derive(Clone, Copy, Debug)]
pub struct FoldIndex<'a> {
    pub folds: &'a Folds,
    pub first: usize,
    pub end: usize,
}

impl<'a> FoldIndex<'a> {
    #[must_use]
    pub fn new(folds: &'a Folds, first: usize, end: usize) -> Self {
        Self { folds, first, end }
    }
}

impl VisualLines for FoldIndex<'_> {
    fn first_line(&self) -> usize {
        self.first
    }

    fn end_line(&self) -> usize {
        self.end
    }

    fn visual_line_no(&self, line: usize) -> usize {
        self.folds.visual_line_no(line)
    }

    fn visual_line_end_no(&self, line: usize) -> usize {
        if line >= self.end {
            return line;
        }
        self.folds.visual_line_end_no(line)
    }

    fn visual_line_at(&self, line: usize) -> (usize, bool) {
        self.folds.visual_line_at(line)
    }

    fn has_collapsed(&self) -> bool {
        !self.folds.is_empty()
    }
}

/// Window bounds for a visible range: the range plus `margin` lines on each
/// side, keeping the old edges when they are close, snapped to visual lines.
#[must_use]
pub fn window_bounds(
    current: (usize, usize),
    visible: (usize, usize),
    margin: usize,
    lines: &dyn VisualLines,
) -> (usize, usize) {
    let (view_from, view_to) = current;
    let first = lines.first_line();
    let end = lines.end_line();
    let mut from = visible.0.saturating_sub(margin).max(first);
    let mut to = end.min(visible.1.saturating_add(margin));
    if view_from < from && from - view_from < ABSORB_DISTANCE {
        from = first.max(view_from);
    }
    if view_to > to && view_to - to < ABSORB_DISTANCE {
        to = end.min(view_to);
    }
    if lines.has_collapsed() {
        from = lines.visual_line_no(from);
        to = lines.visual_line_end_no(to);
    }
    (from, to.max(from))
}

/// The rendered window.
#[derive(Clone, Debug, Default)]
pub struct ViewWindow {
    from: usize,
    to: usize,
    lines: Vec<LineView>,
    generation: u64,
}

impl ViewWindow {
    /// An empty window at `first`.
    #[must_use]
    pub fn new(first: usize) -> Self {
        Self {
            from: first,
            to: first,
            lines: Vec::new(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn from(&self) -> usize {
        self.from
    }

    #[must_use]
    pub fn to(&self) -> usize {
        self.to
    }

    #[must_use]
    pub fn lines(&self) -> &[LineView] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [LineView] {
        &mut self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Changes whenever the set of line views is replaced or cut.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    /// `(first line, view)` for every entry.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LineView)> {
        let mut n = self.from;
        self.lines.iter().map(move |v| {
            let at = n;
            n += v.size;
            (at, v)
        })
    }

    /// Fresh line views for every visual line in `[from, to)`.
    #[must_use]
    pub fn build_view_array(lines: &dyn VisualLines, from: usize, to: usize) -> Vec<LineView> {
        let mut array = Vec::new();
        let mut pos = from;
        while pos < to {
            let (size, hidden) = lines.visual_line_at(pos);
            array.push(LineView::new(size, hidden));
            pos += size.max(1);
        }
        array
    }

    /// Drop every entry.
    pub fn reset(&mut self, first: usize) {
        self.from = first;
        self.to = first;
        self.lines.clear();
        self.bump();
    }

    /// Index of the entry covering line `n`.
    #[must_use]
    pub fn find_view_index(&self, n: usize) -> Option<usize> {
        if n >= self.to || n < self.from {
            return None;
        }
        let mut left = n - self.from;
        for (i, view) in self.lines.iter().enumerate() {
            if left < view.size {
                return Some(i);
            }
            left -= view.size;
        }
        None
    }

    /// Index and first line of the entry covering line `n`.
    #[must_use]
    pub fn view_for_line(&self, n: usize) -> Option<(usize, usize)> {
        let index = self.find_view_index(n)?;
        let start = self.from + self.lines[..index].iter().map(|v| v.size).sum::<usize>();
        Some((index, start))
    }

    fn cutting_point(
        &self,
        lines: &dyn VisualLines,
        old_n: usize,
        new_n: usize,
        dir: isize,
    ) -> Option<(usize, usize)> {
        let mut index = self.find_view_index(old_n)?;
        let mut new_n = new_n;
        if !lines.has_collapsed() || new_n == lines.end_line() {
            return Some((index, new_n));
        }
        let n = self.from + self.lines[..index].iter().map(|v| v.size).sum::<usize>();
        if n != old_n {
            if dir > 0 {
                if index == self.lines.len() - 1 {
                    return None;
                }
                new_n += n + self.lines[index].size - old_n;
                index += 1;
            } else {
                new_n = new_n.checked_sub(old_n - n)?;
            }
        }
        while lines.visual_line_no(new_n) != new_n {
            let limit = if dir < 0 { 0 } else { self.lines.len() - 1 };
            if index == limit {
                return None;
            }
            if dir < 0 {
                new_n = new_n.checked_sub(self.lines[index - 1].size)?;
                index -= 1;
            } else {
                new_n += self.lines[index].size;
                index += 1;
            }
        }
        Some((index, new_n))
    }

    /// Fold a change of lines `[from, to)` that added `lendiff` lines into
    /// the window. `lines` describes the document after the change.
    pub fn reg_change(&mut self, lines: &dyn VisualLines, from: usize, to: usize, lendiff: isize) {
        let first = lines.first_line();
        if from >= self.to {
            if lines.has_collapsed() && lines.visual_line_no(from) < self.to {
                trace!(from, to, "change after window touches a fold; resetting");
                self.reset(first);
            }
        } else if to <= self.from {
            if lines.has_collapsed()
                && lines.visual_line_end_no(to.saturating_add_signed(lendiff)) > self.from
            {
                self.reset(first);
            } else {
                self.from = self.from.saturating_add_signed(lendiff);
                self.to = self.to.saturating_add_signed(lendiff);
            }
        } else if from <= self.from && to >= self.to {
            self.reset(first);
        } else if from <= self.from {
            match self.cutting_point(lines, to, to.saturating_add_signed(lendiff), 1) {
                Some((index, line)) => {
                    self.lines.drain(..index);
                    self.from = line;
                    self.to = self.to.saturating_add_signed(lendiff);
                    self.bump();
                }
                None => self.reset(first),
            }
        } else if to >= self.to {
            match self.cutting_point(lines, from, from, -1) {
                Some((index, line)) => {
                    self.lines.truncate(index);
                    self.to = line;
                    self.bump();
                }
                None => self.reset(first),
            }
        } else {
            let top = self.cutting_point(lines, from, from, -1);
            let bottom = self.cutting_point(lines, to, to.saturating_add_signed(lendiff), 1);
            match (top, bottom) {
                (Some((top_index, top_line)), Some((bottom_index, bottom_line))) => {
                    let fresh = Self::build_view_array(lines, top_line, bottom_line);
                    self.lines.splice(top_index..bottom_index, fresh);
                    self.to = self.to.saturating_add_signed(lendiff);
                    self.bump();
                }
                _ => self.reset(first),
            }
        }
    }

    /// Mark one aspect of the entry covering `line` stale. Entries that
    /// were never drawn are left alone; they are built fresh anyway.
    pub fn reg_line_change(&mut self, line: usize, aspect: DirtyAspects) {
        let Some(index) = self.find_view_index(line) else {
            return;
        };
        let view = &mut self.lines[index];
        if view.node.is_some() {
            view.mark(aspect);
        }
    }

    /// Move the window to `[from, to)`, keeping the entries that overlap.
    pub fn adjust_view(&mut self, lines: &dyn VisualLines, from: usize, to: usize) {
        if self.lines.is_empty() || from >= self.to || to <= self.from {
            self.lines = Self::build_view_array(lines, from, to);
            self.from = from;
            self.bump();
        } else {
            if self.from > from {
                let mut fresh = Self::build_view_array(lines, from, self.from);
                fresh.append(&mut self.lines);
                self.lines = fresh;
                self.bump();
            } else if self.from < from {
                let cut = self.find_view_index(from).unwrap_or(self.lines.len());
                self.lines.drain(..cut);
                self.bump();
            }
            self.from = from;
            if self.to < to {
                let fresh = Self::build_view_array(lines, self.to, to);
                self.lines.extend(fresh);
                self.bump();
            } else if self.to > to {
                let cut = self.find_view_index(to).unwrap_or(self.lines.len());
                self.lines.truncate(cut);
                self.bump();
            }
        }
        self.to = to;
    }

    /// Entries the next patch has to build or update.
    #[must_use]
    pub fn count_dirty(&self) -> usize {
        self.lines.iter().filter(|v| v.is_dirty()).count()
    }

    /// Sum of entry sizes; equals `to - from` while the window is consistent.
    #[must_use]
    pub fn covered(&self) -> usize {
        self.lines.iter().map(|v| v.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::folds::FoldKind;
    use crate::host::NodeId;

    fn drawn(window: &mut ViewWindow) {
        for (i, v) in window.lines_mut().iter_mut().enumerate() {
            v.node = Some(NodeId(i as u32 + 1));
            v.changes = DirtyAspects::empty();
        }
    }

    #[test]
    fn adjust_builds_then_extends() {
        let folds = Folds::new();
        let idx = FoldIndex::new(&folds, 0, 100);
        let mut window = ViewWindow::new(0);
        window.adjust_view(&idx, 10, 20);
        assert_eq!((window.from(), window.to(), window.lines().len()), (10, 20, 10));
        drawn(&mut window);
        window.adjust_view(&idx, 5, 25);
        assert_eq!(window.lines().len(), 20);
        assert_eq!(window.count_dirty(), 10);
        window.adjust_view(&idx, 12, 18);
        assert_eq!(window.lines().len(), 6);
        assert_eq!(window.covered(), 6);
    }

    #[test]
    fn change_before_window_shifts_it() {
        let folds = Folds::new();
        let idx = FoldIndex::new(&folds, 0, 103);
        let mut window = ViewWindow::new(0);
        window.adjust_view(&idx, 50, 60);
        let generation = window.generation();
        window.reg_change(&idx, 10, 11, 3);
        assert_eq!((window.from(), window.to()), (53, 63));
        assert_eq!(window.generation(), generation);
    }

    #[test]
    fn change_in_middle_splices() {
        let folds = Folds::new();
        let idx = FoldIndex::new(&folds, 0, 101);
        let mut window = ViewWindow::new(0);
        window.adjust_view(&idx, 0, 10);
        drawn(&mut window);
        window.reg_change(&idx, 4, 6, 1);
        assert_eq!((window.from(), window.to()), (0, 11));
        assert_eq!(window.covered(), 11);
        assert_eq!(window.count_dirty(), 3);
        assert_eq!(window.lines()[3].node(), Some(NodeId(4)));
        assert_eq!(window.lines()[7].node(), Some(NodeId(7)));
    }

    #[test]
    fn top_and_bottom_overlap_cut() {
        let folds = Folds::new();
        let idx = FoldIndex::new(&folds, 0, 100);
        let mut window = ViewWindow::new(0);
        window.adjust_view(&idx, 10, 20);
        window.reg_change(&idx, 5, 12, 0);
        assert_eq!((window.from(), window.to(), window.covered()), (12, 20, 8));
        window.reg_change(&idx, 18, 30, 0);
        assert_eq!((window.from(), window.to(), window.covered()), (12, 18, 6));
        window.reg_change(&idx, 0, 100, 0);
        assert!(window.is_empty());
    }

    #[test]
    fn line_change_only_marks_drawn_views() {
        let folds = Folds::new();
        let idx = FoldIndex::new(&folds, 0, 10);
        let mut window = ViewWindow::new(0);
        window.adjust_view(&idx, 0, 5);
        window.reg_line_change(2, DirtyAspects::GUTTER);
        assert!(window.lines()[2].changes().is_empty());
        drawn(&mut window);
        window.reg_line_change(2, DirtyAspects::GUTTER);
        assert_eq!(window.lines()[2].changes(), DirtyAspects::GUTTER);
        assert_eq!(window.count_dirty(), 1);
    }

    #[test]
    fn folds_make_single_entries() {
        let mut folds = Folds::new();
        folds.add(3, 6, FoldKind::Fold);
        let idx = FoldIndex::new(&folds, 0, 20);
        let mut window = ViewWindow::new(0);
        window.adjust_view(&idx, 0, 10);
        assert_eq!(window.lines().len(), 7);
        assert_eq!(window.lines()[3].size(), 4);
        assert_eq!(window.find_view_index(5), Some(3));
        assert_eq!(window.view_for_line(8), Some((5, 8)));
        assert_eq!(window.covered(), 10);
    }

    #[test]
    fn bounds_absorb_small_moves_and_snap_to_folds() {
        let folds = Folds::new();
        let idx = FoldIndex::new(&folds, 0, 1000);
        assert_eq!(window_bounds((0, 50), (25, 35), 10, &idx), (0, 50));
        assert_eq!(window_bounds((0, 50), (30, 35), 10, &idx), (20, 50));
        assert_eq!(window_bounds((0, 50), (200, 205), 10, &idx), (190, 215));
        // The old top edge is further than the absorb distance from the
        // new one, so it moves.
        assert_eq!(window_bounds((0, 50), (40, 45), 10, &idx), (30, 55));
        assert_eq!(window_bounds((0, 50), (40, 45), 25, &idx), (0, 70));
        assert_eq!(window_bounds((0, 50), (200, 210), 10, &idx), (190, 220));

        let mut folds = Folds::new();
        folds.add(185, 192, FoldKind::Fold);
        let idx = FoldIndex::new(&folds, 0, 1000);
        assert_eq!(window_bounds((0, 50), (200, 205), 10, &idx).0, 185);
    }
}
