//! Applying changes to the document and keeping the display in step.

use std::time::Duration;

use tracing::{debug, trace};

use super::Editor;
use crate::display::DirtyAspects;
use crate::host::DomHost;
use crate::text::{
    Change, Pos, Range, Selection, adjust_for_change, clip_pos, compute_sel_after_change, max_pos,
    split_lines,
};

impl<H: DomHost> Editor<H> {
    /// Replace `from..to` with `text`.
    pub fn replace_range(&mut self, text: &str, from: Pos, to: Pos) {
        self.replace_range_with_origin(text, from, to, None);
    }

    pub(crate) fn replace_range_with_origin(
        &mut self,
        text: &str,
        from: Pos,
        to: Pos,
        origin: Option<&str>,
    ) -> Option<Change> {
        let (from, to) = if to < from { (to, from) } else { (from, to) };
        let mut change = Change::new(from, to, split_lines(text));
        change.origin = origin.map(str::to_string);
        self.make_change(change)
    }

    /// Replace every selected range with `text`, leaving cursors after the
    /// inserted text.
    pub fn replace_selection(&mut self, text: &str) {
        self.replace_selection_with_origin(text, None);
    }

    pub(crate) fn replace_selection_with_origin(&mut self, text: &str, origin: Option<&str>) {
        self.request_batch(|ed| {
            let ranges = ed.sel.ranges().to_vec();
            for range in ranges.iter().rev() {
                ed.replace_range_with_origin(text, range.from(), range.to(), origin);
            }
            ed.ensure_cursor_visible();
        });
    }

    /// Replace the primary selection with `text` and select what was
    /// inserted.
    pub(crate) fn replace_selection_around(&mut self, text: &str, origin: Option<&str>) {
        self.request_batch(|ed| {
            let range = ed.sel.primary();
            let from = range.from();
            if let Some(applied) = ed.replace_range_with_origin(text, from, range.to(), origin) {
                let end = applied.end();
                ed.set_selection_inner(Selection::new(vec![Range::new(from, end)], 0), true);
            }
        });
    }

    /// Apply `change` inside a batch. Returns the change as applied, with
    /// `removed` filled in, or `None` when it did nothing.
    pub(crate) fn make_change(&mut self, change: Change) -> Option<Change> {
        if self.state.suppress_edits {
            trace!("edit suppressed");
            return None;
        }
        self.request_batch(|ed| ed.make_change_single_doc(change))
    }

    /// Apply a change expressed in whole-document coordinates to this
    /// editor's document, which may only show part of it.
    pub(crate) fn make_change_single_doc(&mut self, mut change: Change) -> Option<Change> {
        if change.text.is_empty() {
            change.text.push(String::new());
        }
        let first = self.doc.first_line();
        if change.to.line < first {
            self.shift_doc(change.line_delta());
            return None;
        }
        if change.from.line > self.doc.last_line() {
            return None;
        }
        if change.from.line < first {
            let shift = change.text.len() as isize - 1 - (first - change.from.line) as isize;
            self.shift_doc(shift);
            let first = self.doc.first_line();
            let text = change.text.pop().unwrap_or_default();
            change = Change {
                from: Pos::new(first, 0),
                to: Pos::new(change.to.line.saturating_add_signed(shift), change.to.col),
                text: vec![text],
                origin: change.origin,
                removed: Vec::new(),
            };
        }
        let last = self.doc.last_line();
        if change.to.line > last {
            let text = change.text.swap_remove(0);
            change = Change {
                from: change.from,
                to: Pos::new(last, self.doc.content_length(last)),
                text: vec![text],
                origin: change.origin,
                removed: Vec::new(),
            };
        }

        change.from = clip_pos(self.doc.as_ref(), change.from);
        change.to = clip_pos(self.doc.as_ref(), change.to);
        if change.is_noop() {
            return None;
        }
        change.removed = self.doc.range_lines(change.from, change.to);
        let sel_after = compute_sel_after_change(&self.sel, &change);
        self.update_display_for_change(&change, true);
        self.set_selection_inner(sel_after, false);
        Some(change)
    }

    /// Bring folds, decorations, heights, highlighting, the widest line and
    /// the window up to date for `change`. With `replace`, the change is
    /// also applied to the document.
    fn update_display_for_change(&mut self, change: &Change, replace: bool) {
        let (from, to) = (change.from, change.to);
        let lendiff = change.line_delta();
        let wrapping = self.options.line_wrapping;

        let check_start = self.display.folds.visual_line_no(from.line);
        let mut recompute_max = !wrapping && (check_start..=to.line).contains(&self.display.max_line);

        if self.sel.contains(from, to).is_some() {
            if let Some(op) = self.cur_op.as_mut() {
                op.cursor_activity = true;
            }
        }

        if replace {
            self.doc.replace(from, to, &change.text);
        }
        let dropped = self.display.folds.apply_change(change);
        self.display.decorations.apply_change(change);
        self.highlighter.apply_change(change);

        let new_lines = from.line..from.line + change.text.len();
        let estimates: Vec<f64> = new_lines
            .clone()
            .map(|line| self.estimate_line_height(line))
            .collect();
        self.display
            .heights
            .splice(from.line, to.line - from.line + 1, &estimates);

        if !wrapping {
            let d = &mut self.display;
            if !recompute_max && d.max_line > to.line {
                d.max_line = d.max_line.saturating_add_signed(lendiff);
            }
            let folds = &d.folds;
            let mut widest = None;
            for line in check_start..new_lines.end {
                if folds.is_hidden(line) {
                    continue;
                }
                let len = self.doc.content_length(line);
                if len > widest.map_or(d.max_line_length, |(_, l)| l) {
                    widest = Some((line, len));
                }
            }
            if let Some((line, len)) = widest {
                d.max_line = line;
                d.max_line_length = len;
                d.max_line_changed = true;
                recompute_max = false;
            }
            if recompute_max {
                if let Some(op) = self.cur_op.as_mut() {
                    op.update_max_line = true;
                }
            }
        }

        self.start_worker(Duration::from_millis(400));

        if !dropped.is_empty() {
            debug!(dropped = dropped.len(), "edit removed folds");
            self.estimate_line_heights();
            self.reg_change(None, None, 0);
        } else if from.line == to.line && change.text.len() == 1 {
            self.reg_line_change(from.line, DirtyAspects::TEXT);
        } else {
            self.reg_change(Some(from.line), Some(to.line + 1), lendiff);
        }

        if let Some(op) = self.cur_op.as_mut() {
            op.change_objs.push(change.clone());
        }
    }

    /// Display bookkeeping for a change already applied to the document
    /// by someone else.
    pub(crate) fn register_external_change(&mut self, mut change: Change) {
        if change.to < change.from {
            std::mem::swap(&mut change.from, &mut change.to);
        }
        if change.text.is_empty() {
            change.text.push(String::new());
        }
        change.from = clip_pos(self.doc.as_ref(), change.from);
        // `to` is in the coordinates the display still has, before the change.
        let heights = &self.display.heights;
        let last_known = (heights.first() + heights.len()).saturating_sub(1);
        if change.to.line > last_known {
            change.to = Pos::new(last_known, change.to.col);
        }
        change.to = max_pos(change.to, change.from);
        self.update_display_for_change(&change, false);
        let sel = {
            let doc = self.doc.as_ref();
            self.sel
                .map(|pos| clip_pos(doc, adjust_for_change(pos, &change)))
        };
        self.set_selection_inner(sel, false);
    }

    /// Move the document's first line by `delta`, for a change that landed
    /// entirely above it.
    pub(crate) fn shift_doc(&mut self, delta: isize) {
        if delta == 0 {
            return;
        }
        let first = self.doc.first_line().saturating_add_signed(delta);
        trace!(delta, first, "shifting document");
        self.doc.set_first_line(first);
        let d = &mut self.display;
        d.heights.set_first(first);
        d.decorations.set_first(first);
        d.folds.shift(delta);
        d.max_line = d.max_line.saturating_add_signed(delta);
        self.highlighter.set_first_line(first);
        self.sel = self.sel.map(|pos| Pos::new(pos.line.saturating_add_signed(delta), pos.col));
        self.reset_view();
        self.display.update_line_numbers = Some(first);
        if let Some(op) = self.cur_op.as_mut() {
            op.view_changed = true;
            op.selection_changed = true;
        }
    }

    /// Apply one change, in whole-document coordinates, to every editor
    /// showing a part of the same text, flushing them together.
    pub fn replace_range_linked(editors: &mut [&mut Self], text: &str, from: Pos, to: Pos) {
        let change = Change::new(from, to, split_lines(text));
        Self::run_group(editors, |eds| {
            for ed in eds.iter_mut() {
                ed.make_change_single_doc(change.clone());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::host::MemoryDom;
    use crate::text::{Document, Pos, RopeDocument};
    use crate::{Editor, EditorOptions};

    fn editor(text: &str) -> Editor {
        Editor::new(MemoryDom::new(400.0, 160.0), text, EditorOptions::default())
    }

    #[test]
    fn single_line_edit_patches_one_node() {
        let mut ed = editor("one\ntwo\nthree");
        ed.host_mut().reset_stats();
        ed.replace_range("TWO", Pos::new(1, 0), Pos::new(1, 3));
        assert_eq!(ed.host().rendered_lines(), vec!["one", "TWO", "three"]);
        let stats = ed.host().stats();
        assert_eq!(stats.text_updates, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.removed, 0);
    }

    #[test]
    fn multi_line_edit_updates_heights() {
        let mut ed = editor("a\nb");
        ed.replace_range("x\ny\nz", Pos::new(0, 1), Pos::new(0, 1));
        assert_eq!(ed.text(), "ax\ny\nz\nb");
        assert_eq!(ed.display().heights().len(), 4);
        assert_eq!(ed.host().rendered_lines(), vec!["ax", "y", "z", "b"]);
    }

    #[test]
    fn out_of_range_positions_are_clipped() {
        let mut ed = editor("abc");
        ed.replace_range("!", Pos::new(0, 99), Pos::new(5, 0));
        assert_eq!(ed.text(), "abc!");
    }

    #[test]
    fn widest_line_follows_edits() {
        let mut ed = editor("a\nbb\nc");
        assert_eq!(ed.display().max_line(), 1);
        ed.replace_range("cccc", Pos::new(2, 0), Pos::new(2, 1));
        assert_eq!(ed.display().max_line(), 2);
        ed.replace_range("", Pos::new(0, 0), Pos::new(1, 0));
        assert_eq!(ed.display().max_line(), 1);
    }

    #[test]
    fn removed_text_is_reported() {
        let mut ed = editor("hello world");
        let change = ed.replace_range_with_origin("", Pos::new(0, 5), Pos::new(0, 11), Some("+delete"));
        let change = change.expect("applied");
        assert_eq!(change.removed, vec![" world"]);
        assert_eq!(change.origin.as_deref(), Some("+delete"));
    }

    #[test]
    fn linked_sub_view_shifts_for_changes_above_it() {
        let mut whole = editor("0\n1\n2\n3\n4");
        let mut part_doc = RopeDocument::from_str("3\n4");
        part_doc.set_first_line(3);
        let mut part = Editor::with_document(
            MemoryDom::new(400.0, 160.0),
            Box::new(part_doc),
            EditorOptions::default(),
        );
        Editor::replace_range_linked(&mut [&mut whole, &mut part], "x\n", Pos::new(1, 0), Pos::new(1, 0));
        assert_eq!(whole.text(), "0\nx\n1\n2\n3\n4");
        assert_eq!(part.first_line(), 4);
        assert_eq!(part.text(), "3\n4");
        // A change that reaches into the sub-view edits it too.
        Editor::replace_range_linked(&mut [&mut whole, &mut part], "X", Pos::new(4, 0), Pos::new(4, 1));
        assert_eq!(part.text(), "X\n4");
        assert_eq!(part.host().rendered_lines(), vec!["X", "4"]);
    }

    #[test]
    fn external_change_redraws_the_line() {
        let mut ed = editor("abc\ndef");
        let text = vec!["zz".to_string()];
        ed.document_mut().replace(Pos::new(1, 0), Pos::new(1, 0), &text);
        assert_eq!(ed.host().rendered_lines(), vec!["abc", "def"]);
        ed.notify_change(crate::text::Change::new(Pos::new(1, 0), Pos::new(1, 0), text));
        assert_eq!(ed.host().rendered_lines(), vec!["abc", "zzdef"]);
    }

    #[test]
    fn reversed_external_change_is_reordered() {
        let mut ed = editor("abc\ndef\nghi");
        let text = vec![String::new()];
        ed.document_mut().replace(Pos::new(1, 0), Pos::new(2, 0), &text);
        ed.notify_change(crate::text::Change::new(Pos::new(2, 0), Pos::new(1, 0), text));
        assert_eq!(ed.display().heights().len(), 2);
        assert_eq!(ed.host().rendered_lines(), vec!["abc", "ghi"]);
    }

    #[test]
    fn external_change_without_text_is_a_single_empty_line() {
        let mut ed = editor("abc\ndef");
        let change = crate::text::Change {
            from: Pos::new(0, 1),
            to: Pos::new(0, 1),
            text: Vec::new(),
            origin: None,
            removed: Vec::new(),
        };
        ed.notify_change(change);
        assert_eq!(ed.display().heights().len(), 2);
        assert_eq!(ed.host().rendered_lines(), vec!["abc", "def"]);
    }

    #[test]
    fn stale_external_change_is_clipped() {
        let mut ed = editor("abc\ndef\nghi");
        ed.notify_change(crate::text::Change::new(
            Pos::new(5, 0),
            Pos::new(9, 0),
            vec![String::new()],
        ));
        assert_eq!(ed.text(), "abc\ndef\nghi");
        assert_eq!(ed.host().rendered_lines().len(), ed.display().window().lines().len());
    }
}
