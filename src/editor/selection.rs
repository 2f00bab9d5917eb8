//! Selection access and updates.

use super::Editor;
use crate::host::DomHost;
use crate::text::{Pos, Range, Selection, clip_pos};

impl<H: DomHost> Editor<H> {
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.sel
    }

    #[must_use]
    pub fn something_selected(&self) -> bool {
        self.sel.something_selected()
    }

    /// Replace the selection. Positions are clipped to the document and the
    /// primary head is scrolled into view.
    pub fn set_selection(&mut self, sel: Selection) {
        self.request_batch(|ed| {
            let doc = ed.doc.as_ref();
            let sel = sel.map(|pos| clip_pos(doc, pos));
            ed.set_selection_inner(sel, true);
        });
    }

    /// Collapse the selection to a cursor at `pos`.
    pub fn set_cursor(&mut self, pos: Pos) {
        self.set_selection(Selection::simple(pos, pos));
    }

    /// Move the head of the primary range to `head`, keeping its anchor.
    pub fn extend_selection(&mut self, head: Pos) {
        let anchor = self.sel.primary().anchor;
        let primary = self.sel.primary_index();
        let mut ranges = self.sel.ranges().to_vec();
        ranges[primary] = Range::new(anchor, head);
        self.set_selection(Selection::normalize(ranges, primary));
    }

    /// Install `sel` without clipping. Flags the flush to redraw the
    /// selection and resync the input field.
    pub(crate) fn set_selection_inner(&mut self, sel: Selection, scroll: bool) {
        if !sel.equals(&self.sel) {
            self.sel = sel;
            self.state.goal_columns.clear();
            if let Some(op) = self.cur_op.as_mut() {
                op.update_input = true;
                op.selection_changed = true;
                op.cursor_activity = true;
            }
        }
        if scroll {
            self.ensure_cursor_visible();
        }
    }

    /// Text of each range, in order.
    pub(crate) fn selections_text(&self) -> Vec<String> {
        self.sel
            .ranges()
            .iter()
            .map(|r| self.doc.range_lines(r.from(), r.to()).join("\n"))
            .collect()
    }

    /// Selected text, ranges joined with newlines.
    #[must_use]
    pub fn selected_text(&self) -> String {
        self.selections_text().join("\n")
    }
}
