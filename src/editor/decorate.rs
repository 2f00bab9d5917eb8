//! Folds, gutter markers, line classes and line widgets.

use tracing::trace;

use super::Editor;
use crate::display::{DirtyAspects, FoldKind, LineClassTarget};
use crate::host::DomHost;
use crate::text::{Pos, clip_line};

impl<H: DomHost> Editor<H> {
    /// Collapse lines `from..=to` into one visual line showing `from`
    /// followed by the fold marker. Returns the fold id, or `None` when the
    /// range is a single line or overlaps an existing fold.
    pub fn fold_lines(&mut self, from: usize, to: usize) -> Option<u32> {
        self.add_fold(from, to, FoldKind::Fold)
    }

    /// Stop drawing lines `from..=to` at all.
    pub fn hide_lines(&mut self, from: usize, to: usize) -> Option<u32> {
        self.add_fold(from, to, FoldKind::Hide)
    }

    fn add_fold(&mut self, from: usize, to: usize, kind: FoldKind) -> Option<u32> {
        let from = clip_line(self.doc.as_ref(), from);
        let to = clip_line(self.doc.as_ref(), to);
        self.request_batch(|ed| {
            let range = ed.display.folds.add(from, to, kind)?;
            trace!(from, to, ?kind, id = range.id, "lines collapsed");
            ed.collapsed_lines_changed(from, to);
            let sel = ed.sel.map(|pos| ed.visible_pos(pos));
            ed.set_selection_inner(sel, false);
            Some(range.id)
        })
    }

    /// Remove a fold or hidden range. Returns whether it existed.
    pub fn unfold(&mut self, id: u32) -> bool {
        self.request_batch(|ed| {
            let Some(range) = ed.display.folds.remove(id) else {
                return false;
            };
            ed.collapsed_lines_changed(range.from, range.to);
            true
        })
    }

    fn collapsed_lines_changed(&mut self, from: usize, to: usize) {
        for line in from..=to {
            let height = self.estimate_line_height(line);
            self.display.heights.set_height(line, height);
        }
        self.reg_change(Some(from), Some(to + 1), 0);
        if let Some(op) = self.cur_op.as_mut() {
            op.update_max_line = true;
            op.selection_changed = true;
        }
    }

    /// Nearest position to `pos` that is drawn.
    fn visible_pos(&self, pos: Pos) -> Pos {
        let folds = &self.display.folds;
        let Some(range) = folds.at(pos.line).copied() else {
            return pos;
        };
        match range.kind {
            FoldKind::Fold if pos.line == range.from => pos,
            FoldKind::Fold => Pos::new(range.from, self.doc.content_length(range.from)),
            FoldKind::Hide if range.to < self.doc.last_line() => Pos::new(range.to + 1, 0),
            FoldKind::Hide if range.from > self.doc.first_line() => {
                Pos::new(range.from - 1, self.doc.content_length(range.from - 1))
            }
            FoldKind::Hide => pos,
        }
    }

    /// Set or clear the marker of `line` in `gutter`.
    pub fn set_gutter_marker(&mut self, line: usize, gutter: &str, marker: Option<&str>) {
        self.request_batch(|ed| {
            if ed.display.decorations.set_marker(line, gutter, marker) {
                ed.reg_line_change(line, DirtyAspects::GUTTER);
            }
        });
    }

    /// Set or clear one of the classes of `line`.
    pub fn set_line_class(&mut self, line: usize, target: LineClassTarget, class: Option<&str>) {
        self.request_batch(|ed| {
            if ed.display.decorations.set_class(line, target, class) {
                let aspect = if target == LineClassTarget::Gutter {
                    DirtyAspects::GUTTER
                } else {
                    DirtyAspects::CLASS
                };
                ed.reg_line_change(line, aspect);
            }
        });
    }

    /// Attach a block widget of `height` pixels above or below `line`.
    pub fn add_line_widget(&mut self, line: usize, text: &str, height: f64, above: bool) -> Option<u32> {
        self.request_batch(|ed| {
            let id = ed.display.decorations.add_widget(line, text, height, above)?;
            ed.widget_height_changed(line, height);
            Some(id)
        })
    }

    /// Detach a widget. Returns whether it existed.
    pub fn remove_line_widget(&mut self, id: u32) -> bool {
        self.request_batch(|ed| {
            let Some((line, height)) = ed.display.decorations.remove_widget(id) else {
                return false;
            };
            ed.widget_height_changed(line, -height);
            true
        })
    }

    fn widget_height_changed(&mut self, line: usize, diff: f64) {
        if !self.display.folds.is_hidden(line) {
            let height = (self.display.heights.height(line) + diff).max(0.0);
            self.display.heights.set_height(line, height);
            // Keep the text in place when the widget sits above the view.
            if self.display.heights.height_at_line(line) < self.display.scroll_top {
                let top = self.display.scroll_top;
                if let Some(op) = self.cur_op.as_mut() {
                    op.scroll_top = Some(op.scroll_top.unwrap_or(top) + diff);
                }
            }
        }
        self.reg_line_change(line, DirtyAspects::WIDGET);
    }
}

#[cfg(test)]
mod tests {
    use crate::display::LineClassTarget;
    use crate::host::MemoryDom;
    use crate::text::Pos;
    use crate::{Editor, EditorOptions};

    fn editor(text: &str) -> Editor {
        Editor::new(MemoryDom::new(400.0, 160.0), text, EditorOptions::default())
    }

    #[test]
    fn folded_lines_render_as_one() {
        let mut ed = editor("a\nb\nc\nd");
        let id = ed.fold_lines(1, 2);
        assert!(id.is_some());
        assert_eq!(ed.host().rendered_lines().len(), 3);
        assert_eq!(ed.display().heights().height(2), 0.0);
        assert!(ed.unfold(id.unwrap_or_default()));
        assert_eq!(ed.host().rendered_lines(), vec!["a", "b", "c", "d"]);
        assert_eq!(ed.display().heights().height(2), 16.0);
    }

    #[test]
    fn cursor_leaves_hidden_lines() {
        let mut ed = editor("a\nbb\nc\nd");
        ed.set_cursor(Pos::new(2, 1));
        ed.fold_lines(1, 2);
        assert_eq!(ed.selection().primary().head, Pos::new(1, 2));

        let mut ed = editor("a\nb\nc");
        ed.set_cursor(Pos::new(1, 0));
        ed.hide_lines(1, 1);
        assert_eq!(ed.selection().primary().head, Pos::new(2, 0));

        let mut ed = editor("a\nb\nc");
        ed.set_cursor(Pos::new(2, 1));
        ed.hide_lines(2, 2);
        assert_eq!(ed.selection().primary().head, Pos::new(1, 1));
    }

    #[test]
    fn overlapping_folds_are_rejected() {
        let mut ed = editor("a\nb\nc\nd");
        assert!(ed.fold_lines(0, 2).is_some());
        assert!(ed.fold_lines(2, 3).is_none());
        assert!(ed.fold_lines(3, 3).is_none());
    }

    #[test]
    fn decorations_mark_only_their_aspect() {
        let mut ed = Editor::new(
            MemoryDom::new(400.0, 160.0),
            "a\nb",
            EditorOptions {
                gutters: vec!["marks".into()],
                ..EditorOptions::default()
            },
        );
        ed.host_mut().reset_stats();
        ed.set_gutter_marker(1, "marks", Some("*"));
        ed.set_line_class(0, LineClassTarget::Background, Some("hl"));
        let stats = ed.host().stats().clone();
        assert_eq!(stats.gutter_updates, 1);
        assert_eq!(stats.class_updates, 1);
        assert_eq!(stats.text_updates, 0);
        // Setting the same marker again is a no-op.
        ed.host_mut().reset_stats();
        ed.set_gutter_marker(1, "marks", Some("*"));
        assert_eq!(ed.host().stats().gutter_updates, 0);
    }

    #[test]
    fn widgets_add_to_the_line_height() {
        let mut ed = editor("a\nb");
        let id = ed.add_line_widget(0, "note", 10.0, false);
        assert!(id.is_some());
        assert_eq!(ed.display().heights().height(0), 26.0);
        assert!(ed.remove_line_widget(id.unwrap_or_default()));
        assert_eq!(ed.display().heights().height(0), 16.0);
        assert!(!ed.remove_line_widget(id.unwrap_or_default()));
    }
}
