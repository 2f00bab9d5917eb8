//! Batched operations and the flush that closes them.
//!
//! Every mutation runs inside an operation. Operations nest: only the
//! outermost one flushes. A flush runs five phases, each across every
//! editor of the group before the next phase starts:
//!
//! 1. read: decide whether the window has to be redrawn
//! 2. write: reconcile the window against the host's line nodes
//! 3. read: measure line heights, scrollbar metrics, the widest line and
//!    the selection
//! 4. write: apply widths and scrollbars, show the selection
//! 5. finish: write scroll positions and fire the collected events
//!
//! Reads never follow a write of the same phase, so the host lays out at
//! most twice per flush no matter how many editors take part.
//!
//! # Examples
//!
//! ```
//! use editview::host::MemoryDom;
//! use editview::text::Pos;
//! use editview::{Editor, EditorOptions};
//!
//! let host = MemoryDom::new(400.0, 160.0);
//! let mut editor = Editor::new(host, "one\ntwo", EditorOptions::default());
//! editor.request_batch(|ed| {
//!     ed.replace_range("ONE", Pos::new(0, 0), Pos::new(0, 3));
//!     ed.set_cursor(Pos::new(1, 0));
//! });
//! assert_eq!(editor.host().rendered_lines(), vec!["ONE", "two"]);
//! ```

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace};

use crate::Editor;
use crate::display::{Bias, DisplayUpdate, Viewport};
use crate::event::EditorEvent;
use crate::host::{DomHost, ScrollMetrics, SelectionDrawing};
use crate::text::{Change, Pos, clip_pos};
use crate::timers::TimerKind;

/// Pending scroll-into-view request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScrollToPos {
    pub from: Pos,
    pub to: Pos,
    pub margin: f64,
}

/// What an open operation has recorded, plus the results its phases hand
/// each other.
#[derive(Debug, Default)]
pub(crate) struct OperationState {
    pub id: u64,
    pub view_changed: bool,
    pub start_height: f64,
    pub force_update: bool,
    pub update_input: bool,
    pub typing: bool,
    pub change_objs: Vec<Change>,
    pub cursor_activity: bool,
    pub selection_changed: bool,
    pub update_max_line: bool,
    pub scroll_left: Option<f64>,
    pub scroll_top: Option<f64>,
    pub scroll_to_pos: Option<ScrollToPos>,
    pub focus: bool,
    pub viewport_change: Option<(usize, usize)>,

    must_update: bool,
    update: Option<DisplayUpdate>,
    updated_display: bool,
    bar_measure: Option<ScrollMetrics>,
    adjust_width_to: Option<f64>,
    max_scroll_left: f64,
    prepared_selection: Option<SelectionDrawing>,
}

impl<H: DomHost> Editor<H> {
    /// Whether an operation is open.
    #[must_use]
    pub fn in_batch(&self) -> bool {
        self.cur_op.is_some()
    }

    /// Run `work` inside an operation.
    ///
    /// Inside an open operation `work` simply runs. Otherwise an operation
    /// is opened around it and flushed afterwards, even when `work`
    /// panics; the panic then continues.
    pub fn request_batch<R>(&mut self, work: impl FnOnce(&mut Self) -> R) -> R {
        if self.cur_op.is_some() {
            return work(self);
        }
        self.start_operation();
        let result = panic::catch_unwind(AssertUnwindSafe(|| work(self)));
        Self::end_group(&mut [self]);
        match result {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Run `work` with an operation open on every editor in `editors`,
    /// flushing them together.
    ///
    /// Editors that already had an operation open keep it; they flush when
    /// their own outer operation closes.
    pub fn run_group<R>(editors: &mut [&mut Self], work: impl FnOnce(&mut [&mut Self]) -> R) -> R {
        let opened: Vec<bool> = editors
            .iter_mut()
            .map(|ed| {
                let fresh = ed.cur_op.is_none();
                if fresh {
                    ed.start_operation();
                }
                fresh
            })
            .collect();
        let result = panic::catch_unwind(AssertUnwindSafe(|| work(&mut *editors)));
        let mut closing: Vec<&mut Self> = editors
            .iter_mut()
            .zip(&opened)
            .filter(|(_, fresh)| **fresh)
            .map(|(ed, _)| &mut **ed)
            .collect();
        Self::end_group(&mut closing);
        match result {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    pub(crate) fn start_operation(&mut self) {
        self.next_op_id += 1;
        let id = self.next_op_id;
        self.cur_op = Some(OperationState {
            id,
            start_height: self.display.heights.total(),
            ..OperationState::default()
        });
        trace!(op = id, "operation opened");
    }

    /// Run `f` once the current operation closes.
    ///
    /// Deferred work runs before the flush's first read phase, so whatever
    /// it changes is drawn by the same flush. Queued work that defers more
    /// work keeps running until none is left.
    pub fn defer(&mut self, f: impl FnOnce(&mut Self) + 'static) {
        self.request_batch(|ed| ed.delayed.push(Box::new(f)));
    }

    /// Report a change to `Changes` listeners when the batch closes.
    ///
    /// The change is taken as already applied to the document: the
    /// display is invalidated for it the same way as for an edit made
    /// through the editor.
    pub fn notify_change(&mut self, change: Change) {
        self.request_batch(|ed| ed.register_external_change(change));
    }

    /// Report a window move to `ViewportChange` listeners when the batch
    /// closes, unless the flush reports one itself.
    pub fn notify_viewport_change(&mut self, from: usize, to: usize) {
        self.request_batch(|ed| {
            if let Some(op) = ed.cur_op.as_mut() {
                op.viewport_change = Some((from, to));
            }
        });
    }

    /// Deferred callbacks and cursor activity, until none are left.
    fn fire_callbacks(editors: &mut [&mut Self]) {
        let mut rounds = 0usize;
        loop {
            let mut ran = false;
            for ed in editors.iter_mut() {
                let ed: &mut Self = ed;
                let delayed = std::mem::take(&mut ed.delayed);
                ran |= !delayed.is_empty();
                for callback in delayed {
                    callback(&mut *ed);
                }
                let activity = ed
                    .cur_op
                    .as_mut()
                    .is_some_and(|op| std::mem::take(&mut op.cursor_activity));
                if activity {
                    ed.signal(EditorEvent::CursorActivity);
                    ran = true;
                }
            }
            if !ran {
                break;
            }
            rounds += 1;
        }
        if rounds > 1 {
            trace!(rounds, "deferred callbacks settled");
        }
    }

    /// Close the operations of `editors` and flush them phase by phase.
    fn end_group(editors: &mut [&mut Self]) {
        Self::fire_callbacks(editors);
        let mut ops: Vec<Option<OperationState>> =
            editors.iter_mut().map(|ed| ed.cur_op.take()).collect();
        debug!(
            ops = ?ops.iter().flatten().map(|op| op.id).collect::<Vec<_>>(),
            "flushing operations"
        );
        for (ed, op) in editors.iter_mut().zip(ops.iter_mut()) {
            if let Some(op) = op {
                ed.end_operation_r1(op);
            }
        }
        for (ed, op) in editors.iter_mut().zip(ops.iter_mut()) {
            if let Some(op) = op {
                ed.end_operation_w1(op);
            }
        }
        for (ed, op) in editors.iter_mut().zip(ops.iter_mut()) {
            if let Some(op) = op {
                ed.end_operation_r2(op);
            }
        }
        for (ed, op) in editors.iter_mut().zip(ops.iter_mut()) {
            if let Some(op) = op {
                ed.end_operation_w2(op);
            }
        }
        for (ed, op) in editors.iter_mut().zip(ops) {
            if let Some(op) = op {
                ed.end_operation_finish(op);
            }
        }
    }

    fn maybe_clip_scrollbars(&mut self) {
        if !self.display.scrollbars_clipped && self.host.is_visible() {
            self.display.native_bar_width = self.host.native_bar_width();
            self.display.scrollbars_clipped = true;
        }
    }

    fn end_operation_r1(&mut self, op: &mut OperationState) {
        self.maybe_clip_scrollbars();
        if op.update_max_line {
            self.find_max_line();
        }
        let d = &self.display;
        let target_outside = op
            .scroll_to_pos
            .is_some_and(|p| p.from.line < d.view_from() || p.to.line >= d.view_to());
        op.must_update = op.view_changed
            || op.force_update
            || op.scroll_top.is_some()
            || target_outside
            || (d.max_line_changed && self.options.line_wrapping);
        if op.must_update {
            let viewport = Viewport {
                top: op.scroll_top,
                bottom: None,
                ensure: op.scroll_to_pos.map(|p| (p.from, p.to)),
            };
            op.update = Some(self.new_display_update(viewport, op.force_update));
        }
        trace!(op = op.id, must_update = op.must_update, "read phase 1");
    }

    fn end_operation_w1(&mut self, op: &mut OperationState) {
        if let Some(update) = op.update.as_mut() {
            op.updated_display = self.update_display_if_needed(update);
        }
    }

    fn end_operation_r2(&mut self, op: &mut OperationState) {
        if op.updated_display {
            self.update_heights_in_viewport();
        }
        let mut bar = self.measure_for_scrollbars();
        if self.display.max_line_changed && !self.options.line_wrapping {
            let max_line = self.display.max_line;
            let len = self.doc.content_length(max_line);
            let width = self.measure_char(max_line, len, None::<Bias>).left + 3.0;
            let gutter = self.host.gutter_width();
            bar.scroll_width = bar
                .client_width
                .max(gutter + width + self.display.bar_width);
            op.adjust_width_to = Some(width);
            op.max_scroll_left = (gutter + width - self.display_width()).max(0.0);
        }
        op.bar_measure = Some(bar);
        if op.updated_display || op.selection_changed {
            op.prepared_selection = Some(self.prepare_selection());
        }
    }

    fn end_operation_w2(&mut self, op: &mut OperationState) {
        if let Some(width) = op.adjust_width_to {
            self.host.set_sizer_min_width(width);
            if op.max_scroll_left < self.display.scroll_left {
                let left = self.host.scroller().scroll_left.min(op.max_scroll_left);
                self.set_scroll_left_inner(left, true, false);
            }
            self.display.max_line_changed = false;
        }
        if let Some(drawing) = op.prepared_selection.take() {
            self.show_selection(&drawing);
        }
        let height_changed = op.start_height != self.display.heights.total();
        if let Some(bar) = op.bar_measure {
            if op.updated_display || height_changed {
                self.update_scrollbars(bar);
            }
            if op.updated_display {
                self.set_document_height(&bar);
            }
        }
        if self.state.focused && op.update_input {
            self.reset_input(op.typing);
        }
        if op.focus && !self.host.has_focus() {
            self.host.focus();
        }
    }

    fn end_operation_finish(&mut self, mut op: OperationState) {
        if op.updated_display {
            if let Some(update) = op.update.as_mut() {
                self.post_update_display(update);
            }
        }
        let explicit_scroll =
            op.scroll_top.is_some() || op.scroll_left.is_some() || op.scroll_to_pos.is_some();
        if explicit_scroll && self.wheel.abort() {
            self.timers.clear(TimerKind::WheelSample);
        }

        if let Some(top) = op.scroll_top {
            self.set_scroll_top_inner(top, false);
        }
        if let Some(left) = op.scroll_left {
            self.set_scroll_left_inner(left, true, true);
        }
        if let Some(target) = op.scroll_to_pos {
            let from = clip_pos(self.doc.as_ref(), target.from);
            let to = clip_pos(self.doc.as_ref(), target.to);
            self.scroll_pos_into_view(from, to, target.margin);
        }
        if self.host.is_visible() {
            self.display.scroll_top = self.host.scroller().scroll_top;
        }

        if !op.change_objs.is_empty() {
            let changes = std::mem::take(&mut op.change_objs);
            self.signal(EditorEvent::Changes(changes));
        }
        let mut reported_viewport = false;
        if let Some(update) = op.update.take() {
            reported_viewport = update
                .events
                .iter()
                .any(|e| matches!(e, EditorEvent::ViewportChange { .. }));
            self.finish_display_update(update);
        }
        if let Some((from, to)) = op.viewport_change {
            if !reported_viewport {
                self.signal(EditorEvent::ViewportChange { from, to });
            }
        }
        trace!(op = op.id, updated = op.updated_display, "operation closed");
    }
}
