//! Keeping the scroll container, the scrollbars, and the window in step.
//!
//! Inside a batch, scroll requests are only recorded on the operation and
//! the last one wins; the finish phase clamps it and writes it out. Scrolls
//! that come from the host (native scrolling, scrollbar drags, the wheel)
//! are applied immediately and only redraw when the new position leaves
//! the rendered window.

mod wheel;

use std::time::Duration;

use tracing::trace;

pub use wheel::WheelCalibration;

use crate::Editor;
use crate::display::Viewport;
use crate::host::{DomHost, Rect};
use crate::operation::ScrollToPos;
use crate::text::{Pos, clip_pos};

/// Scroll targets closer than this to the left edge scroll fully left.
const LEFT_SNAP: f64 = 10.0;

/// Passes allowed for a scroll-into-view whose target moves as lines are
/// measured.
const SCROLL_INTO_VIEW_PASSES: usize = 5;

/// Direction of a scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

/// Scroll offsets needed to bring a box into view; `None` axes are fine
/// as they are.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPos {
    pub top: Option<f64>,
    pub left: Option<f64>,
}

impl<H: DomHost> Editor<H> {
    /// Last scroll top the editor accepted.
    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.display.scroll_top
    }

    #[must_use]
    pub fn scroll_left(&self) -> f64 {
        self.display.scroll_left
    }

    /// Scroll vertically. Inside a batch, a later request replaces this one.
    pub fn set_scroll_top(&mut self, top: f64) {
        self.request_batch(|ed| {
            if let Some(op) = ed.cur_op.as_mut() {
                op.scroll_to_pos = None;
                op.scroll_top = Some(top);
            }
        });
    }

    /// Scroll horizontally. Inside a batch, a later request replaces this
    /// one.
    pub fn set_scroll_left(&mut self, left: f64) {
        self.request_batch(|ed| {
            if let Some(op) = ed.cur_op.as_mut() {
                op.scroll_to_pos = None;
                op.scroll_left = Some(left);
            }
        });
    }

    /// Scroll so that `from..to` is visible with `margin` pixels around it.
    pub fn scroll_into_view(&mut self, from: Pos, to: Pos, margin: f64) {
        self.request_batch(|ed| {
            let from = clip_pos(ed.doc.as_ref(), from);
            let to = clip_pos(ed.doc.as_ref(), to);
            if let Some(op) = ed.cur_op.as_mut() {
                op.scroll_top = None;
                op.scroll_left = None;
                op.scroll_to_pos = Some(ScrollToPos { from, to, margin });
            }
        });
    }

    /// Keep the primary cursor visible once the batch closes.
    pub(crate) fn ensure_cursor_visible(&mut self) {
        let head = self.sel.primary().head;
        let margin = self.options.cursor_scroll_margin;
        if let Some(op) = self.cur_op.as_mut() {
            op.scroll_top = None;
            op.scroll_left = None;
            op.scroll_to_pos = Some(ScrollToPos {
                from: head,
                to: head,
                margin,
            });
        }
    }

    /// Apply a scroll that already happened in the host, or that should
    /// happen right now.
    pub(crate) fn scroll_to(&mut self, axis: ScrollAxis, pos: f64) {
        match axis {
            ScrollAxis::Vertical => self.update_scroll_top(pos),
            ScrollAxis::Horizontal => self.set_scroll_left_inner(pos, false, false),
        }
    }

    /// Redraw for a new scroll top when it leaves the window, then write it.
    pub(crate) fn update_scroll_top(&mut self, top: f64) {
        if (self.display.scroll_top - top).abs() < 2.0 {
            return;
        }
        self.update_display_simple(Viewport::top(top));
        self.set_scroll_top_inner(top, true);
        self.start_worker(Duration::from_millis(100));
    }

    /// Clamp and record a scroll top, mirroring it on the scrollbars and
    /// the scroll container.
    pub(crate) fn set_scroll_top_inner(&mut self, top: f64, force: bool) {
        let scroller = self.host.scroller();
        let top = top
            .min(scroller.scroll_height - scroller.client_height)
            .max(0.0);
        if scroller.scroll_top == top && !force {
            return;
        }
        self.display.scroll_top = top;
        self.scrollbars.set_scroll_top(top);
        if self.host.scroller().scroll_top != top {
            self.host.set_scroll_top(top);
        }
    }

    /// Clamp and record a scroll left. `from_scroller` marks a value read
    /// back from the scroll container itself.
    pub(crate) fn set_scroll_left_inner(&mut self, left: f64, from_scroller: bool, force: bool) {
        let scroller = self.host.scroller();
        let left = left
            .min(scroller.scroll_width - scroller.client_width)
            .max(0.0);
        let unchanged = if from_scroller {
            left == self.display.scroll_left
        } else {
            (self.display.scroll_left - left).abs() < 2.0
        };
        if unchanged && !force {
            return;
        }
        self.display.scroll_left = left;
        self.align_horizontally();
        if self.host.scroller().scroll_left != left {
            self.host.set_scroll_left(left);
        }
        self.scrollbars.set_scroll_left(left);
    }

    /// The host's scroll container scrolled.
    pub(crate) fn on_scroll(&mut self) {
        let scroller = self.host.scroller();
        if scroller.client_height <= 0.0 {
            return;
        }
        trace!(top = scroller.scroll_top, left = scroller.scroll_left, "scroll");
        self.update_scroll_top(scroller.scroll_top);
        self.set_scroll_left_inner(scroller.scroll_left, true, false);
        self.signal(crate::event::EditorEvent::Scroll);
    }

    /// A custom scrollbar was dragged.
    pub(crate) fn on_scrollbar(&mut self, axis: ScrollAxis, pos: f64) {
        self.request_batch(|ed| ed.scroll_to(axis, pos));
    }

    /// Offsets that bring `rect` (document coordinates) into view.
    pub(crate) fn calculate_scroll_pos(&mut self, rect: Rect) -> ScrollPos {
        let snap_margin = self.text_height();
        let mut rect = rect;
        rect.top = rect.top.max(0.0);
        let screen_top = self
            .cur_op
            .as_ref()
            .and_then(|op| op.scroll_top)
            .unwrap_or_else(|| self.host.scroller().scroll_top);
        let screen = self.display_height();
        let mut result = ScrollPos::default();
        if rect.bottom - rect.top > screen {
            rect.bottom = rect.top + screen;
        }
        let doc_bottom = self.display.heights.total();
        let at_top = rect.top < snap_margin;
        let at_bottom = rect.bottom > doc_bottom - snap_margin;
        if rect.top < screen_top {
            result.top = Some(if at_top { 0.0 } else { rect.top });
        } else if rect.bottom > screen_top + screen {
            let target = if at_bottom { doc_bottom } else { rect.bottom };
            let new_top = rect.top.min(target - screen);
            if new_top != screen_top {
                result.top = Some(new_top);
            }
        }

        let gutter_width = self.host.gutter_width();
        let gutter_space = if self.options.fixed_gutter {
            0.0
        } else {
            gutter_width
        };
        let screen_left = self
            .cur_op
            .as_ref()
            .and_then(|op| op.scroll_left)
            .unwrap_or_else(|| self.host.scroller().scroll_left - gutter_space);
        let screen_w = self.display_width() - gutter_width;
        let too_wide = rect.right - rect.left > screen_w;
        if too_wide {
            rect.right = rect.left + screen_w;
        }
        let pad = if too_wide { 0.0 } else { LEFT_SNAP };
        if rect.left < LEFT_SNAP {
            result.left = Some(0.0);
        } else if rect.left < screen_left {
            result.left = Some((rect.left + gutter_space - pad).max(0.0));
        } else if rect.right > screen_w + screen_left - 3.0 {
            result.left = Some(rect.right + pad - screen_w);
        }
        result
    }

    /// Scroll until the range `from..to` is in view, re-measuring while the
    /// scroll brings new lines into the window. Returns the final box.
    pub(crate) fn scroll_pos_into_view(&mut self, from: Pos, to: Pos, margin: f64) -> Rect {
        let mut rect = Rect::default();
        for _ in 0..SCROLL_INTO_VIEW_PASSES {
            let mut changed = false;
            let coords = self.cursor_coords(from, crate::measure::CoordSystem::Local);
            let end = if to == from {
                coords
            } else {
                self.cursor_coords(to, crate::measure::CoordSystem::Local)
            };
            rect = Rect::new(
                coords.left.min(end.left),
                coords.top.min(end.top) - margin,
                coords.left.max(end.left),
                coords.bottom.max(end.bottom) + margin,
            );
            let target = self.calculate_scroll_pos(rect);
            let (start_top, start_left) = (self.display.scroll_top, self.display.scroll_left);
            if let Some(top) = target.top {
                self.update_scroll_top(top);
                if (self.display.scroll_top - start_top).abs() > 1.0 {
                    changed = true;
                }
            }
            if let Some(left) = target.left {
                self.set_scroll_left_inner(left, false, false);
                if (self.display.scroll_left - start_left).abs() > 1.0 {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        rect
    }
}
