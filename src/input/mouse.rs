//! Pointer handling: clicks, drags, gutter clicks and drag-and-drop.

use std::time::Duration;

use tracing::trace;

use crate::Editor;
use crate::event::EditorEvent;
use crate::host::DomHost;
use crate::input::event::{MouseButton, PointerEvent};
use crate::input::keyboard::KeyModifiers;
use crate::measure::CoordSystem;
use crate::text::{Pos, Range, Selection, clip_pos, max_pos, min_pos};
use crate::unicode::word_at;

/// Longest gap between the clicks of a double or triple click.
const DOUBLE_CLICK_DELAY: Duration = Duration::from_millis(400);

/// Pointer travel that turns a press on selected text into a drag.
const DRAG_THRESHOLD: f64 = 10.0;

/// How many clicks in a row a press completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickRepeat {
    Single,
    Double,
    Triple,
}

/// What a drag selects by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectUnit {
    Char,
    Word,
    Line,
}

impl From<ClickRepeat> for SelectUnit {
    fn from(repeat: ClickRepeat) -> Self {
        match repeat {
            ClickRepeat::Single => Self::Char,
            ClickRepeat::Double => Self::Word,
            ClickRepeat::Triple => Self::Line,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PastClick {
    time: Duration,
    pos: Pos,
    button: MouseButton,
}

impl PastClick {
    fn matches(&self, time: Duration, pos: Pos, button: MouseButton) -> bool {
        time < self.time + DOUBLE_CLICK_DELAY && pos == self.pos && button == self.button
    }
}

/// Recognizes double and triple clicks.
#[derive(Clone, Debug, Default)]
pub struct ClickTracker {
    last_click: Option<PastClick>,
    last_double: Option<PastClick>,
}

impl ClickTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press and classify it.
    pub fn register(&mut self, time: Duration, pos: Pos, button: MouseButton) -> ClickRepeat {
        if self
            .last_double
            .is_some_and(|c| c.matches(time, pos, button))
        {
            self.last_click = None;
            self.last_double = None;
            return ClickRepeat::Triple;
        }
        if self.last_click.is_some_and(|c| c.matches(time, pos, button)) {
            self.last_double = Some(PastClick { time, pos, button });
            self.last_click = None;
            return ClickRepeat::Double;
        }
        self.last_click = Some(PastClick { time, pos, button });
        ClickRepeat::Single
    }
}

/// A press in progress.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PointerGesture {
    /// Selecting by dragging.
    Select {
        unit: SelectUnit,
        start_sel: Selection,
        index: usize,
        range: Range,
        last_pos: Pos,
    },
    /// Pressed on selected text; may become a text drag.
    DragText {
        pos: Pos,
        start: (f64, f64),
        extend: bool,
        moved: bool,
    },
}

/// Widen `range` so it also covers `head`, keeping its anchor when it can.
fn extend_range(range: Range, head: Pos, other: Option<Pos>) -> Range {
    let mut anchor = range.anchor;
    let mut head = head;
    if let Some(other) = other {
        let pos_before = head < anchor;
        if pos_before != (other < anchor) {
            anchor = head;
            head = other;
        } else if pos_before != (head < other) {
            head = other;
        }
    }
    Range::new(anchor, head)
}

impl<H: DomHost> Editor<H> {
    /// Document position under a page point, or `None` over a widget
    /// unless `liberal`.
    pub(crate) fn pos_from_mouse(&mut self, event: &PointerEvent, liberal: bool) -> Option<Pos> {
        if event.over_widget && !liberal {
            return None;
        }
        if !self.host.is_visible() {
            return None;
        }
        Some(
            self.locate_position(event.x, event.y, CoordSystem::Page)
                .pos,
        )
    }

    /// Range a press at `pos` selects for `unit`.
    fn range_for_unit(&self, pos: Pos, unit: SelectUnit) -> Range {
        match unit {
            SelectUnit::Char => Range::cursor(pos),
            SelectUnit::Word => {
                let text = self.doc.line_text(pos.line);
                let (start, end) = word_at(&text, pos.col);
                Range::new(Pos::new(pos.line, start), Pos::new(pos.line, end))
            }
            SelectUnit::Line => Range::new(
                Pos::new(pos.line, 0),
                clip_pos(self.doc.as_ref(), Pos::new(pos.line + 1, 0)),
            ),
        }
    }

    /// Fire `GutterClick` when the press landed in a gutter. Returns
    /// whether it did.
    fn click_in_gutter(&mut self, event: &PointerEvent) -> bool {
        let rects = self.host.gutter_rects();
        let Some(last) = rects.last() else {
            return false;
        };
        if event.x >= last.right.floor() {
            return false;
        }
        let space = self.host.line_space_rect();
        if event.y > space.bottom {
            return true;
        }
        let ids = self.gutter_ids();
        if let Some(i) = rects.iter().position(|r| r.right >= event.x) {
            let line = self.line_at_height(event.y, CoordSystem::Page);
            if let Some(gutter) = ids.get(i).cloned() {
                trace!(line, gutter, "gutter click");
                self.signal(EditorEvent::GutterClick { line, gutter });
            }
        }
        true
    }

    /// Hold blur events back while a press may move focus around.
    pub(crate) fn delay_blur(&mut self) {
        self.state.delaying_blur = true;
        let at = self.host.now() + self.options.blur_delay;
        self.timers.set(crate::timers::TimerKind::Blur, at);
    }

    pub(crate) fn on_pointer_down(&mut self, event: &PointerEvent) -> bool {
        self.poll_input();
        self.state.shift = event.shift();
        if self.click_in_gutter(event) {
            return true;
        }
        let Some(pos) = self.pos_from_mouse(event, false) else {
            return false;
        };
        let now = self.host.now();
        let repeat = self.state.clicks.register(now, pos, event.button);
        match event.button {
            MouseButton::Left => {
                self.request_batch(|ed| ed.left_button_down(event, pos, repeat));
                true
            }
            MouseButton::Middle => {
                self.request_batch(|ed| {
                    ed.extend_primary(pos);
                    if let Some(op) = ed.cur_op.as_mut() {
                        op.focus = true;
                    }
                });
                true
            }
            MouseButton::Right => {
                self.delay_blur();
                false
            }
        }
    }

    fn left_button_down(&mut self, event: &PointerEvent, pos: Pos, repeat: ClickRepeat) {
        if let Some(op) = self.cur_op.as_mut() {
            op.focus = true;
        }
        let extend = event.shift();
        let contained = self
            .sel
            .contains(pos, pos)
            .map(|i| self.sel.ranges()[i])
            .filter(|r| !r.empty() && r.from() < pos && r.to() > pos);
        if !self.options.read_only && repeat == ClickRepeat::Single && contained.is_some() {
            self.state.pointer = Some(PointerGesture::DragText {
                pos,
                start: (event.x, event.y),
                extend,
                moved: false,
            });
            return;
        }
        self.left_button_select(event, pos, repeat.into());
    }

    fn left_button_select(&mut self, event: &PointerEvent, start: Pos, unit: SelectUnit) {
        self.delay_blur();
        let add_new = event
            .modifiers
            .intersects(KeyModifiers::CTRL | KeyModifiers::META);
        let extend = event.shift();
        let ranges = self.sel.ranges().to_vec();
        let (index, range) = if add_new && !extend {
            match self.sel.contains(start, start) {
                Some(i) => (Some(i), ranges[i]),
                None => (None, Range::cursor(start)),
            }
        } else {
            (Some(self.sel.primary_index()), self.sel.primary())
        };
        let unit_range = self.range_for_unit(start, unit);
        let range = if extend {
            extend_range(range, unit_range.anchor, Some(unit_range.head))
        } else {
            unit_range
        };

        match index {
            _ if !add_new => {
                self.set_selection_inner(Selection::new(vec![range], 0), true);
            }
            Some(i) if ranges.len() > 1 && ranges[i].empty() && unit == SelectUnit::Char && !extend => {
                // Ctrl-click on a lone cursor removes it.
                let mut rest = ranges;
                rest.remove(i);
                let primary = self.sel.primary_index().min(rest.len() - 1);
                self.set_selection_inner(Selection::normalize(rest, primary), false);
                self.state.pointer = None;
                return;
            }
            Some(i) => {
                let mut next = ranges;
                next[i] = range;
                self.set_selection_inner(Selection::normalize(next, i), true);
            }
            None => {
                let i = ranges.len();
                let mut next = ranges;
                next.push(range);
                self.set_selection_inner(Selection::normalize(next, i), false);
            }
        }
        // The range being dragged always ends up primary.
        self.state.pointer = Some(PointerGesture::Select {
            unit,
            start_sel: self.sel.clone(),
            index: self.sel.primary_index(),
            range,
            last_pos: start,
        });
    }

    /// Move the primary head to `pos`, keeping its anchor.
    fn extend_primary(&mut self, pos: Pos) {
        let primary = self.sel.primary();
        let ranges: Vec<Range> = self
            .sel
            .ranges()
            .iter()
            .map(|r| if *r == primary { Range::new(r.anchor, pos) } else { *r })
            .collect();
        let sel = Selection::normalize(ranges, self.sel.primary_index());
        self.set_selection_inner(sel, true);
    }

    pub(crate) fn on_pointer_move(&mut self, event: &PointerEvent) -> bool {
        match self.state.pointer.clone() {
            Some(PointerGesture::Select {
                unit,
                start_sel,
                index,
                range,
                last_pos,
            }) => {
                let Some(pos) = self.pos_from_mouse(event, true) else {
                    return false;
                };
                if pos == last_pos {
                    return true;
                }
                let to = self.range_for_unit(pos, unit);
                let (anchor, head) = if to.anchor > range.anchor {
                    (min_pos(range.from(), to.anchor), to.head)
                } else {
                    (max_pos(range.to(), to.head), to.anchor)
                };
                let mut ranges = start_sel.ranges().to_vec();
                if let Some(slot) = ranges.get_mut(index) {
                    *slot = Range::new(clip_pos(self.doc.as_ref(), anchor), head);
                }
                self.request_batch(|ed| {
                    ed.set_selection_inner(Selection::normalize(ranges, index), true);
                });
                self.state.pointer = Some(PointerGesture::Select {
                    unit,
                    start_sel,
                    index,
                    range,
                    last_pos: pos,
                });
                true
            }
            Some(PointerGesture::DragText {
                pos,
                start,
                extend,
                moved,
            }) => {
                let far = (event.x - start.0).abs() + (event.y - start.1).abs() >= DRAG_THRESHOLD;
                self.state.pointer = Some(PointerGesture::DragText {
                    pos,
                    start,
                    extend,
                    moved: moved || far,
                });
                false
            }
            None => false,
        }
    }

    pub(crate) fn on_pointer_up(&mut self, _event: &PointerEvent) -> bool {
        match self.state.pointer.take() {
            Some(PointerGesture::DragText {
                pos,
                extend,
                moved: false,
                ..
            }) => {
                self.request_batch(|ed| {
                    if extend {
                        ed.extend_primary(pos);
                    } else {
                        ed.set_selection_inner(Selection::simple(pos, pos), true);
                    }
                    if let Some(op) = ed.cur_op.as_mut() {
                        op.focus = true;
                    }
                });
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub(crate) fn on_drag_start(&mut self) -> bool {
        let text = self.selected_text();
        self.host.set_transfer_data(&text);
        self.state.dragging_text = true;
        self.state.pointer = None;
        true
    }

    /// Text dropped at `(x, y)`. A drag of our own selection moves it.
    pub(crate) fn on_drop(&mut self, x: f64, y: f64, text: &str) -> bool {
        let dragging = std::mem::take(&mut self.state.dragging_text);
        if self.options.read_only {
            return false;
        }
        let Some(pos) = self.pos_from_mouse(&PointerEvent::at(x, y), true) else {
            return false;
        };
        if dragging && self.sel.contains(pos, pos).is_some() {
            return true;
        }
        if text.is_empty() {
            return false;
        }
        self.request_batch(|ed| {
            let moved: Vec<Range> = if dragging {
                ed.sel.ranges().to_vec()
            } else {
                Vec::new()
            };
            ed.set_selection_inner(Selection::simple(pos, pos), false);
            for range in moved.iter().rev() {
                ed.replace_range_with_origin("", range.from(), range.to(), Some("drag"));
            }
            ed.replace_selection_around(text, Some("paste"));
            if let Some(op) = ed.cur_op.as_mut() {
                op.focus = true;
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_escalate_within_the_delay() {
        let mut clicks = ClickTracker::new();
        let p = Pos::new(1, 2);
        let t = Duration::from_millis(1000);
        assert_eq!(clicks.register(t, p, MouseButton::Left), ClickRepeat::Single);
        assert_eq!(
            clicks.register(t + Duration::from_millis(100), p, MouseButton::Left),
            ClickRepeat::Double
        );
        assert_eq!(
            clicks.register(t + Duration::from_millis(200), p, MouseButton::Left),
            ClickRepeat::Triple
        );
        assert_eq!(
            clicks.register(t + Duration::from_millis(300), p, MouseButton::Left),
            ClickRepeat::Single
        );
    }

    #[test]
    fn slow_or_moved_clicks_stay_single() {
        let mut clicks = ClickTracker::new();
        let t = Duration::from_millis(1000);
        clicks.register(t, Pos::new(0, 0), MouseButton::Left);
        assert_eq!(
            clicks.register(t + Duration::from_millis(500), Pos::new(0, 0), MouseButton::Left),
            ClickRepeat::Single
        );
        assert_eq!(
            clicks.register(t + Duration::from_millis(600), Pos::new(0, 1), MouseButton::Left),
            ClickRepeat::Single
        );
        assert_eq!(
            clicks.register(t + Duration::from_millis(650), Pos::new(0, 1), MouseButton::Middle),
            ClickRepeat::Single
        );
    }

    #[test]
    fn extend_range_keeps_the_anchor() {
        let range = Range::new(Pos::new(0, 2), Pos::new(0, 4));
        assert_eq!(
            extend_range(range, Pos::new(0, 8), None),
            Range::new(Pos::new(0, 2), Pos::new(0, 8))
        );
        // A word range on the other side of the anchor flips around it.
        let word = extend_range(range, Pos::new(0, 0), Some(Pos::new(0, 1)));
        assert_eq!(word, Range::new(Pos::new(0, 2), Pos::new(0, 0)));
    }
}
