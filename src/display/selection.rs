//! Cursor and selection overlay boxes.
//!
//! Prepared during the second read phase and shown in the second write
//! phase, so measuring never interleaves with drawing.

use crate::Editor;
use crate::host::{DomHost, Rect, SelectionDrawing};
use crate::measure::CoordSystem;
use crate::text::{Pos, Range};
use crate::unicode::{bidi_order, bidi_sections};

use super::Bias;

/// Distance kept between the parked input field and the wrapper edges.
const INPUT_EDGE: f64 = 10.0;

/// Box of a selection piece; `None` for the right edge runs to the side.
fn piece(left: f64, top: f64, right: Option<f64>, bottom: f64, right_side: f64) -> Rect {
    let top = top.max(0.0).round();
    Rect::new(left, top, right.unwrap_or(right_side), bottom.round())
}

impl<H: DomHost> Editor<H> {
    /// Measure every cursor and selected range inside the window.
    pub(crate) fn prepare_selection(&mut self) -> SelectionDrawing {
        let mut drawing = SelectionDrawing::default();
        let (view_from, view_to) = (self.display.view_from(), self.display.view_to());
        let ranges: Vec<Range> = self.sel.ranges().to_vec();
        for range in ranges {
            if range.from().line >= view_to || range.to().line < view_from {
                continue;
            }
            if range.empty() {
                self.draw_selection_cursor(range.head, &mut drawing.cursors);
            } else {
                self.draw_selection_range(range, &mut drawing.selection);
            }
        }

        let head = self.sel.primary().head;
        if head.line >= view_from && head.line < view_to {
            let pos = self.cursor_coords(head, CoordSystem::Div);
            let scroller = self.host.scroller();
            let (width, height) = self.host.wrapper_size();
            let top = pos.top + self.display.view_offset - scroller.scroll_top;
            let left = pos.left + self.host.gutter_width() - scroller.scroll_left;
            drawing.input_at = Some((
                left.min(width - INPUT_EDGE).max(0.0),
                top.min(height - INPUT_EDGE).max(0.0),
            ));
        }
        drawing
    }

    fn draw_selection_cursor(&mut self, head: Pos, out: &mut Vec<Rect>) {
        let (main, other) = self.cursor_coords_with(head, CoordSystem::Div, None);
        out.push(Rect::new(main.left, main.top, main.left, main.top.max(main.bottom)));
        if let Some(other) = other {
            out.push(Rect::new(other.left, other.top, other.left, other.top.max(other.bottom)));
        }
    }

    /// Right edge of a selection piece that runs to the end of its row.
    fn selection_right_side(&self) -> f64 {
        let gutter = self.host.gutter_width();
        let content = self.host.scroller().scroll_width - gutter - self.display.bar_width;
        content.max(self.display_width() - gutter)
    }

    /// Draw the part of `line` between two columns. `None` bounds extend to
    /// the line edges. Returns the first and last boxes touched.
    fn draw_for_line(
        &mut self,
        line: usize,
        from_arg: Option<usize>,
        to_arg: Option<usize>,
        out: &mut Vec<Rect>,
    ) -> (Option<Rect>, Option<Rect>) {
        let right_side = self.selection_right_side();
        let left_side = 0.0;
        let text = self.doc.line_text(line);
        let len = text.chars().count();
        let order = bidi_order(&text);
        let mut start: Option<Rect> = None;
        let mut end: Option<Rect> = None;

        let sections = bidi_sections(order.as_deref(), from_arg.unwrap_or(0), to_arg.unwrap_or(len));
        for (from, to, rtl) in sections {
            let mut left_pos = self.char_coords(Pos::new(line, from), CoordSystem::Div, Some(Bias::Left));
            let mut right_pos = left_pos;
            let mut left = left_pos.left;
            let mut right = left_pos.left;
            if from != to {
                right_pos = self.char_coords(
                    Pos::new(line, to - 1),
                    CoordSystem::Div,
                    Some(Bias::Right),
                );
                if rtl {
                    std::mem::swap(&mut left_pos, &mut right_pos);
                }
                left = left_pos.left;
                right = right_pos.right;
            }
            if from_arg.is_none() && from == 0 {
                left = left_side;
            }
            if right_pos.top - left_pos.top > 3.0 {
                out.push(piece(left, left_pos.top, None, left_pos.bottom, right_side));
                left = left_side;
                if left_pos.bottom < right_pos.top {
                    out.push(piece(left, left_pos.bottom, None, right_pos.top, right_side));
                }
            }
            if to_arg.is_none() && to == len {
                right = right_side;
            }
            if start.is_none_or(|s| {
                left_pos.top < s.top || (left_pos.top == s.top && left_pos.left < s.left)
            }) {
                start = Some(left_pos);
            }
            if end.is_none_or(|e| {
                right_pos.bottom > e.bottom
                    || (right_pos.bottom == e.bottom && right_pos.right > e.right)
            }) {
                end = Some(right_pos);
            }
            if left < left_side + 1.0 {
                left = left_side;
            }
            out.push(piece(left, right_pos.top, Some(right), right_pos.bottom, right_side));
        }
        (start, end)
    }

    fn draw_selection_range(&mut self, range: Range, out: &mut Vec<Rect>) {
        let right_side = self.selection_right_side();
        let left_side = 0.0;
        let (from, to) = (range.from(), range.to());
        if from.line == to.line {
            self.draw_for_line(from.line, Some(from.col), Some(to.col), out);
            return;
        }
        let single_visual =
            self.display.folds.visual_line_no(from.line) == self.display.folds.visual_line_no(to.line);
        let from_len = self.doc.content_length(from.line);
        let (_, left_end) = self.draw_for_line(
            from.line,
            Some(from.col),
            single_visual.then_some(from_len + 1),
            out,
        );
        let (right_start, _) =
            self.draw_for_line(to.line, single_visual.then_some(0), Some(to.col), out);
        let (Some(left_end), Some(right_start)) = (left_end, right_start) else {
            return;
        };
        if single_visual {
            if left_end.top < right_start.top - 2.0 {
                out.push(piece(left_end.right, left_end.top, None, left_end.bottom, right_side));
                out.push(piece(
                    left_side,
                    right_start.top,
                    Some(right_start.left),
                    right_start.bottom,
                    right_side,
                ));
            } else {
                out.push(piece(
                    left_end.right,
                    left_end.top,
                    Some(right_start.left),
                    left_end.bottom,
                    right_side,
                ));
            }
        }
        if left_end.bottom < right_start.top {
            out.push(piece(left_side, left_end.bottom, None, right_start.top, right_side));
        }
    }

    /// Redraw the selection right away, outside the flush phases.
    pub(crate) fn update_selection(&mut self) {
        let drawing = self.prepare_selection();
        self.show_selection(&drawing);
    }

    pub(crate) fn show_selection(&mut self, drawing: &SelectionDrawing) {
        self.input.show_selection(&mut self.host, drawing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_pieces_run_to_the_right_side() {
        let r = piece(4.0, -3.2, None, 16.4, 300.0);
        assert_eq!(r, Rect::new(4.0, 0.0, 300.0, 16.0));
        let r = piece(4.0, 16.0, Some(20.0), 32.0, 300.0);
        assert_eq!(r.right, 20.0);
    }
}
