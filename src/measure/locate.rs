//! Pixel to position lookup.

use tracing::trace;

use super::{CoordSystem, PreparedMeasure};
use crate::Editor;
use crate::host::DomHost;
use crate::text::Pos;
use crate::unicode::{bidi_order, is_extending_char, line_left, line_right, move_visually};

/// Added to a probe that landed on another row, so the search treats it as
/// far to the right.
const WRONG_ROW_PENALTY: f64 = 1000.0;

/// Result of a position lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Located {
    pub pos: Pos,
    /// The point was outside the document's text.
    pub outside: bool,
    /// -1, 0 or 1: the point lies left of, on, or right of `pos`.
    pub x_rel: i8,
}

impl Located {
    fn new(pos: Pos, outside: bool, x_rel: i8) -> Self {
        Self {
            pos,
            outside,
            x_rel,
        }
    }
}

fn x_rel_of(diff: f64) -> i8 {
    if diff < -1.0 {
        -1
    } else if diff > 1.0 {
        1
    } else {
        0
    }
}

impl<H: DomHost> Editor<H> {
    /// Position nearest to `(x, y)` in line-container coordinates.
    pub(crate) fn coords_char(&mut self, x: f64, y: f64) -> Located {
        let y = y + self.display.view_offset;
        let first = self.doc.first_line();
        if y < 0.0 {
            return Located::new(Pos::new(first, 0), true, -1);
        }
        let last = self.doc.last_line();
        let line = self.display.heights.line_at_height(y);
        if line > last {
            let len = self.doc.content_length(last);
            return Located::new(Pos::new(last, len), true, 1);
        }
        let line = self.display.folds.visual_line_no(line);
        let found = self.coords_char_inner(line, x.max(0.0), y);

        // Past the fold marker lands at the end of the folded range.
        if let Some(fold) = self.display.folds.starting_at(line).copied() {
            let len = self.doc.content_length(line);
            if found.pos.col > len || (found.pos.col == len && found.x_rel > 0) {
                let end = Pos::new(fold.to, self.doc.content_length(fold.to));
                trace!(line, to = fold.to, "click past fold marker");
                return Located::new(end, found.outside, found.x_rel);
            }
        }
        found
    }

    /// Horizontal offset of the cursor at column `ch`, and whether it sits
    /// on a different row than `inner_off`.
    fn probe_x(
        &mut self,
        prepared: &mut PreparedMeasure,
        ch: usize,
        inner_off: f64,
        adjust: f64,
    ) -> (f64, bool) {
        let pos = Pos::new(prepared.line, ch);
        let (sp, _) = self.cursor_coords_with(pos, CoordSystem::Line, Some(prepared));
        if inner_off > sp.bottom {
            (sp.left - adjust, true)
        } else if inner_off < sp.top {
            (sp.left + adjust, true)
        } else {
            (sp.left, false)
        }
    }

    /// Binary search for the column under `x` on the visual line `line`.
    fn coords_char_inner(&mut self, line: usize, x: f64, y: f64) -> Located {
        let inner_off = y - self.display.heights.height_at_line(line);
        let adjust = 2.0 * self.host.wrapper_size().0;
        let mut prepared = self.prepare_measure_for_line(line);
        let chars = prepared.chars.clone();
        let text: String = chars.iter().collect();
        let order = bidi_order(&text);
        let order = order.as_deref();
        let len = chars.len();

        let mut dist = len;
        let mut from = line_left(order);
        let mut to = line_right(order, len);
        let (mut from_x, mut from_outside) = self.probe_x(&mut prepared, from, inner_off, adjust);
        let (mut to_x, mut to_outside) = self.probe_x(&mut prepared, to, inner_off, adjust);

        if x > to_x {
            return Located::new(Pos::new(line, to), to_outside, 1);
        }
        loop {
            let adjacent = match order {
                Some(_) => to == from || move_visually(&chars, order, from, 1, false) == Some(to),
                None => to <= from + 1,
            };
            if adjacent || dist == 0 {
                let pick_from = x < from_x || x - from_x <= to_x - x;
                let mut ch = if pick_from { from } else { to };
                let diff = x - if pick_from { from_x } else { to_x };
                while ch < len && is_extending_char(chars[ch]) {
                    ch += 1;
                }
                let outside = if pick_from { from_outside } else { to_outside };
                return Located::new(Pos::new(line, ch), outside, x_rel_of(diff));
            }
            let step = dist.div_ceil(2);
            let middle = match order {
                Some(_) => {
                    let mut middle = from;
                    for _ in 0..step {
                        middle = move_visually(&chars, order, middle, 1, false).unwrap_or(to);
                    }
                    middle
                }
                None => from + step,
            };
            let (middle_x, wrong) = self.probe_x(&mut prepared, middle, inner_off, adjust);
            if middle_x > x {
                to = middle;
                to_x = middle_x;
                to_outside = wrong;
                if wrong {
                    to_x += WRONG_ROW_PENALTY;
                }
                dist = step;
            } else {
                from = middle;
                from_x = middle_x;
                from_outside = wrong;
                dist -= step;
            }
        }
    }

    /// Line at vertical offset `height` in `system`.
    pub fn line_at_height(&self, height: f64, system: CoordSystem) -> usize {
        let (_, y) = self.from_coord_system(0.0, height, system);
        let line = self.display.heights.line_at_height(y + self.display.view_offset);
        line.min(self.doc.last_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_rel_has_a_dead_zone() {
        assert_eq!(x_rel_of(-3.0), -1);
        assert_eq!(x_rel_of(0.5), 0);
        assert_eq!(x_rel_of(4.0), 1);
    }
}
