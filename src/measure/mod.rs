//! Coordinate mapping between document positions and pixel boxes.
//!
//! Boxes are measured relative to a line's text element and cached on the
//! line's [`LineMeasure`](crate::display::LineMeasure), keyed by column and
//! bias. A line outside the rendered window is built in the host's
//! measuring container instead, without touching the window. Line-local
//! boxes are translated into the requested [`CoordSystem`] as the last
//! step.
//!
//! # Examples
//!
//! ```
//! use editview::host::MemoryDom;
//! use editview::measure::CoordSystem;
//! use editview::text::Pos;
//! use editview::{Editor, EditorOptions};
//!
//! let host = MemoryDom::new(400.0, 160.0).with_metrics(8.0, 16.0);
//! let mut editor = Editor::new(host, "hello\nworld", EditorOptions::default());
//! let b = editor.measure_position(Pos::new(1, 2), CoordSystem::Local);
//! assert_eq!((b.left, b.top, b.bottom), (16.0, 16.0, 32.0));
//! ```

mod locate;

use tracing::trace;

pub use locate::Located;

use crate::Editor;
use crate::display::{Bias, LineMeasure};
use crate::host::{DomHost, MapEntry, NodeId, Rect, SpanKind};
use crate::text::{Pos, clip_line, clip_pos};
use crate::unicode::{bidi_order, bidi_part_at, is_extending_char};

/// Frame a box is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoordSystem {
    /// Relative to the top of the visual line.
    Line,
    /// Relative to the top of the document.
    #[default]
    Local,
    /// Relative to the line container.
    Div,
    /// Page coordinates.
    Page,
}

/// Where a column falls in a line map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MapPlace {
    pub span: usize,
    /// Char range to measure, relative to the entry's start.
    pub start: isize,
    pub end: isize,
    pub collapse: Option<Bias>,
    pub cover_start: usize,
    pub cover_end: usize,
}

/// Find the span covering column `ch`, or the one closest to it.
pub(crate) fn node_and_offset_in_line_map(
    map: &[MapEntry],
    ch: usize,
    bias: Option<Bias>,
) -> Option<MapPlace> {
    let last = map.len().checked_sub(1)?;
    for (i, entry) in map.iter().enumerate() {
        let (m_start, m_end) = (entry.from, entry.to);
        let mut collapse = None;
        let range = if ch < m_start {
            collapse = Some(Bias::Left);
            Some((0, 1))
        } else if ch < m_end {
            let start = (ch - m_start) as isize;
            Some((start, start + 1))
        } else if i == last || (ch == m_end && map[i + 1].from > ch) {
            let end = (m_end - m_start) as isize;
            collapse = Some(Bias::Right);
            Some((end - 1, end))
        } else {
            None
        };
        let Some((start, end)) = range else {
            continue;
        };

        let mut at = i;
        let side = if entry.insert_left { Bias::Left } else { Bias::Right };
        if m_start == m_end && bias == Some(side) {
            collapse = bias;
        }
        if bias == Some(Bias::Left) && start == 0 {
            while at > 0 && map[at - 1].from == map[at - 1].to && map[at - 1].insert_left {
                at -= 1;
                collapse = Some(Bias::Left);
            }
        }
        if bias == Some(Bias::Right) && start == (m_end - m_start) as isize {
            while at < last && map[at + 1].from == map[at + 1].to && !map[at + 1].insert_left {
                at += 1;
                collapse = Some(Bias::Right);
            }
        }
        return Some(MapPlace {
            span: map[at].span,
            start,
            end,
            collapse,
            cover_start: m_start,
            cover_end: m_end,
        });
    }
    None
}

/// First (left bias) or last non-empty box of a list.
fn useful_rect(rects: &[Rect], bias: Option<Bias>) -> Rect {
    let mut rect = Rect::default();
    if bias == Some(Bias::Left) {
        for r in rects {
            rect = *r;
            if r.left != r.right {
                break;
            }
        }
    } else {
        for r in rects.iter().rev() {
            rect = *r;
            if r.left != r.right {
                break;
            }
        }
    }
    rect
}

fn bounding_rect(rects: &[Rect]) -> Rect {
    let mut iter = rects.iter();
    let Some(first) = iter.next() else {
        return Rect::default();
    };
    iter.fold(*first, |acc, r| {
        Rect::new(
            acc.left.min(r.left),
            acc.top.min(r.top),
            acc.right.max(r.right),
            acc.bottom.max(r.bottom),
        )
    })
}

/// A line made ready for repeated measurement.
#[derive(Clone, Debug)]
pub(crate) struct PreparedMeasure {
    pub line: usize,
    /// First line of the visual line.
    pub view_start: usize,
    /// Window index, or `None` for the measuring container.
    pub index: Option<usize>,
    pub node: NodeId,
    /// 0 for the first logical line, then one per continuation line.
    pub map_index: usize,
    pub chars: Vec<char>,
    /// Text box, read on first use.
    pub rect: Option<Rect>,
    pub has_heights: bool,
}

impl<H: DomHost> Editor<H> {
    fn line_measure(&self, prepared: &PreparedMeasure) -> Option<&LineMeasure> {
        match prepared.index {
            Some(i) => self.display.window.lines().get(i)?.measure.as_ref(),
            None => self.display.external.as_ref()?.view.measure.as_ref(),
        }
    }

    fn line_measure_mut(&mut self, prepared: &PreparedMeasure) -> Option<&mut LineMeasure> {
        match prepared.index {
            Some(i) => self.display.window.lines_mut().get_mut(i)?.measure.as_mut(),
            None => self.display.external.as_mut()?.view.measure.as_mut(),
        }
    }

    /// Find or build the rendered text of `line` for measuring.
    pub(crate) fn prepare_measure_for_line(&mut self, line: usize) -> PreparedMeasure {
        let line = clip_line(self.doc.as_ref(), line);
        let chars = self.doc.line_text(line).chars().collect();
        let drawn = self
            .display
            .window
            .view_for_line(line)
            .filter(|&(i, _)| {
                let view = &self.display.window.lines()[i];
                !view.hidden && view.node.is_some()
            });

        let (index, view_start, node) = match drawn {
            Some((index, start)) => {
                if !self.display.window.lines()[index].changes.is_empty() {
                    self.refresh_line_view(index, start);
                    if let Some(op) = self.cur_op.as_mut() {
                        op.force_update = true;
                    }
                }
                let node = self.display.window.lines()[index].node;
                (Some(index), start, node)
            }
            None => match &self.display.external {
                Some(ext) if line >= ext.line && line < ext.line + ext.size => {
                    (None, ext.line, ext.view.node)
                }
                _ => {
                    let (start, node) = self.update_external_measurement(line);
                    (None, start, Some(node))
                }
            },
        };
        PreparedMeasure {
            line,
            view_start,
            index,
            node: node.unwrap_or(NodeId(0)),
            map_index: line - view_start,
            chars,
            rect: None,
            has_heights: false,
        }
    }

    /// Box of column `ch`, relative to the line's text element.
    pub(crate) fn measure_char_prepared(
        &mut self,
        prepared: &mut PreparedMeasure,
        ch: usize,
        bias: Option<Bias>,
    ) -> Rect {
        let wrapping = self.options.line_wrapping;
        let width = wrapping.then(|| self.display_width());
        let key = (ch, bias);
        let map_index = prepared.map_index;
        if let Some(measure) = self.line_measure_mut(prepared) {
            if wrapping && measure.width.is_some() && measure.width != width {
                measure.clear_cache();
            }
            if let Some(found) = measure.caches.get(map_index).and_then(|c| c.get(&key)) {
                return *found;
            }
        }

        let rect = match prepared.rect {
            Some(r) => r,
            None => {
                let r = self.host.text_rect(prepared.node);
                prepared.rect = Some(r);
                r
            }
        };
        if !prepared.has_heights {
            self.ensure_line_heights(prepared, rect);
            prepared.has_heights = true;
        }
        let (found, bogus) = self.measure_char_inner(prepared, rect, ch, bias);
        if bogus {
            trace!(line = prepared.line, ch, "bogus measurement; not cached");
        } else if let Some(cache) = self
            .line_measure_mut(prepared)
            .and_then(|m| m.caches.get_mut(map_index))
        {
            cache.insert(key, found);
        }
        found
    }

    /// Record where the wrapped rows of a line start.
    fn ensure_line_heights(&mut self, prepared: &PreparedMeasure, rect: Rect) {
        let wrapping = self.options.line_wrapping;
        let width = wrapping.then(|| self.display_width());
        let stale = self
            .line_measure(prepared)
            .is_some_and(|m| m.heights.is_none() || (wrapping && m.width != width));
        if !stale {
            return;
        }
        let mut heights = Vec::new();
        if wrapping {
            let rows = self.host.text_row_rects(prepared.node);
            for pair in rows.windows(2) {
                let (cur, next) = (pair[0], pair[1]);
                if (cur.bottom - next.bottom).abs() > 2.0 {
                    heights.push((cur.bottom + next.top) / 2.0 - rect.top);
                }
            }
        }
        heights.push(rect.bottom - rect.top);
        if let Some(measure) = self.line_measure_mut(prepared) {
            measure.heights = Some(heights);
            if wrapping {
                measure.width = width;
            }
        }
    }

    /// Measure column `ch`. The second value flags a degenerate box.
    fn measure_char_inner(
        &mut self,
        prepared: &PreparedMeasure,
        rect: Rect,
        ch: usize,
        bias: Option<Bias>,
    ) -> (Rect, bool) {
        let Some(measure) = self.line_measure(prepared) else {
            return (Rect::default(), true);
        };
        let Some(place) = node_and_offset_in_line_map(measure.map_for(prepared.map_index), ch, bias)
        else {
            return (Rect::default(), true);
        };
        let kind = measure.span_kind(place.span);
        let heights = measure
            .heights
            .clone()
            .unwrap_or_else(|| vec![rect.bottom - rect.top]);
        let node = prepared.node;
        let mut collapse = place.collapse;

        let found = match kind {
            SpanKind::Text => {
                let extending = |at: isize| {
                    usize::try_from(at)
                        .ok()
                        .and_then(|i| prepared.chars.get(place.cover_start + i))
                        .is_some_and(|c| is_extending_char(*c))
                };
                let (mut start, mut end) = (place.start.max(0), place.end);
                let cover = (place.cover_end - place.cover_start) as isize;
                let mut found = Rect::default();
                for _ in 0..4 {
                    while start > 0 && extending(start) {
                        start -= 1;
                    }
                    while end < cover && extending(end) {
                        end += 1;
                    }
                    let rects =
                        self.host
                            .span_rects(node, place.span, start as usize, end.max(start) as usize);
                    found = useful_rect(&rects, bias);
                    if found.left != 0.0 || found.right != 0.0 || start == 0 {
                        break;
                    }
                    end = start;
                    start -= 1;
                    collapse = Some(Bias::Right);
                }
                found
            }
            SpanKind::Widget => {
                let mut bias = bias;
                if place.start > 0 {
                    collapse = Some(Bias::Right);
                    bias = Some(Bias::Right);
                }
                let rects = self.host.span_rects(node, place.span, 0, 0);
                if self.options.line_wrapping && rects.len() > 1 {
                    let pick = if bias == Some(Bias::Right) {
                        rects.last()
                    } else {
                        rects.first()
                    };
                    pick.copied().unwrap_or_default()
                } else {
                    bounding_rect(&rects)
                }
            }
        };

        let rtop = found.top - rect.top;
        let rbot = found.bottom - rect.top;
        let mid = (rtop + rbot) / 2.0;
        let mut row = 0;
        while row + 1 < heights.len() && mid >= heights[row] {
            row += 1;
        }
        let top = if row > 0 { heights[row - 1] } else { 0.0 };
        let bottom = heights[row];
        let left = if collapse == Some(Bias::Right) {
            found.right
        } else {
            found.left
        };
        let right = if collapse == Some(Bias::Left) {
            found.left
        } else {
            found.right
        };
        let bogus = found.left == 0.0 && found.right == 0.0;
        (
            Rect::new(left - rect.left, top, right - rect.left, bottom),
            bogus,
        )
    }

    /// Line-local box of column `ch` of `line`.
    pub(crate) fn measure_char(&mut self, line: usize, ch: usize, bias: Option<Bias>) -> Rect {
        let mut prepared = self.prepare_measure_for_line(line);
        self.measure_char_prepared(&mut prepared, ch, bias)
    }

    /// Height of the above-line widgets drawn before the text of the visual
    /// line holding `line`.
    fn widget_top_height(&self, line: usize) -> f64 {
        let start = self.display.folds.visual_line_no(line);
        let (size, _) = self.display.folds.visual_line_at(start);
        (start..start + size)
            .filter_map(|l| self.display.decorations.get(l))
            .flat_map(|d| d.widgets.iter())
            .filter(|w| w.above)
            .map(|w| w.height)
            .sum()
    }

    /// Move a line-local box into `system`.
    pub(crate) fn into_coord_system(&self, line: usize, rect: Rect, system: CoordSystem) -> Rect {
        let rect = rect.translate(0.0, self.widget_top_height(line));
        if system == CoordSystem::Line {
            return rect;
        }
        let start = self.display.folds.visual_line_no(line);
        let mut y = self.display.heights.height_at_line(start);
        let mut x = 0.0;
        match system {
            CoordSystem::Line | CoordSystem::Local => {}
            CoordSystem::Div => y -= self.display.view_offset,
            CoordSystem::Page => {
                let space = self.host.line_space_rect();
                y += space.top - self.display.view_offset;
                x = space.left;
            }
        }
        rect.translate(x, y)
    }

    /// Convert a point in `system` to line-container coordinates.
    pub(crate) fn from_coord_system(&self, x: f64, y: f64, system: CoordSystem) -> (f64, f64) {
        match system {
            CoordSystem::Div => (x, y),
            CoordSystem::Line | CoordSystem::Local => (x, y - self.display.view_offset),
            CoordSystem::Page => {
                let space = self.host.line_space_rect();
                (x - space.left, y - space.top)
            }
        }
    }

    /// Box of the char at `pos`.
    pub(crate) fn char_coords(&mut self, pos: Pos, system: CoordSystem, bias: Option<Bias>) -> Rect {
        let pos = clip_pos(self.doc.as_ref(), pos);
        let rect = self.measure_char(pos.line, pos.col, bias);
        self.into_coord_system(pos.line, rect, system)
    }

    /// Zero-width cursor box at `pos`, plus the secondary box drawn on a
    /// boundary between bidi runs.
    pub(crate) fn cursor_coords_with(
        &mut self,
        pos: Pos,
        system: CoordSystem,
        prepared: Option<&mut PreparedMeasure>,
    ) -> (Rect, Option<Rect>) {
        let pos = clip_pos(self.doc.as_ref(), pos);
        let mut own;
        let prepared = match prepared {
            Some(p) => p,
            None => {
                own = self.prepare_measure_for_line(pos.line);
                &mut own
            }
        };
        let line = pos.line;
        let get = |ed: &mut Self, prepared: &mut PreparedMeasure, ch: usize, right: bool| {
            let bias = if right { Bias::Right } else { Bias::Left };
            let mut m = ed.measure_char_prepared(prepared, ch, Some(bias));
            if right {
                m.left = m.right;
            } else {
                m.right = m.left;
            }
            ed.into_coord_system(line, m, system)
        };

        let text: String = prepared.chars.iter().collect();
        let Some(order) = bidi_order(&text) else {
            return (get(self, prepared, pos.col, false), None);
        };
        let get_bidi = |ed: &mut Self, prepared: &mut PreparedMeasure, ch: usize, part_pos: usize| {
            let mut part_pos = part_pos;
            let mut part = order[part_pos];
            let mut ch = ch;
            let mut right = part.is_rtl();
            if ch == part.left() && part_pos > 0 && part.level < order[part_pos - 1].level {
                part_pos -= 1;
                part = order[part_pos];
                ch = part.right().saturating_sub(usize::from(!part.is_rtl()));
                right = true;
            } else if ch == part.right()
                && part_pos + 1 < order.len()
                && part.level < order[part_pos + 1].level
            {
                part_pos += 1;
                part = order[part_pos];
                ch = part.left().saturating_sub(usize::from(part.is_rtl()));
                right = false;
            }
            if right && ch == part.to && ch > part.from {
                return get(ed, prepared, ch - 1, false);
            }
            get(ed, prepared, ch, right)
        };
        let (part_pos, other) = bidi_part_at(&order, pos.col);
        let main = get_bidi(self, prepared, pos.col, part_pos);
        let other = other.map(|o| get_bidi(self, prepared, pos.col, o));
        (main, other)
    }

    pub(crate) fn cursor_coords(&mut self, pos: Pos, system: CoordSystem) -> Rect {
        self.cursor_coords_with(pos, system, None).0
    }

    /// Box a position would have, from the height map and column width
    /// alone.
    pub(crate) fn estimate_coords(&mut self, pos: Pos) -> Rect {
        let pos = clip_pos(self.doc.as_ref(), pos);
        let left = if self.options.line_wrapping {
            0.0
        } else {
            self.char_width() * pos.col as f64
        };
        let top = self.display.heights.height_at_line(pos.line);
        Rect::new(left, top, left, top + self.display.heights.height(pos.line))
    }

    /// Cursor box of `pos` in `system`.
    pub fn measure_position(&mut self, pos: Pos, system: CoordSystem) -> Rect {
        self.cursor_coords(pos, system)
    }

    /// Box of the char after `pos` in `system`.
    pub fn char_box(&mut self, pos: Pos, system: CoordSystem) -> Rect {
        self.char_coords(pos, system, None)
    }

    /// Position nearest to the point `(x, y)` in `system`.
    pub fn locate_position(&mut self, x: f64, y: f64, system: CoordSystem) -> Located {
        let (x, y) = self.from_coord_system(x, y, system);
        self.coords_char(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(from: usize, to: usize, span: usize, insert_left: bool) -> MapEntry {
        MapEntry {
            from,
            to,
            span,
            insert_left,
        }
    }

    #[test]
    fn column_inside_a_span() {
        let map = [entry(0, 3, 0, false), entry(3, 6, 1, false)];
        let place = node_and_offset_in_line_map(&map, 4, None).unwrap();
        assert_eq!((place.span, place.start, place.end), (1, 1, 2));
        assert_eq!(place.collapse, None);
    }

    #[test]
    fn span_boundary_prefers_the_earlier_span() {
        let map = [entry(0, 3, 0, false), entry(3, 6, 1, false)];
        let place = node_and_offset_in_line_map(&map, 3, None).unwrap();
        assert_eq!((place.span, place.start, place.collapse), (1, 0, None));
        let end = node_and_offset_in_line_map(&map, 6, None).unwrap();
        assert_eq!((end.span, end.start, end.end), (1, 2, 3));
        assert_eq!(end.collapse, Some(Bias::Right));
    }

    #[test]
    fn zero_width_widgets_attach_by_bias() {
        let map = [
            entry(0, 2, 0, false),
            entry(2, 2, 1, true),
            entry(2, 4, 2, false),
        ];
        let left = node_and_offset_in_line_map(&map, 2, Some(Bias::Left)).unwrap();
        assert_eq!(left.span, 1);
        assert_eq!(left.collapse, Some(Bias::Left));
        let right = node_and_offset_in_line_map(&map, 2, Some(Bias::Right)).unwrap();
        assert_eq!(right.span, 2);
    }

    #[test]
    fn empty_line_placeholder_is_found() {
        let map = [entry(0, 0, 0, false)];
        let place = node_and_offset_in_line_map(&map, 0, None).unwrap();
        assert_eq!((place.span, place.start, place.end), (0, -1, 0));
        assert!(node_and_offset_in_line_map(&[], 0, None).is_none());
    }

    #[test]
    fn useful_rect_skips_empty_boxes() {
        let rects = [
            Rect::new(5.0, 0.0, 5.0, 10.0),
            Rect::new(5.0, 0.0, 9.0, 10.0),
            Rect::new(9.0, 10.0, 9.0, 20.0),
        ];
        assert_eq!(useful_rect(&rects, Some(Bias::Left)).right, 9.0);
        assert_eq!(useful_rect(&rects, None).left, 5.0);
        assert_eq!(bounding_rect(&rects), Rect::new(5.0, 0.0, 9.0, 20.0));
    }
}
