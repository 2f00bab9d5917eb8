//! The display update cycle: choosing the window, redrawing it, and
//! syncing heights and scrollbars afterwards.

use std::time::Duration;

use tracing::{debug, trace};

use super::heights::HeightMap;
use super::view::{FoldIndex, window_bounds};
use super::LINE_NUMBER_GUTTER;
use crate::Editor;
use crate::event::EditorEvent;
use crate::host::{DomHost, NodeId, ScrollMetrics};
use crate::text::Pos;

/// Update passes allowed before settling for an uncovered viewport.
const MAX_UPDATE_PASSES: usize = 8;

/// Area an update should cover, overriding the scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    /// Range that has to end up inside the visible lines.
    pub ensure: Option<(Pos, Pos)>,
}

impl Viewport {
    #[must_use]
    pub fn top(top: f64) -> Self {
        Self {
            top: Some(top),
            ..Self::default()
        }
    }
}

/// Lines `[from, to)` visible with the scroll container at `scroll_top` and
/// `height` pixels tall, after applying `viewport`.
#[must_use]
pub fn visible_range(
    heights: &HeightMap,
    scroll_top: f64,
    height: f64,
    viewport: &Viewport,
) -> (usize, usize) {
    let top = viewport.top.map_or(scroll_top, |t| t.max(0.0)).floor();
    let bottom = viewport.bottom.unwrap_or(top + height);
    let mut from = heights.line_at_height(top);
    let mut to = heights.line_at_height(bottom);
    if let Some((ensure_from, ensure_to)) = viewport.ensure {
        let last = (heights.first() + heights.len()).saturating_sub(1);
        if ensure_from.line < from {
            from = ensure_from.line;
            to = heights.line_at_height(heights.height_at_line(from) + height);
        } else if ensure_to.line.min(last) >= to {
            from = heights.line_at_height(heights.height_at_line(ensure_to.line) - height);
            to = ensure_to.line;
        }
    }
    (from, to.max(from + 1))
}

/// State carried through one display update.
#[derive(Clone, Debug)]
pub(crate) struct DisplayUpdate {
    pub viewport: Viewport,
    pub visible: (usize, usize),
    pub editor_is_hidden: bool,
    pub wrapper_height: f64,
    pub wrapper_width: f64,
    pub old_display_width: f64,
    pub force: bool,
    /// Events fired once the update is finished.
    pub events: Vec<EditorEvent>,
}

impl<H: DomHost> Editor<H> {
    pub(crate) fn new_display_update(&self, viewport: Viewport, force: bool) -> DisplayUpdate {
        let (wrapper_width, wrapper_height) = self.host.wrapper_size();
        DisplayUpdate {
            viewport,
            visible: self.visible_lines(&viewport),
            editor_is_hidden: !self.host.is_visible(),
            wrapper_height,
            wrapper_width,
            old_display_width: self.display_width(),
            force,
            events: Vec::new(),
        }
    }

    /// Fire the events an update collected.
    pub(crate) fn finish_display_update(&mut self, update: DisplayUpdate) {
        for event in update.events {
            self.signal(event);
        }
    }

    pub(crate) fn visible_lines(&self, viewport: &Viewport) -> (usize, usize) {
        let (_, height) = self.host.wrapper_size();
        visible_range(
            &self.display.heights,
            self.host.scroller().scroll_top,
            height,
            viewport,
        )
    }

    /// Gutter ids handed to the host, line numbers first.
    pub(crate) fn gutter_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.options.gutters.len() + 1);
        if self.options.line_numbers
            && !self.options.gutters.iter().any(|g| g == LINE_NUMBER_GUTTER)
        {
            ids.push(LINE_NUMBER_GUTTER.to_string());
        }
        ids.extend(self.options.gutters.iter().cloned());
        ids
    }

    /// Re-measure the line-number gutter when the widest label gained or
    /// lost a digit. Returns whether the gutter changed.
    pub(crate) fn maybe_update_line_number_width(&mut self) -> bool {
        if !self.options.line_numbers {
            return false;
        }
        let last = self.options.line_number_for(self.doc.last_line());
        let chars = last.chars().count();
        if chars == self.display.line_num_chars {
            return false;
        }
        let (inner, padding) = self.host.measure_gutter_label(&last);
        let d = &mut self.display;
        d.line_num_inner_width = inner.max(0.0) + 1.0;
        d.line_num_width = d.line_num_inner_width + padding;
        // Zero width means no layout yet; measure again next time.
        d.line_num_chars = if inner > 0.0 { chars } else { 0 };
        let width = d.line_num_width;
        let ids = self.gutter_ids();
        self.host.set_gutters(&ids, width);
        debug!(chars, width, "line number gutter resized");
        true
    }

    /// Bring the window and the host's line nodes up to date. Returns
    /// whether anything was redrawn.
    pub(crate) fn update_display_if_needed(&mut self, update: &mut DisplayUpdate) -> bool {
        if update.editor_is_hidden {
            self.reset_view();
            return false;
        }
        let (vis_from, vis_to) = update.visible;
        let numbers_settled = |d: &super::Display| {
            d.update_line_numbers.is_none_or(|n| n >= d.window.to())
        };
        let rendered = |d: &super::Display| d.rendered_generation == Some(d.window.generation());
        {
            let d = &self.display;
            if !update.force
                && vis_from >= d.window.from()
                && vis_to <= d.window.to()
                && numbers_settled(d)
                && rendered(d)
                && d.window.count_dirty() == 0
            {
                return false;
            }
        }

        if self.maybe_update_line_number_width() {
            self.reset_view();
        }

        let first = self.doc.first_line();
        let end = self.doc_end();
        let margin = self.options.viewport_margin;
        let (wrapper_height, wrapper_width) = (update.wrapper_height, update.wrapper_width);
        let d = &mut self.display;
        let lines = FoldIndex::new(&d.folds, first, end);
        let (from, to) = window_bounds(
            (d.window.from(), d.window.to()),
            update.visible,
            margin,
            &lines,
        );
        let different = from != d.window.from()
            || to != d.window.to()
            || d.last_wrap_height != wrapper_height
            || d.last_wrap_width != wrapper_width;
        d.window.adjust_view(&lines, from, to);
        let offset = d.heights.height_at_line(from);
        if offset != d.view_offset || d.rendered_generation.is_none() {
            d.view_offset = offset;
            self.host.set_view_offset(offset);
        }

        let d = &self.display;
        let to_update = d.window.count_dirty();
        if !different
            && to_update == 0
            && !update.force
            && rendered(d)
            && numbers_settled(d)
        {
            return false;
        }

        trace!(from, to, to_update, different, "redrawing window");
        let numbers_from = self.display.update_line_numbers;
        self.patch_display(numbers_from);
        let d = &mut self.display;
        d.rendered_generation = Some(d.window.generation());
        if different {
            d.last_wrap_height = wrapper_height;
            d.last_wrap_width = wrapper_width;
            self.start_worker(Duration::from_millis(400));
        }
        self.display.update_line_numbers = None;
        true
    }

    /// Keep updating until the drawn lines cover the visible area, then
    /// queue the update and viewport events.
    pub(crate) fn post_update_display(&mut self, update: &mut DisplayUpdate) {
        let mut viewport = update.viewport;
        for pass in 0..MAX_UPDATE_PASSES {
            if pass > 0
                || !self.options.line_wrapping
                || update.old_display_width == self.display_width()
            {
                if let Some(top) = viewport.top {
                    let max = self.display.heights.total() - self.display_height();
                    viewport = Viewport::top(max.min(top));
                }
                update.visible = self.visible_lines(&viewport);
                if update.visible.0 >= self.display.window.from()
                    && update.visible.1 <= self.display.window.to()
                {
                    break;
                }
            }
            if !self.update_display_if_needed(update) {
                break;
            }
            self.update_heights_in_viewport();
            let metrics = self.measure_for_scrollbars();
            self.update_selection();
            self.set_document_height(&metrics);
            self.update_scrollbars(metrics);
            update.force = false;
        }

        update.events.push(EditorEvent::Update);
        let view = (self.display.window.from(), self.display.window.to());
        if view != self.display.reported_view {
            update.events.push(EditorEvent::ViewportChange {
                from: view.0,
                to: view.1,
            });
            self.display.reported_view = view;
        }
    }

    /// A complete update outside of a batch.
    pub(crate) fn update_display_simple(&mut self, viewport: Viewport) {
        let mut update = self.new_display_update(viewport, false);
        if self.update_display_if_needed(&mut update) {
            self.update_heights_in_viewport();
            self.post_update_display(&mut update);
            let metrics = self.measure_for_scrollbars();
            self.update_selection();
            self.set_document_height(&metrics);
            self.update_scrollbars(metrics);
            self.finish_display_update(update);
        }
    }

    /// Read the rendered height of every drawn line back into the height
    /// map.
    pub(crate) fn update_heights_in_viewport(&mut self) {
        let text_height = self.text_height();
        let drawn: Vec<(usize, usize, NodeId)> = self
            .display
            .window
            .iter()
            .filter(|(_, view)| !view.hidden)
            .filter_map(|(line, view)| view.node.map(|node| (line, view.size, node)))
            .collect();
        for (line, size, node) in drawn {
            let mut height = self.host.node_rect(node).height();
            let diff = self.display.heights.height(line) - height;
            if height < 2.0 {
                height = text_height;
            }
            if diff.abs() > 0.005 {
                self.display.heights.set_height(line, height);
                self.update_widget_heights(line, size, node);
            }
        }
    }

    fn update_widget_heights(&mut self, line: usize, size: usize, node: NodeId) {
        let measured = self.host.widget_heights(node);
        let decorations = &mut self.display.decorations;
        let ids: Vec<(usize, u32)> = (line..line + size)
            .flat_map(|l| {
                decorations
                    .widget_renders(l)
                    .into_iter()
                    .map(move |w| (l, w.id))
            })
            .collect();
        for ((l, id), height) in ids.into_iter().zip(measured) {
            decorations.set_widget_height(l, id, height);
        }
    }

    pub(crate) fn set_document_height(&mut self, metrics: &ScrollMetrics) {
        self.host.set_document_height(metrics.doc_height);
    }

    /// Viewport metrics for the scrollbar strategy.
    pub(crate) fn measure_for_scrollbars(&self) -> ScrollMetrics {
        let scroller = self.host.scroller();
        let (view_width, view_height) = self.host.wrapper_size();
        let gutter_width = self.host.gutter_width();
        let doc_height = self.display.heights.total().round();
        ScrollMetrics {
            client_height: scroller.client_height,
            view_height,
            scroll_width: scroller.scroll_width,
            client_width: scroller.client_width,
            view_width,
            bar_left: if self.options.fixed_gutter {
                gutter_width
            } else {
                0.0
            },
            doc_height,
            scroll_height: doc_height + self.display.bar_height,
            native_bar_width: self.display.native_bar_width,
            gutter_width,
        }
    }

    /// Hand new metrics to the scrollbars, repeating while the space they
    /// take keeps changing.
    pub(crate) fn update_scrollbars(&mut self, metrics: ScrollMetrics) {
        let mut start = self.display.bar_sizes();
        self.update_scrollbars_inner(&metrics);
        let mut passes = 0;
        while passes < 4 && start != self.display.bar_sizes() {
            if start.0 != self.display.bar_width && self.options.line_wrapping {
                self.update_heights_in_viewport();
            }
            let metrics = self.measure_for_scrollbars();
            self.update_scrollbars_inner(&metrics);
            start = self.display.bar_sizes();
            passes += 1;
        }
    }

    fn update_scrollbars_inner(&mut self, metrics: &ScrollMetrics) {
        let sizes = self.scrollbars.update(metrics);
        let d = &mut self.display;
        if sizes.right != d.bar_width || sizes.bottom != d.bar_height {
            d.bar_width = sizes.right;
            d.bar_height = sizes.bottom;
            trace!(right = sizes.right, bottom = sizes.bottom, "scrollbar space changed");
            self.host.set_bar_gaps(sizes.right, sizes.bottom);
        }
    }

    /// Keep fixed gutters in place after a horizontal scroll.
    pub(crate) fn align_horizontally(&mut self) {
        if !self.options.fixed_gutter || self.gutter_ids().is_empty() {
            return;
        }
        self.host.align_gutters(self.display.scroll_left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights(count: usize) -> HeightMap {
        HeightMap::new(0, count, 10.0)
    }

    #[test]
    fn visible_range_follows_scroll() {
        let h = heights(100);
        assert_eq!(visible_range(&h, 0.0, 50.0, &Viewport::default()), (0, 5));
        assert_eq!(visible_range(&h, 105.0, 50.0, &Viewport::default()), (10, 15));
        assert_eq!(visible_range(&h, 0.0, 50.0, &Viewport::top(400.0)), (40, 45));
    }

    #[test]
    fn visible_range_is_never_empty() {
        let h = heights(10);
        assert_eq!(visible_range(&h, 500.0, 50.0, &Viewport::default()), (10, 11));
    }

    #[test]
    fn ensure_pulls_range_up_or_down() {
        let h = heights(100);
        let up = Viewport {
            ensure: Some((Pos::new(2, 0), Pos::new(2, 0))),
            ..Viewport::top(400.0)
        };
        assert_eq!(visible_range(&h, 0.0, 50.0, &up), (2, 7));
        let down = Viewport {
            ensure: Some((Pos::new(80, 0), Pos::new(80, 0))),
            ..Viewport::default()
        };
        assert_eq!(visible_range(&h, 0.0, 50.0, &down), (75, 80));
    }
}
