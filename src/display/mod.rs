//! Display state: the rendered window, line heights, and the update cycle.
//!
//! The window ([`ViewWindow`]) holds one [`LineView`] per rendered visual
//! line. Edits mark it through `reg_change`/`reg_line_change`; the write
//! phase of a flush reconciles it against the host's line nodes.
//!
//! # Examples
//!
//! ```
//! use editview::display::{FoldIndex, Folds, ViewWindow, window_bounds};
//!
//! let folds = Folds::new();
//! let lines = FoldIndex::new(&folds, 0, 1000);
//! let mut window = ViewWindow::new(0);
//! let (from, to) = window_bounds((0, 0), (200, 210), 10, &lines);
//! window.adjust_view(&lines, from, to);
//! assert_eq!((window.from(), window.to()), (190, 220));
//! ```

mod content;
mod decorations;
mod folds;
mod heights;
mod line_view;
mod patch;
mod selection;
mod update;
mod view;

use tracing::debug;

pub use content::LINE_NUMBER_GUTTER;
pub use decorations::{Decorations, LineClassTarget, LineDecoration, LineWidget};
pub use folds::{FoldKind, FoldRange, Folds};
pub use heights::HeightMap;
pub use line_view::{Bias, DirtyAspects, LineMeasure, LineView};
pub use update::{Viewport, visible_range};
pub use view::{ABSORB_DISTANCE, FoldIndex, ViewWindow, VisualLines, window_bounds};

pub(crate) use content::{ContentContext, build_gutter, build_line_render};
pub(crate) use update::DisplayUpdate;

use crate::Editor;
use crate::host::{DomHost, LineRender};
use crate::text::Document;

/// Fallback row height while the host has no layout.
const FALLBACK_TEXT_HEIGHT: f64 = 16.0;

/// A line built in the off-screen measuring container.
#[derive(Clone, Debug)]
pub(crate) struct ExternalMeasure {
    pub line: usize,
    pub size: usize,
    pub view: LineView,
    pub render: LineRender,
}

/// Everything the editor knows about what is on screen.
#[derive(Debug)]
pub struct Display {
    pub(crate) window: ViewWindow,
    /// Generation of the window the host currently shows.
    pub(crate) rendered_generation: Option<u64>,
    pub(crate) external: Option<ExternalMeasure>,
    /// Document offset of the first rendered line.
    pub(crate) view_offset: f64,
    pub(crate) last_wrap_height: f64,
    pub(crate) last_wrap_width: f64,
    /// Lowest line whose number label may be stale.
    pub(crate) update_line_numbers: Option<usize>,
    pub(crate) bar_width: f64,
    pub(crate) bar_height: f64,
    pub(crate) native_bar_width: f64,
    pub(crate) scrollbars_clipped: bool,
    pub(crate) line_num_chars: usize,
    pub(crate) line_num_width: f64,
    pub(crate) line_num_inner_width: f64,
    pub(crate) max_line: usize,
    pub(crate) max_line_length: usize,
    pub(crate) max_line_changed: bool,
    pub(crate) reported_view: (usize, usize),
    pub(crate) heights: HeightMap,
    pub(crate) folds: Folds,
    pub(crate) decorations: Decorations,
    /// Last scroll position the editor accepted.
    pub(crate) scroll_top: f64,
    pub(crate) scroll_left: f64,
    pub(crate) cached_text_height: Option<f64>,
    pub(crate) cached_char_width: Option<f64>,
}

impl Display {
    pub(crate) fn new(first: usize, count: usize) -> Self {
        Self {
            window: ViewWindow::new(first),
            rendered_generation: None,
            external: None,
            view_offset: 0.0,
            last_wrap_height: 0.0,
            last_wrap_width: 0.0,
            update_line_numbers: None,
            bar_width: 0.0,
            bar_height: 0.0,
            native_bar_width: 0.0,
            scrollbars_clipped: false,
            line_num_chars: 0,
            line_num_width: 0.0,
            line_num_inner_width: 0.0,
            max_line: first,
            max_line_length: 0,
            max_line_changed: true,
            reported_view: (first, first),
            heights: HeightMap::new(first, count, FALLBACK_TEXT_HEIGHT),
            folds: Folds::new(),
            decorations: Decorations::new(first, count),
            scroll_top: 0.0,
            scroll_left: 0.0,
            cached_text_height: None,
            cached_char_width: None,
        }
    }

    #[must_use]
    pub fn window(&self) -> &ViewWindow {
        &self.window
    }

    #[must_use]
    pub fn view_from(&self) -> usize {
        self.window.from()
    }

    #[must_use]
    pub fn view_to(&self) -> usize {
        self.window.to()
    }

    #[must_use]
    pub fn view_offset(&self) -> f64 {
        self.view_offset
    }

    #[must_use]
    pub fn heights(&self) -> &HeightMap {
        &self.heights
    }

    #[must_use]
    pub fn folds(&self) -> &Folds {
        &self.folds
    }

    #[must_use]
    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// Space the scrollbars take on the right and bottom edges.
    #[must_use]
    pub fn bar_sizes(&self) -> (f64, f64) {
        (self.bar_width, self.bar_height)
    }

    /// Line holding the widest text, used to size the horizontal scroll.
    #[must_use]
    pub fn max_line(&self) -> usize {
        self.max_line
    }
}

impl<H: DomHost> Editor<H> {
    /// Row height, cached once the host reports a sane value.
    pub(crate) fn text_height(&mut self) -> f64 {
        if let Some(h) = self.display.cached_text_height {
            return h;
        }
        let h = self.host.text_height();
        if h > 3.0 {
            self.display.cached_text_height = Some(h);
            h
        } else if h > 0.0 {
            h
        } else {
            FALLBACK_TEXT_HEIGHT
        }
    }

    /// Width of one column, cached once the host reports a sane value.
    pub(crate) fn char_width(&mut self) -> f64 {
        if let Some(w) = self.display.cached_char_width {
            return w;
        }
        let w = self.host.char_width();
        if w > 2.0 {
            self.display.cached_char_width = Some(w);
            w
        } else {
            10.0
        }
    }

    pub(crate) fn display_width(&self) -> f64 {
        self.host.scroller().client_width - self.display.bar_width
    }

    pub(crate) fn display_height(&self) -> f64 {
        self.host.scroller().client_height - self.display.bar_height
    }

    pub(crate) fn doc_end(&self) -> usize {
        self.doc.first_line() + self.doc.line_count()
    }

    /// Estimated height of `line` before it has been measured.
    pub(crate) fn estimate_line_height(&mut self, line: usize) -> f64 {
        if self.display.folds.is_hidden(line) {
            return 0.0;
        }
        let th = self.text_height();
        let widgets = self.display.decorations.widgets_height(line);
        if self.options.line_wrapping {
            let cw = self.char_width();
            let per_line = (self.host.scroller().client_width / cw - 3.0).max(5.0);
            let len = self.doc.content_length(line) as f64;
            widgets + (len / per_line).ceil().max(1.0) * th
        } else {
            widgets + th
        }
    }

    /// Replace every line height with an estimate.
    pub(crate) fn estimate_line_heights(&mut self) {
        let first = self.doc.first_line();
        let heights = (first..self.doc_end())
            .map(|line| self.estimate_line_height(line))
            .collect();
        self.display.heights.reset(first, heights);
    }

    pub(crate) fn content_context(&self) -> ContentContext<'_> {
        ContentContext {
            doc: self.doc.as_ref(),
            folds: &self.display.folds,
            decorations: &self.display.decorations,
            options: &self.options,
        }
    }

    /// Record that lines `[from, to)` changed and `lendiff` lines were
    /// added, after the document has been updated.
    pub(crate) fn reg_change(&mut self, from: Option<usize>, to: Option<usize>, lendiff: isize) {
        let first = self.doc.first_line();
        let end = self.doc_end();
        let from = from.unwrap_or(first);
        let to = to.unwrap_or(end);
        let d = &mut self.display;
        if lendiff != 0
            && to < d.window.to()
            && d.update_line_numbers.is_none_or(|n| n > from)
        {
            d.update_line_numbers = Some(from);
        }
        if let Some(op) = self.cur_op.as_mut() {
            op.view_changed = true;
        }
        let lines = FoldIndex::new(&d.folds, first, end);
        d.window.reg_change(&lines, from, to, lendiff);
        if d.window.is_empty() {
            d.view_offset = 0.0;
        }
        if let Some(ext) = &mut d.external {
            if to < ext.line {
                ext.line = ext.line.saturating_add_signed(lendiff);
            } else if from < ext.line + ext.size {
                d.external = None;
            }
        }
    }

    /// Record that one aspect of `line` changed.
    pub(crate) fn reg_line_change(&mut self, line: usize, aspect: DirtyAspects) {
        if let Some(op) = self.cur_op.as_mut() {
            op.view_changed = true;
        }
        let d = &mut self.display;
        if d
            .external
            .as_ref()
            .is_some_and(|ext| line >= ext.line && line < ext.line + ext.size)
        {
            d.external = None;
        }
        d.window.reg_line_change(line, aspect);
    }

    /// Forget the whole window; the next update rebuilds it.
    pub(crate) fn reset_view(&mut self) {
        let first = self.doc.first_line();
        self.display.window.reset(first);
        self.display.view_offset = 0.0;
    }

    /// Find the widest line and flag the horizontal extent as stale.
    pub(crate) fn find_max_line(&mut self) {
        let first = self.doc.first_line();
        let mut best = (first, self.doc.content_length(first));
        let folds = &self.display.folds;
        self.doc.iter_lines(first, self.doc_end(), &mut |n, text| {
            if !folds.is_hidden(n) {
                let len = text.chars().count();
                if len > best.1 {
                    best = (n, len);
                }
            }
            std::ops::ControlFlow::Continue(())
        });
        self.display.max_line = best.0;
        self.display.max_line_length = best.1;
        self.display.max_line_changed = true;
    }

    /// Drop every cached measurement.
    pub(crate) fn clear_caches(&mut self) {
        for view in self.display.window.lines_mut() {
            if let Some(measure) = view.measure.as_mut() {
                measure.clear_cache();
            }
        }
        self.display.external = None;
        self.host.clear_measure();
        self.display.cached_text_height = None;
        self.display.cached_char_width = None;
        debug!("measurement caches cleared");
    }
}
