//! Scrollbar strategies.
//!
//! The display hands a strategy the viewport metrics after every layout
//! change and reserves whatever edge space it reports back.

use tracing::trace;

/// Viewport metrics measured in a read phase.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub client_height: f64,
    pub view_height: f64,
    pub scroll_width: f64,
    pub client_width: f64,
    pub view_width: f64,
    /// Left edge of the scrollable area (fixed gutter width, or zero).
    pub bar_left: f64,
    pub doc_height: f64,
    pub scroll_height: f64,
    pub native_bar_width: f64,
    pub gutter_width: f64,
}

/// Edge space taken by scrollbars.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BarSizes {
    pub right: f64,
    pub bottom: f64,
}

/// A scrollbar implementation driven by the display.
pub trait Scrollbars {
    /// Resize for new metrics and report the space now taken.
    fn update(&mut self, metrics: &ScrollMetrics) -> BarSizes;
    fn set_scroll_top(&mut self, pos: f64);
    fn set_scroll_left(&mut self, pos: f64);
    /// Detach; the strategy is not used again.
    fn clear(&mut self);
}

/// Platform scrollbars.
#[derive(Clone, Debug, Default)]
pub struct NativeScrollbars {
    vertical: bool,
    horizontal: bool,
    inner_height: f64,
    inner_width: f64,
    scroll_top: f64,
    scroll_left: f64,
}

impl NativeScrollbars {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the vertical and horizontal bars are shown.
    #[must_use]
    pub fn visible(&self) -> (bool, bool) {
        (self.vertical, self.horizontal)
    }

    /// Scrollable extents of the bar contents.
    #[must_use]
    pub fn inner_size(&self) -> (f64, f64) {
        (self.inner_width, self.inner_height)
    }

    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        (self.scroll_left, self.scroll_top)
    }
}

impl Scrollbars for NativeScrollbars {
    fn update(&mut self, m: &ScrollMetrics) -> BarSizes {
        let needs_h = m.scroll_width > m.client_width + 1.0;
        let needs_v = m.scroll_height > m.client_height + 1.0;
        let sizes = BarSizes {
            right: if needs_v { m.native_bar_width } else { 0.0 },
            bottom: if needs_h { m.native_bar_width } else { 0.0 },
        };

        self.vertical = needs_v;
        if needs_v {
            let total = m.view_height - if needs_h { sizes.bottom } else { 0.0 };
            self.inner_height = (m.scroll_height - m.client_height + total).max(0.0);
        }
        self.horizontal = needs_h;
        if needs_h {
            let total = m.view_width - m.bar_left - if needs_v { sizes.right } else { 0.0 };
            self.inner_width = (m.scroll_width - m.client_width + total).max(0.0);
        }
        trace!(needs_v, needs_h, right = sizes.right, bottom = sizes.bottom, "scrollbars updated");
        sizes
    }

    fn set_scroll_top(&mut self, pos: f64) {
        self.scroll_top = pos;
    }

    fn set_scroll_left(&mut self, pos: f64) {
        self.scroll_left = pos;
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// No scrollbars at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullScrollbars;

impl Scrollbars for NullScrollbars {
    fn update(&mut self, _metrics: &ScrollMetrics) -> BarSizes {
        BarSizes::default()
    }

    fn set_scroll_top(&mut self, _pos: f64) {}

    fn set_scroll_left(&mut self, _pos: f64) {}

    fn clear(&mut self) {}
}
