//! The DOM capability the display core renders into and measures against.
//!
//! The core never touches a real document tree. It asks a [`DomHost`] to
//! create, patch and remove line nodes during write phases, and to report
//! boxes during read phases. [`MemoryDom`] is a complete in-memory host with
//! a monospace layout model, used by the tests and benches.

mod memory;
mod scrollbars;

use std::time::Duration;

pub use memory::{DomOp, DomStats, MemoryDom, MemoryDomConfig};
pub use scrollbars::{BarSizes, NativeScrollbars, NullScrollbars, ScrollMetrics, Scrollbars};

/// Handle to a node owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// An axis-aligned box in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Shift the box by `dx`, `dy`.
    #[must_use]
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }
}

/// Whether a span holds document text or a replacement widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    Text,
    /// Stands in for collapsed text, or for an empty line.
    Widget,
}

/// One styled piece of rendered line content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub class: Option<String>,
    pub kind: SpanKind,
}

impl Span {
    #[must_use]
    pub fn text(text: impl Into<String>, class: Option<&str>) -> Self {
        Self {
            text: text.into(),
            class: class.map(str::to_string),
            kind: SpanKind::Text,
        }
    }

    #[must_use]
    pub fn widget(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            class: None,
            kind: SpanKind::Widget,
        }
    }

    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Maps the document columns `[from, to)` of one logical line onto a span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapEntry {
    pub from: usize,
    pub to: usize,
    pub span: usize,
    /// Zero-width widgets that sit on the left of their position.
    pub insert_left: bool,
}

impl MapEntry {
    #[must_use]
    pub const fn new(from: usize, to: usize, span: usize) -> Self {
        Self {
            from,
            to,
            span,
            insert_left: false,
        }
    }
}

/// Text content of a visual line plus the column maps used for measuring.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineContent {
    pub spans: Vec<Span>,
    /// Map for the first logical line.
    pub map: Vec<MapEntry>,
    /// One map per continuation line of a folded visual line.
    pub rest_maps: Vec<Vec<MapEntry>>,
}

/// Gutter elements of a rendered line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GutterRender {
    pub line_number: Option<String>,
    /// `(gutter id, marker text)` in gutter order.
    pub markers: Vec<(String, String)>,
    pub class: Option<String>,
}

/// Class names applied around the line content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineClasses {
    pub wrap: Option<String>,
    pub background: Option<String>,
    pub text: Option<String>,
    pub gutter: Option<String>,
}

/// A block widget drawn above or below a line.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetRender {
    pub id: u32,
    pub text: String,
    pub height: f64,
    pub above: bool,
}

/// Everything needed to build one line node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineRender {
    pub content: LineContent,
    pub gutter: Option<GutterRender>,
    pub classes: LineClasses,
    pub widgets: Vec<WidgetRender>,
}

/// Scroll container geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollerMetrics {
    pub client_width: f64,
    pub client_height: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub scroll_top: f64,
    pub scroll_left: f64,
}

/// Cursor and selection overlay boxes, in line-container coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionDrawing {
    pub cursors: Vec<Rect>,
    pub selection: Vec<Rect>,
    /// Where to park the hidden input field, relative to the wrapper.
    pub input_at: Option<(f64, f64)>,
}

/// Node creation, layout measurement and a clock, as consumed by the core.
///
/// Mutating methods are only called during write phases; everything that
/// returns geometry is only called during read phases or outside a flush.
pub trait DomHost {
    // Line container.

    /// Build a line node and insert it before `before`, or at the end.
    fn insert_line(&mut self, render: &LineRender, before: Option<NodeId>) -> NodeId;
    fn remove_line(&mut self, node: NodeId);
    fn first_line_node(&self) -> Option<NodeId>;
    fn next_line_node(&self, node: NodeId) -> Option<NodeId>;
    /// Whether `node` is currently a child of the line container.
    fn is_attached(&self, node: NodeId) -> bool;
    fn replace_text(&mut self, node: NodeId, content: &LineContent);
    fn set_gutter(&mut self, node: NodeId, gutter: Option<&GutterRender>);
    fn set_classes(&mut self, node: NodeId, classes: &LineClasses);
    fn set_widgets(&mut self, node: NodeId, widgets: &[WidgetRender]);
    fn set_line_number(&mut self, node: NodeId, label: &str);

    // Off-screen measurement.

    /// Render a line into the hidden measuring container, replacing
    /// whatever was there.
    fn render_measure_line(&mut self, render: &LineRender) -> NodeId;
    fn clear_measure(&mut self);

    // Layout reads.

    /// False while the editor has no layout (e.g. `display: none`).
    fn is_visible(&self) -> bool;
    /// Client width and height of the outer wrapper.
    fn wrapper_size(&self) -> (f64, f64);
    fn scroller(&self) -> ScrollerMetrics;
    /// Page box of the line container's coordinate space.
    fn line_space_rect(&self) -> Rect;
    /// Page box of a whole line node, widgets included.
    fn node_rect(&self, node: NodeId) -> Rect;
    /// Page box of a line's text element.
    fn text_rect(&self, node: NodeId) -> Rect;
    /// One box per wrapped row of a line's text.
    fn text_row_rects(&self, node: NodeId) -> Vec<Rect>;
    /// Client boxes of chars `[from, to)` of a span; for widgets, the
    /// boxes of the whole widget.
    fn span_rects(&self, node: NodeId, span: usize, from: usize, to: usize) -> Vec<Rect>;
    /// Rendered heights of a line's block widgets, in render order.
    fn widget_heights(&self, node: NodeId) -> Vec<f64>;
    fn text_height(&self) -> f64;
    fn char_width(&self) -> f64;
    /// Inner width and horizontal padding of a line-number label.
    fn measure_gutter_label(&self, label: &str) -> (f64, f64);
    /// Page boxes of each gutter column, in gutter order.
    fn gutter_rects(&self) -> Vec<Rect>;
    fn gutter_width(&self) -> f64;
    /// Width the platform reserves for a native scrollbar.
    fn native_bar_width(&self) -> f64;

    // Layout writes.

    /// Switch between wrapped and horizontally scrolling text.
    fn set_text_layout(&mut self, wrapping: bool, tab_size: usize);
    /// Move the line container so its top sits at `top` document pixels.
    fn set_view_offset(&mut self, top: f64);
    fn set_document_height(&mut self, height: f64);
    fn set_sizer_min_width(&mut self, width: f64);
    /// Space taken by scrollbars on the right and bottom edges.
    fn set_bar_gaps(&mut self, right: f64, bottom: f64);
    fn set_gutters(&mut self, gutters: &[String], line_number_width: f64);
    fn set_scroll_top(&mut self, top: f64);
    fn set_scroll_left(&mut self, left: f64);
    /// Keep fixed gutters in place while scrolled horizontally.
    fn align_gutters(&mut self, left: f64);
    fn show_selection(&mut self, drawing: &SelectionDrawing);

    // Input field and focus.

    fn field_value(&self) -> String;
    /// Replace the hidden field's content; `select` selects all of it.
    fn set_field_value(&mut self, value: &str, select: bool);
    fn field_has_selection(&self) -> bool;
    /// Data handed to the platform for a drag or clipboard transfer.
    fn set_transfer_data(&mut self, text: &str);
    fn has_focus(&self) -> bool;
    fn focus(&mut self);

    /// Monotonic clock.
    fn now(&self) -> Duration;
}
