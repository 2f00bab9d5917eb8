//! In-memory [`DomHost`] with a monospace layout model.
//!
//! Every char takes `char_width` pixels per column and every wrapped row
//! takes `text_height` pixels. Right-to-left runs are laid out in visual
//! order. Mutations are counted and traced so tests can assert exactly what
//! a flush wrote.

use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;

use super::{
    DomHost, GutterRender, LineClasses, LineContent, LineRender, NodeId, Rect, ScrollerMetrics,
    SelectionDrawing, SpanKind, WidgetRender,
};
use crate::unicode::{WidthMethod, bidi_order, char_columns};

/// Geometry of a [`MemoryDom`].
#[derive(Clone, Copy, Debug)]
pub struct MemoryDomConfig {
    /// Wrapper width in pixels.
    pub width: f64,
    /// Wrapper height in pixels.
    pub height: f64,
    /// Pixels per column.
    pub char_width: f64,
    /// Pixels per text row.
    pub text_height: f64,
    /// Space a native scrollbar takes; zero for overlay scrollbars.
    pub native_bar_width: f64,
    /// Width of each marker gutter column.
    pub marker_gutter_width: f64,
    /// Horizontal padding around line-number labels.
    pub gutter_label_padding: f64,
    /// Page position of the wrapper's top-left corner.
    pub origin: (f64, f64),
}

impl Default for MemoryDomConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            char_width: 8.0,
            text_height: 16.0,
            native_bar_width: 0.0,
            marker_gutter_width: 16.0,
            gutter_label_padding: 8.0,
            origin: (0.0, 0.0),
        }
    }
}

/// Mutation counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomStats {
    pub inserted: usize,
    pub removed: usize,
    pub text_updates: usize,
    pub gutter_updates: usize,
    pub class_updates: usize,
    pub widget_updates: usize,
    pub number_updates: usize,
    pub measure_renders: usize,
    /// Scroll, size, offset, gutter and overlay writes.
    pub layout_writes: usize,
}

impl DomStats {
    /// Every write to the visible tree.
    #[must_use]
    pub fn total_mutations(&self) -> usize {
        self.inserted
            + self.removed
            + self.text_updates
            + self.gutter_updates
            + self.class_updates
            + self.widget_updates
            + self.number_updates
            + self.layout_writes
    }
}

/// One traced write to the line container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomOp {
    Insert { node: NodeId, text: String, before: Option<NodeId> },
    Remove { node: NodeId },
    Text { node: NodeId, text: String },
    Gutter { node: NodeId },
    Classes { node: NodeId },
    Widgets { node: NodeId },
    Number { node: NodeId, label: String },
}

impl std::fmt::Display for DomOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insert { node, text, before } => match before {
                Some(b) => write!(f, "insert #{} {text:?} before #{}", node.0, b.0),
                None => write!(f, "insert #{} {text:?}", node.0),
            },
            Self::Remove { node } => write!(f, "remove #{}", node.0),
            Self::Text { node, text } => write!(f, "text #{} {text:?}", node.0),
            Self::Gutter { node } => write!(f, "gutter #{}", node.0),
            Self::Classes { node } => write!(f, "classes #{}", node.0),
            Self::Widgets { node } => write!(f, "widgets #{}", node.0),
            Self::Number { node, label } => write!(f, "number #{} {label}", node.0),
        }
    }
}

#[derive(Clone, Debug)]
struct LineNode {
    render: LineRender,
}

impl LineNode {
    fn plain_text(&self) -> String {
        self.render
            .content
            .spans
            .iter()
            .map(|s| s.text.as_str())
            .collect()
    }
}

#[derive(Clone, Copy, Debug)]
struct Glyph {
    span: usize,
    index: usize,
    row: usize,
    left: f64,
    right: f64,
}

#[derive(Clone, Debug, Default)]
struct TextLayout {
    glyphs: Vec<Glyph>,
    row_widths: Vec<f64>,
}

impl TextLayout {
    fn rows(&self) -> usize {
        self.row_widths.len().max(1)
    }
}

/// A headless host. See the module docs for the layout rules.
#[derive(Debug)]
pub struct MemoryDom {
    config: MemoryDomConfig,
    wrapping: bool,
    tab_size: usize,
    hidden: bool,
    nodes: HashMap<NodeId, LineNode>,
    children: Vec<NodeId>,
    measure: Option<NodeId>,
    next_id: u32,
    view_offset: f64,
    doc_height: f64,
    sizer_min_width: f64,
    bar_gaps: (f64, f64),
    gutters: Vec<(String, f64)>,
    gutter_align: f64,
    scroll_top: f64,
    scroll_left: f64,
    selection: SelectionDrawing,
    field: String,
    field_selected: bool,
    transfer: Option<String>,
    focused: bool,
    clock: Cell<Duration>,
    auto_tick: Duration,
    stats: DomStats,
    trace: Vec<DomOp>,
}

impl MemoryDom {
    /// A host with the default metrics and the given wrapper size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_config(MemoryDomConfig {
            width,
            height,
            ..MemoryDomConfig::default()
        })
    }

    #[must_use]
    pub fn with_config(config: MemoryDomConfig) -> Self {
        Self {
            config,
            wrapping: false,
            tab_size: 4,
            hidden: false,
            nodes: HashMap::new(),
            children: Vec::new(),
            measure: None,
            next_id: 1,
            view_offset: 0.0,
            doc_height: 0.0,
            sizer_min_width: 0.0,
            bar_gaps: (0.0, 0.0),
            gutters: Vec::new(),
            gutter_align: 0.0,
            scroll_top: 0.0,
            scroll_left: 0.0,
            selection: SelectionDrawing::default(),
            field: String::new(),
            field_selected: false,
            transfer: None,
            focused: false,
            clock: Cell::new(Duration::ZERO),
            auto_tick: Duration::ZERO,
            stats: DomStats::default(),
            trace: Vec::new(),
        }
    }

    /// Builder: pixels per column and per row.
    #[must_use]
    pub fn with_metrics(mut self, char_width: f64, text_height: f64) -> Self {
        self.config.char_width = char_width;
        self.config.text_height = text_height;
        self
    }

    /// Builder: reserve `width` pixels for native scrollbars.
    #[must_use]
    pub fn with_native_bar_width(mut self, width: f64) -> Self {
        self.config.native_bar_width = width;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MemoryDomConfig {
        &self.config
    }

    /// Resize the wrapper.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
        self.clamp_scroll();
    }

    /// Simulate `display: none` on the editor.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Advance the clock.
    pub fn advance(&self, by: Duration) {
        self.clock.set(self.clock.get() + by);
    }

    /// Advance the clock by `tick` on every read, to simulate slow work.
    pub fn set_auto_tick(&mut self, tick: Duration) {
        self.auto_tick = tick;
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Simulate typing into the hidden field; replaces a selected value.
    pub fn type_into_field(&mut self, text: &str) {
        if self.field_selected {
            self.field.clear();
            self.field_selected = false;
        }
        self.field.push_str(text);
    }

    /// Overwrite the field, as an IME or a paste would.
    pub fn replace_field(&mut self, value: &str) {
        self.field = value.to_string();
        self.field_selected = false;
    }

    /// Scroll as the user would, without going through the editor.
    pub fn user_scroll(&mut self, top: f64, left: f64) {
        self.scroll_top = top;
        self.scroll_left = left;
        self.clamp_scroll();
    }

    #[must_use]
    pub fn stats(&self) -> &DomStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DomStats::default();
    }

    /// Drain the trace of line-container writes.
    pub fn take_trace(&mut self) -> Vec<DomOp> {
        std::mem::take(&mut self.trace)
    }

    /// Plain text of every attached line node, in container order.
    #[must_use]
    pub fn rendered_lines(&self) -> Vec<String> {
        self.children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(LineNode::plain_text)
            .collect()
    }

    /// Line-number labels of the attached nodes.
    #[must_use]
    pub fn rendered_numbers(&self) -> Vec<Option<String>> {
        self.children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|n| n.render.gutter.as_ref().and_then(|g| g.line_number.clone()))
            .collect()
    }

    #[must_use]
    pub fn render_of(&self, node: NodeId) -> Option<&LineRender> {
        self.nodes.get(&node).map(|n| &n.render)
    }

    #[must_use]
    pub fn selection_drawing(&self) -> &SelectionDrawing {
        &self.selection
    }

    #[must_use]
    pub fn view_offset(&self) -> f64 {
        self.view_offset
    }

    #[must_use]
    pub fn document_height(&self) -> f64 {
        self.doc_height
    }

    #[must_use]
    pub fn bar_gaps(&self) -> (f64, f64) {
        self.bar_gaps
    }

    #[must_use]
    pub fn transfer_data(&self) -> Option<&str> {
        self.transfer.as_deref()
    }

    #[must_use]
    pub fn gutter_align(&self) -> f64 {
        self.gutter_align
    }

    fn alloc(&mut self, render: &LineRender) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            LineNode {
                render: render.clone(),
            },
        );
        id
    }

    fn text_width(&self) -> f64 {
        (self.config.width - self.gutter_width() - self.bar_gaps.0).max(0.0)
    }

    fn layout(&self, node: &LineNode) -> TextLayout {
        let cw = self.config.char_width;
        let wrap_cols = if self.wrapping {
            ((self.text_width() / cw).floor() as usize).max(1)
        } else {
            usize::MAX
        };

        // Logical order, broken into rows.
        struct Item {
            span: usize,
            index: usize,
            ch: Option<char>,
            cols: usize,
            row: usize,
        }
        let mut items = Vec::new();
        let mut flat = String::new();
        let (mut col, mut row, mut row_cols) = (0usize, 0usize, 0usize);
        for (span_idx, span) in node.render.content.spans.iter().enumerate() {
            if span.kind == SpanKind::Widget && span.text.is_empty() {
                items.push(Item {
                    span: span_idx,
                    index: 0,
                    ch: None,
                    cols: 0,
                    row,
                });
                continue;
            }
            for (index, c) in span.text.chars().enumerate() {
                let cols = char_columns(c, col, self.tab_size, WidthMethod::WcWidth);
                if row_cols > 0 && row_cols + cols > wrap_cols {
                    row += 1;
                    row_cols = 0;
                }
                col += cols;
                row_cols += cols;
                flat.push(c);
                items.push(Item {
                    span: span_idx,
                    index,
                    ch: Some(c),
                    cols,
                    row,
                });
            }
        }

        let order = bidi_order(&flat);
        let rows = row + 1;
        let mut layout = TextLayout {
            glyphs: Vec::with_capacity(items.len()),
            row_widths: vec![0.0; rows],
        };

        // Char offset in `flat` of each item that carries a char.
        let mut char_items = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if item.ch.is_some() {
                char_items.push(i);
            } else {
                layout.glyphs.push(Glyph {
                    span: item.span,
                    index: 0,
                    row: item.row,
                    left: 0.0,
                    right: 0.0,
                });
            }
        }

        for r in 0..rows {
            let in_row: Vec<usize> = (0..char_items.len())
                .filter(|&k| items[char_items[k]].row == r)
                .collect();
            let (Some(&rs), Some(&re)) = (in_row.first(), in_row.last()) else {
                continue;
            };
            let re = re + 1;
            let visual: Vec<usize> = match &order {
                None => (rs..re).collect(),
                Some(parts) => {
                    let mut v = Vec::with_capacity(re - rs);
                    for part in parts {
                        let from = part.from.max(rs);
                        let to = part.to.min(re);
                        if from >= to {
                            continue;
                        }
                        if part.is_rtl() {
                            v.extend((from..to).rev());
                        } else {
                            v.extend(from..to);
                        }
                    }
                    v
                }
            };
            let mut x = 0.0;
            for k in visual {
                let item = &items[char_items[k]];
                let w = item.cols as f64 * cw;
                layout.glyphs.push(Glyph {
                    span: item.span,
                    index: item.index,
                    row: r,
                    left: x,
                    right: x + w,
                });
                x += w;
            }
            layout.row_widths[r] = x;
        }
        layout
    }

    fn widget_split(render: &LineRender) -> (f64, f64) {
        render.widgets.iter().fold((0.0, 0.0), |(above, below), w| {
            if w.above {
                (above + w.height, below)
            } else {
                (above, below + w.height)
            }
        })
    }

    fn node_height(&self, node: &LineNode) -> f64 {
        let (above, below) = Self::widget_split(&node.render);
        above + below + self.layout(node).rows() as f64 * self.config.text_height
    }

    /// Page top of `id`, or `None` when it is not laid out.
    fn node_top(&self, id: NodeId) -> Option<f64> {
        let base = self.line_space_rect().top;
        if self.measure == Some(id) {
            return Some(base);
        }
        let mut top = base;
        for child in &self.children {
            if *child == id {
                return Some(top);
            }
            if let Some(node) = self.nodes.get(child) {
                top += self.node_height(node);
            }
        }
        None
    }

    fn text_origin(&self, id: NodeId) -> Option<(f64, f64, &LineNode)> {
        let node = self.nodes.get(&id)?;
        let top = self.node_top(id)?;
        let (above, _) = Self::widget_split(&node.render);
        Some((self.line_space_rect().left, top + above, node))
    }

    fn widest_line(&self) -> f64 {
        self.children
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|n| {
                self.layout(n)
                    .row_widths
                    .iter()
                    .copied()
                    .fold(0.0, f64::max)
            })
            .fold(0.0, f64::max)
    }

    fn scroll_limits(&self) -> (f64, f64) {
        let m = self.scroller();
        (
            (m.scroll_height - m.client_height).max(0.0),
            (m.scroll_width - m.client_width).max(0.0),
        )
    }

    fn clamp_scroll(&mut self) {
        let (max_top, max_left) = self.scroll_limits();
        self.scroll_top = self.scroll_top.clamp(0.0, max_top);
        self.scroll_left = self.scroll_left.clamp(0.0, max_left);
    }

    fn trace_text(content: &LineContent) -> String {
        content.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::with_config(MemoryDomConfig::default())
    }
}

impl DomHost for MemoryDom {
    fn insert_line(&mut self, render: &LineRender, before: Option<NodeId>) -> NodeId {
        let id = self.alloc(render);
        let found = before.and_then(|b| self.children.iter().position(|c| *c == b));
        self.children.insert(found.unwrap_or(self.children.len()), id);
        self.stats.inserted += 1;
        self.trace.push(DomOp::Insert {
            node: id,
            text: Self::trace_text(&render.content),
            before: before.filter(|_| found.is_some()),
        });
        id
    }

    fn remove_line(&mut self, node: NodeId) {
        self.children.retain(|c| *c != node);
        self.nodes.remove(&node);
        self.stats.removed += 1;
        self.trace.push(DomOp::Remove { node });
    }

    fn first_line_node(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    fn next_line_node(&self, node: NodeId) -> Option<NodeId> {
        let at = self.children.iter().position(|c| *c == node)?;
        self.children.get(at + 1).copied()
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.children.contains(&node)
    }

    fn replace_text(&mut self, node: NodeId, content: &LineContent) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.render.content = content.clone();
        }
        self.stats.text_updates += 1;
        self.trace.push(DomOp::Text {
            node,
            text: Self::trace_text(content),
        });
    }

    fn set_gutter(&mut self, node: NodeId, gutter: Option<&GutterRender>) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.render.gutter = gutter.cloned();
        }
        self.stats.gutter_updates += 1;
        self.trace.push(DomOp::Gutter { node });
    }

    fn set_classes(&mut self, node: NodeId, classes: &LineClasses) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.render.classes = classes.clone();
        }
        self.stats.class_updates += 1;
        self.trace.push(DomOp::Classes { node });
    }

    fn set_widgets(&mut self, node: NodeId, widgets: &[WidgetRender]) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.render.widgets = widgets.to_vec();
        }
        self.stats.widget_updates += 1;
        self.trace.push(DomOp::Widgets { node });
    }

    fn set_line_number(&mut self, node: NodeId, label: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.render
                .gutter
                .get_or_insert_with(GutterRender::default)
                .line_number = Some(label.to_string());
        }
        self.stats.number_updates += 1;
        self.trace.push(DomOp::Number {
            node,
            label: label.to_string(),
        });
    }

    fn render_measure_line(&mut self, render: &LineRender) -> NodeId {
        if let Some(old) = self.measure.take() {
            self.nodes.remove(&old);
        }
        let id = self.alloc(render);
        self.measure = Some(id);
        self.stats.measure_renders += 1;
        id
    }

    fn clear_measure(&mut self) {
        if let Some(old) = self.measure.take() {
            self.nodes.remove(&old);
        }
    }

    fn is_visible(&self) -> bool {
        !self.hidden && self.config.width > 0.0
    }

    fn wrapper_size(&self) -> (f64, f64) {
        if self.hidden {
            return (0.0, 0.0);
        }
        (self.config.width, self.config.height)
    }

    fn scroller(&self) -> ScrollerMetrics {
        if self.hidden {
            return ScrollerMetrics::default();
        }
        let client_width = self.config.width;
        let client_height = self.config.height;
        let content_width = self.sizer_min_width.max(self.widest_line());
        ScrollerMetrics {
            client_width,
            client_height,
            scroll_width: client_width.max(self.gutter_width() + content_width + self.bar_gaps.0),
            scroll_height: client_height.max(self.doc_height + self.bar_gaps.1),
            scroll_top: self.scroll_top,
            scroll_left: self.scroll_left,
        }
    }

    fn line_space_rect(&self) -> Rect {
        if self.hidden {
            return Rect::default();
        }
        let (ox, oy) = self.config.origin;
        let left = ox + self.gutter_width() - self.scroll_left;
        let top = oy + self.view_offset - self.scroll_top;
        Rect::new(
            left,
            top,
            left + self.text_width(),
            oy + self.doc_height - self.scroll_top,
        )
    }

    fn node_rect(&self, node: NodeId) -> Rect {
        if self.hidden {
            return Rect::default();
        }
        let (Some(n), Some(top)) = (self.nodes.get(&node), self.node_top(node)) else {
            return Rect::default();
        };
        let left = self.line_space_rect().left;
        Rect::new(left, top, left + self.text_width(), top + self.node_height(n))
    }

    fn text_rect(&self, node: NodeId) -> Rect {
        if self.hidden {
            return Rect::default();
        }
        let Some((left, top, n)) = self.text_origin(node) else {
            return Rect::default();
        };
        let rows = self.layout(n).rows();
        Rect::new(
            left,
            top,
            left + self.text_width(),
            top + rows as f64 * self.config.text_height,
        )
    }

    fn text_row_rects(&self, node: NodeId) -> Vec<Rect> {
        if self.hidden {
            return Vec::new();
        }
        let Some((left, top, n)) = self.text_origin(node) else {
            return Vec::new();
        };
        let th = self.config.text_height;
        let layout = self.layout(n);
        (0..layout.rows())
            .map(|r| {
                let w = layout.row_widths.get(r).copied().unwrap_or(0.0);
                let y = top + r as f64 * th;
                Rect::new(left, y, left + w, y + th)
            })
            .collect()
    }

    fn span_rects(&self, node: NodeId, span: usize, from: usize, to: usize) -> Vec<Rect> {
        if self.hidden {
            return Vec::new();
        }
        let Some((left, top, n)) = self.text_origin(node) else {
            return Vec::new();
        };
        let Some(kind) = n.render.content.spans.get(span).map(|s| s.kind) else {
            return Vec::new();
        };
        let th = self.config.text_height;
        let layout = self.layout(n);
        let mut glyphs: Vec<&Glyph> = layout
            .glyphs
            .iter()
            .filter(|g| g.span == span && (kind == SpanKind::Widget || (g.index >= from && g.index < to)))
            .collect();
        glyphs.sort_by(|a, b| a.row.cmp(&b.row).then(a.left.total_cmp(&b.left)));

        // One client rect per row, as a browser reports an inline box.
        let mut rects: Vec<(usize, Rect)> = Vec::new();
        for g in glyphs {
            let y = top + g.row as f64 * th;
            let r = Rect::new(left + g.left, y, left + g.right, y + th);
            match rects.last_mut() {
                Some((row, last)) if *row == g.row && (last.right - r.left).abs() < f64::EPSILON => {
                    last.right = r.right;
                }
                _ => rects.push((g.row, r)),
            }
        }
        rects.into_iter().map(|(_, r)| r).collect()
    }

    fn widget_heights(&self, node: NodeId) -> Vec<f64> {
        if self.hidden {
            return Vec::new();
        }
        self.nodes
            .get(&node)
            .map(|n| n.render.widgets.iter().map(|w| w.height).collect())
            .unwrap_or_default()
    }

    fn text_height(&self) -> f64 {
        if self.hidden { 0.0 } else { self.config.text_height }
    }

    fn char_width(&self) -> f64 {
        if self.hidden { 0.0 } else { self.config.char_width }
    }

    fn measure_gutter_label(&self, label: &str) -> (f64, f64) {
        let inner = label.chars().count() as f64 * self.config.char_width + 1.0;
        (inner, self.config.gutter_label_padding)
    }

    fn gutter_rects(&self) -> Vec<Rect> {
        if self.hidden {
            return Vec::new();
        }
        let (ox, oy) = self.config.origin;
        let mut x = ox - self.scroll_left + self.gutter_align;
        self.gutters
            .iter()
            .map(|(_, w)| {
                let r = Rect::new(x, oy, x + w, oy + self.config.height);
                x += w;
                r
            })
            .collect()
    }

    fn gutter_width(&self) -> f64 {
        self.gutters.iter().map(|(_, w)| w).sum()
    }

    fn native_bar_width(&self) -> f64 {
        self.config.native_bar_width
    }

    fn set_text_layout(&mut self, wrapping: bool, tab_size: usize) {
        self.wrapping = wrapping;
        self.tab_size = tab_size.max(1);
        self.stats.layout_writes += 1;
    }

    fn set_view_offset(&mut self, top: f64) {
        self.view_offset = top;
        self.stats.layout_writes += 1;
    }

    fn set_document_height(&mut self, height: f64) {
        self.doc_height = height;
        self.stats.layout_writes += 1;
    }

    fn set_sizer_min_width(&mut self, width: f64) {
        self.sizer_min_width = width;
        self.stats.layout_writes += 1;
    }

    fn set_bar_gaps(&mut self, right: f64, bottom: f64) {
        self.bar_gaps = (right, bottom);
        self.stats.layout_writes += 1;
    }

    fn set_gutters(&mut self, gutters: &[String], line_number_width: f64) {
        let marker = self.config.marker_gutter_width;
        self.gutters = gutters
            .iter()
            .map(|id| {
                let w = if id == crate::display::LINE_NUMBER_GUTTER {
                    line_number_width
                } else {
                    marker
                };
                (id.clone(), w)
            })
            .collect();
        self.stats.layout_writes += 1;
    }

    fn set_scroll_top(&mut self, top: f64) {
        self.scroll_top = top;
        self.clamp_scroll();
        self.stats.layout_writes += 1;
    }

    fn set_scroll_left(&mut self, left: f64) {
        self.scroll_left = left;
        self.clamp_scroll();
        self.stats.layout_writes += 1;
    }

    fn align_gutters(&mut self, left: f64) {
        self.gutter_align = left;
        self.stats.layout_writes += 1;
    }

    fn show_selection(&mut self, drawing: &SelectionDrawing) {
        self.selection = drawing.clone();
        self.stats.layout_writes += 1;
    }

    fn field_value(&self) -> String {
        self.field.clone()
    }

    fn set_field_value(&mut self, value: &str, select: bool) {
        self.field = value.to_string();
        self.field_selected = select && !value.is_empty();
    }

    fn field_has_selection(&self) -> bool {
        self.field_selected
    }

    fn set_transfer_data(&mut self, text: &str) {
        self.transfer = Some(text.to_string());
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn now(&self) -> Duration {
        let t = self.clock.get();
        if !self.auto_tick.is_zero() {
            self.clock.set(t + self.auto_tick);
        }
        t
    }
}
