//! One entry of the rendered window and its measurement cache.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::host::{LineClasses, LineContent, MapEntry, NodeId, Rect, SpanKind};

bitflags! {
    /// Aspects of a rendered line that are out of date.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirtyAspects: u8 {
        const TEXT = 0b0001;
        const GUTTER = 0b0010;
        const CLASS = 0b0100;
        const WIDGET = 0b1000;
    }
}

/// Which side of a position a measurement favors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bias {
    Left,
    Right,
}

/// Column maps and cached boxes of a built line.
///
/// Boxes are stored relative to the line's text element, so they survive
/// scrolling and only go stale when the line is rebuilt or re-laid out.
#[derive(Clone, Debug, Default)]
pub struct LineMeasure {
    pub(crate) map: Vec<MapEntry>,
    pub(crate) rest_maps: Vec<Vec<MapEntry>>,
    pub(crate) kinds: Vec<SpanKind>,
    /// Index 0 for the first logical line, then one per continuation line.
    pub(crate) caches: Vec<HashMap<(usize, Option<Bias>), Rect>>,
    /// Row boundaries of a wrapped line, relative to its text top.
    pub(crate) heights: Option<Vec<f64>>,
    /// Display width the heights were taken at.
    pub(crate) width: Option<f64>,
}

impl LineMeasure {
    #[must_use]
    pub fn new(map: Vec<MapEntry>, rest_maps: Vec<Vec<MapEntry>>, kinds: Vec<SpanKind>) -> Self {
        let caches = vec![HashMap::new(); rest_maps.len() + 1];
        Self {
            map,
            rest_maps,
            kinds,
            caches,
            heights: None,
            width: None,
        }
    }

    /// Maps of freshly built content.
    #[must_use]
    pub fn from_content(content: &LineContent) -> Self {
        Self::new(
            content.map.clone(),
            content.rest_maps.clone(),
            content.spans.iter().map(|s| s.kind).collect(),
        )
    }

    #[must_use]
    pub fn span_kind(&self, span: usize) -> SpanKind {
        self.kinds.get(span).copied().unwrap_or(SpanKind::Text)
    }

    /// Map for the `index`-th logical line of the visual line.
    #[must_use]
    pub fn map_for(&self, index: usize) -> &[MapEntry] {
        if index == 0 {
            &self.map
        } else {
            self.rest_maps.get(index - 1).map_or(&[], Vec::as_slice)
        }
    }

    /// Drop cached boxes, keeping the maps.
    pub fn clear_cache(&mut self) {
        for cache in &mut self.caches {
            cache.clear();
        }
        self.heights = None;
        self.width = None;
    }
}

/// A visual line in the rendered window.
///
/// A folded visual line spans `size` logical lines; a hidden one renders
/// nothing. Line numbers are not stored: they follow from the window start
/// and the sizes of the preceding entries.
#[derive(Clone, Debug)]
pub struct LineView {
    pub(crate) size: usize,
    pub(crate) hidden: bool,
    pub(crate) node: Option<NodeId>,
    pub(crate) changes: DirtyAspects,
    pub(crate) measure: Option<LineMeasure>,
    pub(crate) classes: LineClasses,
}

impl LineView {
    #[must_use]
    pub fn new(size: usize, hidden: bool) -> Self {
        Self {
            size: size.max(1),
            hidden,
            node: None,
            changes: DirtyAspects::empty(),
            measure: None,
            classes: LineClasses::default(),
        }
    }

    /// Number of logical lines covered.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    #[must_use]
    pub fn changes(&self) -> DirtyAspects {
        self.changes
    }

    /// Whether the next patch has to touch this entry.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.hidden && (self.node.is_none() || !self.changes.is_empty())
    }

    /// Mark an aspect stale.
    pub fn mark(&mut self, aspect: DirtyAspects) {
        self.changes |= aspect;
    }
}
