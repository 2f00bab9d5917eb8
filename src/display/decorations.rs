//! Per-line gutter markers, classes and block widgets.

use std::collections::BTreeMap;

use crate::host::{LineClasses, WidgetRender};
use crate::text::Change;

/// Which class slot of a line to set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineClassTarget {
    Wrap,
    Background,
    Text,
    Gutter,
}

/// A block widget attached to a line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineWidget {
    pub id: u32,
    pub text: String,
    pub height: f64,
    pub above: bool,
}

/// Everything attached to one line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineDecoration {
    /// Marker text by gutter id.
    pub markers: BTreeMap<String, String>,
    pub classes: LineClasses,
    pub widgets: Vec<LineWidget>,
}

impl LineDecoration {
    fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.classes == LineClasses::default() && self.widgets.is_empty()
    }
}

/// Whether a change inserts or removes whole lines without touching the
/// text of the line it lands on.
fn is_whole_line_update(change: &Change) -> bool {
    change.from.col == 0
        && change.to.col == 0
        && change.text.last().is_some_and(String::is_empty)
}

/// Decorations of every line, kept aligned with the document across edits.
#[derive(Clone, Debug, Default)]
pub struct Decorations {
    first: usize,
    lines: Vec<Option<Box<LineDecoration>>>,
    next_widget: u32,
}

impl Decorations {
    #[must_use]
    pub fn new(first: usize, count: usize) -> Self {
        Self {
            first,
            lines: vec![None; count],
            next_widget: 0,
        }
    }

    fn slot(&self, line: usize) -> Option<usize> {
        line.checked_sub(self.first)
            .filter(|&i| i < self.lines.len())
    }

    #[must_use]
    pub fn get(&self, line: usize) -> Option<&LineDecoration> {
        self.slot(line).and_then(|i| self.lines[i].as_deref())
    }

    fn entry(&mut self, line: usize) -> Option<&mut LineDecoration> {
        let i = self.slot(line)?;
        Some(self.lines[i].get_or_insert_with(Box::default))
    }

    fn prune(&mut self, line: usize) {
        if let Some(i) = self.slot(line) {
            if self.lines[i].as_deref().is_some_and(LineDecoration::is_empty) {
                self.lines[i] = None;
            }
        }
    }

    /// Set or clear a gutter marker. Returns whether anything changed.
    pub fn set_marker(&mut self, line: usize, gutter: &str, marker: Option<&str>) -> bool {
        let changed = match (self.entry(line), marker) {
            (None, _) => false,
            (Some(deco), Some(text)) => {
                deco.markers.insert(gutter.to_string(), text.to_string()).as_deref() != Some(text)
            }
            (Some(deco), None) => deco.markers.remove(gutter).is_some(),
        };
        self.prune(line);
        changed
    }

    /// Set or clear a line class. Returns whether anything changed.
    pub fn set_class(&mut self, line: usize, target: LineClassTarget, class: Option<&str>) -> bool {
        let Some(deco) = self.entry(line) else {
            return false;
        };
        let slot = match target {
            LineClassTarget::Wrap => &mut deco.classes.wrap,
            LineClassTarget::Background => &mut deco.classes.background,
            LineClassTarget::Text => &mut deco.classes.text,
            LineClassTarget::Gutter => &mut deco.classes.gutter,
        };
        let next = class.map(str::to_string);
        let changed = *slot != next;
        *slot = next;
        self.prune(line);
        changed
    }

    /// Attach a widget; returns its id.
    pub fn add_widget(&mut self, line: usize, text: &str, height: f64, above: bool) -> Option<u32> {
        self.next_widget += 1;
        let id = self.next_widget;
        let deco = self.entry(line)?;
        deco.widgets.push(LineWidget {
            id,
            text: text.to_string(),
            height,
            above,
        });
        Some(id)
    }

    /// Detach a widget; returns the line it was on and its height.
    pub fn remove_widget(&mut self, id: u32) -> Option<(usize, f64)> {
        let (i, deco) = self
            .lines
            .iter_mut()
            .enumerate()
            .find_map(|(i, d)| d.as_deref_mut().filter(|d| d.widgets.iter().any(|w| w.id == id)).map(|d| (i, d)))?;
        let height = deco
            .widgets
            .iter()
            .find(|w| w.id == id)
            .map_or(0.0, |w| w.height);
        deco.widgets.retain(|w| w.id != id);
        let line = self.first + i;
        self.prune(line);
        Some((line, height))
    }

    /// Record a measured widget height.
    pub fn set_widget_height(&mut self, line: usize, id: u32, height: f64) {
        if let Some(w) = self
            .slot(line)
            .and_then(|i| self.lines[i].as_deref_mut())
            .and_then(|d| d.widgets.iter_mut().find(|w| w.id == id))
        {
            w.height = height;
        }
    }

    #[must_use]
    pub fn widgets_height(&self, line: usize) -> f64 {
        self.get(line)
            .map_or(0.0, |d| d.widgets.iter().map(|w| w.height).sum())
    }

    /// Widgets of a line in render order: above widgets first.
    #[must_use]
    pub fn widget_renders(&self, line: usize) -> Vec<WidgetRender> {
        let Some(deco) = self.get(line) else {
            return Vec::new();
        };
        let render = |w: &LineWidget| WidgetRender {
            id: w.id,
            text: w.text.clone(),
            height: w.height,
            above: w.above,
        };
        deco.widgets
            .iter()
            .filter(|w| w.above)
            .map(render)
            .chain(deco.widgets.iter().filter(|w| !w.above).map(render))
            .collect()
    }

    pub fn set_first(&mut self, first: usize) {
        self.first = first;
    }

    /// Keep decorations on the lines they were attached to.
    pub fn apply_change(&mut self, change: &Change) {
        let (Some(from), Some(to)) = (self.slot(change.from.line), self.slot(change.to.line)) else {
            return;
        };
        let added = change.text.len().saturating_sub(1);
        if is_whole_line_update(change) {
            self.lines.splice(from..to, std::iter::repeat_n(None, added));
        } else {
            self.lines
                .splice(from + 1..=to, std::iter::repeat_n(None, added));
        }
    }
}
