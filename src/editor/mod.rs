//! The editor: document, selection and display tied to one host.
//!
//! An [`Editor`] owns everything one editing surface needs and exposes the
//! public editing API. Every mutating call runs inside an operation (see
//! [`crate::operation`]), so a sequence of calls made inside
//! [`Editor::request_batch`] reaches the host as a single flush.
//!
//! # Examples
//!
//! ```
//! use editview::host::MemoryDom;
//! use editview::text::Pos;
//! use editview::{Editor, EditorOptions};
//!
//! let mut editor = Editor::new(MemoryDom::new(400.0, 160.0), "alpha\nbeta", EditorOptions::default());
//! editor.replace_selection("> ");
//! assert_eq!(editor.line(0).as_deref(), Some("> alpha"));
//! assert_eq!(editor.selection().primary().head, Pos::new(0, 2));
//! ```

mod change;
mod decorate;
mod selection;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::{EditorOptions, ScrollbarStyle};
use crate::display::Display;
use crate::event::Listeners;
use crate::highlight::{Highlighter, Tokenizer};
use crate::host::{DomHost, MemoryDom, NativeScrollbars, NullScrollbars, Scrollbars};
use crate::input::{
    ClickTracker, Composition, InputAdapter, LastCopied, PointerGesture, input_for_style,
};
use crate::operation::OperationState;
use crate::scroll::WheelCalibration;
use crate::text::{Document, Pos, RopeDocument, Selection};
use crate::timers::{TimerKind, Timers};

type Deferred<H> = Box<dyn FnOnce(&mut Editor<H>)>;

/// Input and focus state that lives between events.
#[derive(Debug, Default)]
pub(crate) struct EditorState {
    pub focused: bool,
    pub delaying_blur: bool,
    pub overwrite: bool,
    /// Shift is held; motions extend the selection.
    pub shift: bool,
    pub paste_incoming: Option<Duration>,
    pub cut_incoming: Option<Duration>,
    pub suppress_edits: bool,
    pub dragging_text: bool,
    /// Horizontal positions vertical motion tries to keep, per range.
    pub goal_columns: Vec<f64>,
    pub last_copied: Option<LastCopied>,
    pub clicks: ClickTracker,
    pub pointer: Option<PointerGesture>,
}

fn scrollbars_for_style(style: ScrollbarStyle) -> Box<dyn Scrollbars> {
    match style {
        ScrollbarStyle::Native => Box::new(NativeScrollbars::new()),
        ScrollbarStyle::Null => Box::new(NullScrollbars),
    }
}

/// A text editor rendered into a [`DomHost`].
pub struct Editor<H: DomHost = MemoryDom> {
    pub(crate) doc: Box<dyn Document>,
    pub(crate) sel: Selection,
    pub(crate) options: EditorOptions,
    pub(crate) display: Display,
    pub(crate) host: H,
    pub(crate) scrollbars: Box<dyn Scrollbars>,
    pub(crate) input: Box<dyn InputAdapter>,
    pub(crate) highlighter: Highlighter,
    pub(crate) cur_op: Option<OperationState>,
    pub(crate) delayed: Vec<Deferred<H>>,
    pub(crate) listeners: Listeners<H>,
    pub(crate) timers: Timers,
    pub(crate) wheel: WheelCalibration,
    pub(crate) next_op_id: u64,
    pub(crate) composition: Composition,
    pub(crate) state: EditorState,
}

impl<H: DomHost> std::fmt::Debug for Editor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("first_line", &self.doc.first_line())
            .field("line_count", &self.doc.line_count())
            .field("selection", &self.sel)
            .field("view", &(self.display.view_from(), self.display.view_to()))
            .field("in_batch", &self.cur_op.is_some())
            .finish_non_exhaustive()
    }
}

impl<H: DomHost> Editor<H> {
    /// Create an editor showing `text`.
    pub fn new(host: H, text: &str, options: EditorOptions) -> Self {
        Self::with_document(host, Box::new(RopeDocument::from_str(text)), options)
    }

    /// Create an editor over an existing document.
    pub fn with_document(host: H, doc: Box<dyn Document>, options: EditorOptions) -> Self {
        let first = doc.first_line();
        let count = doc.line_count();
        let mut editor = Self {
            sel: Selection::simple(Pos::new(first, 0), Pos::new(first, 0)),
            display: Display::new(first, count),
            scrollbars: scrollbars_for_style(options.scrollbar_style),
            input: input_for_style(options.input_style),
            highlighter: Highlighter::plain(first, count),
            cur_op: None,
            delayed: Vec::new(),
            listeners: Listeners::default(),
            timers: Timers::new(),
            wheel: WheelCalibration::new(options.wheel_pixels_per_unit),
            next_op_id: 0,
            composition: Composition::new(),
            state: EditorState::default(),
            doc,
            options,
            host,
        };
        editor.host.set_text_layout(editor.options.line_wrapping, editor.options.tab_size);
        let gutters = editor.gutter_ids();
        editor.host.set_gutters(&gutters, 0.0);
        editor.request_batch(|ed| {
            ed.estimate_line_heights();
            if let Some(op) = ed.cur_op.as_mut() {
                op.force_update = true;
                op.update_max_line = true;
                op.selection_changed = true;
            }
        });
        debug!(lines = count, "editor created");
        editor
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for driving it from outside (user
    /// scrolling, typing, resizing).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn document(&self) -> &dyn Document {
        self.doc.as_ref()
    }

    /// Mutable access to the document. Edits made here bypass the display;
    /// report them with [`Editor::notify_change`].
    pub fn document_mut(&mut self) -> &mut dyn Document {
        self.doc.as_mut()
    }

    #[must_use]
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    #[must_use]
    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Whole document text, lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.doc.text()
    }

    #[must_use]
    pub fn line(&self, n: usize) -> Option<String> {
        self.doc.line(n)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.doc.line_count()
    }

    #[must_use]
    pub fn first_line(&self) -> usize {
        self.doc.first_line()
    }

    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.state.focused
    }

    /// Replace the whole text. The selection moves to the start.
    pub fn set_text(&mut self, text: &str) {
        self.request_batch(|ed| {
            let first = ed.doc.first_line();
            let last = ed.doc.last_line();
            let end = Pos::new(last, ed.doc.content_length(last));
            ed.replace_range_with_origin(text, Pos::new(first, 0), end, Some("setValue"));
            ed.set_selection_inner(Selection::simple(Pos::new(first, 0), Pos::new(first, 0)), true);
        });
    }

    /// Swap in new options. What changed decides how much of the display
    /// is rebuilt.
    pub fn set_options(&mut self, options: EditorOptions) {
        self.request_batch(|ed| {
            let old = std::mem::replace(&mut ed.options, options);
            let new = &ed.options;
            let layout = old.line_wrapping != new.line_wrapping || old.tab_size != new.tab_size;
            let gutters = old.line_numbers != new.line_numbers
                || old.gutters != new.gutters
                || old.first_line_number != new.first_line_number;
            let content = old.fold_marker != new.fold_marker || old.fixed_gutter != new.fixed_gutter;
            let margin = old.viewport_margin != new.viewport_margin;
            if old.input_style != new.input_style {
                ed.input = input_for_style(new.input_style);
                if let Some(op) = ed.cur_op.as_mut() {
                    op.update_input = true;
                    op.selection_changed = true;
                }
            }
            if old.scrollbar_style != new.scrollbar_style {
                ed.set_scrollbars(scrollbars_for_style(ed.options.scrollbar_style));
            }
            if old.wheel_pixels_per_unit != ed.options.wheel_pixels_per_unit {
                ed.wheel = WheelCalibration::new(ed.options.wheel_pixels_per_unit);
            }
            if layout {
                let (wrapping, tab) = (ed.options.line_wrapping, ed.options.tab_size);
                ed.host.set_text_layout(wrapping, tab);
                ed.clear_caches();
                ed.estimate_line_heights();
                if let Some(op) = ed.cur_op.as_mut() {
                    op.update_max_line = true;
                }
            }
            if gutters {
                ed.display.line_num_chars = 0;
                let ids = ed.gutter_ids();
                ed.host.set_gutters(&ids, 0.0);
            }
            if layout || gutters || content {
                ed.reg_change(None, None, 0);
            }
            if margin || layout || gutters {
                if let Some(op) = ed.cur_op.as_mut() {
                    op.force_update = true;
                }
            }
            debug!(layout, gutters, content, "options changed");
        });
    }

    /// Switch scrollbar strategy.
    pub fn set_scrollbars(&mut self, scrollbars: Box<dyn Scrollbars>) {
        self.request_batch(|ed| {
            ed.scrollbars.clear();
            ed.scrollbars = scrollbars;
            ed.display.bar_width = 0.0;
            ed.display.bar_height = 0.0;
            if let Some(op) = ed.cur_op.as_mut() {
                op.force_update = true;
            }
        });
    }

    /// Switch the tokenizer used for styling.
    pub fn set_mode(&mut self, tokenizer: Arc<dyn Tokenizer>) {
        self.request_batch(|ed| {
            ed.highlighter.set_tokenizer(tokenizer);
            ed.reg_change(None, None, 0);
            ed.start_worker(Duration::from_millis(100));
        });
    }

    /// Drop every measurement and redraw, after something outside the
    /// editor changed its layout.
    pub fn refresh(&mut self) {
        self.request_batch(|ed| {
            let old_height = ed.display.cached_text_height;
            ed.clear_caches();
            ed.reg_change(None, None, 0);
            if old_height.is_none_or(|h| (ed.text_height() - h).abs() > 0.5) {
                ed.estimate_line_heights();
            }
            let top = ed.display.scroll_top;
            if let Some(op) = ed.cur_op.as_mut() {
                op.force_update = true;
                op.scroll_top = Some(top);
            }
        });
    }

    /// The host's wrapper was resized.
    pub fn set_size(&mut self) {
        self.request_batch(|ed| {
            if ed.options.line_wrapping {
                ed.clear_caches();
            }
            ed.display.scrollbars_clipped = false;
            if let Some(op) = ed.cur_op.as_mut() {
                op.force_update = true;
            }
        });
    }

    /// Earliest time at which [`Editor::run_timers`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Run every deferred job due at `now`.
    pub fn run_timers(&mut self, now: Duration) {
        for kind in self.timers.take_due(now) {
            match kind {
                TimerKind::Highlight => self.highlight_worker(),
                TimerKind::Poll => self.poll_tick(),
                TimerKind::Composition => self.settle_composition(),
                TimerKind::WheelSample => self.finish_wheel_sample(),
                TimerKind::Blur => self.finish_delayed_blur(),
            }
        }
    }
}
