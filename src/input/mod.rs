//! Input handling: keys, pointer, clipboard, composition and focus.
//!
//! The host normalizes its raw events into [`InputEvent`]s and hands them
//! to [`Editor::handle_event`]. Typed text reaches the editor through an
//! [`InputAdapter`]: either a hidden field that is polled and diffed, or an
//! editable region that reports text directly.
//!
//! # Examples
//!
//! ```
//! use editview::host::MemoryDom;
//! use editview::input::InputEvent;
//! use editview::text::Pos;
//! use editview::{Editor, EditorOptions};
//!
//! let mut editor = Editor::new(MemoryDom::new(400.0, 160.0), "", EditorOptions::default());
//! editor.handle_event(&InputEvent::Focus);
//! editor.host_mut().type_into_field("hi");
//! editor.handle_event(&InputEvent::Input);
//! assert_eq!(editor.text(), "hi");
//! assert_eq!(editor.selection().primary().head, Pos::new(0, 2));
//! ```

mod adapter;
mod commands;
mod composition;
mod event;
mod keyboard;
mod mouse;

use std::time::Duration;

use tracing::trace;

pub use adapter::{ContentEditableInput, InputAdapter, TextInput, TextareaInput, input_for_style};
pub use commands::{Command, command_for_key, lookup_key};
pub use composition::{Composition, CompositionState};
pub use event::{InputEvent, MouseButton, PointerEvent, WheelDeltaMode, WheelEvent};
pub use keyboard::{KeyCode, KeyEvent, KeyModifiers};
pub use mouse::{ClickRepeat, ClickTracker, SelectUnit};

pub(crate) use mouse::PointerGesture;

use crate::Editor;
use crate::event::EditorEvent;
use crate::host::DomHost;
use crate::text::{Change, Pos, Range, Selection, split_lines};
use crate::timers::TimerKind;

/// How long a paste or cut marks the input that follows it.
const INCOMING_WINDOW: Duration = Duration::from_millis(200);

/// Delay of a poll requested by a key press.
const FAST_POLL_DELAY: Duration = Duration::from_millis(20);

/// Text the editor last put on the clipboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastCopied {
    /// Whole lines were copied because nothing was selected.
    pub line_wise: bool,
    /// One entry per range.
    pub text: Vec<String>,
}

impl<H: DomHost> Editor<H> {
    /// Dispatch a host event. Returns whether the editor handled it, in
    /// which case the host should suppress its default action.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        trace!(?event, "input event");
        match event {
            InputEvent::KeyDown(key) => self.on_key_down(key),
            InputEvent::KeyUp(key) => {
                if key.code == KeyCode::Shift {
                    self.state.shift = false;
                }
                false
            }
            InputEvent::KeyPress(ch) => self.on_key_press(*ch),
            InputEvent::Input => self.poll_input(),
            InputEvent::TextInput { text, deleted } => {
                if self.options.read_only || self.composition.is_composing() {
                    return false;
                }
                self.request_batch(|ed| ed.apply_text_input(text, *deleted, None));
                true
            }
            InputEvent::PointerDown(pointer) => self.on_pointer_down(pointer),
            InputEvent::PointerMove(pointer) => self.on_pointer_move(pointer),
            InputEvent::PointerUp(pointer) => self.on_pointer_up(pointer),
            InputEvent::Wheel(wheel) => self.on_scroll_wheel(wheel),
            InputEvent::CompositionStart => {
                self.on_composition_start();
                false
            }
            InputEvent::CompositionUpdate(text) => {
                self.on_composition_update(text);
                false
            }
            InputEvent::CompositionEnd(text) => {
                self.on_composition_end(text);
                false
            }
            InputEvent::Paste(text) => self.on_paste(text.as_deref()),
            InputEvent::Cut => self.on_copy_cut(true),
            InputEvent::Copy => self.on_copy_cut(false),
            InputEvent::DragStart => self.on_drag_start(),
            InputEvent::Drop { x, y, text } => self.on_drop(*x, *y, text),
            InputEvent::Focus => {
                self.on_focus();
                false
            }
            InputEvent::Blur => {
                self.on_blur();
                false
            }
            InputEvent::Scroll => {
                self.on_scroll();
                false
            }
            InputEvent::ScrollbarScroll { axis, pos } => {
                self.on_scrollbar(*axis, *pos);
                true
            }
        }
    }

    fn on_key_down(&mut self, key: &KeyEvent) -> bool {
        self.settle_composition();
        self.state.shift = key.code == KeyCode::Shift || key.shift();
        let Some(command) = command_for_key(key) else {
            return false;
        };
        self.poll_input();
        self.request_batch(|ed| {
            if let Some(op) = ed.cur_op.as_mut() {
                op.focus = true;
            }
            ed.exec_command(command);
        });
        true
    }

    fn on_key_press(&mut self, ch: char) -> bool {
        if self.composition.is_composing() {
            return false;
        }
        if self.input.needs_polling() {
            let at = self.host.now() + FAST_POLL_DELAY;
            self.timers.set_earliest(TimerKind::Poll, at);
            return false;
        }
        if self.options.read_only {
            return false;
        }
        let text = ch.to_string();
        self.request_batch(|ed| ed.apply_text_input(&text, 0, None));
        true
    }

    /// Read the input field and apply what changed. Returns whether
    /// anything was read.
    pub(crate) fn poll_input(&mut self) -> bool {
        if !self.state.focused || self.options.read_only {
            return false;
        }
        let something_selected = self.sel.something_selected();
        let composing = self.composition.is_composing();
        let Some(read) = self
            .input
            .poll(&mut self.host, something_selected, composing)
        else {
            return false;
        };
        let origin = composing.then_some("*compose");
        self.request_batch(|ed| ed.apply_text_input(&read.inserted, read.deleted, origin));
        true
    }

    /// Insert typed text at every range, replacing `deleted` chars before
    /// empty ranges.
    pub(crate) fn apply_text_input(&mut self, inserted: &str, deleted: usize, origin: Option<&str>) {
        self.request_batch(|ed| {
            ed.state.shift = false;
            let now = ed.host.now();
            let recent = |at: Option<Duration>| at.is_some_and(|t| now.saturating_sub(t) < INCOMING_WINDOW);
            let paste = origin == Some("paste") || recent(ed.state.paste_incoming);
            let cut = recent(ed.state.cut_incoming);
            let lines = split_lines(inserted);
            let sel = ed.sel.clone();

            // Pasting N lines into N cursors puts one line at each.
            let mut multi_paste: Option<Vec<Vec<String>>> = None;
            if paste && sel.ranges().len() > 1 {
                match &ed.state.last_copied {
                    Some(last) if last.text.join("\n") == inserted => {
                        if sel.ranges().len() % last.text.len() == 0 {
                            multi_paste = Some(last.text.iter().map(|t| split_lines(t)).collect());
                        }
                    }
                    _ if lines.len() == sel.ranges().len() => {
                        multi_paste = Some(lines.iter().map(|l| vec![l.clone()]).collect());
                    }
                    _ => {}
                }
            }
            let line_wise_paste = paste
                && ed
                    .state
                    .last_copied
                    .as_ref()
                    .is_some_and(|last| last.line_wise && last.text.join("\n") == lines.join("\n"));

            let update_input = ed.cur_op.as_ref().is_some_and(|op| op.update_input);
            for (i, range) in sel.ranges().iter().enumerate().rev() {
                let (mut from, mut to) = (range.from(), range.to());
                if range.empty() {
                    if deleted > 0 {
                        from = Pos::new(from.line, from.col.saturating_sub(deleted));
                    } else if ed.state.overwrite && !paste {
                        let typed = lines.last().map_or(0, |l| l.chars().count());
                        let len = ed.doc.content_length(to.line);
                        to = Pos::new(to.line, len.min(to.col + typed));
                    } else if line_wise_paste {
                        from = Pos::new(from.line, 0);
                        to = from;
                    }
                }
                let text = multi_paste
                    .as_ref()
                    .map_or_else(|| lines.clone(), |m| m[i % m.len()].clone());
                let origin = origin.unwrap_or(if paste {
                    "paste"
                } else if cut {
                    "cut"
                } else {
                    "+input"
                });
                if let Some(applied) = ed.make_change(Change::new(from, to, text).with_origin(origin)) {
                    ed.signal_later(EditorEvent::InputRead(applied));
                }
            }
            ed.ensure_cursor_visible();
            if let Some(op) = ed.cur_op.as_mut() {
                op.update_input = update_input;
                op.typing = true;
            }
            ed.state.paste_incoming = None;
            ed.state.cut_incoming = None;
        });
    }

    /// Make the input field reflect the selection.
    pub(crate) fn reset_input(&mut self, typing: bool) {
        if self.composition.is_active() {
            return;
        }
        let selected = self
            .sel
            .something_selected()
            .then(|| self.selected_text());
        let focused = self.state.focused;
        self.input
            .reset(&mut self.host, selected.as_deref(), typing, focused);
    }

    fn on_paste(&mut self, text: Option<&str>) -> bool {
        if self.options.read_only {
            return false;
        }
        match text {
            Some(text) if !text.is_empty() => {
                self.request_batch(|ed| ed.apply_text_input(text, 0, Some("paste")));
                true
            }
            _ => {
                self.state.paste_incoming = Some(self.host.now());
                let at = self.host.now() + FAST_POLL_DELAY;
                self.timers.set_earliest(TimerKind::Poll, at);
                false
            }
        }
    }

    /// Whole lines under each cursor, for copying without a selection.
    fn copyable_ranges(&self) -> (Vec<Range>, Vec<String>) {
        let mut ranges = Vec::new();
        let mut text = Vec::new();
        for range in self.sel.ranges() {
            let line = range.head.line;
            let start = Pos::new(line, 0);
            let end = crate::text::clip_pos(self.doc.as_ref(), Pos::new(line + 1, 0));
            ranges.push(Range::new(start, end));
            text.push(self.doc.range_lines(start, end).join("\n"));
        }
        (ranges, text)
    }

    fn on_copy_cut(&mut self, cut: bool) -> bool {
        let last = if self.sel.something_selected() {
            LastCopied {
                line_wise: false,
                text: self.selections_text(),
            }
        } else {
            let (ranges, text) = self.copyable_ranges();
            if cut && !self.options.read_only {
                let primary = self.sel.primary_index();
                self.request_batch(|ed| {
                    ed.set_selection_inner(Selection::normalize(ranges, primary), false);
                });
            }
            LastCopied {
                line_wise: true,
                text,
            }
        };
        self.host.set_transfer_data(&last.text.join("\n"));
        self.state.last_copied = Some(last);
        if cut && !self.options.read_only {
            self.state.cut_incoming = Some(self.host.now());
            self.request_batch(|ed| ed.replace_selection_with_origin("", Some("cut")));
        }
        true
    }

    pub(crate) fn on_focus(&mut self) {
        if self.state.delaying_blur && !self.state.dragging_text {
            self.state.delaying_blur = false;
            self.timers.clear(TimerKind::Blur);
        }
        if self.state.focused {
            return;
        }
        self.state.focused = true;
        self.request_batch(|ed| {
            ed.signal(EditorEvent::Focus);
            ed.reset_input(false);
        });
        if self.input.needs_polling() {
            let at = self.host.now() + self.options.poll_interval;
            self.timers.set(TimerKind::Poll, at);
        }
    }

    pub(crate) fn on_blur(&mut self) {
        if self.state.delaying_blur {
            return;
        }
        if self.state.focused {
            self.state.focused = false;
            self.signal(EditorEvent::Blur);
        }
        self.state.shift = false;
        self.timers.clear(TimerKind::Poll);
    }

    /// The delayed blur timer fired.
    pub(crate) fn finish_delayed_blur(&mut self) {
        if !self.state.delaying_blur {
            return;
        }
        self.state.delaying_blur = false;
        if self.state.focused && !self.host.has_focus() {
            self.on_blur();
        }
    }

    /// The poll timer fired.
    pub(crate) fn poll_tick(&mut self) {
        if !self.state.focused || !self.input.needs_polling() {
            return;
        }
        self.poll_input();
        let at = self.host.now() + self.options.poll_interval;
        self.timers.set(TimerKind::Poll, at);
    }
}
