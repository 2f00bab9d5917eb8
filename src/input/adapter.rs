//! Input adapters: how typed text reaches the editor.
//!
//! [`TextareaInput`] keeps a hidden text field next to the cursor and diffs
//! its value against what it last saw. [`ContentEditableInput`] has the host
//! report inserted text directly and never reads the field.

use crate::config::InputStyle;
use crate::host::{DomHost, SelectionDrawing};

/// Fields longer than this are cleared after being read.
const FIELD_RESET_LENGTH: usize = 1000;

/// Text read from the input field since the last poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextInput {
    pub inserted: String,
    /// Chars before the cursor that the new value no longer has.
    pub deleted: usize,
}

/// The input strategy the editor drives.
pub trait InputAdapter {
    fn style(&self) -> InputStyle;

    /// Show cursors and selection boxes, and park the field near the cursor.
    fn show_selection(&mut self, host: &mut dyn DomHost, drawing: &SelectionDrawing);

    /// Put the field in a state that reflects the selection. `selected` is
    /// the selected text, if any.
    fn reset(&mut self, host: &mut dyn DomHost, selected: Option<&str>, typing: bool, focused: bool);

    /// Read what was typed since the last poll.
    fn poll(&mut self, host: &mut dyn DomHost, something_selected: bool, composing: bool) -> Option<TextInput>;

    /// Whether the field has to be polled on a timer.
    fn needs_polling(&self) -> bool;

    /// Forget the last seen value.
    fn clear(&mut self) {}
}

/// Hidden text field, polled and diffed.
#[derive(Clone, Debug, Default)]
pub struct TextareaInput {
    prev_input: String,
}

impl TextareaInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value seen by the last poll.
    #[must_use]
    pub fn prev_input(&self) -> &str {
        &self.prev_input
    }
}

impl InputAdapter for TextareaInput {
    fn style(&self) -> InputStyle {
        InputStyle::Textarea
    }

    fn show_selection(&mut self, host: &mut dyn DomHost, drawing: &SelectionDrawing) {
        host.show_selection(drawing);
    }

    fn reset(&mut self, host: &mut dyn DomHost, selected: Option<&str>, typing: bool, focused: bool) {
        if let Some(text) = selected {
            self.prev_input.clear();
            host.set_field_value(text, focused);
        } else if !typing {
            self.prev_input.clear();
            host.set_field_value("", false);
        }
    }

    fn poll(&mut self, host: &mut dyn DomHost, something_selected: bool, composing: bool) -> Option<TextInput> {
        if host.field_has_selection() && self.prev_input.is_empty() && !composing {
            return None;
        }
        let text = host.field_value();
        if text == self.prev_input && !something_selected {
            return None;
        }
        let same = self
            .prev_input
            .chars()
            .zip(text.chars())
            .take_while(|(a, b)| a == b)
            .count();
        let input = TextInput {
            inserted: text.chars().skip(same).collect(),
            deleted: self.prev_input.chars().count() - same,
        };
        if text.chars().count() > FIELD_RESET_LENGTH || text.contains('\n') {
            self.prev_input.clear();
            host.set_field_value("", false);
        } else {
            self.prev_input = text;
        }
        Some(input)
    }

    fn needs_polling(&self) -> bool {
        true
    }

    fn clear(&mut self) {
        self.prev_input.clear();
    }
}

/// Editable region; the host reports inserted text itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentEditableInput;

impl InputAdapter for ContentEditableInput {
    fn style(&self) -> InputStyle {
        InputStyle::ContentEditable
    }

    fn show_selection(&mut self, host: &mut dyn DomHost, drawing: &SelectionDrawing) {
        // The native selection lives in the region; nothing to park.
        let drawing = SelectionDrawing {
            input_at: None,
            ..drawing.clone()
        };
        host.show_selection(&drawing);
    }

    fn reset(&mut self, _host: &mut dyn DomHost, _selected: Option<&str>, _typing: bool, _focused: bool) {}

    fn poll(&mut self, _host: &mut dyn DomHost, _something_selected: bool, _composing: bool) -> Option<TextInput> {
        None
    }

    fn needs_polling(&self) -> bool {
        false
    }
}

/// Build the adapter for `style`.
#[must_use]
pub fn input_for_style(style: InputStyle) -> Box<dyn InputAdapter> {
    match style {
        InputStyle::Textarea => Box::new(TextareaInput::new()),
        InputStyle::ContentEditable => Box::new(ContentEditableInput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDom;

    #[test]
    fn poll_reports_appended_text() {
        let mut host = MemoryDom::new(100.0, 100.0);
        let mut input = TextareaInput::new();
        host.type_into_field("ab");
        let read = input.poll(&mut host, false, false);
        assert_eq!(
            read,
            Some(TextInput {
                inserted: "ab".into(),
                deleted: 0
            })
        );
        assert_eq!(input.prev_input(), "ab");
        assert_eq!(input.poll(&mut host, false, false), None);
    }

    #[test]
    fn poll_diffs_against_the_common_prefix() {
        let mut host = MemoryDom::new(100.0, 100.0);
        let mut input = TextareaInput::new();
        host.type_into_field("nai");
        input.poll(&mut host, false, false);
        host.replace_field("na\u{ef}ve");
        let read = input.poll(&mut host, false, false);
        assert_eq!(
            read,
            Some(TextInput {
                inserted: "\u{ef}ve".into(),
                deleted: 1
            })
        );
    }

    #[test]
    fn newline_clears_the_field() {
        let mut host = MemoryDom::new(100.0, 100.0);
        let mut input = TextareaInput::new();
        host.type_into_field("x\n");
        assert!(input.poll(&mut host, false, false).is_some());
        assert_eq!(host.field_value(), "");
        assert_eq!(input.prev_input(), "");
    }

    #[test]
    fn reset_selects_the_selected_text() {
        let mut host = MemoryDom::new(100.0, 100.0);
        let mut input = TextareaInput::new();
        input.reset(&mut host, Some("sel"), false, true);
        assert_eq!(host.field_value(), "sel");
        assert!(host.field_has_selection());
        // A selected field that was never typed into is not input.
        assert_eq!(input.poll(&mut host, true, false), None);
        input.reset(&mut host, None, false, true);
        assert_eq!(host.field_value(), "");
    }

    #[test]
    fn content_editable_never_polls() {
        let mut host = MemoryDom::new(100.0, 100.0);
        let mut input = ContentEditableInput;
        host.type_into_field("zz");
        assert!(!input.needs_polling());
        assert_eq!(input.poll(&mut host, false, false), None);
    }
}
