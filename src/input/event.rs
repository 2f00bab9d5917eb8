//! Normalized input event descriptors.
//!
//! The host turns its raw events into these before handing them to
//! [`crate::Editor::handle_event`]. Pointer coordinates are page pixels.

use crate::input::keyboard::{KeyEvent, KeyModifiers};
use crate::scroll::ScrollAxis;

/// Pointer button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// A pointer press, move or release.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: MouseButton,
    pub modifiers: KeyModifiers,
    /// The pointer is over a block widget or other non-text content.
    pub over_widget: bool,
}

impl PointerEvent {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SHIFT)
    }
}

/// Unit of a wheel delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WheelDeltaMode {
    /// Deltas are pixels.
    Pixel,
    /// Deltas are platform wheel units; calibrated at runtime.
    #[default]
    Line,
    /// Deltas are pages.
    Page,
}

/// A wheel turn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelEvent {
    pub dx: f64,
    pub dy: f64,
    pub mode: WheelDeltaMode,
}

impl WheelEvent {
    /// A vertical turn in wheel units.
    #[must_use]
    pub fn lines(dy: f64) -> Self {
        Self {
            dx: 0.0,
            dy,
            mode: WheelDeltaMode::Line,
        }
    }
}

/// An input event the editor reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// A printable key was pressed.
    KeyPress(char),
    /// The hidden input field's content changed.
    Input,
    /// Text typed into an editable region, replacing `deleted` chars
    /// before the cursor.
    TextInput { text: String, deleted: usize },
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    Wheel(WheelEvent),
    CompositionStart,
    CompositionUpdate(String),
    CompositionEnd(String),
    /// Clipboard paste. `None` when the text arrives through the hidden
    /// field instead.
    Paste(Option<String>),
    Cut,
    Copy,
    DragStart,
    Drop { x: f64, y: f64, text: String },
    Focus,
    Blur,
    /// The scroll container scrolled.
    Scroll,
    /// A custom scrollbar was dragged to `pos`.
    ScrollbarScroll { axis: ScrollAxis, pos: f64 },
}

impl InputEvent {
    /// Whether the event comes from the keyboard.
    #[must_use]
    pub fn is_key(&self) -> bool {
        matches!(self, Self::KeyDown(_) | Self::KeyUp(_) | Self::KeyPress(_))
    }

    /// Whether the event comes from a pointer.
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(
            self,
            Self::PointerDown(_) | Self::PointerMove(_) | Self::PointerUp(_) | Self::Wheel(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keyboard::KeyCode;

    #[test]
    fn test_event_classification() {
        assert!(InputEvent::KeyPress('a').is_key());
        assert!(InputEvent::KeyDown(KeyEvent::key(KeyCode::Left)).is_key());
        assert!(InputEvent::Wheel(WheelEvent::lines(1.0)).is_pointer());
        assert!(!InputEvent::Paste(None).is_pointer());
    }

    #[test]
    fn test_pointer_builders() {
        let event = PointerEvent::at(3.0, 4.0)
            .with_button(MouseButton::Middle)
            .with_modifiers(KeyModifiers::SHIFT);
        assert_eq!((event.x, event.y), (3.0, 4.0));
        assert_eq!(event.button, MouseButton::Middle);
        assert!(event.shift());
    }
}
