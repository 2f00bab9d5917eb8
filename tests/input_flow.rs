//! Host events in, document and selection changes out.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::{editor, editor_with, numbered_lines};
use editview::host::DomHost;
use editview::input::WheelDeltaMode;
use editview::text::Pos;
use editview::{
    EditorEvent, EditorOptions, EventKind, InputEvent, KeyCode, KeyEvent, KeyModifiers,
    PointerEvent, TimerKind, WheelEvent,
};

fn click(x: f64, y: f64) -> [InputEvent; 2] {
    [
        InputEvent::PointerDown(PointerEvent::at(x, y)),
        InputEvent::PointerUp(PointerEvent::at(x, y)),
    ]
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn click_places_the_cursor() {
    let mut ed = editor(&numbered_lines(5));
    for event in click(25.0, 20.0) {
        ed.handle_event(&event);
    }
    assert_eq!(ed.selection().primary().head, Pos::new(1, 3));
    assert!(!ed.something_selected());
    assert!(ed.host().has_focus());
}

#[test]
fn drag_selects_text() {
    let mut ed = editor(&numbered_lines(5));
    ed.handle_event(&InputEvent::PointerDown(PointerEvent::at(1.0, 4.0)));
    ed.handle_event(&InputEvent::PointerMove(PointerEvent::at(41.0, 20.0)));
    ed.handle_event(&InputEvent::PointerUp(PointerEvent::at(41.0, 20.0)));
    assert_eq!(ed.selected_text(), "line 0\nline ");
}

#[test]
fn double_click_selects_a_word() {
    let mut ed = editor("hello world");
    for event in click(20.0, 4.0).into_iter().chain(click(20.0, 4.0)) {
        ed.handle_event(&event);
    }
    assert_eq!(ed.selected_text(), "hello");
}

#[test]
fn shift_click_extends() {
    let mut ed = editor("hello world");
    ed.set_cursor(Pos::new(0, 2));
    let shifted = PointerEvent::at(57.0, 4.0).with_modifiers(KeyModifiers::SHIFT);
    ed.handle_event(&InputEvent::PointerDown(shifted));
    ed.handle_event(&InputEvent::PointerUp(shifted));
    assert_eq!(ed.selected_text(), "llo w");
}

#[test]
fn ctrl_click_adds_a_cursor() {
    let mut ed = editor("abc\ndef");
    ed.set_cursor(Pos::new(0, 1));
    let ctrl = PointerEvent::at(17.0, 20.0).with_modifiers(KeyModifiers::CTRL);
    ed.handle_event(&InputEvent::PointerDown(ctrl));
    ed.handle_event(&InputEvent::PointerUp(ctrl));
    assert_eq!(ed.selection().ranges().len(), 2);
    assert_eq!(ed.selection().primary().head, Pos::new(1, 2));
}

#[test]
fn gutter_clicks_are_reported() {
    let options = EditorOptions {
        gutters: vec!["marks".to_string()],
        ..EditorOptions::default()
    };
    let mut ed = editor_with(&numbered_lines(5), options);
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&clicks);
    ed.on(EventKind::GutterClick, move |_, event| {
        if let EditorEvent::GutterClick { line, gutter } = event {
            seen.borrow_mut().push((*line, gutter.clone()));
        }
    });
    // The marker gutter is 16px wide.
    let handled = ed.handle_event(&InputEvent::PointerDown(PointerEvent::at(5.0, 36.0)));
    assert!(handled);
    assert_eq!(*clicks.borrow(), vec![(2, "marks".to_string())]);
    assert_eq!(ed.selection().primary().head, Pos::new(0, 0));
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn arrow_keys_keep_the_goal_column() {
    let mut ed = editor("abcdef\nx\nabcdef");
    ed.set_cursor(Pos::new(0, 5));
    ed.handle_event(&InputEvent::KeyDown(KeyEvent::key(KeyCode::Down)));
    assert_eq!(ed.selection().primary().head, Pos::new(1, 1));
    ed.handle_event(&InputEvent::KeyDown(KeyEvent::key(KeyCode::Down)));
    assert_eq!(ed.selection().primary().head, Pos::new(2, 5));
}

#[test]
fn shift_arrows_extend_the_selection() {
    let mut ed = editor("abcdef");
    ed.set_cursor(Pos::new(0, 1));
    let right = KeyEvent::with_shift(KeyCode::Right);
    ed.handle_event(&InputEvent::KeyDown(right));
    ed.handle_event(&InputEvent::KeyDown(right));
    assert_eq!(ed.selected_text(), "bc");
}

#[test]
fn enter_and_backspace_edit() {
    let mut ed = editor("ab");
    ed.set_cursor(Pos::new(0, 1));
    ed.handle_event(&InputEvent::KeyDown(KeyEvent::key(KeyCode::Enter)));
    assert_eq!(ed.text(), "a\nb");
    assert_eq!(ed.host().rendered_lines(), vec!["a", "b"]);
    ed.handle_event(&InputEvent::KeyDown(KeyEvent::key(KeyCode::Backspace)));
    assert_eq!(ed.text(), "ab");
    assert_eq!(ed.selection().primary().head, Pos::new(0, 1));
}

#[test]
fn select_all_then_type_replaces_everything() {
    let mut ed = editor("one\ntwo");
    ed.handle_event(&InputEvent::Focus);
    ed.handle_event(&InputEvent::KeyDown(KeyEvent::with_ctrl(KeyCode::Char('a'))));
    assert_eq!(ed.selected_text(), "one\ntwo");
    ed.host_mut().type_into_field("z");
    ed.handle_event(&InputEvent::Input);
    assert_eq!(ed.text(), "z");
}

// ============================================================================
// Focus and Timers
// ============================================================================

#[test]
fn focus_and_blur_are_reported_once() {
    let mut ed = editor("abc");
    let events = Rc::new(RefCell::new(Vec::new()));
    for kind in [EventKind::Focus, EventKind::Blur] {
        let seen = Rc::clone(&events);
        ed.on(kind, move |_, event| seen.borrow_mut().push(event.kind()));
    }
    ed.handle_event(&InputEvent::Focus);
    ed.handle_event(&InputEvent::Focus);
    assert!(ed.has_focus());
    ed.handle_event(&InputEvent::Blur);
    ed.handle_event(&InputEvent::Blur);
    assert!(!ed.has_focus());
    assert_eq!(*events.borrow(), vec![EventKind::Focus, EventKind::Blur]);
}

#[test]
fn blur_during_a_click_is_delayed() {
    let mut ed = editor("abc");
    ed.handle_event(&InputEvent::Focus);
    ed.handle_event(&InputEvent::PointerDown(PointerEvent::at(9.0, 4.0)));
    ed.handle_event(&InputEvent::Blur);
    assert!(ed.has_focus());
    assert!(ed.timers().is_set(TimerKind::Blur));

    // Focus really left.
    ed.host_mut().set_focus(false);
    let at = ed.timers().deadline(TimerKind::Blur).unwrap_or_default();
    ed.run_timers(at);
    assert!(!ed.has_focus());
}

#[test]
fn polling_picks_up_field_changes() {
    let mut ed = editor("");
    ed.handle_event(&InputEvent::Focus);
    assert!(ed.timers().is_set(TimerKind::Poll));
    ed.host_mut().type_into_field("abc");
    let at = ed.next_deadline().unwrap_or_default();
    ed.host().advance(at);
    ed.run_timers(at);
    assert_eq!(ed.text(), "abc");
    assert!(ed.timers().is_set(TimerKind::Poll));
}

#[test]
fn composition_commits_on_end() {
    let mut ed = editor("");
    ed.handle_event(&InputEvent::Focus);
    ed.handle_event(&InputEvent::CompositionStart);
    ed.handle_event(&InputEvent::CompositionUpdate("ni".to_string()));
    // The IME leaves the committed text in the field.
    ed.host_mut().replace_field("\u{4f60}");
    ed.handle_event(&InputEvent::CompositionEnd("\u{4f60}".to_string()));
    let at = ed.host().now() + Duration::from_secs(1);
    ed.host().advance(Duration::from_secs(1));
    ed.run_timers(at);
    assert_eq!(ed.text(), "\u{4f60}");
}

// ============================================================================
// Wheel
// ============================================================================

#[test]
fn wheel_calibrates_from_the_first_scroll() {
    let mut ed = editor(&numbered_lines(100));
    assert_eq!(ed.wheel_calibration().pixels_per_unit(), None);
    ed.handle_event(&InputEvent::Wheel(WheelEvent::lines(3.0)));
    assert!(ed.timers().is_set(TimerKind::WheelSample));

    // The platform scrolled 60px for three units.
    ed.host_mut().user_scroll(60.0, 0.0);
    ed.handle_event(&InputEvent::Scroll);
    let at = ed.timers().deadline(TimerKind::WheelSample).unwrap_or_default();
    ed.run_timers(at);
    assert_eq!(ed.wheel_calibration().pixels_per_unit(), Some(20.0));
    assert_eq!(ed.wheel_calibration().samples(), 1);
}

#[test]
fn pixel_wheel_needs_no_calibration() {
    let mut ed = editor(&numbered_lines(100));
    let event = WheelEvent {
        dx: 0.0,
        dy: 120.0,
        mode: WheelDeltaMode::Pixel,
    };
    let suppressed = ed.handle_event(&InputEvent::Wheel(event));
    assert!(!suppressed);
    assert!(!ed.timers().is_set(TimerKind::WheelSample));
}

#[test]
fn wheel_over_unscrollable_content_is_ignored() {
    let mut ed = editor("short");
    ed.handle_event(&InputEvent::Wheel(WheelEvent::lines(3.0)));
    assert!(!ed.timers().is_set(TimerKind::WheelSample));
}

#[test]
fn explicit_scroll_aborts_a_wheel_sample() {
    let mut ed = editor(&numbered_lines(100));
    ed.handle_event(&InputEvent::Wheel(WheelEvent::lines(3.0)));
    assert!(ed.wheel_calibration().is_sampling());
    ed.set_scroll_top(500.0);
    assert!(!ed.wheel_calibration().is_sampling());
    assert!(!ed.timers().is_set(TimerKind::WheelSample));
}
