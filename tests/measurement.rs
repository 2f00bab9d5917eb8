//! Position to pixel mapping and back, against the monospace host grid
//! (8px columns, 16px rows).

mod common;

use common::{editor, editor_with, numbered_lines};
use editview::host::DomHost;
use editview::text::Pos;
use editview::{CoordSystem, EditorOptions};

// ============================================================================
// Position -> Box
// ============================================================================

#[test]
fn cursor_boxes_in_every_system() {
    let mut ed = editor(&numbered_lines(100));
    ed.set_scroll_top(800.0);
    let pos = Pos::new(50, 2);

    let local = ed.measure_position(pos, CoordSystem::Local);
    assert_eq!((local.left, local.top, local.bottom), (16.0, 800.0, 816.0));
    assert_eq!(local.left, local.right);

    let line = ed.measure_position(pos, CoordSystem::Line);
    assert_eq!((line.left, line.top), (16.0, 0.0));

    // The window starts at line 40.
    let div = ed.measure_position(pos, CoordSystem::Div);
    assert_eq!(div.top, 160.0);

    // Scrolled to exactly this line.
    let page = ed.measure_position(pos, CoordSystem::Page);
    assert_eq!((page.left, page.top), (16.0, 0.0));
}

#[test]
fn char_box_spans_one_column() {
    let mut ed = editor("a\tb");
    let b = ed.char_box(Pos::new(0, 2), CoordSystem::Local);
    // The tab runs to column 4.
    assert_eq!((b.left, b.right), (32.0, 40.0));
    let tab = ed.char_box(Pos::new(0, 1), CoordSystem::Local);
    assert_eq!((tab.left, tab.right), (8.0, 32.0));
}

#[test]
fn page_boxes_start_after_the_gutter() {
    let mut ed = editor_with("abc\ndef\nghi", EditorOptions::with_line_numbers());
    let gutter = ed.host().gutter_width();
    assert!(gutter > 0.0);
    let b = ed.measure_position(Pos::new(0, 1), CoordSystem::Page);
    assert_eq!(b.left, gutter + 8.0);
}

#[test]
fn lines_outside_the_window_are_measured_off_screen() {
    let mut ed = editor(&numbered_lines(100));
    ed.host_mut().reset_stats();
    let b = ed.measure_position(Pos::new(80, 3), CoordSystem::Local);
    assert_eq!((b.left, b.top), (24.0, 1280.0));

    let stats = ed.host().stats();
    assert!(stats.measure_renders >= 1);
    assert_eq!(stats.inserted, 0);
    assert_eq!(ed.display().view_to(), 20);

    // The off-screen build is reused for the same line.
    ed.host_mut().reset_stats();
    let again = ed.measure_position(Pos::new(80, 5), CoordSystem::Local);
    assert_eq!(again.left, 40.0);
    assert_eq!(ed.host().stats().measure_renders, 0);
}

#[test]
fn positions_past_the_end_are_clipped() {
    let mut ed = editor("abc\nde");
    let b = ed.measure_position(Pos::new(9, 9), CoordSystem::Local);
    assert_eq!((b.left, b.top), (16.0, 16.0));
}

#[test]
fn right_to_left_text_is_measured_visually() {
    let mut ed = editor("\u{5d0}\u{5d1}\u{5d2}");
    // The first logical char is drawn rightmost.
    let first = ed.char_box(Pos::new(0, 0), CoordSystem::Local);
    assert_eq!((first.left, first.right), (16.0, 24.0));
    let last = ed.char_box(Pos::new(0, 2), CoordSystem::Local);
    assert_eq!((last.left, last.right), (0.0, 8.0));
}

#[test]
fn wrapped_lines_grow_taller() {
    let options = EditorOptions {
        line_wrapping: true,
        ..EditorOptions::default()
    };
    // 400px at 8px a column is 50 columns.
    let long = "x".repeat(120);
    let mut ed = editor_with(&format!("{long}\nnext"), options);
    assert_eq!(ed.display().heights().height(0), 48.0);
    let b = ed.measure_position(Pos::new(0, 60), CoordSystem::Local);
    assert_eq!((b.left, b.top), (80.0, 16.0));
    let next = ed.measure_position(Pos::new(1, 0), CoordSystem::Local);
    assert_eq!(next.top, 48.0);
}

// ============================================================================
// Point -> Position
// ============================================================================

#[test]
fn points_snap_to_the_nearest_boundary() {
    let mut ed = editor("hello\nworld");
    let found = ed.locate_position(19.0, 20.0, CoordSystem::Local);
    assert_eq!(found.pos, Pos::new(1, 2));
    assert!(!found.outside);
    assert_eq!(found.x_rel, 1);

    let found = ed.locate_position(22.0, 20.0, CoordSystem::Local);
    assert_eq!(found.pos, Pos::new(1, 3));
    assert_eq!(found.x_rel, -1);
}

#[test]
fn points_beyond_the_text() {
    let mut ed = editor("hello\nworld");
    let right = ed.locate_position(300.0, 4.0, CoordSystem::Local);
    assert_eq!(right.pos, Pos::new(0, 5));
    assert_eq!(right.x_rel, 1);

    let below = ed.locate_position(10.0, 500.0, CoordSystem::Local);
    assert_eq!(below.pos, Pos::new(1, 5));
    assert!(below.outside);

    let above = ed.locate_position(10.0, -5.0, CoordSystem::Page);
    assert_eq!(above.pos, Pos::new(0, 0));
    assert!(above.outside);
}

#[test]
fn locate_inverts_measure() {
    let mut ed = editor(&numbered_lines(100));
    ed.set_scroll_top(400.0);
    for pos in [Pos::new(25, 0), Pos::new(30, 4), Pos::new(34, 7)] {
        let b = ed.measure_position(pos, CoordSystem::Page);
        let found = ed.locate_position(b.left, (b.top + b.bottom) / 2.0, CoordSystem::Page);
        assert_eq!(found.pos, pos);
    }
}

#[test]
fn clicks_past_a_fold_marker_land_after_the_fold() {
    let mut ed = editor("a\nb\nc\nd");
    ed.fold_lines(1, 2);
    let found = ed.locate_position(300.0, 20.0, CoordSystem::Local);
    assert_eq!(found.pos, Pos::new(2, 1));
    let found = ed.locate_position(300.0, 36.0, CoordSystem::Local);
    assert_eq!(found.pos, Pos::new(3, 1));
}

#[test]
fn line_at_height_uses_the_height_map() {
    let ed = editor(&numbered_lines(100));
    assert_eq!(ed.line_at_height(0.0, CoordSystem::Local), 0);
    assert_eq!(ed.line_at_height(33.0, CoordSystem::Local), 2);
    assert_eq!(ed.line_at_height(1599.0, CoordSystem::Local), 99);
}
