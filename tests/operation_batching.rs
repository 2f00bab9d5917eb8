//! Batching, nesting and flush ordering of editor operations.
//!
//! Everything a caller does inside one batch has to reach the host in a
//! single flush, and a batch that changed nothing must not write at all.

mod common;

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use common::{RecordingScrollbars, editor, numbered_lines};
use editview::host::DomHost;
use editview::text::Pos;
use editview::{Editor, EditorEvent, EventKind};

// ============================================================================
// Flush Behavior
// ============================================================================

#[test]
fn empty_batch_writes_nothing() {
    let mut ed = editor(&numbered_lines(50));
    let fired = Rc::new(RefCell::new(Vec::new()));
    for kind in [
        EventKind::Changes,
        EventKind::ViewportChange,
        EventKind::Update,
        EventKind::CursorActivity,
        EventKind::Scroll,
    ] {
        let seen = Rc::clone(&fired);
        ed.on(kind, move |_, event| seen.borrow_mut().push(event.kind()));
    }
    ed.host_mut().reset_stats();
    ed.request_batch(|_| {});
    assert_eq!(ed.host().stats().total_mutations(), 0);
    assert!(fired.borrow().is_empty());
    assert!(!ed.in_batch());
}

#[test]
fn nested_batches_flush_once() {
    let mut ed = editor("one\ntwo\nthree");
    let batches = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&batches);
    ed.on(EventKind::Changes, move |_, event| {
        if let EditorEvent::Changes(changes) = event {
            seen.borrow_mut().push(changes.len());
        }
    });

    ed.request_batch(|ed| {
        ed.replace_range("ONE", Pos::new(0, 0), Pos::new(0, 3));
        assert!(ed.in_batch());
        ed.request_batch(|ed| {
            ed.replace_range("TWO", Pos::new(1, 0), Pos::new(1, 3));
            ed.replace_range("THREE", Pos::new(2, 0), Pos::new(2, 5));
        });
        // The inner batch did not flush.
        assert_eq!(ed.host().rendered_lines(), vec!["one", "two", "three"]);
    });

    assert_eq!(*batches.borrow(), vec![3]);
    assert_eq!(ed.host().rendered_lines(), vec!["ONE", "TWO", "THREE"]);
}

#[test]
fn panicking_batch_still_flushes() {
    let mut ed = editor("abc\ndef");
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        ed.request_batch(|ed| {
            ed.replace_range("X", Pos::new(0, 0), Pos::new(0, 0));
            panic!("listener failed");
        });
    }));
    assert!(result.is_err());
    assert!(!ed.in_batch());
    assert_eq!(ed.host().rendered_lines(), vec!["Xabc", "def"]);

    // Still usable afterwards.
    ed.replace_range("Y", Pos::new(1, 0), Pos::new(1, 0));
    assert_eq!(ed.host().rendered_lines(), vec!["Xabc", "Ydef"]);
}

#[test]
fn deferred_work_joins_the_closing_batch() {
    let mut ed = editor("hello");
    let activity = Rc::new(Cell::new(0));
    let seen = Rc::clone(&activity);
    ed.on(EventKind::CursorActivity, move |_, _| seen.set(seen.get() + 1));

    ed.request_batch(|ed| {
        ed.defer(|ed| ed.set_cursor(Pos::new(0, 4)));
        assert_eq!(ed.selection().primary().head, Pos::new(0, 0));
    });

    assert_eq!(ed.selection().primary().head, Pos::new(0, 4));
    assert_eq!(activity.get(), 1);
}

#[test]
fn listener_edits_do_not_reenter_it() {
    let mut ed = editor("abc");
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    ed.on(EventKind::Changes, move |ed, _| {
        seen.set(seen.get() + 1);
        let end = ed.line(0).map_or(0, |l| l.chars().count());
        ed.replace_range("!", Pos::new(0, end), Pos::new(0, end));
    });

    ed.replace_range("x", Pos::new(0, 0), Pos::new(0, 0));

    assert_eq!(calls.get(), 1);
    assert_eq!(ed.text(), "xabc!");
    assert_eq!(ed.host().rendered_lines(), vec!["xabc!"]);
}

#[test]
fn removed_listener_is_not_called() {
    let mut ed = editor("abc");
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let id = ed.on(EventKind::Changes, move |_, _| seen.set(seen.get() + 1));
    ed.replace_range("1", Pos::new(0, 0), Pos::new(0, 0));
    assert!(ed.off(id));
    ed.replace_range("2", Pos::new(0, 0), Pos::new(0, 0));
    assert_eq!(calls.get(), 1);
    assert!(!ed.off(id));
}

// ============================================================================
// Grouped Editors
// ============================================================================

#[test]
fn group_flushes_every_editor() {
    let mut a = editor("left");
    let mut b = editor("right");
    Editor::run_group(&mut [&mut a, &mut b], |eds| {
        eds[0].replace_range("L", Pos::new(0, 0), Pos::new(0, 1));
        eds[1].replace_range("R", Pos::new(0, 0), Pos::new(0, 1));
        for ed in eds.iter() {
            assert!(ed.in_batch());
        }
    });
    assert!(!a.in_batch() && !b.in_batch());
    assert_eq!(a.host().rendered_lines(), vec!["Left"]);
    assert_eq!(b.host().rendered_lines(), vec!["Right"]);
}

#[test]
fn group_member_with_open_batch_flushes_later() {
    let mut a = editor("a");
    let mut b = editor("b");
    a.request_batch(|a| {
        Editor::run_group(&mut [&mut *a, &mut b], |eds| {
            eds[0].replace_range("A", Pos::new(0, 0), Pos::new(0, 1));
            eds[1].replace_range("B", Pos::new(0, 0), Pos::new(0, 1));
        });
        assert!(a.in_batch());
        assert_eq!(a.host().rendered_lines(), vec!["a"]);
    });
    assert_eq!(b.host().rendered_lines(), vec!["B"]);
    assert_eq!(a.host().rendered_lines(), vec!["A"]);
}

// ============================================================================
// Scroll Requests
// ============================================================================

#[test]
fn last_scroll_request_wins() {
    let mut ed = editor(&numbered_lines(100));
    let (bars, log) = RecordingScrollbars::new();
    ed.set_scrollbars(Box::new(bars));
    log.borrow_mut().tops.clear();
    let updates = log.borrow().updates;

    ed.request_batch(|ed| {
        ed.set_scroll_top(100.0);
        ed.set_scroll_top(250.0);
        ed.set_scroll_top(40.0);
    });

    assert_eq!(ed.scroll_top(), 40.0);
    assert_eq!(ed.host().scroller().scroll_top, 40.0);
    assert_eq!(log.borrow().tops, vec![40.0]);
    // Line 2 is already drawn, so the metrics were not recomputed at all.
    assert_eq!(log.borrow().updates, updates);
}

#[test]
fn coalesced_far_scroll_recomputes_metrics_once() {
    let mut ed = editor(&numbered_lines(100));
    let (bars, log) = RecordingScrollbars::new();
    ed.set_scrollbars(Box::new(bars));
    {
        let mut log = log.borrow_mut();
        log.tops.clear();
        log.updates = 0;
    }

    ed.request_batch(|ed| {
        ed.set_scroll_top(100.0);
        ed.set_scroll_top(1200.0);
        ed.set_scroll_top(800.0);
    });

    assert_eq!(ed.scroll_top(), 800.0);
    assert_eq!(ed.display().view_from(), 40);
    assert_eq!(log.borrow().tops, vec![800.0]);
    assert_eq!(log.borrow().updates, 1);
}

#[test]
fn nested_scroll_into_view_honors_the_last_target() {
    let mut ed = editor(&numbered_lines(100));
    ed.request_batch(|ed| {
        ed.scroll_into_view(Pos::new(90, 0), Pos::new(90, 0), 0.0);
        ed.request_batch(|ed| {
            ed.scroll_into_view(Pos::new(50, 0), Pos::new(50, 0), 0.0);
            ed.request_batch(|ed| {
                ed.scroll_into_view(Pos::new(20, 0), Pos::new(20, 0), 0.0);
            });
        });
    });

    let top = ed.scroll_top();
    assert!(top <= 20.0 * 16.0, "line 20 above the screen: {top}");
    assert!(top + 160.0 >= 21.0 * 16.0, "line 20 below the screen: {top}");
    let lines = ed.host().rendered_lines();
    assert!(lines.iter().any(|l| l == "line 20"));
    assert!(!lines.iter().any(|l| l == "line 90"));
}

#[test]
fn scroll_into_view_replaces_an_earlier_scroll_top() {
    let mut ed = editor(&numbered_lines(100));
    ed.request_batch(|ed| {
        ed.set_scroll_top(800.0);
        ed.scroll_into_view(Pos::new(0, 0), Pos::new(0, 0), 0.0);
    });
    assert_eq!(ed.scroll_top(), 0.0);
}

#[test]
fn scroll_top_is_clamped_to_the_document() {
    let mut ed = editor(&numbered_lines(100));
    ed.set_scroll_top(1.0e6);
    // 100 rows of 16px in a 160px wrapper.
    assert_eq!(ed.scroll_top(), 1440.0);
    ed.set_scroll_top(-50.0);
    assert_eq!(ed.scroll_top(), 0.0);
}

#[test]
fn scroll_into_view_brings_a_far_line_on_screen() {
    let mut ed = editor(&numbered_lines(100));
    ed.scroll_into_view(Pos::new(80, 0), Pos::new(80, 0), 0.0);
    let top = ed.scroll_top();
    assert!(top <= 80.0 * 16.0, "line top above the screen: {top}");
    assert!(top + 160.0 >= 81.0 * 16.0, "line bottom below the screen: {top}");
    let lines = ed.host().rendered_lines();
    assert!(lines.iter().any(|l| l == "line 80"));
}

#[test]
fn replaced_scrollbars_are_cleared() {
    let mut ed = editor("abc");
    let (first, first_log) = RecordingScrollbars::new();
    ed.set_scrollbars(Box::new(first));
    assert!(first_log.borrow().updates > 0);
    let (second, _) = RecordingScrollbars::new();
    ed.set_scrollbars(Box::new(second));
    assert!(first_log.borrow().cleared);
}
