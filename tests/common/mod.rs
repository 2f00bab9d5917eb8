#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Each test binary uses a different subset

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use editview::host::{BarSizes, MemoryDom, ScrollMetrics, Scrollbars};
use editview::{Editor, EditorOptions};
use tracing::Level;

static INIT: Once = Once::new();

/// Route the crate's tracing output to the test harness.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

/// `count` lines reading "line 0", "line 1", ...
pub fn numbered_lines(count: usize) -> String {
    (0..count)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A 400x160 host: ten 16px rows of fifty 8px columns.
pub fn small_host() -> MemoryDom {
    MemoryDom::new(400.0, 160.0)
}

pub fn editor(text: &str) -> Editor {
    init_logging();
    Editor::new(small_host(), text, EditorOptions::default())
}

pub fn editor_with(text: &str, options: EditorOptions) -> Editor {
    init_logging();
    Editor::new(small_host(), text, options)
}

/// Calls a [`RecordingScrollbars`] received.
#[derive(Debug, Default)]
pub struct ScrollbarLog {
    pub updates: usize,
    pub tops: Vec<f64>,
    pub lefts: Vec<f64>,
    pub cleared: bool,
}

/// Scrollbars that take no space and record every call.
#[derive(Debug, Default)]
pub struct RecordingScrollbars {
    pub log: Rc<RefCell<ScrollbarLog>>,
}

impl RecordingScrollbars {
    pub fn new() -> (Self, Rc<RefCell<ScrollbarLog>>) {
        let log = Rc::new(RefCell::new(ScrollbarLog::default()));
        (
            Self {
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl Scrollbars for RecordingScrollbars {
    fn update(&mut self, _metrics: &ScrollMetrics) -> BarSizes {
        self.log.borrow_mut().updates += 1;
        BarSizes::default()
    }

    fn set_scroll_top(&mut self, pos: f64) {
        self.log.borrow_mut().tops.push(pos);
    }

    fn set_scroll_left(&mut self, pos: f64) {
        self.log.borrow_mut().lefts.push(pos);
    }

    fn clear(&mut self) {
        self.log.borrow_mut().cleared = true;
    }
}
