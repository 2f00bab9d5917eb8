//! Fuzz target for point to position mapping.
//!
//! Tests that any point, on or off the document, maps to a position inside
//! it without panicking.

#![no_main]

use editview::text::clip_pos;
use editview::{CoordSystem, Editor, EditorOptions, MemoryDom};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, i16, i16, bool)| {
    let (text, x, y, wrap) = input;
    let options = EditorOptions {
        line_wrapping: wrap,
        ..EditorOptions::default()
    };
    let mut ed = Editor::new(MemoryDom::new(400.0, 160.0), &text, options);

    let found = ed.locate_position(f64::from(x), f64::from(y), CoordSystem::Local);
    assert_eq!(clip_pos(ed.document(), found.pos), found.pos);

    let back = ed.measure_position(found.pos, CoordSystem::Local);
    assert!(back.top <= back.bottom);
});
