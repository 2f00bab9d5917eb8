//! Fuzz target for edit, scroll and fold sequences.
//!
//! After every step the drawn lines must match the document under the
//! window, and the window must cover exactly its own bounds.

#![no_main]

use arbitrary::Arbitrary;
use editview::text::Pos;
use editview::{Editor, EditorOptions, MemoryDom};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Step {
    Replace {
        from: (u8, u8),
        to: (u8, u8),
        text: String,
    },
    Scroll(u16),
    Fold(u8, u8),
    Cursor(u8, u8),
}

fuzz_target!(|steps: Vec<Step>| {
    let text = (0..60)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut ed = Editor::new(MemoryDom::new(400.0, 160.0), &text, EditorOptions::default());

    for step in steps.into_iter().take(64) {
        match step {
            Step::Replace { from, to, text } => {
                let from = Pos::new(from.0.into(), from.1.into());
                let to = Pos::new(to.0.into(), to.1.into());
                ed.replace_range(&text, from, to);
            }
            Step::Scroll(top) => ed.set_scroll_top(f64::from(top)),
            Step::Fold(from, to) => {
                let (from, to) = (usize::from(from.min(to)), usize::from(from.max(to)));
                let _ = ed.fold_lines(from, to);
            }
            Step::Cursor(line, col) => ed.set_cursor(Pos::new(line.into(), col.into())),
        }

        let display = ed.display();
        assert_eq!(
            display.window().covered(),
            display.view_to() - display.view_from()
        );
        assert_eq!(
            ed.host().rendered_lines().len(),
            display.window().lines().len()
        );
    }
});
