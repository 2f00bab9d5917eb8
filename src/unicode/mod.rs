//! Unicode utilities for bidi ordering, grapheme handling, and column width.

mod bidi;
mod grapheme;
mod width;

pub use bidi::{
    BidiPart, bidi_order, bidi_part_at, bidi_sections, has_rtl, line_left, line_right, move_visually,
};
pub use grapheme::{grapheme_starts, is_extending_char, word_at};
pub use width::{WidthMethod, char_columns, text_columns};
