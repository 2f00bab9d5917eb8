//! Buffer-side primitives: positions, selections, changes, and documents.
//!
//! Everything here is plain data. The display core reads documents through
//! the [`Document`] trait and never holds on to a line across an edit.
//!
//! # Examples
//!
//! ```
//! use editview::text::{Change, Document, Pos, RopeDocument};
//!
//! let mut doc = RopeDocument::from_str("xy");
//! let change = Change::new(Pos::new(0, 0), Pos::new(0, 0), vec!["ab".into(), "cd".into()]);
//! assert_eq!(change.end(), Pos::new(1, 2));
//! doc.replace(change.from, change.to, &change.text);
//! assert_eq!(doc.text(), "ab\ncdxy");
//! ```

mod change;
mod document;
mod pos;
mod rope;
mod selection;

pub use change::{
    Change, adjust_for_change, change_end, compute_sel_after_change, offset_pos, split_lines,
};
pub use document::Document;
pub use pos::{Pos, clip_line, clip_pos, max_pos, min_pos};
pub use rope::RopeDocument;
pub use selection::{Range, Selection};
