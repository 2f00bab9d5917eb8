//! Styling capability and the incremental highlight worker.
//!
//! Modes implement [`Tokenizer`]; the display asks a [`Highlighter`] for the
//! tokens of each rendered line and lets the worker catch the line states
//! up in the background.

pub mod token;
pub mod tokenizer;
mod worker;

pub use token::{Token, TokenKind};
pub use tokenizer::{CommentKind, LineState, PlainTokenizer, StringKind, Tokenizer};
pub use worker::{Highlighter, WorkSlice};
