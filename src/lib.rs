//! `editview` - display core for DOM-hosted text editors
//!
//! Keeps a windowed subset of a document rendered as host line nodes,
//! batches edits, selection changes and scroll requests into one flush with
//! fixed read and write phases, and maps between document positions and
//! pixels in both directions.
//!
//! The host environment is reached only through [`host::DomHost`]; the
//! in-memory [`host::MemoryDom`] lays text out on a monospace grid and is
//! what the tests and benches drive.

// Crate-level lint configuration
#![allow(dead_code)] // Public API functions not yet used internally
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Line counts become pixel heights
#![allow(clippy::cast_possible_wrap)] // Line deltas are signed
#![allow(clippy::module_name_repetitions)] // Allow display::DisplayUpdate etc
#![allow(clippy::struct_excessive_bools)] // Operation state needs multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::float_cmp)] // Pixel values are compared after the host rounds them
#![allow(clippy::branches_sharing_code)] // Code clarity over DRY in branching
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::too_many_lines)] // Flush phases read best in one piece

pub mod config;
pub mod display;
pub mod editor;
pub mod error;
pub mod event;
pub mod highlight;
pub mod host;
pub mod input;
pub mod measure;
pub mod operation;
pub mod scroll;
pub mod text;
pub mod timers;
pub mod unicode;

// Re-export core types at crate root
pub use config::{EditorOptions, InputStyle, ScrollbarStyle};
pub use editor::Editor;
pub use error::{Error, Result};
pub use event::{EditorEvent, EventKind, ListenerId};

// Re-export input types
pub use input::{InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, PointerEvent, WheelEvent};

// Re-export commonly used types
pub use display::{Bias, FoldKind, LineClassTarget, Viewport};
pub use host::{DomHost, MemoryDom, Rect};
pub use measure::{CoordSystem, Located};
pub use scroll::ScrollAxis;
pub use text::{Change, Document, Pos, Range, RopeDocument, Selection};
pub use timers::{TimerKind, Timers};
