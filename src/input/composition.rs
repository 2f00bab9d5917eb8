//! IME composition tracking.
//!
//! A composition moves `Idle -> Composing -> PendingApply -> Idle`. The end
//! of a composition is not applied right away: platforms tend to follow it
//! with a last input or key event, so the text waits for a short settle
//! delay, or until the next key event, whichever comes first.

use tracing::trace;

use crate::Editor;
use crate::config::InputStyle;
use crate::host::DomHost;
use crate::timers::TimerKind;

/// Where a composition is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CompositionState {
    #[default]
    Idle,
    /// Composing; holds the current candidate text.
    Composing(String),
    /// Finished, waiting to be applied.
    PendingApply(String),
}

/// Composition state of one editor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composition {
    state: CompositionState,
}

impl Composition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// Composing, or finished but not yet applied.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.state, CompositionState::Idle)
    }

    #[must_use]
    pub fn is_composing(&self) -> bool {
        matches!(self.state, CompositionState::Composing(_))
    }

    /// Begin composing. A pending composition is handed back so it can be
    /// applied first.
    pub fn start(&mut self) -> Option<String> {
        let pending = self.take_pending();
        self.state = CompositionState::Composing(String::new());
        pending
    }

    /// Record the current candidate. Ignored when not composing.
    pub fn update(&mut self, text: &str) {
        if let CompositionState::Composing(current) = &mut self.state {
            text.clone_into(current);
        }
    }

    /// Finish composing with `text`. Returns false when no composition was
    /// open.
    pub fn end(&mut self, text: &str) -> bool {
        match self.state {
            CompositionState::Composing(_) => {
                self.state = CompositionState::PendingApply(text.to_string());
                true
            }
            _ => false,
        }
    }

    /// Take a finished composition, leaving the state idle.
    pub fn take_pending(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            CompositionState::PendingApply(text) => Some(text),
            other => {
                self.state = other;
                None
            }
        }
    }
}

impl<H: DomHost> Editor<H> {
    pub(crate) fn on_composition_start(&mut self) {
        if let Some(text) = self.composition.start() {
            self.apply_composed(&text);
        }
        self.timers.clear(TimerKind::Composition);
        trace!("composition started");
    }

    pub(crate) fn on_composition_update(&mut self, text: &str) {
        self.composition.update(text);
    }

    pub(crate) fn on_composition_end(&mut self, text: &str) {
        if self.composition.end(text) {
            let at = self.host.now() + self.options.composition_settle;
            self.timers.set(TimerKind::Composition, at);
        }
    }

    /// Apply a finished composition now, if one is waiting.
    pub(crate) fn settle_composition(&mut self) {
        self.timers.clear(TimerKind::Composition);
        if let Some(text) = self.composition.take_pending() {
            self.apply_composed(&text);
        }
    }

    fn apply_composed(&mut self, text: &str) {
        trace!(len = text.len(), "applying composition");
        match self.input.style() {
            // The field already holds the text; a last poll picks up the
            // remainder as ordinary input.
            InputStyle::Textarea => {
                self.poll_input();
            }
            InputStyle::ContentEditable => {
                if !text.is_empty() {
                    self.request_batch(|ed| ed.apply_text_input(text, 0, None));
                }
            }
        }
    }
}
