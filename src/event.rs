//! Editor events and listener registration.
//!
//! Listeners run on the editor's thread with mutable access to the editor.
//! Events raised inside a batch are collected and fired when the batch
//! closes; a listener that triggers the same event again is not re-entered.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::Editor;
use crate::host::DomHost;
use crate::text::Change;

/// Something observers can react to.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// Every change applied during a batch, fired once when it closes.
    Changes(Vec<Change>),
    /// The rendered window moved.
    ViewportChange { from: usize, to: usize },
    /// A display update ran.
    Update,
    /// The selection moved or the text under it changed.
    CursorActivity,
    /// The scroll container scrolled.
    Scroll,
    Focus,
    Blur,
    /// A gutter was clicked.
    GutterClick { line: usize, gutter: String },
    /// Typed or pasted text was applied.
    InputRead(Change),
}

/// Discriminant of an [`EditorEvent`], used to subscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Changes,
    ViewportChange,
    Update,
    CursorActivity,
    Scroll,
    Focus,
    Blur,
    GutterClick,
    InputRead,
}

impl EditorEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Changes(_) => EventKind::Changes,
            Self::ViewportChange { .. } => EventKind::ViewportChange,
            Self::Update => EventKind::Update,
            Self::CursorActivity => EventKind::CursorActivity,
            Self::Scroll => EventKind::Scroll,
            Self::Focus => EventKind::Focus,
            Self::Blur => EventKind::Blur,
            Self::GutterClick { .. } => EventKind::GutterClick,
            Self::InputRead(_) => EventKind::InputRead,
        }
    }
}

/// Handle returned by [`Editor::on`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler<H> = Box<dyn FnMut(&mut Editor<H>, &EditorEvent)>;

struct Listener<H: DomHost> {
    id: ListenerId,
    kind: EventKind,
    handler: Rc<RefCell<Handler<H>>>,
}

/// Registered listeners of one editor.
pub struct Listeners<H: DomHost> {
    entries: Vec<Listener<H>>,
    next_id: u64,
}

impl<H: DomHost> Default for Listeners<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<H: DomHost> std::fmt::Debug for Listeners<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl<H: DomHost> Listeners<H> {
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.entries.iter().any(|l| l.kind == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add(&mut self, kind: EventKind, handler: Handler<H>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push(Listener {
            id,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|l| l.id == id)
    }

    fn matching(&self, kind: EventKind) -> Vec<(ListenerId, Rc<RefCell<Handler<H>>>)> {
        self.entries
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| (l.id, Rc::clone(&l.handler)))
            .collect()
    }
}

impl<H: DomHost> Editor<H> {
    /// Call `handler` for every event of `kind`.
    pub fn on(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&mut Editor<H>, &EditorEvent) + 'static,
    ) -> ListenerId {
        self.listeners.add(kind, Box::new(handler))
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Fire `event` now.
    pub(crate) fn signal(&mut self, event: EditorEvent) {
        let kind = event.kind();
        let handlers = self.listeners.matching(kind);
        if handlers.is_empty() {
            return;
        }
        trace!(?kind, listeners = handlers.len(), "signal");
        for (id, handler) in handlers {
            // Removed by an earlier listener of the same event.
            if !self.listeners.contains(id) {
                continue;
            }
            let Ok(mut handler) = handler.try_borrow_mut() else {
                continue;
            };
            (handler)(self, &event);
        }
    }

    /// Fire `event` once the current batch has closed, or now when no
    /// batch is open.
    pub(crate) fn signal_later(&mut self, event: EditorEvent) {
        if !self.listeners.has(event.kind()) {
            return;
        }
        if self.cur_op.is_some() {
            self.delayed.push(Box::new(move |ed: &mut Self| ed.signal(event)));
        } else {
            self.signal(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Pos;

    #[test]
    fn kinds_match_events() {
        let change = Change::new(Pos::new(0, 0), Pos::new(0, 0), vec!["a".into()]);
        assert_eq!(EditorEvent::Changes(vec![]).kind(), EventKind::Changes);
        assert_eq!(
            EditorEvent::ViewportChange { from: 0, to: 1 }.kind(),
            EventKind::ViewportChange
        );
        assert_eq!(EditorEvent::InputRead(change).kind(), EventKind::InputRead);
        assert_eq!(
            EditorEvent::GutterClick {
                line: 3,
                gutter: "marks".into()
            }
            .kind(),
            EventKind::GutterClick
        );
    }
}
