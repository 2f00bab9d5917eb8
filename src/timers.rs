//! Deadlines for the editor's deferred work.
//!
//! The core never sleeps. Each kind of deferred work keeps at most one
//! deadline; the host asks for [`Timers::next_deadline`], waits, and calls
//! [`crate::Editor::run_timers`].

use std::time::Duration;

/// Kinds of deferred work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Next highlight worker slice.
    Highlight,
    /// Next poll of the hidden input field.
    Poll,
    /// Applying a finished composition.
    Composition,
    /// Reading the scroll caused by a wheel sample.
    WheelSample,
    /// Acting on a blur.
    Blur,
}

impl TimerKind {
    pub const ALL: [Self; 5] = [
        Self::Highlight,
        Self::Poll,
        Self::Composition,
        Self::WheelSample,
        Self::Blur,
    ];

    const fn slot(self) -> usize {
        match self {
            Self::Highlight => 0,
            Self::Poll => 1,
            Self::Composition => 2,
            Self::WheelSample => 3,
            Self::Blur => 4,
        }
    }
}

/// One optional deadline per [`TimerKind`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    deadlines: [Option<Duration>; 5],
}

impl Timers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `kind` to fire at `at`, replacing any earlier deadline.
    pub fn set(&mut self, kind: TimerKind, at: Duration) {
        self.deadlines[kind.slot()] = Some(at);
    }

    /// Set `kind` to fire at `at` unless it already fires sooner.
    pub fn set_earliest(&mut self, kind: TimerKind, at: Duration) {
        let slot = &mut self.deadlines[kind.slot()];
        if slot.is_none_or(|cur| at < cur) {
            *slot = Some(at);
        }
    }

    pub fn clear(&mut self, kind: TimerKind) {
        self.deadlines[kind.slot()] = None;
    }

    #[must_use]
    pub fn is_set(&self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].is_some()
    }

    #[must_use]
    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.deadlines[kind.slot()]
    }

    /// Kinds whose deadline has passed at `now`, cleared and in deadline
    /// order.
    pub fn take_due(&mut self, now: Duration) -> Vec<TimerKind> {
        let mut due: Vec<(Duration, TimerKind)> = TimerKind::ALL
            .iter()
            .filter_map(|&k| self.deadline(k).filter(|&at| at <= now).map(|at| (at, k)))
            .collect();
        due.sort();
        for (_, kind) in &due {
            self.clear(*kind);
        }
        due.into_iter().map(|(_, k)| k).collect()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.iter().flatten().min().copied()
    }
}
