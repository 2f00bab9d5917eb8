//! Incremental, time-sliced highlighting.
//!
//! Lines before the frontier have a precise end state. The worker advances
//! the frontier in slices bounded by a wall-clock budget, remembers the
//! state after every fifth line outside the view, and reports visible lines
//! whose styles changed so the display can redraw just those.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use super::token::Token;
use super::tokenizer::{LineState, PlainTokenizer, Tokenizer};
use crate::text::{Change, Document};

/// How far back an imprecise state lookup searches for a saved state.
const STATE_SEARCH_LIMIT: usize = 100;

/// Lines past the view the worker keeps going through in one run.
const WORK_AHEAD: usize = 500;

#[derive(Clone, Debug, Default)]
struct LineHighlight {
    styles: Option<Vec<Token>>,
    state_after: Option<LineState>,
}

/// Outcome of one worker slice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkSlice {
    /// Visible lines whose tokens differ from what was rendered.
    pub changed_lines: Vec<usize>,
    /// Whether the budget ran out before the work was done.
    pub more: bool,
}

/// Per-document highlight cache and frontier.
pub struct Highlighter {
    tokenizer: Arc<dyn Tokenizer>,
    first: usize,
    frontier: usize,
    lines: Vec<LineHighlight>,
}

impl Highlighter {
    /// Create a highlighter for a document of `line_count` lines starting at `first`.
    #[must_use]
    pub fn new(tokenizer: Arc<dyn Tokenizer>, first: usize, line_count: usize) -> Self {
        Self {
            tokenizer,
            first,
            frontier: first,
            lines: vec![LineHighlight::default(); line_count],
        }
    }

    /// A highlighter that styles nothing.
    #[must_use]
    pub fn plain(first: usize, line_count: usize) -> Self {
        Self::new(Arc::new(PlainTokenizer), first, line_count)
    }

    /// Replace the tokenizer, dropping every cached style.
    pub fn set_tokenizer(&mut self, tokenizer: Arc<dyn Tokenizer>) {
        self.tokenizer = tokenizer;
        self.frontier = self.first;
        for line in &mut self.lines {
            *line = LineHighlight::default();
        }
    }

    /// Whether the worker has anything to do for a view ending at `view_to`.
    #[must_use]
    pub fn needs_work(&self, view_to: usize) -> bool {
        self.tokenizer.is_stateful() && self.frontier < view_to
    }

    /// First line without a precise start state.
    #[must_use]
    pub fn frontier(&self) -> usize {
        self.frontier
    }

    fn slot(&self, line: usize) -> Option<usize> {
        line.checked_sub(self.first)
            .filter(|&idx| idx < self.lines.len())
    }

    /// Keep the cache aligned with a change that has just been applied.
    pub fn apply_change(&mut self, change: &Change) {
        let (Some(from), Some(to)) = (self.slot(change.from.line), self.slot(change.to.line)) else {
            return;
        };
        let fresh = vec![LineHighlight::default(); change.text.len()];
        self.lines.splice(from..=to, fresh);
        self.frontier = self.frontier.min(change.from.line);
    }

    /// Shift the cache to a new first line.
    pub fn set_first_line(&mut self, first: usize) {
        if first >= self.first {
            self.frontier += first - self.first;
        } else {
            self.frontier = self.frontier.saturating_sub(self.first - first);
        }
        self.first = first;
    }

    /// Throw away the cache for a document of `line_count` lines.
    pub fn reset(&mut self, first: usize, line_count: usize) {
        self.first = first;
        self.frontier = first;
        self.lines = vec![LineHighlight::default(); line_count];
    }

    /// Tokens for `line`, computing them from the nearest known state when
    /// they are not cached.
    pub fn styles_for(&mut self, doc: &dyn Document, line: usize, view: (usize, usize)) -> Vec<Token> {
        let Some(idx) = self.slot(line) else {
            return Vec::new();
        };
        if let Some(styles) = &self.lines[idx].styles {
            return styles.clone();
        }
        let state = self.state_before(doc, line, false, view);
        let (tokens, _) = self.tokenizer.tokenize_line(&doc.line_text(line), state);
        self.lines[idx].styles = Some(tokens.clone());
        tokens
    }

    fn find_start_line(&self, doc: &dyn Document, n: usize, precise: bool) -> usize {
        let limit = if precise {
            self.first
        } else {
            n.saturating_sub(STATE_SEARCH_LIMIT).max(self.first)
        };
        let mut min_indent: Option<(usize, usize)> = None;
        let mut search = n;
        while search > limit {
            if search <= self.first {
                return self.first;
            }
            let prev = search - 1;
            if let Some(idx) = self.slot(prev) {
                if self.lines[idx].state_after.is_some() && (!precise || search <= self.frontier) {
                    return search;
                }
            }
            let indent = doc
                .line_text(prev)
                .chars()
                .take_while(|c| c.is_whitespace())
                .count();
            if min_indent.is_none_or(|(_, best)| indent < best) {
                min_indent = Some((prev, indent));
            }
            search -= 1;
        }
        if search <= self.first {
            return self.first;
        }
        min_indent.map_or(self.first, |(line, _)| line)
    }

    /// Tokenizer state at the start of line `n`.
    pub fn state_before(
        &mut self,
        doc: &dyn Document,
        n: usize,
        precise: bool,
        view: (usize, usize),
    ) -> LineState {
        let mut pos = self.find_start_line(doc, n, precise);
        let mut state = if pos > self.first {
            self.slot(pos - 1)
                .and_then(|idx| self.lines[idx].state_after)
                .unwrap_or_default()
        } else {
            LineState::default()
        };
        let tokenizer = Arc::clone(&self.tokenizer);
        let first = self.first;
        let lines = &mut self.lines;
        doc.iter_lines(pos, n, &mut |line, text| {
            let (_, next) = tokenizer.tokenize_line(text, state);
            state = next;
            let save = pos + 1 == n || pos % 5 == 0 || (pos >= view.0 && pos < view.1);
            if let Some(slot) = lines.get_mut(line - first) {
                slot.state_after = save.then_some(state);
            }
            pos += 1;
            ControlFlow::Continue(())
        });
        if precise {
            self.frontier = pos;
        }
        state
    }

    /// Run one slice of work against the view `[view_from, view_to)`.
    ///
    /// `now` reads the host clock; the slice stops once it passes
    /// `deadline`.
    pub fn work(
        &mut self,
        doc: &dyn Document,
        view_from: usize,
        view_to: usize,
        deadline: Duration,
        now: &dyn Fn() -> Duration,
    ) -> WorkSlice {
        let mut result = WorkSlice::default();
        if self.frontier < self.first {
            self.frontier = self.first;
        }
        if self.frontier >= view_to {
            return result;
        }
        let mut state = self.state_before(doc, self.frontier, true, (view_from, view_to));
        let end = (self.first + self.lines.len()).min(view_to + WORK_AHEAD);
        let tokenizer = Arc::clone(&self.tokenizer);
        let first = self.first;
        let start = self.frontier;
        let mut frontier = self.frontier;
        let lines = &mut self.lines;

        doc.iter_lines(start, end, &mut |line, text| {
            let (tokens, next) = tokenizer.tokenize_line(text, state);
            state = next;
            if let Some(slot) = lines.get_mut(line - first) {
                if frontier >= view_from {
                    if slot.styles.as_ref() != Some(&tokens) {
                        result.changed_lines.push(frontier);
                    }
                    slot.styles = Some(tokens);
                    slot.state_after = Some(state);
                } else {
                    slot.state_after = (frontier % 5 == 0).then_some(state);
                }
            }
            frontier += 1;
            if now() > deadline {
                result.more = true;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        self.frontier = frontier;
        trace!(
            from = start,
            to = frontier,
            changed = result.changed_lines.len(),
            "highlight slice"
        );
        result
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("tokenizer", &self.tokenizer.name())
            .field("first", &self.first)
            .field("frontier", &self.frontier)
            .field("lines", &self.lines.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{CommentKind, TokenKind};
    use crate::text::{Pos, RopeDocument};
    use std::cell::Cell;

    /// Marks everything between `/*` and `*/` as a comment, across lines.
    struct BlockComments;

    impl Tokenizer for BlockComments {
        fn name(&self) -> &'static str {
            "BlockComments"
        }

        fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState) {
            let mut in_comment = matches!(state, LineState::InComment(_));
            let mut tokens = Vec::new();
            let mut start = 0;
            let mut i = 0;
            let bytes = line.as_bytes();
            while i < bytes.len() {
                if !in_comment && bytes[i..].starts_with(b"/*") {
                    if i > start {
                        tokens.push(Token::new(TokenKind::Text, start, i));
                    }
                    start = i;
                    in_comment = true;
                    i += 2;
                } else if in_comment && bytes[i..].starts_with(b"*/") {
                    i += 2;
                    tokens.push(Token::new(TokenKind::Comment, start, i));
                    start = i;
                    in_comment = false;
                } else {
                    i += 1;
                }
            }
            if start < bytes.len() {
                let kind = if in_comment {
                    TokenKind::Comment
                } else {
                    TokenKind::Text
                };
                tokens.push(Token::new(kind, start, bytes.len()));
            }
            let state = if in_comment {
                LineState::InComment(CommentKind::Block)
            } else {
                LineState::Normal
            };
            (tokens, state)
        }
    }

    fn doc_with_comment() -> RopeDocument {
        RopeDocument::from_lines(&["a", "/* start", "middle", "end */", "b"])
    }

    #[test]
    fn styles_on_demand_use_prior_state() {
        let doc = doc_with_comment();
        let mut hl = Highlighter::new(Arc::new(BlockComments), 0, doc.line_count());
        let styles = hl.styles_for(&doc, 2, (0, 5));
        assert_eq!(styles, vec![Token::new(TokenKind::Comment, 0, 6)]);
    }

    #[test]
    fn worker_advances_frontier_and_reports_changes() {
        let doc = doc_with_comment();
        let mut hl = Highlighter::new(Arc::new(BlockComments), 0, doc.line_count());
        let now = || Duration::ZERO;
        let slice = hl.work(&doc, 0, 5, Duration::from_secs(1), &now);
        assert!(!slice.more);
        assert_eq!(slice.changed_lines, vec![0, 1, 2, 3, 4]);
        assert_eq!(hl.frontier(), 5);

        // A second pass finds nothing new.
        let again = hl.work(&doc, 0, 5, Duration::from_secs(1), &now);
        assert!(again.changed_lines.is_empty());
    }

    #[test]
    fn worker_respects_budget() {
        let doc = RopeDocument::from_lines(&vec!["x"; 50]);
        let mut hl = Highlighter::new(Arc::new(BlockComments), 0, doc.line_count());
        let clock = Cell::new(0u64);
        let now = || {
            clock.set(clock.get() + 1);
            Duration::from_millis(clock.get())
        };
        let slice = hl.work(&doc, 0, 50, Duration::from_millis(10), &now);
        assert!(slice.more);
        assert!(hl.frontier() < 50);
        assert!(hl.frontier() > 0);
    }

    #[test]
    fn change_pulls_frontier_back() {
        let mut doc = doc_with_comment();
        let mut hl = Highlighter::new(Arc::new(BlockComments), 0, doc.line_count());
        let now = || Duration::ZERO;
        hl.work(&doc, 0, 5, Duration::from_secs(1), &now);

        let change = Change::from_str(Pos::new(1, 0), Pos::new(1, 2), "");
        doc.replace(change.from, change.to, &change.text);
        hl.apply_change(&change);
        assert_eq!(hl.frontier(), 1);

        let slice = hl.work(&doc, 0, 5, Duration::from_secs(1), &now);
        assert!(slice.changed_lines.contains(&2));
    }

    #[test]
    fn plain_mode_needs_no_work() {
        let hl = Highlighter::plain(0, 10);
        assert!(!hl.needs_work(10));
    }
}
