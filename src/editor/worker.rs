//! Scheduling the background highlight worker.

use std::time::Duration;

use tracing::trace;

use super::Editor;
use crate::display::DirtyAspects;
use crate::host::DomHost;
use crate::timers::TimerKind;

impl<H: DomHost> Editor<H> {
    /// Schedule a worker slice `delay` from now, unless one is due sooner
    /// or the visible lines are already styled.
    pub(crate) fn start_worker(&mut self, delay: Duration) {
        if self.highlighter.needs_work(self.display.view_to()) {
            let at = self.host.now() + delay;
            self.timers.set_earliest(TimerKind::Highlight, at);
        }
    }

    /// Run one slice and redraw the visible lines whose styling changed.
    pub(crate) fn highlight_worker(&mut self) {
        let (view_from, view_to) = (self.display.view_from(), self.display.view_to());
        if !self.highlighter.needs_work(view_to) {
            return;
        }
        let deadline = self.host.now() + self.options.work_time;
        let host = &self.host;
        let slice = self.highlighter.work(
            self.doc.as_ref(),
            view_from,
            view_to,
            deadline,
            &|| host.now(),
        );
        trace!(
            frontier = self.highlighter.frontier(),
            changed = slice.changed_lines.len(),
            more = slice.more,
            "highlight worker ran"
        );
        if !slice.changed_lines.is_empty() {
            self.request_batch(|ed| {
                for line in slice.changed_lines {
                    ed.reg_line_change(line, DirtyAspects::TEXT);
                }
            });
        }
        if slice.more {
            let at = self.host.now() + self.options.work_delay;
            self.timers.set(TimerKind::Highlight, at);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::highlight::{LineState, Token, TokenKind, Tokenizer};
    use crate::host::MemoryDom;
    use crate::timers::TimerKind;
    use crate::{Editor, EditorOptions};

    /// Marks every line starting with `#` as a comment.
    struct Hashes;

    impl Tokenizer for Hashes {
        fn name(&self) -> &'static str {
            "hashes"
        }

        fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState) {
            let kind = if line.starts_with('#') {
                TokenKind::Comment
            } else {
                TokenKind::Text
            };
            (vec![Token::new(kind, 0, line.len())], state)
        }
    }

    #[test]
    fn mode_change_schedules_the_worker() {
        let mut ed = Editor::new(MemoryDom::new(400.0, 160.0), "# a\nb", EditorOptions::default());
        assert!(!ed.timers().is_set(TimerKind::Highlight));
        ed.set_mode(Arc::new(Hashes));
        assert!(ed.timers().is_set(TimerKind::Highlight));
        let at = ed.timers().deadline(TimerKind::Highlight).unwrap_or_default();
        ed.host().advance(at);
        ed.run_timers(at + Duration::from_millis(1));
        assert!(!ed.timers().is_set(TimerKind::Highlight));
        assert_eq!(ed.host().rendered_lines(), vec!["# a", "b"]);
    }
}
