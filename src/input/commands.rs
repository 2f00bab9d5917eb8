//! Editing commands and the default key bindings.

use crate::Editor;
use crate::host::DomHost;
use crate::input::keyboard::{KeyCode, KeyEvent, KeyModifiers};
use crate::measure::CoordSystem;
use crate::text::{Pos, Range, Selection};
use crate::unicode::{bidi_order, line_left, line_right, move_visually};

/// Distance probed past a line box when moving vertically.
const LINE_PROBE: f64 = 3.0;

/// Step used to walk out of space that holds no text.
const PROBE_STEP: f64 = 5.0;

/// A named editor action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    GoCharLeft,
    GoCharRight,
    GoLineUp,
    GoLineDown,
    GoPageUp,
    GoPageDown,
    /// Start of the line's text, or column zero when already there.
    GoLineStart,
    GoLineEnd,
    GoDocStart,
    GoDocEnd,
    DelCharBefore,
    DelCharAfter,
    Newline,
    SelectAll,
    /// Drop every range but the primary one.
    SingleSelection,
    ToggleOverwrite,
}

impl Command {
    /// Commands that only move the cursor; Shift extends them.
    #[must_use]
    pub fn is_motion(self) -> bool {
        matches!(
            self,
            Self::GoCharLeft
                | Self::GoCharRight
                | Self::GoLineUp
                | Self::GoLineDown
                | Self::GoPageUp
                | Self::GoPageDown
                | Self::GoLineStart
                | Self::GoLineEnd
                | Self::GoDocStart
                | Self::GoDocEnd
        )
    }

    /// Commands that change the document.
    #[must_use]
    pub fn edits(self) -> bool {
        matches!(self, Self::DelCharBefore | Self::DelCharAfter | Self::Newline)
    }
}

/// Default binding for a key, ignoring Shift.
#[must_use]
pub fn lookup_key(key: &KeyEvent) -> Option<Command> {
    let mods = key.command_modifiers();
    let command = if mods.is_empty() {
        match key.code {
            KeyCode::Left => Command::GoCharLeft,
            KeyCode::Right => Command::GoCharRight,
            KeyCode::Up => Command::GoLineUp,
            KeyCode::Down => Command::GoLineDown,
            KeyCode::PageUp => Command::GoPageUp,
            KeyCode::PageDown => Command::GoPageDown,
            KeyCode::Home => Command::GoLineStart,
            KeyCode::End => Command::GoLineEnd,
            KeyCode::Backspace => Command::DelCharBefore,
            KeyCode::Delete => Command::DelCharAfter,
            KeyCode::Enter => Command::Newline,
            KeyCode::Insert => Command::ToggleOverwrite,
            KeyCode::Esc => Command::SingleSelection,
            _ => return None,
        }
    } else if mods == KeyModifiers::CTRL {
        match key.code {
            KeyCode::Char('a' | 'A') => Command::SelectAll,
            KeyCode::Home => Command::GoDocStart,
            KeyCode::End => Command::GoDocEnd,
            _ => return None,
        }
    } else {
        return None;
    };
    Some(command)
}

/// Resolve a key to the command it runs, honoring Shift: motions extend
/// the selection, Shift-Backspace still deletes, anything else with Shift
/// is unbound.
#[must_use]
pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    let command = lookup_key(key)?;
    if key.shift() && !command.is_motion() && key.code != KeyCode::Backspace {
        return None;
    }
    Some(command)
}

impl<H: DomHost> Editor<H> {
    /// Run a command inside a batch. Edits are ignored in read-only mode.
    pub fn exec_command(&mut self, command: Command) {
        self.request_batch(|ed| {
            let suppress = ed.options.read_only && command.edits();
            ed.state.suppress_edits = suppress;
            ed.run_command(command);
            ed.state.suppress_edits = false;
        });
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::GoCharLeft => self.move_h(-1),
            Command::GoCharRight => self.move_h(1),
            Command::GoLineUp => self.move_v(-1, false),
            Command::GoLineDown => self.move_v(1, false),
            Command::GoPageUp => self.move_v(-1, true),
            Command::GoPageDown => self.move_v(1, true),
            Command::GoLineStart => self.extend_selections_by(|ed, range| {
                let line = ed.doc.line_text(range.head.line);
                let indent = line.chars().take_while(|c| c.is_whitespace()).count();
                let col = if range.head.col == indent { 0 } else { indent };
                Pos::new(range.head.line, col)
            }),
            Command::GoLineEnd => self.extend_selections_by(|ed, range| ed.visual_line_end(range.head.line)),
            Command::GoDocStart => {
                let start = Pos::new(self.doc.first_line(), 0);
                self.extend_selections_by(|_, _| start);
            }
            Command::GoDocEnd => {
                let last = self.doc.last_line();
                let end = Pos::new(last, self.doc.content_length(last));
                self.extend_selections_by(|_, _| end);
            }
            Command::DelCharBefore => self.delete_h(-1),
            Command::DelCharAfter => self.delete_h(1),
            Command::Newline => self.replace_selection_with_origin("\n", Some("+input")),
            Command::SelectAll => {
                let last = self.doc.last_line();
                let sel = Selection::simple(
                    Pos::new(self.doc.first_line(), 0),
                    Pos::new(last, self.doc.content_length(last)),
                );
                self.set_selection_inner(sel, false);
            }
            Command::SingleSelection => {
                let primary = self.sel.primary();
                self.set_selection_inner(Selection::new(vec![primary], 0), false);
            }
            Command::ToggleOverwrite => self.state.overwrite = !self.state.overwrite,
        }
    }

    /// Map every range through `f`, extending when Shift is held.
    fn extend_selections_by(&mut self, mut f: impl FnMut(&mut Self, Range) -> Pos) {
        let extend = self.state.shift;
        let ranges: Vec<Range> = self
            .sel
            .ranges()
            .to_vec()
            .into_iter()
            .map(|range| {
                let head = f(self, range);
                if extend {
                    Range::new(range.anchor, head)
                } else {
                    Range::cursor(head)
                }
            })
            .collect();
        let sel = Selection::normalize(ranges, self.sel.primary_index());
        self.set_selection_inner(sel, true);
    }

    /// End of the visual line that `line` belongs to.
    fn visual_line_end(&self, line: usize) -> Pos {
        let end = self
            .display
            .folds
            .at(line)
            .filter(|f| f.kind == crate::display::FoldKind::Fold)
            .map_or(line, |f| f.to);
        Pos::new(end, self.doc.content_length(end))
    }

    /// Next visible line from `line` in direction `dir`.
    fn next_visible_line(&self, line: usize, dir: isize) -> Option<usize> {
        let first = self.doc.first_line();
        let last = self.doc.last_line();
        let mut l = line;
        loop {
            l = l.checked_add_signed(dir)?;
            if l < first || l > last {
                return None;
            }
            if !self.display.folds.is_hidden(l) {
                return Some(l);
            }
        }
    }

    /// One char left or right of `pos`, crossing line ends. With
    /// `visually`, bidi text moves in screen order.
    pub(crate) fn find_pos_h(&self, pos: Pos, dir: isize, visually: bool) -> Pos {
        let text = self.doc.line_text(pos.line);
        let chars: Vec<char> = text.chars().collect();
        let order = if visually { bidi_order(&text) } else { None };
        if let Some(col) = move_visually(&chars, order.as_deref(), pos.col, dir, true) {
            return Pos::new(pos.line, col);
        }
        let Some(line) = self.next_visible_line(self.display.folds.visual_line_no(pos.line), dir)
        else {
            return pos;
        };
        let line = if dir < 0 {
            self.visual_line_end(line).line
        } else {
            line
        };
        let text = self.doc.line_text(line);
        let len = text.chars().count();
        let order = if visually { bidi_order(&text) } else { None };
        let col = if !visually {
            if dir < 0 { len } else { 0 }
        } else if dir < 0 {
            line_right(order.as_deref(), len)
        } else {
            line_left(order.as_deref())
        };
        Pos::new(line, col)
    }

    fn move_h(&mut self, dir: isize) {
        let extend = self.state.shift;
        self.extend_selections_by(|ed, range| {
            if extend || range.empty() {
                ed.find_pos_h(range.head, dir, true)
            } else if dir < 0 {
                range.from()
            } else {
                range.to()
            }
        });
    }

    /// Position a line or a page above or below the point `(x, y)` in
    /// line-container coordinates.
    fn find_pos_v(&mut self, x: f64, top: f64, bottom: f64, dir: isize, page: bool) -> Pos {
        let mut y = if page {
            let page_size = self.host.wrapper_size().1;
            let th = self.text_height();
            let keep = if dir < 0 { 1.5 } else { 0.5 };
            top + dir as f64 * (page_size - keep * th)
        } else if dir > 0 {
            bottom + LINE_PROBE
        } else {
            top - LINE_PROBE
        };
        let doc_height = self.display.heights.total() - self.display.view_offset;
        let floor = -self.display.view_offset;
        loop {
            let target = self.coords_char(x, y);
            if !target.outside {
                return target.pos;
            }
            if (dir < 0 && y <= floor) || (dir > 0 && y >= doc_height) {
                return target.pos;
            }
            y += dir as f64 * PROBE_STEP;
        }
    }

    fn move_v(&mut self, dir: isize, page: bool) {
        let extend = self.state.shift;
        let collapse = !extend && self.sel.something_selected();
        let old_goals = std::mem::take(&mut self.state.goal_columns);
        let primary = self.sel.primary_index();
        let mut goals = Vec::new();
        let mut scroll_by = None;
        let ranges: Vec<Range> = self.sel.ranges().to_vec();
        let mut moved = Vec::with_capacity(ranges.len());
        for (i, range) in ranges.into_iter().enumerate() {
            if collapse {
                moved.push(Range::cursor(if dir < 0 { range.from() } else { range.to() }));
                continue;
            }
            let head = self.cursor_coords(range.head, CoordSystem::Div);
            let x = old_goals.get(i).copied().unwrap_or(head.left);
            goals.push(x);
            let pos = self.find_pos_v(x, head.top, head.bottom, dir, page);
            if page && i == primary {
                let moved_to = self.char_coords(pos, CoordSystem::Div, None);
                scroll_by = Some(moved_to.top - head.top);
            }
            moved.push(if extend {
                Range::new(range.anchor, pos)
            } else {
                Range::cursor(pos)
            });
        }
        let sel = Selection::normalize(moved, primary);
        self.set_selection_inner(sel, true);
        if let Some(delta) = scroll_by {
            let current = self.display.scroll_top;
            if let Some(op) = self.cur_op.as_mut() {
                op.scroll_top = Some(op.scroll_top.unwrap_or(current) + delta);
            }
        }
        if goals.len() == self.sel.ranges().len() {
            self.state.goal_columns = goals;
        }
    }

    fn delete_h(&mut self, dir: isize) {
        if self.sel.something_selected() {
            self.replace_selection_with_origin("", Some("+delete"));
            return;
        }
        let mut kill: Vec<(Pos, Pos)> = Vec::new();
        for range in self.sel.ranges() {
            let other = self.find_pos_h(range.head, dir, false);
            let (from, to) = if dir < 0 {
                (other, range.head)
            } else {
                (range.head, other)
            };
            match kill.last_mut() {
                Some(last) if from <= last.1 => last.1 = last.1.max(to),
                _ => kill.push((from, to)),
            }
        }
        for (from, to) in kill.into_iter().rev() {
            self.replace_range_with_origin("", from, to, Some("+delete"));
        }
        self.ensure_cursor_visible();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_map_to_motions() {
        assert_eq!(lookup_key(&KeyEvent::key(KeyCode::Left)), Some(Command::GoCharLeft));
        assert_eq!(
            lookup_key(&KeyEvent::with_ctrl(KeyCode::Home)),
            Some(Command::GoDocStart)
        );
        assert_eq!(lookup_key(&KeyEvent::key(KeyCode::Char('a'))), None);
    }

    #[test]
    fn shift_only_extends_motions() {
        assert_eq!(
            command_for_key(&KeyEvent::with_shift(KeyCode::Right)),
            Some(Command::GoCharRight)
        );
        assert_eq!(
            command_for_key(&KeyEvent::with_shift(KeyCode::Backspace)),
            Some(Command::DelCharBefore)
        );
        assert_eq!(command_for_key(&KeyEvent::with_shift(KeyCode::Enter)), None);
    }

    #[test]
    fn command_classes() {
        assert!(Command::GoPageDown.is_motion());
        assert!(!Command::SelectAll.is_motion());
        assert!(Command::Newline.edits());
        assert!(!Command::GoLineEnd.edits());
    }
}
