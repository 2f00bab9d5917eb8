//! Bidirectional run ordering for measurement and cursor motion.
//!
//! A line's [`BidiPart`]s are its level runs in visual (left-to-right)
//! order, with `from`/`to` as char offsets. Lines without right-to-left
//! text have no order at all, which lets callers take the cheap logical
//! path.

use unicode_bidi::{BidiClass, BidiInfo};

use crate::unicode::grapheme::is_extending_char;

/// One level run of a line, in visual order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BidiPart {
    pub from: usize,
    pub to: usize,
    pub level: u8,
}

impl BidiPart {
    /// Whether the run is laid out right to left.
    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }

    /// Char offset at the visual left edge of the run.
    #[must_use]
    pub fn left(&self) -> usize {
        if self.is_rtl() { self.to } else { self.from }
    }

    /// Char offset at the visual right edge of the run.
    #[must_use]
    pub fn right(&self) -> usize {
        if self.is_rtl() { self.from } else { self.to }
    }
}

/// Whether `text` contains any strong right-to-left character.
#[must_use]
pub fn has_rtl(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(
            unicode_bidi::bidi_class(c),
            BidiClass::R | BidiClass::AL | BidiClass::RLE | BidiClass::RLO | BidiClass::RLI
        )
    })
}

/// Visual run order for a line, or `None` when it is plain left-to-right.
#[must_use]
pub fn bidi_order(text: &str) -> Option<Vec<BidiPart>> {
    if text.is_empty() || !has_rtl(text) {
        return None;
    }
    let info = BidiInfo::new(text, None);
    let para = info.paragraphs.first()?;
    let (levels, runs) = info.visual_runs(para, para.range.clone());

    // Byte offsets to char offsets, one entry per byte boundary we touch.
    let mut char_at = vec![0usize; text.len() + 1];
    let mut count = 0;
    for (byte, c) in text.char_indices() {
        for slot in &mut char_at[byte..byte + c.len_utf8()] {
            *slot = count;
        }
        count += 1;
    }
    char_at[text.len()] = count;

    let parts = runs
        .into_iter()
        .filter(|run| !run.is_empty())
        .map(|run| BidiPart {
            from: char_at[run.start],
            to: char_at[run.end],
            level: levels[run.start].number(),
        })
        .collect::<Vec<_>>();
    if parts.is_empty() { None } else { Some(parts) }
}

/// Leftmost visual offset of a line.
#[must_use]
pub fn line_left(order: Option<&[BidiPart]>) -> usize {
    order.and_then(<[BidiPart]>::first).map_or(0, BidiPart::left)
}

/// Rightmost visual offset of a line with `len` chars.
#[must_use]
pub fn line_right(order: Option<&[BidiPart]>, len: usize) -> usize {
    order.and_then(<[BidiPart]>::last).map_or(len, BidiPart::right)
}

/// Pieces of `[from, to)` in visual order, each with its direction
/// (`true` for right to left).
#[must_use]
pub fn bidi_sections(order: Option<&[BidiPart]>, from: usize, to: usize) -> Vec<(usize, usize, bool)> {
    let Some(order) = order else {
        return vec![(from, to, false)];
    };
    let mut out = Vec::new();
    for part in order {
        if (part.from < to && part.to > from) || (from == to && part.to == from) {
            out.push((part.from.max(from), part.to.min(to), part.is_rtl()));
        }
    }
    if out.is_empty() {
        out.push((from, to, false));
    }
    out
}

fn compare_bidi_level(order: &[BidiPart], a: u8, b: u8) -> bool {
    let line_dir = order[0].level;
    if a == line_dir {
        return true;
    }
    if b == line_dir {
        return false;
    }
    a < b
}

/// Index of the run a cursor at `pos` belongs to.
///
/// On a boundary between runs of different levels a cursor is drawn twice.
/// The second element names the other run when that happens.
#[must_use]
pub fn bidi_part_at(order: &[BidiPart], pos: usize) -> (usize, Option<usize>) {
    let mut found: Option<usize> = None;
    for (i, cur) in order.iter().enumerate() {
        if cur.from < pos && cur.to > pos {
            return (i, None);
        }
        if cur.from == pos || cur.to == pos {
            match found {
                None => found = Some(i),
                Some(f) => {
                    let other_nonempty = cur.from != cur.to;
                    if compare_bidi_level(order, cur.level, order[f].level) {
                        return (i, other_nonempty.then_some(f));
                    }
                    return (f, other_nonempty.then_some(i));
                }
            }
        }
    }
    (found.unwrap_or(0), None)
}

fn move_in_line(chars: &[char], pos: usize, dir: isize, by_unit: bool) -> Option<usize> {
    let mut pos = pos.checked_add_signed(dir)?;
    if by_unit {
        while pos > 0 && chars.get(pos).copied().is_some_and(is_extending_char) {
            pos = pos.checked_add_signed(dir)?;
        }
    }
    Some(pos)
}

/// Move one position to the visual left (`dir < 0`) or right (`dir > 0`).
///
/// Returns `None` when the move leaves the line. With `by_unit` set,
/// combining marks are skipped together with their base.
#[must_use]
pub fn move_visually(
    chars: &[char],
    order: Option<&[BidiPart]>,
    start: usize,
    dir: isize,
    by_unit: bool,
) -> Option<usize> {
    let Some(order) = order else {
        let target = move_in_line(chars, start, dir, by_unit)?;
        return (target <= chars.len()).then_some(target);
    };
    let (mut idx, _) = bidi_part_at(order, start);
    let mut part = order[idx];
    let step = if part.is_rtl() { -dir } else { dir };
    let mut target = move_in_line(chars, start, step, by_unit);

    loop {
        if let Some(t) = target {
            if t > part.from && t < part.to {
                return Some(t);
            }
            if t == part.from || t == part.to {
                if bidi_part_at(order, t).0 == idx {
                    return Some(t);
                }
                idx = idx.checked_add_signed(dir)?;
                part = *order.get(idx)?;
                return Some(if (dir > 0) == part.is_rtl() {
                    part.to
                } else {
                    part.from
                });
            }
        }
        idx = idx.checked_add_signed(dir)?;
        part = *order.get(idx)?;
        target = if (dir > 0) == part.is_rtl() {
            move_in_line(chars, part.to, -1, by_unit)
        } else {
            move_in_line(chars, part.from, 1, by_unit)
        };
    }
}
