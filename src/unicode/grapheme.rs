//! Grapheme extension checks and word boundaries.

use unicode_segmentation::UnicodeSegmentation;

/// Whether `c` extends the grapheme before it (combining marks, ZWJ,
/// variation selectors).
///
/// Measurement widens a char range over these so a cursor never lands
/// between a base character and its marks.
#[must_use]
pub fn is_extending_char(c: char) -> bool {
    if c.is_ascii() {
        return false;
    }
    let mut buf = [0u8; 8];
    buf[0] = b'a';
    let len = 1 + c.encode_utf8(&mut buf[1..]).len();
    std::str::from_utf8(&buf[..len]).is_ok_and(|s| s.graphemes(true).count() == 1)
}

/// Char offsets of the grapheme clusters in `text`.
#[must_use]
pub fn grapheme_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut chars = 0;
    for g in text.graphemes(true) {
        starts.push(chars);
        chars += g.chars().count();
    }
    starts
}

/// The word (or run of whitespace, or single punctuation cluster) around
/// char offset `col`, as a `[start, end)` char range.
///
/// At the end of a line the segment before the cursor is used.
#[must_use]
pub fn word_at(text: &str, col: usize) -> (usize, usize) {
    let mut start_char = 0;
    let mut best: Option<(usize, usize)> = None;
    for (_, segment) in text.split_word_bound_indices() {
        let len = segment.chars().count();
        let end_char = start_char + len;
        if col >= start_char && col < end_char {
            return (start_char, end_char);
        }
        if end_char == col {
            best = Some((start_char, end_char));
        }
        start_char = end_char;
    }
    best.unwrap_or((col, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combining_mark_extends() {
        assert!(is_extending_char('\u{0301}'));
        assert!(is_extending_char('\u{200D}'));
        assert!(!is_extending_char('a'));
        assert!(!is_extending_char('é'));
    }

    #[test]
    fn test_grapheme_starts() {
        assert_eq!(grapheme_starts("ae\u{0301}b"), vec![0, 1, 3]);
    }

    #[test]
    fn test_word_at_middle_and_end() {
        let text = "let value = 42;";
        assert_eq!(word_at(text, 6), (4, 9));
        assert_eq!(word_at(text, 3), (3, 4));
        assert_eq!(word_at(text, 15), (14, 15));
        assert_eq!(word_at("", 0), (0, 0));
    }
}
