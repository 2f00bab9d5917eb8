//! Column widths for monospace layout.

use unicode_width::UnicodeWidthChar;

/// Width calculation method for ambiguous-width characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1.
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2.
    Unicode,
}

/// Columns taken by `c` when it starts at column `col`.
///
/// Tabs advance to the next multiple of `tab_size`; control characters
/// and combining marks take no space.
#[inline]
#[must_use]
pub fn char_columns(c: char, col: usize, tab_size: usize, method: WidthMethod) -> usize {
    if c == '\t' {
        let tab = tab_size.max(1);
        return tab - col % tab;
    }
    if c.is_ascii() && (' '..='~').contains(&c) {
        return 1;
    }
    if c < ' ' {
        return 0;
    }
    match method {
        WidthMethod::WcWidth => UnicodeWidthChar::width(c).unwrap_or(0),
        WidthMethod::Unicode => UnicodeWidthChar::width_cjk(c).unwrap_or(0),
    }
}

/// Columns taken by a whole string starting at column 0.
#[must_use]
pub fn text_columns(text: &str, tab_size: usize, method: WidthMethod) -> usize {
    text.chars()
        .fold(0, |col, c| col + char_columns(c, col, tab_size, method))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(text_columns("hello", 4, WidthMethod::WcWidth), 5);
    }

    #[test]
    fn test_tab_stops() {
        assert_eq!(char_columns('\t', 0, 4, WidthMethod::WcWidth), 4);
        assert_eq!(char_columns('\t', 3, 4, WidthMethod::WcWidth), 1);
        assert_eq!(text_columns("ab\tc", 4, WidthMethod::WcWidth), 5);
    }

    #[test]
    fn test_wide_and_zero_width() {
        assert_eq!(char_columns('漢', 0, 4, WidthMethod::WcWidth), 2);
        assert_eq!(char_columns('\u{0301}', 0, 4, WidthMethod::WcWidth), 0);
    }

    #[test]
    fn test_width_methods() {
        let ch = '\u{2460}';
        assert_eq!(char_columns(ch, 0, 4, WidthMethod::WcWidth), 1);
        assert_eq!(char_columns(ch, 0, 4, WidthMethod::Unicode), 2);
    }
}
