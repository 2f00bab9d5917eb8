//! Token types produced by modes.

use std::ops::Range;

/// Semantic token categories; each maps to one style class on the rendered
/// span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    String,
    Number,
    Atom,
    Variable,
    Definition,
    Type,
    Comment,
    Operator,
    Punctuation,
    Meta,
    Tag,
    Attribute,
    Link,
    Error,
    Text,
}

impl TokenKind {
    /// Style class applied to spans of this kind, or `None` for plain text.
    #[must_use]
    pub fn class_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Keyword => "cm-keyword",
            Self::String => "cm-string",
            Self::Number => "cm-number",
            Self::Atom => "cm-atom",
            Self::Variable => "cm-variable",
            Self::Definition => "cm-def",
            Self::Type => "cm-type",
            Self::Comment => "cm-comment",
            Self::Operator => "cm-operator",
            Self::Punctuation => "cm-punctuation",
            Self::Meta => "cm-meta",
            Self::Tag => "cm-tag",
            Self::Attribute => "cm-attribute",
            Self::Link => "cm-link",
            Self::Error => "cm-error",
            Self::Text => return None,
        })
    }
}

/// A styled byte range within one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "token range must be start <= end");
        Self { kind, start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::{Token, TokenKind};

    #[test]
    fn token_construction_and_accessors() {
        let sample = Token::new(TokenKind::Keyword, 2, 8);
        assert_eq!(sample.len(), 6);
        assert!(!sample.is_empty());
        assert_eq!(sample.range(), 2..8);
    }

    #[test]
    fn text_has_no_class() {
        assert_eq!(TokenKind::Text.class_name(), None);
        assert_eq!(TokenKind::Comment.class_name(), Some("cm-comment"));
    }
}
