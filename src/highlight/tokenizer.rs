//! Tokenizer trait and the state carried between lines.

use super::token::{Token, TokenKind};

/// Lexical state carried across lines for incremental tokenization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LineState {
    #[default]
    Normal,
    InString(StringKind),
    InComment(CommentKind),
    /// Mode-specific state that does not fit the shared variants.
    Custom(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringKind {
    Double,
    Single,
    Backtick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Block,
    Nested(u8),
}

/// Styling capability consumed by the display: tokens for one line given
/// the state at its start.
pub trait Tokenizer: Send + Sync {
    /// Human-readable name of this tokenizer.
    fn name(&self) -> &'static str;

    /// Tokenize a single line given the state from the previous line.
    /// Returns: (tokens, state_at_end_of_line).
    fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState);

    /// Whether line state ever changes; stateless modes skip the
    /// background worker entirely.
    fn is_stateful(&self) -> bool {
        true
    }
}

/// Mode that styles nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTokenizer;

impl Tokenizer for PlainTokenizer {
    fn name(&self) -> &'static str {
        "Plain"
    }

    fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState) {
        if line.is_empty() {
            return (Vec::new(), state);
        }
        (vec![Token::new(TokenKind::Text, 0, line.len())], state)
    }

    fn is_stateful(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_state_default_is_normal() {
        assert_eq!(LineState::default(), LineState::Normal);
    }

    #[test]
    fn plain_tokenizer_is_one_span() {
        let (tokens, state) = PlainTokenizer.tokenize_line("abc", LineState::Normal);
        assert_eq!(tokens, vec![Token::new(TokenKind::Text, 0, 3)]);
        assert_eq!(state, LineState::Normal);
        assert!(!PlainTokenizer.is_stateful());
    }
}
