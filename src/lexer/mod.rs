//! Lexical analysis for vb2arduino.
//!
//! Source text is processed in two stages:
//!
//! 1. [`lines`] turns the raw program into logical lines: continuation lines
//!    are joined, comments are stripped and blank lines dropped, while every
//!    logical line keeps the 1-based number of its first physical line.
//! 2. [`Lexer`] converts one logical line into a stream of [`Token`]s.
//!
//! ## Example
//!
//! ```
//! use vb2arduino::lexer::Lexer;
//!
//! let source = r#"SerialPrintLine "Hello, World!""#;
//! let mut lexer = Lexer::new(source);
//!
//! while let Some(token) = lexer.next_token() {
//!     println!("{}: {:?}", token.text, token.kind);
//! }
//! ```
//!
//! ## Design Notes
//!
//! The lexer is built on the [`logos`](https://docs.rs/logos) crate, which
//! generates a DFA-based lexer from the token definitions in `token.rs`.
//!
//! We wrap logos in our own [`Lexer`] struct to provide:
//!
//! - A cleaner iterator interface
//! - Token position tracking
//! - Lossless output: characters logos cannot match (an unterminated string,
//!   for instance) still come out as [`TokenKind::Unknown`] tokens so the
//!   parser can pass the line through verbatim.

pub mod lines;
mod token;

pub use lines::{LogicalLine, logical_lines};
pub use token::{Token, TokenKind};

use logos::Logos;

/// The lexer for one logical BASIC line.
///
/// Wraps a `logos` lexer and provides a convenient iterator interface
/// that yields [`Token`]s with their byte positions.
///
/// ## Example
///
/// ```
/// use vb2arduino::lexer::{Lexer, TokenKind};
///
/// let lexer = Lexer::new("Delay 1000");
/// let tokens: Vec<_> = lexer.collect();
///
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].kind, TokenKind::Identifier);
/// assert_eq!(tokens[1].kind, TokenKind::IntegerLiteral);
/// assert_eq!(tokens[1].text, "1000");
/// ```
pub struct Lexer<'source> {
    /// The underlying logos lexer
    inner: logos::Lexer<'source, TokenKind>,
    /// The original source (for slicing between tokens)
    source: &'source str,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given line.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
        }
    }

    /// Get the original source text.
    pub fn source(&self) -> &'source str {
        self.source
    }

    /// Get the next token, if any.
    ///
    /// Returns `None` when the end of input is reached. Input logos rejects
    /// is returned as a [`TokenKind::Unknown`] token.
    ///
    /// # Example
    ///
    /// ```
    /// use vb2arduino::lexer::{Lexer, TokenKind};
    ///
    /// let mut lexer = Lexer::new("Wend");
    ///
    /// let token = lexer.next_token().unwrap();
    /// assert_eq!(token.kind, TokenKind::Wend);
    ///
    /// assert!(lexer.next_token().is_none());
    /// ```
    pub fn next_token(&mut self) -> Option<Token> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let text = self.inner.slice().to_string();

        let kind = match result {
            Ok(kind) => kind,
            Err(()) => TokenKind::Unknown,
        };
        Some(Token::new(kind, span, text))
    }

    /// Collect all remaining tokens into a vector.
    ///
    /// This consumes the lexer.
    pub fn collect_tokens(self) -> Vec<Token> {
        self.collect()
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Convenience function to lex a line directly.
///
/// # Example
///
/// ```
/// use vb2arduino::lexer::{lex, TokenKind};
///
/// let tokens = lex("Dim x As Integer");
/// assert_eq!(tokens[0].kind, TokenKind::Dim);
/// ```
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_iterator() {
        let tokens: Vec<_> = Lexer::new("Delay 42").collect();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_token_spans() {
        let tokens = lex("Delay 42");

        assert_eq!(tokens[0].span, 0..5);
        assert_eq!(tokens[0].text, "Delay");

        assert_eq!(tokens[1].span, 6..8);
        assert_eq!(tokens[1].text, "42");
    }

    #[test]
    fn test_declaration_tokens() {
        let kinds: Vec<_> = lex("dim Name$ as String").into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Dim,
                TokenKind::Identifier,
                TokenKind::As,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn test_string_literal_content() {
        let tokens = lex(r#"SerialPrintLine "Hello, World!""#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].text, r#""Hello, World!""#);
    }

    #[test]
    fn test_unterminated_string_is_kept() {
        let tokens = lex(r#"x = "abc"#);
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, r#"x="abc"#);
    }

    #[test]
    fn test_condition_operators() {
        let tokens = lex("If flags <> &HFF And level >= 3.5 Then");
        let kinds: Vec<_> = tokens.iter().map(|t| &t.kind).collect();

        assert_eq!(
            kinds,
            vec![
                &TokenKind::If,
                &TokenKind::Identifier,
                &TokenKind::NotEquals,
                &TokenKind::HexLiteral,
                &TokenKind::And,
                &TokenKind::Identifier,
                &TokenKind::GreaterEquals,
                &TokenKind::FloatLiteral,
                &TokenKind::Then,
            ]
        );
        assert_eq!(tokens[3].text, "&HFF");
    }
}
