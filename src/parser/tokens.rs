//! Token navigation utilities for the parser.
//!
//! This module provides the low-level token stream operations the line
//! recognizers are built from:
//! - Peeking at tokens without consuming them
//! - Advancing through the token stream
//! - Matching and expecting specific tokens or words
//! - Slicing verbatim source text between token positions

use crate::lexer::{Token, TokenKind};

use super::{ParseError, Parser};

impl Parser {
    // ==================== Token Navigation ====================

    /// Returns the current token without consuming it.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    /// Returns the kind of the current token.
    pub(super) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    /// Looks ahead n tokens (0 = current token).
    pub(super) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    /// Consumes and returns the current token.
    pub(super) fn advance(&mut self) -> Option<&Token> {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens.get(self.current - 1)
    }

    /// Returns true if every token of the line has been consumed.
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    /// Checks if the current token matches the expected kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Checks if the current token is the given word (case-insensitive).
    pub(super) fn check_word(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_named(word))
    }

    /// Consumes the current token if it matches, returns true if consumed.
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it is the given word.
    pub(super) fn match_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match, or returns an error.
    pub(super) fn expect(&mut self, kind: TokenKind, expected_desc: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(expected_desc))
        }
    }

    /// Expects a name (identifier or keyword) and returns its text.
    pub(super) fn expect_name(&mut self, expected_desc: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(token) if token.is_word() => {
                let name = token.text.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_here(expected_desc)),
        }
    }

    /// Expects the end of the line.
    pub(super) fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::unexpected(
                "end of line",
                token.text.clone(),
                token.span.start,
            )),
        }
    }

    /// Builds an error describing the current token.
    pub(super) fn error_here(&self, expected_desc: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::unexpected(expected_desc, token.text.clone(), token.span.start),
            None => ParseError::end(expected_desc),
        }
    }

    // ==================== Source Slicing ====================

    /// Byte offset where the token at `index` starts (line length past the end).
    pub(super) fn offset_of(&self, index: usize) -> usize {
        self.tokens
            .get(index)
            .map(|t| t.span.start)
            .unwrap_or(self.source.len())
    }

    /// Verbatim text covering tokens `start..end`.
    pub(super) fn text_between(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.tokens.len());
        if start >= end {
            return "";
        }
        let from = self.tokens[start].span.start;
        let to = self.tokens[end - 1].span.end;
        &self.source[from..to]
    }

    /// Verbatim text from the current token to the end of the line.
    pub(super) fn rest_text(&self) -> &str {
        self.source[self.offset_of(self.current)..].trim()
    }
}
