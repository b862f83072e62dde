//! Expression slicing.
//!
//! Expressions are not parsed into trees: the backend rewrites them token by
//! token. What the recognizers need is to find where an expression ends:
//! before `Then`, `To` or `Step`, at a top-level comma, or at the end of the
//! line. All searches here honour nesting of `()`, `[]` and `{}`, so commas
//! and keywords inside calls or array literals never split an expression.

use crate::ast::Expr;
use crate::lexer::{Token, TokenKind};

use super::{ParseError, Parser};

/// Nesting change caused by a token.
fn depth_delta(kind: TokenKind) -> i32 {
    match kind {
        TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => 1,
        TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => -1,
        _ => 0,
    }
}

impl Parser {
    /// Returns the index of the delimiter closing the one at `open`.
    pub(super) fn matching_close(&self, open: usize) -> Result<usize, ParseError> {
        let mut depth = 0;
        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            depth += depth_delta(token.kind);
            if depth == 0 {
                return Ok(index);
            }
        }
        Err(ParseError::Unbalanced {
            column: self.offset_of(open),
        })
    }

    /// Finds the first token at or after `from`, outside any nesting, that
    /// satisfies `pred`.
    pub(super) fn find_top_level(&self, from: usize, pred: impl Fn(&Token) -> bool) -> Option<usize> {
        let mut depth = 0;
        for (index, token) in self.tokens.iter().enumerate().skip(from) {
            if depth == 0 && pred(token) {
                return Some(index);
            }
            depth = (depth + depth_delta(token.kind)).max(0);
        }
        None
    }

    /// Consumes an expression up to the first top-level token matching
    /// `stop` (not consumed) or the end of the line.
    pub(super) fn parse_expr_until(
        &mut self,
        expected_desc: &str,
        stop: impl Fn(&Token) -> bool,
    ) -> Result<Expr, ParseError> {
        let start = self.current;
        let end = self
            .find_top_level(start, stop)
            .unwrap_or(self.tokens.len());
        if end == start {
            return Err(self.error_here(expected_desc));
        }
        self.check_balanced(start, end)?;
        self.current = end;
        Ok(Expr::new(self.text_between(start, end)))
    }

    /// Consumes the rest of the line as one expression.
    pub(super) fn parse_rest_expr(&mut self, expected_desc: &str) -> Result<Expr, ParseError> {
        self.parse_expr_until(expected_desc, |_| false)
    }

    /// Splits tokens `start..end` at top-level commas.
    ///
    /// An empty range yields no arguments; an empty piece between two commas
    /// is an error.
    pub(super) fn split_arguments(&self, start: usize, end: usize) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if start >= end {
            return Ok(args);
        }
        self.check_balanced(start, end)?;

        let mut piece_start = start;
        loop {
            let comma = self
                .find_top_level(piece_start, |t| t.kind == TokenKind::Comma)
                .filter(|&i| i < end);
            let piece_end = comma.unwrap_or(end);
            if piece_end == piece_start {
                return Err(ParseError::invalid("empty argument", self.offset_of(piece_start)));
            }
            args.push(Expr::new(self.text_between(piece_start, piece_end)));
            match comma {
                Some(index) => piece_start = index + 1,
                None => break,
            }
        }
        Ok(args)
    }

    /// Parses the arguments of a call-shaped statement from the current
    /// position to the end of the line.
    ///
    /// Both `Foo a, b` and `Foo(a, b)` are accepted. Parentheses only count
    /// as the argument list when they close at the end of the line, so
    /// `Foo (a + 1) * 2, b` keeps `(a + 1) * 2` as its first argument.
    pub(super) fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let start = self.current;
        let end = self.tokens.len();
        self.current = end;

        if start < end && self.tokens[start].kind == TokenKind::LeftParen {
            let close = self.matching_close(start)?;
            if close == end - 1 {
                return self.split_arguments(start + 1, close);
            }
        }
        self.split_arguments(start, end)
    }

    /// Verifies that tokens `start..end` nest properly.
    fn check_balanced(&self, start: usize, end: usize) -> Result<(), ParseError> {
        let mut stack: Vec<usize> = Vec::new();
        for index in start..end.min(self.tokens.len()) {
            match depth_delta(self.tokens[index].kind) {
                1 => stack.push(index),
                -1 => {
                    if stack.pop().is_none() {
                        return Err(ParseError::Unbalanced {
                            column: self.offset_of(index),
                        });
                    }
                }
                _ => {}
            }
        }
        match stack.first() {
            Some(&open) => Err(ParseError::Unbalanced {
                column: self.offset_of(open),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser_for(line: &str) -> Parser {
        let mut parser = Parser::new("");
        parser.load_line(line);
        parser
    }

    #[test]
    fn test_expr_until_keyword() {
        let mut parser = parser_for("a + f(b, c) Then x");
        let expr = parser
            .parse_expr_until("condition", |t| t.kind == TokenKind::Then)
            .unwrap();
        assert_eq!(expr.as_str(), "a + f(b, c)");
        assert!(parser.check(TokenKind::Then));
    }

    #[test]
    fn test_split_respects_nesting() {
        let parser = parser_for("a, f(b, c), {1, 2}");
        let args = parser.split_arguments(0, parser.tokens.len()).unwrap();
        let texts: Vec<_> = args.iter().map(|a| a.as_str()).collect();
        assert_eq!(texts, vec!["a", "f(b, c)", "{1, 2}"]);
    }

    #[test]
    fn test_argument_list_with_parentheses() {
        let mut parser = parser_for("(LED, OUTPUT)");
        let args = parser.parse_argument_list().unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].as_str(), "OUTPUT");
    }

    #[test]
    fn test_argument_list_leading_group() {
        let mut parser = parser_for("(a + 1) * 2, b");
        let args = parser.parse_argument_list().unwrap();
        assert_eq!(args[0].as_str(), "(a + 1) * 2");
        assert_eq!(args[1].as_str(), "b");
    }

    #[test]
    fn test_empty_argument_is_error() {
        let parser = parser_for("a, , b");
        assert!(parser.split_arguments(0, parser.tokens.len()).is_err());
    }

    #[test]
    fn test_unbalanced_is_error() {
        let mut parser = parser_for("f(a");
        assert!(parser.parse_rest_expr("expression").is_err());
    }
}
