//! Directive parsing.
//!
//! This module handles the lines that configure the generated file rather
//! than produce code in place:
//! - `#Include <header.h>` / `#Include "header.h"`
//! - `Option Base n` and `Option Explicit`

use crate::ast::StatementKind;
use crate::lexer::TokenKind;

use super::{ParseError, Parser};

impl Parser {
    /// Parses `#Include <file>` or `#Include "file"`. The target is kept
    /// verbatim, delimiters included.
    pub(super) fn parse_include(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        if !self.match_word("include") {
            return Err(self.error_here("INCLUDE"));
        }
        let target = self.rest_text().to_string();
        if target.is_empty() {
            return Err(ParseError::end("include target"));
        }
        Ok(StatementKind::Include(target))
    }

    /// Parses `Option Base n` or `Option Explicit`; other options are kept
    /// as unsupported.
    pub(super) fn parse_option(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();

        if self.match_word("base") {
            let base = match self.peek() {
                Some(token) if token.kind == TokenKind::IntegerLiteral => token.text.parse::<u32>().ok(),
                _ => None,
            };
            let Some(base) = base.filter(|&b| b <= 1) else {
                return Err(self.error_here("0 or 1"));
            };
            self.advance();
            self.expect_end()?;
            return Ok(StatementKind::OptionBase(base));
        }
        if self.match_word("explicit") {
            self.expect_end()?;
            return Ok(StatementKind::OptionExplicit);
        }

        Ok(StatementKind::Unsupported(self.source.clone()))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::StatementKind;
    use crate::parser::parse;

    #[test]
    fn test_quoted_include() {
        assert_eq!(
            parse("#include \"config.h\"").statements[0].kind,
            StatementKind::Include("\"config.h\"".to_string())
        );
    }

    #[test]
    fn test_option_base_out_of_range() {
        assert!(matches!(
            parse("Option Base 2").statements[0].kind,
            StatementKind::Untranslated(_)
        ));
    }

    #[test]
    fn test_other_option_is_unsupported() {
        assert!(matches!(
            parse("Option Compare Text").statements[0].kind,
            StatementKind::Unsupported(_)
        ));
    }
}
