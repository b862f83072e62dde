//! Procedure header and END parsing.
//!
//! This module handles parsing of:
//! - SUB and FUNCTION headers (with parameter lists)
//! - END SUB / END FUNCTION and the other END forms
//!
//! Procedure bodies are not nested under their headers: the backend opens a
//! function at the header and closes it at the matching END.

use crate::ast::{Parameter, ProcedureHeader, ProcedureKind, StatementKind};
use crate::lexer::TokenKind;

use super::{BlockContext, ParseError, Parser};

impl Parser {
    // ==================== Headers ====================

    /// Parses a SUB or FUNCTION header.
    ///
    /// A header that cannot be parsed is not an error: it is kept verbatim
    /// as a [`StatementKind::MalformedHeader`].
    pub(super) fn parse_procedure_header(&mut self) -> StatementKind {
        match self.try_procedure_header() {
            Ok(header) => StatementKind::ProcedureStart(header),
            Err(err) => {
                log::debug!("line {}: malformed header ({})", self.line, err);
                StatementKind::MalformedHeader(self.source.clone())
            }
        }
    }

    fn try_procedure_header(&mut self) -> Result<ProcedureHeader, ParseError> {
        let kind = match self.peek_kind() {
            Some(TokenKind::Sub) => ProcedureKind::Sub,
            Some(TokenKind::Function) => ProcedureKind::Function,
            _ => return Err(self.error_here("SUB or FUNCTION")),
        };
        self.advance();

        let name = self.expect_name("procedure name")?;

        let mut params = Vec::new();
        if self.match_token(TokenKind::LeftParen) {
            if !self.check(TokenKind::RightParen) {
                loop {
                    params.push(self.parse_parameter()?);
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RightParen, ")")?;
        }

        let return_type = if self.match_token(TokenKind::As) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        self.expect_end()?;

        Ok(ProcedureHeader {
            kind,
            name,
            params,
            return_type,
        })
    }

    /// Parses `[Optional] [ByRef|ByVal] name[()] [As type] [= default]`.
    fn parse_parameter(&mut self) -> Result<Parameter, ParseError> {
        let optional = self.match_token(TokenKind::Optional);
        let by_ref = if self.match_token(TokenKind::ByRef) {
            true
        } else {
            self.match_token(TokenKind::ByVal);
            false
        };

        let mut param = Parameter::new(self.expect_name("parameter name")?);
        param.optional = optional;
        param.by_ref = by_ref;

        if self.match_token(TokenKind::LeftParen) {
            self.expect(TokenKind::RightParen, ")")?;
            param.array = true;
        }
        if self.match_token(TokenKind::As) {
            param.type_ref = Some(self.parse_type_ref()?);
        }
        if self.match_token(TokenKind::Equals) {
            param.default = Some(self.parse_expr_until("default value", |t| {
                matches!(t.kind, TokenKind::Comma | TokenKind::RightParen)
            })?);
        }

        Ok(param)
    }

    // ==================== END ====================

    /// Parses `End Sub|Function|If|Select|Type|Enum|With` or a bare `End`.
    pub(super) fn parse_end(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let Some(kind) = self.peek_kind() else {
            return Ok(StatementKind::Unsupported("End".to_string()));
        };

        let statement = match kind {
            TokenKind::Sub => StatementKind::EndProcedure(ProcedureKind::Sub),
            TokenKind::Function => StatementKind::EndProcedure(ProcedureKind::Function),
            TokenKind::If => StatementKind::EndIf,
            TokenKind::Select => StatementKind::EndSelect,
            TokenKind::With => StatementKind::EndWith,
            TokenKind::Type => {
                self.block = BlockContext::None;
                StatementKind::TypeEnd
            }
            TokenKind::Enum => {
                self.block = BlockContext::None;
                StatementKind::EnumEnd
            }
            _ => return Err(self.error_here("SUB, FUNCTION, IF, SELECT, TYPE, ENUM or WITH")),
        };
        self.advance();
        self.expect_end()?;
        Ok(statement)
    }
}
