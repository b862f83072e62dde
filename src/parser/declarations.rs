//! Declaration parsing.
//!
//! This module handles:
//! - `Dim`, `Static`, `Public`, `Private` and `Global` variable lists
//! - `Const` scalars and array literals
//! - `Type ... End Type` record blocks
//! - `Enum ... End Enum` blocks

use crate::ast::{ArrayLiteral, Declaration, Expr, StatementKind, TypeRef};
use crate::lexer::TokenKind;

use super::{BlockContext, ParseError, Parser};

impl Parser {
    // ==================== Variables ====================

    /// Parses the variable list of a declaration line, wrapping it with
    /// `wrap` (`Dim` or `Static`). `name() As T = {...}` becomes an array
    /// literal instead.
    pub(super) fn parse_variables(
        &mut self,
        wrap: fn(Vec<Declaration>) -> StatementKind,
    ) -> Result<StatementKind, ParseError> {
        if let Some(literal) = self.try_array_literal(false)? {
            return Ok(StatementKind::ArrayLiteral(literal));
        }
        self.parse_declarations().map(wrap)
    }

    /// Parses `decl {, decl}` to the end of the line.
    fn parse_declarations(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = vec![self.parse_declaration()?];
        while self.match_token(TokenKind::Comma) {
            declarations.push(self.parse_declaration()?);
        }
        self.expect_end()?;
        Ok(declarations)
    }

    /// Parses `name[(dims)] [As [New] type] [= value]`.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let mut declaration = Declaration::new(self.expect_name("variable name")?);

        if self.check(TokenKind::LeftParen) {
            let open = self.current;
            let close = self.matching_close(open)?;
            if close == open + 1 {
                return Err(ParseError::invalid(
                    "array bounds required",
                    self.offset_of(open),
                ));
            }
            let dimensions = self.split_arguments(open + 1, close)?;
            self.current = close + 1;
            declaration = declaration.with_dimensions(dimensions);
        }

        if self.match_token(TokenKind::As) {
            declaration.new_object = self.match_token(TokenKind::New);
            declaration = declaration.with_type(self.parse_type_ref()?);
        }

        if self.match_token(TokenKind::Equals) {
            let value = self.parse_expr_until("initial value", |t| t.kind == TokenKind::Comma)?;
            declaration = declaration.with_initializer(value);
        }

        Ok(declaration)
    }

    /// Parses `Name[::Name]*[*]`.
    pub(super) fn parse_type_ref(&mut self) -> Result<TypeRef, ParseError> {
        let mut name = self.expect_name("type name")?;
        while self.match_token(TokenKind::DoubleColon) {
            name.push_str("::");
            name.push_str(&self.expect_name("type name")?);
        }
        if self.match_token(TokenKind::Star) {
            Ok(TypeRef::pointer(name))
        } else {
            Ok(TypeRef::new(name))
        }
    }

    /// Tries `name() As T = {a, b, ...}` at the cursor. Leaves the cursor
    /// untouched when the line has another shape.
    fn try_array_literal(&mut self, constant: bool) -> Result<Option<ArrayLiteral>, ParseError> {
        let start = self.current;
        let shaped = self.peek().is_some_and(|t| t.is_word())
            && self.peek_ahead(1).is_some_and(|t| t.kind == TokenKind::LeftParen)
            && self.peek_ahead(2).is_some_and(|t| t.kind == TokenKind::RightParen)
            && self.peek_ahead(3).is_some_and(|t| t.kind == TokenKind::As)
            && self
                .find_top_level(start, |t| t.kind == TokenKind::LeftBrace)
                .is_some();
        if !shaped {
            return Ok(None);
        }

        let name = self.expect_name("array name")?;
        self.current += 3;
        let type_ref = self.parse_type_ref()?;
        self.expect(TokenKind::Equals, "=")?;
        if !self.check(TokenKind::LeftBrace) {
            return Err(self.error_here("{"));
        }
        let open = self.current;
        let close = self.matching_close(open)?;
        let elements = self.split_arguments(open + 1, close)?;
        self.current = close + 1;
        self.expect_end()?;

        Ok(Some(ArrayLiteral {
            name,
            type_ref,
            elements,
            constant,
        }))
    }

    // ==================== Constants ====================

    /// `Const name [As T] = value` or `Const name() As T = {...}`.
    pub(super) fn parse_const(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        if let Some(literal) = self.try_array_literal(true)? {
            return Ok(StatementKind::ArrayLiteral(literal));
        }

        let name = self.expect_name("constant name")?;
        if self.match_token(TokenKind::As) {
            self.parse_type_ref()?;
        }
        self.expect(TokenKind::Equals, "=")?;
        let value = self.parse_rest_expr("constant value")?;
        Ok(StatementKind::Const { name, value })
    }

    // ==================== TYPE Blocks ====================

    /// `Type Name`
    pub(super) fn parse_type_start(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let name = self.expect_name("type name")?;
        self.expect_end()?;
        self.block = BlockContext::Type;
        Ok(StatementKind::TypeStart(name))
    }

    /// A line inside a `Type` block. Returns `None` when the line leaves the
    /// block without `End Type`, so it can be parsed as a normal statement.
    pub(super) fn parse_type_body(&mut self) -> Result<Option<StatementKind>, ParseError> {
        if self.check(TokenKind::End) {
            if self.peek_ahead(1).is_some_and(|t| t.kind == TokenKind::Type) {
                self.current += 2;
                self.expect_end()?;
                self.block = BlockContext::None;
                return Ok(Some(StatementKind::TypeEnd));
            }
            return Ok(self.leave_block("Type"));
        }
        if matches!(self.peek_kind(), Some(TokenKind::Sub | TokenKind::Function)) {
            return Ok(self.leave_block("Type"));
        }

        if matches!(
            self.peek_kind(),
            Some(TokenKind::Dim | TokenKind::Public | TokenKind::Private)
        ) {
            self.advance();
        }
        let field = self.parse_declaration()?;
        self.expect_end()?;
        Ok(Some(StatementKind::TypeField(field)))
    }

    // ==================== ENUM Blocks ====================

    /// `Enum Name`
    pub(super) fn parse_enum_start(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let name = self.expect_name("enum name")?;
        self.expect_end()?;
        self.block = BlockContext::Enum;
        Ok(StatementKind::EnumStart(name))
    }

    /// A line inside an `Enum` block: `Member [= value]` or `End Enum`.
    pub(super) fn parse_enum_body(&mut self) -> Result<Option<StatementKind>, ParseError> {
        if self.check(TokenKind::End) {
            if self.peek_ahead(1).is_some_and(|t| t.kind == TokenKind::Enum) {
                self.current += 2;
                self.expect_end()?;
                self.block = BlockContext::None;
                return Ok(Some(StatementKind::EnumEnd));
            }
            return Ok(self.leave_block("Enum"));
        }
        if matches!(self.peek_kind(), Some(TokenKind::Sub | TokenKind::Function)) {
            return Ok(self.leave_block("Enum"));
        }

        let name = self.expect_name("enum member")?;
        let value: Option<Expr> = if self.match_token(TokenKind::Equals) {
            Some(self.parse_rest_expr("enum value")?)
        } else {
            self.expect_end()?;
            None
        };
        Ok(Some(StatementKind::EnumMember { name, value }))
    }

    /// Drops an unterminated block so the line is parsed normally.
    fn leave_block(&mut self, block: &str) -> Option<StatementKind> {
        log::warn!("line {}: {} block has no End {}", self.line, block, block);
        self.block = BlockContext::None;
        None
    }
}
