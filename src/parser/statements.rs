//! Statement dispatcher and simple statements.
//!
//! [`Parser::parse_statement`] picks a recognizer from the first token of the
//! line. Keyword-led lines have exactly one candidate; identifier-led lines
//! are tried in order: labels, fixed builtin statements, library forms,
//! assignment, and finally a procedure or method call.

use crate::ast::{
    Expr, GraphicsCommand, LibraryFunction, SpriteCommand, StatementKind, TimeBuiltin,
};
use crate::lexer::TokenKind;

use super::{BlockContext, ParseError, Parser};

/// Tokens that can begin an argument of a parenthesis-free call.
fn can_start_argument(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::IntegerLiteral
            | TokenKind::FloatLiteral
            | TokenKind::HexLiteral
            | TokenKind::OctalLiteral
            | TokenKind::BinaryLiteral
            | TokenKind::StringLiteral
            | TokenKind::LeftParen
            | TokenKind::LeftBrace
            | TokenKind::Minus
            | TokenKind::Not
            | TokenKind::New
    )
}

impl Parser {
    /// Parses the current line into a statement.
    pub(super) fn parse_statement(&mut self) -> Result<StatementKind, ParseError> {
        match self.block {
            BlockContext::Type => {
                if let Some(kind) = self.parse_type_body()? {
                    return Ok(kind);
                }
            }
            BlockContext::Enum => {
                if let Some(kind) = self.parse_enum_body()? {
                    return Ok(kind);
                }
            }
            BlockContext::None => {}
        }

        let Some(kind) = self.peek_kind() else {
            return Err(ParseError::end("statement"));
        };

        match kind {
            TokenKind::Hash => self.parse_include(),
            TokenKind::Public | TokenKind::Private => self.parse_visibility(),
            TokenKind::Sub | TokenKind::Function => Ok(self.parse_procedure_header()),
            TokenKind::End => self.parse_end(),
            TokenKind::Const => self.parse_const(),
            TokenKind::Dim => {
                self.advance();
                self.parse_variables(StatementKind::Dim)
            }
            TokenKind::Static => {
                self.advance();
                self.parse_variables(StatementKind::Static)
            }
            TokenKind::Type => self.parse_type_start(),
            TokenKind::Enum => self.parse_enum_start(),
            TokenKind::Exit => self.parse_exit(),
            TokenKind::Continue => self.parse_continue(),
            TokenKind::Goto => self.parse_goto(),
            TokenKind::Return => self.parse_return(),
            TokenKind::With => self.parse_with(),
            TokenKind::Do => self.parse_do(),
            TokenKind::Loop => self.parse_loop(),
            TokenKind::For => self.parse_for(),
            TokenKind::Next => {
                // The loop variable after NEXT is optional and not checked.
                Ok(StatementKind::Next)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::ElseIf => self.parse_elseif(),
            TokenKind::Else => self.parse_else(),
            TokenKind::While => self.parse_while(),
            TokenKind::Wend => {
                self.advance();
                self.expect_end()?;
                Ok(StatementKind::Wend)
            }
            TokenKind::Select => self.parse_select(),
            TokenKind::Case => self.parse_case(),
            TokenKind::Call => {
                self.advance();
                self.parse_call()
            }
            TokenKind::Set | TokenKind::Let => {
                self.advance();
                match self.parse_assignment()? {
                    Some(kind) => Ok(kind),
                    None => Err(self.error_here("assignment")),
                }
            }
            TokenKind::Identifier => self.parse_identifier_statement(),
            _ => Err(self.error_here("statement")),
        }
    }

    /// `Public`/`Private` followed by a procedure, constant, type or variables.
    fn parse_visibility(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        match self.peek_kind() {
            Some(TokenKind::Sub | TokenKind::Function) => Ok(self.parse_procedure_header()),
            Some(TokenKind::Const) => self.parse_const(),
            Some(TokenKind::Type) => self.parse_type_start(),
            Some(TokenKind::Enum) => self.parse_enum_start(),
            Some(TokenKind::Dim) => {
                self.advance();
                self.parse_variables(StatementKind::Dim)
            }
            _ => self.parse_variables(StatementKind::Dim),
        }
    }

    /// Lines starting with an identifier.
    fn parse_identifier_statement(&mut self) -> Result<StatementKind, ParseError> {
        let Some(first) = self.peek() else {
            return Err(ParseError::end("statement"));
        };
        let word = first.text.to_ascii_lowercase();
        let single = self.tokens.len() == 1;

        if self.tokens.len() == 2 && self.peek_ahead(1).is_some_and(|t| t.kind == TokenKind::Colon) {
            return Ok(StatementKind::Label(first.text.clone()));
        }

        let next_is_word = self.peek_ahead(1).is_some_and(|t| t.is_word());
        match word.as_str() {
            "option" => return self.parse_option(),
            "global" if next_is_word => {
                self.advance();
                return self.parse_variables(StatementKind::Dim);
            }
            "every" => return self.parse_every(),
            "endif" if single => return Ok(StatementKind::EndIf),
            "inputbox" if !self.assigns_to_first() => return Ok(StatementKind::InputBox),
            "msgbox" if !self.assigns_to_first() => return self.parse_msgbox(),
            "on" if self.peek_ahead(1).is_some_and(|t| t.is_named("error")) => {
                return Ok(StatementKind::Unsupported(self.source.clone()));
            }
            "resume" | "property" | "declare" | "redim" | "erase" => {
                return Ok(StatementKind::Unsupported(self.source.clone()));
            }
            "randomize" => return self.parse_randomize(),
            "doevents" => {
                self.advance();
                if self.match_token(TokenKind::LeftParen) {
                    self.expect(TokenKind::RightParen, ")")?;
                }
                self.expect_end()?;
                return Ok(StatementKind::DoEvents);
            }
            "timer" if single => return Ok(StatementKind::ElapsedTime(TimeBuiltin::Timer)),
            "now" if single => return Ok(StatementKind::ElapsedTime(TimeBuiltin::Now)),
            "date" if single => return Ok(StatementKind::ElapsedTime(TimeBuiltin::Date)),
            "time" if single => return Ok(StatementKind::ElapsedTime(TimeBuiltin::Time)),
            _ => {}
        }

        if !self.assigns_to_first() && !self.is_member_access() {
            if let Some(function) = LibraryFunction::from_name(&word) {
                return self.parse_library(function);
            }
            if let Some(command) = GraphicsCommand::from_name(&word) {
                return self.parse_graphics(command);
            }
            if let Some(command) = SpriteCommand::from_name(&word) {
                return self.parse_sprite(command);
            }
        }

        if let Some(kind) = self.parse_assignment()? {
            return Ok(kind);
        }
        self.parse_call()
    }

    /// True if the line is `name = ...`.
    fn assigns_to_first(&self) -> bool {
        self.peek_ahead(1).is_some_and(|t| t.kind == TokenKind::Equals)
    }

    /// True if the first word is followed by member access (`x.y`).
    fn is_member_access(&self) -> bool {
        self.peek_ahead(1).is_some_and(|t| {
            matches!(
                t.kind,
                TokenKind::Dot | TokenKind::Arrow | TokenKind::DoubleColon
            )
        })
    }

    /// Tries `target = value` where the target is a variable, member or
    /// indexed element. Returns `None` (without consuming) for other shapes.
    pub(super) fn parse_assignment(&mut self) -> Result<Option<StatementKind>, ParseError> {
        let start = self.current;
        let Some(equals) = self.find_top_level(start, |t| t.kind == TokenKind::Equals) else {
            return Ok(None);
        };
        if !self.is_assignable(start, equals) {
            return Ok(None);
        }

        let target = self.text_between(start, equals).to_string();
        self.current = equals + 1;
        let value = self.parse_rest_expr("value")?;
        Ok(Some(StatementKind::Assign { target, value }))
    }

    /// True if tokens `start..end` form `name(.member | (index) | [index])*`.
    fn is_assignable(&self, start: usize, end: usize) -> bool {
        if !self.tokens.get(start).is_some_and(|t| t.is_word()) {
            return false;
        }
        let mut index = start + 1;
        while index < end {
            match self.tokens[index].kind {
                TokenKind::Dot | TokenKind::Arrow | TokenKind::DoubleColon => {
                    if index + 1 >= end || !self.tokens[index + 1].is_word() {
                        return false;
                    }
                    index += 2;
                }
                TokenKind::LeftParen | TokenKind::LeftBracket => match self.matching_close(index) {
                    Ok(close) if close < end => index = close + 1,
                    _ => return false,
                },
                _ => return false,
            }
        }
        true
    }

    /// `Name`, `Name args`, `Name(args)` or `obj.method(args)`.
    pub(super) fn parse_call(&mut self) -> Result<StatementKind, ParseError> {
        let start = self.current;
        self.expect_name("procedure name")?;
        while matches!(
            self.peek_kind(),
            Some(TokenKind::Dot | TokenKind::Arrow | TokenKind::DoubleColon)
        ) && self.peek_ahead(1).is_some_and(|t| t.is_word())
        {
            self.advance();
            self.advance();
        }
        let name = self.text_between(start, self.current).to_string();

        if let Some(token) = self.peek()
            && !can_start_argument(token.kind)
        {
            return Err(ParseError::unexpected(
                "call arguments",
                token.text.clone(),
                token.span.start,
            ));
        }

        let args = self.parse_argument_list()?;
        Ok(StatementKind::Call { name, args })
    }

    /// A fixed library form with an exact argument count.
    fn parse_library(&mut self, function: LibraryFunction) -> Result<StatementKind, ParseError> {
        let column = self.offset_of(self.current);
        self.advance();
        let args = self.parse_argument_list()?;
        if args.len() != function.arity() {
            return Err(ParseError::invalid(
                format!("{:?} takes {} argument(s)", function, function.arity()),
                column,
            ));
        }
        Ok(StatementKind::Library { function, args })
    }

    fn parse_graphics(&mut self, command: GraphicsCommand) -> Result<StatementKind, ParseError> {
        let column = self.offset_of(self.current);
        self.advance();
        let args = self.parse_argument_list()?;
        let (min, max) = command.arity();
        if args.len() < min || args.len() > max {
            return Err(ParseError::invalid(
                format!("{:?} takes {} to {} arguments", command, min, max),
                column,
            ));
        }
        Ok(StatementKind::Graphics { command, args })
    }

    fn parse_sprite(&mut self, command: SpriteCommand) -> Result<StatementKind, ParseError> {
        let column = self.offset_of(self.current);
        self.advance();
        let mut args = self.parse_argument_list()?;
        if args.is_empty() {
            return Err(ParseError::end("sprite name"));
        }
        let sprite = args.remove(0);
        let is_name = sprite
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_name {
            return Err(ParseError::invalid("sprite name expected", column));
        }

        let (min, max) = command.arity();
        if args.len() < min || args.len() > max {
            return Err(ParseError::invalid(
                format!("{:?} takes {} to {} arguments", command, min, max),
                column,
            ));
        }
        Ok(StatementKind::Sprite {
            command,
            sprite: sprite.as_str().to_string(),
            args,
        })
    }

    /// `MsgBox x` or `MsgBox(x, buttons)`; only the message is kept.
    fn parse_msgbox(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let mut args = self.parse_argument_list()?;
        if args.is_empty() {
            return Err(ParseError::end("message"));
        }
        Ok(StatementKind::MsgBox(args.remove(0)))
    }

    fn parse_randomize(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        if self.is_at_end() {
            return Ok(StatementKind::Randomize(None));
        }
        let seed = self.parse_rest_expr("seed")?;
        Ok(StatementKind::Randomize(Some(seed)))
    }

    /// `With object`: kept only as a comment by the backend.
    fn parse_with(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let object: Expr = self.parse_rest_expr("object")?;
        Ok(StatementKind::With(object))
    }
}
