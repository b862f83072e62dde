//! Control flow statement parsing.
//!
//! Handles IF/ELSEIF/ELSE, FOR and FOR EACH, WHILE, DO/LOOP, SELECT CASE,
//! the EVERY timer block, and the jump statements (EXIT, CONTINUE, GOTO,
//! RETURN).
//!
//! Block openers and closers are separate statements; only single-line
//! `If ... Then stmt [Else stmt]` and `Every ... End Do` carry their bodies.

use crate::ast::{CaseValue, LoopCondition, StatementKind};
use crate::lexer::{TokenKind, lex};

use super::{ParseError, Parser};

impl Parser {
    /// `If cond Then` (block) or `If cond Then stmt [Else stmt]` (single line).
    pub(super) fn parse_if(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let condition = self.parse_expr_until("condition", |t| t.kind == TokenKind::Then)?;

        if !self.match_token(TokenKind::Then) || self.is_at_end() {
            self.expect_end()?;
            return Ok(StatementKind::If(condition));
        }

        let then_start = self.current;
        let else_at = self.find_top_level(then_start, |t| t.kind == TokenKind::Else);
        let then_text = self
            .text_between(then_start, else_at.unwrap_or(self.tokens.len()))
            .to_string();
        let else_text = else_at.map(|at| self.text_between(at + 1, self.tokens.len()).to_string());

        if then_text.is_empty() {
            return Err(self.error_here("statement after THEN"));
        }
        let then_branch = Box::new(self.parse_fragment(&then_text));
        let else_branch = match else_text {
            Some(text) if text.is_empty() => return Err(ParseError::end("statement after ELSE")),
            Some(text) => Some(Box::new(self.parse_fragment(&text))),
            None => None,
        };

        Ok(StatementKind::InlineIf {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `ElseIf cond Then`
    pub(super) fn parse_elseif(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        self.parse_elseif_tail()
    }

    /// `Else` or `Else If cond Then`
    pub(super) fn parse_else(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        if self.match_token(TokenKind::If) {
            return self.parse_elseif_tail();
        }
        self.expect_end()?;
        Ok(StatementKind::Else)
    }

    fn parse_elseif_tail(&mut self) -> Result<StatementKind, ParseError> {
        let condition = self.parse_expr_until("condition", |t| t.kind == TokenKind::Then)?;
        self.match_token(TokenKind::Then);
        self.expect_end()?;
        Ok(StatementKind::ElseIf(condition))
    }

    /// `For var = start To end [Step step]` or `For Each var In collection`
    pub(super) fn parse_for(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();

        if self.match_token(TokenKind::Each) {
            let variable = self.expect_name("loop variable")?;
            self.expect(TokenKind::In, "IN")?;
            let collection = self.parse_rest_expr("collection")?;
            return Ok(StatementKind::ForEach {
                variable,
                collection,
            });
        }

        let variable = self.expect_name("loop variable")?;
        self.expect(TokenKind::Equals, "=")?;
        let start = self.parse_expr_until("start value", |t| t.kind == TokenKind::To)?;
        self.expect(TokenKind::To, "TO")?;
        let end = self.parse_expr_until("end value", |t| t.kind == TokenKind::Step)?;
        let step = if self.match_token(TokenKind::Step) {
            Some(self.parse_rest_expr("step value")?)
        } else {
            None
        };

        Ok(StatementKind::For {
            variable,
            start,
            end,
            step,
        })
    }

    /// `While cond`
    pub(super) fn parse_while(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let condition = self.parse_rest_expr("condition")?;
        Ok(StatementKind::While(condition))
    }

    /// `Do [While|Until cond]`
    pub(super) fn parse_do(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        self.parse_loop_condition().map(StatementKind::Do)
    }

    /// `Loop [While|Until cond]`
    pub(super) fn parse_loop(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        self.parse_loop_condition().map(StatementKind::Loop)
    }

    fn parse_loop_condition(&mut self) -> Result<LoopCondition, ParseError> {
        if self.match_token(TokenKind::While) {
            return Ok(LoopCondition::While(self.parse_rest_expr("condition")?));
        }
        if self.match_token(TokenKind::Until) {
            return Ok(LoopCondition::Until(self.parse_rest_expr("condition")?));
        }
        self.expect_end()?;
        Ok(LoopCondition::None)
    }

    /// `Select Case expr`
    pub(super) fn parse_select(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        self.expect(TokenKind::Case, "CASE")?;
        let subject = self.parse_rest_expr("expression")?;
        Ok(StatementKind::SelectCase(subject))
    }

    /// `Case Else` or `Case v1, lo To hi, Is >= v`
    pub(super) fn parse_case(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        if self.match_token(TokenKind::Else) {
            self.expect_end()?;
            return Ok(StatementKind::CaseElse);
        }

        let mut values = Vec::new();
        loop {
            values.push(self.parse_case_value()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_end()?;
        Ok(StatementKind::Case(values))
    }

    fn parse_case_value(&mut self) -> Result<CaseValue, ParseError> {
        if self.match_token(TokenKind::Is) {
            let op = match self.peek() {
                Some(token)
                    if matches!(
                        token.kind,
                        TokenKind::Equals
                            | TokenKind::NotEquals
                            | TokenKind::LessThan
                            | TokenKind::GreaterThan
                            | TokenKind::LessEquals
                            | TokenKind::GreaterEquals
                    ) =>
                {
                    token.text.clone()
                }
                _ => return Err(self.error_here("comparison operator")),
            };
            self.advance();
            let value = self.parse_expr_until("value", |t| t.kind == TokenKind::Comma)?;
            return Ok(CaseValue::Is { op, value });
        }

        let low = self.parse_expr_until("case value", |t| {
            matches!(t.kind, TokenKind::Comma | TokenKind::To)
        })?;
        if self.match_token(TokenKind::To) {
            let high = self.parse_expr_until("range end", |t| t.kind == TokenKind::Comma)?;
            return Ok(CaseValue::Range(low, high));
        }
        Ok(CaseValue::Value(low))
    }

    /// `Every interval Do`, followed by body lines up to `End Do`.
    pub(super) fn parse_every(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let interval = self.parse_expr_until("interval", |t| t.kind == TokenKind::Do)?;
        self.expect(TokenKind::Do, "DO")?;
        self.expect_end()?;

        let opened_at = self.line;
        let mut body = Vec::new();
        loop {
            let Some(line) = self.next_logical_line() else {
                log::warn!("line {}: Every block has no End Do", opened_at);
                break;
            };
            if is_end_do(&line.text) {
                break;
            }
            body.push(self.parse_logical_line(&line));
        }

        Ok(StatementKind::Every { interval, body })
    }

    /// `Exit For|Do|While|Select|Sub|Function`
    pub(super) fn parse_exit(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let kind = match self.peek_kind() {
            Some(TokenKind::For | TokenKind::Do | TokenKind::While | TokenKind::Select) => {
                StatementKind::ExitLoop
            }
            Some(TokenKind::Sub | TokenKind::Function) => StatementKind::ExitProcedure,
            _ => return Err(self.error_here("FOR, DO, WHILE, SELECT, SUB or FUNCTION")),
        };
        self.advance();
        self.expect_end()?;
        Ok(kind)
    }

    /// `Continue [For|Do|While]`
    pub(super) fn parse_continue(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        if matches!(
            self.peek_kind(),
            Some(TokenKind::For | TokenKind::Do | TokenKind::While)
        ) {
            self.advance();
        }
        self.expect_end()?;
        Ok(StatementKind::Continue)
    }

    /// `GoTo label`
    pub(super) fn parse_goto(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        let label = match self.peek() {
            Some(token) if token.is_word() || token.kind == TokenKind::IntegerLiteral => {
                token.text.clone()
            }
            _ => return Err(self.error_here("label")),
        };
        self.advance();
        self.expect_end()?;
        Ok(StatementKind::Goto(label))
    }

    /// `Return` or `Return expr`
    pub(super) fn parse_return(&mut self) -> Result<StatementKind, ParseError> {
        self.advance();
        if self.is_at_end() {
            return Ok(StatementKind::ExitProcedure);
        }
        Ok(StatementKind::Return(self.parse_rest_expr("return value")?))
    }
}

/// True for a line consisting of `End Do`.
fn is_end_do(text: &str) -> bool {
    let tokens = lex(text);
    tokens.len() == 2 && tokens[0].kind == TokenKind::End && tokens[1].kind == TokenKind::Do
}
