//! Parser for the vb2arduino BASIC dialect.
//!
//! The parser classifies every logical line into one [`Statement`]. Each line
//! is tokenized on its own and handed to an ordered set of shape recognizers;
//! the first recognizer whose leading keyword matches owns the line.
//!
//! # Example
//!
//! ```
//! use vb2arduino::ast::StatementKind;
//! use vb2arduino::parser::parse;
//!
//! let program = parse("Const LED = 2\nSub Setup()\n    PinMode LED, OUTPUT\nEnd Sub\n");
//!
//! assert_eq!(program.statements.len(), 4);
//! assert!(matches!(program.statements[0].kind, StatementKind::Const { .. }));
//! assert_eq!(program.statements[2].line, 3);
//! ```
//!
//! # Module Structure
//!
//! The parser is split into focused modules:
//! - [`tokens`] - Token navigation utilities (peek, advance, match, expect)
//! - [`expressions`] - Expression slicing and argument splitting
//! - [`statements`] - Statement dispatcher and simple statements
//! - [`control_flow`] - IF/FOR/WHILE/DO/SELECT/EVERY and jumps
//! - [`declarations`] - CONST/DIM/STATIC/TYPE/ENUM
//! - [`procedures`] - SUB/FUNCTION headers and END forms
//! - [`directives`] - `#Include` and `Option` lines
//! - [`error`] - Parse error types
//!
//! # Error Recovery
//!
//! A line that starts like a known construct but does not finish like one
//! becomes [`StatementKind::Untranslated`] (or, for procedure headers,
//! [`StatementKind::MalformedHeader`]). Parsing always continues with the
//! next line, and always produces a program.

mod control_flow;
mod declarations;
mod directives;
mod error;
mod expressions;
mod procedures;
mod statements;
mod tokens;

pub use error::ParseError;

use crate::ast::{Program, Statement, StatementKind};
use crate::lexer::{LogicalLine, Token, lex, logical_lines};

/// Multi-line constructs whose body lines have their own grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BlockContext {
    None,
    /// Inside `Type ... End Type`: lines are field declarations.
    Type,
    /// Inside `Enum ... End Enum`: lines are members.
    Enum,
}

/// Parser for BASIC source code.
///
/// Holds the logical lines of the program plus the token cursor of the line
/// currently being recognized.
pub struct Parser {
    /// All logical lines of the program.
    lines: Vec<LogicalLine>,
    /// Index of the next line to parse.
    next_line: usize,
    /// Grammar of the current block body.
    block: BlockContext,
    /// Text of the current line.
    source: String,
    /// Tokens of the current line.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    current: usize,
    /// Number of the current line.
    line: usize,
}

impl Parser {
    /// Creates a new parser for the given program text.
    pub fn new(source: &str) -> Self {
        Self {
            lines: logical_lines(source),
            next_line: 0,
            block: BlockContext::None,
            source: String::new(),
            tokens: Vec::new(),
            current: 0,
            line: 0,
        }
    }

    /// Parses every logical line into a program.
    ///
    /// Never fails: lines that cannot be recognized are kept as
    /// untranslated statements.
    pub fn parse(&mut self) -> Program {
        let mut statements = Vec::new();

        while let Some(line) = self.next_logical_line() {
            statements.push(self.parse_logical_line(&line));
        }

        Program::new(statements)
    }

    /// Takes the next logical line, if any.
    fn next_logical_line(&mut self) -> Option<LogicalLine> {
        let line = self.lines.get(self.next_line).cloned()?;
        self.next_line += 1;
        Some(line)
    }

    /// Makes `text` the current line.
    pub(super) fn load_line(&mut self, text: &str) {
        self.source = text.to_string();
        self.tokens = lex(text);
        self.current = 0;
    }

    /// Recognizes one logical line.
    fn parse_logical_line(&mut self, line: &LogicalLine) -> Statement {
        self.load_line(&line.text);
        self.line = line.number;

        let kind = match self.parse_statement() {
            Ok(kind) => kind,
            Err(err) => {
                log::debug!("line {}: untranslated ({}): {}", line.number, err, line.text);
                StatementKind::Untranslated(line.text.clone())
            }
        };
        log::trace!("line {}: {:?}", line.number, kind);
        Statement::new(kind, line.number)
    }

    /// Recognizes a fragment of the current line (a branch of a single-line
    /// `If`) as a statement of its own, then restores the cursor.
    pub(super) fn parse_fragment(&mut self, text: &str) -> Statement {
        let source = std::mem::take(&mut self.source);
        let tokens = std::mem::take(&mut self.tokens);
        let current = self.current;
        let block = std::mem::replace(&mut self.block, BlockContext::None);

        let fragment = LogicalLine::new(self.line, text.trim());
        let statement = self.parse_logical_line(&fragment);

        self.source = source;
        self.tokens = tokens;
        self.current = current;
        self.block = block;
        statement
    }
}

/// Convenience function to parse program text.
pub fn parse(source: &str) -> Program {
    Parser::new(source).parse()
}
