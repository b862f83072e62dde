//! Token definitions for the vb2arduino lexer.
//!
//! This module defines all tokens recognized inside one logical BASIC line:
//! - Keywords that shape statements (IF, FOR, DIM, SUB, etc.)
//! - Operators (+, -, AND, OR, MOD, etc.)
//! - Literals (decimal, float, `&H`/`&O`/`&B` numbers, strings)
//! - Punctuation and delimiters
//!
//! ## Design Notes
//!
//! We use the `logos` crate for lexical analysis. BASIC is case-insensitive,
//! so keywords are matched with `ignore(ascii_case)`.
//!
//! Library and builtin names (`PinMode`, `Delay`, `Left`, `Timer`, ...) are
//! deliberately *not* keywords: they are plain identifiers, looked up by the
//! parser and the expression rewriter through tables. Only words that change
//! the shape of a statement get their own token.
//!
//! Whitespace is skipped. Every token keeps its byte span, which lets the
//! parser slice the verbatim source between two tokens.

use logos::Logos;
use std::fmt;

/// A token with its location in the logical line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Byte offset range of this token in the line
    pub span: std::ops::Range<usize>,
    /// The original text of the token
    pub text: String,
}

impl Token {
    /// Create a new token with the given kind, span, and text.
    pub fn new(kind: TokenKind, span: std::ops::Range<usize>, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    /// Returns true if the token is a word: an identifier or any keyword.
    ///
    /// Keywords are accepted wherever a name is expected after a dot or in a
    /// declaration, since `obj.Set` or `Dim Error As Integer` are valid names.
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Identifier || self.kind.is_keyword()
    }

    /// Case-insensitive comparison of the token text.
    pub fn is_named(&self, name: &str) -> bool {
        self.is_word() && self.text.eq_ignore_ascii_case(name)
    }
}

/// All token types of the BASIC dialect.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // ==================== Control Flow Keywords ====================

    /// IF keyword - begins conditional statement
    #[token("IF", ignore(ascii_case))]
    If,

    /// THEN keyword - follows IF condition
    #[token("THEN", ignore(ascii_case))]
    Then,

    /// ELSE keyword - alternative branch
    #[token("ELSE", ignore(ascii_case))]
    Else,

    /// ELSEIF keyword - chained conditional
    #[token("ELSEIF", ignore(ascii_case))]
    ElseIf,

    /// END keyword - used with IF, SUB, FUNCTION, TYPE, ENUM, SELECT, WITH, DO
    #[token("END", ignore(ascii_case))]
    End,

    /// FOR keyword - begins FOR loop
    #[token("FOR", ignore(ascii_case))]
    For,

    /// EACH keyword - FOR EACH iteration
    #[token("EACH", ignore(ascii_case))]
    Each,

    /// IN keyword - FOR EACH collection
    #[token("IN", ignore(ascii_case))]
    In,

    /// TO keyword - FOR loop range, CASE range
    #[token("TO", ignore(ascii_case))]
    To,

    /// STEP keyword - FOR loop increment
    #[token("STEP", ignore(ascii_case))]
    Step,

    /// NEXT keyword - ends FOR loop
    #[token("NEXT", ignore(ascii_case))]
    Next,

    /// WHILE keyword - begins WHILE loop or DO WHILE / LOOP WHILE
    #[token("WHILE", ignore(ascii_case))]
    While,

    /// WEND keyword - ends WHILE loop
    #[token("WEND", ignore(ascii_case))]
    Wend,

    /// DO keyword - begins DO loop
    #[token("DO", ignore(ascii_case))]
    Do,

    /// LOOP keyword - ends DO loop
    #[token("LOOP", ignore(ascii_case))]
    Loop,

    /// UNTIL keyword - negated loop condition
    #[token("UNTIL", ignore(ascii_case))]
    Until,

    /// SELECT keyword - begins SELECT CASE
    #[token("SELECT", ignore(ascii_case))]
    Select,

    /// CASE keyword - SELECT CASE branch
    #[token("CASE", ignore(ascii_case))]
    Case,

    /// IS keyword - CASE IS comparison
    #[token("IS", ignore(ascii_case))]
    Is,

    /// GOTO keyword - unconditional jump
    #[token("GOTO", ignore(ascii_case))]
    Goto,

    /// RETURN keyword - return from FUNCTION
    #[token("RETURN", ignore(ascii_case))]
    Return,

    /// EXIT keyword - early exit from loop/sub/function
    #[token("EXIT", ignore(ascii_case))]
    Exit,

    /// CONTINUE keyword - next loop iteration
    #[token("CONTINUE", ignore(ascii_case))]
    Continue,

    /// WITH keyword - default-member block (unsupported on the target)
    #[token("WITH", ignore(ascii_case))]
    With,

    // ==================== Declaration Keywords ====================

    /// DIM keyword - variable declaration
    #[token("DIM", ignore(ascii_case))]
    Dim,

    /// STATIC keyword - static storage declaration
    #[token("STATIC", ignore(ascii_case))]
    Static,

    /// CONST keyword - constant declaration
    #[token("CONST", ignore(ascii_case))]
    Const,

    /// PUBLIC visibility modifier
    #[token("PUBLIC", ignore(ascii_case))]
    Public,

    /// PRIVATE visibility modifier
    #[token("PRIVATE", ignore(ascii_case))]
    Private,

    /// AS keyword - type specification
    #[token("AS", ignore(ascii_case))]
    As,

    /// TYPE keyword - begins record type
    #[token("TYPE", ignore(ascii_case))]
    Type,

    /// ENUM keyword - begins enumeration
    #[token("ENUM", ignore(ascii_case))]
    Enum,

    /// SUB keyword - subroutine definition
    #[token("SUB", ignore(ascii_case))]
    Sub,

    /// FUNCTION keyword - function definition
    #[token("FUNCTION", ignore(ascii_case))]
    Function,

    /// OPTIONAL parameter modifier
    #[token("OPTIONAL", ignore(ascii_case))]
    Optional,

    /// BYREF parameter modifier
    #[token("BYREF", ignore(ascii_case))]
    ByRef,

    /// BYVAL parameter modifier
    #[token("BYVAL", ignore(ascii_case))]
    ByVal,

    /// LET keyword - assignment (optional)
    #[token("LET", ignore(ascii_case))]
    Let,

    /// SET keyword - object assignment
    #[token("SET", ignore(ascii_case))]
    Set,

    /// CALL keyword - explicit procedure call
    #[token("CALL", ignore(ascii_case))]
    Call,

    /// NEW keyword - object construction
    #[token("NEW", ignore(ascii_case))]
    New,

    // ==================== Operators ====================

    /// AND operator (logical)
    #[token("AND", ignore(ascii_case))]
    And,

    /// OR operator (logical)
    #[token("OR", ignore(ascii_case))]
    Or,

    /// NOT operator (logical)
    #[token("NOT", ignore(ascii_case))]
    Not,

    /// XOR operator (bitwise)
    #[token("XOR", ignore(ascii_case))]
    Xor,

    /// MOD operator (remainder)
    #[token("MOD", ignore(ascii_case))]
    Mod,

    /// Addition
    #[token("+")]
    Plus,

    /// Subtraction / negation
    #[token("-")]
    Minus,

    /// Multiplication, or pointer suffix in type names
    #[token("*")]
    Star,

    /// Division
    #[token("/")]
    Slash,

    /// Integer division
    #[token("\\")]
    Backslash,

    /// Exponent
    #[token("^")]
    Caret,

    /// Equality or assignment
    #[token("=")]
    Equals,

    /// Inequality
    #[token("<>")]
    NotEquals,

    /// Less than
    #[token("<")]
    LessThan,

    /// Greater than
    #[token(">")]
    GreaterThan,

    /// Less than or equal
    #[token("<=")]
    LessEquals,

    /// Greater than or equal
    #[token(">=")]
    GreaterEquals,

    /// String concatenation
    #[token("&")]
    Ampersand,

    /// C++ member access written directly in the source
    #[token("->")]
    Arrow,

    /// C++ scope resolution written directly in the source
    #[token("::")]
    DoubleColon,

    // ==================== Punctuation ====================

    /// Left parenthesis
    #[token("(")]
    LeftParen,

    /// Right parenthesis
    #[token(")")]
    RightParen,

    /// Left brace (array literals)
    #[token("{")]
    LeftBrace,

    /// Right brace (array literals)
    #[token("}")]
    RightBrace,

    /// Left bracket
    #[token("[")]
    LeftBracket,

    /// Right bracket
    #[token("]")]
    RightBracket,

    /// Comma
    #[token(",")]
    Comma,

    /// Semicolon
    #[token(";")]
    Semicolon,

    /// Colon (labels)
    #[token(":")]
    Colon,

    /// Dot (member access)
    #[token(".")]
    Dot,

    /// Hash (`#Include`)
    #[token("#")]
    Hash,

    // ==================== Literals ====================

    /// Integer literal (decimal)
    /// Examples: 123, 0, 999999
    #[regex(r"[0-9]+", priority = 2)]
    IntegerLiteral,

    /// Hexadecimal literal
    /// Examples: &H1F, &HFF00
    #[regex(r"&[Hh][0-9A-Fa-f]+")]
    HexLiteral,

    /// Octal literal
    /// Examples: &O17, &O777
    #[regex(r"&[Oo][0-7]+")]
    OctalLiteral,

    /// Binary literal
    /// Examples: &B1010, &B11110000
    #[regex(r"&[Bb][01]+")]
    BinaryLiteral,

    /// Floating point literal
    /// Examples: 1.5, .5, 1.5E10
    #[regex(r"[0-9]*\.[0-9]+([Ee][+-]?[0-9]+)?|[0-9]+[Ee][+-]?[0-9]+")]
    FloatLiteral,

    /// String literal
    /// Everything between double quotes
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    // ==================== Identifiers ====================

    /// Identifier (variable, procedure, builtin or label name)
    /// May end with a `$` suffix (`Chr$`, `Hex$`)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*\$?")]
    Identifier,

    /// Any other character; also produced for unterminated strings.
    #[regex(r#"[^ \t\r\n\fA-Za-z0-9_"]"#, priority = 1)]
    Unknown,
}

impl TokenKind {
    /// Returns true for word-shaped keyword tokens.
    pub fn is_keyword(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            If | Then
                | Else
                | ElseIf
                | End
                | For
                | Each
                | In
                | To
                | Step
                | Next
                | While
                | Wend
                | Do
                | Loop
                | Until
                | Select
                | Case
                | Is
                | Goto
                | Return
                | Exit
                | Continue
                | With
                | Dim
                | Static
                | Const
                | Public
                | Private
                | As
                | Type
                | Enum
                | Sub
                | Function
                | Optional
                | ByRef
                | ByVal
                | Let
                | Set
                | Call
                | New
                | And
                | Or
                | Not
                | Xor
                | Mod
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Keywords display as uppercase
            TokenKind::If => write!(f, "IF"),
            TokenKind::Then => write!(f, "THEN"),
            TokenKind::Else => write!(f, "ELSE"),
            TokenKind::End => write!(f, "END"),
            TokenKind::For => write!(f, "FOR"),
            TokenKind::To => write!(f, "TO"),
            TokenKind::As => write!(f, "AS"),

            // Operators display as symbols
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Equals => write!(f, "="),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),

            // Default: use debug representation
            _ => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    /// Helper to collect all tokens from source
    fn lex_all(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source).filter_map(|r| r.ok()).collect()
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(lex_all("IF"), vec![TokenKind::If]);
        assert_eq!(lex_all("if"), vec![TokenKind::If]);
        assert_eq!(lex_all("If"), vec![TokenKind::If]);
        assert_eq!(lex_all("iF"), vec![TokenKind::If]);
    }

    #[test]
    fn test_library_names_are_identifiers() {
        assert_eq!(
            lex_all("PinMode LED, OUTPUT"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_stays_identifier() {
        assert_eq!(lex_all("Ending"), vec![TokenKind::Identifier]);
        assert_eq!(lex_all("Index"), vec![TokenKind::Identifier]);
        assert_eq!(lex_all("Nothing"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_if_statement() {
        let tokens = lex_all("If x <> 10 Then");
        assert_eq!(
            tokens,
            vec![
                TokenKind::If,
                TokenKind::Identifier,
                TokenKind::NotEquals,
                TokenKind::IntegerLiteral,
                TokenKind::Then,
            ]
        );
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(
            lex_all("&HFF &h1a &O17 &B1010"),
            vec![
                TokenKind::HexLiteral,
                TokenKind::HexLiteral,
                TokenKind::OctalLiteral,
                TokenKind::BinaryLiteral,
            ]
        );
        assert_eq!(
            lex_all("1.5 .5 1.5E10"),
            vec![
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
            ]
        );
    }

    #[test]
    fn test_concatenation_is_not_hex() {
        assert_eq!(
            lex_all(r#""a" & name"#),
            vec![
                TokenKind::StringLiteral,
                TokenKind::Ampersand,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_dollar_suffix() {
        assert_eq!(
            lex_all("Chr$(65)"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::IntegerLiteral,
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn test_pointer_type_and_braces() {
        assert_eq!(
            lex_all("BLEServer* {1, 2}"),
            vec![
                TokenKind::Identifier,
                TokenKind::Star,
                TokenKind::LeftBrace,
                TokenKind::IntegerLiteral,
                TokenKind::Comma,
                TokenKind::IntegerLiteral,
                TokenKind::RightBrace,
            ]
        );
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(lex_all("a @ b"), vec![
            TokenKind::Identifier,
            TokenKind::Unknown,
            TokenKind::Identifier,
        ]);
    }
}
