//! Parser error types.
//!
//! A parse error means a line started like a known construct but did not
//! finish like one. Errors never abort a translation: the parser turns the
//! offending line into an untranslated (or pass-through) statement and moves
//! on, so the error mostly serves the debug log.

use thiserror::Error;

/// A parse error with location and description.
///
/// Columns are byte offsets into the logical line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Expected a specific token but found something else.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What we expected to find.
        expected: String,
        /// What we actually found.
        found: String,
        /// Column of the unexpected token.
        column: usize,
    },

    /// Reached the end of the line unexpectedly.
    #[error("unexpected end of line, expected {expected}")]
    UnexpectedEnd {
        /// What we expected to find.
        expected: String,
    },

    /// Unbalanced parentheses, brackets or braces.
    #[error("unbalanced delimiter")]
    Unbalanced {
        /// Column of the unmatched opening delimiter.
        column: usize,
    },

    /// Invalid statement.
    #[error("invalid statement: {message}")]
    InvalidStatement {
        /// Column where the problem was detected.
        column: usize,
        /// Description of the problem.
        message: String,
    },
}

impl ParseError {
    /// Returns the column of this error, if available.
    pub fn column(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { column, .. } => Some(*column),
            ParseError::UnexpectedEnd { .. } => None,
            ParseError::Unbalanced { column } => Some(*column),
            ParseError::InvalidStatement { column, .. } => Some(*column),
        }
    }

    /// Creates an "unexpected token" error.
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>, column: usize) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            column,
        }
    }

    /// Creates an "unexpected end of line" error.
    pub fn end(expected: impl Into<String>) -> Self {
        ParseError::UnexpectedEnd {
            expected: expected.into(),
        }
    }

    /// Creates an invalid statement error with a message.
    pub fn invalid(message: impl Into<String>, column: usize) -> Self {
        ParseError::InvalidStatement {
            column,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_column() {
        let err = ParseError::unexpected("THEN", "ELSE", 10);
        assert_eq!(err.column(), Some(10));
    }

    #[test]
    fn test_end_error() {
        let err = ParseError::end("expression");
        assert_eq!(err.column(), None);
        assert!(err.to_string().contains("end of line"));
    }

    #[test]
    fn test_invalid_statement() {
        let err = ParseError::invalid("dynamic array needs an initializer", 4);
        assert!(err.to_string().contains("dynamic array"));
    }
}
