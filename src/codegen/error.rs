//! Code generation error types.
//!
//! Unsupported or malformed BASIC never produces one of these; it is
//! translated into comments. These errors describe failures of the backend
//! itself.

use std::fmt;

/// An error that occurred during code generation.
#[derive(Debug, Clone)]
pub struct CodeGenError {
    /// The kind of error.
    pub kind: CodeGenErrorKind,
    /// Source line being translated, if known.
    pub line: Option<usize>,
    /// Additional context about the error.
    pub context: Option<String>,
}

impl CodeGenError {
    /// Creates a new code generation error.
    pub fn new(kind: CodeGenErrorKind) -> Self {
        Self {
            kind,
            line: None,
            context: None,
        }
    }

    /// Adds the source line to the error.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds context information to the error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Creates an error for output that could not be assembled.
    pub fn render(message: impl Into<String>) -> Self {
        Self::new(CodeGenErrorKind::Render(message.into()))
    }

    /// Creates an internal error (transpiler bug).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CodeGenErrorKind::Internal(message.into()))
    }
}

impl fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code generation error: {}", self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for CodeGenError {}

/// The specific kind of code generation error.
#[derive(Debug, Clone)]
pub enum CodeGenErrorKind {
    /// The translation unit could not be assembled.
    Render(String),

    /// Internal transpiler error (indicates a bug).
    Internal(String),
}

impl fmt::Display for CodeGenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeGenErrorKind::Render(msg) => write!(f, "render failed: {}", msg),
            CodeGenErrorKind::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodeGenError::render("buffer");
        assert_eq!(err.to_string(), "code generation error: render failed: buffer");
    }

    #[test]
    fn test_error_with_line() {
        let err = CodeGenError::internal("missing block").with_line(12);
        assert!(err.to_string().contains("at line 12"));
    }

    #[test]
    fn test_error_with_context() {
        let err = CodeGenError::internal("missing case").with_context("in emit_case");
        assert!(err.to_string().contains("in emit_case"));
    }
}
