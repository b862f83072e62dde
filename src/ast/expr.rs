//! Expression nodes.
//!
//! Expressions are kept as the exact source text they were sliced from.
//! The Arduino backend re-tokenizes that text when rewriting it, which is
//! enough for a line-oriented translator and never loses formatting.

use std::fmt;

/// A BASIC expression, stored verbatim.
///
/// # Example
///
/// ```
/// use vb2arduino::ast::Expr;
///
/// let expr = Expr::new("  BALL_TILES - 1 ");
/// assert_eq!(expr.as_str(), "BALL_TILES - 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expr {
    text: String,
}

impl Expr {
    /// Creates an expression from source text, trimming surrounding whitespace.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
        }
    }

    /// The source text of the expression.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if the expression has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the value of a plain decimal integer literal.
    pub fn as_integer(&self) -> Option<i64> {
        let digits = self.text.strip_prefix('-').unwrap_or(&self.text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.text.parse().ok()
    }

    /// Returns true if the expression is a single string literal.
    pub fn is_string_literal(&self) -> bool {
        let text = self.text.as_str();
        text.len() >= 2
            && text.starts_with('"')
            && text.ends_with('"')
            && !text[1..text.len() - 1].contains('"')
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_literals() {
        assert_eq!(Expr::new("42").as_integer(), Some(42));
        assert_eq!(Expr::new("-3").as_integer(), Some(-3));
        assert_eq!(Expr::new("N + 1").as_integer(), None);
        assert_eq!(Expr::new("-").as_integer(), None);
    }

    #[test]
    fn test_string_literal_detection() {
        assert!(Expr::new(r#""hello""#).is_string_literal());
        assert!(!Expr::new(r#""a" & "b""#).is_string_literal());
        assert!(!Expr::new("name").is_string_literal());
    }
}
