//! Logical line classification.
//!
//! The dialect is line oriented: every statement lives on one logical line.
//! This module turns raw program text into those logical lines:
//!
//! - a physical line ending in ` _` continues on the next one
//! - `'` comments and `REM` comments are removed, but never inside strings
//! - blank and comment-only lines are dropped
//!
//! Each [`LogicalLine`] remembers the 1-based number of the physical line it
//! started on, which is what the generated line markers refer to.

/// One classified, non-blank line of source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line
    pub number: usize,
    /// Trimmed statement text without comments
    pub text: String,
}

impl LogicalLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Split source text into logical lines.
///
/// # Example
///
/// ```
/// use vb2arduino::lexer::logical_lines;
///
/// let lines = logical_lines("' blink\nDelay _\n  500 ' wait\n");
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].number, 2);
/// assert_eq!(lines[0].text, "Delay 500");
/// ```
pub fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let physical: Vec<&str> = source.lines().collect();
    let mut result = Vec::new();
    let mut index = 0;

    while index < physical.len() {
        let number = index + 1;
        let mut text = strip_comment(physical[index]).trim().to_string();
        index += 1;

        while let Some(head) = continued(&text) {
            if index >= physical.len() {
                text = head.to_string();
                break;
            }
            let next = strip_comment(physical[index]);
            text = format!("{} {}", head, next.trim());
            index += 1;
        }

        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        log::trace!("line {}: {}", number, text);
        result.push(LogicalLine::new(number, text));
    }

    result
}

/// If `text` ends with a continuation marker, returns the text before it.
fn continued(text: &str) -> Option<&str> {
    let head = text.strip_suffix('_')?;
    if head.is_empty() {
        return Some(head);
    }
    if head.ends_with([' ', '\t']) {
        Some(head.trim_end())
    } else {
        None
    }
}

/// Remove a trailing `'` or `REM` comment, ignoring markers inside strings.
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'\'' if !in_string => return &line[..i],
            b'R' | b'r' if !in_string && is_rem_at(line, i) => return &line[..i],
            _ => {}
        }
        i += 1;
    }
    line
}

fn is_rem_at(line: &str, at: usize) -> bool {
    let bytes = line.as_bytes();
    let word = match line.get(at..at + 3) {
        Some(word) => word,
        None => return false,
    };
    if !word.eq_ignore_ascii_case("rem") {
        return false;
    }
    let before_ok = at == 0 || !is_word_byte(bytes[at - 1]);
    let after_ok = bytes.get(at + 3).is_none_or(|b| !is_word_byte(*b));
    before_ok && after_ok
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let lines = logical_lines("\n' comment\nREM old style\n   \nx = 1\n");
        assert_eq!(lines, vec![LogicalLine::new(5, "x = 1")]);
    }

    #[test]
    fn test_line_numbers_preserved() {
        let lines = logical_lines("a = 1\n\nb = 2\n");
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_trailing_comment_removed() {
        let lines = logical_lines("Delay 100 ' pause");
        assert_eq!(lines[0].text, "Delay 100");
    }

    #[test]
    fn test_quote_inside_string_kept() {
        let lines = logical_lines(r#"SerialPrintLine "it's here" ' note"#);
        assert_eq!(lines[0].text, r#"SerialPrintLine "it's here""#);
    }

    #[test]
    fn test_rem_must_be_a_word() {
        assert_eq!(strip_comment("Remaining = 3"), "Remaining = 3");
        assert_eq!(strip_comment("x = 1 REM set x"), "x = 1 ");
        assert_eq!(strip_comment(r#"s = "REM""#), r#"s = "REM""#);
    }

    #[test]
    fn test_continuation_joined() {
        let lines = logical_lines("DrawLine 0, 0, _\n    10, 10, COLOR_RED\nDelay 1");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], LogicalLine::new(1, "DrawLine 0, 0, 10, 10, COLOR_RED"));
        assert_eq!(lines[1].number, 3);
    }

    #[test]
    fn test_identifier_ending_in_underscore_is_not_continuation() {
        let lines = logical_lines("x = my_\ny = 2");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "x = my_");
    }

    #[test]
    fn test_crlf_input() {
        let lines = logical_lines("a = 1\r\nb = 2\r\n");
        assert_eq!(lines[1], LogicalLine::new(2, "b = 2"));
    }
}
