//! Source-level linter.
//!
//! The linter lexes each line of BASIC text and reports token patterns
//! that compile but behave badly on a microcontroller: blocking delays,
//! sprites that are never freed, leftover debug drawing.
//!
//! # Suppression
//!
//! - `' LINTER:DISABLE-FILE rule-id` anywhere disables a rule for the file.
//! - `' LINTER:DISABLE rule-id` disables a rule for the next line.
//!
//! # Example
//!
//! ```
//! use vb2arduino::lint::{self, Fix, Rule};
//!
//! let source = "Delay 500\n";
//! let diagnostics = lint::run(source, "blink.vb");
//! assert_eq!(diagnostics[0].rule, Rule::BlockingDelay);
//!
//! let fixed = lint::apply_fix(source, &diagnostics[0], Fix::ReplaceWithEvery);
//! assert!(fixed.contains("Every 500 Do"));
//! ```

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexer::lines::strip_comment;
use crate::lexer::{Token, TokenKind, lex};

/// Baud rates worth pointing out as hard-coded.
const BAUD_RATES: &[u32] = &[
    300, 1200, 2400, 4800, 9600, 19200, 38400, 57600, 74880, 115200, 230400, 250000, 500000,
    1000000, 2000000,
];

/// Delays at or above this many milliseconds are reported as blocking.
const BLOCKING_DELAY_MS: u64 = 200;

static DISABLE_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)LINTER:DISABLE-FILE\s+([A-Za-z0-9_-]+)").expect("valid suppression pattern")
});

static DISABLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)LINTER:DISABLE\s+([A-Za-z0-9_-]+)").expect("valid suppression pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintSeverity {
    Info,
    Warning,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Info => f.write_str("INFO"),
            LintSeverity::Warning => f.write_str("WARNING"),
        }
    }
}

/// A lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    DebugDraw,
    SuspiciousBaud,
    UnusedVariable,
    BlockingDelay,
    MissingDeleteSprite,
}

impl Rule {
    /// Identifier used in output and suppression directives.
    pub fn id(&self) -> &'static str {
        match self {
            Rule::DebugDraw => "debug-draw",
            Rule::SuspiciousBaud => "suspicious-baud",
            Rule::UnusedVariable => "unused-variable",
            Rule::BlockingDelay => "blocking-delay",
            Rule::MissingDeleteSprite => "missing-delete-sprite",
        }
    }

    pub fn severity(&self) -> LintSeverity {
        match self {
            Rule::SuspiciousBaud => LintSeverity::Info,
            _ => LintSeverity::Warning,
        }
    }
}

/// A quick fix offered for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fix {
    RemoveLine,
    CommentLine,
    InsertDelete,
    ReplaceWithEvery,
}

impl Fix {
    pub fn id(&self) -> &'static str {
        match self {
            Fix::RemoveLine => "remove_line",
            Fix::CommentLine => "comment_line",
            Fix::InsertDelete => "insert_delete",
            Fix::ReplaceWithEvery => "replace_with_every",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Fix::RemoveLine => "Remove line",
            Fix::CommentLine => "Comment out line",
            Fix::InsertDelete => "Insert sprite delete",
            Fix::ReplaceWithEvery => "Replace with Every skeleton",
        }
    }
}

/// One linter finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    pub file: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub col: usize,
    pub severity: LintSeverity,
    pub message: String,
    pub rule: Rule,
    /// The trimmed source line.
    pub snippet: String,
}

impl fmt::Display for LintDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} {} {} - {}",
            self.file,
            self.line,
            self.col,
            self.severity,
            self.rule.id(),
            self.message
        )
    }
}

/// Lints `text`, reporting diagnostics against `path`.
pub fn run(text: &str, path: &str) -> Vec<LintDiagnostic> {
    let lines: Vec<&str> = text.lines().collect();
    let tokens: Vec<Vec<Token>> = lines.iter().map(|line| code_tokens(line)).collect();
    let mut diagnostics = Vec::new();
    let diagnostic = |rule: Rule, line: usize, col: usize, message: String| LintDiagnostic {
        file: path.to_string(),
        line,
        col,
        severity: rule.severity(),
        message,
        rule,
        snippet: lines[line - 1].trim().to_string(),
    };

    for (index, line) in tokens.iter().enumerate() {
        let number = index + 1;
        if let Some(token) = debug_draw(line) {
            diagnostics.push(diagnostic(
                Rule::DebugDraw,
                number,
                token.span.start + 1,
                "Debug drawing call detected; this may overlay graphics in final output".to_string(),
            ));
        }
        if let Some(token) = line.iter().find(|t| is_baud_literal(t)) {
            diagnostics.push(diagnostic(
                Rule::SuspiciousBaud,
                number,
                token.span.start + 1,
                "Serial baud literal found; consider making this configurable".to_string(),
            ));
        }
    }

    for (name, number) in declared_variables(&tokens) {
        let used = tokens
            .iter()
            .enumerate()
            .any(|(index, line)| index + 1 != number && line.iter().any(|t| t.is_named(&name)));
        if !used {
            diagnostics.push(diagnostic(
                Rule::UnusedVariable,
                number,
                1,
                format!("Variable {} declared but never used", name),
            ));
        }
    }

    let mut created: Vec<(String, usize)> = Vec::new();
    let mut deleted = HashSet::new();
    for (index, line) in tokens.iter().enumerate() {
        if let Some(name) = name_after(line, "CREATE_SPRITE") {
            match created.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = index + 1,
                None => created.push((name, index + 1)),
            }
        }
        if let Some(name) = name_after(line, "SPRITE_DELETE") {
            deleted.insert(name);
        }
    }
    for (name, number) in created {
        if !deleted.contains(&name) {
            diagnostics.push(diagnostic(
                Rule::MissingDeleteSprite,
                number,
                1,
                format!("Sprite {} created but no delete found", name),
            ));
        }
    }

    for (index, line) in tokens.iter().enumerate() {
        if let Some((col, ms)) = find_delay(line)
            && ms >= BLOCKING_DELAY_MS
        {
            diagnostics.push(diagnostic(
                Rule::BlockingDelay,
                index + 1,
                col + 1,
                format!("Blocking Delay ({} ms) detected; consider using a non-blocking timer", ms),
            ));
        }
    }

    let (file_disabled, line_disabled) = suppressions(&lines);
    diagnostics.retain(|d| {
        let id = d.rule.id();
        !file_disabled.contains(id) && !line_disabled.contains(&(d.line, id.to_string()))
    });
    diagnostics
}

/// Quick fixes applicable to `diagnostic`.
pub fn available_fixes(diagnostic: &LintDiagnostic) -> Vec<Fix> {
    match diagnostic.rule {
        Rule::DebugDraw => vec![Fix::RemoveLine],
        Rule::MissingDeleteSprite => vec![Fix::InsertDelete],
        Rule::BlockingDelay => vec![Fix::CommentLine, Fix::ReplaceWithEvery],
        Rule::SuspiciousBaud | Rule::UnusedVariable => Vec::new(),
    }
}

/// Applies `fix` at the line of `diagnostic`. Returns `text` unchanged if
/// the fix does not apply there.
pub fn apply_fix(text: &str, diagnostic: &LintDiagnostic, fix: Fix) -> String {
    let mut lines: Vec<String> = text.lines().map(String::from).collect();
    let Some(index) = diagnostic.line.checked_sub(1).filter(|&i| i < lines.len()) else {
        return text.to_string();
    };

    match fix {
        Fix::RemoveLine => {
            lines.remove(index);
        }
        Fix::CommentLine => lines[index] = format!("' {}", lines[index]),
        Fix::InsertDelete => {
            let name = name_after(&code_tokens(&diagnostic.snippet), "CREATE_SPRITE")
                .or_else(|| name_after(&code_tokens(&lines[index]), "CREATE_SPRITE"));
            let Some(name) = name else {
                return text.to_string();
            };
            lines.insert(index + 1, format!("SPRITE_DELETE {}", name));
        }
        Fix::ReplaceWithEvery => {
            let Some((_, ms)) = find_delay(&code_tokens(&lines[index])) else {
                return text.to_string();
            };
            lines[index] = format!("' {}", lines[index]);
            let skeleton = [
                format!("Every {} Do", ms),
                "    ' move blocking code here".to_string(),
                "End Do".to_string(),
            ];
            for (offset, line) in skeleton.into_iter().enumerate() {
                lines.insert(index + 1 + offset, line);
            }
        }
    }

    let mut fixed = lines.join("\n");
    if text.ends_with('\n') {
        fixed.push('\n');
    }
    fixed
}

/// Tokens of the code part of a physical line.
fn code_tokens(line: &str) -> Vec<Token> {
    lex(strip_comment(line))
}

/// `tft.fillTriangle` or `SPRITE_FILL_ELLIPSE`.
fn debug_draw(tokens: &[Token]) -> Option<&Token> {
    tokens.iter().enumerate().find_map(|(i, token)| {
        let triangle = token.is_named("tft")
            && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Dot)
            && tokens.get(i + 2).is_some_and(|t| t.is_named("fillTriangle"));
        (triangle || token.is_named("SPRITE_FILL_ELLIPSE")).then_some(token)
    })
}

fn is_baud_literal(token: &Token) -> bool {
    token.kind == TokenKind::IntegerLiteral
        && token.text.parse::<u32>().is_ok_and(|n| BAUD_RATES.contains(&n))
}

/// Identifier following the `keyword` identifier.
fn name_after(tokens: &[Token], keyword: &str) -> Option<String> {
    tokens.windows(2).find_map(|pair| {
        (pair[0].is_named(keyword) && pair[1].kind == TokenKind::Identifier)
            .then(|| pair[1].text.clone())
    })
}

/// Offset and value of a `Delay <integer>` call.
fn find_delay(tokens: &[Token]) -> Option<(usize, u64)> {
    tokens.windows(2).find_map(|pair| {
        if !pair[0].is_named("delay") || pair[1].kind != TokenKind::IntegerLiteral {
            return None;
        }
        pair[1].text.parse().ok().map(|ms| (pair[0].span.start, ms))
    })
}

/// `(name, line)` of each `Dim name` line.
fn declared_variables(tokens: &[Vec<Token>]) -> Vec<(String, usize)> {
    tokens
        .iter()
        .enumerate()
        .filter_map(|(index, line)| match line.as_slice() {
            [dim, name, ..] if dim.kind == TokenKind::Dim && name.kind == TokenKind::Identifier => {
                Some((name.text.clone(), index + 1))
            }
            _ => None,
        })
        .collect()
}

/// File-wide disabled rules and `(line, rule)` pairs disabled per line.
fn suppressions(lines: &[&str]) -> (HashSet<String>, HashSet<(usize, String)>) {
    let mut file = HashSet::new();
    let mut per_line = HashSet::new();
    for (index, line) in lines.iter().enumerate() {
        if let Some(captures) = DISABLE_FILE.captures(line) {
            file.insert(captures[1].to_ascii_lowercase());
        }
        if let Some(captures) = DISABLE_LINE.captures(line) {
            per_line.insert((index + 2, captures[1].to_ascii_lowercase()));
        }
    }
    (file, per_line)
}
