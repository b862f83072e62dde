//! Mapping toolchain diagnostics back to BASIC source lines.
//!
//! The generated unit interleaves `// __VB_LINE__:N` markers with the code
//! of each statement. [`VbLineMap`] turns those markers into a lookup from
//! generated line to source line, and [`parse_compiler_output`] extracts
//! GCC/Clang diagnostics about the generated file.
//!
//! # Example
//!
//! ```
//! use vb2arduino::diagnostics::{VbLineMap, parse_compiler_output};
//!
//! let generated = vb2arduino::transpile("Sub Loop()\n    Delay 10\nEnd Sub");
//! let map = VbLineMap::from_generated(&generated);
//!
//! let stderr = "/tmp/build/main.cpp:12:5: error: 'foo' was not declared in this scope";
//! let diagnostics = parse_compiler_output(stderr, "main.cpp", &generated);
//! assert_eq!(diagnostics.len(), 1);
//! let mapped = diagnostics[0].to_source(&map);
//! assert!(mapped.message.contains("'foo'"));
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::codegen::LINE_MARKER;

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\s*{}(\d+)", regex::escape(LINE_MARKER))).expect("valid marker pattern")
});

/// `file:line[:col]: severity: message`
static LOCATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<file>.+?):(?P<line>\d+)(?::\d+)?: (?P<severity>fatal error|error|warning|note): (?P<message>.*)$",
    )
    .expect("valid diagnostic pattern")
});

static CONTINUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<severity>fatal error|error|warning|note): (?P<message>.*)$")
        .expect("valid diagnostic pattern")
});

static REDECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"redeclaration of [\x27\x22`\x{2018}]?(?P<name>[A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid diagnostic pattern")
});

/// C++ type names searched for when relocating a redeclaration.
const DECLARATION_TYPES: &[&str] = &[
    "int", "float", "double", "long", "char", "bool", "auto", "String", "uint8_t", "uint16_t",
    "uint32_t",
];

/// Generated line → source line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VbLineMap {
    /// Source line of each generated line (index 0 is generated line 1).
    lines: Vec<usize>,
}

impl VbLineMap {
    /// Builds the map from generated text. Lines before the first marker
    /// map to source line 1.
    pub fn from_generated(text: &str) -> Self {
        let mut current = 1;
        let lines = text
            .lines()
            .map(|line| {
                if let Some(source) = marker_line(line) {
                    current = source;
                }
                current
            })
            .collect();
        Self { lines }
    }

    /// Source line for a 1-based generated line. Lines past the end map to
    /// the last known source line.
    pub fn source_line(&self, generated_line: usize) -> usize {
        let index = generated_line.saturating_sub(1);
        self.lines
            .get(index)
            .or_else(|| self.lines.last())
            .copied()
            .unwrap_or(1)
    }

    /// Number of generated lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Source line recorded by a marker line.
fn marker_line(line: &str) -> Option<usize> {
    MARKER.captures(line)?[1].parse().ok()
}

/// Diagnostic severity as printed by GCC and Clang.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    FatalError,
    Error,
    Warning,
    Note,
}

impl Severity {
    const ALL: [Severity; 4] = [
        Severity::FatalError,
        Severity::Error,
        Severity::Warning,
        Severity::Note,
    ];

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|severity| severity.as_str() == label)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::FatalError => "fatal error",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A toolchain diagnostic located in the generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerDiagnostic {
    /// 1-based line in the generated file.
    pub generated_line: usize,
    pub severity: Severity,
    pub message: String,
    /// `file:line` as reported by the toolchain.
    pub origin: String,
    /// The location was inferred rather than reported.
    pub ambiguous: bool,
}

/// A diagnostic expressed against the BASIC source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDiagnostic {
    pub line: usize,
    pub severity: Severity,
    pub message: String,
    pub ambiguous: bool,
}

impl CompilerDiagnostic {
    /// Maps the diagnostic onto the source line that produced its code.
    pub fn to_source(&self, map: &VbLineMap) -> SourceDiagnostic {
        SourceDiagnostic {
            line: map.source_line(self.generated_line),
            severity: self.severity,
            message: self.message.clone(),
            ambiguous: self.ambiguous,
        }
    }
}

impl fmt::Display for SourceDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.severity, self.message)?;
        if self.ambiguous {
            write!(f, " (approximate location)")?;
        }
        Ok(())
    }
}

/// A `file:line[:col]: severity: message` line.
struct Located<'a> {
    file: &'a str,
    line: usize,
    severity: Severity,
    message: &'a str,
}

/// Parses toolchain stderr, keeping diagnostics about `main_file`.
///
/// Diagnostics reported in other files are kept only when they name a
/// redeclaration that can be found in `generated`; they are then attached
/// to the declaration and flagged ambiguous.
pub fn parse_compiler_output(stderr: &str, main_file: &str, generated: &str) -> Vec<CompilerDiagnostic> {
    let mut diagnostics = Vec::new();
    let mut last: Option<(String, usize)> = None;

    for line in stderr.lines() {
        if let Some(located) = parse_located(line) {
            let origin = format!("{}:{}", located.file, located.line);
            if located.file.ends_with(main_file) {
                diagnostics.push(CompilerDiagnostic {
                    generated_line: located.line,
                    severity: located.severity,
                    message: located.message.to_string(),
                    origin,
                    ambiguous: false,
                });
            } else if let Some(diagnostic) =
                relocate(located.severity, located.message, &origin, generated)
            {
                diagnostics.push(diagnostic);
            } else {
                log::debug!("skipping diagnostic outside {}: {}", main_file, line);
            }
            last = Some((located.file.to_string(), located.line));
            continue;
        }

        let Some((severity, message)) = parse_continuation(line) else {
            continue;
        };
        let Some((file, number)) = &last else {
            continue;
        };
        let origin = format!("{}:{}", file, number);
        if file.ends_with(main_file) {
            diagnostics.push(CompilerDiagnostic {
                generated_line: *number,
                severity,
                message: message.to_string(),
                origin,
                ambiguous: false,
            });
        } else if let Some(diagnostic) = relocate(severity, message, &origin, generated) {
            diagnostics.push(diagnostic);
        }
    }

    diagnostics
}

fn parse_located(line: &str) -> Option<Located<'_>> {
    let captures = LOCATED.captures(line)?;
    Some(Located {
        file: captures.name("file")?.as_str(),
        line: captures["line"].parse().ok()?,
        severity: Severity::from_label(&captures["severity"])?,
        message: captures.name("message")?.as_str(),
    })
}

/// `error: message` on a line of its own.
fn parse_continuation(line: &str) -> Option<(Severity, &str)> {
    let captures = CONTINUATION.captures(line)?;
    Some((
        Severity::from_label(&captures["severity"])?,
        captures.name("message")?.as_str(),
    ))
}

/// Attaches a `redeclaration of 'x'` diagnostic to the declaration of `x`
/// in the generated text.
fn relocate(severity: Severity, message: &str, origin: &str, generated: &str) -> Option<CompilerDiagnostic> {
    let name = REDECLARATION.captures(message)?.name("name")?.as_str();
    let declaration = Regex::new(&format!(
        r"\b(?:{})\b[\s*&]+{}\b",
        DECLARATION_TYPES.join("|"),
        regex::escape(name)
    ))
    .ok()?;
    let generated_line = generated
        .lines()
        .position(|line| {
            let code = line.split("//").next().unwrap_or_default();
            declaration.is_match(code)
        })?
        + 1;
    Some(CompilerDiagnostic {
        generated_line,
        severity,
        message: message.to_string(),
        origin: origin.to_string(),
        ambiguous: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_map() {
        let text = "#include <Arduino.h>\n    // __VB_LINE__:3 // L0002\n    delay(1); // L0003\n    // __VB_LINE__:7\n    x = 1;\n";
        let map = VbLineMap::from_generated(text);
        assert_eq!(map.len(), 5);
        assert_eq!(map.source_line(1), 1);
        assert_eq!(map.source_line(3), 3);
        assert_eq!(map.source_line(5), 7);
        assert_eq!(map.source_line(99), 7);
        assert_eq!(map.source_line(0), 1);
    }

    #[test]
    fn test_empty_map() {
        assert_eq!(VbLineMap::default().source_line(4), 1);
    }

    #[test]
    fn test_located_with_column() {
        let located = parse_located("/tmp/x/main.cpp:42:7: error: expected ';'").unwrap();
        assert_eq!(located.file, "/tmp/x/main.cpp");
        assert_eq!(located.line, 42);
        assert_eq!(located.severity, Severity::Error);
        assert_eq!(located.message, "expected ';'");
    }

    #[test]
    fn test_located_without_column() {
        let located = parse_located("main.cpp:9: warning: unused variable 'x'").unwrap();
        assert_eq!(located.file, "main.cpp");
        assert_eq!(located.line, 9);
        assert_eq!(located.severity, Severity::Warning);
    }

    #[test]
    fn test_located_windows_path() {
        let located = parse_located(r"C:\build\sketch\main.cpp:12:3: error: 'x' was not declared").unwrap();
        assert_eq!(located.file, r"C:\build\sketch\main.cpp");
        assert_eq!(located.line, 12);
    }

    #[test]
    fn test_fatal_error() {
        let located = parse_located("main.cpp:1:10: fatal error: Foo.h: No such file").unwrap();
        assert_eq!(located.severity, Severity::FatalError);
        assert_eq!(located.message, "Foo.h: No such file");
    }

    #[test]
    fn test_other_files_ignored() {
        let stderr = "In file included from main.cpp:1:\n/lib/Wire.h:20:3: error: boom";
        assert!(parse_compiler_output(stderr, "main.cpp", "").is_empty());
    }

    #[test]
    fn test_redeclaration_relocated() {
        let mut generated: Vec<String> = (1..=8).map(|i| format!("// line {}", i)).collect();
        generated.push("int t = 0;".to_string());
        generated.extend((11..40).map(|i| format!("// line {}", i)));
        let generated = generated.join("\n");

        let diagnostics =
            parse_compiler_output("other.c:5: error: redeclaration of 't'\n", "main.cpp", &generated);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.generated_line, 9);
        assert!(diagnostic.ambiguous);
        assert_eq!(diagnostic.origin, "other.c:5");
        assert!(diagnostic.message.contains("redeclaration of"));
    }

    #[test]
    fn test_continuation_line() {
        let stderr = "main.cpp:14:1: note: in expansion\nerror: expected primary-expression";
        let diagnostics = parse_compiler_output(stderr, "main.cpp", "");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[1].generated_line, 14);
        assert_eq!(diagnostics[1].severity, Severity::Error);
    }

    #[test]
    fn test_to_source() {
        let map = VbLineMap::from_generated("a\n// __VB_LINE__:5\nb\n");
        let diagnostic = CompilerDiagnostic {
            generated_line: 3,
            severity: Severity::Error,
            message: "oops".to_string(),
            origin: "main.cpp:3".to_string(),
            ambiguous: false,
        };
        let source = diagnostic.to_source(&map);
        assert_eq!(source.line, 5);
        assert_eq!(source.to_string(), "5:error: oops");
    }
}
