//! # vb2arduino
//!
//! A transpiler from a VB6-flavoured BASIC dialect to Arduino C++.
//!
//! ## Architecture
//!
//! Translation is a single pass over logical lines:
//!
//! ```text
//! Source (.vb) → Logical lines → Lexer → Parser → Statements → Arduino backend → C++
//! ```
//!
//! Each phase is implemented as a separate module:
//!
//! - [`lexer`] - Joins continuation lines, strips comments and tokenizes each line
//! - [`parser`] - Classifies each logical line into a [`ast::StatementKind`]
//! - [`ast`] - Statement and declaration type definitions
//! - [`codegen`] - The [`codegen::CodeGenerator`] trait and the Arduino backend
//! - [`diagnostics`] - Maps toolchain errors back to BASIC source lines
//! - [`lint`] - Source-level linter with quick fixes
//! - [`config`] - Options loaded from TOML
//!
//! Translation never fails on bad input: lines that cannot be translated come
//! out as C++ comments, and the C++ toolchain reports the real errors, which
//! [`diagnostics`] maps back to the BASIC source.
//!
//! ## Example
//!
//! ```
//! let source = r#"
//! Const LED = 2
//! Sub Setup()
//!     PinMode LED, OUTPUT
//! End Sub
//! "#;
//!
//! let cpp = vb2arduino::transpile(source);
//! assert!(cpp.contains("pinMode(LED, OUTPUT);"));
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod lexer;
pub mod lint;
pub mod parser;

use codegen::{ArduinoBackend, CodeGenerator};
use config::TranspileOptions;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::ast::{Program, Statement, StatementKind};
    pub use crate::codegen::{ArduinoBackend, CodeGenError, CodeGenerator, GeneratedOutput};
    pub use crate::config::TranspileOptions;
    pub use crate::diagnostics::{VbLineMap, parse_compiler_output};
    pub use crate::lexer::{Lexer, Token, TokenKind};
    pub use crate::parser::{Parser, parse};
}

/// Translates BASIC source into an Arduino C++ translation unit using the
/// default options.
pub fn transpile(source: &str) -> String {
    transpile_with(source, &TranspileOptions::default())
}

/// Translates BASIC source with the given options.
///
/// # Example
///
/// ```
/// use vb2arduino::config::TranspileOptions;
///
/// let options = TranspileOptions {
///     startup_delay_ms: 0,
///     ..TranspileOptions::default()
/// };
/// let cpp = vb2arduino::transpile_with("Delay 10", &options);
/// assert!(cpp.contains("delay(0);"));
/// ```
pub fn transpile_with(source: &str, options: &TranspileOptions) -> String {
    let program = parser::parse(source);
    log::debug!("parsed {} statements", program.statements.len());

    match ArduinoBackend::with_options(options.clone()).generate(&program) {
        Ok(output) => output.code,
        Err(err) => {
            log::error!("{}", err);
            format!("// {}\n", err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pairs each generated statement line with the marker that precedes it.
    fn marked_statements(cpp: &str) -> Vec<(usize, String)> {
        let mut current = None;
        let mut result = Vec::new();
        for line in cpp.lines() {
            let code = match line.rfind(" // L") {
                Some(end) => &line[..end],
                None => line,
            };
            let code = code.trim();
            if let Some(rest) = code.strip_prefix(codegen::LINE_MARKER) {
                current = rest.parse::<usize>().ok();
            } else if let Some(number) = current
                && !code.is_empty()
            {
                result.push((number, code.to_string()));
            }
        }
        result
    }

    const BLINK: &str = "Const LED = 2
Sub Setup()
    PinMode LED, OUTPUT
End Sub
Sub Loop()
    DigitalWrite LED, HIGH
    Delay 1000
    DigitalWrite LED, LOW
    Delay 1000
End Sub
";

    #[test]
    fn test_blink_end_to_end() {
        let cpp = transpile(BLINK);
        assert!(cpp.starts_with("#include <Arduino.h>"));
        assert!(cpp.contains("const auto LED = 2;"));

        let setup = cpp.find("void setup() {").unwrap();
        let loop_start = cpp.find("void loop() {").unwrap();
        let pin_mode = cpp.find("pinMode(LED, OUTPUT);").unwrap();
        assert!(setup < pin_mode && pin_mode < loop_start);

        let body = &cpp[loop_start..];
        let high = body.find("digitalWrite(LED, HIGH);").unwrap();
        let first_delay = body.find("delay(1000);").unwrap();
        let low = body.find("digitalWrite(LED, LOW);").unwrap();
        assert!(high < first_delay && first_delay < low);
    }

    #[test]
    fn test_blink_markers_match_source_lines() {
        let statements = marked_statements(&transpile(BLINK));
        let expect = [
            (1, "const auto LED = 2;"),
            (3, "pinMode(LED, OUTPUT);"),
            (6, "digitalWrite(LED, HIGH);"),
            (7, "delay(1000);"),
            (8, "digitalWrite(LED, LOW);"),
            (9, "delay(1000);"),
        ];
        for (line, code) in expect {
            assert!(
                statements.contains(&(line, code.to_string())),
                "missing {} at line {}: {:?}",
                code,
                line,
                statements
            );
        }
    }

    #[test]
    fn test_array_declaration_and_index() {
        let cpp = transpile("Dim arr(2) As Integer\narr(1) = 5\n");
        assert!(cpp.contains("int arr[3];"));
        assert!(cpp.contains("arr[1] = 5;"));
    }

    #[test]
    fn test_condition_equality() {
        let cpp = transpile("Sub Loop()\n    If x = 1 Then\n        x = 2\n    End If\nEnd Sub\n");
        assert!(cpp.contains("if (x == 1) {"));
        assert!(cpp.contains("x = 2;"));
        assert!(!cpp.contains("x == 2"));
    }

    #[test]
    fn test_pointer_member_access() {
        let cpp = transpile("Sub Setup()\n    Dim p As BLEServer*\n    p.start()\nEnd Sub\n");
        assert!(cpp.contains("BLEServer* p = nullptr;"));
        assert!(cpp.contains("p->start();"));
    }

    #[test]
    fn test_repeated_dim_declared_once() {
        let cpp = transpile(
            "Sub Tick()\n    Dim n As Integer\n    Dim n As Integer\n    n = 1\nEnd Sub\n",
        );
        assert_eq!(cpp.matches("int n = 0;").count(), 1);
    }

    #[test]
    fn test_nested_if_braces_balance() {
        let cpp = transpile(
            "Sub Loop()\n    If a Then\n        If b Then\n            c = 1\n        End If\n    End If\nEnd Sub\n",
        );
        assert_eq!(cpp.matches('{').count(), cpp.matches('}').count());
        assert_eq!(cpp.matches("if (").count(), 2);
    }

    #[test]
    fn test_for_bound_kept_and_step() {
        let cpp = transpile(
            "Sub Loop()\n    For i = 0 To n * 2 - 1\n    Next i\n    For j = 10 To 0 Step -2\n    Next\nEnd Sub\n",
        );
        assert!(cpp.contains("i <= n * 2 - 1; i += 1"));
        assert!(cpp.contains("j >= 0; j += -2"));
    }

    #[test]
    fn test_garbage_never_fails() {
        let cpp = transpile("End If\n@@@ ???\nNext\nFunction (\n");
        assert!(cpp.contains("void setup() {"));
        assert!(cpp.contains("void loop() {"));
    }

    #[test]
    fn test_label_and_goto() {
        let statements = marked_statements(&transpile(
            "Sub Loop()\ntop:\n    If done Then GoTo finish\n    GoTo top\nfinish:\nEnd Sub\n",
        ));
        assert!(statements.contains(&(2, "top:".to_string())));
        assert!(
            statements
                .iter()
                .any(|(line, code)| *line == 3 && code.starts_with("if (done)") && code.contains("goto finish;"))
        );
        assert!(statements.contains(&(4, "goto top;".to_string())));
        assert!(statements.contains(&(5, "finish:".to_string())));
    }

    #[test]
    fn test_static_local() {
        let cpp = transpile(
            "Sub Tick()\n    Static calls As Long\n    Static name As String\n    calls = calls + 1\nEnd Sub\n",
        );
        assert!(cpp.contains("static long calls = 0;"));
        assert!(cpp.contains("static String name = \"\";"));
        assert!(!cpp.contains("float calls"));
    }

    #[test]
    fn test_loop_static_shadows_global() {
        let cpp = transpile(
            "Dim count As Integer\nSub Loop()\n    Static count As Integer\n    count = count + 1\nEnd Sub\n",
        );
        let loop_start = cpp.find("void loop() {").unwrap();
        assert!(cpp[..loop_start].contains("int count = 0;"));
        assert!(cpp[loop_start..].contains("static int count = 0;"));
    }

    #[test]
    fn test_every_at_global_scope() {
        let cpp = transpile("Every 1000 Do\n    Blink\nEnd Do\n");
        assert!(cpp.contains("unsigned long _every_last_1 = 0;"));
        assert!(cpp.contains("void _every_task_1();"));
        assert!(cpp.contains("void _every_task_1() {"));
        let loop_start = cpp.find("void loop() {").unwrap();
        let body = &cpp[loop_start..];
        assert!(body.contains("if (millis() - _every_last_1 >= 1000) {"));
        assert!(body.contains("_every_task_1();"));
    }

    #[test]
    fn test_every_inside_loop() {
        let cpp = transpile(
            "Sub Loop()\n    Every 250 Do\n        Toggle\n    End Do\n    Every 500 Do\n        Report\n    End Do\nEnd Sub\n",
        );
        let loop_start = cpp.find("void loop() {").unwrap();
        let body = &cpp[loop_start..];
        assert!(body.contains("if (millis() - _every_last_1 >= 250) {"));
        assert!(body.contains("if (millis() - _every_last_2 >= 500) {"));
        let task = cpp.find("void _every_task_2() {").unwrap();
        assert!(cpp[task..].contains("Report();"));
        assert_eq!(cpp.matches('{').count(), cpp.matches('}').count());
    }

    #[test]
    fn test_continuation_maps_to_first_line() {
        let source = "Sub Setup()\n    DigitalWrite LED, _\n        HIGH\n    Delay 10\nEnd Sub\n";
        let cpp = transpile(source);
        let statements = marked_statements(&cpp);
        assert!(statements.contains(&(2, "digitalWrite(LED, HIGH);".to_string())), "{:?}", statements);
        assert!(statements.contains(&(4, "delay(10);".to_string())));

        let map = diagnostics::VbLineMap::from_generated(&cpp);
        let generated = cpp
            .lines()
            .position(|line| line.contains("digitalWrite(LED, HIGH);"))
            .map(|index| index + 1)
            .unwrap();
        assert_eq!(map.source_line(generated), 2);
        let delay = cpp.lines().position(|line| line.contains("delay(10);")).unwrap() + 1;
        assert_eq!(map.source_line(delay), 4);
    }

    #[test]
    fn test_member_array_assignment() {
        let cpp = transpile("Sub Loop()\n    player.scores(1) = 5\nEnd Sub\n");
        assert!(cpp.contains("player.scores[1] = 5;"));
    }

    #[test]
    fn test_huge_literals_do_not_panic() {
        let cpp = transpile(
            "Dim big(18446744073709551615) As Byte\nSub Loop()\n    Select Case n\n        Case -9000000000000000000 To 9000000000000000000\n            x = 1\n    End Select\nEnd Sub\n",
        );
        assert!(cpp.contains("uint8_t big[18446744073709551615 + 1];"));
        assert!(cpp.contains("case -9000000000000000000 ... 9000000000000000000:"));
    }

    #[test]
    fn test_fresh_state_per_call() {
        let first = transpile("Dim x As Integer");
        let second = transpile("Dim x As Integer");
        assert_eq!(first, second);
    }
}
