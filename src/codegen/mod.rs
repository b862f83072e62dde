//! Code generation module for vb2arduino.
//!
//! This module turns a parsed [`Program`] into target source code. The
//! architecture uses a trait-based backend system, so another board family
//! can be added as another [`CodeGenerator`].
//!
//! # Architecture
//!
//! ```text
//! Program → CodeGenerator → GeneratedOutput
//!                ↑
//!          ArduinoBackend
//! ```
//!
//! # Example
//!
//! ```
//! use vb2arduino::codegen::{ArduinoBackend, CodeGenerator};
//! use vb2arduino::parser::parse;
//!
//! let program = parse("Const LED = 2");
//! let output = ArduinoBackend::new().generate(&program).unwrap();
//! assert_eq!(output.extension, "cpp");
//! assert!(output.code.contains("const auto LED = 2;"));
//! ```

mod arduino;
mod error;

pub use arduino::{ArduinoBackend, GraphicsLib, LINE_MARKER};
pub use error::{CodeGenError, CodeGenErrorKind};

use crate::ast::Program;

/// Output from code generation.
#[derive(Debug)]
pub struct GeneratedOutput {
    /// The generated source code.
    pub code: String,

    /// Human-readable description of the output format.
    pub format: String,

    /// Suggested file extension for the output.
    pub extension: String,
}

impl GeneratedOutput {
    /// Creates a new generated output for Arduino C++ code.
    pub fn cpp(code: String) -> Self {
        Self {
            code,
            format: "Arduino C++".to_string(),
            extension: "cpp".to_string(),
        }
    }
}

/// Trait for code generation backends.
///
/// A backend never fails on unsupported BASIC: such lines are emitted as
/// comments. An `Err` means the backend itself could not produce output.
pub trait CodeGenerator {
    /// Generates code from a parsed program.
    fn generate(&self, program: &Program) -> Result<GeneratedOutput, CodeGenError>;

    /// Returns the name of this backend for diagnostics.
    fn backend_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_output_cpp() {
        let output = GeneratedOutput::cpp("void loop() {}".to_string());
        assert_eq!(output.format, "Arduino C++");
        assert_eq!(output.extension, "cpp");
    }

    #[test]
    fn test_arduino_backend_name() {
        assert_eq!(ArduinoBackend::new().backend_name(), "Arduino");
    }

    #[test]
    fn test_empty_program() {
        let output = ArduinoBackend::new().generate(&Program::default()).unwrap();
        assert!(output.code.contains("void setup() {"));
        assert!(output.code.contains("void loop() {"));
    }
}
