//! Arduino C++ backend.
//!
//! Translation is a single pass over the statements of a [`Program`]. A
//! fresh [`TranspilerState`] routes each statement to the global scope,
//! `setup()`, `loop()` or a procedure body, and the renderer assembles the
//! buffers into one translation unit.
//!
//! # Module Structure
//!
//! - [`state`] - output buffers, block stack and scope routing
//! - [`types`] - BASIC-to-C++ type mapping
//! - [`decl`] - declarations and procedure signatures
//! - [`expr`] - expression rewriting
//! - [`stmt`] - statement emission
//! - [`graphics`] - display libraries, colours and sprites
//! - [`render`] - translation unit layout and line numbering

mod decl;
mod expr;
mod graphics;
mod render;
mod state;
mod stmt;
mod types;

pub use graphics::GraphicsLib;
pub use state::LINE_MARKER;

use crate::ast::Program;
use crate::codegen::error::CodeGenError;
use crate::codegen::{CodeGenerator, GeneratedOutput};
use crate::config::TranspileOptions;

use self::state::TranspilerState;

/// Arduino C++ backend.
///
/// # Example
///
/// ```
/// use vb2arduino::codegen::{ArduinoBackend, CodeGenerator};
/// use vb2arduino::parser::parse;
///
/// let program = parse("Sub Setup()\n    PinMode 2, OUTPUT\nEnd Sub");
/// let output = ArduinoBackend::new().generate(&program).unwrap();
/// assert!(output.code.contains("pinMode(2, OUTPUT);"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArduinoBackend {
    options: TranspileOptions,
}

impl ArduinoBackend {
    /// Creates a backend with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with the given options.
    pub fn with_options(options: TranspileOptions) -> Self {
        Self { options }
    }
}

impl CodeGenerator for ArduinoBackend {
    fn generate(&self, program: &Program) -> Result<GeneratedOutput, CodeGenError> {
        let mut state = TranspilerState::new(&self.options);
        for statement in &program.statements {
            state.emit_statement(statement);
        }
        state.finish();

        let code = state
            .render()
            .map_err(|_| CodeGenError::render("formatting the translation unit failed"))?;
        Ok(GeneratedOutput::cpp(code))
    }

    fn backend_name(&self) -> &str {
        "Arduino"
    }
}
