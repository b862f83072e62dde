//! Abstract Syntax Tree (AST) definitions for vb2arduino.
//!
//! The dialect is translated one logical line at a time, so the tree is flat:
//! a [`Program`] is the ordered list of classified lines. Block structure
//! (`If`/`End If`, `Sub`/`End Sub`, ...) is paired later by the code generator
//! through its block stack, which keeps unbalanced or partial programs
//! translatable.
//!
//! # Structure
//!
//! ```text
//! Program
//! └── Vec<Statement>
//!     ├── ProcedureStart(ProcedureHeader)
//!     ├── Dim(Vec<Declaration>)
//!     ├── If(Expr)
//!     ├── Assign { target, value: Expr }
//!     └── ...
//! ```
//!
//! # Design Decisions
//!
//! - **Owned nodes**: nodes own their text, so the tree outlives the source.
//! - **Line numbers, not byte spans**: every statement carries the 1-based
//!   line it came from; that is what the generated line markers record.
//! - **Expressions stay textual**: an [`Expr`] is the verbatim source slice.
//!   Rewriting it into C++ is a token-level substitution done by the backend,
//!   so compound arithmetic such as `BALL_TILES - 1` is preserved exactly.

mod decl;
mod expr;
mod stmt;

pub use decl::*;
pub use expr::*;
pub use stmt::*;

/// A parsed program: the statements of every logical line, in source order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Top-level statements.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Creates a new program with the given statements.
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Returns true if the program has no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
