//! Declaration nodes: variables, arrays, constants and procedure headers.

use super::Expr;

/// A type written after `As`.
///
/// `name` is kept as written (`Integer`, `String`, `BLEServer`, `Point`);
/// the backend decides what it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Type name without the pointer suffix.
    pub name: String,
    /// True when written with a `*` suffix (`BLEServer*`).
    pub pointer: bool,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pointer: false,
        }
    }

    pub fn pointer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pointer: true,
        }
    }
}

/// One variable of a `Dim`, `Static`, `Public`, `Private` or `Global` line,
/// or one field of a `Type` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Variable name.
    pub name: String,
    /// Upper bounds of each array dimension (empty for scalars).
    pub dimensions: Vec<Expr>,
    /// Declared type (if an `As` clause is present).
    pub type_ref: Option<TypeRef>,
    /// `As New Type`: construct the object by value.
    pub new_object: bool,
    /// `= value` initializer.
    pub initializer: Option<Expr>,
}

impl Declaration {
    /// Creates a scalar declaration without type or initializer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: Vec::new(),
            type_ref: None,
            new_object: false,
            initializer: None,
        }
    }

    pub fn with_type(mut self, type_ref: TypeRef) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    pub fn with_dimensions(mut self, dimensions: Vec<Expr>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_initializer(mut self, value: Expr) -> Self {
        self.initializer = Some(value);
        self
    }

    /// Returns true if this declares an array.
    pub fn is_array(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

/// `Const name() As T = {a, b}` or `Dim name() As T = {a, b}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLiteral {
    pub name: String,
    pub type_ref: TypeRef,
    pub elements: Vec<Expr>,
    /// Declared with `Const`.
    pub constant: bool,
}

/// Whether a procedure is a `Sub` or a `Function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Sub,
    Function,
}

/// A procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_ref: Option<TypeRef>,
    /// Declared `ByRef`.
    pub by_ref: bool,
    /// Declared `Optional`.
    pub optional: bool,
    /// `= value` default.
    pub default: Option<Expr>,
    /// Declared with empty parentheses (`values() As Integer`).
    pub array: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: None,
            by_ref: false,
            optional: false,
            default: None,
            array: false,
        }
    }
}

/// `Sub Name(params)` or `Function Name(params) As Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureHeader {
    pub kind: ProcedureKind,
    pub name: String,
    pub params: Vec<Parameter>,
    /// Return type of a `Function` (`None` means `void` for subs).
    pub return_type: Option<TypeRef>,
}

impl ProcedureHeader {
    /// Returns true for the procedure mapped to the Arduino `setup()` routine.
    pub fn is_setup(&self) -> bool {
        self.kind == ProcedureKind::Sub && self.name.eq_ignore_ascii_case("setup")
    }

    /// Returns true for the procedure mapped to the Arduino `loop()` routine.
    pub fn is_loop(&self) -> bool {
        self.kind == ProcedureKind::Sub && self.name.eq_ignore_ascii_case("loop")
    }
}
