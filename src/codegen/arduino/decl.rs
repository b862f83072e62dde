//! Declaration mapping: variables, constants, array literals, records,
//! enums and procedure signatures.

use crate::ast::{ArrayLiteral, Declaration, Expr, Parameter, ProcedureHeader, ProcedureKind, TypeRef};

use super::state::{BlockKind, Context, TranspilerState};
use super::types::{cpp_type, default_init, dimension_size, is_object_type};

impl TranspilerState {
    /// Emits a `Dim` (or `Static`) line, one C++ declaration per variable.
    ///
    /// Names already declared in the current scope are skipped, as are
    /// `setup()`/`loop()` `Dim`s of a global name. A `Static` there shadows
    /// the global.
    pub(super) fn emit_dim(&mut self, declarations: &[Declaration], is_static: bool) {
        for declaration in declarations {
            let name = declaration.name.as_str();
            if matches!(self.context(), Context::Setup | Context::Loop) && self.is_global(name) {
                if !is_static {
                    log::debug!("line {}: {} reuses the global declaration", self.line(), name);
                    continue;
                }
                log::warn!("line {}: Static {} shadows a global", self.line(), name);
            }
            if !self.declare_name(name) {
                log::debug!("line {}: duplicate declaration of {} skipped", self.line(), name);
                continue;
            }

            let text = self.declaration(declaration);
            if is_static {
                self.emit(&format!("static {}", text));
            } else {
                self.emit(&text);
            }
        }
    }

    /// C++ declaration statement for one variable.
    fn declaration(&mut self, declaration: &Declaration) -> String {
        let name = declaration.name.as_str();
        let type_ref = declaration.type_ref.as_ref();
        let ty = cpp_type(type_ref.map(|t| t.name.as_str()));

        if declaration.is_array() {
            let bounds: Vec<String> = declaration.dimensions.iter().map(|d| self.value(d)).collect();
            let sizes: String = bounds
                .iter()
                .map(|bound| format!("[{}]", dimension_size(bound)))
                .collect();
            self.array_bounds.insert(name.to_ascii_lowercase(), bounds);
            let pointer = if type_ref.is_some_and(|t| t.pointer) { "*" } else { "" };
            return format!("{}{} {}{};", ty, pointer, name, sizes);
        }

        let initializer = declaration.initializer.as_ref().map(|value| self.value(value));

        let as_pointer = match type_ref {
            Some(t) if t.pointer => true,
            Some(t) if !declaration.new_object && is_object_type(&t.name) => {
                self.options.is_pointer_type(&t.name)
            }
            _ => false,
        };
        if as_pointer {
            self.register_pointer(name);
            let value = initializer.unwrap_or_else(|| "nullptr".to_string());
            return format!("{}* {} = {};", ty, name, value);
        }

        if type_ref.is_some_and(|t| is_object_type(&t.name)) {
            return match initializer {
                Some(value) => format!("{} {} = {};", ty, name, value),
                None => format!("{} {};", ty, name),
            };
        }

        let value = initializer.unwrap_or_else(|| default_init(&ty).to_string());
        format!("{} {} = {};", ty, name, value)
    }

    /// `Const name = value`, always at global scope.
    pub(super) fn emit_const(&mut self, name: &str, value: &Expr) {
        if !self.declare_global(name) {
            log::debug!("line {}: duplicate constant {} skipped", self.line(), name);
            return;
        }
        let text = if value.is_string_literal() {
            format!("const char* {} = {};", name, value.as_str())
        } else {
            format!("const auto {} = {};", name, self.value(value))
        };
        self.emit_global(&text);
    }

    /// `Const name() As T = {...}` globally, `Dim name() As T = {...}` in place.
    pub(super) fn emit_array_literal(&mut self, literal: &ArrayLiteral) {
        let name = literal.name.as_str();
        let fresh = if literal.constant {
            self.declare_global(name)
        } else {
            self.declare_name(name)
        };
        if !fresh {
            log::debug!("line {}: duplicate array {} skipped", self.line(), name);
            return;
        }

        let elements: Vec<String> = literal.elements.iter().map(|e| self.value(e)).collect();
        let upper = elements.len().saturating_sub(1).to_string();
        self.array_bounds.insert(name.to_ascii_lowercase(), vec![upper]);

        let ty = element_type(&literal.type_ref);
        let text = format!("{} {}[] = {{{}}};", ty, name, elements.join(", "));
        if literal.constant {
            self.emit_global(&format!("const {}", text));
        } else {
            self.emit(&text);
        }
    }

    pub(super) fn emit_type_start(&mut self, name: &str) {
        self.emit(&format!("struct {} {{", name));
        self.open(BlockKind::Record);
    }

    /// A `Type` field: declared without initializer.
    pub(super) fn emit_type_field(&mut self, field: &Declaration) {
        let ty = match &field.type_ref {
            Some(t) => element_type(t),
            None => cpp_type(None),
        };
        let sizes: String = field
            .dimensions
            .iter()
            .map(|d| format!("[{}]", dimension_size(&self.value(d))))
            .collect();
        self.emit(&format!("{} {}{};", ty, field.name, sizes));
    }

    pub(super) fn emit_enum_start(&mut self, name: &str) {
        self.emit(&format!("enum {} {{", name));
        self.open(BlockKind::Enum);
    }

    pub(super) fn emit_enum_member(&mut self, name: &str, value: Option<&Expr>) {
        match value {
            Some(value) => {
                let value = self.value(value);
                self.emit(&format!("{} = {},", name, value));
            }
            None => self.emit(&format!("{},", name)),
        }
    }

    /// Closes a `Type` or `Enum` block.
    pub(super) fn emit_record_end(&mut self, block: BlockKind) {
        if self.close(block).is_none() {
            log::warn!("line {}: End Type/End Enum without an open block", self.line());
        }
        self.emit("};");
    }

    /// Opens a user procedure: forward declaration (with defaults) and
    /// definition header (without them).
    pub(super) fn open_procedure(&mut self, header: &ProcedureHeader) {
        let ret = match header.kind {
            ProcedureKind::Sub => "void".to_string(),
            ProcedureKind::Function => match &header.return_type {
                Some(t) => element_type(t),
                None => cpp_type(None),
            },
        };

        let mut declared = Vec::with_capacity(header.params.len());
        let mut defined = Vec::with_capacity(header.params.len());
        for param in &header.params {
            let (text, default) = self.parameter(param);
            defined.push(text.clone());
            declared.push(match default {
                Some(default) => format!("{} = {}", text, default),
                None => text,
            });
        }

        let signature = format!("{} {}({});", ret, header.name, declared.join(", "));
        let definition = format!("{} {}({}) {{", ret, header.name, defined.join(", "));
        self.enter_function(signature, definition);
        self.declare_name(&header.name);
        for param in &header.params {
            self.declare_name(&param.name);
        }
    }

    /// C++ parameter and its default value, if any.
    fn parameter(&mut self, param: &Parameter) -> (String, Option<String>) {
        let type_ref = param.type_ref.as_ref();
        let ty = cpp_type(type_ref.map(|t| t.name.as_str()));

        let text = if type_ref.is_some_and(|t| t.pointer) {
            self.register_pointer(&param.name);
            format!("{}* {}", ty, param.name)
        } else if param.array {
            format!("{} {}[]", ty, param.name)
        } else if param.by_ref {
            format!("{}& {}", ty, param.name)
        } else {
            format!("{} {}", ty, param.name)
        };

        let default = match &param.default {
            Some(value) => Some(self.value(value)),
            None if param.optional => Some(default_init(&ty).to_string()),
            None => None,
        };
        (text, default)
    }
}

/// C++ type of a `TypeRef`, pointer suffix included.
fn element_type(type_ref: &TypeRef) -> String {
    let ty = cpp_type(Some(&type_ref.name));
    if type_ref.pointer { format!("{}*", ty) } else { ty }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranspileOptions;

    fn state() -> TranspilerState {
        TranspilerState::new(&TranspileOptions::default())
    }

    fn dim(name: &str, ty: &str) -> Declaration {
        Declaration::new(name).with_type(TypeRef::new(ty))
    }

    fn code(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.starts_with("// __VB_LINE__"))
            .collect()
    }

    #[test]
    fn test_scalar_defaults() {
        let mut state = state();
        state.emit_dim(
            &[dim("n", "Integer"), dim("ok", "Boolean"), dim("s", "String"), Declaration::new("v")],
            false,
        );
        assert_eq!(
            code(&state.globals),
            vec!["int n = 0;", "bool ok = false;", "String s = \"\";", "int v = 0;"]
        );
    }

    #[test]
    fn test_duplicate_dim_in_procedure() {
        let mut state = state();
        state.open_procedure(&ProcedureHeader {
            kind: ProcedureKind::Sub,
            name: "tick".to_string(),
            params: Vec::new(),
            return_type: None,
        });
        state.emit_dim(&[dim("x", "Integer")], false);
        state.emit_dim(&[dim("x", "Integer")], false);
        state.end_procedure();
        let body = &state.functions[0].lines;
        assert_eq!(body.iter().filter(|l| l.contains("int x = 0;")).count(), 1);
    }

    #[test]
    fn test_loop_reuses_global() {
        let mut state = state();
        state.emit_dim(&[dim("count", "Integer")], false);
        state.enter_routine(Context::Loop);
        state.emit_dim(&[dim("count", "Integer")], false);
        assert!(state.loop_body.is_empty());
    }

    #[test]
    fn test_loop_static_shadows_global() {
        let mut state = state();
        state.emit_dim(&[dim("count", "Integer")], false);
        state.enter_routine(Context::Loop);
        state.emit_dim(&[dim("count", "Integer")], true);
        state.emit_dim(&[dim("count", "Integer")], true);
        assert_eq!(code(&state.loop_body), vec!["static int count = 0;"]);
    }

    #[test]
    fn test_arrays() {
        let mut state = state();
        let grid = dim("grid", "Byte").with_dimensions(vec![Expr::new("3"), Expr::new("ROWS")]);
        state.emit_dim(&[grid], false);
        assert_eq!(code(&state.globals), vec!["uint8_t grid[4][ROWS + 1];"]);
        assert_eq!(state.array_bounds["grid"], vec!["3".to_string(), "ROWS".to_string()]);
    }

    #[test]
    fn test_pointer_types() {
        let mut state = state();
        state.emit_dim(
            &[
                Declaration::new("p").with_type(TypeRef::pointer("BLEServer")),
                dim("svc", "BLEService"),
                dim("prefs", "Preferences"),
            ],
            false,
        );
        assert_eq!(
            code(&state.globals),
            vec![
                "BLEServer* p = nullptr;",
                "BLEService* svc = nullptr;",
                "Preferences prefs;"
            ]
        );
        assert!(state.is_pointer("p"));
        assert!(state.is_pointer("svc"));
        assert!(!state.is_pointer("prefs"));
    }

    #[test]
    fn test_new_object_by_value() {
        let mut state = state();
        let mut server = dim("server", "BLEServer");
        server.new_object = true;
        state.emit_dim(&[server], false);
        assert_eq!(code(&state.globals), vec!["BLEServer server;"]);
    }

    #[test]
    fn test_constants() {
        let mut state = state();
        state.emit_const("LED", &Expr::new("2"));
        state.emit_const("NAME", &Expr::new("\"esp\""));
        state.emit_const("MASK", &Expr::new("&HFF"));
        assert_eq!(
            code(&state.globals),
            vec![
                "const auto LED = 2;",
                "const char* NAME = \"esp\";",
                "const auto MASK = 0xFF;"
            ]
        );
    }

    #[test]
    fn test_const_array_literal() {
        let mut state = state();
        state.emit_array_literal(&ArrayLiteral {
            name: "pins".to_string(),
            type_ref: TypeRef::new("Integer"),
            elements: vec![Expr::new("2"), Expr::new("4"), Expr::new("5")],
            constant: true,
        });
        assert_eq!(code(&state.globals), vec!["const int pins[] = {2, 4, 5};"]);
        assert_eq!(state.array_bounds["pins"], vec!["2".to_string()]);
    }

    #[test]
    fn test_signature_defaults_only_in_forward_declaration() {
        let mut state = state();
        let mut count = Parameter::new("count");
        count.type_ref = Some(TypeRef::new("Integer"));
        count.optional = true;
        let mut total = Parameter::new("total");
        total.type_ref = Some(TypeRef::new("Long"));
        total.by_ref = true;
        state.open_procedure(&ProcedureHeader {
            kind: ProcedureKind::Function,
            name: "Sum".to_string(),
            params: vec![total, count],
            return_type: Some(TypeRef::new("Long")),
        });
        state.end_procedure();
        assert_eq!(state.signatures, vec!["long Sum(long& total, int count = 0);"]);
        assert_eq!(code(&state.functions[0].lines)[0], "long Sum(long& total, int count) {");
    }

    #[test]
    fn test_record_and_enum() {
        let mut state = state();
        state.emit_type_start("Point");
        state.emit_type_field(&dim("x", "Integer"));
        state.emit_record_end(BlockKind::Record);
        state.emit_enum_start("Mode");
        state.emit_enum_member("Idle", Some(&Expr::new("1")));
        state.emit_enum_member("Run", None);
        state.emit_record_end(BlockKind::Enum);
        assert_eq!(
            code(&state.globals),
            vec!["struct Point {", "int x;", "};", "enum Mode {", "Idle = 1,", "Run,", "};"]
        );
    }
}
