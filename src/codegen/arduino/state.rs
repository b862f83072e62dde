//! Translation state and scope routing.
//!
//! One [`TranspilerState`] is created per translation. It owns the output
//! buffers (globals, `setup()`, `loop()` and one buffer per procedure), the
//! block stack, and the symbol facts the expression rewriter needs.
//!
//! Every statement that produces output is preceded, in each buffer it
//! writes to, by a `// __VB_LINE__:N` marker carrying its source line.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::TranspileOptions;

use super::graphics::GraphicsLib;

/// Marker comment prefix tying generated lines to source lines.
pub const LINE_MARKER: &str = "// __VB_LINE__:";

/// Names that are always calls, never array indexes.
const CALL_NAMES: &[&str] = &[
    "digitalread", "analogread", "millis", "micros", "serial", "pinmode", "digitalwrite",
    "analogwrite", "delay", "min", "max", "abs", "constrain", "map", "begin", "print",
    "println", "read", "write", "available", "setup", "loop", "atoi", "atol", "atof",
    "byte", "bool", "sqrt", "round", "trunc", "log", "exp", "atan", "randomseed", "random",
    "string", "ubound", "lbound",
];

/// Emission context: which buffer statements are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Context {
    Global,
    Setup,
    Loop,
    Function,
}

/// An open block on the block stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BlockKind {
    If,
    For,
    While,
    /// `pre_tested` for `Do While`/`Do Until`, which close with a plain `}`.
    Do { pre_tested: bool },
    /// `in_case` once a case label has been emitted.
    Select { in_case: bool },
    Record,
    Enum,
}

impl BlockKind {
    fn same_kind(&self, other: &BlockKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A generated procedure.
#[derive(Debug, Clone)]
pub(super) struct FunctionBody {
    /// Forward declaration (`void blink(int times);`).
    pub signature: String,
    pub lines: Vec<String>,
    /// Index of the first body line, after the header.
    body_start: usize,
    /// Names assigned without a declaration, declared as `float` on close.
    hoisted: Vec<String>,
}

/// Scope state set aside while an `Every` body is translated.
pub(super) struct Suspended {
    context: Context,
    blocks: Vec<BlockKind>,
    function: Option<FunctionBody>,
    local_names: HashSet<String>,
}

/// Mutable state of one translation.
pub(super) struct TranspilerState {
    pub(super) options: TranspileOptions,
    pub(super) globals: Vec<String>,
    pub(super) setup: Vec<String>,
    pub(super) loop_body: Vec<String>,
    pub(super) functions: Vec<FunctionBody>,
    pub(super) signatures: Vec<String>,
    pub(super) includes: BTreeSet<String>,
    /// Identifiers whose member access is written `->`.
    pub(super) pointer_vars: HashSet<String>,
    /// Declared upper bounds per array (lowercase name).
    pub(super) array_bounds: HashMap<String, Vec<String>>,
    pub(super) option_base: u32,
    pub(super) graphics: Option<GraphicsLib>,
    /// A graphics command or sprite was emitted.
    pub(super) graphics_used: bool,
    pub(super) sprites: HashSet<String>,
    blocks: Vec<BlockKind>,
    context: Context,
    function: Option<FunctionBody>,
    global_names: HashSet<String>,
    local_names: HashSet<String>,
    call_names: HashSet<String>,
    every_count: usize,
    /// Source line of the statement being emitted.
    line: usize,
    /// Buffers that already carry the current statement's marker.
    marked: Vec<Context>,
    /// When set, emitted text is collected here instead (single-line `If`).
    capture: Option<Vec<String>>,
}

impl TranspilerState {
    pub(super) fn new(options: &TranspileOptions) -> Self {
        let call_names = CALL_NAMES
            .iter()
            .map(|name| name.to_string())
            .chain(options.call_names.iter().map(|name| name.to_ascii_lowercase()))
            .collect();

        Self {
            options: options.clone(),
            globals: Vec::new(),
            setup: Vec::new(),
            loop_body: Vec::new(),
            functions: Vec::new(),
            signatures: Vec::new(),
            includes: BTreeSet::new(),
            pointer_vars: HashSet::new(),
            array_bounds: HashMap::new(),
            option_base: 0,
            graphics: None,
            graphics_used: false,
            sprites: HashSet::new(),
            blocks: Vec::new(),
            context: Context::Global,
            function: None,
            global_names: HashSet::new(),
            local_names: HashSet::new(),
            call_names,
            every_count: 0,
            line: 0,
            marked: Vec::new(),
            capture: None,
        }
    }

    pub(super) fn context(&self) -> Context {
        self.context
    }

    // ==================== Emission ====================

    /// Starts a new source statement: the next write to each buffer gets
    /// a fresh marker.
    pub(super) fn begin_statement(&mut self, line: usize) {
        self.line = line;
        self.marked.clear();
    }

    pub(super) fn line(&self) -> usize {
        self.line
    }

    /// Appends `text` at `depth` to `buffer`, preceded by the statement
    /// marker the first time the statement writes there.
    fn push(&mut self, buffer: Context, depth: usize, text: &str) {
        if let Some(captured) = self.capture.as_mut() {
            captured.push(text.trim().to_string());
            return;
        }

        let indent = "    ".repeat(depth);
        let needs_marker = !self.marked.contains(&buffer);
        if needs_marker {
            self.marked.push(buffer);
        }
        let marker = format!("{}{}{}", indent, LINE_MARKER, self.line);

        let lines = match buffer {
            Context::Global => &mut self.globals,
            Context::Setup => &mut self.setup,
            Context::Loop => &mut self.loop_body,
            Context::Function => match self.function.as_mut() {
                Some(function) => &mut function.lines,
                None => &mut self.globals,
            },
        };
        if needs_marker {
            lines.push(marker);
        }
        lines.push(format!("{}{}", indent, text));
    }

    /// Nesting depth of the current buffer.
    fn depth(&self) -> usize {
        let base = match self.context {
            Context::Global => 0,
            _ => 1,
        };
        base + self.blocks.len()
    }

    /// Emits one line into the current context.
    pub(super) fn emit(&mut self, text: &str) {
        self.push(self.context, self.depth(), text);
    }

    /// Emits one line a level out (`} else {`, case labels).
    pub(super) fn emit_outdented(&mut self, text: &str) {
        self.push(self.context, self.depth().saturating_sub(1), text);
    }

    /// Emits a global declaration regardless of the current context.
    pub(super) fn emit_global(&mut self, text: &str) {
        self.push(Context::Global, 0, text);
    }

    /// Appends a line to the body of `setup()`.
    pub(super) fn emit_setup(&mut self, text: &str) {
        self.push(Context::Setup, 1, text);
    }

    /// Appends a line to the body of `loop()`, `extra` levels deep.
    pub(super) fn emit_loop(&mut self, extra: usize, text: &str) {
        self.push(Context::Loop, 1 + extra, text);
    }

    /// Runs `emit` with output collected into a single line of text.
    pub(super) fn captured(&mut self, emit: impl FnOnce(&mut Self)) -> String {
        let outer = self.capture.replace(Vec::new());
        emit(self);
        let captured = std::mem::replace(&mut self.capture, outer).unwrap_or_default();
        captured.join(" ")
    }

    // ==================== Block Stack ====================

    pub(super) fn open(&mut self, block: BlockKind) {
        self.blocks.push(block);
    }

    /// Pops the top block if it is of the same kind as `block`.
    pub(super) fn close(&mut self, block: BlockKind) -> Option<BlockKind> {
        match self.blocks.last() {
            Some(top) if top.same_kind(&block) => self.blocks.pop(),
            top => {
                log::debug!(
                    "line {}: closing {:?} but top of block stack is {:?}",
                    self.line,
                    block,
                    top
                );
                None
            }
        }
    }

    pub(super) fn top_block_mut(&mut self) -> Option<&mut BlockKind> {
        self.blocks.last_mut()
    }

    fn check_balanced(&mut self, what: &str) {
        if !self.blocks.is_empty() {
            log::warn!(
                "line {}: {} closes with {} unclosed block(s): {:?}",
                self.line,
                what,
                self.blocks.len(),
                self.blocks
            );
            self.blocks.clear();
        }
    }

    // ==================== Scopes ====================

    /// Switches to `setup()` or `loop()`.
    pub(super) fn enter_routine(&mut self, context: Context) {
        self.leave_scope("next procedure");
        self.context = context;
        self.local_names.clear();
    }

    /// Opens a user procedure with its C++ header and forward declaration.
    pub(super) fn enter_function(&mut self, signature: String, header: String) {
        self.leave_scope("next procedure");
        self.context = Context::Function;
        self.local_names.clear();
        self.function = Some(FunctionBody {
            signature,
            lines: Vec::new(),
            body_start: 0,
            hoisted: Vec::new(),
        });
        self.push(Context::Function, 0, &header);
        if let Some(function) = self.function.as_mut() {
            function.body_start = function.lines.len();
        }
    }

    /// Declares an assigned but undeclared procedure local at the top of
    /// the procedure body.
    pub(super) fn hoist(&mut self, name: &str) {
        if self.context != Context::Function || self.is_declared(name) {
            return;
        }
        self.declare_name(name);
        if let Some(function) = self.function.as_mut() {
            log::debug!("line {}: hoisting {} as float", self.line, name);
            function.hoisted.push(name.to_string());
        }
    }

    /// Closes the current procedure.
    pub(super) fn end_procedure(&mut self) {
        match self.context {
            Context::Global => {
                log::warn!("line {}: End without an open procedure", self.line);
            }
            Context::Setup | Context::Loop => {
                self.check_balanced("End Sub");
                self.context = Context::Global;
            }
            Context::Function => {
                self.check_balanced("End");
                self.push(Context::Function, 0, "}");
                self.finish_function();
                self.context = Context::Global;
            }
        }
    }

    /// Closes whatever scope is still open, e.g. at the end of input.
    pub(super) fn leave_scope(&mut self, reason: &str) {
        if self.context == Context::Global {
            return;
        }
        log::warn!("line {}: procedure not closed before {}", self.line, reason);
        self.end_procedure();
    }

    /// Closes everything still open at the end of input.
    pub(super) fn finish(&mut self) {
        self.leave_scope("end of input");
        self.check_balanced("end of input");
    }

    fn finish_function(&mut self) {
        let Some(mut function) = self.function.take() else {
            return;
        };
        let hoisted: Vec<String> = function
            .hoisted
            .iter()
            .map(|name| format!("    float {} = 0;", name))
            .collect();
        let at = function.body_start.min(function.lines.len());
        function.lines.splice(at..at, hoisted);

        if self.functions.iter().any(|f| f.signature == function.signature) {
            log::debug!("redefinition of {}: last body wins", function.signature);
            self.functions.retain(|f| f.signature != function.signature);
        }
        if !self.signatures.contains(&function.signature) {
            self.signatures.push(function.signature.clone());
        }
        self.functions.push(function);
    }

    /// Sets the current scope aside (for an `Every` body).
    pub(super) fn suspend(&mut self) -> Suspended {
        Suspended {
            context: std::mem::replace(&mut self.context, Context::Global),
            blocks: std::mem::take(&mut self.blocks),
            function: self.function.take(),
            local_names: std::mem::take(&mut self.local_names),
        }
    }

    pub(super) fn resume(&mut self, suspended: Suspended) {
        self.leave_scope("end of Every block");
        self.context = suspended.context;
        self.blocks = suspended.blocks;
        self.function = suspended.function;
        self.local_names = suspended.local_names;
    }

    pub(super) fn next_every_id(&mut self) -> usize {
        self.every_count += 1;
        self.every_count
    }

    // ==================== Symbols ====================

    /// Records a declared name in the current scope. Returns false if it
    /// was already declared there.
    pub(super) fn declare_name(&mut self, name: &str) -> bool {
        let key = name.to_ascii_lowercase();
        match self.context {
            Context::Global => self.global_names.insert(key),
            _ => self.local_names.insert(key),
        }
    }

    /// Records a name at global scope, whatever the current context.
    pub(super) fn declare_global(&mut self, name: &str) -> bool {
        self.global_names.insert(name.to_ascii_lowercase())
    }

    pub(super) fn is_global(&self, name: &str) -> bool {
        self.global_names.contains(&name.to_ascii_lowercase())
    }

    /// True if `name` is visible in the current scope.
    pub(super) fn is_declared(&self, name: &str) -> bool {
        let key = name.to_ascii_lowercase();
        self.local_names.contains(&key) || self.global_names.contains(&key)
    }

    pub(super) fn register_pointer(&mut self, name: &str) {
        self.pointer_vars.insert(name.to_string());
    }

    pub(super) fn is_pointer(&self, name: &str) -> bool {
        self.pointer_vars.contains(name)
    }

    /// True if `name(args)` is a call rather than an array index.
    pub(super) fn is_call_name(&self, lowercase_name: &str) -> bool {
        self.call_names.contains(lowercase_name)
    }

    /// The display library graphics commands target.
    pub(super) fn graphics_lib(&self) -> GraphicsLib {
        self.graphics.unwrap_or(GraphicsLib::TftEspi)
    }

    /// True if the unit needs the global `tft` object.
    pub(super) fn uses_tft(&self) -> bool {
        match self.graphics {
            Some(lib) => lib == GraphicsLib::TftEspi,
            None => self.graphics_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TranspilerState {
        TranspilerState::new(&TranspileOptions::default())
    }

    #[test]
    fn test_marker_once_per_buffer() {
        let mut state = state();
        state.begin_statement(4);
        state.emit_global("int a = 0;");
        state.emit_global("int b = 0;");
        assert_eq!(
            state.globals,
            vec!["// __VB_LINE__:4", "int a = 0;", "int b = 0;"]
        );
    }

    #[test]
    fn test_indentation_follows_blocks() {
        let mut state = state();
        state.enter_routine(Context::Loop);
        state.begin_statement(2);
        state.emit("if (x) {");
        state.open(BlockKind::If);
        state.begin_statement(3);
        state.emit("y = 1;");
        state.emit_outdented("} else {");
        assert_eq!(state.loop_body[2], "        // __VB_LINE__:3");
        assert_eq!(state.loop_body[3], "        y = 1;");
        assert_eq!(state.loop_body[4], "    } else {");
    }

    #[test]
    fn test_close_only_matching_block() {
        let mut state = state();
        state.open(BlockKind::For);
        assert_eq!(state.close(BlockKind::If), None);
        assert_eq!(state.close(BlockKind::For), Some(BlockKind::For));
        state.open(BlockKind::Do { pre_tested: true });
        assert_eq!(
            state.close(BlockKind::Do { pre_tested: false }),
            Some(BlockKind::Do { pre_tested: true })
        );
    }

    #[test]
    fn test_function_redefinition_last_wins() {
        let mut state = state();
        for body in ["a();", "b();"] {
            state.enter_function("void f();".to_string(), "void f() {".to_string());
            state.emit(body);
            state.end_procedure();
        }
        assert_eq!(state.functions.len(), 1);
        assert_eq!(state.signatures, vec!["void f();"]);
        assert!(state.functions[0].lines.iter().any(|l| l.contains("b();")));
    }

    #[test]
    fn test_scoped_names() {
        let mut state = state();
        assert!(state.declare_name("count"));
        assert!(!state.declare_name("Count"));
        state.enter_routine(Context::Setup);
        assert!(state.is_global("COUNT"));
        assert!(state.declare_name("i"));
        state.enter_routine(Context::Loop);
        assert!(state.declare_name("i"));
    }

    #[test]
    fn test_capture() {
        let mut state = state();
        let text = state.captured(|s| s.emit("x = 0;"));
        assert_eq!(text, "x = 0;");
        assert!(state.globals.is_empty());
    }

    #[test]
    fn test_call_names_include_options() {
        let options = TranspileOptions {
            call_names: vec!["ReadSensor".to_string()],
            ..TranspileOptions::default()
        };
        let state = TranspilerState::new(&options);
        assert!(state.is_call_name("readsensor"));
        assert!(state.is_call_name("digitalread"));
        assert!(!state.is_call_name("arr"));
    }
}
