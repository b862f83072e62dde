//! Statement emission.
//!
//! Each [`Statement`] is routed to the buffer of the current context and
//! translated in place. Block openers push onto the block stack and their
//! closers pop it; the stack drives indentation and `Case` fall-through.

use crate::ast::{
    CaseValue, Expr, LibraryFunction, LoopCondition, Statement, StatementKind, TimeBuiltin,
};

use super::expr::group;
use super::graphics::GraphicsLib;
use super::state::{BlockKind, Context, TranspilerState};

/// Largest integer `Case a To b` range expanded into single labels.
const MAX_EXPANDED_RANGE: i64 = 256;

impl TranspilerState {
    /// Translates one statement.
    pub(super) fn emit_statement(&mut self, statement: &Statement) {
        log::trace!("line {}: {:?}", statement.line, statement.kind);
        self.begin_statement(statement.line);
        self.emit_kind(&statement.kind);
    }

    fn emit_kind(&mut self, kind: &StatementKind) {
        use StatementKind::*;

        match kind {
            Label(name) => self.emit(&format!("{}:", name)),
            OptionBase(base) => self.option_base = *base,
            OptionExplicit => {}
            Include(target) => self.add_include(target),

            ProcedureStart(header) => {
                if header.is_setup() {
                    self.enter_routine(Context::Setup);
                } else if header.is_loop() {
                    self.enter_routine(Context::Loop);
                } else {
                    self.open_procedure(header);
                }
            }
            EndProcedure(_) => self.end_procedure(),
            MalformedHeader(source) => self.emit(source),

            Const { name, value } => self.emit_const(name, value),
            ArrayLiteral(literal) => self.emit_array_literal(literal),
            Dim(declarations) => self.emit_dim(declarations, false),
            Static(declarations) => self.emit_dim(declarations, true),
            TypeStart(name) => self.emit_type_start(name),
            TypeField(field) => self.emit_type_field(field),
            TypeEnd => self.emit_record_end(BlockKind::Record),
            EnumStart(name) => self.emit_enum_start(name),
            EnumMember { name, value } => self.emit_enum_member(name, value.as_ref()),
            EnumEnd => self.emit_record_end(BlockKind::Enum),

            Every { interval, body } => self.emit_every(interval, body),

            ExitLoop => self.emit("break;"),
            ExitProcedure => self.emit("return;"),
            Continue => self.emit("continue;"),
            Goto(label) => self.emit(&format!("goto {};", label)),

            InputBox => self.emit("// InputBox is not supported (returns \"\")"),
            MsgBox(message) => {
                let message = self.value(message);
                self.emit(&format!("Serial.println({});", message));
            }
            Unsupported(what) => self.emit(&format!("// not supported: {}", what)),
            With(object) => self.emit(&format!("// With {} (not supported)", object)),
            EndWith => self.emit("// End With"),
            ElapsedTime(TimeBuiltin::Timer) => self.emit("millis();"),
            ElapsedTime(builtin) => {
                self.emit(&format!("// {:?} is not supported", builtin));
            }

            If(condition) => {
                let condition = self.condition(condition);
                self.emit(&format!("if ({}) {{", condition));
                self.open(BlockKind::If);
            }
            InlineIf {
                condition,
                then_branch,
                else_branch,
            } => self.emit_inline_if(condition, then_branch, else_branch.as_deref()),
            ElseIf(condition) => {
                let condition = self.condition(condition);
                self.emit_outdented(&format!("}} else if ({}) {{", condition));
            }
            Else => self.emit_outdented("} else {"),
            EndIf => self.close_block(BlockKind::If, "}"),

            For {
                variable,
                start,
                end,
                step,
            } => self.emit_for(variable, start, end, step.as_ref()),
            ForEach {
                variable,
                collection,
            } => {
                let collection = self.value(collection);
                self.emit(&format!("for (auto& {} : {}) {{", variable, collection));
                self.open(BlockKind::For);
            }
            Next => self.close_block(BlockKind::For, "}"),

            While(condition) => {
                let condition = self.condition(condition);
                self.emit(&format!("while ({}) {{", condition));
                self.open(BlockKind::While);
            }
            Wend => self.close_block(BlockKind::While, "}"),
            Do(condition) => self.emit_do(condition),
            Loop(condition) => self.emit_loop_end(condition),

            SelectCase(subject) => {
                let subject = self.value(subject);
                self.emit(&format!("switch ({}) {{", subject));
                self.open(BlockKind::Select { in_case: false });
            }
            Case(values) => self.emit_case(values),
            CaseElse => {
                self.enter_case();
                self.emit_outdented("default:");
            }
            EndSelect => {
                if matches!(self.top_block_mut(), Some(BlockKind::Select { in_case: true })) {
                    self.emit("break;");
                }
                self.close_block(BlockKind::Select { in_case: false }, "}");
            }

            Library { function, args } => self.emit_library(*function, args),
            Graphics { command, args } => self.emit_graphics(*command, args),
            Sprite {
                command,
                sprite,
                args,
            } => self.emit_sprite(*command, sprite, args),

            Randomize(seed) => {
                let seed = match seed {
                    Some(seed) => self.value(seed),
                    None => "millis()".to_string(),
                };
                self.emit(&format!("randomSeed({});", seed));
            }
            DoEvents => self.emit("delay(0);"),

            Call { name, args } => {
                let callee = self.value(&Expr::new(name));
                let args: Vec<String> = args.iter().map(|arg| self.value(arg)).collect();
                self.emit(&format!("{}({});", callee, args.join(", ")));
            }
            Assign { target, value } => {
                let simple = !target.is_empty()
                    && target.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                let constructed = value
                    .as_str()
                    .get(..4)
                    .is_some_and(|head| head.eq_ignore_ascii_case("new "));
                if simple && !constructed {
                    self.hoist(target);
                }
                let target = self.target(target);
                let value = self.value(value);
                self.emit(&format!("{} = {};", target, value));
            }
            Return(value) => {
                let value = self.value(value);
                self.emit(&format!("return {};", value));
            }
            Untranslated(source) => {
                log::debug!("line {}: untranslated: {}", self.line(), source);
                self.emit(&format!("// untranslated: {}", source));
            }
        }
    }

    /// Pops `block` and writes its closer at the outer depth.
    fn close_block(&mut self, block: BlockKind, closer: &str) {
        if self.close(block).is_none() {
            log::warn!("line {}: {} without a matching opener", self.line(), closer);
        }
        self.emit(closer);
    }

    fn add_include(&mut self, target: &str) {
        if self.graphics.is_none() {
            self.graphics = GraphicsLib::from_include(target);
        }
        self.includes.insert(target.to_string());
    }

    /// `If c Then a [Else b]` on one line, without touching the block stack.
    fn emit_inline_if(
        &mut self,
        condition: &Expr,
        then_branch: &Statement,
        else_branch: Option<&Statement>,
    ) {
        let condition = self.condition(condition);
        let then_code = self.captured(|state| state.emit_kind(&then_branch.kind));
        let text = match else_branch {
            Some(branch) => {
                let else_code = self.captured(|state| state.emit_kind(&branch.kind));
                format!("if ({}) {{ {} }} else {{ {} }}", condition, then_code, else_code)
            }
            None => format!("if ({}) {{ {} }}", condition, then_code),
        };
        self.emit(&text);
    }

    /// Counting loop. A literal (or absent) step picks the comparison at
    /// translation time; any other step decides it at run time.
    fn emit_for(&mut self, variable: &str, start: &Expr, end: &Expr, step: Option<&Expr>) {
        let start = self.value(start);
        let end = self.value(end);
        let declare = if self.is_declared(variable) { "" } else { "int " };

        let literal_step = match step {
            None => Ok(1),
            Some(step) => step.as_integer().ok_or(step),
        };
        let header = match literal_step {
            Ok(step) => {
                let compare = if step < 0 { ">=" } else { "<=" };
                format!(
                    "for ({}{} = {}; {} {} {}; {} += {}) {{",
                    declare, variable, start, variable, compare, end, variable, step
                )
            }
            Err(step) => {
                let step = group(&self.value(step));
                format!(
                    "for ({}{} = {}; ({} >= 0) ? {} <= {} : {} >= {}; {} += {}) {{",
                    declare, variable, start, step, variable, end, variable, end, variable, step
                )
            }
        };
        self.emit(&header);
        self.open(BlockKind::For);
    }

    fn emit_do(&mut self, condition: &LoopCondition) {
        let header = match condition {
            LoopCondition::None => "do {".to_string(),
            LoopCondition::While(c) => format!("while ({}) {{", self.condition(c)),
            LoopCondition::Until(c) => format!("while (!({})) {{", self.condition(c)),
        };
        let pre_tested = !matches!(condition, LoopCondition::None);
        self.emit(&header);
        self.open(BlockKind::Do { pre_tested });
    }

    fn emit_loop_end(&mut self, condition: &LoopCondition) {
        let block = self.close(BlockKind::Do { pre_tested: false });
        if block.is_none() {
            log::warn!("line {}: Loop without a matching Do", self.line());
        }

        let closer = match (block, condition) {
            (Some(BlockKind::Do { pre_tested: true }), LoopCondition::None) => "}".to_string(),
            (Some(BlockKind::Do { pre_tested: true }), _) => {
                log::warn!("line {}: Loop condition after a tested Do is ignored", self.line());
                "}".to_string()
            }
            (_, LoopCondition::None) => "} while (true);".to_string(),
            (_, LoopCondition::While(c)) => format!("}} while ({});", self.condition(c)),
            (_, LoopCondition::Until(c)) => format!("}} while (!({}));", self.condition(c)),
        };
        self.emit(&closer);
    }

    /// Ends the previous case body, if any, and marks a case as open.
    fn enter_case(&mut self) {
        let open_case = match self.top_block_mut() {
            Some(BlockKind::Select { in_case }) => std::mem::replace(in_case, true),
            _ => {
                log::warn!("line {}: Case outside Select Case", self.line());
                false
            }
        };
        if open_case {
            self.emit("break;");
        }
    }

    fn emit_case(&mut self, values: &[CaseValue]) {
        self.enter_case();
        for value in values {
            match value {
                CaseValue::Value(v) => {
                    let v = self.value(v);
                    self.emit_outdented(&format!("case {}:", v));
                }
                CaseValue::Range(low, high) => match (low.as_integer(), high.as_integer()) {
                    (Some(low), Some(high))
                        if high
                            .checked_sub(low)
                            .is_some_and(|span| (0..MAX_EXPANDED_RANGE).contains(&span)) =>
                    {
                        for k in low..=high {
                            self.emit_outdented(&format!("case {}:", k));
                        }
                    }
                    _ => {
                        let (low, high) = (self.value(low), self.value(high));
                        self.emit_outdented(&format!("case {} ... {}:", low, high));
                    }
                },
                CaseValue::Is { op, value } => {
                    let value = self.value(value);
                    self.emit_outdented(&format!("// Case Is {} {} (not supported)", op, value));
                }
            }
        }
    }

    fn emit_library(&mut self, function: LibraryFunction, args: &[Expr]) {
        use LibraryFunction::*;

        let values: Vec<String> = args.iter().map(|arg| self.value(arg)).collect();
        let all = values.join(", ");
        let first = values.first().cloned().unwrap_or_default();

        match function {
            PinMode => self.emit(&format!("pinMode({});", all)),
            DigitalWrite => self.emit(&format!("digitalWrite({});", all)),
            DigitalRead => self.emit(&format!("digitalRead({});", all)),
            AnalogWrite => self.emit(&format!("analogWrite({});", all)),
            AnalogRead => self.emit(&format!("analogRead({});", all)),
            Delay => self.emit(&format!("delay({});", all)),
            SerialBegin => {
                let size = self.options.serial_buffer_size;
                self.emit(&format!("Serial.begin({});", all));
                self.emit(&format!("Serial.setRxBufferSize({});", size));
                self.emit(&format!("Serial.setTxBufferSize({});", size));
            }
            SerialPrint => self.emit(&format!("Serial.print({});", all)),
            SerialPrintLine => self.emit(&format!("Serial.println({});", all)),
            DeepSleep => self.emit(&format!("esp_deep_sleep({} * 1000);", group(&first))),
            LightSleep => self.emit(&format!("esp_light_sleep_start(); delay({});", first)),
            Hibernate => self.emit("esp_deep_sleep(ESP_SLEEP_MAX_TIMER_WAKEUP);"),
            WakeOnInterrupt => {
                self.emit(&format!("esp_sleep_enable_ext0_wakeup({}, 1);", first));
            }
        }
    }

    /// `Every ms Do ... End Do`: the body becomes `_every_task_N()`, polled
    /// from `loop()`.
    fn emit_every(&mut self, interval: &Expr, body: &[Statement]) {
        let line = self.line();
        let id = self.next_every_id();
        let interval = self.value(interval);
        let task = format!("_every_task_{}", id);
        let last = format!("_every_last_{}", id);

        self.emit_global(&format!("unsigned long {} = 0;", last));

        let suspended = self.suspend();
        self.enter_function(format!("void {}();", task), format!("void {}() {{", task));
        for statement in body {
            self.emit_statement(statement);
        }
        self.begin_statement(line);
        self.end_procedure();
        self.resume(suspended);

        self.emit_loop(0, &format!("if (millis() - {} >= {}) {{", last, interval));
        self.emit_loop(1, &format!("{} = millis();", last));
        self.emit_loop(1, &format!("{}();", task));
        self.emit_loop(0, "}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranspileOptions;
    use crate::parser::parse;

    /// Translates `source` and returns the code lines of each buffer,
    /// without markers or indentation.
    fn emit(source: &str) -> TranspilerState {
        let mut state = TranspilerState::new(&TranspileOptions::default());
        for statement in &parse(source).statements {
            state.emit_statement(statement);
        }
        state.leave_scope("end of input");
        state
    }

    fn code(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.starts_with("// __VB_LINE__"))
            .collect()
    }

    #[test]
    fn test_for_loops() {
        let state = emit("Sub Loop()\nFor i = 0 To BALL_TILES - 1\nNext\nFor j = 10 To 0 Step -2\nNext\nEnd Sub");
        let body = code(&state.loop_body);
        assert_eq!(body[0], "for (int i = 0; i <= BALL_TILES - 1; i += 1) {");
        assert_eq!(body[2], "for (int j = 10; j >= 0; j += -2) {");
    }

    #[test]
    fn test_for_variable_step_and_declared_counter() {
        let state = emit("Dim i As Integer\nSub Loop()\nFor i = a To b Step s\nNext\nEnd Sub");
        assert_eq!(
            code(&state.loop_body)[0],
            "for (i = a; (s >= 0) ? i <= b : i >= b; i += s) {"
        );
    }

    #[test]
    fn test_if_blocks() {
        let state = emit("Sub Loop()\nIf x = 1 Then\ny = 1\nElseIf x = 2 Then\ny = 2\nElse\ny = 3\nEnd If\nEnd Sub");
        assert_eq!(
            code(&state.loop_body),
            vec![
                "if (x == 1) {",
                "y = 1;",
                "} else if (x == 2) {",
                "y = 2;",
                "} else {",
                "y = 3;",
                "}"
            ]
        );
    }

    #[test]
    fn test_inline_if() {
        let state = emit("Sub Loop()\nIf a > b Then x = 1 Else x = 2\nEnd Sub");
        assert_eq!(code(&state.loop_body), vec!["if (a > b) { x = 1; } else { x = 2; }"]);
    }

    #[test]
    fn test_do_loops() {
        let state = emit(
            "Sub Loop()\nDo\nx = x + 1\nLoop Until x > 5\nDo While busy\nLoop\nDo\nLoop\nEnd Sub",
        );
        assert_eq!(
            code(&state.loop_body),
            vec![
                "do {",
                "x = x + 1;",
                "} while (!(x > 5));",
                "while (busy) {",
                "}",
                "do {",
                "} while (true);"
            ]
        );
    }

    #[test]
    fn test_select_case() {
        let state = emit(
            "Sub Loop()\nSelect Case mode\nCase 1, 2\nx = 1\nCase 3 To 5\nx = 2\nCase Else\nx = 0\nEnd Select\nEnd Sub",
        );
        assert_eq!(
            code(&state.loop_body),
            vec![
                "switch (mode) {",
                "case 1:",
                "case 2:",
                "x = 1;",
                "break;",
                "case 3:",
                "case 4:",
                "case 5:",
                "x = 2;",
                "break;",
                "default:",
                "x = 0;",
                "break;",
                "}"
            ]
        );
    }

    #[test]
    fn test_case_labels_outdented() {
        let state = emit("Sub Loop()\nSelect Case k\nCase 1\nx = 1\nEnd Select\nEnd Sub");
        assert!(state.loop_body.contains(&"    switch (k) {".to_string()));
        assert!(state.loop_body.contains(&"    case 1:".to_string()));
        assert!(state.loop_body.contains(&"        x = 1;".to_string()));
    }

    #[test]
    fn test_named_case_range() {
        let state = emit("Sub Loop()\nSelect Case k\nCase LOW_MARK To HIGH_MARK\nEnd Select\nEnd Sub");
        assert!(code(&state.loop_body).contains(&"case LOW_MARK ... HIGH_MARK:".to_string()));
    }

    #[test]
    fn test_extreme_case_range_uses_gcc_form() {
        let state = emit(
            "Sub Loop()\nSelect Case x\nCase -5000000000000000000 To 5000000000000000000\nEnd Select\nEnd Sub",
        );
        let body = code(&state.loop_body);
        assert!(body.contains(&"case -5000000000000000000 ... 5000000000000000000:".to_string()));
        assert_eq!(body.iter().filter(|l| l.starts_with("case")).count(), 1);
    }

    #[test]
    fn test_serial_begin_buffers() {
        let state = emit("Sub Setup()\nSerialBegin 115200\nEnd Sub");
        assert_eq!(
            code(&state.setup),
            vec![
                "Serial.begin(115200);",
                "Serial.setRxBufferSize(1024);",
                "Serial.setTxBufferSize(1024);"
            ]
        );
    }

    #[test]
    fn test_every_block() {
        let state = emit("Sub Loop()\nEvery 500 Do\nToggle\nEnd Do\nEnd Sub");
        assert_eq!(code(&state.globals), vec!["unsigned long _every_last_1 = 0;"]);
        assert_eq!(state.signatures, vec!["void _every_task_1();"]);
        assert_eq!(
            code(&state.functions[0].lines),
            vec!["void _every_task_1() {", "Toggle();", "}"]
        );
        assert_eq!(
            code(&state.loop_body),
            vec![
                "if (millis() - _every_last_1 >= 500) {",
                "_every_last_1 = millis();",
                "_every_task_1();",
                "}"
            ]
        );
    }

    #[test]
    fn test_undeclared_locals_hoisted() {
        let state = emit(
            "Dim level As Integer\nSub Tick(count As Integer)\ntotal = total + 1\ncount = 2\nlevel = 3\nratio = total / 2\ntotal = 0\nSet srv = New Server\nscores(1) = 4\nEnd Sub",
        );
        let body = code(&state.functions[0].lines);
        assert_eq!(
            body[..4].to_vec(),
            vec![
                "void Tick(int count) {",
                "float total = 0;",
                "float ratio = 0;",
                "total = total + 1;"
            ]
        );
        assert_eq!(body.iter().filter(|l| l.starts_with("float ")).count(), 2);
    }

    #[test]
    fn test_no_hoisting_outside_procedures() {
        let state = emit("Sub Loop()\nticks = ticks + 1\nEnd Sub\nFunction Twice(x As Integer) As Integer\nTwice = x * 2\nEnd Function");
        assert_eq!(code(&state.loop_body), vec!["ticks = ticks + 1;"]);
        assert!(!code(&state.functions[0].lines).iter().any(|l| l.starts_with("float ")));
    }

    #[test]
    fn test_degraded_lines() {
        let state = emit("On Error Resume Next\nWith obj\nEnd With");
        let globals = code(&state.globals);
        assert!(globals[0].starts_with("// not supported:"));
        assert_eq!(globals[1], "// With obj (not supported)");
    }

    #[test]
    fn test_assignment_and_calls() {
        let state = emit(
            "Dim p As BLEServer*\nSub Loop()\nboard(r, c) = 1\nCall Blink(3)\np.start\nSet obj = New Foo\nEnd Sub",
        );
        assert_eq!(
            code(&state.loop_body),
            vec!["board[r][c] = 1;", "Blink(3);", "p->start();", "obj = new Foo();"]
        );
    }

    #[test]
    fn test_markers_carry_source_lines() {
        let state = emit("Sub Loop()\n  Delay 10\n\n  Delay 20\nEnd Sub");
        assert_eq!(
            state.loop_body,
            vec![
                "    // __VB_LINE__:2",
                "    delay(10);",
                "    // __VB_LINE__:4",
                "    delay(20);"
            ]
        );
    }

    #[test]
    fn test_include_selects_graphics() {
        let state = emit("#include <Adafruit_SSD1306.h>\nSub Loop()\nDrawPixel 1, 2, COLOR_WHITE\nEnd Sub");
        assert_eq!(state.graphics, Some(GraphicsLib::AdafruitGfx));
        assert_eq!(code(&state.loop_body), vec!["display.drawPixel(1, 2, WHITE);"]);
    }
}
