//! Statement AST nodes.
//!
//! One [`Statement`] is produced per logical source line (plus the bodies of
//! `Every` blocks, which are nested). Opening and closing lines of a block are
//! separate statements; the backend pairs them.
//!
//! # Statement Categories
//!
//! - **Structure**: procedure headers and ends, labels, directives
//! - **Declarations**: CONST, DIM, STATIC, TYPE, ENUM
//! - **Control flow**: IF, FOR, WHILE, DO, SELECT CASE, EXIT, GOTO
//! - **Calls**: Arduino library forms, graphics, sprites, user procedures
//! - **Assignment**: `[LET|SET] target = expression`
//! - **Degraded**: recognized-but-unsupported and untranslated lines

use super::{ArrayLiteral, Declaration, Expr, ProcedureHeader, ProcedureKind};

/// A statement with the source line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The kind of statement.
    pub kind: StatementKind,
    /// 1-based source line number.
    pub line: usize,
}

impl Statement {
    /// Creates a new statement with the given kind and line.
    pub fn new(kind: StatementKind, line: usize) -> Self {
        Self { kind, line }
    }
}

/// The different kinds of statements.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `name:` label definition.
    Label(String),

    /// `Option Base n`
    OptionBase(u32),

    /// `Option Explicit` (accepted, no effect)
    OptionExplicit,

    /// `#Include <header>` or `#Include "header"`, delimiters kept.
    Include(String),

    /// `[Public|Private] Sub|Function Name(params) [As Type]`
    ProcedureStart(ProcedureHeader),

    /// `End Sub` / `End Function`
    EndProcedure(ProcedureKind),

    /// A procedure header that could not be parsed; passed through verbatim.
    MalformedHeader(String),

    /// `Const name [As T] = value`
    Const { name: String, value: Expr },

    /// `Const name() As T = {...}` / `Dim name() As T = {...}`
    ArrayLiteral(ArrayLiteral),

    /// `Dim`/`Public`/`Private`/`Global` declarations, one entry per variable.
    Dim(Vec<Declaration>),

    /// `Static` declarations.
    Static(Vec<Declaration>),

    /// `Type Name`
    TypeStart(String),

    /// Field line inside a `Type` block.
    TypeField(Declaration),

    /// `End Type`
    TypeEnd,

    /// `Enum Name`
    EnumStart(String),

    /// Member line inside an `Enum` block.
    EnumMember { name: String, value: Option<Expr> },

    /// `End Enum`
    EnumEnd,

    /// `Every interval Do ... End Do`
    Every {
        /// Interval in milliseconds.
        interval: Expr,
        /// Body statements.
        body: Vec<Statement>,
    },

    /// `Exit For|Do|While|Select`
    ExitLoop,

    /// `Exit Sub|Function` or a bare `Return`
    ExitProcedure,

    /// `Continue For|Do|While`
    Continue,

    /// `GoTo label`
    Goto(String),

    /// `InputBox(...)` used as a statement.
    InputBox,

    /// `MsgBox x` or `MsgBox(x)`
    MsgBox(Expr),

    /// A recognized construct with no translation (`On Error`, `Property`, ...),
    /// carrying a short description.
    Unsupported(String),

    /// `With object`
    With(Expr),

    /// `End With`
    EndWith,

    /// Bare `Timer`, `Now`, `Date` or `Time` used as a statement.
    ElapsedTime(TimeBuiltin),

    /// Multi-line `If condition Then`
    If(Expr),

    /// Single-line `If condition Then stmt [Else stmt]`
    InlineIf {
        condition: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },

    /// `ElseIf condition Then`
    ElseIf(Expr),

    /// `Else`
    Else,

    /// `End If` / `EndIf`
    EndIf,

    /// `For var = start To end [Step step]`
    For {
        variable: String,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
    },

    /// `For Each var In collection`
    ForEach { variable: String, collection: Expr },

    /// `Next [var]`
    Next,

    /// `While condition`
    While(Expr),

    /// `Wend`
    Wend,

    /// `Do [While|Until condition]`
    Do(LoopCondition),

    /// `Loop [While|Until condition]`
    Loop(LoopCondition),

    /// `Select Case expr`
    SelectCase(Expr),

    /// `Case v1, v2, ...`
    Case(Vec<CaseValue>),

    /// `Case Else`
    CaseElse,

    /// `End Select`
    EndSelect,

    /// A fixed Arduino library form (`PinMode`, `Delay`, `SerialBegin`, ...).
    Library { function: LibraryFunction, args: Vec<Expr> },

    /// A unified graphics command (`DrawLine`, `FillScreen`, ...).
    Graphics { command: GraphicsCommand, args: Vec<Expr> },

    /// A sprite pseudo-call (`CREATE_SPRITE`, `SPRITE_PUSH`, ...).
    Sprite {
        command: SpriteCommand,
        sprite: String,
        args: Vec<Expr>,
    },

    /// `Randomize [seed]`
    Randomize(Option<Expr>),

    /// `DoEvents`
    DoEvents,

    /// Procedure or method call: `Foo a, b`, `Foo(a, b)`, `Call Foo(a)`,
    /// `obj.method(x)` or a bare `Foo`.
    Call { name: String, args: Vec<Expr> },

    /// `[Let|Set] target = value`; `target` keeps its VB index syntax.
    Assign { target: String, value: Expr },

    /// `Return expr`
    Return(Expr),

    /// No recognizer matched; the original line is kept for visibility.
    Untranslated(String),
}

/// The condition attached to `Do` or `Loop`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopCondition {
    None,
    While(Expr),
    Until(Expr),
}

/// One value of a `Case` line.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseValue {
    /// `Case 3` or `Case "a"`
    Value(Expr),
    /// `Case 1 To 5`
    Range(Expr, Expr),
    /// `Case Is >= 5`; the operator is kept as written.
    Is { op: String, value: Expr },
}

/// Bare time builtins usable as statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBuiltin {
    Timer,
    Now,
    Date,
    Time,
}

/// Fixed Arduino library statement forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryFunction {
    PinMode,
    DigitalWrite,
    DigitalRead,
    AnalogWrite,
    AnalogRead,
    Delay,
    SerialBegin,
    SerialPrint,
    SerialPrintLine,
    DeepSleep,
    LightSleep,
    Hibernate,
    WakeOnInterrupt,
}

impl LibraryFunction {
    /// Looks up a statement keyword, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        use LibraryFunction::*;
        let function = match name.to_ascii_lowercase().as_str() {
            "pinmode" => PinMode,
            "digitalwrite" => DigitalWrite,
            "digitalread" => DigitalRead,
            "analogwrite" => AnalogWrite,
            "analogread" => AnalogRead,
            "delay" => Delay,
            "serialbegin" => SerialBegin,
            "serialprint" => SerialPrint,
            "serialprintline" => SerialPrintLine,
            "deepsleep" => DeepSleep,
            "lightsleep" => LightSleep,
            "hibernate" => Hibernate,
            "wakeoninterrupt" => WakeOnInterrupt,
            _ => return None,
        };
        Some(function)
    }

    /// Number of arguments the form takes.
    pub fn arity(&self) -> usize {
        use LibraryFunction::*;
        match self {
            Hibernate => 0,
            PinMode | DigitalWrite | AnalogWrite => 2,
            _ => 1,
        }
    }
}

/// Unified graphics commands, mapped onto the selected display library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsCommand {
    DrawLine,
    DrawRect,
    FillRect,
    DrawCircle,
    FillCircle,
    DrawTriangle,
    FillTriangle,
    DrawPixel,
    FillScreen,
    ClearDisplay,
    SetTextSize,
    SetTextColor,
    SetCursor,
    PrintText,
    PrintLine,
    SetWindow,
    SetAddrWindow,
    SetViewport,
    ResetViewport,
    FrameViewport,
    SetOrigin,
    PushPixel,
    PushBlock,
}

impl GraphicsCommand {
    /// Looks up a command keyword, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        use GraphicsCommand::*;
        let command = match name.to_ascii_lowercase().as_str() {
            "drawline" => DrawLine,
            "drawrect" => DrawRect,
            "fillrect" => FillRect,
            "drawcircle" => DrawCircle,
            "fillcircle" => FillCircle,
            "drawtriangle" => DrawTriangle,
            "filltriangle" => FillTriangle,
            "drawpixel" => DrawPixel,
            "fillscreen" => FillScreen,
            "cleardisplay" => ClearDisplay,
            "settextsize" => SetTextSize,
            "settextcolor" => SetTextColor,
            "setcursor" => SetCursor,
            "printtext" => PrintText,
            "printline" => PrintLine,
            "setwindow" => SetWindow,
            "setaddrwindow" => SetAddrWindow,
            "setviewport" => SetViewport,
            "resetviewport" => ResetViewport,
            "frameviewport" => FrameViewport,
            "setorigin" => SetOrigin,
            "pushpixel" => PushPixel,
            "pushblock" => PushBlock,
            _ => return None,
        };
        Some(command)
    }

    /// Accepted argument counts (inclusive range).
    pub fn arity(&self) -> (usize, usize) {
        use GraphicsCommand::*;
        match self {
            DrawLine | DrawRect | FillRect => (5, 5),
            DrawCircle | FillCircle => (4, 4),
            DrawTriangle | FillTriangle => (7, 7),
            DrawPixel => (3, 3),
            SetWindow | SetAddrWindow | SetViewport => (4, 4),
            ClearDisplay | ResetViewport => (0, 0),
            SetTextColor => (1, 2),
            SetCursor | FrameViewport | SetOrigin | PushBlock => (2, 2),
            FillScreen | SetTextSize | PrintText | PrintLine | PushPixel => (1, 1),
        }
    }

    /// Library method name (TFT_eSPI / Adafruit GFX naming).
    pub fn method(&self) -> &'static str {
        use GraphicsCommand::*;
        match self {
            DrawLine => "drawLine",
            DrawRect => "drawRect",
            FillRect => "fillRect",
            DrawCircle => "drawCircle",
            FillCircle => "fillCircle",
            DrawTriangle => "drawTriangle",
            FillTriangle => "fillTriangle",
            DrawPixel => "drawPixel",
            FillScreen => "fillScreen",
            ClearDisplay => "clearDisplay",
            SetTextSize => "setTextSize",
            SetTextColor => "setTextColor",
            SetCursor => "setCursor",
            PrintText => "print",
            PrintLine => "println",
            SetWindow => "setWindow",
            SetAddrWindow => "setAddrWindow",
            SetViewport => "setViewport",
            ResetViewport => "resetViewport",
            FrameViewport => "frameViewport",
            SetOrigin => "setOrigin",
            PushPixel => "pushColor",
            PushBlock => "pushBlock",
        }
    }

    /// True for shape primitives whose last argument is a colour.
    pub fn has_trailing_color(&self) -> bool {
        use GraphicsCommand::*;
        matches!(
            self,
            DrawLine | DrawRect | FillRect | DrawCircle | FillCircle | DrawPixel
        )
    }
}

/// Sprite pseudo-calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteCommand {
    Create,
    Fill,
    FillEllipse,
    FillTriangle,
    Push,
    Delete,
}

impl SpriteCommand {
    /// Looks up a pseudo-call keyword, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        use SpriteCommand::*;
        let command = match name.to_ascii_lowercase().as_str() {
            "create_sprite" => Create,
            "sprite_fill" => Fill,
            "sprite_fill_ellipse" => FillEllipse,
            "sprite_fill_triangle" => FillTriangle,
            "sprite_push" => Push,
            "sprite_delete" => Delete,
            _ => return None,
        };
        Some(command)
    }

    /// Accepted argument counts after the sprite name (inclusive range).
    pub fn arity(&self) -> (usize, usize) {
        use SpriteCommand::*;
        match self {
            Create => (2, 2),
            Fill => (1, 1),
            FillEllipse => (5, 5),
            FillTriangle => (7, 7),
            Push => (2, 3),
            Delete => (0, 0),
        }
    }
}
