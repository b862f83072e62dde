//! Expression rewriting.
//!
//! Expressions arrive as verbatim BASIC text. They are re-lexed and walked
//! token by token; the whitespace between tokens is copied from the source,
//! so anything that needs no translation (`BALL_TILES - 1`) comes out
//! byte-for-byte. String literals are never touched.
//!
//! # Rewrites
//!
//! | BASIC                        | C++                                  |
//! |------------------------------|--------------------------------------|
//! | `And`, `Or`, `Not`, `Xor`    | `&&`, `\|\|`, `!`, `^`               |
//! | `Mod`, `\`, `&`, `<>`        | `%`, `/`, `+`, `!=`                  |
//! | `&HFF`, `&O17`, `&B101`      | `0xFF`, `017`, `0b101`               |
//! | `New Foo`                    | `new Foo()`                          |
//! | `arr(i, j)`                  | `arr[i][j]`                          |
//! | `Left(s, n)`                 | `s.substring(0, n)`                  |
//! | `p.start()` (pointer `p`)    | `p->start()`                         |
//!
//! In condition mode a lone `=` becomes `==`.

use crate::ast::Expr;
use crate::lexer::{Token, TokenKind, lex};

use super::state::TranspilerState;

/// How an expression is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Mode {
    /// Right-hand side or argument.
    Value,
    /// `If`/`While`/`Loop` condition: `=` is a comparison.
    Condition,
    /// Assignment target: `name(args)` is always an index.
    Target,
}

type Range = (usize, usize);

impl TranspilerState {
    pub(super) fn value(&self, expr: &Expr) -> String {
        self.rewrite(expr.as_str(), Mode::Value)
    }

    pub(super) fn condition(&self, expr: &Expr) -> String {
        self.rewrite(expr.as_str(), Mode::Condition)
    }

    pub(super) fn target(&self, text: &str) -> String {
        self.rewrite(text, Mode::Target)
    }

    pub(super) fn rewrite(&self, text: &str, mode: Mode) -> String {
        let tokens = lex(text);
        let rewriter = Rewriter {
            state: self,
            source: text,
            tokens: &tokens,
        };
        rewriter.run(0, tokens.len(), mode).trim().to_string()
    }
}

struct Rewriter<'a> {
    state: &'a TranspilerState,
    source: &'a str,
    tokens: &'a [Token],
}

impl Rewriter<'_> {
    /// Rewrites tokens `start..end`.
    fn run(&self, start: usize, end: usize, mode: Mode) -> String {
        let mut out = String::new();
        let mut i = start;

        while i < end {
            let token = &self.tokens[i];
            if i > start {
                let previous = &self.tokens[i - 1];
                if previous.kind != TokenKind::Not {
                    let gap_start = previous.span.end.min(token.span.start);
                    out.push_str(&self.source[gap_start..token.span.start]);
                }
            }

            match token.kind {
                TokenKind::StringLiteral => out.push_str(&token.text),
                TokenKind::HexLiteral => {
                    out.push_str("0x");
                    out.push_str(&token.text[2..]);
                }
                TokenKind::OctalLiteral => {
                    out.push('0');
                    out.push_str(&token.text[2..]);
                }
                TokenKind::BinaryLiteral => {
                    out.push_str("0b");
                    out.push_str(&token.text[2..]);
                }
                TokenKind::And => out.push_str("&&"),
                TokenKind::Or => out.push_str("||"),
                TokenKind::Not => out.push('!'),
                TokenKind::Xor => out.push('^'),
                TokenKind::Mod => out.push('%'),
                TokenKind::Ampersand => out.push('+'),
                TokenKind::NotEquals => out.push_str("!="),
                TokenKind::Backslash => out.push('/'),
                TokenKind::Is => out.push_str("=="),
                TokenKind::Equals => {
                    if mode == Mode::Condition && !self.adjacent_to_equals(i, end) {
                        out.push_str("==");
                    } else {
                        out.push('=');
                    }
                }
                TokenKind::Dot => {
                    if self.is_pointer_receiver(i) {
                        out.push_str("->");
                    } else {
                        out.push('.');
                    }
                }
                TokenKind::New => {
                    let (text, next) = self.construction(i, end);
                    out.push_str(&text);
                    i = next;
                    continue;
                }
                _ if token.is_word() => {
                    let (text, next) = self.word(i, end, mode);
                    out.push_str(&text);
                    i = next;
                    continue;
                }
                _ => out.push_str(&token.text),
            }
            i += 1;
        }

        out
    }

    fn adjacent_to_equals(&self, i: usize, end: usize) -> bool {
        let before = i
            .checked_sub(1)
            .map(|p| &self.tokens[p])
            .is_some_and(|t| t.kind == TokenKind::Equals || t.text == "!");
        let after = i + 1 < end && self.tokens[i + 1].kind == TokenKind::Equals;
        before || after
    }

    fn is_pointer_receiver(&self, dot: usize) -> bool {
        let Some(previous) = dot.checked_sub(1).map(|p| &self.tokens[p]) else {
            return false;
        };
        let member = dot >= 2 && is_member_operator(self.tokens[dot - 2].kind);
        previous.kind == TokenKind::Identifier
            && previous.span.end == self.tokens[dot].span.start
            && !member
            && self.state.is_pointer(&previous.text)
    }

    /// `New Foo` / `New Foo(args)`.
    fn construction(&self, i: usize, end: usize) -> (String, usize) {
        let Some(class) = self.tokens.get(i + 1).filter(|t| i + 1 < end && t.is_word()) else {
            return ("new".to_string(), i + 1);
        };
        if let Some(close) = self.call_close(i + 2, end) {
            let args = self.run(i + 3, close, Mode::Value);
            return (format!("new {}({})", class.text, args.trim()), close + 1);
        }
        (format!("new {}()", class.text), i + 2)
    }

    /// A word, with its argument list if followed by one.
    fn word(&self, i: usize, end: usize, mode: Mode) -> (String, usize) {
        let token = &self.tokens[i];
        let after_member = i > 0 && is_member_operator(self.tokens[i - 1].kind);
        let close = self.call_close(i + 1, end);

        if after_member {
            // Member names are kept; their arguments are still rewritten.
            return match close {
                Some(close) if mode == Mode::Target => {
                    let values: Vec<String> = self
                        .split_args(i + 2, close)
                        .iter()
                        .map(|&(s, e)| self.run(s, e, Mode::Value).trim().to_string())
                        .collect();
                    (index(&token.text, &values), close + 1)
                }
                Some(close) => {
                    let args = self.run(i + 2, close, Mode::Value);
                    (format!("{}({})", token.text, args.trim()), close + 1)
                }
                None => (token.text.clone(), i + 1),
            };
        }

        let Some(close) = close else {
            return (self.bare_word(&token.text), i + 1);
        };

        let name = &token.text;
        let lower = name.to_ascii_lowercase();
        let args = self.split_args(i + 2, close);
        let values = || -> Vec<String> {
            args.iter()
                .map(|&(s, e)| self.run(s, e, Mode::Value).trim().to_string())
                .collect()
        };

        let text = if mode == Mode::Target {
            index(name, &values())
        } else if let Some(text) = self.builtin(&lower, &args) {
            text
        } else if args.is_empty() || self.state.is_call_name(&lower) {
            format!("{}({})", name, values().join(", "))
        } else {
            index(name, &values())
        };
        (text, close + 1)
    }

    /// Index of the `)` matching a `(` at `open`, if `open` is one.
    fn call_close(&self, open: usize, end: usize) -> Option<usize> {
        if open >= end || self.tokens[open].kind != TokenKind::LeftParen {
            return None;
        }
        let mut depth = 0usize;
        for (offset, token) in self.tokens[open..end].iter().enumerate() {
            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + offset);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Splits `start..end` at top-level commas.
    fn split_args(&self, start: usize, end: usize) -> Vec<Range> {
        let mut args = Vec::new();
        if start >= end {
            return args;
        }
        let mut depth = 0i32;
        let mut arg_start = start;
        for i in start..end {
            match self.tokens[i].kind {
                TokenKind::LeftParen | TokenKind::LeftBrace | TokenKind::LeftBracket => depth += 1,
                TokenKind::RightParen | TokenKind::RightBrace | TokenKind::RightBracket => depth -= 1,
                TokenKind::Comma if depth == 0 => {
                    args.push((arg_start, i));
                    arg_start = i + 1;
                }
                _ => {}
            }
        }
        args.push((arg_start, end));
        args
    }

    /// Named constants and operator words.
    fn bare_word(&self, word: &str) -> String {
        let mapped = match word.to_ascii_lowercase().as_str() {
            "true" | "vbtrue" => "true",
            "false" | "vbfalse" => "false",
            "vbcr" => "\"\\r\"",
            "vblf" => "\"\\n\"",
            "vbcrlf" => "\"\\r\\n\"",
            "vbtab" => "\"\\t\"",
            "vbnullchar" => "\"\\0\"",
            "vbnullstring" => "\"\"",
            "tau" => "(2.0 * PI)",
            "deg2rad" => "(PI / 180.0)",
            "rad2deg" => "(180.0 / PI)",
            "inf" => "INFINITY",
            "nothing" => "nullptr",
            "bitor" => "|",
            "bitand" => "&",
            "timer" => "millis()",
            _ => {
                return match self.state.graphics_lib().color(word) {
                    Some(color) => color.to_string(),
                    None => word.to_string(),
                };
            }
        };
        mapped.to_string()
    }

    /// Builtin function call, if `name` with this many arguments is one.
    fn builtin(&self, name: &str, args: &[Range]) -> Option<String> {
        let v = |n: usize| self.run(args[n].0, args[n].1, Mode::Value).trim().to_string();
        let c = |n: usize| self.run(args[n].0, args[n].1, Mode::Condition).trim().to_string();

        let text = match (name, args.len()) {
            // Strings
            ("left", 2) => format!("{}.substring(0, {})", receiver(&v(0)), v(1)),
            ("right", 2) => {
                let s = receiver(&v(0));
                format!("{}.substring({}.length() - {})", s, s, group(&v(1)))
            }
            ("mid", 2) => format!("{}.substring({} - 1)", receiver(&v(0)), group(&v(1))),
            ("mid", 3) => {
                let start = group(&v(1));
                format!(
                    "{}.substring({} - 1, {} - 1 + {})",
                    receiver(&v(0)),
                    start,
                    start,
                    group(&v(2))
                )
            }
            ("len", 1) => format!("{}.length()", receiver(&v(0))),
            ("instr", 2) => format!("({}.indexOf({}) + 1)", receiver(&v(0)), v(1)),
            ("instr", 3) => format!(
                "({}.indexOf({}, {} - 1) + 1)",
                receiver(&v(1)),
                v(2),
                group(&v(0))
            ),
            ("instrrev", 2) => format!("({}.lastIndexOf({}) + 1)", receiver(&v(0)), v(1)),
            ("strcomp", 2) => format!("({}.compareTo({}))", receiver(&v(0)), v(1)),
            ("substring", 3) => {
                let start = group(&v(1));
                format!("{}.substring({}, {} + {})", receiver(&v(0)), start, start, group(&v(2)))
            }
            ("replace" | "strreplace", 3) => {
                in_place(&v(0), &format!("__s.replace({}, {});", v(1), v(2)))
            }
            ("trim" | "ltrim" | "rtrim", 1) => in_place(&v(0), "__s.trim();"),
            ("ucase" | "upper", 1) => in_place(&v(0), "__s.toUpperCase();"),
            ("lcase" | "lower", 1) => in_place(&v(0), "__s.toLowerCase();"),
            ("strreverse", 1) => format!(
                "([&]() {{ String __s = String({}); String __r = \"\"; \
                 for (int __i = __s.length() - 1; __i >= 0; __i--) __r += __s[__i]; return __r; }}())",
                v(0)
            ),
            ("space", 1) => repeat(&v(0), "' '"),
            ("string", 2) => {
                let fill = v(1);
                let fill = match fill.strip_prefix('"').and_then(|f| f.strip_suffix('"')) {
                    Some(ch) if ch.chars().count() == 1 && ch != "'" => format!("'{}'", ch),
                    _ => fill,
                };
                repeat(&v(0), &fill)
            }

            // Conversions
            ("cstr", 1) => format!("String({})", v(0)),
            ("cint", 1) => format!("atoi(String({}).c_str())", v(0)),
            ("clng", 1) => format!("atol(String({}).c_str())", v(0)),
            ("cdbl" | "csng" | "val", 1) => format!("atof(String({}).c_str())", v(0)),
            ("cbyte", 1) => format!("(byte)({})", v(0)),
            ("cbool", 1) => format!("(bool)({})", v(0)),
            ("hex" | "hex$", 1) => format!("String({}, HEX)", v(0)),
            ("oct" | "oct$", 1) => format!("String({}, OCT)", v(0)),
            ("chr" | "chr$", 1) => format!("String((char)({}))", v(0)),
            ("asc", 1) => format!("(int)({}.charAt(0))", receiver(&v(0))),

            // Type checks
            ("isnumeric", 1) => {
                let x = v(0);
                format!("(String({}).toInt() != 0 || String({}) == \"0\")", x, x)
            }
            ("isempty", 1) => format!("(String({}).length() == 0)", v(0)),
            ("isnothing", 1) => format!("(({}) == nullptr)", v(0)),

            // Selection
            ("iif", 3) => format!("({} ? {} : {})", c(0), v(1), v(2)),
            ("choose", n) if n >= 2 => {
                let index = group(&v(0));
                let values: Vec<String> = (1..n).map(&v).collect();
                ternary_chain(
                    values[..values.len() - 1]
                        .iter()
                        .enumerate()
                        .map(|(k, value)| (format!("{} == {}", index, k + 1), value.clone())),
                    &values[values.len() - 1],
                )
            }
            ("switch", n) if n >= 2 && n % 2 == 0 => {
                let pairs: Vec<(String, String)> =
                    (0..n / 2).map(|k| (c(2 * k), v(2 * k + 1))).collect();
                ternary_chain(pairs[..pairs.len() - 1].iter().cloned(), &pairs[pairs.len() - 1].1)
            }

            // Bits
            ("bitread", 2) => format!("(({} >> {}) & 1)", group(&v(0)), group(&v(1))),
            ("bitwrite", 3) => {
                let (x, n) = (group(&v(0)), group(&v(1)));
                format!("({} ? ({} | (1 << {})) : ({} & ~(1 << {})))", group(&v(2)), x, n, x, n)
            }
            ("bitset", 2) => format!("({} | (1 << {}))", group(&v(0)), group(&v(1))),
            ("bitclear", 2) => format!("({} & ~(1 << {}))", group(&v(0)), group(&v(1))),
            ("bitshiftleft", 2) => format!("({} << {})", group(&v(0)), group(&v(1))),
            ("bitshiftright", 2) => format!("({} >> {})", group(&v(0)), group(&v(1))),

            // Math
            ("sqr", 1) => format!("sqrt({})", v(0)),
            ("atn", 1) => format!("atan({})", v(0)),
            ("fix", 1) => format!("trunc({})", v(0)),
            ("int", 1) => format!("int({})", v(0)),
            ("sin" | "cos" | "tan" | "abs" | "log" | "exp" | "round", 1) => {
                format!("{}({})", name, v(0))
            }
            ("sgn", 1) => {
                let x = v(0);
                format!("((({}) > 0) ? 1 : ((({}) < 0) ? -1 : 0))", x, x)
            }
            ("rnd", 0 | 1) => "random(0, 32767)".to_string(),

            // Arrays
            ("ubound", 1 | 2) => self.upper_bound(args)?,
            ("lbound", 1 | 2) => self.state.option_base.to_string(),
            ("split", 2) => format!("__vb_split(String({}), String({}))", v(0), v(1)),
            ("join", 2) => format!("__vb_join({}, String({}))", v(0), v(1)),
            ("filter", 2) => format!("__vb_filter({}, String({}))", v(0), v(1)),

            // Board
            ("digitalread", 1) => format!("digitalRead({})", v(0)),
            ("analogread", 1) => format!("analogRead({})", v(0)),
            ("millis" | "timer", 0) => "millis()".to_string(),
            ("micros", 0) => "micros()".to_string(),
            ("serialavailable", 0) => "Serial.available()".to_string(),
            ("serialread", 0) => "Serial.read()".to_string(),
            ("freeram", 0) => "ESP.getFreeHeap()".to_string(),
            ("rgb", 3) => self.state.rgb(&v(0), &v(1), &v(2)),

            // Servo pulse widths
            ("servo_clamp", 1) => clamp_degrees(&v(0)),
            ("servo_deg2pulse", 1) => format!("(int)(1000 + (({}) * (1000.0 / 180.0)))", v(0)),
            ("servo_deg2pulse", 3) => format!(
                "(int)(({}) + (({}) - ({})) * (({}) / 180.0))",
                v(1),
                v(2),
                v(1),
                v(0)
            ),
            ("servo_clamp_deg2pulse", 1) => format!(
                "(int)(1000 + (({}) * (1000.0 / 180.0)))",
                clamp_degrees(&v(0))
            ),
            ("servo_clamp_deg2pulse", 3) => format!(
                "(int)(({}) + (({}) - ({})) * (({}) / 180.0))",
                v(1),
                v(2),
                v(1),
                clamp_degrees(&v(0))
            ),

            _ => return None,
        };
        Some(text)
    }

    /// `UBound(arr[, dim])` from the recorded declaration.
    fn upper_bound(&self, args: &[Range]) -> Option<String> {
        let (start, end) = args[0];
        let array = self.tokens[start..end].first().filter(|_| end == start + 1)?;
        let bounds = self.state.array_bounds.get(&array.text.to_ascii_lowercase())?;

        let dimension = match args.get(1) {
            Some(&(s, e)) => {
                let text = self.run(s, e, Mode::Value);
                text.trim().parse::<usize>().ok()?.checked_sub(1)?
            }
            None => 0,
        };
        let bound = bounds.get(dimension)?;
        Some(if bound.parse::<i64>().is_ok() {
            bound.clone()
        } else {
            format!("({})", bound)
        })
    }
}

fn is_member_operator(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Dot | TokenKind::Arrow | TokenKind::DoubleColon)
}

fn index(name: &str, values: &[String]) -> String {
    let mut text = name.to_string();
    for value in values {
        text.push('[');
        text.push_str(value);
        text.push(']');
    }
    text
}

/// True if `text` needs no parentheses as an operand.
fn is_simple(text: &str) -> bool {
    let text = text.replace("->", ".");
    !text.is_empty()
        && !text.chars().any(|c| c.is_whitespace() || "+-*/%&|^!<>=?:,".contains(c))
}

/// Parenthesizes compound operands.
pub(super) fn group(text: &str) -> String {
    if is_simple(text) || (text.starts_with('(') && text.ends_with(')') && balanced(text)) {
        text.to_string()
    } else {
        format!("({})", text)
    }
}

/// True if the outer parentheses of `text` enclose all of it.
fn balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != text.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Receiver of a `String` method call.
fn receiver(text: &str) -> String {
    if Expr::new(text).is_string_literal() {
        format!("String({})", text)
    } else {
        group(text)
    }
}

/// Applies an in-place `String` method to a copy and yields the copy.
fn in_place(value: &str, statement: &str) -> String {
    format!(
        "([&]() {{ String __s = String({}); {} return __s; }}())",
        value, statement
    )
}

/// `count` repetitions of `fill`.
fn repeat(count: &str, fill: &str) -> String {
    format!(
        "([&]() {{ String __s = \"\"; for (int __i = 0; __i < ({}); __i++) __s += {}; return __s; }}())",
        count, fill
    )
}

fn clamp_degrees(angle: &str) -> String {
    format!("(int)min(180, max(0, (int)({})))", angle)
}

/// `(c1 ? v1 : (c2 ? v2 : fallback))`
fn ternary_chain(branches: impl DoubleEndedIterator<Item = (String, String)>, fallback: &str) -> String {
    branches
        .rev()
        .fold(fallback.to_string(), |rest, (condition, value)| {
            format!("({} ? {} : {})", condition, value, rest)
        })
}
