//! Translation unit assembly.
//!
//! # Layout
//!
//! ```cpp
//! #include <Arduino.h>
//! #include <Wire.h>            // sorted includes
//!
//! void blink(int times);       // forward declarations
//!
//! const auto LED = 2;          // globals
//!
//! void blink(int times) {      // procedures
//!     ...
//! }
//!
//! void setup() {
//!     delay(1000);
//!     ...
//! }
//!
//! void loop() {
//!     ...
//! }
//! ```
//!
//! Every physical line then gets a ` // Lnnnn` suffix with its own line
//! number.

use std::fmt::Write;

use super::state::TranspilerState;

/// Runtime support for `Split`, `Join` and `Filter`.
const HELPERS: &str = r#"// Runtime helpers for Split, Join and Filter
static std::vector<String> __vb_split(const String& input, const String& delim) {
    std::vector<String> parts;
    int start = 0;
    int idx = 0;
    if (delim.length() == 0) { parts.push_back(input); return parts; }
    while ((idx = input.indexOf(delim, start)) != -1) {
        parts.push_back(input.substring(start, idx));
        start = idx + delim.length();
    }
    parts.push_back(input.substring(start));
    return parts;
}

static String __vb_join(const std::vector<String>& parts, const String& delim) {
    String out = "";
    for (size_t i = 0; i < parts.size(); ++i) {
        out += parts[i];
        if (i + 1 < parts.size()) out += delim;
    }
    return out;
}

static std::vector<String> __vb_filter(const std::vector<String>& parts, const String& match) {
    std::vector<String> out;
    for (const auto& p : parts) {
        if (p.indexOf(match) != -1) out.push_back(p);
    }
    return out;
}"#;

const TFT_HEADER: &str = "<TFT_eSPI.h>";

impl TranspilerState {
    /// Renders the complete, line-numbered translation unit.
    pub(super) fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        let tft = self.uses_tft();
        let helpers = self.uses_helpers();

        writeln!(out, "#include <Arduino.h>")?;
        if helpers {
            writeln!(out, "#include <vector>")?;
        }
        for include in &self.includes {
            writeln!(out, "#include {}", include)?;
        }
        if tft && !self.includes.iter().any(|i| i.eq_ignore_ascii_case(TFT_HEADER)) {
            writeln!(out, "#include {}", TFT_HEADER)?;
        }
        writeln!(out)?;

        if !self.signatures.is_empty() {
            for signature in &self.signatures {
                writeln!(out, "{}", signature)?;
            }
            writeln!(out)?;
        }

        if helpers {
            writeln!(out, "{}", HELPERS)?;
            writeln!(out)?;
        }
        if tft {
            writeln!(out, "TFT_eSPI tft;")?;
        }
        for line in &self.globals {
            writeln!(out, "{}", line)?;
        }
        writeln!(out)?;

        for function in &self.functions {
            for line in &function.lines {
                writeln!(out, "{}", line)?;
            }
            writeln!(out)?;
        }

        writeln!(out, "void setup() {{")?;
        writeln!(out, "    delay({});", self.options.startup_delay_ms)?;
        if tft {
            writeln!(out, "    tft.begin();")?;
        }
        for line in &self.setup {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;

        writeln!(out, "void loop() {{")?;
        for line in &self.loop_body {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "}}")?;

        number_lines(&out)
    }

    fn uses_helpers(&self) -> bool {
        self.globals
            .iter()
            .chain(&self.setup)
            .chain(&self.loop_body)
            .chain(self.functions.iter().flat_map(|f| &f.lines))
            .any(|line| line.contains("__vb_"))
    }
}

/// Appends ` // Lnnnn` to each line (`// Lnnnn` alone on empty lines).
fn number_lines(text: &str) -> Result<String, std::fmt::Error> {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        if line.trim().is_empty() {
            writeln!(out, "// L{:04}", number)?;
        } else {
            writeln!(out, "{} // L{:04}", line, number)?;
        }
    }
    Ok(out)
}
