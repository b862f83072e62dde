//! Display library selection, colour constants, graphics commands and
//! sprite pseudo-calls.
//!
//! # Library Selection
//!
//! | Include contains                          | Library      | Object    |
//! |-------------------------------------------|--------------|-----------|
//! | `tft_espi`                                | TFT_eSPI     | `tft`     |
//! | `adafruit_gfx`, `adafruit_ssd`, `_st`, `_ili` | Adafruit GFX | `display` |
//! | `u8g2`, `u8x8`                            | U8g2         | `u8g2`    |
//! | `lvgl`                                    | LVGL         | `lv`      |
//!
//! Without a matching include, graphics commands and sprites target TFT_eSPI.

use crate::ast::{Expr, GraphicsCommand, SpriteCommand};

use super::state::TranspilerState;

/// A display library supported by the unified graphics commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsLib {
    TftEspi,
    AdafruitGfx,
    U8g2,
    Lvgl,
}

impl GraphicsLib {
    /// Detects the library named by an include target.
    pub fn from_include(include: &str) -> Option<Self> {
        let include = include.to_ascii_lowercase();
        if include.contains("tft_espi") {
            Some(Self::TftEspi)
        } else if ["adafruit_gfx", "adafruit_ssd", "adafruit_st", "adafruit_ili"]
            .iter()
            .any(|name| include.contains(name))
        {
            Some(Self::AdafruitGfx)
        } else if include.contains("u8g2") || include.contains("u8x8") {
            Some(Self::U8g2)
        } else if include.contains("lvgl") {
            Some(Self::Lvgl)
        } else {
            None
        }
    }

    /// Name of the global display object.
    pub fn display_object(&self) -> &'static str {
        match self {
            Self::TftEspi => "tft",
            Self::AdafruitGfx => "display",
            Self::U8g2 => "u8g2",
            Self::Lvgl => "lv",
        }
    }

    /// Maps a colour constant (`COLOR_RED`, `vbRed`) to this library's
    /// spelling.
    pub fn color(&self, name: &str) -> Option<&'static str> {
        let lower = name.to_ascii_lowercase();
        let base = lower
            .strip_prefix("color_")
            .or_else(|| lower.strip_prefix("vb"))?;

        // (TFT_eSPI, Adafruit GFX, U8g2); `vb` names exist for the basic set only.
        let (tft, adafruit, mono) = match base {
            "black" => ("TFT_BLACK", "BLACK", "0"),
            "white" => ("TFT_WHITE", "WHITE", "1"),
            "red" => ("TFT_RED", "RED", "1"),
            "green" => ("TFT_GREEN", "GREEN", "1"),
            "blue" => ("TFT_BLUE", "BLUE", "1"),
            "yellow" => ("TFT_YELLOW", "YELLOW", "1"),
            "cyan" => ("TFT_CYAN", "CYAN", "1"),
            "magenta" => ("TFT_MAGENTA", "MAGENTA", "1"),
            "orange" | "purple" | "pink" | "brown" | "gray" | "darkgray" | "lightgray"
                if lower.starts_with("color_") =>
            {
                match base {
                    "orange" => ("TFT_ORANGE", "ORANGE", "1"),
                    "purple" => ("TFT_PURPLE", "MAGENTA", "1"),
                    "pink" => ("TFT_PINK", "MAGENTA", "1"),
                    "brown" => ("TFT_BROWN", "BROWN", "1"),
                    "gray" => ("TFT_DARKGREY", "LIGHTGREY", "1"),
                    "darkgray" => ("TFT_DARKGREY", "DARKGREY", "1"),
                    _ => ("TFT_LIGHTGREY", "LIGHTGREY", "1"),
                }
            }
            _ => return None,
        };

        Some(match self {
            Self::AdafruitGfx => adafruit,
            Self::U8g2 => mono,
            Self::TftEspi | Self::Lvgl => tft,
        })
    }
}

impl TranspilerState {
    /// Emits a unified graphics command against the selected display object.
    pub(super) fn emit_graphics(&mut self, command: GraphicsCommand, args: &[Expr]) {
        self.graphics_used = true;
        let lib = self.graphics_lib();
        let object = lib.display_object();

        if command == GraphicsCommand::ClearDisplay {
            let call = match lib {
                GraphicsLib::AdafruitGfx => "clearDisplay()",
                GraphicsLib::U8g2 => "clearBuffer()",
                GraphicsLib::TftEspi | GraphicsLib::Lvgl => "fillScreen(TFT_BLACK)",
            };
            self.emit(&format!("{}.{};", object, call));
            return;
        }

        let mut values: Vec<String> = args.iter().map(|arg| self.value(arg)).collect();
        if lib == GraphicsLib::U8g2 && command.has_trailing_color() {
            values.pop();
        }
        self.emit(&format!(
            "{}.{}({});",
            object,
            command.method(),
            values.join(", ")
        ));
    }

    /// Emits a sprite pseudo-call.
    pub(super) fn emit_sprite(&mut self, command: SpriteCommand, sprite: &str, args: &[Expr]) {
        self.graphics_used = true;
        let values: Vec<String> = args.iter().map(|arg| self.value(arg)).collect();

        let text = match command {
            SpriteCommand::Create => {
                if self.sprites.insert(sprite.to_string()) {
                    self.emit_global(&format!("TFT_eSprite {} = TFT_eSprite(&tft);", sprite));
                    self.emit_setup(&format!("{}.createSprite({});", sprite, values.join(", ")));
                } else {
                    log::debug!("sprite {} already created", sprite);
                }
                format!("// CREATE_SPRITE {} {}", sprite, values.join(" "))
            }
            SpriteCommand::Fill => format!("{}.fillSprite({});", sprite, values.join(", ")),
            SpriteCommand::FillEllipse => format!("{}.fillEllipse({});", sprite, values.join(", ")),
            SpriteCommand::FillTriangle => {
                format!("{}.fillTriangle({});", sprite, values.join(", "))
            }
            SpriteCommand::Push => format!("{}.pushSprite({});", sprite, values.join(", ")),
            SpriteCommand::Delete => format!("{}.deleteSprite();", sprite),
        };
        self.emit(&text);
    }

    /// `RGB(r, g, b)` for the selected library.
    pub(super) fn rgb(&self, r: &str, g: &str, b: &str) -> String {
        if self.uses_tft() {
            format!("tft.color565({}, {}, {})", r, g, b)
        } else {
            format!("((({} & 0xF8) << 8) | (({} & 0xFC) << 3) | ({} >> 3))", r, g, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranspileOptions;
    use crate::parser::parse;

    fn loop_code(source: &str) -> Vec<String> {
        let mut state = TranspilerState::new(&TranspileOptions::default());
        for statement in &parse(source).statements {
            state.emit_statement(statement);
        }
        state
            .loop_body
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.starts_with("// __VB_LINE__"))
            .collect()
    }

    #[test]
    fn test_viewport_commands() {
        let code = loop_code(
            "Sub Loop()\nSetViewport 0, 0, 10, 10\nFrameViewport COLOR_RED, 1\nSetOrigin 5, 5\nResetViewport\nEnd Sub",
        );
        assert_eq!(
            code,
            vec![
                "tft.setViewport(0, 0, 10, 10);",
                "tft.frameViewport(TFT_RED, 1);",
                "tft.setOrigin(5, 5);",
                "tft.resetViewport();"
            ]
        );
    }

    #[test]
    fn test_window_and_pixel_push() {
        let code = loop_code(
            "#include <Adafruit_ILI9341.h>\nSub Loop()\nSetAddrWindow x, y, w, h\nPushPixel c\nPushBlock c, n\nSetWindow 0, 0, 9, 9\nEnd Sub",
        );
        assert_eq!(
            code,
            vec![
                "display.setAddrWindow(x, y, w, h);",
                "display.pushColor(c);",
                "display.pushBlock(c, n);",
                "display.setWindow(0, 0, 9, 9);"
            ]
        );
    }

    #[test]
    fn test_library_detection() {
        assert_eq!(GraphicsLib::from_include("<TFT_eSPI.h>"), Some(GraphicsLib::TftEspi));
        assert_eq!(
            GraphicsLib::from_include("<Adafruit_SSD1306.h>"),
            Some(GraphicsLib::AdafruitGfx)
        );
        assert_eq!(GraphicsLib::from_include("<U8g2lib.h>"), Some(GraphicsLib::U8g2));
        assert_eq!(GraphicsLib::from_include("<WiFi.h>"), None);
    }

    #[test]
    fn test_colors_per_library() {
        assert_eq!(GraphicsLib::TftEspi.color("COLOR_RED"), Some("TFT_RED"));
        assert_eq!(GraphicsLib::AdafruitGfx.color("vbWhite"), Some("WHITE"));
        assert_eq!(GraphicsLib::U8g2.color("color_black"), Some("0"));
        assert_eq!(GraphicsLib::AdafruitGfx.color("COLOR_GRAY"), Some("LIGHTGREY"));
        assert_eq!(GraphicsLib::TftEspi.color("vbOrange"), None);
        assert_eq!(GraphicsLib::TftEspi.color("vbCrLf"), None);
    }
}
