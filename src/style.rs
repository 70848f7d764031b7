use std::fmt;

use serde::Deserialize;

use crate::block::Span;

/// An sRGB color, configured as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value.strip_prefix('#').unwrap_or(&value);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected a #rrggbb color, got {value:?}"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("invalid hex digits in color {value:?}"))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Sans,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Normal,
    Bold,
}

/// Everything needed to draw and measure a run of text.
///
/// Styles are plain values attached to each draw operation; nothing is set
/// on a shared drawing context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub weight: Weight,
    pub italic: bool,
    /// Font size in points.
    pub size: f64,
    pub color: Rgb,
}

impl TextStyle {
    pub fn sans(size: f64, color: Rgb) -> Self {
        Self {
            face: FontFace::Sans,
            weight: Weight::Normal,
            italic: false,
            size,
            color,
        }
    }

    pub fn mono(size: f64, color: Rgb) -> Self {
        Self {
            face: FontFace::Mono,
            ..Self::sans(size, color)
        }
    }

    pub fn bold(self) -> Self {
        Self {
            weight: Weight::Bold,
            ..self
        }
    }

    pub fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    /// Style for an inline span drawn inside a block using `self`.
    pub fn for_span(self, span: &Span, code_color: Rgb) -> Self {
        match span {
            Span::Plain(_) => self,
            Span::Bold(_) => self.bold(),
            Span::Italic(_) => self.italic(),
            Span::Code(_) => Self {
                face: FontFace::Mono,
                color: code_color,
                ..self
            },
        }
    }
}
