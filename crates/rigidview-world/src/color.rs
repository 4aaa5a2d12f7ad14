//! RGBA colors with CSS-style string parsing.
//!
//! Style descriptors in scene files and render options carry colors as
//! strings (`"#bbb"`, `"rgba(255,165,0,0.7)"`, `"indianred"`). [`Color`]
//! parses those once at load time so the per-frame path never touches
//! strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An sRGB color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `0.0..=1.0`.
    pub a: f32,
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}'")]
pub struct ParseColorError(pub String);

/// Named colors recognised by [`Color::from_str`].
const NAMED: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("orange", Color::rgb(255, 165, 0)),
    ("indianred", Color::rgb(205, 92, 92)),
    ("cornflowerblue", Color::rgb(100, 149, 237)),
    ("grey", Color::rgb(128, 128, 128)),
    ("gray", Color::rgb(128, 128, 128)),
    ("transparent", Color::TRANSPARENT),
];

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    /// Opaque color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from channels and alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channels as normalized floats `[r, g, b, a]`.
    pub fn to_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            self.a,
        ]
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let err = || ParseColorError(s.to_owned());

        if let Some(hex) = raw.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }

        if let Some(body) = raw
            .strip_prefix("rgba(")
            .or_else(|| raw.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_functional(body).ok_or_else(err);
        }

        NAMED
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, c)| *c)
            .ok_or_else(err)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            f32::from(byte(6)?) / 255.0,
        )),
        _ => None,
    }
}

fn parse_functional(body: &str) -> Option<Color> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    match parts.as_slice() {
        [r, g, b] => Some(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha = a.parse::<f32>().ok()?.clamp(0.0, 1.0);
            Some(Color::rgba(channel(r)?, channel(g)?, channel(b)?, alpha))
        }
        _ => None,
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}
