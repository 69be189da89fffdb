//! Color values used by container styles

use anyhow::Result;
use std::fmt;

/// ARGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::argb(0, 0, 0, 0);

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

/// Parse `#RGB`, `#RRGGBB` or `#AARRGGBB`
pub fn parse_color(value: &str) -> Result<Color> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        anyhow::bail!("Invalid hex color: {}", value);
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| anyhow::anyhow!("Invalid hex color: {}", value))
    };

    match hex.len() {
        3 => Ok(Color::rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        8 => Ok(Color::argb(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => anyhow::bail!("Invalid hex color length: {}", value),
    }
}

/// Parse a color, logging and returning `fallback` when it is unusable
pub fn color_or(value: &str, fallback: Color) -> Color {
    parse_color(value).unwrap_or_else(|e| {
        tracing::warn!("{}, using {}", e, fallback);
        fallback
    })
}
