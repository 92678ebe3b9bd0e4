//! Theme colors
//!
//! The host exposes its theme as CSS-like color strings (`#495057`,
//! `rgb(0, 255, 0)`, ...). They are parsed once per frame into a [`Palette`]
//! that the render pass reads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{TOKEN_ACCENT, TOKEN_BACKGROUND, TOKEN_TEXT};

/// Failure to interpret a theme color string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    #[error("invalid rgb() color `{0}`")]
    InvalidRgb(String),
    #[error("unsupported color syntax `{0}`")]
    Unsupported(String),
}

/// 8-bit sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with alpha replaced (0-255 scale, clamped)
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = crate::finite_or(alpha, 0.0).round().clamp(0.0, 255.0) as u8;
        Self { a, ..self }
    }

    /// Same color with alpha multiplied by `opacity` (0-1)
    pub fn faded(self, opacity: f32) -> Self {
        let opacity = crate::finite_or(opacity, 0.0).clamp(0.0, 1.0);
        self.with_alpha(self.a as f32 * opacity)
    }

    /// Normalized sRGB components
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Linear-light components (for sRGB render targets)
    pub fn to_linear(self) -> [f32; 4] {
        fn channel(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [
            channel(self.r),
            channel(self.g),
            channel(self.b),
            self.a as f32 / 255.0,
        ]
    }

    /// Parse a CSS-like color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(r, g, b)` or `rgba(r, g, b, a)`
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            return parse_rgb_fn(&lower).ok_or_else(|| ColorParseError::InvalidRgb(s.to_string()));
        }
        match lower.as_str() {
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self::WHITE),
            "transparent" => Ok(Self::TRANSPARENT),
            _ => Err(ColorParseError::Unsupported(s.to_string())),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = nibble(0)?;
            let g = nibble(1)?;
            let b = nibble(2)?;
            let a = if hex.len() == 4 { nibble(3)? } else { 15 };
            Some(Rgba::new(r * 17, g * 17, b * 17, a * 17))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a))
        }
        _ => None,
    }
}

fn parse_rgb_fn(s: &str) -> Option<Rgba> {
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    let body = s.get(open + 1..close)?;
    let parts: Vec<&str> = body
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f32 = pct.parse().ok()?;
            Some((v.clamp(0.0, 100.0) * 2.55).round() as u8)
        } else {
            let v: f32 = p.parse().ok()?;
            Some(v.round().clamp(0.0, 255.0) as u8)
        }
    };
    let alpha = match parts.get(3) {
        Some(p) => {
            if let Some(pct) = p.strip_suffix('%') {
                let v: f32 = pct.parse().ok()?;
                (v.clamp(0.0, 100.0) * 2.55).round() as u8
            } else {
                let v: f32 = p.parse().ok()?;
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        }
        None => 255,
    };
    Some(Rgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

/// Colors the render pass reads each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Vine, thorns, grid dots and trace lines
    pub accent: Rgba,
    pub background: Rgba,
    /// Bricks and leaves
    pub text: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: Rgba::rgb(0x00, 0xff, 0x00),
            background: Rgba::WHITE,
            text: Rgba::BLACK,
        }
    }
}

impl Palette {
    /// Resolve the palette from a token lookup, keeping the default for any
    /// token that is missing or unparsable
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pick = |name: &str, fallback: Rgba| match lookup(name) {
            Some(raw) => match Rgba::parse(&raw) {
                Ok(color) => color,
                Err(err) => {
                    log::debug!("theme token `{}`: {}", name, err);
                    fallback
                }
            },
            None => fallback,
        };
        Self {
            accent: pick(TOKEN_ACCENT, defaults.accent),
            background: pick(TOKEN_BACKGROUND, defaults.background),
            text: pick(TOKEN_TEXT, defaults.text),
        }
    }
}
