//! Color mode detection and conversion for terminals.

use crate::caps::ColorDepth;
use crossterm::style::Color as CrosstermColor;
use dashtier_core::{Color, Rgba8};

/// Terminal color capability mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// 24-bit true color (COLORTERM=truecolor or 24bit).
    #[default]
    TrueColor,
    /// 256 color palette.
    Color256,
    /// 16 ANSI colors.
    Color16,
    /// Monochrome (no color).
    Mono,
}

impl ColorMode {
    /// Detect color mode from environment variable values.
    #[must_use]
    pub fn detect_with_env(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if let Some(ct) = colorterm {
            if ct == "truecolor" || ct == "24bit" {
                return Self::TrueColor;
            }
        }

        match term {
            Some(t) if t.contains("256color") => Self::Color256,
            Some(t) if t.contains("color") || t.contains("xterm") => Self::Color16,
            Some("dumb") | None => Self::Mono,
            _ => Self::Color16,
        }
    }

    /// Color mode matching a probed color depth.
    #[must_use]
    pub const fn from_depth(depth: ColorDepth) -> Self {
        match depth {
            ColorDepth::TrueColor => Self::TrueColor,
            ColorDepth::Ansi256 => Self::Color256,
            ColorDepth::Ansi16 => Self::Color16,
        }
    }

    /// Convert a color to a crossterm color based on this mode.
    ///
    /// Transparent colors (alpha = 0) return `CrosstermColor::Reset` so the
    /// terminal's default background shows through instead of black.
    #[must_use]
    pub fn to_crossterm(&self, color: Color) -> CrosstermColor {
        if color.a == 0.0 {
            return CrosstermColor::Reset;
        }

        let Rgba8 { r, g, b, .. } = color.to_rgba8();

        match self {
            Self::TrueColor => CrosstermColor::Rgb { r, g, b },
            Self::Color256 => CrosstermColor::AnsiValue(rgb_to_256(r, g, b)),
            Self::Color16 => rgb_to_16(r, g, b),
            Self::Mono => CrosstermColor::White,
        }
    }
}

/// Convert RGB to a 256-color palette index (16..=255).
#[must_use]
pub(crate) fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16;
        }
        if r > 248 {
            return 231;
        }
        // Grayscale ramp: colors 232-255 (24 shades)
        return 232 + ((r - 8) / 10).min(23);
    }

    // 6x6x6 color cube (colors 16-231)
    let r_idx = (u16::from(r) * 5 / 255) as u8;
    let g_idx = (u16::from(g) * 5 / 255) as u8;
    let b_idx = (u16::from(b) * 5 / 255) as u8;
    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// RGB value of an xterm palette index at or above 16.
#[must_use]
pub(crate) fn palette_rgb(index: u8) -> (u8, u8, u8) {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    match index {
        0..=15 => (0, 0, 0),
        16..=231 => {
            let i = index - 16;
            (
                LEVELS[(i / 36) as usize],
                LEVELS[((i / 6) % 6) as usize],
                LEVELS[(i % 6) as usize],
            )
        }
        _ => {
            let v = 8 + (index - 232) * 10;
            (v, v, v)
        }
    }
}

/// Snap a pixel onto the 256-color palette, keeping alpha.
#[must_use]
pub(crate) fn quantize_256(px: Rgba8) -> Rgba8 {
    let (r, g, b) = palette_rgb(rgb_to_256(px.r, px.g, px.b));
    Rgba8::new(r, g, b, px.a)
}

fn rgb_to_16(r: u8, g: u8, b: u8) -> CrosstermColor {
    let luminance = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    let bright = luminance > 127;

    let max = r.max(g).max(b);
    let threshold = max / 2;

    let has_r = r > threshold;
    let has_g = g > threshold;
    let has_b = b > threshold;

    match (has_r, has_g, has_b, bright) {
        (false, false, false, false) => CrosstermColor::Black,
        (false, false, false, true) => CrosstermColor::DarkGrey,
        (true, false, false, false) => CrosstermColor::DarkRed,
        (true, false, false, true) => CrosstermColor::Red,
        (false, true, false, false) => CrosstermColor::DarkGreen,
        (false, true, false, true) => CrosstermColor::Green,
        (true, true, false, false) => CrosstermColor::DarkYellow,
        (true, true, false, true) => CrosstermColor::Yellow,
        (false, false, true, false) => CrosstermColor::DarkBlue,
        (false, false, true, true) => CrosstermColor::Blue,
        (true, false, true, false) => CrosstermColor::DarkMagenta,
        (true, false, true, true) => CrosstermColor::Magenta,
        (false, true, true, false) => CrosstermColor::DarkCyan,
        (false, true, true, true) => CrosstermColor::Cyan,
        (true, true, true, false) => CrosstermColor::Grey,
        (true, true, true, true) => CrosstermColor::White,
    }
}
