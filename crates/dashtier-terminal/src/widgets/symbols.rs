//! Character sets for block, shade and ASCII rendering.

/// Single-column sparkline characters (8 levels).
pub const SPARKLINE: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// ASCII stand-ins for [`SPARKLINE`].
pub const ASCII_SPARKLINE: [char; 8] = ['_', '.', ',', '-', '~', '=', '*', '#'];

/// Left-aligned horizontal eighth blocks, 1/8 to 8/8.
pub const HBLOCKS: [char; 8] = ['▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Shade ramp from empty to full.
pub const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// ASCII intensity ramp from empty to full.
pub const ASCII_SHADES: [char; 10] = [' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Box-drawing character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSet {
    /// Top-left corner.
    pub top_left: char,
    /// Top-right corner.
    pub top_right: char,
    /// Bottom-left corner.
    pub bottom_left: char,
    /// Bottom-right corner.
    pub bottom_right: char,
    /// Horizontal edge.
    pub horizontal: char,
    /// Vertical edge.
    pub vertical: char,
}

/// Rounded Unicode corners (╭─╮).
pub const ROUNDED: BorderSet = BorderSet {
    top_left: '╭',
    top_right: '╮',
    bottom_left: '╰',
    bottom_right: '╯',
    horizontal: '─',
    vertical: '│',
};

/// Plain ASCII box (+-+).
pub const ASCII_BORDER: BorderSet = BorderSet {
    top_left: '+',
    top_right: '+',
    bottom_left: '+',
    bottom_right: '+',
    horizontal: '-',
    vertical: '|',
};

/// Trend arrows: up, down, flat.
pub const ARROWS: [char; 3] = ['▲', '▼', '─'];

/// ASCII trend arrows: up, down, flat.
pub const ASCII_ARROWS: [char; 3] = ['^', 'v', '='];

/// Pick a level from a ramp for `t` in `[0, 1]`.
#[must_use]
pub fn ramp<const N: usize>(set: &[char; N], t: f64) -> char {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let idx = ((t * (N - 1) as f64).round() as usize).min(N - 1);
    set[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_extremes() {
        assert_eq!(ramp(&SPARKLINE, 0.0), '▁');
        assert_eq!(ramp(&SPARKLINE, 1.0), '█');
        assert_eq!(ramp(&ASCII_SHADES, 2.0), '@');
        assert_eq!(ramp(&ASCII_SHADES, f64::NAN), ' ');
    }

    #[test]
    fn test_ascii_sets_are_ascii() {
        assert!(ASCII_SPARKLINE.iter().all(char::is_ascii));
        assert!(ASCII_SHADES.iter().all(char::is_ascii));
        assert!(ASCII_ARROWS.iter().all(char::is_ascii));
        let b = ASCII_BORDER;
        assert!([b.top_left, b.horizontal, b.vertical].iter().all(char::is_ascii));
    }
}
