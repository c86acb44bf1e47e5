//! Value grid colored by magnitude.

use super::{normalize, pixel_color, pixel_rect, put_text, symbols, CellArea, DashWidget, RenderMode};
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use dashtier_core::{Color, Rect};
use serde::{Deserialize, Serialize};

/// Color palette for heatmap rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapPalette {
    /// Blue (cold) to Red (hot).
    #[default]
    BlueRed,
    /// Viridis-like (purple to yellow).
    Viridis,
    /// Green (low) to Red (high).
    GreenRed,
    /// Grayscale.
    Grayscale,
}

const VIRIDIS: [(f32, f32, f32); 8] = [
    (0.27, 0.00, 0.33),
    (0.28, 0.14, 0.45),
    (0.26, 0.24, 0.53),
    (0.22, 0.34, 0.55),
    (0.18, 0.44, 0.56),
    (0.12, 0.56, 0.55),
    (0.20, 0.72, 0.47),
    (0.99, 0.91, 0.15),
];

impl HeatmapPalette {
    /// Color for a normalized value (0.0 to 1.0).
    #[must_use]
    pub fn color(self, value: f64) -> Color {
        let t = value.clamp(0.0, 1.0) as f32;
        match self {
            Self::BlueRed => {
                if t < 0.5 {
                    let s = t * 2.0;
                    Color::new(s, s, 1.0, 1.0)
                } else {
                    let s = (t - 0.5) * 2.0;
                    Color::new(1.0, 1.0 - s, 1.0 - s, 1.0)
                }
            }
            Self::Viridis => {
                let idx = ((t * 7.0) as usize).min(6);
                let frac = t * 7.0 - idx as f32;
                let (r1, g1, b1) = VIRIDIS[idx];
                let (r2, g2, b2) = VIRIDIS[idx + 1];
                Color::new(r1 + (r2 - r1) * frac, g1 + (g2 - g1) * frac, b1 + (b2 - b1) * frac, 1.0)
            }
            Self::GreenRed => Color::new(t, 1.0 - t, 0.0, 1.0),
            Self::Grayscale => Color::new(t, t, t, 1.0),
        }
    }
}

/// Row-major grid of values. Static: ignores input.
#[derive(Debug, Clone)]
pub struct Heatmap {
    mode: RenderMode,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
    range: Option<(f64, f64)>,
    palette: HeatmapPalette,
}

impl Heatmap {
    /// Empty heatmap for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            mode: RenderMode::from_tier(tier),
            rows: 0,
            cols: 0,
            values: Vec::new(),
            range: None,
            palette: HeatmapPalette::default(),
        }
    }

    /// Gradient used for values.
    #[must_use]
    pub fn with_palette(mut self, palette: HeatmapPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Replace the grid. `values` is row-major; missing cells are empty
    /// (NaN) and extra values are dropped.
    pub fn set_data(&mut self, rows: usize, cols: usize, values: impl IntoIterator<Item = f64>) {
        let len = rows.saturating_mul(cols);
        let mut values: Vec<f64> = values.into_iter().take(len).collect();
        values.resize(len, f64::NAN);
        self.rows = rows;
        self.cols = cols;
        self.values = values;
    }

    /// Set one cell; returns false when out of range.
    pub fn set_cell(&mut self, row: usize, col: usize, value: f64) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.values[row * self.cols + col] = value;
        true
    }

    /// Value at a cell.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.values[row * self.cols + col])
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Pin the color scale; an inverted or empty range is ignored.
    pub fn set_value_range(&mut self, min: f64, max: f64) {
        self.range = (min.is_finite() && max.is_finite() && min < max).then_some((min, max));
    }

    /// Scale in use: pinned, or the data extent.
    #[must_use]
    pub fn value_range(&self) -> (f64, f64) {
        if let Some(r) = self.range {
            return r;
        }
        let (lo, hi) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if !lo.is_finite() {
            (0.0, 1.0)
        } else if hi - lo < f64::EPSILON {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    }
}

impl DashWidget for Heatmap {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        if area.is_empty() || self.rows == 0 || self.cols == 0 {
            return;
        }
        let (min, max) = self.value_range();
        let cw = f32::from(area.width) / self.cols as f32;
        let ch = f32::from(area.height) / self.rows as f32;
        let mut buf = [0u8; 4];

        for row in 0..self.rows {
            for col in 0..self.cols {
                let v = self.values[row * self.cols + col];
                if !v.is_finite() {
                    continue;
                }
                let t = normalize(v, min, max);
                let color = self.palette.color(t);
                let x0 = area.x as f32 + col as f32 * cw;
                let y0 = area.y as f32 + row as f32 * ch;
                match self.mode {
                    RenderMode::Native | RenderMode::Palette => {
                        let r = pixel_rect(pipeline, &Rect::new(x0, y0, cw, ch));
                        let px = pixel_color(self.mode, color);
                        pipeline
                            .layer_mut(LayerId::Data)
                            .draw_rect(r.x, r.y, r.width as i32, r.height as i32, px);
                    }
                    RenderMode::Braille | RenderMode::Ascii => {
                        let (cx0, cy0) = (x0.floor() as i32, y0.floor() as i32);
                        let (cx1, cy1) = ((x0 + cw).floor() as i32, (y0 + ch).floor() as i32);
                        let (w, h) = ((cx1 - cx0).max(1) as u16, (cy1 - cy0).max(1) as u16);
                        if self.mode == RenderMode::Braille {
                            pipeline.layer_mut(LayerId::Data).fill_cells(cx0, cy0, w, h, color);
                        } else {
                            let shade = symbols::ramp(&symbols::ASCII_SHADES, t).encode_utf8(&mut buf).repeat(usize::from(w));
                            for y in cy0..cy0 + i32::from(h) {
                                put_text(pipeline, LayerId::Data, cx0, y, &shade, Color::WHITE, Modifiers::NONE);
                            }
                        }
                    }
                }
            }
        }
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}
