//! Horizontal labelled bars.

use super::{format_value, normalize, pixel_color, pixel_rect, put_text, symbols, truncate, CellArea, DashWidget, Palette, RenderMode};
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use dashtier_core::{Color, Event, Rect};
use unicode_width::UnicodeWidthStr;

/// Width reserved for the value column.
const VALUE_WIDTH: u16 = 7;

/// Alpha of the hover band in pixel modes.
const HOVER_ALPHA: u8 = 72;

/// One bar per row, label on the left and value on the right.
#[derive(Debug, Clone)]
pub struct BarChart {
    mode: RenderMode,
    bars: Vec<(String, f64)>,
    range: Option<(f64, f64)>,
    color: Color,
    palette: Palette,
    hover: Option<usize>,
}

impl BarChart {
    /// Empty chart for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        let palette = Palette::default();
        Self {
            mode: RenderMode::from_tier(tier),
            bars: Vec::new(),
            range: None,
            color: palette.accent,
            palette,
            hover: None,
        }
    }

    /// Bar color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Replace every bar.
    pub fn set_data(&mut self, bars: Vec<(String, f64)>) {
        self.bars = bars;
        self.hover = self.hover.filter(|&i| i < self.bars.len());
    }

    /// Bars in order.
    #[must_use]
    pub fn data(&self) -> &[(String, f64)] {
        &self.bars
    }

    /// Pin the value axis; an inverted or empty range is ignored.
    pub fn set_value_range(&mut self, min: f64, max: f64) {
        self.range = (min.is_finite() && max.is_finite() && min < max).then_some((min, max));
    }

    /// Value axis in use: the pinned range, or zero to the largest value.
    #[must_use]
    pub fn value_range(&self) -> (f64, f64) {
        if let Some(r) = self.range {
            return r;
        }
        let finite = self.bars.iter().map(|(_, v)| *v).filter(|v| v.is_finite());
        let (lo, hi) = finite.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if hi > lo {
            (lo, hi)
        } else {
            (lo, lo + 1.0)
        }
    }

    /// Bar under the pointer.
    #[must_use]
    pub const fn hovered(&self) -> Option<usize> {
        self.hover
    }

    fn label_width(&self, area: &CellArea) -> u16 {
        let widest = self.bars.iter().map(|(l, _)| l.width()).max().unwrap_or(0);
        let cap = usize::from(area.width / 4);
        u16::try_from(widest.min(cap)).unwrap_or(0)
    }

    /// Bar length in cells for each bar, with the column layout.
    fn geometry(&self, area: &CellArea) -> (u16, u16, Vec<f64>) {
        let label_w = self.label_width(area);
        let track = area.width.saturating_sub(label_w + 1 + VALUE_WIDTH);
        let (min, max) = self.value_range();
        let lengths = self
            .bars
            .iter()
            .map(|(_, v)| normalize(*v, min, max) * f64::from(track))
            .collect();
        (label_w, track, lengths)
    }

    fn bar_text(&self, cells: f64) -> String {
        if self.mode.unicode() {
            let eighths = (cells * 8.0).round() as usize;
            let mut s = "█".repeat(eighths / 8);
            if eighths % 8 > 0 {
                s.push(symbols::HBLOCKS[eighths % 8 - 1]);
            }
            s
        } else {
            "#".repeat(cells.round() as usize)
        }
    }
}

impl DashWidget for BarChart {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        if area.is_empty() {
            return;
        }
        let (label_w, track, lengths) = self.geometry(&area);
        let track_x = area.x + i32::from(label_w) + 1;
        let rows = self.bars.len().min(usize::from(area.height));

        for (i, ((label, value), len)) in self.bars.iter().zip(&lengths).take(rows).enumerate() {
            let y = area.y + i as i32;
            let hovered = self.hover == Some(i);
            let (fg, mods) = if hovered {
                (self.palette.accent, Modifiers::BOLD)
            } else {
                (self.palette.text, Modifiers::NONE)
            };
            put_text(pipeline, LayerId::Background, area.x, y, &truncate(label, usize::from(label_w)), fg, mods);

            if self.mode.uses_pixels() {
                let bar = Rect::new(track_x as f32, y as f32 + 0.15, *len as f32, 0.7);
                let r = pixel_rect(pipeline, &bar);
                let px = pixel_color(self.mode, if hovered { self.palette.accent } else { self.color });
                pipeline
                    .layer_mut(LayerId::Data)
                    .draw_rect(r.x, r.y, r.width as i32, r.height as i32, px);
                if hovered {
                    let band = pixel_rect(pipeline, &Rect::new(area.x as f32, y as f32, f32::from(area.width), 1.0));
                    let tint = pixel_color(self.mode, self.palette.accent).with_alpha(HOVER_ALPHA);
                    pipeline
                        .layer_mut(LayerId::Interactive)
                        .draw_rect(band.x, band.y, band.width as i32, band.height as i32, tint);
                }
            } else if track > 0 {
                let color = if hovered { self.palette.accent } else { self.color };
                put_text(pipeline, LayerId::Data, track_x, y, &self.bar_text(*len), color, Modifiers::NONE);
            }

            let value = format!("{:>width$}", format_value(*value, 1), width = usize::from(VALUE_WIDTH));
            let vx = area.right() - i32::from(VALUE_WIDTH);
            put_text(pipeline, LayerId::Background, vx, y, &value, self.palette.muted, Modifiers::NONE);
        }
    }

    fn handle_input(&mut self, event: &Event, bounds: &Rect) -> bool {
        let Event::MouseMove { position } = event else {
            return false;
        };
        let hover = bounds
            .contains_point(position)
            .then(|| (position.y - bounds.y).floor() as usize)
            .filter(|&row| row < self.bars.len());
        let changed = hover != self.hover;
        self.hover = hover;
        changed
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}
