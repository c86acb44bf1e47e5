//! Arc gauge with a needle.
//!
//! Angles are degrees, clockwise from the positive x axis with y pointing
//! down. The default sweep runs from 135° (lower left) over the top to
//! 405° (lower right).

use super::{format_value, normalize, pixel_color, pixel_rect, put_text, truncate, CellArea, DashWidget, Palette, RenderMode};
use crate::braille::BrailleCanvas;
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use dashtier_core::{Color, Rect};

/// Default sweep start.
pub const DEFAULT_START_ANGLE: f32 = 135.0;
/// Default sweep end.
pub const DEFAULT_END_ANGLE: f32 = 405.0;

/// Ratio of the inner cut-out to the outer radius in pixel modes.
const RING_INNER: f32 = 0.62;

/// Threshold band the value falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeZone {
    /// Below the warning threshold.
    Ok,
    /// At or above the warning threshold.
    Warn,
    /// At or above the critical threshold.
    Critical,
}

impl GaugeZone {
    /// Theme color for the zone.
    #[must_use]
    pub fn color(self, palette: &Palette) -> Color {
        match self {
            Self::Ok => palette.ok,
            Self::Warn => palette.warn,
            Self::Critical => palette.critical,
        }
    }
}

/// Gauge showing one value within a range. Static: ignores input.
#[derive(Debug, Clone)]
pub struct Gauge {
    mode: RenderMode,
    value: f64,
    min: f64,
    max: f64,
    start_angle: f32,
    end_angle: f32,
    warn: Option<f64>,
    critical: Option<f64>,
    unit: String,
    label: Option<String>,
    palette: Palette,
}

impl Gauge {
    /// Gauge over `[0, 100]` with the default sweep.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            mode: RenderMode::from_tier(tier),
            value: 0.0,
            min: 0.0,
            max: 100.0,
            start_angle: DEFAULT_START_ANGLE,
            end_angle: DEFAULT_END_ANGLE,
            warn: None,
            critical: None,
            unit: String::new(),
            label: None,
            palette: Palette::default(),
        }
    }

    /// Arc start and end angles.
    #[must_use]
    pub fn with_sweep(mut self, start: f32, end: f32) -> Self {
        if start.is_finite() && end.is_finite() && start != end {
            self.start_angle = start;
            self.end_angle = end;
        }
        self
    }

    /// Thresholds in value units.
    #[must_use]
    pub fn with_thresholds(mut self, warn: Option<f64>, critical: Option<f64>) -> Self {
        self.warn = warn;
        self.critical = critical;
        self
    }

    /// Unit suffix for the value text.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Caption under the value.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Current value; drawn clamped to the range.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Replace the range; returns false and keeps the old one unless `min < max`.
    pub fn set_value_range(&mut self, min: f64, max: f64) -> bool {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return false;
        }
        self.min = min;
        self.max = max;
        true
    }

    /// `(min, max)`.
    #[must_use]
    pub const fn value_range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// `(start, end)` in degrees.
    #[must_use]
    pub const fn sweep(&self) -> (f32, f32) {
        (self.start_angle, self.end_angle)
    }

    /// Value position in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        normalize(self.value, self.min, self.max)
    }

    /// Needle direction in degrees.
    #[must_use]
    pub fn needle_angle(&self) -> f32 {
        self.start_angle + self.fraction() as f32 * (self.end_angle - self.start_angle)
    }

    /// Threshold band of the current value.
    #[must_use]
    pub fn zone(&self) -> GaugeZone {
        if self.critical.is_some_and(|c| self.value >= c) {
            GaugeZone::Critical
        } else if self.warn.is_some_and(|w| self.value >= w) {
            GaugeZone::Warn
        } else {
            GaugeZone::Ok
        }
    }

    /// Formatted value with unit.
    #[must_use]
    pub fn value_text(&self) -> String {
        format!("{}{}", format_value(self.value, 1), self.unit)
    }

    fn draw_labels(&self, pipeline: &mut RenderPipeline, area: &CellArea, row: i32) {
        let width = usize::from(area.width);
        let mut lines = vec![(self.value_text(), self.zone().color(&self.palette), Modifiers::BOLD)];
        if let Some(label) = &self.label {
            lines.push((label.clone(), self.palette.muted, Modifiers::NONE));
        }
        for (i, (text, color, mods)) in lines.into_iter().enumerate() {
            let y = row + i as i32;
            if y >= area.bottom() {
                break;
            }
            let text = truncate(&text, width);
            let w = unicode_width::UnicodeWidthStr::width(text.as_str()) as i32;
            let x = area.x + (i32::from(area.width) - w) / 2;
            put_text(pipeline, LayerId::Overlay, x, y, &text, color, mods);
        }
    }

    fn render_pixels(&self, pipeline: &mut RenderPipeline, area: &CellArea, bounds: &Rect) {
        let r = pixel_rect(pipeline, bounds);
        let radius = (r.width.min(r.height) as i32 / 2 - 1).max(1);
        let cx = r.x + r.width as i32 / 2;
        let cy = r.y + r.height as i32 / 2;
        let needle = self.needle_angle();
        let track = pixel_color(self.mode, self.palette.border);
        let fill = pixel_color(self.mode, self.zone().color(&self.palette));
        let hole = pixel_color(self.mode, self.palette.panel);
        let inner = (radius as f32 * RING_INNER).round() as i32;

        pipeline
            .layer_mut(LayerId::Background)
            .draw_pie_slice(cx, cy, radius, self.start_angle, self.end_angle, track);
        let data = pipeline.layer_mut(LayerId::Data);
        data.draw_pie_slice(cx, cy, radius, self.start_angle, needle, fill);
        data.draw_pie_slice(cx, cy, inner, self.start_angle, self.end_angle, hole);

        let a = needle.to_radians();
        let tip = (
            cx + (radius as f32 * a.cos()).round() as i32,
            cy + (radius as f32 * a.sin()).round() as i32,
        );
        let needle_px = pixel_color(self.mode, self.palette.title);
        let overlay = pipeline.layer_mut(LayerId::Interactive);
        overlay.draw_line(cx, cy, tip.0, tip.1, needle_px);
        overlay.draw_point(cx, cy, 3, needle_px);

        self.draw_labels(pipeline, area, area.y + i32::from(area.height) * 3 / 4);
    }

    fn render_braille(&self, pipeline: &mut RenderPipeline, area: &CellArea) {
        let mut canvas = BrailleCanvas::new(area.width, area.height);
        let (dw, dh) = (canvas.dot_width(), canvas.dot_height());
        let radius = (dw.min(dh) / 2 - 1).max(1) as f32;
        let (cx, cy) = (dw as f32 / 2.0, dh as f32 / 2.0);
        let needle = self.needle_angle();
        let steps = (radius * 4.0).max(24.0) as i32;
        let span = self.end_angle - self.start_angle;
        let zone = self.zone().color(&self.palette);

        for i in 0..=steps {
            let angle = self.start_angle + span * i as f32 / steps as f32;
            let a = angle.to_radians();
            let (x, y) = ((cx + radius * a.cos()).round() as i32, (cy + radius * a.sin()).round() as i32);
            let lit = (angle - self.start_angle).abs() <= (needle - self.start_angle).abs();
            canvas.set_dot(x, y, if lit { zone } else { self.palette.border });
        }
        let a = needle.to_radians();
        let tip = (
            (cx + radius * 0.8 * a.cos()).round() as i32,
            (cy + radius * 0.8 * a.sin()).round() as i32,
        );
        canvas.line(cx.round() as i32, cy.round() as i32, tip.0, tip.1, self.palette.title);
        canvas.render(pipeline.layer_mut(LayerId::Data).text_mut(), area.x, area.y, zone);

        self.draw_labels(pipeline, area, area.y + i32::from(area.height) * 3 / 4);
    }

    fn render_ascii(&self, pipeline: &mut RenderPipeline, area: &CellArea) {
        let text = self.value_text();
        let track = usize::from(area.width).saturating_sub(text.len() + 3);
        let y = area.y + i32::from(area.height.saturating_sub(1)) / 2;
        if track > 0 {
            let filled = (self.fraction() * track as f64).round() as usize;
            let bar = format!("[{}{}]", "#".repeat(filled), "-".repeat(track - filled));
            put_text(pipeline, LayerId::Data, area.x, y, &bar, self.zone().color(&self.palette), Modifiers::NONE);
            put_text(pipeline, LayerId::Overlay, area.x + track as i32 + 3, y, &text, self.palette.text, Modifiers::BOLD);
        } else {
            put_text(pipeline, LayerId::Overlay, area.x, y, &truncate(&text, usize::from(area.width)), self.palette.text, Modifiers::BOLD);
        }
        if let Some(label) = &self.label {
            if y + 1 < area.bottom() {
                put_text(pipeline, LayerId::Overlay, area.x, y + 1, &truncate(label, usize::from(area.width)), self.palette.muted, Modifiers::NONE);
            }
        }
    }
}

impl DashWidget for Gauge {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        if area.is_empty() {
            return;
        }
        match self.mode {
            RenderMode::Native | RenderMode::Palette => self.render_pixels(pipeline, &area, bounds),
            RenderMode::Braille if area.height >= 2 => self.render_braille(pipeline, &area),
            RenderMode::Braille | RenderMode::Ascii => self.render_ascii(pipeline, &area),
        }
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}
