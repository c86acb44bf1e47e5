//! Compact trend line with a bounded history.

use super::{format_value, normalize, pixel_color, pixel_rect, put_text, symbols, CellArea, DashWidget, Palette, RenderMode};
use crate::braille::BrailleCanvas;
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use crate::series::DataPoint;
use crate::viewport::WorldBounds;
use dashtier_core::{Color, Rect};
use std::collections::VecDeque;

/// Default number of retained samples.
pub const DEFAULT_CAPACITY: usize = 120;

/// Trend direction indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendDirection {
    /// Upward trend
    Up,
    /// Downward trend
    Down,
    /// No significant change
    #[default]
    Flat,
}

impl TrendDirection {
    /// Arrow character, ASCII when `unicode` is false.
    #[must_use]
    pub const fn arrow(self, unicode: bool) -> char {
        let set = if unicode { symbols::ARROWS } else { symbols::ASCII_ARROWS };
        match self {
            Self::Up => set[0],
            Self::Down => set[1],
            Self::Flat => set[2],
        }
    }

    /// Color for the trend.
    #[must_use]
    pub fn color(self, palette: &Palette) -> Color {
        match self {
            Self::Up => palette.ok,
            Self::Down => palette.critical,
            Self::Flat => palette.muted,
        }
    }

    /// Compare the mean of the newest three samples with the three before
    /// them; differences within 5% of `span` are flat.
    #[must_use]
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a f64>, span: f64) -> Self {
        let data: Vec<f64> = samples.into_iter().copied().collect();
        if data.len() < 2 {
            return Self::Flat;
        }
        let recent = data.len().saturating_sub(3);
        let older_start = recent.saturating_sub(3);
        if older_start >= recent {
            return Self::Flat;
        }
        let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
        let (recent_avg, older_avg) = (mean(&data[recent..]), mean(&data[older_start..recent]));
        let threshold = span.abs() * 0.05;
        if recent_avg > older_avg + threshold {
            Self::Up
        } else if recent_avg < older_avg - threshold {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// Sparkline over the most recent samples.
#[derive(Debug, Clone)]
pub struct Sparkline {
    mode: RenderMode,
    data: VecDeque<f64>,
    capacity: usize,
    range: Option<(f64, f64)>,
    color: Color,
    show_last: bool,
    palette: Palette,
}

impl Sparkline {
    /// Empty sparkline for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        let palette = Palette::default();
        Self {
            mode: RenderMode::from_tier(tier),
            data: VecDeque::new(),
            capacity: DEFAULT_CAPACITY,
            range: None,
            color: palette.accent,
            show_last: true,
            palette,
        }
    }

    /// Keep at most `capacity` samples.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self.trim();
        self
    }

    /// Pin the value range.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = (min.is_finite() && max.is_finite() && min < max).then_some((min, max));
        self
    }

    /// Line color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Show the newest value and trend arrow at the right edge.
    #[must_use]
    pub fn with_last_value(mut self, show: bool) -> Self {
        self.show_last = show;
        self
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, value: f64) {
        self.data.push_back(value);
        self.trim();
    }

    /// Replace the history.
    pub fn set_data(&mut self, values: impl IntoIterator<Item = f64>) {
        self.data = values.into_iter().collect();
        self.trim();
    }

    /// Samples oldest first.
    #[must_use]
    pub fn data(&self) -> &VecDeque<f64> {
        &self.data
    }

    /// Retention limit.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest sample.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.data.back().copied()
    }

    /// Range in use: pinned, or the data extent (padded when flat).
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        if let Some(r) = self.range {
            return r;
        }
        let (min, max) = self
            .data
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if !min.is_finite() {
            (0.0, 1.0)
        } else if max - min < f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        }
    }

    /// Direction of recent samples.
    #[must_use]
    pub fn trend(&self) -> TrendDirection {
        let (min, max) = self.range();
        TrendDirection::from_samples(self.data.iter(), max - min)
    }

    fn trim(&mut self) {
        while self.data.len() > self.capacity {
            self.data.pop_front();
        }
    }

    /// Newest samples that fit `columns`.
    fn window(&self, columns: usize) -> impl Iterator<Item = &f64> + '_ {
        self.data.iter().skip(self.data.len().saturating_sub(columns))
    }
}

impl DashWidget for Sparkline {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let mut area = CellArea::from_rect(bounds);
        if area.is_empty() {
            return;
        }
        if self.show_last && area.width > 12 {
            let trend = self.trend();
            let label = match self.last() {
                Some(v) => format!("{} {}", format_value(v, 1), trend.arrow(self.mode.unicode())),
                None => "-".to_string(),
            };
            let label = format!("{label:>9}");
            area.width -= 10;
            put_text(pipeline, LayerId::Background, area.right() + 1, area.y, &label, trend.color(&self.palette), Modifiers::NONE);
        }
        let (min, max) = self.range();
        let columns = usize::from(area.width);
        let plot = Rect::new(area.x as f32, area.y as f32, f32::from(area.width), f32::from(area.height));

        match self.mode {
            RenderMode::Native | RenderMode::Palette => {
                let r = pixel_rect(pipeline, &plot);
                if r.is_empty() {
                    return;
                }
                let n = self.window(columns).count();
                let px = pixel_color(self.mode, self.color);
                let step = if n > 1 { f64::from(r.width - 1) / (n - 1) as f64 } else { 0.0 };
                let bottom = f64::from(r.height - 1);
                let pts: Vec<(i32, i32)> = self
                    .window(columns)
                    .enumerate()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(i, v)| {
                        let t = normalize(*v, min, max);
                        (r.x + (i as f64 * step).round() as i32, r.y + ((1.0 - t) * bottom).round() as i32)
                    })
                    .collect();
                let layer = pipeline.layer_mut(LayerId::Data);
                for w in pts.windows(2) {
                    layer.draw_line(w[0].0, w[0].1, w[1].0, w[1].1, px);
                }
                if let [only] = pts.as_slice() {
                    layer.draw_point(only.0, only.1, 2, px);
                }
            }
            RenderMode::Braille if area.height > 1 => {
                let mut canvas = BrailleCanvas::new(area.width, area.height);
                let n = self.window(columns * 2).count();
                canvas.set_world_bounds(WorldBounds::new(0.0, (n.max(2) - 1) as f64, min, max));
                let points: Vec<DataPoint> = self
                    .window(columns * 2)
                    .enumerate()
                    .map(|(i, v)| DataPoint::new(i as f64, *v))
                    .collect();
                canvas.plot_data_points(&points, true, self.color);
                canvas.render(pipeline.layer_mut(LayerId::Data).text_mut(), area.x, area.y, self.color);
            }
            RenderMode::Braille | RenderMode::Ascii => {
                let ramp = |t: f64| {
                    if self.mode.unicode() {
                        symbols::ramp(&symbols::SPARKLINE, t)
                    } else {
                        symbols::ramp(&symbols::ASCII_SPARKLINE, t)
                    }
                };
                let line: String = self
                    .window(columns)
                    .map(|v| if v.is_finite() { ramp(normalize(*v, min, max)) } else { ' ' })
                    .collect();
                let y = area.bottom() - 1;
                put_text(pipeline, LayerId::Data, area.x, y, &line, self.color, Modifiers::NONE);
            }
        }
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::tests::pipeline;

    #[test]
    fn test_bounded_push() {
        let mut s = Sparkline::new(CapabilityTier::Minimal).with_capacity(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            s.push(v);
        }
        assert_eq!(s.data().iter().copied().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(s.last(), Some(4.0));
    }

    #[test]
    fn test_trend() {
        let mut s = Sparkline::new(CapabilityTier::High);
        s.set_data((1..=8).map(f64::from));
        assert_eq!(s.trend(), TrendDirection::Up);
        s.set_data((1..=8).rev().map(f64::from));
        assert_eq!(s.trend(), TrendDirection::Down);
        s.set_data([5.0; 5]);
        assert_eq!(s.trend(), TrendDirection::Flat);
    }

    #[test]
    fn test_flat_range_padded() {
        let mut s = Sparkline::new(CapabilityTier::High);
        s.set_data([3.0, 3.0]);
        assert_eq!(s.range(), (2.5, 3.5));
        assert_eq!(Sparkline::new(CapabilityTier::High).range(), (0.0, 1.0));
    }

    #[test]
    fn test_ascii_ramp_row() {
        let mut s = Sparkline::new(CapabilityTier::Minimal)
            .with_range(0.0, 1.0)
            .with_last_value(false);
        s.set_data([0.0, 1.0]);
        let mut p = pipeline(CapabilityTier::Minimal, 10, 1);
        s.render(&mut p, &Rect::new(0.0, 0.0, 10.0, 1.0));
        assert!(p.layer(LayerId::Data).text().row_text(0).starts_with("_#"));
    }

    #[test]
    fn test_single_row_standard_uses_blocks() {
        let mut s = Sparkline::new(CapabilityTier::Standard)
            .with_range(0.0, 1.0)
            .with_last_value(false);
        s.set_data([0.0, 1.0]);
        let mut p = pipeline(CapabilityTier::Standard, 10, 1);
        s.render(&mut p, &Rect::new(0.0, 0.0, 10.0, 1.0));
        assert!(p.layer(LayerId::Data).text().row_text(0).starts_with("▁█"));
    }

    #[test]
    fn test_last_value_label() {
        let mut s = Sparkline::new(CapabilityTier::Minimal);
        s.set_data((1..=8).map(f64::from));
        let mut p = pipeline(CapabilityTier::Minimal, 30, 1);
        s.render(&mut p, &Rect::new(0.0, 0.0, 30.0, 1.0));
        assert!(p.layer(LayerId::Background).text().row_text(0).trim_end().ends_with("8.0 ^"));
    }

    #[test]
    fn test_pixel_render() {
        let mut s = Sparkline::new(CapabilityTier::High);
        s.set_data([1.0, 3.0, 2.0]);
        let mut p = pipeline(CapabilityTier::High, 10, 2);
        s.render(&mut p, &Rect::new(0.0, 0.0, 10.0, 2.0));
        assert!(p.layer(LayerId::Data).pixels().count_set() > 0);
    }
}
