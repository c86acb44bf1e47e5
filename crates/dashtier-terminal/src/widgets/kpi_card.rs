//! Single headline value with change against the previous reading.

use super::{format_value, put_text, truncate, CellArea, DashWidget, Palette, RenderMode, TrendDirection};
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use dashtier_core::Rect;
use unicode_width::UnicodeWidthStr;

/// KPI card. Static: ignores input.
#[derive(Debug, Clone)]
pub struct KpiCard {
    mode: RenderMode,
    label: String,
    value: Option<f64>,
    previous: Option<f64>,
    unit: String,
    precision: usize,
    higher_is_better: bool,
    palette: Palette,
}

impl KpiCard {
    /// Empty card for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            mode: RenderMode::from_tier(tier),
            label: String::new(),
            value: None,
            previous: None,
            unit: String::new(),
            precision: 1,
            higher_is_better: true,
            palette: Palette::default(),
        }
    }

    /// Caption under the value.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Unit suffix.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Decimal places below ten thousand.
    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Color drops as good when false (e.g. latency).
    #[must_use]
    pub const fn with_higher_is_better(mut self, higher: bool) -> Self {
        self.higher_is_better = higher;
        self
    }

    /// New reading; the old one becomes the previous value.
    pub fn set_value(&mut self, value: f64) {
        self.previous = self.value;
        self.value = Some(value);
    }

    /// Override the comparison value.
    pub fn set_previous(&mut self, previous: f64) {
        self.previous = Some(previous);
    }

    /// Current reading.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        self.value
    }

    /// Current minus previous.
    #[must_use]
    pub fn delta(&self) -> Option<f64> {
        Some(self.value? - self.previous?).filter(|d| d.is_finite())
    }

    /// Relative change in percent; `None` when the previous value is zero.
    #[must_use]
    pub fn delta_percent(&self) -> Option<f64> {
        let prev = self.previous?;
        (prev != 0.0).then(|| self.delta().map(|d| d / prev.abs() * 100.0)).flatten()
    }

    /// Direction of the change.
    #[must_use]
    pub fn trend(&self) -> TrendDirection {
        match self.delta() {
            Some(d) if d > 0.0 => TrendDirection::Up,
            Some(d) if d < 0.0 => TrendDirection::Down,
            _ => TrendDirection::Flat,
        }
    }

    /// Headline text.
    #[must_use]
    pub fn value_text(&self) -> String {
        self.value.map_or_else(
            || "-".to_string(),
            |v| format!("{}{}", format_value(v, self.precision), self.unit),
        )
    }

    /// Change line, e.g. `▲ +2.5 (+4.0%)`.
    #[must_use]
    pub fn delta_text(&self) -> Option<String> {
        let d = self.delta()?;
        let arrow = self.trend().arrow(self.mode.unicode());
        let pct = self.delta_percent().map(|p| format!(" ({p:+.1}%)")).unwrap_or_default();
        let sign = if d >= 0.0 { "+" } else { "" };
        Some(format!("{arrow} {sign}{}{pct}", format_value(d, self.precision)))
    }

    fn delta_color(&self) -> dashtier_core::Color {
        match (self.trend(), self.higher_is_better) {
            (TrendDirection::Flat, _) => self.palette.muted,
            (TrendDirection::Up, true) | (TrendDirection::Down, false) => self.palette.ok,
            _ => self.palette.critical,
        }
    }
}

impl DashWidget for KpiCard {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        if area.is_empty() {
            return;
        }
        let width = usize::from(area.width);
        let mut lines = vec![(self.value_text(), self.palette.title, Modifiers::BOLD)];
        if let Some(delta) = self.delta_text() {
            lines.push((delta, self.delta_color(), Modifiers::NONE));
        }
        if !self.label.is_empty() {
            lines.push((self.label.clone(), self.palette.muted, Modifiers::NONE));
        }
        let top = area.y + (i32::from(area.height) - lines.len() as i32).max(0) / 2;
        for (i, (text, color, mods)) in lines.into_iter().enumerate() {
            let y = top + i as i32;
            if y >= area.bottom() {
                break;
            }
            let text = truncate(&text, width);
            let x = area.x + (i32::from(area.width) - text.width() as i32) / 2;
            put_text(pipeline, LayerId::Overlay, x, y, &text, color, mods);
        }
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}
