//! Single-row status line on the overlay layer.

use super::{truncate, CellArea, DashWidget, Palette, RenderMode};
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use dashtier_core::Rect;
use unicode_width::UnicodeWidthStr;

/// Left, center and right aligned segments plus optional frame stats.
#[derive(Debug, Clone)]
pub struct StatusBar {
    mode: RenderMode,
    left: String,
    center: String,
    right: String,
    stats: Option<String>,
    auto_stats: bool,
    palette: Palette,
}

impl StatusBar {
    /// Empty bar for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            mode: RenderMode::from_tier(tier),
            left: String::new(),
            center: String::new(),
            right: String::new(),
            stats: None,
            auto_stats: false,
            palette: Palette::default(),
        }
    }

    /// Let the engine refresh frame stats before every frame.
    #[must_use]
    pub const fn with_auto_stats(mut self, enabled: bool) -> Self {
        self.auto_stats = enabled;
        self
    }

    /// Whether the engine refreshes frame stats.
    #[must_use]
    pub const fn auto_stats(&self) -> bool {
        self.auto_stats
    }

    /// Left segment.
    pub fn set_left(&mut self, text: impl Into<String>) {
        self.left = text.into();
    }

    /// Center segment.
    pub fn set_center(&mut self, text: impl Into<String>) {
        self.center = text.into();
    }

    /// Right segment.
    pub fn set_right(&mut self, text: impl Into<String>) {
        self.right = text.into();
    }

    /// Show frame rate, quality and tier after the right segment.
    pub fn set_frame_stats(&mut self, fps: f64, quality: f32, tier: CapabilityTier) {
        self.stats = Some(format!("{fps:.0}fps q{quality:.2} {}", tier.name()));
    }

    /// Hide frame stats.
    pub fn clear_frame_stats(&mut self) {
        self.stats = None;
    }

    /// `(left, center, right)`.
    #[must_use]
    pub fn segments(&self) -> (&str, &str, &str) {
        (&self.left, &self.center, &self.right)
    }

    fn right_text(&self) -> String {
        match (&self.stats, self.right.is_empty()) {
            (Some(stats), true) => stats.clone(),
            (Some(stats), false) => format!("{} {} {stats}", self.right, if self.mode.unicode() { "│" } else { "|" }),
            (None, _) => self.right.clone(),
        }
    }
}

impl DashWidget for StatusBar {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        if area.is_empty() {
            return;
        }
        let y = area.y;
        let width = usize::from(area.width);
        let right = truncate(&self.right_text(), width);
        let right_w = right.width();
        let left = truncate(&self.left, width.saturating_sub(right_w + 1));
        let center = truncate(&self.center, width.saturating_sub(2 * right_w.max(left.width()) + 2));

        let bg = self.palette.panel;
        let overlay = pipeline.layer_mut(LayerId::Overlay);
        overlay.fill_cells(area.x, y, area.width, 1, bg);
        overlay.put_text(area.x, y, &left, self.palette.title, bg, Modifiers::BOLD);
        if !center.is_empty() {
            let cx = area.x + (width.saturating_sub(center.width()) / 2) as i32;
            overlay.put_text(cx, y, &center, self.palette.text, bg, Modifiers::NONE);
        }
        overlay.put_text(area.right() - right_w as i32, y, &right, self.palette.muted, bg, Modifiers::NONE);
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}
