//! World-to-screen mapping with auto-scale, zoom and pan.
//!
//! The stored `min_*`/`max_*` describe the base range (auto-scaled or
//! fixed). Zoom and pan are applied on top of it through
//! [`Viewport::effective_bounds`], which every projection goes through.

use crate::series::Series;
use dashtier_core::{Point, Rect};

/// Fraction of each axis span added on both sides when auto-scaling.
pub const AUTO_SCALE_PADDING: f64 = 0.05;
/// Multiplier applied per zoom step.
pub const ZOOM_FACTOR: f32 = 1.1;
/// Divisor turning a screen delta into a fraction of the span when panning.
pub const PAN_DIVISOR: f64 = 100.0;

const MIN_ZOOM: f32 = 0.01;
const MAX_ZOOM: f32 = 1000.0;
const MIN_SPAN: f64 = 1e-9;

/// Axis-aligned world rectangle. Always satisfies `min < max` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Left edge.
    pub min_x: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub min_y: f64,
    /// Top edge.
    pub max_y: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0)
    }
}

impl WorldBounds {
    /// Create bounds, repairing inverted, degenerate or non-finite ranges.
    #[must_use]
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        let (min_x, max_x) = normalize_range(min_x, max_x);
        let (min_y, max_y) = normalize_range(min_y, max_y);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Horizontal span.
    #[must_use]
    pub fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical span.
    #[must_use]
    pub fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Normalized position of `(x, y)`; `(0, 0)` is bottom-left.
    #[must_use]
    pub fn normalize(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.min_x) / self.span_x(), (y - self.min_y) / self.span_y())
    }

    /// Whether the point lies inside (edges included).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

fn normalize_range(a: f64, b: f64) -> (f64, f64) {
    let (lo, hi) = match (a.is_finite(), b.is_finite()) {
        (true, true) => (a.min(b), a.max(b)),
        (true, false) => (a, a),
        (false, true) => (b, b),
        (false, false) => (0.0, 1.0),
    };
    if hi - lo < MIN_SPAN {
        let pad = if lo.abs() > 1.0 { lo.abs() * AUTO_SCALE_PADDING } else { 0.5 };
        (lo - pad, hi + pad)
    } else {
        (lo, hi)
    }
}

/// Data-to-screen transform owned by a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Base left edge.
    pub min_x: f64,
    /// Base right edge.
    pub max_x: f64,
    /// Base bottom edge.
    pub min_y: f64,
    /// Base top edge.
    pub max_y: f64,
    /// Recompute the base range from data before each render.
    pub auto_scale: bool,
    /// Magnification (1.0 shows the base range).
    pub zoom_level: f32,
    /// Horizontal pan offset in world units.
    pub pan_x: f64,
    /// Vertical pan offset in world units.
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
            auto_scale: true,
            zoom_level: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    /// Auto-scaling viewport with a unit range until data arrives.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport pinned to a fixed range.
    #[must_use]
    pub fn fixed(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        let mut vp = Self {
            auto_scale: false,
            ..Self::default()
        };
        vp.set_base(WorldBounds::new(min_x, max_x, min_y, max_y));
        vp
    }

    /// Replace the base range.
    pub fn set_base(&mut self, bounds: WorldBounds) {
        self.min_x = bounds.min_x;
        self.max_x = bounds.max_x;
        self.min_y = bounds.min_y;
        self.max_y = bounds.max_y;
    }

    /// Pin the Y axis and keep auto-scaling X only.
    pub fn set_y_range(&mut self, min_y: f64, max_y: f64) {
        let b = WorldBounds::new(self.min_x, self.max_x, min_y, max_y);
        self.min_y = b.min_y;
        self.max_y = b.max_y;
    }

    /// Base range before zoom and pan.
    #[must_use]
    pub fn base_bounds(&self) -> WorldBounds {
        WorldBounds::new(self.min_x, self.max_x, self.min_y, self.max_y)
    }

    /// Range actually projected: base range scaled by zoom around its
    /// center, then shifted by pan.
    #[must_use]
    pub fn effective_bounds(&self) -> WorldBounds {
        let base = self.base_bounds();
        let zoom = f64::from(self.zoom_level.clamp(MIN_ZOOM, MAX_ZOOM));
        let half_x = base.span_x() / zoom / 2.0;
        let half_y = base.span_y() / zoom / 2.0;
        let cx = (base.min_x + base.max_x) / 2.0 + self.pan_x;
        let cy = (base.min_y + base.max_y) / 2.0 + self.pan_y;
        WorldBounds::new(cx - half_x, cx + half_x, cy - half_y, cy + half_y)
    }

    /// Fit the base range to every visible series, padded by 5% per axis.
    ///
    /// No-op when `auto_scale` is off or no visible series has finite data.
    /// `y_floor` keeps a baseline (e.g. zero for bars and areas) in range.
    pub fn update_viewport_bounds(&mut self, series: &[Series], y_floor: Option<f64>) {
        if !self.auto_scale {
            return;
        }
        let extent = series
            .iter()
            .filter(|s| s.visible)
            .filter_map(Series::extent)
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1), a.2.min(b.2), a.3.max(b.3)));
        let Some((x0, x1, mut y0, mut y1)) = extent else {
            return;
        };
        if let Some(floor) = y_floor {
            y0 = y0.min(floor);
            y1 = y1.max(floor);
        }
        let (x0, x1) = pad(x0, x1);
        let (y0, y1) = pad(y0, y1);
        self.set_base(WorldBounds::new(x0, x1, y0, y1));
    }

    /// Project a world point into `bounds` (screen pixels or dots).
    ///
    /// The result spans `[bounds.x, bounds.right() - 1]` horizontally and
    /// grows downward as world Y decreases.
    #[must_use]
    pub fn world_to_screen(&self, x: f64, y: f64, bounds: &Rect) -> Point {
        let (tx, ty) = self.effective_bounds().normalize(x, y);
        let w = f64::from((bounds.width - 1.0).max(0.0));
        let h = f64::from((bounds.height - 1.0).max(0.0));
        Point::new(
            bounds.x + (tx * w) as f32,
            bounds.y + ((1.0 - ty) * h) as f32,
        )
    }

    /// Inverse of [`Viewport::world_to_screen`].
    #[must_use]
    pub fn screen_to_world(&self, point: Point, bounds: &Rect) -> (f64, f64) {
        let eff = self.effective_bounds();
        let w = f64::from((bounds.width - 1.0).max(1.0));
        let h = f64::from((bounds.height - 1.0).max(1.0));
        let tx = f64::from(point.x - bounds.x) / w;
        let ty = 1.0 - f64::from(point.y - bounds.y) / h;
        (eff.min_x + tx * eff.span_x(), eff.min_y + ty * eff.span_y())
    }

    /// Zoom by `steps` factors of [`ZOOM_FACTOR`]; positive zooms in.
    pub fn zoom(&mut self, steps: f32) {
        let factor = ZOOM_FACTOR.powf(steps);
        self.zoom_level = (self.zoom_level * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Shift the view by a screen delta; content follows the pointer.
    pub fn pan(&mut self, screen_dx: f32, screen_dy: f32) {
        let eff = self.effective_bounds();
        self.pan_x -= f64::from(screen_dx) * eff.span_x() / PAN_DIVISOR;
        self.pan_y += f64::from(screen_dy) * eff.span_y() / PAN_DIVISOR;
    }

    /// Drop zoom and pan.
    pub fn reset_view(&mut self) {
        self.zoom_level = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Whether zoom or pan differ from the base view.
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        self.zoom_level != 1.0 || self.pan_x != 0.0 || self.pan_y != 0.0
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let padding = (hi - lo) * AUTO_SCALE_PADDING;
    (lo - padding, hi + padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::DataPoint;
    use dashtier_core::Color;
    use proptest::prelude::*;

    fn series(points: &[(f64, f64)]) -> Series {
        let mut s = Series::new("s", Color::GREEN);
        s.set_points(points.iter().copied().map(DataPoint::from));
        s
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_auto_scale_pads_five_percent() {
        let mut vp = Viewport::new();
        vp.update_viewport_bounds(&[series(&[(10.0, 0.0), (50.0, 100.0)])], None);
        assert!(approx(vp.min_x, 8.0));
        assert!(approx(vp.max_x, 52.0));
        assert!(approx(vp.min_y, -5.0));
        assert!(approx(vp.max_y, 105.0));
    }

    #[test]
    fn test_auto_scale_ignores_hidden_series() {
        let mut hidden = series(&[(-1000.0, -1000.0)]);
        hidden.visible = false;
        let mut vp = Viewport::new();
        vp.update_viewport_bounds(&[series(&[(0.0, 0.0), (10.0, 10.0)]), hidden], None);
        assert!(approx(vp.min_x, -0.5));
    }

    #[test]
    fn test_auto_scale_degenerate_is_padded() {
        let mut vp = Viewport::new();
        vp.update_viewport_bounds(&[series(&[(3.0, 7.0)])], None);
        assert!(vp.min_x < vp.max_x);
        assert!(vp.min_y < vp.max_y);
        assert!(vp.base_bounds().contains(3.0, 7.0));
    }

    #[test]
    fn test_auto_scale_with_floor() {
        let mut vp = Viewport::new();
        vp.update_viewport_bounds(&[series(&[(0.0, 10.0), (1.0, 20.0)])], Some(0.0));
        assert!(approx(vp.min_y, -1.0));
        assert!(approx(vp.max_y, 21.0));
    }

    #[test]
    fn test_fixed_viewport_ignores_data() {
        let mut vp = Viewport::fixed(0.0, 10.0, 0.0, 10.0);
        vp.update_viewport_bounds(&[series(&[(100.0, 100.0), (200.0, 300.0)])], None);
        assert_eq!(vp.max_x, 10.0);
    }

    #[test]
    fn test_world_to_screen_inverts_y() {
        let vp = Viewport::fixed(0.0, 10.0, 0.0, 10.0);
        let bounds = Rect::new(0.0, 0.0, 11.0, 11.0);
        assert_eq!(vp.world_to_screen(0.0, 0.0, &bounds), Point::new(0.0, 10.0));
        assert_eq!(vp.world_to_screen(10.0, 10.0, &bounds), Point::new(10.0, 0.0));
        assert_eq!(vp.world_to_screen(5.0, 5.0, &bounds), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_world_to_screen_offsets_by_bounds() {
        let vp = Viewport::fixed(0.0, 1.0, 0.0, 1.0);
        let bounds = Rect::new(20.0, 30.0, 5.0, 5.0);
        assert_eq!(vp.world_to_screen(0.0, 1.0, &bounds), Point::new(20.0, 30.0));
    }

    #[test]
    fn test_screen_to_world_roundtrip() {
        let vp = Viewport::fixed(-5.0, 5.0, 0.0, 100.0);
        let bounds = Rect::new(0.0, 0.0, 101.0, 51.0);
        let p = vp.world_to_screen(2.5, 40.0, &bounds);
        let (x, y) = vp.screen_to_world(p, &bounds);
        assert!((x - 2.5).abs() < 0.1);
        assert!((y - 40.0).abs() < 2.0);
    }

    #[test]
    fn test_zoom_shrinks_span_around_center() {
        let mut vp = Viewport::fixed(0.0, 100.0, 0.0, 100.0);
        vp.zoom(1.0);
        let eff = vp.effective_bounds();
        assert!((eff.span_x() - 100.0 / 1.1).abs() < 1e-3);
        assert!(((eff.min_x + eff.max_x) / 2.0 - 50.0).abs() < 1e-9);
        vp.zoom(-1.0);
        assert!((vp.effective_bounds().span_x() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_pan_scaled_by_span() {
        let mut vp = Viewport::fixed(0.0, 100.0, 0.0, 50.0);
        vp.pan(10.0, 0.0);
        assert!(approx(vp.pan_x, -10.0));
        let eff = vp.effective_bounds();
        assert!(approx(eff.min_x, -10.0));
        vp.pan(0.0, 2.0);
        assert!(approx(vp.pan_y, 1.0));
        assert!(vp.is_transformed());
        vp.reset_view();
        assert!(!vp.is_transformed());
    }

    #[test]
    fn test_world_bounds_repairs_input() {
        let b = WorldBounds::new(5.0, 1.0, f64::NAN, f64::INFINITY);
        assert_eq!((b.min_x, b.max_x), (1.0, 5.0));
        assert!(b.min_y < b.max_y);
    }

    proptest! {
        #[test]
        fn prop_effective_bounds_ordered(
            x0 in -1e6f64..1e6, x1 in -1e6f64..1e6,
            y0 in -1e6f64..1e6, y1 in -1e6f64..1e6,
            zoom in -20.0f32..20.0, dx in -500.0f32..500.0, dy in -500.0f32..500.0,
        ) {
            let mut vp = Viewport::fixed(x0, x1, y0, y1);
            vp.zoom(zoom);
            vp.pan(dx, dy);
            let eff = vp.effective_bounds();
            prop_assert!(eff.min_x < eff.max_x);
            prop_assert!(eff.min_y < eff.max_y);
        }
    }
}
