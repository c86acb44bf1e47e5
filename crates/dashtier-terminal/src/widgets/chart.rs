//! Shared series chart: data, viewport, interaction and per-mode drawing.
//!
//! [`LineChart`](super::LineChart) and [`AreaChart`](super::AreaChart) are
//! thin wrappers over [`ChartCore`].

use super::{format_value, pixel_color, pixel_rect, put_text, truncate, CellArea, Palette, RenderMode};
use crate::braille::BrailleCanvas;
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::error::{DashError, Result};
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use crate::raster::{bresenham, clip_segment, to_pixel, COORD_LIMIT};
use crate::series::{DataPoint, Series};
use crate::viewport::Viewport;
use dashtier_core::{Color, Event, Key, MouseButton, Point, Rect};

/// Pointer hit radius in cells.
pub const HOVER_RADIUS: f32 = 3.0;

/// Quality below which plotted points are decimated.
pub const DECIMATE_BELOW: f32 = 0.5;

/// Alpha of area fills in pixel modes.
const FILL_ALPHA: u8 = 96;

/// Minimum content width before a value gutter is reserved.
const GUTTER_MIN_WIDTH: u16 = 16;

/// A point by series and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRef {
    /// Series index.
    pub series: usize,
    /// Point index within the series.
    pub index: usize,
}

/// Series chart state and rendering.
#[derive(Debug, Clone)]
pub struct ChartCore {
    mode: RenderMode,
    series: Vec<Series>,
    viewport: Viewport,
    palette: Palette,
    fill: bool,
    y_floor: Option<f64>,
    show_legend: bool,
    hover: Option<PointRef>,
    selected: Option<PointRef>,
    drag_origin: Option<Point>,
}

impl ChartCore {
    /// Empty chart for `tier`; `fill` draws areas down to the baseline.
    #[must_use]
    pub fn new(tier: CapabilityTier, fill: bool) -> Self {
        Self {
            mode: RenderMode::from_tier(tier),
            series: Vec::new(),
            viewport: Viewport::new(),
            palette: Palette::default(),
            fill,
            y_floor: fill.then_some(0.0),
            show_legend: true,
            hover: None,
            selected: None,
            drag_origin: None,
        }
    }

    /// Mode fixed at construction.
    #[must_use]
    pub const fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Replace the theme.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Keep `floor` inside the auto-scaled Y range and use it as the fill baseline.
    pub fn set_y_floor(&mut self, floor: Option<f64>) {
        self.y_floor = floor;
        self.rescale();
    }

    /// Fill baseline, if any.
    #[must_use]
    pub const fn y_floor(&self) -> Option<f64> {
        self.y_floor
    }

    /// Show or hide the legend row.
    pub fn set_show_legend(&mut self, show: bool) {
        self.show_legend = show;
    }

    /// Add a series and return its index.
    pub fn add_series(&mut self, series: Series) -> usize {
        self.series.push(series);
        self.rescale();
        self.series.len() - 1
    }

    /// Append a point to a series.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidSeriesIndex`] if `series` does not exist.
    pub fn add_data_point(&mut self, series: usize, point: DataPoint) -> Result<()> {
        self.series_at(series)?.push(point);
        self.rescale();
        Ok(())
    }

    /// Replace a series' points.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidSeriesIndex`] if `series` does not exist.
    pub fn set_series_data(&mut self, series: usize, points: impl IntoIterator<Item = DataPoint>) -> Result<()> {
        self.series_at(series)?.set_points(points);
        self.rescale();
        Ok(())
    }

    /// Show or hide a series.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidSeriesIndex`] if `series` does not exist.
    pub fn set_series_visible(&mut self, series: usize, visible: bool) -> Result<()> {
        self.series_at(series)?.visible = visible;
        self.rescale();
        Ok(())
    }

    /// All series.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Current viewport.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Replace the viewport; auto-scaling viewports are refit immediately.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.rescale();
    }

    /// Mutable viewport for zoom and pan.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Point under the pointer.
    #[must_use]
    pub const fn hovered(&self) -> Option<PointRef> {
        self.hover
    }

    /// Last clicked point.
    #[must_use]
    pub const fn selected(&self) -> Option<PointRef> {
        self.selected
    }

    /// Whether a pan drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Point data for a reference.
    #[must_use]
    pub fn point(&self, r: PointRef) -> Option<&DataPoint> {
        self.series.get(r.series)?.points.get(r.index)
    }

    fn series_at(&mut self, index: usize) -> Result<&mut Series> {
        let len = self.series.len();
        self.series
            .get_mut(index)
            .ok_or(DashError::InvalidSeriesIndex { index, len })
    }

    fn rescale(&mut self) {
        self.viewport.update_viewport_bounds(&self.series, self.y_floor);
        let valid = |r: &PointRef, series: &[Series]| series.get(r.series).is_some_and(|s| r.index < s.len());
        if !self.hover.is_some_and(|r| valid(&r, &self.series)) {
            self.hover = None;
        }
        if !self.selected.is_some_and(|r| valid(&r, &self.series)) {
            self.selected = None;
        }
    }

    /// Plot area and optional gutter/legend inside `bounds` (cells).
    fn layout(&self, bounds: &Rect) -> (Rect, u16, bool) {
        let area = CellArea::from_rect(bounds);
        let gutter = if area.width >= GUTTER_MIN_WIDTH { 7 } else { 0 };
        let visible = self.series.iter().filter(|s| s.visible).count();
        let legend = self.show_legend && visible > 1 && area.height >= 4;
        let plot = Rect::new(
            bounds.x + f32::from(gutter),
            bounds.y,
            (bounds.width - f32::from(gutter)).max(0.0),
            (bounds.height - if legend { 1.0 } else { 0.0 }).max(0.0),
        );
        (plot, gutter, legend)
    }

    /// Points to draw for a series at `quality`: every point at 0.5 and
    /// above, otherwise every `round(1 / quality)`th plus the newest.
    #[must_use]
    pub fn plotted_points(series: &Series, quality: f32) -> Vec<DataPoint> {
        if quality >= DECIMATE_BELOW || series.len() < 3 {
            return series.points.iter().copied().collect();
        }
        let stride = (1.0 / quality.max(0.01)).round().max(1.0) as usize;
        let mut out: Vec<DataPoint> = series.points.iter().step_by(stride).copied().collect();
        if (series.len() - 1) % stride != 0 {
            if let Some(last) = series.last() {
                out.push(*last);
            }
        }
        out
    }

    /// Linear interpolation of a series at world `x`.
    #[must_use]
    pub fn interpolate(points: &[DataPoint], x: f64) -> Option<f64> {
        points.windows(2).find_map(|w| {
            let (a, b) = (w[0], w[1]);
            if !(a.is_finite() && b.is_finite()) {
                return None;
            }
            let (lo, hi) = if a.x <= b.x { (a, b) } else { (b, a) };
            if x < lo.x || x > hi.x {
                return None;
            }
            let span = hi.x - lo.x;
            if span == 0.0 {
                return Some(lo.y.max(hi.y));
            }
            Some(lo.y + (hi.y - lo.y) * (x - lo.x) / span)
        })
    }

    /// Nearest visible point to `pos` within [`HOVER_RADIUS`] cells.
    #[must_use]
    pub fn nearest_point(&self, pos: Point, bounds: &Rect) -> Option<PointRef> {
        let (plot, _, _) = self.layout(bounds);
        let eff = self.viewport.effective_bounds();
        let mut best: Option<(f32, PointRef)> = None;
        for (si, s) in self.series.iter().enumerate().filter(|(_, s)| s.visible) {
            for (pi, p) in s.points.iter().enumerate() {
                if !p.is_finite() || !eff.contains(p.x, p.y) {
                    continue;
                }
                let d = self.viewport.world_to_screen(p.x, p.y, &plot).distance(&pos);
                if d <= HOVER_RADIUS && best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, PointRef { series: si, index: pi }));
                }
            }
        }
        best.map(|(_, r)| r)
    }

    /// Hover, click-select, wheel zoom, drag pan and view keys.
    pub fn handle_input(&mut self, event: &Event, bounds: &Rect) -> bool {
        match event {
            Event::Scroll { delta_y, .. } => {
                if *delta_y == 0.0 {
                    return false;
                }
                self.viewport.zoom(-delta_y);
                true
            }
            Event::MouseDown {
                position,
                button: MouseButton::Left,
            } => {
                self.selected = self.nearest_point(*position, bounds);
                self.drag_origin = Some(*position);
                true
            }
            Event::MouseDrag { position, .. } => {
                let Some(origin) = self.drag_origin else {
                    return false;
                };
                self.viewport.pan(position.x - origin.x, position.y - origin.y);
                self.drag_origin = Some(*position);
                true
            }
            Event::MouseUp { .. } => self.drag_origin.take().is_some(),
            Event::MouseMove { position } => {
                let hover = self.nearest_point(*position, bounds);
                let changed = hover != self.hover;
                self.hover = hover;
                changed
            }
            Event::KeyDown { key } => match key {
                Key::Char('r') | Key::Home => {
                    self.viewport.reset_view();
                    true
                }
                Key::Char('+' | '=') => {
                    self.viewport.zoom(1.0);
                    true
                }
                Key::Char('-') => {
                    self.viewport.zoom(-1.0);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Draw everything inside `bounds`.
    pub fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let (plot, gutter, legend) = self.layout(bounds);
        if plot.width < 1.0 || plot.height < 1.0 {
            return;
        }
        match self.mode {
            RenderMode::Native | RenderMode::Palette => self.render_pixels(pipeline, &plot),
            RenderMode::Braille => self.render_braille(pipeline, &plot),
            RenderMode::Ascii => self.render_ascii(pipeline, &plot),
        }
        if gutter > 0 {
            self.render_gutter(pipeline, &plot, gutter);
        }
        if legend {
            self.render_legend(pipeline, bounds);
        }
        self.render_tooltip(pipeline, &plot, bounds);
    }

    fn baseline(&self) -> f64 {
        let eff = self.viewport.effective_bounds();
        self.y_floor.unwrap_or(eff.min_y).clamp(eff.min_y, eff.max_y)
    }

    /// Rounded screen position of a world point; far off-screen values are
    /// bounded so later integer math cannot overflow.
    fn project(&self, x: f64, y: f64, screen: &Rect) -> (f64, f64) {
        let p = self.viewport.world_to_screen(x, y, screen);
        let bound = |v: f32| f64::from(v).round().clamp(-COORD_LIMIT, COORD_LIMIT);
        (bound(p.x), bound(p.y))
    }

    fn render_pixels(&self, pipeline: &mut RenderPipeline, plot: &Rect) {
        let quality = pipeline.quality();
        let pr = pixel_rect(pipeline, plot);
        if pr.is_empty() {
            return;
        }
        let screen = pr.to_rect();
        let mode = self.mode;
        let eff = self.viewport.effective_bounds();
        let baseline = self.baseline();
        let min = (f64::from(pr.x), f64::from(pr.y));
        let max = (pr.right() as f64 - 1.0, pr.bottom() as f64 - 1.0);

        let axis = pixel_color(mode, self.palette.muted);
        let (left, bottom) = (pr.x, pr.bottom() as i32 - 1);
        let bg = pipeline.layer_mut(LayerId::Background);
        bg.draw_line(left, pr.y, left, bottom, axis);
        bg.draw_line(left, bottom, pr.right() as i32 - 1, bottom, axis);

        for s in self.series.iter().filter(|s| s.visible) {
            let points = Self::plotted_points(s, quality);
            let color = pixel_color(mode, s.color);
            let screen_pts: Vec<Option<(f64, f64)>> = points
                .iter()
                .map(|p| p.is_finite().then(|| self.project(p.x, p.y, &screen)))
                .collect();
            let layer = pipeline.layer_mut(LayerId::Data);

            if self.fill {
                let fill = color.with_alpha(FILL_ALPHA);
                let clamp_y = |y: f64| to_pixel(y.clamp(min.1, max.1));
                let base_y = clamp_y(self.project(eff.min_x, baseline, &screen).1);
                for w in screen_pts.windows(2) {
                    let (Some(a), Some(b)) = (w[0], w[1]) else { continue };
                    let (a, b) = if a.0 <= b.0 { (a, b) } else { (b, a) };
                    if b.0 <= a.0 || b.0 <= min.0 || a.0 > max.0 {
                        continue;
                    }
                    let last = (b.0 - 1.0).min(max.0);
                    for x in to_pixel(a.0.max(min.0))..=to_pixel(last) {
                        let y = a.1 + (b.1 - a.1) * (f64::from(x) - a.0) / (b.0 - a.0);
                        layer.draw_line(x, clamp_y(y), x, base_y, fill);
                    }
                }
            }

            for (i, w) in screen_pts.windows(2).enumerate() {
                if let (Some(a), Some(b)) = (w[0], w[1]) {
                    if s.line_style.draws_segment(i) {
                        if let Some((p, q)) = clip_segment(a, b, min, max) {
                            layer.draw_line(p.0, p.1, q.0, q.1, color);
                        }
                    }
                }
            }
            if !s.line_style.connects() || screen_pts.len() == 1 {
                for &(x, y) in screen_pts.iter().flatten() {
                    layer.draw_point(to_pixel(x), to_pixel(y), 2, color);
                }
            }
        }

        let accent = pixel_color(mode, self.palette.accent);
        for r in [self.hover, self.selected].into_iter().flatten() {
            if let Some(p) = self.point(r) {
                let (x, y) = self.project(p.x, p.y, &screen);
                pipeline
                    .layer_mut(LayerId::Interactive)
                    .draw_point(to_pixel(x), to_pixel(y), 5, accent);
            }
        }
    }

    fn render_braille(&self, pipeline: &mut RenderPipeline, plot: &Rect) {
        let quality = pipeline.quality();
        let area = CellArea::from_rect(plot);
        let mut canvas = BrailleCanvas::new(area.width, area.height);
        let eff = self.viewport.effective_bounds();
        canvas.set_world_bounds(eff);
        let baseline = self.baseline();

        for s in self.series.iter().filter(|s| s.visible) {
            let points = Self::plotted_points(s, quality);
            if self.fill {
                let dots = canvas.dot_width().max(2);
                let fill = s.color.dim(0.6);
                for dx in 0..dots {
                    let x = eff.min_x + eff.span_x() * f64::from(dx) / f64::from(dots - 1);
                    if let Some(y) = Self::interpolate(&points, x) {
                        canvas.fill_to_baseline(x, y, baseline, fill);
                    }
                }
            }
            canvas.plot_data_points(&points, s.line_style.connects(), s.color);
        }
        canvas.render(pipeline.layer_mut(LayerId::Data).text_mut(), area.x, area.y, self.palette.text);

        for r in [self.hover, self.selected].into_iter().flatten() {
            if let Some(p) = self.point(r) {
                let (x, y) = self.project(p.x, p.y, plot);
                put_text(
                    pipeline,
                    LayerId::Interactive,
                    to_pixel(x),
                    to_pixel(y),
                    "●",
                    self.palette.accent,
                    Modifiers::BOLD,
                );
            }
        }
    }

    fn render_ascii(&self, pipeline: &mut RenderPipeline, plot: &Rect) {
        let quality = pipeline.quality();
        let area = CellArea::from_rect(plot);
        let baseline = self.baseline();
        let inside = |x: i32, y: i32| x >= area.x && y >= area.y && x < area.right() && y < area.bottom();
        let min = (f64::from(area.x), f64::from(area.y));
        let max = (f64::from(area.right() - 1), f64::from(area.bottom() - 1));
        let plane = pipeline.layer_mut(LayerId::Data).text_mut();

        for s in self.series.iter().filter(|s| s.visible) {
            let points = Self::plotted_points(s, quality);
            let cells: Vec<Option<(f64, f64)>> = points
                .iter()
                .map(|p| p.is_finite().then(|| self.project(p.x, p.y, plot)))
                .collect();

            if self.fill {
                let eff = self.viewport.effective_bounds();
                let clamp_y = |y: f64| to_pixel(y.clamp(min.1 - 1.0, max.1 + 1.0));
                let base_y = clamp_y(self.project(eff.min_x, baseline, plot).1);
                for &(x, y) in cells.iter().flatten() {
                    let (x, y) = (to_pixel(x), clamp_y(y));
                    if x < area.x || x >= area.right() {
                        continue;
                    }
                    let (top, bottom) = if y <= base_y { (y + 1, base_y) } else { (base_y, y - 1) };
                    for row in top..=bottom {
                        if inside(x, row) {
                            plane.update(x as u16, row as u16, ":", s.color, Color::TRANSPARENT, Modifiers::NONE);
                        }
                    }
                }
            }

            let mut plot_cell = |x: i32, y: i32| {
                if inside(x, y) {
                    plane.update(x as u16, y as u16, "*", s.color, Color::TRANSPARENT, Modifiers::NONE);
                }
            };
            for (i, w) in cells.windows(2).enumerate() {
                if let (Some(a), Some(b)) = (w[0], w[1]) {
                    if s.line_style.draws_segment(i) {
                        if let Some((p, q)) = clip_segment(a, b, min, max) {
                            bresenham(p.0, p.1, q.0, q.1, &mut plot_cell);
                        }
                    }
                }
            }
            for &(x, y) in cells.iter().flatten() {
                plot_cell(to_pixel(x), to_pixel(y));
            }
        }

        for r in [self.hover, self.selected].into_iter().flatten() {
            if let Some(p) = self.point(r) {
                let (x, y) = self.project(p.x, p.y, plot);
                put_text(
                    pipeline,
                    LayerId::Interactive,
                    to_pixel(x),
                    to_pixel(y),
                    "@",
                    self.palette.accent,
                    Modifiers::BOLD,
                );
            }
        }
    }

    fn render_gutter(&self, pipeline: &mut RenderPipeline, plot: &Rect, gutter: u16) {
        let eff = self.viewport.effective_bounds();
        let area = CellArea::from_rect(plot);
        let width = usize::from(gutter - 1);
        let x = area.x - i32::from(gutter);
        for (row, value) in [(area.y, eff.max_y), (area.bottom() - 1, eff.min_y)] {
            let label = format!("{:>width$}", truncate(&format_value(value, 1), width));
            put_text(pipeline, LayerId::Background, x, row, &label, self.palette.muted, Modifiers::NONE);
        }
    }

    fn render_legend(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        let y = area.bottom() - 1;
        let marker = if self.mode.unicode() { "■ " } else { "* " };
        let mut x = area.x;
        for s in self.series.iter().filter(|s| s.visible) {
            if x >= area.right() {
                break;
            }
            x += i32::from(put_text(pipeline, LayerId::Background, x, y, marker, s.color, Modifiers::NONE));
            let room = usize::try_from(area.right() - x).unwrap_or(0);
            let name = truncate(&s.name, room);
            x += i32::from(put_text(pipeline, LayerId::Background, x, y, &name, self.palette.text, Modifiers::NONE)) + 2;
        }
    }

    fn render_tooltip(&self, pipeline: &mut RenderPipeline, plot: &Rect, bounds: &Rect) {
        let Some(r) = self.hover else { return };
        let (Some(s), Some(p)) = (self.series.get(r.series), self.point(r)) else {
            return;
        };
        let area = CellArea::from_rect(bounds);
        let text = truncate(
            &format!(" {}: {}, {} ", s.name, format_value(p.x, 2), format_value(p.y, 2)),
            usize::from(area.width),
        );
        let width = unicode_width::UnicodeWidthStr::width(text.as_str()) as i32;
        let (px, py) = self.project(p.x, p.y, plot);
        let (px, py) = (to_pixel(px), to_pixel(py));
        let x = (px + 1).min(area.right() - width).max(area.x);
        let y = if py > area.y { py - 1 } else { (py + 1).min(area.bottom() - 1) };
        pipeline
            .layer_mut(LayerId::Overlay)
            .put_text(x, y, &text, self.palette.title, self.palette.panel, Modifiers::NONE);
    }
}

/// Methods shared by the chart wrappers, forwarded to [`ChartCore`].
macro_rules! forward_chart_api {
    ($ty:ty) => {
        impl $ty {
            /// Shared chart state.
            #[must_use]
            pub const fn core(&self) -> &$crate::widgets::ChartCore {
                &self.core
            }

            /// Mutable chart state.
            pub fn core_mut(&mut self) -> &mut $crate::widgets::ChartCore {
                &mut self.core
            }

            /// Add a series and return its index.
            pub fn add_series(&mut self, series: $crate::series::Series) -> usize {
                self.core.add_series(series)
            }

            /// Append a point to a series.
            ///
            /// # Errors
            ///
            /// Returns [`crate::DashError::InvalidSeriesIndex`] if `series` does not exist.
            pub fn add_data_point(&mut self, series: usize, point: $crate::series::DataPoint) -> $crate::error::Result<()> {
                self.core.add_data_point(series, point)
            }

            /// Replace a series' points.
            ///
            /// # Errors
            ///
            /// Returns [`crate::DashError::InvalidSeriesIndex`] if `series` does not exist.
            pub fn set_series_data(
                &mut self,
                series: usize,
                points: impl IntoIterator<Item = $crate::series::DataPoint>,
            ) -> $crate::error::Result<()> {
                self.core.set_series_data(series, points)
            }

            /// Show or hide a series.
            ///
            /// # Errors
            ///
            /// Returns [`crate::DashError::InvalidSeriesIndex`] if `series` does not exist.
            pub fn set_series_visible(&mut self, series: usize, visible: bool) -> $crate::error::Result<()> {
                self.core.set_series_visible(series, visible)
            }

            /// All series.
            #[must_use]
            pub fn series(&self) -> &[$crate::series::Series] {
                self.core.series()
            }

            /// Current viewport.
            #[must_use]
            pub const fn viewport(&self) -> &$crate::viewport::Viewport {
                self.core.viewport()
            }
        }

        impl $crate::widgets::DashWidget for $ty {
            fn render(&self, pipeline: &mut $crate::pipeline::RenderPipeline, bounds: &dashtier_core::Rect) {
                self.core.render(pipeline, bounds);
            }

            fn handle_input(&mut self, event: &dashtier_core::Event, bounds: &dashtier_core::Rect) -> bool {
                self.core.handle_input(event, bounds)
            }

            fn render_mode(&self) -> $crate::widgets::RenderMode {
                self.core.mode()
            }
        }
    };
}

pub(crate) use forward_chart_api;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::tests::pipeline;

    fn chart(tier: CapabilityTier) -> ChartCore {
        let mut c = ChartCore::new(tier, false);
        let s = c.add_series(Series::new("cpu", Color::GREEN));
        c.set_series_data(s, (0..=10).map(|i| DataPoint::new(f64::from(i), f64::from(i * 10))))
            .unwrap();
        c
    }

    #[test]
    fn test_invalid_series_index() {
        let mut c = ChartCore::new(CapabilityTier::High, false);
        let err = c.add_data_point(2, DataPoint::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, DashError::InvalidSeriesIndex { index: 2, len: 0 }));
        assert!(c.series().is_empty());
    }

    #[test]
    fn test_rescale_on_mutation() {
        let c = chart(CapabilityTier::High);
        let base = c.viewport().base_bounds();
        assert!(base.min_x < 0.0 && base.max_x > 10.0);
        assert!(base.min_y < 0.0 && base.max_y > 100.0);
    }

    #[test]
    fn test_decimation_keeps_last() {
        let mut s = Series::new("s", Color::WHITE);
        s.set_points((0..10).map(|i| DataPoint::new(f64::from(i), 0.0)));
        assert_eq!(ChartCore::plotted_points(&s, 1.0).len(), 10);
        let pts = ChartCore::plotted_points(&s, 0.25);
        let xs: Vec<f64> = pts.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 4.0, 8.0, 9.0]);
    }

    #[test]
    fn test_interpolate() {
        let pts = [DataPoint::new(0.0, 0.0), DataPoint::new(10.0, 100.0)];
        assert_eq!(ChartCore::interpolate(&pts, 5.0), Some(50.0));
        assert_eq!(ChartCore::interpolate(&pts, 11.0), None);
    }

    #[test]
    fn test_scroll_zooms_and_home_resets() {
        let mut c = chart(CapabilityTier::High);
        let bounds = Rect::new(0.0, 0.0, 40.0, 10.0);
        let scroll = Event::Scroll {
            position: Point::new(5.0, 5.0),
            delta_x: 0.0,
            delta_y: -1.0,
        };
        assert!(c.handle_input(&scroll, &bounds));
        assert!(c.viewport().zoom_level > 1.0);
        assert!(c.handle_input(&Event::KeyDown { key: Key::Home }, &bounds));
        assert!(!c.viewport().is_transformed());
    }

    #[test]
    fn test_drag_pans() {
        let mut c = chart(CapabilityTier::Standard);
        let bounds = Rect::new(0.0, 0.0, 40.0, 10.0);
        let down = Event::MouseDown {
            position: Point::new(10.0, 5.0),
            button: MouseButton::Left,
        };
        let drag = Event::MouseDrag {
            position: Point::new(20.0, 5.0),
            button: MouseButton::Left,
        };
        c.handle_input(&down, &bounds);
        assert!(c.is_dragging());
        assert!(c.handle_input(&drag, &bounds));
        assert!(c.viewport().pan_x < 0.0);
        assert!(c.handle_input(&Event::MouseUp { position: Point::new(20.0, 5.0), button: MouseButton::Left }, &bounds));
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_hover_finds_nearest() {
        let mut c = chart(CapabilityTier::High);
        let bounds = Rect::new(0.0, 0.0, 40.0, 12.0);
        let (plot, _, _) = c.layout(&bounds);
        let target = c.series()[0].points[5];
        let pos = c.viewport().world_to_screen(target.x, target.y, &plot);
        assert!(c.handle_input(&Event::MouseMove { position: pos }, &bounds));
        assert_eq!(c.hovered(), Some(PointRef { series: 0, index: 5 }));
        let far = Event::MouseMove {
            position: Point::new(plot.x, plot.y),
        };
        c.handle_input(&far, &bounds);
        assert_eq!(c.hovered(), None);
    }

    #[test]
    fn test_hover_cleared_when_data_shrinks() {
        let mut c = chart(CapabilityTier::High);
        c.hover = Some(PointRef { series: 0, index: 9 });
        c.set_series_data(0, vec![DataPoint::new(0.0, 0.0)]).unwrap();
        assert_eq!(c.hovered(), None);
    }

    #[test]
    fn test_pixel_render_draws_data_layer() {
        let mut p = pipeline(CapabilityTier::High, 40, 10);
        let c = chart(CapabilityTier::High);
        c.render(&mut p, &Rect::new(0.0, 0.0, 40.0, 10.0));
        assert!(p.layer(LayerId::Data).pixels().count_set() > 0);
        assert!(p.layer(LayerId::Data).text().is_blank());
    }

    #[test]
    fn test_braille_render_uses_text_plane() {
        let mut p = pipeline(CapabilityTier::Standard, 40, 10);
        let c = chart(CapabilityTier::Standard);
        c.render(&mut p, &Rect::new(0.0, 0.0, 40.0, 10.0));
        let data = p.layer(LayerId::Data);
        assert!(data.pixels().is_clear());
        let braille = data
            .text()
            .cells()
            .iter()
            .filter(|c| c.symbol.chars().next().is_some_and(|ch| ('\u{2801}'..='\u{28ff}').contains(&ch)))
            .count();
        assert!(braille > 0);
    }

    #[test]
    fn test_ascii_render_is_ascii() {
        let mut p = pipeline(CapabilityTier::Minimal, 30, 8);
        let c = chart(CapabilityTier::Minimal);
        c.render(&mut p, &Rect::new(0.0, 0.0, 30.0, 8.0));
        for layer in p.layers() {
            assert!(layer.text().cells().iter().all(|c| c.symbol.is_ascii()));
        }
        assert!(p.layer(LayerId::Data).text().cells().iter().any(|c| c.symbol == "*"));
    }

    #[test]
    fn test_area_fill_reaches_baseline() {
        let mut p = pipeline(CapabilityTier::Minimal, 20, 8);
        let mut c = ChartCore::new(CapabilityTier::Minimal, true);
        c.add_series(Series::new("load", Color::AMBER));
        c.set_series_data(0, vec![DataPoint::new(0.0, 10.0), DataPoint::new(1.0, 10.0)])
            .unwrap();
        c.render(&mut p, &Rect::new(0.0, 0.0, 10.0, 8.0));
        assert!(p.layer(LayerId::Data).text().cells().iter().any(|c| c.symbol == ":"));
    }

    #[test]
    fn test_point_far_outside_fixed_range_is_clipped() {
        for tier in CapabilityTier::ALL {
            let mut p = pipeline(tier, 40, 10);
            let mut c = ChartCore::new(tier, false);
            c.add_series(Series::new("spike", Color::RED));
            let points = [(0.0, 50.0), (5.0, 1e12), (10.0, 50.0)];
            c.set_series_data(0, points.map(|(x, y)| DataPoint::new(x, y))).unwrap();
            c.set_viewport(Viewport::fixed(0.0, 10.0, 0.0, 100.0));
            c.hover = Some(PointRef { series: 0, index: 1 });
            c.render(&mut p, &Rect::new(0.0, 0.0, 40.0, 10.0));
            let data = p.layer(LayerId::Data);
            assert!(data.pixels().count_set() > 0 || !data.text().is_blank(), "{tier:?}");
        }
    }

    #[test]
    fn test_area_chart_at_max_zoom_renders() {
        for tier in CapabilityTier::ALL {
            let mut p = pipeline(tier, 40, 10);
            let mut c = ChartCore::new(tier, true);
            c.add_series(Series::new("mem", Color::BLUE));
            c.set_series_data(0, (0..=20).map(|i| DataPoint::new(f64::from(i), f64::from(i % 7) * 1e6)))
                .unwrap();
            c.viewport_mut().zoom(80.0);
            c.viewport_mut().pan(-5e4, 3e4);
            c.render(&mut p, &Rect::new(0.0, 0.0, 40.0, 10.0));
            let pr = pixel_rect(&p, &Rect::new(0.0, 0.0, 40.0, 10.0));
            let data = p.layer(LayerId::Data).pixels();
            for y in 0..data.height() as i32 {
                for x in 0..data.width() as i32 {
                    if data.get(x, y).is_some_and(|px| !px.is_transparent()) {
                        assert!(pr.contains(x, y), "{tier:?} pixel ({x}, {y}) outside plot");
                    }
                }
            }
        }
    }

    #[test]
    fn test_tooltip_on_overlay() {
        let mut p = pipeline(CapabilityTier::High, 40, 10);
        let mut c = chart(CapabilityTier::High);
        c.hover = Some(PointRef { series: 0, index: 3 });
        c.render(&mut p, &Rect::new(0.0, 0.0, 40.0, 10.0));
        let overlay = p.layer(LayerId::Overlay).text();
        let rows: String = (0..10).map(|y| overlay.row_text(y)).collect();
        assert!(rows.contains("cpu: 3.00, 30.00"));
        assert!(p.layer(LayerId::Interactive).pixels().count_set() > 0);
    }
}
