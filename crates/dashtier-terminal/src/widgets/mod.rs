//! Dashboard widgets.
//!
//! Every widget picks a [`RenderMode`] from the capability tier when it is
//! built and keeps it for its lifetime. Pixel modes draw shapes into layer
//! bitmaps and labels into text planes; text modes draw everything as cells.
//!
//! Widgets are held in a [`Widget`], which adds bounds, visibility, input
//! routing and an optional titled frame around a closed [`WidgetKind`].

mod area_chart;
mod bar_chart;
mod chart;
mod gauge;
mod grid;
mod heatmap;
mod kpi_card;
mod line_chart;
mod sparkline;
mod status_bar;
pub mod symbols;
mod table;

pub use area_chart::AreaChart;
pub use bar_chart::BarChart;
pub use chart::{ChartCore, PointRef};
pub use gauge::{Gauge, GaugeZone, DEFAULT_END_ANGLE, DEFAULT_START_ANGLE};
pub use grid::Grid;
pub use heatmap::{Heatmap, HeatmapPalette};
pub use kpi_card::KpiCard;
pub use line_chart::LineChart;
pub use sparkline::{Sparkline, TrendDirection};
pub use status_bar::StatusBar;
pub use table::Table;

use crate::caps::CapabilityTier;
use crate::color::quantize_256;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use crate::direct::Modifiers;
use dashtier_core::{Color, Event, PixelRect, Rect, Rgba8};
use unicode_width::UnicodeWidthChar;

/// Drawing strategy selected from the capability tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Full-color pixels blended by the compositor.
    Native,
    /// Pixels snapped to the 256-color palette for dithered output.
    Palette,
    /// Braille dots and block characters.
    Braille,
    /// Plain ASCII characters.
    Ascii,
}

impl RenderMode {
    /// Mode for a tier.
    #[must_use]
    pub const fn from_tier(tier: CapabilityTier) -> Self {
        match tier {
            CapabilityTier::High => Self::Native,
            CapabilityTier::Rich => Self::Palette,
            CapabilityTier::Standard => Self::Braille,
            CapabilityTier::Minimal => Self::Ascii,
        }
    }

    /// Whether shapes go into pixel layers.
    #[must_use]
    pub const fn uses_pixels(self) -> bool {
        matches!(self, Self::Native | Self::Palette)
    }

    /// Whether non-ASCII symbols may be used in text.
    #[must_use]
    pub const fn unicode(self) -> bool {
        !matches!(self, Self::Ascii)
    }
}

/// Theme colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Panel fill.
    pub panel: Color,
    /// Frame lines.
    pub border: Color,
    /// Frame titles.
    pub title: Color,
    /// Body text.
    pub text: Color,
    /// Secondary text and axes.
    pub muted: Color,
    /// Highlights and selection.
    pub accent: Color,
    /// Healthy values.
    pub ok: Color,
    /// Values past the warning threshold.
    pub warn: Color,
    /// Values past the critical threshold.
    pub critical: Color,
    /// Series colors, cycled by index.
    pub series: [Color; 6],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            panel: Color::from_rgb8(24, 26, 33),
            border: Color::from_rgb8(88, 96, 115),
            title: Color::from_rgb8(220, 224, 232),
            text: Color::from_rgb8(200, 204, 212),
            muted: Color::from_rgb8(128, 134, 148),
            accent: Color::from_rgb8(97, 175, 239),
            ok: Color::from_rgb8(110, 200, 120),
            warn: Color::AMBER,
            critical: Color::from_rgb8(230, 80, 80),
            series: [
                Color::from_rgb8(97, 175, 239),
                Color::from_rgb8(152, 195, 121),
                Color::from_rgb8(229, 192, 123),
                Color::from_rgb8(198, 120, 221),
                Color::from_rgb8(224, 108, 117),
                Color::from_rgb8(86, 182, 194),
            ],
        }
    }
}

impl Palette {
    /// Series color for index `i`, cycling.
    #[must_use]
    pub fn series_color(&self, i: usize) -> Color {
        self.series[i % self.series.len()]
    }
}

/// Render and input contract shared by every widget kind.
pub trait DashWidget {
    /// Draw into the pipeline's layers within `bounds` (cells).
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect);

    /// Handle an event; returns whether it was consumed.
    fn handle_input(&mut self, _event: &Event, _bounds: &Rect) -> bool {
        false
    }

    /// Mode fixed at construction.
    fn render_mode(&self) -> RenderMode;
}

/// Closed set of widget kinds.
#[derive(Debug, Clone)]
pub enum WidgetKind {
    /// Multi-series line chart.
    LineChart(LineChart),
    /// Line chart filled to a baseline.
    AreaChart(AreaChart),
    /// Labelled bars.
    BarChart(BarChart),
    /// Compact trend line.
    Sparkline(Sparkline),
    /// Value grid colored by magnitude.
    Heatmap(Heatmap),
    /// Arc gauge with needle.
    Gauge(Gauge),
    /// Single headline value.
    KpiCard(KpiCard),
    /// Scrollable rows.
    Table(Table),
    /// Fixed matrix of labelled values.
    Grid(Grid),
    /// Single-row segments.
    StatusBar(StatusBar),
}

impl WidgetKind {
    /// Kind name as used in configuration.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LineChart(_) => "line_chart",
            Self::AreaChart(_) => "area_chart",
            Self::BarChart(_) => "bar_chart",
            Self::Sparkline(_) => "sparkline",
            Self::Heatmap(_) => "heatmap",
            Self::Gauge(_) => "gauge",
            Self::KpiCard(_) => "kpi_card",
            Self::Table(_) => "table",
            Self::Grid(_) => "grid",
            Self::StatusBar(_) => "status_bar",
        }
    }

    /// Borrow as the shared trait.
    #[must_use]
    pub fn as_widget(&self) -> &dyn DashWidget {
        match self {
            Self::LineChart(w) => w,
            Self::AreaChart(w) => w,
            Self::BarChart(w) => w,
            Self::Sparkline(w) => w,
            Self::Heatmap(w) => w,
            Self::Gauge(w) => w,
            Self::KpiCard(w) => w,
            Self::Table(w) => w,
            Self::Grid(w) => w,
            Self::StatusBar(w) => w,
        }
    }

    /// Mutably borrow as the shared trait.
    pub fn as_widget_mut(&mut self) -> &mut dyn DashWidget {
        match self {
            Self::LineChart(w) => w,
            Self::AreaChart(w) => w,
            Self::BarChart(w) => w,
            Self::Sparkline(w) => w,
            Self::Heatmap(w) => w,
            Self::Gauge(w) => w,
            Self::KpiCard(w) => w,
            Self::Table(w) => w,
            Self::Grid(w) => w,
            Self::StatusBar(w) => w,
        }
    }

    /// Whether this kind reacts to input at all.
    #[must_use]
    pub const fn accepts_input(&self) -> bool {
        matches!(
            self,
            Self::LineChart(_) | Self::AreaChart(_) | Self::BarChart(_) | Self::Table(_)
        )
    }
}

/// A placed widget.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Placement in cells.
    pub bounds: Rect,
    /// Hidden widgets neither draw nor receive input.
    pub visible: bool,
    /// Whether input is routed to this widget.
    pub interactive: bool,
    /// Frame title; `None` with `framed` still draws a bare frame.
    pub title: Option<String>,
    /// Draw a frame around the content.
    pub framed: bool,
    /// Frame colors.
    pub palette: Palette,
    /// Concrete widget.
    pub kind: WidgetKind,
}

macro_rules! widget_accessors {
    ($($name:ident, $name_mut:ident => $variant:ident($ty:ty);)*) => {
        $(
            #[doc = concat!("The inner [`", stringify!($ty), "`], if this widget is one.")]
            #[must_use]
            pub fn $name(&self) -> Option<&$ty> {
                match &self.kind {
                    WidgetKind::$variant(w) => Some(w),
                    _ => None,
                }
            }

            #[doc = concat!("Mutable inner [`", stringify!($ty), "`], if this widget is one.")]
            pub fn $name_mut(&mut self) -> Option<&mut $ty> {
                match &mut self.kind {
                    WidgetKind::$variant(w) => Some(w),
                    _ => None,
                }
            }
        )*
    };
}

impl Widget {
    /// Visible, framed widget; interactive when the kind accepts input.
    #[must_use]
    pub fn new(kind: WidgetKind, bounds: Rect) -> Self {
        Self {
            bounds,
            visible: true,
            interactive: kind.accepts_input(),
            title: None,
            framed: !matches!(kind, WidgetKind::StatusBar(_)),
            palette: Palette::default(),
            kind,
        }
    }

    /// Set the frame title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable or disable the frame.
    #[must_use]
    pub fn with_frame(mut self, framed: bool) -> Self {
        self.framed = framed;
        self
    }

    /// Enable or disable input routing.
    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Area inside the frame.
    #[must_use]
    pub fn content_bounds(&self) -> Rect {
        if self.framed && self.bounds.width >= 3.0 && self.bounds.height >= 3.0 {
            self.bounds.inset(1.0)
        } else {
            self.bounds
        }
    }

    /// Kind name.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    widget_accessors! {
        line_chart, line_chart_mut => LineChart(LineChart);
        area_chart, area_chart_mut => AreaChart(AreaChart);
        bar_chart, bar_chart_mut => BarChart(BarChart);
        sparkline, sparkline_mut => Sparkline(Sparkline);
        heatmap, heatmap_mut => Heatmap(Heatmap);
        gauge, gauge_mut => Gauge(Gauge);
        kpi_card, kpi_card_mut => KpiCard(KpiCard);
        table, table_mut => Table(Table);
        grid, grid_mut => Grid(Grid);
        status_bar, status_bar_mut => StatusBar(StatusBar);
    }

    /// Draw the frame and the content.
    pub fn render(&self, pipeline: &mut RenderPipeline) {
        if !self.visible || self.bounds.is_empty() {
            return;
        }
        let mode = self.kind.as_widget().render_mode();
        if self.framed {
            draw_frame(pipeline, &self.bounds, self.title.as_deref(), mode, &self.palette);
        }
        self.kind.as_widget().render(pipeline, &self.content_bounds());
    }

    /// Route an event; pointer events must land inside the bounds, except
    /// drag and release which always reach the widget that may own a drag.
    pub fn handle_input(&mut self, event: &Event) -> bool {
        if !self.visible || !self.interactive {
            return false;
        }
        let inside = match event {
            Event::MouseDrag { .. } | Event::MouseUp { .. } => true,
            _ => event
                .position()
                .map_or(true, |p| self.bounds.contains_point(&p)),
        };
        if !inside {
            return false;
        }
        let content = self.content_bounds();
        self.kind.as_widget_mut().handle_input(event, &content)
    }
}

/// Integer cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct CellArea {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: u16,
    pub(crate) height: u16,
}

impl CellArea {
    pub(crate) fn from_rect(bounds: &Rect) -> Self {
        Self {
            x: bounds.x.floor() as i32,
            y: bounds.y.floor() as i32,
            width: bounds.width.max(0.0).min(f32::from(u16::MAX)) as u16,
            height: bounds.height.max(0.0).min(f32::from(u16::MAX)) as u16,
        }
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub(crate) fn right(&self) -> i32 {
        self.x + i32::from(self.width)
    }

    pub(crate) fn bottom(&self) -> i32 {
        self.y + i32::from(self.height)
    }
}

/// Pixel value for a color in a pixel mode.
pub(crate) fn pixel_color(mode: RenderMode, color: Color) -> Rgba8 {
    let px = color.to_rgba8();
    match mode {
        RenderMode::Palette => quantize_256(px),
        _ => px,
    }
}

/// Cell rectangle converted to layer pixels.
pub(crate) fn pixel_rect(pipeline: &RenderPipeline, bounds: &Rect) -> PixelRect {
    pipeline.surface().to_pixels(bounds)
}

/// Text keeping the background already present at its first cell.
pub(crate) fn put_text(
    pipeline: &mut RenderPipeline,
    layer: LayerId,
    x: i32,
    y: i32,
    text: &str,
    fg: Color,
    modifiers: Modifiers,
) -> u16 {
    let layer = pipeline.layer_mut(layer);
    let bg = u16::try_from(x)
        .ok()
        .zip(u16::try_from(y).ok())
        .and_then(|(cx, cy)| layer.text().get(cx, cy))
        .map_or(Color::TRANSPARENT, |c| c.bg);
    layer.put_text(x, y, text, fg, bg, modifiers)
}

/// Rectangle outline in the mode's style.
pub(crate) fn draw_border(pipeline: &mut RenderPipeline, layer: LayerId, bounds: &Rect, mode: RenderMode, color: Color) {
    if mode.uses_pixels() {
        let r = pixel_rect(pipeline, bounds);
        if r.is_empty() {
            return;
        }
        let px = pixel_color(mode, color);
        let (x0, y0) = (r.x, r.y);
        let (x1, y1) = (r.right() as i32 - 1, r.bottom() as i32 - 1);
        let l = pipeline.layer_mut(layer);
        l.draw_line(x0, y0, x1, y0, px);
        l.draw_line(x0, y1, x1, y1, px);
        l.draw_line(x0, y0, x0, y1, px);
        l.draw_line(x1, y0, x1, y1, px);
        return;
    }

    let area = CellArea::from_rect(bounds);
    if area.width < 2 || area.height < 2 {
        return;
    }
    let set = if mode.unicode() { symbols::ROUNDED } else { symbols::ASCII_BORDER };
    let mut buf = [0u8; 4];
    let horizontal: String = std::iter::repeat(set.horizontal)
        .take(usize::from(area.width - 2))
        .collect();
    let (right, bottom) = (area.right() - 1, area.bottom() - 1);
    for (y, left, right_corner) in [
        (area.y, set.top_left, set.top_right),
        (bottom, set.bottom_left, set.bottom_right),
    ] {
        put_text(pipeline, layer, area.x, y, left.encode_utf8(&mut buf), color, Modifiers::NONE);
        put_text(pipeline, layer, area.x + 1, y, &horizontal, color, Modifiers::NONE);
        put_text(pipeline, layer, right, y, right_corner.encode_utf8(&mut buf), color, Modifiers::NONE);
    }
    let vertical = set.vertical.encode_utf8(&mut buf).to_string();
    for y in area.y + 1..bottom {
        put_text(pipeline, layer, area.x, y, &vertical, color, Modifiers::NONE);
        put_text(pipeline, layer, right, y, &vertical, color, Modifiers::NONE);
    }
}

/// Solid panel background in the mode's style; ASCII has none.
pub(crate) fn fill_panel(pipeline: &mut RenderPipeline, layer: LayerId, bounds: &Rect, mode: RenderMode, color: Color) {
    match mode {
        RenderMode::Native | RenderMode::Palette => {
            let r = pixel_rect(pipeline, bounds);
            let px = pixel_color(mode, color);
            pipeline
                .layer_mut(layer)
                .draw_rect(r.x, r.y, r.width as i32, r.height as i32, px);
        }
        RenderMode::Braille => {
            let a = CellArea::from_rect(bounds);
            pipeline.layer_mut(layer).fill_cells(a.x, a.y, a.width, a.height, color);
        }
        RenderMode::Ascii => {}
    }
}

fn draw_frame(pipeline: &mut RenderPipeline, bounds: &Rect, title: Option<&str>, mode: RenderMode, palette: &Palette) {
    fill_panel(pipeline, LayerId::Background, bounds, mode, palette.panel);
    draw_border(pipeline, LayerId::Background, bounds, mode, palette.border);
    if let Some(title) = title {
        let area = CellArea::from_rect(bounds);
        let room = usize::from(area.width.saturating_sub(4));
        if room > 0 {
            let label = format!(" {} ", truncate(title, room.saturating_sub(2)));
            put_text(pipeline, LayerId::Background, area.x + 1, area.y, &label, palette.title, Modifiers::BOLD);
        }
    }
}

/// Compact number: `k`, `M`, `G` suffixes from ten thousand up.
#[must_use]
pub fn format_value(v: f64, precision: usize) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}G", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e4 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.precision$}")
    }
}

/// Cut `s` to at most `width` display columns.
#[must_use]
pub fn truncate(s: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Normalize `v` into `[0, 1]` over `[min, max]`; degenerate ranges give 0.
pub(crate) fn normalize(v: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !v.is_finite() || span <= 0.0 || !span.is_finite() {
        return 0.0;
    }
    ((v - min) / span).clamp(0.0, 1.0)
}
