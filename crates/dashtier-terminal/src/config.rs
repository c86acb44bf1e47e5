//! Dashboard configuration loaded from YAML.
//!
//! ```yaml
//! title: "node-01"
//! target_fps: 30
//! layout:
//!   columns: 2
//!   rows: 2
//! widgets:
//!   - type: line_chart
//!     title: "cpu"
//!     series: ["user", "system"]
//!     placement: { column: 0, row: 0, column_span: 2 }
//!   - type: gauge
//!     title: "mem"
//!     max: 64
//!     placement: { column: 0, row: 1 }
//! ```

use crate::caps::CapabilityTier;
use crate::error::{DashError, Result};
use crate::widgets::HeatmapPalette;
use dashtier_core::Rect;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Dashboard title.
    #[serde(default)]
    pub title: String,
    /// Frames per second the budget aims for.
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    /// Frame-time samples kept by the budget.
    #[serde(default = "default_frame_history")]
    pub frame_history: usize,
    /// Force a tier instead of detecting one.
    #[serde(default)]
    pub tier_override: Option<CapabilityTier>,
    /// Pixel size of one cell on graphics tiers.
    #[serde(default)]
    pub cell_pixels: CellPixels,
    /// Grid the widgets are placed on.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Widgets in drawing order; later entries sit on top.
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
}

fn default_target_fps() -> u32 {
    30
}

fn default_frame_history() -> usize {
    crate::budget::DEFAULT_HISTORY
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            target_fps: default_target_fps(),
            frame_history: default_frame_history(),
            tier_override: None,
            cell_pixels: CellPixels::default(),
            layout: LayoutConfig::default(),
            widgets: Vec::new(),
        }
    }
}

/// Terminal cell size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPixels {
    /// Cell width.
    #[serde(default = "default_cell_width")]
    pub width: u32,
    /// Cell height.
    #[serde(default = "default_cell_height")]
    pub height: u32,
}

fn default_cell_width() -> u32 {
    8
}

fn default_cell_height() -> u32 {
    16
}

impl Default for CellPixels {
    fn default() -> Self {
        Self {
            width: default_cell_width(),
            height: default_cell_height(),
        }
    }
}

/// Uniform grid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Grid columns.
    #[serde(default = "default_grid_columns")]
    pub columns: u16,
    /// Grid rows.
    #[serde(default = "default_grid_rows")]
    pub rows: u16,
    /// Gap between tracks in cells.
    #[serde(default)]
    pub gap: u16,
}

fn default_grid_columns() -> u16 {
    2
}

fn default_grid_rows() -> u16 {
    2
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: default_grid_columns(),
            rows: default_grid_rows(),
            gap: 0,
        }
    }
}

impl LayoutConfig {
    /// Cell bounds of `placement` on a `columns × rows` terminal.
    ///
    /// Tracks share the space left after gaps; remainders go to later tracks.
    #[must_use]
    pub fn cell_bounds(&self, placement: &GridPlacement, columns: u16, rows: u16) -> Rect {
        let (x, width) = track_span(columns, self.columns, self.gap, placement.column, placement.column_span);
        let (y, height) = track_span(rows, self.rows, self.gap, placement.row, placement.row_span);
        Rect::new(f32::from(x), f32::from(y), f32::from(width), f32::from(height))
    }
}

/// Start and length of tracks `start..start + span` out of `tracks` over `total` cells.
fn track_span(total: u16, tracks: u16, gap: u16, start: u16, span: u16) -> (u16, u16) {
    let tracks = u32::from(tracks.max(1));
    let gap = u32::from(gap);
    let avail = u32::from(total).saturating_sub(gap * (tracks - 1));
    let edge = |k: u32| k * avail / tracks + k * gap;
    let start = u32::from(start).min(tracks);
    let end = (start + u32::from(span.max(1))).min(tracks);
    let x0 = edge(start);
    let x1 = edge(end).saturating_sub(gap);
    let len = x1.saturating_sub(x0);
    (x0.min(u32::from(u16::MAX)) as u16, len.min(u32::from(u16::MAX)) as u16)
}

/// Grid cell range a widget occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlacement {
    /// First column.
    #[serde(default)]
    pub column: u16,
    /// First row.
    #[serde(default)]
    pub row: u16,
    /// Columns covered.
    #[serde(default = "default_span")]
    pub column_span: u16,
    /// Rows covered.
    #[serde(default = "default_span")]
    pub row_span: u16,
}

fn default_span() -> u16 {
    1
}

impl Default for GridPlacement {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl GridPlacement {
    /// Single-track placement.
    #[must_use]
    pub const fn new(column: u16, row: u16) -> Self {
        Self {
            column,
            row,
            column_span: 1,
            row_span: 1,
        }
    }

    /// Cover `columns × rows` tracks.
    #[must_use]
    pub const fn span(mut self, columns: u16, rows: u16) -> Self {
        self.column_span = columns;
        self.row_span = rows;
        self
    }
}

/// One widget entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    /// Frame title.
    #[serde(default)]
    pub title: Option<String>,
    /// Widget kind and its parameters (`type:` tag).
    #[serde(flatten)]
    pub kind: WidgetKindSpec,
    /// Grid placement.
    #[serde(default)]
    pub placement: GridPlacement,
    /// Override whether the widget receives input.
    #[serde(default)]
    pub interactive: Option<bool>,
}

impl WidgetSpec {
    /// Spec without title at `placement`.
    #[must_use]
    pub const fn new(kind: WidgetKindSpec, placement: GridPlacement) -> Self {
        Self {
            title: None,
            kind,
            placement,
            interactive: None,
        }
    }

    /// Set the frame title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Widget kinds with their construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetKindSpec {
    /// Line chart.
    LineChart {
        /// Series names, one series each.
        #[serde(default)]
        series: Vec<String>,
        /// Bounded history per series.
        #[serde(default)]
        max_points: Option<usize>,
    },
    /// Filled area chart.
    AreaChart {
        /// Series names.
        #[serde(default)]
        series: Vec<String>,
        /// Bounded history per series.
        #[serde(default)]
        max_points: Option<usize>,
        /// Fill baseline.
        #[serde(default)]
        baseline: Option<f64>,
    },
    /// Horizontal bar chart.
    BarChart {
        /// Fixed value range.
        #[serde(default)]
        range: Option<(f64, f64)>,
    },
    /// Sparkline.
    Sparkline {
        /// Samples kept.
        #[serde(default)]
        capacity: Option<usize>,
        /// Fixed value range.
        #[serde(default)]
        range: Option<(f64, f64)>,
    },
    /// Heatmap matrix.
    Heatmap {
        /// Matrix rows.
        rows: usize,
        /// Matrix columns.
        cols: usize,
        /// Gradient.
        #[serde(default)]
        palette: HeatmapPalette,
        /// Fixed value range.
        #[serde(default)]
        range: Option<(f64, f64)>,
    },
    /// Radial gauge.
    Gauge {
        /// Range minimum.
        #[serde(default)]
        min: f64,
        /// Range maximum.
        #[serde(default = "default_gauge_max")]
        max: f64,
        /// Sweep start in degrees.
        #[serde(default = "default_start_angle")]
        start_angle: f32,
        /// Sweep end in degrees.
        #[serde(default = "default_end_angle")]
        end_angle: f32,
        /// Warning threshold.
        #[serde(default)]
        warn: Option<f64>,
        /// Critical threshold.
        #[serde(default)]
        critical: Option<f64>,
        /// Unit suffix.
        #[serde(default)]
        unit: String,
    },
    /// KPI card.
    KpiCard {
        /// Caption.
        #[serde(default)]
        label: String,
        /// Unit suffix.
        #[serde(default)]
        unit: String,
        /// Decimal places.
        #[serde(default = "default_precision")]
        precision: usize,
        /// Whether increases are good.
        #[serde(default = "default_true")]
        higher_is_better: bool,
    },
    /// Table.
    Table {
        /// Header labels.
        #[serde(default)]
        columns: Vec<String>,
        /// Row limit for appended rows.
        #[serde(default)]
        max_rows: Option<usize>,
    },
    /// Labelled value grid.
    Grid {
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },
    /// Status line.
    StatusBar {
        /// Show fps, quality and tier on the right.
        #[serde(default = "default_true")]
        show_stats: bool,
    },
}

fn default_gauge_max() -> f64 {
    100.0
}

fn default_start_angle() -> f32 {
    crate::widgets::DEFAULT_START_ANGLE
}

fn default_end_angle() -> f32 {
    crate::widgets::DEFAULT_END_ANGLE
}

fn default_precision() -> usize {
    1
}

fn default_true() -> bool {
    true
}

impl WidgetKindSpec {
    /// Kind tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LineChart { .. } => "line_chart",
            Self::AreaChart { .. } => "area_chart",
            Self::BarChart { .. } => "bar_chart",
            Self::Sparkline { .. } => "sparkline",
            Self::Heatmap { .. } => "heatmap",
            Self::Gauge { .. } => "gauge",
            Self::KpiCard { .. } => "kpi_card",
            Self::Table { .. } => "table",
            Self::Grid { .. } => "grid",
            Self::StatusBar { .. } => "status_bar",
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let check_range = |range: &Option<(f64, f64)>| match range {
            Some((min, max)) if !(min.is_finite() && max.is_finite() && min < max) => {
                Err(format!("invalid range {min}..{max}"))
            }
            _ => Ok(()),
        };
        match self {
            Self::BarChart { range } | Self::Sparkline { range, .. } => check_range(range),
            Self::Heatmap { rows, cols, range, .. } => {
                if *rows == 0 || *cols == 0 {
                    return Err(format!("heatmap dimensions {rows}x{cols} must be non-zero"));
                }
                check_range(range)
            }
            Self::Gauge {
                min,
                max,
                start_angle,
                end_angle,
                ..
            } => {
                if !(min.is_finite() && max.is_finite() && min < max) {
                    return Err(format!("invalid gauge range {min}..{max}"));
                }
                if !(start_angle.is_finite() && end_angle.is_finite()) || start_angle == end_angle {
                    return Err(format!("invalid gauge sweep {start_angle}..{end_angle}"));
                }
                Ok(())
            }
            Self::Grid { rows, cols } if *rows == 0 || *cols == 0 => {
                Err(format!("grid dimensions {rows}x{cols} must be non-zero"))
            }
            _ => Ok(()),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Config`] on malformed YAML and
    /// [`DashError::InvalidConfig`] when validation fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Io`] if the file cannot be read, otherwise as
    /// [`DashboardConfig::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), widgets = config.widgets.len(), "dashboard config loaded");
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Config`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DashError::InvalidConfig(msg));
        if self.target_fps == 0 {
            return invalid("target_fps must be positive".into());
        }
        if self.frame_history == 0 {
            return invalid("frame_history must be positive".into());
        }
        if self.cell_pixels.width == 0 || self.cell_pixels.height == 0 {
            return invalid("cell_pixels must be non-zero".into());
        }
        if self.layout.columns == 0 || self.layout.rows == 0 {
            return invalid("layout must have at least one column and row".into());
        }
        for (i, spec) in self.widgets.iter().enumerate() {
            let name = spec.kind.name();
            let p = &spec.placement;
            if p.column_span == 0 || p.row_span == 0 {
                return invalid(format!("widget {i} ({name}): spans must be at least 1"));
            }
            let col_end = u32::from(p.column) + u32::from(p.column_span);
            let row_end = u32::from(p.row) + u32::from(p.row_span);
            if col_end > u32::from(self.layout.columns) || row_end > u32::from(self.layout.rows) {
                return invalid(format!(
                    "widget {i} ({name}): placement outside the {}x{} grid",
                    self.layout.columns, self.layout.rows
                ));
            }
            if let Err(msg) = spec.kind.validate() {
                return invalid(format!("widget {i} ({name}): {msg}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_YAML: &str = r#"
title: "node-01"
target_fps: 20
tier_override: standard
layout:
  columns: 2
  rows: 3
  gap: 1
widgets:
  - type: line_chart
    title: "cpu"
    series: ["user", "system"]
    max_points: 300
    placement: { column: 0, row: 0, column_span: 2 }
  - type: gauge
    title: "mem"
    max: 64
    warn: 48
    unit: "G"
    placement: { column: 0, row: 1 }
  - type: heatmap
    rows: 4
    cols: 8
    palette: viridis
    placement: { column: 1, row: 1 }
  - type: status_bar
    placement: { column: 0, row: 2, column_span: 2 }
"#;

    #[test]
    fn test_parse_config() {
        let config = DashboardConfig::from_yaml_str(EXAMPLE_YAML).unwrap();
        assert_eq!(config.title, "node-01");
        assert_eq!(config.target_fps, 20);
        assert_eq!(config.frame_history, 60);
        assert_eq!(config.tier_override, Some(CapabilityTier::Standard));
        assert_eq!(config.cell_pixels, CellPixels { width: 8, height: 16 });
        assert_eq!(config.widgets.len(), 4);
    }

    #[test]
    fn test_parse_widget_kinds() {
        let config = DashboardConfig::from_yaml_str(EXAMPLE_YAML).unwrap();
        assert_eq!(
            config.widgets[0].kind,
            WidgetKindSpec::LineChart {
                series: vec!["user".into(), "system".into()],
                max_points: Some(300),
            }
        );
        assert_eq!(config.widgets[0].placement.column_span, 2);
        match &config.widgets[1].kind {
            WidgetKindSpec::Gauge {
                min,
                max,
                start_angle,
                warn,
                unit,
                ..
            } => {
                assert_eq!((*min, *max), (0.0, 64.0));
                assert_eq!(*start_angle, 135.0);
                assert_eq!(*warn, Some(48.0));
                assert_eq!(unit, "G");
            }
            other => panic!("expected gauge, got {other:?}"),
        }
        assert!(matches!(
            config.widgets[2].kind,
            WidgetKindSpec::Heatmap {
                palette: HeatmapPalette::Viridis,
                ..
            }
        ));
        assert_eq!(config.widgets[3].kind, WidgetKindSpec::StatusBar { show_stats: true });
    }

    #[test]
    fn test_defaults_from_empty_document() {
        let config = DashboardConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = DashboardConfig::from_yaml_str("widgets: [ { type: nope } ]").unwrap_err();
        assert!(matches!(err, DashError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_fps() {
        let err = DashboardConfig::from_yaml_str("target_fps: 0").unwrap_err();
        assert!(matches!(err, DashError::InvalidConfig(msg) if msg.contains("target_fps")));
    }

    #[test]
    fn test_validate_rejects_placement_outside_grid() {
        let yaml = "layout: { columns: 2, rows: 1 }\nwidgets:\n  - type: table\n    placement: { column: 1, row: 0, column_span: 2 }\n";
        let err = DashboardConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, DashError::InvalidConfig(msg) if msg.contains("widget 0 (table)")));
    }

    #[test]
    fn test_validate_rejects_inverted_gauge_range() {
        let yaml = "widgets:\n  - type: gauge\n    min: 10\n    max: 5\n";
        assert!(matches!(
            DashboardConfig::from_yaml_str(yaml),
            Err(DashError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cell_bounds_with_gap() {
        let layout = LayoutConfig {
            columns: 2,
            rows: 2,
            gap: 1,
        };
        assert_eq!(
            layout.cell_bounds(&GridPlacement::new(0, 0), 81, 25),
            Rect::new(0.0, 0.0, 40.0, 12.0)
        );
        assert_eq!(
            layout.cell_bounds(&GridPlacement::new(1, 1), 81, 25),
            Rect::new(41.0, 13.0, 40.0, 12.0)
        );
        assert_eq!(
            layout.cell_bounds(&GridPlacement::new(0, 0).span(2, 1), 81, 25),
            Rect::new(0.0, 0.0, 81.0, 12.0)
        );
    }

    #[test]
    fn test_cell_bounds_tiles_without_gap() {
        let layout = LayoutConfig {
            columns: 3,
            rows: 1,
            gap: 0,
        };
        let widths: f32 = (0..3)
            .map(|c| layout.cell_bounds(&GridPlacement::new(c, 0), 80, 10).width)
            .sum();
        assert_eq!(widths, 80.0);
    }

    #[test]
    fn test_yaml_roundtrip_keeps_widgets() {
        let config = DashboardConfig::from_yaml_str(EXAMPLE_YAML).unwrap();
        let back = DashboardConfig::from_yaml_str(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
