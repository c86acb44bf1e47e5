//! Widget construction bound to one capability tier.

use crate::caps::CapabilityTier;
use crate::config::{WidgetKindSpec, WidgetSpec};
use crate::series::Series;
use crate::widgets::{
    AreaChart, BarChart, Gauge, Grid, Heatmap, KpiCard, LineChart, Palette, Sparkline, StatusBar, Table, Widget,
    WidgetKind,
};
use dashtier_core::Rect;

/// Builds widgets whose render mode matches the engine's tier.
#[derive(Debug, Clone)]
pub struct WidgetFactory {
    tier: CapabilityTier,
    palette: Palette,
}

impl WidgetFactory {
    /// Factory for `tier` with the default palette.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            tier,
            palette: Palette::default(),
        }
    }

    /// Series colors come from `palette`.
    #[must_use]
    pub const fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Tier every built widget renders for.
    #[must_use]
    pub const fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Empty line chart.
    #[must_use]
    pub fn line_chart(&self) -> LineChart {
        LineChart::new(self.tier)
    }

    /// Empty area chart.
    #[must_use]
    pub fn area_chart(&self) -> AreaChart {
        AreaChart::new(self.tier)
    }

    /// Empty bar chart.
    #[must_use]
    pub fn bar_chart(&self) -> BarChart {
        BarChart::new(self.tier)
    }

    /// Empty sparkline.
    #[must_use]
    pub fn sparkline(&self) -> Sparkline {
        Sparkline::new(self.tier)
    }

    /// Empty heatmap.
    #[must_use]
    pub fn heatmap(&self) -> Heatmap {
        Heatmap::new(self.tier)
    }

    /// Gauge over `[0, 100]`.
    #[must_use]
    pub fn gauge(&self) -> Gauge {
        Gauge::new(self.tier)
    }

    /// Empty KPI card.
    #[must_use]
    pub fn kpi_card(&self) -> KpiCard {
        KpiCard::new(self.tier)
    }

    /// Empty table.
    #[must_use]
    pub fn table(&self) -> Table {
        Table::new(self.tier)
    }

    /// Grid of empty cells.
    #[must_use]
    pub fn grid(&self, rows: usize, cols: usize) -> Grid {
        Grid::new(self.tier, rows, cols)
    }

    /// Empty status bar.
    #[must_use]
    pub fn status_bar(&self) -> StatusBar {
        StatusBar::new(self.tier)
    }

    fn named_series<'a>(
        &'a self,
        names: &'a [String],
        max_points: Option<usize>,
    ) -> impl Iterator<Item = Series> + 'a {
        names.iter().enumerate().map(move |(i, name)| {
            let series = Series::new(name.clone(), self.palette.series_color(i));
            match max_points {
                Some(max) => series.with_max_points(max),
                None => series,
            }
        })
    }

    /// Widget kind described by `spec`.
    #[must_use]
    pub fn create(&self, spec: &WidgetKindSpec) -> WidgetKind {
        match spec {
            WidgetKindSpec::LineChart { series, max_points } => WidgetKind::LineChart(
                self.named_series(series, *max_points)
                    .fold(self.line_chart(), LineChart::with_series),
            ),
            WidgetKindSpec::AreaChart {
                series,
                max_points,
                baseline,
            } => {
                let mut chart = self
                    .named_series(series, *max_points)
                    .fold(self.area_chart(), AreaChart::with_series);
                if let Some(baseline) = baseline {
                    chart = chart.with_baseline(*baseline);
                }
                WidgetKind::AreaChart(chart)
            }
            WidgetKindSpec::BarChart { range } => {
                let mut chart = self.bar_chart();
                if let Some((min, max)) = range {
                    chart.set_value_range(*min, *max);
                }
                WidgetKind::BarChart(chart)
            }
            WidgetKindSpec::Sparkline { capacity, range } => {
                let mut spark = self.sparkline();
                if let Some(capacity) = capacity {
                    spark = spark.with_capacity(*capacity);
                }
                if let Some((min, max)) = range {
                    spark = spark.with_range(*min, *max);
                }
                WidgetKind::Sparkline(spark)
            }
            WidgetKindSpec::Heatmap {
                rows,
                cols,
                palette,
                range,
            } => {
                let mut heatmap = self.heatmap().with_palette(*palette);
                heatmap.set_data(*rows, *cols, std::iter::empty());
                if let Some((min, max)) = range {
                    heatmap.set_value_range(*min, *max);
                }
                WidgetKind::Heatmap(heatmap)
            }
            WidgetKindSpec::Gauge {
                min,
                max,
                start_angle,
                end_angle,
                warn,
                critical,
                unit,
            } => {
                let mut gauge = self
                    .gauge()
                    .with_sweep(*start_angle, *end_angle)
                    .with_thresholds(*warn, *critical)
                    .with_unit(unit.clone());
                gauge.set_value_range(*min, *max);
                gauge.set_value(*min);
                WidgetKind::Gauge(gauge)
            }
            WidgetKindSpec::KpiCard {
                label,
                unit,
                precision,
                higher_is_better,
            } => WidgetKind::KpiCard(
                self.kpi_card()
                    .with_label(label.clone())
                    .with_unit(unit.clone())
                    .with_precision(*precision)
                    .with_higher_is_better(*higher_is_better),
            ),
            WidgetKindSpec::Table { columns, max_rows } => {
                let mut table = self.table();
                if let Some(max) = max_rows {
                    table = table.with_max_rows(*max);
                }
                table.set_columns(columns.iter().cloned());
                WidgetKind::Table(table)
            }
            WidgetKindSpec::Grid { rows, cols } => WidgetKind::Grid(self.grid(*rows, *cols)),
            WidgetKindSpec::StatusBar { show_stats } => {
                WidgetKind::StatusBar(self.status_bar().with_auto_stats(*show_stats))
            }
        }
    }

    /// Framed widget for `spec` at `bounds`.
    #[must_use]
    pub fn build(&self, spec: &WidgetSpec, bounds: Rect) -> Widget {
        let mut widget = Widget::new(self.create(&spec.kind), bounds);
        widget.palette = self.palette;
        if let Some(title) = &spec.title {
            widget = widget.with_title(title.clone());
        }
        if let Some(interactive) = spec.interactive {
            widget = widget.with_interactive(interactive);
        }
        widget
    }
}
