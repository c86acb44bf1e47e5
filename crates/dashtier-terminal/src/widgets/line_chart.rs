//! Multi-series line chart.

use super::chart::forward_chart_api;
use super::ChartCore;
use crate::caps::CapabilityTier;
use crate::series::Series;
use crate::viewport::Viewport;

/// Lines (or markers) per series over an auto-scaled viewport.
#[derive(Debug, Clone)]
pub struct LineChart {
    core: ChartCore,
}

impl LineChart {
    /// Empty chart for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            core: ChartCore::new(tier, false),
        }
    }

    /// Add a series while building.
    #[must_use]
    pub fn with_series(mut self, series: Series) -> Self {
        self.core.add_series(series);
        self
    }

    /// Pin the view to a fixed range.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.core.set_viewport(viewport);
        self
    }
}

forward_chart_api!(LineChart);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerId;
    use crate::series::DataPoint;
    use crate::widgets::tests::pipeline;
    use crate::widgets::{DashWidget, RenderMode};
    use dashtier_core::{Color, Rect};

    #[test]
    fn test_mode_follows_tier() {
        assert_eq!(LineChart::new(CapabilityTier::Rich).render_mode(), RenderMode::Palette);
        assert_eq!(LineChart::new(CapabilityTier::Minimal).render_mode(), RenderMode::Ascii);
    }

    #[test]
    fn test_fixed_viewport_is_kept() {
        let mut chart = LineChart::new(CapabilityTier::High).with_viewport(Viewport::fixed(0.0, 10.0, 0.0, 1.0));
        chart.add_series(Series::new("s", Color::RED));
        chart.add_data_point(0, DataPoint::new(50.0, 50.0)).unwrap();
        assert_eq!(chart.viewport().base_bounds().max_x, 10.0);
    }

    #[test]
    fn test_hidden_series_not_drawn() {
        let mut chart = LineChart::new(CapabilityTier::High).with_series(Series::new("s", Color::RED));
        chart
            .set_series_data(0, (0..5).map(|i| DataPoint::new(f64::from(i), 1.0)))
            .unwrap();
        chart.set_series_visible(0, false).unwrap();
        let mut p = pipeline(CapabilityTier::High, 20, 6);
        chart.render(&mut p, &Rect::new(0.0, 0.0, 20.0, 6.0));
        assert!(p.layer(LayerId::Data).pixels().is_clear());
    }

    #[test]
    fn test_palette_mode_quantizes() {
        let mut chart = LineChart::new(CapabilityTier::Rich).with_series(Series::new("s", Color::from_rgb8(10, 200, 30)));
        chart
            .set_series_data(0, vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)])
            .unwrap();
        let mut p = pipeline(CapabilityTier::Rich, 10, 4);
        chart.render(&mut p, &Rect::new(0.0, 0.0, 10.0, 4.0));
        let data = p.layer(LayerId::Data).pixels();
        let px = data.pixels().iter().find(|px| !px.is_transparent()).copied().unwrap();
        assert_eq!(crate::color::quantize_256(px), px);
    }
}
