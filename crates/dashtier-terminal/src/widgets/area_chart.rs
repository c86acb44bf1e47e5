//! Line chart filled down to a baseline.

use super::chart::forward_chart_api;
use super::ChartCore;
use crate::caps::CapabilityTier;
use crate::series::Series;

/// Filled series chart; the baseline defaults to zero.
#[derive(Debug, Clone)]
pub struct AreaChart {
    core: ChartCore,
}

impl AreaChart {
    /// Empty chart for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            core: ChartCore::new(tier, true),
        }
    }

    /// Add a series while building.
    #[must_use]
    pub fn with_series(mut self, series: Series) -> Self {
        self.core.add_series(series);
        self
    }

    /// Fill down to `baseline` instead of zero.
    #[must_use]
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.core.set_y_floor(Some(baseline));
        self
    }

    /// Fill baseline.
    #[must_use]
    pub fn baseline(&self) -> f64 {
        self.core.y_floor().unwrap_or(0.0)
    }
}

forward_chart_api!(AreaChart);
