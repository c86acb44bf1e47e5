//! Data series owned by chart widgets.

use dashtier_core::Color;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One sample in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// X value (often time).
    pub x: f64,
    /// Y value.
    pub y: f64,
    /// Optional capture time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl DataPoint {
    /// Create a point without a timestamp.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            timestamp: None,
        }
    }

    /// Attach a timestamp.
    #[must_use]
    pub const fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check that both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for DataPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Stroke style for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Alternating drawn and skipped segments.
    Dashed,
    /// Points only, spaced along the path.
    Dotted,
    /// Unconnected point markers.
    Markers,
}

impl LineStyle {
    /// Whether consecutive points are connected.
    #[must_use]
    pub const fn connects(self) -> bool {
        matches!(self, Self::Solid | Self::Dashed)
    }

    /// Whether the segment starting at point `index` is drawn.
    #[must_use]
    pub const fn draws_segment(self, index: usize) -> bool {
        match self {
            Self::Solid => true,
            Self::Dashed => index % 2 == 0,
            Self::Dotted | Self::Markers => false,
        }
    }
}

/// A named, ordered sequence of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend name.
    pub name: String,
    /// Points in insertion order.
    pub points: VecDeque<DataPoint>,
    /// Stroke color.
    pub color: Color,
    /// Stroke style.
    pub line_style: LineStyle,
    /// Hidden series are neither drawn nor auto-scaled.
    pub visible: bool,
    max_points: Option<usize>,
}

impl Series {
    /// Create an empty visible series.
    #[must_use]
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            points: VecDeque::new(),
            color,
            line_style: LineStyle::Solid,
            visible: true,
            max_points: None,
        }
    }

    /// Set the stroke style.
    #[must_use]
    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.line_style = style;
        self
    }

    /// Keep at most `max` points, dropping the oldest.
    #[must_use]
    pub fn with_max_points(mut self, max: usize) -> Self {
        self.max_points = Some(max.max(1));
        self.trim();
        self
    }

    /// History bound, if any.
    #[must_use]
    pub const fn max_points(&self) -> Option<usize> {
        self.max_points
    }

    /// Append a point, evicting the oldest beyond the history bound.
    pub fn push(&mut self, point: DataPoint) {
        self.points.push_back(point);
        self.trim();
    }

    /// Replace all points.
    pub fn set_points(&mut self, points: impl IntoIterator<Item = DataPoint>) {
        self.points = points.into_iter().collect();
        self.trim();
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point.
    #[must_use]
    pub fn last(&self) -> Option<&DataPoint> {
        self.points.back()
    }

    /// `(min_x, max_x, min_y, max_y)` over finite points.
    #[must_use]
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        self.points.iter().filter(|p| p.is_finite()).fold(None, |acc, p| {
            Some(match acc {
                None => (p.x, p.x, p.y, p.y),
                Some((x0, x1, y0, y1)) => (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
            })
        })
    }

    fn trim(&mut self) {
        if let Some(max) = self.max_points {
            while self.points.len() > max {
                self.points.pop_front();
            }
        }
    }
}
