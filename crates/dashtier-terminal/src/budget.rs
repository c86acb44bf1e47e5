//! Frame-time history and the adaptive quality scalar.
//!
//! Each recorded frame nudges `quality_level`: an overrun lowers it by
//! [`QUALITY_STEP_DOWN`], a frame under half the budget raises it by
//! [`QUALITY_STEP_UP`], anything in between leaves it alone. Widgets may
//! read the level to skip expensive paths; it never gates rendering.

use std::collections::VecDeque;
use std::time::Duration;
use tracing::{trace, warn};

/// Default number of frame samples kept.
pub const DEFAULT_HISTORY: usize = 60;
/// Lowest reachable quality.
pub const MIN_QUALITY: f32 = 0.1;
/// Highest reachable quality.
pub const MAX_QUALITY: f32 = 1.0;
/// Quality lost per over-budget frame.
pub const QUALITY_STEP_DOWN: f32 = 0.1;
/// Quality regained per fast frame.
pub const QUALITY_STEP_UP: f32 = 0.05;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Ring of recent frame durations plus the derived quality level.
#[derive(Debug, Clone)]
pub struct FrameBudget {
    target_fps: u32,
    max_frame_time_ns: u64,
    frame_times: VecDeque<u64>,
    capacity: usize,
    quality_level: f32,
    overruns: u64,
}

impl FrameBudget {
    /// Budget for `target_fps` keeping the default history length.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self::with_history(target_fps, DEFAULT_HISTORY)
    }

    /// Budget with an explicit history capacity (at least one sample).
    #[must_use]
    pub fn with_history(target_fps: u32, capacity: usize) -> Self {
        let target_fps = target_fps.max(1);
        let capacity = capacity.max(1);
        Self {
            target_fps,
            max_frame_time_ns: NANOS_PER_SECOND / u64::from(target_fps),
            frame_times: VecDeque::with_capacity(capacity),
            capacity,
            quality_level: MAX_QUALITY,
            overruns: 0,
        }
    }

    /// Target frame rate.
    #[must_use]
    pub const fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Per-frame allowance in nanoseconds.
    #[must_use]
    pub const fn max_frame_time_ns(&self) -> u64 {
        self.max_frame_time_ns
    }

    /// Per-frame allowance.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        Duration::from_nanos(self.max_frame_time_ns)
    }

    /// Current advisory quality in `[0.1, 1.0]`.
    #[must_use]
    pub const fn quality_level(&self) -> f32 {
        self.quality_level
    }

    /// Ring capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames recorded over budget since creation.
    #[must_use]
    pub const fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Retained samples, oldest first.
    pub fn frame_times(&self) -> impl Iterator<Item = u64> + '_ {
        self.frame_times.iter().copied()
    }

    /// Number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frame_times.len()
    }

    /// Check if no frame was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame_times.is_empty()
    }

    /// Record one frame and adapt quality.
    pub fn record_frame_time(&mut self, ns: u64) {
        if self.frame_times.len() == self.capacity {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(ns);

        let before = self.quality_level;
        if ns > self.max_frame_time_ns {
            self.overruns += 1;
            self.quality_level = (self.quality_level - QUALITY_STEP_DOWN).max(MIN_QUALITY);
            if self.quality_level < before {
                warn!(
                    frame_ns = ns,
                    budget_ns = self.max_frame_time_ns,
                    quality = self.quality_level,
                    "frame over budget, lowering quality"
                );
            }
        } else if ns < self.max_frame_time_ns / 2 {
            self.quality_level = (self.quality_level + QUALITY_STEP_UP).min(MAX_QUALITY);
        }
        trace!(frame_ns = ns, quality = self.quality_level, "frame recorded");
    }

    /// Record a frame measured as a [`Duration`].
    pub fn record(&mut self, elapsed: Duration) {
        self.record_frame_time(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));
    }

    /// Mean of retained samples.
    #[must_use]
    pub fn average_frame_time_ns(&self) -> Option<u64> {
        if self.frame_times.is_empty() {
            return None;
        }
        let sum: u128 = self.frame_times.iter().map(|&t| u128::from(t)).sum();
        Some((sum / self.frame_times.len() as u128) as u64)
    }

    /// Frame rate implied by the mean sample.
    #[must_use]
    pub fn measured_fps(&self) -> Option<f64> {
        self.average_frame_time_ns()
            .filter(|&ns| ns > 0)
            .map(|ns| NANOS_PER_SECOND as f64 / ns as f64)
    }
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self::new(30)
    }
}
