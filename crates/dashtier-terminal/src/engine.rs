//! Dashboard engine: owns the pipeline, the frame budget and the widget factory.
//!
//! The tier is chosen once at construction and never re-derived, so every
//! widget built by the engine keeps a render mode that matches its layers.

use crate::budget::FrameBudget;
use crate::caps::{detect_from_caps, Capabilities, CapabilityTier};
use crate::compositor::CompositeStats;
use crate::config::{DashboardConfig, WidgetKindSpec};
use crate::error::{DashError, Result};
use crate::factory::WidgetFactory;
use crate::pipeline::{RenderPipeline, Surface};
use crate::present::PresentStats;
use crate::widgets::{Widget, WidgetKind};
use dashtier_core::{Event, Rect};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Terminal size assumed until the first [`DashboardEngine::resize`].
pub const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Wall time from begin to flush.
    pub elapsed: Duration,
    /// Quality level the frame was drawn at.
    pub quality: f32,
    /// Widgets drawn.
    pub widgets_rendered: usize,
    /// Composite counters.
    pub composite: CompositeStats,
    /// Present counters.
    pub present: PresentStats,
}

/// Explicit engine handle; no process-wide state.
#[derive(Debug)]
pub struct DashboardEngine {
    config: DashboardConfig,
    caps: Capabilities,
    tier: CapabilityTier,
    pipeline: RenderPipeline,
    budget: FrameBudget,
    factory: WidgetFactory,
    shut_down: bool,
}

impl DashboardEngine {
    /// Engine for `caps` at [`DEFAULT_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`DashError::InvalidConfig`] for an invalid config and
    /// [`DashError::Allocation`] if the layer buffers cannot be allocated.
    pub fn new(caps: Capabilities, config: DashboardConfig) -> Result<Self> {
        Self::with_size(caps, config, DEFAULT_SIZE.0, DEFAULT_SIZE.1)
    }

    /// Engine for a probe outcome; a failed probe degrades to the minimal tier.
    ///
    /// # Errors
    ///
    /// As [`DashboardEngine::new`]. Probe failures are never returned.
    pub fn with_probe(probe: Result<Capabilities>, config: DashboardConfig) -> Result<Self> {
        let caps = probe.unwrap_or_else(|err| {
            warn!(error = %err, "capability probe failed, falling back to minimal tier");
            Capabilities::default()
        });
        Self::new(caps, config)
    }

    /// Engine for `caps` on a `columns × rows` terminal.
    ///
    /// # Errors
    ///
    /// As [`DashboardEngine::new`].
    pub fn with_size(caps: Capabilities, config: DashboardConfig, columns: u16, rows: u16) -> Result<Self> {
        config.validate()?;
        let tier = config.tier_override.unwrap_or_else(|| detect_from_caps(&caps));
        debug!(
            tier = tier.name(),
            graphics = ?caps.graphics,
            colors = ?caps.colors,
            mouse = caps.mouse,
            forced = config.tier_override.is_some(),
            "capability tier selected"
        );
        let surface = Surface::for_tier(
            tier,
            columns,
            rows,
            config.cell_pixels.width,
            config.cell_pixels.height,
        );
        let pipeline = RenderPipeline::try_new(tier, surface, tier.color_mode(&caps))?;
        let budget = FrameBudget::with_history(config.target_fps, config.frame_history);
        info!(
            title = %config.title,
            tier = tier.name(),
            columns,
            rows,
            target_fps = config.target_fps,
            "dashboard engine started"
        );
        Ok(Self {
            config,
            caps,
            tier,
            pipeline,
            budget,
            factory: WidgetFactory::new(tier),
            shut_down: false,
        })
    }

    /// Tier fixed for the engine's lifetime.
    #[must_use]
    pub const fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Capabilities the engine was built from.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Frame-time history and quality.
    #[must_use]
    pub const fn frame_budget(&self) -> &FrameBudget {
        &self.budget
    }

    /// Current advisory quality in `[0.1, 1.0]`.
    #[must_use]
    pub const fn quality_level(&self) -> f32 {
        self.budget.quality_level()
    }

    /// Factory bound to the engine's tier.
    #[must_use]
    pub const fn factory(&self) -> &WidgetFactory {
        &self.factory
    }

    /// Render pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Terminal size in cells.
    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        let surface = self.pipeline.surface();
        (surface.columns, surface.rows)
    }

    /// Whether [`DashboardEngine::shutdown`] ran.
    #[must_use]
    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Framed widget of `kind` at `bounds`, rendering for the engine's tier.
    #[must_use]
    pub fn create_widget(&self, kind: &WidgetKindSpec, bounds: Rect) -> Widget {
        Widget::new(self.factory.create(kind), bounds)
    }

    /// Widgets for every config entry, placed on the current terminal size.
    #[must_use]
    pub fn build_widgets(&self) -> Vec<Widget> {
        let (columns, rows) = self.size();
        self.config
            .widgets
            .iter()
            .map(|spec| {
                let bounds = self.config.layout.cell_bounds(&spec.placement, columns, rows);
                self.factory.build(spec, bounds)
            })
            .collect()
    }

    /// Recompute bounds of widgets from [`DashboardEngine::build_widgets`], by index.
    pub fn relayout(&self, widgets: &mut [Widget]) {
        let (columns, rows) = self.size();
        for (widget, spec) in widgets.iter_mut().zip(&self.config.widgets) {
            widget.bounds = self.config.layout.cell_bounds(&spec.placement, columns, rows);
        }
    }

    /// Draw, composite and present one frame.
    ///
    /// Widgets draw in slice order. Status bars with auto stats receive the
    /// current frame rate, quality and tier first.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Io`] if the write fails; the next frame resends
    /// everything. Returns [`DashError::TerminalNotAvailable`] after shutdown.
    pub fn render<W: Write>(&mut self, widgets: &mut [Widget], writer: &mut W) -> Result<FrameStats> {
        if self.shut_down {
            return Err(DashError::TerminalNotAvailable);
        }
        let start = Instant::now();
        let quality = self.budget.quality_level();
        let fps = self.budget.measured_fps().unwrap_or(f64::from(self.budget.target_fps()));
        for widget in widgets.iter_mut() {
            if let WidgetKind::StatusBar(bar) = &mut widget.kind {
                if bar.auto_stats() {
                    bar.set_frame_stats(fps, quality, self.tier);
                }
            }
        }

        self.pipeline.set_quality(quality);
        self.pipeline.begin_frame();
        let mut widgets_rendered = 0;
        for widget in widgets.iter() {
            if widget.visible {
                widget.render(&mut self.pipeline);
                widgets_rendered += 1;
            }
        }
        let composite = self.pipeline.composite();
        let present = self.pipeline.present(writer);
        let elapsed = start.elapsed();
        self.budget.record(elapsed);
        let present = present?;

        let stats = FrameStats {
            frame: self.pipeline.frame_count(),
            elapsed,
            quality,
            widgets_rendered,
            composite,
            present,
        };
        trace!(
            frame = stats.frame,
            elapsed_us = elapsed.as_micros() as u64,
            cells_changed = composite.cells_changed,
            graphics_bytes = present.graphics_bytes,
            cells_written = present.cells.cells_written,
            "frame presented"
        );
        Ok(stats)
    }

    /// Route `event` to the top-most interactive widget that consumes it.
    ///
    /// Returns the index of the consuming widget.
    pub fn dispatch_input(&mut self, widgets: &mut [Widget], event: &Event) -> Option<usize> {
        let consumed = widgets.iter_mut().enumerate().rev().find_map(|(i, w)| w.handle_input(event).then_some(i));
        if let Some(index) = consumed {
            trace!(widget = index, kind = widgets[index].kind_name(), "input consumed");
        }
        consumed
    }

    /// Reallocate for a new terminal size. No-op when unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Allocation`] if the new buffers cannot be allocated.
    pub fn resize(&mut self, columns: u16, rows: u16) -> Result<()> {
        self.pipeline.resize(columns, rows)
    }

    /// Stop rendering and log the session summary. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        info!(
            frames = self.pipeline.frame_count(),
            overruns = self.budget.overruns(),
            quality = self.budget.quality_level(),
            "dashboard engine shut down"
        );
    }
}

impl Drop for DashboardEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
