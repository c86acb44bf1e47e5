//! Four-layer frame pipeline: begin, draw, composite, present.

use crate::caps::CapabilityTier;
use crate::color::ColorMode;
use crate::compositor::{CompositeStats, Compositor, CompositorMode};
use crate::error::Result;
use crate::layer::{LayerId, RenderLayer};
use crate::present::{PresentStats, Presenter};
use dashtier_core::{PixelRect, Rect};
use std::io::Write;
use tracing::debug;

/// Terminal surface in cells plus the pixel size of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    /// Width in cells.
    pub columns: u16,
    /// Height in cells.
    pub rows: u16,
    /// Pixels per cell horizontally.
    pub cell_width_px: u32,
    /// Pixels per cell vertically.
    pub cell_height_px: u32,
}

impl Surface {
    /// Surface for `tier`: graphics tiers use the given cell pixel size,
    /// text tiers use 1×2 (half-block resolution).
    #[must_use]
    pub fn for_tier(tier: CapabilityTier, columns: u16, rows: u16, cell_width_px: u32, cell_height_px: u32) -> Self {
        let (cw, ch) = if tier.has_graphics() {
            (cell_width_px.max(1), cell_height_px.max(1))
        } else {
            (1, 2)
        };
        Self {
            columns,
            rows,
            cell_width_px: cw,
            cell_height_px: ch,
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width_px(&self) -> u32 {
        u32::from(self.columns) * self.cell_width_px
    }

    /// Height in pixels.
    #[must_use]
    pub fn height_px(&self) -> u32 {
        u32::from(self.rows) * self.cell_height_px
    }

    /// Whole surface in cells.
    #[must_use]
    pub fn cell_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f32::from(self.columns), f32::from(self.rows))
    }

    /// Cell rectangle scaled to pixels, rounded outward.
    #[must_use]
    pub fn to_pixels(&self, cells: &Rect) -> PixelRect {
        PixelRect::from_rect(&cells.scale(self.cell_width_px as f32, self.cell_height_px as f32))
    }

    /// Pixel at the center of a cell.
    #[must_use]
    pub fn cell_center_px(&self, column: u16, row: u16) -> (i32, i32) {
        (
            (u32::from(column) * self.cell_width_px + self.cell_width_px / 2) as i32,
            (u32::from(row) * self.cell_height_px + self.cell_height_px / 2) as i32,
        )
    }
}

/// Owns the layers, the compositor and the presenter.
#[derive(Debug)]
pub struct RenderPipeline {
    tier: CapabilityTier,
    surface: Surface,
    layers: Vec<RenderLayer>,
    compositor: Compositor,
    presenter: Presenter,
    quality: f32,
    frame: u64,
}

impl RenderPipeline {
    /// Allocate every buffer for `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Allocation`] if any layer or output buffer cannot be allocated.
    pub fn try_new(tier: CapabilityTier, surface: Surface, color_mode: ColorMode) -> Result<Self> {
        let (w, h) = (surface.width_px(), surface.height_px());
        let layers = LayerId::ALL
            .iter()
            .map(|&id| RenderLayer::try_new(id, w, h, surface.columns, surface.rows))
            .collect::<Result<Vec<_>>>()?;
        let compositor = Compositor::try_new(CompositorMode::from_tier(tier), w, h, surface.columns, surface.rows)?;
        debug!(
            tier = tier.name(),
            columns = surface.columns,
            rows = surface.rows,
            width_px = w,
            height_px = h,
            "render pipeline allocated"
        );
        Ok(Self {
            tier,
            surface,
            layers,
            compositor,
            presenter: Presenter::new(tier, color_mode),
            quality: 1.0,
            frame: 0,
        })
    }

    /// Capability tier the pipeline was built for.
    #[must_use]
    pub const fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Current surface geometry.
    #[must_use]
    pub const fn surface(&self) -> Surface {
        self.surface
    }

    /// Frames begun so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Advisory quality in `[0.1, 1.0]` for the frame being drawn.
    #[must_use]
    pub const fn quality(&self) -> f32 {
        self.quality
    }

    /// Set the advisory quality for subsequent draws.
    pub fn set_quality(&mut self, quality: f32) {
        self.quality = quality.clamp(0.1, 1.0);
    }

    /// Layers ordered by z.
    #[must_use]
    pub fn layers(&self) -> &[RenderLayer] {
        &self.layers
    }

    /// Layer by role.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> &RenderLayer {
        &self.layers[usize::from(id.z_order())]
    }

    /// Mutable layer by role.
    pub fn layer_mut(&mut self, id: LayerId) -> &mut RenderLayer {
        &mut self.layers[usize::from(id.z_order())]
    }

    /// Output owner.
    #[must_use]
    pub const fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Clear every layer and its dirty regions.
    pub fn begin_frame(&mut self) {
        for layer in &mut self.layers {
            layer.begin_frame();
        }
        self.frame += 1;
    }

    /// Merge the layers into the output frame.
    pub fn composite(&mut self) -> CompositeStats {
        self.compositor.composite(&self.layers)
    }

    /// Write the output frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Io`] on a failed write; the pipeline stays
    /// usable and the next present resends the full frame.
    pub fn present<W: Write>(&mut self, writer: &mut W) -> Result<PresentStats> {
        Ok(self.presenter.present(&mut self.compositor, writer)?)
    }

    /// Reallocate for a new terminal size. No-op when unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Allocation`] if the new buffers cannot be allocated.
    pub fn resize(&mut self, columns: u16, rows: u16) -> Result<()> {
        if columns == self.surface.columns && rows == self.surface.rows {
            return Ok(());
        }
        let surface = Surface {
            columns,
            rows,
            ..self.surface
        };
        let (w, h) = (surface.width_px(), surface.height_px());
        for layer in &mut self.layers {
            layer.resize(w, h, columns, rows)?;
        }
        self.compositor.resize(w, h, columns, rows)?;
        self.compositor.text_mut().mark_all_dirty();
        self.presenter.invalidate();
        self.surface = surface;
        debug!(columns, rows, width_px = w, height_px = h, "render pipeline resized");
        Ok(())
    }
}
