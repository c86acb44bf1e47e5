//! Merges the four layers into one output frame.
//!
//! The pixel path depends on [`CompositorMode`], chosen once from the
//! capability tier:
//!
//! | Mode      | Tier     | Pixel rule                                              |
//! |-----------|----------|---------------------------------------------------------|
//! | `Alpha`   | high     | `out = src * a + dst * (1 - a)`, `a = opacity * src.a`   |
//! | `Dither`  | rich     | copy where `opacity * src.a` beats the 8×8 Bayer cell    |
//! | `Overlay` | standard | copy layers with opacity > 0.5, pixels with alpha > 128  |
//! | `Text`    | minimal  | pixels ignored, output pixel buffer never touched        |
//!
//! The output pixels are double buffered and cleared before each pass, and
//! only the dirty regions of each layer are visited. In every mode the text
//! planes are stacked too: the topmost non-blank cell wins. In `Overlay`
//! mode cells left blank by every layer show the composited pixels as
//! half-block characters.

use crate::caps::CapabilityTier;
use crate::direct::{Cell, CellBuffer, Modifiers};
use crate::error::Result;
use crate::layer::{BlendMode, DoubleBuffer, RenderLayer};
use crate::raster::PixelBuffer;
use dashtier_core::Rgba8;
use tracing::trace;

/// Upper half block used for two-pixel cells.
pub const HALF_BLOCK: &str = "▀";

/// 8×8 ordered-dither matrix, values `0..64`.
pub const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Binary cutoff on layer opacity in overlay mode.
pub const OVERLAY_OPACITY_CUTOFF: f32 = 0.5;
/// Binary cutoff on pixel alpha in overlay mode.
pub const OVERLAY_ALPHA_CUTOFF: u8 = 128;

/// Dither threshold in alpha units (`2..=254`) at pixel `(x, y)`.
#[must_use]
pub const fn dither_threshold(x: u32, y: u32) -> f32 {
    (BAYER_8X8[(y & 7) as usize][(x & 7) as usize] as u32 * 4 + 2) as f32
}

/// Pixel merge strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositorMode {
    /// True alpha blending.
    Alpha,
    /// Ordered dithering.
    Dither,
    /// Binary cutoff.
    Overlay,
    /// Text planes only.
    Text,
}

impl CompositorMode {
    /// Mode for a capability tier.
    #[must_use]
    pub const fn from_tier(tier: CapabilityTier) -> Self {
        match tier {
            CapabilityTier::High => Self::Alpha,
            CapabilityTier::Rich => Self::Dither,
            CapabilityTier::Standard => Self::Overlay,
            CapabilityTier::Minimal => Self::Text,
        }
    }

    /// Whether the pixel planes are merged at all.
    #[must_use]
    pub const fn uses_pixels(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Dither => "dither",
            Self::Overlay => "overlay",
            Self::Text => "text",
        }
    }
}

/// Counters for one composite pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStats {
    /// Layers whose pixels were merged.
    pub layers_merged: usize,
    /// Output pixels written.
    pub pixels_written: u64,
    /// Output cells that changed.
    pub cells_changed: usize,
}

/// Owner of the output frame.
#[derive(Debug, Clone)]
pub struct Compositor {
    mode: CompositorMode,
    output: DoubleBuffer<PixelBuffer>,
    text: CellBuffer,
    stats: CompositeStats,
}

impl Compositor {
    /// Allocate output buffers for a `width` × `height` pixel, `columns` × `rows` cell surface.
    ///
    /// Text mode keeps a zero-sized pixel buffer since it never draws pixels.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Allocation`] if a buffer cannot be allocated.
    pub fn try_new(mode: CompositorMode, width: u32, height: u32, columns: u16, rows: u16) -> Result<Self> {
        let (w, h) = if mode.uses_pixels() { (width, height) } else { (0, 0) };
        Ok(Self {
            mode,
            output: DoubleBuffer::try_new_pixels(w, h, "compositor output")?,
            text: CellBuffer::try_new(columns, rows)?,
            stats: CompositeStats::default(),
        })
    }

    /// Pixel merge strategy.
    #[must_use]
    pub const fn mode(&self) -> CompositorMode {
        self.mode
    }

    /// Composited pixels of this frame.
    #[must_use]
    pub fn output(&self) -> &PixelBuffer {
        self.output.current()
    }

    /// Composited pixels of the previous frame.
    #[must_use]
    pub fn previous_output(&self) -> &PixelBuffer {
        self.output.previous()
    }

    /// Whether this frame's pixels equal the previous frame's.
    #[must_use]
    pub fn output_unchanged(&self) -> bool {
        self.output.is_unchanged()
    }

    /// Composited text plane.
    #[must_use]
    pub const fn text(&self) -> &CellBuffer {
        &self.text
    }

    /// Mutable text plane, used by the presenter to flush dirty cells.
    pub fn text_mut(&mut self) -> &mut CellBuffer {
        &mut self.text
    }

    /// Counters of the last pass.
    #[must_use]
    pub const fn stats(&self) -> CompositeStats {
        self.stats
    }

    /// Reallocate for a new surface size.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Allocation`] if a buffer cannot be allocated.
    pub fn resize(&mut self, width: u32, height: u32, columns: u16, rows: u16) -> Result<()> {
        *self = Self::try_new(self.mode, width, height, columns, rows)?;
        Ok(())
    }

    /// Merge `layers` bottom to top by z-order.
    pub fn composite(&mut self, layers: &[RenderLayer]) -> CompositeStats {
        let mut ordered: Vec<&RenderLayer> = layers.iter().collect();
        ordered.sort_by_key(|l| l.z_order());

        let mut stats = CompositeStats::default();
        if self.mode.uses_pixels() {
            self.output.swap();
            self.output.current_mut().clear();
            for layer in &ordered {
                let written = self.merge_pixels(layer);
                if written > 0 {
                    stats.layers_merged += 1;
                }
                stats.pixels_written += written;
            }
        }
        stats.cells_changed = self.merge_text(&ordered);

        trace!(
            mode = self.mode.name(),
            layers = stats.layers_merged,
            pixels = stats.pixels_written,
            cells = stats.cells_changed,
            "composite"
        );
        self.stats = stats;
        stats
    }

    fn merge_pixels(&mut self, layer: &RenderLayer) -> u64 {
        let opacity = layer.opacity();
        if opacity <= 0.0 {
            return 0;
        }
        if self.mode == CompositorMode::Overlay && opacity <= OVERLAY_OPACITY_CUTOFF {
            return 0;
        }

        let mode = self.mode;
        let blend = layer.blend_mode();
        let src = layer.pixels();
        let out = self.output.current_mut();
        let (w, h) = (out.width().min(src.width()), out.height().min(src.height()));
        let mut written = 0;

        for region in layer.dirty_regions().rects() {
            let Some(area) = region.clip(w, h) else {
                continue;
            };
            for y in area.y..area.bottom() as i32 {
                for x in area.x..area.right() as i32 {
                    let (Some(s), Some(idx)) = (src.get(x, y), out.index_of(x, y)) else {
                        continue;
                    };
                    let d = out.pixels()[idx];
                    let merged = match mode {
                        CompositorMode::Alpha => blend_alpha(s, d, opacity, blend),
                        CompositorMode::Dither => {
                            blend_dither(s, d, opacity, blend, x as u32, y as u32)
                        }
                        CompositorMode::Overlay => blend_overlay(s),
                        CompositorMode::Text => None,
                    };
                    if let Some(px) = merged {
                        out.pixels_mut()[idx] = px;
                        written += 1;
                    }
                }
            }
        }
        written
    }

    fn merge_text(&mut self, ordered: &[&RenderLayer]) -> usize {
        let columns = self.text.width();
        let rows = self.text.height();
        let half_blocks = self.mode == CompositorMode::Overlay;
        let cell_w = if columns == 0 { 0 } else { self.output.current().width() / u32::from(columns) };
        let cell_h = if rows == 0 { 0 } else { self.output.current().height() / u32::from(rows) };

        let mut changed = 0;
        let mut cell = Cell::default();
        for idx in 0..self.text.len() {
            resolve_cell(ordered, idx, &mut cell);
            if cell.is_blank() && half_blocks {
                let (col, row) = self.text.coords(idx);
                if let Some(block) = half_block_cell(self.output.current(), col, row, cell_w, cell_h) {
                    cell = block;
                }
            }
            if self.text.set_if_changed(idx, &cell) {
                changed += 1;
            }
        }
        changed
    }
}

/// Topmost non-blank cell at `idx`, inheriting a background from below
/// when its own is transparent.
fn resolve_cell(ordered: &[&RenderLayer], idx: usize, out: &mut Cell) {
    out.reset();
    let mut found = false;
    for layer in ordered.iter().rev() {
        let Some(cell) = layer.text().cells().get(idx) else {
            continue;
        };
        if !found {
            if cell.is_blank() {
                continue;
            }
            out.clone_from(cell);
            found = true;
            if out.bg.a > 0.0 {
                return;
            }
        } else if cell.bg.a > 0.0 {
            out.bg = cell.bg;
            return;
        }
    }
}

/// Two vertically stacked output pixels as an upper-half-block cell.
fn half_block_cell(pixels: &PixelBuffer, col: u16, row: u16, cell_w: u32, cell_h: u32) -> Option<Cell> {
    if cell_w == 0 || cell_h == 0 {
        return None;
    }
    let x = (u32::from(col) * cell_w + cell_w / 2) as i32;
    let y0 = u32::from(row) * cell_h;
    let top = pixels.get(x, (y0 + cell_h / 4) as i32)?;
    let bottom = pixels.get(x, (y0 + (cell_h * 3) / 4) as i32)?;
    if top.is_transparent() && bottom.is_transparent() {
        return None;
    }
    Some(Cell::new(HALF_BLOCK, top.to_color(), bottom.to_color(), Modifiers::NONE))
}

/// Mix one channel: `(src * a + dst * (255 - a)) / 255`, rounded.
#[must_use]
pub fn mix_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    let v = (u32::from(src) * a + u32::from(dst) * (255 - a) + 127) / 255;
    v.min(255) as u8
}

fn effective_alpha(src: Rgba8, opacity: f32) -> f32 {
    (f32::from(src.a) * opacity).clamp(0.0, 255.0)
}

fn blended_source(src: Rgba8, dst: Rgba8, blend: BlendMode) -> Rgba8 {
    if dst.is_transparent() {
        src
    } else {
        blend.apply(src, dst)
    }
}

/// Alpha mode: weighted mix, output forced opaque; fully transparent
/// contributions are dropped so untouched pixels stay cleared.
fn blend_alpha(src: Rgba8, dst: Rgba8, opacity: f32, blend: BlendMode) -> Option<Rgba8> {
    let alpha = effective_alpha(src, opacity).round() as u8;
    if alpha == 0 {
        return None;
    }
    let s = blended_source(src, dst, blend);
    Some(Rgba8::new(
        mix_channel(s.r, dst.r, alpha),
        mix_channel(s.g, dst.g, alpha),
        mix_channel(s.b, dst.b, alpha),
        255,
    ))
}

fn blend_dither(
    src: Rgba8,
    dst: Rgba8,
    opacity: f32,
    blend: BlendMode,
    x: u32,
    y: u32,
) -> Option<Rgba8> {
    if effective_alpha(src, opacity) > dither_threshold(x, y) {
        Some(blended_source(src, dst, blend).with_alpha(255))
    } else {
        None
    }
}

fn blend_overlay(src: Rgba8) -> Option<Rgba8> {
    (src.a > OVERLAY_ALPHA_CUTOFF).then(|| src.with_alpha(255))
}
