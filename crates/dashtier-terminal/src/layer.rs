//! Render layers: double-buffered pixel surfaces with text planes.
//!
//! A pipeline owns exactly four layers, one per [`LayerId`]. Widgets draw
//! through the layer methods so every touched rectangle lands in the
//! layer's [`DirtyRegions`]; the compositor only visits those rectangles.

use crate::direct::{CellBuffer, Modifiers};
use crate::error::Result;
use crate::raster::{self, PixelBuffer};
use dashtier_core::{Color, PixelRect, Rgba8};
use serde::{Deserialize, Serialize};

/// Semantic role of a layer; also fixes its z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerId {
    /// Panels, frames and fills.
    Background,
    /// Plotted data.
    Data,
    /// Selection and hover highlights.
    Interactive,
    /// Tooltips and status text.
    Overlay,
}

impl LayerId {
    /// All layers bottom to top.
    pub const ALL: [Self; 4] = [Self::Background, Self::Data, Self::Interactive, Self::Overlay];

    /// Stacking position, 0 at the bottom.
    #[must_use]
    pub const fn z_order(self) -> u8 {
        match self {
            Self::Background => 0,
            Self::Data => 1,
            Self::Interactive => 2,
            Self::Overlay => 3,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Data => "data",
            Self::Interactive => "interactive",
            Self::Overlay => "overlay",
        }
    }

    const fn default_opacity(self) -> f32 {
        match self {
            Self::Overlay => 0.9,
            _ => 1.0,
        }
    }
}

/// Per-channel blend function applied before alpha mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Source replaces destination.
    #[default]
    Normal,
    /// `s * d`
    Multiply,
    /// `1 - (1 - s)(1 - d)`
    Screen,
    /// Multiply on dark destinations, screen on light ones.
    Overlay,
}

impl BlendMode {
    /// Blend one 8-bit channel.
    #[must_use]
    pub fn channel(self, src: u8, dst: u8) -> u8 {
        let s = u32::from(src);
        let d = u32::from(dst);
        let v = match self {
            Self::Normal => s,
            Self::Multiply => s * d / 255,
            Self::Screen => 255 - (255 - s) * (255 - d) / 255,
            Self::Overlay => {
                if d < 128 {
                    2 * s * d / 255
                } else {
                    255 - 2 * (255 - s) * (255 - d) / 255
                }
            }
        };
        v.min(255) as u8
    }

    /// Blend the color channels of two pixels, keeping the source alpha.
    #[must_use]
    pub fn apply(self, src: Rgba8, dst: Rgba8) -> Rgba8 {
        Rgba8::new(
            self.channel(src.r, dst.r),
            self.channel(src.g, dst.g),
            self.channel(src.b, dst.b),
            src.a,
        )
    }
}

/// Set of rectangles touched this frame.
///
/// Inserting a rectangle that overlaps or abuts an existing one merges them,
/// so the set stays small and its members stay disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRegions {
    rects: Vec<PixelRect>,
}

impl DirtyRegions {
    /// Empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Add a rectangle, merging with anything it touches.
    pub fn add(&mut self, rect: PixelRect) {
        if rect.is_empty() {
            return;
        }
        let mut merged = rect;
        loop {
            let before = self.rects.len();
            self.rects.retain(|r| {
                if r.touches(&merged) {
                    merged = merged.union(r);
                    false
                } else {
                    true
                }
            });
            if self.rects.len() == before {
                break;
            }
        }
        self.rects.push(merged);
    }

    /// Drop every rectangle.
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Check if nothing was touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Rectangles in insertion order of their merged form.
    #[must_use]
    pub fn rects(&self) -> &[PixelRect] {
        &self.rects
    }

    /// Pixels covered.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.rects.iter().map(PixelRect::area).sum()
    }

    /// Bounding box of every rectangle.
    #[must_use]
    pub fn bounding_box(&self) -> PixelRect {
        self.rects
            .iter()
            .fold(PixelRect::default(), |acc, r| acc.union(r))
    }
}

/// Front/back pair swapped once per frame.
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    current: T,
    previous: T,
}

impl<T> DoubleBuffer<T> {
    /// Pair from two equally sized buffers.
    pub const fn new(current: T, previous: T) -> Self {
        Self { current, previous }
    }

    /// Buffer being drawn this frame.
    pub const fn current(&self) -> &T {
        &self.current
    }

    /// Mutable buffer being drawn this frame.
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    /// Buffer finished last frame.
    pub const fn previous(&self) -> &T {
        &self.previous
    }

    /// Make the current buffer the previous one.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
    }
}

impl DoubleBuffer<PixelBuffer> {
    /// Allocate two transparent buffers.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Allocation`] if either buffer cannot be allocated.
    pub fn try_new_pixels(width: u32, height: u32, what: &'static str) -> Result<Self> {
        Ok(Self::new(
            PixelBuffer::try_new(width, height, what)?,
            PixelBuffer::try_new(width, height, what)?,
        ))
    }

    /// Whether this frame's pixels equal last frame's.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.current == self.previous
    }
}

/// One drawing surface of the pipeline.
#[derive(Debug, Clone)]
pub struct RenderLayer {
    id: LayerId,
    pixels: DoubleBuffer<PixelBuffer>,
    text: CellBuffer,
    dirty: DirtyRegions,
    opacity: f32,
    blend_mode: BlendMode,
}

impl RenderLayer {
    /// Allocate a layer of `width` × `height` pixels and `columns` × `rows` cells.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Allocation`] if any buffer cannot be allocated.
    pub fn try_new(id: LayerId, width: u32, height: u32, columns: u16, rows: u16) -> Result<Self> {
        Ok(Self {
            id,
            pixels: DoubleBuffer::try_new_pixels(width, height, "layer pixels")?,
            text: CellBuffer::try_new(columns, rows)?,
            dirty: DirtyRegions::new(),
            opacity: id.default_opacity(),
            blend_mode: BlendMode::Normal,
        })
    }

    /// Layer role.
    #[must_use]
    pub const fn id(&self) -> LayerId {
        self.id
    }

    /// Stacking position.
    #[must_use]
    pub const fn z_order(&self) -> u8 {
        self.id.z_order()
    }

    /// Opacity in `[0, 1]`.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
    }

    /// Channel blend function.
    #[must_use]
    pub const fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Set the channel blend function.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    /// Pixels drawn this frame.
    #[must_use]
    pub fn pixels(&self) -> &PixelBuffer {
        self.pixels.current()
    }

    /// Pixels drawn last frame.
    #[must_use]
    pub fn previous_pixels(&self) -> &PixelBuffer {
        self.pixels.previous()
    }

    /// Text plane.
    #[must_use]
    pub const fn text(&self) -> &CellBuffer {
        &self.text
    }

    /// Rectangles touched this frame.
    #[must_use]
    pub const fn dirty_regions(&self) -> &DirtyRegions {
        &self.dirty
    }

    /// Check if nothing was drawn this frame (pixels or text).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty() && self.text.is_blank()
    }

    /// Swap buffers and clear the new frame's pixels, text and dirty set.
    pub fn begin_frame(&mut self) {
        self.pixels.swap();
        self.pixels.current_mut().clear();
        self.text.clear();
        self.text.clear_dirty();
        self.dirty.clear();
    }

    /// Reallocate for a new surface size; content is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DashError::Allocation`] if the new buffers cannot be allocated.
    pub fn resize(&mut self, width: u32, height: u32, columns: u16, rows: u16) -> Result<()> {
        self.pixels = DoubleBuffer::try_new_pixels(width, height, "layer pixels")?;
        self.text = CellBuffer::try_new(columns, rows)?;
        self.dirty.clear();
        Ok(())
    }

    /// Record a rectangle as touched.
    pub fn mark_dirty(&mut self, rect: PixelRect) {
        self.dirty.add(rect);
    }

    /// Set one pixel.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba8) {
        if self.pixels.current_mut().put(x, y, color) {
            self.dirty.add(PixelRect::new(x, y, 1, 1));
        }
    }

    /// Bresenham line.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba8) {
        let touched = raster::draw_line(self.pixels.current_mut(), x1, y1, x2, y2, color);
        self.dirty.add(touched);
    }

    /// Filled rectangle.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba8) {
        let touched = raster::draw_rect(self.pixels.current_mut(), x, y, w, h, color);
        self.dirty.add(touched);
    }

    /// Square point.
    pub fn draw_point(&mut self, x: i32, y: i32, radius: i32, color: Rgba8) {
        let touched = raster::draw_point(self.pixels.current_mut(), x, y, radius, color);
        self.dirty.add(touched);
    }

    /// Pie slice between two angles in degrees.
    pub fn draw_pie_slice(&mut self, cx: i32, cy: i32, radius: i32, start: f32, end: f32, color: Rgba8) {
        let touched = raster::draw_pie_slice(self.pixels.current_mut(), cx, cy, radius, start, end, color);
        self.dirty.add(touched);
    }

    /// Fill the whole layer.
    pub fn fill_background(&mut self, color: Rgba8) {
        let touched = raster::fill_background(self.pixels.current_mut(), color);
        self.dirty.add(touched);
    }

    /// Write text onto the text plane (cell coordinates).
    pub fn put_text(&mut self, x: i32, y: i32, text: &str, fg: Color, bg: Color, modifiers: Modifiers) -> u16 {
        self.text.put_str(x, y, text, fg, bg, modifiers)
    }

    /// Fill cells with a background color (cell coordinates).
    pub fn fill_cells(&mut self, x: i32, y: i32, width: u16, height: u16, bg: Color) {
        self.text.fill_rect(x, y, width, height, Color::WHITE, bg);
    }

    /// Mutable text plane for bulk writers such as the Braille canvas.
    pub fn text_mut(&mut self) -> &mut CellBuffer {
        &mut self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layer(id: LayerId) -> RenderLayer {
        RenderLayer::try_new(id, 16, 16, 4, 2).unwrap()
    }

    #[test]
    fn test_z_orders() {
        let z: Vec<u8> = LayerId::ALL.iter().map(|l| l.z_order()).collect();
        assert_eq!(z, vec![0, 1, 2, 3]);
        assert_eq!(LayerId::Interactive.name(), "interactive");
    }

    #[test]
    fn test_blend_channels() {
        assert_eq!(BlendMode::Normal.channel(10, 200), 10);
        assert_eq!(BlendMode::Multiply.channel(255, 128), 128);
        assert_eq!(BlendMode::Multiply.channel(0, 128), 0);
        assert_eq!(BlendMode::Screen.channel(0, 128), 128);
        assert_eq!(BlendMode::Screen.channel(255, 10), 255);
        assert_eq!(BlendMode::Overlay.channel(255, 0), 0);
        assert_eq!(BlendMode::Overlay.channel(0, 255), 255);
    }

    #[test]
    fn test_dirty_regions_merge_touching() {
        let mut d = DirtyRegions::new();
        d.add(PixelRect::new(0, 0, 2, 2));
        d.add(PixelRect::new(2, 0, 2, 2));
        assert_eq!(d.rects(), &[PixelRect::new(0, 0, 4, 2)]);
        d.add(PixelRect::new(10, 10, 1, 1));
        assert_eq!(d.rects().len(), 2);
    }

    #[test]
    fn test_dirty_regions_chain_merge() {
        let mut d = DirtyRegions::new();
        d.add(PixelRect::new(0, 0, 1, 1));
        d.add(PixelRect::new(4, 0, 1, 1));
        d.add(PixelRect::new(1, 0, 3, 1));
        assert_eq!(d.rects(), &[PixelRect::new(0, 0, 5, 1)]);
        assert_eq!(d.area(), 5);
    }

    #[test]
    fn test_dirty_regions_ignore_empty() {
        let mut d = DirtyRegions::new();
        d.add(PixelRect::default());
        assert!(d.is_empty());
    }

    #[test]
    fn test_drawing_records_dirty() {
        let mut l = layer(LayerId::Data);
        assert!(l.is_empty());
        l.draw_line(0, 0, 5, 0, Rgba8::WHITE);
        assert_eq!(l.dirty_regions().bounding_box(), PixelRect::new(0, 0, 6, 1));
        l.put_pixel(100, 100, Rgba8::WHITE);
        assert_eq!(l.dirty_regions().rects().len(), 1);
    }

    #[test]
    fn test_begin_frame_swaps_and_clears() {
        let mut l = layer(LayerId::Data);
        l.draw_rect(0, 0, 2, 2, Rgba8::WHITE);
        l.put_text(0, 0, "hi", Color::WHITE, Color::TRANSPARENT, Modifiers::NONE);
        l.begin_frame();
        assert!(l.is_empty());
        assert!(l.pixels().is_clear());
        assert_eq!(l.previous_pixels().count_set(), 4);
    }

    #[test]
    fn test_opacity_clamped() {
        let mut l = layer(LayerId::Background);
        l.set_opacity(2.0);
        assert_eq!(l.opacity(), 1.0);
        l.set_opacity(f32::NAN);
        assert_eq!(l.opacity(), 0.0);
        assert_eq!(layer(LayerId::Overlay).opacity(), 0.9);
    }

    #[test]
    fn test_double_buffer_unchanged() {
        let mut db = DoubleBuffer::try_new_pixels(2, 2, "t").unwrap();
        assert!(db.is_unchanged());
        db.current_mut().put(0, 0, Rgba8::WHITE);
        assert!(!db.is_unchanged());
    }

    proptest! {
        #[test]
        fn prop_dirty_regions_disjoint(rects in proptest::collection::vec((0i32..40, 0i32..40, 1u32..8, 1u32..8), 0..30)) {
            let mut d = DirtyRegions::new();
            for &(x, y, w, h) in &rects {
                d.add(PixelRect::new(x, y, w, h));
            }
            let all = d.rects();
            for (i, a) in all.iter().enumerate() {
                for b in &all[i + 1..] {
                    prop_assert!(!a.touches(b));
                }
            }
            for &(x, y, w, h) in &rects {
                let r = PixelRect::new(x, y, w, h);
                prop_assert!(all.iter().any(|m| m.union(&r) == *m));
            }
        }

        #[test]
        fn prop_blend_channel_in_range(s in 0u8..=255, d in 0u8..=255) {
            for mode in [BlendMode::Normal, BlendMode::Multiply, BlendMode::Screen, BlendMode::Overlay] {
                let _ = mode.channel(s, d);
            }
        }
    }
}
