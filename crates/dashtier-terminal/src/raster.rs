//! Pixel buffers and bitmap drawing primitives.
//!
//! Primitives never fail: coordinates outside the buffer are skipped. Each
//! returns the clipped rectangle it may have touched so callers can record
//! dirty regions. Angles are in degrees, measured clockwise from +x on
//! screen (y grows downward).

use crate::error::{DashError, Result};
use dashtier_core::{PixelRect, Rgba8};

/// Number of center-to-arc lines used to approximate a pie slice.
pub const PIE_SEGMENTS: u32 = 20;

/// Owned RGBA8 bitmap, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<Rgba8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Allocate a transparent buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Allocation`] naming `what` when the storage cannot
    /// be reserved.
    pub fn try_new(width: u32, height: u32, what: &'static str) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(DashError::Allocation {
                what,
                bytes: usize::MAX,
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| DashError::Allocation {
            what,
            bytes: len.saturating_mul(std::mem::size_of::<Rgba8>()),
        })?;
        data.resize(len, Rgba8::TRANSPARENT);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whole-buffer rectangle.
    #[must_use]
    pub const fn bounds(&self) -> PixelRect {
        PixelRect::full(self.width, self.height)
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba8] {
        &self.data
    }

    /// Mutable pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.data
    }

    /// Linear index of an in-bounds pixel.
    #[must_use]
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Pixel at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba8> {
        self.index_of(x, y).map(|i| self.data[i])
    }

    /// Write a pixel; out-of-bounds writes are ignored. Returns whether it landed.
    pub fn put(&mut self, x: i32, y: i32, color: Rgba8) -> bool {
        match self.index_of(x, y) {
            Some(i) => {
                self.data[i] = color;
                true
            }
            None => false,
        }
    }

    /// One row of pixels.
    #[must_use]
    pub fn row(&self, y: u32) -> &[Rgba8] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(Rgba8::TRANSPARENT);
    }

    /// Reset the pixels inside `rect` to transparent.
    pub fn clear_rect(&mut self, rect: &PixelRect) {
        let Some(r) = rect.clip(self.width, self.height) else {
            return;
        };
        for y in r.y..(r.bottom() as i32) {
            let start = y as usize * self.width as usize + r.x as usize;
            self.data[start..start + r.width as usize].fill(Rgba8::TRANSPARENT);
        }
    }

    /// Check if every pixel is transparent.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.data.iter().all(Rgba8::is_transparent)
    }

    /// Number of non-transparent pixels.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|p| !p.is_transparent()).count()
    }
}

fn clipped(buf: &PixelBuffer, rect: PixelRect) -> PixelRect {
    rect.clip(buf.width, buf.height).unwrap_or_default()
}

/// Largest coordinate magnitude handed to the integer rasterizers.
pub(crate) const COORD_LIMIT: f64 = 1_000_000.0;

/// Round a screen coordinate into the range the rasterizers accept.
pub(crate) fn to_pixel(v: f64) -> i32 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

/// Liang-Barsky clip of segment `a`-`b` to the closed box `min`..=`max`.
///
/// Returns the rounded endpoints of the visible part, or `None` when the
/// segment misses the box or any coordinate is not finite.
pub(crate) fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    min: (f64, f64),
    max: (f64, f64),
) -> Option<((i32, i32), (i32, i32))> {
    if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) || max.0 < min.0 || max.1 < min.1 {
        return None;
    }
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, a.0 - min.0), (dx, max.0 - a.0), (-dy, a.1 - min.1), (dy, max.1 - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| {
        let x = (a.0 + dx * t).round().clamp(min.0, max.0);
        let y = (a.1 + dy * t).round().clamp(min.1, max.1);
        (x as i32, y as i32)
    };
    Some((at(t0), at(t1)))
}

/// Visit every point of the integer Bresenham line, both ends inclusive.
pub(crate) fn bresenham(x1: i32, y1: i32, x2: i32, y2: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (i64::from(x2) - i64::from(x1)).abs();
    let dy = (i64::from(y2) - i64::from(y1)).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (x1, y1);

    loop {
        plot(x, y);
        if x == x2 && y == y2 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

/// Integer Bresenham line from `(x1, y1)` to `(x2, y2)`, both ends inclusive.
pub fn draw_line(buf: &mut PixelBuffer, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba8) -> PixelRect {
    let max = (f64::from(buf.width) - 1.0, f64::from(buf.height) - 1.0);
    let point = |x: i32, y: i32| (f64::from(x), f64::from(y));
    let Some(((x1, y1), (x2, y2))) = clip_segment(point(x1, y1), point(x2, y2), (0.0, 0.0), max) else {
        return PixelRect::default();
    };
    bresenham(x1, y1, x2, y2, |x, y| {
        buf.put(x, y, color);
    });
    let bbox = PixelRect::new(
        x1.min(x2),
        y1.min(y2),
        x1.abs_diff(x2) + 1,
        y1.abs_diff(y2) + 1,
    );
    clipped(buf, bbox)
}

/// Fill the rectangle `(x, y, w, h)` clipped to the buffer.
pub fn draw_rect(buf: &mut PixelBuffer, x: i32, y: i32, w: i32, h: i32, color: Rgba8) -> PixelRect {
    if w <= 0 || h <= 0 {
        return PixelRect::default();
    }
    let area = clipped(buf, PixelRect::new(x, y, w as u32, h as u32));
    if area.is_empty() {
        return area;
    }
    let stride = buf.width as usize;
    for row in area.y..(area.bottom() as i32) {
        let start = row as usize * stride + area.x as usize;
        buf.data[start..start + area.width as usize].fill(color);
    }
    area
}

/// Point drawn as a square of side `radius` centered on `(x, y)`.
pub fn draw_point(buf: &mut PixelBuffer, x: i32, y: i32, radius: i32, color: Rgba8) -> PixelRect {
    let side = radius.max(1);
    let half = side / 2;
    draw_rect(buf, x.saturating_sub(half), y.saturating_sub(half), side, side, color)
}

/// Wedge approximated by [`PIE_SEGMENTS`] center-to-arc lines, the first on
/// `start_deg` and the last on `end_deg`.
pub fn draw_pie_slice(
    buf: &mut PixelBuffer,
    cx: i32,
    cy: i32,
    radius: i32,
    start_deg: f32,
    end_deg: f32,
    color: Rgba8,
) -> PixelRect {
    if radius <= 0 {
        return PixelRect::default();
    }
    let step = (end_deg - start_deg) / (PIE_SEGMENTS - 1) as f32;
    let mut touched = PixelRect::default();
    for i in 0..PIE_SEGMENTS {
        let angle = (start_deg + step * i as f32).to_radians();
        let ex = cx + (radius as f32 * angle.cos()).round() as i32;
        let ey = cy + (radius as f32 * angle.sin()).round() as i32;
        touched = touched.union(&draw_line(buf, cx, cy, ex, ey, color));
    }
    touched
}

/// Set every pixel to `color`.
pub fn fill_background(buf: &mut PixelBuffer, color: Rgba8) -> PixelRect {
    buf.data.fill(color);
    buf.bounds()
}
