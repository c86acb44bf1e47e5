//! Sub-cell plotting with Unicode Braille patterns.
//!
//! Each terminal cell holds a 2×4 dot matrix encoded as `U+2800 + bits`:
//!
//! ```text
//! col 0  col 1
//!  bit0   bit3    row 0
//!  bit1   bit4    row 1
//!  bit2   bit5    row 2
//!  bit6   bit7    row 3
//! ```

use crate::direct::{CellBuffer, Modifiers};
use crate::raster::bresenham;
use crate::series::DataPoint;
use crate::viewport::WorldBounds;
use dashtier_core::Color;

/// Base codepoint of the Braille patterns block.
pub const BRAILLE_BASE: u32 = 0x2800;

const DOT_BITS: [[u8; 4]; 2] = [[0, 1, 2, 6], [3, 4, 5, 7]];

/// Braille codepoint for a dot bitmask.
#[must_use]
pub fn braille_char(bits: u8) -> char {
    char::from_u32(BRAILLE_BASE + u32::from(bits)).unwrap_or(' ')
}

/// Dot grid addressed at 2 columns × 4 rows per cell.
#[derive(Debug, Clone)]
pub struct BrailleCanvas {
    columns: u16,
    rows: u16,
    cells: Vec<u8>,
    colors: Vec<Option<Color>>,
    world: WorldBounds,
    dot_threshold: f64,
}

impl BrailleCanvas {
    /// Canvas covering `columns` × `rows` terminal cells.
    #[must_use]
    pub fn new(columns: u16, rows: u16) -> Self {
        let len = usize::from(columns) * usize::from(rows);
        Self {
            columns,
            rows,
            cells: vec![0; len],
            colors: vec![None; len],
            world: WorldBounds::default(),
            dot_threshold: 0.0,
        }
    }

    /// Minimum normalized density for [`BrailleCanvas::plot_density`] to set a dot.
    #[must_use]
    pub fn with_dot_threshold(mut self, threshold: f64) -> Self {
        self.dot_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Current density threshold.
    #[must_use]
    pub const fn dot_threshold(&self) -> f64 {
        self.dot_threshold
    }

    /// Width in dots.
    #[must_use]
    pub fn dot_width(&self) -> i32 {
        i32::from(self.columns) * 2
    }

    /// Height in dots.
    #[must_use]
    pub fn dot_height(&self) -> i32 {
        i32::from(self.rows) * 4
    }

    /// Set the world range mapped onto the dot grid.
    pub fn set_world_bounds(&mut self, bounds: WorldBounds) {
        self.world = bounds;
    }

    /// World range currently mapped.
    #[must_use]
    pub const fn world_bounds(&self) -> WorldBounds {
        self.world
    }

    /// Erase every dot.
    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.colors.fill(None);
    }

    /// Set a dot; out-of-range dots are ignored.
    pub fn set_dot(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.dot_width() || y >= self.dot_height() {
            return;
        }
        let idx = (y / 4) as usize * usize::from(self.columns) + (x / 2) as usize;
        self.cells[idx] |= 1 << DOT_BITS[(x % 2) as usize][(y % 4) as usize];
        self.colors[idx] = Some(color);
    }

    /// Check whether a dot is set.
    #[must_use]
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.dot_width() || y >= self.dot_height() {
            return false;
        }
        let idx = (y / 4) as usize * usize::from(self.columns) + (x / 2) as usize;
        self.cells[idx] & (1 << DOT_BITS[(x % 2) as usize][(y % 4) as usize]) != 0
    }

    /// Dot line between two dot coordinates.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        bresenham(x0, y0, x1, y1, |x, y| self.set_dot(x, y, color));
    }

    /// Map a world point to dot coordinates (Y up in world, down on screen).
    #[must_use]
    pub fn world_to_dot(&self, x: f64, y: f64) -> (i32, i32) {
        let (tx, ty) = self.world.normalize(x, y);
        let w = f64::from(self.dot_width() - 1).max(0.0);
        let h = f64::from(self.dot_height() - 1).max(0.0);
        let limit = f64::from(i16::MAX);
        (
            (tx * w).round().clamp(-limit, limit) as i32,
            ((1.0 - ty) * h).round().clamp(-limit, limit) as i32,
        )
    }

    /// Rasterize points as a polyline (`connect`) or scatter.
    ///
    /// Non-finite points break the polyline.
    pub fn plot_data_points(&mut self, points: &[DataPoint], connect: bool, color: Color) {
        let mut prev: Option<(i32, i32)> = None;
        for p in points {
            if !p.is_finite() {
                prev = None;
                continue;
            }
            let dot = self.world_to_dot(p.x, p.y);
            match prev {
                Some((px, py)) if connect => self.line(px, py, dot.0, dot.1, color),
                _ => self.set_dot(dot.0, dot.1, color),
            }
            prev = Some(dot);
        }
    }

    /// Vertical dot column from world `y` down (or up) to `baseline`.
    pub fn fill_to_baseline(&mut self, x: f64, y: f64, baseline: f64, color: Color) {
        let (dx, top) = self.world_to_dot(x, y);
        let (_, bottom) = self.world_to_dot(x, baseline);
        self.line(dx, top, dx, bottom, color);
    }

    /// Bin points per dot and set the dots whose hit count, relative to the
    /// densest dot, reaches the threshold.
    pub fn plot_density(&mut self, points: &[DataPoint], color: Color) {
        let w = self.dot_width().max(0) as usize;
        let h = self.dot_height().max(0) as usize;
        let mut hits = vec![0u32; w * h];
        for p in points.iter().filter(|p| p.is_finite() && self.world.contains(p.x, p.y)) {
            let (x, y) = self.world_to_dot(p.x, p.y);
            if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
                let i = y as usize * w + x as usize;
                hits[i] = hits[i].saturating_add(1);
            }
        }
        let max = hits.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return;
        }
        for (i, &count) in hits.iter().enumerate() {
            if count > 0 && f64::from(count) / f64::from(max) >= self.dot_threshold {
                self.set_dot((i % w) as i32, (i / w) as i32, color);
            }
        }
    }

    /// Number of set dots.
    #[must_use]
    pub fn dot_count(&self) -> u32 {
        self.cells.iter().map(|b| b.count_ones()).sum()
    }

    /// Codepoint for one cell, or `None` when it has no dots.
    #[must_use]
    pub fn cell_char(&self, column: u16, row: u16) -> Option<char> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let bits = self.cells[usize::from(row) * usize::from(self.columns) + usize::from(column)];
        (bits != 0).then(|| braille_char(bits))
    }

    /// Serialize non-empty cells into `plane` at cell offset `(x, y)`.
    ///
    /// Empty cells are left untouched so lower text shows through.
    pub fn render(&self, plane: &mut CellBuffer, x: i32, y: i32, fallback: Color) {
        let mut buf = [0u8; 4];
        for row in 0..self.rows {
            for col in 0..self.columns {
                let idx = usize::from(row) * usize::from(self.columns) + usize::from(col);
                let bits = self.cells[idx];
                if bits == 0 {
                    continue;
                }
                let cx = x + i32::from(col);
                let cy = y + i32::from(row);
                if cx < 0 || cy < 0 {
                    continue;
                }
                let symbol = braille_char(bits).encode_utf8(&mut buf);
                let fg = self.colors[idx].unwrap_or(fallback);
                plane.update(cx as u16, cy as u16, symbol, fg, Color::TRANSPARENT, Modifiers::NONE);
            }
        }
    }

    /// Grid as strings, one per row (blank cells as spaces).
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                (0..self.columns)
                    .map(|col| self.cell_char(col, row).unwrap_or(' '))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braille_char_extremes() {
        assert_eq!(braille_char(0), '\u{2800}');
        assert_eq!(braille_char(0xFF), '⣿');
    }

    #[test]
    fn test_single_dot_positions() {
        let mut c = BrailleCanvas::new(1, 1);
        c.set_dot(0, 0, Color::WHITE);
        assert_eq!(c.cell_char(0, 0), Some('⠁'));
        c.clear();
        c.set_dot(1, 3, Color::WHITE);
        assert_eq!(c.cell_char(0, 0), Some('⢀'));
        c.clear();
        c.set_dot(0, 3, Color::WHITE);
        assert_eq!(c.cell_char(0, 0), Some('⡀'));
    }

    #[test]
    fn test_all_dots_full_cell() {
        let mut c = BrailleCanvas::new(1, 1);
        for y in 0..4 {
            for x in 0..2 {
                c.set_dot(x, y, Color::WHITE);
            }
        }
        assert_eq!(c.cell_char(0, 0), Some('⣿'));
        assert_eq!(c.dot_count(), 8);
    }

    #[test]
    fn test_out_of_range_dots_ignored() {
        let mut c = BrailleCanvas::new(2, 2);
        c.set_dot(-1, 0, Color::WHITE);
        c.set_dot(4, 0, Color::WHITE);
        c.set_dot(0, 8, Color::WHITE);
        assert_eq!(c.dot_count(), 0);
        assert!(!c.is_set(-1, 0));
    }

    #[test]
    fn test_world_to_dot_corners() {
        let mut c = BrailleCanvas::new(10, 5);
        c.set_world_bounds(WorldBounds::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(c.world_to_dot(0.0, 0.0), (0, 19));
        assert_eq!(c.world_to_dot(1.0, 1.0), (19, 0));
    }

    #[test]
    fn test_plot_connected_line() {
        let mut c = BrailleCanvas::new(4, 1);
        c.set_world_bounds(WorldBounds::new(0.0, 7.0, 0.0, 1.0));
        c.plot_data_points(&[DataPoint::new(0.0, 0.0), DataPoint::new(7.0, 0.0)], true, Color::GREEN);
        assert_eq!(c.dot_count(), 8);
        assert_eq!(c.to_lines(), vec!["⣀⣀⣀⣀".to_string()]);
    }

    #[test]
    fn test_plot_scatter_only_sets_points() {
        let mut c = BrailleCanvas::new(4, 1);
        c.set_world_bounds(WorldBounds::new(0.0, 7.0, 0.0, 1.0));
        c.plot_data_points(&[DataPoint::new(0.0, 0.0), DataPoint::new(7.0, 0.0)], false, Color::GREEN);
        assert_eq!(c.dot_count(), 2);
    }

    #[test]
    fn test_nan_breaks_polyline() {
        let mut c = BrailleCanvas::new(4, 1);
        c.set_world_bounds(WorldBounds::new(0.0, 7.0, 0.0, 1.0));
        let pts = [
            DataPoint::new(0.0, 0.0),
            DataPoint::new(f64::NAN, 0.0),
            DataPoint::new(7.0, 0.0),
        ];
        c.plot_data_points(&pts, true, Color::GREEN);
        assert_eq!(c.dot_count(), 2);
    }

    #[test]
    fn test_density_threshold_filters_sparse_dots() {
        let mut c = BrailleCanvas::new(2, 1).with_dot_threshold(0.5);
        c.set_world_bounds(WorldBounds::new(0.0, 3.0, 0.0, 3.0));
        let mut pts = vec![DataPoint::new(0.0, 0.0); 4];
        pts.push(DataPoint::new(3.0, 3.0));
        c.plot_density(&pts, Color::WHITE);
        assert!(c.is_set(0, 3));
        assert!(!c.is_set(3, 0));
    }

    #[test]
    fn test_fill_to_baseline() {
        let mut c = BrailleCanvas::new(1, 1);
        c.set_world_bounds(WorldBounds::new(0.0, 1.0, 0.0, 3.0));
        c.fill_to_baseline(0.0, 3.0, 0.0, Color::WHITE);
        assert_eq!(c.dot_count(), 4);
    }

    #[test]
    fn test_render_keeps_empty_cells() {
        let mut c = BrailleCanvas::new(3, 1);
        c.set_dot(0, 0, Color::RED);
        let mut plane = CellBuffer::new(5, 2);
        plane.update(2, 1, "z", Color::WHITE, Color::TRANSPARENT, Modifiers::NONE);
        c.render(&mut plane, 1, 1, Color::WHITE);
        assert_eq!(plane.get(1, 1).map(|cell| cell.symbol.as_str()), Some("⠁"));
        assert_eq!(plane.get(1, 1).map(|cell| cell.fg), Some(Color::RED));
        assert_eq!(plane.get(2, 1).map(|cell| cell.symbol.as_str()), Some("z"));
    }
}
