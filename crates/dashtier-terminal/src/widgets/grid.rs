//! Fixed matrix of labelled values.

use super::{put_text, truncate, CellArea, DashWidget, Palette, RenderMode};
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use dashtier_core::Rect;
use unicode_width::UnicodeWidthStr;

/// `rows × cols` cells, each a label over a value. Static: ignores input.
#[derive(Debug, Clone)]
pub struct Grid {
    mode: RenderMode,
    rows: usize,
    cols: usize,
    labels: Vec<String>,
    cells: Vec<String>,
    palette: Palette,
}

impl Grid {
    /// Grid of empty cells.
    #[must_use]
    pub fn new(tier: CapabilityTier, rows: usize, cols: usize) -> Self {
        let len = rows.saturating_mul(cols);
        Self {
            mode: RenderMode::from_tier(tier),
            rows,
            cols,
            labels: vec![String::new(); len],
            cells: vec![String::new(); len],
            palette: Palette::default(),
        }
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Set a cell's value; returns false when out of range.
    pub fn set_cell(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        let Some(i) = self.index(row, col) else {
            return false;
        };
        self.cells[i] = text.into();
        true
    }

    /// Set a cell's caption; returns false when out of range.
    pub fn set_label(&mut self, row: usize, col: usize, label: impl Into<String>) -> bool {
        let Some(i) = self.index(row, col) else {
            return false;
        };
        self.labels[i] = label.into();
        true
    }

    /// Value text of a cell.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.index(row, col).map(|i| self.cells[i].as_str())
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}

impl DashWidget for Grid {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        if area.is_empty() || self.rows == 0 || self.cols == 0 {
            return;
        }
        let cw = f32::from(area.width) / self.cols as f32;
        let ch = f32::from(area.height) / self.rows as f32;
        let separator = if self.mode.unicode() { "│" } else { "|" };

        for row in 0..self.rows {
            for col in 0..self.cols {
                let i = row * self.cols + col;
                let x0 = area.x + (col as f32 * cw).floor() as i32;
                let x1 = area.x + ((col + 1) as f32 * cw).floor() as i32;
                let y0 = area.y + (row as f32 * ch).floor() as i32;
                let y1 = area.y + ((row + 1) as f32 * ch).floor() as i32;
                let inner = usize::try_from(x1 - x0 - i32::from(col > 0)).unwrap_or(0);
                let text_x = x0 + i32::from(col > 0);
                if col > 0 {
                    for y in y0..y1.max(y0 + 1) {
                        put_text(pipeline, LayerId::Background, x0, y, separator, self.palette.border, Modifiers::NONE);
                    }
                }

                let value = truncate(&self.cells[i], inner);
                let label = truncate(&self.labels[i], inner);
                let centered = |s: &str| text_x + (inner.saturating_sub(s.width()) / 2) as i32;
                let (label_y, value_y) = if y1 - y0 >= 2 && !label.is_empty() {
                    let mid = y0 + (y1 - y0 - 2) / 2;
                    (Some(mid), mid + 1)
                } else {
                    (None, y0 + (y1 - y0 - 1).max(0) / 2)
                };
                if let Some(ly) = label_y {
                    put_text(pipeline, LayerId::Background, centered(&label), ly, &label, self.palette.muted, Modifiers::NONE);
                }
                put_text(pipeline, LayerId::Data, centered(&value), value_y, &value, self.palette.text, Modifiers::BOLD);
            }
        }
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::tests::pipeline;

    #[test]
    fn test_set_cell_bounds() {
        let mut g = Grid::new(CapabilityTier::High, 2, 2);
        assert!(g.set_cell(1, 1, "ok"));
        assert!(!g.set_cell(2, 0, "x"));
        assert!(!g.set_label(0, 5, "x"));
        assert_eq!(g.cell(1, 1), Some("ok"));
        assert_eq!(g.cell(3, 3), None);
    }

    #[test]
    fn test_render_ascii_separator_and_values() {
        let mut g = Grid::new(CapabilityTier::Minimal, 1, 2);
        g.set_cell(0, 0, "up");
        g.set_cell(0, 1, "down");
        let mut p = pipeline(CapabilityTier::Minimal, 10, 1);
        g.render(&mut p, &Rect::new(0.0, 0.0, 10.0, 1.0));
        assert_eq!(p.layer(LayerId::Background).text().row_text(0), "     |");
        assert_eq!(p.layer(LayerId::Data).text().row_text(0), " up   down");
    }

    #[test]
    fn test_label_above_value() {
        let mut g = Grid::new(CapabilityTier::Standard, 1, 1);
        g.set_label(0, 0, "disk");
        g.set_cell(0, 0, "42%");
        let mut p = pipeline(CapabilityTier::Standard, 6, 2);
        g.render(&mut p, &Rect::new(0.0, 0.0, 6.0, 2.0));
        assert_eq!(p.layer(LayerId::Background).text().row_text(0).trim(), "disk");
        assert_eq!(p.layer(LayerId::Data).text().row_text(1).trim(), "42%");
    }
}
