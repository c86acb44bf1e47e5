//! Text planes: grids of terminal cells with per-cell dirty bits.
//!
//! Every render layer carries one of these next to its pixel buffer, and the
//! compositor owns one more for the final frame. Symbols are stored as
//! `CompactString` so single graphemes stay inline.

use crate::error::{DashError, Result};
use bitvec::prelude::*;
use compact_str::CompactString;
use dashtier_core::Color;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Text attributes for a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// Bold text.
    pub const BOLD: Self = Self(1 << 0);
    /// Dim/faint text.
    pub const DIM: Self = Self(1 << 1);
    /// Italic text.
    pub const ITALIC: Self = Self(1 << 2);
    /// Underlined text.
    pub const UNDERLINE: Self = Self(1 << 3);
    /// Reversed colors (used for selection highlights).
    pub const REVERSE: Self = Self(1 << 4);

    /// Check if no attribute is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if every attribute in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Add attributes.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// A single terminal cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Grapheme displayed in this cell.
    pub symbol: CompactString,
    /// Foreground color.
    pub fg: Color,
    /// Background color (transparent lets lower layers show through).
    pub bg: Color,
    /// Text attributes.
    pub modifiers: Modifiers,
    /// Display width (0 marks the trailing half of a wide grapheme).
    width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: CompactString::const_new(" "),
            fg: Color::WHITE,
            bg: Color::TRANSPARENT,
            modifiers: Modifiers::NONE,
            width: 1,
        }
    }
}

impl Cell {
    /// Create a cell.
    #[must_use]
    pub fn new(symbol: &str, fg: Color, bg: Color, modifiers: Modifiers) -> Self {
        Self {
            symbol: CompactString::new(symbol),
            fg,
            bg,
            modifiers,
            width: UnicodeWidthStr::width(symbol).clamp(1, 2) as u8,
        }
    }

    /// Replace the content in place.
    pub fn update(&mut self, symbol: &str, fg: Color, bg: Color, modifiers: Modifiers) {
        self.symbol.clear();
        self.symbol.push_str(symbol);
        self.fg = fg;
        self.bg = bg;
        self.modifiers = modifiers;
        self.width = UnicodeWidthStr::width(symbol).clamp(1, 2) as u8;
    }

    /// Turn this cell into the trailing half of a wide grapheme.
    pub fn make_continuation(&mut self) {
        self.symbol.clear();
        self.width = 0;
    }

    /// Check if this is the trailing half of a wide grapheme.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Display width.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// A blank cell contributes nothing when planes are stacked.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.width == 1 && self.symbol == " " && self.bg.a == 0.0
    }

    /// Reset to a blank cell.
    pub fn reset(&mut self) {
        self.update(" ", Color::WHITE, Color::TRANSPARENT, Modifiers::NONE);
    }
}

/// Row-major grid of cells with one dirty bit per cell.
#[derive(Debug, Clone)]
pub struct CellBuffer {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
    dirty: BitVec,
}

impl CellBuffer {
    /// Create a blank buffer.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            cells: vec![Cell::default(); size],
            width,
            height,
            dirty: bitvec![0; size],
        }
    }

    /// Create a blank buffer, reporting allocation failure instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Allocation`] if the cell storage cannot be reserved.
    pub fn try_new(width: u16, height: u16) -> Result<Self> {
        let size = usize::from(width) * usize::from(height);
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(size)
            .map_err(|_| DashError::Allocation {
                what: "cell plane",
                bytes: size.saturating_mul(std::mem::size_of::<Cell>()),
            })?;
        cells.resize(size, Cell::default());
        Ok(Self {
            cells,
            width,
            height,
            dirty: bitvec![0; size],
        })
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total cell count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the buffer has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Linear index of `(x, y)`.
    #[must_use]
    pub fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    /// Coordinates of a linear index.
    #[must_use]
    pub fn coords(&self, idx: usize) -> (u16, u16) {
        let w = usize::from(self.width.max(1));
        ((idx % w) as u16, (idx / w) as u16)
    }

    /// Cell at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        (x < self.width && y < self.height).then(|| &self.cells[self.index(x, y)])
    }

    /// Mutable cell at `(x, y)`. Does not mark the cell dirty.
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Replace a cell and mark it dirty.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.cells[idx] = cell;
            self.dirty.set(idx, true);
        }
    }

    /// Replace a cell only if it differs; returns whether it changed.
    ///
    /// Unchanged cells keep their dirty bit as is, so repeated frames with
    /// the same content produce no output.
    pub fn set_if_changed(&mut self, idx: usize, cell: &Cell) -> bool {
        match self.cells.get_mut(idx) {
            Some(existing) if existing != cell => {
                existing.clone_from(cell);
                self.dirty.set(idx, true);
                true
            }
            _ => false,
        }
    }

    /// Update a cell's content and mark it dirty.
    pub fn update(
        &mut self,
        x: u16,
        y: u16,
        symbol: &str,
        fg: Color,
        bg: Color,
        modifiers: Modifiers,
    ) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.cells[idx].update(symbol, fg, bg, modifiers);
            self.dirty.set(idx, true);
        }
    }

    /// Mark one cell dirty.
    pub fn mark_dirty(&mut self, x: u16, y: u16) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.dirty.set(idx, true);
        }
    }

    /// Mark every cell dirty (full redraw).
    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    /// Clear dirty flags.
    pub fn clear_dirty(&mut self) {
        self.dirty.fill(false);
    }

    /// Number of dirty cells.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.count_ones()
    }

    /// Indices of dirty cells in row-major order.
    pub fn iter_dirty(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty.iter_ones()
    }

    /// All cells.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if every cell is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }

    /// Resize, discarding content; every cell becomes dirty.
    ///
    /// # Errors
    ///
    /// Returns [`DashError::Allocation`] if the new storage cannot be reserved.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        *self = Self::try_new(width, height)?;
        self.mark_all_dirty();
        Ok(())
    }

    /// Reset every cell to blank without touching dirty bits.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    /// Fill a rectangle with spaces of the given colors, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u16, height: u16, fg: Color, bg: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i32::from(width)).min(i32::from(self.width));
        let y1 = (y + i32::from(height)).min(i32::from(self.height));
        for cy in y0..y1 {
            for cx in x0..x1 {
                self.update(cx as u16, cy as u16, " ", fg, bg, Modifiers::NONE);
            }
        }
    }

    /// Write text starting at `(x, y)`, clipped to the row.
    ///
    /// Graphemes are placed by display width; a wide grapheme that does not
    /// fit at the right edge is dropped. Returns the columns consumed.
    pub fn put_str(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        fg: Color,
        bg: Color,
        modifiers: Modifiers,
    ) -> u16 {
        if y < 0 || y >= i32::from(self.height) {
            return 0;
        }
        let row = y as u16;
        let mut col = x;
        let mut written = 0u16;
        for grapheme in text.graphemes(true) {
            let w = UnicodeWidthStr::width(grapheme).clamp(1, 2) as i32;
            if col + w > i32::from(self.width) {
                break;
            }
            if col >= 0 {
                self.update(col as u16, row, grapheme, fg, bg, modifiers);
                if w == 2 {
                    let idx = self.index(col as u16 + 1, row);
                    self.cells[idx].make_continuation();
                    self.dirty.set(idx, true);
                }
                written = written.saturating_add(w as u16);
            }
            col += w;
        }
        written
    }

    /// Text of one row with trailing blanks trimmed.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = self.index(0, y);
        let end = start + usize::from(self.width);
        let line: String = self.cells[start..end]
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.symbol.as_str())
            .collect();
        line.trim_end().to_string()
    }
}
