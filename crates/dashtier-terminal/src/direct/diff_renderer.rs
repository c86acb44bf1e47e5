//! Flushes dirty cells of the composited text plane.
//!
//! Only dirty cells are written. Cursor position and the last emitted style
//! are cached across cells so runs of neighbouring, same-styled cells cost a
//! single `MoveTo` and a single style change.

use super::cell_buffer::{CellBuffer, Modifiers};
use crate::color::ColorMode;
use crossterm::cursor::MoveTo;
use crossterm::style::{
    Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::{queue, QueueableCommand};
use dashtier_core::Color;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq)]
struct StyleState {
    fg: Color,
    bg: Color,
    modifiers: Modifiers,
}

/// Counters for one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Cells printed.
    pub cells_written: usize,
    /// Explicit cursor moves emitted.
    pub cursor_moves: usize,
    /// Style changes emitted.
    pub style_changes: usize,
}

/// Differential cell renderer.
#[derive(Debug)]
pub struct DiffRenderer {
    color_mode: ColorMode,
    /// `None` when the terminal cursor position is unknown.
    cursor: Option<(u16, u16)>,
    last_style: Option<StyleState>,
    stats: FlushStats,
}

impl DiffRenderer {
    /// Create a renderer that converts colors with `color_mode`.
    #[must_use]
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            color_mode,
            cursor: None,
            last_style: None,
            stats: FlushStats::default(),
        }
    }

    /// Color conversion in use.
    #[must_use]
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Statistics of the last flush.
    #[must_use]
    pub const fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Forget cached cursor and style (after a resize or foreign output).
    pub fn reset(&mut self) {
        self.cursor = None;
        self.last_style = None;
    }

    /// Write every dirty cell of `buffer` and clear its dirty bits.
    ///
    /// The writer is not flushed; callers batch the graphics payload and the
    /// cells before flushing once.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer. Dirty bits are only cleared on
    /// success, so a failed flush is retried in full on the next frame.
    pub fn flush<W: Write>(&mut self, buffer: &mut CellBuffer, writer: &mut W) -> io::Result<FlushStats> {
        self.stats = FlushStats::default();
        if buffer.dirty_count() == 0 {
            return Ok(self.stats);
        }

        let width = buffer.width();
        for idx in buffer.iter_dirty() {
            let (x, y) = buffer.coords(idx);
            let cell = &buffer.cells()[idx];
            if cell.is_continuation() {
                continue;
            }

            if self.cursor != Some((x, y)) {
                queue!(writer, MoveTo(x, y))?;
                self.stats.cursor_moves += 1;
            }

            let style = StyleState {
                fg: cell.fg,
                bg: cell.bg,
                modifiers: cell.modifiers,
            };
            if self.last_style != Some(style) {
                self.apply_style(writer, style)?;
                self.last_style = Some(style);
                self.stats.style_changes += 1;
            }

            queue!(writer, Print(cell.symbol.as_str()))?;
            let next_x = x.saturating_add(u16::from(cell.width()));
            self.cursor = (next_x < width).then_some((next_x, y));
            self.stats.cells_written += 1;
        }

        queue!(writer, ResetColor, SetAttribute(Attribute::Reset))?;
        self.last_style = None;
        buffer.clear_dirty();
        Ok(self.stats)
    }

    fn apply_style<W: Write>(&self, writer: &mut W, style: StyleState) -> io::Result<()> {
        writer.queue(SetAttribute(Attribute::Reset))?;
        writer.queue(SetForegroundColor(self.color_mode.to_crossterm(style.fg)))?;
        writer.queue(SetBackgroundColor(self.color_mode.to_crossterm(style.bg)))?;

        let attributes = [
            (Modifiers::BOLD, Attribute::Bold),
            (Modifiers::DIM, Attribute::Dim),
            (Modifiers::ITALIC, Attribute::Italic),
            (Modifiers::UNDERLINE, Attribute::Underlined),
            (Modifiers::REVERSE, Attribute::Reverse),
        ];
        for (modifier, attribute) in attributes {
            if style.modifiers.contains(modifier) {
                writer.queue(SetAttribute(attribute))?;
            }
        }
        Ok(())
    }
}
