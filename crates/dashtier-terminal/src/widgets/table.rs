//! Scrollable table with row selection.

use super::{put_text, truncate, CellArea, DashWidget, Palette, RenderMode};
use crate::caps::CapabilityTier;
use crate::direct::Modifiers;
use crate::layer::LayerId;
use crate::pipeline::RenderPipeline;
use dashtier_core::{Event, Key, MouseButton, Rect};
use unicode_width::UnicodeWidthStr;

/// Gap between columns.
const COLUMN_GAP: usize = 1;

/// Header row plus scrolling body.
#[derive(Debug, Clone)]
pub struct Table {
    mode: RenderMode,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    max_rows: Option<usize>,
    selected: Option<usize>,
    offset: usize,
    palette: Palette,
}

impl Table {
    /// Empty table for `tier`.
    #[must_use]
    pub fn new(tier: CapabilityTier) -> Self {
        Self {
            mode: RenderMode::from_tier(tier),
            columns: Vec::new(),
            rows: Vec::new(),
            max_rows: None,
            selected: None,
            offset: 0,
            palette: Palette::default(),
        }
    }

    /// Keep only the newest `max` rows on [`Table::push_row`].
    #[must_use]
    pub fn with_max_rows(mut self, max: usize) -> Self {
        self.max_rows = Some(max.max(1));
        self
    }

    /// Header labels.
    pub fn set_columns(&mut self, columns: impl IntoIterator<Item = impl Into<String>>) {
        self.columns = columns.into_iter().map(Into::into).collect();
    }

    /// Header labels.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Replace the body; selection is clamped to the new length.
    pub fn set_rows(&mut self, rows: Vec<Vec<String>>) {
        self.rows = rows;
        self.clamp_selection();
    }

    /// Append a row, evicting the oldest beyond the row limit.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
        if let Some(max) = self.max_rows {
            let excess = self.rows.len().saturating_sub(max);
            if excess > 0 {
                self.rows.drain(..excess);
                self.selected = self.selected.and_then(|s| s.checked_sub(excess));
                self.offset = self.offset.saturating_sub(excess);
            }
        }
    }

    /// Body rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Selected row index.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Selected row.
    #[must_use]
    pub fn selected_row(&self) -> Option<&[String]> {
        self.selected.and_then(|i| self.rows.get(i)).map(Vec::as_slice)
    }

    /// First visible row.
    #[must_use]
    pub const fn scroll_offset(&self) -> usize {
        self.offset
    }

    /// Select a row, or clear with `None`.
    pub fn select(&mut self, row: Option<usize>) {
        self.selected = row.filter(|&r| r < self.rows.len());
    }

    fn clamp_selection(&mut self) {
        let len = self.rows.len();
        self.selected = self.selected.map(|s| s.min(len.saturating_sub(1))).filter(|_| len > 0);
        self.offset = self.offset.min(len.saturating_sub(1));
    }

    /// Body rows that fit in `bounds`.
    fn page(bounds: &Rect) -> usize {
        usize::from(CellArea::from_rect(bounds).height.saturating_sub(1)).max(1)
    }

    fn scroll_into_view(&mut self, page: usize) {
        if let Some(s) = self.selected {
            if s < self.offset {
                self.offset = s;
            } else if s >= self.offset + page {
                self.offset = s + 1 - page;
            }
        }
    }

    fn move_selection(&mut self, delta: isize, page: usize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        let next = match self.selected {
            None if delta >= 0 => 0,
            None => last,
            Some(s) => s.saturating_add_signed(delta).min(last),
        };
        self.selected = Some(next);
        self.scroll_into_view(page);
    }

    /// Column widths fitted to `width`.
    fn column_widths(&self, width: usize) -> Vec<usize> {
        let n = self.columns.len().max(self.rows.iter().map(Vec::len).max().unwrap_or(0));
        if n == 0 {
            return Vec::new();
        }
        let mut widths = vec![0usize; n];
        for (i, c) in self.columns.iter().enumerate() {
            widths[i] = widths[i].max(c.width());
        }
        for row in &self.rows {
            for (i, c) in row.iter().enumerate() {
                widths[i] = widths[i].max(c.width());
            }
        }
        let avail = width.saturating_sub(COLUMN_GAP * (n - 1));
        while widths.iter().sum::<usize>() > avail {
            let Some(widest) = widths.iter_mut().max() else { break };
            if *widest == 0 {
                break;
            }
            *widest -= 1;
        }
        widths
    }

    fn format_row(cells: &[String], widths: &[usize]) -> String {
        let mut line = String::new();
        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                line.push_str(&" ".repeat(COLUMN_GAP));
            }
            let cell = truncate(cells.get(i).map_or("", String::as_str), *w);
            let pad = w.saturating_sub(cell.width());
            line.push_str(&cell);
            line.push_str(&" ".repeat(pad));
        }
        line
    }
}

impl DashWidget for Table {
    fn render(&self, pipeline: &mut RenderPipeline, bounds: &Rect) {
        let area = CellArea::from_rect(bounds);
        if area.is_empty() {
            return;
        }
        let widths = self.column_widths(usize::from(area.width));
        if !self.columns.is_empty() {
            let header = Self::format_row(&self.columns, &widths);
            put_text(pipeline, LayerId::Background, area.x, area.y, &header, self.palette.title, Modifiers::BOLD.with(Modifiers::UNDERLINE));
        }
        let page = Self::page(bounds);
        for (i, row) in self.rows.iter().enumerate().skip(self.offset).take(page) {
            let y = area.y + 1 + (i - self.offset) as i32;
            if y >= area.bottom() {
                break;
            }
            let line = Self::format_row(row, &widths);
            if self.selected == Some(i) {
                let layer = pipeline.layer_mut(LayerId::Interactive);
                layer.fill_cells(area.x, y, area.width, 1, self.palette.accent);
                layer.put_text(area.x, y, &line, self.palette.panel, self.palette.accent, Modifiers::BOLD);
            } else {
                put_text(pipeline, LayerId::Data, area.x, y, &line, self.palette.text, Modifiers::NONE);
            }
        }
        if self.rows.len() > page {
            let marker = if self.mode.unicode() { "↕" } else { ":" };
            put_text(pipeline, LayerId::Background, area.right() - 1, area.y, marker, self.palette.muted, Modifiers::NONE);
        }
    }

    fn handle_input(&mut self, event: &Event, bounds: &Rect) -> bool {
        let page = Self::page(bounds);
        match event {
            Event::KeyDown { key } => {
                let last = self.rows.len().saturating_sub(1) as isize;
                let delta = match key {
                    Key::Up => -1,
                    Key::Down => 1,
                    Key::PageUp => -(page as isize),
                    Key::PageDown => page as isize,
                    Key::Home => -last - 1,
                    Key::End => last + 1,
                    _ => return false,
                };
                self.move_selection(delta, page);
                !self.rows.is_empty()
            }
            Event::MouseDown {
                position,
                button: MouseButton::Left,
            } => {
                let row = (position.y - bounds.y).floor() as isize - 1;
                if row < 0 {
                    return false;
                }
                let index = self.offset + row as usize;
                if index >= self.rows.len() {
                    return false;
                }
                self.selected = Some(index);
                true
            }
            Event::Scroll { delta_y, .. } => {
                let max_offset = self.rows.len().saturating_sub(page);
                let next = if *delta_y > 0.0 {
                    (self.offset + 1).min(max_offset)
                } else if *delta_y < 0.0 {
                    self.offset.saturating_sub(1)
                } else {
                    self.offset
                };
                let changed = next != self.offset;
                self.offset = next;
                changed
            }
            _ => false,
        }
    }

    fn render_mode(&self) -> RenderMode {
        self.mode
    }
}
