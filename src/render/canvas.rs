//! Character matrix with clipped drawing primitives.

use crate::geometry::Size;
use crate::width::{display_width, truncate_to_width};

pub const BLANK: char = ' ';
pub const GRID_DOT: char = '·';

const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

/// Fixed-size grid of single-width glyphs. Writes outside the grid are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    size: Size,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(size: Size) -> Self {
        let len = usize::from(size.width) * usize::from(size.height);
        Self {
            size,
            cells: vec![BLANK; len],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let inside = x >= 0
            && y >= 0
            && x < i64::from(self.size.width)
            && y < i64::from(self.size.height);
        inside.then(|| y as usize * usize::from(self.size.width) + x as usize)
    }

    pub fn get(&self, x: i64, y: i64) -> Option<char> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    pub fn set(&mut self, x: i64, y: i64, glyph: char) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = glyph;
        }
    }

    pub fn is_blank(&self, x: i64, y: i64) -> bool {
        self.get(x, y) == Some(BLANK)
    }

    /// Rectangle outline between inclusive corners, clipped to the canvas.
    ///
    /// Single-row boxes collapse to a horizontal rule and single-column
    /// boxes to a vertical one. Corners are clamped to one cell outside the
    /// canvas first, so the work is bounded by the canvas size.
    pub fn draw_box(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) {
        let max_x = i64::from(self.size.width);
        let max_y = i64::from(self.size.height);
        let (left, right) = (x0.min(x1).clamp(-1, max_x), x0.max(x1).clamp(-1, max_x));
        let (top, bottom) = (y0.min(y1).clamp(-1, max_y), y0.max(y1).clamp(-1, max_y));

        if top == bottom {
            for x in left..=right {
                self.set(x, top, HORIZONTAL);
            }
            return;
        }
        if left == right {
            for y in top..=bottom {
                self.set(left, y, VERTICAL);
            }
            return;
        }

        for x in left + 1..right {
            self.set(x, top, HORIZONTAL);
            self.set(x, bottom, HORIZONTAL);
        }
        for y in top + 1..bottom {
            self.set(left, y, VERTICAL);
            self.set(right, y, VERTICAL);
        }
        self.set(left, top, TOP_LEFT);
        self.set(right, top, TOP_RIGHT);
        self.set(left, bottom, BOTTOM_LEFT);
        self.set(right, bottom, BOTTOM_RIGHT);
    }

    /// Write `text` starting at `(x, y)`, one glyph per cell, clipped.
    pub fn write_text(&mut self, x: i64, y: i64, text: &str) {
        for (offset, ch) in text.chars().enumerate() {
            self.set(x.saturating_add(offset as i64), y, ch);
        }
    }

    /// Center `text` within `[left, right]` on row `y`, truncated to fit.
    pub fn write_centered(&mut self, left: i64, right: i64, y: i64, text: &str) {
        if right < left {
            return;
        }
        let room = usize::try_from(right.saturating_sub(left).saturating_add(1))
            .unwrap_or(usize::MAX);
        let label = truncate_to_width(text, room);
        let used = display_width(&label);
        let start = left.saturating_add(i64::try_from((room - used) / 2).unwrap_or(i64::MAX));
        self.write_text(start, y, &label);
    }

    pub fn lines(&self) -> Vec<String> {
        if self.size.width == 0 {
            return vec![String::new(); usize::from(self.size.height)];
        }
        self.cells
            .chunks(usize::from(self.size.width))
            .map(|row| row.iter().collect())
            .collect()
    }
}
