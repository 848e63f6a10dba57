//! Unbounded line-collector backend
//!
//! Reports an effectively unbounded size so the emulator never wraps or
//! scrolls; rows and columns grow on demand as cells are written. Used to
//! strip control sequences from captured output and measure the text left
//! behind.

use super::cell::{Cell, Point};
use super::display::CharDisplay;

const FALLBACK_WIDTH: i32 = 80;
const FALLBACK_HEIGHT: i32 = 24;

#[derive(Debug, Clone, Default)]
pub struct CaptureDisplay {
    rows: Vec<Vec<Cell>>,
}

impl CaptureDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Longest row, in cells.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Collected rows as plain text.
    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.code).collect())
            .collect()
    }

    fn blank() -> Cell {
        Cell::default()
    }
}

impl CharDisplay for CaptureDisplay {
    fn size(&self) -> Point {
        Point::new(i32::MAX, i32::MAX)
    }

    fn clear(&mut self, from: Point, to: Point) {
        let first = usize::try_from(from.y).unwrap_or(0);
        let Ok(last) = usize::try_from(to.y) else {
            return;
        };
        for y in first..=last {
            let Some(row) = self.rows.get_mut(y) else {
                return;
            };
            let start = if y == first {
                usize::try_from(from.x).unwrap_or(0)
            } else {
                0
            };
            let end = if y == last {
                usize::try_from(to.x).unwrap_or(0)
            } else {
                usize::MAX
            };
            if end >= row.len() {
                row.truncate(start);
            } else if start <= end {
                row[start..=end].fill(Self::blank());
            }
        }
    }

    fn decaln(&mut self, size: Point) {
        let mut size = size;
        if size.x == i32::MAX {
            size.x = match i32::try_from(self.width()) {
                Ok(0) | Err(_) => FALLBACK_WIDTH,
                Ok(w) => w,
            };
        }
        if size.y == i32::MAX {
            size.y = match i32::try_from(self.height()) {
                Ok(0) | Err(_) => FALLBACK_HEIGHT,
                Ok(h) => h,
            };
        }

        let e = Self::blank().with_code('E');
        for y in 0..size.y {
            for x in 0..size.x {
                self.set(Point::new(x, y), e);
            }
        }
    }

    fn set(&mut self, p: Point, cell: Cell) {
        let (Ok(x), Ok(y)) = (usize::try_from(p.x), usize::try_from(p.y)) else {
            return;
        };
        if self.rows.len() <= y {
            self.rows.resize_with(y + 1, Vec::new);
        }
        let row = &mut self.rows[y];
        if row.len() <= x {
            row.resize(x + 1, Self::blank());
        }
        row[x] = cell;
    }

    fn insert_chars(&mut self, _size: Point, p: Point, count: i32) {
        let (Ok(x), Ok(y), Ok(count)) = (
            usize::try_from(p.x),
            usize::try_from(p.y),
            usize::try_from(count),
        ) else {
            return;
        };
        let Some(row) = self.rows.get_mut(y) else {
            return;
        };
        if x < row.len() {
            // Grow by at most the cells being shifted
            let count = count.min(row.len() - x);
            row.splice(x..x, std::iter::repeat(Self::blank()).take(count));
        }
    }

    fn delete_chars(&mut self, _size: Point, p: Point, count: i32) {
        let (Ok(x), Ok(y), Ok(count)) = (
            usize::try_from(p.x),
            usize::try_from(p.y),
            usize::try_from(count),
        ) else {
            return;
        };
        let Some(row) = self.rows.get_mut(y) else {
            return;
        };
        if x < row.len() {
            let end = x.saturating_add(count).min(row.len());
            row.drain(x..end);
        }
    }

    fn scroll_up(&mut self, count: i32) {
        let count = usize::try_from(count).unwrap_or(0).min(self.rows.len());
        self.rows.drain(..count);
        self.rows.extend(std::iter::repeat_with(Vec::new).take(count));
    }
}
