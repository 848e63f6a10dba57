//! Fixed-size character grid backend

use super::cell::{Cell, Color, Point};
use super::display::CharDisplay;

/// Dense `width x height` cell grid.
#[derive(Debug, Clone)]
pub struct GridDisplay {
    blank: Cell,
    size: Point,
    rows: Vec<Vec<Cell>>,
}

impl GridDisplay {
    /// Create a grid filled with the default blank cell (space, black on white).
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_blank(width, height, Cell::new(' ', Color::BLACK, Color::WHITE))
    }

    pub fn with_blank(width: i32, height: i32, blank: Cell) -> Self {
        let mut grid = Self {
            blank,
            size: Point::ZERO,
            rows: Vec::new(),
        };
        grid.resize(width, height);
        grid
    }

    /// Resize the grid. Overlapping content is preserved, new cells are blank.
    pub fn resize(&mut self, width: i32, height: i32) {
        let width = width.max(0);
        let height = height.max(0);
        self.size = Point::new(width, height);

        let cols = width as usize;
        let blank = self.blank;
        self.rows.resize_with(height as usize, || vec![blank; cols]);
        for row in &mut self.rows {
            row.resize(cols, blank);
        }
    }

    pub fn blank(&self) -> Cell {
        self.blank
    }

    pub fn cell(&self, p: Point) -> Option<&Cell> {
        let (x, y) = index(p)?;
        self.rows.get(y)?.get(x)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Text of one row, trailing blanks included.
    pub fn row_text(&self, y: usize) -> String {
        self.rows
            .get(y)
            .map(|row| row.iter().map(|c| c.code).collect())
            .unwrap_or_default()
    }

    /// All rows as text with trailing spaces removed.
    pub fn lines(&self) -> Vec<String> {
        (0..self.rows.len())
            .map(|y| self.row_text(y).trim_end_matches(' ').to_string())
            .collect()
    }

    fn row_mut(&mut self, y: i32) -> Option<&mut Vec<Cell>> {
        let y = usize::try_from(y).ok()?;
        self.rows.get_mut(y)
    }
}

fn index(p: Point) -> Option<(usize, usize)> {
    Some((usize::try_from(p.x).ok()?, usize::try_from(p.y).ok()?))
}

/// Column `x` clamped into `[0, len]`.
fn col(x: i32, len: usize) -> usize {
    usize::try_from(x).unwrap_or(0).min(len)
}

impl CharDisplay for GridDisplay {
    fn size(&self) -> Point {
        self.size
    }

    fn clear(&mut self, from: Point, to: Point) {
        let blank = self.blank;
        let last = to.y.min(self.size.y - 1);
        for y in from.y.max(0)..=last {
            let Some(row) = self.row_mut(y) else {
                continue;
            };
            let start = if y == from.y { col(from.x, row.len()) } else { 0 };
            let end = if y == to.y {
                col(to.x.saturating_add(1), row.len())
            } else {
                row.len()
            };
            if start < end {
                row[start..end].fill(blank);
            }
        }
    }

    fn decaln(&mut self, size: Point) {
        let e = self.blank.with_code('E');
        let height = col(size.y, self.rows.len());
        for row in &mut self.rows[..height] {
            let width = col(size.x, row.len());
            row[..width].fill(e);
        }
    }

    fn set(&mut self, p: Point, cell: Cell) {
        if let Some((x, y)) = index(p) {
            if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                *slot = cell;
            }
        }
    }

    fn insert_chars(&mut self, size: Point, p: Point, count: i32) {
        let blank = self.blank;
        let Some(row) = self.row_mut(p.y) else {
            return;
        };
        let end = col(size.x, row.len());
        let start = col(p.x, end);
        let count = col(count, end - start);
        if count == 0 {
            return;
        }
        row[start..end].rotate_right(count);
        row[start..start + count].fill(blank);
    }

    fn delete_chars(&mut self, size: Point, p: Point, count: i32) {
        let blank = self.blank;
        let Some(row) = self.row_mut(p.y) else {
            return;
        };
        let end = col(size.x, row.len());
        let start = col(p.x, end);
        let count = col(count, end - start);
        if count == 0 {
            return;
        }
        row[start..end].rotate_left(count);
        row[end - count..end].fill(blank);
    }

    fn scroll_up(&mut self, count: i32) {
        let count = col(count, self.rows.len());
        if count == 0 {
            return;
        }
        let blank = self.blank;
        self.rows.rotate_left(count);
        let height = self.rows.len();
        for row in &mut self.rows[height - count..] {
            row.fill(blank);
        }
    }
}
