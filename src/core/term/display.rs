//! Display surface contract
//!
//! The emulator drives a display through exactly these seven operations.
//! Backends implement them independently; coordinates handed in by the
//! emulator are already clamped to the visible size.

use super::cell::{Cell, Point};

pub trait CharDisplay {
    /// Display size in columns (`x`) and rows (`y`).
    fn size(&self) -> Point;

    /// Clear the inclusive span `from..=to`. Rows strictly between the two
    /// points are cleared in full; the first row starts at `from.x` and the
    /// last row ends at `to.x`.
    fn clear(&mut self, from: Point, to: Point);

    /// Fill the `size.x` by `size.y` area with `'E'`.
    fn decaln(&mut self, size: Point);

    fn set(&mut self, p: Point, cell: Cell);

    /// Shift cells at and after `p` right by `count` within the row, up to
    /// column `size.x`. Cells pushed past `size.x` are discarded and the
    /// vacated cells become blank.
    fn insert_chars(&mut self, size: Point, p: Point, count: i32);

    /// Mirror of [`insert_chars`](Self::insert_chars): shift left, blank-fill
    /// the vacated trailing cells.
    fn delete_chars(&mut self, size: Point, p: Point, count: i32);

    /// Drop `count` rows from the top and append as many blank rows at the
    /// bottom.
    fn scroll_up(&mut self, count: i32);
}

impl<D: CharDisplay + ?Sized> CharDisplay for &mut D {
    fn size(&self) -> Point {
        (**self).size()
    }

    fn clear(&mut self, from: Point, to: Point) {
        (**self).clear(from, to);
    }

    fn decaln(&mut self, size: Point) {
        (**self).decaln(size);
    }

    fn set(&mut self, p: Point, cell: Cell) {
        (**self).set(p, cell);
    }

    fn insert_chars(&mut self, size: Point, p: Point, count: i32) {
        (**self).insert_chars(size, p, count);
    }

    fn delete_chars(&mut self, size: Point, p: Point, count: i32) {
        (**self).delete_chars(size, p, count);
    }

    fn scroll_up(&mut self, count: i32) {
        (**self).scroll_up(count);
    }
}
