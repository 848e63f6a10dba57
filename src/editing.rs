//! Single-sequence emitters for driving a real terminal.

use std::io::{self, Write};

/// Move the cursor one line up.
pub fn cursor_up<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[A")
}

/// Move the cursor one line down.
pub fn cursor_down<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[B")
}

/// Move the cursor one column right. Stops at the right edge.
pub fn cursor_forward<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[C")
}

/// Move the cursor one column left. Stops at the left edge.
pub fn cursor_backward<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[D")
}

pub fn scroll_up<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[S")
}

pub fn scroll_down<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[T")
}

/// Move the cursor one column left; no-op at the leftmost column.
pub fn backspace<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x08")
}

/// Delete the character under the cursor.
pub fn delete_char<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[P")
}

/// Clear from the start of the line through the cursor.
pub fn erase_line_head<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[1K")
}

/// Clear from the cursor through the end of the line.
pub fn erase_line_tail<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[K")
}

pub fn erase_line<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[2K")
}

/// Clear from the start of the screen through the cursor.
pub fn erase_screen_head<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[1J")
}

/// Clear from the cursor through the end of the screen.
pub fn erase_screen_tail<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[J")
}

pub fn erase_screen<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x1b[2J")
}

/// Move the cursor to a 1-based `row`, `col`.
pub fn move_to<W: Write>(out: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(out, "\x1b[{};{}H", row, col)
}
