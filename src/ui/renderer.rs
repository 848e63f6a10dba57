//! Screen renderer using crossterm
//!
//! Writes the content of a grid backend to an output stream, one line per
//! row, switching colors and attributes only where they change.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
};
use unicode_width::UnicodeWidthChar;

use crate::core::term::{Cell, CharDisplay, GridDisplay};

/// Attribute part of a cell, used to batch runs of equally styled text.
#[derive(Clone, Copy, PartialEq)]
struct Style {
    cell: Cell,
}

impl Style {
    fn of(cell: &Cell) -> Self {
        Self {
            cell: cell.with_code(' '),
        }
    }
}

#[derive(Debug, Default)]
pub struct Renderer {
    /// Skip colors and attributes, emit text only
    plain: bool,
    /// Drop trailing blank cells of each row
    trim: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(mut self, plain: bool) -> Self {
        self.plain = plain;
        self
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Render every visible row of `grid`.
    pub fn render<W: Write>(&self, out: &mut W, grid: &GridDisplay) -> io::Result<()> {
        let size = grid.size();
        let blank = grid.blank();
        for row in grid.rows().iter().take(size.y.max(0) as usize) {
            let mut cells: &[Cell] = row;
            if self.trim {
                let len = cells.iter().rposition(|c| *c != blank).map_or(0, |i| i + 1);
                cells = &cells[..len];
            }
            self.render_row(out, cells)?;
            if !self.plain {
                queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
            }
            queue!(out, Print("\n"))?;
        }
        out.flush()
    }

    fn render_row<W: Write>(&self, out: &mut W, cells: &[Cell]) -> io::Result<()> {
        let mut line_buffer = String::with_capacity(cells.len());
        let mut current: Option<Style> = None;
        let mut skip = false;

        for cell in cells {
            // Column taken by the right half of the previous wide character
            if skip {
                skip = false;
                continue;
            }
            let style = Style::of(cell);
            if current != Some(style) {
                if !line_buffer.is_empty() {
                    queue!(out, Print(&line_buffer))?;
                    line_buffer.clear();
                }
                if !self.plain {
                    self.apply_attrs(out, cell)?;
                }
                current = Some(style);
            }

            match cell.code.width() {
                Some(0) | None => line_buffer.push(' '),
                Some(2) => {
                    line_buffer.push(cell.code);
                    skip = true;
                }
                Some(_) => line_buffer.push(cell.code),
            }
        }
        if !line_buffer.is_empty() {
            queue!(out, Print(&line_buffer))?;
        }
        Ok(())
    }

    fn apply_attrs<W: Write>(&self, out: &mut W, cell: &Cell) -> io::Result<()> {
        // Reset first
        queue!(out, SetAttribute(Attribute::Reset))?;

        if cell.bold() {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        if cell.italic() {
            queue!(out, SetAttribute(Attribute::Italic))?;
        }
        if cell.underline() {
            queue!(out, SetAttribute(Attribute::Underlined))?;
        }
        queue!(
            out,
            SetForegroundColor(cell.foreground.to_crossterm()),
            SetBackgroundColor(cell.background.to_crossterm())
        )
    }
}
