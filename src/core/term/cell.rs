//! Character cell model
//!
//! Grid coordinates, RGBA colors with the fixed ANSI palette, and the
//! attributed character cell that display surfaces store.

use std::fmt;

use bitflags::bitflags;

/// 2D grid coordinate. `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// 32-bit RGBA color, red in the high byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x0000_00ff);
    pub const RED: Color = Color(0xcd00_00ff);
    pub const GREEN: Color = Color(0x00cd_00ff);
    pub const YELLOW: Color = Color(0xcdcd_00ff);
    pub const BLUE: Color = Color(0x0000_eeff);
    pub const MAGENTA: Color = Color(0xcd00_cdff);
    pub const CYAN: Color = Color(0x00cd_cdff);
    pub const WHITE: Color = Color(0xe5e5_e5ff);
    pub const BRIGHT_WHITE: Color = Color(0xffff_ffff);

    /// SGR 30-37 / 40-47 palette, indexed by `code % 10`.
    pub const PALETTE: [Color; 8] = [
        Color::BLACK,
        Color::RED,
        Color::GREEN,
        Color::YELLOW,
        Color::BLUE,
        Color::MAGENTA,
        Color::CYAN,
        Color::WHITE,
    ];

    /// Palette entry for an ANSI color index, if in range.
    pub fn ansi(index: usize) -> Option<Color> {
        Self::PALETTE.get(index).copied()
    }

    pub const fn rgb(&self) -> (u8, u8, u8) {
        ((self.0 >> 24) as u8, (self.0 >> 16) as u8, (self.0 >> 8) as u8)
    }

    /// Convert to crossterm color
    pub fn to_crossterm(&self) -> crossterm::style::Color {
        let (r, g, b) = self.rgb();
        crossterm::style::Color::Rgb { r, g, b }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        const BOLD      = 0b0000_0001;
        const ITALIC    = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
    }
}

/// A printable code point plus its rendering attributes.
///
/// Cells are plain values: the emulator keeps a template cell holding the
/// current attributes and clones it with each written code point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub code: char,
    pub foreground: Color,
    pub background: Color,
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            code: ' ',
            foreground: Color::BLACK,
            background: Color::BRIGHT_WHITE,
            flags: CellFlags::empty(),
        }
    }
}

impl Cell {
    pub const fn new(code: char, foreground: Color, background: Color) -> Self {
        Self {
            code,
            foreground,
            background,
            flags: CellFlags::empty(),
        }
    }

    /// Copy of this cell with a different code point; attributes are kept.
    pub fn with_code(&self, code: char) -> Self {
        Self { code, ..*self }
    }

    pub fn bold(&self) -> bool {
        self.flags.contains(CellFlags::BOLD)
    }

    pub fn italic(&self) -> bool {
        self.flags.contains(CellFlags::ITALIC)
    }

    pub fn underline(&self) -> bool {
        self.flags.contains(CellFlags::UNDERLINE)
    }

    pub fn set_bold(&mut self, on: bool) {
        self.flags.set(CellFlags::BOLD, on);
    }

    pub fn set_italic(&mut self, on: bool) {
        self.flags.set(CellFlags::ITALIC, on);
    }

    pub fn set_underline(&mut self, on: bool) {
        self.flags.set(CellFlags::UNDERLINE, on);
    }

    /// Exchange foreground and background (SGR 7 / 27).
    pub fn swap_colors(&mut self) {
        std::mem::swap(&mut self.foreground, &mut self.background);
    }
}
