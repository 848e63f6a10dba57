//! Emulator coordinator
//!
//! Owns the cursor, visible size, scroll region, rendering attributes and the
//! pending-wrap flag, feeds code points through the parser and interprets the
//! resulting actions against a [`CharDisplay`]. The emulator is the only
//! component that calls into the display.

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, trace};

use super::cell::{Cell, Color, Point};
use super::display::CharDisplay;
use super::parser::{self, Action, Parser, ParserState, Transition};

#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Failed to write response: {0}")]
    Output(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Response that needs to be sent back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Primary device attributes: VT220 with 132 columns, printer, selective
    /// erase, user-defined keys, national replacement sets, technical
    /// characters, locator, windowing, horizontal scrolling and ANSI color.
    DeviceAttributes,
}

impl Response {
    pub fn to_bytes(&self) -> &'static [u8] {
        match self {
            Response::DeviceAttributes => b"\x1b[?62;1;2;7;8;9;15;18;21;44;45;46c",
        }
    }
}

/// VT100 emulator bound to a display backend.
///
/// The backend is injected at construction and may be owned or borrowed
/// (`&mut D` implements [`CharDisplay`] too).
#[derive(Debug)]
pub struct Emulator<D: CharDisplay> {
    display: D,
    size: Point,
    scroll_top: i32,
    scroll_bottom: i32,
    cursor: Point,
    default: Cell,
    attrs: Cell,
    pending_wrap: bool,
    parser: Parser,
    title: String,
    icon_name: String,
}

impl<D: CharDisplay> Emulator<D> {
    pub fn new(display: D) -> Self {
        Self::with_default(display, Cell::default())
    }

    /// Create an emulator whose SGR reset restores `default`.
    pub fn with_default(display: D, default: Cell) -> Self {
        let mut emulator = Self {
            display,
            size: Point::ZERO,
            scroll_top: 0,
            scroll_bottom: 0,
            cursor: Point::ZERO,
            default,
            attrs: default,
            pending_wrap: false,
            parser: Parser::new(),
            title: String::new(),
            icon_name: String::new(),
        };
        emulator.reset();
        emulator
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Scroll region as inclusive `(top, bottom)` rows.
    pub fn scroll_region(&self) -> (i32, i32) {
        (self.scroll_top, self.scroll_bottom)
    }

    /// Template cell carrying the current rendering attributes.
    pub fn attrs(&self) -> Cell {
        self.attrs
    }

    pub fn default_attrs(&self) -> Cell {
        self.default
    }

    pub fn pending_wrap(&self) -> bool {
        self.pending_wrap
    }

    pub fn parser_state(&self) -> ParserState {
        self.parser.state()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    /// Reset to the initial state: full backend size, default attributes,
    /// cursor home, full-height scroll region, blank screen.
    pub fn reset(&mut self) {
        self.size = clamp_size(self.display.size());
        self.attrs = self.default;
        self.cursor = Point::ZERO;
        self.pending_wrap = false;
        self.scroll_top = 0;
        self.scroll_bottom = self.size.y - 1;
        self.clear(true, true);
    }

    /// Set the visible area. The size never exceeds the backend's.
    pub fn resize(&mut self, width: i32, height: i32) {
        let max = self.display.size();
        self.size = clamp_size(Point::new(width.min(max.x), height.min(max.y)));

        // Column after the last written cell
        let wrap_col = self.cursor.x.saturating_add(1);
        self.cursor.x = self.cursor.x.min(self.size.x - 1);
        if self.pending_wrap {
            self.pending_wrap = wrap_col == self.size.x;
            if wrap_col < self.size.x {
                self.cursor.x = wrap_col;
            }
        }
        self.cursor.y = self.cursor.y.min(self.size.y - 1);
        self.scroll_bottom = self.scroll_bottom.min(self.size.y - 1);
        self.scroll_top = self.scroll_top.min(self.scroll_bottom);
    }

    /// Run the emulation with the next input code.
    pub fn input(&mut self, code: char) -> Option<Response> {
        let Transition { action, next } = parser::step(self.parser.state(), code);
        let response = action.and_then(|action| self.perform(action, code));
        if let Some(next) = next {
            self.parser.set_state(next);
        }
        response
    }

    /// Feed a whole string, discarding any responses.
    pub fn feed_str(&mut self, data: &str) {
        for code in data.chars() {
            self.input(code);
        }
    }

    /// Feed a whole string, writing responses to `out`.
    pub fn feed<W: Write>(&mut self, data: &str, out: &mut W) -> Result<()> {
        for code in data.chars() {
            if let Some(response) = self.input(code) {
                out.write_all(response.to_bytes())
                    .map_err(EmulatorError::Output)?;
            }
        }
        out.flush().map_err(EmulatorError::Output)
    }

    fn perform(&mut self, action: Action, code: char) -> Option<Response> {
        match action {
            Action::InsertChar => self.insert_char(code),
            Action::C0Control => self.c0_control(code),
            Action::C1Control => self.c1_control(code),
            Action::TwoCharEscape => self.two_char_escape(code),
            Action::PrivateFunction => self.private_function(code),
            Action::AppendParam => self.parser.push(code),
            Action::CsiDispatch => return self.csi_dispatch(code),
            Action::OscDispatch => self.osc_dispatch(),
            Action::Error => {
                debug!(
                    "Malformed sequence: state={}, code={:#x} {:?}",
                    self.parser.state(),
                    u32::from(code),
                    code
                );
            }
        }
        None
    }

    fn c0_control(&mut self, code: char) {
        let Point { x, y } = self.cursor;
        match code {
            '\x08' => {
                if self.pending_wrap {
                    self.pending_wrap = false;
                } else {
                    self.move_to(y, x - 1);
                }
            }
            '\t' => self.move_to(y, (x / 8).saturating_add(1).saturating_mul(8)),
            // LF and VT
            '\n' | '\x0b' => self.move_to(y.saturating_add(1), x),
            '\r' => self.move_to(y, 0),
            _ => debug!("C0 control: {}: {:#x}", self.parser.state(), u32::from(code)),
        }
    }

    fn c1_control(&mut self, code: char) {
        let Point { x, y } = self.cursor;
        match code {
            // IND - Index
            'D' => self.move_to(y.saturating_add(1), x),
            // NEL - Next line
            'E' => self.move_to(y.saturating_add(1), 0),
            // RI - Reverse index
            'M' => self.reverse_index(),
            _ => debug!("C1 control: {}{:?}", self.parser.raw(), code),
        }
    }

    fn two_char_escape(&mut self, code: char) {
        match code {
            // RIS - Reset to initial state
            'c' => self.reset(),
            _ => debug!("Unsupported escape: ESC {}{:?}", self.parser.raw(), code),
        }
    }

    fn private_function(&mut self, code: char) {
        match (self.parser.raw().as_str(), code) {
            // DECALN - Screen alignment pattern
            ("#", '8') => self.display.decaln(self.size),
            (params, _) => debug!("Unsupported private function: ESC {}{:?}", params, code),
        }
    }

    fn osc_dispatch(&mut self) {
        let fields = self.parser.fields();
        let [target, text] = fields.as_slice() else {
            debug!("OSC: invalid parameters: {:?}", fields);
            return;
        };
        match target.as_str() {
            "0" => {
                self.set_icon_name(text);
                self.set_window_title(text);
            }
            "1" => self.set_icon_name(text),
            "2" => self.set_window_title(text),
            _ => debug!("OSC: unsupported control: {:?}", fields),
        }
    }

    fn set_icon_name(&mut self, name: &str) {
        debug!("Icon name: {}", name);
        self.icon_name = name.to_string();
    }

    fn set_window_title(&mut self, title: &str) {
        debug!("Window title: {}", title);
        self.title = title.to_string();
    }

    fn csi_dispatch(&mut self, code: char) -> Option<Response> {
        trace!("CSI: ESC[{}{}", self.parser.raw(), code);

        let Point { x, y } = self.cursor;
        let last_row = self.size.y - 1;
        match code {
            // ICH - Insert characters
            '@' => self.insert_chars(y, x, self.parser.csi_param(1)),
            // CUU - Cursor up
            'A' => self.move_to(y.saturating_sub(self.parser.csi_param(1)), x),
            // CUD - Cursor down, stops at the last row
            'B' => {
                let row = y.saturating_add(self.parser.csi_param(1)).min(last_row);
                self.move_to(row, x);
            }
            // CUF - Cursor forward
            'C' => self.move_to(y, x.saturating_add(self.parser.csi_param(1))),
            // CUB - Cursor backward
            'D' => self.move_to(y, x.saturating_sub(self.parser.csi_param(1))),
            // CHA - Cursor horizontal absolute
            'G' => self.move_to(y, self.parser.csi_param(1) - 1),
            // CUP / HVP - Cursor position
            'H' | 'f' => {
                let params = self.parser.csi(&[1, 1]);
                self.move_to((params.get(0) - 1).min(last_row), params.get(1) - 1);
            }
            // ED - Erase in display
            'J' => match self.parser.csi_param(0) {
                0 => self.clear(false, true),
                1 => self.clear(true, false),
                2 => self.clear(true, true),
                mode => debug!("ED: unknown mode {}", mode),
            },
            // EL - Erase in line
            'K' => match self.parser.csi_param(0) {
                0 => self.clear_line(y, x, self.size.x),
                1 => self.clear_line(y, 0, x),
                2 => self.clear_line(y, 0, self.size.x),
                mode => debug!("EL: unknown mode {}", mode),
            },
            // DCH - Delete characters
            'P' => self.delete_chars(y, x, self.parser.csi_param(1)),
            // DA - Device attributes
            'c' => return Some(Response::DeviceAttributes),
            // VPA - Vertical position absolute
            'd' => self.move_to((self.parser.csi_param(1) - 1).min(last_row), x),
            // SM / RM - Set and reset mode
            'h' => self.set_mode(true),
            'l' => self.set_mode(false),
            // SGR - Select graphic rendition
            'm' => self.select_graphic_rendition(),
            // DECSTBM - Set top and bottom margins
            'r' => self.set_scroll_region(),
            _ => debug!(
                "Unsupported CSI: ESC[{}{} ({:#x})",
                self.parser.raw(),
                code,
                u32::from(code)
            ),
        }
        None
    }

    fn set_mode(&mut self, enable: bool) {
        let params = self.parser.csi(&[0]);
        let mode = params.get(0);
        match params.prefix.as_str() {
            "" => match mode {
                // KAM, IRM, SRM, LNM: accepted, no effect
                2 | 4 | 12 | 20 => {}
                _ => debug!("SM/RM: unknown mode {}", mode),
            },
            "?" => match mode {
                // DECCOLM - 132 / 80 columns, erases the screen
                3 => {
                    self.clear(true, true);
                    self.resize(if enable { 132 } else { 80 }, self.size.y);
                    self.move_to(0, 0);
                }
                // Interpret "meta" key
                1034 => {}
                _ => debug!("Unsupported DEC mode: ESC[{}{}", self.parser.raw(), mode_char(enable)),
            },
            _ => debug!("Unsupported mode: ESC[{}{}", self.parser.raw(), mode_char(enable)),
        }
    }

    fn select_graphic_rendition(&mut self) {
        let params = self.parser.csi(&[]);
        for &param in &params.values {
            match param {
                0 => self.attrs = self.default,
                1 => self.attrs.set_bold(true),
                // Dim
                2 => self.attrs.foreground = Color::WHITE,
                3 => self.attrs.set_italic(true),
                4 => self.attrs.set_underline(true),
                // Negative image on and off
                7 | 27 => self.attrs.swap_colors(),
                22 => {
                    self.attrs.set_bold(false);
                    self.attrs.foreground = self.default.foreground;
                }
                24 => self.attrs.set_underline(false),
                30..=37 => {
                    if let Some(color) = Color::ansi((param - 30) as usize) {
                        self.attrs.foreground = color;
                    }
                }
                40..=47 => {
                    if let Some(color) = Color::ansi((param - 40) as usize) {
                        self.attrs.background = color;
                    }
                }
                _ => debug!("ESC[{}m: unknown attribute {}", self.parser.raw(), param),
            }
        }
    }

    fn set_scroll_region(&mut self) {
        let params = self.parser.csi(&[1, self.size.y]);
        let last_row = self.size.y - 1;
        let top = (params.get(0) - 1).clamp(0, last_row);
        let bottom = (params.get(1) - 1).clamp(0, last_row);
        if top > bottom {
            debug!("DECSTBM: invalid region {}..{}", top, bottom);
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
    }

    fn reverse_index(&mut self) {
        if self.cursor.y == self.scroll_top {
            // The display contract has no reverse scroll; keep the cursor
            // at the margin.
            debug!("RI: reverse scroll at top margin {} not supported", self.scroll_top);
            self.pending_wrap = false;
            return;
        }
        self.move_to(self.cursor.y - 1, self.cursor.x);
    }

    /// Move the cursor, clamping the column. Moving below the last row
    /// scrolls the display up.
    fn move_to(&mut self, row: i32, col: i32) {
        self.cursor.x = col.clamp(0, self.size.x - 1);

        let mut row = row.max(0);
        if row >= self.size.y {
            self.scroll_up(row - self.size.y + 1);
            row = self.size.y - 1;
        }
        self.cursor.y = row;
        self.pending_wrap = false;
    }

    fn scroll_up(&mut self, count: i32) {
        if count >= self.size.y {
            self.clear(true, true);
            return;
        }
        self.display.scroll_up(count);
        for i in 0..count {
            self.clear_line(self.size.y - 1 - i, 0, self.size.x);
        }
    }

    fn insert_char(&mut self, code: char) {
        if self.pending_wrap {
            if self.cursor.y + 1 >= self.size.y {
                self.scroll_up(1);
                self.move_to(self.cursor.y, 0);
            } else {
                self.move_to(self.cursor.y + 1, 0);
            }
        }
        self.display.set(self.cursor, self.attrs.with_code(code));
        if self.cursor.x + 1 >= self.size.x {
            self.pending_wrap = true;
        } else {
            self.move_to(self.cursor.y, self.cursor.x + 1);
        }
    }

    /// Clamp `(row, col)` for an in-row shift. `None` when the column lies
    /// past the right edge.
    fn clamp_shift(&self, row: i32, col: i32) -> Option<Point> {
        if col >= self.size.x {
            return None;
        }
        Some(Point::new(col.max(0), row.clamp(0, self.size.y - 1)))
    }

    fn insert_chars(&mut self, row: i32, col: i32, count: i32) {
        let Some(p) = self.clamp_shift(row, col) else {
            return;
        };
        if p.x.saturating_add(count) >= self.size.x {
            self.clear_line(p.y, p.x, self.size.x);
            return;
        }
        self.display.insert_chars(self.size, p, count);
    }

    fn delete_chars(&mut self, row: i32, col: i32, count: i32) {
        let Some(p) = self.clamp_shift(row, col) else {
            return;
        };
        if p.x.saturating_add(count) >= self.size.x {
            self.clear_line(p.y, p.x, self.size.x);
            return;
        }
        self.display.delete_chars(self.size, p, count);
    }

    /// Clear columns `from..=to` of `line`; `to` is clamped to the last column.
    fn clear_line(&mut self, line: i32, from: i32, to: i32) {
        if line < 0 || line >= self.size.y {
            return;
        }
        let to = to.min(self.size.x - 1);
        self.display.clear(Point::new(from, line), Point::new(to, line));
    }

    /// Erase relative to the cursor, both ends inclusive of the cursor cell.
    fn clear(&mut self, to_start: bool, to_end: bool) {
        let Point { x, y } = self.cursor;
        let last = Point::new(self.size.x - 1, self.size.y - 1);
        if to_start {
            if y > 0 {
                self.display.clear(Point::ZERO, Point::new(last.x, y - 1));
            }
            self.display.clear(Point::new(0, y), Point::new(x, y));
        }
        if to_end {
            self.display.clear(Point::new(x, y), Point::new(last.x, y));
            if y < last.y {
                self.display.clear(Point::new(0, y + 1), last);
            }
        }
    }
}

fn clamp_size(size: Point) -> Point {
    Point::new(size.x.max(1), size.y.max(1))
}

fn mode_char(enable: bool) -> char {
    if enable {
        'h'
    } else {
        'l'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::term::{CaptureDisplay, GridDisplay};

    fn grid(width: i32, height: i32) -> Emulator<GridDisplay> {
        Emulator::new(GridDisplay::new(width, height))
    }

    fn run(emulator: &mut Emulator<GridDisplay>, data: &str) {
        emulator.feed_str(data);
    }

    fn lines(emulator: &Emulator<GridDisplay>) -> Vec<String> {
        emulator.display().lines()
    }

    #[test]
    fn test_cursor_movement() {
        let mut emu = grid(80, 24);
        run(&mut emu, "\x1b[5;10H");
        assert_eq!(emu.cursor(), Point::new(9, 4));

        run(&mut emu, "\x1b[A");
        assert_eq!(emu.cursor(), Point::new(9, 3));
        run(&mut emu, "\x1b[2B\x1b[3C\x1b[D");
        assert_eq!(emu.cursor(), Point::new(11, 5));
        run(&mut emu, "\x1b[G");
        assert_eq!(emu.cursor(), Point::new(0, 5));
        run(&mut emu, "\x1b[7d");
        assert_eq!(emu.cursor(), Point::new(0, 6));
        run(&mut emu, "\x1b[f");
        assert_eq!(emu.cursor(), Point::ZERO);
    }

    #[test]
    fn test_cursor_movement_clamps() {
        let mut emu = grid(10, 5);
        run(&mut emu, "\x1b[99A\x1b[99D");
        assert_eq!(emu.cursor(), Point::ZERO);
        run(&mut emu, "\x1b[99B\x1b[99C");
        assert_eq!(emu.cursor(), Point::new(9, 4));
        run(&mut emu, "\x1b[100;100H");
        assert_eq!(emu.cursor(), Point::new(9, 4));
        run(&mut emu, "\x1b[50d\x1b[50G");
        assert_eq!(emu.cursor(), Point::new(9, 4));
    }

    #[test]
    fn test_cursor_down_does_not_scroll() {
        let mut emu = grid(5, 3);
        run(&mut emu, "top\x1b[9B");
        assert_eq!(lines(&emu)[0], "top");
        assert_eq!(emu.cursor().y, 2);
    }

    #[test]
    fn test_hello_world_on_grid() {
        let mut emu = grid(20, 2);
        run(&mut emu, "Hello, world!");
        assert_eq!(lines(&emu), vec!["Hello, world!", ""]);
        assert_eq!(emu.cursor(), Point::new(13, 0));
    }

    #[test]
    fn test_pending_wrap() {
        let mut emu = grid(3, 2);
        run(&mut emu, "abc");
        assert!(emu.pending_wrap());
        assert_eq!(emu.cursor(), Point::new(2, 0));

        run(&mut emu, "d");
        assert!(!emu.pending_wrap());
        assert_eq!(lines(&emu), vec!["abc", "d"]);
        assert_eq!(emu.cursor(), Point::new(1, 1));
    }

    #[test]
    fn test_pending_wrap_on_last_row_scrolls() {
        let mut emu = grid(3, 2);
        run(&mut emu, "abcdefg");
        assert_eq!(lines(&emu), vec!["def", "g"]);
        assert_eq!(emu.cursor(), Point::new(1, 1));
    }

    #[test]
    fn test_cursor_move_clears_pending_wrap() {
        let mut emu = grid(3, 2);
        run(&mut emu, "abc\x1b[D");
        assert!(!emu.pending_wrap());
        run(&mut emu, "x");
        assert_eq!(lines(&emu), vec!["axc", ""]);
    }

    #[test]
    fn test_backspace_cancels_pending_wrap() {
        let mut emu = grid(3, 2);
        run(&mut emu, "abc\x08");
        assert!(!emu.pending_wrap());
        assert_eq!(emu.cursor(), Point::new(2, 0));
        run(&mut emu, "\x08");
        assert_eq!(emu.cursor(), Point::new(1, 0));
    }

    #[test]
    fn test_c0_controls() {
        let mut emu = grid(20, 4);
        run(&mut emu, "ab\tc");
        assert_eq!(emu.cursor(), Point::new(9, 0));
        run(&mut emu, "\t\t\t");
        assert_eq!(emu.cursor(), Point::new(19, 0));
        run(&mut emu, "\r\n\x0b");
        assert_eq!(emu.cursor(), Point::new(0, 2));
        assert_eq!(lines(&emu)[0], "ab      c");
    }

    #[test]
    fn test_linefeed_at_bottom_scrolls() {
        let mut emu = grid(4, 3);
        run(&mut emu, "1\r\n2\r\n3\r\n4");
        assert_eq!(lines(&emu), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_c0_inside_csi_is_honored() {
        let mut emu = grid(10, 5);
        run(&mut emu, "\x1b[2\n;3H");
        assert_eq!(emu.cursor(), Point::new(2, 1));
        assert_eq!(emu.parser_state(), ParserState::Start);
    }

    #[test]
    fn test_eight_bit_csi() {
        let mut emu = grid(10, 5);
        run(&mut emu, "\u{9b}3;4H");
        assert_eq!(emu.cursor(), Point::new(3, 2));
    }

    #[test]
    fn test_c1_controls() {
        let mut emu = grid(10, 5);
        run(&mut emu, "\x1b[2;4H\x1bD");
        assert_eq!(emu.cursor(), Point::new(3, 2));
        run(&mut emu, "\x1bE");
        assert_eq!(emu.cursor(), Point::new(0, 3));
        run(&mut emu, "\x1bM");
        assert_eq!(emu.cursor(), Point::new(0, 2));
    }

    #[test]
    fn test_reverse_index_stops_at_top_margin() {
        let mut emu = grid(10, 5);
        run(&mut emu, "\x1b[2;4r\x1b[3;1H\x1bM\x1bM\x1bM");
        assert_eq!(emu.cursor(), Point::new(0, 1));
    }

    #[test]
    fn test_erase_in_display() {
        let mut emu = grid(3, 3);
        run(&mut emu, "abcdefghi\x1b[2;2H\x1b[J");
        assert_eq!(lines(&emu), vec!["abc", "d", ""]);

        let mut emu = grid(3, 3);
        run(&mut emu, "abcdefghi\x1b[2;2H\x1b[1J");
        assert_eq!(lines(&emu), vec!["", "  f", "ghi"]);

        let mut emu = grid(3, 3);
        run(&mut emu, "abcdefghi\x1b[2;2H\x1b[2J");
        assert_eq!(lines(&emu), vec!["", "", ""]);
        assert_eq!(emu.cursor(), Point::new(1, 1));
    }

    #[test]
    fn test_erase_in_line() {
        let mut emu = grid(5, 1);
        run(&mut emu, "abcde\x1b[3G\x1b[K");
        assert_eq!(lines(&emu), vec!["ab"]);

        let mut emu = grid(5, 1);
        run(&mut emu, "abcde\x1b[3G\x1b[1K");
        assert_eq!(lines(&emu), vec!["   de"]);

        let mut emu = grid(5, 1);
        run(&mut emu, "abcde\x1b[3G\x1b[2K");
        assert_eq!(lines(&emu), vec![""]);
    }

    #[test]
    fn test_insert_and_delete_chars() {
        let mut emu = grid(6, 1);
        run(&mut emu, "abcdef\x1b[2G\x1b[2@");
        assert_eq!(emu.display().row_text(0), "a  bcd");

        let mut emu = grid(6, 1);
        run(&mut emu, "abcdef\x1b[2G\x1b[2P");
        assert_eq!(emu.display().row_text(0), "adef  ");

        let mut emu = grid(6, 1);
        run(&mut emu, "abcdef\x1b[2G\x1b[P");
        assert_eq!(emu.display().row_text(0), "acdef ");
    }

    #[test]
    fn test_insert_delete_degenerate_to_clear() {
        let mut emu = grid(6, 1);
        run(&mut emu, "abcdef\x1b[3G\x1b[4@");
        assert_eq!(lines(&emu), vec!["ab"]);

        let mut emu = grid(6, 1);
        run(&mut emu, "abcdef\x1b[3G\x1b[99P");
        assert_eq!(lines(&emu), vec!["ab"]);
    }

    #[test]
    fn test_sgr_attributes() {
        let mut emu = grid(10, 1);
        run(&mut emu, "\x1b[1;3;4;31;42mx");
        let cell = emu.display().cell(Point::ZERO).copied().unwrap_or_default();
        assert!(cell.bold() && cell.italic() && cell.underline());
        assert_eq!(cell.foreground, Color::RED);
        assert_eq!(cell.background, Color::GREEN);

        run(&mut emu, "\x1b[22;24m");
        assert!(!emu.attrs().bold());
        assert!(!emu.attrs().underline());
        assert!(emu.attrs().italic());
        assert_eq!(emu.attrs().foreground, emu.default_attrs().foreground);

        run(&mut emu, "\x1b[m");
        assert_eq!(emu.attrs(), emu.default_attrs());
    }

    #[test]
    fn test_sgr_negative_image() {
        let mut emu = grid(10, 1);
        run(&mut emu, "\x1b[7m");
        assert_eq!(emu.attrs().foreground, Color::BRIGHT_WHITE);
        assert_eq!(emu.attrs().background, Color::BLACK);
        run(&mut emu, "\x1b[27m");
        assert_eq!(emu.attrs(), emu.default_attrs());
    }

    #[test]
    fn test_sgr_unknown_code_ignored() {
        let mut emu = grid(10, 1);
        run(&mut emu, "\x1b[31;99;44m");
        assert_eq!(emu.attrs().foreground, Color::RED);
        assert_eq!(emu.attrs().background, Color::BLUE);

        run(&mut emu, "\x1b[37;40m");
        assert_eq!(emu.attrs().foreground, Color::WHITE);
        assert_eq!(emu.attrs().background, Color::BLACK);
    }

    #[test]
    fn test_scroll_region() {
        let mut emu = grid(10, 5);
        assert_eq!(emu.scroll_region(), (0, 4));
        run(&mut emu, "\x1b[2;4r");
        assert_eq!(emu.scroll_region(), (1, 3));
        run(&mut emu, "\x1b[r");
        assert_eq!(emu.scroll_region(), (0, 4));
        run(&mut emu, "\x1b[3;99r");
        assert_eq!(emu.scroll_region(), (2, 4));
        run(&mut emu, "\x1b[4;2r");
        assert_eq!(emu.scroll_region(), (2, 4));
    }

    #[test]
    fn test_decaln() {
        let mut emu = grid(80, 24);
        run(&mut emu, "\x1b#8");
        let rows = emu.display().rows();
        assert_eq!(rows.iter().flatten().filter(|c| c.code == 'E').count(), 1920);
    }

    #[test]
    fn test_unsupported_private_function() {
        let mut emu = grid(10, 2);
        run(&mut emu, "\x1b(8\x1b7x");
        assert_eq!(lines(&emu)[0], "x");
    }

    #[test]
    fn test_reset() {
        let mut emu = grid(10, 3);
        run(&mut emu, "\x1b[31mabc\x1b[2;3r\x1b[3;3H\x1bc");
        assert_eq!(lines(&emu), vec!["", "", ""]);
        assert_eq!(emu.cursor(), Point::ZERO);
        assert_eq!(emu.attrs(), emu.default_attrs());
        assert_eq!(emu.scroll_region(), (0, 2));
    }

    #[test]
    fn test_device_attributes_response() {
        let mut emu = grid(10, 3);
        let mut out = Vec::new();
        emu.feed("a\x1b[cb", &mut out).unwrap();
        assert_eq!(out, b"\x1b[?62;1;2;7;8;9;15;18;21;44;45;46c");
        assert_eq!(lines(&emu)[0], "ab");
    }

    #[test]
    fn test_output_failure_propagates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut emu = grid(10, 3);
        assert!(emu.feed("plain text", &mut Broken).is_ok());
        assert!(matches!(
            emu.feed("\x1b[c", &mut Broken),
            Err(EmulatorError::Output(_))
        ));
    }

    #[test]
    fn test_column_mode() {
        let mut emu = Emulator::new(GridDisplay::new(132, 4));
        run(&mut emu, "text\x1b[?3l");
        assert_eq!(emu.size(), Point::new(80, 4));
        assert_eq!(emu.cursor(), Point::ZERO);
        assert_eq!(lines(&emu)[0], "");

        run(&mut emu, "\x1b[200C");
        assert_eq!(emu.cursor().x, 79);

        run(&mut emu, "\x1b[?3h");
        assert_eq!(emu.size(), Point::new(132, 4));
    }

    #[test]
    fn test_column_mode_limited_by_display() {
        let mut emu = grid(80, 4);
        run(&mut emu, "\x1b[?3h");
        assert_eq!(emu.size(), Point::new(80, 4));
    }

    #[test]
    fn test_unknown_modes_are_ignored() {
        let mut emu = grid(10, 2);
        run(&mut emu, "\x1b[4h\x1b[?25l\x1b[?1034h\x1b[>1hx");
        assert_eq!(lines(&emu)[0], "x");
        assert_eq!(emu.size(), Point::new(10, 2));
    }

    #[test]
    fn test_osc_title() {
        let mut emu = grid(10, 2);
        run(&mut emu, "\x1b]0;shell\x07");
        assert_eq!(emu.title(), "shell");
        assert_eq!(emu.icon_name(), "shell");

        run(&mut emu, "\x1b]2;editor\u{9c}");
        assert_eq!(emu.title(), "editor");
        assert_eq!(emu.icon_name(), "shell");

        run(&mut emu, "\x1b]1;icon\x07\x1b]3;x\x07\x1b]0;a;b\x07");
        assert_eq!(emu.icon_name(), "icon");
        assert_eq!(emu.title(), "editor");
        assert_eq!(lines(&emu)[0], "");
    }

    #[test]
    fn test_malformed_sequence_recovers() {
        let mut emu = grid(10, 2);
        run(&mut emu, "\x1b\nA");
        assert_eq!(emu.parser_state(), ParserState::Start);
        assert_eq!(lines(&emu)[0], "A");

        let mut emu = grid(10, 2);
        run(&mut emu, "\x1b[1 qB");
        assert_eq!(lines(&emu)[0], "qB");
    }

    #[test]
    fn test_escape_delete_ignored() {
        let mut emu = grid(10, 2);
        run(&mut emu, "\x1b\u{7f}[2Cx");
        assert_eq!(lines(&emu)[0], "  x");
    }

    #[test]
    fn test_resize_clamps_cursor() {
        let mut emu = grid(20, 10);
        run(&mut emu, "\x1b[10;20H");
        emu.resize(5, 3);
        assert_eq!(emu.size(), Point::new(5, 3));
        assert_eq!(emu.cursor(), Point::new(4, 2));
        assert_eq!(emu.scroll_region(), (0, 2));
    }

    #[test]
    fn test_widening_resize_releases_pending_wrap() {
        let mut emu = Emulator::new(GridDisplay::new(132, 3));
        run(&mut emu, "\x1b[?3l");
        run(&mut emu, &"a".repeat(80));
        assert!(emu.pending_wrap());

        emu.resize(132, 3);
        assert!(!emu.pending_wrap());
        assert_eq!(emu.cursor(), Point::new(80, 0));

        run(&mut emu, "b");
        assert_eq!(emu.display().cell(Point::new(80, 0)).map(|c| c.code), Some('b'));
        assert_eq!(lines(&emu)[1], "");
    }

    #[test]
    fn test_narrowing_resize_clears_pending_wrap() {
        let mut emu = grid(10, 2);
        run(&mut emu, "0123456789");
        assert!(emu.pending_wrap());

        emu.resize(5, 2);
        assert!(!emu.pending_wrap());
        assert_eq!(emu.cursor(), Point::new(4, 0));
        run(&mut emu, "x");
        assert_eq!(emu.display().row_text(0), "0123x56789");
    }

    #[test]
    fn test_same_width_resize_keeps_pending_wrap() {
        let mut emu = grid(10, 4);
        run(&mut emu, "0123456789");
        emu.resize(10, 2);
        assert!(emu.pending_wrap());
        assert_eq!(emu.cursor(), Point::new(9, 0));
    }

    #[test]
    fn test_borrowed_display() {
        let mut display = GridDisplay::new(10, 2);
        {
            let mut emu = Emulator::new(&mut display);
            emu.feed_str("borrowed");
        }
        assert_eq!(display.lines()[0], "borrowed");
    }

    #[test]
    fn test_capture_backend_never_wraps() {
        let mut emu = Emulator::new(CaptureDisplay::new());
        let long = "x".repeat(500);
        emu.feed_str(&long);
        emu.feed_str("\r\nnext");
        assert_eq!(emu.display().lines(), vec![long, "next".to_string()]);
    }
}
