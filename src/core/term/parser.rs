//! VT sequence parser
//!
//! A table-driven state machine over Unicode code points. Each state owns a
//! static list of code ranges mapped to an action and an optional next state,
//! plus a default entry for codes no range matches. [`step`] is a pure lookup;
//! the emulator performs the returned action and applies the transition.

use std::fmt;

/// Parser state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParserState {
    #[default]
    Start,
    Escape,
    Csi,
    Osc,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Start => "start",
            ParserState::Escape => "ESC",
            ParserState::Csi => "CSI",
            ParserState::Osc => "OSC",
        };
        f.write_str(name)
    }
}

/// Work to perform for one input code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Write the code as a printable character at the cursor.
    InsertChar,
    /// BS, HT, LF, VT, CR; other C0 codes are logged.
    C0Control,
    /// `ESC` + `0x40..=0x5F`.
    C1Control,
    /// `ESC` + `0x60..=0x7E`.
    TwoCharEscape,
    /// `ESC` + `0x30..=0x3F`, with any intermediates in the parameter buffer.
    PrivateFunction,
    AppendParam,
    /// CSI final byte.
    CsiDispatch,
    /// OSC terminator.
    OscDispatch,
    /// Malformed sequence: log and fall back to `Start`.
    Error,
}

/// Result of a state lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub action: Option<Action>,
    pub next: Option<ParserState>,
}

impl Transition {
    const fn new(action: Option<Action>, next: Option<ParserState>) -> Self {
        Self { action, next }
    }
}

/// Inclusive code range and the transition it selects.
struct Entry {
    from: u32,
    to: u32,
    transition: Transition,
}

const fn entry(from: u32, to: u32, action: Option<Action>, next: Option<ParserState>) -> Entry {
    Entry {
        from,
        to,
        transition: Transition::new(action, next),
    }
}

struct Table {
    default: Transition,
    entries: &'static [Entry],
}

use Action::*;
use ParserState::{Csi, Escape, Osc, Start};

const ERROR: Transition = Transition::new(Some(Error), Some(Start));

// Entries are matched first to last, so single codes precede the ranges
// containing them.
static START: Table = Table {
    default: Transition::new(Some(InsertChar), None),
    entries: &[
        entry(0x00, 0x1a, Some(C0Control), None),
        entry(0x1b, 0x1b, None, Some(Escape)),
        entry(0x1c, 0x1f, Some(C0Control), None),
        entry(0x9b, 0x9b, None, Some(Csi)),
    ],
};

static ESCAPE: Table = Table {
    default: ERROR,
    entries: &[
        entry(0x5b, 0x5b, None, Some(Csi)),
        entry(0x5d, 0x5d, None, Some(Osc)),
        entry(0x20, 0x2f, Some(AppendParam), None),
        entry(0x30, 0x3f, Some(PrivateFunction), Some(Start)),
        entry(0x40, 0x5f, Some(C1Control), Some(Start)),
        entry(0x60, 0x7e, Some(TwoCharEscape), Some(Start)),
        entry(0x7f, 0x7f, None, None),
    ],
};

static CSI: Table = Table {
    default: ERROR,
    entries: &[
        entry(0x00, 0x1f, Some(C0Control), None),
        entry(0x30, 0x3f, Some(AppendParam), None),
        entry(0x40, 0x7e, Some(CsiDispatch), Some(Start)),
    ],
};

static OSC: Table = Table {
    default: ERROR,
    entries: &[
        entry(0x07, 0x07, Some(OscDispatch), Some(Start)),
        entry(0x20, 0x7e, Some(AppendParam), None),
        entry(0x9c, 0x9c, Some(OscDispatch), Some(Start)),
    ],
};

fn table(state: ParserState) -> &'static Table {
    match state {
        Start => &START,
        Escape => &ESCAPE,
        Csi => &CSI,
        Osc => &OSC,
    }
}

/// Look up the transition for `code` in `state`.
pub fn step(state: ParserState, code: char) -> Transition {
    let code = u32::from(code);
    let table = table(state);
    table
        .entries
        .iter()
        .find(|e| (e.from..=e.to).contains(&code))
        .map_or(table.default, |e| e.transition)
}

/// Current state plus the parameter buffer accumulated since entering it.
#[derive(Debug, Default, Clone)]
pub struct Parser {
    state: ParserState,
    params: Vec<char>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Enter `state` with an empty parameter buffer.
    pub fn set_state(&mut self, state: ParserState) {
        self.state = state;
        self.params.clear();
    }

    pub fn push(&mut self, code: char) {
        self.params.push(code);
    }

    /// The raw parameter buffer.
    pub fn raw(&self) -> String {
        self.params.iter().collect()
    }

    /// `;`-separated fields of the buffer, as used by OSC.
    pub fn fields(&self) -> Vec<String> {
        self.raw().split(';').map(str::to_string).collect()
    }

    pub fn csi(&self, defaults: &[i32]) -> CsiParams {
        CsiParams::parse(&self.params, defaults)
    }

    pub fn csi_param(&self, default: i32) -> i32 {
        self.csi(&[default]).get(0)
    }
}

/// CSI parameters: an optional non-numeric prefix such as `?` followed by
/// `;`-separated integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiParams {
    pub prefix: String,
    pub values: Vec<i32>,
}

impl CsiParams {
    /// Split `buf` into prefix and values. A field that is empty, zero or
    /// unparsable takes the default for its position; fields past the
    /// defaults are appended as-is (unparsable ones as 0). A buffer that does
    /// not have the `prefix digits` shape yields the defaults unchanged.
    pub fn parse(buf: &[char], defaults: &[i32]) -> Self {
        let is_numeric = |c: &char| c.is_ascii_digit() || *c == ';' || *c == ':';

        let split = buf.iter().position(is_numeric).unwrap_or(buf.len());
        let (prefix, rest) = buf.split_at(split);
        let mut values = defaults.to_vec();
        if !rest.iter().all(is_numeric) {
            return Self {
                prefix: String::new(),
                values,
            };
        }

        let rest: String = rest.iter().collect();
        for (idx, field) in rest.split(';').enumerate() {
            let value = field.parse::<i32>().unwrap_or(0);
            match values.get_mut(idx) {
                Some(slot) => {
                    if value != 0 {
                        *slot = value;
                    }
                }
                None => values.push(value),
            }
        }

        Self {
            prefix: prefix.iter().collect(),
            values,
        }
    }

    pub fn get(&self, idx: usize) -> i32 {
        self.values.get(idx).copied().unwrap_or(0)
    }
}
