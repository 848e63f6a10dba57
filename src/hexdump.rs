//! Canonical hex dumps (`hexdump -C` layout).
//!
//! Used to keep binary terminal captures as readable text fixtures.

const BYTES_PER_LINE: usize = 16;

/// Render `data` as a canonical hex dump.
///
/// ```text
/// 00000000  48 65 6c 6c 6f 2c 20 77  6f 72 6c 64 21           |Hello, world!|
/// ```
pub fn dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 4 + 16);
    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        out.push_str(&format!("{:08x}  ", line * BYTES_PER_LINE));
        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(b) => out.push_str(&format!("{:02x} ", b)),
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if (0x20..=0x7e).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

/// Parse bytes back out of a hex dump.
///
/// A line contributes bytes only if it starts with an 8-digit hex offset;
/// it is followed by up to 16 blank-separated two-digit hex values. Anything
/// after the last value (the `|ascii|` gutter) is ignored, as are lines
/// without values.
pub fn parse(text: &str) -> Vec<u8> {
    let mut result = Vec::new();
    for line in text.lines() {
        let bytes = line.as_bytes();
        if bytes.len() < 8 || !bytes[..8].iter().all(u8::is_ascii_hexdigit) {
            continue;
        }

        let mut pos = 8;
        for _ in 0..BYTES_PER_LINE {
            let start = pos;
            while pos < bytes.len() && is_blank(bytes[pos]) {
                pos += 1;
            }
            let digits = bytes.get(pos..pos + 2);
            match digits {
                Some(&[hi, lo]) if pos > start && hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    result.push(nibble(hi) << 4 | nibble(lo));
                    pos += 2;
                }
                _ => break,
            }
        }
    }
    result
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn nibble(h: u8) -> u8 {
    match h {
        b'0'..=b'9' => h - b'0',
        b'a'..=b'f' => h - b'a' + 10,
        b'A'..=b'F' => h - b'A' + 10,
        _ => 0,
    }
}
