//! 6502 status register as an `NVUBDIZC` bitmask string.

/// Flag letters from bit 7 down to bit 0.
const FLAG_LETTERS: [u8; 8] = *b"NVUBDIZC";

/// Render a status byte: uppercase letter for a set bit, lowercase for clear.
#[must_use]
pub fn format_flags(p: u8) -> String {
    FLAG_LETTERS
        .iter()
        .enumerate()
        .map(|(i, &letter)| {
            if p & (0x80 >> i) != 0 {
                letter as char
            } else {
                letter.to_ascii_lowercase() as char
            }
        })
        .collect()
}

/// Parse a status bitmask string.
///
/// Each of the eight positions is the uppercase flag letter when set, and
/// the lowercase letter, `.` or `-` when clear.
#[must_use]
pub fn parse_flags(text: &str) -> Option<u8> {
    let bytes = text.as_bytes();
    if bytes.len() != FLAG_LETTERS.len() {
        return None;
    }
    let mut p = 0u8;
    for (i, (&c, &letter)) in bytes.iter().zip(FLAG_LETTERS.iter()).enumerate() {
        if c == letter {
            p |= 0x80 >> i;
        } else if c != letter.to_ascii_lowercase() && c != b'.' && c != b'-' {
            return None;
        }
    }
    Some(p)
}
