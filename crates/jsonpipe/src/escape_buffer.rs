//! Decoding of `\uXXXX` escapes into string text.
//!
//! [`UnicodeEscapeBuffer`] accumulates the four hex digits of one escape into
//! a UTF-16 code unit and pairs high and low surrogates across consecutive
//! escapes. A high surrogate that is not immediately followed by a low
//! surrogate escape decodes to U+FFFD, as does a lone low surrogate.
use core::char::REPLACEMENT_CHARACTER;

use crate::buffered_string::BufferedString;

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    code_unit: u16,
    high_surrogate: Option<u16>,
}

fn hex_value(byte: u8) -> Option<u16> {
    match byte {
        b'0'..=b'9' => Some(u16::from(byte - b'0')),
        b'a'..=b'f' => Some(u16::from(byte - b'a' + 10)),
        b'A'..=b'F' => Some(u16::from(byte - b'A' + 10)),
        _ => None,
    }
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

impl UnicodeEscapeBuffer {
    /// Starts a new escape. A pending high surrogate is kept.
    pub fn begin(&mut self) {
        self.code_unit = 0;
    }

    /// Feeds one hex digit; returns `false` if `byte` is not one.
    pub fn push_digit(&mut self, byte: u8) -> bool {
        match hex_value(byte) {
            Some(digit) => {
                self.code_unit = (self.code_unit << 4) | digit;
                true
            }
            None => false,
        }
    }

    /// Completes the escape after its fourth digit and appends whatever it
    /// decodes to.
    pub fn finish_into(&mut self, out: &mut BufferedString) {
        let unit = self.code_unit;
        if let Some(high) = self.high_surrogate.take() {
            if is_low_surrogate(unit) {
                let scalar =
                    0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                out.push_char(char::from_u32(scalar).unwrap_or(REPLACEMENT_CHARACTER));
                return;
            }
            out.push_char(REPLACEMENT_CHARACTER);
        }
        if is_high_surrogate(unit) {
            self.high_surrogate = Some(unit);
        } else {
            out.push_char(char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT_CHARACTER));
        }
    }

    /// Resolves a high surrogate left dangling by anything other than a
    /// following escape.
    pub fn flush_dangling_into(&mut self, out: &mut BufferedString) {
        if self.high_surrogate.take().is_some() {
            out.push_char(REPLACEMENT_CHARACTER);
        }
    }
}
