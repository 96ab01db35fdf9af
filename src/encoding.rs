//! Morse character encoding and compiled-byte classification.
//!
//! Each printable character is packed into a single byte:
//!
//! ```text
//! Filler      . - .
//! 1 1 1 1 0   0 1 0     R = .-.  (0xF2)
//! ```
//!
//! The byte starts with a run of 1-bits, followed by a 0 separator. The bits after
//! the separator are the dot/dash pattern, most significant first (0 = dot,
//! 1 = dash). Shorter codes use more filler, so every symbol has bit 7 set and a
//! single byte holds up to six elements.
//!
//! Bytes with bit 7 clear are control bytes, see [`Code`].
//!
//! ## Functions
//!
//! - [`encode_char`]: maps a character to a symbol or control byte (0 = unencodable)
//! - [`elements`]: iterates the dots and dashes of a symbol byte
//! - [`Code::from`]: classifies any compiled byte

use core::fmt;

use crate::consts::{
    CARRIER_OFF_BASE, CARRIER_ON_BASE, HOLD_DURATION_MASK, MORSE_END, MORSE_SPACE,
    POWER_MODE_LIMIT, SYMBOL_FLAG,
};

static LETTERS: [u8; 26] = [
    0xF9, 0xE8, 0xEA, 0xF4, // A, B, C, D
    0xFC, 0xE2, 0xF6, 0xE0, // E, F, G, H
    0xF8, 0xE7, 0xF5, 0xE4, // I, J, K, L
    0xFB, 0xFA, 0xF7, 0xE6, // M, N, O, P
    0xED, 0xF2, 0xF0, 0xFD, // Q, R, S, T
    0xF1, 0xE1, 0xF3, 0xE9, // U, V, W, X
    0xEB, 0xEC, // Y, Z
];

static DIGITS: [u8; 10] = [
    0xDF, 0xCF, 0xC7, 0xC3, // 0, 1, 2, 3
    0xC1, 0xC0, 0xD0, 0xD8, // 4, 5, 6, 7
    0xDC, 0xDE, // 8, 9
];

/// Encodes a single character into a compiled-message byte.
///
/// # Returns
/// - A symbol byte (bit 7 set) for letters, digits and the supported punctuation
///   (`= ? / . , - +`)
/// - [`MORSE_SPACE`] for `' '`
/// - [`MORSE_END`] for `'\0'`
/// - `0` when the character cannot be sent in Morse
pub fn encode_char(c: char) -> u8 {
    match c {
        '0'..='9' => DIGITS[c as usize - '0' as usize],
        'a'..='z' => LETTERS[c as usize - 'a' as usize],
        'A'..='Z' => LETTERS[c as usize - 'A' as usize],
        '=' => 0b1101_0001, // -...-
        '?' => 0b1000_1100, // ..--..
        '/' => 0b1101_0010, // -..-.
        '.' => 0b1001_0101, // .-.-.-
        ',' => 0b1011_0011, // --..--
        '-' => 0b1010_0001, // -....-
        '+' => 0b1100_1010, // .-.-.
        ' ' => MORSE_SPACE,
        '\0' => MORSE_END,
        _ => 0,
    }
}

/// A single keyed element of a Morse character.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Element {
    /// Short element, one tick of carrier.
    Dot,
    /// Long element, three ticks of carrier.
    Dash,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Dot => f.write_str("."),
            Element::Dash => f.write_str("-"),
        }
    }
}

/// Iterator over the elements of a symbol byte, see [`elements`].
#[derive(Clone, Debug)]
pub struct Elements {
    code: u8,
    remaining: u32,
}

impl Iterator for Elements {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let element = if self.code & 0x80 != 0 {
            Element::Dash
        } else {
            Element::Dot
        };
        self.code <<= 1;
        Some(element)
    }
}

/// Returns the number of significant (dot/dash) bits in a symbol byte.
///
/// Returns `None` when the byte is not a well-formed symbol: a control byte, or a
/// filler run leaving no room for an element (`0xFE`, `0xFF`).
pub fn significant_bits(symbol: u8) -> Option<u32> {
    let filler = symbol.leading_ones();
    if filler == 0 || filler >= 7 {
        None
    } else {
        Some(7 - filler)
    }
}

/// Decodes a symbol byte into its dots and dashes.
///
/// Malformed symbols yield an empty iterator.
pub fn elements(symbol: u8) -> Elements {
    match significant_bits(symbol) {
        Some(bits) => Elements {
            code: symbol << (8 - bits),
            remaining: bits,
        },
        None => Elements {
            code: 0,
            remaining: 0,
        },
    }
}

/// Meaning of one byte of a compiled message.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Code {
    /// A character's dot/dash pattern (raw byte, bit 7 set).
    Symbol(u8),
    /// Switch the 2-bit power mode output.
    PowerMode(u8),
    /// Hold the key down for `16 * n` ticks.
    CarrierOn(u8),
    /// Hold the key up for `16 * n` ticks.
    CarrierOff(u8),
    /// Inter-word space.
    Space,
    /// End of message.
    End,
    /// Any other byte. The transmitter treats it as the end of the message.
    Unknown(u8),
}

impl Code {
    /// Whether this byte is a timed control directive rather than a character.
    pub fn is_hold(&self) -> bool {
        matches!(self, Code::Space | Code::CarrierOn(_) | Code::CarrierOff(_))
    }
}

impl From<u8> for Code {
    fn from(byte: u8) -> Self {
        if byte & SYMBOL_FLAG != 0 {
            return match significant_bits(byte) {
                Some(_) => Code::Symbol(byte),
                None => Code::Unknown(byte),
            };
        }
        match byte {
            MORSE_END => Code::End,
            MORSE_SPACE => Code::Space,
            b if b < POWER_MODE_LIMIT => Code::PowerMode(b),
            b if b & !HOLD_DURATION_MASK == CARRIER_ON_BASE => {
                Code::CarrierOn(b & HOLD_DURATION_MASK)
            }
            b if b & !HOLD_DURATION_MASK == CARRIER_OFF_BASE => {
                Code::CarrierOff(b & HOLD_DURATION_MASK)
            }
            b => Code::Unknown(b),
        }
    }
}

impl From<Code> for u8 {
    fn from(code: Code) -> u8 {
        match code {
            Code::Symbol(b) | Code::Unknown(b) => b,
            Code::PowerMode(mode) => mode & 0x03,
            Code::CarrierOn(n) => CARRIER_ON_BASE | (n & HOLD_DURATION_MASK),
            Code::CarrierOff(n) => CARRIER_OFF_BASE | (n & HOLD_DURATION_MASK),
            Code::Space => MORSE_SPACE,
            Code::End => MORSE_END,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Symbol(b) => {
                for element in elements(*b) {
                    write!(f, "{}", element)?;
                }
                Ok(())
            }
            Code::PowerMode(mode) => write!(f, "<P{}>", mode),
            Code::CarrierOn(n) => write!(f, "<+{}>", n),
            Code::CarrierOff(n) => write!(f, "<-{}>", n),
            Code::Space => f.write_str("/"),
            Code::End => f.write_str("<END>"),
            Code::Unknown(b) => write!(f, "<?{:02X}>", b),
        }
    }
}
