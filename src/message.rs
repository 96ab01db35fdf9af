//! Beacon message compiler.
//!
//! Turns a human-authored message into the byte code consumed by
//! [`Beacon`](crate::beacon::Beacon). Plain characters are Morse-encoded one byte
//! each; `$` starts a directive:
//!
//! | Directive      | Effect                                                     |
//! |----------------|------------------------------------------------------------|
//! | `$P0` - `$P3`  | set the 2-bit power mode                                   |
//! | `$A00` - `$A15`| insert the current voltage of an analog channel (`"4V2"`)  |
//! | `$T0` - `$T7`  | insert the current temperature of a sensor (`"-11C"`)      |
//! | `$+1` - `$+9`  | hold the carrier ON for `16 * n` ticks                     |
//! | `$-1` - `$-9`  | hold the carrier OFF for `16 * n` ticks                    |
//!
//! Sensor values are read once, at encode time, so transmission timing never waits
//! on sensor I/O. The rendered text goes through a small scratch buffer and is then
//! appended symbol by symbol.
//!
//! The output always ends with [`MORSE_END`]. On any error the output is reset to a
//! lone terminator, which the transmitter sees as an empty message.

use core::fmt::{self, Write};
use core::ops::RangeInclusive;
use core::str::Chars;

use heapless::String;

use crate::consts::{COMPILED_MESSAGE_LEN, DIAGNOSTIC_LEN, MORSE_END, NUM_ANALOG_CHANNELS};
use crate::encoding::{Code, encode_char};
use crate::error::EncodeError;
use crate::sensors::SensorReadout;

/// Walks the source text one character at a time, tracking the character index.
struct Scanner<'a> {
    chars: Chars<'a>,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            pos: 0,
        }
    }

    /// Returns the position of the next character and the character itself.
    /// At the end of the text the position is the text length.
    fn next(&mut self) -> (usize, Option<char>) {
        let position = self.pos;
        let c = self.chars.next();
        if c.is_some() {
            self.pos += 1;
        }
        (position, c)
    }

    fn digit(&mut self, range: RangeInclusive<u8>) -> Result<u8, usize> {
        let (position, c) = self.next();
        c.and_then(|c| c.to_digit(10))
            .map(|d| d as u8)
            .filter(|d| range.contains(d))
            .ok_or(position)
    }
}

/// Bounded writer over the caller's buffer. The last byte is reserved for the
/// terminator.
struct Output<'b> {
    buf: &'b mut [u8],
    len: usize,
    limit: usize,
}

impl<'b> Output<'b> {
    fn new(buf: &'b mut [u8]) -> Self {
        let limit = buf.len().saturating_sub(1);
        Self { buf, len: 0, limit }
    }

    fn too_small(&self) -> EncodeError {
        EncodeError::BufferTooSmall {
            capacity: self.buf.len(),
        }
    }

    fn push(&mut self, byte: u8) -> Result<(), EncodeError> {
        if self.len >= self.limit {
            return Err(self.too_small());
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Appends sensor text after checking its worst-case length still fits.
    fn insert(&mut self, text: &str, worst_case: usize, position: usize) -> Result<(), EncodeError> {
        if self.len + worst_case > self.limit {
            return Err(self.too_small());
        }
        for character in text.chars() {
            match encode_char(character) {
                0 | MORSE_END => {
                    return Err(EncodeError::Unencodable {
                        character,
                        position,
                    });
                }
                code => self.push(code)?,
            }
        }
        Ok(())
    }
}

fn compile<S>(out: &mut Output<'_>, text: &str, sensors: &S) -> Result<(), EncodeError>
where
    S: SensorReadout + ?Sized,
{
    let mut scanner = Scanner::new(text);
    loop {
        let (position, c) = scanner.next();
        let c = match c {
            None | Some('\0') => return Ok(()),
            Some(c) => c,
        };
        if c != '$' {
            match encode_char(c) {
                0 => {
                    return Err(EncodeError::Unencodable {
                        character: c,
                        position,
                    });
                }
                code => out.push(code)?,
            }
            continue;
        }

        let (directive_pos, directive) = scanner.next();
        match directive {
            Some('P') => {
                let mode = scanner
                    .digit(0..=3)
                    .map_err(|position| EncodeError::PowerMode { position })?;
                out.push(Code::PowerMode(mode).into())?;
            }
            Some('A') => {
                let analog = |position| EncodeError::AnalogChannel { position };
                let tens = scanner.digit(0..=1).map_err(analog)?;
                let units_pos = scanner.pos;
                let units = scanner.digit(0..=9).map_err(analog)?;
                let channel = tens * 10 + units;
                if usize::from(channel) >= NUM_ANALOG_CHANNELS {
                    return Err(analog(units_pos));
                }
                let value = sensors.analog_text(channel);
                out.insert(&value, sensors.max_analog_len(channel), position)?;
            }
            Some('T') => {
                let channel = scanner
                    .digit(0..=7)
                    .map_err(|position| EncodeError::TemperatureChannel { position })?;
                let value = sensors.temperature_text(channel);
                out.insert(&value, sensors.max_temperature_len(channel), position)?;
            }
            Some('+') => {
                let ticks = scanner
                    .digit(1..=9)
                    .map_err(|position| EncodeError::Delay { position })?;
                out.push(Code::CarrierOn(ticks).into())?;
            }
            Some('-') => {
                let ticks = scanner
                    .digit(1..=9)
                    .map_err(|position| EncodeError::Delay { position })?;
                out.push(Code::CarrierOff(ticks).into())?;
            }
            _ => {
                return Err(EncodeError::Directive {
                    position: directive_pos,
                });
            }
        }
    }
}

/// Compiles `text` into `out`.
///
/// The whole of `out` is the capacity; one byte of it is always reserved for the
/// terminating [`MORSE_END`]. Sensor directives are expanded with `sensors`.
///
/// # Returns
/// - `Ok(len)`: number of code bytes written before the terminator
/// - `Err(..)`: the text could not be compiled; `out[0]` is [`MORSE_END`]
pub fn encode_message<S>(out: &mut [u8], text: &str, sensors: &S) -> Result<usize, EncodeError>
where
    S: SensorReadout + ?Sized,
{
    if out.is_empty() {
        return Err(EncodeError::BufferTooSmall { capacity: 0 });
    }
    let mut output = Output::new(out);
    match compile(&mut output, text, sensors) {
        Ok(()) => {
            let len = output.len;
            out[len] = MORSE_END;
            Ok(len)
        }
        Err(err) => {
            out[0] = MORSE_END;
            Err(err)
        }
    }
}

/// Message compiler that keeps a human-readable diagnostic of its last failure.
///
/// ```rust
/// use morse_beacon::message::MessageEncoder;
/// use morse_beacon::sensors::SensorBank;
///
/// let mut encoder = MessageEncoder::new();
/// let mut buf = [0u8; 8];
/// assert!(!encoder.encode(&mut buf, "$P9", &SensorBank::new()));
/// assert!(encoder.last_error().contains("power mode"));
/// assert_eq!(buf[0], 0x7F);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MessageEncoder {
    last_error: String<DIAGNOSTIC_LEN>,
}

impl MessageEncoder {
    /// Creates an encoder with an empty diagnostic.
    pub const fn new() -> Self {
        Self {
            last_error: String::new(),
        }
    }

    /// Compiles `text` into `out`, see [`encode_message`].
    ///
    /// Returns `true` on success and clears the diagnostic; on failure the
    /// diagnostic describes what went wrong.
    pub fn encode<S>(&mut self, out: &mut [u8], text: &str, sensors: &S) -> bool
    where
        S: SensorReadout + ?Sized,
    {
        self.last_error.clear();
        match encode_message(out, text, sensors) {
            Ok(_) => true,
            Err(err) => {
                let _ = write!(self.last_error, "{}", err);
                false
            }
        }
    }

    /// The diagnostic of the last [`encode`](MessageEncoder::encode) call, or an
    /// empty string if it succeeded.
    pub fn last_error(&self) -> &str {
        &self.last_error
    }
}

/// A compiled message in fixed-capacity storage.
///
/// Beacons take messages by value, so a message handed to a beacon cannot be
/// modified while it is being sent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CompiledMessage {
    bytes: [u8; COMPILED_MESSAGE_LEN],
}

impl Default for CompiledMessage {
    fn default() -> Self {
        Self::empty()
    }
}

impl CompiledMessage {
    /// A message containing only the terminator.
    pub const fn empty() -> Self {
        Self {
            bytes: [MORSE_END; COMPILED_MESSAGE_LEN],
        }
    }

    /// Compiles `text`, expanding sensor directives with `sensors`.
    pub fn compile<S>(text: &str, sensors: &S) -> Result<Self, EncodeError>
    where
        S: SensorReadout + ?Sized,
    {
        let mut message = Self::empty();
        let _ = encode_message(&mut message.bytes, text, sensors)?;
        Ok(message)
    }

    /// Wraps already compiled bytes. A missing terminator is appended.
    ///
    /// Returns `None` if the bytes (plus terminator) exceed the capacity.
    pub fn from_codes(codes: &[u8]) -> Option<Self> {
        let terminated = codes.last() == Some(&MORSE_END);
        if codes.len() > COMPILED_MESSAGE_LEN
            || (!terminated && codes.len() == COMPILED_MESSAGE_LEN)
        {
            return None;
        }
        let mut message = Self::empty();
        message.bytes[..codes.len()].copy_from_slice(codes);
        Some(message)
    }

    /// The message bytes up to and including the first terminator.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == MORSE_END)
            .map_or(COMPILED_MESSAGE_LEN, |i| i + 1);
        &self.bytes[..end]
    }

    /// The byte at `pos`; positions past the storage read as the terminator.
    pub fn byte(&self, pos: usize) -> u8 {
        self.bytes.get(pos).copied().unwrap_or(MORSE_END)
    }

    /// Whether the message sends nothing.
    pub fn is_empty(&self) -> bool {
        self.bytes[0] == MORSE_END
    }

    /// Iterates the decoded bytes of the message, terminator included.
    pub fn codes(&self) -> impl Iterator<Item = Code> + '_ {
        self.as_bytes().iter().map(|&b| Code::from(b))
    }
}

impl fmt::Display for CompiledMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.codes().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MORSE_SPACE;
    use crate::sensors::SensorBank;

    fn encode(text: &str, capacity: usize) -> (Result<usize, EncodeError>, Vec<u8>) {
        let mut buf = vec![0xAAu8; capacity];
        let result = encode_message(&mut buf, text, &SensorBank::new());
        (result, buf)
    }

    #[test]
    fn test_sos() {
        let (result, buf) = encode("SOS", 16);
        assert_eq!(result, Ok(3));
        assert_eq!(&buf[..4], &[0xF0, 0xF7, 0xF0, MORSE_END]);
    }

    #[test]
    fn test_words_are_separated_by_space_marker() {
        let (result, buf) = encode("de PA3", 16);
        assert_eq!(result, Ok(6));
        assert_eq!(buf[2], MORSE_SPACE);
        assert_eq!(buf[6], MORSE_END);
    }

    #[test]
    fn test_capacity_of_one_only_holds_terminator() {
        for text in ["E", "SOS", "$P1", "$+3", " "] {
            let (result, buf) = encode(text, 1);
            assert_eq!(result, Err(EncodeError::BufferTooSmall { capacity: 1 }));
            assert_eq!(buf, vec![MORSE_END]);
        }
        let (result, buf) = encode("", 1);
        assert_eq!(result, Ok(0));
        assert_eq!(buf, vec![MORSE_END]);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let (result, _) = encode("", 0);
        assert_eq!(result, Err(EncodeError::BufferTooSmall { capacity: 0 }));
    }

    #[test]
    fn test_exact_fit() {
        let (result, buf) = encode("SOS", 4);
        assert_eq!(result, Ok(3));
        assert_eq!(buf[3], MORSE_END);
        let (result, buf) = encode("SOS", 3);
        assert_eq!(result, Err(EncodeError::BufferTooSmall { capacity: 3 }));
        assert_eq!(buf[0], MORSE_END);
    }

    #[test]
    fn test_power_mode_directive() {
        let (result, buf) = encode("$P2E", 8);
        assert_eq!(result, Ok(2));
        assert_eq!(&buf[..3], &[0x02, 0xFC, MORSE_END]);
    }

    #[test]
    fn test_invalid_power_mode() {
        let mut encoder = MessageEncoder::new();
        let mut buf = [0u8; 8];
        assert!(!encoder.encode(&mut buf, "$P9", &SensorBank::new()));
        assert_eq!(buf[0], MORSE_END);
        assert_eq!(
            encoder.last_error(),
            "error parsing power mode at position 2 (expecting 0-3)"
        );
    }

    #[test]
    fn test_carrier_hold_directives() {
        let (result, buf) = encode("$+5", 8);
        assert_eq!(result, Ok(1));
        assert_eq!(&buf[..2], &[0x15, MORSE_END]);
        let (result, buf) = encode("$-9", 8);
        assert_eq!(result, Ok(1));
        assert_eq!(&buf[..2], &[0x29, MORSE_END]);
    }

    #[test]
    fn test_invalid_delays() {
        assert_eq!(encode("$+0", 8).0, Err(EncodeError::Delay { position: 2 }));
        assert_eq!(encode("AB$-x", 8).0, Err(EncodeError::Delay { position: 4 }));
        assert_eq!(encode("$+", 8).0, Err(EncodeError::Delay { position: 2 }));
    }

    #[test]
    fn test_unknown_directive() {
        assert_eq!(encode("E$X", 8).0, Err(EncodeError::Directive { position: 2 }));
        assert_eq!(encode("$", 8).0, Err(EncodeError::Directive { position: 1 }));
        assert_eq!(encode("$$", 8).0, Err(EncodeError::Directive { position: 1 }));
    }

    #[test]
    fn test_unencodable_character() {
        let mut encoder = MessageEncoder::new();
        let mut buf = [0u8; 8];
        assert!(!encoder.encode(&mut buf, "HI!", &SensorBank::new()));
        assert_eq!(
            encoder.last_error(),
            "can not encode character '!' at position 2"
        );
        assert_eq!(buf[0], MORSE_END);
    }

    #[test]
    fn test_diagnostic_cleared_on_success() {
        let mut encoder = MessageEncoder::new();
        let mut buf = [0u8; 8];
        let sensors = SensorBank::new();
        assert!(!encoder.encode(&mut buf, "$Q", &sensors));
        assert!(!encoder.last_error().is_empty());
        assert!(encoder.encode(&mut buf, "OK", &sensors));
        assert_eq!(encoder.last_error(), "");
    }

    #[test]
    fn test_analog_insertion() {
        let mut sensors = SensorBank::new();
        sensors.record_analog(2, 859);
        sensors.record_analog(15, 1023);
        let mut buf = [0u8; 16];
        let len = encode_message(&mut buf, "$A02 $A15", &sensors).unwrap();
        let expected = [
            encode_char('4'),
            encode_char('V'),
            encode_char('2'),
            MORSE_SPACE,
            encode_char('5'),
            encode_char('V'),
            encode_char('0'),
            MORSE_END,
        ];
        assert_eq!(len, 7);
        assert_eq!(&buf[..8], &expected);
    }

    #[test]
    fn test_invalid_analog_channel() {
        assert_eq!(encode("$A2", 8).0, Err(EncodeError::AnalogChannel { position: 2 }));
        assert_eq!(encode("$A1x", 8).0, Err(EncodeError::AnalogChannel { position: 3 }));
        assert_eq!(encode("$A16", 8).0, Err(EncodeError::AnalogChannel { position: 3 }));
        assert_eq!(encode("$A0", 8).0, Err(EncodeError::AnalogChannel { position: 3 }));
    }

    #[test]
    fn test_temperature_insertion() {
        let mut sensors = SensorBank::new();
        sensors.set_temperature_devices(1);
        sensors.record_temperature(0, -11);
        let mut buf = [0u8; 8];
        let len = encode_message(&mut buf, "$T0", &sensors).unwrap();
        assert_eq!(len, 4);
        assert_eq!(&buf[..5], &[0xA1, 0xCF, 0xCF, 0xEA, MORSE_END]);
    }

    #[test]
    fn test_missing_temperature_sensor_renders_err() {
        let mut buf = [0u8; 8];
        let len = encode_message(&mut buf, "$T3", &SensorBank::new()).unwrap();
        assert_eq!(&buf[..len + 1], &[0xFC, 0xF2, 0xF2, MORSE_END]);
    }

    #[test]
    fn test_invalid_temperature_channel() {
        assert_eq!(
            encode("$T8", 8).0,
            Err(EncodeError::TemperatureChannel { position: 2 })
        );
    }

    #[test]
    fn test_sensor_insertion_checks_worst_case_before_writing() {
        let mut sensors = SensorBank::new();
        sensors.set_temperature_devices(1);
        sensors.record_temperature(0, 7);
        // "7C" would fit in 3 bytes, but "-55C" would not.
        let mut buf = [0u8; 4];
        assert_eq!(
            encode_message(&mut buf, "$T0", &sensors),
            Err(EncodeError::BufferTooSmall { capacity: 4 })
        );
        assert_eq!(buf[0], MORSE_END);
        let mut buf = [0u8; 5];
        assert_eq!(encode_message(&mut buf, "$T0", &sensors), Ok(2));
    }

    #[test]
    fn test_null_terminates_text() {
        let (result, buf) = encode("E\0T", 8);
        assert_eq!(result, Ok(1));
        assert_eq!(&buf[..2], &[0xFC, MORSE_END]);
    }

    #[test]
    fn test_encoding_is_repeatable() {
        let mut sensors = SensorBank::new();
        sensors.record_analog(1, 400);
        let text = "VVV de $P1 BEACON $A01 $+2$-1 AR";
        let mut first = [0u8; COMPILED_MESSAGE_LEN];
        let mut second = [0x55u8; COMPILED_MESSAGE_LEN];
        let a = encode_message(&mut first, text, &sensors).unwrap();
        let b = encode_message(&mut second, text, &sensors).unwrap();
        assert_eq!(a, b);
        assert_eq!(&first[..=a], &second[..=b]);
    }

    #[test]
    fn test_compiled_message() {
        let message = CompiledMessage::compile("R $P3$+1", &SensorBank::new()).unwrap();
        assert_eq!(message.as_bytes(), &[0xF2, MORSE_SPACE, 0x03, 0x11, MORSE_END]);
        assert!(!message.is_empty());
        assert_eq!(message.to_string(), ".-. / <P3> <+1> <END>");
        assert_eq!(message.byte(COMPILED_MESSAGE_LEN + 3), MORSE_END);
        assert!(CompiledMessage::empty().is_empty());
    }

    #[test]
    fn test_compiled_message_from_codes() {
        let message = CompiledMessage::from_codes(&[0xFC]).unwrap();
        assert_eq!(message.as_bytes(), &[0xFC, MORSE_END]);
        assert!(CompiledMessage::from_codes(&[0xFC; COMPILED_MESSAGE_LEN]).is_none());
        let mut full = [0xFC; COMPILED_MESSAGE_LEN];
        full[COMPILED_MESSAGE_LEN - 1] = MORSE_END;
        assert!(CompiledMessage::from_codes(&full).is_some());
    }
}
