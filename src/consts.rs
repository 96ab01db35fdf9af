//! Constants used across the beacon encoder and transmitter.
//!
//! This module defines the compiled-message byte layout (control byte values and
//! subranges), the element timing expressed in ticks, and the fixed table sizes of
//! the beacon controller.
//!
//! ## Key Concepts
//!
//! - **Tick**: one dot-length. Every timing value below is a number of ticks.
//! - **Symbol**: a byte with bit 7 set, holding one character's dot/dash pattern.
//! - **Control byte**: a byte with bit 7 clear, holding a directive for the transmitter.
//! - **Buffer sizing**: compiled messages are fixed-capacity, never heap allocated.
//!
//! These values should be used wherever message bytes are produced or interpreted so
//! the encoder and the transmitter always agree on the format.

/// Marks the end of a compiled message. The transmitter turns the carrier off and
/// goes idle when it reads this byte.
pub const MORSE_END: u8 = 0x7F;

/// Inter-word space marker.
pub const MORSE_SPACE: u8 = 0x7E;

/// Control bytes below this value set the 2-bit power mode.
pub const POWER_MODE_LIMIT: u8 = 4;

/// Base of the "hold carrier ON" control subrange (`0x10..=0x1F`).
pub const CARRIER_ON_BASE: u8 = 0x10;

/// Base of the "hold carrier OFF" control subrange (`0x20..=0x2F`).
pub const CARRIER_OFF_BASE: u8 = 0x20;

/// Mask extracting the duration nibble of a hold control byte.
pub const HOLD_DURATION_MASK: u8 = 0x0F;

/// Bit that distinguishes a symbol (set) from a control byte (clear).
pub const SYMBOL_FLAG: u8 = 0x80;

/// Ticks the key stays down for a dot.
pub const DOT_TICKS: u8 = 1;

/// Ticks the key stays down for a dash.
pub const DASH_TICKS: u8 = 3;

/// Key-up ticks between the elements of one character.
pub const ELEMENT_GAP_TICKS: u8 = 1;

/// Key-up ticks after the last element of a character.
pub const CHAR_GAP_TICKS: u8 = 3;

/// Key-up ticks produced by the inter-word space marker.
pub const WORD_SPACE_TICKS: u8 = 5;

/// Ticks per unit of a hold control byte's duration nibble.
pub const HOLD_UNIT_TICKS: u16 = 16;

/// Number of beacons driven by the controller.
pub const BEACON_COUNT: usize = 9;

/// Maximum length (in characters) of a human-authored beacon message.
pub const MESSAGE_TEXT_LEN: usize = 44;

/// Capacity (in bytes) of a compiled message, terminator included.
///
/// Sensor directives can expand (`$T0` becomes up to four symbols), so this is
/// larger than [`MESSAGE_TEXT_LEN`].
pub const COMPILED_MESSAGE_LEN: usize = 64;

/// Number of analog input channels addressable with `$Ann`.
pub const NUM_ANALOG_CHANNELS: usize = 16;

/// Number of temperature sensors addressable with `$Tn`.
pub const NUM_TEMPERATURE_CHANNELS: usize = 8;

/// Capacity of the text rendered for a single sensor reading.
pub const SENSOR_TEXT_LEN: usize = 8;

/// Capacity of the human-readable encoder diagnostic.
pub const DIAGNOSTIC_LEN: usize = 96;
