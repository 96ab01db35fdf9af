//! Tick-driven Morse beacon transmitter.
//!
//! This module provides the [`Beacon`] struct, which keys a transmitter from a
//! [`CompiledMessage`] one dot-length at a time. It drives four digital outputs:
//!
//! - `key`: high while the key is down (carrier keyed)
//! - `inv`: high while the key is up, the complement of `key` during a message
//! - `mode0` / `mode1`: the 2-bit power mode
//!
//! Between messages both key lines are low ("carrier off").
//!
//! [`tick()`](Beacon::tick) must be called once per dot-length (100 ms at 12 WPM).
//! It never blocks and does a bounded amount of work, so many beacons and other
//! periodic tasks can share a single loop.
//!
//! ## Timing
//!
//! | Element              | Key   | Ticks |
//! |----------------------|-------|-------|
//! | dot                  | down  | 1     |
//! | dash                 | down  | 3     |
//! | gap inside character | up    | 1     |
//! | gap after character  | up    | 3     |
//! | word space marker    | up    | 5     |
//! | `$+n` / `$-n` hold   | down / up | `16 * n` |
//!
//! Moving on to the next byte takes one extra tick after a gap or hold ends. Power
//! mode bytes take no time: they are applied and the following byte is interpreted
//! in the same tick.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use morse_beacon::beacon::Beacon;
//! use morse_beacon::message::CompiledMessage;
//! use morse_beacon::sensors::SensorBank;
//!
//! # let key = Pin::new(&[PinTransaction::set(PinState::Low)]);
//! # let inv = Pin::new(&[PinTransaction::set(PinState::Low)]);
//! # let mode0 = Pin::new(&[PinTransaction::set(PinState::Low)]);
//! # let mode1 = Pin::new(&[PinTransaction::set(PinState::Low)]);
//! let mut beacon = Beacon::new(key, inv, mode0, mode1);
//! let message = CompiledMessage::compile("VVV de PA3", &SensorBank::new()).unwrap();
//! if beacon.is_done() {
//!     beacon.set_next_message(message);
//! }
//! // every 100 ms:
//! // beacon.tick();
//! # beacon.key.done();
//! # beacon.inv.done();
//! # beacon.mode0.done();
//! # beacon.mode1.done();
//! ```

use core::convert::Infallible;

use embedded_hal::digital::{OutputPin, PinState};

use crate::consts::{
    CHAR_GAP_TICKS, DASH_TICKS, DOT_TICKS, ELEMENT_GAP_TICKS, HOLD_UNIT_TICKS, WORD_SPACE_TICKS,
};
use crate::encoding::{Code, significant_bits};
use crate::message::CompiledMessage;

/// `bit_pos` value meaning "at the start of a byte".
const BYTE_START: u8 = 7;

/// Level of the two key outputs.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum KeyState {
    /// Both key lines low. Used between messages and while disabled.
    #[default]
    CarrierOff,
    /// Key down: `key` high, `inv` low.
    On,
    /// Key up: `key` low, `inv` high.
    Off,
}

/// Observable phase of a [`Beacon`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BeaconState {
    /// Turned off with [`set_enabled(false)`](Beacon::set_enabled). Ticks are ignored.
    Disabled,
    /// No message active and none pending.
    Idle,
    /// No message active, a pending message will be adopted on the next tick.
    Dispatching,
    /// The next tick interprets a fresh byte.
    InterpretingByte,
    /// Keying the elements and gaps of a character.
    EmittingSymbolBit,
    /// Counting down a space or carrier hold.
    HoldingControl,
}

/// A single Morse beacon transmitter.
///
/// ## Type Parameters
///
/// - `KEY`: output for the key line
/// - `INV`: output for the inverted key line
/// - `MODE`: outputs for the two power-mode bits
///
/// ## Notes
///
/// - Pin errors are ignored; the transmitter never fails at runtime.
/// - Unknown or malformed bytes end the message instead of corrupting the state.
#[derive(Debug)]
pub struct Beacon<KEY, INV, MODE>
where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    /// Key line, high while the key is down.
    pub key: KEY,
    /// Inverted key line, high while the key is up.
    pub inv: INV,
    /// Power mode bit 0.
    pub mode0: MODE,
    /// Power mode bit 1.
    pub mode1: MODE,

    /// Hand-off slot, adopted when the active message completes.
    next: Option<CompiledMessage>,
    msg: CompiledMessage,
    msg_pos: usize,

    /// Elements left after the current one, or [`BYTE_START`].
    bit_pos: u8,
    /// Shift register of the current symbol, current element in bit 7.
    code: u8,
    current: Code,

    // At most one of these is non-zero.
    cmd_pause: u16,
    on_pause: u8,
    off_pause: u8,

    done: bool,
    enabled: bool,
    output: KeyState,
    power_mode: u8,

    /// Number of messages sent through to their terminator.
    pub messages_sent: u16,
}

fn element_ticks(code: u8) -> u8 {
    if code & 0x80 != 0 { DASH_TICKS } else { DOT_TICKS }
}

impl<KEY, INV, MODE> Beacon<KEY, INV, MODE>
where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    /// Creates an idle, enabled beacon.
    ///
    /// The carrier is switched off and the power mode set to 0.
    pub fn new(key: KEY, inv: INV, mode0: MODE, mode1: MODE) -> Self {
        let mut beacon = Self {
            key,
            inv,
            mode0,
            mode1,
            next: None,
            msg: CompiledMessage::empty(),
            msg_pos: 0,
            bit_pos: BYTE_START,
            code: 0,
            current: Code::End,
            cmd_pause: 0,
            on_pause: 0,
            off_pause: 0,
            done: true,
            enabled: true,
            output: KeyState::CarrierOff,
            power_mode: 0,
            messages_sent: 0,
        };
        beacon.carrier_off();
        beacon.set_power_mode(0);
        beacon
    }

    /// Switches the carrier off and hands the pins back.
    pub fn release(mut self) -> (KEY, INV, MODE, MODE) {
        self.carrier_off();
        (self.key, self.inv, self.mode0, self.mode1)
    }

    fn key_on(&mut self) {
        let _ = self.key.set_high();
        let _ = self.inv.set_low();
        self.output = KeyState::On;
    }

    fn key_off(&mut self) {
        let _ = self.key.set_low();
        let _ = self.inv.set_high();
        self.output = KeyState::Off;
    }

    fn carrier_off(&mut self) {
        let _ = self.key.set_low();
        let _ = self.inv.set_low();
        self.output = KeyState::CarrierOff;
    }

    fn set_power_mode(&mut self, mode: u8) {
        let _ = self.mode0.set_state(PinState::from(mode & 0x01 != 0));
        let _ = self.mode1.set_state(PinState::from(mode & 0x02 != 0));
        self.power_mode = mode & 0x03;
    }

    /// Installs the message to send once the current one completes.
    ///
    /// Replaces any message that is still pending; there is no queue.
    pub fn set_next_message(&mut self, message: CompiledMessage) {
        self.next = Some(message);
    }

    /// Whether a message is waiting in the hand-off slot.
    pub fn has_pending(&self) -> bool {
        self.next.is_some()
    }

    /// True when the beacon is disabled, or idle with nothing pending.
    ///
    /// This is when the caller should provide the next message.
    pub fn is_done(&self) -> bool {
        !self.enabled || (self.done && self.next.is_none())
    }

    /// Non-blocking form of [`is_done`](Beacon::is_done), for use with `nb::block!`.
    pub fn poll_done(&self) -> nb::Result<(), Infallible> {
        if self.is_done() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Starts or stops the beacon.
    ///
    /// Stopping switches the carrier off, resets the power mode to 0 and forgets the
    /// active and pending messages. Starting resumes ticking from idle.
    pub fn set_enabled(&mut self, on: bool) {
        if on {
            if !self.enabled {
                info!("beacon enabled");
            }
            self.enabled = true;
            return;
        }
        self.carrier_off();
        self.set_power_mode(0);
        self.next = None;
        self.done = true;
        self.bit_pos = BYTE_START;
        self.cmd_pause = 0;
        self.on_pause = 0;
        self.off_pause = 0;
        if self.enabled {
            info!("beacon disabled");
        }
        self.enabled = false;
    }

    /// Whether the beacon is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Current level of the key outputs.
    pub fn key_state(&self) -> KeyState {
        self.output
    }

    /// Current power mode (0-3).
    pub fn power_mode(&self) -> u8 {
        self.power_mode
    }

    /// Current phase of the state machine.
    pub fn state(&self) -> BeaconState {
        if !self.enabled {
            BeaconState::Disabled
        } else if self.done {
            if self.next.is_some() {
                BeaconState::Dispatching
            } else {
                BeaconState::Idle
            }
        } else if self.bit_pos == BYTE_START {
            BeaconState::InterpretingByte
        } else if self.current.is_hold() {
            BeaconState::HoldingControl
        } else {
            BeaconState::EmittingSymbolBit
        }
    }

    /// Advances the transmitter by one dot-length.
    ///
    /// A pending message is adopted and its first byte interpreted in the same tick.
    pub fn tick(&mut self) {
        if !self.enabled {
            return;
        }
        if self.done {
            match self.next.take() {
                Some(message) => self.adopt(message),
                None => return,
            }
        }
        if self.bit_pos == BYTE_START {
            self.interpret();
        } else {
            self.step();
        }
    }

    fn adopt(&mut self, message: CompiledMessage) {
        debug!("beacon adopting message of {} bytes", message.as_bytes().len());
        self.msg = message;
        self.msg_pos = 0;
        self.bit_pos = BYTE_START;
        self.cmd_pause = 0;
        self.on_pause = 0;
        self.off_pause = 0;
        self.done = false;
    }

    fn next_byte(&mut self) {
        self.msg_pos += 1;
        self.bit_pos = BYTE_START;
    }

    fn finish(&mut self) {
        self.carrier_off();
        self.done = true;
        self.bit_pos = BYTE_START;
    }

    /// Interprets the byte at the cursor. Power mode bytes are applied and skipped
    /// without using up the tick.
    fn interpret(&mut self) {
        loop {
            let byte = self.msg.byte(self.msg_pos);
            self.current = Code::from(byte);
            match self.current {
                Code::PowerMode(mode) => {
                    self.set_power_mode(mode);
                    self.msg_pos += 1;
                }
                Code::End => {
                    self.finish();
                    self.messages_sent = self.messages_sent.wrapping_add(1);
                    debug!("beacon finished message");
                    return;
                }
                Code::Unknown(code) => {
                    warn!("unknown code {} at byte {}, ending message", code, self.msg_pos);
                    self.finish();
                    return;
                }
                Code::Space => {
                    self.key_off();
                    self.off_pause = WORD_SPACE_TICKS;
                    self.bit_pos = 0;
                    return;
                }
                Code::CarrierOn(units) => {
                    self.key_on();
                    self.hold(units);
                    return;
                }
                Code::CarrierOff(units) => {
                    self.key_off();
                    self.hold(units);
                    return;
                }
                Code::Symbol(symbol) => {
                    self.start_symbol(symbol);
                    return;
                }
            }
        }
    }

    fn hold(&mut self, units: u8) {
        let ticks = HOLD_UNIT_TICKS * u16::from(units);
        if ticks == 0 {
            self.next_byte();
        } else {
            self.cmd_pause = ticks;
            self.bit_pos = 0;
        }
    }

    fn start_symbol(&mut self, symbol: u8) {
        match significant_bits(symbol) {
            Some(bits) => {
                // Drop the filler run and the separator.
                self.code = symbol << (8 - bits);
                self.bit_pos = bits as u8 - 1;
                self.key_on();
                self.on_pause = element_ticks(self.code);
            }
            None => self.finish(),
        }
    }

    fn step(&mut self) {
        if self.cmd_pause > 0 {
            self.cmd_pause -= 1;
            if self.cmd_pause == 0 {
                self.next_byte();
            }
        } else if self.on_pause > 0 {
            self.on_pause -= 1;
            if self.on_pause == 0 {
                self.key_off();
                self.off_pause = if self.bit_pos == 0 {
                    CHAR_GAP_TICKS
                } else {
                    ELEMENT_GAP_TICKS
                };
            }
        } else if self.off_pause > 0 {
            self.off_pause -= 1;
            if self.off_pause == 0 {
                if self.bit_pos > 0 {
                    self.code <<= 1;
                    self.bit_pos -= 1;
                    self.key_on();
                    self.on_pause = element_ticks(self.code);
                } else {
                    self.next_byte();
                }
            }
        } else {
            self.next_byte();
        }
    }
}
