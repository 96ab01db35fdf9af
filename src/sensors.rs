//! Sensor readings rendered as short Morse-friendly text.
//!
//! The message encoder expands `$Ann` and `$Tn` directives at encode time by asking
//! a [`SensorReadout`] for the current value as text. Each readout also reports the
//! worst-case length of that text, which the encoder checks against the remaining
//! buffer space before inserting anything. A message that compiles once therefore
//! keeps compiling whatever the readings are later on.
//!
//! [`SensorBank`] is the readout used by the controller: it caches the latest raw
//! samples pushed by the (external) sampling loop and formats them on request.

use core::fmt::Write;

use heapless::String;

use crate::consts::{NUM_ANALOG_CHANNELS, NUM_TEMPERATURE_CHANNELS, SENSOR_TEXT_LEN};

/// Text of a single rendered sensor value, e.g. `"4V2"` or `"-11C"`.
pub type SensorText = String<SENSOR_TEXT_LEN>;

/// Lowest temperature the sensors can report, in degrees Celsius.
pub const TEMPERATURE_MIN: i16 = -55;

/// Highest temperature the sensors can report, in degrees Celsius.
pub const TEMPERATURE_MAX: i16 = 125;

/// Full-scale analog reading.
pub const ANALOG_FULL_SCALE: u16 = 1023;

/// Source of sensor values for message directives.
///
/// Implementations must be side-effect free from the encoder's point of view and
/// must never render more characters than the matching `max_*_len` reports.
pub trait SensorReadout {
    /// Renders the current value of analog `channel`.
    fn analog_text(&self, channel: u8) -> SensorText;

    /// Worst-case length of [`analog_text`](SensorReadout::analog_text) for `channel`.
    fn max_analog_len(&self, channel: u8) -> usize;

    /// Renders the current value of temperature sensor `channel`.
    fn temperature_text(&self, channel: u8) -> SensorText;

    /// Worst-case length of [`temperature_text`](SensorReadout::temperature_text)
    /// for `channel`.
    fn max_temperature_len(&self, channel: u8) -> usize;
}

/// Cached analog and temperature readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorBank {
    analog: [u16; NUM_ANALOG_CHANNELS],
    temperature: [i16; NUM_TEMPERATURE_CHANNELS],
    temperature_devices: usize,
}

impl Default for SensorBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorBank {
    /// Creates a bank with all analog inputs at 0 and no temperature sensors.
    pub const fn new() -> Self {
        Self {
            analog: [0; NUM_ANALOG_CHANNELS],
            temperature: [0; NUM_TEMPERATURE_CHANNELS],
            temperature_devices: 0,
        }
    }

    /// Stores a raw analog sample (`0..=1023`, clamped).
    pub fn record_analog(&mut self, channel: usize, raw: u16) {
        if let Some(slot) = self.analog.get_mut(channel) {
            *slot = raw.min(ANALOG_FULL_SCALE);
        }
    }

    /// Stores a temperature reading in whole degrees Celsius.
    pub fn record_temperature(&mut self, channel: usize, celsius: i16) {
        if let Some(slot) = self.temperature.get_mut(channel) {
            *slot = celsius;
        }
    }

    /// Sets how many temperature sensors were detected on the bus.
    ///
    /// Channels at or above this count render as `"ERR"`.
    pub fn set_temperature_devices(&mut self, count: usize) {
        self.temperature_devices = count.min(NUM_TEMPERATURE_CHANNELS);
    }

    /// Number of detected temperature sensors.
    pub fn temperature_devices(&self) -> usize {
        self.temperature_devices
    }

    /// Converts a raw analog sample to tenths of a volt on a 5 V scale, rounded.
    pub fn decivolts(raw: u16) -> u16 {
        let raw = u32::from(raw.min(ANALOG_FULL_SCALE));
        let full = u32::from(ANALOG_FULL_SCALE);
        ((raw * 50 + full / 2) / full) as u16
    }
}

fn error_text() -> SensorText {
    let mut text = SensorText::new();
    let _ = text.push_str("ERR");
    text
}

impl SensorReadout for SensorBank {
    fn analog_text(&self, channel: u8) -> SensorText {
        match self.analog.get(usize::from(channel)) {
            Some(&raw) => {
                let value = Self::decivolts(raw);
                let mut text = SensorText::new();
                let _ = write!(text, "{}V{}", value / 10, value % 10);
                text
            }
            None => error_text(),
        }
    }

    fn max_analog_len(&self, _channel: u8) -> usize {
        // "4V2" or "ERR"
        3
    }

    fn temperature_text(&self, channel: u8) -> SensorText {
        let channel = usize::from(channel);
        if channel >= self.temperature_devices {
            return error_text();
        }
        let celsius = self.temperature[channel];
        let mut text = SensorText::new();
        if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&celsius) {
            let _ = text.push_str("ERNG");
        } else {
            let _ = write!(text, "{}C", celsius);
        }
        text
    }

    fn max_temperature_len(&self, channel: u8) -> usize {
        if usize::from(channel) < self.temperature_devices {
            // "-55C", "125C" or "ERNG"
            4
        } else {
            3
        }
    }
}
