//! Timer and tick-loop utilities for the beacon array.
//!
//! The beacons advance once per dot-length (100 ms at 12 WPM). Two ways of producing
//! that tick are provided: an interrupt service routine sharing the array through
//! `critical_section::with` (`timer-isr` feature), or a blocking delay loop
//! (`delay-loop` feature). Either way the tick source may run faster than the dot
//! rate; [`BeaconArray`](crate::array::BeaconArray) divides it down by its
//! `ticks_per_dot`.
//!
//! Contains helpers for polling- and ISR-based scheduling, including:
//! - `compute_ocr_value`: runtime OCR calculator
//! - `const_ocr_value`: compile-time OCR calculator
//! - `run_beacon_tick_loop`: blocking loop for `DelayNs` (feature `delay-loop`)
//! - `global_beacon_timer_tick` and `tick_beacon_timer!()`: interrupt-based tick callback
//!   wrappers (feature `timer-isr`)
//!
//! Common prescalers for a 16 MHz AVR: (For use with `compute_ocr_value` and
//! `const_ocr_value`)
//!
//! | PRESCALER | TIMER_COUNTS | Overflow Interval |
//! |-----------|--------------|-------------------|
//! |        64 |          250 |              1 ms |
//! |       256 |          125 |              2 ms |
//! |       256 |          250 |              4 ms |
//! |      1024 |          125 |              8 ms |
//! |      1024 |          250 |             16 ms |

use libm::round;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// Speed the beacons are specified at.
pub const REFERENCE_WPM: u8 = 12;
/// Dot-length at [`REFERENCE_WPM`], in milliseconds.
pub const DOT_MILLIS: u32 = 100;
/// Dot-lengths in the standard word "PARIS " (elements, gaps and the word space).
pub const DOTS_PER_WORD: u32 = 50;
/// 1,000 microseconds = 1 millisecond
pub const MICROSECONDS_PER_MILLISECOND: u32 = 1_000;

/// Dot-length in microseconds at `wpm` words per minute.
///
/// A speed of 0 is treated as 1 WPM.
pub const fn dot_micros(wpm: u8) -> u32 {
    let wpm = if wpm == 0 { 1 } else { wpm as u32 };
    // 60 s per minute / (50 dots per word * wpm)
    60_000_000 / (DOTS_PER_WORD * wpm)
}

/// Computes the OCR value for an AVR timer (CTC mode)
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 8, 64, 256)
/// - `tick_us`: desired tick interval in microseconds (e.g., 1000.0)
/// - `wpm`: keying speed in words per minute (e.g., [`REFERENCE_WPM`])
///
/// # Returns
/// - OCR value for OCRnA (rounds to nearest integer)
/// - Number of ticks per dot (for initializing the `BeaconArray`), at least 1
pub fn compute_ocr_value(f_cpu: u32, prescaler: u32, tick_us: f32, wpm: u8) -> (u16, u16) {
    let counts_per_second = f_cpu as f64 / prescaler as f64;
    let counts_per_tick = counts_per_second * (tick_us as f64 / 1_000_000.0);
    (round(counts_per_tick) as u16, ticks_per_dot(tick_us, wpm))
}

/// Compile-time OCR value calculator
///
/// Works in whole microseconds; the OCR value is truncated rather than rounded.
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 8, 64, 256)
/// - `tick_us`: desired tick interval in microseconds (e.g., 1000)
/// - `wpm`: keying speed in words per minute (e.g., [`REFERENCE_WPM`])
///
/// # Returns
/// - OCR value for OCRnA
/// - Number of ticks per dot (for initializing the `BeaconArray`), at least 1
pub const fn const_ocr_value(f_cpu: u32, prescaler: u32, tick_us: u32, wpm: u8) -> (u16, u16) {
    let counts_per_tick = (f_cpu / prescaler) as u64 * tick_us as u64 / 1_000_000;
    (counts_per_tick as u16, const_ticks_per_dot(tick_us, wpm))
}

/// Compute ticks per dot value
///
/// # Arguments
/// - `tick_us`: tick interval in microseconds (e.g., 1000.0)
/// - `wpm`: keying speed in words per minute
///
/// # Returns
/// - Number of ticks per dot (rounded, at least 1)
pub fn ticks_per_dot(tick_us: f32, wpm: u8) -> u16 {
    if tick_us <= 0.0 {
        return 1;
    }
    let ticks = round(dot_micros(wpm) as f64 / tick_us as f64);
    if ticks < 1.0 {
        1
    } else if ticks > u16::MAX as f64 {
        u16::MAX
    } else {
        ticks as u16
    }
}

/// Compile-time ticks per dot value
///
/// # Arguments
/// - `tick_us`: tick interval in whole microseconds (e.g., 1000)
/// - `wpm`: keying speed in words per minute
///
/// # Returns
/// - Number of ticks per dot (rounded, at least 1)
pub const fn const_ticks_per_dot(tick_us: u32, wpm: u8) -> u16 {
    if tick_us == 0 {
        return 1;
    }
    let ticks = (dot_micros(wpm) + tick_us / 2) / tick_us;
    if ticks == 0 {
        1
    } else if ticks > u16::MAX as u32 {
        u16::MAX
    } else {
        ticks as u16
    }
}
