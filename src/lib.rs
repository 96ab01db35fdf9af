//! # morse-beacon
//!
//! A portable, no_std Rust controller for a bank of Morse code (CW) beacons, each
//! keying a transmitter through `embedded-hal` output pins.
//!
//! The crate is split into a message compiler and a real-time keyer:
//! - [`encoding`]: characters to compact one-byte Morse symbols
//! - [`message`]: message text (with `$P`, `$A`, `$T`, `$+` and `$-` directives) to a
//!   compiled code sequence
//! - [`beacon`]: a tick-driven state machine that keys one transmitter from a compiled
//!   message
//! - [`array`]: `N` beacons ticked together, fed by a [`array::MessageSource`]
//! - [`timer`]: tick sources, using either timer interrupts or blocking delay
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support |
//! | `delay-loop`          | Uses `embedded_hal::delay::DelayNs` for tick timing |
//! | `timer-isr` (default) | Uses `critical_section::with` for tick timing |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Software Features
//!
//! - **International Morse** letters, digits and common punctuation
//! - **Sensor directives** inserting analog voltages and temperatures into the text
//! - **Power mode** control over two pins per beacon
//! - **Carrier holds** for tuning and direction finding
//! - Standard timing: dot 1, dash 3, gaps 1/3 and word space 7 dot-lengths
//!
//! ## Usage
//!
//! ```rust,ignore
//! use morse_beacon::array::BeaconArray;
//! use morse_beacon::beacon::Beacon;
//!
//! let mut beacons = BeaconArray::new([Beacon::new(key, inv, mode0, mode1)], 1);
//! loop {
//!     beacons.dispatch(&mut store, &sensors);
//!     beacons.tick(); // Call once per dot-length (100 ms at 12 WPM)
//! }
//! ```
//!
//! Or, use `run_beacon_tick_loop()` with a `DelayNs` implementation:
//!
//! ```rust,ignore
//! morse_beacon::timer::run_beacon_tick_loop(&mut beacons, &mut delay, 100_000, &mut store, &sensors);
//! ```
//!
//! ## Integration Notes
//!
//! - A dot-length is 100 ms at 12 WPM; drive the array from a faster timer with a
//!   matching `ticks_per_dot`
//! - Only one array instance should be active at a time in interrupt-driven mode
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    unused_extern_crates,
    unused_import_braces
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

#[macro_use]
mod fmt;

pub mod array;
pub mod beacon;
pub mod consts;
pub mod encoding;
pub mod error;
pub mod message;
pub mod sensors;
pub mod timer;

#[cfg(test)]
mod testing;
