//! A fixed set of beacons ticked together.
//!
//! [`BeaconArray`] owns `N` independent [`Beacon`]s. Every dot-length it ticks each
//! enabled beacon once, in index order. Between ticks the caller runs
//! [`dispatch`](BeaconArray::dispatch), which asks a [`MessageSource`] for the text of
//! every beacon that has finished, compiles it and hands it over.
//!
//! Which text a beacon should send (default message, time slots, enable files) is
//! the message store's business; the array only sees the [`MessageSource`] trait.

use embedded_hal::digital::OutputPin;
use heapless::String;

use crate::beacon::Beacon;
use crate::consts::MESSAGE_TEXT_LEN;
use crate::error::EncodeError;
use crate::message::CompiledMessage;
use crate::sensors::SensorReadout;

/// Source text of one beacon message.
pub type MessageText = String<MESSAGE_TEXT_LEN>;

/// Supplies the text each beacon should send next.
pub trait MessageSource {
    /// Writes the text beacon `index` should send next into `dest` (which is empty
    /// on entry).
    ///
    /// Returns `false` when nothing is scheduled for this beacon.
    fn next_message(&mut self, index: usize, dest: &mut MessageText) -> bool;
}

/// `N` beacons driven from one periodic tick.
#[derive(Debug)]
pub struct BeaconArray<KEY, INV, MODE, const N: usize>
where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    /// The beacons, in tick order.
    pub beacons: [Beacon<KEY, INV, MODE>; N],
    ticks_per_dot: u16,
    tick_counter: u16,
    last_errors: [Option<EncodeError>; N],
}

impl<KEY, INV, MODE, const N: usize> BeaconArray<KEY, INV, MODE, N>
where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    /// Creates the array.
    ///
    /// # Arguments
    /// - `beacons`: the beacons, in tick order
    /// - `ticks_per_dot`: number of [`tick()`](BeaconArray::tick) calls per
    ///   dot-length, for when the tick source runs faster than the dot rate
    ///   (e.g. 100 for a 1 ms timer interrupt at 12 WPM). 0 is treated as 1.
    pub fn new(beacons: [Beacon<KEY, INV, MODE>; N], ticks_per_dot: u16) -> Self {
        Self {
            beacons,
            ticks_per_dot: ticks_per_dot.max(1),
            tick_counter: 0,
            last_errors: [None; N],
        }
    }

    /// Number of beacons.
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the array holds no beacons.
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Advances the tick divider, ticking every enabled beacon once per dot-length.
    pub fn tick(&mut self) {
        self.tick_counter += 1;
        if self.tick_counter >= self.ticks_per_dot {
            self.tick_counter = 0;
            for beacon in self.beacons.iter_mut().filter(|b| b.enabled()) {
                beacon.tick();
            }
        }
    }

    /// Compiles and hands over the next message of every enabled beacon that is
    /// done.
    ///
    /// A text that fails to compile is skipped; the error is kept for
    /// [`last_error`](BeaconArray::last_error) and the beacon is asked again on the
    /// next call.
    ///
    /// # Returns
    /// The number of beacons that received a new message.
    pub fn dispatch<M, S>(&mut self, source: &mut M, sensors: &S) -> usize
    where
        M: MessageSource + ?Sized,
        S: SensorReadout + ?Sized,
    {
        let mut text = MessageText::new();
        let mut dispatched = 0;
        for (index, beacon) in self.beacons.iter_mut().enumerate() {
            if !beacon.is_done() || !beacon.enabled() {
                continue;
            }
            text.clear();
            if !source.next_message(index, &mut text) || text.is_empty() {
                continue;
            }
            match CompiledMessage::compile(&text, sensors) {
                Ok(message) => {
                    debug!("beacon {}: sending \"{}\"", index, text.as_str());
                    beacon.set_next_message(message);
                    self.last_errors[index] = None;
                    dispatched += 1;
                }
                Err(err) => {
                    warn!("beacon {}: {}", index, err);
                    self.last_errors[index] = Some(err);
                }
            }
        }
        dispatched
    }

    /// The beacon at `index`.
    pub fn beacon(&self, index: usize) -> Option<&Beacon<KEY, INV, MODE>> {
        self.beacons.get(index)
    }

    /// The beacon at `index`, mutably.
    pub fn beacon_mut(&mut self, index: usize) -> Option<&mut Beacon<KEY, INV, MODE>> {
        self.beacons.get_mut(index)
    }

    /// Starts or stops beacon `index`. Returns `false` if there is no such beacon.
    pub fn set_enabled(&mut self, index: usize, on: bool) -> bool {
        match self.beacons.get_mut(index) {
            Some(beacon) => {
                beacon.set_enabled(on);
                true
            }
            None => false,
        }
    }

    /// Whether beacon `index` exists and is enabled.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.beacons.get(index).is_some_and(|b| b.enabled())
    }

    /// The compile error of the last message text offered for beacon `index`, if it
    /// failed.
    pub fn last_error(&self, index: usize) -> Option<EncodeError> {
        self.last_errors.get(index).copied().flatten()
    }

    /// Whether every beacon is done.
    pub fn all_done(&self) -> bool {
        self.beacons.iter().all(|b| b.is_done())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorBank;
    use crate::testing::{ProbePin, Probes, probe_beacon};

    /// Serves a fixed text per beacon, counting requests.
    struct FixedSource {
        texts: [Option<&'static str>; 2],
        requests: usize,
    }

    impl MessageSource for FixedSource {
        fn next_message(&mut self, index: usize, dest: &mut MessageText) -> bool {
            self.requests += 1;
            match self.texts[index] {
                Some(text) => dest.push_str(text).is_ok(),
                None => false,
            }
        }
    }

    fn pair(ticks_per_dot: u16) -> (BeaconArray<ProbePin, ProbePin, ProbePin, 2>, [Probes; 2]) {
        let (b0, p0) = probe_beacon();
        let (b1, p1) = probe_beacon();
        (BeaconArray::new([b0, b1], ticks_per_dot), [p0, p1])
    }

    #[test]
    fn test_dispatch_only_to_done_beacons() {
        let (mut array, probes) = pair(1);
        let sensors = SensorBank::new();
        let mut source = FixedSource {
            texts: [Some("E"), None],
            requests: 0,
        };

        assert_eq!(array.dispatch(&mut source, &sensors), 1);
        assert_eq!(source.requests, 2);
        assert!(!array.all_done());

        array.tick();
        assert!(probes[0].key.is_high());
        assert!(!probes[1].key.is_high());

        // Busy beacon is not asked again.
        assert_eq!(array.dispatch(&mut source, &sensors), 0);
        assert_eq!(source.requests, 3);

        for _ in 0..5 {
            array.tick();
        }
        assert!(array.all_done());
        assert_eq!(array.beacon(0).map(|b| b.messages_sent), Some(1));
        assert_eq!(array.dispatch(&mut source, &sensors), 1);
    }

    #[test]
    fn test_compile_error_is_recorded() {
        let (mut array, _probes) = pair(1);
        let sensors = SensorBank::new();
        let mut source = FixedSource {
            texts: [Some("HI!"), Some("$P4")],
            requests: 0,
        };
        assert_eq!(array.dispatch(&mut source, &sensors), 0);
        assert_eq!(
            array.last_error(0),
            Some(EncodeError::Unencodable {
                character: '!',
                position: 2
            })
        );
        assert_eq!(array.last_error(1), Some(EncodeError::PowerMode { position: 2 }));
        assert_eq!(array.last_error(2), None);
        assert!(array.all_done());

        source.texts[0] = Some("HI");
        assert_eq!(array.dispatch(&mut source, &sensors), 1);
        assert_eq!(array.last_error(0), None);
    }

    #[test]
    fn test_disabled_beacons_are_skipped() {
        let (mut array, probes) = pair(1);
        let sensors = SensorBank::new();
        let mut source = FixedSource {
            texts: [Some("T"), Some("T")],
            requests: 0,
        };
        assert!(array.set_enabled(1, false));
        assert!(!array.set_enabled(5, false));
        assert!(array.is_enabled(0));
        assert!(!array.is_enabled(1));
        assert!(!array.is_enabled(5));

        assert_eq!(array.dispatch(&mut source, &sensors), 1);
        array.tick();
        assert!(probes[0].key.is_high());
        assert!(!probes[1].key.is_high());
        assert!(!probes[1].inv.is_high());
    }

    #[test]
    fn test_disabling_mid_message() {
        let (mut array, probes) = pair(1);
        let sensors = SensorBank::new();
        let mut source = FixedSource {
            texts: [Some("$+9"), None],
            requests: 0,
        };
        let _ = array.dispatch(&mut source, &sensors);
        array.tick();
        array.tick();
        assert!(probes[0].key.is_high());
        let _ = array.set_enabled(0, false);
        assert!(!probes[0].key.is_high());
        assert!(!probes[0].inv.is_high());
        assert!(array.all_done());
    }

    #[test]
    fn test_tick_divider() {
        let (mut array, probes) = pair(3);
        let sensors = SensorBank::new();
        let mut source = FixedSource {
            texts: [Some("E"), Some("E")],
            requests: 0,
        };
        assert_eq!(array.dispatch(&mut source, &sensors), 2);
        array.tick();
        array.tick();
        assert!(!probes[0].key.is_high());
        array.tick();
        assert!(probes[0].key.is_high());
        assert!(probes[1].key.is_high());
        // The dot ends one dot-length later.
        array.tick();
        array.tick();
        assert!(probes[0].key.is_high());
        array.tick();
        assert!(!probes[0].key.is_high());
        assert_eq!(array.len(), 2);
    }
}
