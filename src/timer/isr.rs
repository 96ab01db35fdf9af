use crate::array::{BeaconArray, MessageSource};
use crate::sensors::SensorReadout;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// A beacon array shared between the main loop and a timer interrupt.
pub type GlobalBeaconArray<KEY, INV, MODE, const N: usize> =
    Mutex<RefCell<Option<BeaconArray<KEY, INV, MODE, N>>>>;

/// Used to initialize the global static `BeaconArray` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// use morse_beacon::timer::{GlobalBeaconArray, global_beacon_array_init};
/// use some_hal::{KeyPin, InvPin, ModePin};
///
/// static BEACONS: GlobalBeaconArray<KeyPin, InvPin, ModePin, 9> =
///     global_beacon_array_init();
/// ```
pub const fn global_beacon_array_init<KEY, INV, MODE, const N: usize>()
-> GlobalBeaconArray<KEY, INV, MODE, N>
where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    Mutex::new(RefCell::new(None))
}

/// Stores `array` in the global, replacing (and dropping) any previous one.
///
/// # Arguments
/// * The global static `BeaconArray`
/// * The array to install. Its `ticks_per_dot` must match the interrupt frequency:
///     `interrupt frequency / ticks per dot = 10 dots per second` at 12 WPM,
///     e.g. 100 for a 1 ms timer interrupt
///
///# Example
/// ```rust,ignore
/// fn main() {
///     global_beacon_array_setup(&BEACONS, BeaconArray::new(beacons, 100));
/// }
/// ```
pub fn global_beacon_array_setup<KEY, INV, MODE, const N: usize>(
    global_array: &'static GlobalBeaconArray<KEY, INV, MODE, N>,
    array: BeaconArray<KEY, INV, MODE, N>,
) where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    critical_section::with(|cs| {
        let _ = global_array.borrow(cs).replace(Some(array));
    });
}

/// Runs the tick at each interrupt
///
/// # Arguments
/// * The global static `BeaconArray`
///# Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     global_beacon_timer_tick(&BEACONS);
/// }
/// ```
pub fn global_beacon_timer_tick<KEY, INV, MODE, const N: usize>(
    global_array: &'static GlobalBeaconArray<KEY, INV, MODE, N>,
) where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    critical_section::with(|cs| {
        if let Some(array) = global_array.borrow(cs).borrow_mut().as_mut() {
            array.tick();
        }
    });
}

/// Hands new messages to every finished beacon of the global array.
///
/// Called from the main loop. Message compilation runs inside the critical section,
/// which is short compared to a dot-length.
///
/// # Returns
/// * The number of beacons that received a message, 0 if the array is not set up
pub fn global_beacon_dispatch<KEY, INV, MODE, M, S, const N: usize>(
    global_array: &'static GlobalBeaconArray<KEY, INV, MODE, N>,
    source: &mut M,
    sensors: &S,
) -> usize
where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
    M: MessageSource + ?Sized,
    S: SensorReadout + ?Sized,
{
    critical_section::with(|cs| {
        global_array
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .map_or(0, |array| array.dispatch(source, sensors))
    })
}

/// Runs `f` on the global array, if it has been set up.
///
/// For control operations from the main loop such as enabling a beacon or reading
/// its last compile error.
pub fn global_beacon_array_with<KEY, INV, MODE, R, const N: usize>(
    global_array: &'static GlobalBeaconArray<KEY, INV, MODE, N>,
    f: impl FnOnce(&mut BeaconArray<KEY, INV, MODE, N>) -> R,
) -> Option<R>
where
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
{
    critical_section::with(|cs| global_array.borrow(cs).borrow_mut().as_mut().map(f))
}
