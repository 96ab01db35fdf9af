use crate::array::{BeaconArray, MessageSource};
use crate::sensors::SensorReadout;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Runs a blocking loop that dispatches messages and ticks the beacon array.
///
/// This is a simple timing loop for use in environments where interrupts are unavailable
/// or undesired. Each round hands new messages to finished beacons, ticks the array once
/// and then waits `tick_us` microseconds using a delay provider implementing
/// `embedded_hal::delay::DelayNs`.
///
/// # Arguments
/// - `array`: A mutable reference to a `BeaconArray` instance.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `tick_us`: The delay between each tick call, in microseconds (e.g. 100_000 for one
///   tick per dot at 12 WPM with `ticks_per_dot` of 1).
/// - `source`: Supplies the message text of each beacon.
/// - `sensors`: Readings substituted for `$A`/`$T` directives.
///
/// # Example
/// ```rust,ignore
/// use morse_beacon::timer::run_beacon_tick_loop;
/// let mut array = BeaconArray::new([beacon], 1);
/// run_beacon_tick_loop(&mut array, &mut delay, 100_000, &mut store, &sensors);
/// ```
///
/// # Notes
/// - This loop will never return; it is intended for single-purpose polling firmware.
/// - The time spent compiling messages adds to each tick, so keep `tick_us` well above it
///   or prefer interrupt-driven tick scheduling.
pub fn run_beacon_tick_loop<D, KEY, INV, MODE, M, S, const N: usize>(
    array: &mut BeaconArray<KEY, INV, MODE, N>,
    delay: &mut D,
    tick_us: u32,
    source: &mut M,
    sensors: &S,
) -> !
where
    D: DelayNs,
    KEY: OutputPin,
    INV: OutputPin,
    MODE: OutputPin,
    M: MessageSource + ?Sized,
    S: SensorReadout + ?Sized,
{
    info!("beacon tick loop: {} beacons, tick {} us", N, tick_us);
    loop {
        let _ = array.dispatch(source, sensors);
        array.tick();
        delay.delay_us(tick_us);
    }
}
