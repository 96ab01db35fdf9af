/// Declares a static global `BEACON_ARRAY` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `BEACON_ARRAY` suitable for use in
/// interrupt-based environments, where both the main loop and an ISR need
/// to safely access the shared beacons.
///
/// # Arguments
/// - `$key`: The concrete type of the key pins (must implement `OutputPin`)
/// - `$inv`: The concrete type of the inverted key pins (must implement `OutputPin`)
/// - `$mode`: The concrete type of the power mode pins (must implement `OutputPin`)
/// - `$n`: The number of beacons
///
/// # Example
/// ```rust,ignore
/// init_beacon_array!(MyKeyPin, MyInvPin, MyModePin, 9);
/// ```
#[macro_export]
macro_rules! init_beacon_array {
    ( $key:ty, $inv:ty, $mode:ty, $n:expr ) => {
        pub static BEACON_ARRAY: $crate::timer::GlobalBeaconArray<$key, $inv, $mode, { $n }> =
            $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Stores a beacon array in the global `BEACON_ARRAY`.
///
/// # Arguments
/// - `$array`: The `BeaconArray` to install
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     setup_beacon_array!(BeaconArray::new(beacons, 100));
/// }
/// ```
///
/// # Notes
/// - Must be called inside a critical section-aware context (safe in `main()`).
/// - Requires `init_beacon_array!` to have been used earlier.
#[macro_export]
macro_rules! setup_beacon_array {
    ( $array:expr ) => {
        $crate::critical_section::with(|cs| {
            let _ = BEACON_ARRAY.borrow(cs).replace(Some($array));
        });
    };
}

/// Calls `tick()` on the global `BEACON_ARRAY` if it has been initialized.
///
/// This macro is intended to be invoked from a timer ISR to advance the beacons
/// at regular intervals (e.g., every 1 ms with `ticks_per_dot` of 100).
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     tick_beacon_timer!();
/// }
/// ```
///
/// # Notes
/// - This macro assumes `BEACON_ARRAY` was declared with `init_beacon_array!`
///   and initialized via `setup_beacon_array!`.
/// - Safe to call repeatedly; does nothing if the array hasn't been set up yet.
#[macro_export]
macro_rules! tick_beacon_timer {
    () => {
        $crate::critical_section::with(|cs| {
            if let Some(array) = BEACON_ARRAY.borrow(cs).borrow_mut().as_mut() {
                array.tick();
            }
        });
    };
}

/// Hands new messages to the finished beacons of the global `BEACON_ARRAY`.
///
/// Evaluates to the number of beacons that received a message (0 before setup).
///
/// # Example
/// ```rust,ignore
/// loop {
///     dispatch_beacons!(&mut store, &sensors);
/// }
/// ```
#[macro_export]
macro_rules! dispatch_beacons {
    ( $source:expr, $sensors:expr ) => {
        $crate::critical_section::with(|cs| {
            BEACON_ARRAY
                .borrow(cs)
                .borrow_mut()
                .as_mut()
                .map_or(0, |array| array.dispatch($source, $sensors))
        })
    };
}
