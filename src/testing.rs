//! Probe pins for timing tests: shared, inspectable output levels.

use core::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::beacon::Beacon;

#[derive(Clone, Debug, Default)]
pub(crate) struct ProbePin(Arc<AtomicBool>);

impl ProbePin {
    pub(crate) fn is_high(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl ErrorType for ProbePin {
    type Error = Infallible;
}

impl OutputPin for ProbePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) type ProbeBeacon = Beacon<ProbePin, ProbePin, ProbePin>;

#[derive(Clone, Debug, Default)]
pub(crate) struct Probes {
    pub(crate) key: ProbePin,
    pub(crate) inv: ProbePin,
    pub(crate) mode0: ProbePin,
    pub(crate) mode1: ProbePin,
}

pub(crate) fn probe_beacon() -> (ProbeBeacon, Probes) {
    let probes = Probes::default();
    let beacon = Beacon::new(
        probes.key.clone(),
        probes.inv.clone(),
        probes.mode0.clone(),
        probes.mode1.clone(),
    );
    (beacon, probes)
}
