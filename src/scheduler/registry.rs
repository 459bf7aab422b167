// src/scheduler/registry.rs

use crate::common::{DeviceAddress, Instant, RegistryError};
use crate::driver::{DriverConfig, Sen0322};
use arrayvec::ArrayVec;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Address claims per bus, built up while the firmware is assembled.
///
/// Passed explicitly to whoever constructs devices; two devices claiming the
/// same address on the same bus is a build error, not a runtime collision.
#[derive(Debug, Default)]
pub struct BusRegistry<const N: usize> {
    claims: ArrayVec<(u8, DeviceAddress), N>,
}

impl<const N: usize> BusRegistry<N> {
    pub fn new() -> Self {
        BusRegistry {
            claims: ArrayVec::new(),
        }
    }

    /// Registers `address` as a consumer of bus `bus`.
    pub fn claim(&mut self, bus: u8, address: DeviceAddress) -> Result<(), RegistryError> {
        if self.is_claimed(bus, address) {
            return Err(RegistryError::AddressInUse { bus, address });
        }
        self.claims
            .try_push((bus, address))
            .map_err(|_| RegistryError::BusRegistryFull)
    }

    pub fn is_claimed(&self, bus: u8, address: DeviceAddress) -> bool {
        self.claims.contains(&(bus, address))
    }

    /// Drops a claim, e.g. after a device was destroyed. Returns whether it existed.
    pub fn release(&mut self, bus: u8, address: DeviceAddress) -> bool {
        match self.claims.iter().position(|c| *c == (bus, address)) {
            Some(i) => {
                self.claims.remove(i);
                true
            }
            None => false,
        }
    }

    /// Addresses claimed on `bus`, in claim order.
    pub fn devices_on(&self, bus: u8) -> impl Iterator<Item = DeviceAddress> + '_ {
        self.claims
            .iter()
            .filter(move |(b, _)| *b == bus)
            .map(|(_, a)| *a)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Turns a validated configuration into a driver bound to bus `bus`.
///
/// The caller then hands the driver to a
/// [`PollingScheduler`](super::PollingScheduler) for periodic ticks.
pub fn build_sensor<I, D, T, const N: usize>(
    config: DriverConfig,
    bus: u8,
    i2c: I,
    delay: D,
    registry: &mut BusRegistry<N>,
) -> Result<Sen0322<I, D, T>, RegistryError>
where
    I: I2c,
    D: DelayNs,
    T: Instant,
{
    registry.claim(bus, config.address())?;
    log_debug!("Registered '{}' at {} on bus {}", config.id(), config.address(), bus);
    Ok(Sen0322::new(i2c, delay, config))
}
