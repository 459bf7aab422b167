// src/common/hal_traits.rs

use super::address::DeviceAddress;
use super::types::{ComponentStatus, SetupPriority};
use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A monotonic point in time supplied by the host.
///
/// Blanket-implemented, so `core::time::Duration` (time since boot) works
/// out of the box, as does any HAL instant type with these operators.
pub trait Instant:
    Copy + Ord + Debug + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> Instant for T where
    T: Copy + Ord + Debug + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

/// A component driven by a host scheduler.
///
/// The component never owns a timer. The scheduler calls `setup` once, then
/// `on_tick` every `update_interval` while `status` is not `Failed`.
pub trait Schedulable<T: Instant> {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn setup_priority(&self) -> SetupPriority {
        SetupPriority::DATA
    }

    fn update_interval(&self) -> Duration;

    /// One-time initialisation. Must leave `status` as `Failed` on error.
    fn setup(&mut self);

    /// Periodic work. Must not panic on I/O errors.
    fn on_tick(&mut self, now: T);

    fn status(&self) -> ComponentStatus;
}

/// A peripheral that sits at a fixed address on an I2C bus.
pub trait I2cAddressable {
    /// Bus handle type (usually a shared-bus device).
    type Bus;

    fn address(&self) -> DeviceAddress;

    /// Gives the bus handle back, destroying the driver.
    fn release(self) -> Self::Bus
    where
        Self: Sized;
}
