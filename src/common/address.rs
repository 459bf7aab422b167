// src/common/address.rs

use super::error::ConfigurationError;
use core::convert::TryFrom;
use core::fmt;

/// A 7-bit I2C device address.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    /// Factory address of the SEN0322 (both address jumpers closed).
    pub const DEFAULT_ADDRESS: DeviceAddress = DeviceAddress(0x73);
    pub const MAX: u8 = 0x7F;

    /// Creates a new `DeviceAddress` if `address` fits in 7 bits.
    pub const fn new(address: u8) -> Result<Self, ConfigurationError> {
        if Self::is_valid(address) {
            Ok(DeviceAddress(address))
        } else {
            Err(ConfigurationError::InvalidAddress(address))
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_valid(address: u8) -> bool {
        address <= Self::MAX
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::DEFAULT_ADDRESS
    }
}

impl TryFrom<u8> for DeviceAddress {
    type Error = ConfigurationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceAddress> for u8 {
    fn from(value: DeviceAddress) -> Self {
        value.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

// Hex in logs, matching `Display`.
#[cfg(feature = "defmt")]
impl defmt::Format for DeviceAddress {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=u8:#x}", self.0)
    }
}
