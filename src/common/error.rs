// src/common/error.rs

use super::address::DeviceAddress;

/// Rejected configuration. Raised before a driver exists, so it is always fatal
/// for the component it describes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Address does not fit in 7 bits.
    #[error("Invalid I2C address: {0:#04x} (must be 0x00..=0x7f)")]
    InvalidAddress(u8),

    /// Poll interval is zero.
    #[error("Update interval must be positive")]
    InvalidInterval,

    /// A time period string could not be parsed (e.g. "60s", "500ms").
    #[error("Invalid time period")]
    InvalidTimePeriod,

    /// Scale factor is zero or not finite, or the offset is not finite.
    #[error("Invalid calibration: scale must be finite and non-zero")]
    InvalidCalibration,

    /// Plausibility window is empty or not finite.
    #[error("Invalid valid range: min must be below max")]
    InvalidRange,

    /// The staleness threshold must be at least one failed poll.
    #[error("Failure threshold must be at least 1")]
    InvalidFailureThreshold,

    /// At most one retry per poll is allowed.
    #[error("Too many retries: {0} (max 1)")]
    TooManyRetries(u8),

    /// The register settle delay would block the host loop for too long.
    #[error("Conversion delay too long")]
    ConversionDelayTooLong,

    /// Component id is empty or too long.
    #[error("Invalid component id")]
    InvalidId,
}

/// Reasons a raw frame could not be turned into a measurement.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Frame is all 0xFF, i.e. nobody drove the bus.
    #[error("Malformed frame")]
    Malformed,

    /// Calibration produced NaN or infinity.
    #[error("Decoded value is not finite")]
    NonFinite,

    /// Value outside the configured plausibility window.
    #[error("Reading out of range: raw {raw:#06x}, {centi_percent} centi-percent")]
    OutOfRange { raw: u16, centi_percent: i32 },
}

/// Per-tick driver failure. Never fatal; the last good state is kept.
#[derive(Debug, thiserror::Error)]
pub enum DriverError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying bus error (timeout, NACK, arbitration loss...).
    #[error("Bus failure: {0:?}")]
    BusFailure(E),

    /// Bus transaction succeeded but the payload was unusable.
    #[error("Decode failure: {0}")]
    DecodeFailure(DecodeError),
}

impl<E: core::fmt::Debug> From<DecodeError> for DriverError<E> {
    fn from(e: DecodeError) -> Self {
        DriverError::DecodeFailure(e)
    }
}

impl<E: core::fmt::Debug> DriverError<E> {
    /// `true` for failures a second attempt within the same poll might fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DriverError::BusFailure(_))
    }
}

/// Failures while wiring components together at build time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Another device already claimed this address on the same bus.
    #[error("Address {address} already in use on bus {bus}")]
    AddressInUse { bus: u8, address: DeviceAddress },

    #[error("Bus registry is full")]
    BusRegistryFull,

    #[error("Scheduler is full")]
    SchedulerFull,
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_only_bus_failures_are_retryable() {
        let bus: DriverError<u8> = DriverError::BusFailure(7);
        let decode: DriverError<u8> = DecodeError::Malformed.into();
        assert!(bus.is_retryable());
        assert!(!decode.is_retryable());
        assert!(matches!(decode, DriverError::DecodeFailure(DecodeError::Malformed)));
    }

    #[test]
    fn test_messages_include_context() {
        let mut s = arrayvec::ArrayString::<64>::new();
        write!(s, "{}", ConfigurationError::InvalidAddress(0x80)).unwrap();
        assert_eq!(s.as_str(), "Invalid I2C address: 0x80 (must be 0x00..=0x7f)");

        s.clear();
        let err = RegistryError::AddressInUse {
            bus: 1,
            address: DeviceAddress::DEFAULT_ADDRESS,
        };
        write!(s, "{}", err).unwrap();
        assert_eq!(s.as_str(), "Address 0x73 already in use on bus 1");
    }
}
