// src/common/mod.rs

// Macros first so every later module can use them.
#[macro_use]
mod logging;

// --- Declare all public modules within common ---
pub mod address;
pub mod decode;
pub mod error;
pub mod hal_traits;
pub mod registers;
pub mod timing;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// --- Re-export key types/traits/functions for easier access ---

// From address.rs
pub use address::DeviceAddress;

// From decode.rs
pub use decode::{decode, Calibration, DecodeMode, RawReading, ValidRange};

// From error.rs
pub use error::{ConfigurationError, DecodeError, DriverError, RegistryError};

// From hal_traits.rs
pub use hal_traits::{I2cAddressable, Instant, Schedulable};

// From registers.rs
pub use registers::Register;

// From types.rs
pub use types::{
    ComponentStatus, Measurement, SensorMetadata, SensorState, SetupPriority, StateClass,
};
