// src/lib.rs

#![no_std] // Specify no_std at the crate root

#[macro_use]
pub mod common;
pub mod driver;
pub mod scheduler;

// Re-export key types for convenience
pub use common::{ConfigurationError, DeviceAddress, DriverError, Measurement, SensorState};
pub use driver::{DriverConfig, Sen0322};
pub use scheduler::{build_sensor, BusRegistry, PollingScheduler};

#[cfg(feature = "async")]
pub use driver::AsyncSen0322;
