// src/driver/mod.rs

pub mod config;
mod transaction;

#[cfg(feature = "async")]
pub mod async_driver;

pub use config::{parse_time_period, DriverConfig, DriverConfigBuilder};

#[cfg(feature = "async")]
pub use async_driver::AsyncSen0322;

use crate::common::{
    decode,
    registers::{Register, COLLECT_START},
    timing, ComponentStatus, ConfigurationError, DeviceAddress, DriverError, I2cAddressable,
    Instant, Measurement, RawReading, Schedulable, SensorState,
};
use core::time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, Error as _, I2c};

/// Polling driver for the SEN0322 oxygen sensor.
///
/// `I` is the bus handle. To share one physical bus between several devices
/// pass a shared-bus device (e.g. `embedded_hal_bus::i2c::RefCellDevice`);
/// every I2C transaction then locks the bus only for its own duration.
///
/// `T` is the host's monotonic instant type, used to timestamp readings.
#[derive(Debug)]
pub struct Sen0322<I, D, T> {
    i2c: I,
    delay: D,
    config: DriverConfig,
    state: SensorState<T>,
    status: ComponentStatus,
}

impl<I, D, T> Sen0322<I, D, T>
where
    I: I2c,
    D: DelayNs,
    T: Instant,
{
    /// Creates a driver from an already validated configuration.
    pub fn new(i2c: I, delay: D, config: DriverConfig) -> Self {
        Sen0322 {
            i2c,
            delay,
            config,
            state: SensorState::new(),
            status: ComponentStatus::Idle,
        }
    }

    /// Creates a driver at `address` polling every `poll_interval`, all other
    /// settings at their defaults.
    pub fn try_new(
        i2c: I,
        delay: D,
        address: u8,
        poll_interval: Duration,
    ) -> Result<Self, ConfigurationError> {
        let config = DriverConfig::builder()
            .address(address)
            .update_interval(poll_interval)
            .build()?;
        Ok(Self::new(i2c, delay, config))
    }

    /// Arms continuous collection. On failure the component is marked
    /// `Failed` and a scheduler will not tick it.
    pub fn setup(&mut self) -> Result<(), DriverError<I::Error>> {
        log_info!("Setting up SEN0322 '{}'...", self.config.id());

        let address = self.config.address().as_u8();
        if let Err(e) = self
            .i2c
            .write(address, &[Register::CollectPhase.addr(), COLLECT_START])
        {
            log_error!("Failed to initialize sensor: {}", e.kind());
            self.status = ComponentStatus::Failed;
            return Err(DriverError::BusFailure(e));
        }

        self.delay.delay_us(timing::as_delay_us(timing::SETUP_SETTLE));
        self.status = ComponentStatus::Ok;
        log_info!("SEN0322 setup complete");
        Ok(())
    }

    /// Performs one poll: read, decode, publish.
    ///
    /// Errors are returned, never raised; on error the published value and
    /// timestamp are left as they were.
    pub fn on_poll_tick(&mut self, now: T) -> Result<Measurement, DriverError<I::Error>> {
        log_trace!("Updating SEN0322 sensor...");

        let result = self
            .read_frame()
            .and_then(|raw| decode_frame(&self.config, &raw));
        complete_poll(&self.config, &mut self.state, &mut self.status, result, now)
    }

    /// Last published state. Side-effect free.
    pub fn current_state(&self) -> SensorState<T> {
        self.state
    }

    pub fn status(&self) -> ComponentStatus {
        self.status
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Logs the configuration at info level.
    pub fn dump_config(&self) {
        log_config(&self.config, self.status);
    }

    /// Destroys the driver, returning the bus handle and delay.
    pub fn destroy(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

/// Config dump shared by the blocking and async drivers. The address is
/// logged through `DeviceAddress` so it renders in hex.
pub(crate) fn log_config(config: &DriverConfig, status: ComponentStatus) {
    let meta = config.metadata();
    log_info!("SEN0322 Oxygen Sensor '{}':", config.id());
    log_info!("  Address: {}", config.address());
    log_info!(
        "  Update Interval: {}ms",
        config.update_interval().as_millis() as u64
    );
    log_info!(
        "  Unit: '{}', Accuracy: {} decimals",
        meta.unit_of_measurement,
        meta.accuracy_decimals
    );
    if status.is_failed() {
        log_error!("Communication with SEN0322 failed!");
    }
}

/// Decodes a frame with the configured calibration.
pub(crate) fn decode_frame<E: i2c::Error>(
    config: &DriverConfig,
    raw: &RawReading,
) -> Result<Measurement, DriverError<E>> {
    log_debug!("Raw data: {:#x}", raw.0);
    let measurement = decode::decode(
        raw,
        config.calibration(),
        config.decode_mode(),
        config.valid_range(),
    )?;
    Ok(measurement)
}

/// Publishes a successful poll or books a failed one. Shared by the blocking
/// and async drivers.
pub(crate) fn complete_poll<T: Instant, E: i2c::Error>(
    config: &DriverConfig,
    state: &mut SensorState<T>,
    status: &mut ComponentStatus,
    result: Result<Measurement, DriverError<E>>,
    now: T,
) -> Result<Measurement, DriverError<E>> {
    match result {
        Ok(measurement) => {
            state.record_success(measurement, now);
            if !status.is_failed() {
                *status = ComponentStatus::Ok;
            }
            log_debug!("Got oxygen concentration: {}%", measurement.as_percent());
            Ok(measurement)
        }
        Err(e) => {
            match &e {
                DriverError::BusFailure(bus) => {
                    log_warn!("Failed to read oxygen data: {}", bus.kind());
                }
                DriverError::DecodeFailure(err) => {
                    log_warn!("Invalid oxygen reading: {}", err);
                }
            }
            if !status.is_failed() {
                *status = ComponentStatus::Warning;
            }
            if state.record_failure(config.failure_threshold()) {
                log_warn!(
                    "SEN0322 '{}' reading stale after {} failed polls",
                    config.id(),
                    state.consecutive_failures()
                );
            }
            Err(e)
        }
    }
}

impl<I, D, T> Schedulable<T> for Sen0322<I, D, T>
where
    I: I2c,
    D: DelayNs,
    T: Instant,
{
    fn name(&self) -> &str {
        self.config.id()
    }

    fn update_interval(&self) -> Duration {
        self.config.update_interval()
    }

    fn setup(&mut self) {
        // Outcome is carried by `status`.
        let _ = Sen0322::setup(self);
    }

    fn on_tick(&mut self, now: T) {
        let _ = self.on_poll_tick(now);
    }

    fn status(&self) -> ComponentStatus {
        self.status
    }
}

impl<I, D, T> I2cAddressable for Sen0322<I, D, T>
where
    I: I2c,
    D: DelayNs,
    T: Instant,
{
    type Bus = I;

    fn address(&self) -> DeviceAddress {
        self.config.address()
    }

    fn release(self) -> I {
        self.i2c
    }
}
