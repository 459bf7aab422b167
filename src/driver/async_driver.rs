// src/driver/async_driver.rs

use super::{complete_poll, decode_frame, log_config, DriverConfig};
use crate::common::{
    registers::{Register, COLLECT_START, OXYGEN_FRAME_LEN},
    timing, ComponentStatus, ConfigurationError, DeviceAddress, DriverError, I2cAddressable,
    Instant, Measurement, RawReading, SensorState,
};
use core::time::Duration;
use embedded_hal::i2c::Error as _;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

/// Async counterpart of [`Sen0322`](super::Sen0322) for executors such as
/// embassy. The host task owns the timer and awaits `on_poll_tick` once per
/// `update_interval`.
#[derive(Debug)]
pub struct AsyncSen0322<I, D, T> {
    i2c: I,
    delay: D,
    config: DriverConfig,
    state: SensorState<T>,
    status: ComponentStatus,
}

impl<I, D, T> AsyncSen0322<I, D, T>
where
    I: I2c,
    D: DelayNs,
    T: Instant,
{
    pub fn new(i2c: I, delay: D, config: DriverConfig) -> Self {
        AsyncSen0322 {
            i2c,
            delay,
            config,
            state: SensorState::new(),
            status: ComponentStatus::Idle,
        }
    }

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

    pub async fn setup(&mut self) -> Result<(), DriverError<I::Error>> {
        log_info!("Setting up SEN0322 '{}'...", self.config.id());

        let address = self.config.address().as_u8();
        if let Err(e) = self
            .i2c
            .write(address, &[Register::CollectPhase.addr(), COLLECT_START])
            .await
        {
            log_error!("Failed to initialize sensor: {}", e.kind());
            self.status = ComponentStatus::Failed;
            return Err(DriverError::BusFailure(e));
        }

        self.delay
            .delay_us(timing::as_delay_us(timing::SETUP_SETTLE))
            .await;
        self.status = ComponentStatus::Ok;
        log_info!("SEN0322 setup complete");
        Ok(())
    }

    pub async fn on_poll_tick(&mut self, now: T) -> Result<Measurement, DriverError<I::Error>> {
        log_trace!("Updating SEN0322 sensor...");

        let result = match self.read_frame().await {
            Ok(raw) => decode_frame(&self.config, &raw),
            Err(e) => Err(e),
        };
        complete_poll(&self.config, &mut self.state, &mut self.status, result, now)
    }

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

    pub fn destroy(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    async fn read_frame(&mut self) -> Result<RawReading, DriverError<I::Error>> {
        let retries = self.config.max_retries();
        let mut attempt = 0;

        loop {
            match self.read_frame_once().await {
                Ok(raw) => return Ok(raw),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    log_debug!("Read attempt {} failed ({}), retrying", attempt, e.kind());
                    self.delay
                        .delay_us(timing::as_delay_us(timing::RETRY_BACKOFF))
                        .await;
                }
                Err(e) => return Err(DriverError::BusFailure(e)),
            }
        }
    }

    async fn read_frame_once(&mut self) -> Result<RawReading, I::Error> {
        let address = self.config.address().as_u8();
        let pointer = [Register::OxygenData.addr()];
        let mut frame = [0u8; OXYGEN_FRAME_LEN];

        let settle = self.config.conversion_delay();
        if settle.is_zero() {
            self.i2c.write_read(address, &pointer, &mut frame).await?;
        } else {
            self.i2c.write(address, &pointer).await?;
            self.delay.delay_us(timing::as_delay_us(settle)).await;
            self.i2c.read(address, &mut frame).await?;
        }

        Ok(RawReading(frame))
    }
}

impl<I, D, T> I2cAddressable for AsyncSen0322<I, D, T>
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
