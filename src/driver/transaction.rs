// src/driver/transaction.rs

use super::Sen0322;
use crate::common::{
    registers::{Register, OXYGEN_FRAME_LEN},
    timing, DriverError, RawReading,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};

impl<I, D, T> Sen0322<I, D, T>
where
    I: I2c,
    D: DelayNs,
{
    /// Reads one oxygen frame, retrying bus failures up to `max_retries` times.
    pub(super) fn read_frame(&mut self) -> Result<RawReading, DriverError<I::Error>> {
        let retries = self.config.max_retries();
        let mut attempt = 0;

        loop {
            match self.read_frame_once() {
                Ok(raw) => return Ok(raw),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    log_debug!("Read attempt {} failed ({}), retrying", attempt, e.kind());
                    self.delay.delay_us(timing::as_delay_us(timing::RETRY_BACKOFF));
                }
                Err(e) => return Err(DriverError::BusFailure(e)),
            }
        }
    }

    /// Addresses the data register and reads the frame.
    ///
    /// Each bus transaction is atomic on its own. With a conversion delay the
    /// bus is released while the sensor settles, so other devices sharing it
    /// are not held off.
    fn read_frame_once(&mut self) -> Result<RawReading, I::Error> {
        let address = self.config.address().as_u8();
        let pointer = [Register::OxygenData.addr()];
        let mut frame = [0u8; OXYGEN_FRAME_LEN];

        let settle = self.config.conversion_delay();
        if settle.is_zero() {
            self.i2c.write_read(address, &pointer, &mut frame)?;
        } else {
            self.i2c.write(address, &pointer)?;
            self.delay.delay_us(timing::as_delay_us(settle));
            self.i2c.read(address, &mut frame)?;
        }

        Ok(RawReading(frame))
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::{MockDelay, MockI2c, MockI2cError, Txn};
    use crate::driver::DriverConfig;
    use core::time::Duration;
    use heapless::Vec;

    fn txn(written: &[u8], read_len: usize) -> Txn {
        Txn {
            addr: 0x73,
            written: Vec::from_slice(written).unwrap(),
            read_len,
        }
    }

    fn driver(
        i2c: MockI2c,
        config: DriverConfig,
    ) -> Sen0322<MockI2c, MockDelay, Duration> {
        Sen0322::new(i2c, MockDelay::new(), config)
    }

    #[test]
    fn test_read_addresses_register_then_reads_three_bytes() {
        let mut i2c = MockI2c::new();
        i2c.push_frame([0x08, 0x2A, 0x00]);
        let mut sensor = driver(i2c, DriverConfig::default());

        let raw = sensor.read_frame().unwrap();
        assert_eq!(raw, RawReading([0x08, 0x2A, 0x00]));
        assert_eq!(sensor.i2c.log.as_slice(), &[txn(&[0x03], 0), txn(&[], 3)]);
        assert_eq!(sensor.delay.total_ms(), 50);
    }

    #[test]
    fn test_zero_conversion_delay_uses_single_write_read() {
        let mut i2c = MockI2c::new();
        i2c.push_frame([0x08, 0x2A, 0x00]);
        let config = DriverConfig::builder()
            .conversion_delay(Duration::ZERO)
            .build()
            .unwrap();
        let mut sensor = driver(i2c, config);

        sensor.read_frame().unwrap();
        assert_eq!(sensor.i2c.log.as_slice(), &[txn(&[0x03], 3)]);
        assert_eq!(sensor.delay.total_ns, 0);
    }

    #[test]
    fn test_single_retry_recovers_nack() {
        let mut i2c = MockI2c::new();
        i2c.push_read_error(MockI2cError::NACK);
        i2c.push_frame([0x07, 0xD0, 0x00]);
        let mut sensor = driver(i2c, DriverConfig::default());

        assert_eq!(sensor.read_frame().unwrap(), RawReading([0x07, 0xD0, 0x00]));
        assert_eq!(sensor.i2c.log.len(), 4);
        // Two conversion waits plus one back-off.
        assert_eq!(sensor.delay.total_ms(), 105);
    }

    #[test]
    fn test_retries_are_bounded() {
        let mut i2c = MockI2c::new();
        i2c.push_read_error(MockI2cError::TIMEOUT);
        i2c.push_read_error(MockI2cError::TIMEOUT);
        i2c.push_frame([0x07, 0xD0, 0x00]);
        let mut sensor = driver(i2c, DriverConfig::default());

        assert!(matches!(
            sensor.read_frame(),
            Err(DriverError::BusFailure(MockI2cError::TIMEOUT))
        ));
        // The good frame is left for the next poll.
        assert_eq!(sensor.i2c.pending_reads(), 1);
    }

    #[test]
    fn test_no_retry_when_disabled() {
        let mut i2c = MockI2c::new();
        i2c.push_write_error(MockI2cError::NACK);
        let config = DriverConfig::builder().max_retries(0).build().unwrap();
        let mut sensor = driver(i2c, config);

        assert!(matches!(sensor.read_frame(), Err(DriverError::BusFailure(_))));
        assert_eq!(sensor.i2c.log.as_slice(), &[txn(&[0x03], 0)]);
    }
}
