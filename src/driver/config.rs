// src/driver/config.rs

use crate::common::{
    timing, Calibration, ConfigurationError, DecodeMode, DeviceAddress, SensorMetadata,
    ValidRange,
};
use arrayvec::ArrayString;
use core::str::FromStr;
use core::time::Duration;

/// Maximum length of a component id.
pub const MAX_ID_LEN: usize = 32;

pub const DEFAULT_ID: &str = "sen0322";

/// Validated driver configuration. Only obtainable through
/// [`DriverConfigBuilder::build`] or [`DriverConfig::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    id: ArrayString<MAX_ID_LEN>,
    address: DeviceAddress,
    update_interval: Duration,
    calibration: Calibration,
    valid_range: ValidRange,
    decode_mode: DecodeMode,
    failure_threshold: u16,
    max_retries: u8,
    conversion_delay: Duration,
}

impl DriverConfig {
    pub fn builder<'a>() -> DriverConfigBuilder<'a> {
        DriverConfigBuilder::new()
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn valid_range(&self) -> &ValidRange {
        &self.valid_range
    }

    pub fn decode_mode(&self) -> DecodeMode {
        self.decode_mode
    }

    pub fn failure_threshold(&self) -> u16 {
        self.failure_threshold
    }

    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    pub fn conversion_delay(&self) -> Duration {
        self.conversion_delay
    }

    /// Publishing attributes; fixed for this sensor.
    pub fn metadata(&self) -> SensorMetadata {
        SensorMetadata::OXYGEN
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            id: ArrayString::from(DEFAULT_ID).unwrap_or_default(),
            address: DeviceAddress::DEFAULT_ADDRESS,
            update_interval: timing::DEFAULT_UPDATE_INTERVAL,
            calibration: Calibration::DEFAULT,
            valid_range: ValidRange::DEFAULT,
            decode_mode: DecodeMode::Strict,
            failure_threshold: timing::DEFAULT_FAILURE_THRESHOLD,
            max_retries: timing::DEFAULT_RETRIES,
            conversion_delay: timing::DEFAULT_CONVERSION_DELAY,
        }
    }
}

/// Collects raw, unvalidated values. `build` checks all of them at once.
#[derive(Debug, Clone)]
pub struct DriverConfigBuilder<'a> {
    id: &'a str,
    address: u8,
    update_interval: Duration,
    scale: f32,
    offset: f32,
    valid_range: (f32, f32),
    decode_mode: DecodeMode,
    failure_threshold: u16,
    max_retries: u8,
    conversion_delay: Duration,
}

impl<'a> DriverConfigBuilder<'a> {
    pub fn new() -> Self {
        DriverConfigBuilder {
            id: DEFAULT_ID,
            address: DeviceAddress::DEFAULT_ADDRESS.as_u8(),
            update_interval: timing::DEFAULT_UPDATE_INTERVAL,
            scale: Calibration::DEFAULT.scale,
            offset: Calibration::DEFAULT.offset,
            valid_range: (ValidRange::DEFAULT.min(), ValidRange::DEFAULT.max()),
            decode_mode: DecodeMode::Strict,
            failure_threshold: timing::DEFAULT_FAILURE_THRESHOLD,
            max_retries: timing::DEFAULT_RETRIES,
            conversion_delay: timing::DEFAULT_CONVERSION_DELAY,
        }
    }

    pub fn id(mut self, id: &'a str) -> Self {
        self.id = id;
        self
    }

    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Like [`update_interval`](Self::update_interval) but parses strings such as `"60s"`.
    pub fn update_interval_str(mut self, period: &str) -> Result<Self, ConfigurationError> {
        self.update_interval = parse_time_period(period)?;
        Ok(self)
    }

    pub fn calibration(mut self, scale: f32, offset: f32) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn valid_range(mut self, min: f32, max: f32) -> Self {
        self.valid_range = (min, max);
        self
    }

    pub fn decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    pub fn failure_threshold(mut self, polls: u16) -> Self {
        self.failure_threshold = polls;
        self
    }

    pub fn max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Wait between addressing the data register and reading it. Zero
    /// issues pointer write and read as one combined transaction.
    pub fn conversion_delay(mut self, delay: Duration) -> Self {
        self.conversion_delay = delay;
        self
    }

    pub fn build(self) -> Result<DriverConfig, ConfigurationError> {
        if self.id.is_empty() {
            return Err(ConfigurationError::InvalidId);
        }
        let id = ArrayString::from(self.id).map_err(|_| ConfigurationError::InvalidId)?;
        let address = DeviceAddress::new(self.address)?;
        if self.update_interval.is_zero() {
            return Err(ConfigurationError::InvalidInterval);
        }
        let calibration = Calibration::new(self.scale, self.offset)?;
        let valid_range = ValidRange::new(self.valid_range.0, self.valid_range.1)?;
        if self.failure_threshold == 0 {
            return Err(ConfigurationError::InvalidFailureThreshold);
        }
        if self.max_retries > timing::MAX_RETRIES {
            return Err(ConfigurationError::TooManyRetries(self.max_retries));
        }
        if self.conversion_delay > timing::MAX_CONVERSION_DELAY {
            return Err(ConfigurationError::ConversionDelayTooLong);
        }

        Ok(DriverConfig {
            id,
            address,
            update_interval: self.update_interval,
            calibration,
            valid_range,
            decode_mode: self.decode_mode,
            failure_threshold: self.failure_threshold,
            max_retries: self.max_retries,
            conversion_delay: self.conversion_delay,
        })
    }
}

impl Default for DriverConfigBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a time period such as `"60s"`, `"500ms"`, `"5min"` or `"1h"`.
///
/// A unit is mandatory. Surrounding whitespace and a space between number
/// and unit are accepted.
pub fn parse_time_period(s: &str) -> Result<Duration, ConfigurationError> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or(ConfigurationError::InvalidTimePeriod)?;
    let (number, unit) = s.split_at(split);
    if number.is_empty() {
        return Err(ConfigurationError::InvalidTimePeriod);
    }
    let value = u64::from_str(number).map_err(|_| ConfigurationError::InvalidTimePeriod)?;

    let secs_per = |mul: u64| {
        value
            .checked_mul(mul)
            .map(Duration::from_secs)
            .ok_or(ConfigurationError::InvalidTimePeriod)
    };

    match unit.trim_start() {
        "us" => Ok(Duration::from_micros(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "s" | "sec" => Ok(Duration::from_secs(value)),
        "min" => secs_per(60),
        "h" => secs_per(3600),
        _ => Err(ConfigurationError::InvalidTimePeriod),
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sensor_schema() {
        let cfg = DriverConfig::default();
        assert_eq!(cfg.id(), "sen0322");
        assert_eq!(cfg.address().as_u8(), 0x73);
        assert_eq!(cfg.update_interval(), Duration::from_secs(60));
        assert_eq!(cfg.failure_threshold(), 3);
        assert_eq!(cfg.max_retries(), 1);
        assert_eq!(cfg.metadata(), SensorMetadata::OXYGEN);
        assert_eq!(DriverConfig::builder().build().unwrap(), cfg);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = DriverConfig::builder()
            .id("o2_lab")
            .address(0x70)
            .update_interval(Duration::from_secs(10))
            .calibration(0.1, 0.0)
            .valid_range(0.0, 100.0)
            .decode_mode(DecodeMode::Lenient)
            .failure_threshold(5)
            .max_retries(0)
            .conversion_delay(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(cfg.id(), "o2_lab");
        assert_eq!(cfg.address().as_u8(), 0x70);
        assert_eq!(cfg.update_interval(), Duration::from_secs(10));
        assert_eq!(cfg.decode_mode(), DecodeMode::Lenient);
        assert_eq!(cfg.failure_threshold(), 5);
        assert_eq!(cfg.max_retries(), 0);
        assert_eq!(cfg.conversion_delay(), Duration::ZERO);
    }

    #[test]
    fn test_rejects_8bit_address() {
        assert_eq!(
            DriverConfig::builder().address(0x80).build(),
            Err(ConfigurationError::InvalidAddress(0x80))
        );
    }

    #[test]
    fn test_rejects_zero_interval() {
        assert_eq!(
            DriverConfig::builder().update_interval(Duration::ZERO).build(),
            Err(ConfigurationError::InvalidInterval)
        );
    }

    #[test]
    fn test_rejects_bad_tuning() {
        assert_eq!(
            DriverConfig::builder().max_retries(2).build(),
            Err(ConfigurationError::TooManyRetries(2))
        );
        assert_eq!(
            DriverConfig::builder().failure_threshold(0).build(),
            Err(ConfigurationError::InvalidFailureThreshold)
        );
        assert_eq!(
            DriverConfig::builder().conversion_delay(Duration::from_secs(1)).build(),
            Err(ConfigurationError::ConversionDelayTooLong)
        );
        assert_eq!(
            DriverConfig::builder().calibration(0.0, 0.0).build(),
            Err(ConfigurationError::InvalidCalibration)
        );
        assert_eq!(
            DriverConfig::builder().valid_range(5.0, 1.0).build(),
            Err(ConfigurationError::InvalidRange)
        );
    }

    #[test]
    fn test_rejects_bad_id() {
        assert_eq!(DriverConfig::builder().id("").build(), Err(ConfigurationError::InvalidId));
        let long = "an_identifier_that_is_longer_than_32_chars";
        assert_eq!(DriverConfig::builder().id(long).build(), Err(ConfigurationError::InvalidId));
    }

    #[test]
    fn test_parse_time_period_units() {
        assert_eq!(parse_time_period("60s"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_time_period("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_time_period("250us"), Ok(Duration::from_micros(250)));
        assert_eq!(parse_time_period("5min"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_time_period("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_time_period(" 30 sec "), Ok(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_time_period_rejects_garbage() {
        for bad in ["", "60", "s", "-5s", "1.5s", "10 days", "never"] {
            assert_eq!(parse_time_period(bad), Err(ConfigurationError::InvalidTimePeriod), "{bad}");
        }
    }

    #[test]
    fn test_update_interval_str_feeds_validation() {
        let cfg = DriverConfig::builder().update_interval_str("15s").unwrap().build().unwrap();
        assert_eq!(cfg.update_interval(), Duration::from_secs(15));
        assert_eq!(
            DriverConfig::builder().update_interval_str("0s").unwrap().build(),
            Err(ConfigurationError::InvalidInterval)
        );
    }
}
