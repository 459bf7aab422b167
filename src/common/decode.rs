// src/common/decode.rs

use super::error::{ConfigurationError, DecodeError};
use super::registers::OXYGEN_FRAME_LEN;
use super::types::Measurement;

/// Frame returned by the `OxygenData` register: `[high, low, trailing]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawReading(pub [u8; OXYGEN_FRAME_LEN]);

impl RawReading {
    /// Big-endian count from the first two bytes.
    #[inline]
    pub const fn counts(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    /// Same two bytes read little-endian.
    #[inline]
    pub const fn counts_swapped(&self) -> u16 {
        u16::from_le_bytes([self.0[0], self.0[1]])
    }

    /// All ones means the bus floated high for the whole read.
    #[inline]
    pub fn is_floating(&self) -> bool {
        self.0.iter().all(|&b| b == 0xFF)
    }
}

/// Linear transform from counts to percent.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub scale: f32,
    pub offset: f32,
}

impl Calibration {
    /// One count is a hundredth of a percent.
    pub const DEFAULT: Calibration = Calibration {
        scale: 0.01,
        offset: 0.0,
    };

    pub fn new(scale: f32, offset: f32) -> Result<Self, ConfigurationError> {
        if !scale.is_finite() || scale == 0.0 || !offset.is_finite() {
            return Err(ConfigurationError::InvalidCalibration);
        }
        Ok(Calibration { scale, offset })
    }

    #[inline]
    pub fn apply(&self, counts: u16) -> f32 {
        counts as f32 * self.scale + self.offset
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Inclusive plausibility window in percent.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidRange {
    min: f32,
    max: f32,
}

impl ValidRange {
    /// Ambient air is ~20.9 %; anything above 30 % is treated as garbage.
    pub const DEFAULT: ValidRange = ValidRange { min: 0.0, max: 30.0 };
    /// Physical bounds of a percentage.
    pub const PERCENT: ValidRange = ValidRange { min: 0.0, max: 100.0 };

    pub fn new(min: f32, max: f32) -> Result<Self, ConfigurationError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigurationError::InvalidRange);
        }
        Ok(ValidRange { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ValidRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How strictly to interpret a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeMode {
    /// Big-endian counts through the calibration, nothing else.
    #[default]
    Strict,
    /// If the big-endian value is outside the valid range, retry with the bytes swapped,
    /// then with the first byte alone in tenths of a percent. Some sensor
    /// firmware revisions answer in those layouts.
    Lenient,
}

/// Decodes a frame. Pure: the same inputs always give the same result.
pub fn decode(
    raw: &RawReading,
    calibration: &Calibration,
    mode: DecodeMode,
    range: &ValidRange,
) -> Result<Measurement, DecodeError> {
    if raw.is_floating() {
        return Err(DecodeError::Malformed);
    }

    let mut counts = raw.counts();
    let mut value = calibration.apply(counts);

    // Alternate layouts only when the configured window rejects the primary value.
    if mode == DecodeMode::Lenient && !range.contains(value) {
        counts = raw.counts_swapped();
        value = calibration.apply(counts);

        if !range.contains(value) {
            counts = u16::from(raw.0[0]);
            value = counts as f32 * 0.1;
        }
    }

    if !value.is_finite() {
        return Err(DecodeError::NonFinite);
    }

    let measurement = Measurement::new(value);
    if !range.contains(value) {
        return Err(DecodeError::OutOfRange {
            raw: counts,
            centi_percent: measurement.as_centi_percent(),
        });
    }

    Ok(measurement)
}
