// src/common/types.rs

use super::hal_traits::Instant;
use super::timing;
use core::fmt;

// --- Measurement ---

/// Oxygen concentration in percent by volume.
///
/// Reported with two decimals; the full `f32` is kept so repeated decoding
/// of the same frame compares equal.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement(f32);

impl Measurement {
    pub const fn new(percent: f32) -> Self {
        Self(percent)
    }

    pub const fn as_percent(&self) -> f32 {
        self.0
    }

    /// Value rounded half away from zero to hundredths of a percent.
    pub fn as_centi_percent(&self) -> i32 {
        let scaled = self.0 * 100.0;
        if scaled >= 0.0 {
            (scaled + 0.5) as i32
        } else {
            (scaled - 0.5) as i32
        }
    }

    /// Value at reported precision.
    pub fn rounded(&self) -> f32 {
        self.as_centi_percent() as f32 / 100.0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

// --- Published state ---

/// Externally observable state of a polling sensor.
///
/// `value` and `timestamp` only move on a successful poll. Failed polls
/// touch the failure bookkeeping and, past the threshold, `valid`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SensorState<T> {
    value: Option<Measurement>,
    timestamp: Option<T>,
    valid: bool,
    consecutive_failures: u16,
    sequence: u32,
}

impl<T> SensorState<T> {
    pub const fn new() -> Self {
        SensorState {
            value: None,
            timestamp: None,
            valid: false,
            consecutive_failures: 0,
            sequence: 0,
        }
    }

    pub fn value(&self) -> Option<Measurement> {
        self.value
    }

    pub fn timestamp(&self) -> Option<&T> {
        self.timestamp.as_ref()
    }

    /// `true` once a reading was published and failures since then stayed
    /// below the threshold.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn consecutive_failures(&self) -> u16 {
        self.consecutive_failures
    }

    /// Number of successful publications so far.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl<T: Instant> SensorState<T> {
    /// Publishes `value`. The stored timestamp is forced strictly past the
    /// previous one so consumers can order updates even with a coarse clock.
    pub(crate) fn record_success(&mut self, value: Measurement, now: T) {
        let stamp = match self.timestamp {
            Some(prev) if now <= prev => prev + timing::MIN_TIMESTAMP_STEP,
            _ => now,
        };
        self.value = Some(value);
        self.timestamp = Some(stamp);
        self.valid = true;
        self.consecutive_failures = 0;
        self.sequence = self.sequence.wrapping_add(1);
    }

    /// Counts a failed poll. Returns `true` if this failure made the state stale.
    pub(crate) fn record_failure(&mut self, failure_threshold: u16) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.valid && self.consecutive_failures >= failure_threshold {
            self.valid = false;
            return true;
        }
        false
    }
}

impl<T> Default for SensorState<T> {
    fn default() -> Self {
        Self::new()
    }
}

// --- Component lifecycle ---

/// Health of a scheduled component.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ComponentStatus {
    /// Constructed, `setup` not run yet.
    Idle,
    Ok,
    /// Last poll failed; still scheduled.
    Warning,
    /// Setup failed; never ticked again.
    Failed,
}

impl ComponentStatus {
    #[inline]
    pub const fn is_failed(&self) -> bool {
        matches!(self, ComponentStatus::Failed)
    }
}

/// Order in which components are set up. Higher runs first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupPriority(pub u16);

impl SetupPriority {
    /// Bus controllers.
    pub const BUS: SetupPriority = SetupPriority(1000);
    pub const IO: SetupPriority = SetupPriority(900);
    pub const HARDWARE: SetupPriority = SetupPriority(800);
    /// Sensors reading from already initialised buses.
    pub const DATA: SetupPriority = SetupPriority(600);
    pub const PROCESSOR: SetupPriority = SetupPriority(400);
    pub const LATE: SetupPriority = SetupPriority(0);
}

// --- Sensor metadata ---

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateClass {
    Measurement,
    Total,
    TotalIncreasing,
}

/// Fixed publishing attributes of a sensor entity.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorMetadata {
    pub unit_of_measurement: &'static str,
    pub accuracy_decimals: u8,
    /// `None` means no device class is advertised.
    pub device_class: Option<&'static str>,
    pub state_class: StateClass,
}

impl SensorMetadata {
    pub const OXYGEN: SensorMetadata = SensorMetadata {
        unit_of_measurement: "%",
        accuracy_decimals: 2,
        device_class: None,
        state_class: StateClass::Measurement,
    };
}
