// src/common/timing.rs

use core::time::Duration;

// === Polling ===

/// Default poll period.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

// === Sensor settle times ===

/// Wait after arming collection before the sensor answers reliably.
pub const SETUP_SETTLE: Duration = Duration::from_millis(100);
/// Default wait between addressing `OxygenData` and reading the frame.
pub const DEFAULT_CONVERSION_DELAY: Duration = Duration::from_millis(50);
/// Longest conversion delay accepted by configuration. A poll blocks the
/// host loop for roughly `(1 + retries) * conversion delay`.
pub const MAX_CONVERSION_DELAY: Duration = Duration::from_millis(250);

// === Retries ===

/// Hard cap on retries within a single poll.
pub const MAX_RETRIES: u8 = 1;
/// Default retries within a single poll.
pub const DEFAULT_RETRIES: u8 = 1;
/// Back-off before retrying a failed transaction.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(5);

// === Staleness ===

/// Default number of consecutive failed polls before the state turns invalid.
pub const DEFAULT_FAILURE_THRESHOLD: u16 = 3;

/// Smallest step between two published timestamps.
pub const MIN_TIMESTAMP_STEP: Duration = Duration::from_micros(1);

/// Duration as whole microseconds for `DelayNs`, saturating at `u32::MAX`.
#[inline]
pub fn as_delay_us(d: Duration) -> u32 {
    u32::try_from(d.as_micros()).unwrap_or(u32::MAX)
}
