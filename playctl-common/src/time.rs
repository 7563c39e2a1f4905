//! Microsecond time values
//!
//! Media positions and timestamps are signed microsecond counts (`i64`).
//! Two reserved values mark positions that are not real timestamps:
//!
//! - [`TIME_UNSET`]: no value has been set
//! - [`TIME_END_OF_SOURCE`]: the end of the source has been reached
//!
//! Millisecond values are used at the configuration boundary and converted
//! with truncating division.

use std::time::Duration;

/// Reserved value for a time that has not been set.
pub const TIME_UNSET: i64 = i64::MIN + 1;

/// Reserved value for a position at the end of the source.
pub const TIME_END_OF_SOURCE: i64 = i64::MIN;

/// Microseconds per millisecond
pub const MICROS_PER_MILLI: i64 = 1_000;

/// Whether `time_us` is a real timestamp rather than one of the reserved values.
pub fn is_set(time_us: i64) -> bool {
    time_us != TIME_UNSET && time_us != TIME_END_OF_SOURCE
}

/// Convert microseconds to milliseconds (truncating).
///
/// Reserved values pass through unchanged.
pub fn us_to_ms(time_us: i64) -> i64 {
    if is_set(time_us) {
        time_us / MICROS_PER_MILLI
    } else {
        time_us
    }
}

/// Convert milliseconds to microseconds (saturating).
///
/// Reserved values pass through unchanged.
pub fn ms_to_us(time_ms: i64) -> i64 {
    if is_set(time_ms) {
        time_ms.saturating_mul(MICROS_PER_MILLI)
    } else {
        time_ms
    }
}

/// Convert milliseconds to a duration
pub fn millis_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
