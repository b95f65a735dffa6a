//! Time-related abstractions.
//!
//! Monotonic timers for the runtime. Wall-clock readings used for
//! persistence throttling go through the injectable `Clock` bridge instead,
//! so tests can move time deterministically.

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
pub use tokio::time::{interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

/// Returns the current time as milliseconds since UNIX_EPOCH.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Converts a floating point number of seconds into a [`Duration`],
/// treating negative or non-finite input as zero and saturating at
/// [`Duration::MAX`].
///
/// Playback positions arrive from media players as `f64` seconds.
pub fn duration_from_secs_f64(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
