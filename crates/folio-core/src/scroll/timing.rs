//! Elapsed-time helpers for scroll animations
//!
//! Pure functions over elapsed time so callers can feed either a real or a
//! simulated clock.

use std::time::{Duration, Instant};

/// Check if animation is complete
#[inline]
pub fn is_complete(elapsed: Duration, duration: Duration) -> bool {
    elapsed >= duration
}

/// Elapsed time between two instants, zero if `now` is earlier than `start`
#[inline]
pub fn elapsed_since(start: Instant, now: Instant) -> Duration {
    now.saturating_duration_since(start)
}

/// Duration in fractional milliseconds
#[inline]
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
