//! Easing curves for scroll animations
//!
//! Provides easing curves in two shapes: normalized `[0, 1] -> [0, 1]`
//! progress mapping, and the classic `(t, b, c, d)` form that maps elapsed
//! time directly to a position.

pub use crate::config::EasingType;

/// Extension trait for EasingType with calculation methods
pub trait EasingTypeExt {
    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    fn apply(&self, t: f64) -> f64;

    /// Position after `t` of `d` time units, moving from `b` by `c`
    fn ease(&self, t: f64, b: f64, c: f64, d: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => if t < 1.0 { 0.0 } else { 1.0 },
            EasingType::Linear => t,
            EasingType::InOutQuad => ease_in_out_quad(t, 0.0, 1.0, 1.0),
            EasingType::InOutCubic => ease_in_out_cubic(t, 0.0, 1.0, 1.0),
            EasingType::OutCubic => cubic_ease_out(t),
        }
    }

    #[inline]
    fn ease(&self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        if d <= 0.0 {
            return b + c;
        }
        let t = t.clamp(0.0, d);
        match self {
            EasingType::InOutQuad => ease_in_out_quad(t, b, c, d),
            EasingType::InOutCubic => ease_in_out_cubic(t, b, c, d),
            _ => b + c * self.apply(t / d),
        }
    }
}

/// Cubic ease-in-out over `d` time units.
///
/// Accelerating cubic for the first half, decelerating cubic for the
/// second, symmetric around `d / 2`. `ease(0) == b` and `ease(d) == b + c`.
#[inline]
pub fn ease_in_out_cubic(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let mut t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t * t + b;
    }
    t -= 2.0;
    c / 2.0 * (t * t * t + 2.0) + b
}

/// Quadratic ease-in-out over `d` time units.
#[inline]
pub fn ease_in_out_quad(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let mut t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t + b;
    }
    t -= 1.0;
    -c / 2.0 * (t * (t - 2.0) - 1.0) + b
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}
