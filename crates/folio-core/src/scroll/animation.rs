//! Scroll animation controller
//!
//! Combines easing functions and timing utilities into a small state
//! machine driven by repeated `step()` calls from the host's frame tick.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::ScrollConfig;
use super::easing::{EasingType, EasingTypeExt};
use super::timing::{as_millis_f64, elapsed_since, is_complete};

/// Identifies one started animation.
///
/// Frame callbacks carry the handle they were scheduled for; once a newer
/// animation starts, stepping with an older handle yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationHandle {
    generation: u64,
}

/// Position produced by one animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    pub position: f64,
    /// True on the frame that completed the animation
    pub finished: bool,
}

/// Active scroll animation state
#[derive(Debug, Clone)]
struct ActiveAnimation {
    generation: u64,
    /// Set by the first frame, not by `start()`
    start_time: Option<Instant>,
    start_position: f64,
    target_position: f64,
    duration: Duration,
    easing: EasingType,
}

/// Scroll animation controller
///
/// At most one animation is active. `start()` replaces whatever was running
/// and returns the handle the host must pass back to `step()` each frame.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    animation: Option<ActiveAnimation>,
    generation: u64,
    config: ScrollConfig,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl ScrollAnimator {
    /// Create a new scroll animator with configuration
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            animation: None,
            generation: 0,
            config,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Check if an animation is currently active
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Handle of the active animation, if any
    pub fn handle(&self) -> Option<AnimationHandle> {
        self.animation.as_ref().map(|a| AnimationHandle {
            generation: a.generation,
        })
    }

    /// Final position of the active animation
    pub fn target_position(&self) -> Option<f64> {
        self.animation.as_ref().map(|a| a.target_position)
    }

    /// Start animating from `from` to `to`, superseding any active animation
    pub fn start(&mut self, from: f64, to: f64) -> AnimationHandle {
        self.generation += 1;
        if let Some(previous) = &self.animation {
            debug!(
                superseded = previous.generation,
                generation = self.generation,
                "Scroll animation superseded"
            );
        }
        self.animation = Some(ActiveAnimation {
            generation: self.generation,
            start_time: None,
            start_position: from,
            target_position: to,
            duration: self.config.animation_duration(),
            easing: self.config.easing,
        });
        AnimationHandle {
            generation: self.generation,
        }
    }

    /// Advance the animation identified by `handle` to `now`
    ///
    /// Returns `None` when nothing is running or `handle` is stale. The
    /// frame that reaches the duration lands exactly on the target and ends
    /// the animation.
    pub fn step(&mut self, handle: AnimationHandle, now: Instant) -> Option<ScrollFrame> {
        let anim = self.animation.as_mut()?;
        if anim.generation != handle.generation {
            return None;
        }

        let start = *anim.start_time.get_or_insert(now);
        let elapsed = elapsed_since(start, now);

        if is_complete(elapsed, anim.duration) {
            let position = anim.target_position;
            debug!(generation = anim.generation, position, "Scroll animation finished");
            self.animation = None;
            return Some(ScrollFrame {
                position,
                finished: true,
            });
        }

        let position = anim.easing.ease(
            as_millis_f64(elapsed),
            anim.start_position,
            anim.target_position - anim.start_position,
            as_millis_f64(anim.duration),
        );
        Some(ScrollFrame {
            position,
            finished: false,
        })
    }

    /// Cancel any active animation and stop at the current position
    pub fn cancel(&mut self) {
        self.animation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(animator: &mut ScrollAnimator, handle: AnimationHandle, t0: Instant, ms: u64) -> ScrollFrame {
        animator
            .step(handle, t0 + Duration::from_millis(ms))
            .expect("animation should be active")
    }

    #[test]
    fn test_bounds_and_monotonic() {
        let mut animator = ScrollAnimator::default();
        let handle = animator.start(0.0, 1000.0);
        let t0 = Instant::now();

        let first = sample(&mut animator, handle, t0, 0);
        assert_eq!(first.position, 0.0);
        assert!(!first.finished);

        let mut prev = first.position;
        for ms in (16..800).step_by(16) {
            let frame = sample(&mut animator, handle, t0, ms);
            assert!(frame.position > 0.0 && frame.position < 1000.0, "out of bounds at {}ms", ms);
            assert!(frame.position > prev, "not increasing at {}ms", ms);
            assert!(!frame.finished);
            prev = frame.position;
        }

        let last = sample(&mut animator, handle, t0, 800);
        assert_eq!(last.position, 1000.0);
        assert!(last.finished);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_clears_exactly_once() {
        let mut animator = ScrollAnimator::default();
        let handle = animator.start(100.0, 40.0);
        let t0 = Instant::now();

        sample(&mut animator, handle, t0, 0);
        let done = sample(&mut animator, handle, t0, 900);
        assert!(done.finished);
        assert_eq!(done.position, 40.0);
        assert!(animator.step(handle, t0 + Duration::from_millis(950)).is_none());
    }

    #[test]
    fn test_new_animation_supersedes_old() {
        let mut animator = ScrollAnimator::default();
        let t0 = Instant::now();
        let a = animator.start(0.0, 1000.0);
        sample(&mut animator, a, t0, 0);
        sample(&mut animator, a, t0, 200);

        let b = animator.start(300.0, 0.0);
        assert_ne!(a, b);
        assert_eq!(animator.handle(), Some(b));
        assert_eq!(animator.target_position(), Some(0.0));

        // A's remaining frames no longer drive anything
        assert!(animator.step(a, t0 + Duration::from_millis(216)).is_none());
        assert!(animator.is_animating());

        // B starts its own clock on its first frame
        let b0 = t0 + Duration::from_millis(232);
        let first = animator.step(b, b0).unwrap();
        assert_eq!(first.position, 300.0);
        let end = animator.step(b, b0 + Duration::from_millis(800)).unwrap();
        assert!(end.finished);
        assert_eq!(end.position, 0.0);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_zero_duration_finishes_on_first_frame() {
        let config = ScrollConfig {
            animation_duration_ms: 0,
            ..Default::default()
        };
        let mut animator = ScrollAnimator::new(config);
        let handle = animator.start(0.0, 500.0);
        let frame = animator.step(handle, Instant::now()).unwrap();
        assert!(frame.finished);
        assert_eq!(frame.position, 500.0);
    }

    #[test]
    fn test_cancel() {
        let mut animator = ScrollAnimator::default();
        let handle = animator.start(0.0, 500.0);
        animator.cancel();
        assert!(!animator.is_animating());
        assert!(animator.step(handle, Instant::now()).is_none());
    }
}
