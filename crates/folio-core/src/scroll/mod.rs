//! Smooth scrolling for programmatic section navigation
//!
//! - `easing` - pure easing curves
//! - `timing` - elapsed-time helpers
//! - `animation` - single-active-animation state machine built on both
//!
//! ```ignore
//! use folio_core::scroll::ScrollAnimator;
//!
//! let mut animator = ScrollAnimator::default();
//! let handle = animator.start(host.scroll_y(), target);
//!
//! // Once per frame
//! if let Some(frame) = animator.step(handle, host.now()) {
//!     host.scroll_to(frame.position);
//! }
//! ```

pub mod animation;
pub mod easing;
pub mod timing;

pub use animation::{AnimationHandle, ScrollAnimator, ScrollFrame};
pub use easing::{EasingType, EasingTypeExt};
