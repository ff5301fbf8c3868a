//! Frame timing.
//!
//! Two pieces live here:
//!
//! - [`FrameClock`], the host hook the starfield uses to ask for its next
//!   frame (a window's redraw request, a browser's animation frame, or a
//!   [`ManualClock`] in tests).
//! - [`Time`], which turns successive frame instants into the deltas that
//!   drive timer-based state such as the carousel's transition lock.
//!
//! # Example
//!
//! ```ignore
//! let mut time = Time::new();
//!
//! // Once per redraw:
//! let delta = time.update();
//! carousel.update(delta);
//! ```

use std::time::{Duration, Instant};

/// Per-frame scheduling hook supplied by the host.
///
/// The host calls back into the animation once per display refresh after a
/// request. Requests are idempotent until the frame is delivered.
pub trait FrameClock {
    /// Ask for one more frame.
    fn request_next_frame(&mut self);

    /// Withdraw any outstanding request.
    fn cancel(&mut self);
}

/// Frame clock for tests and headless hosts.
///
/// Records requests instead of scheduling anything. The driver calls
/// [`ManualClock::take_request`] to find out whether a frame is due.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    pending: bool,
    requests: u64,
    cancels: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame has been requested and not yet delivered.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending request, if any.
    pub fn take_request(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    /// Total `request_next_frame` calls.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Total `cancel` calls.
    pub fn cancel_count(&self) -> u64 {
        self.cancels
    }
}

impl FrameClock for ManualClock {
    fn request_next_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }

    fn cancel(&mut self) {
        self.pending = false;
        self.cancels += 1;
    }
}

impl<C: FrameClock + ?Sized> FrameClock for &mut C {
    fn request_next_frame(&mut self) {
        (**self).request_next_frame()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }
}

/// Tracks the per-frame delta.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    delta: Duration,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a tracker whose first frame is measured from `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last_frame: start,
            delta: Duration::ZERO,
        }
    }

    /// Advance to the current instant. Call once per frame.
    pub fn update(&mut self) -> Duration {
        self.update_at(Instant::now())
    }

    /// Advance to `now`. Instants earlier than the last frame yield a zero delta.
    pub fn update_at(&mut self, now: Instant) -> Duration {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = self.last_frame.max(now);
        self.delta
    }

    /// Time since the previous frame.
    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.delta(), Duration::ZERO);
    }

    #[test]
    fn test_update_at_measures_delta() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        let delta = time.update_at(start + Duration::from_millis(16));
        assert_eq!(delta, Duration::from_millis(16));
        assert_eq!(time.delta(), Duration::from_millis(16));
        assert_eq!(
            time.update_at(start + Duration::from_millis(50)),
            Duration::from_millis(34)
        );
    }

    #[test]
    fn test_backwards_instant_is_zero_delta() {
        let start = Instant::now();
        let mut time = Time::starting_at(start + Duration::from_millis(100));
        assert_eq!(time.update_at(start), Duration::ZERO);
        // The clock does not rewind.
        assert_eq!(
            time.update_at(start + Duration::from_millis(116)),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn test_manual_clock() {
        let mut clock = ManualClock::new();
        assert!(!clock.take_request());
        clock.request_next_frame();
        clock.request_next_frame();
        assert!(clock.is_pending());
        assert!(clock.take_request());
        assert!(!clock.take_request());
        assert_eq!(clock.request_count(), 2);

        clock.request_next_frame();
        clock.cancel();
        assert!(!clock.is_pending());
        assert_eq!(clock.cancel_count(), 1);
    }
}
