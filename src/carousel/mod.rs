//! Infinite carousel controller.
//!
//! The carousel shows a fixed list of items as a strip that never ends. The
//! list is laid out three times (pre-buffer, main set, post-buffer) and the
//! current index always settles in the main set:
//!
//! ```text
//!  index:  0 1 2 3 | 4 5 6 7 | 8 9 10 11
//!  item:   a b c d | a b c d | a  b  c  d
//!          pre      main      post
//! ```
//!
//! Moving left of `a` (4 → 3) animates into the pre-buffer's `d`; once the
//! transition ends the index jumps, without animation, to the main set's `d`
//! (3 → 7). The viewer never sees the seam.
//!
//! Navigation is locked for the duration of a transition. Requests during the
//! lock are dropped, not queued.
//!
//! # Example
//!
//! ```ignore
//! let mut carousel = Carousel::new(services)?;
//!
//! // Input
//! carousel.touch_start(320.0);
//! carousel.touch_end(250.0); // swipe left: advance
//!
//! // Every frame
//! carousel.update(time.delta());
//! let offset = layout.offset(carousel.current_index());
//! ```

mod layout;

pub use layout::{CardLayout, CardView};

use std::time::Duration;

use tracing::trace;

use crate::config::CarouselConfig;
use crate::error::CarouselError;
use crate::input::KeyCode;

/// Direction of a single carousel step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Next item (content moves left).
    Advance,
    /// Previous item (content moves right).
    Retreat,
}

/// Whether the carousel accepts navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Transitioning { remaining: Duration },
}

/// Move an index that drifted into a buffer copy back into the main set.
///
/// `index < len` moves up by `len`, `index >= 2 * len` moves down by `len`,
/// anything else is already in the main set.
pub fn snap_index(index: usize, len: usize) -> usize {
    if len == 0 {
        return index;
    }
    if index < len {
        index + len
    } else if index >= 2 * len {
        index - len
    } else {
        index
    }
}

#[derive(Debug, Clone, Copy)]
struct TouchTrack {
    start_x: f32,
    moved: bool,
}

/// Carousel state over a fixed, non-empty item list.
#[derive(Debug, Clone)]
pub struct Carousel<T> {
    items: Vec<T>,
    current_index: usize,
    state: TransitionState,
    transition: Duration,
    swipe_threshold: f32,
    touch: Option<TouchTrack>,
    last_was_drag: bool,
    detail: Option<usize>,
    snapped: bool,
}

impl<T> Carousel<T> {
    /// Create a carousel with the default 500 ms lock and 50 px swipe threshold.
    pub fn new(items: Vec<T>) -> Result<Self, CarouselError> {
        Self::with_config(items, &CarouselConfig::default())
    }

    pub fn with_config(items: Vec<T>, config: &CarouselConfig) -> Result<Self, CarouselError> {
        if items.is_empty() {
            return Err(CarouselError::Empty);
        }
        let len = items.len();
        Ok(Self {
            items,
            current_index: len,
            state: TransitionState::Idle,
            transition: config.transition(),
            swipe_threshold: config.swipe_threshold,
            touch: None,
            last_was_drag: false,
            detail: None,
            snapped: false,
        })
    }

    // ========== Queries ==========

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Length of the tripled list.
    pub fn extended_len(&self) -> usize {
        self.items.len() * 3
    }

    /// Item at a position of the tripled list.
    pub fn extended_item(&self, index: usize) -> Option<&T> {
        if index < self.extended_len() {
            self.items.get(index % self.items.len())
        } else {
            None
        }
    }

    /// The tripled list: pre-buffer, main set, post-buffer.
    pub fn extended_items(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter().chain(&self.items).chain(&self.items)
    }

    /// Index into the tripled list.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Index of the active item within `items()`.
    pub fn active_position(&self) -> usize {
        self.current_index % self.items.len()
    }

    pub fn active_item(&self) -> &T {
        &self.items[self.active_position()]
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, TransitionState::Transitioning { .. })
    }

    /// Whether the strip should animate toward its offset this frame.
    ///
    /// False right after a buffer snap, so the jump is instantaneous.
    pub fn should_animate(&self) -> bool {
        !self.snapped
    }

    // ========== Navigation ==========

    /// Step to the next item. Returns `false` while a transition is running.
    pub fn advance(&mut self) -> bool {
        self.navigate(Navigation::Advance)
    }

    /// Step to the previous item. Returns `false` while a transition is running.
    pub fn retreat(&mut self) -> bool {
        self.navigate(Navigation::Retreat)
    }

    pub fn navigate(&mut self, direction: Navigation) -> bool {
        if self.is_transitioning() {
            trace!(?direction, "carousel locked, dropping navigation");
            return false;
        }
        self.current_index = match direction {
            Navigation::Advance => self.current_index + 1,
            Navigation::Retreat => self.current_index - 1,
        };
        self.state = TransitionState::Transitioning {
            remaining: self.transition,
        };
        self.snapped = false;
        trace!(index = self.current_index, ?direction, "carousel transition started");
        true
    }

    /// Count down the transition lock by `elapsed`.
    pub fn update(&mut self, elapsed: Duration) {
        if let TransitionState::Transitioning { remaining } = self.state {
            let remaining = remaining.saturating_sub(elapsed);
            if remaining.is_zero() {
                self.settle();
            } else {
                self.state = TransitionState::Transitioning { remaining };
            }
        }
    }

    /// End any running transition now and snap back into the main set.
    pub fn settle(&mut self) {
        self.state = TransitionState::Idle;
        let snapped = snap_index(self.current_index, self.items.len());
        if snapped != self.current_index {
            trace!(from = self.current_index, to = snapped, "carousel snapped into main set");
            self.current_index = snapped;
            self.snapped = true;
        }
    }

    // ========== Input mapping ==========

    /// Left arrow retreats, right arrow advances. Other keys are ignored.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        let direction = match key {
            KeyCode::Left => Navigation::Retreat,
            KeyCode::Right => Navigation::Advance,
            _ => return false,
        };
        self.last_was_drag = false;
        self.navigate(direction)
    }

    /// Next/previous button press.
    pub fn press_button(&mut self, direction: Navigation) -> bool {
        self.last_was_drag = false;
        self.navigate(direction)
    }

    pub fn touch_start(&mut self, x: f32) {
        self.touch = Some(TouchTrack {
            start_x: x,
            moved: false,
        });
    }

    pub fn touch_move(&mut self, x: f32) {
        if let Some(track) = &mut self.touch {
            if x != track.start_x {
                track.moved = true;
            }
        }
    }

    /// Finish a touch. Travel beyond the threshold navigates.
    ///
    /// Returns the navigation that was accepted, if any.
    pub fn touch_end(&mut self, x: f32) -> Option<Navigation> {
        let track = self.touch.take()?;
        let distance = track.start_x - x;
        self.last_was_drag = track.moved || distance != 0.0;

        let direction = if distance > self.swipe_threshold {
            Navigation::Advance
        } else if distance < -self.swipe_threshold {
            Navigation::Retreat
        } else {
            return None;
        };
        self.navigate(direction).then_some(direction)
    }

    /// Drop an in-progress touch without navigating.
    pub fn touch_cancel(&mut self) {
        self.touch = None;
    }

    // ========== Detail view ==========

    /// Click on the card at `index` of the tripled list.
    ///
    /// Opens the detail view when the card is the active one, unless the
    /// click is the tail end of a drag. Returns the opened item.
    pub fn click_card(&mut self, index: usize) -> Option<&T> {
        if std::mem::take(&mut self.last_was_drag) {
            return None;
        }
        if index != self.current_index {
            return None;
        }
        let position = self.active_position();
        self.detail = Some(position);
        self.items.get(position)
    }

    /// Item whose detail view is open.
    pub fn detail(&self) -> Option<&T> {
        self.detail.and_then(|i| self.items.get(i))
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four() -> Carousel<&'static str> {
        Carousel::new(vec!["a", "b", "c", "d"]).unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        let err = Carousel::<u8>::new(Vec::new()).unwrap_err();
        assert_eq!(err, CarouselError::Empty);
    }

    #[test]
    fn test_starts_at_main_set() {
        let carousel = four();
        assert_eq!(carousel.current_index(), 4);
        assert_eq!(carousel.extended_len(), 12);
        assert_eq!(*carousel.active_item(), "a");
        assert!(!carousel.is_transitioning());
    }

    #[test]
    fn test_snap_index() {
        assert_eq!(snap_index(3, 4), 7);
        assert_eq!(snap_index(8, 4), 4);
        assert_eq!(snap_index(5, 4), 5);
        assert_eq!(snap_index(0, 1), 1);
        assert_eq!(snap_index(2, 1), 1);
    }

    #[test]
    fn test_lock_drops_second_advance() {
        let mut carousel = four();
        assert!(carousel.advance());
        assert!(!carousel.advance());
        assert!(!carousel.retreat());
        assert_eq!(carousel.current_index(), 5);
    }

    #[test]
    fn test_update_counts_down() {
        let mut carousel = four();
        carousel.advance();
        carousel.update(Duration::from_millis(499));
        assert!(carousel.is_transitioning());
        carousel.update(Duration::from_millis(1));
        assert!(!carousel.is_transitioning());
        assert!(carousel.advance());
    }

    #[test]
    fn test_retreat_from_start_snaps_to_end_of_main_set() {
        let mut carousel = four();
        carousel.retreat();
        assert_eq!(carousel.current_index(), 3);
        assert!(carousel.should_animate());
        carousel.update(Duration::from_millis(500));
        assert_eq!(carousel.current_index(), 7);
        assert_eq!(*carousel.active_item(), "d");
        assert!(!carousel.should_animate());

        carousel.retreat();
        assert!(carousel.should_animate());
    }

    #[test]
    fn test_keys() {
        let mut carousel = four();
        assert!(carousel.handle_key(KeyCode::Right));
        carousel.settle();
        assert!(carousel.handle_key(KeyCode::Left));
        carousel.settle();
        assert!(!carousel.handle_key(KeyCode::Space));
        assert_eq!(carousel.current_index(), 4);
    }

    #[test]
    fn test_swipe_threshold() {
        let mut carousel = four();
        carousel.touch_start(300.0);
        assert_eq!(carousel.touch_end(250.0), None);
        assert_eq!(carousel.current_index(), 4);

        carousel.touch_start(300.0);
        assert_eq!(carousel.touch_end(249.0), Some(Navigation::Advance));
        carousel.settle();

        carousel.touch_start(300.0);
        assert_eq!(carousel.touch_end(351.0), Some(Navigation::Retreat));
        assert_eq!(carousel.current_index(), 4);
    }

    #[test]
    fn test_touch_end_without_start_is_ignored() {
        let mut carousel = four();
        assert_eq!(carousel.touch_end(0.0), None);
    }

    #[test]
    fn test_click_after_drag_is_suppressed_once() {
        let mut carousel = four();
        carousel.touch_start(300.0);
        carousel.touch_move(280.0);
        carousel.touch_end(290.0);
        assert!(carousel.click_card(4).is_none());
        assert!(carousel.detail().is_none());

        assert_eq!(carousel.click_card(4), Some(&"a"));
        assert_eq!(carousel.detail(), Some(&"a"));
        carousel.close_detail();
        assert!(carousel.detail().is_none());
    }

    #[test]
    fn test_tap_opens_detail() {
        let mut carousel = four();
        carousel.touch_start(300.0);
        carousel.touch_end(300.0);
        assert_eq!(carousel.click_card(4), Some(&"a"));
    }

    #[test]
    fn test_click_inactive_card_does_nothing() {
        let mut carousel = four();
        assert!(carousel.click_card(5).is_none());
        assert!(carousel.detail().is_none());
    }

    #[test]
    fn test_detail_opens_during_transition() {
        let mut carousel = four();
        carousel.advance();
        assert!(carousel.is_transitioning());
        assert_eq!(carousel.click_card(5), Some(&"b"));
    }

    #[test]
    fn test_extended_items() {
        let carousel = Carousel::new(vec![1, 2]).unwrap();
        let extended: Vec<_> = carousel.extended_items().copied().collect();
        assert_eq!(extended, vec![1, 2, 1, 2, 1, 2]);
        assert_eq!(carousel.extended_item(5), Some(&2));
        assert_eq!(carousel.extended_item(6), None);
    }
}
