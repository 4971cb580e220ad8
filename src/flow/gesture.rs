//! Swipe input adapter — turns a horizontal drag on the revealed question
//! into a discrete choice. Holds only gesture geometry, never flow state.

use super::field::{Choice, Field};

/// Default horizontal displacement (px) a release must exceed to count.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 60.0;

/// What a finished gesture amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Feed into `answer(field, choice)`.
    Answer { field: Field, choice: Choice },
    /// Too short, or no gesture in progress; the card snaps back.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    field: Field,
    origin_x: f32,
    offset: f32,
}

/// Tracks one drag at a time.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    drag: Option<Drag>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.abs(),
            drag: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Pointer down on `field`'s choice pair at horizontal position `x`.
    /// Replaces any drag still in progress.
    pub fn begin(&mut self, field: Field, x: f32) {
        self.drag = Some(Drag {
            field,
            origin_x: x,
            offset: 0.0,
        });
    }

    /// Pointer moved. Returns the current offset for the visual, 0 when idle.
    pub fn drag(&mut self, x: f32) -> f32 {
        match self.drag.as_mut() {
            Some(drag) => {
                drag.offset = x - drag.origin_x;
                drag.offset
            }
            None => 0.0,
        }
    }

    /// Pointer up. Leftward selects the first value, rightward the second.
    pub fn release(&mut self) -> SwipeOutcome {
        let Some(drag) = self.drag.take() else {
            return SwipeOutcome::Cancelled;
        };
        if drag.offset.abs() < self.threshold {
            return SwipeOutcome::Cancelled;
        }
        let choice = if drag.offset < 0.0 {
            Choice::First
        } else {
            Choice::Second
        };
        SwipeOutcome::Answer {
            field: drag.field,
            choice,
        }
    }

    /// Abort the gesture (pointer cancel, focus lost).
    pub fn cancel(&mut self) {
        self.drag = None;
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_swipe_picks_first() {
        let mut tracker = SwipeTracker::default();
        tracker.begin(Field::Tone, 200.0);
        assert_eq!(tracker.drag(120.0), -80.0);
        assert_eq!(
            tracker.release(),
            SwipeOutcome::Answer {
                field: Field::Tone,
                choice: Choice::First
            }
        );
        assert_eq!(tracker.drag(0.0), 0.0);
        assert_eq!(tracker.release(), SwipeOutcome::Cancelled);
    }

    #[test]
    fn right_swipe_picks_second() {
        let mut tracker = SwipeTracker::new(40.0);
        tracker.begin(Field::Speed, 10.0);
        tracker.drag(30.0);
        tracker.drag(55.0);
        assert_eq!(
            tracker.release(),
            SwipeOutcome::Answer {
                field: Field::Speed,
                choice: Choice::Second
            }
        );
    }

    #[test]
    fn short_swipe_is_cancelled() {
        let mut tracker = SwipeTracker::default();
        tracker.begin(Field::Tone, 100.0);
        tracker.drag(140.0);
        assert_eq!(tracker.release(), SwipeOutcome::Cancelled);
    }

    #[test]
    fn release_without_begin_is_cancelled() {
        let mut tracker = SwipeTracker::default();
        assert_eq!(tracker.drag(500.0), 0.0);
        assert_eq!(tracker.release(), SwipeOutcome::Cancelled);
    }

    #[test]
    fn explicit_cancel_drops_drag() {
        let mut tracker = SwipeTracker::default();
        tracker.begin(Field::Caution, 0.0);
        tracker.drag(-300.0);
        tracker.cancel();
        assert_eq!(tracker.release(), SwipeOutcome::Cancelled);
    }

    #[test]
    fn negative_threshold_is_normalized() {
        assert_eq!(SwipeTracker::new(-25.0).threshold(), 25.0);
    }
}
