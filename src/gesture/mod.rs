//! Touch gesture recognition.
//!
//! Raw touch events go in, semantic gestures come out. Nothing here touches
//! a clock: every [`TouchEvent`] carries its own [`Instant`], and the timers
//! (tap window, long press) are plain state that the host polls.
//!
//! - [`GestureRecognizer`]: taps, double-taps, pinch, pan, swipe
//! - [`LongPressDetector`]: hold-to-place on the map
//! - [`Timer`]: the one-shot deadline both are built on

mod long_press;
mod recognizer;
mod timer;

pub use long_press::LongPressDetector;
pub use recognizer::{GestureRecognizer, GestureState, TapTracker};
pub use timer::Timer;

use crate::geometry::{Point, Vector};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One touch callback from the platform.
///
/// `touches` are the contacts still down after the event; `changed` are the
/// contacts this event is about (for `End`, the ones that were lifted).
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub touches: Vec<Point>,
    pub changed: Vec<Point>,
    pub at: Instant,
}

impl TouchEvent {
    pub fn start(touches: Vec<Point>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Start,
            changed: touches.clone(),
            touches,
            at,
        }
    }

    pub fn moved(touches: Vec<Point>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::Move,
            changed: touches.clone(),
            touches,
            at,
        }
    }

    pub fn end(remaining: Vec<Point>, lifted: Vec<Point>, at: Instant) -> Self {
        Self {
            phase: TouchPhase::End,
            touches: remaining,
            changed: lifted,
            at,
        }
    }

    pub fn cancel(at: Instant) -> Self {
        Self {
            phase: TouchPhase::Cancel,
            touches: Vec::new(),
            changed: Vec::new(),
            at,
        }
    }
}

/// Horizontal navigation requested by a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Tap { at: Point },
    DoubleTap { at: Point },
    /// A second contact joined; pinch tracking starts from here.
    PinchStart,
    /// Absolute target scale, already clamped.
    Pinch { scale: f64 },
    /// Movement since the previous pan event.
    Pan { delta: Vector },
    Swipe(Direction),
    LongPress { at: Point },
    /// The interaction ended.
    Release,
}
