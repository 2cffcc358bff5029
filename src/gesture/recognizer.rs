use super::{Direction, Gesture, Timer, TouchEvent, TouchPhase};
use crate::config::GestureConfig;
use crate::geometry::{Point, distance};
use std::time::{Duration, Instant};

/// Pairs taps into double-taps.
///
/// A tap opens a window; the next tap landing inside it, close enough to
/// the first, is a double-tap and closes the window again. A third tap
/// therefore starts a fresh pair.
#[derive(Debug, Clone)]
pub struct TapTracker {
    window: Duration,
    slop: f64,
    last: Option<Point>,
    timer: Timer,
}

impl TapTracker {
    pub fn new(window: Duration, slop: f64) -> Self {
        Self {
            window,
            slop,
            last: None,
            timer: Timer::new(),
        }
    }

    /// Record a tap; returns `true` if it completes a double-tap.
    pub fn register(&mut self, at: Point, now: Instant) -> bool {
        let paired = self.timer.is_pending(now)
            && self.last.is_some_and(|prev| distance(prev, at) <= self.slop);
        if paired {
            self.reset();
        } else {
            self.timer.arm(now, self.window);
            self.last = Some(at);
        }
        paired
    }

    pub fn reset(&mut self) {
        self.timer.cancel();
        self.last = None;
    }
}

/// Per-interaction tracking, alive from first contact to release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureState {
    /// Where the first contact landed.
    pub origin: Option<Point>,
    /// Previous position of the panning contact.
    pub anchor: Option<Point>,
    /// Distance between the two contacts and view scale when the pinch began.
    pub pinch: Option<(f64, f64)>,
    /// Recorded only when the interaction started unzoomed.
    pub swipe_start_x: Option<f64>,
    pub dragging: bool,
    /// Still eligible to be a tap: one contact that has not wandered off.
    pub tap_candidate: bool,
}

/// Turns touch events into [`Gesture`]s for the lightbox.
///
/// The recognizer does not own the view scale; the caller passes the current
/// one with every event, since the outcome of a double-tap or pinch is
/// applied by the caller between events.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    state: Option<GestureState>,
    taps: TapTracker,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        let taps = TapTracker::new(config.double_tap_window(), config.double_tap_slop);
        Self {
            config,
            state: None,
            taps,
        }
    }

    pub fn state(&self) -> Option<&GestureState> {
        self.state.as_ref()
    }

    /// Forget the current interaction and any half-finished double-tap.
    pub fn reset(&mut self) {
        self.state = None;
        self.taps.reset();
    }

    pub fn handle(&mut self, event: &TouchEvent, scale: f64) -> Vec<Gesture> {
        match event.phase {
            TouchPhase::Start => self.on_start(event, scale),
            TouchPhase::Move => self.on_move(event, scale),
            TouchPhase::End => self.on_end(event, scale),
            TouchPhase::Cancel => match self.state.take() {
                Some(_) => vec![Gesture::Release],
                None => Vec::new(),
            },
        }
    }

    fn on_start(&mut self, event: &TouchEvent, scale: f64) -> Vec<Gesture> {
        let fresh = self.state.is_none();
        let state = self.state.get_or_insert_with(GestureState::default);

        match event.touches.as_slice() {
            [] => Vec::new(),
            [p] => {
                if fresh {
                    state.origin = Some(*p);
                    state.tap_candidate = true;
                }
                state.anchor = Some(*p);
                if scale <= 1.0 {
                    state.swipe_start_x = Some(p.x);
                } else {
                    state.dragging = true;
                }
                Vec::new()
            }
            [a, b, ..] => {
                state.pinch = Some((distance(*a, *b), scale));
                state.swipe_start_x = None;
                state.anchor = None;
                state.dragging = false;
                state.tap_candidate = false;
                vec![Gesture::PinchStart]
            }
        }
    }

    fn on_move(&mut self, event: &TouchEvent, scale: f64) -> Vec<Gesture> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };

        match event.touches.as_slice() {
            [a, b, ..] => match state.pinch {
                Some((start_distance, start_scale)) if start_distance > 0.0 => {
                    let ratio = distance(*a, *b) / start_distance;
                    let scale = (start_scale * ratio).clamp(1.0, self.config.max_scale);
                    vec![Gesture::Pinch { scale }]
                }
                _ => Vec::new(),
            },
            [p] => {
                if state
                    .origin
                    .is_some_and(|o| distance(o, *p) > self.config.tap_slop)
                {
                    state.tap_candidate = false;
                }
                match state.anchor {
                    Some(anchor) if scale > 1.0 && state.dragging => {
                        state.anchor = Some(*p);
                        vec![Gesture::Pan { delta: *p - anchor }]
                    }
                    _ => Vec::new(),
                }
            }
            [] => Vec::new(),
        }
    }

    /// Any lift ends the interaction, even if other contacts remain down;
    /// those are ignored until the next start.
    fn on_end(&mut self, event: &TouchEvent, scale: f64) -> Vec<Gesture> {
        let Some(state) = self.state.take() else {
            return Vec::new();
        };
        let mut out = Vec::new();

        if let (None, Some(&lifted)) = (state.pinch, event.changed.first()) {
            let swipe = state
                .swipe_start_x
                .filter(|_| scale <= 1.0)
                .map(|x0| lifted.x - x0)
                .filter(|dx| dx.abs() > self.config.swipe_threshold);

            if let Some(dx) = swipe {
                log::debug!("swipe dx={:.1}", dx);
                out.push(Gesture::Swipe(if dx > 0.0 {
                    Direction::Previous
                } else {
                    Direction::Next
                }));
            } else if state.tap_candidate
                && state
                    .origin
                    .is_some_and(|o| distance(o, lifted) <= self.config.tap_slop)
            {
                if self.taps.register(lifted, event.at) {
                    log::debug!("double tap at ({:.0}, {:.0})", lifted.x, lifted.y);
                    out.push(Gesture::DoubleTap { at: lifted });
                } else {
                    out.push(Gesture::Tap { at: lifted });
                }
            }
        }

        out.push(Gesture::Release);
        out
    }
}
