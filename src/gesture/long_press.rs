use super::{Gesture, Timer, TouchEvent, TouchPhase};
use crate::config::GestureConfig;
use crate::geometry::{Point, distance};
use std::time::{Duration, Instant};

/// Detects a single contact held still on the map.
///
/// Feed every touch event through [`handle`](Self::handle) and call
/// [`poll`](Self::poll) from the host's frame or timer callback.
#[derive(Debug, Clone)]
pub struct LongPressDetector {
    duration: Duration,
    jitter: f64,
    origin: Option<Point>,
    timer: Timer,
}

impl LongPressDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            duration: config.long_press_duration(),
            jitter: config.long_press_jitter,
            origin: None,
            timer: Timer::new(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn handle(&mut self, event: &TouchEvent) {
        match event.phase {
            TouchPhase::Start => match event.touches.as_slice() {
                [p] => {
                    self.origin = Some(*p);
                    self.timer.arm(event.at, self.duration);
                }
                _ => self.disarm(),
            },
            TouchPhase::Move => {
                let wandered = match (self.origin, event.touches.as_slice()) {
                    (Some(origin), [p]) => distance(origin, *p) > self.jitter,
                    (Some(_), _) => true,
                    (None, _) => false,
                };
                if wandered {
                    self.disarm();
                }
            }
            TouchPhase::End | TouchPhase::Cancel => self.disarm(),
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<Gesture> {
        if self.timer.poll(now) {
            log::debug!("long press fired");
            self.origin.take().map(|at| Gesture::LongPress { at })
        } else {
            None
        }
    }

    fn disarm(&mut self) {
        self.timer.cancel();
        self.origin = None;
    }
}
