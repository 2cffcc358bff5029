use std::time::{Duration, Instant};

/// A cancellable one-shot deadline.
///
/// Arming replaces any previous deadline. [`poll`](Timer::poll) reports the
/// deadline exactly once, then the timer is disarmed again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Disarm. Returns whether the timer was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Armed and not yet due at `now`.
    pub fn is_pending(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now < d)
    }

    /// Fire if due: returns `true` once and disarms.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
