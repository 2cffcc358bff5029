//! Index bookkeeping for a horizontally scrolling image strip.
//!
//! Used directly by the spot detail sheet and wrapped by
//! [`Lightbox`](crate::lightbox::Lightbox). Navigation wraps around in both
//! directions. Free scrolling is reconciled with the index once the strip has
//! stopped moving for the settle delay.

use crate::config::CarouselConfig;
use crate::gesture::Timer;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    index: usize,
    settle_delay: Duration,
    settle: Timer,
    /// Last reported `(offset, item_width)`.
    scroll: Option<(f64, f64)>,
}

impl Carousel {
    pub fn new(len: usize, config: &CarouselConfig) -> Self {
        Self {
            len,
            index: 0,
            settle_delay: config.settle_delay(),
            settle: Timer::new(),
            scroll: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    /// Jump to `index`. Out-of-range indices are ignored; returns whether the
    /// index changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.len || index == self.index {
            return false;
        }
        self.index = index;
        true
    }

    /// Change the item count, keeping the index in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.index = self.index.min(len.saturating_sub(1));
    }

    /// Record a scroll position. Each call restarts the settle delay.
    pub fn on_scroll(&mut self, offset: f64, item_width: f64, now: Instant) {
        self.scroll = Some((offset, item_width));
        self.settle.arm(now, self.settle_delay);
    }

    /// Snap to the item nearest the last scroll position once scrolling has
    /// settled. Returns the new index when it changed.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        if !self.settle.poll(now) {
            return None;
        }
        let (offset, width) = self.scroll.take()?;
        if self.len == 0 || !(width > 0.0) {
            return None;
        }
        let nearest = (offset / width).round().max(0.0) as usize;
        let target = nearest.min(self.len - 1);
        self.go_to(target).then_some(target)
    }

    /// Scroll offset that shows the current item.
    pub fn offset_for(&self, item_width: f64) -> f64 {
        self.index as f64 * item_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn carousel(len: usize) -> Carousel {
        Carousel::new(len, &CarouselConfig::default())
    }

    #[test]
    fn next_wraps_to_start() {
        let mut c = carousel(3);
        assert_eq!(c.next(), 1);
        assert_eq!(c.next(), 2);
        assert_eq!(c.next(), 0);
    }

    #[test]
    fn prev_wraps_to_end() {
        let mut c = carousel(3);
        assert_eq!(c.prev(), 2);
        assert_eq!(c.prev(), 1);
    }

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut c = carousel(0);
        assert_eq!(c.next(), 0);
        assert_eq!(c.prev(), 0);
        assert!(!c.go_to(0));
    }

    #[test]
    fn go_to_ignores_out_of_range() {
        let mut c = carousel(3);
        assert!(c.go_to(2));
        assert!(!c.go_to(3));
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn shrinking_clamps_index() {
        let mut c = carousel(5);
        c.go_to(4);
        c.set_len(2);
        assert_eq!(c.index(), 1);
        c.set_len(0);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn scroll_snaps_after_settling() {
        let t0 = Instant::now();
        let mut c = carousel(4);
        c.on_scroll(180.0, 300.0, t0);
        c.on_scroll(640.0, 300.0, t0 + ms(100));

        assert_eq!(c.poll(t0 + ms(200)), None);
        assert_eq!(c.poll(t0 + ms(250)), Some(2));
        assert_eq!(c.index(), 2);
        assert_eq!(c.offset_for(300.0), 600.0);
    }

    #[test]
    fn overscroll_snaps_to_last() {
        let t0 = Instant::now();
        let mut c = carousel(3);
        c.on_scroll(5000.0, 300.0, t0);
        assert_eq!(c.poll(t0 + ms(150)), Some(2));
    }

    #[test]
    fn settling_on_current_item_reports_nothing() {
        let t0 = Instant::now();
        let mut c = carousel(3);
        c.on_scroll(40.0, 300.0, t0);
        assert_eq!(c.poll(t0 + ms(150)), None);
        assert_eq!(c.index(), 0);
    }
}
