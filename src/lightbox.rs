//! Full-screen image viewer with zoom, pan and swipe navigation.
//!
//! ## States
//!
//! ```text
//! Closed ──open──▶ OpenIdle ◀──double-tap / pinch to 1──▶ OpenZoomed
//!                     │                                    │    ▲
//!                     └── swipe, buttons, arrow keys       pan  release
//!                                                          ▼    │
//!                                                      OpenDragging
//! ```
//!
//! Escape, the close button and a click on the backdrop close the viewer from
//! any open state. Navigation is disabled while zoomed, and every index change
//! resets the view to identity.
//!
//! The controller never renders anything. The host forwards input, reads
//! [`Lightbox::css_transform`] and friends, and drains [`LightboxEvent`]s.

use crate::carousel::Carousel;
use crate::config::{AppConfig, GestureConfig};
use crate::geometry::{Point, Size, Vector, offset_to_center};
use crate::gesture::{Direction, Gesture, GestureRecognizer, TouchEvent};

/// Zoom and pan applied to the visible image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate: Vector,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        translate: Vector::ZERO,
    };

    pub fn is_zoomed(&self) -> bool {
        self.scale > 1.0
    }

    /// Set the scale within `[1, max]`. Reaching 1 drops any pan.
    pub fn set_scale(&mut self, scale: f64, max: f64) {
        self.scale = scale.clamp(1.0, max);
        if self.scale <= 1.0 {
            self.scale = 1.0;
            self.translate = Vector::ZERO;
        }
    }

    /// CSS `transform` value. The translation is divided by the scale
    /// because CSS applies it inside the scaled coordinate space.
    pub fn css(&self) -> String {
        format!(
            "scale({}) translate({}px, {}px)",
            self.scale,
            self.translate.x / self.scale,
            self.translate.y / self.scale
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxState {
    Closed,
    OpenIdle,
    OpenZoomed,
    OpenDragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxEvent {
    IndexChanged(usize),
    ZoomChanged(bool),
    Closed,
}

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "Escape" => Some(Key::Escape),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Lightbox {
    gestures: GestureConfig,
    viewport: Size,
    carousel: Carousel,
    transform: ViewTransform,
    recognizer: GestureRecognizer,
    state: LightboxState,
    events: Vec<LightboxEvent>,
}

impl Lightbox {
    pub fn new(config: &AppConfig, viewport: Size) -> Self {
        Self {
            gestures: config.gestures.clone(),
            viewport,
            carousel: Carousel::new(0, &config.carousel),
            transform: ViewTransform::IDENTITY,
            recognizer: GestureRecognizer::new(config.gestures.clone()),
            state: LightboxState::Closed,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != LightboxState::Closed
    }

    pub fn index(&self) -> usize {
        self.carousel.index()
    }

    pub fn image_count(&self) -> usize {
        self.carousel.len()
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Open on `index` (clamped into range). Opening with no images does
    /// nothing.
    pub fn open(&mut self, index: usize, image_count: usize) {
        if image_count == 0 {
            return;
        }
        self.carousel.set_len(image_count);
        self.carousel.go_to(index.min(image_count - 1));
        self.transform = ViewTransform::IDENTITY;
        self.recognizer.reset();
        self.state = LightboxState::OpenIdle;
    }

    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.state = LightboxState::Closed;
        self.transform = ViewTransform::IDENTITY;
        self.recognizer.reset();
        self.events.push(LightboxEvent::Closed);
    }

    pub fn touch(&mut self, event: &TouchEvent) {
        if !self.is_open() {
            return;
        }
        let gestures = self.recognizer.handle(event, self.transform.scale);
        for gesture in gestures {
            self.apply(gesture);
        }
    }

    fn apply(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::DoubleTap { at } => self.toggle_zoom(at),
            Gesture::Pinch { scale } => {
                let was_zoomed = self.transform.is_zoomed();
                self.transform.set_scale(scale, self.gestures.max_scale);
                let zoomed = self.transform.is_zoomed();
                self.state = if zoomed {
                    LightboxState::OpenZoomed
                } else {
                    LightboxState::OpenIdle
                };
                if zoomed != was_zoomed {
                    self.events.push(LightboxEvent::ZoomChanged(zoomed));
                }
            }
            Gesture::Pan { delta } => {
                if self.transform.is_zoomed() {
                    self.transform.translate += delta;
                    self.state = LightboxState::OpenDragging;
                }
            }
            Gesture::Swipe(Direction::Previous) => self.prev(),
            Gesture::Swipe(Direction::Next) => self.next(),
            Gesture::Release => {
                if self.state == LightboxState::OpenDragging {
                    self.state = LightboxState::OpenZoomed;
                }
            }
            Gesture::Tap { .. } | Gesture::PinchStart | Gesture::LongPress { .. } => {}
        }
    }

    fn toggle_zoom(&mut self, at: Point) {
        if self.transform.is_zoomed() {
            self.reset_view();
        } else {
            let scale = self.gestures.zoom_scale;
            self.transform = ViewTransform {
                scale,
                translate: offset_to_center(at, self.viewport, scale),
            };
            self.state = LightboxState::OpenZoomed;
            self.events.push(LightboxEvent::ZoomChanged(true));
        }
    }

    fn reset_view(&mut self) {
        if self.transform.is_zoomed() {
            self.events.push(LightboxEvent::ZoomChanged(false));
        }
        self.transform = ViewTransform::IDENTITY;
        if self.is_open() {
            self.state = LightboxState::OpenIdle;
        }
    }

    fn navigate(&mut self, step: impl FnOnce(&mut Carousel) -> usize) {
        if !self.is_open() || self.transform.is_zoomed() {
            return;
        }
        let before = self.carousel.index();
        let after = step(&mut self.carousel);
        if after != before {
            self.reset_view();
            self.events.push(LightboxEvent::IndexChanged(after));
        }
    }

    pub fn prev(&mut self) {
        self.navigate(Carousel::prev);
    }

    pub fn next(&mut self) {
        self.navigate(Carousel::next);
    }

    pub fn key(&mut self, key: Key) {
        if !self.is_open() {
            return;
        }
        match key {
            Key::Escape => self.close(),
            Key::ArrowLeft => self.prev(),
            Key::ArrowRight => self.next(),
        }
    }

    pub fn overlay_click(&mut self) {
        self.close();
    }

    /// Follow a change in the underlying image list.
    pub fn set_image_count(&mut self, count: usize) {
        if count == 0 {
            self.close();
            self.carousel.set_len(0);
            return;
        }
        let before = self.carousel.index();
        self.carousel.set_len(count);
        let after = self.carousel.index();
        if after != before && self.is_open() {
            log::warn!("image list shrank to {}, index clamped {} → {}", count, before, after);
            self.reset_view();
            self.events.push(LightboxEvent::IndexChanged(after));
        }
    }

    pub fn drain_events(&mut self) -> Vec<LightboxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Previous/next buttons are shown only with several images, unzoomed.
    pub fn show_navigation(&self) -> bool {
        self.is_open() && self.carousel.len() > 1 && !self.transform.is_zoomed()
    }

    /// `"2 / 5"` style position label; absent for a single image.
    pub fn counter_label(&self) -> Option<String> {
        (self.is_open() && self.carousel.len() > 1)
            .then(|| format!("{} / {}", self.carousel.index() + 1, self.carousel.len()))
    }

    pub fn css_transform(&self) -> String {
        self.transform.css()
    }
}
