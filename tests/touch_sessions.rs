//! Whole touch sessions driven through the public API, the way a host page
//! feeds browser touch events and timer ticks.

use spotpin::config::AppConfig;
use spotpin::geometry::{LatLng, MapProjection, Point, Size, Vector};
use spotpin::gesture::{Gesture, LongPressDetector, TouchEvent};
use spotpin::lightbox::{Key, Lightbox, LightboxEvent, LightboxState, ViewTransform};
use spotpin::spot::{NewSpotRequest, ValidationError};
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn open_lightbox(index: usize, count: usize) -> Lightbox {
    let mut lb = Lightbox::new(&AppConfig::default(), Size::new(400.0, 800.0));
    lb.open(index, count);
    lb
}

fn tap(lb: &mut Lightbox, at: Point, t: Instant) {
    lb.touch(&TouchEvent::start(vec![at], t));
    lb.touch(&TouchEvent::end(vec![], vec![at], t + ms(40)));
}

#[test]
fn browse_zoom_pan_and_close() {
    let t = Instant::now();
    let mut lb = open_lightbox(0, 3);

    // Swipe left: next image, identity transform.
    lb.touch(&TouchEvent::start(vec![p(300.0, 400.0)], t));
    lb.touch(&TouchEvent::moved(vec![p(220.0, 400.0)], t + ms(30)));
    lb.touch(&TouchEvent::end(vec![], vec![p(180.0, 400.0)], t + ms(60)));
    assert_eq!(lb.index(), 1);
    assert_eq!(lb.transform(), ViewTransform::IDENTITY);
    assert_eq!(lb.counter_label().as_deref(), Some("2 / 3"));

    // Pinch out to double the finger distance.
    let t = t + ms(500);
    lb.touch(&TouchEvent::start(vec![p(150.0, 400.0), p(250.0, 400.0)], t));
    lb.touch(&TouchEvent::moved(
        vec![p(100.0, 400.0), p(300.0, 400.0)],
        t + ms(50),
    ));
    assert_eq!(lb.transform().scale, 2.0);
    assert_eq!(lb.state(), LightboxState::OpenZoomed);
    assert!(!lb.show_navigation());

    // One finger lifts; the other is ignored until it comes down again.
    lb.touch(&TouchEvent::end(
        vec![p(300.0, 400.0)],
        vec![p(100.0, 400.0)],
        t + ms(80),
    ));
    lb.touch(&TouchEvent::moved(vec![p(320.0, 420.0)], t + ms(90)));
    lb.touch(&TouchEvent::end(vec![], vec![p(320.0, 420.0)], t + ms(100)));
    assert_eq!(lb.transform().translate, Vector::ZERO);

    // Drag the zoomed image.
    let t = t + ms(500);
    lb.touch(&TouchEvent::start(vec![p(200.0, 400.0)], t));
    lb.touch(&TouchEvent::moved(vec![p(220.0, 410.0)], t + ms(20)));
    assert_eq!(lb.state(), LightboxState::OpenDragging);
    lb.touch(&TouchEvent::moved(vec![p(260.0, 430.0)], t + ms(40)));
    lb.touch(&TouchEvent::end(vec![], vec![p(260.0, 430.0)], t + ms(60)));
    assert_eq!(lb.transform().translate, Vector::new(60.0, 30.0));
    assert_eq!(lb.state(), LightboxState::OpenZoomed);

    // Arrow keys do nothing while zoomed.
    lb.key(Key::ArrowRight);
    assert_eq!(lb.index(), 1);

    // Double-tap resets the zoom.
    let t = t + ms(500);
    tap(&mut lb, p(200.0, 400.0), t);
    tap(&mut lb, p(202.0, 401.0), t + ms(150));
    assert_eq!(lb.transform(), ViewTransform::IDENTITY);
    assert_eq!(lb.state(), LightboxState::OpenIdle);

    lb.key(Key::Escape);
    assert!(!lb.is_open());

    assert_eq!(
        lb.drain_events(),
        vec![
            LightboxEvent::IndexChanged(1),
            LightboxEvent::ZoomChanged(true),
            LightboxEvent::ZoomChanged(false),
            LightboxEvent::Closed,
        ]
    );
}

#[test]
fn double_tap_zooms_toward_the_tapped_point() {
    let t = Instant::now();
    let mut lb = open_lightbox(0, 1);

    tap(&mut lb, p(100.0, 100.0), t);
    tap(&mut lb, p(100.0, 100.0), t + ms(120));

    assert_eq!(lb.transform().scale, 2.0);
    assert_eq!(lb.transform().translate, Vector::new(100.0, 300.0));
    assert_eq!(lb.css_transform(), "scale(2) translate(50px, 150px)");
    assert_eq!(lb.counter_label(), None);
}

#[test]
fn slow_taps_do_not_zoom() {
    let t = Instant::now();
    let mut lb = open_lightbox(0, 2);

    tap(&mut lb, p(100.0, 100.0), t);
    tap(&mut lb, p(100.0, 100.0), t + ms(600));

    assert_eq!(lb.transform(), ViewTransform::IDENTITY);
}

/// A map where one pixel is a thousandth of a degree from a fixed origin.
struct GridMap;

impl MapProjection for GridMap {
    fn unproject(&self, point: Point) -> LatLng {
        LatLng::new(35.0 - point.y / 1000.0, 139.0 + point.x / 1000.0)
    }
}

#[test]
fn long_press_opens_a_form_at_the_pressed_location() {
    let config = AppConfig::default();
    let mut detector = LongPressDetector::new(&config.gestures);
    let t = Instant::now();

    detector.handle(&TouchEvent::start(vec![p(500.0, 250.0)], t));
    detector.handle(&TouchEvent::moved(vec![p(503.0, 252.0)], t + ms(200)));
    assert_eq!(detector.poll(t + ms(300)), None);

    let Some(Gesture::LongPress { at }) = detector.poll(t + ms(520)) else {
        panic!("long press did not fire");
    };
    assert_eq!(detector.poll(t + ms(900)), None);

    let mut form = NewSpotRequest::from_long_press(at, &GridMap).into_form();
    assert_eq!(form.location, Some(LatLng::new(34.75, 139.5)));
    assert_eq!(form.validate(1), Err(ValidationError::MissingTitle));

    form.title = "公園入口".to_string();
    assert_eq!(form.validate(0), Err(ValidationError::NoImages));
}

#[test]
fn map_drag_cancels_long_press() {
    let config = AppConfig::default();
    let mut detector = LongPressDetector::new(&config.gestures);
    let t = Instant::now();

    detector.handle(&TouchEvent::start(vec![p(500.0, 250.0)], t));
    detector.handle(&TouchEvent::moved(vec![p(540.0, 250.0)], t + ms(100)));

    assert!(!detector.is_armed());
    assert_eq!(detector.poll(t + ms(600)), None);
}
