//! Plane geometry for touch handling and view transforms.
//!
//! All coordinates are in logical pixels relative to the host viewport,
//! matching the `clientX`/`clientY` values a browser hands to touch handlers.
//! Nothing here allocates or fails.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// A position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A displacement between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Width and height of a viewport or container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).length()
}

/// Point halfway between `a` and `b`.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Translation that brings `tap` to the viewport center after zooming in.
///
/// The offset is scaled by `scale - 1`: at 2x the tapped point moves by
/// exactly its distance from the center.
pub fn offset_to_center(tap: Point, viewport: Size, scale: f64) -> Vector {
    let center = viewport.center();
    let factor = scale - 1.0;
    Vector::new((center.x - tap.x) * factor, (center.y - tap.y) * factor)
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Converts screen positions on the map canvas to geographic coordinates.
///
/// Implemented by whatever renders the map; this crate never projects on
/// its own.
pub trait MapProjection {
    fn unproject(&self, point: Point) -> LatLng;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_hypotenuse() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Point::new(12.5, -3.0);
        let b = Point::new(-7.0, 40.0);
        assert_eq!(distance(a, b), distance(b, a));
    }

    #[test]
    fn midpoint_between_two_touches() {
        let m = midpoint(Point::new(10.0, 20.0), Point::new(30.0, 60.0));
        assert_eq!(m, Point::new(20.0, 40.0));
    }

    #[test]
    fn point_difference_and_add() {
        let v = Point::new(5.0, 5.0) - Point::new(2.0, 1.0);
        assert_eq!(v, Vector::new(3.0, 4.0));
        assert_eq!(Point::new(2.0, 1.0) + v, Point::new(5.0, 5.0));
    }

    #[test]
    fn vector_accumulates() {
        let mut v = Vector::ZERO;
        v += Vector::new(1.0, -2.0);
        v += Vector::new(0.5, 0.5);
        assert_eq!(v, Vector::new(1.5, -1.5));
    }

    #[test]
    fn offset_at_double_zoom_equals_distance_from_center() {
        let viewport = Size::new(400.0, 800.0);
        let offset = offset_to_center(Point::new(100.0, 300.0), viewport, 2.0);
        assert_eq!(offset, Vector::new(100.0, 100.0));
    }

    #[test]
    fn offset_at_scale_one_is_zero() {
        let offset = offset_to_center(Point::new(5.0, 5.0), Size::new(100.0, 100.0), 1.0);
        assert_eq!(offset, Vector::ZERO);
    }
}
