//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` down so it fits inside `max`, preserving aspect ratio.
///
/// Width is checked first; if the height still exceeds its bound after the
/// width pass, both are scaled again by the height ratio. Images already
/// inside the bounds are returned unchanged (never upscaled).
///
/// # Examples
/// ```
/// # use spotpin::imaging::fit_within;
/// // Landscape over the width bound
/// assert_eq!(fit_within((4000, 3000), (1920, 1920)), (1920, 1440));
///
/// // Portrait: width passes, height is the binding side
/// assert_eq!(fit_within((1500, 3000), (1920, 1920)), (960, 1920));
/// ```
pub fn fit_within(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (mut w, mut h) = (source.0 as f64, source.1 as f64);
    let (max_w, max_h) = (max.0 as f64, max.1 as f64);

    if w > max_w {
        h = h * max_w / w;
        w = max_w;
    }
    if h > max_h {
        w = w * max_h / h;
        h = max_h;
    }

    (to_pixels(w), to_pixels(h))
}

fn to_pixels(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Whether `source` needs resizing to fit `max`.
pub fn exceeds(source: (u32, u32), max: (u32, u32)) -> bool {
    source.0 > max.0 || source.1 > max.1
}
