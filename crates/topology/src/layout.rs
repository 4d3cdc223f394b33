//! Circle placement helpers

use std::f64::consts::PI;

/// Point `index` (0-based) of `count` evenly spaced on a circle.
///
/// The first point sits at angle `2π/count`, the last one at `2π` (i.e. on
/// the positive x axis).
pub fn circle_point(radius: f64, index: usize, count: usize) -> (f64, f64) {
    let angle = 2.0 * PI * (index + 1) as f64 / count as f64;
    (radius * angle.cos(), radius * angle.sin())
}

/// Round one axis to the nearest integer, ties to even
pub fn round_coord(v: f64) -> i64 {
    v.round_ties_even() as i64
}
