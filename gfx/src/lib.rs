#![forbid(unsafe_code)]

pub mod canvas_font;
pub mod canvas_ops;
pub mod draw_buffer;

pub use draw_buffer::DrawBuffer;

use core::f64::consts::TAU;

/// Wrap an angle in radians into `[0, 2π)`.
#[inline]
pub fn normalize_angle(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}
