// core/smoothing.rs
//
// Frame-rate coupled interpolation helpers. No engine state, just math.

use glam::Vec2;

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Close `factor` of the gap between `current` and `target`.
///
/// Applied once per frame this is an exponential approach: after `n` frames
/// the remaining gap is `(1 - factor)^n` of the original, with no overshoot
/// for `factor` in `(0, 1]`.
#[inline]
pub fn approach(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}
