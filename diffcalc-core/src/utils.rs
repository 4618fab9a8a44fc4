//! Branch-cut helpers for solved angles.
//!
//! | Function | Input | Output Range |
//! |----------|-------|--------------|
//! | [`cut_at`] | radians | [cut, cut + 2π), with tolerance |
//! | [`cut_at_minus_pi`] | radians | [-π, π), with tolerance |
//!
//! Both functions differ from plain normalization in that a value
//! lying within [`SMALL`] of either end of the window is left alone. A solved
//! angle of `π + 1e-12` stays at `π` instead of flipping to `-π`.

use crate::constants::{PI, SMALL, TWOPI};
use crate::math::fmod;

/// Shifts `angle` by whole turns into the window `[cut, cut + 2π)`.
///
/// # Example
///
/// ```
/// use diffcalc_core::utils::cut_at;
/// use diffcalc_core::constants::PI;
///
/// assert!((cut_at(1.5 * PI, -PI) + 0.5 * PI).abs() < 1e-12);
/// assert!((cut_at(-0.5 * PI, 0.0) - 1.5 * PI).abs() < 1e-12);
/// // Within tolerance of the upper edge: untouched.
/// assert_eq!(cut_at(PI, -PI), PI);
/// ```
pub fn cut_at(angle: f64, cut: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let upper = cut + TWOPI;
    if angle < cut - SMALL {
        let a = upper + fmod(angle - cut, TWOPI);
        if a >= upper - SMALL {
            a - TWOPI
        } else {
            a
        }
    } else if angle >= upper + SMALL {
        let a = cut + fmod(angle - cut, TWOPI);
        if a < cut + SMALL {
            a + TWOPI
        } else {
            a
        }
    } else {
        angle
    }
}

/// Single-step wrap used when re-expressing candidate angles: values below
/// `-π` gain a turn, values at or beyond `π` lose one.
#[inline]
pub fn cut_at_minus_pi(angle: f64) -> f64 {
    if angle < -PI - SMALL {
        angle + TWOPI
    } else if angle >= PI + SMALL {
        angle - TWOPI
    } else {
        angle
    }
}
