//! Tolerance-aware scalar helpers.
//!
//! The solver works with closed-form trigonometry, so values that should be
//! exactly zero or exactly one come back with rounding noise. Everything here
//! compares against [`SMALL`](crate::constants::SMALL).
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`is_small`] | `|x| < SMALL` |
//! | [`nearly_equal`] | `|a - b| < SMALL` |
//! | [`sequence_nearly_equal`] | element-wise [`nearly_equal`] on slices |
//! | [`bound`] | clamp to [-1, 1], rejecting real overshoot |
//! | [`clamp_unit`] | clamp to [-1, 1] unconditionally |
//! | [`sign`] | -1, 0 or 1 |
//! | [`fmod`] | floating remainder, sign of `x` |

use crate::constants::SMALL;

#[inline]
pub fn fmod(x: f64, y: f64) -> f64 {
    libm::fmod(x, y)
}

#[inline]
pub fn is_small(x: f64) -> bool {
    x.abs() < SMALL
}

#[inline]
pub fn nearly_equal(a: f64, b: f64) -> bool {
    is_small(a - b)
}

/// Returns true when both slices have the same length and every pair of
/// elements is [`nearly_equal`].
pub fn sequence_nearly_equal(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| nearly_equal(*x, *y))
}

/// Clamps a would-be sine or cosine into [-1, 1].
///
/// Returns `None` when `x` lies outside [-1, 1] by more than the tolerance,
/// which means the caller asked for an angle that does not exist rather than
/// one perturbed by rounding.
///
/// ```
/// use diffcalc_core::math::bound;
///
/// assert_eq!(bound(0.5), Some(0.5));
/// assert_eq!(bound(1.0 + 1e-12), Some(1.0));
/// assert_eq!(bound(1.1), None);
/// ```
#[inline]
pub fn bound(x: f64) -> Option<f64> {
    if x.abs() > 1.0 + SMALL || x.is_nan() {
        None
    } else {
        Some(clamp_unit(x))
    }
}

#[inline]
pub fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
