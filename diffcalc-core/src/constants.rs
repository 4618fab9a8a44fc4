#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

/// Absolute tolerance used for every "is this effectively zero" decision in
/// the kinematics: degeneracy detection, bounded inverse trig, candidate
/// filtering and round-trip checks.
pub const SMALL: f64 = 1e-8;

/// Half-width, in radians, of the window around delta = 90° inside which
/// competing detector solutions are reduced to the one closest in theta.
pub const NEAR_NINETY_WINDOW: f64 = 0.01;
