//! 3D Cartesian vectors in the laboratory and crystal (phi) frames.
//!
//! The diffractometer works in a right-handed laboratory frame with the beam
//! along +y and the vertical along +x. Scattering vectors, reference
//! directions and their images under the sample rotations are all
//! [`Vector3`] values.
//!
//! # Dot and Cross Products
//!
//! - **Dot product**: for unit vectors, `a.dot(&b)` is the cosine of the angle
//!   between them. [`angle_between`](Vector3::angle_between) combines it with
//!   the cross product to get the angle itself.
//! - **Cross product**: builds the third axis of an orthonormal frame from a
//!   scattering vector and a reference direction.
//!
//! ```
//! use diffcalc_core::Vector3;
//!
//! let a = Vector3::x_axis();
//! let b = Vector3::y_axis();
//!
//! assert_eq!(a.dot(&b), 0.0);
//! assert_eq!(a.cross(&b), Vector3::z_axis());
//! ```
use std::fmt;

/// A 3D Cartesian vector.
///
/// Components are public; most callers build vectors with [`new`](Self::new)
/// or [`from_array`](Self::from_array) and combine them with the arithmetic
/// operators.
///
/// ```
/// use diffcalc_core::Vector3;
///
/// let hkl = Vector3::new(1.0, 0.0, 0.2);
/// let doubled = hkl * 2.0;
/// assert_eq!(doubled.z, 0.4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn zeros() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn x_axis() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Unit vector along +y, the direction of the incident beam.
    #[inline]
    pub fn y_axis() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline]
    pub fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Euclidean length.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Returns a unit vector in the same direction.
    ///
    /// The zero vector is returned unchanged, since it has no direction.
    /// Callers that must reject a degenerate input check
    /// [`magnitude`](Self::magnitude) first.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            *self
        } else {
            *self / mag
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Right-handed cross product `self × other`.
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Angle in radians between two vectors, in [0, π].
    ///
    /// Evaluated as `atan2(|a × b|, a · b)`, which stays accurate for nearly
    /// parallel and nearly antiparallel vectors. Returns NaN when either
    /// vector is zero.
    ///
    /// ```
    /// use diffcalc_core::Vector3;
    /// use std::f64::consts::FRAC_PI_2;
    ///
    /// let angle = Vector3::x_axis().angle_between(&Vector3::new(0.0, 3.0, 0.0));
    /// assert!((angle - FRAC_PI_2).abs() < 1e-15);
    /// ```
    pub fn angle_between(&self, other: &Self) -> f64 {
        if self.magnitude() == 0.0 || other.magnitude() == 0.0 {
            return f64::NAN;
        }
        libm::atan2(self.cross(other).magnitude(), self.dot(other))
    }

    #[inline]
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl std::ops::Mul<Vector3> for f64 {
    type Output = Vector3;

    fn mul(self, vec: Vector3) -> Vector3 {
        vec * self
    }
}

impl std::ops::Div<f64> for Vector3 {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl std::ops::Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::Index<usize> for Vector3 {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3 index out of bounds: {}", index),
        }
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}, {:.6}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HALF_PI;

    #[test]
    fn test_magnitude_and_normalize() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        assert_eq!(v.magnitude(), 5.0);
        let unit = v.normalize();
        assert!((unit.magnitude() - 1.0).abs() < 1e-15);
        assert!((unit.x - 0.6).abs() < 1e-15);
    }

    #[test]
    fn test_normalize_zero_is_identity() {
        assert_eq!(Vector3::zeros().normalize(), Vector3::zeros());
    }

    #[test]
    fn test_cross_is_right_handed() {
        assert_eq!(Vector3::y_axis().cross(&Vector3::z_axis()), Vector3::x_axis());
        assert_eq!(Vector3::z_axis().cross(&Vector3::x_axis()), Vector3::y_axis());
    }

    #[test]
    fn test_angle_between() {
        let a = Vector3::new(1.0, 0.0, 0.2);
        assert_eq!(a.angle_between(&a), 0.0);
        assert!((a.angle_between(&(a + Vector3::new(0.0, 1e-9, 0.0))) - 9.8e-10).abs() < 1e-11);
        assert!((Vector3::x_axis().angle_between(&Vector3::z_axis()) - HALF_PI).abs() < 1e-15);
        assert!(Vector3::zeros().angle_between(&a).is_nan());
    }

    #[test]
    fn test_operators() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Vector3::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Vector3::new(0.5, 1.5, 2.5));
        assert_eq!(2.0 * b, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(-a, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(a[2], 3.0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_bounds() {
        let _ = Vector3::zeros()[3];
    }

    #[test]
    fn test_display() {
        let s = format!("{}", Vector3::new(1.0, 0.0, -0.5));
        assert_eq!(s, "[1.000000, 0.000000, -0.500000]");
    }
}
