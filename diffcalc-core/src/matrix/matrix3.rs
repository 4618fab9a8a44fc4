//! 3x3 matrices for diffractometer kinematics.
//!
//! Two kinds of matrix flow through the solver:
//!
//! - **Axis rotations**, one per circle of the instrument, built with
//!   [`x_rotation`](Matrix3::x_rotation), [`y_rotation`](Matrix3::y_rotation)
//!   and [`z_rotation`](Matrix3::z_rotation).
//! - **General matrices** such as the UB orientation matrix, which is not
//!   orthogonal and needs a true [`try_inverse`](Matrix3::try_inverse).
//!
//! # Rotation Convention
//!
//! Rotations here are *active*: the vector is turned, the frame stays put. A
//! positive rotation of 90 degrees about Z takes `[1, 0, 0]` to `[0, 1, 0]`.
//!
//! ```text
//! Rx(t) = | 1   0    0  |   Ry(t) = |  c  0  s |   Rz(t) = | c  -s  0 |
//!         | 0   c   -s  |           |  0  1  0 |           | s   c  0 |
//!         | 0   s    c  |           | -s  0  c |           | 0   0  1 |
//! ```
//!
//! Circles that turn left-handed about their axis are expressed by negating
//! the angle at the call site, not by a second convention here.
//!
//! # Storage Layout
//!
//! Row-major `[[f64; 3]; 3]`; `m[(i, j)]` is row `i`, column `j`.
//!
//! ```
//! use diffcalc_core::{Matrix3, Vector3};
//! use std::f64::consts::FRAC_PI_2;
//!
//! let rz = Matrix3::z_rotation(FRAC_PI_2);
//! let v = rz * Vector3::x_axis();
//! assert!(v.x.abs() < 1e-15);
//! assert!((v.y - 1.0).abs() < 1e-15);
//! ```

use super::Vector3;
use std::fmt;

/// A general 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix3 {
    elements: [[f64; 3]; 3],
}

impl Matrix3 {
    pub fn identity() -> Self {
        Self {
            elements: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Creates a matrix from a row-major array: `elements[i][j]` is row `i`,
    /// column `j`.
    pub fn from_array(elements: [[f64; 3]; 3]) -> Self {
        Self { elements }
    }

    /// Builds a matrix whose columns are the three given vectors.
    ///
    /// ```
    /// use diffcalc_core::{Matrix3, Vector3};
    ///
    /// let m = Matrix3::from_columns(Vector3::x_axis(), Vector3::y_axis(), Vector3::z_axis());
    /// assert_eq!(m, Matrix3::identity());
    /// ```
    pub fn from_columns(c0: Vector3, c1: Vector3, c2: Vector3) -> Self {
        Self::from_array([[c0.x, c1.x, c2.x], [c0.y, c1.y, c2.y], [c0.z, c1.z, c2.z]])
    }

    /// Active rotation by `angle` radians about +X.
    pub fn x_rotation(angle: f64) -> Self {
        let (s, c) = libm::sincos(angle);
        Self::from_array([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    /// Active rotation by `angle` radians about +Y.
    pub fn y_rotation(angle: f64) -> Self {
        let (s, c) = libm::sincos(angle);
        Self::from_array([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    /// Active rotation by `angle` radians about +Z.
    pub fn z_rotation(angle: f64) -> Self {
        let (s, c) = libm::sincos(angle);
        Self::from_array([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.elements[row][col]
    }

    pub fn elements(&self) -> &[[f64; 3]; 3] {
        &self.elements
    }

    pub fn column(&self, col: usize) -> Vector3 {
        Vector3::new(
            self.elements[0][col],
            self.elements[1][col],
            self.elements[2][col],
        )
    }

    /// Matrix product `self * other`; `other` acts on a vector first.
    pub fn multiply(&self, other: &Self) -> Self {
        let mut result = [[0.0; 3]; 3];

        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                for k in 0..3 {
                    *cell += self.elements[i][k] * other.elements[k][j];
                }
            }
        }

        Self::from_array(result)
    }

    /// Multiplies every element by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        let mut result = self.elements;
        for row in result.iter_mut() {
            for cell in row.iter_mut() {
                *cell *= factor;
            }
        }
        Self::from_array(result)
    }

    pub fn apply_to_vector(&self, vector: [f64; 3]) -> [f64; 3] {
        [
            self.elements[0][0] * vector[0]
                + self.elements[0][1] * vector[1]
                + self.elements[0][2] * vector[2],
            self.elements[1][0] * vector[0]
                + self.elements[1][1] * vector[1]
                + self.elements[1][2] * vector[2],
            self.elements[2][0] * vector[0]
                + self.elements[2][1] * vector[1]
                + self.elements[2][2] * vector[2],
        ]
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.elements;

        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Returns the transpose. For a rotation this is also the inverse.
    pub fn transpose(&self) -> Self {
        let m = &self.elements;
        Self::from_array([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    /// General inverse via the adjugate.
    ///
    /// Returns `None` when the matrix is singular relative to its own scale:
    /// the determinant is compared against the cube of the largest element, so
    /// a UB matrix carrying a factor of 2π is judged the same way as its
    /// unscaled counterpart.
    ///
    /// ```
    /// use diffcalc_core::Matrix3;
    ///
    /// let m = Matrix3::from_array([[2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 0.5]]);
    /// let inv = m.try_inverse().unwrap();
    /// assert!((m * inv).max_difference(&Matrix3::identity()) < 1e-15);
    ///
    /// let singular = Matrix3::from_array([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
    /// assert!(singular.try_inverse().is_none());
    /// ```
    pub fn try_inverse(&self) -> Option<Self> {
        let m = &self.elements;
        let det = self.determinant();
        let scale = m
            .iter()
            .flat_map(|row| row.iter())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));

        if !det.is_finite() || scale == 0.0 || det.abs() <= 1e-12 * scale * scale * scale {
            return None;
        }

        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };

        let inv_det = 1.0 / det;
        Some(Self::from_array([
            [
                cof(1, 2, 1, 2) * inv_det,
                -cof(0, 2, 1, 2) * inv_det,
                cof(0, 1, 1, 2) * inv_det,
            ],
            [
                -cof(1, 2, 0, 2) * inv_det,
                cof(0, 2, 0, 2) * inv_det,
                -cof(0, 1, 0, 2) * inv_det,
            ],
            [
                cof(1, 2, 0, 1) * inv_det,
                -cof(0, 2, 0, 1) * inv_det,
                cof(0, 1, 0, 1) * inv_det,
            ],
        ]))
    }

    /// Checks orthogonality with determinant +1 within `tolerance`.
    pub fn is_rotation_matrix(&self, tolerance: f64) -> bool {
        if (self.determinant() - 1.0).abs() > tolerance {
            return false;
        }
        self.multiply(&self.transpose())
            .max_difference(&Self::identity())
            <= tolerance
    }

    /// Largest absolute element-wise difference.
    pub fn max_difference(&self, other: &Self) -> f64 {
        let mut max_diff: f64 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                let diff = (self.elements[i][j] - other.elements[i][j]).abs();
                max_diff = max_diff.max(diff);
            }
        }
        max_diff
    }
}

impl std::ops::Mul for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl std::ops::Mul<&Matrix3> for &Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: &Matrix3) -> Matrix3 {
        self.multiply(rhs)
    }
}

impl std::ops::Sub for Matrix3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut result = self.elements;
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell -= rhs.elements[i][j];
            }
        }
        Self::from_array(result)
    }
}

impl std::ops::Index<(usize, usize)> for Matrix3 {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.elements[row][col]
    }
}

impl std::ops::Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    fn mul(self, vec: Vector3) -> Vector3 {
        Vector3::from_array(self.apply_to_vector(vec.to_array()))
    }
}

impl std::ops::Mul<Vector3> for &Matrix3 {
    type Output = Vector3;

    fn mul(self, vec: Vector3) -> Vector3 {
        Vector3::from_array(self.apply_to_vector(vec.to_array()))
    }
}

impl fmt::Display for Matrix3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix3:")?;
        for row in &self.elements {
            writeln!(f, "  [{:12.9} {:12.9} {:12.9}]", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
