//! The UB orientation matrix.
//!
//! UB maps Miller indices to the scattering vector in the phi frame (the
//! frame attached to the innermost sample circle), in units of 2π/length.
//! Computing or refining UB is outside this crate; it arrives as a plain
//! [`Matrix3`] and is only validated here.

use crate::error::{Error, Result};
use diffcalc_core::{Matrix3, Vector3};

/// An invertible UB matrix with its inverse cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UbMatrix {
    ub: Matrix3,
    inverse: Matrix3,
}

impl UbMatrix {
    /// Wraps `ub`, failing with [`Error::SingularUb`] if it cannot be inverted.
    ///
    /// ```
    /// use diffcalc_core::{constants::TWOPI, Matrix3};
    /// use diffcalc_hkl::{Error, UbMatrix};
    ///
    /// assert!(UbMatrix::new(Matrix3::identity().scale(TWOPI)).is_ok());
    /// assert_eq!(
    ///     UbMatrix::new(Matrix3::from_array([[0.0; 3]; 3])),
    ///     Err(Error::SingularUb)
    /// );
    /// ```
    pub fn new(ub: Matrix3) -> Result<Self> {
        let inverse = ub.try_inverse().ok_or(Error::SingularUb)?;
        Ok(Self { ub, inverse })
    }

    pub fn matrix(&self) -> &Matrix3 {
        &self.ub
    }

    pub fn inverse(&self) -> &Matrix3 {
        &self.inverse
    }

    /// `UB · hkl`
    pub fn hkl_to_phi_frame(&self, hkl: [f64; 3]) -> Vector3 {
        self.ub * Vector3::from_array(hkl)
    }

    /// `UB⁻¹ · q_phi`
    pub fn phi_frame_to_hkl(&self, q_phi: Vector3) -> [f64; 3] {
        (self.inverse * q_phi).to_array()
    }
}
