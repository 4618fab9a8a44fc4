//! Per-circle rotation matrices of the six-circle diffractometer.
//!
//! Laboratory frame: beam along +y, x vertical, z completing a right-handed
//! set. Each circle rotates about a lab axis; eta, phi and delta turn in the
//! negative sense about z.
//!
//! | Circle | Matrix |
//! |--------|--------|
//! | mu | `Rx(mu)` |
//! | delta | `Rz(-delta)` |
//! | nu | `Rx(nu)` |
//! | eta | `Rz(-eta)` |
//! | chi | `Ry(chi)` |
//! | phi | `Rz(-phi)` |
//!
//! The sample stack is `MU·ETA·CHI·PHI` (phi innermost) and the detector arm
//! is `NU·DELTA`.

use crate::position::Position;
use diffcalc_core::Matrix3;

#[inline]
pub fn mu_matrix(mu: f64) -> Matrix3 {
    Matrix3::x_rotation(mu)
}

#[inline]
pub fn delta_matrix(delta: f64) -> Matrix3 {
    Matrix3::z_rotation(-delta)
}

#[inline]
pub fn nu_matrix(nu: f64) -> Matrix3 {
    Matrix3::x_rotation(nu)
}

#[inline]
pub fn eta_matrix(eta: f64) -> Matrix3 {
    Matrix3::z_rotation(-eta)
}

#[inline]
pub fn chi_matrix(chi: f64) -> Matrix3 {
    Matrix3::y_rotation(chi)
}

#[inline]
pub fn phi_matrix(phi: f64) -> Matrix3 {
    Matrix3::z_rotation(-phi)
}

/// The six circle matrices for one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMatrices {
    pub mu: Matrix3,
    pub delta: Matrix3,
    pub nu: Matrix3,
    pub eta: Matrix3,
    pub chi: Matrix3,
    pub phi: Matrix3,
}

impl AxisMatrices {
    pub fn from_position(position: &Position) -> Self {
        Self {
            mu: mu_matrix(position.mu),
            delta: delta_matrix(position.delta),
            nu: nu_matrix(position.nu),
            eta: eta_matrix(position.eta),
            chi: chi_matrix(position.chi),
            phi: phi_matrix(position.phi),
        }
    }

    /// `MU·ETA·CHI·PHI`: carries phi-frame vectors into the laboratory.
    pub fn sample_rotation(&self) -> Matrix3 {
        self.mu * self.eta * self.chi * self.phi
    }

    /// `NU·DELTA`: carries the incident wavevector onto the scattered one.
    pub fn detector_rotation(&self) -> Matrix3 {
        self.nu * self.delta
    }
}
