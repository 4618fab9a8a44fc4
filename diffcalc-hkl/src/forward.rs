//! Forward kinematics: angles to hkl, and angles to virtual angles.

use crate::geometry::AxisMatrices;
use crate::position::Position;
use crate::ub::UbMatrix;
use diffcalc_core::constants::{RAD_TO_DEG, TWOPI};
use diffcalc_core::math::{bound, clamp_unit, is_small};
use diffcalc_core::{Matrix3, Vector3};
use std::fmt;

/// Quantities derived from a position that are not themselves motor angles.
/// All in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualAngles {
    /// Bragg angle, half of the total scattering angle.
    pub theta: f64,
    /// Azimuth of Q in the laboratory.
    pub qaz: f64,
    /// Incidence angle relative to the reference plane.
    pub alpha: f64,
    /// Azimuth of the reference direction in the laboratory.
    pub naz: f64,
    /// Angle between Q and the reference direction.
    pub tau: f64,
    /// Azimuth of the reference direction about Q; `None` when Q is parallel
    /// to the reference direction or to the beam.
    pub psi: Option<f64>,
    /// Exit angle relative to the reference plane.
    pub beta: f64,
}

impl fmt::Display for VirtualAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "theta={:.4}, qaz={:.4}, alpha={:.4}, naz={:.4}, tau={:.4}, psi=",
            self.theta * RAD_TO_DEG,
            self.qaz * RAD_TO_DEG,
            self.alpha * RAD_TO_DEG,
            self.naz * RAD_TO_DEG,
            self.tau * RAD_TO_DEG,
        )?;
        match self.psi {
            Some(psi) => write!(f, "{:.4}", psi * RAD_TO_DEG)?,
            None => f.write_str("undefined")?,
        }
        write!(f, ", beta={:.4}", self.beta * RAD_TO_DEG)
    }
}

/// Miller indices reached at `position`.
///
/// The scattering vector is built in the laboratory as
/// `(NU·DELTA - I)·(0, 2π/λ, 0)`, carried back through the sample stack into
/// the phi frame and then through `UB⁻¹`.
///
/// `wavelength` must be positive; the calculator checks it before calling.
pub fn angles_to_hkl(position: &Position, wavelength: f64, ub: &UbMatrix) -> [f64; 3] {
    let matrices = AxisMatrices::from_position(position);
    let k = TWOPI / wavelength;
    let q_lab =
        (matrices.detector_rotation() - Matrix3::identity()) * Vector3::new(0.0, k, 0.0);
    let q_phi = matrices.sample_rotation().transpose() * q_lab;
    ub.phi_frame_to_hkl(q_phi)
}

/// Bragg angle and Q azimuth produced by a pair of detector angles.
pub fn theta_and_qaz(delta: f64, nu: f64) -> (f64, f64) {
    let cos_2theta = libm::cos(delta) * libm::cos(nu);
    let theta = libm::acos(clamp_unit(cos_2theta)) / 2.0;
    let qaz = libm::atan2(libm::tan(delta), libm::sin(nu));
    (theta, qaz)
}

/// Virtual angles at `position` for a phi-frame reference direction.
///
/// ```
/// use diffcalc_core::Vector3;
/// use diffcalc_hkl::{angles_to_virtual, Position};
///
/// let v = angles_to_virtual(&Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0), &Vector3::z_axis());
/// assert!((v.theta.to_degrees() - 30.0).abs() < 1e-10);
/// assert!((v.tau.to_degrees() - 90.0).abs() < 1e-10);
/// ```
pub fn angles_to_virtual(position: &Position, reference: &Vector3) -> VirtualAngles {
    let (theta, qaz) = theta_and_qaz(position.delta, position.nu);

    let matrices = AxisMatrices::from_position(position);
    let n_lab = matrices.sample_rotation() * reference.normalize();
    let alpha = libm::asin(clamp_unit(-n_lab.y));
    let naz = libm::atan2(n_lab.x, n_lab.z);

    let (sin_alpha, cos_alpha) = libm::sincos(alpha);
    let (sin_theta, cos_theta) = libm::sincos(theta);

    // The cosine rule loses precision near tau = 0 and π; use the vectors
    // directly whenever Q is non-zero.
    let q_lab = (matrices.detector_rotation() - Matrix3::identity()) * Vector3::y_axis();
    let tau = if is_small(q_lab.magnitude()) {
        let cos_tau = cos_alpha * cos_theta * libm::cos(naz - qaz) + sin_alpha * sin_theta;
        libm::acos(clamp_unit(cos_tau))
    } else {
        q_lab.angle_between(&n_lab)
    };

    let beta = libm::asin(clamp_unit(2.0 * sin_theta * libm::cos(tau) - sin_alpha));

    let sin_tau = libm::sin(tau);
    let psi = if is_small(sin_tau) || is_small(cos_theta) {
        None
    } else {
        bound((libm::cos(tau) * sin_theta - sin_alpha) / (sin_tau * cos_theta)).map(libm::acos)
    };

    VirtualAngles {
        theta,
        qaz,
        alpha,
        naz,
        tau,
        psi,
        beta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use diffcalc_core::constants::{DEG_TO_RAD, HALF_PI};

    fn cubic_ub() -> UbMatrix {
        UbMatrix::new(Matrix3::identity().scale(TWOPI)).unwrap()
    }

    #[test]
    fn test_tau_matches_cosine_rule_off_axis() {
        let n = Vector3::z_axis();
        for (pos, tau_deg) in [
            (Position::from_degrees(3.0, 50.0, 10.0, 20.0, 30.0, 40.0), 51.376445278),
            (Position::from_degrees(-12.0, 35.0, -25.0, 70.0, -60.0, 150.0), 135.558044476),
        ] {
            let v = angles_to_virtual(&pos, &n);
            let cos_tau = libm::cos(v.alpha) * libm::cos(v.theta) * libm::cos(v.naz - v.qaz)
                + libm::sin(v.alpha) * libm::sin(v.theta);
            assert_abs_diff_eq!(v.tau, libm::acos(cos_tau), epsilon = 1e-10);
            assert_abs_diff_eq!(v.tau, tau_deg * DEG_TO_RAD, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_symmetric_reflection_along_x() {
        let pos = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0);
        let hkl = angles_to_hkl(&pos, 1.0, &cubic_ub());
        assert_abs_diff_eq!(hkl[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hkl[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hkl[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wavelength_scales_hkl() {
        let pos = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0);
        let hkl = angles_to_hkl(&pos, 0.5, &cubic_ub());
        assert_abs_diff_eq!(hkl[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_detector_gives_zero_q() {
        let pos = Position::from_degrees(10.0, 0.0, 0.0, 20.0, 30.0, 40.0);
        let hkl = angles_to_hkl(&pos, 1.0, &cubic_ub());
        for v in hkl {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_theta_and_qaz() {
        let (theta, qaz) = theta_and_qaz(60.0 * DEG_TO_RAD, 0.0);
        assert_abs_diff_eq!(theta, 30.0 * DEG_TO_RAD, epsilon = 1e-12);
        assert_abs_diff_eq!(qaz, HALF_PI, epsilon = 1e-12);

        let (theta, qaz) = theta_and_qaz(0.0, 40.0 * DEG_TO_RAD);
        assert_abs_diff_eq!(theta, 20.0 * DEG_TO_RAD, epsilon = 1e-12);
        assert_abs_diff_eq!(qaz, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_virtual_angles_in_symmetric_position() {
        let pos = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 0.0, 0.0);
        let v = angles_to_virtual(&pos, &Vector3::z_axis());
        assert_abs_diff_eq!(v.theta, 30.0 * DEG_TO_RAD, epsilon = 1e-12);
        assert_abs_diff_eq!(v.qaz, HALF_PI, epsilon = 1e-12);
        assert_abs_diff_eq!(v.alpha, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.naz, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.tau, HALF_PI, epsilon = 1e-12);
        assert_abs_diff_eq!(v.beta, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.psi.unwrap(), HALF_PI, epsilon = 1e-12);
    }

    #[test]
    fn test_psi_undefined_when_q_parallel_to_reference() {
        // Q along lab +x, with chi = 90 the phi-frame z axis also lies along +x.
        let pos = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 90.0, 0.0);
        let v = angles_to_virtual(&pos, &Vector3::z_axis());
        assert_abs_diff_eq!(v.tau, 0.0, epsilon = 1e-7);
        assert!(v.psi.is_none());
    }

    #[test]
    fn test_display_marks_undefined_psi() {
        let pos = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 90.0, 0.0);
        let s = angles_to_virtual(&pos, &Vector3::z_axis()).to_string();
        assert!(s.contains("psi=undefined"));
    }
}
