//! Reflection and reference stages: Bragg angle, then the (psi, alpha, beta)
//! triple fixed by the reference constraint.
//!
//! With `tau` the angle between Q and the reference direction n, the three
//! reference angles are tied together by
//!
//! ```text
//! sin(alpha) = cos(tau) sin(theta) - cos(theta) sin(tau) cos(psi)
//! sin(beta)  = cos(tau) sin(theta) + cos(theta) sin(tau) cos(psi)
//! ```
//!
//! so fixing any one of them (or demanding alpha = beta) fixes the others.

use crate::constraints::ReferenceConstraint;
use crate::error::{Error, Result, Stage};
use crate::trig::{acos_bounded, asin_bounded};
use diffcalc_core::constants::{RAD_TO_DEG, TWOPI};
use diffcalc_core::math::{bound, is_small};
use diffcalc_core::Vector3;

/// Reference angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceAngles {
    pub psi: f64,
    pub alpha: f64,
    pub beta: f64,
}

/// Bragg angle for a phi-frame scattering vector.
///
/// Fails when `|Q|` is zero, or longer than the diameter of the Ewald sphere
/// (`2 · 2π/λ`).
///
/// ```
/// use diffcalc_core::{constants::TWOPI, Vector3};
/// use diffcalc_hkl::bragg_angle;
///
/// let theta = bragg_angle(&Vector3::new(TWOPI, 0.0, 0.0), 1.0).unwrap();
/// assert!((theta.to_degrees() - 30.0).abs() < 1e-10);
/// assert!(bragg_angle(&Vector3::new(3.0 * TWOPI, 0.0, 0.0), 1.0).is_err());
/// ```
pub fn bragg_angle(q_phi: &Vector3, wavelength: f64) -> Result<f64> {
    let q_length = q_phi.magnitude();
    if is_small(q_length) {
        return Err(Error::unreachable(Stage::Reflection, "|Q| is 0"));
    }
    let wavevector = TWOPI / wavelength;
    bound(q_length / (2.0 * wavevector))
        .map(libm::asin)
        .ok_or_else(|| {
            Error::unreachable(
                Stage::Reflection,
                format!(
                    "|Q| = {:.6} is longer than 2k = {:.6}",
                    q_length,
                    2.0 * wavevector
                ),
            )
        })
}

/// Solves the reference triple for one reference constraint.
pub fn solve_reference(
    constraint: &ReferenceConstraint,
    theta: f64,
    tau: f64,
) -> Result<ReferenceAngles> {
    let name = constraint.name();
    let (sin_tau, cos_tau) = libm::sincos(tau);
    let (sin_theta, cos_theta) = libm::sincos(theta);

    if is_small(sin_tau) {
        return Err(Error::unreachable(
            Stage::Reference,
            format!(
                "{} cannot fix a unique azimuth (psi): Q is parallel to the reference vector",
                name
            ),
        ));
    }
    if is_small(cos_theta) {
        return Err(Error::unreachable(
            Stage::Reference,
            format!(
                "{} cannot fix a unique azimuth (psi): Q is parallel to the beam",
                name
            ),
        ));
    }

    let (alpha, beta) = match *constraint {
        ReferenceConstraint::Psi(psi) => {
            let what = format!("psi={:.4}", psi * RAD_TO_DEG);
            let cos_psi = libm::cos(psi);
            let alpha = asin_bounded(
                cos_tau * sin_theta - cos_theta * sin_tau * cos_psi,
                Stage::Reference,
                &what,
            )?;
            let beta = asin_bounded(
                cos_tau * sin_theta + cos_theta * sin_tau * cos_psi,
                Stage::Reference,
                &what,
            )?;
            return Ok(ReferenceAngles { psi, alpha, beta });
        }
        ReferenceConstraint::AEqB => {
            let alpha = asin_bounded(cos_tau * sin_theta, Stage::Reference, "a_eq_b")?;
            (alpha, alpha)
        }
        ReferenceConstraint::Alpha(alpha) => {
            let beta = asin_bounded(
                2.0 * sin_theta * cos_tau - libm::sin(alpha),
                Stage::Reference,
                &format!("alpha={:.4}", alpha * RAD_TO_DEG),
            )?;
            (alpha, beta)
        }
        ReferenceConstraint::Beta(beta) => {
            let alpha = asin_bounded(
                2.0 * sin_theta * cos_tau - libm::sin(beta),
                Stage::Reference,
                &format!("beta={:.4}", beta * RAD_TO_DEG),
            )?;
            (alpha, beta)
        }
    };

    let psi = acos_bounded(
        (cos_tau * sin_theta - libm::sin(alpha)) / (sin_tau * cos_theta),
        Stage::Reference,
        "psi",
    )?;
    Ok(ReferenceAngles { psi, alpha, beta })
}

/// Angle between the azimuths of the reference direction and of Q.
pub fn angle_between_naz_and_qaz(theta: f64, alpha: f64, tau: f64) -> Result<f64> {
    let (sin_alpha, cos_alpha) = libm::sincos(alpha);
    let (sin_theta, cos_theta) = libm::sincos(theta);
    let bottom = cos_alpha * cos_theta;
    if is_small(bottom) {
        return Err(Error::unreachable(
            Stage::Detector,
            "cos(alpha) or cos(theta) is too small to fix naz relative to qaz",
        ));
    }
    acos_bounded(
        (libm::cos(tau) - sin_alpha * sin_theta) / bottom,
        Stage::Detector,
        "naz - qaz",
    )
}
