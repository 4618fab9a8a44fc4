//! Detector stage: delta, nu and the Q azimuth qaz from theta and one
//! detector-group constraint.
//!
//! Q in the laboratory is fixed by theta and qaz:
//!
//! ```text
//! q_lab = (cos(theta) sin(qaz), -sin(theta), cos(theta) cos(qaz))
//! ```
//!
//! Fixing delta or nu pins qaz through `sin(delta) = sin(qaz) sin(2θ)` or
//! `tan(nu) = cos(qaz) tan(2θ)`; the remaining angles then follow.

use crate::constraints::DetectorConstraint;
use crate::error::{Error, Result, Stage};
use crate::reference::angle_between_naz_and_qaz;
use crate::trig::{acos_bounded, asin_bounded};
use diffcalc_core::constants::{RAD_TO_DEG, SMALL};
use diffcalc_core::math::{is_small, sign};

/// Provisional detector angles, correct up to branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorAngles {
    pub delta: f64,
    pub nu: f64,
    pub qaz: f64,
}

/// Detector angles together with the reference azimuth they imply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSolution {
    pub angles: DetectorAngles,
    pub naz: f64,
}

/// Derives delta, nu and qaz from theta and a fixed delta, nu or qaz.
///
/// [`DetectorConstraint::Naz`] is not a detector quantity and is rejected;
/// [`solve_detector`] handles it.
pub fn remaining_detector_angles(
    constraint: &DetectorConstraint,
    theta: f64,
) -> Result<DetectorAngles> {
    let two_theta = 2.0 * theta;
    let (sin_2theta, cos_2theta) = libm::sincos(two_theta);

    let require_scattering = || {
        if is_small(sin_2theta) {
            Err(Error::unreachable(
                Stage::Detector,
                format!(
                    "no meaningful scattering vector when theta is {:.4}",
                    theta * RAD_TO_DEG
                ),
            ))
        } else {
            Ok(())
        }
    };

    let qaz = match *constraint {
        DetectorConstraint::Delta(delta) => {
            require_scattering()?;
            asin_bounded(libm::sin(delta) / sin_2theta, Stage::Detector, "qaz")?
        }
        DetectorConstraint::Nu(nu) => {
            require_scattering()?;
            let cos_qaz = libm::tan(nu) / libm::tan(two_theta);
            if cos_qaz.abs() > 1.0 + SMALL {
                return Err(Error::unreachable(
                    Stage::Detector,
                    format!(
                        "nu={:.4} is greater than 2theta={:.4}",
                        nu * RAD_TO_DEG,
                        two_theta * RAD_TO_DEG
                    ),
                ));
            }
            acos_bounded(cos_qaz, Stage::Detector, "qaz")?
        }
        DetectorConstraint::Qaz(qaz) => qaz,
        DetectorConstraint::Naz(_) => {
            return Err(Error::unsupported(
                Stage::Detector,
                "naz does not fix a detector angle directly",
            ))
        }
    };

    let nu = match *constraint {
        DetectorConstraint::Nu(nu) => nu,
        _ => libm::atan2(sin_2theta * libm::cos(qaz), cos_2theta),
    };

    let delta = match *constraint {
        DetectorConstraint::Delta(delta) => delta,
        _ => {
            let (sin_qaz, cos_qaz) = libm::sincos(qaz);
            if !is_small(cos_qaz) {
                libm::atan2(sin_qaz * libm::sin(nu), cos_qaz)
            } else {
                sign(qaz) * acos_bounded(cos_2theta / libm::cos(nu), Stage::Detector, "delta")?
            }
        }
    };

    Ok(DetectorAngles { delta, nu, qaz })
}

/// Solves the detector stage, including the naz-constrained variant.
///
/// `alpha` and `tau` come from the reference stage and tie naz to qaz.
pub fn solve_detector(
    constraint: &DetectorConstraint,
    theta: f64,
    alpha: f64,
    tau: f64,
) -> Result<DetectorSolution> {
    let naz_qaz_angle = angle_between_naz_and_qaz(theta, alpha, tau)?;

    match *constraint {
        DetectorConstraint::Naz(naz) => {
            let qaz = naz - naz_qaz_angle;
            let (sin_2theta, cos_2theta) = libm::sincos(2.0 * theta);
            let (sin_qaz, cos_qaz) = libm::sincos(qaz);
            let nu = libm::atan2(sin_2theta * cos_qaz, cos_2theta);
            let delta = libm::atan2(sin_qaz * libm::sin(nu), cos_qaz);
            Ok(DetectorSolution {
                angles: DetectorAngles { delta, nu, qaz },
                naz,
            })
        }
        _ => {
            let angles = remaining_detector_angles(constraint, theta)?;
            Ok(DetectorSolution {
                angles,
                naz: angles.qaz - naz_qaz_angle,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::theta_and_qaz;
    use approx::assert_abs_diff_eq;
    use diffcalc_core::constants::{DEG_TO_RAD, HALF_PI};

    const THETA: f64 = 30.657299 * DEG_TO_RAD;

    fn assert_reproduces(angles: &DetectorAngles, theta: f64) {
        let (t, q) = theta_and_qaz(angles.delta, angles.nu);
        assert_abs_diff_eq!(t, theta, epsilon = 1e-12);
        assert_abs_diff_eq!(q, angles.qaz, epsilon = 1e-12);
    }

    #[test]
    fn test_nu_zero_scatters_in_vertical_plane() {
        let angles = remaining_detector_angles(&DetectorConstraint::Nu(0.0), THETA).unwrap();
        assert_abs_diff_eq!(angles.qaz, HALF_PI, epsilon = 1e-12);
        assert_abs_diff_eq!(angles.delta, 2.0 * THETA, epsilon = 1e-12);
        assert_eq!(angles.nu, 0.0);
    }

    #[test]
    fn test_delta_zero_scatters_in_horizontal_plane() {
        let angles = remaining_detector_angles(&DetectorConstraint::Delta(0.0), THETA).unwrap();
        assert_abs_diff_eq!(angles.qaz, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angles.nu, 2.0 * THETA, epsilon = 1e-12);
        assert_reproduces(&angles, THETA);
    }

    #[test]
    fn test_fixed_qaz() {
        let qaz = 40.0 * DEG_TO_RAD;
        let angles = remaining_detector_angles(&DetectorConstraint::Qaz(qaz), THETA).unwrap();
        assert_eq!(angles.qaz, qaz);
        assert_reproduces(&angles, THETA);
    }

    #[test]
    fn test_fixed_delta_and_nu_reproduce_theta() {
        for constraint in [
            DetectorConstraint::Delta(20.0 * DEG_TO_RAD),
            DetectorConstraint::Nu(35.0 * DEG_TO_RAD),
        ] {
            let angles = remaining_detector_angles(&constraint, THETA).unwrap();
            assert_reproduces(&angles, THETA);
        }
    }

    #[test]
    fn test_nu_larger_than_two_theta() {
        let err = remaining_detector_angles(&DetectorConstraint::Nu(80.0 * DEG_TO_RAD), THETA)
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Detector);
        assert!(err.to_string().contains("greater than 2theta"));
    }

    #[test]
    fn test_zero_theta() {
        let err = remaining_detector_angles(&DetectorConstraint::Delta(0.0), 0.0).unwrap_err();
        assert!(err.to_string().contains("no meaningful scattering vector"));
    }

    #[test]
    fn test_naz_rejected_without_reference() {
        assert!(matches!(
            remaining_detector_angles(&DetectorConstraint::Naz(0.0), THETA),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_solve_detector_with_naz() {
        let alpha = 2.0 * DEG_TO_RAD;
        let tau = 78.690068 * DEG_TO_RAD;
        let solution =
            solve_detector(&DetectorConstraint::Naz(HALF_PI), THETA, alpha, tau).unwrap();
        assert_eq!(solution.naz, HALF_PI);
        assert_reproduces(&solution.angles, THETA);
    }

    #[test]
    fn test_solve_detector_derives_naz() {
        let alpha = 2.0 * DEG_TO_RAD;
        let tau = 78.690068 * DEG_TO_RAD;
        let solution =
            solve_detector(&DetectorConstraint::Nu(0.0), THETA, alpha, tau).unwrap();
        let angle = angle_between_naz_and_qaz(THETA, alpha, tau).unwrap();
        assert_abs_diff_eq!(solution.naz, solution.angles.qaz - angle, epsilon = 1e-15);
    }
}
