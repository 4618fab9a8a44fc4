//! Sample stage: mu, eta, chi and phi once Q and n are known in both the
//! laboratory and phi frames.
//!
//! With one sample angle fixed, the rotation `MU·ETA·CHI·PHI` must carry the
//! phi-frame orthonormal frame built from (Q, n) onto the laboratory one.
//! With two sample angles fixed, the reference stage supplies psi and the
//! solve also yields the azimuth `xi` of Q, which the caller turns back into a
//! detector constraint.

use crate::constraints::SampleConstraint;
use crate::error::{Error, Result, Stage};
use crate::explorer::equivalent_values;
use crate::geometry::{chi_matrix, mu_matrix, phi_matrix};
use crate::position::Axis;
use crate::reporter::{Diagnostic, Reporter};
use crate::trig::{acos_bounded, asin_bounded};
use diffcalc_core::constants::{HALF_PI, PI};
use diffcalc_core::math::is_small;
use diffcalc_core::{Matrix3, Vector3};

/// Provisional sample angles, correct up to branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleAngles {
    pub mu: f64,
    pub eta: f64,
    pub chi: f64,
    pub phi: f64,
}

impl SampleAngles {
    pub fn to_array(&self) -> [f64; 4] {
        [self.mu, self.eta, self.chi, self.phi]
    }
}

/// Result of the two-sample-constraint solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleSolution {
    /// Azimuth of Q; qaz = xi + 90°.
    pub xi: f64,
    pub angles: SampleAngles,
}

/// Laboratory scattering direction for a Bragg angle and Q azimuth.
pub fn q_lab_direction(theta: f64, qaz: f64) -> Vector3 {
    let (sin_theta, cos_theta) = libm::sincos(theta);
    let (sin_qaz, cos_qaz) = libm::sincos(qaz);
    Vector3::new(cos_theta * sin_qaz, -sin_theta, cos_theta * cos_qaz)
}

/// Laboratory reference direction for an incidence angle and azimuth.
pub fn n_lab_direction(alpha: f64, naz: f64) -> Vector3 {
    let (sin_alpha, cos_alpha) = libm::sincos(alpha);
    let (sin_naz, cos_naz) = libm::sincos(naz);
    Vector3::new(cos_alpha * sin_naz, -sin_alpha, cos_alpha * cos_naz)
}

/// Orthonormal frame with columns `Q̂`, `(Q×n)×Q` and `Q×n`, normalized.
///
/// ```
/// use diffcalc_core::Vector3;
/// use diffcalc_hkl::orthonormal_frame;
///
/// let frame = orthonormal_frame(&Vector3::new(2.0, 0.0, 0.0), &Vector3::new(1.0, 1.0, 0.0)).unwrap();
/// assert!(frame.is_rotation_matrix(1e-12));
/// assert!(orthonormal_frame(&Vector3::x_axis(), &Vector3::x_axis()).is_err());
/// ```
pub fn orthonormal_frame(q: &Vector3, n: &Vector3) -> Result<Matrix3> {
    if is_small(q.magnitude()) || is_small(n.magnitude()) || is_small(q.angle_between(n)) {
        return Err(Error::unreachable(
            Stage::Sample,
            "Q and n are parallel and cannot define an orthonormal frame",
        ));
    }
    let q_unit = q.normalize();
    let q_cross_n = q_unit.cross(n);
    let in_plane = q_cross_n.cross(&q_unit).normalize();
    Ok(Matrix3::from_columns(
        q_unit,
        in_plane,
        q_cross_n.normalize(),
    ))
}

/// Solves the three free sample angles with one sample angle fixed.
pub fn solve_one_sample(
    constraint: &SampleConstraint,
    q_lab: &Vector3,
    n_lab: &Vector3,
    q_phi: &Vector3,
    n_phi: &Vector3,
    reporter: &dyn Reporter,
) -> Result<SampleAngles> {
    let n_lab_frame = orthonormal_frame(q_lab, n_lab)?;
    let n_phi_frame = orthonormal_frame(q_phi, n_phi)?;
    let lab_from_phi = n_lab_frame * n_phi_frame.transpose();

    match *constraint {
        SampleConstraint::Mu(mu) => {
            let v = mu_matrix(mu).transpose() * lab_from_phi;
            let mut phi = libm::atan2(v[(2, 1)], v[(2, 0)]);
            let mut eta = libm::atan2(-v[(1, 2)], v[(0, 2)]);
            let chi = libm::atan2(libm::hypot(v[(2, 0)], v[(2, 1)]), v[(2, 2)]);
            if is_small(libm::sin(chi)) {
                eta = 0.0;
                phi = libm::atan2(v[(0, 1)], v[(0, 0)]);
                reporter.report(&Diagnostic::EtaPhiCollinear { chi });
            }
            Ok(SampleAngles { mu, eta, chi, phi })
        }
        SampleConstraint::Phi(phi) => {
            let v = lab_from_phi * phi_matrix(phi).transpose();
            let eta = libm::atan2(v[(0, 1)], libm::hypot(v[(1, 1)], v[(2, 1)]));
            if is_small(libm::cos(eta)) {
                return Err(Error::under_determined(
                    Stage::Sample,
                    "chi and mu cannot be chosen uniquely with eta so close to ±90",
                ));
            }
            let mu = libm::atan2(v[(2, 1)], v[(1, 1)]);
            let chi = libm::atan2(v[(0, 2)], v[(0, 0)]);
            Ok(SampleAngles { mu, eta, chi, phi })
        }
        SampleConstraint::Eta(eta) => {
            let cos_eta = libm::cos(eta);
            if is_small(cos_eta) {
                return Err(Error::under_determined(
                    Stage::Sample,
                    "chi and mu cannot be chosen uniquely with eta constrained so close to ±90",
                ));
            }
            let chi = asin_bounded(lab_from_phi[(0, 2)] / cos_eta, Stage::Sample, "chi")?;
            Ok(mu_and_phi_from_eta_chi(&lab_from_phi, eta, chi, reporter))
        }
        SampleConstraint::Chi(chi) => {
            let sin_chi = libm::sin(chi);
            if is_small(sin_chi) {
                return Err(Error::under_determined(
                    Stage::Sample,
                    "eta and phi cannot be chosen uniquely with chi constrained so close to 0 or 180",
                ));
            }
            let eta = acos_bounded(lab_from_phi[(0, 2)] / sin_chi, Stage::Sample, "eta")?;
            Ok(mu_and_phi_from_eta_chi(&lab_from_phi, eta, chi, reporter))
        }
    }
}

fn mu_and_phi_from_eta_chi(v: &Matrix3, eta: f64, chi: f64, reporter: &dyn Reporter) -> SampleAngles {
    let (sin_eta, cos_eta) = libm::sincos(eta);
    let (sin_chi, cos_chi) = libm::sincos(chi);

    let top_for_mu = v[(2, 2)] * sin_eta * sin_chi + v[(1, 2)] * cos_chi;
    let bot_for_mu = -v[(2, 2)] * cos_chi + v[(1, 2)] * sin_eta * sin_chi;
    let mu = libm::atan2(-top_for_mu, -bot_for_mu);
    if is_small(top_for_mu) && is_small(bot_for_mu) {
        // chi = ±90 with eta = 0 or 180: only phi - mu is fixed.
        reporter.report(&Diagnostic::MuPhiCollinear {
            phi_minus_mu: -libm::atan2(v[(2, 0)], v[(1, 1)]),
        });
    }

    let top_for_phi = v[(0, 1)] * cos_eta * cos_chi - v[(0, 0)] * sin_eta;
    let bot_for_phi = v[(0, 1)] * sin_eta + v[(0, 0)] * cos_eta * cos_chi;
    let phi = libm::atan2(top_for_phi, bot_for_phi);

    SampleAngles { mu, eta, chi, phi }
}

/// Solves all four sample angles and the Q azimuth `xi` from two fixed
/// sample angles and the reference azimuth `psi`.
///
/// Supported pairs are {chi, phi}, {mu, eta} and {chi, mu}; the last only at
/// chi = 90° and mu = 0.
///
/// The {chi, mu} closed form is only valid at that single point, so the pair
/// is rejected when either value is off it. A looser check that rejects only
/// when both are off would accept chi = 45°, mu = 0 and return angles that
/// miss the requested reflection.
pub fn solve_two_sample(
    first: &SampleConstraint,
    second: &SampleConstraint,
    psi: f64,
    theta: f64,
    q_phi: &Vector3,
    n_phi: &Vector3,
) -> Result<TwoSampleSolution> {
    let n_phi_frame = orthonormal_frame(q_phi, n_phi)?;
    let theta_rotation = Matrix3::z_rotation(-theta);
    let psi_rotation = Matrix3::x_rotation(psi);
    let reference_frame = n_phi_frame * psi_rotation.transpose() * theta_rotation.transpose();

    let fixed = |axis: Axis| {
        [first, second]
            .into_iter()
            .find(|c| c.axis() == axis)
            .map(|c| c.value())
    };

    match (
        fixed(Axis::Mu),
        fixed(Axis::Eta),
        fixed(Axis::Chi),
        fixed(Axis::Phi),
    ) {
        (_, _, Some(chi), Some(phi)) => {
            let v = chi_matrix(chi) * phi_matrix(phi) * reference_frame;
            let xi = libm::atan2(-v[(2, 0)], v[(2, 2)]);
            let eta = libm::atan2(-v[(0, 1)], v[(1, 1)]);
            let mu = libm::atan2(-v[(2, 1)], libm::hypot(v[(2, 2)], v[(2, 0)]));
            Ok(TwoSampleSolution {
                xi,
                angles: SampleAngles { mu, eta, chi, phi },
            })
        }
        (Some(mu), Some(eta), _, _) => solve_fixed_mu_eta(&reference_frame, mu, eta),
        (Some(mu), _, Some(chi), _) => {
            if !(is_small(mu) && is_small(chi - HALF_PI)) {
                return Err(Error::unsupported(
                    Stage::Sample,
                    "fixed chi and mu are only supported with chi=90 and mu=0",
                ));
            }
            let v = reference_frame;
            let eta = asin_bounded(-v[(2, 1)], Stage::Sample, "eta")?;
            let xi = libm::atan2(v[(2, 2)], v[(2, 0)]);
            let phi = -libm::atan2(v[(0, 1)], v[(1, 1)]);
            Ok(TwoSampleSolution {
                xi,
                angles: SampleAngles { mu, eta, chi, phi },
            })
        }
        _ => Err(Error::unsupported(
            Stage::Sample,
            format!(
                "no solution for fixed {} and {} with a reference constraint",
                first.name(),
                second.name()
            ),
        )),
    }
}

fn solve_fixed_mu_eta(v: &Matrix3, mu: f64, eta: f64) -> Result<TwoSampleSolution> {
    let (sin_mu, cos_mu) = libm::sincos(mu);
    let (sin_eta, cos_eta) = libm::sincos(eta);

    let bot = libm::hypot(sin_eta * cos_mu, sin_mu);
    if is_small(bot) {
        return Err(Error::under_determined(
            Stage::Sample,
            "chi cannot be found with mu and eta both at 0 or 180",
        ));
    }
    let chi_initial = asin_bounded(-v[(2, 1)] / bot, Stage::Sample, "chi")?
        - libm::atan2(sin_mu, sin_eta * cos_mu);

    let chi = if is_small(eta) && is_small(mu + HALF_PI) {
        // mu = -90 puts the eta axis along the beam: take chi in [90, 180).
        let candidates = equivalent_values(chi_initial, false);
        candidates
            .iter()
            .copied()
            .find(|c| (HALF_PI..PI).contains(c))
            .or_else(|| candidates.last().copied())
            .unwrap_or(chi_initial)
    } else {
        chi_initial
    };
    let (sin_chi, cos_chi) = libm::sincos(chi);

    let a = sin_chi * cos_eta;
    let b = sin_chi * sin_eta * sin_mu - cos_chi * cos_mu;
    let xi = libm::atan2(v[(2, 2)] * a + v[(2, 0)] * b, v[(2, 0)] * a - v[(2, 2)] * b);

    let a = sin_chi * sin_mu - cos_mu * cos_chi * sin_eta;
    let b = cos_mu * cos_eta;
    let phi = libm::atan2(v[(1, 1)] * a - v[(0, 1)] * b, v[(0, 1)] * a + v[(1, 1)] * b);

    Ok(TwoSampleSolution {
        xi,
        angles: SampleAngles { mu, eta, chi, phi },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::eta_matrix;
    use crate::reporter::{CollectingReporter, NullReporter};
    use approx::assert_abs_diff_eq;
    use diffcalc_core::constants::DEG_TO_RAD;

    fn sample_rotation(a: &SampleAngles) -> Matrix3 {
        mu_matrix(a.mu) * eta_matrix(a.eta) * chi_matrix(a.chi) * phi_matrix(a.phi)
    }

    fn assert_vec_close(a: Vector3, b: Vector3) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-10);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-10);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-10);
    }

    /// Builds lab vectors from a known sample orientation, so each branch can
    /// be checked for reproducing them.
    fn scenario() -> (Vector3, Vector3, Vector3, Vector3) {
        let truth = SampleAngles {
            mu: 4.0 * DEG_TO_RAD,
            eta: 25.0 * DEG_TO_RAD,
            chi: 35.0 * DEG_TO_RAD,
            phi: -12.0 * DEG_TO_RAD,
        };
        let q_phi = Vector3::new(1.0, 0.3, 0.2);
        let n_phi = Vector3::z_axis();
        let r = sample_rotation(&truth);
        (r * q_phi, r * n_phi, q_phi, n_phi)
    }

    #[test]
    fn test_orthonormal_frame_columns() {
        let q = Vector3::new(0.0, 2.0, 0.0);
        let n = Vector3::new(0.0, 1.0, 1.0);
        let frame = orthonormal_frame(&q, &n).unwrap();
        assert_vec_close(frame.column(0), Vector3::y_axis());
        assert_vec_close(frame.column(1), Vector3::z_axis());
        assert_vec_close(frame.column(2), Vector3::x_axis());
    }

    #[test]
    fn test_each_single_constraint_reproduces_lab_vectors() {
        let (q_lab, n_lab, q_phi, n_phi) = scenario();
        for constraint in [
            SampleConstraint::Mu(4.0 * DEG_TO_RAD),
            SampleConstraint::Eta(25.0 * DEG_TO_RAD),
            SampleConstraint::Chi(35.0 * DEG_TO_RAD),
            SampleConstraint::Phi(-12.0 * DEG_TO_RAD),
        ] {
            let angles =
                solve_one_sample(&constraint, &q_lab, &n_lab, &q_phi, &n_phi, &NullReporter)
                    .unwrap();
            // Provisional angles may sit on another branch of phi.
            let reproduces = equivalent_values(angles.phi, false).into_iter().any(|phi| {
                let r = sample_rotation(&SampleAngles { phi, ..angles });
                (r * q_phi - q_lab).magnitude() < 1e-10 && (r * n_phi - n_lab).magnitude() < 1e-10
            });
            assert!(reproduces, "{} branch: {:?}", constraint.name(), angles);
        }
    }

    #[test]
    fn test_chi_zero_with_fixed_mu_picks_eta_zero() {
        let q_phi = Vector3::new(1.0, 0.2, 0.4);
        let n_phi = Vector3::z_axis();
        let r = eta_matrix(0.6) * phi_matrix(0.3);
        let reporter = CollectingReporter::new();
        let angles = solve_one_sample(
            &SampleConstraint::Mu(0.0),
            &(r * q_phi),
            &(r * n_phi),
            &q_phi,
            &n_phi,
            &reporter,
        )
        .unwrap();
        assert_eq!(angles.eta, 0.0);
        assert_abs_diff_eq!(angles.phi, 0.9, epsilon = 1e-10);
        assert!(matches!(
            reporter.diagnostics().as_slice(),
            [Diagnostic::EtaPhiCollinear { .. }]
        ));
    }

    #[test]
    fn test_fixed_eta_at_ninety_is_under_determined() {
        let (q_lab, n_lab, q_phi, n_phi) = scenario();
        let err = solve_one_sample(
            &SampleConstraint::Eta(HALF_PI),
            &q_lab,
            &n_lab,
            &q_phi,
            &n_phi,
            &NullReporter,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnderDetermined { .. }));
    }

    #[test]
    fn test_fixed_chi_at_zero_is_under_determined() {
        let (q_lab, n_lab, q_phi, n_phi) = scenario();
        let err = solve_one_sample(
            &SampleConstraint::Chi(0.0),
            &q_lab,
            &n_lab,
            &q_phi,
            &n_phi,
            &NullReporter,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnderDetermined { .. }));
    }

    #[test]
    fn test_two_sample_chi_phi_keeps_fixed_values() {
        let q_phi = Vector3::new(1.0, 0.0, 0.2);
        let solution = solve_two_sample(
            &SampleConstraint::Chi(HALF_PI),
            &SampleConstraint::Phi(0.0),
            HALF_PI,
            30.657299 * DEG_TO_RAD,
            &q_phi,
            &Vector3::z_axis(),
        )
        .unwrap();
        assert_eq!(solution.angles.chi, HALF_PI);
        assert_eq!(solution.angles.phi, 0.0);
        assert!(solution.xi.is_finite());
    }

    #[test]
    fn test_two_sample_order_does_not_matter() {
        let q_phi = Vector3::new(1.0, 0.0, 0.2);
        let theta = 30.657299 * DEG_TO_RAD;
        let a = solve_two_sample(
            &SampleConstraint::Mu(10.0 * DEG_TO_RAD),
            &SampleConstraint::Eta(5.0 * DEG_TO_RAD),
            HALF_PI,
            theta,
            &q_phi,
            &Vector3::z_axis(),
        )
        .unwrap();
        let b = solve_two_sample(
            &SampleConstraint::Eta(5.0 * DEG_TO_RAD),
            &SampleConstraint::Mu(10.0 * DEG_TO_RAD),
            HALF_PI,
            theta,
            &q_phi,
            &Vector3::z_axis(),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_two_sample_mu_eta_both_zero_is_under_determined() {
        let err = solve_two_sample(
            &SampleConstraint::Mu(0.0),
            &SampleConstraint::Eta(0.0),
            HALF_PI,
            0.5,
            &Vector3::new(1.0, 0.0, 0.2),
            &Vector3::z_axis(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnderDetermined { .. }));
    }

    #[test]
    fn test_two_sample_chi_mu_requires_chi_90_mu_0() {
        // Only one of the two off the supported point is still rejected.
        for (chi, mu) in [(30.0, 0.0), (90.0, 10.0), (30.0, 10.0)] {
            let err = solve_two_sample(
                &SampleConstraint::Chi(chi * DEG_TO_RAD),
                &SampleConstraint::Mu(mu * DEG_TO_RAD),
                HALF_PI,
                0.5,
                &Vector3::new(1.0, 0.0, 0.2),
                &Vector3::z_axis(),
            )
            .unwrap_err();
            assert!(matches!(err, Error::Unsupported { .. }), "chi={chi} mu={mu}");
        }
    }

    #[test]
    fn test_two_sample_unsupported_pair() {
        let err = solve_two_sample(
            &SampleConstraint::Eta(0.0),
            &SampleConstraint::Phi(0.0),
            HALF_PI,
            0.5,
            &Vector3::new(1.0, 0.0, 0.2),
            &Vector3::z_axis(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("eta and phi"));
    }
}
