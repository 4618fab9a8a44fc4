//! The hkl calculator: forward kinematics and the staged inverse solve.

use crate::constraints::{ConstraintSet, DetectorConstraint, SampleMode};
use crate::degeneracy::{tidy_degenerate_solutions, wrap_phi};
use crate::detector::{remaining_detector_angles, solve_detector};
use crate::error::{Error, Result, Stage};
use crate::explorer::{equivalent_values, RoundTripTarget, SolutionExplorer};
use crate::forward::{angles_to_hkl, angles_to_virtual, VirtualAngles};
use crate::hardware::HardwareLimits;
use crate::position::{Axis, Position};
use crate::reference::{bragg_angle, solve_reference};
use crate::reporter::{Diagnostic, Reporter, TracingReporter};
use crate::sample::{
    n_lab_direction, q_lab_direction, solve_one_sample, solve_two_sample, SampleAngles,
};
use crate::ub::UbMatrix;
use diffcalc_core::constants::{HALF_PI, TWOPI};
use diffcalc_core::math::is_small;
use diffcalc_core::Vector3;
use std::sync::Arc;

/// A solved position with its virtual angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub position: Position,
    pub virtual_angles: VirtualAngles,
}

/// Converts between Miller indices and six-circle positions for one UB
/// matrix.
///
/// ```
/// use diffcalc_core::{constants::TWOPI, Matrix3};
/// use diffcalc_hkl::{
///     AxisLimits, ConstraintSet, DetectorConstraint, HklCalculator, ReferenceConstraint,
///     SampleConstraint, UbMatrix,
/// };
///
/// let ub = UbMatrix::new(Matrix3::identity().scale(TWOPI)).unwrap();
/// let calculator = HklCalculator::new(ub);
/// let bisecting = ConstraintSet::new(ReferenceConstraint::AEqB)
///     .with_detector(DetectorConstraint::Nu(0.0))
///     .with_sample(SampleConstraint::Mu(0.0));
///
/// let solution = calculator
///     .hkl_to_angles([1.0, 0.0, 0.0], 1.0, &bisecting, &AxisLimits::unlimited())
///     .unwrap();
/// assert!((solution.position.delta.to_degrees() - 60.0).abs() < 1e-6);
/// assert!((solution.position.eta.to_degrees() - 30.0).abs() < 1e-6);
/// ```
#[derive(Clone)]
pub struct HklCalculator {
    ub: UbMatrix,
    reference_vector: Vector3,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for HklCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HklCalculator")
            .field("ub", &self.ub)
            .field("reference_vector", &self.reference_vector)
            .finish_non_exhaustive()
    }
}

impl HklCalculator {
    /// Calculator with the reference direction along the phi-frame z axis,
    /// reporting through `tracing`.
    pub fn new(ub: UbMatrix) -> Self {
        Self {
            ub,
            reference_vector: Vector3::z_axis(),
            reporter: Arc::new(TracingReporter),
        }
    }

    /// Replaces the phi-frame reference direction. It is normalized; zero or
    /// non-finite vectors are rejected.
    pub fn with_reference_vector(mut self, reference: Vector3) -> Result<Self> {
        let finite = reference.to_array().iter().all(|v| v.is_finite());
        if !finite || is_small(reference.magnitude()) {
            return Err(Error::InvalidReferenceVector);
        }
        self.reference_vector = reference.normalize();
        Ok(self)
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn ub(&self) -> &UbMatrix {
        &self.ub
    }

    pub fn reference_vector(&self) -> &Vector3 {
        &self.reference_vector
    }

    /// Miller indices reached at `position`.
    pub fn angles_to_hkl(&self, position: &Position, wavelength: f64) -> Result<[f64; 3]> {
        check_wavelength(wavelength)?;
        Ok(angles_to_hkl(position, wavelength, &self.ub))
    }

    /// Virtual angles at `position`; an undefined psi is reported.
    pub fn angles_to_virtual_angles(&self, position: &Position) -> VirtualAngles {
        let virtual_angles = angles_to_virtual(position, &self.reference_vector);
        if virtual_angles.psi.is_none() {
            self.reporter.report(&Diagnostic::PsiUndefined);
        }
        virtual_angles
    }

    /// Solves for the single position reaching `hkl` under `constraints`
    /// within `limits`.
    ///
    /// Stages run in order (reflection, reference, detector, sample); the
    /// first failure is returned with the stage that raised it.
    pub fn hkl_to_angles(
        &self,
        hkl: [f64; 3],
        wavelength: f64,
        constraints: &ConstraintSet,
        limits: &dyn HardwareLimits,
    ) -> Result<Solution> {
        check_wavelength(wavelength)?;
        let mode = constraints.validate()?;

        let q_phi = self.ub.hkl_to_phi_frame(hkl);
        let n_phi = self.reference_vector;
        let theta = bragg_angle(&q_phi, wavelength)?;
        let tau = q_phi.angle_between(&n_phi);
        let reference = solve_reference(&constraints.reference, theta, tau)?;

        let reporter = self.reporter.as_ref();
        let explorer = SolutionExplorer::new(limits, reporter);
        let target = RoundTripTarget {
            hkl,
            wavelength,
            ub: &self.ub,
            reference_vector: &n_phi,
            reference: &constraints.reference,
        };

        let (delta, nu, sample) = match mode {
            SampleMode::One { detector, sample } => {
                let solution = solve_detector(&detector, theta, reference.alpha, tau)?;
                let (delta, nu) =
                    explorer.final_detector_angles(&solution.angles, theta, &detector)?;

                let q_lab = q_lab_direction(theta, solution.angles.qaz);
                let n_lab = n_lab_direction(reference.alpha, solution.naz);
                let initial = solve_one_sample(&sample, &q_lab, &n_lab, &q_phi, &n_phi, reporter)?;
                let angles =
                    explorer.final_sample_angles(&initial, &[sample.axis()], delta, nu, &target)?;
                (delta, nu, angles)
            }
            SampleMode::Two { first, second } => {
                let solution =
                    solve_two_sample(&first, &second, reference.psi, theta, &q_phi, &n_phi)?;
                let initial = solution.angles;
                reporter.report(&Diagnostic::TwoSampleInitial {
                    xi: solution.xi,
                    mu: initial.mu,
                    eta: initial.eta,
                    chi: initial.chi,
                    phi: initial.phi,
                });
                let fixed = [first.axis(), second.axis()];
                self.search_azimuths(solution.xi, theta, &initial, &fixed, &explorer, &target)?
            }
        };

        let position = Position::new(sample.mu, delta, nu, sample.eta, sample.chi, sample.phi);
        let position = wrap_phi(&tidy_degenerate_solutions(&position, constraints, reporter));
        Ok(Solution {
            position,
            virtual_angles: self.angles_to_virtual_angles(&position),
        })
    }

    /// Tries each equivalent of `xi` as the Q azimuth until the detector and
    /// sample explorers both succeed.
    fn search_azimuths(
        &self,
        xi: f64,
        theta: f64,
        initial: &SampleAngles,
        fixed: &[Axis],
        explorer: &SolutionExplorer<'_>,
        target: &RoundTripTarget<'_>,
    ) -> Result<(f64, f64, SampleAngles)> {
        for xi in equivalent_values(xi, false) {
            let mut qaz = xi + HALF_PI;
            if qaz > TWOPI {
                qaz -= TWOPI;
            }
            self.reporter.report(&Diagnostic::TryingAzimuth { xi, qaz });

            let constraint = DetectorConstraint::Qaz(qaz);
            let detector = remaining_detector_angles(&constraint, theta)?;
            let (delta, nu) = match explorer.final_detector_angles(&detector, theta, &constraint) {
                Ok(pair) => pair,
                Err(e) if e.is_no_solution() => continue,
                Err(e) => return Err(e),
            };
            match explorer.final_sample_angles(initial, fixed, delta, nu, target) {
                Ok(angles) => return Ok((delta, nu, angles)),
                Err(e) if e.is_no_solution() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Error::no_solution(
            Stage::Sample,
            "no azimuth of Q gives a position within the hardware limits",
        ))
    }
}

fn check_wavelength(wavelength: f64) -> Result<()> {
    if wavelength.is_finite() && wavelength > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidWavelength(wavelength))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{ReferenceConstraint, SampleConstraint};
    use crate::hardware::AxisLimits;
    use crate::reporter::CollectingReporter;
    use approx::assert_abs_diff_eq;
    use diffcalc_core::Matrix3;

    fn calculator() -> HklCalculator {
        HklCalculator::new(UbMatrix::new(Matrix3::identity().scale(TWOPI)).unwrap())
    }

    fn bisecting() -> ConstraintSet {
        ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_detector(DetectorConstraint::Nu(0.0))
            .with_sample(SampleConstraint::Mu(0.0))
    }

    #[test]
    fn test_wavelength_checked_first() {
        let calc = calculator();
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = calc
                .hkl_to_angles([1.0, 0.0, 0.0], bad, &bisecting(), &AxisLimits::unlimited())
                .unwrap_err();
            assert!(matches!(err, Error::InvalidWavelength(_)));
            assert!(calc.angles_to_hkl(&Position::default(), bad).is_err());
        }
    }

    #[test]
    fn test_reference_vector_validation() {
        assert_eq!(
            calculator()
                .with_reference_vector(Vector3::zeros())
                .unwrap_err(),
            Error::InvalidReferenceVector
        );
        let calc = calculator()
            .with_reference_vector(Vector3::new(0.0, 0.0, 3.0))
            .unwrap();
        assert_abs_diff_eq!(calc.reference_vector().z, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_undefined_psi_is_reported() {
        let reporter = Arc::new(CollectingReporter::new());
        let calc = calculator().with_reporter(reporter.clone());
        let v = calc.angles_to_virtual_angles(&Position::from_degrees(0.0, 60.0, 0.0, 30.0, 90.0, 0.0));
        assert!(v.psi.is_none());
        assert_eq!(reporter.diagnostics(), vec![Diagnostic::PsiUndefined]);
    }

    #[test]
    fn test_bisecting_100() {
        let solution = calculator()
            .hkl_to_angles([1.0, 0.0, 0.0], 1.0, &bisecting(), &AxisLimits::unlimited())
            .unwrap();
        let expected = [0.0, 60.0, 0.0, 30.0, 0.0, 0.0];
        for (got, want) in solution.position.to_degrees().iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-6);
        }
    }
}
