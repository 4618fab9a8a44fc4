//! Branch exploration and selection.
//!
//! The trigonometric stages return one representative per angle. Each angle
//! has up to four candidates with the same sine or cosine (`v`, `-v`,
//! `π + v`, `π - v`). The explorer enumerates every combination that
//! passes the hardware limits, keeps those that reproduce the request and
//! picks one deterministically:
//!
//! - detector pairs must reproduce theta and qaz, and exactly one may survive;
//! - sample tuples must reproduce hkl and the reference constraint, and the
//!   tuple with the smallest sum of absolute angles wins.

use crate::constraints::{DetectorConstraint, ReferenceConstraint};
use crate::detector::DetectorAngles;
use crate::error::{Error, Result, Stage};
use crate::forward::{angles_to_hkl, angles_to_virtual, theta_and_qaz};
use crate::hardware::HardwareLimits;
use crate::position::{Axis, Position};
use crate::reporter::{Diagnostic, Reporter};
use crate::sample::SampleAngles;
use crate::ub::UbMatrix;
use diffcalc_core::constants::{HALF_PI, NEAR_NINETY_WINDOW, PI, RAD_TO_DEG};
use diffcalc_core::math::{is_small, nearly_equal, sequence_nearly_equal};
use diffcalc_core::utils::cut_at_minus_pi;
use diffcalc_core::Vector3;

/// Candidate values sharing the sine or cosine of `value`.
///
/// ```
/// use diffcalc_hkl::explorer::equivalent_values;
/// use diffcalc_core::constants::{HALF_PI, PI};
///
/// assert_eq!(equivalent_values(0.3, true), vec![0.3]);
/// assert_eq!(equivalent_values(0.0, false), vec![0.0, PI]);
/// assert_eq!(equivalent_values(-HALF_PI, false), vec![HALF_PI, -HALF_PI]);
/// assert_eq!(equivalent_values(0.3, false), vec![0.3, -0.3, PI + 0.3, PI - 0.3]);
/// ```
pub fn equivalent_values(value: f64, constrained: bool) -> Vec<f64> {
    if constrained {
        vec![value]
    } else if is_small(value) {
        vec![0.0, PI]
    } else if is_small(value - HALF_PI) || is_small(value + HALF_PI) {
        vec![HALF_PI, -HALF_PI]
    } else {
        vec![value, -value, PI + value, PI - value]
    }
}

/// Every combination taking one value from each set, first set outermost.
pub fn cartesian_product(sets: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut product = vec![Vec::with_capacity(sets.len())];
    for set in sets {
        let mut next = Vec::with_capacity(product.len() * set.len());
        for prefix in &product {
            for &value in set {
                let mut combination = prefix.clone();
                combination.push(value);
                next.push(combination);
            }
        }
        product = next;
    }
    product
}

/// All limit-respecting combinations of the equivalents of `values`.
///
/// Axes listed in `constrained` contribute only their given value. Kept
/// candidates are reported in `[-π, π)`.
pub fn possible_solutions(
    values: &[(Axis, f64)],
    constrained: &[Axis],
    limits: &dyn HardwareLimits,
) -> Vec<Vec<f64>> {
    let sets: Vec<Vec<f64>> = values
        .iter()
        .map(|&(axis, value)| {
            equivalent_values(value, constrained.contains(&axis))
                .into_iter()
                .filter(|&candidate| limits.accepts(axis, candidate))
                .map(cut_at_minus_pi)
                .collect()
        })
        .collect();
    cartesian_product(&sets)
}

/// Keeps the (delta, nu) pairs that reproduce `theta` and `qaz`.
pub fn filter_detector_solutions(pairs: &[(f64, f64)], theta: f64, qaz: f64) -> Vec<(f64, f64)> {
    pairs
        .iter()
        .copied()
        .filter(|&(delta, nu)| {
            let (theta_found, qaz_found) = theta_and_qaz(delta, nu);
            nearly_equal(theta_found, theta) && nearly_equal(qaz_found, qaz)
        })
        .collect()
}

/// Collapses pairs with delta just off 90° down to the one whose theta is
/// closest to `theta`. Pairs exactly at 90° and pairs away from it are kept.
pub fn prefer_closest_near_90(pairs: Vec<(f64, f64)>, theta: f64) -> Vec<(f64, f64)> {
    if pairs.len() < 2 {
        return pairs;
    }
    let (near, mut others): (Vec<_>, Vec<_>) = pairs.into_iter().partition(|&(delta, _)| {
        let offset = (delta - HALF_PI).abs();
        offset < NEAR_NINETY_WINDOW && offset != 0.0
    });

    let theta_error = |&(delta, nu): &(f64, f64)| (theta_and_qaz(delta, nu).0 - theta).abs();
    let mut closest: Option<(f64, f64)> = None;
    for pair in near {
        if closest.map_or(true, |best| theta_error(&pair) < theta_error(&best)) {
            closest = Some(pair);
        }
    }
    others.extend(closest);
    others
}

/// Exactly one pair must remain.
pub fn choose_detector_angles(pairs: &[(f64, f64)]) -> Result<(f64, f64)> {
    match pairs {
        [pair] => Ok(*pair),
        [] => Err(Error::no_solution(
            Stage::Detector,
            "no detector solution lies within the hardware limits; widen the delta or nu limits",
        )),
        _ => {
            let listed: Vec<String> = pairs
                .iter()
                .map(|(delta, nu)| format!("({:.4}, {:.4})", delta * RAD_TO_DEG, nu * RAD_TO_DEG))
                .collect();
            Err(Error::ambiguous(
                Stage::Detector,
                format!(
                    "several (delta, nu) pairs fit: {}; narrow the delta or nu limits",
                    listed.join(", ")
                ),
            ))
        }
    }
}

/// Picks the tuple with the smallest sum of absolute angles; the first wins
/// a tie.
pub fn choose_sample_angles(tuples: &[SampleAngles], reporter: &dyn Reporter) -> Result<SampleAngles> {
    let magnitude = |a: &SampleAngles| a.to_array().iter().map(|v| v.abs()).sum::<f64>();

    let mut best: Option<&SampleAngles> = None;
    for tuple in tuples {
        if best.map_or(true, |b| magnitude(tuple) < magnitude(b)) {
            best = Some(tuple);
        }
    }
    let chosen = best.copied().ok_or_else(|| {
        Error::no_solution(
            Stage::Sample,
            "no sample solution lies within the hardware limits; widen the sample limits",
        )
    })?;

    if tuples.len() > 1 {
        reporter.report(&Diagnostic::MultipleSampleSolutions {
            count: tuples.len(),
        });
    }
    Ok(chosen)
}

/// What a candidate position has to reproduce to be accepted.
#[derive(Debug, Clone, Copy)]
pub struct RoundTripTarget<'a> {
    pub hkl: [f64; 3],
    pub wavelength: f64,
    pub ub: &'a UbMatrix,
    pub reference_vector: &'a Vector3,
    pub reference: &'a ReferenceConstraint,
}

impl RoundTripTarget<'_> {
    /// True when `position` maps back to the requested hkl and honors the
    /// reference constraint.
    pub fn accepts(&self, position: &Position) -> bool {
        let hkl = angles_to_hkl(position, self.wavelength, self.ub);
        if !sequence_nearly_equal(&self.hkl, &hkl) {
            return false;
        }
        let virtual_angles = angles_to_virtual(position, self.reference_vector);
        match *self.reference {
            ReferenceConstraint::AEqB => nearly_equal(virtual_angles.alpha, virtual_angles.beta),
            ReferenceConstraint::Alpha(alpha) => nearly_equal(alpha, virtual_angles.alpha),
            ReferenceConstraint::Beta(beta) => nearly_equal(beta, virtual_angles.beta),
            ReferenceConstraint::Psi(psi) => virtual_angles
                .psi
                .map_or(false, |found| nearly_equal(psi, found)),
        }
    }
}

/// Resolves provisional angles into the single final choice.
pub struct SolutionExplorer<'a> {
    limits: &'a dyn HardwareLimits,
    reporter: &'a dyn Reporter,
}

impl<'a> SolutionExplorer<'a> {
    pub fn new(limits: &'a dyn HardwareLimits, reporter: &'a dyn Reporter) -> Self {
        Self { limits, reporter }
    }

    /// Final (delta, nu) for provisional detector angles.
    ///
    /// At delta = 90° nu does not move Q; unless nu is the constraint it is
    /// set to zero, provided the limits accept that pair.
    pub fn final_detector_angles(
        &self,
        initial: &DetectorAngles,
        theta: f64,
        constraint: &DetectorConstraint,
    ) -> Result<(f64, f64)> {
        if nearly_equal(initial.delta, HALF_PI) && !matches!(constraint, DetectorConstraint::Nu(_)) {
            self.reporter.report(&Diagnostic::DetectorDegenerate {
                delta: initial.delta,
            });
            if !(self.limits.accepts(Axis::Delta, initial.delta)
                && self.limits.accepts(Axis::Nu, 0.0))
            {
                return Err(Error::no_solution(
                    Stage::Detector,
                    format!(
                        "delta={:.4} with nu=0 is outside the hardware limits",
                        initial.delta * RAD_TO_DEG
                    ),
                ));
            }
            return Ok((initial.delta, 0.0));
        }

        self.reporter.report(&Diagnostic::InitialDetectorSolution {
            delta: initial.delta,
            nu: initial.nu,
            qaz: initial.qaz,
        });

        let constrained: Vec<Axis> = constraint.axis().into_iter().collect();
        let pairs: Vec<(f64, f64)> = possible_solutions(
            &[(Axis::Delta, initial.delta), (Axis::Nu, initial.nu)],
            &constrained,
            self.limits,
        )
        .into_iter()
        .map(|pair| (pair[0], pair[1]))
        .collect();

        let pairs = filter_detector_solutions(&pairs, theta, initial.qaz);
        let pairs = prefer_closest_near_90(pairs, theta);
        choose_detector_angles(&pairs)
    }

    /// Final sample angles for provisional ones, given the chosen detector
    /// angles.
    pub fn final_sample_angles(
        &self,
        initial: &SampleAngles,
        constrained: &[Axis],
        delta: f64,
        nu: f64,
        target: &RoundTripTarget<'_>,
    ) -> Result<SampleAngles> {
        self.reporter.report(&Diagnostic::InitialSampleSolution {
            mu: initial.mu,
            eta: initial.eta,
            chi: initial.chi,
            phi: initial.phi,
        });

        let tuples: Vec<SampleAngles> = possible_solutions(
            &[
                (Axis::Mu, initial.mu),
                (Axis::Eta, initial.eta),
                (Axis::Chi, initial.chi),
                (Axis::Phi, initial.phi),
            ],
            constrained,
            self.limits,
        )
        .into_iter()
        .map(|t| SampleAngles {
            mu: t[0],
            eta: t[1],
            chi: t[2],
            phi: t[3],
        })
        .filter(|a| target.accepts(&Position::new(a.mu, delta, nu, a.eta, a.chi, a.phi)))
        .collect();

        choose_sample_angles(&tuples, self.reporter)
    }
}
