//! Canonical presentation of co-linear axis pairs.
//!
//! With nu = mu = chi = 0, eta and phi turn about the same axis and only
//! their sum matters; with delta = eta = 0 and chi = 90°, the same holds for
//! mu and phi. Such solutions are rebalanced so the detector-side angle is
//! split evenly, which keeps results stable between neighboring requests.

use crate::constraints::ConstraintSet;
use crate::position::{Axis, Position};
use crate::reporter::{Diagnostic, Reporter};
use diffcalc_core::constants::{HALF_PI, PI, SMALL, TWOPI};
use diffcalc_core::math::is_small;

/// Rebalances eta/phi or mu/phi on the degenerate positions described in the
/// module docs. Other positions are returned unchanged.
///
/// Only applies when the detector group is constrained (including naz) and
/// the matching sample axis is one of the constraints.
pub fn tidy_degenerate_solutions(
    position: &Position,
    constraints: &ConstraintSet,
    reporter: &dyn Reporter,
) -> Position {
    let mut tidied = *position;
    let detector_like = constraints.is_detector_like();

    if is_small(position.nu)
        && detector_like
        && is_small(position.mu)
        && constraints.fixes_sample_axis(Axis::Mu)
    {
        if is_small(position.chi) {
            let shift = position.delta / 2.0 - position.eta;
            tidied.eta += shift;
            tidied.phi -= shift;
            reporter.report(&Diagnostic::DegenerateRedistribution {
                axis: Axis::Eta,
                shift,
            });
        }
    } else if is_small(position.delta)
        && detector_like
        && is_small(position.eta)
        && constraints.fixes_sample_axis(Axis::Eta)
        && is_small(position.chi - HALF_PI)
    {
        let shift = position.nu / 2.0 - position.mu;
        tidied.mu += shift;
        tidied.phi += shift;
        reporter.report(&Diagnostic::DegenerateRedistribution {
            axis: Axis::Mu,
            shift,
        });
    }

    tidied
}

/// Moves phi off the lower edge of `(-π, π]`.
pub fn wrap_phi(position: &Position) -> Position {
    let mut wrapped = *position;
    if wrapped.phi <= -PI + SMALL {
        wrapped.phi += TWOPI;
    }
    wrapped
}
