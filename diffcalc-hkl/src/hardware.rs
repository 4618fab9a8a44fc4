//! Hardware range limits and angle cuts.
//!
//! The solver consults a [`HardwareLimits`] collaborator when it explores
//! equivalent branches: every candidate angle is first re-expressed with the
//! axis cut, then tested against the axis range. [`AxisLimits`] is the plain
//! data implementation, loadable from configuration with the `serde` feature.
//!
//! ```
//! use diffcalc_hkl::{Axis, AxisLimits, HardwareLimits};
//! use diffcalc_core::constants::PI;
//!
//! let limits = AxisLimits::default().with_range(Axis::Delta, 0.0, PI);
//! assert!(limits.accepts(Axis::Delta, 1.0));
//! assert!(!limits.accepts(Axis::Delta, -1.0));
//! // Unlimited axes accept anything.
//! assert!(limits.accepts(Axis::Phi, -3.0));
//! ```

use crate::position::Axis;
use diffcalc_core::constants::PI;
use diffcalc_core::utils::cut_at;

/// Per-axis cut and range checks.
pub trait HardwareLimits {
    /// Re-expresses `value` in the axis' preferred 2π window.
    fn cut_angle(&self, axis: Axis, value: f64) -> f64;

    /// Inclusive range check on an already cut value.
    fn is_within_limits(&self, axis: Axis, value: f64) -> bool;

    fn accepts(&self, axis: Axis, value: f64) -> bool {
        self.is_within_limits(axis, self.cut_angle(axis, value))
    }
}

/// Range and cut of one axis, in radians. Missing bounds are open.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AxisRange {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Start of the window `[cut, cut + 2π)` angles are wrapped into.
    pub cut: f64,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            lower: None,
            upper: None,
            cut: -PI,
        }
    }
}

impl AxisRange {
    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |lower| value >= lower)
            && self.upper.map_or(true, |upper| value <= upper)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AxisLimits {
    pub mu: AxisRange,
    pub delta: AxisRange,
    pub nu: AxisRange,
    pub eta: AxisRange,
    pub chi: AxisRange,
    pub phi: AxisRange,
}

impl AxisLimits {
    /// No bounds, every cut at -π.
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn range(&self, axis: Axis) -> &AxisRange {
        match axis {
            Axis::Mu => &self.mu,
            Axis::Delta => &self.delta,
            Axis::Nu => &self.nu,
            Axis::Eta => &self.eta,
            Axis::Chi => &self.chi,
            Axis::Phi => &self.phi,
        }
    }

    pub fn range_mut(&mut self, axis: Axis) -> &mut AxisRange {
        match axis {
            Axis::Mu => &mut self.mu,
            Axis::Delta => &mut self.delta,
            Axis::Nu => &mut self.nu,
            Axis::Eta => &mut self.eta,
            Axis::Chi => &mut self.chi,
            Axis::Phi => &mut self.phi,
        }
    }

    pub fn with_range(mut self, axis: Axis, lower: f64, upper: f64) -> Self {
        let range = self.range_mut(axis);
        range.lower = Some(lower);
        range.upper = Some(upper);
        self
    }

    pub fn with_lower(mut self, axis: Axis, lower: f64) -> Self {
        self.range_mut(axis).lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, axis: Axis, upper: f64) -> Self {
        self.range_mut(axis).upper = Some(upper);
        self
    }

    pub fn with_cut(mut self, axis: Axis, cut: f64) -> Self {
        self.range_mut(axis).cut = cut;
        self
    }
}

impl HardwareLimits for AxisLimits {
    fn cut_angle(&self, axis: Axis, value: f64) -> f64 {
        cut_at(value, self.range(axis).cut)
    }

    fn is_within_limits(&self, axis: Axis, value: f64) -> bool {
        self.range(axis).contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffcalc_core::constants::{HALF_PI, TWOPI};

    #[test]
    fn test_unlimited_accepts_everything() {
        let limits = AxisLimits::unlimited();
        for axis in Axis::ALL {
            assert!(limits.accepts(axis, 100.0));
            assert!(limits.accepts(axis, -PI));
        }
    }

    #[test]
    fn test_range_is_inclusive() {
        let limits = AxisLimits::default().with_range(Axis::Chi, -HALF_PI, HALF_PI);
        assert!(limits.is_within_limits(Axis::Chi, HALF_PI));
        assert!(limits.is_within_limits(Axis::Chi, -HALF_PI));
        assert!(!limits.is_within_limits(Axis::Chi, HALF_PI + 1e-9));
    }

    #[test]
    fn test_cut_applied_before_range() {
        let limits = AxisLimits::default()
            .with_range(Axis::Phi, 0.0, TWOPI)
            .with_cut(Axis::Phi, 0.0);
        assert!(limits.accepts(Axis::Phi, -HALF_PI));
        assert!((limits.cut_angle(Axis::Phi, -HALF_PI) - 3.0 * HALF_PI).abs() < 1e-12);

        let default_cut = AxisLimits::default().with_range(Axis::Phi, 0.0, TWOPI);
        assert!(!default_cut.accepts(Axis::Phi, -HALF_PI));
    }

    #[test]
    fn test_one_sided_bounds() {
        let limits = AxisLimits::default()
            .with_lower(Axis::Mu, 0.0)
            .with_upper(Axis::Eta, 0.5);
        assert!(!limits.accepts(Axis::Mu, -0.1));
        assert!(limits.accepts(Axis::Mu, 3.0));
        assert!(limits.accepts(Axis::Eta, -3.0));
        assert!(!limits.accepts(Axis::Eta, 0.6));
    }
}
