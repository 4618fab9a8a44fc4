//! Operator-chosen constraints that make the six-circle problem well posed.
//!
//! Six angles, three equations: the operator fixes three more quantities,
//! drawn from three groups.
//!
//! | Group | Choices | How many |
//! |-------|---------|----------|
//! | reference | psi, alpha, beta, a_eq_b | exactly one |
//! | detector | delta, nu, qaz, naz | zero or one |
//! | sample | mu, eta, chi, phi | one (with a detector constraint) or two (without) |
//!
//! naz is the azimuth of the reference direction rather than a detector angle,
//! but it takes the detector slot: the two are mutually exclusive, so they
//! share one optional field.
//!
//! ```
//! use diffcalc_hkl::{ConstraintSet, DetectorConstraint, ReferenceConstraint, SampleConstraint};
//!
//! let bisecting = ConstraintSet::new(ReferenceConstraint::AEqB)
//!     .with_detector(DetectorConstraint::Nu(0.0))
//!     .with_sample(SampleConstraint::Mu(0.0));
//! assert!(bisecting.validate().is_ok());
//! assert_eq!(bisecting.to_string(), "a_eq_b, nu=0.0000, mu=0.0000");
//! ```

use crate::error::{Error, Result, Stage};
use crate::position::Axis;
use diffcalc_core::constants::RAD_TO_DEG;
use std::fmt;

/// Reference-group constraint: how the reference direction n sits relative to
/// the scattering plane. Values in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "name", content = "value", rename_all = "snake_case")
)]
pub enum ReferenceConstraint {
    Psi(f64),
    Alpha(f64),
    Beta(f64),
    /// Incidence and exit angles equal.
    AEqB,
}

impl ReferenceConstraint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Psi(_) => "psi",
            Self::Alpha(_) => "alpha",
            Self::Beta(_) => "beta",
            Self::AEqB => "a_eq_b",
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Psi(v) | Self::Alpha(v) | Self::Beta(v) => Some(*v),
            Self::AEqB => None,
        }
    }
}

/// Detector-group constraint. [`Naz`](Self::Naz) fixes the azimuth of the
/// reference direction instead of a detector quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "name", content = "value", rename_all = "snake_case")
)]
pub enum DetectorConstraint {
    Delta(f64),
    Nu(f64),
    Qaz(f64),
    Naz(f64),
}

impl DetectorConstraint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Delta(_) => "delta",
            Self::Nu(_) => "nu",
            Self::Qaz(_) => "qaz",
            Self::Naz(_) => "naz",
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Delta(v) | Self::Nu(v) | Self::Qaz(v) | Self::Naz(v) => *v,
        }
    }

    /// The physical axis this constraint pins, if any.
    pub fn axis(&self) -> Option<Axis> {
        match self {
            Self::Delta(_) => Some(Axis::Delta),
            Self::Nu(_) => Some(Axis::Nu),
            Self::Qaz(_) | Self::Naz(_) => None,
        }
    }
}

/// Sample-group constraint: one sample circle held at a fixed angle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "name", content = "value", rename_all = "snake_case")
)]
pub enum SampleConstraint {
    Mu(f64),
    Eta(f64),
    Chi(f64),
    Phi(f64),
}

impl SampleConstraint {
    pub fn name(&self) -> &'static str {
        self.axis().name()
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Mu(v) | Self::Eta(v) | Self::Chi(v) | Self::Phi(v) => *v,
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Self::Mu(_) => Axis::Mu,
            Self::Eta(_) => Axis::Eta,
            Self::Chi(_) => Axis::Chi,
            Self::Phi(_) => Axis::Phi,
        }
    }
}

/// The solving branch selected by a validated [`ConstraintSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleMode {
    /// One fixed sample angle plus a detector (or naz) constraint.
    One {
        detector: DetectorConstraint,
        sample: SampleConstraint,
    },
    /// Two fixed sample angles; the detector follows from the azimuth.
    Two {
        first: SampleConstraint,
        second: SampleConstraint,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintSet {
    pub reference: ReferenceConstraint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub detector: Option<DetectorConstraint>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sample: Vec<SampleConstraint>,
}

impl ConstraintSet {
    pub fn new(reference: ReferenceConstraint) -> Self {
        Self {
            reference,
            detector: None,
            sample: Vec::new(),
        }
    }

    pub fn with_detector(mut self, detector: DetectorConstraint) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_sample(mut self, sample: SampleConstraint) -> Self {
        self.sample.push(sample);
        self
    }

    /// True when the detector slot holds a detector angle or naz.
    pub fn is_detector_like(&self) -> bool {
        self.detector.is_some()
    }

    /// True when `axis` is held by a sample constraint.
    pub fn fixes_sample_axis(&self, axis: Axis) -> bool {
        self.sample.iter().any(|s| s.axis() == axis)
    }

    /// Checks group cardinalities and values, returning the solving branch.
    ///
    /// ```
    /// use diffcalc_hkl::{ConstraintSet, ReferenceConstraint, SampleConstraint, SampleMode};
    ///
    /// let set = ConstraintSet::new(ReferenceConstraint::Psi(0.5))
    ///     .with_sample(SampleConstraint::Chi(1.0))
    ///     .with_sample(SampleConstraint::Phi(0.0));
    /// assert!(matches!(set.validate(), Ok(SampleMode::Two { .. })));
    /// ```
    pub fn validate(&self) -> Result<SampleMode> {
        let values = self
            .reference
            .value()
            .into_iter()
            .chain(self.detector.map(|d| d.value()))
            .chain(self.sample.iter().map(|s| s.value()));
        for value in values {
            if !value.is_finite() {
                return Err(Error::invalid_constraints(format!(
                    "constraint values must be finite, got {}",
                    value
                )));
            }
        }

        for (i, s) in self.sample.iter().enumerate() {
            if self.sample[..i].iter().any(|other| other.axis() == s.axis()) {
                return Err(Error::invalid_constraints(format!(
                    "sample axis {} is constrained more than once",
                    s.name()
                )));
            }
        }

        match (self.sample.as_slice(), self.detector) {
            ([], _) => Err(Error::invalid_constraints(
                "at least one sample constraint is required",
            )),
            ([sample], Some(detector)) => Ok(SampleMode::One {
                detector,
                sample: *sample,
            }),
            ([sample], None) => Err(Error::invalid_constraints(format!(
                "a single sample constraint ({}) needs a detector or naz constraint",
                sample.name()
            ))),
            ([first, second], None) => Ok(SampleMode::Two {
                first: *first,
                second: *second,
            }),
            ([_, _], Some(detector)) => Err(Error::invalid_constraints(format!(
                "two sample constraints and a {} constraint over-determine the geometry",
                detector.name()
            ))),
            (_, _) => Err(Error::unsupported(
                Stage::Validation,
                format!(
                    "{} sample constraints: at most two are supported",
                    self.sample.len()
                ),
            )),
        }
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reference.value() {
            Some(v) => write!(f, "{}={:.4}", self.reference.name(), v * RAD_TO_DEG)?,
            None => f.write_str(self.reference.name())?,
        }
        if let Some(d) = self.detector {
            write!(f, ", {}={:.4}", d.name(), d.value() * RAD_TO_DEG)?;
        }
        for s in &self.sample {
            write!(f, ", {}={:.4}", s.name(), s.value() * RAD_TO_DEG)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffcalc_core::constants::HALF_PI;

    #[test]
    fn test_one_sample_mode() {
        let set = ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_detector(DetectorConstraint::Delta(0.0))
            .with_sample(SampleConstraint::Eta(0.0));
        assert_eq!(
            set.validate().unwrap(),
            SampleMode::One {
                detector: DetectorConstraint::Delta(0.0),
                sample: SampleConstraint::Eta(0.0),
            }
        );
    }

    #[test]
    fn test_no_sample_constraint_is_invalid() {
        let set = ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_detector(DetectorConstraint::Nu(0.0));
        assert!(matches!(set.validate(), Err(Error::InvalidConstraints(_))));
    }

    #[test]
    fn test_single_sample_without_detector_is_invalid() {
        let set =
            ConstraintSet::new(ReferenceConstraint::AEqB).with_sample(SampleConstraint::Mu(0.0));
        let err = set.validate().unwrap_err();
        assert!(err.to_string().contains("needs a detector"));
    }

    #[test]
    fn test_two_samples_with_detector_is_invalid() {
        let set = ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_detector(DetectorConstraint::Qaz(HALF_PI))
            .with_sample(SampleConstraint::Chi(0.0))
            .with_sample(SampleConstraint::Phi(0.0));
        assert!(matches!(set.validate(), Err(Error::InvalidConstraints(_))));
    }

    #[test]
    fn test_three_samples_is_unsupported() {
        let set = ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_sample(SampleConstraint::Mu(0.0))
            .with_sample(SampleConstraint::Chi(0.0))
            .with_sample(SampleConstraint::Phi(0.0));
        assert!(matches!(set.validate(), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn test_duplicate_sample_axis_is_invalid() {
        let set = ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_sample(SampleConstraint::Chi(0.0))
            .with_sample(SampleConstraint::Chi(1.0));
        let err = set.validate().unwrap_err();
        assert!(err.to_string().contains("chi"));
    }

    #[test]
    fn test_non_finite_value_is_invalid() {
        let set = ConstraintSet::new(ReferenceConstraint::Alpha(f64::NAN))
            .with_detector(DetectorConstraint::Nu(0.0))
            .with_sample(SampleConstraint::Mu(0.0));
        assert!(matches!(set.validate(), Err(Error::InvalidConstraints(_))));
    }

    #[test]
    fn test_fixed_axes_and_detector_slot() {
        let set = ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_detector(DetectorConstraint::Qaz(HALF_PI))
            .with_sample(SampleConstraint::Mu(0.0));
        assert!(set.fixes_sample_axis(Axis::Mu));
        assert!(!set.fixes_sample_axis(Axis::Eta));
        assert!(set.is_detector_like());

        let set = ConstraintSet::new(ReferenceConstraint::AEqB)
            .with_detector(DetectorConstraint::Nu(0.0))
            .with_sample(SampleConstraint::Phi(0.0));
        assert!(set.fixes_sample_axis(Axis::Phi));
        assert!(!set.fixes_sample_axis(Axis::Nu));
        assert_eq!(set.detector.and_then(|d| d.axis()), Some(Axis::Nu));
    }

    #[test]
    fn test_display_in_degrees() {
        let set = ConstraintSet::new(ReferenceConstraint::Psi(HALF_PI))
            .with_sample(SampleConstraint::Chi(HALF_PI))
            .with_sample(SampleConstraint::Phi(0.0));
        assert_eq!(set.to_string(), "psi=90.0000, chi=90.0000, phi=0.0000");
    }
}
