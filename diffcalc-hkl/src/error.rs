//! Error types for the hkl solver.
//!
//! Every failure aborts the solve and names the [`Stage`] that raised it. No
//! partial position is ever returned alongside an error.
//!
//! # Error Categories
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`UnreachableReflection`](Error::UnreachableReflection) | \|Q\| is zero or too long, or a derived sine/cosine leaves [-1, 1] |
//! | [`UnderDetermined`](Error::UnderDetermined) | two axes cannot be separated under the current constraints |
//! | [`Unsupported`](Error::Unsupported) | three sample constraints, or an unhandled pair |
//! | [`AmbiguousSolution`](Error::AmbiguousSolution) | more than one detector pair survives filtering |
//! | [`NoSolution`](Error::NoSolution) | nothing survives hardware limits or round-trip checks |
//! | [`InvalidConstraints`](Error::InvalidConstraints) | the constraint set is malformed |
//! | [`SingularUb`](Error::SingularUb) | the UB matrix cannot be inverted |
//! | [`InvalidWavelength`](Error::InvalidWavelength) | wavelength is not positive and finite |
//!
//! ```
//! use diffcalc_hkl::{Error, Stage};
//!
//! let err = Error::no_solution(Stage::Detector, "all delta/nu pairs are outside the limits");
//! assert!(err.is_no_solution());
//! assert_eq!(err.stage(), Stage::Detector);
//! ```

use std::fmt;
use thiserror::Error;

/// The solving stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validation,
    /// Bragg angle and scattering-vector checks.
    Reflection,
    /// psi / alpha / beta resolution.
    Reference,
    Detector,
    Sample,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Reflection => "reflection",
            Stage::Reference => "reference",
            Stage::Detector => "detector",
            Stage::Sample => "sample",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unreachable reflection ({stage} stage): {message}")]
    UnreachableReflection { stage: Stage, message: String },

    #[error("Under-determined ({stage} stage): {message}")]
    UnderDetermined { stage: Stage, message: String },

    #[error("Unsupported ({stage} stage): {message}")]
    Unsupported { stage: Stage, message: String },

    /// Several detector solutions remain; narrowing the hardware limits
    /// usually resolves this.
    #[error("Ambiguous solution ({stage} stage): {message}")]
    AmbiguousSolution { stage: Stage, message: String },

    #[error("No solution ({stage} stage): {message}")]
    NoSolution { stage: Stage, message: String },

    #[error("Invalid constraints: {0}")]
    InvalidConstraints(String),

    #[error("UB matrix is singular and cannot be inverted")]
    SingularUb,

    #[error("Invalid wavelength {0}: must be positive and finite")]
    InvalidWavelength(f64),

    #[error("Reference vector must be finite and non-zero")]
    InvalidReferenceVector,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unreachable(stage: Stage, reason: impl Into<String>) -> Self {
        Self::UnreachableReflection {
            stage,
            message: reason.into(),
        }
    }

    pub fn under_determined(stage: Stage, reason: impl Into<String>) -> Self {
        Self::UnderDetermined {
            stage,
            message: reason.into(),
        }
    }

    pub fn unsupported(stage: Stage, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            stage,
            message: reason.into(),
        }
    }

    pub fn ambiguous(stage: Stage, reason: impl Into<String>) -> Self {
        Self::AmbiguousSolution {
            stage,
            message: reason.into(),
        }
    }

    pub fn no_solution(stage: Stage, reason: impl Into<String>) -> Self {
        Self::NoSolution {
            stage,
            message: reason.into(),
        }
    }

    pub fn invalid_constraints(reason: impl Into<String>) -> Self {
        Self::InvalidConstraints(reason.into())
    }

    /// The stage that raised this error. Input-validation failures report
    /// [`Stage::Validation`].
    pub fn stage(&self) -> Stage {
        match self {
            Self::UnreachableReflection { stage, .. }
            | Self::UnderDetermined { stage, .. }
            | Self::Unsupported { stage, .. }
            | Self::AmbiguousSolution { stage, .. }
            | Self::NoSolution { stage, .. } => *stage,
            Self::InvalidConstraints(_)
            | Self::SingularUb
            | Self::InvalidWavelength(_)
            | Self::InvalidReferenceVector => Stage::Validation,
        }
    }

    /// True for [`NoSolution`](Self::NoSolution), the one failure the
    /// two-sample search recovers from by trying the next azimuth.
    pub fn is_no_solution(&self) -> bool {
        matches!(self, Self::NoSolution { .. })
    }
}
