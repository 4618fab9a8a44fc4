//! Six-circle diffractometer hkl calculator.
//!
//! Converts between Miller indices and the six motor angles of a four-circle
//! sample stage (mu, eta, chi, phi) on a two-circle detector arm (delta, nu).
//! The inverse problem is under-determined by three degrees of freedom, so
//! every request carries three constraints: one on the reference geometry,
//! plus either one detector-group and one sample constraint or two sample
//! constraints.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`calculator`] | [`HklCalculator`], the staged inverse solve |
//! | [`forward`] | Angles to hkl and to virtual angles |
//! | [`reference`] | Bragg angle and the (psi, alpha, beta) triple |
//! | [`detector`] | delta, nu and qaz from one detector constraint |
//! | [`sample`] | mu, eta, chi and phi from one or two sample constraints |
//! | [`explorer`] | Branch enumeration, filtering and selection |
//! | [`degeneracy`] | Canonical presentation of co-linear axes |
//! | [`constraints`] | Constraint groups and their validation |
//! | [`hardware`] | Axis limits and cuts |
//! | [`geometry`] | Per-axis rotation matrices |
//! | [`reporter`] | Diagnostics and their sinks |
//!
//! # Example
//!
//! ```
//! use diffcalc_core::{constants::{PI, TWOPI}, Matrix3};
//! use diffcalc_hkl::{
//!     Axis, AxisLimits, ConstraintSet, DetectorConstraint, HklCalculator, ReferenceConstraint,
//!     SampleConstraint, UbMatrix,
//! };
//!
//! let calculator = HklCalculator::new(UbMatrix::new(Matrix3::identity().scale(TWOPI)).unwrap());
//! let constraints = ConstraintSet::new(ReferenceConstraint::Alpha(2f64.to_radians()))
//!     .with_detector(DetectorConstraint::Qaz(PI / 2.0))
//!     .with_sample(SampleConstraint::Mu(0.0));
//! let limits = AxisLimits::default().with_range(Axis::Delta, 0.0, PI);
//!
//! let solution = calculator.hkl_to_angles([1.0, 0.0, 0.2], 1.0, &constraints, &limits).unwrap();
//! let hkl = calculator.angles_to_hkl(&solution.position, 1.0).unwrap();
//! assert!((hkl[2] - 0.2).abs() < 1e-8);
//! assert!((solution.virtual_angles.alpha.to_degrees() - 2.0).abs() < 1e-8);
//! ```
//!
//! # Conventions
//!
//! - Angles are radians throughout; [`Position::from_degrees`] and
//!   [`Position::to_degrees`] convert at the edges.
//! - The incident beam runs along the laboratory +y axis.
//! - Failures name the [`Stage`] that raised them.

pub mod calculator;
pub mod constraints;
pub mod degeneracy;
pub mod detector;
pub mod error;
pub mod explorer;
pub mod forward;
pub mod geometry;
pub mod hardware;
pub mod position;
pub mod reference;
pub mod reporter;
pub mod sample;
mod trig;
pub mod ub;

pub use calculator::{HklCalculator, Solution};
pub use constraints::{
    ConstraintSet, DetectorConstraint, ReferenceConstraint, SampleConstraint, SampleMode,
};
pub use error::{Error, Result, Stage};
pub use forward::{angles_to_hkl, angles_to_virtual, VirtualAngles};
pub use hardware::{AxisLimits, AxisRange, HardwareLimits};
pub use position::{Axis, Position};
pub use reference::bragg_angle;
pub use reporter::{CollectingReporter, Diagnostic, NullReporter, Reporter, Severity, TracingReporter};
pub use sample::orthonormal_frame;
pub use ub::UbMatrix;
