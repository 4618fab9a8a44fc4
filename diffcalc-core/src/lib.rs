//! Numeric building blocks for diffractometer kinematics.
//!
//! `diffcalc-core` holds the small, dependency-light pieces the hkl solver is
//! made of: vectors, 3×3 matrices with active axis rotations, tolerance-aware
//! comparisons and angle wrapping.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`matrix`] | [`Matrix3`] and [`Vector3`] |
//! | [`math`] | `SMALL`-tolerance comparisons, bounded sine/cosine clamping |
//! | [`utils`] | Branch-cut wrapping of solved angles |
//! | [`constants`] | π multiples, degree/radian conversion, tolerances |
//!
//! # Design Notes
//!
//! - **Radians internally**: every angle is in radians. Degree conversion is
//!   left to the edges ([`constants::DEG_TO_RAD`], [`constants::RAD_TO_DEG`]).
//! - **One tolerance**: [`constants::SMALL`] decides every near-zero question,
//!   so degeneracy detection and solution filtering agree with each other.

pub mod constants;
pub mod math;
pub mod matrix;
pub mod utils;

pub use matrix::{Matrix3, Vector3};
