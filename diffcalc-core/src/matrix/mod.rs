//! 3x3 matrices and 3D vectors.
//!
//! - [`Matrix3`]: general 3×3 matrix with active axis rotations and inverse
//! - [`Vector3`]: 3D Cartesian vector

mod matrix3;
mod vector3;

pub use matrix3::Matrix3;
pub use vector3::Vector3;
