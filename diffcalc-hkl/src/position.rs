//! The six diffractometer angles.

use diffcalc_core::constants::{DEG_TO_RAD, RAD_TO_DEG};
use std::fmt;

/// One mechanical circle of the six-circle diffractometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Axis {
    Mu,
    Delta,
    Nu,
    Eta,
    Chi,
    Phi,
}

impl Axis {
    /// All axes in position order.
    pub const ALL: [Axis; 6] = [
        Axis::Mu,
        Axis::Delta,
        Axis::Nu,
        Axis::Eta,
        Axis::Chi,
        Axis::Phi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Axis::Mu => "mu",
            Axis::Delta => "delta",
            Axis::Nu => "nu",
            Axis::Eta => "eta",
            Axis::Chi => "chi",
            Axis::Phi => "phi",
        }
    }

    /// Index of this axis in [`Position::to_array`].
    pub fn index(&self) -> usize {
        match self {
            Axis::Mu => 0,
            Axis::Delta => 1,
            Axis::Nu => 2,
            Axis::Eta => 3,
            Axis::Chi => 4,
            Axis::Phi => 5,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A full set of diffractometer angles in radians.
///
/// ```
/// use diffcalc_hkl::{Axis, Position};
///
/// let pos = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 1.0, 1.0);
/// assert!((pos.get(Axis::Delta) - 60f64.to_radians()).abs() < 1e-15);
/// assert!((pos.to_degrees()[3] - 30.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub mu: f64,
    pub delta: f64,
    pub nu: f64,
    pub eta: f64,
    pub chi: f64,
    pub phi: f64,
}

impl Position {
    pub fn new(mu: f64, delta: f64, nu: f64, eta: f64, chi: f64, phi: f64) -> Self {
        Self {
            mu,
            delta,
            nu,
            eta,
            chi,
            phi,
        }
    }

    pub fn from_degrees(mu: f64, delta: f64, nu: f64, eta: f64, chi: f64, phi: f64) -> Self {
        Self::new(
            mu * DEG_TO_RAD,
            delta * DEG_TO_RAD,
            nu * DEG_TO_RAD,
            eta * DEG_TO_RAD,
            chi * DEG_TO_RAD,
            phi * DEG_TO_RAD,
        )
    }

    /// Angles in degrees, in [`Axis::ALL`] order.
    pub fn to_degrees(&self) -> [f64; 6] {
        self.to_array().map(|v| v * RAD_TO_DEG)
    }

    /// Angles in radians, in [`Axis::ALL`] order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.mu, self.delta, self.nu, self.eta, self.chi, self.phi]
    }

    pub fn from_array(values: [f64; 6]) -> Self {
        Self::new(
            values[0], values[1], values[2], values[3], values[4], values[5],
        )
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Mu => self.mu,
            Axis::Delta => self.delta,
            Axis::Nu => self.nu,
            Axis::Eta => self.eta,
            Axis::Chi => self.chi,
            Axis::Phi => self.phi,
        }
    }

    /// Returns a copy with one axis replaced.
    pub fn with(&self, axis: Axis, value: f64) -> Self {
        let mut values = self.to_array();
        values[axis.index()] = value;
        Self::from_array(values)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let degrees = self.to_degrees();
        for (i, axis) in Axis::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={:.4}", axis, degrees[i])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_index_matches_all_order() {
        for (i, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn test_get_and_with() {
        let pos = Position::new(0.1, 0.2, 0.3, 0.4, 0.5, 0.6);
        for axis in Axis::ALL {
            assert_eq!(pos.get(axis), pos.to_array()[axis.index()]);
        }
        let moved = pos.with(Axis::Chi, 1.5);
        assert_eq!(moved.chi, 1.5);
        assert_eq!(moved.phi, 0.6);
        assert_eq!(pos.chi, 0.5);
    }

    #[test]
    fn test_degrees_conversion() {
        let pos = Position::from_degrees(10.0, 20.0, 30.0, 40.0, 50.0, -60.0);
        let back = pos.to_degrees();
        let expected = [10.0, 20.0, 30.0, 40.0, 50.0, -60.0];
        for (a, b) in back.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_display() {
        let pos = Position::from_degrees(0.0, 60.0, 0.0, 30.0, 1.0, 1.0);
        assert_eq!(
            pos.to_string(),
            "mu=0.0000, delta=60.0000, nu=0.0000, eta=30.0000, chi=1.0000, phi=1.0000"
        );
    }
}
