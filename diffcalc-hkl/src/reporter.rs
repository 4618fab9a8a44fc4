//! Advisory diagnostics raised while solving.
//!
//! The solver never prints. Whenever it makes a choice a user may want to know
//! about (a degenerate axis pinned to zero, several sample solutions narrowed
//! to one), it hands a [`Diagnostic`] to the injected [`Reporter`].
//! Diagnostics never change control flow.
//!
//! | Reporter | Behaviour |
//! |----------|-----------|
//! | [`TracingReporter`] | forwards to `tracing` at the diagnostic's [`Severity`] |
//! | [`NullReporter`] | discards everything |
//! | [`CollectingReporter`] | keeps diagnostics in memory for inspection |

use crate::position::Axis;
use diffcalc_core::constants::RAD_TO_DEG;
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
}

/// Something the solver chose or noticed. Angles in radians.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Provisional detector angles before branch exploration.
    InitialDetectorSolution { delta: f64, nu: f64, qaz: f64 },
    /// Provisional sample angles before branch exploration.
    InitialSampleSolution {
        mu: f64,
        eta: f64,
        chi: f64,
        phi: f64,
    },
    /// delta is 90° so nu has no effect on Q; nu was set to zero.
    DetectorDegenerate { delta: f64 },
    /// chi is 0° or 180°, so eta and phi turn about the same axis; eta was
    /// set to zero.
    EtaPhiCollinear { chi: f64 },
    /// mu and phi turn about the same axis; only their difference is fixed.
    MuPhiCollinear { phi_minus_mu: f64 },
    /// Provisional angles and azimuth from a two-sample-constraint solve.
    TwoSampleInitial {
        xi: f64,
        mu: f64,
        eta: f64,
        chi: f64,
        phi: f64,
    },
    /// Trying one of the equivalent azimuths in the two-sample search.
    TryingAzimuth { xi: f64, qaz: f64 },
    /// Several sample tuples passed the checks; the one closest to zero was
    /// kept.
    MultipleSampleSolutions { count: usize },
    /// A co-linear pair was rebalanced for a canonical presentation.
    DegenerateRedistribution { axis: Axis, shift: f64 },
    /// The reference direction is parallel to Q or Q is parallel to the beam,
    /// so psi is undefined.
    PsiUndefined,
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Self::InitialDetectorSolution { .. }
            | Self::InitialSampleSolution { .. }
            | Self::TwoSampleInitial { .. }
            | Self::TryingAzimuth { .. } => Severity::Debug,
            Self::MultipleSampleSolutions { .. } | Self::DegenerateRedistribution { .. } => {
                Severity::Info
            }
            Self::DetectorDegenerate { .. }
            | Self::EtaPhiCollinear { .. }
            | Self::MuPhiCollinear { .. }
            | Self::PsiUndefined => Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deg = |v: f64| v * RAD_TO_DEG;
        match self {
            Self::InitialDetectorSolution { delta, nu, qaz } => write!(
                f,
                "initial detector solution: delta={:.4} nu={:.4} (qaz={:.4})",
                deg(*delta),
                deg(*nu),
                deg(*qaz)
            ),
            Self::InitialSampleSolution { mu, eta, chi, phi } => write!(
                f,
                "initial sample solution: mu={:.4} eta={:.4} chi={:.4} phi={:.4}",
                deg(*mu),
                deg(*eta),
                deg(*chi),
                deg(*phi)
            ),
            Self::DetectorDegenerate { delta } => write!(
                f,
                "delta={:.4} and nu is unconstrained: nu is degenerate, choosing nu=0",
                deg(*delta)
            ),
            Self::EtaPhiCollinear { chi } => write!(
                f,
                "chi={:.4}: eta and phi are co-linear, choosing eta=0",
                deg(*chi)
            ),
            Self::MuPhiCollinear { phi_minus_mu } => write!(
                f,
                "mu and phi are co-linear, only phi-mu={:.4} is determined",
                deg(*phi_minus_mu)
            ),
            Self::TwoSampleInitial {
                xi,
                mu,
                eta,
                chi,
                phi,
            } => write!(
                f,
                "two-sample solution: xi={:.4} mu={:.4} eta={:.4} chi={:.4} phi={:.4}",
                deg(*xi),
                deg(*mu),
                deg(*eta),
                deg(*chi),
                deg(*phi)
            ),
            Self::TryingAzimuth { xi, qaz } => write!(
                f,
                "trying xi={:.4} (qaz={:.4})",
                deg(*xi),
                deg(*qaz)
            ),
            Self::MultipleSampleSolutions { count } => write!(
                f,
                "{} sample solutions found, choosing the one closest to zero",
                count
            ),
            Self::DegenerateRedistribution { axis, shift } => write!(
                f,
                "degenerate position: moved {:.4} between {} and phi",
                deg(*shift),
                axis
            ),
            Self::PsiUndefined => write!(
                f,
                "psi is undefined: Q is parallel to the reference vector or to the beam"
            ),
        }
    }
}

/// Sink for solver diagnostics.
pub trait Reporter: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing`, mapping [`Severity`] onto levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity() {
            Severity::Debug => debug!(target: "diffcalc_hkl", "{}", diagnostic),
            Severity::Info => info!(target: "diffcalc_hkl", "{}", diagnostic),
            Severity::Warning => warn!(target: "diffcalc_hkl", "{}", diagnostic),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Keeps every diagnostic in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic.clone());
    }
}
