//! Inverse trigonometry that turns an impossible sine or cosine into an
//! [`UnreachableReflection`](crate::Error::UnreachableReflection).

use crate::error::{Error, Result, Stage};
use diffcalc_core::math::bound;

pub(crate) fn asin_bounded(x: f64, stage: Stage, what: &str) -> Result<f64> {
    bound(x).map(libm::asin).ok_or_else(|| out_of_domain(x, stage, what))
}

pub(crate) fn acos_bounded(x: f64, stage: Stage, what: &str) -> Result<f64> {
    bound(x).map(libm::acos).ok_or_else(|| out_of_domain(x, stage, what))
}

fn out_of_domain(x: f64, stage: Stage, what: &str) -> Error {
    Error::unreachable(
        stage,
        format!("{} would need a sine or cosine of {:.6}", what, x),
    )
}
