//! Module containing the universal error type
use thiserror::Error;

/// Universal error type for `vofi`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Points must have 2 or 3 coordinates
    #[error("points must have 2 or 3 coordinates, not {0}")]
    BadDimension(usize),

    /// Grid spacing must be finite and positive
    #[error("grid spacing must be finite and positive, got {0}")]
    BadSpacing(f64),

    /// Point has a non-finite coordinate
    #[error("point has a non-finite coordinate")]
    NonFinitePoint,

    /// Tolerance is out of range
    #[error("tolerance `{0}` is out of range ({1})")]
    BadTolerance(&'static str, f64),

    /// Gauss-Legendre point count is out of range
    #[error(
        "Gauss-Legendre point count must be in 1..={max}, got {0}",
        max = crate::gauss::MAX_GAUSS_POINTS
    )]
    BadGaussPoints(usize),

    /// Iteration limit must be non-zero
    #[error("iteration limit must be non-zero")]
    BadIterationLimit,

    /// The implicit function has no usable gradient near the given point
    #[error("characteristic scale is degenerate ({0})")]
    DegenerateScale(f64),
}
