//! Tolerances and switches for the color function kernel
use crate::{Error, gauss::MAX_GAUSS_POINTS};

/// Settings shared by every stage of a color function evaluation
///
/// The kernel never mutates these; a single instance can be shared between
/// threads evaluating independent cells.
#[derive(Copy, Clone, Debug)]
pub struct Settings {
    /// Minimum resolvable length
    ///
    /// Sub-intervals shorter than this are merged away, and root brackets
    /// are refined until they are this narrow.
    pub eps_r: f64,

    /// Function-value tolerance, relative to the characteristic scale `fh`
    ///
    /// A root search stops early once `|f| <= eps_f * fh`.
    pub eps_f: f64,

    /// Iteration cap for root finding, minimization and the Newton walk
    pub max_iter: usize,

    /// Gauss-Legendre points used on every integration sub-interval
    pub gauss_points: usize,

    /// Search cell faces for interface patches that no edge sees
    ///
    /// Disabling this falls back to pure edge sampling along the tertiary
    /// direction.
    pub face_analysis: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            eps_r: 1e-14,
            eps_f: 1e-16,
            max_iter: 100,
            gauss_points: 20,
            face_analysis: true,
        }
    }
}

impl Settings {
    /// Checks that every field is in range
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.eps_r.is_finite() && self.eps_r > 0.0) {
            return Err(Error::BadTolerance("eps_r", self.eps_r));
        }
        if !(self.eps_f.is_finite() && self.eps_f >= 0.0) {
            return Err(Error::BadTolerance("eps_f", self.eps_f));
        }
        if self.max_iter == 0 {
            return Err(Error::BadIterationLimit);
        }
        if self.gauss_points == 0 || self.gauss_points > MAX_GAUSS_POINTS {
            return Err(Error::BadGaussPoints(self.gauss_points));
        }
        Ok(())
    }
}
