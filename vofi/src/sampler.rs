//! Point sampling and per-edge searches
use crate::{
    ImplicitFunction, Settings,
    min::{Minimum, minimize},
    root::find_root,
    types::Dim,
};
use nalgebra::Vector3;

/// An implicit function bound to the parameters of one evaluation
///
/// The sampler carries everything the kernel stages need besides geometry:
/// the function itself, the problem dimension, the characteristic scale `fh`
/// and the [`Settings`].  It holds no mutable state, so a single sampler can
/// be reused for every cell that shares those parameters.
pub struct Sampler<'a, F: ?Sized> {
    f: &'a F,
    dim: Dim,
    fh: f64,
    settings: &'a Settings,
}

impl<'a, F: ImplicitFunction + ?Sized> Sampler<'a, F> {
    /// Builds a new sampler
    ///
    /// `fh` is the characteristic scale from [`get_fh`](crate::get_fh); a
    /// value of zero disables every search for crossings that corner signs
    /// alone cannot reveal.
    pub fn new(f: &'a F, dim: Dim, fh: f64, settings: &'a Settings) -> Self {
        Self {
            f,
            dim,
            fh,
            settings,
        }
    }

    /// Returns the problem dimension
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// Returns the characteristic scale
    pub fn fh(&self) -> f64 {
        self.fh
    }

    /// Returns the settings
    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Evaluates the function at a point
    ///
    /// Only the first `D` coordinates of `p` are passed on.
    pub fn eval(&self, p: &Vector3<f64>) -> f64 {
        self.f.eval(&p.as_slice()[..self.dim.count()])
    }

    /// Finds the crossing between offsets `a` and `b` along a ray
    ///
    /// `fa` and `fb` are the function values at `start + dir * a` and
    /// `start + dir * b`, and must not share a sign.  Returns the offset of
    /// the crossing.
    pub fn root_between(
        &self,
        start: &Vector3<f64>,
        dir: &Vector3<f64>,
        (a, fa): (f64, f64),
        (b, fb): (f64, f64),
    ) -> f64 {
        find_root(
            |u| self.eval(&(start + dir * u)),
            a,
            b,
            fa,
            fb,
            self.settings.eps_r,
            self.settings.eps_f * self.fh,
            self.settings.max_iter,
        )
    }

    /// Finds the crossing on an edge whose end values differ in sign
    ///
    /// The edge runs from `start` to `start + dir * len`; the returned value
    /// is the distance from `start`, strictly between the ends unless one of
    /// them is exactly on the interface.
    pub fn edge_root(
        &self,
        start: &Vector3<f64>,
        dir: &Vector3<f64>,
        len: f64,
        f0: f64,
        f1: f64,
    ) -> f64 {
        self.root_between(start, dir, (0.0, f0), (len, f1))
    }

    /// Minimizes `sign * f` along a segment
    ///
    /// The search stops early once it finds a point where `sign * f < 0`.
    pub fn minimize_along(
        &self,
        start: &Vector3<f64>,
        dir: &Vector3<f64>,
        len: f64,
        sign: f64,
        stop: f64,
    ) -> Minimum {
        minimize(
            |u| sign * self.eval(&(start + dir * u)),
            0.0,
            len,
            self.settings.eps_r,
            self.settings.max_iter,
            stop,
        )
    }

    /// Looks for a pair of crossings on an edge whose ends share a sign
    ///
    /// The search only runs when one end is within `fh` of the interface,
    /// since a dip of the opposite sign is implausible otherwise.  Returns
    /// the two crossing offsets in ascending order.  Only one dip is looked
    /// for, so further pairs on the same edge go unnoticed.
    pub fn hidden_crossings(
        &self,
        start: &Vector3<f64>,
        dir: &Vector3<f64>,
        len: f64,
        f0: f64,
        f1: f64,
    ) -> Option<(f64, f64)> {
        if f0 * f1 < 0.0 || f0.abs().min(f1.abs()) >= self.fh {
            return None;
        }
        let sign = if f0 + f1 > 0.0 {
            1.0
        } else if f0 + f1 < 0.0 {
            -1.0
        } else {
            return None;
        };
        let m = self.minimize_along(start, dir, len, sign, 0.0);
        if m.fx >= 0.0 {
            return None;
        }
        let fm = sign * m.fx;
        let r0 = self.root_between(start, dir, (0.0, f0), (m.x, fm));
        let r1 = self.root_between(start, dir, (m.x, fm), (len, f1));
        Some((r0, r1))
    }

    /// Counts interface crossings on an edge: 0, 1 or 2
    ///
    /// The interface is assumed to cross an edge at most twice.  An edge
    /// with several dips of the opposite sign still reports 2.
    pub fn crossings(
        &self,
        start: &Vector3<f64>,
        dir: &Vector3<f64>,
        len: f64,
    ) -> u8 {
        let f0 = self.eval(start);
        let f1 = self.eval(&(start + dir * len));
        if f0 * f1 < 0.0 {
            1
        } else if self.hidden_crossings(start, dir, len, f0, f1).is_some() {
            2
        } else {
            0
        }
    }

    /// Returns the length of the reference phase along a segment
    ///
    /// This is the innermost stage of the dimension reduction: the segment
    /// runs along the primary direction, and the interface is located
    /// exactly on it.
    pub fn inside_length(
        &self,
        start: &Vector3<f64>,
        dir: &Vector3<f64>,
        len: f64,
    ) -> f64 {
        let f0 = self.eval(start);
        let f1 = self.eval(&(start + dir * len));
        if f0 * f1 < 0.0 {
            let r = self.edge_root(start, dir, len, f0, f1);
            return if f0 < 0.0 { r } else { len - r };
        }
        let inside = f0 + f1 < 0.0;
        match self.hidden_crossings(start, dir, len, f0, f1) {
            Some((r0, r1)) if inside => len - (r1 - r0),
            Some((r0, r1)) => r1 - r0,
            None if inside => len,
            None => 0.0,
        }
    }
}
