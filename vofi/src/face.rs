//! Detection of interface patches that touch a cell face but no edge
//!
//! When the four edges of a face that run along the tertiary direction see
//! no sign change, the interface may still cross the face interior as an
//! isolated patch (a blob grazing the face, or the cap of a saddle).  Edge
//! sampling alone cannot see such a patch, yet the section area is not
//! smooth across its tertiary extent.  The three stages below find it:
//!
//! 1. [`check_face_consistency`] decides from corner values alone whether a
//!    patch is plausible.
//! 2. [`get_face_min`] searches the face for an extremum of the opposite
//!    sign.
//! 3. [`get_face_intersections`] turns a confirmed extremum into tertiary
//!    breakpoints.
use crate::{
    ImplicitFunction, Sampler,
    min::{Minimum, minimize},
    root::find_root,
};
use arrayvec::ArrayVec;
use log::debug;
use nalgebra::Vector3;

/// A square cell face, spanned by the secondary and tertiary directions
#[derive(Copy, Clone, Debug)]
pub struct Face {
    /// Corner of the face with the smallest coordinates
    pub origin: Vector3<f64>,
    /// Secondary direction
    pub s: Vector3<f64>,
    /// Tertiary direction
    pub t: Vector3<f64>,
    /// Side length
    pub h0: f64,
}

impl Face {
    /// Returns the point at local coordinates `(s, t)`
    pub fn point(&self, s: f64, t: f64) -> Vector3<f64> {
        self.origin + self.s * s + self.t * t
    }

    /// Minimizes `sign * f` along the secondary direction at tertiary
    /// position `t`
    fn profile<F: ImplicitFunction + ?Sized>(
        &self,
        sampler: &Sampler<F>,
        sign: f64,
        t: f64,
    ) -> Minimum {
        sampler.minimize_along(
            &self.point(0.0, t),
            &self.s,
            self.h0,
            sign,
            f64::NEG_INFINITY,
        )
    }
}

/// Verdict of [`check_face_consistency`]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceCheck {
    /// The corners cannot rule out a hidden interface patch
    pub needs_search: bool,
    /// Common sign of the face corners (`+1` outside, `-1` inside)
    pub sign: f64,
}

/// An extremum of the implicit function on a face
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceExtremum {
    /// Secondary coordinate, relative to the face origin
    pub s: f64,
    /// Tertiary coordinate, relative to the face origin
    pub t: f64,
    /// Function value at the extremum
    pub value: f64,
    /// Sign of the face corners
    pub sign: f64,
    /// The extremum has the sign opposite to the corners, i.e. the face
    /// hides an interface patch
    pub confirmed: bool,
}

/// Checks whether uniform face corners certify an interface-free face
///
/// `face` holds the four corner values of the face and `opposite` the
/// corresponding values on the parallel face across the cell, both indexed
/// as `2 * j + m` with `j` along the secondary and `m` along the tertiary
/// direction.
///
/// A patch of the opposite sign needs the function to dip by at least the
/// smallest corner magnitude somewhere inside the face.  If that magnitude
/// exceeds every difference between adjacent corners (across the face and
/// towards the opposite face), no such dip is plausible and the face is
/// accepted as is.  No extra function evaluations are made.
pub fn check_face_consistency(
    face: &[f64; 4],
    opposite: &[f64; 4],
) -> FaceCheck {
    let sign = if face.iter().all(|v| *v >= 0.0) {
        1.0
    } else if face.iter().all(|v| *v <= 0.0) {
        -1.0
    } else {
        return FaceCheck {
            needs_search: false,
            sign: 0.0,
        };
    };
    let smallest =
        face.iter().map(|v| v.abs()).fold(f64::INFINITY, f64::min);
    let across = [(0, 1), (2, 3), (0, 2), (1, 3)]
        .iter()
        .map(|&(a, b)| (face[a] - face[b]).abs());
    let towards = face.iter().zip(opposite).map(|(a, b)| (a - b).abs());
    let variation = across.chain(towards).fold(0.0, f64::max);
    FaceCheck {
        needs_search: smallest <= variation,
        sign,
    }
}

/// Searches a face for an extremum of the sign opposite to its corners
///
/// The search is a nested pair of bracketed line minimizations of
/// `sign * f`: the inner one runs along the secondary direction and defines
/// a profile over the tertiary coordinate, which the outer one minimizes.
/// The outer search stops as soon as it reaches the opposite sign.
pub fn get_face_min<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    face: &Face,
    check: &FaceCheck,
) -> FaceExtremum {
    let sign = check.sign;
    let settings = sampler.settings();
    let outer = minimize(
        |t| face.profile(sampler, sign, t).fx,
        0.0,
        face.h0,
        settings.eps_r,
        settings.max_iter,
        0.0,
    );
    let inner = face.profile(sampler, sign, outer.x);
    let out = FaceExtremum {
        s: inner.x,
        t: outer.x,
        value: sign * inner.fx,
        sign,
        confirmed: inner.fx < 0.0,
    };
    if out.confirmed {
        debug!(
            "hidden interface patch on face at {:?}: f({}, {}) = {:e}",
            face.origin.as_slice(),
            out.s,
            out.t,
            out.value
        );
    }
    out
}

/// Returns the tertiary extent of a confirmed face patch
///
/// Starting from the extremum, the face profile (the extremum of `f` along
/// the secondary direction) is followed towards each end of the face.  Where
/// it regains the corner sign before the end, the crossing is located and
/// returned as a breakpoint.  A patch that reaches an end of the face yields
/// no breakpoint there.
pub fn get_face_intersections<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    face: &Face,
    ext: &FaceExtremum,
) -> ArrayVec<f64, 2> {
    debug_assert!(ext.confirmed);
    let settings = sampler.settings();
    let profile = |t: f64| face.profile(sampler, ext.sign, t).fx;
    let gm = ext.sign * ext.value;
    let mut out = ArrayVec::new();
    for end in [0.0, face.h0] {
        let ge = profile(end);
        if ge > 0.0 {
            let r = find_root(
                &profile,
                end,
                ext.t,
                ge,
                gm,
                settings.eps_r,
                settings.eps_f * sampler.fh(),
                settings.max_iter,
            );
            out.push(r);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Settings, types::Dim};
    use approx::assert_relative_eq;

    /// Sphere of radius 0.3 centered just outside the `x = 0` face
    fn bump(x: &[f64]) -> f64 {
        (x[0] + 0.1).powi(2) + (x[1] - 0.5).powi(2) + (x[2] - 0.5).powi(2)
            - 0.09
    }

    fn face() -> Face {
        Face {
            origin: Vector3::zeros(),
            s: Vector3::y(),
            t: Vector3::z(),
            h0: 1.0,
        }
    }

    #[test]
    fn consistency() {
        // Far from zero relative to the variation: nothing to search
        let c = check_face_consistency(&[5.0, 5.1, 5.2, 5.1], &[5.5; 4]);
        assert!(!c.needs_search);
        assert_eq!(c.sign, 1.0);

        // Close to zero relative to the variation towards the other face
        let c = check_face_consistency(&[0.42; 4], &[1.62; 4]);
        assert!(c.needs_search);

        let c = check_face_consistency(&[-0.1, -0.3, -0.2, -0.2], &[0.5; 4]);
        assert!(c.needs_search);
        assert_eq!(c.sign, -1.0);

        // Mixed corners are not this check's business
        let c = check_face_consistency(&[-1.0, 1.0, 1.0, 1.0], &[0.0; 4]);
        assert!(!c.needs_search);
    }

    #[test]
    fn finds_hidden_patch() {
        let settings = Settings::default();
        let sampler = Sampler::new(&bump, Dim::Three, 0.6, &settings);
        let face = face();
        let fv = [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]
            .map(|(s, t)| bump(face.point(s, t).as_slice()));
        let opposite = fv.map(|v| v + 1.2);
        let check = check_face_consistency(&fv, &opposite);
        assert!(check.needs_search);

        let ext = get_face_min(&sampler, &face, &check);
        assert!(ext.confirmed);
        assert!(ext.value < 0.0);
        assert!(bump(face.point(ext.s, ext.t).as_slice()) < 0.0);

        let mut out = get_face_intersections(&sampler, &face, &ext);
        out.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(out.len(), 2);
        let half = 0.08f64.sqrt();
        assert_relative_eq!(out[0], 0.5 - half, epsilon = 1e-9);
        assert_relative_eq!(out[1], 0.5 + half, epsilon = 1e-9);
    }

    #[test]
    fn rejects_missing_patch() {
        // Same bump, pushed far enough away that it no longer reaches the face
        let far = |x: &[f64]| bump(&[x[0] + 0.25, x[1], x[2]]);
        let settings = Settings::default();
        let sampler = Sampler::new(&far, Dim::Three, 0.6, &settings);
        let check = FaceCheck {
            needs_search: true,
            sign: 1.0,
        };
        let ext = get_face_min(&sampler, &face(), &check);
        assert!(!ext.confirmed);
        assert!(ext.value > 0.0);
        assert_relative_eq!(ext.value, 0.35 * 0.35 - 0.09, epsilon = 1e-12);
    }
}
