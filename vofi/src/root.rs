//! Bracketed root finding
//!
//! Every root search in the kernel starts from a bracket with a verified
//! sign change, so the search below always converges.  It is Brent's
//! method: inverse quadratic interpolation and secant steps, falling back to
//! bisection whenever an interpolated step would leave the bracket or fails
//! to shrink it fast enough.

/// Finds a zero of `f` within `[a, b]`
///
/// `fa` and `fb` are the function values at the bracket ends and must not
/// share a sign; if either is exactly zero, that end is returned right away.
///
/// The search stops once the bracket is narrower than `tol` (plus a few ulps
/// of the current estimate), once `|f| <= ftol`, or after `max_iter`
/// evaluations.  The returned point is always inside `[a, b]`.
#[allow(clippy::too_many_arguments)]
pub fn find_root<F: FnMut(f64) -> f64>(
    mut f: F,
    a: f64,
    b: f64,
    fa: f64,
    fb: f64,
    tol: f64,
    ftol: f64,
    max_iter: usize,
) -> f64 {
    if fa == 0.0 {
        return a;
    } else if fb == 0.0 {
        return b;
    }
    debug_assert!(fa * fb < 0.0, "root is not bracketed");

    let (mut a, mut b, mut fa, mut fb) = (a, b, fa, fb);
    let (mut c, mut fc) = (a, fa);
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iter {
        // Keep `b` as the best estimate and `c` on the far side of the root
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb.abs() <= ftol {
            return b;
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant step
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            if 2.0 * p < (3.0 * xm * q - (tol1 * q).abs()).min((e * q).abs())
            {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b);

        if fb * fc.signum() > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
    }
    b
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear() {
        let f = |x: f64| 2.0 * x - 1.0;
        let r = find_root(f, 0.0, 1.0, -1.0, 1.0, 1e-14, 0.0, 100);
        assert_relative_eq!(r, 0.5, epsilon = 1e-15);
    }

    #[test]
    fn quadratic_reversed_bracket() {
        let f = |x: f64| x * x - 2.0;
        let r = find_root(f, 2.0, 0.0, f(2.0), f(0.0), 1e-14, 0.0, 100);
        assert_relative_eq!(r, 2f64.sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn flat_near_root() {
        // Cubic with a vanishing derivative at the root
        let f = |x: f64| (x - 0.3).powi(3);
        let r = find_root(f, 0.0, 1.0, f(0.0), f(1.0), 1e-14, 0.0, 200);
        assert!((r - 0.3).abs() < 1e-4, "bad root {r}");
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn exact_endpoints() {
        let f = |_: f64| -> f64 { unreachable!() };
        let r = find_root(f, 0.0, 1.0, 0.0, 1.0, 1e-14, 0.0, 1);
        assert_eq!(r, 0.0);
        let r = find_root(f, 0.0, 1.0, -1.0, 0.0, 1e-14, 0.0, 1);
        assert_eq!(r, 1.0);
    }

    #[test]
    fn function_tolerance_stops_early() {
        let mut calls = 0;
        let r = find_root(
            |x| {
                calls += 1;
                x - 0.25
            },
            0.0,
            1.0,
            -0.25,
            0.75,
            1e-14,
            0.5,
            100,
        );
        assert_eq!(calls, 0);
        assert_eq!(r, 0.0);
    }
}
