//! Bracketed one-dimensional minimization
//!
//! This is Brent's method (golden-section search with parabolic
//! interpolation).  It never evaluates the bracket ends themselves, so
//! callers that care about the boundary must compare against the end values
//! they already have.

/// Result of a line minimization
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Minimum {
    /// Position of the best point found
    pub x: f64,
    /// Function value at `x`
    pub fx: f64,
}

/// Golden ratio section, `(3 - sqrt(5)) / 2`
const GOLDEN: f64 = 0.381_966_011_250_105_1;

/// Searches for a local minimum of `f` on `(a, b)`
///
/// The search stops once the location is known to within `tol` (plus a
/// relative `sqrt(EPSILON)` term, the best a smooth minimum allows), after
/// `max_iter` evaluations, or as soon as a value strictly below `stop` turns
/// up.  Pass `f64::NEG_INFINITY` as `stop` to always run to convergence.
pub fn minimize<F: FnMut(f64) -> f64>(
    mut f: F,
    a: f64,
    b: f64,
    tol: f64,
    max_iter: usize,
    stop: f64,
) -> Minimum {
    let sqrt_eps = f64::EPSILON.sqrt();
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };

    let mut x = a + GOLDEN * (b - a);
    let mut fx = f(x);
    let (mut w, mut fw) = (x, fx);
    let (mut v, mut fv) = (x, fx);
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    for _ in 1..max_iter {
        if fx < stop {
            break;
        }
        let xm = 0.5 * (a + b);
        let tol1 = sqrt_eps * x.abs() + tol / 3.0;
        let tol2 = 2.0 * tol1;
        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            break;
        }

        let mut golden = true;
        if e.abs() > tol1 {
            // Fit a parabola through x, v, w
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let prev_e = e;
            e = d;
            if p.abs() < (0.5 * q * prev_e).abs()
                && p > q * (a - x)
                && p < q * (b - x)
            {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = tol1.copysign(xm - x);
                }
                golden = false;
            }
        }
        if golden {
            e = if x >= xm { a - x } else { b - x };
            d = GOLDEN * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else {
            x + tol1.copysign(d)
        };
        let fu = f(u);

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            (v, fv) = (w, fw);
            (w, fw) = (x, fx);
            (x, fx) = (u, fu);
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                (v, fv) = (w, fw);
                (w, fw) = (u, fu);
            } else if fu <= fv || v == x || v == w {
                (v, fv) = (u, fu);
            }
        }
    }
    Minimum { x, fx }
}
