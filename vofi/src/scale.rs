//! Characteristic scale of an implicit function
use crate::{Error, ImplicitFunction, Settings, types::to_vector};
use log::{debug, warn};
use nalgebra::Vector3;

/// Estimates the characteristic scale `fh` of `f` near `x0`
///
/// `fh` is the variation of `f` across one grid spacing at the interface,
/// `|grad f| * h0`, with the gradient taken by central differences of step
/// `h0 / 2`.  Tolerances elsewhere in the kernel are expressed relative to
/// it, so that an implicit function and any positive multiple of it give the
/// same results.
///
/// With `locate` set, `x0` is first moved onto the interface by a Newton walk
/// whose steps are at most `h0` long; otherwise the gradient at `x0` itself
/// is used.  The dimension is taken from `x0.len()`.
///
/// ```
/// let circle = |x: &[f64]| x[0] * x[0] + x[1] * x[1] - 1.0;
/// let settings = vofi::Settings::default();
/// let fh = vofi::get_fh(&circle, &[0.0, 0.5], 0.1, true, &settings).unwrap();
/// assert!((fh - 0.2).abs() < 1e-12);
/// ```
pub fn get_fh<F: ImplicitFunction + ?Sized>(
    f: &F,
    x0: &[f64],
    h0: f64,
    locate: bool,
    settings: &Settings,
) -> Result<f64, Error> {
    if !h0.is_finite() || h0 <= 0.0 {
        return Err(Error::BadSpacing(h0));
    }
    let mut x = to_vector(x0)?;
    let n = x0.len();
    let eval = |p: &Vector3<f64>| f.eval(&p.as_slice()[..n]);

    if locate {
        let mut converged = false;
        for _ in 0..settings.max_iter {
            let fx = eval(&x);
            if fx == 0.0 {
                converged = true;
                break;
            }
            let g = gradient(&eval, &x, n, h0);
            let g2 = g.norm_squared();
            if !(g2 > 0.0 && g2.is_finite()) {
                break;
            }
            let mut step = g * (-fx / g2);
            let len = step.norm();
            if len > h0 {
                step *= h0 / len;
            }
            x += step;
            if step.norm() <= settings.eps_r {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                "could not reach the interface from {x0:?}, \
                 measuring the scale at {:?}",
                &x.as_slice()[..n]
            );
        }
    }

    let fh = gradient(&eval, &x, n, h0).norm() * h0;
    debug!("characteristic scale at {:?}: {fh:e}", &x.as_slice()[..n]);
    if fh > 0.0 && fh.is_finite() {
        Ok(fh)
    } else {
        Err(Error::DegenerateScale(fh))
    }
}

/// Central-difference gradient over the first `n` axes, step `h0 / 2`
fn gradient<E: Fn(&Vector3<f64>) -> f64>(
    eval: &E,
    x: &Vector3<f64>,
    n: usize,
    h0: f64,
) -> Vector3<f64> {
    let d = 0.5 * h0;
    let mut g = Vector3::zeros();
    for i in 0..n {
        let e = Vector3::ith(i, d);
        g[i] = (eval(&(x + e)) - eval(&(x - e))) / h0;
    }
    g
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn circle(x: &[f64]) -> f64 {
        (x[0] - 0.5).powi(2) + (x[1] - 0.5).powi(2) - 0.09
    }

    #[test]
    fn linear() {
        let f = |x: &[f64]| x[0] + 2.0 * x[1];
        let s = Settings::default();
        let fh = get_fh(&f, &[0.3, 0.1], 0.01, false, &s).unwrap();
        assert_relative_eq!(fh, 5f64.sqrt() * 0.01, max_relative = 1e-12);

        // Scaling the function scales fh by the same factor
        let g = |x: &[f64]| 1e6 * f(x);
        let gh = get_fh(&g, &[0.3, 0.1], 0.01, false, &s).unwrap();
        assert_relative_eq!(gh, 1e6 * fh, max_relative = 1e-12);
    }

    #[test]
    fn locate_on_circle() {
        let s = Settings::default();
        // Gradient is 0.2 at the start point, 0.6 on the circle
        let fh = get_fh(&circle, &[0.5, 0.6], 0.1, false, &s).unwrap();
        assert_relative_eq!(fh, 0.02, max_relative = 1e-12);
        let fh = get_fh(&circle, &[0.5, 0.6], 0.1, true, &s).unwrap();
        assert_relative_eq!(fh, 0.06, max_relative = 1e-12);
    }

    #[test]
    fn sphere() {
        let f = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>() - 1.0;
        let s = Settings::default();
        let fh = get_fh(&f, &[0.2, 0.2, 0.2], 0.05, true, &s).unwrap();
        assert_relative_eq!(fh, 2.0 * 0.05, max_relative = 1e-10);
    }

    #[test]
    fn errors() {
        let s = Settings::default();
        let flat = |_: &[f64]| 1.0;
        assert!(matches!(
            get_fh(&flat, &[0.0, 0.0], 0.1, false, &s),
            Err(Error::DegenerateScale(_))
        ));
        assert!(matches!(
            get_fh(&flat, &[0.0, 0.0], 0.1, true, &s),
            Err(Error::DegenerateScale(_))
        ));
        assert_eq!(
            get_fh(&circle, &[0.0, 0.0], -1.0, false, &s),
            Err(Error::BadSpacing(-1.0))
        );
        assert_eq!(
            get_fh(&circle, &[0.0], 0.1, false, &s),
            Err(Error::BadDimension(1))
        );
        assert_eq!(
            get_fh(&circle, &[f64::NAN, 0.0], 0.1, false, &s),
            Err(Error::NonFinitePoint)
        );
    }
}
