//! Analytic reference geometries with known area or volume
//!
//! Each shape is negative inside, so its interior is the reference phase.
use crate::ImplicitFunction;
use std::f64::consts::PI;

/// Coefficients of a rotated ellipse in quadratic form
///
/// `f(x, y) = c1 x² + c2 y² + c3 xy + c4 x + c5 y - c6`, normalized so that
/// `f = 0` on the ellipse and `f = -1` at its center.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Quadratic {
    c: [f64; 6],
}

impl Quadratic {
    fn new(a: f64, b: f64, alpha: f64, center: [f64; 2]) -> Self {
        let (a2, b2) = (a * a, b * b);
        let (sa, ca) = alpha.sin_cos();
        let [xc, yc] = center;
        let c1 = ca * ca / a2 + sa * sa / b2;
        let c2 = sa * sa / a2 + ca * ca / b2;
        let c3 = 2.0 * ca * sa * (b2 - a2) / (a2 * b2);
        let c4 = -(2.0 * c1 * xc + c3 * yc);
        let c5 = -(2.0 * c2 * yc + c3 * xc);
        let c6 = 1.0 - (c1 * xc * xc + c2 * yc * yc + c3 * xc * yc);
        Self {
            c: [c1, c2, c3, c4, c5, c6],
        }
    }

    fn eval(&self, x: f64, y: f64) -> f64 {
        let [c1, c2, c3, c4, c5, c6] = self.c;
        c1 * x * x + c2 * y * y + c3 * x * y + c4 * x + c5 * y - c6
    }
}

/// A rotated ellipse in the plane
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ellipse {
    a: f64,
    b: f64,
    q: Quadratic,
}

impl Ellipse {
    /// Builds an ellipse with semi-axes `a` (along the axis rotated by
    /// `alpha` from `x`) and `b`
    pub fn new(a: f64, b: f64, alpha: f64, center: [f64; 2]) -> Self {
        Self {
            a,
            b,
            q: Quadratic::new(a, b, alpha, center),
        }
    }

    /// Returns the enclosed area
    pub fn area(&self) -> f64 {
        PI * self.a * self.b
    }
}

impl ImplicitFunction for Ellipse {
    fn eval(&self, x: &[f64]) -> f64 {
        self.q.eval(x[0], x[1])
    }
}

/// The part above `z = 0` of an ellipsoid with one axis along `z`
///
/// The implicit function is defined everywhere; the cap only exists as a
/// volume when the domain is cut at `z = 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EllipsoidCap {
    a: f64,
    b: f64,
    c: f64,
    zc: f64,
    q: Quadratic,
}

impl EllipsoidCap {
    /// Builds an ellipsoid with horizontal semi-axes `a` and `b` (rotated by
    /// `alpha` about `z`) and vertical semi-axis `c`
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, center: [f64; 3]) -> Self {
        let [xc, yc, zc] = center;
        Self {
            a,
            b,
            c,
            zc,
            q: Quadratic::new(a, b, alpha, [xc, yc]),
        }
    }

    /// Returns the volume above `z = 0`
    ///
    /// The cap must not reach past the top of the ellipsoid, i.e.
    /// `-c <= zc <= c`.
    pub fn volume(&self) -> f64 {
        let h = self.c + self.zc;
        PI * self.a * self.b * h * h * (1.0 - h / (3.0 * self.c)) / self.c
    }
}

impl ImplicitFunction for EllipsoidCap {
    fn eval(&self, x: &[f64]) -> f64 {
        let dz = x[2] - self.zc;
        self.q.eval(x[0], x[1]) + dz * dz / (self.c * self.c)
    }
}

/// A sphere, or a circle in 2D
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    /// Center position; only the first `D` coordinates are used
    pub center: [f64; 3],
    /// Radius
    pub radius: f64,
}

impl Sphere {
    /// Returns the enclosed volume
    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }

    /// Returns the enclosed area of the circle
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }
}

impl ImplicitFunction for Sphere {
    fn eval(&self, x: &[f64]) -> f64 {
        x.iter()
            .zip(&self.center)
            .map(|(x, c)| (x - c) * (x - c))
            .sum::<f64>()
            - self.radius * self.radius
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ellipse_axes() {
        let e = Ellipse::new(0.2, 0.1, 0.0, [0.5, 0.5]);
        assert_relative_eq!(e.eval(&[0.5, 0.5]), -1.0, epsilon = 1e-12);
        assert_relative_eq!(e.eval(&[0.7, 0.5]), 0.0, epsilon = 1e-12);
        assert_relative_eq!(e.eval(&[0.5, 0.6]), 0.0, epsilon = 1e-12);

        // Rotated by 90 degrees, the long axis is vertical
        let e = Ellipse::new(0.2, 0.1, std::f64::consts::FRAC_PI_2, [0.0; 2]);
        assert_relative_eq!(e.eval(&[0.0, 0.2]), 0.0, epsilon = 1e-12);
        assert_relative_eq!(e.eval(&[0.1, 0.0]), 0.0, epsilon = 1e-12);
        assert_relative_eq!(e.area(), PI * 0.02);
    }

    #[test]
    fn cap_volume() {
        // Centered at z = 0, the cap is half the ellipsoid
        let cap = EllipsoidCap::new(0.3, 0.2, 0.1, 0.4, [0.0; 3]);
        assert_relative_eq!(cap.volume(), 2.0 / 3.0 * PI * 0.006);
        assert_relative_eq!(cap.eval(&[0.0, 0.0, 0.1]), 0.0, epsilon = 1e-12);

        // Fully above z = 0, it is the whole ellipsoid
        let cap = EllipsoidCap::new(0.3, 0.2, 0.1, 0.4, [0.0, 0.0, 0.1]);
        assert_relative_eq!(cap.volume(), 4.0 / 3.0 * PI * 0.006);
    }

    #[test]
    fn sphere() {
        let s = Sphere {
            center: [0.5, 0.5, 0.5],
            radius: 0.25,
        };
        assert_eq!(s.eval(&[0.5, 0.5, 0.5]), -0.0625);
        assert_eq!(s.eval(&[0.75, 0.5, 0.5]), 0.0);
        assert_eq!(s.eval(&[0.75, 0.5]), 0.0);
        assert_relative_eq!(s.volume(), PI / 48.0);
    }
}
