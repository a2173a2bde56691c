//! Geometric descriptors and the implicit function capability
use crate::Error;
use nalgebra::Vector3;

/// Something that can be evaluated at a point in space
///
/// The slice passed to [`eval`](ImplicitFunction::eval) has exactly as many
/// coordinates as the problem has dimensions (2 or 3).  By convention, the
/// reference phase is the region where the function is negative.
pub trait ImplicitFunction {
    /// Evaluates the function at the given point
    fn eval(&self, x: &[f64]) -> f64;
}

impl<F: Fn(&[f64]) -> f64 + ?Sized> ImplicitFunction for F {
    fn eval(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// Implicit function built from a caller-owned context and a plain function
///
/// The context is passed through untouched on every evaluation.
///
/// ```
/// use vofi::{ContextFn, ImplicitFunction};
///
/// struct Plane {
///     offset: f64,
/// }
/// let plane = Plane { offset: 0.25 };
/// let f = ContextFn::new(&plane, |p: &Plane, x: &[f64]| x[0] - p.offset);
/// assert_eq!(f.eval(&[1.0, 0.0]), 0.75);
/// ```
pub struct ContextFn<'a, T: ?Sized, G> {
    data: &'a T,
    func: G,
}

impl<'a, T: ?Sized, G> ContextFn<'a, T, G>
where
    G: Fn(&T, &[f64]) -> f64,
{
    /// Binds a context to a function
    pub fn new(data: &'a T, func: G) -> Self {
        Self { data, func }
    }
}

impl<T: ?Sized, G> ImplicitFunction for ContextFn<'_, T, G>
where
    G: Fn(&T, &[f64]) -> f64,
{
    fn eval(&self, x: &[f64]) -> f64 {
        (self.func)(self.data, x)
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Number of spatial dimensions of a problem
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Dim {
    /// Planar problem; cells are squares
    Two,
    /// Volumetric problem; cells are cubes
    Three,
}

impl Dim {
    /// Number of coordinates
    pub fn count(self) -> usize {
        match self {
            Dim::Two => 2,
            Dim::Three => 3,
        }
    }

    /// Number of cell corners, i.e. `2^D`
    pub fn corners(self) -> usize {
        1 << self.count()
    }
}

impl TryFrom<usize> for Dim {
    type Error = Error;
    fn try_from(n: usize) -> Result<Self, Error> {
        match n {
            2 => Ok(Dim::Two),
            3 => Ok(Dim::Three),
            n => Err(Error::BadDimension(n)),
        }
    }
}

/// Ordered triple of axis-aligned unit vectors
///
/// `p` is the primary (innermost) direction, `s` the secondary and `t` the
/// tertiary one.  In 2D, `t` is carried along but never used.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dirs {
    /// Primary direction, along which lengths are integrated exactly
    pub p: Vector3<f64>,
    /// Secondary direction
    pub s: Vector3<f64>,
    /// Tertiary direction
    pub t: Vector3<f64>,
}

impl Dirs {
    /// Builds directions from axis indices (0 = x, 1 = y, 2 = z)
    ///
    /// # Panics
    /// If any index is out of range or the indices are not distinct
    pub fn from_axes(axes: [usize; 3]) -> Self {
        assert!(axes.iter().all(|a| *a < 3));
        assert!(
            axes[0] != axes[1] && axes[1] != axes[2] && axes[0] != axes[2]
        );
        Self {
            p: Vector3::ith(axes[0], 1.0),
            s: Vector3::ith(axes[1], 1.0),
            t: Vector3::ith(axes[2], 1.0),
        }
    }
}

impl Default for Dirs {
    fn default() -> Self {
        Self::from_axes([0, 1, 2])
    }
}

/// A square or cubic grid cell
///
/// The cell covers `[x0, x0 + h0]` along every axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cell {
    pub(crate) x0: Vector3<f64>,
    pub(crate) h0: f64,
    pub(crate) dim: Dim,
}

impl Cell {
    /// Builds a cell from its minor vertex and spacing
    ///
    /// The number of coordinates in `x0` selects the dimension.
    pub fn new(x0: &[f64], h0: f64) -> Result<Self, Error> {
        let dim = Dim::try_from(x0.len())?;
        if !(h0.is_finite() && h0 > 0.0) {
            return Err(Error::BadSpacing(h0));
        }
        Ok(Self {
            x0: to_vector(x0)?,
            h0,
            dim,
        })
    }

    /// Returns the minor vertex, padded with zeros to 3 coordinates
    pub fn origin(&self) -> Vector3<f64> {
        self.x0
    }

    /// Returns the grid spacing
    pub fn spacing(&self) -> f64 {
        self.h0
    }

    /// Returns the cell's dimension
    pub fn dim(&self) -> Dim {
        self.dim
    }

    /// Returns the cell measure (area or volume)
    pub fn measure(&self) -> f64 {
        self.h0.powi(self.dim.count() as i32)
    }

    /// Returns the position of the given corner
    ///
    /// Bit `i` of `corner` selects the far side of the cell along axis `i`.
    pub fn corner(&self, corner: usize) -> Vector3<f64> {
        let mut out = self.x0;
        for i in 0..self.dim.count() {
            if corner & (1 << i) != 0 {
                out[i] += self.h0;
            }
        }
        out
    }
}

/// Converts a 2- or 3-coordinate slice into a padded vector
pub(crate) fn to_vector(x: &[f64]) -> Result<Vector3<f64>, Error> {
    if x.len() < 2 || x.len() > 3 {
        return Err(Error::BadDimension(x.len()));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFinitePoint);
    }
    let mut out = Vector3::zeros();
    out.as_mut_slice()[..x.len()].copy_from_slice(x);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cell_validation() {
        assert!(Cell::new(&[0.0, 0.0], 0.1).is_ok());
        assert!(Cell::new(&[0.0, 0.0, 0.0], 0.1).is_ok());
        assert_eq!(Cell::new(&[0.0], 0.1), Err(Error::BadDimension(1)));
        assert_eq!(
            Cell::new(&[0.0, 0.0, 0.0, 0.0], 0.1),
            Err(Error::BadDimension(4))
        );
        assert_eq!(Cell::new(&[0.0, 0.0], 0.0), Err(Error::BadSpacing(0.0)));
        assert_eq!(
            Cell::new(&[0.0, f64::INFINITY], 1.0),
            Err(Error::NonFinitePoint)
        );
    }

    #[test]
    fn cell_corners() {
        let c = Cell::new(&[1.0, 2.0, 3.0], 0.5).unwrap();
        assert_eq!(c.corner(0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(c.corner(0b001), Vector3::new(1.5, 2.0, 3.0));
        assert_eq!(c.corner(0b110), Vector3::new(1.0, 2.5, 3.5));
        assert_eq!(c.measure(), 0.125);

        let c = Cell::new(&[1.0, 2.0], 0.5).unwrap();
        assert_eq!(c.corner(0b11), Vector3::new(1.5, 2.5, 0.0));
        assert_eq!(c.dim().corners(), 4);
    }

    #[test]
    fn dirs_from_axes() {
        let d = Dirs::from_axes([2, 0, 1]);
        assert_eq!(d.p, Vector3::z());
        assert_eq!(d.s, Vector3::x());
        assert_eq!(d.t, Vector3::y());
    }

    #[test]
    fn closures_and_context() {
        let f = |x: &[f64]| x[0] + x[1];
        assert_eq!(f.eval(&[1.0, 2.0]), 3.0);

        let radius = 2.0;
        let g = ContextFn::new(&radius, |r: &f64, x: &[f64]| {
            x.iter().map(|v| v * v).sum::<f64>() - r * r
        });
        assert_eq!(g.eval(&[2.0, 0.0, 0.0]), 0.0);
    }
}
