//! Cell classification and choice of integration directions
use crate::{
    ImplicitFunction, Sampler,
    types::{Cell, Dirs},
};
use arrayvec::ArrayVec;
use log::debug;
use nalgebra::Vector3;

/// Upper bound on coordinate-descent sweeps when probing a cell
const MAX_SWEEPS: usize = 8;

/// Function values at the corners of a cell, indexed by corner bitmask
pub type Corners = ArrayVec<f64, 8>;

/// How the interface relates to a cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellType {
    /// The cell lies entirely in the outer phase (`f >= 0`)
    Empty,
    /// The cell lies entirely in the reference phase (`f < 0`)
    Full,
    /// The interface crosses the cell
    Cut,
}

/// Samples the function at every corner of a cell
pub fn corner_values<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    cell: &Cell,
) -> Corners {
    (0..cell.dim().corners())
        .map(|i| sampler.eval(&cell.corner(i)))
        .collect()
}

/// Classifies a cell from its corner values
///
/// Mixed corner signs mean a cut cell.  When every corner has the same sign
/// and is further than `D * fh` from zero, the cell is taken as uniform.
/// Otherwise, a coordinate-descent search starting from the corner closest
/// to the interface looks for an interior point of the opposite sign.
pub fn cell_type<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    cell: &Cell,
    values: &[f64],
) -> CellType {
    let inside = values.iter().filter(|v| **v < 0.0).count();
    if inside != 0 && inside != values.len() {
        return CellType::Cut;
    }
    let (sign, uniform) = if inside == 0 {
        (1.0, CellType::Empty)
    } else {
        (-1.0, CellType::Full)
    };

    let (best, fmin) = values
        .iter()
        .map(|v| v.abs())
        .enumerate()
        .fold((0, f64::INFINITY), |acc, (i, v)| {
            if v < acc.1 { (i, v) } else { acc }
        });
    let n = cell.dim().count();
    if fmin > n as f64 * sampler.fh() {
        return uniform;
    }

    let x0 = cell.origin();
    let axes = [Vector3::x(), Vector3::y(), Vector3::z()];
    let mut start = [0.0; 3];
    for (i, u) in start.iter_mut().enumerate().take(n) {
        if best & (1 << i) != 0 {
            *u = cell.spacing();
        }
    }
    let block = Block {
        origin: x0,
        axes: &axes[..n],
        h0: cell.spacing(),
    };
    if block.find_sign_change(sampler, start, sign * values[best], sign) {
        debug!(
            "cell at {:?} is cut despite uniform corners",
            &x0.as_slice()[..n]
        );
        CellType::Cut
    } else {
        uniform
    }
}

/// A square or cube of side `h0`, spanned by `axes` from `origin`
pub(crate) struct Block<'a> {
    pub origin: Vector3<f64>,
    pub axes: &'a [Vector3<f64>],
    pub h0: f64,
}

impl Block<'_> {
    fn point(&self, u: &[f64; 3]) -> Vector3<f64> {
        self.axes
            .iter()
            .zip(u)
            .fold(self.origin, |acc, (a, u)| acc + a * *u)
    }

    /// Coordinate descent of `sign * f`, looking for a point where it is
    /// negative
    ///
    /// `start` holds local coordinates along `axes` and `fx` the value of
    /// `sign * f` there.  Each sweep runs a bracketed line minimization along
    /// every axis in turn; the search ends when a sweep brings no progress.
    pub fn find_sign_change<F: ImplicitFunction + ?Sized>(
        &self,
        sampler: &Sampler<F>,
        start: [f64; 3],
        mut fx: f64,
        sign: f64,
    ) -> bool {
        let mut u = start;
        for _ in 0..MAX_SWEEPS {
            let prev = fx;
            for (axis, dir) in self.axes.iter().enumerate() {
                let mut from = u;
                from[axis] = 0.0;
                let m = sampler.minimize_along(
                    &self.point(&from),
                    dir,
                    self.h0,
                    sign,
                    0.0,
                );
                if m.fx < fx {
                    u[axis] = m.x;
                    fx = m.fx;
                }
                if fx < 0.0 {
                    return true;
                }
            }
            if fx >= prev {
                break;
            }
        }
        false
    }
}

/// Picks integration directions for a cell from its corner values
///
/// The gradient is estimated from differences between opposite corners; the
/// primary direction is the axis with the largest component magnitude, the
/// secondary one comes next.  Ties keep axis order.  In 2D, the tertiary
/// direction is always `z`.
pub fn get_dirs(cell: &Cell, values: &[f64]) -> Dirs {
    let n = cell.dim().count();
    let mut grad = [0.0f64; 3];
    for (i, v) in values.iter().enumerate() {
        for (axis, g) in grad.iter_mut().enumerate().take(n) {
            if i & (1 << axis) != 0 {
                *g += v;
            } else {
                *g -= v;
            }
        }
    }
    let mut axes = [0, 1, 2];
    // Stable sort, so ties keep axis order
    axes[..n].sort_by(|a, b| grad[*b].abs().total_cmp(&grad[*a].abs()));
    Dirs::from_axes(axes)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Settings, types::Dim};

    #[test]
    fn cut_by_corners() {
        let f = |x: &[f64]| x[0] - 0.5;
        let settings = Settings::default();
        let s = Sampler::new(&f, Dim::Two, 1.0, &settings);
        let cell = Cell::new(&[0.0, 0.0], 1.0).unwrap();
        let v = corner_values(&s, &cell);
        assert_eq!(v.as_slice(), &[-0.5, 0.5, -0.5, 0.5]);
        assert_eq!(cell_type(&s, &cell, &v), CellType::Cut);
    }

    #[test]
    fn uniform_cells() {
        let f = |x: &[f64]| x[0] + x[1] + x[2] - 10.0;
        let settings = Settings::default();
        let s = Sampler::new(&f, Dim::Three, 1.7, &settings);
        let cell = Cell::new(&[0.0, 0.0, 0.0], 1.0).unwrap();
        let v = corner_values(&s, &cell);
        assert_eq!(v.len(), 8);
        assert_eq!(cell_type(&s, &cell, &v), CellType::Full);

        let cell = Cell::new(&[20.0, 0.0, 0.0], 1.0).unwrap();
        let v = corner_values(&s, &cell);
        assert_eq!(cell_type(&s, &cell, &v), CellType::Empty);

        // Close to the interface but still on one side of it
        let cell = Cell::new(&[10.5, 0.0, 0.0], 1.0).unwrap();
        let v = corner_values(&s, &cell);
        assert_eq!(cell_type(&s, &cell, &v), CellType::Empty);
    }

    #[test]
    fn hidden_blob() {
        // A small circle in the middle of the cell, invisible to the corners
        let f =
            |x: &[f64]| (x[0] - 0.4).powi(2) + (x[1] - 0.6).powi(2) - 0.01;
        let settings = Settings::default();
        let s = Sampler::new(&f, Dim::Two, 0.2, &settings);
        let cell = Cell::new(&[0.0, 0.0], 1.0).unwrap();
        let v = corner_values(&s, &cell);
        assert!(v.iter().all(|v| *v > 0.0));
        assert_eq!(cell_type(&s, &cell, &v), CellType::Cut);

        // With a tiny scale the search is skipped
        let s = Sampler::new(&f, Dim::Two, 1e-3, &settings);
        assert_eq!(cell_type(&s, &cell, &v), CellType::Empty);
    }

    #[test]
    fn directions() {
        let cell = Cell::new(&[0.0, 0.0, 0.0], 1.0).unwrap();
        let f = |x: &[f64]| 0.1 * x[0] - 2.0 * x[1] + 0.5 * x[2];
        let v: Corners = (0..8).map(|i| f(cell.corner(i).as_slice())).collect();
        assert_eq!(get_dirs(&cell, &v), Dirs::from_axes([1, 2, 0]));

        // Ties keep axis order
        let v = [0.0; 8];
        assert_eq!(get_dirs(&cell, &v), Dirs::default());

        let cell = Cell::new(&[0.0, 0.0], 1.0).unwrap();
        let v = [0.0, 0.1, 1.0, 1.1];
        assert_eq!(get_dirs(&cell, &v), Dirs::from_axes([1, 0, 2]));
    }
}
