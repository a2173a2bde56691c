//! Color function (volume fraction) of a single cell
//!
//! The integral of the reference phase over a cell is reduced one dimension
//! at a time.  In 3D, the cell is swept along the tertiary direction and
//! every section is a 2D problem; each 2D section is swept along the
//! secondary direction, and every line of that sweep runs along the primary
//! direction, where the enclosed length is computed exactly from the
//! interface crossings.  Both sweeps use Gauss-Legendre quadrature on the
//! subintervals from [`get_limits`], which keeps the integrand smooth on
//! each of them.
use crate::{
    ImplicitFunction, Sampler, Settings,
    cell::{CellType, cell_type, corner_values, get_dirs},
    gauss::{GaussLegendre, MAX_GAUSS_POINTS},
    limits::{Sweep, get_limits},
    types::{Cell, Dim, Dirs},
};
use log::debug;
use nalgebra::Vector3;

/// Computes the volume fraction of the reference phase (`f < 0`) in a cell
///
/// `fh` is the characteristic scale from [`get_fh`](crate::get_fh).  The
/// result is always in `[0, 1]`; uniform cells return exactly `0` or `1`.
///
/// The number of quadrature points comes from `settings.gauss_points`,
/// clamped to the supported range.
///
/// ```
/// use vofi::{Cell, Settings, get_cc, get_fh};
///
/// let f = |x: &[f64]| x[0] + x[1] - 1.0;
/// let settings = Settings::default();
/// let fh = get_fh(&f, &[0.5, 0.5], 1.0, true, &settings)?;
/// let cell = Cell::new(&[0.0, 0.0], 1.0)?;
/// let cc = get_cc(&f, &cell, fh, &settings);
/// assert!((cc - 0.5).abs() < 1e-14);
/// # Ok::<(), vofi::Error>(())
/// ```
pub fn get_cc<F: ImplicitFunction + ?Sized>(
    f: &F,
    cell: &Cell,
    fh: f64,
    settings: &Settings,
) -> f64 {
    let sampler = Sampler::new(f, cell.dim(), fh, settings);
    let values = corner_values(&sampler, cell);
    match cell_type(&sampler, cell, &values) {
        CellType::Empty => return 0.0,
        CellType::Full => return 1.0,
        CellType::Cut => (),
    }

    let dirs = get_dirs(cell, &values);
    let gauss =
        GaussLegendre::new(settings.gauss_points.clamp(1, MAX_GAUSS_POINTS));
    let x0 = cell.origin();
    let h0 = cell.spacing();
    let inside = match cell.dim() {
        Dim::Two => section_area(&sampler, &gauss, &x0, &dirs, h0),
        Dim::Three => {
            let part = get_limits(&sampler, &x0, &dirs, h0, Sweep::Tertiary);
            part.intervals()
                .map(|(a, b)| {
                    gauss.integrate(a, b, |t| {
                        let x = x0 + dirs.t * t;
                        section_area(&sampler, &gauss, &x, &dirs, h0)
                    })
                })
                .sum()
        }
    };
    let cc = (inside / cell.measure()).clamp(0.0, 1.0);
    let n = cell.dim().count();
    debug!("cut cell at {:?}: cc = {cc}", &x0.as_slice()[..n]);
    cc
}

/// Area of the reference phase in the square section with corner `x0`
/// spanned by the primary and secondary directions
fn section_area<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    gauss: &GaussLegendre,
    x0: &Vector3<f64>,
    dirs: &Dirs,
    h0: f64,
) -> f64 {
    get_limits(sampler, x0, dirs, h0, Sweep::Secondary)
        .intervals()
        .map(|(a, b)| {
            gauss.integrate(a, b, |s| {
                sampler.inside_length(&(x0 + dirs.s * s), &dirs.p, h0)
            })
        })
        .sum()
}
