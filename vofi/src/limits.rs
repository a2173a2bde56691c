//! Integration limits along the secondary and tertiary directions
//!
//! Quadrature is only accurate when the integrand is smooth, and the length
//! or area cut out of a cell by the interface has kinks wherever the
//! interface crosses a cell edge or face.  [`get_limits`] finds those kinks
//! and splits `[0, h0]` into subintervals that each hold a smooth piece.
use crate::{
    ImplicitFunction, Sampler, Settings,
    cell::Block,
    face::{Face, check_face_consistency, get_face_intersections, get_face_min},
    types::Dirs,
};
use arrayvec::ArrayVec;
use log::{trace, warn};
use nalgebra::Vector3;

/// Maximum number of limits in a [`Partition`], endpoints included
pub const MAX_LIMITS: usize = 32;

/// Rounds of transition refinement
const REFINE_PASSES: usize = 3;

/// Probe spacing for transition refinement, as a fraction of a subinterval
const PROBES: usize = 4;

/// Relative inward offset of probes at subinterval ends
const PROBE_NUDGE: f64 = 1e-6;

/// Crossing counts that characterize a line or section of the cell, plus a
/// flag for interface inside a section whose sides see none
type Signature = [u8; 5];

/// Which sweep [`get_limits`] performs
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sweep {
    /// Limits along the secondary direction of a 2D section
    Secondary,
    /// Limits along the tertiary direction of a 3D cell
    Tertiary,
}

/// Sorted breakpoints `0 = l[0] < l[1] < ... < l[n] = h0`
///
/// Adjacent limits are never closer than the length tolerance, and the first
/// and last ones are exactly `0` and `h0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    lim: ArrayVec<f64, MAX_LIMITS>,
}

impl Partition {
    /// Builds a partition of `[0, h0]` from unordered interior breakpoints
    ///
    /// Points outside `(0, h0)` are dropped; points closer than `eps` to a
    /// neighbor are merged into it.
    pub fn new(breaks: &[f64], h0: f64, eps: f64) -> Self {
        let mut lim = ArrayVec::new();
        lim.push(0.0);
        for &b in breaks.iter().filter(|b| **b > 0.0 && **b < h0) {
            if lim.len() + 1 == MAX_LIMITS {
                warn!("too many breakpoints, dropping {b}");
                continue;
            }
            // Insertion sort, the lists are short
            let i = lim.partition_point(|v: &f64| *v <= b);
            lim.insert(i, b);
        }
        lim.push(h0);

        let mut i = 0;
        while i + 1 < lim.len() {
            if lim[i + 1] - lim[i] < eps && lim.len() > 2 {
                lim.remove(if i == 0 { 1 } else { i });
            } else {
                i += 1;
            }
        }
        let n = lim.len();
        lim[0] = 0.0;
        lim[n - 1] = h0;
        Self { lim }
    }

    /// Number of subintervals
    pub fn nsub(&self) -> usize {
        self.lim.len() - 1
    }

    /// All limits, endpoints included
    pub fn limits(&self) -> &[f64] {
        &self.lim
    }

    /// Iterates over subintervals as `(start, end)` pairs
    pub fn intervals(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lim.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Breakpoint accumulator that never overflows
#[derive(Default)]
struct Breaks(ArrayVec<f64, MAX_LIMITS>);

impl Breaks {
    fn push(&mut self, b: f64) {
        if self.0.try_push(b).is_err() {
            warn!("breakpoint buffer is full, dropping {b}");
        }
    }
}

/// Computes the integration limits of a cell
///
/// The cell has corner `x0`, side `h0` and local frame `dirs`.
///
/// - [`Sweep::Secondary`] partitions the secondary direction using the two
///   edges along it (at primary offsets `0` and `h0`).
/// - [`Sweep::Tertiary`] partitions the tertiary direction using the four
///   edges along it and the two faces normal to the primary direction.
///
/// With face analysis enabled, each subinterval is then checked for changes
/// in the crossing pattern of the primary lines (secondary sweep) or of the
/// section sides (tertiary sweep), which mark tangencies that no edge sees.
pub fn get_limits<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    x0: &Vector3<f64>,
    dirs: &Dirs,
    h0: f64,
    sweep: Sweep,
) -> Partition {
    let settings = sampler.settings();
    let eps = settings.eps_r;
    let mut breaks = Breaks::default();
    match sweep {
        Sweep::Secondary => {
            for k in 0..2 {
                let start = x0 + dirs.p * (k as f64 * h0);
                let f0 = sampler.eval(&start);
                let f1 = sampler.eval(&(start + dirs.s * h0));
                side_crossings(
                    sampler,
                    &start,
                    &dirs.s,
                    h0,
                    f0,
                    f1,
                    &mut breaks,
                );
            }
        }
        Sweep::Tertiary => {
            tertiary_crossings(sampler, x0, dirs, h0, &mut breaks);
        }
    }
    let mut part = Partition::new(&breaks.0, h0, eps);
    if settings.face_analysis {
        for _ in 0..REFINE_PASSES {
            let extra = match sweep {
                Sweep::Secondary => transitions(&part, settings, |u| {
                    let start = x0 + dirs.s * u;
                    [sampler.crossings(&start, &dirs.p, h0), 0, 0, 0, 0]
                }),
                Sweep::Tertiary => transitions(&part, settings, |u| {
                    section_signature(sampler, x0, dirs, h0, u)
                }),
            };
            if extra.0.is_empty() {
                break;
            }
            for b in extra.0 {
                breaks.push(b);
            }
            part = Partition::new(&breaks.0, h0, eps);
        }
    }
    trace!("{sweep:?} limits at {:?}: {:?}", x0.as_slice(), part.limits());
    part
}

/// Pushes every crossing on one edge: a single one if the ends differ in
/// sign, otherwise a hidden pair if there is one
fn side_crossings<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    start: &Vector3<f64>,
    dir: &Vector3<f64>,
    len: f64,
    f0: f64,
    f1: f64,
    breaks: &mut Breaks,
) {
    if f0 * f1 < 0.0 {
        breaks.push(sampler.edge_root(start, dir, len, f0, f1));
    } else if let Some((r0, r1)) =
        sampler.hidden_crossings(start, dir, len, f0, f1)
    {
        breaks.push(r0);
        breaks.push(r1);
    }
}

/// Collects the tertiary breakpoints from cell edges and faces
fn tertiary_crossings<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    x0: &Vector3<f64>,
    dirs: &Dirs,
    h0: f64,
    breaks: &mut Breaks,
) {
    // Corner values on the two faces normal to `p`, indexed as `2 * j + m`
    // with `j` along `s` and `m` along `t`
    let mut fv = [[0.0; 4]; 2];
    for (k, face) in fv.iter_mut().enumerate() {
        for (i, v) in face.iter_mut().enumerate() {
            let (j, m) = (i / 2, i % 2);
            *v = sampler.eval(
                &(x0 + dirs.p * (k as f64 * h0)
                    + dirs.s * (j as f64 * h0)
                    + dirs.t * (m as f64 * h0)),
            );
        }
    }

    for k in 0..2 {
        let base = x0 + dirs.p * (k as f64 * h0);
        let (mut nvp, mut nvn) = (0, 0);
        for j in 0..2 {
            let start = base + dirs.s * (j as f64 * h0);
            let (f0, f1) = (fv[k][2 * j], fv[k][2 * j + 1]);
            if f0 * f1 < 0.0 {
                breaks.push(sampler.edge_root(&start, &dirs.t, h0, f0, f1));
            } else if f0 + f1 > 0.0 {
                nvp += 2;
            } else {
                nvn += 2;
            }
        }

        if sampler.settings().face_analysis && (nvp == 4 || nvn == 4) {
            let check = check_face_consistency(&fv[k], &fv[1 - k]);
            if !check.needs_search {
                continue;
            }
            let face = Face {
                origin: base,
                s: dirs.s,
                t: dirs.t,
                h0,
            };
            let ext = get_face_min(sampler, &face, &check);
            if ext.confirmed {
                for b in get_face_intersections(sampler, &face, &ext) {
                    breaks.push(b);
                }
            }
        }
    }
}

/// Crossing counts on the four sides of the section at tertiary offset `t`
///
/// The sides are taken in the order: `p = 0`, `p = h0` (both along `s`),
/// then `s = 0`, `s = h0` (both along `p`).  When none of them is crossed,
/// the last entry records whether the interface lies inside the section
/// anyway, which marks the tertiary extent of a body enclosed by the cell.
fn section_signature<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    x0: &Vector3<f64>,
    dirs: &Dirs,
    h0: f64,
    t: f64,
) -> Signature {
    let o = x0 + dirs.t * t;
    let sides = [
        sampler.crossings(&o, &dirs.s, h0),
        sampler.crossings(&(o + dirs.p * h0), &dirs.s, h0),
        sampler.crossings(&o, &dirs.p, h0),
        sampler.crossings(&(o + dirs.s * h0), &dirs.p, h0),
    ];
    let enclosed = sides == [0; 4] && section_is_cut(sampler, &o, dirs, h0);
    let [a, b, c, d] = sides;
    [a, b, c, d, u8::from(enclosed)]
}

/// Searches a section with uncrossed sides for interior interface
///
/// Same test as for whole cells: corners further than `2 * fh` from zero
/// rule it out, otherwise coordinate descent from the corner closest to the
/// interface looks for the opposite sign.
fn section_is_cut<F: ImplicitFunction + ?Sized>(
    sampler: &Sampler<F>,
    o: &Vector3<f64>,
    dirs: &Dirs,
    h0: f64,
) -> bool {
    let corners = [[0.0, 0.0], [h0, 0.0], [0.0, h0], [h0, h0]];
    let (start, fx) = corners
        .iter()
        .map(|&[p, s]| (p, s, sampler.eval(&(o + dirs.p * p + dirs.s * s))))
        .fold(([0.0; 3], f64::NAN), |acc, (p, s, v)| {
            if acc.1.is_nan() || v.abs() < acc.1.abs() {
                ([p, s, 0.0], v)
            } else {
                acc
            }
        });
    if fx.abs() > 2.0 * sampler.fh() {
        return false;
    }
    let sign = if fx < 0.0 { -1.0 } else { 1.0 };
    let axes = [dirs.p, dirs.s];
    let block = Block {
        origin: *o,
        axes: &axes,
        h0,
    };
    block.find_sign_change(sampler, start, sign * fx, sign)
}

/// Finds positions inside subintervals where the signature changes
///
/// Each subinterval is probed at both ends (nudged inward) and at evenly
/// spaced interior points; between every pair of neighboring probes that
/// disagree, the change is bisected down to the length tolerance.
fn transitions<S: Fn(f64) -> Signature>(
    part: &Partition,
    settings: &Settings,
    signature: S,
) -> Breaks {
    let mut out = Breaks::default();
    for (a, b) in part.intervals() {
        let nudge = (b - a) * PROBE_NUDGE;
        let probe = |i: usize| match i {
            0 => a + nudge,
            PROBES => b - nudge,
            _ => a + (b - a) * i as f64 / PROBES as f64,
        };
        let mut lo = probe(0);
        let mut sig_lo = signature(lo);
        for i in 1..=PROBES {
            let hi = probe(i);
            let sig_hi = signature(hi);
            if sig_hi != sig_lo {
                let t = bisect(&signature, lo, hi, sig_lo, settings);
                trace!("signature changes in [{a}, {b}] at {t}");
                out.push(t);
            }
            (lo, sig_lo) = (hi, sig_hi);
        }
    }
    out
}

/// Narrows down a signature change between `lo` and `hi`
fn bisect<S: Fn(f64) -> Signature>(
    signature: &S,
    mut lo: f64,
    mut hi: f64,
    sig_lo: Signature,
    settings: &Settings,
) -> f64 {
    for _ in 0..settings.max_iter {
        let mid = 0.5 * (lo + hi);
        if hi - lo <= settings.eps_r || mid <= lo || mid >= hi {
            break;
        }
        if signature(mid) == sig_lo {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
