//! Vofi computes volume fractions of implicitly defined shapes on Cartesian
//! grids.
//!
//! A shape is given by an **implicit function** `f(x)`, where `x` is a
//! position in 2D or 3D space.  By convention, a position with `f(x) < 0` is
//! **inside** the shape (the reference phase), and one with `f(x) >= 0` is
//! **outside**.  The **color function** (or volume fraction) of a grid cell is
//! the share of its area or volume that lies inside the shape, a number in
//! `[0, 1]`.  Volume-of-fluid flow solvers use it to initialize interface
//! tracking.
//!
//! Computing it is a two-step process:
//! - [`get_fh`] estimates the **characteristic scale** of the implicit
//!   function near the interface.  Tolerances are expressed relative to
//!   this scale, so results do not depend on how the function is normalized.
//! - [`get_cc`] computes the color function of one [`Cell`].
//!
//! ```
//! use vofi::{Cell, Settings, get_cc, get_fh, shapes::Sphere};
//!
//! let circle = Sphere { center: [0.5, 0.5, 0.0], radius: 0.3 };
//! let settings = Settings::default();
//!
//! let h = 0.1;
//! let fh = get_fh(&circle, &[0.5, 0.8], h, true, &settings)?;
//! let mut area = 0.0;
//! for i in 0..10 {
//!     for j in 0..10 {
//!         let cell = Cell::new(&[i as f64 * h, j as f64 * h], h)?;
//!         area += get_cc(&circle, &cell, fh, &settings) * cell.measure();
//!     }
//! }
//! assert!((area - circle.area()).abs() < 1e-10);
//! # Ok::<(), vofi::Error>(())
//! ```
//!
//! # Algorithm
//! The color function is an integral over the cell, which is computed by
//! reducing the dimension one step at a time:
//! - along the **primary** direction, the length of the inside segment is
//!   found exactly from its interface crossings;
//! - along the **secondary** direction, those lengths are integrated with
//!   Gauss-Legendre quadrature to get the area of a 2D section;
//! - in 3D, section areas are integrated along the **tertiary** direction.
//!
//! Quadrature only converges quickly for smooth integrands, so each sweep is
//! first split into subintervals at every point where the interface meets
//! the cell boundary ([`get_limits`]).  Crossings that no edge sees are
//! searched for explicitly: pairs of crossings on a single edge, patches
//! that touch a face without reaching its edges, and shapes that sit
//! entirely inside a cell.
//!
//! These searches assume the interface is resolved by the grid.  A cell
//! whose corners share a sign and are all further than `D * fh` from zero
//! (`D` being the dimension) is taken as uniform without looking inside, so
//! a shape much smaller than the cell can be missed entirely.  Lines are
//! assumed to cross the interface at most twice.
//!
//! Any closure `Fn(&[f64]) -> f64` is an [`ImplicitFunction`]; functions
//! that need user data can be wrapped in a [`ContextFn`].
#![warn(missing_docs)]

pub mod cc;
pub mod cell;
pub mod face;
pub mod gauss;
pub mod limits;
pub mod min;
pub mod root;
pub mod shapes;

mod error;
mod sampler;
mod scale;
mod settings;
mod types;

pub use cc::get_cc;
pub use error::Error;
pub use limits::{Partition, Sweep, get_limits};
pub use sampler::Sampler;
pub use scale::get_fh;
pub use settings::Settings;
pub use types::{Cell, ContextFn, Dim, Dirs, ImplicitFunction};
