use std::num::NonZeroUsize;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use rayon::prelude::*;

use vofi::{
    Cell, ImplicitFunction, Settings, get_cc, get_fh,
    shapes::{Ellipse, EllipsoidCap},
};

/// Volume fractions of analytic shapes on Cartesian grids
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,

    #[clap(flatten)]
    settings: GridSettings,
}

#[derive(Subcommand)]
enum Command {
    /// Rotated ellipse in the unit square
    Ellipse {
        /// Semi-axis along the rotated `x'` axis
        #[clap(short, default_value_t = 0.17)]
        a: f64,

        /// Semi-axis along the rotated `y'` axis
        #[clap(short, default_value_t = 0.21)]
        b: f64,

        /// Angle between `x'` and `x`, in radians
        #[clap(long, default_value_t = 0.48)]
        alpha: f64,

        /// Center position
        #[clap(long, num_args = 2, default_values_t = [0.523, 0.475])]
        center: Vec<f64>,
    },

    /// Part of a rotated ellipsoid above `z = 0`
    Cap {
        /// Horizontal semi-axis along the rotated `x'` axis
        #[clap(short, default_value_t = 0.5)]
        a: f64,

        /// Horizontal semi-axis along the rotated `y'` axis
        #[clap(short, default_value_t = 0.4)]
        b: f64,

        /// Vertical semi-axis
        #[clap(short, default_value_t = 0.3)]
        c: f64,

        /// Angle between `x'` and `x`, in radians
        #[clap(long, default_value_t = 0.6)]
        alpha: f64,

        /// Center position
        #[clap(long, num_args = 3, default_values_t = [0.02, 0.9, -0.1])]
        center: Vec<f64>,
    },
}

#[derive(Parser)]
struct GridSettings {
    /// Number of cells along the longest side of the domain
    #[clap(short, long, default_value_t = 32)]
    n: usize,

    /// Number of threads to use
    #[clap(short, long)]
    threads: Option<NonZeroUsize>,

    /// Gauss-Legendre points per subinterval
    #[clap(short, long, default_value_t = Settings::default().gauss_points)]
    gauss: usize,

    /// Skip searching cell faces for hidden interface patches
    #[clap(long)]
    no_face_analysis: bool,

    /// Number of times to run (for benchmarking)
    #[clap(short = 'N', default_value_t = 1)]
    repeat: usize,
}

/// A uniform grid of cells
struct Grid {
    cells: Vec<Cell>,
    h: f64,
}

impl Grid {
    /// Builds a grid with `n[i]` cells of side `h` along axis `i`
    fn new(origin: &[f64], n: &[usize], h: f64) -> Result<Self> {
        let total: usize = n.iter().product();
        let mut cells = Vec::with_capacity(total);
        let mut p = origin.to_vec();
        for i in 0..total {
            let mut rem = i;
            for (axis, count) in n.iter().enumerate() {
                p[axis] = origin[axis] + (rem % count) as f64 * h;
                rem /= count;
            }
            cells.push(Cell::new(&p, h)?);
        }
        Ok(Self { cells, h })
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Integrates the reference phase of `f` over the grid
fn run<F: ImplicitFunction + Sync + ?Sized>(
    f: &F,
    grid: &Grid,
    start: &[f64],
    args: &GridSettings,
) -> Result<f64> {
    let settings = Settings {
        gauss_points: args.gauss,
        face_analysis: !args.no_face_analysis,
        ..Settings::default()
    };
    settings.validate()?;

    let fh = get_fh(f, start, grid.h, true, &settings)?;
    info!("Characteristic scale: {fh:e}");

    let pool = match args.threads {
        Some(n) => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(n.get())
                .build()?,
        ),
        None => None,
    };
    let eval = || -> f64 {
        grid.cells
            .par_iter()
            .map(|cell| get_cc(f, cell, fh, &settings) * cell.measure())
            .sum()
    };

    let start = Instant::now();
    let mut total = 0.0;
    for _ in 0..args.repeat {
        total = match &pool {
            Some(pool) => pool.install(eval),
            None => eval(),
        };
    }
    info!(
        "Evaluated {} cells {}x at {:?} ms/iter",
        grid.cells.len(),
        args.repeat,
        start.elapsed().as_micros() as f64 / 1000.0 / (args.repeat as f64)
    );
    Ok(total)
}

fn report(kind: &str, exact: f64, numeric: f64) {
    info!("analytic {kind}:  {exact:23.16e}");
    info!("numerical {kind}: {numeric:23.16e}");
    info!("absolute error:   {:23.16e}", (exact - numeric).abs());
    info!("relative error:   {:23.16e}", (exact - numeric).abs() / exact);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();
    if args.settings.n == 0 || args.settings.repeat == 0 {
        bail!("grid size and repeat count must be positive");
    }
    let n = args.settings.n;

    match args.cmd {
        Command::Ellipse {
            a,
            b,
            alpha,
            center,
        } => {
            let shape = Ellipse::new(a, b, alpha, [center[0], center[1]]);
            let h = 1.0 / n as f64;
            let grid = Grid::new(&[0.0, 0.0], &[n, n], h)?;
            let area = run(&shape, &grid, &[0.5, 0.5], &args.settings)?;
            report("area", shape.area(), area);
        }
        Command::Cap {
            a,
            b,
            c,
            alpha,
            center,
        } => {
            let [xc, yc, zc] = [center[0], center[1], center[2]];
            if zc.abs() > c {
                bail!("the center must be within `c` of the z = 0 plane");
            }
            let shape = EllipsoidCap::new(a, b, c, alpha, [xc, yc, zc]);

            // Box around the part of the ellipsoid above z = 0
            let r = a.max(b);
            let h = 2.0 * r / n as f64;
            let nz = ((c + zc) / h).ceil().max(1.0) as usize;
            let grid = Grid::new(&[xc - r, yc - r, 0.0], &[n, n, nz], h)?;
            let start = [xc, yc, 0.5 * (c + zc)];
            let volume = run(&shape, &grid, &start, &args.settings)?;
            report("volume", shape.volume(), volume);
        }
    }

    Ok(())
}
