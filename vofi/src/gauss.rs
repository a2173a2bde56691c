//! Gauss-Legendre quadrature
use arrayvec::ArrayVec;

/// Largest supported number of quadrature points
pub const MAX_GAUSS_POINTS: usize = 64;

/// Gauss-Legendre rule on `[-1, 1]`
#[derive(Clone, Debug)]
pub struct GaussLegendre {
    nodes: ArrayVec<f64, MAX_GAUSS_POINTS>,
    weights: ArrayVec<f64, MAX_GAUSS_POINTS>,
}

impl GaussLegendre {
    /// Builds an `n`-point rule
    ///
    /// Nodes are the roots of the Legendre polynomial `P_n`, found by Newton
    /// iteration from Chebyshev-like initial guesses; they are returned in
    /// ascending order.
    ///
    /// # Panics
    /// If `n` is zero or larger than [`MAX_GAUSS_POINTS`]
    pub fn new(n: usize) -> Self {
        assert!(n > 0 && n <= MAX_GAUSS_POINTS);
        let mut nodes = ArrayVec::from([0.0; MAX_GAUSS_POINTS]);
        let mut weights = ArrayVec::from([0.0; MAX_GAUSS_POINTS]);
        nodes.truncate(n);
        weights.truncate(n);

        let nf = n as f64;
        for i in 0..n.div_ceil(2) {
            let mut z =
                (std::f64::consts::PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
            let mut dp = 1.0;
            for _ in 0..100 {
                let (p, d) = legendre(n, z);
                dp = d;
                let prev = z;
                z -= p / d;
                if (z - prev).abs() <= 4.0 * f64::EPSILON {
                    break;
                }
            }
            let w = 2.0 / ((1.0 - z * z) * dp * dp);
            nodes[i] = -z;
            nodes[n - 1 - i] = z;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }
        Self { nodes, weights }
    }

    /// Number of points in the rule
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks whether the rule is empty (never true for a built rule)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Integrates `f` over `[a, b]`
    pub fn integrate<F: FnMut(f64) -> f64>(
        &self,
        a: f64,
        b: f64,
        mut f: F,
    ) -> f64 {
        let mid = 0.5 * (a + b);
        let half = 0.5 * (b - a);
        let sum: f64 = self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| w * f(mid + half * x))
            .sum();
        sum * half
    }
}

/// Evaluates `P_n(z)` and its derivative by the three-term recurrence
fn legendre(n: usize, z: f64) -> (f64, f64) {
    let mut p1 = 1.0;
    let mut p2 = 0.0;
    for j in 0..n {
        let p3 = p2;
        p2 = p1;
        let jf = j as f64;
        p1 = ((2.0 * jf + 1.0) * z * p2 - jf * p3) / (jf + 1.0);
    }
    let dp = n as f64 * (z * p1 - p2) / (z * z - 1.0);
    (p1, dp)
}
