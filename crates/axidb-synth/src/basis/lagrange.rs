//! Lagrange interpolation and differentiation on a 1-D collocation point set.

use nalgebra::DMatrix;
use ndarray::{Array1, ArrayView2, ArrayView3, Axis};

/// Collocation points with their Lagrange basis
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    nodes: Vec<f64>,
    /// Differentiation matrix D[(i, k)] = l_k'(x_i)
    diff: DMatrix<f64>,
}

impl PointSet {
    /// Build the basis for a set of distinct, ascending nodes
    pub fn new(nodes: Vec<f64>) -> Self {
        let n = nodes.len();
        // barycentric weights w_k = 1 / Π_{m≠k} (x_k - x_m)
        let weights: Vec<f64> = (0..n)
            .map(|k| {
                let prod: f64 = (0..n)
                    .filter(|&m| m != k)
                    .map(|m| nodes[k] - nodes[m])
                    .product();
                1.0 / prod
            })
            .collect();

        let mut diff = DMatrix::<f64>::zeros(n, n);
        for i in 0..n {
            let mut row_sum = 0.0;
            for k in 0..n {
                if k != i {
                    let d = (weights[k] / weights[i]) / (nodes[i] - nodes[k]);
                    diff[(i, k)] = d;
                    row_sum += d;
                }
            }
            // Derivatives of a constant vanish exactly
            diff[(i, i)] = -row_sum;
        }

        Self { nodes, diff }
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Differentiation matrix mapping nodal values to nodal derivatives
    pub fn diff_matrix(&self) -> &DMatrix<f64> {
        &self.diff
    }

    /// Values of every Lagrange basis function at x
    ///
    /// Uses the product form, so at a node the result is exactly the unit vector.
    pub fn basis_values(&self, x: f64) -> Vec<f64> {
        let n = self.nodes.len();
        (0..n)
            .map(|k| {
                (0..n)
                    .filter(|&m| m != k)
                    .map(|m| (x - self.nodes[m]) / (self.nodes[k] - self.nodes[m]))
                    .product()
            })
            .collect()
    }

    /// Interpolate nodal values at x
    pub fn interpolate(&self, values: &[f64], x: f64) -> f64 {
        self.basis_values(x)
            .iter()
            .zip(values)
            .map(|(l, v)| l * v)
            .sum()
    }
}

/// Tensor-product interpolation of one nodal grid `values[i][j]`
/// (i along ξ, j along η) at (ξ, η)
pub fn interpolate_2d(
    xi_points: &PointSet,
    eta_points: &PointSet,
    values: ArrayView2<f64>,
    xi: f64,
    eta: f64,
) -> f64 {
    let lxi = xi_points.basis_values(xi);
    let leta = eta_points.basis_values(eta);
    let mut total = 0.0;
    for (i, li) in lxi.iter().enumerate() {
        for (j, lj) in leta.iter().enumerate() {
            total += li * lj * values[[i, j]];
        }
    }
    total
}

/// Tensor-product interpolation of a batch of nodal grids `values[t][i][j]`
/// sharing the same abscissae, one result per leading index
pub fn interpolate_2d_td(
    xi_points: &PointSet,
    eta_points: &PointSet,
    values: ArrayView3<f64>,
    xi: f64,
    eta: f64,
) -> Array1<f64> {
    let lxi = xi_points.basis_values(xi);
    let leta = eta_points.basis_values(eta);
    let mut out = Array1::<f64>::zeros(values.len_of(Axis(0)));
    for (i, li) in lxi.iter().enumerate() {
        for (j, lj) in leta.iter().enumerate() {
            let w = li * lj;
            if w == 0.0 {
                continue;
            }
            out.scaled_add(w, &values.slice(ndarray::s![.., i, j]));
        }
    }
    out
}
