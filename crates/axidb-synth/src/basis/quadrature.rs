//! Gauss–Lobatto collocation points.
//!
//! - GLL: Gauss–Lobatto–Legendre, used along both reference directions of
//!   elements away from the axis
//! - GLJ: Gauss–Lobatto–Jacobi with weight (1 + x), used along ξ of axial
//!   elements where the symmetry axis sits at ξ = -1
//!
//! The interior Lobatto nodes of weight (1-x)^α (1+x)^β are the zeros of
//! P^(α+1, β+1)_(n-1). They are computed as eigenvalues of the Jacobi matrix
//! (Golub–Welsch) and then polished with Newton steps on the polynomial.

use nalgebra::DMatrix;
use nalgebra::linalg::SymmetricEigen;

const NEWTON_STEPS: usize = 3;

/// Evaluate the Jacobi polynomial P^(a,b)_n and its derivative at x
pub fn jacobi_polynomial(n: usize, a: f64, b: f64, x: f64) -> (f64, f64) {
    let value = jacobi_value(n, a, b, x);
    let derivative = if n == 0 {
        0.0
    } else {
        0.5 * (n as f64 + a + b + 1.0) * jacobi_value(n - 1, a + 1.0, b + 1.0, x)
    };
    (value, derivative)
}

fn jacobi_value(n: usize, a: f64, b: f64, x: f64) -> f64 {
    let mut p_prev = 1.0;
    if n == 0 {
        return p_prev;
    }
    let mut p = 0.5 * ((a + b + 2.0) * x + (a - b));
    for k in 2..=n {
        let k = k as f64;
        let c = 2.0 * k + a + b;
        let a1 = 2.0 * k * (k + a + b) * (c - 2.0);
        let a2 = (c - 1.0) * (a * a - b * b);
        let a3 = (c - 2.0) * (c - 1.0) * c;
        let a4 = 2.0 * (k + a - 1.0) * (k + b - 1.0) * c;
        let p_next = ((a2 + a3 * x) * p - a4 * p_prev) / a1;
        p_prev = p;
        p = p_next;
    }
    p
}

/// Zeros of P^(a,b)_m in ascending order
pub fn gauss_jacobi_zeros(m: usize, a: f64, b: f64) -> Vec<f64> {
    if m == 0 {
        return Vec::new();
    }

    let mut jacobi = DMatrix::<f64>::zeros(m, m);
    for k in 0..m {
        let c = 2.0 * k as f64 + a + b;
        jacobi[(k, k)] = (b * b - a * a) / (c * (c + 2.0));
    }
    for k in 1..m {
        let kf = k as f64;
        let c = 2.0 * kf + a + b;
        let beta = 4.0 * kf * (kf + a) * (kf + b) * (kf + a + b)
            / (c * c * (c + 1.0) * (c - 1.0));
        let off = beta.sqrt();
        jacobi[(k, k - 1)] = off;
        jacobi[(k - 1, k)] = off;
    }

    let mut zeros: Vec<f64> = SymmetricEigen::new(jacobi).eigenvalues.iter().copied().collect();
    zeros.sort_by(f64::total_cmp);

    for x in zeros.iter_mut() {
        for _ in 0..NEWTON_STEPS {
            let (p, dp) = jacobi_polynomial(m, a, b, *x);
            if dp == 0.0 {
                break;
            }
            *x -= p / dp;
        }
    }
    zeros
}

/// Gauss–Lobatto–Legendre points of order `npol` (npol + 1 points)
pub fn gll_points(npol: usize) -> Vec<f64> {
    lobatto_points(npol, 0.0, 0.0)
}

/// Gauss–Lobatto–Jacobi (0, 1) points of order `npol` (npol + 1 points)
pub fn glj_points(npol: usize) -> Vec<f64> {
    lobatto_points(npol, 0.0, 1.0)
}

fn lobatto_points(npol: usize, alpha: f64, beta: f64) -> Vec<f64> {
    let mut points = Vec::with_capacity(npol + 1);
    points.push(-1.0);
    points.extend(gauss_jacobi_zeros(npol.saturating_sub(1), alpha + 1.0, beta + 1.0));
    points.push(1.0);
    points
}
