//! Strain of an element's nodal displacement history.
//!
//! Derivatives in (s, z) are the spectral derivatives in (ξ, η) chained
//! through the inverse Jacobian of the element mapping at each node. The
//! stored fields are single azimuthal Fourier modes, so the φ derivatives are
//! replaced by the mode order and the strain formula depends on the
//! excitation class.
//!
//! Voigt order of the result: (ss, φφ, zz, φz, sz, sφ).

use axidb_model::Excitation;
use nalgebra::Matrix2;
use ndarray::{Array2, Array3, Array4, ArrayView3, ArrayView4, Axis, s};

use crate::basis::{PointSet, interpolate_2d_td};
use crate::error::{Result, SynthError};
use crate::mapping::ElementGeometry;

/// Per-node geometric factors of one element
struct ElementMetrics {
    n: usize,
    axial: bool,
    /// Inverse Jacobian at node (i, j), stored at `i * n + j`
    inv_jacobian: Vec<Matrix2<f64>>,
    /// Cylindrical radius s at node (i, j)
    radius: Vec<f64>,
}

impl ElementMetrics {
    fn new(
        geometry: &ElementGeometry,
        xi_points: &PointSet,
        eta_points: &PointSet,
        axial: bool,
    ) -> Result<Self> {
        let n = xi_points.len();
        let mut inv_jacobian = Vec::with_capacity(n * n);
        let mut radius = Vec::with_capacity(n * n);
        for &xi in xi_points.nodes() {
            for &eta in eta_points.nodes() {
                let inv = geometry.jacobian(xi, eta).try_inverse().ok_or_else(|| {
                    SynthError::InvalidInput(format!(
                        "Singular element Jacobian at (xi={}, eta={})",
                        xi, eta
                    ))
                })?;
                inv_jacobian.push(inv);
                radius.push(geometry.map(xi, eta)[0]);
            }
        }
        Ok(Self {
            n,
            axial,
            inv_jacobian,
            radius,
        })
    }

    /// (∂f/∂s, ∂f/∂z) at every node and time sample of `field[t][i][j]`
    fn gradient(
        &self,
        field: ArrayView3<f64>,
        xi_points: &PointSet,
        eta_points: &PointSet,
    ) -> (Array3<f64>, Array3<f64>) {
        let d_xi = xi_points.diff_matrix();
        let d_eta = eta_points.diff_matrix();
        let n = self.n;
        let mut ds = Array3::<f64>::zeros(field.raw_dim());
        let mut dz = Array3::<f64>::zeros(field.raw_dim());

        for (t, snapshot) in field.outer_iter().enumerate() {
            for i in 0..n {
                for j in 0..n {
                    let mut f_xi = 0.0;
                    let mut f_eta = 0.0;
                    for k in 0..n {
                        f_xi += d_xi[(i, k)] * snapshot[[k, j]];
                        f_eta += d_eta[(j, k)] * snapshot[[i, k]];
                    }
                    let inv = &self.inv_jacobian[i * n + j];
                    ds[[t, i, j]] = f_xi * inv[(0, 0)] + f_eta * inv[(1, 0)];
                    dz[[t, i, j]] = f_xi * inv[(0, 1)] + f_eta * inv[(1, 1)];
                }
            }
        }
        (ds, dz)
    }

    /// f / s, replaced by ∂f/∂s on the axis (ξ = -1 of axial elements)
    fn over_s(&self, f: &Array3<f64>, df_ds: &Array3<f64>) -> Array3<f64> {
        let n = self.n;
        let mut out = Array3::<f64>::zeros(f.raw_dim());
        for i in 0..n {
            for j in 0..n {
                let on_axis = self.axial && i == 0;
                let s_node = self.radius[i * n + j];
                let src = if on_axis {
                    df_ds.slice(s![.., i, j])
                } else {
                    f.slice(s![.., i, j])
                };
                let mut dst = out.slice_mut(s![.., i, j]);
                if on_axis {
                    dst.assign(&src);
                } else {
                    dst.assign(&(&src / s_node));
                }
            }
        }
        out
    }
}

/// Full strain field `(ndumps, npol+1, npol+1, 6)` of an element
///
/// `displacement` is `(ndumps, npol+1 [ξ], npol+1 [η], 3)` with components
/// (s, φ, z). Axial elements must be passed GLJ points along ξ.
pub fn derive_strain(
    excitation: Excitation,
    displacement: ArrayView4<f64>,
    geometry: &ElementGeometry,
    xi_points: &PointSet,
    eta_points: &PointSet,
    axial: bool,
) -> Result<Array4<f64>> {
    let (nt, ni, nj, ncomp) = displacement.dim();
    if ni != xi_points.len() || nj != eta_points.len() || ni != nj || ncomp != 3 {
        return Err(SynthError::InvalidInput(format!(
            "Displacement buffer has shape ({}, {}, {}, {}), expected (ndumps, {}, {}, 3)",
            nt,
            ni,
            nj,
            ncomp,
            xi_points.len(),
            eta_points.len()
        )));
    }

    let metrics = ElementMetrics::new(geometry, xi_points, eta_points, axial)?;
    let u_s = displacement.index_axis(Axis(3), 0);
    let u_p = displacement.index_axis(Axis(3), 1);
    let u_z = displacement.index_axis(Axis(3), 2);

    let (ds_us, dz_us) = metrics.gradient(u_s, xi_points, eta_points);
    let (ds_uz, dz_uz) = metrics.gradient(u_z, xi_points, eta_points);

    let mut strain = Array4::<f64>::zeros((nt, ni, nj, 6));
    strain.index_axis_mut(Axis(3), 0).assign(&ds_us);
    strain.index_axis_mut(Axis(3), 2).assign(&dz_uz);
    strain
        .index_axis_mut(Axis(3), 4)
        .assign(&((&dz_us + &ds_uz) * 0.5));

    let u_s = u_s.to_owned();
    match excitation {
        Excitation::Monopole => {
            strain
                .index_axis_mut(Axis(3), 1)
                .assign(&metrics.over_s(&u_s, &ds_us));
        }
        Excitation::Dipole | Excitation::Quadpole => {
            let m = f64::from(excitation.order());
            let (ds_up, dz_up) = metrics.gradient(u_p, xi_points, eta_points);
            let u_p = u_p.to_owned();
            let u_z = u_z.to_owned();

            // (U_s - m U_φ) / s
            let hoop = &u_s - &(&u_p * m);
            let d_hoop = &ds_us - &(&ds_up * m);
            strain
                .index_axis_mut(Axis(3), 1)
                .assign(&metrics.over_s(&hoop, &d_hoop));

            // ½ (∂z U_φ + m U_z / s)
            let uz_over_s = metrics.over_s(&u_z, &ds_uz);
            strain
                .index_axis_mut(Axis(3), 3)
                .assign(&((&dz_up + &(&uz_over_s * m)) * 0.5));

            // ½ (∂s U_φ + (m U_s - U_φ) / s)
            let shear = &(&u_s * m) - &u_p;
            let d_shear = &(&ds_us * m) - &ds_up;
            let shear_over_s = metrics.over_s(&shear, &d_shear);
            strain
                .index_axis_mut(Axis(3), 5)
                .assign(&((&ds_up + &shear_over_s) * 0.5));
        }
    }

    if let Some(((t, i, j, c), value)) = strain.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(SynthError::InvalidInput(format!(
            "Strain component {} at node ({}, {}), sample {} is {}; \
             nodes on the axis require an axial element",
            c, i, j, t, value
        )));
    }
    Ok(strain)
}

/// Interpolate every component of a nodal field `(ndumps, ξ, η, ncomp)` at
/// (ξ, η), giving `(ndumps, ncomp)`
pub fn interpolate_components(
    field: ArrayView4<f64>,
    xi_points: &PointSet,
    eta_points: &PointSet,
    xi: f64,
    eta: f64,
) -> Array2<f64> {
    let (nt, _, _, ncomp) = field.dim();
    let mut out = Array2::<f64>::zeros((nt, ncomp));
    for c in 0..ncomp {
        let values = interpolate_2d_td(xi_points, eta_points, field.index_axis(Axis(3), c), xi, eta);
        out.column_mut(c).assign(&values);
    }
    out
}
