//! Contraction of interpolated fields with a rotated source to a scalar trace.

use ndarray::{Array1, ArrayView2};

use crate::rotations::Voigt;

/// Voigt weights of the off-diagonal terms in a double contraction
pub const VOIGT_MULTIPLIERS: [f64; 6] = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

/// Components weighted by the odd azimuth factor: φz and sφ
const ODD_COMPONENTS: [bool; 6] = [false, false, false, true, false, true];

/// Σᵢ strainᵢ · mᵢ · multᵢ · facᵢ over `strain[t][i]` (Voigt order ss, φφ, zz, φz, sz, sφ)
///
/// The φz and sφ strain components change sign between the mesh and the
/// source frame. `fac_even` weights components 0, 1, 2, 4 and `fac_odd`
/// weights 3 and 5.
pub fn contract_strain(
    strain: ArrayView2<f64>,
    moment: &Voigt,
    fac_even: f64,
    fac_odd: f64,
) -> Array1<f64> {
    let mut trace = Array1::<f64>::zeros(strain.nrows());
    for (i, column) in strain.columns().into_iter().enumerate() {
        let (flip, fac) = if ODD_COMPONENTS[i] {
            (-1.0, fac_odd)
        } else {
            (1.0, fac_even)
        };
        let weight = flip * moment[i] * VOIGT_MULTIPLIERS[i] * fac;
        if weight != 0.0 {
            trace.scaled_add(weight, &column);
        }
    }
    trace
}

/// u_s f_s fac_even + u_φ f_φ fac_odd + u_z f_z fac_even over `displacement[t][c]`
pub fn contract_displacement(
    displacement: ArrayView2<f64>,
    force: &[f64; 3],
    fac_even: f64,
    fac_odd: f64,
) -> Array1<f64> {
    let weights = [force[0] * fac_even, force[1] * fac_odd, force[2] * fac_even];
    let mut trace = Array1::<f64>::zeros(displacement.nrows());
    for (column, weight) in displacement.columns().into_iter().zip(weights) {
        if weight != 0.0 {
            trace.scaled_add(weight, &column);
        }
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    #[test]
    fn diagonal_moment_is_plain_weighted_sum() {
        let strain = Array2::from_shape_fn((4, 6), |(t, i)| (t as f64 + 1.0) * (i as f64 + 0.5));
        let moment = [2.0, -1.0, 3.0, 0.0, 0.0, 0.0];
        let trace = contract_strain(strain.view(), &moment, 1.0, 1.0);
        for t in 0..4 {
            let expected = 2.0 * strain[[t, 0]] - strain[[t, 1]] + 3.0 * strain[[t, 2]];
            assert!((trace[t] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn off_diagonal_terms_are_doubled_and_flipped() {
        let strain = array![
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]
        ];
        let moment = [0.0, 0.0, 0.0, 0.5, 0.25, 2.0];
        let trace = contract_strain(strain.view(), &moment, 3.0, 7.0);
        assert!((trace[0] - (-1.0 * 0.5 * 2.0 * 7.0)).abs() < 1e-12);
        assert!((trace[1] - (0.25 * 2.0 * 3.0)).abs() < 1e-12);
        assert!((trace[2] - (-1.0 * 2.0 * 2.0 * 7.0)).abs() < 1e-12);
    }

    #[test]
    fn displacement_contraction() {
        let displacement = array![[1.0, 2.0, 3.0], [-1.0, 0.5, 0.0]];
        let trace = contract_displacement(displacement.view(), &[1.0, 1.0, 2.0], 0.5, -1.0);
        assert!((trace[0] - (0.5 - 2.0 + 3.0)).abs() < 1e-12);
        assert!((trace[1] - (-0.5 - 0.5)).abs() < 1e-12);
    }
}
